use crate::foundation::core::clamp01;
use std::f64::consts::PI;
use std::fmt;

/// Easing functions used to map normalized phase progress.
///
/// Every curve is a `[0, 1] -> [0, 1]` map with `0 -> 0` and `1 -> 1`. Input is clamped before
/// evaluation and output after, so [`Ease::OutBack`] and [`Ease::OutElastic`] plateau at `1`
/// where the raw curve would overshoot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-in.
    InQuad,
    /// Quadratic ease-out.
    OutQuad,
    /// Quadratic ease-in/out.
    InOutQuad,
    /// Cubic ease-in.
    InCubic,
    /// Cubic ease-out.
    OutCubic,
    /// Cubic ease-in/out.
    InOutCubic,
    /// Quartic ease-in.
    InQuart,
    /// Quartic ease-out.
    OutQuart,
    /// Quartic ease-in/out.
    InOutQuart,
    /// Ease-out with a small overshoot past the target.
    OutBack,
    /// Decaying oscillation settling on the target.
    OutElastic,
    /// CSS-style `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier(f64, f64, f64, f64),
}

const BACK_OVERSHOOT: f64 = 1.70158;

impl Ease {
    /// Apply this easing function to normalized progress `t`. The result is within `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        clamp01(self.curve(clamp01(t)))
    }

    fn curve(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InQuart => t.powi(4),
            Self::OutQuart => 1.0 - (1.0 - t).powi(4),
            Self::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(4) / 2.0)
                }
            }
            Self::OutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_OVERSHOOT * (t - 1.0).powi(2)
            }
            Self::OutElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let c4 = (2.0 * PI) / 3.0;
                2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
            Self::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }

    /// Resolve an easing name.
    ///
    /// Matching ignores case, separators (`-`, `_`, `.`, spaces) and an `ease` prefix, so
    /// `easeInOutCubic`, `in-out-cubic` and `InOutCubic` all resolve. The `powerN.in/out/inOut`
    /// family maps onto quad/cubic/quart, and `cubic-bezier(x1,y1,x2,y2)` is parsed.
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if let Some(args) = trimmed
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_bezier_args(args);
        }

        let key: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | '.' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let key = key.strip_prefix("ease").unwrap_or(&key);

        let ease = match key {
            "linear" | "none" | "" => Self::Linear,
            "inquad" | "quadin" | "power1in" => Self::InQuad,
            "outquad" | "quadout" | "power1out" => Self::OutQuad,
            "inoutquad" | "quadinout" | "power1inout" => Self::InOutQuad,
            "incubic" | "cubicin" | "power2in" => Self::InCubic,
            "outcubic" | "cubicout" | "power2out" => Self::OutCubic,
            "inoutcubic" | "cubicinout" | "power2inout" => Self::InOutCubic,
            "inquart" | "quartin" | "power3in" => Self::InQuart,
            "outquart" | "quartout" | "power3out" => Self::OutQuart,
            "inoutquart" | "quartinout" | "power3inout" => Self::InOutQuart,
            "outback" | "backout" => Self::OutBack,
            "outelastic" | "elasticout" => Self::OutElastic,
            _ => return None,
        };
        Some(ease)
    }

    /// Canonical name; round-trips through [`Ease::from_name`].
    pub fn name(self) -> String {
        let s = match self {
            Self::Linear => "linear",
            Self::InQuad => "inQuad",
            Self::OutQuad => "outQuad",
            Self::InOutQuad => "inOutQuad",
            Self::InCubic => "inCubic",
            Self::OutCubic => "outCubic",
            Self::InOutCubic => "inOutCubic",
            Self::InQuart => "inQuart",
            Self::OutQuart => "outQuart",
            Self::InOutQuart => "inOutQuart",
            Self::OutBack => "outBack",
            Self::OutElastic => "outElastic",
            Self::CubicBezier(x1, y1, x2, y2) => {
                return format!("cubic-bezier({x1},{y1},{x2},{y2})");
            }
        };
        s.to_string()
    }

    /// Return `true` for curves whose output never decreases as `t` grows.
    pub fn is_monotonic(self) -> bool {
        match self {
            Self::OutElastic => false,
            Self::CubicBezier(_, y1, _, y2) => {
                (0.0..=1.0).contains(&y1) && (0.0..=1.0).contains(&y2)
            }
            _ => true,
        }
    }
}

fn parse_bezier_args(args: &str) -> Option<Ease> {
    let nums: Vec<f64> = args
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    let [x1, y1, x2, y2] = nums.as_slice() else {
        return None;
    };
    if !nums.iter().all(|v| v.is_finite()) {
        return None;
    }
    Some(Ease::CubicBezier(*x1, *y1, *x2, *y2))
}

fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    if x <= 0.0 || x >= 1.0 {
        return x;
    }
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);

    // B(t) = 3(1-t)^2 t p1 + 3(1-t) t^2 p2 + t^3, with p0 = 0 and p3 = 1.
    let sample = |p1: f64, p2: f64, t: f64| {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    };
    let slope = |p1: f64, p2: f64, t: f64| {
        let u = 1.0 - t;
        3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    };

    let mut t = x;
    for _ in 0..8 {
        let err = sample(x1, x2, t) - x;
        if err.abs() < 1e-7 {
            return sample(y1, y2, t);
        }
        let d = slope(x1, x2, t);
        if d.abs() < 1e-6 {
            break;
        }
        t = (t - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    t = x;
    for _ in 0..32 {
        let v = sample(x1, x2, t);
        if (v - x).abs() < 1e-7 {
            break;
        }
        if v < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    sample(y1, y2, t)
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Easing as written in configuration.
///
/// Unknown names are kept rather than rejected: phase validation reports them and mapping falls
/// back to linear.
#[derive(Clone, Debug, PartialEq)]
pub enum EaseSpec {
    /// A recognized curve.
    Known(Ease),
    /// A name that did not resolve.
    Unknown(String),
}

impl EaseSpec {
    /// Resolve a name, keeping it verbatim when unrecognized.
    pub fn parse(name: &str) -> Self {
        match Ease::from_name(name) {
            Some(ease) => Self::Known(ease),
            None => Self::Unknown(name.to_string()),
        }
    }

    /// The resolved curve, if any.
    pub fn ease(&self) -> Option<Ease> {
        match self {
            Self::Known(ease) => Some(*ease),
            Self::Unknown(_) => None,
        }
    }
}

impl From<Ease> for EaseSpec {
    fn from(ease: Ease) -> Self {
        Self::Known(ease)
    }
}

impl serde::Serialize for EaseSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(ease) => serializer.serialize_str(&ease.name()),
            Self::Unknown(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> serde::Deserialize<'de> for EaseSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
