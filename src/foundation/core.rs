use std::cell::Cell;
use std::time::{Duration, Instant};

/// A 3-component vector used for element position, rotation, and scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// All-zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All-one vector (identity scale).
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a vector from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Uniform vector with every component set to `v`.
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Component-wise linear interpolation; `t` is not clamped.
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            z: lerp(self.z, to.z, t),
        }
    }

    /// Parse a vector out of a JSON value: `[x, y, z]` or `{ "x": .., "y": .., "z": .. }`.
    ///
    /// A bare number is accepted as a uniform vector.
    pub fn from_json(v: &serde_json::Value) -> Option<Self> {
        match v {
            serde_json::Value::Number(n) => n.as_f64().map(Self::splat),
            serde_json::Value::Array(items) if items.len() == 3 => Some(Self::new(
                items[0].as_f64()?,
                items[1].as_f64()?,
                items[2].as_f64()?,
            )),
            serde_json::Value::Object(map) => Some(Self::new(
                map.get("x")?.as_f64()?,
                map.get("y")?.as_f64()?,
                map.get("z").and_then(|z| z.as_f64()).unwrap_or(0.0),
            )),
            _ => None,
        }
    }
}

impl<'de> serde::Deserialize<'de> for Vec3 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 3]),
            Obj {
                x: f64,
                y: f64,
                #[serde(default)]
                z: f64,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y, z]) => Ok(Self { x, y, z }),
            Repr::Obj { x, y, z } => Ok(Self { x, y, z }),
        }
    }
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Clamp into `[0, 1]`, mapping NaN to `0`.
pub fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Milliseconds since the owning clock's origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Timestamp(pub f64);

impl Timestamp {
    /// Whole milliseconds, used when a timestamp becomes part of an identifier.
    pub fn as_millis(self) -> u64 {
        if self.0.is_finite() && self.0 > 0.0 {
            self.0 as u64
        } else {
            0
        }
    }
}

/// Time source for `last_update` stamps and instance ids.
pub trait Clock {
    /// Current time.
    fn now(&self) -> Timestamp;
}

/// Monotonic wall clock anchored at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Hand-driven clock for deterministic tests and offline simulation.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<f64>,
}

impl ManualClock {
    /// Clock starting at `start_ms`.
    pub fn starting_at(start_ms: f64) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now_ms.set(self.now_ms.get() + by.as_secs_f64() * 1000.0);
    }

    /// Set the absolute time.
    pub fn set(&self, ms: f64) {
        self.now_ms.set(ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.get())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
