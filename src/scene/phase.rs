//! Pure mapping from scene progress to per-phase progress, plus phase-coverage validation.

use crate::animation::ease::EaseSpec;
use crate::foundation::core::clamp01;
use crate::scene::model::{PhaseDefinition, PhaseMap};
use std::cell::RefCell;
use std::collections::HashSet;

/// Largest gap between consecutive phases that still counts as contiguous.
pub const DEFAULT_PHASE_TOLERANCE: f64 = 0.01;

/// Map overall progress onto the phase interval `[start, end]`.
///
/// Returns `0` before `start`, `1` after `end`, and the linear fraction in between. An empty or
/// inverted interval (rejected by validation, but still runnable) is a step at `end`: `1` once
/// `progress >= end`, `0` below it.
pub fn map_phase(progress: f64, start: f64, end: f64) -> f64 {
    if !(start < end) {
        return if progress >= end { 1.0 } else { 0.0 };
    }
    if progress < start {
        0.0
    } else if progress > end {
        1.0
    } else {
        clamp01((progress - start) / (end - start))
    }
}

/// [`map_phase`] followed by the phase's easing. The result is within `[0, 1]`.
///
/// An unrecognized easing name falls back to linear and is logged once per name.
pub fn map_phase_definition(progress: f64, phase: &PhaseDefinition) -> f64 {
    let linear = map_phase(progress, phase.start, phase.end);
    match &phase.ease {
        None => linear,
        Some(EaseSpec::Known(ease)) => ease.apply(linear),
        Some(EaseSpec::Unknown(name)) => {
            report_unknown_ease(name);
            linear
        }
    }
}

thread_local! {
    static REPORTED_EASES: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

fn report_unknown_ease(name: &str) {
    REPORTED_EASES.with(|reported| {
        if reported.borrow_mut().insert(name.to_string()) {
            tracing::warn!(ease = name, "unknown easing; falling back to linear");
        }
    });
}

/// Progress of every phase of a scene, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseProgress {
    entries: Vec<(String, f64)>,
}

impl PhaseProgress {
    /// Progress of `name`, `None` if the scene declares no such phase.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Iterate `(name, progress)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Phase names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the scene declares no phases.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return `true` when `name` is strictly between its start and end.
    pub fn is_mid_phase(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v > 0.0 && v < 1.0)
    }
}

impl serde::Serialize for PhaseProgress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, v) in &self.entries {
            map.serialize_entry(name, v)?;
        }
        map.end()
    }
}

/// Map `progress` onto every declared phase.
///
/// Always a full recomputation: the result depends only on `progress`, so any out-of-order
/// seek yields the same map as a monotone scroll would.
pub fn map_all_phases(progress: f64, phases: &PhaseMap) -> PhaseProgress {
    PhaseProgress {
        entries: phases
            .iter()
            .map(|(name, phase)| (name.to_string(), map_phase_definition(progress, phase)))
            .collect(),
    }
}

/// Diagnostics from [`validate_phases`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct PhaseValidation {
    /// `true` when there are no errors. Warnings do not affect validity.
    pub valid: bool,
    /// Hard range violations.
    pub errors: Vec<String>,
    /// Coverage issues (gaps, overlaps) and unknown easing names.
    pub warnings: Vec<String>,
}

/// Validate phase ranges and coverage with [`DEFAULT_PHASE_TOLERANCE`].
pub fn validate_phases(phases: &PhaseMap) -> PhaseValidation {
    validate_phases_with_tolerance(phases, DEFAULT_PHASE_TOLERANCE)
}

/// Validate phase ranges and coverage.
///
/// Never blocks execution: a scene with invalid phases still runs with what was configured.
pub fn validate_phases_with_tolerance(phases: &PhaseMap, tolerance: f64) -> PhaseValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut ranged: Vec<(&str, &PhaseDefinition)> = Vec::new();

    for (name, phase) in phases.iter() {
        let mut ok = true;
        if !phase.start.is_finite() || !phase.end.is_finite() {
            errors.push(format!("phase '{name}': start and end must be finite"));
            continue;
        }
        if !(0.0..=1.0).contains(&phase.start) {
            errors.push(format!(
                "phase '{name}': start {} is outside [0, 1]",
                phase.start
            ));
            ok = false;
        }
        if !(0.0..=1.0).contains(&phase.end) {
            errors.push(format!("phase '{name}': end {} is outside [0, 1]", phase.end));
            ok = false;
        }
        if phase.start >= phase.end {
            errors.push(format!(
                "phase '{name}': start {} must be < end {}",
                phase.start, phase.end
            ));
            ok = false;
        }
        if let Some(EaseSpec::Unknown(ease)) = &phase.ease {
            warnings.push(format!(
                "phase '{name}': unknown easing '{ease}', using linear"
            ));
        }
        if ok {
            ranged.push((name, phase));
        }
    }

    ranged.sort_by(|a, b| a.1.start.total_cmp(&b.1.start));
    for pair in ranged.windows(2) {
        let (prev_name, prev) = pair[0];
        let (next_name, next) = pair[1];
        let gap = next.start - prev.end;
        if gap > tolerance {
            warnings.push(format!(
                "gap of {gap:.3} between '{prev_name}' (ends {}) and '{next_name}' (starts {})",
                prev.end, next.start
            ));
        } else if gap < -1e-9 {
            warnings.push(format!(
                "'{prev_name}' (ends {}) overlaps '{next_name}' (starts {})",
                prev.end, next.start
            ));
        }
    }

    PhaseValidation {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/phase.rs"]
mod tests;
