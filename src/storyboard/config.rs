use crate::elements::model::ElementConfig;
use crate::foundation::error::{StoryboardError, StoryboardResult};
use crate::scene::controller::ControllerOpts;
use crate::scene::model::SceneConfig;
use crate::scene::phase::{DEFAULT_PHASE_TOLERANCE, PhaseValidation, validate_phases_with_tolerance};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A storyboard document: scenes plus the elements they animate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryboardConfig {
    /// Scenes in any order; `order` decides the sequence.
    #[serde(default)]
    pub scenes: Vec<SceneConfig>,
    /// Elements registered at `initialize`.
    #[serde(default)]
    pub elements: Vec<ElementConfig>,
}

/// Result of [`StoryboardConfig::validate`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ConfigReport {
    /// Phase diagnostics keyed by scene id.
    pub phases: BTreeMap<String, PhaseValidation>,
    /// Cross-reference problems that do not stop the storyboard from running.
    pub warnings: Vec<String>,
}

impl ConfigReport {
    /// `true` when no scene has phase errors.
    pub fn is_valid(&self) -> bool {
        self.phases.values().all(|v| v.valid)
    }
}

impl StoryboardConfig {
    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> StoryboardResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: &Path) -> StoryboardResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read storyboard config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> StoryboardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Scene-order checks (fatal) plus phase and cross-reference diagnostics.
    pub fn validate(&self) -> StoryboardResult<ConfigReport> {
        self.validate_with_tolerance(DEFAULT_PHASE_TOLERANCE)
    }

    /// [`StoryboardConfig::validate`] with an explicit phase gap tolerance.
    pub fn validate_with_tolerance(&self, tolerance: f64) -> StoryboardResult<ConfigReport> {
        validate_scene_order(&self.scenes)?;

        let mut report = ConfigReport::default();
        let element_ids: BTreeSet<&str> = self.elements.iter().map(|e| e.id.as_str()).collect();

        let mut seen_elements = BTreeSet::new();
        for element in &self.elements {
            if !seen_elements.insert(element.id.as_str()) {
                report
                    .warnings
                    .push(format!("element '{}' is declared more than once", element.id));
            }
        }

        for scene in &self.scenes {
            report.phases.insert(
                scene.id.clone(),
                validate_phases_with_tolerance(&scene.phases, tolerance),
            );
            for element in &scene.elements {
                if !element_ids.contains(element.id.as_str()) {
                    report.warnings.push(format!(
                        "scene '{}' references undeclared element '{}'",
                        scene.id, element.id
                    ));
                }
            }
            for effect in &scene.effects {
                if !element_ids.contains(effect.target.as_str()) {
                    report.warnings.push(format!(
                        "scene '{}': effect '{}' targets undeclared element '{}'",
                        scene.id, effect.id, effect.target
                    ));
                }
                for phase in &effect.phases {
                    if !scene.phases.contains(phase) {
                        report.warnings.push(format!(
                            "scene '{}': effect '{}' names undeclared phase '{}'",
                            scene.id, effect.id, phase
                        ));
                    }
                }
            }
        }
        Ok(report)
    }
}

/// Reject duplicate scene ids, duplicate orders, and gaps in the order sequence.
///
/// Orders need not start at 0; after sorting, each must be one more than the previous.
pub fn validate_scene_order(scenes: &[SceneConfig]) -> StoryboardResult<()> {
    let mut problems = Vec::new();

    let mut ids = BTreeSet::new();
    for scene in scenes {
        if !ids.insert(scene.id.as_str()) {
            problems.push(format!("duplicate scene id '{}'", scene.id));
        }
    }

    let mut by_order: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for scene in scenes {
        by_order.entry(scene.order).or_default().push(&scene.id);
    }
    for (order, ids) in &by_order {
        if ids.len() > 1 {
            problems.push(format!("order {order} is shared by scenes {}", ids.join(", ")));
        }
    }

    if let (Some(&first), Some(&last)) = (by_order.keys().next(), by_order.keys().next_back()) {
        let missing: Vec<String> = (first..=last)
            .filter(|o| !by_order.contains_key(o))
            .map(|o| o.to_string())
            .collect();
        if !missing.is_empty() {
            problems.push(format!(
                "orders must be contiguous from {first} to {last}; missing {}",
                missing.join(", ")
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(StoryboardError::scene_order(problems.join("; ")))
    }
}

/// Runtime knobs for [`crate::StoryboardManager`].
#[derive(Clone, Debug, PartialEq)]
pub struct StoryboardOpts {
    /// Options passed to every scene controller.
    pub controller: ControllerOpts,
    /// Gap tolerance for phase diagnostics.
    pub phase_tolerance: f64,
}

impl Default for StoryboardOpts {
    fn default() -> Self {
        Self {
            controller: ControllerOpts::default(),
            phase_tolerance: DEFAULT_PHASE_TOLERANCE,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/storyboard/config.rs"]
mod tests;
