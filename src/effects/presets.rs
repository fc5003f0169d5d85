//! Generic element-state transforms that ship with the crate.
//!
//! They only touch [`ElementState`] fields; what an element looks like is up to its renderer.

use crate::effects::model::{
    EffectApplication, EffectCategory, EffectConfig, FnEffect, ParamKind, ParamSpec,
};
use crate::effects::registry::EffectRegistry;
use crate::elements::model::ElementState;
use crate::foundation::core::{Vec3, lerp};
use crate::foundation::props::Props;
use std::f64::consts::TAU;

/// Opacity from `from` to `to`; hides the element at zero opacity.
pub const FADE: &str = "fade";
/// Position from `from` to `to`.
pub const TRANSLATE: &str = "translate";
/// Scale from `from` to `to` (numbers are uniform).
pub const SCALE: &str = "scale";
/// Morph toward `target`.
pub const MORPH: &str = "morph";
/// Continuous opacity oscillation between `min` and `max` every `period` seconds.
pub const PULSE: &str = "pulse";

fn fade(state: &ElementState, progress: f64, params: &Props, _delta: f64) -> ElementState {
    let opacity = lerp(params.f64_or("from", 0.0), params.f64_or("to", 1.0), progress);
    ElementState {
        visible: opacity > 0.0,
        opacity,
        ..state.clone()
    }
}

fn translate(state: &ElementState, progress: f64, params: &Props, _delta: f64) -> ElementState {
    let from = params
        .vec3("from")
        .or(state.position)
        .unwrap_or(Vec3::ZERO);
    let to = params.vec3("to").unwrap_or(Vec3::ZERO);
    ElementState {
        position: Some(from.lerp(to, progress)),
        ..state.clone()
    }
}

fn scale(state: &ElementState, progress: f64, params: &Props, _delta: f64) -> ElementState {
    let from = params.vec3("from").unwrap_or(Vec3::ONE);
    let to = params.vec3("to").unwrap_or(Vec3::ONE);
    ElementState {
        scale: Some(from.lerp(to, progress)),
        ..state.clone()
    }
}

fn morph(state: &ElementState, progress: f64, params: &Props, _delta: f64) -> ElementState {
    ElementState {
        morph_target: params
            .str("target")
            .map(str::to_string)
            .or_else(|| state.morph_target.clone()),
        morph_progress: Some(progress),
        ..state.clone()
    }
}

struct Pulse;

impl EffectApplication for Pulse {
    fn apply(
        &self,
        state: &ElementState,
        _progress: f64,
        _params: &Props,
        _delta: f64,
    ) -> ElementState {
        state.clone()
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn update(
        &self,
        state: &ElementState,
        delta: f64,
        params: &Props,
        internal: &mut serde_json::Value,
    ) -> Option<ElementState> {
        let period = params.f64_or("period", 2.0).max(1e-3);
        let elapsed = (internal.as_f64().unwrap_or(0.0) + delta.max(0.0)) % period;
        *internal = serde_json::json!(elapsed);

        let wave = 0.5 - 0.5 * (TAU * elapsed / period).cos();
        let opacity = lerp(params.f64_or("min", 0.4), params.f64_or("max", 1.0), wave);
        Some(ElementState {
            opacity,
            ..state.clone()
        })
    }
}

fn unit_number() -> ParamSpec {
    ParamSpec::new(ParamKind::Number).range(0.0, 1.0)
}

/// Register every stock effect. Ids already taken are left alone; returns how many were added.
pub fn register_presets(effects: &EffectRegistry) -> usize {
    let mut added = 0;

    added += usize::from(effects.register(
        EffectConfig::new(FADE, EffectCategory::Visibility)
            .with_default("from", 0.0)
            .with_default("to", 1.0)
            .with_param("from", unit_number())
            .with_param("to", unit_number()),
        FnEffect(fade),
    ));
    added += usize::from(effects.register(
        EffectConfig::new(TRANSLATE, EffectCategory::Transform)
            .with_param("from", ParamSpec::new(ParamKind::Vector))
            .with_param("to", ParamSpec::new(ParamKind::Vector).required()),
        FnEffect(translate),
    ));
    added += usize::from(effects.register(
        EffectConfig::new(SCALE, EffectCategory::Transform)
            .with_param("from", ParamSpec::new(ParamKind::Vector))
            .with_param("to", ParamSpec::new(ParamKind::Vector)),
        FnEffect(scale),
    ));
    added += usize::from(effects.register(
        EffectConfig::new(MORPH, EffectCategory::Morph)
            .with_param("target", ParamSpec::new(ParamKind::String)),
        FnEffect(morph),
    ));
    added += usize::from(effects.register(
        EffectConfig::new(PULSE, EffectCategory::Ambient)
            .with_default("period", 2.0)
            .with_default("min", 0.4)
            .with_default("max", 1.0)
            .with_param("period", ParamSpec::new(ParamKind::Number))
            .with_param("min", unit_number())
            .with_param("max", unit_number()),
        Pulse,
    ));

    added
}

#[cfg(test)]
#[path = "../../tests/unit/effects/presets.rs"]
mod tests;
