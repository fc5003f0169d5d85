//! Storyboard is a scroll-driven scene orchestration core.
//!
//! A storyboard is an ordered list of scenes. Each scene owns a scroll range, divides it into
//! named phases, and binds effects to elements during those phases:
//!
//! - Load and validate a [`StoryboardConfig`]
//! - Create a [`StoryboardManager`] over a [`ScrollDriver`]
//! - Feed [`DriverSignal`]s through [`StoryboardManager::dispatch`] and call
//!   [`StoryboardManager::frame`] once per host frame
//!
//! Element state lives in the [`ElementRegistry`]; hosts subscribe to it and render however
//! they like. Effects only transform [`ElementState`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod driver;
pub(crate) mod effects;
pub(crate) mod elements;
pub(crate) mod scene;
pub(crate) mod storyboard;

pub use crate::foundation::core::{Clock, ManualClock, SystemClock, Timestamp, Vec3, clamp01, lerp};
pub use crate::foundation::error::{StoryboardError, StoryboardResult};
pub use crate::foundation::observer::{ListenerId, Subject};
pub use crate::foundation::props::Props;

pub use crate::animation::ease::{Ease, EaseSpec};

pub use crate::scene::controller::{
    ControllerOpts, SceneController, SceneDebugInfo, SceneEvent, SceneEventPayload, SceneState,
};
pub use crate::scene::lifecycle::Lifecycle;
pub use crate::scene::model::{
    DurationSpec, EffectRef, ElementRef, PhaseDefinition, PhaseMap, SceneConfig, Scrub,
};
pub use crate::scene::phase::{
    DEFAULT_PHASE_TOLERANCE, PhaseProgress, PhaseValidation, map_all_phases, map_phase,
    map_phase_definition, validate_phases, validate_phases_with_tolerance,
};

pub use crate::elements::model::{ElementConfig, ElementPatch, ElementScope, ElementState};
pub use crate::elements::registry::{ElementLifecycle, ElementRegistry, SubscriptionId};

pub use crate::effects::model::{
    EffectApplication, EffectCategory, EffectConfig, EffectInstance, FnEffect, InstanceId,
    ParamKind, ParamSpec, RuntimeState,
};
pub use crate::effects::presets::{FADE, MORPH, PULSE, SCALE, TRANSLATE, register_presets};
pub use crate::effects::registry::EffectRegistry;

pub use crate::driver::headless::{HeadlessDriver, ScrollRequest};
pub use crate::driver::{DriverBinding, DriverSignal, SceneRoot, ScrollDriver, TransitionOptions};

pub use crate::storyboard::config::{
    ConfigReport, StoryboardConfig, StoryboardOpts, validate_scene_order,
};
pub use crate::storyboard::debug::StoryboardDebugInfo;
pub use crate::storyboard::manager::{ManagerEvent, ManagerEventPayload, StoryboardManager};
