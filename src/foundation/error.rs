/// Convenience result type used across the storyboard core.
pub type StoryboardResult<T> = Result<T, StoryboardError>;

/// Top-level error taxonomy.
///
/// Only configuration and missing-dependency failures surface as errors. Runtime lookup misses
/// (unknown element, unknown phase) are logged and skipped instead.
#[derive(thiserror::Error, Debug)]
pub enum StoryboardError {
    /// Invalid user-provided configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Scene list with duplicate ids, duplicate orders, or gaps in the order sequence.
    #[error("scene order error: {0}")]
    SceneOrder(String),

    /// The host could not resolve a scene's root container.
    #[error("missing root: scene '{0}' has no root container in the host")]
    MissingRoot(String),

    /// An effect id was requested that has no registered application.
    #[error("unknown effect: '{0}' is not registered")]
    UnknownEffect(String),

    /// Errors when serializing or deserializing configuration documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryboardError {
    /// Build a [`StoryboardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryboardError::SceneOrder`] value.
    pub fn scene_order(msg: impl Into<String>) -> Self {
        Self::SceneOrder(msg.into())
    }

    /// Build a [`StoryboardError::MissingRoot`] value.
    pub fn missing_root(scene_id: impl Into<String>) -> Self {
        Self::MissingRoot(scene_id.into())
    }

    /// Build a [`StoryboardError::UnknownEffect`] value.
    pub fn unknown_effect(effect_id: impl Into<String>) -> Self {
        Self::UnknownEffect(effect_id.into())
    }

    /// Build a [`StoryboardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StoryboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
