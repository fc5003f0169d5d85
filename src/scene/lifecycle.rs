use std::time::Duration;

/// Where a scene is in its enter/leave cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Never entered, or cleaned up.
    #[default]
    Idle,
    /// Entered; waiting out the settle delay.
    Entering,
    /// Entered and settled.
    Active,
    /// Left; waiting out the settle delay.
    Exiting,
    /// Left and settled.
    Complete,
}

impl Lifecycle {
    /// Whether an enter signal starts a new cycle from here.
    pub fn can_enter(self) -> bool {
        matches!(self, Self::Idle | Self::Exiting | Self::Complete)
    }

    /// Whether a leave signal ends the current cycle from here.
    pub fn can_leave(self) -> bool {
        matches!(self, Self::Entering | Self::Active)
    }

    /// `Entering` or `Active`.
    pub fn is_inside(self) -> bool {
        matches!(self, Self::Entering | Self::Active)
    }

    /// Lowercase name, as used in logs and debug JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Entering => "entering",
            Self::Active => "active",
            Self::Exiting => "exiting",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deferred lifecycle transition, advanced by frame time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settle {
    pub(crate) to: Lifecycle,
    remaining: Duration,
}

impl Settle {
    pub(crate) fn new(to: Lifecycle, delay: Duration) -> Self {
        Self {
            to,
            remaining: delay,
        }
    }

    /// Consume `dt`; `true` once the delay has fully elapsed.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/lifecycle.rs"]
mod tests;
