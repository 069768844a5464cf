#![forbid(unsafe_code)]

//! Guide configuration.
//!
//! Collects the controller's tunables into a single [`GuideConfig`] that can
//! be built in code or, with the `config` feature, loaded from TOML or JSON.
//!
//! ```toml
//! # guide.toml
//! animation_duration_ms = 300
//! animates_step_transition = true
//! transition_easing = "ease_in_out"
//! illegal_target_policy = "drop"
//!
//! [mask_color]
//! r = 0
//! g = 0
//! b = 0
//! a = 160
//! ```
//!
//! # Defaults
//!
//! Black mask at 70% opacity, 250 ms transitions, step transitions not
//! animated, and illegal targets abort in debug builds but are dropped in
//! release builds.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use coachmark_core::animation::Easing;
use coachmark_core::color::Rgba;
use web_time::Duration;

/// Black at 70% opacity.
pub const DEFAULT_MASK_COLOR: Rgba = Rgba::new(0, 0, 0, 179);

/// Default duration of fades and cut-out transitions.
pub const DEFAULT_ANIMATION_DURATION_MS: u64 = 250;

const MAX_ANIMATION_DURATION_MS: u64 = 10_000;

/// What to do with a step whose target lies outside the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum IllegalTargetPolicy {
    /// Panic at registration. Programmer error surfaced during development.
    Abort,
    /// Log a warning and drop the step.
    Drop,
}

impl Default for IllegalTargetPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Abort
        } else {
            Self::Drop
        }
    }
}

/// Controller tunables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GuideConfig {
    /// Fill color of the dimmed region.
    pub mask_color: Rgba,
    /// Duration of the show fade and of animated cut-out transitions.
    pub animation_duration_ms: u64,
    /// Animate the cut-out when moving between steps.
    pub animates_step_transition: bool,
    /// Easing applied to cut-out transitions.
    pub transition_easing: Easing,
    pub illegal_target_policy: IllegalTargetPolicy,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            mask_color: DEFAULT_MASK_COLOR,
            animation_duration_ms: DEFAULT_ANIMATION_DURATION_MS,
            animates_step_transition: false,
            transition_easing: Easing::Linear,
            illegal_target_policy: IllegalTargetPolicy::default(),
        }
    }
}

impl GuideConfig {
    #[must_use]
    pub fn mask_color(mut self, color: Rgba) -> Self {
        self.mask_color = color;
        self
    }

    #[must_use]
    pub fn animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn animates_step_transition(mut self, animate: bool) -> Self {
        self.animates_step_transition = animate;
        self
    }

    #[must_use]
    pub fn transition_easing(mut self, easing: Easing) -> Self {
        self.transition_easing = easing;
        self
    }

    #[must_use]
    pub fn illegal_target_policy(mut self, policy: IllegalTargetPolicy) -> Self {
        self.illegal_target_policy = policy;
        self
    }

    /// Transition duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check parameter ranges. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.animation_duration_ms > MAX_ANIMATION_DURATION_MS {
            errors.push(format!(
                "animation_duration_ms must be <= {MAX_ANIMATION_DURATION_MS}, got {}",
                self.animation_duration_ms
            ));
        }
        if self.mask_color.a == 0 {
            errors.push("mask_color alpha must be > 0".to_string());
        }
        errors
    }

    /// Validate, turning any problem into [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`GuideConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
