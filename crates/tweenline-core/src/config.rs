//! Registry configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interp::LerpFn;

/// Options accepted at registry construction. Unknown JSON keys are ignored
/// when deserializing; only these fields are recognized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// When true, `update(dt)` advances managers by the measured elapsed
    /// time; when false every update call counts as one fixed tick and
    /// durations are in frames.
    pub use_elapsed_time: bool,
    /// New transitions start playing immediately; when false they are
    /// created paused and wait for `play`.
    pub auto_start: bool,
    /// Interpolation strategy installed on new transitions; `None` means
    /// the built-in linear blend.
    #[serde(skip)]
    pub default_lerp: Option<LerpFn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_elapsed_time: true,
            auto_start: true,
            default_lerp: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("use_elapsed_time", &self.use_elapsed_time)
            .field("auto_start", &self.auto_start)
            .field("default_lerp", &self.default_lerp.is_some())
            .finish()
    }
}
