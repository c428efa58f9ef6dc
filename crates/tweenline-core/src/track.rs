//! Track: one segment of an animation chain.
//!
//! Tracks are assembled through the chain builder and are not mutated once
//! playback begins. A wait track is a pure time delay with no value
//! computation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::easing::{Ease, Easing};
use crate::transition::Transition;
use crate::value::Value;

/// Behavior at a track's far edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Play through once and move on.
    #[default]
    Once,
    /// Wrap around while plays remain.
    Loop,
    /// Reflect at each edge while cycles remain.
    PingPong,
    /// Clamp at the edge indefinitely; never completes.
    Hold,
}

/// Side-effect hook invoked with the owning transition.
pub type TrackCallback = Box<dyn FnMut(&mut Transition)>;

/// One segment of a chain: endpoints, duration, easing source, repeat mode,
/// loop budget, and optional callbacks.
///
/// `plays` is the total number of passes for `Loop` (-1 unbounded) or the
/// number of full cycles for `PingPong`. `duration <= 0` means instant:
/// progress evaluates to 1 on the first step.
pub struct Track {
    pub label: Option<String>,
    pub from: Option<Value>,
    pub to: Option<Value>,
    pub duration: f32,
    pub ease: Ease,
    pub repeat: RepeatMode,
    pub plays: i32,
    pub is_wait: bool,
    pub(crate) on_track_end: Option<TrackCallback>,
    pub(crate) on_update: Option<TrackCallback>,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            label: None,
            from: None,
            to: None,
            duration: 0.0,
            ease: Ease::default(),
            repeat: RepeatMode::Once,
            plays: 1,
            is_wait: false,
            on_track_end: None,
            on_update: None,
        }
    }
}

impl Track {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pure delay segment.
    pub fn wait(duration: f32) -> Self {
        Self {
            duration,
            is_wait: true,
            ..Self::default()
        }
    }

    /// Initial plays budget when the cursor enters this track.
    pub(crate) fn initial_plays(&self) -> i32 {
        match self.repeat {
            RepeatMode::Once | RepeatMode::Hold => 1,
            RepeatMode::Loop | RepeatMode::PingPong => self.plays,
        }
    }

    /// True while no builder call has touched this track, so `wait` can
    /// claim a freshly opened segment instead of appending after it.
    pub(crate) fn is_vacant(&self) -> bool {
        self.label.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.duration == 0.0
            && matches!(self.ease, Ease::Preset(Easing::Linear))
            && self.repeat == RepeatMode::Once
            && !self.is_wait
            && self.on_track_end.is_none()
            && self.on_update.is_none()
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("label", &self.label)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("repeat", &self.repeat)
            .field("plays", &self.plays)
            .field("is_wait", &self.is_wait)
            .field("on_track_end", &self.on_track_end.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}
