//! Fluent chain configuration.
//!
//! `Registry::transition` hands out a `ChainBuilder` over the freshly
//! created manager. Builder calls shape the newest track; `next` opens
//! another segment and `wait` inserts a pure delay. The builder is a setup
//! façade only and is dropped once configuration ends.
//!
//! Misconfiguration is a programmer error and panics with a descriptive
//! message rather than being deferred to playback.

use crate::easing::Ease;
use crate::interp::LerpFn;
use crate::track::{RepeatMode, Track, TrackCallback};
use crate::transition::Transition;
use crate::value::Value;

/// Fluent configurator over one transition's track queue.
#[derive(Debug)]
pub struct ChainBuilder<'a> {
    tr: &'a mut Transition,
}

impl<'a> ChainBuilder<'a> {
    pub(crate) fn new(tr: &'a mut Transition) -> Self {
        Self { tr }
    }

    fn cur(&mut self) -> &mut Track {
        self.tr.queue.last_mut().expect("queue holds at least one track")
    }

    fn cur_tween(&mut self, what: &str) -> &mut Track {
        let track = self.cur();
        if track.is_wait {
            panic!("tweenline: cannot set {what} on a wait segment");
        }
        track
    }

    fn sync(&mut self) {
        self.tr.sync_first_track();
    }

    /// Starting endpoint of the newest track.
    pub fn from(mut self, value: impl Into<Value>) -> Self {
        self.cur_tween("`from`").from = Some(value.into());
        self.sync();
        self
    }

    /// Target endpoint of the newest track.
    pub fn to(mut self, value: impl Into<Value>) -> Self {
        self.cur_tween("`to`").to = Some(value.into());
        self.sync();
        self
    }

    /// Track length in ticks; zero or negative means instant.
    pub fn duration(mut self, ticks: f32) -> Self {
        self.cur().duration = ticks;
        self.sync();
        self
    }

    /// Easing source: a catalog entry, a bare function, or a curve adapter
    /// obtained from `Registry::custom`.
    pub fn ease(mut self, ease: impl Into<Ease>) -> Self {
        self.cur_tween("`ease`").ease = ease.into();
        self.sync();
        self
    }

    /// Repeat the newest track `n` more times before moving on (a total of
    /// `n + 1` plays); negative repeats forever.
    pub fn repeat(mut self, n: i32) -> Self {
        let track = self.cur_tween("`repeat`");
        track.repeat = RepeatMode::Loop;
        track.plays = if n < 0 { -1 } else { n + 1 };
        self.sync();
        self
    }

    pub fn repeat_forever(self) -> Self {
        self.repeat(-1)
    }

    /// Ping-pong the newest track for `n` full out-and-back cycles;
    /// negative cycles forever.
    pub fn pingpong(mut self, n: i32) -> Self {
        let track = self.cur_tween("`pingpong`");
        track.repeat = RepeatMode::PingPong;
        track.plays = if n < 0 { -1 } else { n };
        self.sync();
        self
    }

    pub fn pingpong_forever(self) -> Self {
        self.pingpong(-1)
    }

    /// Clamp at the newest track's far edge indefinitely instead of
    /// completing.
    pub fn hold(mut self) -> Self {
        self.cur_tween("`hold`").repeat = RepeatMode::Hold;
        self.sync();
        self
    }

    /// Append a pure delay segment. A freshly opened, untouched segment is
    /// claimed in place.
    pub fn wait(mut self, ticks: f32) -> Self {
        if self.cur().is_vacant() {
            *self.cur() = Track::wait(ticks);
        } else {
            self.tr.queue.push(Track::wait(ticks));
        }
        self.sync();
        self
    }

    /// Open the next segment of the chain.
    pub fn next(self) -> Self {
        self.tr.queue.push(Track::new());
        self
    }

    /// Diagnostic name for the newest track.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.cur().label = Some(label.into());
        self
    }

    /// Hook fired when the newest track completes forward.
    pub fn on_track_end(mut self, cb: impl FnMut(&mut Transition) + 'static) -> Self {
        self.cur().on_track_end = Some(Box::new(cb) as TrackCallback);
        self
    }

    /// Hook fired after each value recomputation on the newest track.
    pub fn on_update(mut self, cb: impl FnMut(&mut Transition) + 'static) -> Self {
        self.cur().on_update = Some(Box::new(cb) as TrackCallback);
        self
    }

    /// Hook fired when the whole chain completes forward.
    pub fn on_sequence_end(self, cb: impl FnMut(&mut Transition) + 'static) -> Self {
        self.tr.on_sequence_end = Some(Box::new(cb) as TrackCallback);
        self
    }

    /// Install a custom interpolation strategy for this transition.
    pub fn lerp_with(self, lerp: LerpFn) -> Self {
        self.tr.lerp = lerp;
        self.tr.sync_first_track();
        self
    }

    /// Initial playback speed multiplier.
    pub fn speed(self, speed: f32) -> Self {
        self.tr.speed = speed;
        self
    }
}
