//! Transition: live playback state for one animation chain.
//!
//! A transition owns its track queue and a playback cursor (track index,
//! timer, direction, loop budget, speed). `advance` moves the cursor by one
//! signed step and resolves every resulting boundary crossing before
//! returning; `seek` does the same for arbitrary-magnitude scrubs, using
//! modulo arithmetic so looping tracks absorb any offset in O(1).
//!
//! Invariants on return from `advance`/`seek`:
//! - `0 <= index < queue.len()`
//! - `0 <= timer <= queue[index].duration`, except the terminal parked
//!   states which sit exactly on an edge.

use std::fmt;

use crate::interp::LerpFn;
use crate::track::{RepeatMode, Track, TrackCallback};
use crate::value::Value;

/// Completion flag for the removal protocol between a transition and its
/// registry. `Finished` managers are removed after the current pass;
/// `Rescued` means a callback re-initialized the manager while it was
/// finished, so it stays resident.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Finished,
    Rescued,
}

/// Sign-normalizing float modulo; the result carries the sign of `b`.
/// A zero divisor yields zero so instant tracks never fault.
fn fmod(a: f32, b: f32) -> f32 {
    if b == 0.0 {
        return 0.0;
    }
    let m = a % b;
    if (m < 0.0 && b > 0.0) || (m > 0.0 && b < 0.0) {
        m + b
    } else {
        m
    }
}

/// Live playback state for one keyed chain.
pub struct Transition {
    pub(crate) queue: Vec<Track>,
    index: usize,
    timer: f32,
    direction: f32,
    loops_remaining: i32,
    pub(crate) speed: f32,
    pub(crate) paused: bool,
    phase: Phase,
    finished: bool,
    current: Value,
    pub(crate) lerp: LerpFn,
    pub(crate) start_paused: bool,
    pub(crate) on_sequence_end: Option<TrackCallback>,
    /// Bumped by every re-initialization; lets in-flight boundary handling
    /// detect that a callback took over the cursor.
    init_serial: u32,
}

impl Transition {
    pub(crate) fn new(lerp: LerpFn, start_paused: bool) -> Self {
        Self {
            queue: vec![Track::default()],
            index: 0,
            timer: 0.0,
            direction: 1.0,
            loops_remaining: 1,
            speed: 1.0,
            paused: start_paused,
            phase: Phase::Running,
            finished: false,
            current: Value::Scalar(0.0),
            lerp,
            start_paused,
            on_sequence_end: None,
            init_serial: 0,
        }
    }

    // ---- observation ----

    pub fn value(&self) -> &Value {
        &self.current
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn loops_remaining(&self) -> i32 {
        self.loops_remaining
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True once the chain has completed forward, whether through playback
    /// or a seek that ran off the end.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn track_count(&self) -> usize {
        self.queue.len()
    }

    pub fn current_track(&self) -> &Track {
        &self.queue[self.index]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.queue
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn reset_phase(&mut self) {
        self.phase = Phase::Running;
    }

    pub(crate) fn at_last_track(&self) -> bool {
        self.index + 1 == self.queue.len()
    }

    // ---- playback controls ----

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Nudge the speed toward `target` by the fraction `rate` per call; the
    /// spring-like follow convenience layered on the speed surface.
    pub fn follow_speed(&mut self, target: f32, rate: f32) {
        self.speed += (target - self.speed) * rate.clamp(0.0, 1.0);
    }

    /// Reinitialize to track 0 and re-apply the configured start pause
    /// state. Clears a pending completion, so calling this from an
    /// end-of-sequence callback keeps the manager resident.
    pub fn rewind(&mut self) {
        self.init_track(0, 0.0, false);
        self.paused = self.start_paused;
    }

    /// Move exactly one track forward. At the last track this is a no-op;
    /// the registry promotes it to a fast-forward there.
    pub(crate) fn skip_forward(&mut self) {
        if self.index + 1 < self.queue.len() {
            let next = self.index + 1;
            self.init_track(next, 0.0, false);
        }
    }

    /// Move exactly one track backward; at track 0 the first track restarts.
    pub fn step_back(&mut self) {
        let prev = self.index.saturating_sub(1);
        self.init_track(prev, 0.0, false);
    }

    /// Jump to the end of the final track, adopt its raw `to` value without
    /// easing, and fire the end-of-sequence callback. The registry removes
    /// the manager unconditionally afterwards.
    pub(crate) fn fast_forward(&mut self) {
        self.index = self.queue.len() - 1;
        let track = &self.queue[self.index];
        self.timer = track.duration.max(0.0);
        self.direction = 1.0;
        self.loops_remaining = 0;
        if let Some(to) = track.to.clone() {
            self.current = to;
        }
        self.finished = true;
        self.phase = Phase::Finished;
        self.fire_sequence_end();
    }

    pub(crate) fn fire_sequence_end_now(&mut self) {
        self.fire_sequence_end();
    }

    // ---- cursor initialization ----

    /// Place the cursor at `index` with a carried offset. Forward entry
    /// expects `carry >= 0` and lands at `timer = carry`; backward entry
    /// expects `carry <= 0` and lands at `timer = duration + carry`, with
    /// the direction reversed only when the new track ping-pongs. The
    /// current value is recomputed immediately so reads never observe a
    /// stale track.
    pub(crate) fn init_track(&mut self, index: usize, carry: f32, entered_backward: bool) {
        self.init_serial = self.init_serial.wrapping_add(1);
        self.index = index.min(self.queue.len() - 1);
        let track = &self.queue[self.index];
        self.loops_remaining = track.initial_plays();
        let d = track.duration.max(0.0);
        if entered_backward {
            self.timer = d + carry.min(0.0);
            self.direction = if track.repeat == RepeatMode::PingPong {
                -1.0
            } else {
                1.0
            };
        } else {
            self.timer = carry.max(0.0);
            self.direction = 1.0;
        }
        self.finished = false;
        if self.phase == Phase::Finished {
            self.phase = Phase::Rescued;
        }
        self.refresh_value();
    }

    /// Keep the cursor coherent while the builder shapes the first track.
    pub(crate) fn sync_first_track(&mut self) {
        if self.queue.len() == 1 {
            self.loops_remaining = self.queue[0].initial_plays();
            self.refresh_value();
        }
    }

    // ---- per-tick advancement ----

    /// Advance by one host step. No-op while paused. The signed step is
    /// `dt * speed * direction`; every boundary the step crosses is resolved
    /// before returning, including carry-over across track edges.
    pub fn advance(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.timer += dt * self.speed * self.direction;
        self.resolve_advance();
        if self.phase != Phase::Finished {
            self.refresh_value();
            self.fire_on_update();
        }
    }

    fn resolve_advance(&mut self) {
        loop {
            let d = self.queue[self.index].duration.max(0.0);
            let repeat = self.queue[self.index].repeat;
            let wait = self.queue[self.index].is_wait;

            // Forward edge. Landing exactly on the edge counts only while
            // moving forward; a ping-pong reflection parks there without
            // re-triggering.
            if self.timer >= d && (self.timer > d || self.direction > 0.0) {
                if wait {
                    let overflow = self.timer - d;
                    self.direction = 1.0;
                    if !self.advance_track(overflow) {
                        return;
                    }
                    continue;
                }
                match repeat {
                    RepeatMode::Hold => {
                        self.timer = d;
                        return;
                    }
                    RepeatMode::Loop if d > 0.0 => {
                        if self.loops_remaining > 0 {
                            self.loops_remaining -= 1;
                        }
                        if self.loops_remaining != 0 {
                            self.timer -= d;
                            continue;
                        }
                        let overflow = self.timer - d;
                        if !self.advance_track(overflow) {
                            return;
                        }
                        continue;
                    }
                    RepeatMode::PingPong if d > 0.0 => {
                        if self.loops_remaining != 0 {
                            if self.loops_remaining > 0 {
                                self.loops_remaining -= 1;
                            }
                            self.timer = d - (self.timer - d);
                            self.direction = -1.0;
                            continue;
                        }
                        let overflow = self.timer - d;
                        if !self.advance_track(overflow) {
                            return;
                        }
                        continue;
                    }
                    // Once, and degenerate zero-duration loops.
                    _ => {
                        let overflow = self.timer - d;
                        if !self.advance_track(overflow) {
                            return;
                        }
                        continue;
                    }
                }
            } else if self.timer < 0.0 {
                if wait {
                    let underflow = self.timer;
                    self.direction = 1.0;
                    if !self.retreat_track(underflow) {
                        return;
                    }
                    continue;
                }
                match repeat {
                    RepeatMode::Hold => {
                        self.timer = 0.0;
                        return;
                    }
                    RepeatMode::Loop if d > 0.0 => {
                        if self.loops_remaining > 0 {
                            self.loops_remaining -= 1;
                        }
                        if self.loops_remaining != 0 {
                            self.timer += d;
                            continue;
                        }
                        let underflow = self.timer;
                        if !self.retreat_track(underflow) {
                            return;
                        }
                        continue;
                    }
                    RepeatMode::PingPong if d > 0.0 => {
                        if self.loops_remaining != 0 {
                            // Near-edge reflection closes a cycle without
                            // consuming budget; only far-edge flips do.
                            self.timer = -self.timer;
                            self.direction = 1.0;
                            continue;
                        }
                        if self.speed >= 0.0 {
                            // Final return pass complete: the chain moves on.
                            let overflow = -self.timer;
                            self.direction = 1.0;
                            if !self.advance_track(overflow) {
                                return;
                            }
                        } else {
                            let underflow = self.timer;
                            if !self.retreat_track(underflow) {
                                return;
                            }
                        }
                        continue;
                    }
                    _ => {
                        let underflow = self.timer;
                        if !self.retreat_track(underflow) {
                            return;
                        }
                        continue;
                    }
                }
            } else {
                return;
            }
        }
    }

    /// Complete the current track and move forward. Fires the track's end
    /// callback; with no next track the chain finishes and the
    /// end-of-sequence callback runs, with rescue honored. Returns false
    /// when resolution must stop.
    fn advance_track(&mut self, overflow: f32) -> bool {
        let serial = self.init_serial;
        self.fire_track_end(self.index);
        if self.init_serial != serial {
            // A callback re-initialized the cursor; resolution continues on
            // the new state and the carried offset is discarded.
            return true;
        }
        if self.index + 1 < self.queue.len() {
            let next = self.index + 1;
            self.init_track(next, overflow.max(0.0), false);
            true
        } else {
            self.timer = self.queue[self.index].duration.max(0.0);
            self.direction = 1.0;
            self.refresh_value();
            self.finished = true;
            self.phase = Phase::Finished;
            self.fire_sequence_end();
            false
        }
    }

    /// Move backward across the near edge. Backward motion never completes
    /// a chain and fires no callbacks; at track 0 the cursor settles on the
    /// wall. Returns false when resolution must stop.
    fn retreat_track(&mut self, underflow: f32) -> bool {
        if self.index == 0 {
            self.timer = 0.0;
            self.direction = 1.0;
            false
        } else {
            let prev = self.index - 1;
            self.init_track(prev, underflow.min(0.0), true);
            true
        }
    }

    // ---- seeking ----

    /// Scrub by a signed amount, resolving every crossed boundary. Looping
    /// tracks with budget remaining absorb the offset via modulo without
    /// consuming budget. Running off the end parks the cursor there, marks
    /// the chain finished, and pauses the manager; it stays resident and
    /// inspectable. Seeks fire no callbacks.
    pub fn seek(&mut self, amount: f32) {
        self.init_serial = self.init_serial.wrapping_add(1);
        self.timer += amount;
        self.finished = false;
        let ran_off_end = self.resolve_seek();
        self.refresh_value();
        if self.phase == Phase::Finished {
            // Called from inside an end-of-sequence callback: rescue.
            self.phase = Phase::Rescued;
        }
        if ran_off_end {
            self.finished = true;
            self.paused = true;
        }
    }

    fn resolve_seek(&mut self) -> bool {
        loop {
            let d = self.queue[self.index].duration.max(0.0);
            let repeat = self.queue[self.index].repeat;

            if self.timer > d {
                match repeat {
                    RepeatMode::Hold => {
                        self.timer = d;
                        return false;
                    }
                    RepeatMode::Loop if self.loops_remaining != 0 && d > 0.0 => {
                        self.timer = fmod(self.timer, d);
                        self.direction = 1.0;
                        return false;
                    }
                    RepeatMode::PingPong if self.loops_remaining != 0 && d > 0.0 => {
                        let wrapped = fmod(self.timer, 2.0 * d);
                        if wrapped > d {
                            self.timer = 2.0 * d - wrapped;
                            self.direction = -1.0;
                        } else {
                            self.timer = wrapped;
                            self.direction = 1.0;
                        }
                        return false;
                    }
                    _ => {
                        if self.index + 1 < self.queue.len() {
                            let overflow = self.timer - d;
                            let next = self.index + 1;
                            self.init_track(next, overflow, false);
                            continue;
                        }
                        self.timer = d;
                        self.direction = 1.0;
                        return true;
                    }
                }
            } else if self.timer < 0.0 {
                match repeat {
                    RepeatMode::Hold => {
                        self.timer = 0.0;
                        return false;
                    }
                    RepeatMode::Loop if self.loops_remaining != 0 && d > 0.0 => {
                        self.timer = fmod(self.timer, d);
                        self.direction = 1.0;
                        return false;
                    }
                    RepeatMode::PingPong if self.loops_remaining != 0 && d > 0.0 => {
                        let wrapped = fmod(self.timer, 2.0 * d);
                        if wrapped > d {
                            self.timer = 2.0 * d - wrapped;
                            self.direction = -1.0;
                        } else {
                            self.timer = wrapped;
                            self.direction = 1.0;
                        }
                        return false;
                    }
                    _ => {
                        if self.index > 0 {
                            let underflow = self.timer;
                            let prev = self.index - 1;
                            self.init_track(prev, underflow, true);
                            continue;
                        }
                        // Backward exhaustion never finishes a chain.
                        self.timer = 0.0;
                        self.direction = 1.0;
                        return false;
                    }
                }
            } else {
                return false;
            }
        }
    }

    // ---- value computation ----

    /// Recompute the current value from the cursor position. Idempotent:
    /// the value is a pure function of (track, timer). Wait tracks leave
    /// the previous value untouched. An absent `from` materializes at `to`,
    /// an absent `to` holds `from`.
    pub(crate) fn refresh_value(&mut self) {
        let lerp = self.lerp;
        let next = {
            let track = &self.queue[self.index];
            if track.is_wait {
                return;
            }
            let d = track.duration;
            let progress = if d <= 0.0 {
                1.0
            } else {
                (self.timer / d).clamp(0.0, 1.0)
            };
            let eased = track.ease.eval(progress);
            match (track.from.as_ref(), track.to.as_ref()) {
                (Some(a), Some(b)) => lerp(a, b, eased),
                (None, Some(b)) => lerp(b, b, eased),
                (Some(a), None) => a.clone(),
                (None, None) => return,
            }
        };
        self.current = next;
    }

    // ---- callback plumbing ----

    fn fire_track_end(&mut self, index: usize) {
        let Some(mut cb) = self
            .queue
            .get_mut(index)
            .and_then(|t| t.on_track_end.take())
        else {
            return;
        };
        cb(self);
        if let Some(slot) = self.queue.get_mut(index) {
            if slot.on_track_end.is_none() {
                slot.on_track_end = Some(cb);
            }
        }
    }

    fn fire_on_update(&mut self) {
        if self.queue[self.index].is_wait {
            return;
        }
        let index = self.index;
        let Some(mut cb) = self.queue.get_mut(index).and_then(|t| t.on_update.take()) else {
            return;
        };
        cb(self);
        if let Some(slot) = self.queue.get_mut(index) {
            if slot.on_update.is_none() {
                slot.on_update = Some(cb);
            }
        }
    }

    fn fire_sequence_end(&mut self) {
        let Some(mut cb) = self.on_sequence_end.take() else {
            return;
        };
        cb(self);
        if self.on_sequence_end.is_none() {
            self.on_sequence_end = Some(cb);
        }
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("tracks", &self.queue.len())
            .field("index", &self.index)
            .field("timer", &self.timer)
            .field("direction", &self.direction)
            .field("loops_remaining", &self.loops_remaining)
            .field("speed", &self.speed)
            .field("paused", &self.paused)
            .field("phase", &self.phase)
            .field("finished", &self.finished)
            .field("current", &self.current)
            .field("on_sequence_end", &self.on_sequence_end.is_some())
            .finish()
    }
}
