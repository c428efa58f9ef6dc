//! Registry: named transitions multiplexed through one update loop.
//!
//! The registry owns every active manager, keyed by string. Playback
//! controls share one dispatch contract: they take a key selector (all
//! keys, one key, or a list) and silently skip keys that no longer resolve.
//! The update pass iterates a snapshot of the key list and re-checks
//! existence per key, so a scheduled action or completion removing entries
//! mid-pass can never skip or double-process a manager.

use std::sync::Arc;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::builder::ChainBuilder;
use crate::config::Config;
use crate::curve::CurveAsset;
use crate::easing::Ease;
use crate::interp::{lerp_value, LerpFn};
use crate::scheduler::Scheduler;
use crate::transition::{Phase, Transition};
use crate::value::Value;

/// Key selection for bulk playback controls.
#[derive(Clone, Copy, Debug)]
pub enum Keys<'a> {
    All,
    One(&'a str),
    Many(&'a [&'a str]),
}

impl<'a> From<&'a str> for Keys<'a> {
    fn from(key: &'a str) -> Self {
        Keys::One(key)
    }
}

impl<'a> From<&'a String> for Keys<'a> {
    fn from(key: &'a String) -> Self {
        Keys::One(key.as_str())
    }
}

impl<'a> From<&'a [&'a str]> for Keys<'a> {
    fn from(keys: &'a [&'a str]) -> Self {
        Keys::Many(keys)
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for Keys<'a> {
    fn from(keys: &'a [&'a str; N]) -> Self {
        Keys::Many(keys.as_slice())
    }
}

/// Owner of all active transitions for one animation domain. Hosts hold one
/// registry per independent domain (a screen, an entity pool) or a single
/// shared one; ownership is explicit either way.
#[derive(Debug, Default)]
pub struct Registry {
    cfg: Config,
    items: HashMap<String, Transition>,
    /// Insertion order of keys; cloned as the iteration snapshot.
    order: Vec<String>,
    scheduler: Scheduler,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: Config) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of active managers.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ---- creation ----

    /// Create (or replace) the manager under `key` and return its chain
    /// builder. The manager starts paused unless `auto_start` is set.
    pub fn transition(&mut self, key: &str) -> ChainBuilder<'_> {
        let lerp = self.cfg.default_lerp.unwrap_or(lerp_value);
        self.insert_manager(key, lerp)
    }

    /// Like `transition` with an explicit interpolation strategy.
    pub fn transition_with(&mut self, key: &str, lerp: LerpFn) -> ChainBuilder<'_> {
        self.insert_manager(key, lerp)
    }

    fn insert_manager(&mut self, key: &str, lerp: LerpFn) -> ChainBuilder<'_> {
        let tr = Transition::new(lerp, !self.cfg.auto_start);
        match self.items.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(tr);
                ChainBuilder::new(occupied.into_mut())
            }
            Entry::Vacant(vacant) => {
                self.order.push(key.to_string());
                ChainBuilder::new(vacant.insert(tr))
            }
        }
    }

    // ---- the update tick ----

    /// Advance every unpaused manager by one step. `dt` is the measured
    /// elapsed time, ignored in fixed-tick mode. Scheduled actions come due
    /// first, then managers advance over a key snapshot; managers whose
    /// chain completed are removed unless a callback rescued them.
    pub fn update(&mut self, dt: f32) {
        let step = if self.cfg.use_elapsed_time { dt } else { 1.0 };

        for action in self.scheduler.tick(step) {
            action(self);
        }

        let keys: Vec<String> = self.order.clone();
        for key in &keys {
            let phase = match self.items.get_mut(key) {
                Some(tr) => {
                    if tr.is_paused() {
                        continue;
                    }
                    tr.advance(step);
                    tr.phase()
                }
                None => continue,
            };
            match phase {
                Phase::Finished => self.remove_key(key),
                Phase::Rescued => {
                    if let Some(tr) = self.items.get_mut(key) {
                        tr.reset_phase();
                    }
                }
                Phase::Running => {}
            }
        }
    }

    fn remove_key(&mut self, key: &str) {
        self.items.remove(key);
        self.order.retain(|k| k != key);
    }

    // ---- key selection plumbing ----

    fn selected(&self, keys: Keys<'_>) -> Vec<String> {
        match keys {
            Keys::All => self.order.clone(),
            Keys::One(key) => vec![key.to_string()],
            Keys::Many(keys) => keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn for_each<'k>(&mut self, keys: impl Into<Keys<'k>>, mut f: impl FnMut(&mut Transition)) {
        for key in self.selected(keys.into()) {
            if let Some(tr) = self.items.get_mut(&key) {
                f(tr);
            }
        }
    }

    // ---- playback controls ----

    pub fn play<'k>(&mut self, keys: impl Into<Keys<'k>>) {
        self.for_each(keys, |tr| tr.play());
    }

    pub fn pause<'k>(&mut self, keys: impl Into<Keys<'k>>) {
        self.for_each(keys, |tr| tr.pause());
    }

    /// Remove the selected managers immediately, optionally firing their
    /// end-of-sequence callbacks first. A stopped manager is already out of
    /// the registry when its callback runs, so there is no rescue path.
    pub fn stop<'k>(&mut self, keys: impl Into<Keys<'k>>, trigger_callback: bool) {
        for key in self.selected(keys.into()) {
            let Some(mut tr) = self.items.remove(&key) else {
                continue;
            };
            self.order.retain(|k| k != &key);
            if trigger_callback {
                tr.fire_sequence_end_now();
            }
        }
    }

    /// Jump the selected managers to the end of their final track, adopt
    /// the raw target value, fire the end callback, and remove them
    /// unconditionally.
    pub fn ffwd<'k>(&mut self, keys: impl Into<Keys<'k>>) {
        for key in self.selected(keys.into()) {
            let Some(mut tr) = self.items.remove(&key) else {
                continue;
            };
            self.order.retain(|k| k != &key);
            tr.fast_forward();
        }
    }

    /// Reinitialize the selected managers to track 0, re-applying the
    /// auto-start pause state.
    pub fn rewind<'k>(&mut self, keys: impl Into<Keys<'k>>) {
        self.for_each(keys, |tr| tr.rewind());
    }

    /// Move one track forward; at the last track this behaves like `ffwd`.
    pub fn skip<'k>(&mut self, keys: impl Into<Keys<'k>>) {
        for key in self.selected(keys.into()) {
            let at_last = match self.items.get(&key) {
                Some(tr) => tr.at_last_track(),
                None => continue,
            };
            if at_last {
                if let Some(mut tr) = self.items.remove(&key) {
                    self.order.retain(|k| k != &key);
                    tr.fast_forward();
                }
            } else if let Some(tr) = self.items.get_mut(&key) {
                tr.skip_forward();
            }
        }
    }

    /// Move one track backward; at track 0 the first track restarts.
    pub fn back<'k>(&mut self, keys: impl Into<Keys<'k>>) {
        self.for_each(keys, |tr| tr.step_back());
    }

    /// Scrub the selected managers by a signed amount.
    pub fn seek<'k>(&mut self, amount: f32, keys: impl Into<Keys<'k>>) {
        self.for_each(keys, |tr| tr.seek(amount));
    }

    pub fn set_speed<'k>(&mut self, speed: f32, keys: impl Into<Keys<'k>>) {
        self.for_each(keys, |tr| tr.set_speed(speed));
    }

    /// Nudge the selected managers' speed toward `target` by the fraction
    /// `rate`; hosts feed this per tick to make playback follow an input.
    pub fn react<'k>(&mut self, target: f32, rate: f32, keys: impl Into<Keys<'k>>) {
        self.for_each(keys, |tr| tr.follow_speed(target, rate));
    }

    // ---- lookups ----

    pub fn get(&self, key: &str) -> Option<&Transition> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Transition> {
        self.items.get_mut(key)
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.items.get(key).map(|tr| tr.value())
    }

    /// Current value under `key`, or `fallback` when the key is absent.
    /// Never an error: completed managers have left the registry.
    pub fn get_value(&self, key: &str, fallback: Value) -> Value {
        self.items
            .get(key)
            .map(|tr| tr.value().clone())
            .unwrap_or(fallback)
    }

    /// Scalar convenience over `get_value`; composites also resolve to the
    /// fallback.
    pub fn get_scalar(&self, key: &str, fallback: f32) -> f32 {
        self.items
            .get(key)
            .and_then(|tr| tr.value().as_scalar())
            .unwrap_or(fallback)
    }

    pub fn speed(&self, key: &str) -> Option<f32> {
        self.items.get(key).map(|tr| tr.speed())
    }

    /// Whether every selected key is active (`Keys::All`: any manager at
    /// all).
    pub fn is_active<'k>(&self, keys: impl Into<Keys<'k>>) -> bool {
        match keys.into() {
            Keys::All => !self.items.is_empty(),
            Keys::One(key) => self.items.contains_key(key),
            Keys::Many(keys) => keys.iter().all(|k| self.items.contains_key(*k)),
        }
    }

    /// Whether the selection resolves to at least one manager and all of
    /// them are paused.
    pub fn is_paused<'k>(&self, keys: impl Into<Keys<'k>>) -> bool {
        let keys = self.selected(keys.into());
        let mut any = false;
        for key in &keys {
            match self.items.get(key) {
                Some(tr) => {
                    if !tr.is_paused() {
                        return false;
                    }
                    any = true;
                }
                None => continue,
            }
        }
        any
    }

    /// Active keys in insertion order.
    pub fn active_keys(&self) -> Vec<String> {
        self.order.clone()
    }

    // ---- conveniences ----

    /// Wrap a curve-asset channel as an easing source. `None` for an
    /// out-of-range index or an empty channel; callers check before use.
    pub fn custom(&self, asset: &CurveAsset, channel_index: usize) -> Option<Ease> {
        asset
            .channel(channel_index)
            .map(|channel| Ease::Curve(Arc::new(channel.clone())))
    }

    /// Run `action` against the registry once `delay` ticks have elapsed;
    /// the staggered-start convenience.
    pub fn after(&mut self, delay: f32, action: impl FnOnce(&mut Registry) + 'static) {
        self.scheduler.push(delay, Box::new(action));
    }
}
