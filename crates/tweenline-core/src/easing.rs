//! Easing catalog and per-track easing sources.
//!
//! Every catalog entry maps progress in [0,1] to an eased weight with
//! `f(0) = 0` and `f(1) = 1`. Elastic and back overshoot outside [0,1]
//! between the endpoints. Input is clamped to [0,1] before evaluation.

use std::f32::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::curve::{eval_channel, CurveChannel};

/// Overshoot constant shared by the back family.
const BACK_C1: f32 = 1.70158;
/// Bounce parabola scale and interval divisor.
const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;

/// The fixed easing catalog.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    InSine,
    OutSine,
    InOutSine,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
    InExpo,
    OutExpo,
    InOutExpo,
    InCirc,
    OutCirc,
    InOutCirc,
    InElastic,
    OutElastic,
    InOutElastic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
}

impl Easing {
    /// All catalog entries, in declaration order. Used by property tests and
    /// tooling that enumerates the catalog.
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::InSine,
        Easing::OutSine,
        Easing::InOutSine,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
        Easing::InQuint,
        Easing::OutQuint,
        Easing::InOutQuint,
        Easing::InExpo,
        Easing::OutExpo,
        Easing::InOutExpo,
        Easing::InCirc,
        Easing::OutCirc,
        Easing::InOutCirc,
        Easing::InElastic,
        Easing::OutElastic,
        Easing::InOutElastic,
        Easing::InBack,
        Easing::OutBack,
        Easing::InOutBack,
        Easing::InBounce,
        Easing::OutBounce,
        Easing::InOutBounce,
    ];

    /// Evaluate the curve at progress `t`, clamped to [0,1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,

            Easing::InSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::OutSine => (t * PI / 2.0).sin(),
            Easing::InOutSine => -((PI * t).cos() - 1.0) / 2.0,

            Easing::InQuad => t * t,
            Easing::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }

            Easing::InCubic => t * t * t,
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }

            Easing::InQuart => t.powi(4),
            Easing::OutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::InOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }

            Easing::InQuint => t.powi(5),
            Easing::OutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::InOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }

            Easing::InExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * t - 10.0)
                }
            }
            Easing::OutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Easing::InOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }

            Easing::InCirc => 1.0 - (1.0 - t * t).sqrt(),
            Easing::OutCirc => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
            Easing::InOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }

            Easing::InElastic => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
                }
            }
            Easing::OutElastic => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Easing::InOutElastic => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    let c5 = (2.0 * PI) / 4.5;
                    if t < 0.5 {
                        -(2.0_f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                    } else {
                        2.0_f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * c5).sin() / 2.0
                            + 1.0
                    }
                }
            }

            Easing::InBack => {
                let c3 = BACK_C1 + 1.0;
                c3 * t * t * t - BACK_C1 * t * t
            }
            Easing::OutBack => {
                let c3 = BACK_C1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            Easing::InOutBack => {
                let c2 = BACK_C1 * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (2.0 * t - 2.0) + c2) + 2.0) / 2.0
                }
            }

            // The in/in-out bounces are reflections of the out bounce so the
            // interval constants live in one place.
            Easing::InBounce => 1.0 - bounce_out(1.0 - t),
            Easing::OutBounce => bounce_out(t),
            Easing::InOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

/// Piecewise bounce: four quadratic arcs over [0, 1/2.75), [1/2.75, 2/2.75),
/// [2/2.75, 2.5/2.75), and the remainder.
fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

/// Per-track easing source: a catalog entry, an opaque function, or an
/// externally authored curve channel. The `Curve` variant is tagged so
/// evaluation dispatches to channel sampling rather than a function call.
#[derive(Clone, Debug)]
pub enum Ease {
    Preset(Easing),
    Function(fn(f32) -> f32),
    Curve(Arc<CurveChannel>),
}

impl Default for Ease {
    fn default() -> Self {
        Ease::Preset(Easing::Linear)
    }
}

impl Ease {
    /// Evaluate the eased weight for a progress in [0,1].
    #[inline]
    pub fn eval(&self, t: f32) -> f32 {
        match self {
            Ease::Preset(e) => e.apply(t),
            Ease::Function(f) => f(t.clamp(0.0, 1.0)),
            Ease::Curve(channel) => eval_channel(channel, t),
        }
    }
}

impl From<Easing> for Ease {
    fn from(e: Easing) -> Self {
        Ease::Preset(e)
    }
}

impl From<fn(f32) -> f32> for Ease {
    fn from(f: fn(f32) -> f32) -> Self {
        Ease::Function(f)
    }
}
