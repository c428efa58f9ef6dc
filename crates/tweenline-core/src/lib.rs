//! Tweenline Core (host-agnostic)
//!
//! A keyframe-free tween sequencing engine: symbolic endpoints, a duration,
//! and an easing curve produce a continuously updated value over time,
//! organized into chains of tracks that loop, ping-pong, hold, wait, or get
//! scrubbed like a tape deck. Hosts drive one `Registry` per animation
//! domain from their own update loop; there is no internal threading and no
//! persisted state.
//!
//! ```
//! use tweenline_core::{Easing, Registry, Value};
//!
//! let mut reg = Registry::new();
//! reg.transition("fade")
//!     .from(0.0)
//!     .to(100.0)
//!     .duration(10.0)
//!     .ease(Easing::InQuad);
//! reg.update(5.0);
//! assert_eq!(reg.get_value("fade", Value::f(0.0)), Value::f(25.0));
//! ```

pub mod builder;
pub mod config;
pub mod curve;
pub mod easing;
pub mod interp;
pub mod registry;
pub mod scheduler;
pub mod track;
pub mod transition;
pub mod value;

// Re-exports for consumers (hosts and adapters)
pub use builder::ChainBuilder;
pub use config::Config;
pub use curve::{parse_curve_asset_json, CurveAsset, CurveChannel, CurveError, CurvePoint};
pub use easing::{Ease, Easing};
pub use interp::{lerp_value, step_value, LerpFn};
pub use registry::{Keys, Registry};
pub use scheduler::Scheduler;
pub use track::{RepeatMode, Track, TrackCallback};
pub use transition::{Phase, Transition};
pub use value::{Fields, Value, ValueKind};
