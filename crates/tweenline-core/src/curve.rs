//! Externally authored easing curves.
//!
//! Model:
//! - A `CurveAsset` holds one or more named channels.
//! - Each `CurveChannel` has ordered `CurvePoint`s with normalized stamps in
//!   [0,1].
//! - Segment [Pi -> P(i+1)] timing is a cubic-bezier determined by:
//!   cp0 = Pi.transitions.out or default {x:0.42, y:0.0}
//!   cp1 = P(i+1).transitions.in or default {x:0.58, y:1.0}
//!
//! A channel is consumed through the same `[0,1] -> R` contract as the
//! built-in catalog; `eval_channel` inverts the x-bezier by binary search and
//! blends point values with the resulting timing weight.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_OUT_X: f32 = 0.42;
const DEFAULT_OUT_Y: f32 = 0.0;
const DEFAULT_IN_X: f32 = 0.58;
const DEFAULT_IN_Y: f32 = 1.0;

/// 2D control point in the normalized 0..1 domain.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ControlPoint {
    pub x: f32,
    pub y: f32,
}

/// Per-point transitions: control points for cubic-bezier timing.
/// `in` shapes arrival at this point, `out` shapes departure from it.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Transitions {
    #[serde(default)]
    #[serde(rename = "in")]
    pub r#in: Option<ControlPoint>,
    #[serde(default)]
    #[serde(rename = "out")]
    pub r#out: Option<ControlPoint>,
}

/// A single curve point at a normalized stamp in [0,1].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    pub stamp: f32,
    pub value: f32,
    #[serde(default)]
    pub transitions: Option<Transitions>,
}

/// One evaluable channel of a curve asset.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CurveChannel {
    #[serde(default)]
    pub name: Option<String>,
    pub points: Vec<CurvePoint>,
}

/// An authored curve asset with one channel per animatable quantity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurveAsset {
    pub name: String,
    pub channels: Vec<CurveChannel>,
}

/// Errors produced while loading curve-asset JSON.
#[derive(Debug, Error)]
pub enum CurveError {
    #[error("curve json parse error: {0}")]
    Parse(String),
    #[error("curve '{0}': {1}")]
    Invalid(String, String),
}

impl CurveAsset {
    /// Validate basic invariants (finite stamps in [0,1], non-decreasing).
    pub fn validate_basic(&self) -> Result<(), CurveError> {
        for (idx, channel) in self.channels.iter().enumerate() {
            let label = channel
                .name
                .clone()
                .unwrap_or_else(|| format!("channel {idx}"));
            let mut last = -f32::INFINITY;
            for p in &channel.points {
                if !p.stamp.is_finite() || p.stamp < 0.0 || p.stamp > 1.0 {
                    return Err(CurveError::Invalid(
                        self.name.clone(),
                        format!("{label}: stamp must be finite and in [0,1]"),
                    ));
                }
                if p.stamp < last {
                    return Err(CurveError::Invalid(
                        self.name.clone(),
                        format!("{label}: stamps must be non-decreasing"),
                    ));
                }
                last = p.stamp;
            }
        }
        Ok(())
    }

    /// Channel accessor used by the registry's `custom` adapter: `None` for
    /// an out-of-range index or an empty channel, so callers can check
    /// before wiring the easing in.
    pub fn channel(&self, index: usize) -> Option<&CurveChannel> {
        let channel = self.channels.get(index)?;
        if channel.points.is_empty() {
            return None;
        }
        Some(channel)
    }
}

/// Parse curve-asset JSON into a validated `CurveAsset`.
pub fn parse_curve_asset_json(s: &str) -> Result<CurveAsset, CurveError> {
    let asset: CurveAsset =
        serde_json::from_str(s).map_err(|e| CurveError::Parse(e.to_string()))?;
    asset.validate_basic()?;
    Ok(asset)
}

/// Find the segment [i, i+1] containing normalized time u, returning
/// (i, i+1, local_t) with local_t normalized into the segment. When u falls
/// outside the stamped range, both indices name the clamped end point.
fn find_segment(points: &[CurvePoint], u: f32) -> (usize, usize, f32) {
    let n = points.len();
    if n == 0 {
        return (0, 0, 0.0);
    }
    if n == 1 || u <= points[0].stamp {
        return (0, 0, 0.0);
    }
    if u >= points[n - 1].stamp {
        return (n - 1, n - 1, 0.0);
    }
    for i in 0..(n - 1) {
        let t0 = points[i].stamp;
        let t1 = points[i + 1].stamp;
        if u >= t0 && u <= t1 {
            let denom = (t1 - t0).max(f32::EPSILON);
            let lt = (u - t0) / denom;
            return (i, i + 1, lt.clamp(0.0, 1.0));
        }
    }
    (n - 1, n - 1, 0.0)
}

/// Cubic bezier basis function.
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1], compute
/// the eased weight by inverting the x bezier via binary search.
#[inline]
fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    // Bezier(0,0,1,1) is exactly linear.
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

/// Sample a channel at normalized time u in [0,1].
///
/// Empty channels evaluate to 0.0 (fail-soft; the `custom` adapter refuses
/// them up front, this is only reachable through hand-built channels).
pub fn eval_channel(channel: &CurveChannel, u: f32) -> f32 {
    let points = &channel.points;
    match points.len() {
        0 => 0.0,
        1 => points[0].value,
        _ => {
            let (i0, i1, lt) = find_segment(points, u.clamp(0.0, 1.0));
            if i0 == i1 {
                return points[i0].value;
            }
            let left = &points[i0];
            let right = &points[i1];

            let (x1, y1) = left
                .transitions
                .as_ref()
                .and_then(|t| t.r#out.as_ref())
                .map(|v| (v.x, v.y))
                .unwrap_or((DEFAULT_OUT_X, DEFAULT_OUT_Y));
            let (x2, y2) = right
                .transitions
                .as_ref()
                .and_then(|t| t.r#in.as_ref())
                .map(|v| (v.x, v.y))
                .unwrap_or((DEFAULT_IN_X, DEFAULT_IN_Y));

            let w = bezier_ease_t(lt, x1, y1, x2, y2);
            left.value + (right.value - left.value) * w
        }
    }
}
