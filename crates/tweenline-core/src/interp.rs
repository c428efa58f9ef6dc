//! Interpolation strategies.
//!
//! A strategy combines an eased weight with a from/to endpoint pair. The
//! default is a plain linear blend; hosts can install their own per
//! transition (or registry-wide through `Config::default_lerp`).

use crate::value::{Fields, Value};

/// Pluggable interpolation strategy: `(from, to, eased) -> value`.
pub type LerpFn = fn(&Value, &Value, f32) -> Value;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Default strategy: scalar lerp, or field-wise lerp over the target's
/// field set. A field absent from `from` materializes at the `to` value for
/// that field; a scalar/composite mismatch takes the target's shape under
/// the same policy. Recovery, not an error.
pub fn lerp_value(from: &Value, to: &Value, t: f32) -> Value {
    match to {
        Value::Scalar(b) => {
            let a = match from {
                Value::Scalar(a) => *a,
                Value::Composite(_) => *b,
            };
            Value::Scalar(lerp_f32(a, *b, t))
        }
        Value::Composite(target) => {
            let mut out = Fields::with_capacity(target.len());
            for (name, b) in target.iter() {
                let a = match from {
                    Value::Composite(source) => source.get(name).unwrap_or(b),
                    Value::Scalar(_) => b,
                };
                out.set(name, lerp_f32(a, b, t));
            }
            Value::Composite(out)
        }
    }
}

/// Step strategy: hold `from` until the weight reaches 1.
pub fn step_value(from: &Value, to: &Value, t: f32) -> Value {
    if t >= 1.0 {
        to.clone()
    } else {
        from.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_lerp_midpoint() {
        let v = lerp_value(&Value::f(0.0), &Value::f(100.0), 0.25);
        assert_eq!(v, Value::f(25.0));
    }

    #[test]
    fn missing_from_field_materializes_at_target() {
        let from = Value::from([("x", 0.0)]);
        let to = Value::from([("x", 10.0), ("y", 20.0)]);
        let v = lerp_value(&from, &to, 0.5);
        assert_eq!(v.field("x"), Some(5.0));
        assert_eq!(v.field("y"), Some(20.0));
    }

    #[test]
    fn shape_mismatch_takes_target_shape() {
        let v = lerp_value(&Value::f(3.0), &Value::from([("x", 10.0)]), 0.5);
        assert_eq!(v.field("x"), Some(10.0));
    }
}
