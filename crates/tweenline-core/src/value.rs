//! Value: the interpolated quantities a transition produces.
//!
//! A value is either a scalar or a flat composite of named scalar fields
//! (one level, no nesting). Composites keep insertion order so repeated
//! evaluation yields identical field ordering.

use serde::{Deserialize, Serialize};

/// Coarse kind tag, handy for dispatch and assertions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Scalar,
    Composite,
}

/// Ordered set of named scalar fields. Names are unique; `set` replaces in
/// place, otherwise appends.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Fields(Vec<(String, f32)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self(Vec::with_capacity(cap))
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.0
            .iter()
            .find_map(|(n, v)| if n == name { Some(*v) } else { None })
    }

    pub fn set(&mut self, name: &str, value: f32) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.0.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f32)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        let mut out = Fields::new();
        for (n, v) in iter {
            out.set(&n, v);
        }
        out
    }
}

/// A scalar or a fixed-shape composite. Both endpoints of a track are
/// expected to share a shape; mismatches are recovered field-by-field at
/// interpolation time, never rejected.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Scalar(f32),
    Composite(Fields),
}

impl Value {
    /// Convenience constructor for scalars.
    #[inline]
    pub fn f(v: f32) -> Self {
        Value::Scalar(v)
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Composite(_) => ValueKind::Composite,
        }
    }

    /// Scalar payload, if this is a scalar.
    #[inline]
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Composite(_) => None,
        }
    }

    /// Field lookup on composites; `None` for scalars or absent names.
    pub fn field(&self, name: &str) -> Option<f32> {
        match self {
            Value::Scalar(_) => None,
            Value::Composite(fields) => fields.get(name),
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Scalar(v)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Composite(fields)
    }
}

impl<const N: usize> From<[(&str, f32); N]> for Value {
    fn from(pairs: [(&str, f32); N]) -> Self {
        Value::Composite(pairs.iter().map(|(n, v)| (n.to_string(), *v)).collect())
    }
}
