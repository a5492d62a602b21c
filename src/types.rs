use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Semantic identity of a cistron spec, independent of its bit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Allele {
    JunkRatio,
    BitMutationRate,
    BitMutationRateStdDev,
    CrossoverRate,
    BitInsertionRate,
    BitInsertionRateStdDev,
    BitRemovalRate,
    BitRemovalRateStdDev,
    /// Caller-defined gene, numbered from `CUSTOM_RANGE_START`.
    Custom(u16),
}

impl Allele {
    pub const CUSTOM_RANGE_START: u32 = 256;

    pub fn code(&self) -> u32 {
        match self {
            Allele::JunkRatio => 1,
            Allele::BitMutationRate => 2,
            Allele::BitMutationRateStdDev => 3,
            Allele::CrossoverRate => 4,
            Allele::BitInsertionRate => 5,
            Allele::BitInsertionRateStdDev => 6,
            Allele::BitRemovalRate => 7,
            Allele::BitRemovalRateStdDev => 8,
            Allele::Custom(n) => Self::CUSTOM_RANGE_START + *n as u32,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Allele::Custom(_))
    }
}

impl fmt::Display for Allele {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Allele::Custom(n) => write!(f, "Custom({})", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Decoded value of one cistron.
///
/// Decoders produce strongly typed outputs that are lifted into this enum so a
/// genome can hold one value per spec regardless of the spec's result type.
/// Anything that does not fit the built-in variants travels as `Custom` and is
/// recovered with [`Value::downcast_ref`].
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    FloatList(Vec<f64>),
    Discriminated { discriminator: u16, value: Box<Value> },
    Custom(Arc<dyn Any + Send + Sync>),
}

impl Value {
    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Value::Custom(Arc::new(value))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::Discriminated { value, .. } => value.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Discriminated { value, .. } => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Discriminated { value, .. } => value.as_bool(),
            _ => None,
        }
    }

    pub fn as_float_list(&self) -> Option<&[f64]> {
        match self {
            Value::FloatList(values) => Some(values),
            Value::Discriminated { value, .. } => value.as_float_list(),
            _ => None,
        }
    }

    pub fn discriminator(&self) -> Option<u16> {
        match self {
            Value::Discriminated { discriminator, .. } => Some(*discriminator),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(inner) => inner.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Integer(i) => write!(f, "Integer({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::FloatList(values) => write!(f, "FloatList({:?})", values),
            Value::Discriminated { discriminator, value } => {
                write!(f, "Discriminated({}, {:?})", discriminator, value)
            }
            Value::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::FloatList(a), Value::FloatList(b)) => a == b,
            (
                Value::Discriminated { discriminator: da, value: va },
                Value::Discriminated { discriminator: db, value: vb },
            ) => da == db && va == vb,
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::FloatList(values)
    }
}
