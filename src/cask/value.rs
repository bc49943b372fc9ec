//! Dataset encodings and values.

use std::fmt;

use crate::util::{Error, Result};

/// Declared on-disk encoding of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Encoding {
    /// 64-bit signed integer scalar.
    Int64 = 0,
    /// 64-bit float scalar.
    Float64 = 1,
    /// Boolean scalar.
    Bool = 2,
    /// UTF-8 string scalar.
    Utf8 = 3,
    /// Array of 64-bit signed integers.
    Int64Array = 4,
    /// Array of 64-bit floats.
    Float64Array = 5,
    /// Array of booleans.
    BoolArray = 6,
    /// Array of UTF-8 strings.
    Utf8Array = 7,
}

impl Encoding {
    /// Decode an encoding tag read from a file.
    pub fn from_u8(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => Self::Int64,
            1 => Self::Float64,
            2 => Self::Bool,
            3 => Self::Utf8,
            4 => Self::Int64Array,
            5 => Self::Float64Array,
            6 => Self::BoolArray,
            7 => Self::Utf8Array,
            other => return Err(Error::invalid(format!("unknown encoding tag {other}"))),
        })
    }

    /// Human-readable name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Utf8 => "utf8",
            Self::Int64Array => "int64[]",
            Self::Float64Array => "float64[]",
            Self::BoolArray => "bool[]",
            Self::Utf8Array => "utf8[]",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dataset payload, in memory.
#[derive(Clone, Debug, PartialEq)]
pub enum DatasetValue {
    Int64(i64),
    Float64(f64),
    Bool(bool),
    Utf8(String),
    Int64Array(Vec<i64>),
    Float64Array(Vec<f64>),
    BoolArray(Vec<bool>),
    Utf8Array(Vec<String>),
}

impl DatasetValue {
    /// The encoding this value naturally serializes as.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Int64(_) => Encoding::Int64,
            Self::Float64(_) => Encoding::Float64,
            Self::Bool(_) => Encoding::Bool,
            Self::Utf8(_) => Encoding::Utf8,
            Self::Int64Array(_) => Encoding::Int64Array,
            Self::Float64Array(_) => Encoding::Float64Array,
            Self::BoolArray(_) => Encoding::BoolArray,
            Self::Utf8Array(_) => Encoding::Utf8Array,
        }
    }
}

impl fmt::Display for DatasetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "{v:?}"),
            Self::Int64Array(v) => write!(f, "{v:?}"),
            Self::Float64Array(v) => write!(f, "{v:?}"),
            Self::BoolArray(v) => write!(f, "{v:?}"),
            Self::Utf8Array(v) => write!(f, "{v:?}"),
        }
    }
}
