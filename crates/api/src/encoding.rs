//! Output-only encodings.
//!
//! Several manifest values have an on-disk spelling that differs from their
//! configuration name (a permission default of `NOT_OP` is written as `not op`, the
//! Fabric environment `ANY` as `*`). Those encodings only exist for writing.
//! [`WriteOnly`] attaches such an encoding to a value and makes any attempt to read
//! it back fail with [`SerializationError::WriteOnly`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SerializationError;

/// A type with an encoding that is only ever written.
pub trait WriteOnlyEncoding {
    /// Name used in the error raised when reading is attempted.
    const TYPE_NAME: &'static str;

    /// Write the encoded form of `self`.
    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;
}

/// Wrapper that serializes through [`WriteOnlyEncoding`] and refuses to deserialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOnly<T>(pub T);

impl<T: WriteOnlyEncoding> WriteOnly<T> {
    /// Wrap an optional value, cloning it out of the model.
    pub fn from_opt(value: &Option<T>) -> Option<Self>
    where
        T: Clone,
    {
        value.clone().map(WriteOnly)
    }
}

impl<T: WriteOnlyEncoding> Serialize for WriteOnly<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.encode(serializer)
    }
}

impl<'de, T: WriteOnlyEncoding> Deserialize<'de> for WriteOnly<T> {
    fn deserialize<D: Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
        Err(D::Error::custom(SerializationError::WriteOnly {
            type_name: T::TYPE_NAME,
        }))
    }
}
