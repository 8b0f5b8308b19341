//! Byte and text encodings of scalar types.
//!
//! A class with a [`DataSerializer`] is a leaf of every document: its value is
//! stored as one payload instead of child nodes.

// -----------------------------------------------------------------------------
// Modules

mod enum_value;
mod error;
mod scalar;
mod string;

// -----------------------------------------------------------------------------
// Exports

pub use enum_value::EnumValueSerializer;
pub use error::SerializeError;
pub use scalar::{Scalar, ScalarSerializer};
pub use string::{EmptySerializer, StringSerializer};

use alloc::string::String;
use alloc::vec::Vec;

use crate::Object;

/// Encodes one scalar type to bytes and text.
///
/// Binary payloads are written in the requested byte order. The text form is
/// human readable and carries its own version, see [`text_version`](Self::text_version).
pub trait DataSerializer: Send + Sync {
    /// Appends the binary form of `value` to `out`, returning the number of bytes written.
    fn save(&self, value: &dyn Object, out: &mut Vec<u8>, big_endian: bool) -> Result<usize, SerializeError>;

    /// Overwrites `value` with the decoded payload.
    ///
    /// `version` is the class version the payload was written with.
    fn load(
        &self,
        value: &mut dyn Object,
        input: &[u8],
        version: u32,
        big_endian: bool,
    ) -> Result<(), SerializeError>;

    /// Appends the text form of a binary payload, returning the number of bytes written.
    fn data_to_text(&self, input: &[u8], out: &mut String, big_endian: bool) -> Result<usize, SerializeError>;

    /// Appends the binary form of a text payload written with `text_version`.
    fn text_to_data(
        &self,
        text: &str,
        text_version: u32,
        out: &mut Vec<u8>,
        big_endian: bool,
    ) -> Result<usize, SerializeError>;

    fn compare_equal(&self, lhs: &dyn Object, rhs: &dyn Object) -> bool;

    /// The version of the text form produced by [`data_to_text`](Self::data_to_text).
    fn text_version(&self) -> u32 {
        0
    }

    /// Copies `source` into `target` without going through bytes.
    ///
    /// Returns `false` if the serializer has no direct copy, the caller then
    /// falls back to save and load.
    fn clone_value(&self, source: &dyn Object, target: &mut dyn Object) -> bool {
        let _ = (source, target);
        false
    }

    /// Called on the copy once a clone of the value is complete.
    fn post_clone(&self, target: &mut dyn Object) {
        let _ = target;
    }
}

/// Rejects text written with a version the serializer does not know.
pub(crate) fn check_text_version(
    type_name: &'static str,
    text_version: u32,
    supported: u32,
) -> Result<(), SerializeError> {
    if text_version == supported {
        Ok(())
    } else {
        Err(SerializeError::UnsupportedTextVersion {
            type_name,
            version: text_version,
        })
    }
}

/// Downcasts `value` or reports the mismatch.
pub(crate) fn expect_ref<T: crate::Typed>(value: &dyn Object) -> Result<&T, SerializeError> {
    value
        .downcast_ref::<T>()
        .ok_or(SerializeError::TypeMismatch {
            expected: T::type_name(),
            found: value.object_type_name(),
        })
}

pub(crate) fn expect_mut<T: crate::Typed>(value: &mut dyn Object) -> Result<&mut T, SerializeError> {
    let found = value.object_type_name();
    value.downcast_mut::<T>().ok_or(SerializeError::TypeMismatch {
        expected: T::type_name(),
        found,
    })
}
