use alloc::string::String;

use thiserror::Error;

/// An error raised by a [`DataSerializer`](super::DataSerializer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SerializeError {
    #[error("expected a `{expected}`, found a `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("`{type_name}` payload must be {expected} byte(s), found {found}")]
    InvalidLength {
        type_name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("cannot parse `{text}` as `{type_name}`")]
    InvalidText { type_name: &'static str, text: String },
    #[error("value is not a valid `{type_name}`")]
    InvalidValue { type_name: &'static str },
    #[error("text version {version} of `{type_name}` is not supported")]
    UnsupportedTextVersion { type_name: &'static str, version: u32 },
    #[error("`{type_name}` payload is not valid UTF-8")]
    InvalidUtf8 { type_name: &'static str },
}
