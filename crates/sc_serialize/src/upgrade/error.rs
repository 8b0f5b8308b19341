use thiserror::Error;

/// A document that cannot be brought to the current class versions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpgradeError {
    #[error("`{class}` renames `{field}` from version {from} to {to}, but the document has no such field")]
    MissingField {
        class: &'static str,
        field: &'static str,
        from: u32,
        to: u32,
    },
    #[error("converter of `{class}` rejected a version {version} document")]
    ConversionFailed { class: &'static str, version: u32 },
    #[error("document root `{class}` is deprecated and has no converter")]
    DeprecatedRoot { class: &'static str },
}
