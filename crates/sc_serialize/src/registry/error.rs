use thiserror::Error;

use crate::TypeUuid;

/// Errors returned while describing types to a [`TypeRegistry`](super::TypeRegistry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("`{name}` {uuid} is already registered with a different shape")]
    Conflicting { name: &'static str, uuid: TypeUuid },
    #[error("`{name}` declares both a serializer and fields")]
    SerializerWithFields { name: &'static str },
    #[error("`{name}` declares both a serializer and a container adapter")]
    SerializerWithContainer { name: &'static str },
    #[error("`{name}` declares upgrade `{field}` from version {from} to {to} twice")]
    DuplicateUpgrade {
        name: &'static str,
        field: &'static str,
        from: u32,
        to: u32,
    },
    #[error("`{name}` declares upgrade `{field}` from version {from} to {to}, versions must increase")]
    BackwardUpgrade {
        name: &'static str,
        field: &'static str,
        from: u32,
        to: u32,
    },
    #[error("`{name}` adds attribute `{key}` before any field")]
    AttributeWithoutField { name: &'static str, key: &'static str },
    #[error("`{name}` declares field `{field}` twice")]
    DuplicateField { name: &'static str, field: &'static str },
    #[error("underlying type {uuid} of enum `{name}` is not a registered scalar")]
    UnderlyingNotScalar { name: &'static str, uuid: TypeUuid },
    #[error("module `{module}` failed: {reason}")]
    Module {
        module: &'static str,
        reason: alloc::string::String,
    },
}
