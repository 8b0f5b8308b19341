use thiserror::Error;

use crate::TypeUuid;

/// A failure of a deep copy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CloneError {
    #[error("`{name}` {uuid} is not registered")]
    Unregistered { name: &'static str, uuid: TypeUuid },
    #[error("`{name}` has no factory")]
    NotCreatable { name: &'static str },
    #[error("cannot clone a {found} into a {expected}")]
    TypeMismatch { expected: TypeUuid, found: TypeUuid },
    #[error("{errors} error(s) while cloning")]
    Incomplete { errors: u32 },
}
