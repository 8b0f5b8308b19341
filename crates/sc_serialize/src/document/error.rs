use thiserror::Error;

use crate::TypeUuid;
use crate::serializer::SerializeError;
use crate::upgrade::UpgradeError;

/// A malformed binary object stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StreamError {
    #[error("missing object stream header")]
    InvalidHeader,
    #[error("object stream version {0} is not supported")]
    UnsupportedVersion(u8),
    #[error("unexpected end of stream at byte {0}")]
    UnexpectedEof(usize),
    #[error("nodes are nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("invalid payload kind {0}")]
    InvalidPayloadKind(u8),
    #[error("node name is not valid UTF-8")]
    InvalidName,
    #[error("node content overruns its declared length of {0} bytes")]
    LengthMismatch(usize),
    #[error("{0} trailing bytes after the root node")]
    TrailingBytes(usize),
    #[error("{what} length {len} does not fit the stream")]
    TooLarge { what: &'static str, len: usize },
}

/// A failure to read or write the payload of a single node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataError {
    #[error("type {0} is not registered")]
    Unregistered(TypeUuid),
    #[error("`{name}` has no serializer")]
    NoSerializer { name: &'static str },
    #[error("node holds a {found}, expected a {expected}")]
    TypeMismatch { expected: TypeUuid, found: TypeUuid },
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// A failure of [`TypeRegistry::save_object`](crate::TypeRegistry::save_object).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SaveError {
    #[error("`{name}` {uuid} is not registered")]
    Unregistered { name: &'static str, uuid: TypeUuid },
    #[error("{errors} error(s) while saving")]
    Incomplete { errors: u32 },
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// A failure to load an object from a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
    #[error("type {0} is not registered")]
    Unregistered(TypeUuid),
    #[error("`{name}` cannot be created, it has no factory")]
    NotCreatable { name: &'static str },
    #[error("document holds a {found}, expected a {expected}")]
    TypeMismatch { expected: TypeUuid, found: TypeUuid },
    #[error("{errors} error(s) while loading")]
    Incomplete { errors: u32 },
}
