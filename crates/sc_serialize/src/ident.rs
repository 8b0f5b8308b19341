use alloc::vec::Vec;
use core::fmt;

use uuid::Uuid;

// -----------------------------------------------------------------------------
// TypeUuid

/// The stable 128-bit identity of a reflected type.
///
/// Unlike [`TypeId`](core::any::TypeId), a `TypeUuid` is chosen by the author
/// of the type, so it survives recompilation and is written into documents.
///
/// Specializations of generic types derive their identity from the generic
/// identity and the identities of their arguments, see [`TypeUuid::combine`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeUuid(Uuid);

impl TypeUuid {
    /// The all-zero identity, never assigned to a registered type.
    pub const NIL: Self = Self(Uuid::nil());

    #[inline(always)]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[inline(always)]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parses the hyphenated, braced, simple or urn form of a uuid.
    pub fn parse(text: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(text).map(Self)
    }

    #[inline(always)]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    #[inline(always)]
    pub const fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Derives the identity of a generic specialization.
    ///
    /// The result is a name-based (v5) uuid in the namespace of `self`, so it
    /// only depends on the generic identity and the ordered argument list.
    ///
    /// # Examples
    ///
    /// ```
    /// use sc_serialize::TypeUuid;
    ///
    /// let vec = TypeUuid::from_u128(1);
    /// let a = TypeUuid::from_u128(2);
    /// let b = TypeUuid::from_u128(3);
    ///
    /// assert_eq!(vec.combine(&[a, b]), vec.combine(&[a, b]));
    /// assert_ne!(vec.combine(&[a, b]), vec.combine(&[b, a]));
    /// ```
    pub fn combine(self, arguments: &[TypeUuid]) -> TypeUuid {
        let mut name = Vec::with_capacity(arguments.len() * 16);
        for argument in arguments {
            name.extend_from_slice(argument.as_bytes());
        }
        Self(Uuid::new_v5(&self.0, &name))
    }
}

impl From<Uuid> for TypeUuid {
    #[inline]
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TypeUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.braced(), f)
    }
}

impl fmt::Debug for TypeUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeUuid({})", self.0.braced())
    }
}

// -----------------------------------------------------------------------------
// NameHash

/// A stable 64-bit hash of a field or element name.
///
/// Lookups by name go through the hash, documents keep the readable name next
/// to it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NameHash(u64);

impl NameHash {
    #[inline]
    pub fn of(name: &str) -> Self {
        Self(sc_utils::hash::hash_one(name))
    }

    #[inline(always)]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<&str> for NameHash {
    #[inline]
    fn from(value: &str) -> Self {
        Self::of(value)
    }
}

impl fmt::Debug for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NameHash({:#018x})", self.0)
    }
}

// -----------------------------------------------------------------------------
// Tests
