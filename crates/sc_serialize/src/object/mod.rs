//! Live values and their type identity.
//!
//! - [`Typed`]: static identity of a concrete type, usually implemented with [`impl_typed!`](crate::impl_typed).
//! - [`Object`]: the object-safe view every reflected value is handled through.
//! - [`PointerSlot`]: owning, nullable pointer fields.
//! - [`AnyValue`]: a type-erased value holder.

// -----------------------------------------------------------------------------
// Modules

mod any_value;
mod pointer;
mod primitives;

// -----------------------------------------------------------------------------
// Exports

pub use any_value::AnyValue;
pub use pointer::PointerSlot;
pub use primitives::builtin;

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::TypeUuid;
use crate::registry::{GenericClassInfo, TypeRegistry};

// -----------------------------------------------------------------------------
// Typed

/// A type with a stable identity.
///
/// See [`impl_typed!`](crate::impl_typed) for the common case.
pub trait Typed: Any + Send + Sync {
    fn type_uuid() -> TypeUuid;

    fn type_name() -> &'static str;

    /// Registers `Self` if it is a generic specialization.
    ///
    /// Containers call this for their element types, so nested containers
    /// resolve without registering every level by hand.
    fn register_generic_info(registry: &mut TypeRegistry) -> Option<Arc<GenericClassInfo>> {
        let _ = registry;
        None
    }
}

/// Implements [`Typed`] for a type with a fixed uuid.
///
/// The name defaults to the identifier of the type.
///
/// # Examples
///
/// ```
/// use sc_serialize::{Typed, impl_typed};
///
/// struct Player;
/// struct Mob;
///
/// impl_typed!(Player, "{0E45A1D3-52C9-4F3A-9A7C-1D1B7C2B9F10}");
/// impl_typed!(Mob, "Monster", "{0E45A1D3-52C9-4F3A-9A7C-1D1B7C2B9F11}");
///
/// assert_eq!(Player::type_name(), "Player");
/// assert_eq!(Mob::type_name(), "Monster");
/// ```
#[macro_export]
macro_rules! impl_typed {
    ($ty:ident, $uuid:literal) => {
        $crate::impl_typed!($ty, ::core::stringify!($ty), $uuid);
    };
    ($ty:ty, $name:expr, $uuid:literal) => {
        impl $crate::Typed for $ty {
            #[inline]
            fn type_uuid() -> $crate::TypeUuid {
                const UUID: $crate::TypeUuid =
                    $crate::TypeUuid::from_uuid($crate::__macro_exports::uuid::uuid!($uuid));
                UUID
            }

            #[inline]
            fn type_name() -> &'static str {
                $name
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Object

/// The object-safe view of a [`Typed`] value.
///
/// Implemented for every `Typed` type, never implemented by hand.
pub trait Object: Any + Send + Sync {
    /// The identity of the concrete type behind this object.
    fn object_uuid(&self) -> TypeUuid;

    fn object_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Typed> Object for T {
    #[inline]
    fn object_uuid(&self) -> TypeUuid {
        T::type_uuid()
    }

    #[inline]
    fn object_type_name(&self) -> &'static str {
        T::type_name()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Object {
    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Takes the boxed value back out as a `T`, or returns the box unchanged.
    pub fn downcast<T: Any>(self: Box<Self>) -> Result<Box<T>, Box<dyn Object>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(value) => Ok(value),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({} {})", self.object_type_name(), self.object_uuid())
    }
}

// -----------------------------------------------------------------------------
// Tests
