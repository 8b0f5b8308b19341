use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use super::access::{GetFn, GetMutFn, getter, getter_mut};
use crate::{Object, TypeUuid, Typed};

/// One direct base of a type known to an [`RttiHelper`].
pub struct RttiBase {
    helper: Arc<RttiHelper>,
    upcast: Box<GetFn>,
    upcast_mut: Box<GetMutFn>,
}

impl RttiBase {
    #[inline]
    pub fn helper(&self) -> &Arc<RttiHelper> {
        &self.helper
    }
}

/// Runtime type information of a concrete type: its identity and its bases.
///
/// Answers is-a queries and casts an instance to any of its bases, even when
/// the base classes are not reflected as fields.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sc_serialize::registry::RttiHelper;
/// use sc_serialize::{Typed, impl_typed};
///
/// #[derive(Default)]
/// struct Base { id: u32 }
/// #[derive(Default)]
/// struct Derived { base: Base }
///
/// impl_typed!(Base, "{8E7D5F20-6C51-4C0A-9E1B-2F7A0C3B4D01}");
/// impl_typed!(Derived, "{8E7D5F20-6C51-4C0A-9E1B-2F7A0C3B4D02}");
///
/// let base = Arc::new(RttiHelper::of::<Base>());
/// let derived = RttiHelper::of::<Derived>()
///     .with_base::<Derived, Base>(base, |d| &d.base, |d| &mut d.base);
///
/// assert!(derived.is_type_of(Base::type_uuid()));
/// let value = Derived { base: Base { id: 3 } };
/// let cast = derived.cast(&value, Base::type_uuid()).unwrap();
/// assert_eq!(cast.downcast_ref::<Base>().unwrap().id, 3);
/// ```
pub struct RttiHelper {
    type_uuid: TypeUuid,
    type_name: &'static str,
    bases: Vec<RttiBase>,
}

impl RttiHelper {
    pub fn of<T: Typed>() -> Self {
        Self {
            type_uuid: T::type_uuid(),
            type_name: T::type_name(),
            bases: Vec::new(),
        }
    }

    /// Adds a direct base `B` embedded in `T`.
    pub fn with_base<T: Typed, B: Typed>(
        mut self,
        helper: Arc<RttiHelper>,
        get: fn(&T) -> &B,
        get_mut: fn(&mut T) -> &mut B,
    ) -> Self {
        debug_assert_eq!(self.type_uuid, T::type_uuid());
        debug_assert_eq!(helper.type_uuid, B::type_uuid());
        self.bases.push(RttiBase {
            helper,
            upcast: getter(move |instance| Some(get(instance.downcast_ref::<T>()?) as &dyn Object)),
            upcast_mut: getter_mut(move |instance| {
                Some(get_mut(instance.downcast_mut::<T>()?) as &mut dyn Object)
            }),
        });
        self
    }

    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.type_uuid
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn bases(&self) -> &[RttiBase] {
        &self.bases
    }

    /// Returns `true` if this type is `type_uuid` or derives from it.
    pub fn is_type_of(&self, type_uuid: TypeUuid) -> bool {
        self.type_uuid == type_uuid || self.bases.iter().any(|b| b.helper.is_type_of(type_uuid))
    }

    /// Casts `instance` to the base `target`.
    pub fn cast<'a>(&self, instance: &'a dyn Object, target: TypeUuid) -> Option<&'a dyn Object> {
        if self.type_uuid == target {
            return Some(instance);
        }
        let base = self.bases.iter().find(|b| b.helper.is_type_of(target))?;
        base.helper.cast((base.upcast)(instance)?, target)
    }

    pub fn cast_mut<'a>(
        &self,
        instance: &'a mut dyn Object,
        target: TypeUuid,
    ) -> Option<&'a mut dyn Object> {
        if self.type_uuid == target {
            return Some(instance);
        }
        let base = self.bases.iter().find(|b| b.helper.is_type_of(target))?;
        base.helper.cast_mut((base.upcast_mut)(instance)?, target)
    }
}

impl fmt::Debug for RttiHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RttiHelper")
            .field("type_name", &self.type_name)
            .field("type_uuid", &self.type_uuid)
            .field("bases", &self.bases.iter().map(|b| b.helper.type_name).collect::<Vec<_>>())
            .finish()
    }
}
