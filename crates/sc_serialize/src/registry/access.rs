use alloc::boxed::Box;

use super::FieldAccess;
use crate::{Object, PointerSlot, Typed};

pub(crate) type GetFn = dyn for<'a> Fn(&'a dyn Object) -> Option<&'a dyn Object> + Send + Sync;
pub(crate) type GetMutFn =
    dyn for<'a> Fn(&'a mut dyn Object) -> Option<&'a mut dyn Object> + Send + Sync;
pub(crate) type SetFn =
    dyn Fn(&mut dyn Object, Box<dyn Object>) -> Result<(), Box<dyn Object>> + Send + Sync;
pub(crate) type ClearFn = dyn Fn(&mut dyn Object) + Send + Sync;

// Pins the higher-ranked signature, closure inference alone picks one lifetime.
#[inline(always)]
pub(crate) fn getter<F>(f: F) -> Box<GetFn>
where
    F: for<'a> Fn(&'a dyn Object) -> Option<&'a dyn Object> + Send + Sync + 'static,
{
    Box::new(f)
}

#[inline(always)]
pub(crate) fn getter_mut<F>(f: F) -> Box<GetMutFn>
where
    F: for<'a> Fn(&'a mut dyn Object) -> Option<&'a mut dyn Object> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Accessors of a field stored inline in `T`.
pub(crate) fn value_access<T: Typed, F: Typed>(
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
) -> FieldAccess {
    FieldAccess::Value {
        get: getter(move |owner| {
            let owner = owner.downcast_ref::<T>()?;
            Some(get(owner) as &dyn Object)
        }),
        get_mut: getter_mut(move |owner| {
            let owner = owner.downcast_mut::<T>()?;
            Some(get_mut(owner) as &mut dyn Object)
        }),
        set: Box::new(
            move |owner: &mut dyn Object, value: Box<dyn Object>| -> Result<(), Box<dyn Object>> {
                let Some(owner) = owner.downcast_mut::<T>() else {
                    return Err(value);
                };
                *get_mut(owner) = *value.downcast::<F>()?;
                Ok(())
            },
        ),
    }
}

/// Accessors of a [`PointerSlot`] field of `T`, reading through to the pointee.
pub(crate) fn pointer_access<T: Typed, P: PointerSlot>(
    get: fn(&T) -> &P,
    get_mut: fn(&mut T) -> &mut P,
) -> FieldAccess {
    FieldAccess::Pointer {
        get: getter(move |owner| get(owner.downcast_ref::<T>()?).pointee()),
        get_mut: getter_mut(move |owner| get_mut(owner.downcast_mut::<T>()?).pointee_mut()),
        set: Box::new(
            move |owner: &mut dyn Object, value: Box<dyn Object>| -> Result<(), Box<dyn Object>> {
                match owner.downcast_mut::<T>() {
                    Some(owner) => get_mut(owner).set_pointee(value),
                    None => Err(value),
                }
            },
        ),
        clear: Box::new(move |owner: &mut dyn Object| {
            if let Some(owner) = owner.downcast_mut::<T>() {
                get_mut(owner).clear();
            }
        }),
    }
}
