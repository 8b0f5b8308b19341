use alloc::boxed::Box;

use crate::{Object, Typed};

/// An owning, nullable pointer held by a field.
///
/// The slot may hold a value whose concrete type differs from the declared
/// type of the field, the walker resolves the actual type at runtime.
pub trait PointerSlot: Send + Sync + 'static {
    fn pointee(&self) -> Option<&dyn Object>;

    fn pointee_mut(&mut self) -> Option<&mut dyn Object>;

    /// Replaces the pointee, handing the value back if the slot cannot hold it.
    fn set_pointee(&mut self, value: Box<dyn Object>) -> Result<(), Box<dyn Object>>;

    fn clear(&mut self);
}

impl<T: Typed> PointerSlot for Option<Box<T>> {
    #[inline]
    fn pointee(&self) -> Option<&dyn Object> {
        self.as_deref().map(|value| value as &dyn Object)
    }

    #[inline]
    fn pointee_mut(&mut self) -> Option<&mut dyn Object> {
        self.as_deref_mut().map(|value| value as &mut dyn Object)
    }

    fn set_pointee(&mut self, value: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        *self = Some(value.downcast::<T>()?);
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        *self = None;
    }
}

impl PointerSlot for Option<Box<dyn Object>> {
    #[inline]
    fn pointee(&self) -> Option<&dyn Object> {
        self.as_deref()
    }

    #[inline]
    fn pointee_mut(&mut self) -> Option<&mut dyn Object> {
        self.as_deref_mut()
    }

    fn set_pointee(&mut self, value: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        *self = Some(value);
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        *self = None;
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;

    use super::PointerSlot;
    use crate::Object;

    #[test]
    fn typed_slot_rejects_other_types() {
        let mut slot: Option<Box<i32>> = None;
        assert!(slot.pointee().is_none());

        let rejected = slot.set_pointee(Box::new(String::from("no")));
        assert!(rejected.is_err());
        assert!(slot.is_none());

        slot.set_pointee(Box::new(3_i32)).unwrap();
        assert_eq!(slot.pointee().and_then(|v| v.downcast_ref::<i32>()), Some(&3));

        slot.clear();
        assert!(slot.is_none());
    }

    #[test]
    fn dynamic_slot_accepts_anything() {
        let mut slot: Option<Box<dyn Object>> = None;
        slot.set_pointee(Box::new(String::from("yes"))).unwrap();
        assert!(slot.pointee().unwrap().is::<String>());
    }
}
