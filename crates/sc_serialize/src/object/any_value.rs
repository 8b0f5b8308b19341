use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::{Object, PointerSlot, TypeUuid, Typed, impl_typed};

/// A type-erased value holder.
///
/// The payload is walked, saved and cloned as if it were a pointer field named
/// [`AnyValue::PAYLOAD_FIELD`] whose declared type is the runtime type of the
/// payload.
///
/// # Examples
///
/// ```
/// use sc_serialize::AnyValue;
///
/// let mut any = AnyValue::new(5_u16);
/// assert_eq!(any.downcast_ref::<u16>(), Some(&5));
///
/// any.clear();
/// assert!(any.is_empty());
/// ```
#[derive(Default)]
pub struct AnyValue {
    value: Option<Box<dyn Object>>,
}

impl_typed!(AnyValue, "{20D9CC39-AAF2-4574-9277-A2F1E7784B18}");

impl AnyValue {
    /// The document name of the payload.
    pub const PAYLOAD_FIELD: &'static str = "m_data";

    #[inline]
    pub const fn empty() -> Self {
        Self { value: None }
    }

    #[inline]
    pub fn new<T: Typed>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }

    #[inline]
    pub fn from_boxed(value: Box<dyn Object>) -> Self {
        Self { value: Some(value) }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// The identity of the payload, if any.
    #[inline]
    pub fn payload_uuid(&self) -> Option<TypeUuid> {
        self.value.as_deref().map(Object::object_uuid)
    }

    #[inline]
    pub fn get(&self) -> Option<&dyn Object> {
        self.value.as_deref()
    }

    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut dyn Object> {
        self.value.as_deref_mut()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.get()?.downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.get_mut()?.downcast_mut::<T>()
    }

    #[inline]
    pub fn set(&mut self, value: Box<dyn Object>) {
        self.value = Some(value);
    }

    #[inline]
    pub fn take(&mut self) -> Option<Box<dyn Object>> {
        self.value.take()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.value = None;
    }
}

impl PointerSlot for AnyValue {
    #[inline]
    fn pointee(&self) -> Option<&dyn Object> {
        self.get()
    }

    #[inline]
    fn pointee_mut(&mut self) -> Option<&mut dyn Object> {
        self.get_mut()
    }

    fn set_pointee(&mut self, value: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        self.set(value);
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        self.value = None;
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("AnyValue").field(&value).finish(),
            None => f.write_str("AnyValue(<empty>)"),
        }
    }
}
