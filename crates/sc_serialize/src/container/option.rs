use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use super::{ContainerAdapter, ELEMENT_NAME};
use crate::object::builtin;
use crate::registry::{ClassDescriptor, FieldDescriptor, GenericClassInfo, GenericType, TypeRegistry};
use crate::{NameHash, Object, TypeUuid, Typed};

impl<T: Typed + Default> Typed for Option<T> {
    fn type_uuid() -> TypeUuid {
        builtin::OPTION.combine(&[T::type_uuid()])
    }

    fn type_name() -> &'static str {
        "Option"
    }

    fn register_generic_info(registry: &mut TypeRegistry) -> Option<Arc<GenericClassInfo>> {
        Some(registry.register_generic::<Self>())
    }
}

impl<T: Typed + Default> GenericType for Option<T> {
    fn generic_uuid() -> TypeUuid {
        builtin::OPTION
    }

    fn template_arguments() -> Vec<TypeUuid> {
        vec![T::type_uuid()]
    }

    fn reflect_generic(registry: &mut TypeRegistry) -> GenericClassInfo {
        let element = T::register_generic_info(registry);
        let adapter = OptionAdapter::<T>::new().with_element_generic(element);
        let class = ClassDescriptor::with_default::<Self>().with_container(Arc::new(adapter));
        GenericClassInfo::new(builtin::OPTION, Self::template_arguments(), class)
    }
}

/// The [`ContainerAdapter`] of `Option<T>`: a container of at most one element.
pub struct OptionAdapter<T> {
    element: FieldDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Typed + Default> OptionAdapter<T> {
    pub fn new() -> Self {
        Self {
            element: FieldDescriptor::element(ELEMENT_NAME, T::type_uuid()),
            _marker: PhantomData,
        }
    }

    /// Attaches the generic info of the element type, see [`Typed::register_generic_info`].
    pub fn with_element_generic(mut self, generic: Option<Arc<GenericClassInfo>>) -> Self {
        if let Some(generic) = generic {
            self.element = self.element.with_generic(generic);
        }
        self
    }
}

impl<T: Typed + Default> ContainerAdapter for OptionAdapter<T> {
    fn element(&self, name_hash: NameHash) -> Option<&FieldDescriptor> {
        (self.element.name_hash() == name_hash).then_some(&self.element)
    }

    fn element_descriptor(&self) -> &FieldDescriptor {
        &self.element
    }

    fn size(&self, container: &dyn Object) -> usize {
        container
            .downcast_ref::<Option<T>>()
            .map_or(0, |option| usize::from(option.is_some()))
    }

    fn can_access_elements_by_index(&self) -> bool {
        true
    }

    fn element_by_index<'a>(&self, container: &'a dyn Object, index: usize) -> Option<&'a dyn Object> {
        if index != 0 {
            return None;
        }
        let element = container.downcast_ref::<Option<T>>()?.as_ref()?;
        Some(element)
    }

    fn element_by_index_mut<'a>(
        &self,
        container: &'a mut dyn Object,
        index: usize,
    ) -> Option<&'a mut dyn Object> {
        if index != 0 {
            return None;
        }
        let element = container.downcast_mut::<Option<T>>()?.as_mut()?;
        Some(element)
    }

    fn reserve_element(&self, container: &mut dyn Object) -> Option<Box<dyn Object>> {
        match container.downcast_ref::<Option<T>>()? {
            Some(_) => None,
            None => Some(Box::new(T::default())),
        }
    }

    fn store_element(&self, container: &mut dyn Object, element: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        let Some(option) = container.downcast_mut::<Option<T>>() else {
            return Err(element);
        };
        if option.is_some() {
            return Err(element);
        }
        *option = Some(*element.downcast::<T>()?);
        Ok(())
    }

    fn store_element_at(
        &self,
        container: &mut dyn Object,
        index: usize,
        element: Box<dyn Object>,
    ) -> Result<(), Box<dyn Object>> {
        match container.downcast_mut::<Option<T>>() {
            Some(option) if index == 0 => {
                *option = Some(*element.downcast::<T>()?);
                Ok(())
            }
            _ => Err(element),
        }
    }

    fn clear_elements(&self, container: &mut dyn Object) {
        if let Some(option) = container.downcast_mut::<Option<T>>() {
            *option = None;
        }
    }

    fn enum_elements(&self, container: &dyn Object, visit: &mut dyn FnMut(&dyn Object) -> bool) {
        if let Some(Some(element)) = container.downcast_ref::<Option<T>>() {
            visit(element);
        }
    }

    fn enum_elements_mut(&self, container: &mut dyn Object, visit: &mut dyn FnMut(&mut dyn Object) -> bool) {
        if let Some(Some(element)) = container.downcast_mut::<Option<T>>() {
            visit(element);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::OptionAdapter;
    use crate::container::ContainerAdapter;

    #[test]
    fn holds_at_most_one_element() {
        let adapter = OptionAdapter::<i64>::new();
        let mut value: Option<i64> = None;
        assert_eq!(adapter.size(&value), 0);

        let element = adapter.reserve_element(&mut value).unwrap();
        adapter.store_element(&mut value, element).unwrap();
        assert_eq!(value, Some(0));
        assert_eq!(adapter.size(&value), 1);

        assert!(adapter.reserve_element(&mut value).is_none());
        assert!(adapter.store_element(&mut value, Box::new(5_i64)).is_err());

        adapter.store_element_at(&mut value, 0, Box::new(5_i64)).unwrap();
        assert_eq!(value, Some(5));

        adapter.clear_elements(&mut value);
        assert_eq!(value, None);
    }
}
