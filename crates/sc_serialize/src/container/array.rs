use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use super::{ContainerAdapter, ELEMENT_NAME};
use crate::object::builtin;
use crate::registry::{ClassDescriptor, FieldDescriptor, GenericClassInfo, GenericType, TypeRegistry};
use crate::{NameHash, Object, TypeUuid, Typed};

fn length_uuid(len: usize) -> TypeUuid {
    TypeUuid::from_u128(len as u128)
}

impl<T: Typed + Default, const N: usize> Typed for [T; N] {
    fn type_uuid() -> TypeUuid {
        builtin::ARRAY.combine(&[T::type_uuid(), length_uuid(N)])
    }

    fn type_name() -> &'static str {
        "Array"
    }

    fn register_generic_info(registry: &mut TypeRegistry) -> Option<Arc<GenericClassInfo>> {
        Some(registry.register_generic::<Self>())
    }
}

fn default_array<T: Typed + Default, const N: usize>() -> Box<dyn Object> {
    Box::new(core::array::from_fn::<T, N, _>(|_| T::default()))
}

impl<T: Typed + Default, const N: usize> GenericType for [T; N] {
    fn generic_uuid() -> TypeUuid {
        builtin::ARRAY
    }

    fn template_arguments() -> Vec<TypeUuid> {
        vec![T::type_uuid(), length_uuid(N)]
    }

    fn reflect_generic(registry: &mut TypeRegistry) -> GenericClassInfo {
        let element = T::register_generic_info(registry);
        let class = ClassDescriptor::of::<Self>()
            .with_factory(default_array::<T, N>)
            .with_container(Arc::new(ArrayAdapter::<T, N>::new().with_element_generic(element)));
        GenericClassInfo::new(builtin::ARRAY, Self::template_arguments(), class)
    }
}

/// The [`ContainerAdapter`] of `[T; N]`.
///
/// The length never changes: reserving always fails and elements are
/// written in place by index.
pub struct ArrayAdapter<T, const N: usize> {
    element: FieldDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Typed + Default, const N: usize> ArrayAdapter<T, N> {
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

impl<T: Typed + Default, const N: usize> ContainerAdapter for ArrayAdapter<T, N> {
    fn element(&self, name_hash: NameHash) -> Option<&FieldDescriptor> {
        (self.element.name_hash() == name_hash).then_some(&self.element)
    }

    fn element_descriptor(&self) -> &FieldDescriptor {
        &self.element
    }

    fn size(&self, container: &dyn Object) -> usize {
        if container.is::<[T; N]>() { N } else { 0 }
    }

    fn can_access_elements_by_index(&self) -> bool {
        true
    }

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn element_by_index<'a>(&self, container: &'a dyn Object, index: usize) -> Option<&'a dyn Object> {
        let element = container.downcast_ref::<[T; N]>()?.get(index)?;
        Some(element)
    }

    fn element_by_index_mut<'a>(
        &self,
        container: &'a mut dyn Object,
        index: usize,
    ) -> Option<&'a mut dyn Object> {
        let element = container.downcast_mut::<[T; N]>()?.get_mut(index)?;
        Some(element)
    }

    fn reserve_element(&self, _container: &mut dyn Object) -> Option<Box<dyn Object>> {
        None
    }

    fn store_element(&self, _container: &mut dyn Object, element: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        Err(element)
    }

    fn store_element_at(
        &self,
        container: &mut dyn Object,
        index: usize,
        element: Box<dyn Object>,
    ) -> Result<(), Box<dyn Object>> {
        let Some(slot) = container
            .downcast_mut::<[T; N]>()
            .and_then(|array| array.get_mut(index))
        else {
            return Err(element);
        };
        *slot = *element.downcast::<T>()?;
        Ok(())
    }

    fn clear_elements(&self, container: &mut dyn Object) {
        if let Some(array) = container.downcast_mut::<[T; N]>() {
            array.fill_with(T::default);
        }
    }

    fn enum_elements(&self, container: &dyn Object, visit: &mut dyn FnMut(&dyn Object) -> bool) {
        if let Some(array) = container.downcast_ref::<[T; N]>() {
            for element in array {
                if !visit(element) {
                    break;
                }
            }
        }
    }

    fn enum_elements_mut(&self, container: &mut dyn Object, visit: &mut dyn FnMut(&mut dyn Object) -> bool) {
        if let Some(array) = container.downcast_mut::<[T; N]>() {
            for element in array {
                if !visit(element) {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::ArrayAdapter;
    use crate::Typed;
    use crate::container::ContainerAdapter;

    #[test]
    fn fixed_size_contract() {
        let adapter = ArrayAdapter::<u8, 3>::new();
        let mut slots = [1_u8, 2, 3];

        assert!(adapter.is_fixed_size());
        assert_eq!(adapter.size(&slots), 3);
        assert!(adapter.reserve_element(&mut slots).is_none());
        assert!(adapter.store_element(&mut slots, Box::new(4_u8)).is_err());

        adapter.store_element_at(&mut slots, 1, Box::new(9_u8)).unwrap();
        assert!(adapter.store_element_at(&mut slots, 3, Box::new(9_u8)).is_err());
        assert_eq!(slots, [1, 9, 3]);

        adapter.clear_elements(&mut slots);
        assert_eq!(slots, [0, 0, 0]);
    }

    #[test]
    fn length_is_part_of_the_identity() {
        assert_ne!(<[u8; 2]>::type_uuid(), <[u8; 3]>::type_uuid());
        assert_ne!(<[u8; 2]>::type_uuid(), <[i8; 2]>::type_uuid());
    }
}
