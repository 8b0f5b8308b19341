use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;

use super::{ContainerAdapter, ELEMENT_NAME};
use crate::object::builtin;
use crate::registry::{ClassDescriptor, FieldDescriptor, GenericClassInfo, GenericType, TypeRegistry};
use crate::{NameHash, Object, TypeUuid, Typed};

impl<T: Typed + Default> Typed for Vec<T> {
    fn type_uuid() -> TypeUuid {
        builtin::VEC.combine(&[T::type_uuid()])
    }

    fn type_name() -> &'static str {
        "Vec"
    }

    fn register_generic_info(registry: &mut TypeRegistry) -> Option<Arc<GenericClassInfo>> {
        Some(registry.register_generic::<Self>())
    }
}

impl<T: Typed + Default> GenericType for Vec<T> {
    fn generic_uuid() -> TypeUuid {
        builtin::VEC
    }

    fn template_arguments() -> Vec<TypeUuid> {
        vec![T::type_uuid()]
    }

    fn reflect_generic(registry: &mut TypeRegistry) -> GenericClassInfo {
        let element = T::register_generic_info(registry);
        let adapter = VecAdapter::<T>::new().with_element_generic(element);
        let class = ClassDescriptor::with_default::<Self>().with_container(Arc::new(adapter));
        GenericClassInfo::new(builtin::VEC, Self::template_arguments(), class)
    }
}

/// The [`ContainerAdapter`] of `Vec<T>`.
pub struct VecAdapter<T> {
    element: FieldDescriptor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Typed + Default> VecAdapter<T> {
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

impl<T: Typed + Default> ContainerAdapter for VecAdapter<T> {
    fn element(&self, name_hash: NameHash) -> Option<&FieldDescriptor> {
        (self.element.name_hash() == name_hash).then_some(&self.element)
    }

    fn element_descriptor(&self) -> &FieldDescriptor {
        &self.element
    }

    fn size(&self, container: &dyn Object) -> usize {
        container.downcast_ref::<Vec<T>>().map_or(0, Vec::len)
    }

    fn can_access_elements_by_index(&self) -> bool {
        true
    }

    fn element_by_index<'a>(&self, container: &'a dyn Object, index: usize) -> Option<&'a dyn Object> {
        let element = container.downcast_ref::<Vec<T>>()?.get(index)?;
        Some(element)
    }

    fn element_by_index_mut<'a>(
        &self,
        container: &'a mut dyn Object,
        index: usize,
    ) -> Option<&'a mut dyn Object> {
        let element = container.downcast_mut::<Vec<T>>()?.get_mut(index)?;
        Some(element)
    }

    fn reserve_element(&self, container: &mut dyn Object) -> Option<Box<dyn Object>> {
        container.is::<Vec<T>>().then(|| Box::new(T::default()) as Box<dyn Object>)
    }

    fn store_element(&self, container: &mut dyn Object, element: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        let Some(vec) = container.downcast_mut::<Vec<T>>() else {
            return Err(element);
        };
        vec.push(*element.downcast::<T>()?);
        Ok(())
    }

    fn store_element_at(
        &self,
        container: &mut dyn Object,
        index: usize,
        element: Box<dyn Object>,
    ) -> Result<(), Box<dyn Object>> {
        let Some(vec) = container.downcast_mut::<Vec<T>>() else {
            return Err(element);
        };
        if index > vec.len() {
            return Err(element);
        }
        let element = *element.downcast::<T>()?;
        if index == vec.len() {
            vec.push(element);
        } else {
            vec[index] = element;
        }
        Ok(())
    }

    fn clear_elements(&self, container: &mut dyn Object) {
        if let Some(vec) = container.downcast_mut::<Vec<T>>() {
            vec.clear();
        }
    }

    fn enum_elements(&self, container: &dyn Object, visit: &mut dyn FnMut(&dyn Object) -> bool) {
        if let Some(vec) = container.downcast_ref::<Vec<T>>() {
            for element in vec {
                if !visit(element) {
                    break;
                }
            }
        }
    }

    fn enum_elements_mut(&self, container: &mut dyn Object, visit: &mut dyn FnMut(&mut dyn Object) -> bool) {
        if let Some(vec) = container.downcast_mut::<Vec<T>>() {
            for element in vec {
                if !visit(element) {
                    break;
                }
            }
        }
    }
}
