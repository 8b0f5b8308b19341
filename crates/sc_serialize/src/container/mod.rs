//! Uniform access to the elements of container types.
//!
//! Each container class carries a [`ContainerAdapter`]. The walker, the
//! document loader and the clone pipeline only talk to containers through it.
//!
//! Built-in adapters cover `Vec<T>`, `[T; N]`, `Option<T>`, `HashMap<K, V>`
//! and `BTreeMap<K, V>`, registered as generic specializations. Maps expose
//! their entries as `(K, V)` pairs with the fields `key` and `value`.

// -----------------------------------------------------------------------------
// Modules

mod array;
mod map;
mod option;
mod pair;
mod vec;

// -----------------------------------------------------------------------------
// Exports

pub use array::ArrayAdapter;
pub use map::{MapAdapter, MapStorage};
pub use option::OptionAdapter;
pub use vec::VecAdapter;

use alloc::boxed::Box;

use crate::registry::{ClassDescriptor, FieldDescriptor};
use crate::{NameHash, Object};

/// The document name of container elements.
pub const ELEMENT_NAME: &str = "element";

/// Element access for one container type.
///
/// Growable containers take new elements through
/// [`reserve_element`](Self::reserve_element) and
/// [`store_element`](Self::store_element). Fixed-size containers refuse to
/// reserve and are filled by index instead.
pub trait ContainerAdapter: Send + Sync {
    /// The element slot named `name_hash`, if the container has one.
    fn element(&self, name_hash: NameHash) -> Option<&FieldDescriptor>;

    /// The slot every element is reported with.
    fn element_descriptor(&self) -> &FieldDescriptor;

    fn size(&self, container: &dyn Object) -> usize;

    fn can_access_elements_by_index(&self) -> bool;

    fn is_fixed_size(&self) -> bool {
        false
    }

    fn element_by_index<'a>(&self, container: &'a dyn Object, index: usize) -> Option<&'a dyn Object>;

    fn element_by_index_mut<'a>(
        &self,
        container: &'a mut dyn Object,
        index: usize,
    ) -> Option<&'a mut dyn Object>;

    /// Creates a detached default element to fill before storing it.
    ///
    /// Returns `None` when the container cannot take another element.
    fn reserve_element(&self, container: &mut dyn Object) -> Option<Box<dyn Object>>;

    /// Appends a reserved element, handing it back if it does not fit.
    fn store_element(&self, container: &mut dyn Object, element: Box<dyn Object>) -> Result<(), Box<dyn Object>>;

    /// Replaces the element at `index`.
    ///
    /// Growable containers also accept `index == size` as an append.
    fn store_element_at(
        &self,
        container: &mut dyn Object,
        index: usize,
        element: Box<dyn Object>,
    ) -> Result<(), Box<dyn Object>> {
        let _ = (container, index);
        Err(element)
    }

    /// Drops every element, fixed-size containers reset them to default.
    fn clear_elements(&self, container: &mut dyn Object);

    /// Visits the elements in order until `visit` returns `false`.
    fn enum_elements(&self, container: &dyn Object, visit: &mut dyn FnMut(&dyn Object) -> bool);

    /// Visits the elements mutably in order until `visit` returns `false`.
    fn enum_elements_mut(&self, container: &mut dyn Object, visit: &mut dyn FnMut(&mut dyn Object) -> bool);
}

/// Finds the position of the element whose persistent id is `id`.
///
/// `element_class` must declare a persistent id.
pub fn position_by_persistent_id(
    adapter: &dyn ContainerAdapter,
    element_class: &ClassDescriptor,
    container: &dyn Object,
    id: u64,
) -> Option<usize> {
    let mut index = 0;
    let mut found = None;
    adapter.enum_elements(container, &mut |element| {
        if element_class.persistent_id(element) == Some(id) {
            found = Some(index);
            return false;
        }
        index += 1;
        true
    });
    found
}
