use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::hash::Hash;
use core::marker::PhantomData;
use std::collections::HashMap;

use super::{ContainerAdapter, ELEMENT_NAME};
use crate::object::builtin;
use crate::registry::{ClassDescriptor, FieldDescriptor, GenericClassInfo, GenericType, TypeRegistry};
use crate::{NameHash, Object, TypeUuid, Typed};

/// An associative container whose entries are walked as `(key, value)` pairs.
pub trait MapStorage: Typed + Default {
    type Key: Typed + Default + Clone;
    type Value: Typed + Default + Clone;

    const GENERIC_UUID: TypeUuid;

    fn entry_count(&self) -> usize;

    fn entries(&self) -> impl Iterator<Item = (&Self::Key, &Self::Value)>;

    fn entries_mut(&mut self) -> impl Iterator<Item = (&Self::Key, &mut Self::Value)>;

    /// Inserts an entry, replacing the value of an existing key.
    fn insert_entry(&mut self, key: Self::Key, value: Self::Value);

    fn clear_entries(&mut self);
}

impl<K, V> Typed for HashMap<K, V>
where
    K: Typed + Default + Clone + Eq + Hash,
    V: Typed + Default + Clone,
{
    fn type_uuid() -> TypeUuid {
        builtin::HASH_MAP.combine(&[K::type_uuid(), V::type_uuid()])
    }

    fn type_name() -> &'static str {
        "HashMap"
    }

    fn register_generic_info(registry: &mut TypeRegistry) -> Option<Arc<GenericClassInfo>> {
        Some(registry.register_generic::<Self>())
    }
}

impl<K, V> MapStorage for HashMap<K, V>
where
    K: Typed + Default + Clone + Eq + Hash,
    V: Typed + Default + Clone,
{
    type Key = K;
    type Value = V;

    const GENERIC_UUID: TypeUuid = builtin::HASH_MAP;

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.iter_mut()
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn clear_entries(&mut self) {
        self.clear();
    }
}

impl<K, V> Typed for BTreeMap<K, V>
where
    K: Typed + Default + Clone + Ord,
    V: Typed + Default + Clone,
{
    fn type_uuid() -> TypeUuid {
        builtin::BTREE_MAP.combine(&[K::type_uuid(), V::type_uuid()])
    }

    fn type_name() -> &'static str {
        "BTreeMap"
    }

    fn register_generic_info(registry: &mut TypeRegistry) -> Option<Arc<GenericClassInfo>> {
        Some(registry.register_generic::<Self>())
    }
}

impl<K, V> MapStorage for BTreeMap<K, V>
where
    K: Typed + Default + Clone + Ord,
    V: Typed + Default + Clone,
{
    type Key = K;
    type Value = V;

    const GENERIC_UUID: TypeUuid = builtin::BTREE_MAP;

    fn entry_count(&self) -> usize {
        self.len()
    }

    fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.iter()
    }

    fn entries_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.iter_mut()
    }

    fn insert_entry(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn clear_entries(&mut self) {
        self.clear();
    }
}

macro_rules! impl_map_generic {
    ($($map:ident: $($bound:path),*;)*) => {$(
        impl<K, V> GenericType for $map<K, V>
        where
            K: Typed + Default + Clone $(+ $bound)*,
            V: Typed + Default + Clone,
        {
            fn generic_uuid() -> TypeUuid {
                <Self as MapStorage>::GENERIC_UUID
            }

            fn template_arguments() -> Vec<TypeUuid> {
                vec![K::type_uuid(), V::type_uuid()]
            }

            fn reflect_generic(registry: &mut TypeRegistry) -> GenericClassInfo {
                let pair = registry.register_generic::<(K, V)>();
                let adapter = MapAdapter::<Self>::new().with_element_generic(Some(pair));
                let class = ClassDescriptor::with_default::<Self>().with_container(Arc::new(adapter));
                GenericClassInfo::new(Self::generic_uuid(), Self::template_arguments(), class)
            }
        }
    )*};
}

impl_map_generic! {
    HashMap: Eq, Hash;
    BTreeMap: Ord;
}

/// The [`ContainerAdapter`] of a [`MapStorage`].
///
/// Elements are detached `(key, value)` copies: the mutable enumeration
/// writes the value back into the map once the visitor returns, keys are
/// never modified in place.
pub struct MapAdapter<M> {
    element: FieldDescriptor,
    _marker: PhantomData<fn() -> M>,
}

impl<M: MapStorage> MapAdapter<M> {
    pub fn new() -> Self {
        Self {
            element: FieldDescriptor::element(ELEMENT_NAME, <(M::Key, M::Value)>::type_uuid()),
            _marker: PhantomData,
        }
    }

    /// Attaches the generic info of the `(key, value)` pair.
    pub fn with_element_generic(mut self, generic: Option<Arc<GenericClassInfo>>) -> Self {
        if let Some(generic) = generic {
            self.element = self.element.with_generic(generic);
        }
        self
    }
}

impl<M: MapStorage> ContainerAdapter for MapAdapter<M> {
    fn element(&self, name_hash: NameHash) -> Option<&FieldDescriptor> {
        (self.element.name_hash() == name_hash).then_some(&self.element)
    }

    fn element_descriptor(&self) -> &FieldDescriptor {
        &self.element
    }

    fn size(&self, container: &dyn Object) -> usize {
        container.downcast_ref::<M>().map_or(0, M::entry_count)
    }

    fn can_access_elements_by_index(&self) -> bool {
        false
    }

    fn element_by_index<'a>(&self, _container: &'a dyn Object, _index: usize) -> Option<&'a dyn Object> {
        None
    }

    fn element_by_index_mut<'a>(
        &self,
        _container: &'a mut dyn Object,
        _index: usize,
    ) -> Option<&'a mut dyn Object> {
        None
    }

    fn reserve_element(&self, container: &mut dyn Object) -> Option<Box<dyn Object>> {
        container
            .is::<M>()
            .then(|| Box::new(<(M::Key, M::Value)>::default()) as Box<dyn Object>)
    }

    fn store_element(&self, container: &mut dyn Object, element: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        let Some(map) = container.downcast_mut::<M>() else {
            return Err(element);
        };
        let (key, value) = *element.downcast::<(M::Key, M::Value)>()?;
        map.insert_entry(key, value);
        Ok(())
    }

    fn clear_elements(&self, container: &mut dyn Object) {
        if let Some(map) = container.downcast_mut::<M>() {
            map.clear_entries();
        }
    }

    fn enum_elements(&self, container: &dyn Object, visit: &mut dyn FnMut(&dyn Object) -> bool) {
        if let Some(map) = container.downcast_ref::<M>() {
            for (key, value) in map.entries() {
                let pair = (key.clone(), value.clone());
                if !visit(&pair) {
                    break;
                }
            }
        }
    }

    fn enum_elements_mut(&self, container: &mut dyn Object, visit: &mut dyn FnMut(&mut dyn Object) -> bool) {
        if let Some(map) = container.downcast_mut::<M>() {
            for (key, value) in map.entries_mut() {
                let mut pair = (key.clone(), value.clone());
                let proceed = visit(&mut pair);
                *value = pair.1;
                if !proceed {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::MapAdapter;
    use crate::Object;
    use crate::container::ContainerAdapter;

    #[test]
    fn entries_are_visited_as_pairs() {
        let adapter = MapAdapter::<BTreeMap<u32, String>>::new();
        let mut map: BTreeMap<u32, String> = BTreeMap::new();

        for (key, value) in [(2_u32, "two"), (1, "one")] {
            let mut element = adapter.reserve_element(&mut map).unwrap();
            *element.downcast_mut::<(u32, String)>().unwrap() = (key, value.into());
            adapter.store_element(&mut map, element).unwrap();
        }
        assert_eq!(adapter.size(&map), 2);
        assert!(!adapter.can_access_elements_by_index());

        let mut keys = Vec::new();
        adapter.enum_elements(&map, &mut |e: &dyn Object| {
            keys.push(e.downcast_ref::<(u32, String)>().unwrap().0);
            true
        });
        assert_eq!(keys, [1, 2]);

        adapter.enum_elements_mut(&mut map, &mut |e: &mut dyn Object| {
            e.downcast_mut::<(u32, String)>().unwrap().1.push('!');
            true
        });
        assert_eq!(map[&1], "one!");
        assert_eq!(map[&2], "two!");
    }
}
