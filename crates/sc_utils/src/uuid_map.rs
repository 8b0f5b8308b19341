use core::fmt::Debug;

use hashbrown::hash_map::Entry;
use uuid::Uuid;

use crate::hash::NoOpHashMap;
use crate::hash::NoOpHashState;

// -----------------------------------------------------------------------------
// UuidMap

/// A specialized map container with [`Uuid`] as the fixed key type.
///
/// Uuids are already uniformly distributed, so keys are folded into the
/// hash directly instead of going through a real hash function.
///
/// The container's interface is fully abstracted, exposing no `HashMap`
/// specific APIs.
pub struct UuidMap<V>(NoOpHashMap<Uuid, V>);

impl<V> UuidMap<V> {
    /// Creates an empty `UuidMap`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sc_utils::UuidMap;
    /// let map = UuidMap::<i32>::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self(NoOpHashMap::with_hasher(NoOpHashState))
    }

    /// Attempts to insert a key-value pair into the map.
    ///
    /// - Returns `true` if the key was not present and the pair was successfully inserted.
    /// - Returns `false` if the key already exists, leaving the map unchanged.
    ///
    /// The closure `f` is only called if the key is not present.
    #[inline]
    pub fn try_insert(&mut self, key: Uuid, f: impl FnOnce() -> V) -> bool {
        match self.0.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(f());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Returns a reference to the value corresponding to the key.
    #[inline]
    pub fn get(&self, key: &Uuid) -> Option<&V> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    #[inline]
    pub fn get_mut(&mut self, key: &Uuid) -> Option<&mut V> {
        self.0.get_mut(key)
    }

    /// Inserts a key-value pair into the map, returning the previous value.
    #[inline]
    pub fn insert(&mut self, key: Uuid, v: V) -> Option<V> {
        self.0.insert(key, v)
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in the map.
    #[inline]
    pub fn remove(&mut self, key: &Uuid) -> Option<V> {
        self.0.remove(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[inline]
    pub fn contains(&self, key: &Uuid) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of elements in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Clears the map, keeping the allocated memory for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// An iterator visiting all key-value pairs in arbitrary order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Uuid, &V)> {
        self.0.iter()
    }

    /// An iterator visiting all values in arbitrary order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.0.values()
    }

    /// An iterator visiting all keys in arbitrary order.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Uuid> {
        self.0.keys()
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<V> Default for UuidMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Clone for UuidMap<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<V: Debug> Debug for UuidMap<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::UuidMap;

    #[test]
    fn try_insert_keeps_first_value() {
        let key = Uuid::from_u128(0x1234);
        let mut map = UuidMap::new();
        assert!(map.try_insert(key, || 1));
        assert!(!map.try_insert(key, || 2));
        assert_eq!(map.get(&key), Some(&1));
        assert_eq!(map.remove(&key), Some(1));
        assert!(map.is_empty());
    }
}
