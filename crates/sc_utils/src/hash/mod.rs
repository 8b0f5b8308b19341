//! Provide hash containers, re-exports *hashbrown* and *foldhash*.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] using the stable [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] using the stable [`FixedHashState`].
pub type HashSet<K> = hashbrown::HashSet<K, FixedHashState>;

/// A [`hashbrown::HashMap`] whose keys are already well distributed.
pub type NoOpHashMap<K, V> = hashbrown::HashMap<K, V, NoOpHashState>;

/// Hashes `value` once with the [`FixedHashState`].
///
/// The result only depends on the input, so it is stable for the lifetime
/// of the process and across processes built from the same sources.
///
/// # Examples
///
/// ```
/// use sc_utils::hash::hash_one;
///
/// assert_eq!(hash_one("position"), hash_one("position"));
/// assert_ne!(hash_one("position"), hash_one("rotation"));
/// ```
#[inline]
pub fn hash_one<T: core::hash::Hash + ?Sized>(value: &T) -> u64 {
    use core::hash::BuildHasher;
    FixedHashState.hash_one(value)
}

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;
