//! Small shared utilities for the serialization workspace.
//!
//! - [`hash`]: fixed-seed hashing and hash containers built on *hashbrown* and *foldhash*.
//! - [`UuidMap`]: a map keyed by 128-bit uuids.
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod uuid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use uuid_map::UuidMap;
