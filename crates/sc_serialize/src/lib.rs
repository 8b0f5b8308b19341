//! Runtime type registry and serialization engine.
//!
//! Types describe themselves once to a [`TypeRegistry`]: their fields, their
//! base classes, how scalars are encoded and how containers are traversed.
//! Every other operation is driven by those descriptors:
//!
//! - [`walk`]: depth-first traversal of a live object graph.
//! - [`document`]: the in-memory [`DocumentNode`] tree with its binary and
//!   text encodings.
//! - [`upgrade`]: renaming of fields between class versions.
//! - [`clone`]: deep copies of arbitrary reflected values.
//!
//! # Examples
//!
//! ```
//! use sc_serialize::{TypeRegistry, impl_typed};
//! use sc_serialize::walk::ErrorHandler;
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! impl_typed!(Point, "{5B6C1B6A-6F4A-4BB2-A0B4-6F2C1A1D3E01}");
//!
//! let mut registry = TypeRegistry::new();
//! registry
//!     .class::<Point>()
//!     .field("x", |p| &p.x, |p| &mut p.x)
//!     .field("y", |p| &p.y, |p| &mut p.y)
//!     .register()
//!     .unwrap();
//!
//! let mut errors = ErrorHandler::new();
//! let copy = registry.clone_object(&Point { x: 1, y: 2 }, &mut errors).unwrap();
//! assert_eq!(copy.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod ident;

pub mod clone;
pub mod container;
pub mod document;
pub mod object;
pub mod registry;
pub mod serializer;
pub mod upgrade;
pub mod walk;

#[cfg(test)]
mod tests;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    pub use uuid;
}

pub use ident::{NameHash, TypeUuid};
pub use object::{AnyValue, Object, PointerSlot, Typed};
pub use registry::{ClassDescriptor, FieldDescriptor, TypeRegistry, TypeRegistryArc};

pub use document::DocumentNode;
pub use walk::ErrorHandler;

pub use uuid::Uuid;
