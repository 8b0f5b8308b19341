//! Type descriptors and the registry that owns them.
//!
//! - [`TypeRegistry`]: the descriptor tables and their lookups.
//! - [`ClassDescriptor`] / [`FieldDescriptor`]: the reflected shape of a type.
//! - [`ClassBuilder`]: the typed registration surface.
//! - [`RttiHelper`]: runtime is-a queries and casts.
//! - [`GenericClassInfo`]: shared descriptors of generic specializations.
//! - [`ReflectModule`]: grouped registration with rollback.

// -----------------------------------------------------------------------------
// Modules

mod access;
mod builder;
mod class_data;
mod error;
mod events;
mod generic;
mod module;
mod rtti;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use builder::ClassBuilder;
pub use class_data::{ClassDescriptor, Factory, FieldAccess, FieldDescriptor, FieldFlags};
pub use class_data::{PersistentIdFn, VERSION_DEPRECATED, VersionConverter};
pub use error::RegistrationError;
pub use events::EventHandler;
pub use generic::{GenericClassInfo, GenericType};
pub use module::{ModuleHandle, ReflectModule};
pub use rtti::{RttiBase, RttiHelper};
pub use type_registry::{RegistrationToken, TypeRegistry, TypeRegistryArc};

pub(crate) use access::{pointer_access, value_access};
pub use class_data::default_factory;
