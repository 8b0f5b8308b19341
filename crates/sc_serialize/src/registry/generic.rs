use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{ClassDescriptor, TypeRegistry};
use crate::{TypeUuid, Typed};

/// The shared descriptor of one specialization of a generic type.
///
/// Fields holding a generic type carry the info, so the registry can resolve
/// the specialization from the field even when it was never registered on
/// its own.
#[derive(Debug)]
pub struct GenericClassInfo {
    generic_uuid: TypeUuid,
    arguments: Vec<TypeUuid>,
    class: Arc<ClassDescriptor>,
    storable: Vec<TypeUuid>,
}

impl GenericClassInfo {
    /// Wraps the descriptor of a specialization.
    ///
    /// The specialized identity is the identity of `class`.
    pub fn new(generic_uuid: TypeUuid, arguments: Vec<TypeUuid>, class: ClassDescriptor) -> Self {
        Self {
            generic_uuid,
            arguments,
            class: Arc::new(class),
            storable: Vec::new(),
        }
    }

    /// Accepts documents written with `type_uuid` for this specialization.
    pub fn with_storable_type(mut self, type_uuid: TypeUuid) -> Self {
        self.storable.push(type_uuid);
        self
    }

    #[inline]
    pub fn specialized_uuid(&self) -> TypeUuid {
        self.class.type_uuid()
    }

    #[inline]
    pub fn generic_uuid(&self) -> TypeUuid {
        self.generic_uuid
    }

    #[inline]
    pub fn template_arguments(&self) -> &[TypeUuid] {
        &self.arguments
    }

    #[inline]
    pub fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    #[inline]
    pub fn class_arc(&self) -> &Arc<ClassDescriptor> {
        &self.class
    }

    /// Returns `true` if this specialization can materialize `type_uuid`.
    pub fn can_store_type(&self, type_uuid: TypeUuid) -> bool {
        self.class.type_uuid() == type_uuid || self.storable.contains(&type_uuid)
    }
}

/// A generic type whose specializations describe themselves on demand.
///
/// Implemented for `Vec<T>`, `[T; N]`, `Option<T>`, `HashMap<K, V>`,
/// `BTreeMap<K, V>` and `(K, V)`.
pub trait GenericType: Typed {
    fn generic_uuid() -> TypeUuid;

    fn template_arguments() -> Vec<TypeUuid>;

    /// Builds the descriptor of `Self`.
    ///
    /// Specializations depending on other generic types register them here.
    fn reflect_generic(registry: &mut TypeRegistry) -> GenericClassInfo;
}
