use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use bitflags::bitflags;

use super::access::{ClearFn, GetFn, GetMutFn, SetFn, pointer_access};
use super::{EventHandler, GenericClassInfo, RttiHelper, TypeRegistry};
use crate::container::ContainerAdapter;
use crate::document::DocumentNode;
use crate::serializer::DataSerializer;
use crate::upgrade::DataPatchUpgradeMap;
use crate::{AnyValue, NameHash, Object, TypeUuid, Typed};

/// Version of a class kept only so old documents can still be converted.
pub const VERSION_DEPRECATED: u32 = u32::MAX;

/// Creates a default instance of a reflected type.
pub type Factory = fn() -> Box<dyn Object>;

/// Rewrites a document node written by an older version of its class.
///
/// Returns `false` if the node cannot be converted.
pub type VersionConverter = fn(&TypeRegistry, &mut DocumentNode) -> bool;

/// Extracts the stable id of an element, used to match elements across edits.
pub type PersistentIdFn = Box<dyn Fn(&dyn Object) -> Option<u64> + Send + Sync>;

/// A [`Factory`] building `T::default()`.
pub fn default_factory<T: Typed + Default>() -> Box<dyn Object> {
    Box::new(T::default())
}

// -----------------------------------------------------------------------------
// FieldDescriptor

bitflags! {
    /// Properties of a [`FieldDescriptor`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// The field owns a nullable pointer, the pointee may be a derived type.
        const POINTER = 1 << 0;
        /// The field is the embedded storage of a base class.
        const BASE_CLASS = 1 << 1;
        /// The declared type is not enforced on the pointee.
        const DYNAMIC = 1 << 2;
    }
}

/// How a field is reached from its owner.
pub enum FieldAccess {
    /// Stored inline.
    Value {
        get: Box<GetFn>,
        get_mut: Box<GetMutFn>,
        set: Box<SetFn>,
    },
    /// Stored behind a [`PointerSlot`](crate::PointerSlot).
    Pointer {
        get: Box<GetFn>,
        get_mut: Box<GetMutFn>,
        set: Box<SetFn>,
        clear: Box<ClearFn>,
    },
    /// A container element slot, reached through the container adapter.
    Element,
}

/// One reflected member of a class, or the element slot of a container.
pub struct FieldDescriptor {
    name: &'static str,
    name_hash: NameHash,
    type_uuid: TypeUuid,
    flags: FieldFlags,
    rtti: Option<Arc<RttiHelper>>,
    generic: Option<Arc<GenericClassInfo>>,
    attributes: Vec<(&'static str, String)>,
    access: FieldAccess,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, type_uuid: TypeUuid, access: FieldAccess) -> Self {
        let flags = match access {
            FieldAccess::Pointer { .. } => FieldFlags::POINTER,
            _ => FieldFlags::empty(),
        };
        Self {
            name,
            name_hash: NameHash::of(name),
            type_uuid,
            flags,
            rtti: None,
            generic: None,
            attributes: Vec::new(),
            access,
        }
    }

    /// The element slot of a container.
    pub fn element(name: &'static str, type_uuid: TypeUuid) -> Self {
        Self::new(name, type_uuid, FieldAccess::Element)
    }

    /// The synthesized payload field of an [`AnyValue`].
    pub(crate) fn any_payload(type_uuid: TypeUuid) -> Self {
        let access = pointer_access::<AnyValue, AnyValue>(|any| any, |any| any);
        Self::new(AnyValue::PAYLOAD_FIELD, type_uuid, access).with_flags(FieldFlags::DYNAMIC)
    }

    #[inline]
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn with_rtti(mut self, rtti: Arc<RttiHelper>) -> Self {
        self.rtti = Some(rtti);
        self
    }

    #[inline]
    pub fn with_generic(mut self, generic: Arc<GenericClassInfo>) -> Self {
        self.generic = Some(generic);
        self
    }

    #[inline]
    pub fn with_attribute(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((key, value.into()));
        self
    }

    #[inline]
    pub(crate) fn push_attribute(&mut self, key: &'static str, value: String) {
        self.attributes.push((key, value));
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn name_hash(&self) -> NameHash {
        self.name_hash
    }

    /// The declared type of the field.
    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.type_uuid
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.flags.contains(FieldFlags::POINTER)
    }

    #[inline]
    pub fn is_base_class(&self) -> bool {
        self.flags.contains(FieldFlags::BASE_CLASS)
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(FieldFlags::DYNAMIC)
    }

    #[inline]
    pub fn rtti(&self) -> Option<&Arc<RttiHelper>> {
        self.rtti.as_ref()
    }

    /// The generic adapter attached to this field, if it holds a generic type.
    #[inline]
    pub fn generic(&self) -> Option<&Arc<GenericClassInfo>> {
        self.generic.as_ref()
    }

    #[inline]
    pub fn attributes(&self) -> &[(&'static str, String)] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn access(&self) -> &FieldAccess {
        &self.access
    }

    /// Reads the field of `owner`.
    ///
    /// Pointer fields return the pointee, `None` when null.
    pub fn get<'a>(&self, owner: &'a dyn Object) -> Option<&'a dyn Object> {
        match &self.access {
            FieldAccess::Value { get, .. } | FieldAccess::Pointer { get, .. } => get(owner),
            FieldAccess::Element => None,
        }
    }

    pub fn get_mut<'a>(&self, owner: &'a mut dyn Object) -> Option<&'a mut dyn Object> {
        match &self.access {
            FieldAccess::Value { get_mut, .. } | FieldAccess::Pointer { get_mut, .. } => {
                get_mut(owner)
            }
            FieldAccess::Element => None,
        }
    }

    /// Stores `value` into the field of `owner`, handing it back on a type mismatch.
    pub fn set(&self, owner: &mut dyn Object, value: Box<dyn Object>) -> Result<(), Box<dyn Object>> {
        match &self.access {
            FieldAccess::Value { set, .. } | FieldAccess::Pointer { set, .. } => set(owner, value),
            FieldAccess::Element => Err(value),
        }
    }

    /// Nulls a pointer field, no-op for other fields.
    pub fn clear_pointer(&self, owner: &mut dyn Object) {
        if let FieldAccess::Pointer { clear, .. } = &self.access {
            clear(owner);
        }
    }

    // Used by idempotent re-registration, accessors cannot be compared.
    pub(crate) fn same_shape(&self, other: &Self) -> bool {
        self.name_hash == other.name_hash
            && self.type_uuid == other.type_uuid
            && self.flags == other.flags
            && core::mem::discriminant(&self.access) == core::mem::discriminant(&other.access)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type_uuid", &self.type_uuid)
            .field("flags", &self.flags)
            .field("generic", &self.generic.as_ref().map(|g| g.specialized_uuid()))
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ClassDescriptor

/// The reflected shape of one type.
///
/// A class is one of three things: a scalar with a [`DataSerializer`], a
/// container with a [`ContainerAdapter`], or a record with an ordered field
/// list. Base classes are fields flagged [`FieldFlags::BASE_CLASS`].
pub struct ClassDescriptor {
    name: &'static str,
    type_uuid: TypeUuid,
    version: u32,
    converter: Option<VersionConverter>,
    serializer: Option<Arc<dyn DataSerializer>>,
    container: Option<Arc<dyn ContainerAdapter>>,
    factory: Option<Factory>,
    rtti: Option<Arc<RttiHelper>>,
    events: Option<Arc<dyn EventHandler>>,
    persistent_id: Option<PersistentIdFn>,
    fields: Vec<FieldDescriptor>,
    upgrades: DataPatchUpgradeMap,
}

impl ClassDescriptor {
    pub fn new(name: &'static str, type_uuid: TypeUuid) -> Self {
        Self {
            name,
            type_uuid,
            version: 0,
            converter: None,
            serializer: None,
            container: None,
            factory: None,
            rtti: None,
            events: None,
            persistent_id: None,
            fields: Vec::new(),
            upgrades: DataPatchUpgradeMap::new(),
        }
    }

    /// A descriptor for `T` without factory.
    pub fn of<T: Typed>() -> Self {
        Self::new(T::type_name(), T::type_uuid())
    }

    /// A descriptor for `T` creating instances with `T::default()`.
    pub fn with_default<T: Typed + Default>() -> Self {
        Self::of::<T>().with_factory(default_factory::<T>)
    }

    #[inline]
    pub fn with_version(mut self, version: u32, converter: Option<VersionConverter>) -> Self {
        self.version = version;
        self.converter = converter;
        self
    }

    #[inline]
    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = Some(factory);
        self
    }

    #[inline]
    pub fn with_serializer(mut self, serializer: Arc<dyn DataSerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    #[inline]
    pub fn with_container(mut self, container: Arc<dyn ContainerAdapter>) -> Self {
        self.container = Some(container);
        self
    }

    #[inline]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[inline]
    pub fn with_rtti(mut self, rtti: Arc<RttiHelper>) -> Self {
        self.rtti = Some(rtti);
        self
    }

    #[inline]
    pub fn with_events(mut self, events: Arc<dyn EventHandler>) -> Self {
        self.events = Some(events);
        self
    }

    #[inline]
    pub fn with_persistent_id(mut self, persistent_id: PersistentIdFn) -> Self {
        self.persistent_id = Some(persistent_id);
        self
    }

    #[inline]
    pub(crate) fn fields_mut(&mut self) -> &mut Vec<FieldDescriptor> {
        &mut self.fields
    }

    #[inline]
    pub(crate) fn upgrades_mut(&mut self) -> &mut DataPatchUpgradeMap {
        &mut self.upgrades
    }

    #[inline]
    pub(crate) fn set_deprecated(&mut self, converter: Option<VersionConverter>) {
        self.version = VERSION_DEPRECATED;
        self.converter = converter;
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.type_uuid
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn is_deprecated(&self) -> bool {
        self.version == VERSION_DEPRECATED
    }

    #[inline]
    pub fn converter(&self) -> Option<VersionConverter> {
        self.converter
    }

    #[inline]
    pub fn serializer(&self) -> Option<&Arc<dyn DataSerializer>> {
        self.serializer.as_ref()
    }

    #[inline]
    pub fn container(&self) -> Option<&Arc<dyn ContainerAdapter>> {
        self.container.as_ref()
    }

    #[inline]
    pub fn factory(&self) -> Option<Factory> {
        self.factory
    }

    #[inline]
    pub fn rtti(&self) -> Option<&Arc<RttiHelper>> {
        self.rtti.as_ref()
    }

    #[inline]
    pub fn events(&self) -> Option<&Arc<dyn EventHandler>> {
        self.events.as_ref()
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline]
    pub fn upgrades(&self) -> &DataPatchUpgradeMap {
        &self.upgrades
    }

    /// Creates a default instance, `None` for abstract classes.
    #[inline]
    pub fn create(&self) -> Option<Box<dyn Object>> {
        self.factory.map(|factory| factory())
    }

    pub fn find_field(&self, name_hash: NameHash) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name_hash == name_hash)
    }

    pub fn find_field_index(&self, name_hash: NameHash) -> Option<usize> {
        self.fields.iter().position(|f| f.name_hash == name_hash)
    }

    /// Iterates the fields embedding base classes, in declaration order.
    pub fn base_classes(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_base_class())
    }

    /// The persistent id of `instance`, if the class declares one.
    pub fn persistent_id(&self, instance: &dyn Object) -> Option<u64> {
        self.persistent_id.as_ref().and_then(|f| f(instance))
    }

    pub(crate) fn same_shape(&self, other: &Self) -> bool {
        self.type_uuid == other.type_uuid
            && self.name == other.name
            && self.version == other.version
            && self.serializer.is_some() == other.serializer.is_some()
            && self.container.is_some() == other.container.is_some()
            && self.factory.is_some() == other.factory.is_some()
            && self.converter.is_some() == other.converter.is_some()
            && self.persistent_id.is_some() == other.persistent_id.is_some()
            && self.upgrades == other.upgrades
            && self.fields.len() == other.fields.len()
            && self.fields.iter().zip(&other.fields).all(|(a, b)| a.same_shape(b))
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("type_uuid", &self.type_uuid)
            .field("version", &self.version)
            .field("serializer", &self.serializer.is_some())
            .field("container", &self.container.is_some())
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}
