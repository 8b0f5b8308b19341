use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use core::marker::PhantomData;

use super::{ClassDescriptor, EventHandler, FieldDescriptor, FieldFlags, GenericType};
use super::{RegistrationError, RegistrationToken, RttiHelper, TypeRegistry, VersionConverter};
use super::{pointer_access, value_access};
use crate::container::ContainerAdapter;
use crate::serializer::DataSerializer;
use crate::upgrade::DataPatchUpgrade;
use crate::{Object, PointerSlot, TypeUuid, Typed};

/// Describes the shape of `T` field by field.
///
/// Created by [`TypeRegistry::class`] or [`TypeRegistry::abstract_class`].
/// Nothing is registered until [`register`](Self::register) is called, the
/// first mistake made while building is reported there.
///
/// # Examples
///
/// ```
/// use sc_serialize::{TypeRegistry, impl_typed};
///
/// #[derive(Default)]
/// struct Shape { name: String }
/// #[derive(Default)]
/// struct Circle { shape: Shape, radius: f32, tags: Vec<String> }
///
/// impl_typed!(Shape, "{AC1F0C55-8B9B-4D3B-8C6C-2A4F7F0E1A01}");
/// impl_typed!(Circle, "{AC1F0C55-8B9B-4D3B-8C6C-2A4F7F0E1A02}");
///
/// let mut registry = TypeRegistry::new();
/// registry
///     .class::<Shape>()
///     .field("name", |s| &s.name, |s| &mut s.name)
///     .register()
///     .unwrap();
/// registry
///     .class::<Circle>()
///     .version(2, None)
///     .base_class(|c| &c.shape, |c| &mut c.shape)
///     .field("radius", |c| &c.radius, |c| &mut c.radius)
///     .attribute("min", "0.0")
///     .container_field("tags", |c| &c.tags, |c| &mut c.tags)
///     .name_change(1, 2, "r", "radius")
///     .register()
///     .unwrap();
/// ```
#[must_use = "nothing is registered until `register` is called"]
pub struct ClassBuilder<'r, T: Typed> {
    registry: &'r mut TypeRegistry,
    class: ClassDescriptor,
    error: Option<RegistrationError>,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T: Typed> ClassBuilder<'r, T> {
    pub(crate) fn new(registry: &'r mut TypeRegistry, class: ClassDescriptor) -> Self {
        Self {
            registry,
            class,
            error: None,
            _marker: PhantomData,
        }
    }

    fn fail(&mut self, error: RegistrationError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn push_field(mut self, field: FieldDescriptor) -> Self {
        if self.class.find_field(field.name_hash()).is_some() {
            let error = RegistrationError::DuplicateField {
                name: self.class.name(),
                field: field.name(),
            };
            self.fail(error);
        }
        self.class.fields_mut().push(field);
        self
    }

    /// Sets the current version and the converter of older documents.
    pub fn version(mut self, version: u32, converter: Option<VersionConverter>) -> Self {
        self.class = self.class.with_version(version, converter);
        self
    }

    /// Adds a field stored inline.
    pub fn field<F: Typed>(
        self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        let field = FieldDescriptor::new(name, F::type_uuid(), value_access(get, get_mut));
        self.push_field(field)
    }

    /// Adds a field holding a generic specialization, registering it on demand.
    pub fn container_field<F: GenericType>(
        self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> Self {
        let generic = self.registry.register_generic::<F>();
        let field = FieldDescriptor::new(name, F::type_uuid(), value_access(get, get_mut))
            .with_generic(generic);
        self.push_field(field)
    }

    /// Adds the embedded storage of the base class `B`.
    ///
    /// The field is named after the base class.
    pub fn base_class<B: Typed>(self, get: fn(&T) -> &B, get_mut: fn(&mut T) -> &mut B) -> Self {
        let field = FieldDescriptor::new(B::type_name(), B::type_uuid(), value_access(get, get_mut))
            .with_flags(FieldFlags::BASE_CLASS);
        self.push_field(field)
    }

    /// Adds an owning pointer field whose pointee is at least a `declared`.
    pub fn pointer_field<P: PointerSlot>(
        self,
        name: &'static str,
        declared: TypeUuid,
        get: fn(&T) -> &P,
        get_mut: fn(&mut T) -> &mut P,
    ) -> Self {
        let mut field = FieldDescriptor::new(name, declared, pointer_access(get, get_mut));
        if let Some(rtti) = self.registry.class_data(declared).and_then(|c| c.rtti()) {
            field = field.with_rtti(rtti.clone());
        }
        self.push_field(field)
    }

    /// Adds an `Option<Box<F>>` field.
    pub fn boxed_field<F: Typed>(
        self,
        name: &'static str,
        get: fn(&T) -> &Option<Box<F>>,
        get_mut: fn(&mut T) -> &mut Option<Box<F>>,
    ) -> Self {
        self.pointer_field(name, F::type_uuid(), get, get_mut)
    }

    /// Adds an `Option<Box<dyn Object>>` field accepting any registered type.
    pub fn dynamic_field(
        self,
        name: &'static str,
        get: fn(&T) -> &Option<Box<dyn Object>>,
        get_mut: fn(&mut T) -> &mut Option<Box<dyn Object>>,
    ) -> Self {
        let field = FieldDescriptor::new(name, TypeUuid::NIL, pointer_access(get, get_mut))
            .with_flags(FieldFlags::DYNAMIC);
        self.push_field(field)
    }

    /// Attaches editor metadata to the last added field.
    pub fn attribute(mut self, key: &'static str, value: impl Into<String>) -> Self {
        match self.class.fields_mut().last_mut() {
            Some(field) => field.push_attribute(key, value.into()),
            None => {
                let error = RegistrationError::AttributeWithoutField {
                    name: self.class.name(),
                    key,
                };
                self.fail(error);
            }
        }
        self
    }

    /// Declares that field `old_name` was renamed to `new_name` between versions.
    pub fn name_change(
        mut self,
        from_version: u32,
        to_version: u32,
        old_name: &'static str,
        new_name: &'static str,
    ) -> Self {
        let name = self.class.name();
        if from_version >= to_version {
            self.fail(RegistrationError::BackwardUpgrade {
                name,
                field: old_name,
                from: from_version,
                to: to_version,
            });
            return self;
        }
        let upgrade = DataPatchUpgrade::name_change(from_version, to_version, old_name, new_name);
        if self.class.upgrades_mut().add(upgrade).is_err() {
            self.fail(RegistrationError::DuplicateUpgrade {
                name,
                field: old_name,
                from: from_version,
                to: to_version,
            });
        }
        self
    }

    /// Makes `T` a scalar encoded by `serializer`.
    pub fn serializer(mut self, serializer: Arc<dyn DataSerializer>) -> Self {
        self.class = self.class.with_serializer(serializer);
        self
    }

    /// Makes `T` a container traversed by `adapter`.
    pub fn container(mut self, adapter: Arc<dyn ContainerAdapter>) -> Self {
        self.class = self.class.with_container(adapter);
        self
    }

    pub fn event_handler(mut self, events: Arc<dyn EventHandler>) -> Self {
        self.class = self.class.with_events(events);
        self
    }

    pub fn rtti(mut self, rtti: Arc<RttiHelper>) -> Self {
        self.class = self.class.with_rtti(rtti);
        self
    }

    /// Declares how to read the persistent id of an instance.
    pub fn persistent_id(mut self, id: fn(&T) -> Option<u64>) -> Self {
        let id = Box::new(move |instance: &dyn Object| instance.downcast_ref::<T>().and_then(id));
        self.class = self.class.with_persistent_id(id);
        self
    }

    /// Registers the described class.
    pub fn register(self) -> Result<RegistrationToken, RegistrationError> {
        if let Some(error) = self.error {
            log::error!("{error}");
            return Err(error);
        }
        self.registry.register_class(self.class)
    }
}
