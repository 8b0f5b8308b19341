use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sc_utils::UuidMap;
use sc_utils::hash::{HashMap, HashSet};

use super::{ClassBuilder, ClassDescriptor, Factory, GenericClassInfo, GenericType};
use super::{RegistrationError, VersionConverter};
use crate::serializer::{EmptySerializer, EnumValueSerializer, Scalar, ScalarSerializer, StringSerializer};
use crate::{AnyValue, NameHash, Object, TypeUuid, Typed};

// -----------------------------------------------------------------------------
// RegistrationToken

/// Proof of a registration, hand it back to [`TypeRegistry::release`] to undo it.
#[derive(Debug, PartialEq, Eq)]
pub struct RegistrationToken {
    type_uuid: TypeUuid,
}

impl RegistrationToken {
    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.type_uuid
    }
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// The tables of every reflected type.
///
/// A registry is an explicit value: several registries can coexist, and a
/// shared one is wrapped in a [`TypeRegistryArc`]. All lookups take `&self`,
/// so any number of threads may read concurrently once registration is done.
///
/// [`TypeRegistry::new`] pre-registers the built-in scalars: `bool`, the
/// fixed-width integers, `f32`, `f64`, `String`, `()` and [`AnyValue`].
///
/// # Examples
///
/// ```
/// use sc_serialize::{TypeRegistry, Typed, impl_typed};
///
/// #[derive(Default)]
/// struct Health { value: f32 }
/// impl_typed!(Health, "{3A0C1F74-0B0E-4E55-9D8B-3C2E11A0F001}");
///
/// let mut registry = TypeRegistry::new();
/// let token = registry
///     .class::<Health>()
///     .field("value", |h| &h.value, |h| &mut h.value)
///     .register()
///     .unwrap();
///
/// assert!(registry.class_data(Health::type_uuid()).is_some());
/// assert!(registry.release(token));
/// assert!(registry.class_data(Health::type_uuid()).is_none());
/// ```
pub struct TypeRegistry {
    classes: UuidMap<Arc<ClassDescriptor>>,
    generics: UuidMap<Arc<GenericClassInfo>>,
    enums: UuidMap<Arc<ClassDescriptor>>,
    any_creators: UuidMap<Factory>,
    names: HashMap<&'static str, Vec<TypeUuid>>,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry without any type, not even the built-in scalars.
    pub fn empty() -> Self {
        Self {
            classes: UuidMap::new(),
            generics: UuidMap::new(),
            enums: UuidMap::new(),
            any_creators: UuidMap::new(),
            names: HashMap::default(),
        }
    }

    /// A registry holding the built-in scalars.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtins();
        registry
    }

    fn register_builtins(&mut self) {
        self.insert_scalar::<bool>();
        self.insert_scalar::<i8>();
        self.insert_scalar::<i16>();
        self.insert_scalar::<i32>();
        self.insert_scalar::<i64>();
        self.insert_scalar::<u8>();
        self.insert_scalar::<u16>();
        self.insert_scalar::<u32>();
        self.insert_scalar::<u64>();
        self.insert_scalar::<f32>();
        self.insert_scalar::<f64>();

        self.insert_class(
            ClassDescriptor::with_default::<alloc::string::String>()
                .with_serializer(Arc::new(StringSerializer)),
        );
        self.insert_class(
            ClassDescriptor::with_default::<()>().with_serializer(Arc::new(EmptySerializer)),
        );
        self.insert_class(ClassDescriptor::with_default::<AnyValue>());
    }

    fn insert_scalar<T: Scalar + Default>(&mut self) {
        self.insert_class(
            ClassDescriptor::with_default::<T>().with_serializer(Arc::new(ScalarSerializer::<T>::new())),
        );
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Starts describing `T`, instances are created with `T::default()`.
    #[inline]
    pub fn class<T: Typed + Default>(&mut self) -> ClassBuilder<'_, T> {
        ClassBuilder::new(self, ClassDescriptor::with_default::<T>())
    }

    /// Starts describing `T` without a factory.
    ///
    /// Abstract classes can be walked and saved, but never created.
    #[inline]
    pub fn abstract_class<T: Typed>(&mut self) -> ClassBuilder<'_, T> {
        ClassBuilder::new(self, ClassDescriptor::of::<T>())
    }

    /// Adds a complete descriptor.
    ///
    /// Registering the same shape again is a no-op, a different shape under
    /// the same identity is rejected.
    pub fn register_class(
        &mut self,
        class: ClassDescriptor,
    ) -> Result<RegistrationToken, RegistrationError> {
        let name = class.name();
        if class.serializer().is_some() {
            if !class.fields().is_empty() {
                return Err(RegistrationError::SerializerWithFields { name });
            }
            if class.container().is_some() {
                return Err(RegistrationError::SerializerWithContainer { name });
            }
        }

        let type_uuid = class.type_uuid();
        if let Some(existing) = self.classes.get(type_uuid.as_uuid()) {
            return if existing.same_shape(&class) {
                Ok(RegistrationToken { type_uuid })
            } else {
                Err(RegistrationError::Conflicting {
                    name,
                    uuid: type_uuid,
                })
            };
        }

        Ok(self.insert_class(class))
    }

    fn insert_class(&mut self, class: ClassDescriptor) -> RegistrationToken {
        let type_uuid = class.type_uuid();
        self.add_name(class.name(), type_uuid);
        if let Some(factory) = class.factory() {
            self.any_creators.insert(*type_uuid.as_uuid(), factory);
        }
        log::trace!("registered class `{}` {type_uuid}", class.name());
        self.classes.insert(*type_uuid.as_uuid(), Arc::new(class));
        RegistrationToken { type_uuid }
    }

    /// Registers the specialization `C` once, returning its shared info.
    pub fn register_generic<C: GenericType>(&mut self) -> Arc<GenericClassInfo> {
        let type_uuid = C::type_uuid();
        if let Some(info) = self.generics.get(type_uuid.as_uuid()) {
            return info.clone();
        }

        let info = Arc::new(C::reflect_generic(self));
        debug_assert_eq!(info.specialized_uuid(), type_uuid);

        self.add_name(info.class().name(), type_uuid);
        if let Some(factory) = info.class().factory() {
            self.any_creators.insert(*type_uuid.as_uuid(), factory);
        }
        log::trace!("registered generic `{}` {type_uuid}", info.class().name());
        self.generics.insert(*type_uuid.as_uuid(), info.clone());
        info
    }

    /// Registers `E` as an enumeration stored as its underlying scalar `U`.
    ///
    /// `from_underlying` returns `None` for values outside the enumeration,
    /// loading such a value is an error.
    pub fn register_enum<E, U>(
        &mut self,
        to_underlying: fn(&E) -> U,
        from_underlying: fn(U) -> Option<E>,
    ) -> Result<RegistrationToken, RegistrationError>
    where
        E: Typed + Default,
        U: Typed + Default,
    {
        let type_uuid = E::type_uuid();
        let underlying = self
            .class_data(U::type_uuid())
            .and_then(ClassDescriptor::serializer)
            .cloned()
            .ok_or(RegistrationError::UnderlyingNotScalar {
                name: E::type_name(),
                uuid: U::type_uuid(),
            })?;

        let class = ClassDescriptor::with_default::<E>().with_serializer(Arc::new(
            EnumValueSerializer::new(underlying, to_underlying, from_underlying),
        ));

        if let Some(existing) = self.enums.get(type_uuid.as_uuid()) {
            return if existing.same_shape(&class) {
                Ok(RegistrationToken { type_uuid })
            } else {
                Err(RegistrationError::Conflicting {
                    name: E::type_name(),
                    uuid: type_uuid,
                })
            };
        }

        self.add_name(E::type_name(), type_uuid);
        self.any_creators.insert(*type_uuid.as_uuid(), crate::registry::default_factory::<E>);
        log::trace!("registered enum `{}` {type_uuid}", E::type_name());
        self.enums.insert(*type_uuid.as_uuid(), Arc::new(class));
        Ok(RegistrationToken { type_uuid })
    }

    /// Keeps a removed class known so its old documents can still be loaded.
    ///
    /// Nodes of a deprecated class are handed to `converter` during upgrade,
    /// without converter they are dropped with a warning.
    pub fn deprecate_class(
        &mut self,
        name: &'static str,
        type_uuid: TypeUuid,
        converter: Option<VersionConverter>,
    ) -> Result<RegistrationToken, RegistrationError> {
        let mut class = ClassDescriptor::new(name, type_uuid);
        class.set_deprecated(converter);
        self.register_class(class)
    }

    /// Removes every table entry of `type_uuid`.
    ///
    /// Returns `false` if the type was not registered.
    pub fn unregister_type(&mut self, type_uuid: TypeUuid) -> bool {
        let key = type_uuid.as_uuid();
        let mut found = false;

        if let Some(class) = self.classes.remove(key) {
            self.remove_name(class.name(), type_uuid);
            found = true;
        }
        if let Some(info) = self.generics.remove(key) {
            self.remove_name(info.class().name(), type_uuid);
            found = true;
        }
        if let Some(class) = self.enums.remove(key) {
            self.remove_name(class.name(), type_uuid);
            found = true;
        }
        self.any_creators.remove(key);

        if found {
            log::trace!("unregistered {type_uuid}");
        }
        found
    }

    /// Undoes the registration behind `token`.
    #[inline]
    pub fn release(&mut self, token: RegistrationToken) -> bool {
        self.unregister_type(token.type_uuid)
    }

    fn add_name(&mut self, name: &'static str, type_uuid: TypeUuid) {
        let list = self.names.entry(name).or_default();
        if !list.contains(&type_uuid) {
            list.push(type_uuid);
        }
    }

    fn remove_name(&mut self, name: &'static str, type_uuid: TypeUuid) {
        if let Some(list) = self.names.get_mut(name) {
            list.retain(|id| *id != type_uuid);
            if list.is_empty() {
                self.names.remove(name);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Lookups

    /// Resolves the descriptor of `type_uuid`.
    ///
    /// The lookup tries, in order:
    /// 1. the registered classes,
    /// 2. the generic info attached to field `field_hash` of `parent`,
    /// 3. the registered generic specializations,
    /// 4. the registered enumerations.
    pub fn find_class_data<'a>(
        &'a self,
        type_uuid: TypeUuid,
        parent: Option<&'a ClassDescriptor>,
        field_hash: Option<NameHash>,
    ) -> Option<&'a ClassDescriptor> {
        let key = type_uuid.as_uuid();
        if let Some(class) = self.classes.get(key) {
            return Some(class);
        }

        if let (Some(parent), Some(field_hash)) = (parent, field_hash) {
            let field = parent
                .find_field(field_hash)
                .or_else(|| parent.container().and_then(|c| c.element(field_hash)));
            if let Some(generic) = field.and_then(|f| f.generic())
                && generic.can_store_type(type_uuid)
            {
                return Some(generic.class());
            }
        }

        if let Some(info) = self.generics.get(key) {
            return Some(info.class());
        }

        self.enums.get(key).map(|class| &**class)
    }

    #[inline]
    pub fn class_data(&self, type_uuid: TypeUuid) -> Option<&ClassDescriptor> {
        self.find_class_data(type_uuid, None, None)
    }

    #[inline]
    pub fn class_data_of<T: Typed>(&self) -> Option<&ClassDescriptor> {
        self.class_data(T::type_uuid())
    }

    #[inline]
    pub fn generic_info(&self, type_uuid: TypeUuid) -> Option<&Arc<GenericClassInfo>> {
        self.generics.get(type_uuid.as_uuid())
    }

    /// Every identity registered under `name`.
    pub fn classes_by_name(&self, name: &str) -> &[TypeUuid] {
        self.names.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    #[inline]
    pub fn contains(&self, type_uuid: TypeUuid) -> bool {
        self.class_data(type_uuid).is_some()
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.generics.len() + self.enums.len()
    }

    /// Iterates every descriptor: classes, then generics, then enumerations.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes
            .values()
            .map(|c| &**c)
            .chain(self.generics.values().map(|g| g.class()))
            .chain(self.enums.values().map(|c| &**c))
    }

    pub(crate) fn registered_uuids(&self) -> HashSet<TypeUuid> {
        self.iter().map(ClassDescriptor::type_uuid).collect()
    }

    // -------------------------------------------------------------------------
    // Creation

    /// Creates a default instance of `type_uuid`.
    pub fn create(&self, type_uuid: TypeUuid) -> Option<Box<dyn Object>> {
        self.class_data(type_uuid)?.create()
    }

    /// Creates a default instance of `type_uuid` wrapped in an [`AnyValue`].
    pub fn create_any(&self, type_uuid: TypeUuid) -> Option<AnyValue> {
        let factory = self.any_creators.get(type_uuid.as_uuid())?;
        Some(AnyValue::from_boxed(factory()))
    }

    // -------------------------------------------------------------------------
    // Is-a queries

    /// Returns `true` if a `from` instance can be viewed as a `to`.
    ///
    /// Reflected base-class fields are followed first, then the rtti.
    pub fn can_downcast(&self, from: TypeUuid, to: TypeUuid) -> bool {
        if from == to {
            return true;
        }
        let Some(class) = self.class_data(from) else {
            return false;
        };
        class.base_classes().any(|base| self.can_downcast(base.type_uuid(), to))
            || class.rtti().is_some_and(|rtti| rtti.is_type_of(to))
    }

    /// Views `instance` as its base `to`.
    ///
    /// The walk starts from the runtime type of `instance`, so a value reached
    /// through a pointer of a base type still finds its other bases.
    pub fn downcast<'a>(&self, instance: &'a dyn Object, to: TypeUuid) -> Option<&'a dyn Object> {
        let from = instance.object_uuid();
        if from == to {
            return Some(instance);
        }
        let class = self.class_data(from)?;
        for base in class.base_classes() {
            if self.can_downcast(base.type_uuid(), to) {
                return self.downcast(base.get(instance)?, to);
            }
        }
        class.rtti()?.cast(instance, to)
    }

    pub fn downcast_mut<'a>(
        &self,
        instance: &'a mut dyn Object,
        to: TypeUuid,
    ) -> Option<&'a mut dyn Object> {
        let from = instance.object_uuid();
        if from == to {
            return Some(instance);
        }
        let class = self.class_data(from)?;
        for base in class.base_classes() {
            if self.can_downcast(base.type_uuid(), to) {
                return self.downcast_mut(base.get_mut(instance)?, to);
            }
        }
        class.rtti()?.cast_mut(instance, to)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A [`TypeRegistry`] shared between threads.
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use super::{TypeRegistry, TypeRegistryArc};
    use crate::registry::{ClassDescriptor, RegistrationError, RttiHelper};
    use crate::tests::fixtures::{A, B, C, Mode, Point, register_abc, register_point};
    use crate::{AnyValue, Object, TypeUuid, Typed};

    #[test]
    fn builtins_are_registered() {
        let registry = TypeRegistry::new();
        for id in [
            bool::type_uuid(),
            i8::type_uuid(),
            u64::type_uuid(),
            f32::type_uuid(),
            f64::type_uuid(),
            alloc::string::String::type_uuid(),
            <()>::type_uuid(),
            AnyValue::type_uuid(),
        ] {
            assert!(registry.contains(id), "missing {id}");
        }
        assert!(TypeRegistry::empty().len() == 0);
    }

    #[test]
    fn reregistration_is_idempotent() {
        let mut registry = TypeRegistry::new();
        register_point(&mut registry, 1);
        let before = registry.len();
        register_point(&mut registry, 1);
        assert_eq!(registry.len(), before);
        assert_eq!(registry.classes_by_name("Point"), &[Point::type_uuid()]);
    }

    #[test]
    fn conflicting_shape_is_rejected() {
        let mut registry = TypeRegistry::new();
        register_point(&mut registry, 1);
        let err = registry
            .class::<Point>()
            .field("x", |p| &p.x, |p| &mut p.x)
            .register()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Conflicting { name: "Point", .. }));
    }

    #[test]
    fn differing_upgrades_conflict() {
        let mut registry = TypeRegistry::new();
        register_point(&mut registry, 2);
        register_point(&mut registry, 2);

        let err = registry
            .class::<Point>()
            .version(2, None)
            .field("x", |p| &p.x, |p| &mut p.x)
            .field("yCoord", |p| &p.y, |p| &mut p.y)
            .name_change(1, 2, "ordinate", "yCoord")
            .register()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Conflicting { name: "Point", .. }));

        let err = registry
            .class::<Point>()
            .version(2, None)
            .field("x", |p| &p.x, |p| &mut p.x)
            .field("yCoord", |p| &p.y, |p| &mut p.y)
            .register()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Conflicting { name: "Point", .. }));
    }

    #[test]
    fn serializer_and_fields_are_exclusive() {
        let mut registry = TypeRegistry::new();
        let class = ClassDescriptor::with_default::<Point>()
            .with_serializer(Arc::new(crate::serializer::EmptySerializer));
        let class = class.with_field(crate::registry::FieldDescriptor::element(
            "x",
            i32::type_uuid(),
        ));
        assert!(matches!(
            registry.register_class(class),
            Err(RegistrationError::SerializerWithFields { .. })
        ));
    }

    #[test]
    fn unregister_removes_every_table_entry() {
        let mut registry = TypeRegistry::new();
        registry
            .register_enum::<Mode, u8>(|m| *m as u8, Mode::from_u8)
            .unwrap();
        assert!(registry.create_any(Mode::type_uuid()).is_some());
        assert_eq!(registry.classes_by_name("Mode").len(), 1);

        assert!(registry.unregister_type(Mode::type_uuid()));
        assert!(!registry.contains(Mode::type_uuid()));
        assert!(registry.create_any(Mode::type_uuid()).is_none());
        assert!(registry.classes_by_name("Mode").is_empty());
        assert!(!registry.unregister_type(Mode::type_uuid()));
    }

    #[test]
    fn enum_requires_scalar_underlying() {
        let mut registry = TypeRegistry::new();
        register_point(&mut registry, 1);
        let err = registry
            .register_enum::<Mode, Point>(|_| Point::default(), |_| None)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::UnderlyingNotScalar { .. }));
    }

    #[test]
    fn downcast_follows_base_classes() {
        let mut registry = TypeRegistry::new();
        register_abc(&mut registry);

        let c = C::default();
        let object: &dyn Object = &c;

        assert!(registry.can_downcast(C::type_uuid(), A::type_uuid()));
        assert!(registry.can_downcast(B::type_uuid(), A::type_uuid()));
        assert!(!registry.can_downcast(A::type_uuid(), C::type_uuid()));

        let same = registry.downcast(object, C::type_uuid()).unwrap();
        assert!(core::ptr::addr_eq(same, object));

        let a = registry.downcast(object, A::type_uuid()).unwrap();
        assert!(core::ptr::addr_eq(a, &c.b.a));
        assert!(registry.downcast(&c.b.a, C::type_uuid()).is_none());

        let mut c = C::default();
        let a = registry.downcast_mut(&mut c, A::type_uuid()).unwrap();
        a.downcast_mut::<A>().unwrap().id = 9;
        assert_eq!(c.b.a.id, 9);
    }

    #[test]
    fn downcast_falls_back_to_rtti() {
        let mut registry = TypeRegistry::new();
        registry
            .class::<A>()
            .field("id", |a| &a.id, |a| &mut a.id)
            .register()
            .unwrap();
        let a = Arc::new(RttiHelper::of::<A>());
        let rtti = RttiHelper::of::<B>().with_base::<B, A>(a, |b| &b.a, |b| &mut b.a);
        registry
            .class::<B>()
            .rtti(Arc::new(rtti))
            .field("weight", |b| &b.weight, |b| &mut b.weight)
            .register()
            .unwrap();

        let b = B::default();
        assert!(registry.can_downcast(B::type_uuid(), A::type_uuid()));
        let a = registry.downcast(&b, A::type_uuid()).unwrap();
        assert!(core::ptr::addr_eq(a, &b.a));
    }

    #[test]
    fn concurrent_reads() {
        let mut registry = TypeRegistry::new();
        register_point(&mut registry, 2);
        let shared = TypeRegistryArc::new(registry);

        let found: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let shared = &shared;
                    scope.spawn(move || {
                        let registry = shared.read();
                        (0..100).all(|_| {
                            registry
                                .class_data(Point::type_uuid())
                                .is_some_and(|c| c.version() == 2)
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(found.into_iter().all(|ok| ok));

        let _ = shared.write().unregister_type(Point::type_uuid());
        assert!(!shared.read().contains(Point::type_uuid()));
    }

    #[test]
    fn deprecated_class_is_known() {
        let mut registry = TypeRegistry::new();
        let id = TypeUuid::from_u128(0xDEAD);
        registry.deprecate_class("OldThing", id, None).unwrap();
        assert!(registry.class_data(id).unwrap().is_deprecated());
        assert!(registry.create(id).is_none());
    }
}
