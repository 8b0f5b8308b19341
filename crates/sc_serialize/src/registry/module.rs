use alloc::vec::Vec;

use super::{RegistrationError, TypeRegistry};
use crate::TypeUuid;

/// A group of types registered and unregistered together.
///
/// # Examples
///
/// ```
/// use sc_serialize::registry::{ReflectModule, RegistrationError};
/// use sc_serialize::{TypeRegistry, Typed, impl_typed};
///
/// #[derive(Default)]
/// struct Speed(f32);
/// impl_typed!(Speed, "{61F7D0C2-5E1B-4B5B-9B57-0D6B2C7A0A01}");
///
/// struct Physics;
///
/// impl ReflectModule for Physics {
///     fn name(&self) -> &'static str {
///         "physics"
///     }
///
///     fn reflect(&self, registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
///         registry.class::<Speed>().field("value", |s| &s.0, |s| &mut s.0).register()?;
///         Ok(())
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// let handle = registry.load_module(&Physics).unwrap();
/// assert!(registry.contains(Speed::type_uuid()));
///
/// assert_eq!(registry.unload_module(handle), 1);
/// assert!(!registry.contains(Speed::type_uuid()));
/// ```
pub trait ReflectModule {
    fn name(&self) -> &'static str;

    /// Registers the types of the module.
    fn reflect(&self, registry: &mut TypeRegistry) -> Result<(), RegistrationError>;
}

/// The types added by one [`TypeRegistry::load_module`] call.
#[derive(Debug)]
pub struct ModuleHandle {
    name: &'static str,
    types: Vec<TypeUuid>,
}

impl ModuleHandle {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn types(&self) -> &[TypeUuid] {
        &self.types
    }
}

impl TypeRegistry {
    /// Runs the registration of `module`.
    ///
    /// On failure every type the module added is removed again.
    pub fn load_module(
        &mut self,
        module: &dyn ReflectModule,
    ) -> Result<ModuleHandle, RegistrationError> {
        let before = self.registered_uuids();
        let result = module.reflect(self);

        let types: Vec<TypeUuid> = self
            .registered_uuids()
            .into_iter()
            .filter(|id| !before.contains(id))
            .collect();

        match result {
            Ok(()) => {
                log::debug!("loaded module `{}` with {} type(s)", module.name(), types.len());
                Ok(ModuleHandle {
                    name: module.name(),
                    types,
                })
            }
            Err(error) => {
                log::error!("module `{}` failed, rolling back: {error}", module.name());
                for id in types {
                    self.unregister_type(id);
                }
                Err(error)
            }
        }
    }

    /// Removes the types added by a module, returning how many were removed.
    pub fn unload_module(&mut self, handle: ModuleHandle) -> usize {
        let removed = handle
            .types
            .iter()
            .filter(|id| self.unregister_type(**id))
            .count();
        log::debug!("unloaded module `{}`, {removed} type(s) removed", handle.name);
        removed
    }
}
