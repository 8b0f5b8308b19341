//! Deep copies of reflected values.
//!
//! A clone is a read walk of the source: every visited value gets a fresh
//! counterpart, scalars are copied through their serializer, and finished
//! values are moved into their parent field or container on the way back up.
//! Only what the registry describes is copied, fields it does not know keep
//! the defaults of the factory.

// -----------------------------------------------------------------------------
// Modules

mod error;

// -----------------------------------------------------------------------------
// Exports

pub use error::CloneError;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::registry::{ClassDescriptor, FieldDescriptor};
use crate::walk::EnumerateVisitor;
use crate::{AnyValue, ErrorHandler, Object, TypeRegistry, Typed};

// -----------------------------------------------------------------------------
// Cloner

enum CloneTarget<'d> {
    /// The caller's instance, filled in place.
    Root(&'d mut dyn Object),
    Owned(Box<dyn Object>),
    /// Could not be created, the subtree is skipped.
    Skipped,
}

impl CloneTarget<'_> {
    fn get_mut(&mut self) -> Option<&mut dyn Object> {
        match self {
            Self::Root(target) => Some(&mut **target),
            Self::Owned(target) => Some(&mut **target),
            Self::Skipped => None,
        }
    }
}

/// Where a finished copy goes.
#[derive(Clone, Copy)]
enum Install {
    Root,
    Field(usize),
    Element,
    AnyPayload,
}

impl Install {
    fn of(parent: &ClassDescriptor, field: Option<&FieldDescriptor>) -> Option<Self> {
        let field = field?;
        if parent.container().is_some() {
            Some(Self::Element)
        } else if parent.type_uuid() == AnyValue::type_uuid() && field.name() == AnyValue::PAYLOAD_FIELD {
            Some(Self::AnyPayload)
        } else {
            parent.find_field_index(field.name_hash()).map(Self::Field)
        }
    }
}

struct CloneFrame<'r, 'd> {
    target: CloneTarget<'d>,
    class: &'r ClassDescriptor,
    install: Install,
    /// Next slot of a fixed-size container.
    next_index: usize,
}

struct Cloner<'r, 'd> {
    stack: Vec<CloneFrame<'r, 'd>>,
    root: Option<&'d mut dyn Object>,
    result: Option<Box<dyn Object>>,
}

impl<'r, 'd> Cloner<'r, 'd> {
    fn new(root: Option<&'d mut dyn Object>) -> Self {
        Self {
            stack: Vec::new(),
            root,
            result: None,
        }
    }

    fn skip(&mut self, class: &'r ClassDescriptor, install: Install) -> bool {
        self.stack.push(CloneFrame {
            target: CloneTarget::Skipped,
            class,
            install,
            next_index: 0,
        });
        false
    }

    fn make_target(
        &mut self,
        class: &ClassDescriptor,
        install: Install,
        errors: &mut ErrorHandler,
    ) -> Option<CloneTarget<'d>> {
        if let Install::Root = install
            && let Some(root) = self.root.take()
        {
            return Some(CloneTarget::Root(root));
        }

        if let Install::Element = install
            && let Some(parent) = self.stack.last_mut()
            && let Some(adapter) = parent.class.container()
            && !adapter.is_fixed_size()
        {
            let container = parent.target.get_mut()?;
            return match adapter.reserve_element(container) {
                Some(element) => Some(CloneTarget::Owned(element)),
                None => {
                    errors.report_error(format_args!("`{}` is full, element dropped", parent.class.name()));
                    None
                }
            };
        }

        match class.create() {
            Some(value) => Some(CloneTarget::Owned(value)),
            None => {
                errors.report_error(format_args!("`{}` has no factory", class.name()));
                None
            }
        }
    }

    fn install(&mut self, install: Install, value: Box<dyn Object>, errors: &mut ErrorHandler) {
        let Some(parent) = self.stack.last_mut().filter(|_| !matches!(install, Install::Root)) else {
            self.result = Some(value);
            return;
        };
        let class = parent.class;
        let Some(owner) = parent.target.get_mut() else {
            return;
        };

        let stored = match install {
            Install::Root => false,
            Install::Field(index) => class.fields()[index].set(owner, value).is_ok(),
            Install::AnyPayload => match owner.downcast_mut::<AnyValue>() {
                Some(any) => {
                    any.set(value);
                    true
                }
                None => false,
            },
            Install::Element => match class.container() {
                Some(adapter) if adapter.is_fixed_size() => {
                    let index = parent.next_index;
                    parent.next_index += 1;
                    adapter.store_element_at(owner, index, value).is_ok()
                }
                Some(adapter) => adapter.store_element(owner, value).is_ok(),
                None => false,
            },
        };
        if !stored {
            errors.report_error(format_args!("`{}` rejected a cloned value", class.name()));
        }
    }
}

/// Copies the payload of a scalar, through bytes if the serializer has no direct copy.
fn copy_scalar(class: &ClassDescriptor, source: &dyn Object, target: &mut dyn Object, errors: &mut ErrorHandler) -> bool {
    let Some(serializer) = class.serializer() else {
        return true;
    };
    if serializer.clone_value(source, target) {
        return true;
    }

    let mut data = Vec::new();
    let copied = serializer
        .save(source, &mut data, false)
        .and_then(|_| serializer.load(target, &data, class.version(), false));
    if let Err(error) = copied {
        errors.report_error(format_args!("cannot clone `{}`: {error}", class.name()));
        return false;
    }
    true
}

/// Empties what the walk refills: container elements, pointers, `AnyValue` payloads.
fn reset(class: &ClassDescriptor, target: &mut dyn Object) {
    if let Some(adapter) = class.container() {
        adapter.clear_elements(target);
    }
    for field in class.fields().iter().filter(|field| field.is_pointer()) {
        field.clear_pointer(target);
    }
    if let Some(any) = target.downcast_mut::<AnyValue>() {
        any.clear();
    }
}

fn finish(class: &ClassDescriptor, target: &mut dyn Object) {
    if let Some(events) = class.events() {
        events.on_write_end(target);
        events.on_object_cloned(target);
    }
    if let Some(serializer) = class.serializer() {
        serializer.post_clone(target);
    }
}

impl<'r, 'd> EnumerateVisitor<'r> for Cloner<'r, 'd> {
    fn begin(
        &mut self,
        instance: &dyn Object,
        class: &'r ClassDescriptor,
        field: Option<&FieldDescriptor>,
        errors: &mut ErrorHandler,
    ) -> bool {
        let install = match self.stack.last() {
            None => Install::Root,
            Some(parent) if matches!(parent.target, CloneTarget::Skipped) => {
                return self.skip(class, Install::Root);
            }
            Some(parent) => match Install::of(parent.class, field) {
                Some(install) => install,
                None => {
                    errors.report_error(format_args!(
                        "`{}` has no slot for `{}`",
                        parent.class.name(),
                        class.name()
                    ));
                    return self.skip(class, Install::Root);
                }
            },
        };

        let Some(mut target) = self.make_target(class, install, errors) else {
            return self.skip(class, install);
        };
        let Some(object) = target.get_mut() else {
            return self.skip(class, install);
        };
        if !copy_scalar(class, instance, object, errors) {
            return self.skip(class, install);
        }
        reset(class, object);
        if let Some(events) = class.events() {
            events.on_write_begin(object);
        }

        self.stack.push(CloneFrame {
            target,
            class,
            install,
            next_index: 0,
        });
        true
    }

    fn end(&mut self, errors: &mut ErrorHandler) -> bool {
        let Some(CloneFrame {
            target, class, install, ..
        }) = self.stack.pop()
        else {
            return true;
        };

        match target {
            CloneTarget::Skipped => {
                // Keep later elements of a fixed-size container in their slots.
                if let Install::Element = install
                    && let Some(parent) = self.stack.last_mut()
                {
                    parent.next_index += 1;
                }
            }
            CloneTarget::Root(root) => finish(class, root),
            CloneTarget::Owned(mut value) => {
                finish(class, &mut *value);
                self.install(install, value, errors);
            }
        }
        true
    }
}

// -----------------------------------------------------------------------------
// Entry points

impl TypeRegistry {
    /// Creates a deep copy of `source`.
    ///
    /// Pointees and container elements are copied, never shared. Every
    /// problem is reported to `errors` and fails the clone.
    pub fn clone_object(&self, source: &dyn Object, errors: &mut ErrorHandler) -> Result<Box<dyn Object>, CloneError> {
        let class = self.root_class(source)?;
        if class.factory().is_none() {
            return Err(CloneError::NotCreatable { name: class.name() });
        }

        let before = errors.error_count();
        let mut cloner = Cloner::new(None);
        self.enumerate_object(source, &mut cloner, errors);
        if errors.error_count() > before {
            return Err(CloneError::Incomplete {
                errors: errors.error_count() - before,
            });
        }
        cloner.result.ok_or(CloneError::NotCreatable { name: class.name() })
    }

    /// Overwrites `target` with a deep copy of `source`.
    ///
    /// Both must have the same concrete type. Containers and pointers of
    /// `target` are emptied first.
    pub fn clone_object_into(
        &self,
        source: &dyn Object,
        target: &mut dyn Object,
        errors: &mut ErrorHandler,
    ) -> Result<(), CloneError> {
        if source.object_uuid() != target.object_uuid() {
            return Err(CloneError::TypeMismatch {
                expected: target.object_uuid(),
                found: source.object_uuid(),
            });
        }
        self.root_class(source)?;

        let before = errors.error_count();
        let mut cloner = Cloner::new(Some(target));
        self.enumerate_object(source, &mut cloner, errors);
        match errors.error_count() - before {
            0 => Ok(()),
            raised => Err(CloneError::Incomplete { errors: raised }),
        }
    }

    /// Typed form of [`clone_object`](Self::clone_object).
    pub fn clone_value<T: Typed>(&self, source: &T, errors: &mut ErrorHandler) -> Result<T, CloneError> {
        let copy = self.clone_object(source, errors)?;
        match copy.downcast::<T>() {
            Ok(copy) => Ok(*copy),
            Err(other) => Err(CloneError::TypeMismatch {
                expected: T::type_uuid(),
                found: other.object_uuid(),
            }),
        }
    }

    fn root_class(&self, source: &dyn Object) -> Result<&ClassDescriptor, CloneError> {
        self.find_class_data(source.object_uuid(), None, None)
            .ok_or(CloneError::Unregistered {
                name: source.object_type_name(),
                uuid: source.object_uuid(),
            })
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;

    use super::CloneError;
    use crate::tests::fixtures::{self, C, Holder, Inventory, Point, Tracked};
    use crate::{AnyValue, ErrorHandler, TypeRegistry, impl_typed};

    #[derive(Default)]
    struct Opaque {
        level: u32,
    }

    impl_typed!(Opaque, "{6F1C2A3B-0D4E-4F5A-8B6C-7D8E9F0A1B2C}");

    #[test]
    fn containers_are_independent() {
        let mut registry = TypeRegistry::new();
        fixtures::register_inventory(&mut registry);
        let mut errors = ErrorHandler::new();

        let source = Inventory {
            slots: vec![5, 6, 7],
            ..Inventory::default()
        };
        let mut copy = registry.clone_value(&source, &mut errors).unwrap();
        assert_eq!(copy, source);

        copy.slots.push(8);
        copy.slots[0] = 50;
        assert_eq!(source.slots, [5, 6, 7]);

        let sample = fixtures::sample_inventory();
        assert_eq!(registry.clone_value(&sample, &mut errors).unwrap(), sample);
        assert!(!errors.has_errors());
    }

    #[test]
    fn pointers_are_deep_copied() {
        let mut registry = TypeRegistry::new();
        fixtures::register_abc(&mut registry);
        fixtures::register_point(&mut registry, 1);
        fixtures::register_holder(&mut registry);
        let mut errors = ErrorHandler::new();

        let mut c = C::default();
        c.b.a.id = 7;
        c.label = String::from("original");
        let source = Holder {
            target: Some(Box::new(c)),
            value: AnyValue::new(Point { x: 1, y: 2 }),
        };

        let mut copy = registry.clone_value(&source, &mut errors).unwrap();
        let target = copy.target.as_deref_mut().unwrap().downcast_mut::<C>().unwrap();
        assert_eq!(target.b.a.id, 7);
        target.label.push_str(" copy");
        assert_eq!(copy.value.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));

        let original = source.target.as_deref().unwrap().downcast_ref::<C>().unwrap();
        assert_eq!(original.label, "original");
    }

    #[test]
    fn missing_factory_fails_the_clone() {
        let mut registry = TypeRegistry::new();
        registry
            .abstract_class::<Opaque>()
            .field("level", |o| &o.level, |o| &mut o.level)
            .register()
            .unwrap();
        let mut errors = ErrorHandler::new();

        let source = AnyValue::new(Opaque { level: 3 });
        assert_eq!(
            registry.clone_object(&source, &mut errors).err(),
            Some(CloneError::Incomplete { errors: 1 })
        );
        assert!(errors.issues()[0].message.contains("has no factory"));

        assert!(matches!(
            registry.clone_object(&Opaque::default(), &mut errors),
            Err(CloneError::NotCreatable { name: "Opaque" })
        ));
    }

    #[test]
    fn hooks_run_on_the_copy() {
        let mut registry = TypeRegistry::new();
        let events = fixtures::register_tracked(&mut registry);
        let mut errors = ErrorHandler::new();

        let copy = registry.clone_value(&Tracked { count: 4 }, &mut errors).unwrap();
        assert_eq!(copy.count, 4);
        assert_eq!(
            events.take(),
            ["read_begin", "write_begin", "write_end", "cloned", "read_end"]
        );
    }

    #[test]
    fn clone_into_replaces_content() {
        let mut registry = TypeRegistry::new();
        fixtures::register_inventory(&mut registry);
        fixtures::register_point(&mut registry, 1);
        let mut errors = ErrorHandler::new();

        let source = fixtures::sample_inventory();
        let mut target = Inventory {
            slots: vec![1, 1, 1, 1],
            spare: Some(9),
            ..Inventory::default()
        };
        registry.clone_object_into(&source, &mut target, &mut errors).unwrap();
        assert_eq!(target, source);

        let mut point = Point::default();
        assert!(matches!(
            registry.clone_object_into(&source, &mut point, &mut errors),
            Err(CloneError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unregistered_source() {
        let registry = TypeRegistry::new();
        let mut errors = ErrorHandler::new();
        assert!(matches!(
            registry.clone_object(&Point::default(), &mut errors),
            Err(CloneError::Unregistered { name: "Point", .. })
        ));
    }
}
