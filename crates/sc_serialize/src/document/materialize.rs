use alloc::boxed::Box;
use alloc::vec::Vec;

use super::DocumentNode;
use crate::container::ContainerAdapter;
use crate::registry::{ClassDescriptor, FieldDescriptor};
use crate::{AnyValue, ErrorHandler, Object, TypeRegistry, Typed};

struct Materializer<'r, 'e> {
    registry: &'r TypeRegistry,
    errors: &'e mut ErrorHandler,
}

impl<'r> Materializer<'r, '_> {
    /// Fills `instance`, whose class is `class`, from `node`.
    fn fill(&mut self, node: &DocumentNode, class: &'r ClassDescriptor, instance: &mut dyn Object) {
        self.errors.push(alloc::string::String::from(node.name()), class.name(), class.type_uuid());
        if let Some(events) = class.events() {
            events.on_write_begin(instance);
        }

        if class.serializer().is_some() {
            if let Err(error) = node.load_payload(self.registry, instance) {
                self.errors
                    .report_error(format_args!("cannot load `{}`: {error}", node.name()));
            }
        } else if let Some(container) = class.container() {
            self.fill_container(node, class, &**container, instance);
        } else {
            for child in node.children() {
                self.fill_field(child, class, instance);
            }
        }

        if let Some(events) = class.events() {
            events.on_write_end(instance);
        }
        self.errors.pop();
    }

    fn fill_field(&mut self, child: &DocumentNode, parent: &'r ClassDescriptor, instance: &mut dyn Object) {
        let payload;
        let field = match parent.find_field(child.name_hash()) {
            Some(field) => field,
            None if parent.type_uuid() == AnyValue::type_uuid()
                && child.name() == AnyValue::PAYLOAD_FIELD =>
            {
                payload = FieldDescriptor::any_payload(child.type_uuid());
                &payload
            }
            None => {
                self.errors.report_warning(format_args!(
                    "field `{}` no longer exists in `{}`, dropped",
                    child.name(),
                    parent.name(),
                ));
                return;
            }
        };

        let Some(class) = self.resolve(child, parent) else {
            return;
        };

        if field.is_pointer() {
            if !field.is_dynamic()
                && child.type_uuid() != field.type_uuid()
                && !self.registry.can_downcast(child.type_uuid(), field.type_uuid())
            {
                self.errors.report_error(format_args!(
                    "`{}` cannot be stored in pointer `{}` declared as {}",
                    class.name(),
                    field.name(),
                    field.type_uuid(),
                ));
                return;
            }
            let Some(mut value) = self.create(class) else {
                return;
            };
            self.fill(child, class, &mut *value);
            if field.set(instance, value).is_err() {
                self.errors
                    .report_error(format_args!("pointer `{}` rejected a `{}`", field.name(), class.name()));
            }
            return;
        }

        if child.type_uuid() != field.type_uuid() {
            self.errors.report_error(format_args!(
                "field `{}` holds a {}, the document holds a `{}`",
                field.name(),
                field.type_uuid(),
                class.name(),
            ));
            return;
        }
        match field.get_mut(instance) {
            Some(target) => self.fill(child, class, target),
            None => self
                .errors
                .report_error(format_args!("field `{}` cannot be written", field.name())),
        }
    }

    fn fill_container(
        &mut self,
        node: &DocumentNode,
        class: &'r ClassDescriptor,
        adapter: &dyn ContainerAdapter,
        instance: &mut dyn Object,
    ) {
        adapter.clear_elements(instance);

        // Either every element resolves or the container stays empty.
        let registry = self.registry;
        let mut classes = Vec::with_capacity(node.children().len());
        for child in node.children() {
            let resolved = adapter
                .element(child.name_hash())
                .and_then(|_| registry.find_class_data(child.type_uuid(), Some(class), Some(child.name_hash())));
            match resolved {
                Some(resolved) => classes.push(resolved),
                None => {
                    self.errors.report_warning(format_args!(
                        "element `{}` {} of `{}` cannot be resolved, container dropped",
                        child.name(),
                        child.type_uuid(),
                        class.name(),
                    ));
                    return;
                }
            }
        }

        for (index, (child, element_class)) in node.children().iter().zip(classes).enumerate() {
            let Some(slot) = adapter.element(child.name_hash()) else {
                continue;
            };
            let declared = slot.type_uuid();
            if child.type_uuid() != declared && !self.registry.can_downcast(child.type_uuid(), declared) {
                self.errors.report_error(format_args!(
                    "`{}` cannot be stored as an element of `{}`",
                    element_class.name(),
                    class.name(),
                ));
                continue;
            }

            if adapter.is_fixed_size() {
                match adapter.element_by_index_mut(instance, index) {
                    Some(target) => self.fill(child, element_class, target),
                    None => self.report_full(class),
                }
                continue;
            }

            let Some(mut element) = adapter.reserve_element(instance) else {
                self.report_full(class);
                continue;
            };
            self.fill(child, element_class, &mut *element);
            if adapter.store_element(instance, element).is_err() {
                self.errors
                    .report_error(format_args!("`{}` rejected an element", class.name()));
            }
        }
    }

    fn resolve(&mut self, node: &DocumentNode, parent: &'r ClassDescriptor) -> Option<&'r ClassDescriptor> {
        let class = self
            .registry
            .find_class_data(node.type_uuid(), Some(parent), Some(node.name_hash()));
        if class.is_none() {
            self.errors.report_error(format_args!(
                "`{}` {} is not registered",
                node.name(),
                node.type_uuid(),
            ));
        }
        class
    }

    fn create(&mut self, class: &ClassDescriptor) -> Option<Box<dyn Object>> {
        let value = class.create();
        if value.is_none() {
            self.errors
                .report_error(format_args!("`{}` has no factory", class.name()));
        }
        value
    }

    fn report_full(&mut self, class: &ClassDescriptor) {
        self.errors
            .report_error(format_args!("`{}` is full, element dropped", class.name()));
    }
}

impl DocumentNode {
    /// Writes this tree into an existing instance of the same type.
    ///
    /// Fields missing from the document keep their value, document nodes
    /// without a matching field are dropped with a warning. Returns `false`
    /// if any error was reported.
    pub fn to_object(&self, registry: &TypeRegistry, target: &mut dyn Object, errors: &mut ErrorHandler) -> bool {
        let before = errors.error_count();
        let actual = target.object_uuid();
        if actual != self.type_uuid() {
            errors.report_error(format_args!(
                "document holds a {}, the target is a `{}` {actual}",
                self.type_uuid(),
                target.object_type_name(),
            ));
            return false;
        }
        let Some(class) = registry.class_data(actual) else {
            errors.report_error(format_args!("{actual} is not registered"));
            return false;
        };

        Materializer { registry, errors }.fill(self, class, target);
        errors.error_count() == before
    }

    /// Creates a fresh instance from this tree.
    ///
    /// Returns `None` if the root type is unknown or cannot be created.
    pub fn create_object(&self, registry: &TypeRegistry, errors: &mut ErrorHandler) -> Option<Box<dyn Object>> {
        let Some(class) = registry.class_data(self.type_uuid()) else {
            errors.report_error(format_args!("`{}` {} is not registered", self.name(), self.type_uuid()));
            return None;
        };
        let mut materializer = Materializer { registry, errors };
        let mut value = materializer.create(class)?;
        materializer.fill(self, class, &mut *value);
        Some(value)
    }
}
