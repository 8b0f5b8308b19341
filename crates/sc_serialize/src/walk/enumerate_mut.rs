use super::{ErrorHandler, resolve_class};
use crate::registry::{ClassDescriptor, FieldDescriptor, TypeRegistry};
use crate::{AnyValue, Object};

/// Receives the nodes of a traversal that may modify them.
pub trait EnumerateVisitorMut<'r> {
    /// Called before the children of `instance` are walked.
    ///
    /// Returning `false` skips the children.
    fn begin(
        &mut self,
        instance: &mut dyn Object,
        class: &'r ClassDescriptor,
        field: Option<&FieldDescriptor>,
        errors: &mut ErrorHandler,
    ) -> bool;

    /// Called after the children. Returning `false` skips the remaining siblings.
    fn end(&mut self, errors: &mut ErrorHandler) -> bool {
        let _ = errors;
        true
    }
}

impl<'r, F> EnumerateVisitorMut<'r> for F
where
    F: FnMut(&mut dyn Object, &ClassDescriptor, Option<&FieldDescriptor>) -> bool,
{
    #[inline]
    fn begin(
        &mut self,
        instance: &mut dyn Object,
        class: &'r ClassDescriptor,
        field: Option<&FieldDescriptor>,
        _errors: &mut ErrorHandler,
    ) -> bool {
        self(instance, class, field)
    }
}

struct WalkerMut<'r, 'v> {
    registry: &'r TypeRegistry,
    visitor: &'v mut dyn EnumerateVisitorMut<'r>,
    errors: &'v mut ErrorHandler,
}

impl<'r> WalkerMut<'r, '_> {
    fn visit(
        &mut self,
        instance: &mut dyn Object,
        field: Option<&FieldDescriptor>,
        parent: Option<&'r ClassDescriptor>,
        hold: bool,
    ) -> bool {
        let Some(class) = resolve_class(self.registry, &*instance, field, parent, self.errors) else {
            return true;
        };

        self.errors
            .push(field.map_or(class.name(), FieldDescriptor::name), class.name(), class.type_uuid());
        if let Some(events) = class.events() {
            events.on_write_begin(instance);
        }

        let mut proceed = true;
        if self.visitor.begin(instance, class, field, self.errors) {
            proceed = self.visit_children(instance, class);
        }
        proceed &= self.visitor.end(self.errors);

        if !hold && let Some(events) = class.events() {
            events.on_write_end(instance);
        }
        self.errors.pop();
        proceed
    }

    fn visit_children(&mut self, instance: &mut dyn Object, class: &'r ClassDescriptor) -> bool {
        if let Some(container) = class.container() {
            let element = container.element_descriptor();
            let mut proceed = true;
            container.enum_elements_mut(instance, &mut |item: &mut dyn Object| {
                proceed = self.visit(item, Some(element), Some(class), false);
                proceed
            });
            return proceed;
        }

        for field in class.fields() {
            match field.get_mut(instance) {
                Some(child) => {
                    if !self.visit(child, Some(field), Some(class), false) {
                        return false;
                    }
                }
                None if field.is_pointer() => {}
                None => self.errors.report_error(format_args!(
                    "field `{}` of `{}` cannot be written",
                    field.name(),
                    class.name(),
                )),
            }
        }

        if let Some(payload) = instance.downcast_mut::<AnyValue>().and_then(AnyValue::get_mut) {
            let field = FieldDescriptor::any_payload(payload.object_uuid());
            return self.visit(payload, Some(&field), Some(class), false);
        }
        true
    }
}

impl TypeRegistry {
    /// Walks `instance` mutably, depth first.
    ///
    /// With `hold` set, the write-end hook of the root is not run, the caller
    /// fires it once it has finished its own changes.
    pub fn enumerate_object_mut<'r>(
        &'r self,
        instance: &mut dyn Object,
        visitor: &mut dyn EnumerateVisitorMut<'r>,
        errors: &mut ErrorHandler,
        hold: bool,
    ) -> bool {
        let mut walker = WalkerMut {
            registry: self,
            visitor,
            errors,
        };
        walker.visit(instance, None, None, hold)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use crate::registry::{ClassDescriptor, FieldDescriptor};
    use crate::tests::fixtures::{self, Inventory, Tracked};
    use crate::{ErrorHandler, Object, TypeRegistry};

    #[test]
    fn visitor_can_modify_leaves() {
        let mut registry = TypeRegistry::new();
        fixtures::register_inventory(&mut registry);

        let mut inventory = Inventory {
            slots: vec![1, 2, 3],
            names: vec![String::from("sword")],
            ..Inventory::default()
        };
        registry.enumerate_object_mut(
            &mut inventory,
            &mut |value: &mut dyn Object, _: &ClassDescriptor, _: Option<&FieldDescriptor>| {
                if let Some(slot) = value.downcast_mut::<u32>() {
                    *slot *= 10;
                }
                if let Some(name) = value.downcast_mut::<String>() {
                    name.push('+');
                }
                true
            },
            &mut ErrorHandler::new(),
            false,
        );
        assert_eq!(inventory.slots, [10, 20, 30]);
        assert_eq!(inventory.names, ["sword+"]);
    }

    #[test]
    fn hold_defers_the_root_write_hook() {
        let mut registry = TypeRegistry::new();
        let events = fixtures::register_tracked(&mut registry);

        let mut tracked = Tracked::default();
        let mut accept = |_: &mut dyn Object, _: &ClassDescriptor, _: Option<&FieldDescriptor>| true;

        registry.enumerate_object_mut(&mut tracked, &mut accept, &mut ErrorHandler::new(), true);
        assert_eq!(events.take(), ["write_begin"]);

        registry.enumerate_object_mut(&mut tracked, &mut accept, &mut ErrorHandler::new(), false);
        assert_eq!(events.take(), ["write_begin", "write_end"]);
    }
}
