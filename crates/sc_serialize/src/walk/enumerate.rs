use super::{ErrorHandler, resolve_class};
use crate::registry::{ClassDescriptor, FieldDescriptor, TypeRegistry};
use crate::{AnyValue, Object};

/// Receives the nodes of a read-only traversal.
///
/// `'r` is the lifetime of the registry, so visitors may keep the class
/// descriptors they are handed.
pub trait EnumerateVisitor<'r> {
    /// Called before the children of `instance` are walked.
    ///
    /// `field` is the slot `instance` was reached through, `None` for the
    /// root. Returning `false` skips the children.
    fn begin(
        &mut self,
        instance: &dyn Object,
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

impl<'r, F> EnumerateVisitor<'r> for F
where
    F: FnMut(&dyn Object, &ClassDescriptor, Option<&FieldDescriptor>) -> bool,
{
    #[inline]
    fn begin(
        &mut self,
        instance: &dyn Object,
        class: &'r ClassDescriptor,
        field: Option<&FieldDescriptor>,
        _errors: &mut ErrorHandler,
    ) -> bool {
        self(instance, class, field)
    }
}

struct Walker<'r, 'v> {
    registry: &'r TypeRegistry,
    visitor: &'v mut dyn EnumerateVisitor<'r>,
    errors: &'v mut ErrorHandler,
}

impl<'r> Walker<'r, '_> {
    fn visit(
        &mut self,
        instance: &dyn Object,
        field: Option<&FieldDescriptor>,
        parent: Option<&'r ClassDescriptor>,
    ) -> bool {
        let Some(class) = resolve_class(self.registry, instance, field, parent, self.errors) else {
            return true;
        };

        self.errors
            .push(field.map_or(class.name(), FieldDescriptor::name), class.name(), class.type_uuid());
        if let Some(events) = class.events() {
            events.on_read_begin(instance);
        }

        let mut proceed = true;
        if self.visitor.begin(instance, class, field, self.errors) {
            proceed = self.visit_children(instance, class);
        }
        proceed &= self.visitor.end(self.errors);

        if let Some(events) = class.events() {
            events.on_read_end(instance);
        }
        self.errors.pop();
        proceed
    }

    fn visit_children(&mut self, instance: &dyn Object, class: &'r ClassDescriptor) -> bool {
        if let Some(container) = class.container() {
            let element = container.element_descriptor();
            let mut proceed = true;
            container.enum_elements(instance, &mut |item: &dyn Object| {
                proceed = self.visit(item, Some(element), Some(class));
                proceed
            });
            return proceed;
        }

        for field in class.fields() {
            match field.get(instance) {
                Some(child) => {
                    if !self.visit(child, Some(field), Some(class)) {
                        return false;
                    }
                }
                None if field.is_pointer() => {}
                None => self.errors.report_error(format_args!(
                    "field `{}` of `{}` cannot be read",
                    field.name(),
                    class.name(),
                )),
            }
        }

        if let Some(payload) = instance.downcast_ref::<AnyValue>().and_then(AnyValue::get) {
            let field = FieldDescriptor::any_payload(payload.object_uuid());
            return self.visit(payload, Some(&field), Some(class));
        }
        true
    }
}

impl TypeRegistry {
    /// Walks `instance` and everything it owns, depth first.
    ///
    /// Returns `false` if a visitor stopped the traversal early. Problems
    /// with the graph itself are reported to `errors`.
    pub fn enumerate_object<'r>(
        &'r self,
        instance: &dyn Object,
        visitor: &mut dyn EnumerateVisitor<'r>,
        errors: &mut ErrorHandler,
    ) -> bool {
        let mut walker = Walker {
            registry: self,
            visitor,
            errors,
        };
        walker.visit(instance, None, None)
    }

    /// Walks a bare instance whose concrete type is `T`.
    #[inline]
    pub fn enumerate_instance<'r, T: crate::Typed>(
        &'r self,
        instance: &T,
        visitor: &mut dyn EnumerateVisitor<'r>,
        errors: &mut ErrorHandler,
    ) -> bool {
        self.enumerate_object(instance, visitor, errors)
    }
}
