//! Depth-first traversal of live object graphs.
//!
//! [`TypeRegistry::enumerate_object`](crate::TypeRegistry::enumerate_object)
//! reads a graph, [`TypeRegistry::enumerate_object_mut`](crate::TypeRegistry::enumerate_object_mut)
//! may modify it. For every reached node the walker:
//!
//! 1. resolves the class, following the runtime type of pointer fields,
//! 2. runs the begin hook of the class,
//! 3. calls the visitor's `begin`, descending only if it returns `true`,
//! 4. walks container elements or fields, then the payload of an [`AnyValue`](crate::AnyValue),
//! 5. calls the visitor's `end`, which stops the remaining siblings when it returns `false`,
//! 6. runs the end hook of the class.
//!
//! Null pointers are skipped silently. Unregistered types and pointees that
//! do not derive from the declared type of their field are reported to the
//! [`ErrorHandler`] and skipped, the walk goes on with the next sibling.

// -----------------------------------------------------------------------------
// Modules

mod enumerate;
mod enumerate_mut;
mod error_handler;

// -----------------------------------------------------------------------------
// Exports

pub use enumerate::EnumerateVisitor;
pub use enumerate_mut::EnumerateVisitorMut;
pub use error_handler::{ErrorHandler, Issue, Severity};

use crate::registry::{ClassDescriptor, FieldDescriptor, TypeRegistry};
use crate::{Object, TypeUuid};

/// Resolves the class of `instance` reached through `field` of `parent`.
///
/// Reports and returns `None` when the type is unknown or breaks the
/// declared type of a pointer field.
fn resolve_class<'r>(
    registry: &'r TypeRegistry,
    instance: &dyn Object,
    field: Option<&FieldDescriptor>,
    parent: Option<&'r ClassDescriptor>,
    errors: &mut ErrorHandler,
) -> Option<&'r ClassDescriptor> {
    let actual = instance.object_uuid();
    let Some(class) = registry.find_class_data(actual, parent, field.map(FieldDescriptor::name_hash)) else {
        match field {
            Some(field) if field.is_base_class() => errors.report_error(format_args!(
                "base class `{}` of `{}` is not reflected",
                field.name(),
                parent.map_or("?", ClassDescriptor::name),
            )),
            _ => errors.report_error(format_args!(
                "`{}` {actual} is not registered",
                instance.object_type_name(),
            )),
        }
        return None;
    };

    if let Some(field) = field
        && field.is_pointer()
        && !field.is_dynamic()
        && !is_a(registry, field, actual)
    {
        errors.report_error(format_args!(
            "potential data loss: `{}` in pointer `{}` does not derive from {}",
            class.name(),
            field.name(),
            field.type_uuid(),
        ));
        return None;
    }

    Some(class)
}

fn is_a(registry: &TypeRegistry, field: &FieldDescriptor, actual: TypeUuid) -> bool {
    let declared = field.type_uuid();
    actual == declared
        || registry.can_downcast(actual, declared)
        || field.rtti().is_some_and(|rtti| rtti.type_uuid() == actual)
}
