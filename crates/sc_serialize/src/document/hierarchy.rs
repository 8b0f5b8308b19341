use alloc::vec::Vec;

use super::{DocumentNode, PayloadKind};
use crate::registry::{ClassDescriptor, FieldDescriptor};
use crate::walk::EnumerateVisitor;
use crate::{ErrorHandler, Object, TypeRegistry};

/// Builds one node per visited value.
///
/// A `None` entry marks a value whose payload could not be saved, it is
/// dropped together with its subtree.
struct HierarchyBuilder {
    stack: Vec<Option<DocumentNode>>,
    root: Option<DocumentNode>,
    big_endian: bool,
}

impl<'r> EnumerateVisitor<'r> for HierarchyBuilder {
    fn begin(
        &mut self,
        instance: &dyn Object,
        class: &'r ClassDescriptor,
        field: Option<&FieldDescriptor>,
        errors: &mut ErrorHandler,
    ) -> bool {
        if matches!(self.stack.last(), Some(None)) {
            self.stack.push(None);
            return false;
        }

        let name = field.map_or(class.name(), FieldDescriptor::name);
        let mut node = DocumentNode::new(name, class.type_uuid(), class.version());

        if let Some(serializer) = class.serializer() {
            let mut data = Vec::new();
            if let Err(error) = serializer.save(instance, &mut data, self.big_endian) {
                errors.report_error(format_args!("cannot save `{name}`: {error}"));
                self.stack.push(None);
                return false;
            }
            node.set_payload(PayloadKind::binary(self.big_endian), 0, data);
        }

        self.stack.push(Some(node));
        true
    }

    fn end(&mut self, _errors: &mut ErrorHandler) -> bool {
        let Some(Some(node)) = self.stack.pop() else {
            return true;
        };
        match self.stack.last_mut() {
            Some(Some(parent)) => {
                parent.add_element(node);
            }
            Some(None) => {}
            None => self.root = Some(node),
        }
        true
    }
}

impl DocumentNode {
    /// Captures `instance` as a document tree with little-endian payloads.
    ///
    /// Returns `None` if the type of `instance` is not registered. Problems
    /// below the root are reported to `errors` and the affected branch is
    /// left out of the tree.
    #[inline]
    pub fn from_object(
        registry: &TypeRegistry,
        instance: &dyn Object,
        errors: &mut ErrorHandler,
    ) -> Option<DocumentNode> {
        Self::from_object_with(registry, instance, false, errors)
    }

    /// Captures `instance` with payloads in the requested byte order.
    pub fn from_object_with(
        registry: &TypeRegistry,
        instance: &dyn Object,
        big_endian: bool,
        errors: &mut ErrorHandler,
    ) -> Option<DocumentNode> {
        let mut builder = HierarchyBuilder {
            stack: Vec::new(),
            root: None,
            big_endian,
        };
        registry.enumerate_object(instance, &mut builder, errors);
        builder.root
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::document::{DocumentNode, PayloadKind};
    use crate::tests::fixtures::{self, C, Inventory, Point};
    use crate::{AnyValue, ErrorHandler, NameHash, TypeRegistry, Typed};

    #[test]
    fn scalars_carry_payloads() {
        let mut registry = TypeRegistry::new();
        fixtures::register_point(&mut registry, 1);
        let mut errors = ErrorHandler::new();

        let node = DocumentNode::from_object(&registry, &Point { x: 3, y: 4 }, &mut errors).unwrap();
        assert_eq!(node.name(), "Point");
        assert_eq!(node.type_uuid(), Point::type_uuid());
        assert_eq!(node.version(), 1);
        assert!(node.data().is_empty());

        let y = node.find_element(NameHash::of("y")).unwrap();
        assert_eq!(y.data(), 4_i32.to_le_bytes());
        assert_eq!(y.get_data::<i32>(&registry).unwrap(), 4);

        let node = DocumentNode::from_object_with(&registry, &Point { x: 3, y: 4 }, true, &mut errors).unwrap();
        let y = node.find_element(NameHash::of("y")).unwrap();
        assert_eq!(y.payload_kind(), PayloadKind::BinaryBigEndian);
        assert_eq!(y.data(), 4_i32.to_be_bytes());
    }

    #[test]
    fn nested_shapes() {
        let mut registry = TypeRegistry::new();
        fixtures::register_abc(&mut registry);
        fixtures::register_inventory(&mut registry);
        let mut errors = ErrorHandler::new();

        let node = DocumentNode::from_object(&registry, &C::default(), &mut errors).unwrap();
        assert_eq!(node.node_count(), 6);
        assert_eq!(node.children()[0].name(), "B");
        assert_eq!(node.children()[0].children()[0].name(), "A");

        let inventory = Inventory {
            slots: vec![1, 2, 3],
            ..Inventory::default()
        };
        let node = DocumentNode::from_object(&registry, &inventory, &mut errors).unwrap();
        let slots = node.find_element(NameHash::of("slots")).unwrap();
        assert_eq!(slots.children().len(), 3);
        assert!(slots.children().iter().all(|c| c.name() == "element"));

        let any = AnyValue::new(5_u8);
        let node = DocumentNode::from_object(&registry, &any, &mut errors).unwrap();
        assert_eq!(node.children()[0].name(), AnyValue::PAYLOAD_FIELD);
        assert_eq!(node.children()[0].get_data::<u8>(&registry).unwrap(), 5);
        assert!(!errors.has_errors());
    }

    #[test]
    fn unregistered_root_gives_nothing() {
        let registry = TypeRegistry::new();
        let mut errors = ErrorHandler::new();
        assert!(DocumentNode::from_object(&registry, &Point::default(), &mut errors).is_none());
        assert!(errors.has_errors());
    }
}
