use super::DocumentNode;
use crate::{ErrorHandler, Object, TypeRegistry};

impl TypeRegistry {
    /// Deep comparison of two reflected values.
    ///
    /// Both graphs are captured as document trees and compared node by node:
    /// same names, types and shapes, scalar leaves through the
    /// [`compare_equal`](crate::serializer::DataSerializer::compare_equal) of
    /// their serializer.
    pub fn compare_objects(&self, lhs: &dyn Object, rhs: &dyn Object, errors: &mut ErrorHandler) -> bool {
        if lhs.object_uuid() != rhs.object_uuid() {
            return false;
        }
        let Some(lhs) = DocumentNode::from_object(self, lhs, errors) else {
            return false;
        };
        let Some(rhs) = DocumentNode::from_object(self, rhs, errors) else {
            return false;
        };
        self.compare_nodes(&lhs, &rhs)
    }

    fn compare_nodes(&self, lhs: &DocumentNode, rhs: &DocumentNode) -> bool {
        if lhs.name_hash() != rhs.name_hash()
            || lhs.type_uuid() != rhs.type_uuid()
            || lhs.children().len() != rhs.children().len()
        {
            return false;
        }

        if let Some(class) = self.class_data(lhs.type_uuid())
            && class.serializer().is_some()
        {
            return self.compare_payloads(lhs, rhs);
        }

        lhs.children()
            .iter()
            .zip(rhs.children())
            .all(|(l, r)| self.compare_nodes(l, r))
    }

    fn compare_payloads(&self, lhs: &DocumentNode, rhs: &DocumentNode) -> bool {
        let Some(class) = self.class_data(lhs.type_uuid()) else {
            return false;
        };
        let (Some(serializer), Some(mut l), Some(mut r)) = (class.serializer(), class.create(), class.create())
        else {
            return lhs.data() == rhs.data();
        };
        lhs.load_payload(self, &mut *l).is_ok()
            && rhs.load_payload(self, &mut *r).is_ok()
            && serializer.compare_equal(&*l, &*r)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::document::{LoadOptions, SaveOptions};
    use crate::tests::fixtures::{self, C, Point};
    use crate::{ErrorHandler, TypeRegistry};

    #[test]
    fn deep_compare() {
        let mut registry = TypeRegistry::new();
        fixtures::register_abc(&mut registry);
        fixtures::register_point(&mut registry, 1);
        let mut errors = ErrorHandler::new();

        let mut a = C::default();
        a.b.weight = 1.0;
        let mut b = C::default();
        b.b.weight = 1.0 + f32::EPSILON / 2.0;
        assert!(registry.compare_objects(&a, &b, &mut errors));

        b.label = String::from("other");
        assert!(!registry.compare_objects(&a, &b, &mut errors));
        assert!(!registry.compare_objects(&a, &Point::default(), &mut errors));
    }

    #[test]
    fn nan_fields_survive_a_save_and_load() {
        let mut registry = TypeRegistry::new();
        fixtures::register_abc(&mut registry);
        let mut errors = ErrorHandler::new();

        let mut source = C::default();
        source.b.weight = f32::NAN;
        let bytes = registry
            .save_object(&source, &SaveOptions::default(), &mut errors)
            .unwrap();
        let loaded = registry.load_object(&bytes, &LoadOptions::default(), &mut errors).unwrap();
        assert!(loaded.downcast_ref::<C>().unwrap().b.weight.is_nan());
        assert!(registry.compare_objects(&source, &*loaded, &mut errors));
    }
}
