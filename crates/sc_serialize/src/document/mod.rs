//! Type-erased document trees and their encodings.
//!
//! A [`DocumentNode`] tree is the bridge between live objects and bytes:
//!
//! - [`DocumentNode::from_object`] captures a live graph,
//! - [`DocumentNode::to_object`] and [`DocumentNode::create_object`] write it back,
//! - [`DocumentNode::write_binary`] and [`DocumentNode::read_binary`] encode the
//!   binary object stream,
//! - [`TextDocument`] and the `Deserialize` impl of [`DocumentNode`] encode it
//!   with any serde text format.
//!
//! Between decoding and materialization, documents written by older class
//! versions go through [`TypeRegistry::upgrade_document`].

// -----------------------------------------------------------------------------
// Modules

mod binary;
mod compare;
mod error;
mod hierarchy;
mod materialize;
mod node;
mod text;

// -----------------------------------------------------------------------------
// Exports

pub use binary::{HEADER_LEN, MAGIC, MAX_DEPTH, NODE_FIXED_LEN, STREAM_VERSION};
pub use error::{DataError, LoadError, SaveError, StreamError};
pub use node::{DocumentNode, PayloadKind};
pub use text::TextDocument;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::{ErrorHandler, Object, TypeRegistry};

/// Options of [`TypeRegistry::save_object`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Write the stream and every payload big endian.
    pub big_endian: bool,
}

/// Options of the `load_*` functions of [`TypeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail the load if any error was reported, warnings never fail it.
    pub strict: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl TypeRegistry {
    /// Captures `instance` and encodes it as a binary object stream.
    pub fn save_object(
        &self,
        instance: &dyn Object,
        options: &SaveOptions,
        errors: &mut ErrorHandler,
    ) -> Result<Vec<u8>, SaveError> {
        let before = errors.error_count();
        let node = DocumentNode::from_object_with(self, instance, options.big_endian, errors).ok_or(
            SaveError::Unregistered {
                name: instance.object_type_name(),
                uuid: instance.object_uuid(),
            },
        )?;
        if errors.error_count() > before {
            return Err(SaveError::Incomplete {
                errors: errors.error_count() - before,
            });
        }

        let mut out = Vec::new();
        node.write_binary(&mut out, options.big_endian)?;
        Ok(out)
    }

    /// Upgrades a decoded document and creates the object it describes.
    pub fn load_document(
        &self,
        mut node: DocumentNode,
        options: &LoadOptions,
        errors: &mut ErrorHandler,
    ) -> Result<Box<dyn Object>, LoadError> {
        let before = errors.error_count();
        self.upgrade_document(&mut node, errors)?;

        let class = self
            .class_data(node.type_uuid())
            .ok_or(LoadError::Unregistered(node.type_uuid()))?;
        if class.factory().is_none() {
            return Err(LoadError::NotCreatable { name: class.name() });
        }
        let object = node
            .create_object(self, errors)
            .ok_or(LoadError::NotCreatable { name: class.name() })?;
        check(options, errors, before)?;
        Ok(object)
    }

    /// Decodes a binary object stream into a new object.
    pub fn load_object(
        &self,
        bytes: &[u8],
        options: &LoadOptions,
        errors: &mut ErrorHandler,
    ) -> Result<Box<dyn Object>, LoadError> {
        let node = DocumentNode::read_binary(bytes)?;
        self.load_document(node, options, errors)
    }

    /// Decodes a binary object stream into an existing object of the same type.
    pub fn load_object_into(
        &self,
        bytes: &[u8],
        target: &mut dyn Object,
        options: &LoadOptions,
        errors: &mut ErrorHandler,
    ) -> Result<(), LoadError> {
        let mut node = DocumentNode::read_binary(bytes)?;
        let before = errors.error_count();
        self.upgrade_document(&mut node, errors)?;

        if node.type_uuid() != target.object_uuid() {
            return Err(LoadError::TypeMismatch {
                expected: target.object_uuid(),
                found: node.type_uuid(),
            });
        }
        node.to_object(self, target, errors);
        check(options, errors, before)
    }
}

fn check(options: &LoadOptions, errors: &ErrorHandler, before: u32) -> Result<(), LoadError> {
    let raised = errors.error_count() - before;
    if options.strict && raised > 0 {
        Err(LoadError::Incomplete { errors: raised })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::{LoadOptions, SaveOptions};
    use crate::document::{DocumentNode, LoadError};
    use crate::tests::fixtures::{self, Inventory, Point};
    use crate::{ErrorHandler, TypeRegistry};

    #[test]
    fn save_and_load_in_both_orders() {
        let mut registry = TypeRegistry::new();
        fixtures::register_inventory(&mut registry);
        let inventory = fixtures::sample_inventory();

        for big_endian in [false, true] {
            let mut errors = ErrorHandler::new();
            let bytes = registry
                .save_object(&inventory, &SaveOptions { big_endian }, &mut errors)
                .unwrap();
            let loaded = registry
                .load_object(&bytes, &LoadOptions::default(), &mut errors)
                .unwrap();
            assert_eq!(loaded.downcast_ref::<Inventory>(), Some(&inventory));
        }
    }

    #[test]
    fn strict_loads_fail_on_errors() {
        let mut registry = TypeRegistry::new();
        fixtures::register_inventory(&mut registry);
        let mut errors = ErrorHandler::new();

        let inventory = Inventory {
            spare: Some(1),
            ..Inventory::default()
        };
        let mut node = DocumentNode::from_object(&registry, &inventory, &mut errors).unwrap();
        let spare = node.find_element_mut(crate::NameHash::of("spare")).unwrap();
        let extra = spare.children()[0].clone();
        spare.add_element(extra);
        let mut bytes = vec![];
        node.write_binary(&mut bytes, false).unwrap();

        let strict = registry.load_object(&bytes, &LoadOptions::default(), &mut errors);
        assert!(matches!(strict, Err(LoadError::Incomplete { errors: 1 })));

        let lenient = registry
            .load_object(&bytes, &LoadOptions { strict: false }, &mut errors)
            .unwrap();
        assert_eq!(lenient.downcast_ref::<Inventory>().unwrap().spare, Some(1));
    }

    #[test]
    fn load_into_checks_the_type() {
        let mut registry = TypeRegistry::new();
        fixtures::register_point(&mut registry, 1);
        let mut errors = ErrorHandler::new();
        let bytes = registry
            .save_object(&Point { x: 3, y: 4 }, &SaveOptions::default(), &mut errors)
            .unwrap();

        let mut point = Point::default();
        registry
            .load_object_into(&bytes, &mut point, &LoadOptions::default(), &mut errors)
            .unwrap();
        assert_eq!(point, Point { x: 3, y: 4 });

        let mut other = 0_u8;
        assert!(matches!(
            registry.load_object_into(&bytes, &mut other, &LoadOptions::default(), &mut errors),
            Err(LoadError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unregistered_root() {
        let registry = TypeRegistry::new();
        let mut errors = ErrorHandler::new();
        assert!(registry.save_object(&Point::default(), &SaveOptions::default(), &mut errors).is_err());
    }
}
