//! Version upgrades of decoded documents.
//!
//! Classes declare field renames with
//! [`ClassBuilder::name_change`](crate::registry::ClassBuilder::name_change)
//! and may attach a version converter. [`TypeRegistry::upgrade_document`](crate::TypeRegistry::upgrade_document)
//! applies both to a [`DocumentNode`](crate::DocumentNode) tree before it is
//! materialized. The pass only edits names and structure, payloads are
//! left to converters.

// -----------------------------------------------------------------------------
// Modules

mod apply;
mod error;
mod patch;

// -----------------------------------------------------------------------------
// Exports

pub use error::UpgradeError;
pub use patch::{DataPatchUpgrade, DataPatchUpgradeMap, UpgradeKind};
