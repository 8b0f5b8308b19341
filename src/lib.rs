//! Runtime reflection and serialization of native objects.
//!
//! - [`serialize`]: the type registry, document trees, version upgrades and deep clones.
//! - [`utils`]: hashing and uuid-keyed containers shared by the workspace.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use sc_serialize as serialize;
pub use sc_utils as utils;
