use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use sc_utils::hash::HashMap;

use super::UpgradeError;
use crate::{DocumentNode, NameHash};

// -----------------------------------------------------------------------------
// UpgradeKind

/// What an upgrade does to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum UpgradeKind {
    /// The field `old_name` is called `new_name` from the target version on.
    NameChange {
        old_name: &'static str,
        new_name: &'static str,
    },
}

impl UpgradeKind {
    /// Order of upgrades sharing a field and a version range, lower first.
    #[inline]
    pub const fn priority(&self) -> u32 {
        match self {
            Self::NameChange { .. } => 0,
        }
    }
}

// -----------------------------------------------------------------------------
// DataPatchUpgrade

/// One rewrite of a document node between two class versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPatchUpgrade {
    field: NameHash,
    from_version: u32,
    to_version: u32,
    kind: UpgradeKind,
}

impl DataPatchUpgrade {
    pub fn name_change(
        from_version: u32,
        to_version: u32,
        old_name: &'static str,
        new_name: &'static str,
    ) -> Self {
        Self {
            field: NameHash::of(old_name),
            from_version,
            to_version,
            kind: UpgradeKind::NameChange { old_name, new_name },
        }
    }

    /// The hash of the field name this upgrade starts from.
    #[inline]
    pub fn field(&self) -> NameHash {
        self.field
    }

    #[inline]
    pub fn from_version(&self) -> u32 {
        self.from_version
    }

    #[inline]
    pub fn to_version(&self) -> u32 {
        self.to_version
    }

    #[inline]
    pub fn kind(&self) -> &UpgradeKind {
        &self.kind
    }

    /// Rewrites `node`, returning the hash the field is known by afterwards.
    fn apply(&self, class: &'static str, node: &mut DocumentNode) -> Result<NameHash, UpgradeError> {
        match self.kind {
            UpgradeKind::NameChange { old_name, new_name } => {
                let child = node.find_element_mut(self.field).ok_or(UpgradeError::MissingField {
                    class,
                    field: old_name,
                    from: self.from_version,
                    to: self.to_version,
                })?;
                child.set_name(new_name);
                Ok(child.name_hash())
            }
        }
    }

    /// Bucket order: descending target version, then kind priority.
    fn bucket_order(&self, other: &Self) -> core::cmp::Ordering {
        other
            .to_version
            .cmp(&self.to_version)
            .then(self.kind.priority().cmp(&other.kind.priority()))
    }
}

// -----------------------------------------------------------------------------
// DataPatchUpgradeMap

/// The upgrades of one class, grouped by field and source version.
///
/// Within a `(field, from_version)` bucket the upgrade with the highest
/// target version comes first, so it wins over shorter hops regardless of
/// registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataPatchUpgradeMap {
    upgrades: BTreeMap<NameHash, BTreeMap<u32, Vec<DataPatchUpgrade>>>,
    len: usize,
}

impl DataPatchUpgradeMap {
    pub const fn new() -> Self {
        Self {
            upgrades: BTreeMap::new(),
            len: 0,
        }
    }

    /// Adds `upgrade`, handing it back if an equal one is already known.
    pub fn add(&mut self, upgrade: DataPatchUpgrade) -> Result<(), DataPatchUpgrade> {
        let bucket = self
            .upgrades
            .entry(upgrade.field)
            .or_default()
            .entry(upgrade.from_version)
            .or_default();
        if bucket
            .iter()
            .any(|known| known.to_version == upgrade.to_version && known.kind.priority() == upgrade.kind.priority())
        {
            return Err(upgrade);
        }

        let at = bucket.partition_point(|known| known.bucket_order(&upgrade).is_le());
        bucket.insert(at, upgrade);
        self.len += 1;
        Ok(())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// All upgrades, by field, then source version, then bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &DataPatchUpgrade> {
        self.upgrades.values().flat_map(|by_version| by_version.values().flatten())
    }

    /// Brings the fields of `node` from its recorded version up to `target_version`.
    ///
    /// Each field tracks its own version: an upgrade applies when it starts
    /// at the version the field is currently at and does not overshoot the
    /// target. Renames chain, a field renamed from 1 to 2 is picked up by an
    /// upgrade of the new name starting at 2.
    ///
    /// `node` is left partially upgraded on error.
    pub(crate) fn apply(
        &self,
        class: &'static str,
        node: &mut DocumentNode,
        target_version: u32,
    ) -> Result<(), UpgradeError> {
        let mut ordered: Vec<&DataPatchUpgrade> = self.iter().collect();
        ordered.sort_by(|a, b| a.from_version.cmp(&b.from_version).then(a.bucket_order(b)));

        let start = node.version();
        let mut at_version: HashMap<NameHash, u32> = HashMap::default();
        for upgrade in ordered {
            let current = at_version.get(&upgrade.field).copied().unwrap_or(start);
            if upgrade.from_version != current || upgrade.to_version > target_version {
                continue;
            }
            let renamed = upgrade.apply(class, node)?;
            log::debug!(
                "upgraded `{class}` field {:?} from version {} to {}",
                upgrade.kind,
                upgrade.from_version,
                upgrade.to_version,
            );
            at_version.insert(upgrade.field, upgrade.to_version);
            at_version.insert(renamed, upgrade.to_version);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DataPatchUpgrade, DataPatchUpgradeMap};
    use crate::upgrade::UpgradeError;
    use crate::{DocumentNode, NameHash, TypeUuid};

    fn node(version: u32, fields: &[&str]) -> DocumentNode {
        let mut node = DocumentNode::new("Thing", TypeUuid::from_u128(7), version);
        for name in fields {
            node.add_element(DocumentNode::new(*name, TypeUuid::from_u128(8), 0));
        }
        node
    }

    fn names(node: &DocumentNode) -> alloc::vec::Vec<&str> {
        node.children().iter().map(DocumentNode::name).collect()
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut map = DataPatchUpgradeMap::new();
        assert!(map.add(DataPatchUpgrade::name_change(1, 2, "a", "b")).is_ok());
        assert!(map.add(DataPatchUpgrade::name_change(1, 3, "a", "c")).is_ok());
        assert!(map.add(DataPatchUpgrade::name_change(1, 2, "a", "d")).is_err());
        assert_eq!(map.len(), 2);

        let order: alloc::vec::Vec<u32> = map.iter().map(DataPatchUpgrade::to_version).collect();
        assert_eq!(order, [3, 2]);
    }

    #[test]
    fn renames_chain_across_versions() {
        let mut map = DataPatchUpgradeMap::new();
        map.add(DataPatchUpgrade::name_change(2, 3, "b", "c")).unwrap();
        map.add(DataPatchUpgrade::name_change(1, 2, "a", "b")).unwrap();

        let mut doc = node(1, &["a", "other"]);
        map.apply("Thing", &mut doc, 3).unwrap();
        assert_eq!(names(&doc), ["c", "other"]);

        let mut doc = node(1, &["a"]);
        map.apply("Thing", &mut doc, 2).unwrap();
        assert_eq!(names(&doc), ["b"]);

        let mut doc = node(2, &["b"]);
        map.apply("Thing", &mut doc, 3).unwrap();
        assert_eq!(names(&doc), ["c"]);
    }

    #[test]
    fn longest_hop_wins() {
        for reversed in [false, true] {
            let mut map = DataPatchUpgradeMap::new();
            let short = DataPatchUpgrade::name_change(1, 2, "a", "short");
            let long = DataPatchUpgrade::name_change(1, 3, "a", "long");
            if reversed {
                map.add(long).unwrap();
                map.add(short).unwrap();
            } else {
                map.add(short).unwrap();
                map.add(long).unwrap();
            }

            let mut doc = node(1, &["a"]);
            map.apply("Thing", &mut doc, 3).unwrap();
            assert_eq!(names(&doc), ["long"]);
            assert!(doc.find_element(NameHash::of("long")).is_some());
        }
    }

    #[test]
    fn missing_field_is_an_error() {
        let mut map = DataPatchUpgradeMap::new();
        map.add(DataPatchUpgrade::name_change(1, 2, "gone", "new")).unwrap();

        let mut doc = node(1, &["a"]);
        assert_eq!(
            map.apply("Thing", &mut doc, 2),
            Err(UpgradeError::MissingField {
                class: "Thing",
                field: "gone",
                from: 1,
                to: 2,
            })
        );

        let mut current = node(2, &["a"]);
        assert!(map.apply("Thing", &mut current, 2).is_ok());
    }
}
