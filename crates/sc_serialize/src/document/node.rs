use alloc::string::String;
use alloc::vec::Vec;

use super::DataError;
use crate::{NameHash, Object, TypeRegistry, TypeUuid, Typed};

/// The encoding of a node payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadKind {
    #[default]
    BinaryLittleEndian = 0,
    BinaryBigEndian = 1,
    /// UTF-8 text, converted to binary before it reaches a serializer.
    Text = 2,
}

impl PayloadKind {
    #[inline]
    pub const fn binary(big_endian: bool) -> Self {
        if big_endian {
            Self::BinaryBigEndian
        } else {
            Self::BinaryLittleEndian
        }
    }

    #[inline]
    pub const fn is_big_endian(self) -> bool {
        matches!(self, Self::BinaryBigEndian)
    }

    pub(crate) const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::BinaryLittleEndian),
            1 => Some(Self::BinaryBigEndian),
            2 => Some(Self::Text),
            _ => None,
        }
    }
}

/// One node of a type-erased document tree.
///
/// A node records the name of the field it was written from, the type and
/// class version of the value, and either a payload (for scalars) or child
/// nodes (for records and containers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    name: String,
    name_hash: NameHash,
    type_uuid: TypeUuid,
    version: u32,
    kind: PayloadKind,
    text_version: u32,
    data: Vec<u8>,
    children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn new(name: impl Into<String>, type_uuid: TypeUuid, version: u32) -> Self {
        let name = name.into();
        Self {
            name_hash: NameHash::of(&name),
            name,
            type_uuid,
            version,
            kind: PayloadKind::BinaryLittleEndian,
            text_version: 0,
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn name_hash(&self) -> NameHash {
        self.name_hash
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.name_hash = NameHash::of(&self.name);
    }

    #[inline]
    pub fn type_uuid(&self) -> TypeUuid {
        self.type_uuid
    }

    /// Retypes the node, converters use it to turn a node into its replacement.
    #[inline]
    pub fn set_type(&mut self, type_uuid: TypeUuid, version: u32) {
        self.type_uuid = type_uuid;
        self.version = version;
    }

    /// The class version the node was written with.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[inline]
    pub fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    #[inline]
    pub fn payload_kind(&self) -> PayloadKind {
        self.kind
    }

    /// The text format version, meaningful for [`PayloadKind::Text`] only.
    #[inline]
    pub fn text_version(&self) -> u32 {
        self.text_version
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_payload(&mut self, kind: PayloadKind, text_version: u32, data: Vec<u8>) {
        self.kind = kind;
        self.text_version = text_version;
        self.data = data;
    }

    // -------------------------------------------------------------------------
    // Children

    #[inline]
    pub fn children(&self) -> &[DocumentNode] {
        &self.children
    }

    #[inline]
    pub fn children_mut(&mut self) -> &mut Vec<DocumentNode> {
        &mut self.children
    }

    /// Appends a child, returning its index.
    pub fn add_element(&mut self, node: DocumentNode) -> usize {
        self.children.push(node);
        self.children.len() - 1
    }

    /// Removes the first child named `name_hash`.
    pub fn remove_element(&mut self, name_hash: NameHash) -> Option<DocumentNode> {
        let index = self.find_element_index(name_hash)?;
        Some(self.children.remove(index))
    }

    pub fn find_element_index(&self, name_hash: NameHash) -> Option<usize> {
        self.children.iter().position(|c| c.name_hash == name_hash)
    }

    pub fn find_element(&self, name_hash: NameHash) -> Option<&DocumentNode> {
        self.children.iter().find(|c| c.name_hash == name_hash)
    }

    pub fn find_element_mut(&mut self, name_hash: NameHash) -> Option<&mut DocumentNode> {
        self.children.iter_mut().find(|c| c.name_hash == name_hash)
    }

    // -------------------------------------------------------------------------
    // Scalar payloads

    /// Decodes the payload of a scalar node into a `T`.
    pub fn get_data<T: Typed + Default>(&self, registry: &TypeRegistry) -> Result<T, DataError> {
        if self.type_uuid != T::type_uuid() {
            return Err(DataError::TypeMismatch {
                expected: T::type_uuid(),
                found: self.type_uuid,
            });
        }
        let mut value = T::default();
        self.load_payload(registry, &mut value)?;
        Ok(value)
    }

    /// Replaces the node's type and payload with `value`.
    pub fn set_data<T: Typed>(&mut self, registry: &TypeRegistry, value: &T) -> Result<(), DataError> {
        let class = registry
            .class_data(T::type_uuid())
            .ok_or(DataError::Unregistered(T::type_uuid()))?;
        let serializer = class
            .serializer()
            .ok_or(DataError::NoSerializer { name: class.name() })?;

        let big_endian = self.kind.is_big_endian();
        let mut data = Vec::new();
        serializer.save(value, &mut data, big_endian)?;

        self.set_type(class.type_uuid(), class.version());
        self.set_payload(PayloadKind::binary(big_endian), 0, data);
        self.children.clear();
        Ok(())
    }

    /// Decodes the payload into `value`, whose type must match the node.
    pub(crate) fn load_payload(&self, registry: &TypeRegistry, value: &mut dyn Object) -> Result<(), DataError> {
        let class = registry
            .class_data(self.type_uuid)
            .ok_or(DataError::Unregistered(self.type_uuid))?;
        let serializer = class
            .serializer()
            .ok_or(DataError::NoSerializer { name: class.name() })?;

        match self.kind {
            PayloadKind::Text => {
                let text = core::str::from_utf8(&self.data)
                    .map_err(|_| crate::serializer::SerializeError::InvalidUtf8 { type_name: class.name() })?;
                let mut data = Vec::new();
                serializer.text_to_data(text, self.text_version, &mut data, false)?;
                serializer.load(value, &data, self.version, false)?;
            }
            kind => serializer.load(value, &self.data, self.version, kind.is_big_endian())?,
        }
        Ok(())
    }

    /// Turns a text payload into binary, in the requested byte order.
    ///
    /// Nodes without a payload and binary nodes are left untouched.
    pub fn convert_to_binary(&mut self, registry: &TypeRegistry, big_endian: bool) -> Result<(), DataError> {
        if self.kind != PayloadKind::Text {
            return Ok(());
        }
        let class = registry
            .class_data(self.type_uuid)
            .ok_or(DataError::Unregistered(self.type_uuid))?;
        let serializer = class
            .serializer()
            .ok_or(DataError::NoSerializer { name: class.name() })?;

        let text = core::str::from_utf8(&self.data)
            .map_err(|_| crate::serializer::SerializeError::InvalidUtf8 { type_name: class.name() })?;
        let mut data = Vec::new();
        serializer.text_to_data(text, self.text_version, &mut data, big_endian)?;
        self.set_payload(PayloadKind::binary(big_endian), 0, data);
        Ok(())
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}
