use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde_core::de::{Error as _, IgnoredAny, MapAccess, Visitor};
use serde_core::ser::SerializeStruct;
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use super::{DocumentNode, PayloadKind};
use crate::{TypeRegistry, TypeUuid};

const FIELDS: &[&str] = &["name", "type", "version", "textVersion", "value", "children"];

// -----------------------------------------------------------------------------
// Serialize

/// A [`DocumentNode`] tree ready to be written with any serde text format.
///
/// Binary payloads are turned into text by the serializer of their class,
/// so the registry must know every scalar type in the tree.
///
/// # Examples
///
/// ```
/// use sc_serialize::{ErrorHandler, DocumentNode, TypeRegistry};
/// use sc_serialize::document::TextDocument;
///
/// let registry = TypeRegistry::new();
/// let mut errors = ErrorHandler::new();
/// let node = DocumentNode::from_object(&registry, &42_u32, &mut errors).unwrap();
///
/// let json = serde_json::to_string(&TextDocument::new(&node, &registry)).unwrap();
/// let back: DocumentNode = serde_json::from_str(&json).unwrap();
/// assert_eq!(back.get_data::<u32>(&registry).unwrap(), 42);
/// ```
pub struct TextDocument<'a> {
    node: &'a DocumentNode,
    registry: &'a TypeRegistry,
}

impl<'a> TextDocument<'a> {
    #[inline]
    pub fn new(node: &'a DocumentNode, registry: &'a TypeRegistry) -> Self {
        Self { node, registry }
    }

    /// The text payload of the node and its text version.
    fn value<E: serde_core::ser::Error>(&self) -> Result<Option<(String, u32)>, E> {
        let node = self.node;
        if node.payload_kind() == PayloadKind::Text {
            let text = core::str::from_utf8(node.data())
                .map_err(|_| E::custom(format!("text payload of `{}` is not UTF-8", node.name())))?;
            return Ok(Some((text.to_string(), node.text_version())));
        }

        let serializer = self
            .registry
            .class_data(node.type_uuid())
            .and_then(|class| class.serializer());
        match serializer {
            Some(serializer) => {
                let mut text = String::new();
                serializer
                    .data_to_text(node.data(), &mut text, node.payload_kind().is_big_endian())
                    .map_err(|error| E::custom(format!("cannot write `{}` as text: {error}", node.name())))?;
                Ok(Some((text, serializer.text_version())))
            }
            None if node.data().is_empty() => Ok(None),
            None => Err(E::custom(format!(
                "`{}` {} has a payload but no registered serializer",
                node.name(),
                node.type_uuid(),
            ))),
        }
    }
}

struct Children<'a> {
    nodes: &'a [DocumentNode],
    registry: &'a TypeRegistry,
}

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.nodes.iter().map(|node| TextDocument::new(node, self.registry)))
    }
}

impl Serialize for TextDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.node;
        let value = self.value::<S::Error>()?;
        let has_children = !node.children().is_empty();

        let mut len = 3 + usize::from(has_children);
        if value.is_some() {
            len += 2;
        }
        let mut state = serializer.serialize_struct("DocumentNode", len)?;
        state.serialize_field("name", node.name())?;
        state.serialize_field("type", &node.type_uuid().to_string())?;
        state.serialize_field("version", &node.version())?;
        if let Some((text, text_version)) = &value {
            state.serialize_field("textVersion", text_version)?;
            state.serialize_field("value", text)?;
        }
        if has_children {
            state.serialize_field(
                "children",
                &Children {
                    nodes: node.children(),
                    registry: self.registry,
                },
            )?;
        }
        state.end()
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct Ident(String);

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdentVisitor;

        impl<'de> Visitor<'de> for IdentVisitor {
            type Value = Ident;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("identifier")
            }

            #[inline]
            fn visit_str<E: serde_core::de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Ident(value.to_string()))
            }

            #[inline]
            fn visit_string<E: serde_core::de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(Ident(value))
            }
        }

        deserializer.deserialize_identifier(IdentVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = DocumentNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a document node")
    }

    fn visit_map<V: MapAccess<'de>>(self, mut map: V) -> Result<Self::Value, V::Error> {
        let mut name: Option<String> = None;
        let mut type_uuid: Option<TypeUuid> = None;
        let mut version = 0;
        let mut text_version = 0;
        let mut value: Option<String> = None;
        let mut children: Vec<DocumentNode> = Vec::new();

        while let Some(Ident(key)) = map.next_key::<Ident>()? {
            match key.as_str() {
                "name" => name = Some(map.next_value()?),
                "type" => {
                    let text: String = map.next_value()?;
                    let parsed = TypeUuid::parse(&text)
                        .map_err(|error| V::Error::custom(format!("invalid type `{text}`: {error}")))?;
                    type_uuid = Some(parsed);
                }
                "version" => version = map.next_value()?,
                "textVersion" => text_version = map.next_value()?,
                "value" => value = Some(map.next_value()?),
                "children" => children = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let name = name.ok_or_else(|| V::Error::missing_field("name"))?;
        let type_uuid = type_uuid.ok_or_else(|| V::Error::missing_field("type"))?;

        let mut node = DocumentNode::new(name, type_uuid, version);
        if let Some(value) = value {
            node.set_payload(PayloadKind::Text, text_version, value.into_bytes());
        }
        node.children_mut().extend(children);
        Ok(node)
    }
}

impl<'de> Deserialize<'de> for DocumentNode {
    /// Reads a node written by [`TextDocument`].
    ///
    /// Scalar payloads stay text until they are loaded or converted with
    /// [`DocumentNode::convert_to_binary`]. Unknown keys are ignored.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_struct("DocumentNode", FIELDS, NodeVisitor)
    }
}
