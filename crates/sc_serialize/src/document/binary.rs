//! The binary object stream.
//!
//! ```text
//! stream := "SCOS" version:u8 flags:u8 node
//! node   := length:u32 uuid:[u8; 16] version:u32 kind:u8 text_version:u32
//!           name_len:u16 name payload_len:u32 payload child_count:u32 node*
//! ```
//!
//! Integers use the byte order selected by bit 0 of `flags`. `length` counts
//! the bytes following it, readers skip whatever a node holds past its known
//! content.

use alloc::string::String;
use alloc::vec::Vec;

use super::{DocumentNode, PayloadKind, StreamError};
use crate::TypeUuid;

/// Magic bytes opening every object stream.
pub const MAGIC: [u8; 4] = *b"SCOS";

/// The stream version written by this crate.
pub const STREAM_VERSION: u8 = 1;

/// Size of the stream header.
pub const HEADER_LEN: usize = 6;

/// Size of a node without its name, payload and children.
pub const NODE_FIXED_LEN: usize = 39;

/// Deepest node nesting accepted by the reader.
pub const MAX_DEPTH: usize = 256;

const FLAG_BIG_ENDIAN: u8 = 1 << 0;

// -----------------------------------------------------------------------------
// Writer

struct Writer<'a> {
    out: &'a mut Vec<u8>,
    big_endian: bool,
}

impl Writer<'_> {
    #[inline]
    fn u16(&mut self, value: u16) {
        let bytes = if self.big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
        self.out.extend_from_slice(&bytes);
    }

    #[inline]
    fn u32(&mut self, value: u32) {
        let bytes = if self.big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
        self.out.extend_from_slice(&bytes);
    }

    fn patch_u32(&mut self, at: usize, value: u32) {
        let bytes = if self.big_endian { value.to_be_bytes() } else { value.to_le_bytes() };
        self.out[at..at + 4].copy_from_slice(&bytes);
    }

    fn node(&mut self, node: &DocumentNode) -> Result<(), StreamError> {
        let start = self.out.len();
        self.u32(0);

        self.out.extend_from_slice(node.type_uuid().as_bytes());
        self.u32(node.version());
        self.out.push(node.payload_kind() as u8);
        self.u32(node.text_version());

        let name = node.name().as_bytes();
        self.u16(fits("node name", name.len())?);
        self.out.extend_from_slice(name);

        self.u32(fits("payload", node.data().len())?);
        self.out.extend_from_slice(node.data());

        self.u32(fits("child list", node.children().len())?);
        for child in node.children() {
            self.node(child)?;
        }

        let length = self.out.len() - start - 4;
        self.patch_u32(start, fits("node", length)?);
        Ok(())
    }
}

fn fits<T: TryFrom<usize>>(what: &'static str, len: usize) -> Result<T, StreamError> {
    T::try_from(len).map_err(|_| StreamError::TooLarge { what, len })
}

// -----------------------------------------------------------------------------
// Reader

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    big_endian: bool,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], StreamError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(StreamError::UnexpectedEof(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn u8(&mut self) -> Result<u8, StreamError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, StreamError> {
        let bytes = self.array()?;
        Ok(if self.big_endian { u16::from_be_bytes(bytes) } else { u16::from_le_bytes(bytes) })
    }

    fn u32(&mut self) -> Result<u32, StreamError> {
        let bytes = self.array()?;
        Ok(if self.big_endian { u32::from_be_bytes(bytes) } else { u32::from_le_bytes(bytes) })
    }

    fn node(&mut self, depth: usize) -> Result<DocumentNode, StreamError> {
        if depth > MAX_DEPTH {
            return Err(StreamError::TooDeep(MAX_DEPTH));
        }

        let length = self.u32()? as usize;
        let end = self
            .pos
            .checked_add(length)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(StreamError::UnexpectedEof(self.pos))?;

        let type_uuid = TypeUuid::from_bytes(self.array()?);
        let version = self.u32()?;
        let kind = self.u8()?;
        let kind = PayloadKind::from_u8(kind).ok_or(StreamError::InvalidPayloadKind(kind))?;
        let text_version = self.u32()?;

        let name_len = self.u16()? as usize;
        let name = core::str::from_utf8(self.take(name_len)?).map_err(|_| StreamError::InvalidName)?;
        let mut node = DocumentNode::new(String::from(name), type_uuid, version);

        let data_len = self.u32()? as usize;
        let data = self.take(data_len)?.to_vec();
        node.set_payload(kind, text_version, data);

        let child_count = self.u32()?;
        for _ in 0..child_count {
            let child = self.node(depth + 1)?;
            node.add_element(child);
        }

        if self.pos > end {
            return Err(StreamError::LengthMismatch(length));
        }
        if self.pos < end {
            log::debug!("skipping {} unknown byte(s) of node `{}`", end - self.pos, node.name());
            self.pos = end;
        }
        Ok(node)
    }
}

impl DocumentNode {
    /// Appends an object stream holding this tree to `out`.
    ///
    /// Fails without touching `out` when a name, payload, child list or node
    /// does not fit its length field.
    pub fn write_binary(&self, out: &mut Vec<u8>, big_endian: bool) -> Result<(), StreamError> {
        let start = out.len();
        out.extend_from_slice(&MAGIC);
        out.push(STREAM_VERSION);
        out.push(if big_endian { FLAG_BIG_ENDIAN } else { 0 });
        let written = Writer { out, big_endian }.node(self);
        if written.is_err() {
            out.truncate(start);
        }
        written
    }

    /// Parses an object stream.
    pub fn read_binary(bytes: &[u8]) -> Result<DocumentNode, StreamError> {
        if bytes.len() < HEADER_LEN || bytes[..4] != MAGIC {
            return Err(StreamError::InvalidHeader);
        }
        if bytes[4] != STREAM_VERSION {
            return Err(StreamError::UnsupportedVersion(bytes[4]));
        }

        let mut reader = Reader {
            bytes,
            pos: HEADER_LEN,
            big_endian: bytes[5] & FLAG_BIG_ENDIAN != 0,
        };
        let root = reader.node(0)?;
        match bytes.len() - reader.pos {
            0 => Ok(root),
            trailing => Err(StreamError::TrailingBytes(trailing)),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::{HEADER_LEN, NODE_FIXED_LEN};
    use crate::document::{DocumentNode, PayloadKind, StreamError};
    use crate::{TypeUuid, Typed};

    fn sample() -> DocumentNode {
        let mut root = DocumentNode::new("Scene", TypeUuid::from_u128(7), 3);
        let mut speed = DocumentNode::new("speed", f32::type_uuid(), 0);
        speed.set_payload(PayloadKind::BinaryLittleEndian, 0, 1.5_f32.to_le_bytes().to_vec());
        root.add_element(speed);
        let mut label = DocumentNode::new("label", alloc::string::String::type_uuid(), 0);
        label.set_payload(PayloadKind::Text, 0, b"hi".to_vec());
        root.add_element(label);
        root
    }

    #[test]
    fn stream_round_trip_in_both_orders() {
        for big_endian in [false, true] {
            let root = sample();
            let mut bytes = Vec::new();
            root.write_binary(&mut bytes, big_endian).unwrap();
            assert_eq!(
                bytes.len(),
                HEADER_LEN + 3 * NODE_FIXED_LEN + "Scene".len() + "speed".len() + 4 + "label".len() + 2
            );
            assert_eq!(DocumentNode::read_binary(&bytes).unwrap(), root);
        }
    }

    #[test]
    fn bad_streams_are_rejected() {
        let mut bytes = Vec::new();
        sample().write_binary(&mut bytes, false).unwrap();

        assert_eq!(DocumentNode::read_binary(b"NOPE\x01\x00"), Err(StreamError::InvalidHeader));

        let mut version = bytes.clone();
        version[4] = 9;
        assert_eq!(DocumentNode::read_binary(&version), Err(StreamError::UnsupportedVersion(9)));

        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(
            DocumentNode::read_binary(truncated),
            Err(StreamError::UnexpectedEof(_))
        ));

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert_eq!(DocumentNode::read_binary(&trailing), Err(StreamError::TrailingBytes(1)));
    }

    #[test]
    fn unknown_node_bytes_are_skipped() {
        let leaf = DocumentNode::new("flag", bool::type_uuid(), 0);
        let mut bytes = Vec::new();
        leaf.write_binary(&mut bytes, false).unwrap();

        // Grow the node by two bytes a newer writer might append.
        bytes.extend_from_slice(&[0xAA, 0xBB]);
        let length = u32::from_le_bytes(bytes[HEADER_LEN..HEADER_LEN + 4].try_into().unwrap()) + 2;
        bytes[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&length.to_le_bytes());

        assert_eq!(DocumentNode::read_binary(&bytes).unwrap(), leaf);
    }

    #[test]
    fn oversized_names_are_refused() {
        let long = alloc::string::String::from("é").repeat(40_000);
        let node = DocumentNode::new(long, bool::type_uuid(), 0);
        let mut bytes = Vec::from(*b"keep");
        assert_eq!(
            node.write_binary(&mut bytes, false),
            Err(StreamError::TooLarge {
                what: "node name",
                len: 80_000
            })
        );
        assert_eq!(bytes, b"keep");

        let fits = DocumentNode::new("é".repeat(30_000), bool::type_uuid(), 0);
        bytes.clear();
        fits.write_binary(&mut bytes, true).unwrap();
        assert_eq!(DocumentNode::read_binary(&bytes).unwrap(), fits);
    }

    #[test]
    fn nesting_is_bounded() {
        let mut node = DocumentNode::new("leaf", bool::type_uuid(), 0);
        for _ in 0..300 {
            let mut parent = DocumentNode::new("n", TypeUuid::from_u128(1), 0);
            parent.add_element(node);
            node = parent;
        }
        let mut bytes = Vec::new();
        node.write_binary(&mut bytes, false).unwrap();
        assert_eq!(DocumentNode::read_binary(&bytes), Err(StreamError::TooDeep(super::MAX_DEPTH)));
    }
}
