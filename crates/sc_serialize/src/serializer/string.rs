use alloc::string::String;
use alloc::vec::Vec;

use super::{DataSerializer, SerializeError, check_text_version, expect_mut, expect_ref};
use crate::{Object, Typed};

// -----------------------------------------------------------------------------
// StringSerializer

/// Stores a `String` as its UTF-8 bytes, in both forms.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringSerializer;

impl StringSerializer {
    fn utf8(input: &[u8]) -> Result<&str, SerializeError> {
        core::str::from_utf8(input).map_err(|_| SerializeError::InvalidUtf8 {
            type_name: String::type_name(),
        })
    }
}

impl DataSerializer for StringSerializer {
    fn save(&self, value: &dyn Object, out: &mut Vec<u8>, _big_endian: bool) -> Result<usize, SerializeError> {
        let value = expect_ref::<String>(value)?;
        out.extend_from_slice(value.as_bytes());
        Ok(value.len())
    }

    fn load(
        &self,
        value: &mut dyn Object,
        input: &[u8],
        _version: u32,
        _big_endian: bool,
    ) -> Result<(), SerializeError> {
        let text = Self::utf8(input)?;
        let value = expect_mut::<String>(value)?;
        value.clear();
        value.push_str(text);
        Ok(())
    }

    fn data_to_text(&self, input: &[u8], out: &mut String, _big_endian: bool) -> Result<usize, SerializeError> {
        let text = Self::utf8(input)?;
        out.push_str(text);
        Ok(text.len())
    }

    fn text_to_data(
        &self,
        text: &str,
        text_version: u32,
        out: &mut Vec<u8>,
        _big_endian: bool,
    ) -> Result<usize, SerializeError> {
        check_text_version(String::type_name(), text_version, self.text_version())?;
        out.extend_from_slice(text.as_bytes());
        Ok(text.len())
    }

    fn compare_equal(&self, lhs: &dyn Object, rhs: &dyn Object) -> bool {
        match (lhs.downcast_ref::<String>(), rhs.downcast_ref::<String>()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => false,
        }
    }

    fn clone_value(&self, source: &dyn Object, target: &mut dyn Object) -> bool {
        match (source.downcast_ref::<String>(), target.downcast_mut::<String>()) {
            (Some(source), Some(target)) => {
                target.clone_from(source);
                true
            }
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// EmptySerializer

/// The serializer of `()`, whose payload is always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySerializer;

impl DataSerializer for EmptySerializer {
    fn save(&self, value: &dyn Object, _out: &mut Vec<u8>, _big_endian: bool) -> Result<usize, SerializeError> {
        expect_ref::<()>(value)?;
        Ok(0)
    }

    fn load(
        &self,
        value: &mut dyn Object,
        input: &[u8],
        _version: u32,
        _big_endian: bool,
    ) -> Result<(), SerializeError> {
        expect_mut::<()>(value)?;
        if input.is_empty() {
            Ok(())
        } else {
            Err(SerializeError::InvalidLength {
                type_name: <()>::type_name(),
                expected: 0,
                found: input.len(),
            })
        }
    }

    fn data_to_text(&self, _input: &[u8], _out: &mut String, _big_endian: bool) -> Result<usize, SerializeError> {
        Ok(0)
    }

    fn text_to_data(
        &self,
        _text: &str,
        text_version: u32,
        _out: &mut Vec<u8>,
        _big_endian: bool,
    ) -> Result<usize, SerializeError> {
        check_text_version(<()>::type_name(), text_version, self.text_version())?;
        Ok(0)
    }

    fn compare_equal(&self, lhs: &dyn Object, rhs: &dyn Object) -> bool {
        lhs.is::<()>() && rhs.is::<()>()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::{EmptySerializer, StringSerializer};
    use crate::serializer::{DataSerializer, SerializeError};

    #[test]
    fn string_round_trip() {
        let mut bytes = Vec::new();
        let written = StringSerializer
            .save(&String::from("héllo"), &mut bytes, true)
            .unwrap();
        assert_eq!(written, bytes.len());

        let mut loaded = String::from("stale");
        StringSerializer.load(&mut loaded, &bytes, 0, true).unwrap();
        assert_eq!(loaded, "héllo");

        let mut text = String::new();
        StringSerializer.data_to_text(&bytes, &mut text, false).unwrap();
        assert_eq!(text, "héllo");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let mut loaded = String::new();
        assert!(matches!(
            StringSerializer.load(&mut loaded, &[0xFF, 0xFE], 0, false),
            Err(SerializeError::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn string_clones_directly() {
        let mut target = String::new();
        assert!(StringSerializer.clone_value(&String::from("copy"), &mut target));
        assert_eq!(target, "copy");
        assert!(!StringSerializer.clone_value(&1_u8, &mut target));
    }

    #[test]
    fn unit_has_no_payload() {
        let mut bytes = Vec::new();
        assert_eq!(EmptySerializer.save(&(), &mut bytes, false), Ok(0));
        assert!(bytes.is_empty());
        assert!(EmptySerializer.load(&mut (), &[1], 0, false).is_err());
        assert!(EmptySerializer.compare_equal(&(), &()));
    }
}
