use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{DataSerializer, SerializeError, expect_mut, expect_ref};
use crate::{Object, Typed};

/// Stores an enumeration as its underlying scalar.
///
/// Both the binary and the text form are the ones of the underlying type.
pub struct EnumValueSerializer<E, U> {
    underlying: Arc<dyn DataSerializer>,
    to_underlying: fn(&E) -> U,
    from_underlying: fn(U) -> Option<E>,
}

impl<E: Typed, U: Typed + Default> EnumValueSerializer<E, U> {
    pub fn new(
        underlying: Arc<dyn DataSerializer>,
        to_underlying: fn(&E) -> U,
        from_underlying: fn(U) -> Option<E>,
    ) -> Self {
        Self {
            underlying,
            to_underlying,
            from_underlying,
        }
    }
}

impl<E: Typed, U: Typed + Default> DataSerializer for EnumValueSerializer<E, U> {
    fn save(&self, value: &dyn Object, out: &mut Vec<u8>, big_endian: bool) -> Result<usize, SerializeError> {
        let raw = (self.to_underlying)(expect_ref::<E>(value)?);
        self.underlying.save(&raw, out, big_endian)
    }

    fn load(
        &self,
        value: &mut dyn Object,
        input: &[u8],
        version: u32,
        big_endian: bool,
    ) -> Result<(), SerializeError> {
        let mut raw = U::default();
        self.underlying.load(&mut raw, input, version, big_endian)?;
        let decoded = (self.from_underlying)(raw).ok_or(SerializeError::InvalidValue {
            type_name: E::type_name(),
        })?;
        *expect_mut::<E>(value)? = decoded;
        Ok(())
    }

    fn data_to_text(&self, input: &[u8], out: &mut String, big_endian: bool) -> Result<usize, SerializeError> {
        self.underlying.data_to_text(input, out, big_endian)
    }

    fn text_to_data(
        &self,
        text: &str,
        text_version: u32,
        out: &mut Vec<u8>,
        big_endian: bool,
    ) -> Result<usize, SerializeError> {
        self.underlying.text_to_data(text, text_version, out, big_endian)
    }

    fn compare_equal(&self, lhs: &dyn Object, rhs: &dyn Object) -> bool {
        match (lhs.downcast_ref::<E>(), rhs.downcast_ref::<E>()) {
            (Some(lhs), Some(rhs)) => {
                let lhs = (self.to_underlying)(lhs);
                let rhs = (self.to_underlying)(rhs);
                self.underlying.compare_equal(&lhs, &rhs)
            }
            _ => false,
        }
    }

    fn text_version(&self) -> u32 {
        self.underlying.text_version()
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use super::EnumValueSerializer;
    use crate::serializer::{DataSerializer, ScalarSerializer, SerializeError};
    use crate::tests::fixtures::Mode;

    fn serializer() -> EnumValueSerializer<Mode, u8> {
        EnumValueSerializer::new(
            Arc::new(ScalarSerializer::<u8>::new()),
            |m| *m as u8,
            Mode::from_u8,
        )
    }

    #[test]
    fn stored_as_underlying() {
        let mut bytes = Vec::new();
        serializer().save(&Mode::Jump, &mut bytes, false).unwrap();
        assert_eq!(bytes, [2]);

        let mut mode = Mode::Idle;
        serializer().load(&mut mode, &bytes, 0, false).unwrap();
        assert_eq!(mode, Mode::Jump);
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let mut mode = Mode::Idle;
        assert_eq!(
            serializer().load(&mut mode, &[42], 0, false),
            Err(SerializeError::InvalidValue { type_name: "Mode" })
        );
        assert_eq!(mode, Mode::Idle);
    }
}
