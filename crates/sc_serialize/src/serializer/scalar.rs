use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use core::marker::PhantomData;

use super::{DataSerializer, SerializeError, check_text_version, expect_mut, expect_ref};
use crate::{Object, Typed};

/// A fixed-width value with a byte and a text encoding.
///
/// Implemented for `bool`, the fixed-width integers, `f32` and `f64`.
pub trait Scalar: Typed + Copy + PartialEq {
    /// Size of the binary form in bytes.
    const WIDTH: usize;

    fn write_bytes(self, out: &mut Vec<u8>, big_endian: bool);

    /// Decodes exactly [`WIDTH`](Self::WIDTH) bytes.
    fn read_bytes(input: &[u8], big_endian: bool) -> Option<Self>;

    fn write_text(self, out: &mut String);

    fn read_text(text: &str) -> Option<Self>;

    fn approx_eq(self, other: Self) -> bool {
        self == other
    }
}

macro_rules! impl_scalar_number {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            const WIDTH: usize = size_of::<$ty>();

            #[inline]
            fn write_bytes(self, out: &mut Vec<u8>, big_endian: bool) {
                if big_endian {
                    out.extend_from_slice(&self.to_be_bytes());
                } else {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }

            #[inline]
            fn read_bytes(input: &[u8], big_endian: bool) -> Option<Self> {
                let bytes = input.try_into().ok()?;
                Some(if big_endian {
                    <$ty>::from_be_bytes(bytes)
                } else {
                    <$ty>::from_le_bytes(bytes)
                })
            }

            #[inline]
            fn write_text(self, out: &mut String) {
                let _ = write!(out, "{self}");
            }

            #[inline]
            fn read_text(text: &str) -> Option<Self> {
                text.trim().parse().ok()
            }
        }
    )*};
}

impl_scalar_number!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_scalar_float {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            const WIDTH: usize = size_of::<$ty>();

            #[inline]
            fn write_bytes(self, out: &mut Vec<u8>, big_endian: bool) {
                if big_endian {
                    out.extend_from_slice(&self.to_be_bytes());
                } else {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }

            #[inline]
            fn read_bytes(input: &[u8], big_endian: bool) -> Option<Self> {
                let bytes = input.try_into().ok()?;
                Some(if big_endian {
                    <$ty>::from_be_bytes(bytes)
                } else {
                    <$ty>::from_le_bytes(bytes)
                })
            }

            #[inline]
            fn write_text(self, out: &mut String) {
                let _ = write!(out, "{self:.7}");
            }

            #[inline]
            fn read_text(text: &str) -> Option<Self> {
                text.trim().parse().ok()
            }

            #[inline]
            fn approx_eq(self, other: Self) -> bool {
                self == other
                    || (self.is_nan() && other.is_nan())
                    || (self - other).abs() <= <$ty>::EPSILON
            }
        }
    )*};
}

impl_scalar_float!(f32, f64);

impl Scalar for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn write_bytes(self, out: &mut Vec<u8>, _big_endian: bool) {
        out.push(self as u8);
    }

    #[inline]
    fn read_bytes(input: &[u8], _big_endian: bool) -> Option<Self> {
        match input {
            [byte] => Some(*byte != 0),
            _ => None,
        }
    }

    #[inline]
    fn write_text(self, out: &mut String) {
        out.push_str(if self { "true" } else { "false" });
    }

    fn read_text(text: &str) -> Option<Self> {
        match text.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// ScalarSerializer

/// The [`DataSerializer`] of a [`Scalar`] type.
pub struct ScalarSerializer<T>(PhantomData<fn() -> T>);

impl<T: Scalar> ScalarSerializer<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(PhantomData)
    }

    fn decode(input: &[u8], big_endian: bool) -> Result<T, SerializeError> {
        T::read_bytes(input, big_endian).ok_or(SerializeError::InvalidLength {
            type_name: T::type_name(),
            expected: T::WIDTH,
            found: input.len(),
        })
    }
}

impl<T: Scalar> Default for ScalarSerializer<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> DataSerializer for ScalarSerializer<T> {
    fn save(&self, value: &dyn Object, out: &mut Vec<u8>, big_endian: bool) -> Result<usize, SerializeError> {
        expect_ref::<T>(value)?.write_bytes(out, big_endian);
        Ok(T::WIDTH)
    }

    fn load(
        &self,
        value: &mut dyn Object,
        input: &[u8],
        _version: u32,
        big_endian: bool,
    ) -> Result<(), SerializeError> {
        let decoded = Self::decode(input, big_endian)?;
        *expect_mut::<T>(value)? = decoded;
        Ok(())
    }

    fn data_to_text(&self, input: &[u8], out: &mut String, big_endian: bool) -> Result<usize, SerializeError> {
        let start = out.len();
        Self::decode(input, big_endian)?.write_text(out);
        Ok(out.len() - start)
    }

    fn text_to_data(
        &self,
        text: &str,
        text_version: u32,
        out: &mut Vec<u8>,
        big_endian: bool,
    ) -> Result<usize, SerializeError> {
        check_text_version(T::type_name(), text_version, self.text_version())?;
        let value = T::read_text(text).ok_or_else(|| SerializeError::InvalidText {
            type_name: T::type_name(),
            text: text.into(),
        })?;
        value.write_bytes(out, big_endian);
        Ok(T::WIDTH)
    }

    fn compare_equal(&self, lhs: &dyn Object, rhs: &dyn Object) -> bool {
        match (lhs.downcast_ref::<T>(), rhs.downcast_ref::<T>()) {
            (Some(lhs), Some(rhs)) => lhs.approx_eq(*rhs),
            _ => false,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
