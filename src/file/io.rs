//! Little-endian, bounds-checked reading of primitive values from CIL byte streams.
//!
//! The CIL instruction stream stores every fixed-width operand in little-endian order. This
//! module provides the [`crate::file::io::CilIO`] trait, which abstracts the conversion from a
//! fixed-size byte array into a primitive value, and [`crate::file::io::read_le_at`], the single
//! bounds-checked read primitive the [`crate::file::parser::Parser`] is built on.
//!
//! # Supported Types
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`
//!
//! # Error Handling
//!
//! A read that would exceed the buffer returns
//! [`crate::Error::TruncatedInstructionStream`] carrying the attempted offset and the width of
//! the read. The offset is left untouched on failure.
//!
//! # Thread Safety
//!
//! All functions are pure; the only mutated state is the caller-owned offset.

use crate::Result;

/// Trait for primitive types that can be decoded from a fixed-size little-endian byte array.
///
/// Each implementation names the `Bytes` array matching its width (e.g. `[u8; 4]` for `u32`),
/// which lets [`read_le_at`] slice exactly `size_of::<T>()` bytes and convert them without any
/// unsafe code.
pub trait CilIO: Sized {
    /// Byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_cil_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// On success the offset is advanced by the width of `T`.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::TruncatedInstructionStream`] if fewer than `size_of::<T>()` bytes
/// remain at `offset`.
///
/// # Examples
///
/// ```rust,ignore
/// use ilscope::file::io::read_le_at;
///
/// let data = [0x01, 0x00, 0x02, 0x00];
/// let mut offset = 0;
///
/// let first: u16 = read_le_at(&data, &mut offset)?;
/// assert_eq!(first, 1);
/// assert_eq!(offset, 2);
/// # Ok::<(), ilscope::Error>(())
/// ```
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let end = match offset.checked_add(type_len) {
        Some(end) if end <= data.len() => end,
        _ => return Err(truncated_error!(*offset, type_len)),
    };

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(truncated_error!(*offset, type_len));
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}
