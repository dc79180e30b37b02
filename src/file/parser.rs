//! Cursor-based byte stream reader for CIL method bodies.
//!
//! This module provides the [`crate::file::parser::Parser`] type, the sequential and
//! bounds-checked reader the instruction decoder walks the IL buffer with. The parser never
//! copies the buffer and never moves backwards; it only tracks the current position.
//!
//! # Key Operations
//! - [`crate::file::parser::Parser::read_le`] - Read a fixed-width little-endian primitive
//! - [`crate::file::parser::Parser::pos`] - Current position (offset of the next unread byte)
//! - [`crate::file::parser::Parser::has_more_data`] - Whether any byte remains
//! - [`crate::file::parser::Parser::remaining`] - Number of unread bytes
//!
//! # Branch Arithmetic
//!
//! CIL branch deltas are relative to the position *after* the operand has been consumed. The
//! decoder therefore always samples [`crate::file::parser::Parser::pos`] right after reading the
//! delta, never the start of the instruction.
//!
//! # Examples
//!
//! ```rust
//! use ilscope::Parser;
//!
//! let data = [0x2B, 0xFE]; // br.s -2
//! let mut parser = Parser::new(&data);
//!
//! let opcode = parser.read_le::<u8>()?;
//! let delta = parser.read_le::<i8>()?;
//! assert_eq!(opcode, 0x2B);
//! assert_eq!(parser.pos() as i64 + i64::from(delta), 0);
//! # Ok::<(), ilscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    Result,
};

/// A sequential reader over an immutable CIL byte buffer.
///
/// `Parser` maintains an internal cursor and validates every read against the buffer length,
/// failing with [`crate::Error::TruncatedInstructionStream`] instead of reading past the end.
///
/// # Examples
///
/// ```rust
/// use ilscope::Parser;
///
/// let data = [0x20, 0x2A, 0x00, 0x00, 0x00]; // ldc.i4 42
/// let mut parser = Parser::new(&data);
///
/// assert_eq!(parser.read_le::<u8>()?, 0x20);
/// assert_eq!(parser.read_le::<i32>()?, 42);
/// assert!(!parser.has_more_data());
/// # Ok::<(), ilscope::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ilscope::Parser;
    /// let data = [0x00];
    /// let mut parser = Parser::new(&data);
    /// assert!(parser.has_more_data());
    ///
    /// let _byte = parser.read_le::<u8>()?;
    /// assert!(!parser.has_more_data());
    /// # Ok::<(), ilscope::Error>(())
    /// ```
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes left between the current position and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check that at least `needed` bytes remain, without consuming anything.
    ///
    /// Used before allocating for variable-length operands (switch tables) so that a bogus
    /// case count fails fast instead of reserving a huge vector.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInstructionStream`] if fewer bytes remain.
    pub fn ensure_remaining(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(truncated_error!(self.position, needed));
        }
        Ok(())
    }

    /// Read a type `T` from the current position in little-endian format and advance the
    /// position.
    ///
    /// # Errors
    /// Returns [`crate::Error::TruncatedInstructionStream`] if reading would exceed the data
    /// length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ilscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let mut parser = Parser::new(&data);
    ///
    /// let value: u16 = parser.read_le()?;
    /// assert_eq!(value, 0x0201);
    /// assert_eq!(parser.pos(), 2);
    /// # Ok::<(), ilscope::Error>(())
    /// ```
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }
}
