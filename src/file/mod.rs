//! Low-level access to the raw bytes of a CIL method body.
//!
//! - [`crate::file::io`] - Little-endian primitive reads with bounds checking
//! - [`crate::file::parser`] - The sequential [`crate::file::parser::Parser`] cursor

pub mod io;
pub mod parser;
