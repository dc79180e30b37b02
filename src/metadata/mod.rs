//! Method-level metadata the decoder consumes.
//!
//! The decoder does not load assemblies. Everything it needs about the surrounding metadata is
//! provided by the caller:
//!
//! - [`crate::metadata::token`] - Metadata tokens found in instruction operands
//! - [`crate::metadata::references`] - Resolved field, method, type and member references
//! - [`crate::metadata::resolver`] - The token resolver capability and a table-backed resolver
//! - [`crate::metadata::context`] - The per-method snapshot (parameters, locals, generics)

pub mod context;
pub mod references;
pub mod resolver;
/// Commonly used metadata token type
pub mod token;
