// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! # ilscope
//!
//! A fast, safe decoder for CIL (Common Intermediate Language) method bodies. `ilscope` turns the
//! raw IL byte stream of a .NET method into a fully linked sequence of typed instructions:
//! operands are resolved to literals, locals, parameters or metadata references, and every branch
//! and switch target points at the instruction it lands on.
//!
//! ## Features
//!
//! - **Complete opcode coverage** - The single-byte and `0xFE`-prefixed opcode spaces of ECMA-335
//! - **Resolved operands** - Metadata tokens are resolved through a pluggable [`TokenResolver`]
//! - **Linked output** - Neighbour and branch links as indices into an owned arena
//! - **All-or-nothing** - Malformed input fails with a typed [`Error`], never a partial result
//! - **Parallel batches** - Independent bodies decode concurrently via `rayon`
//!
//! ## Quick Start
//!
//! ```rust
//! use ilscope::prelude::*;
//!
//! let object = TypeRef::new(Token(0x0100_0001), "System", "Object");
//! let resolver = TableResolver::new().with_type(object.clone());
//! let context = MethodContext::new(&resolver)
//!     .with_static(true)
//!     .with_local(LocalVariable::new(0, object, false));
//!
//! // ldnull; stloc.0; ldloc.0; brfalse.s +0; ret
//! let il = [0x14, 0x0A, 0x06, 0x2C, 0x00, 0x2A];
//! let sequence = decode_method_body(&il, &context)?;
//!
//! assert_eq!(sequence.len(), 5);
//! assert_eq!(sequence.branch_target(3).unwrap().mnemonic(), "ret");
//! print!("{sequence}");
//! # Ok::<(), ilscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - A bounds-checked little-endian byte cursor ([`Parser`])
//! - [`metadata`]: tokens, reference types, the resolver boundary and the method context
//! - [`disassembler`]: opcode tables, decoder, branch linker, the resulting
//!   [`disassembler::InstructionSequence`] and its search and formatting helpers
//!
//! ## Logging
//!
//! `ilscope` logs through the [`log`](https://docs.rs/log) facade: a summary of every decoded body
//! at `debug`, deferred branch targets at `trace` and batch failures at `warn`. No logger is
//! installed by the library.

#![doc(html_no_source)]
#![deny(missing_docs)]

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use ilscope::prelude::*;
///
/// let resolver = TableResolver::new();
/// let context = MethodContext::new(&resolver);
/// let sequence = decode_method_body(&[0x2A], &context)?;
/// assert_eq!(sequence[0].flow_type(), FlowType::Return);
/// # Ok::<(), ilscope::Error>(())
/// ```
pub mod prelude;

/// CIL instruction decoding based on ECMA-335
///
/// - **Opcode tables**: The static single-byte and two-byte opcode spaces
/// - **Decoding**: Turning a method body into typed instructions with resolved operands
/// - **Linking**: Resolving branch and switch targets to instruction indices
/// - **Inspection**: Reference membership queries and text rendering
///
/// # Main Functions
///
/// - [`disassembler::decode_method_body`] - Decode a single method body
/// - [`disassembler::decode_method_bodies`] - Decode many bodies in parallel
pub mod disassembler;

/// Metadata facing types: tokens, resolved references, resolvers and method context
///
/// The decoder does not read metadata tables itself. Everything it needs to know about the
/// method (parameters, locals, generic arguments) comes from a
/// [`metadata::context::MethodContext`], and tokens are resolved through a
/// [`metadata::resolver::TokenResolver`].
pub mod metadata;

/// `ilscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `ilscope` Error type
///
/// The error type for all decoding operations. Every variant is terminal for the call that
/// produced it.
pub use error::Error;

/// Low-level byte cursor over a method body.
pub use file::parser::Parser;

/// Decode a single method body.
pub use disassembler::decode_method_body;

/// Decode many method bodies in parallel.
pub use disassembler::{decode_method_bodies, MethodBodyInput};

/// The decoded, linked instruction sequence.
pub use disassembler::InstructionSequence;

/// Method description handed to the decoder.
pub use metadata::context::{LocalVariable, MethodContext, Parameter};

/// Token resolution.
pub use metadata::resolver::{ResolveError, TableResolver, TokenResolver};

/// Resolved metadata references.
pub use metadata::references::{FieldRef, MemberRef, MethodRef, ResolvedMember, TypeRef};

/// Metadata token.
pub use metadata::token::Token;
