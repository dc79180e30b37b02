use thiserror::Error;

use crate::metadata::{resolver::ResolveError, token::Token};

macro_rules! truncated_error {
    // Read of `$needed` bytes starting at `$offset`
    ($offset:expr, $needed:expr) => {
        crate::Error::TruncatedInstructionStream {
            offset: $offset,
            needed: $needed,
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every variant is terminal for the decode call that produced it: there is no retry and no
/// partially decoded sequence is ever handed out. A successfully returned
/// [`crate::disassembler::InstructionSequence`] is therefore always fully linked.
///
/// # Error Categories
///
/// ## Stream Errors
/// - [`Error::TruncatedInstructionStream`] - A fixed-width read ran past the end of the buffer
/// - [`Error::UnsupportedOpcode`] - The opcode byte(s) select an unused table row
/// - [`Error::UnsupportedOperandType`] - An operand shape the decoder has no case for
///
/// ## Resolution Errors
/// - [`Error::UnresolvableToken`] - The token resolver rejected a metadata token
/// - [`Error::UnresolvedBranchTarget`] - A branch lands outside or inside an instruction
/// - [`Error::UnresolvedLocalSlot`] - A local slot beyond the declared locals
/// - [`Error::UnresolvedParameterSlot`] - An argument slot beyond the declared parameters
///
/// # Examples
///
/// ```rust
/// use ilscope::{decode_method_body, Error, MethodContext, TableResolver};
///
/// let resolver = TableResolver::new();
/// let context = MethodContext::new(&resolver);
///
/// // ldc.i4 with only three of its four operand bytes
/// match decode_method_body(&[0x20, 0x01, 0x02, 0x03], &context) {
///     Err(Error::TruncatedInstructionStream { offset, needed }) => {
///         assert_eq!((offset, needed), (1, 4));
///     }
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A fixed-width read would exceed the end of the instruction stream.
    ///
    /// The method body ends in the middle of an opcode or of an operand. This is reported
    /// instead of returning a silently shortened sequence.
    #[error("Truncated instruction stream - {needed} byte(s) required at offset {offset}")]
    TruncatedInstructionStream {
        /// Position at which the read was attempted
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
    },

    /// The opcode selects a table row that is not assigned to any instruction.
    ///
    /// For single-byte opcodes `prefix` is `0`; for the two-byte space it is `0xFE`.
    #[error("Unsupported opcode {prefix:02X} {opcode:02X}")]
    UnsupportedOpcode {
        /// Escape byte (`0xFE`) or `0` for the single-byte space
        prefix: u8,
        /// The opcode byte that was looked up
        opcode: u8,
    },

    /// An operand type has no decoding case.
    ///
    /// The operand type set is closed, so this only surfaces if the opcode table and the
    /// decoder ever disagree.
    #[error("Unsupported operand type for '{0}'")]
    UnsupportedOperandType(&'static str),

    /// The token resolver failed for a metadata token.
    ///
    /// The resolver's own failure is preserved unchanged as the error source.
    #[error("Failed to resolve token {token}")]
    UnresolvableToken {
        /// The token that was handed to the resolver
        token: Token,
        /// The resolver's failure
        #[source]
        source: ResolveError,
    },

    /// A branch or switch target does not start an instruction.
    ///
    /// The target either lies outside the method body or lands between two instruction
    /// boundaries. The value is the computed absolute target offset.
    #[error("Branch target {0} does not start an instruction")]
    UnresolvedBranchTarget(i64),

    /// A local variable slot exceeds the number of declared locals.
    #[error("Local variable slot {0} is not declared")]
    UnresolvedLocalSlot(u16),

    /// An argument slot exceeds the number of declared parameters.
    ///
    /// The value is the raw IL slot, i.e. including the implicit `this` of instance methods.
    #[error("Parameter slot {0} is not declared")]
    UnresolvedParameterSlot(u16),
}
