//! CIL method body decoding.
//!
//! This module turns a raw method body into a fully linked [`InstructionSequence`]: every
//! operand is resolved against the method's [`crate::metadata::context::MethodContext`] and
//! every branch and switch target is linked to the instruction it lands on.
//!
//! # Key Types
//! - [`Instruction`] - A decoded instruction with its resolved operand
//! - [`Operand`] - Resolved operand payloads (literals, slots, references, targets)
//! - [`OpCode`] / [`OperandType`] / [`FlowType`] - Static opcode metadata
//! - [`InstructionSequence`] - The decoded, linked result
//! - [`InstructionFormatter`] / [`TextFormatter`] - Text rendering
//!
//! # Main Functions
//! - [`decode_method_body`] - Decode a single method body
//! - [`decode_method_bodies`] - Decode many bodies in parallel
//! - [`lookup`] - Look up an opcode table row
//!
//! # Example
//! ```rust
//! use ilscope::{decode_method_body, MethodContext, TableResolver};
//!
//! let resolver = TableResolver::new();
//! let context = MethodContext::new(&resolver);
//!
//! let sequence = decode_method_body(&[0x00, 0x2A], &context)?; // nop, ret
//! for instruction in &sequence {
//!     println!("{}", instruction.mnemonic());
//! }
//! # Ok::<(), ilscope::Error>(())
//! ```

mod batch;
mod decoder;
mod formatter;
mod instruction;
mod instructions;
mod linker;
mod search;
mod sequence;

pub use batch::{decode_method_bodies, MethodBodyInput};
pub use decoder::decode_method_body;
pub use formatter::{FormatOptions, InstructionFormatter, TextFormatter};
pub use instruction::{
    BranchTarget, FlowType, Instruction, OpCode, Operand, OperandType, ParameterRef, SwitchTable,
};
pub use instructions::{lookup, FE_PREFIX, INSTRUCTIONS, INSTRUCTIONS_FE};
pub use sequence::InstructionSequence;
