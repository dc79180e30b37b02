//! # ilscope Prelude
//!
//! The most commonly used types and functions of the ilscope library. Import this module to get
//! quick access to everything needed to decode and inspect a method body.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ilscope operations
pub use crate::Error;

/// The result type used throughout ilscope
pub use crate::Result;

/// Low-level byte cursor
pub use crate::Parser;

// ================================================================================================
// Decoding
// ================================================================================================

/// Decoding entry points
pub use crate::disassembler::{decode_method_bodies, decode_method_body, MethodBodyInput};

/// Decoded instructions and operands
pub use crate::disassembler::{
    BranchTarget, FlowType, Instruction, InstructionSequence, OpCode, Operand, OperandType,
    ParameterRef, SwitchTable,
};

/// Text rendering
pub use crate::disassembler::{FormatOptions, InstructionFormatter, TextFormatter};

// ================================================================================================
// Metadata
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::{Token, TokenKind};

/// Resolved references
pub use crate::metadata::references::{
    FieldRef, FieldRefRc, MemberRef, MemberRefRc, MethodRef, MethodRefRc, ResolvedMember, TypeRef,
    TypeRefRc,
};

/// Token resolution
pub use crate::metadata::resolver::{ResolveError, ResolveResult, TableResolver, TokenResolver};

/// Method context
pub use crate::metadata::context::{LocalVariable, MethodContext, Parameter};
