//! CIL instruction representation, operand shapes and opcode metadata.
//!
//! This module defines the types a decoded method body is made of. The central
//! [`crate::disassembler::Instruction`] aggregates location, opcode and the fully resolved
//! [`crate::disassembler::Operand`]; neighbour and branch links are arena indices into the owning
//! [`crate::disassembler::InstructionSequence`].
//!
//! # Key Components
//!
//! - [`crate::disassembler::OperandType`] - The closed set of operand encodings
//! - [`crate::disassembler::FlowType`] - Control flow classification of each opcode
//! - [`crate::disassembler::OpCode`] - One row of the static opcode tables
//! - [`crate::disassembler::Operand`] - The resolved operand payload
//! - [`crate::disassembler::Instruction`] - A decoded, linked instruction

use std::fmt;

use strum::{EnumCount, EnumIter};

use crate::metadata::{
    context::{LocalVariable, Parameter},
    references::{FieldRefRc, MemberRefRc, MethodRefRc, TypeRefRc},
    token::Token,
};

/// Encodings of CIL instruction operands.
///
/// The names follow the operand type column of ECMA-335 Partition III. Every opcode table row
/// carries exactly one of these.
///
/// # Examples
///
/// ```rust
/// use ilscope::disassembler::OperandType;
///
/// assert_eq!(OperandType::ShortInlineBrTarget.size(), Some(1));
/// assert_eq!(OperandType::InlineTok.size(), Some(4));
/// assert_eq!(OperandType::InlineSwitch.size(), None); // 4 + 4 * count
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum OperandType {
    /// No operand
    None,
    /// 4-byte signed integer
    InlineI,
    /// 8-byte signed integer
    InlineI8,
    /// 8-byte float
    InlineR,
    /// 4-byte float
    ShortInlineR,
    /// 1-byte integer, signed for `ldc.i4.s` and unsigned otherwise
    ShortInlineI,
    /// 2-byte unsigned local or argument slot
    InlineVar,
    /// 1-byte unsigned local or argument slot
    ShortInlineVar,
    /// 4-byte signed branch delta
    InlineBrTarget,
    /// 1-byte signed branch delta
    ShortInlineBrTarget,
    /// Field token
    InlineField,
    /// Method token
    InlineMethod,
    /// Type token
    InlineType,
    /// Field, method or type token (`ldtoken`)
    InlineTok,
    /// Stand-alone signature token
    InlineSig,
    /// User-string token
    InlineString,
    /// 4-byte case count followed by that many 4-byte signed deltas
    InlineSwitch,
}

impl OperandType {
    /// Width of the operand in bytes, or `None` for the variable-length switch table.
    #[must_use]
    pub const fn size(&self) -> Option<usize> {
        match self {
            OperandType::None => Some(0),
            OperandType::ShortInlineI
            | OperandType::ShortInlineVar
            | OperandType::ShortInlineBrTarget => Some(1),
            OperandType::InlineVar => Some(2),
            OperandType::InlineI
            | OperandType::ShortInlineR
            | OperandType::InlineBrTarget
            | OperandType::InlineField
            | OperandType::InlineMethod
            | OperandType::InlineType
            | OperandType::InlineTok
            | OperandType::InlineSig
            | OperandType::InlineString => Some(4),
            OperandType::InlineI8 | OperandType::InlineR => Some(8),
            OperandType::InlineSwitch => None,
        }
    }
}

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowType {
    /// Normal execution continues to next instruction
    Sequential,
    /// Conditional branch to another location
    ConditionalBranch,
    /// Always branches to another location (unconditional jump)
    UnconditionalBranch,
    /// Call to another method
    Call,
    /// Returns from current method
    Return,
    /// Multi-way branch (switch statement)
    Switch,
    /// Exception throwing
    Throw,
    /// End of finally or filter block
    EndFinally,
    /// Leave protected region (try/catch/finally)
    Leave,
    /// Prefix modifying the following instruction
    Meta,
}

/// One row of the static opcode tables.
///
/// Rows that no instruction occupies have an empty mnemonic; [`OpCode::is_unused`] reports them
/// and the decoder refuses to decode them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpCode {
    /// Instruction mnemonic, e.g. `ldloc.s`
    pub mnemonic: &'static str,
    /// Operand encoding
    pub operand_type: OperandType,
    /// Control flow behaviour
    pub flow: FlowType,
    /// Escape byte (`0xFE`) for two-byte opcodes, `0` otherwise
    pub prefix: u8,
    /// The opcode byte (second byte for two-byte opcodes)
    pub value: u8,
}

impl OpCode {
    /// Placeholder for table rows no instruction occupies.
    pub const UNUSED: OpCode = OpCode {
        mnemonic: "",
        operand_type: OperandType::None,
        flow: FlowType::Sequential,
        prefix: 0,
        value: 0,
    };

    /// `true` for table rows that do not encode an instruction.
    #[must_use]
    pub const fn is_unused(&self) -> bool {
        self.mnemonic.is_empty()
    }

    /// The full numeric opcode, e.g. `0x2A` for `ret` or `0xFE01` for `ceq`.
    #[must_use]
    pub const fn code(&self) -> u16 {
        ((self.prefix as u16) << 8) | self.value as u16
    }

    /// Number of bytes the opcode itself occupies (1 or 2).
    #[must_use]
    pub const fn size(&self) -> usize {
        if self.prefix == 0 {
            1
        } else {
            2
        }
    }

    /// `true` for the opcodes whose slot operand addresses a local variable.
    ///
    /// `ldloc.s`, `ldloca.s`, `stloc.s` and their 2-byte-slot forms `ldloc`, `ldloca`, `stloc`.
    #[must_use]
    pub const fn is_local_access(&self) -> bool {
        matches!(self.code(), 0x11..=0x13 | 0xFE0C..=0xFE0E)
    }

    /// `true` for the opcode whose 1-byte literal is signed (`ldc.i4.s`).
    #[must_use]
    pub const fn has_signed_short_literal(&self) -> bool {
        self.code() == 0x1F
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic)
    }
}

/// The single successor of a branch instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchTarget {
    /// Absolute byte offset of the target within the method body
    pub offset: usize,
    /// Sequence index of the instruction starting at `offset`
    pub index: usize,
}

impl BranchTarget {
    /// A target whose instruction index is filled in by the linker.
    pub(crate) fn unresolved(offset: usize) -> Self {
        BranchTarget {
            offset,
            index: usize::MAX,
        }
    }
}

/// The jump table of a `switch` instruction.
///
/// `offsets[i]` and `indices[i]` describe case `i`; both vectors have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTable {
    /// Absolute byte offset of every case target
    pub offsets: Vec<usize>,
    /// Sequence index of the instruction starting at each case offset
    pub indices: Vec<usize>,
}

impl SwitchTable {
    /// Number of cases in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// `true` for a `switch` without cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// An argument reference other than `this`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRef {
    /// Raw IL argument slot (includes the `this` shift of instance methods)
    pub slot: u16,
    /// The declared parameter the slot addresses
    pub parameter: Parameter,
}

/// A fully resolved instruction operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand present
    None,
    /// 4-byte (or widened 1-byte) integer literal
    Int32(i32),
    /// 8-byte integer literal
    Int64(i64),
    /// 4-byte float literal
    Float32(f32),
    /// 8-byte float literal
    Float64(f64),
    /// Resolved user string (`ldstr`)
    String(String),
    /// The implicit `this` argument of an instance method
    This,
    /// A declared parameter
    Parameter(ParameterRef),
    /// A declared local variable
    Local(LocalVariable),
    /// A resolved field
    Field(FieldRefRc),
    /// A resolved method
    Method(MethodRefRc),
    /// A resolved type
    Type(TypeRefRc),
    /// A resolved stand-alone signature blob (`calli`)
    Signature(Vec<u8>),
    /// An `ldtoken` member that is neither field, method nor type
    Member(MemberRefRc),
    /// Single branch successor
    Branch(BranchTarget),
    /// Multi-way jump table
    Switch(SwitchTable),
}

impl Operand {
    /// The metadata token behind a resolved reference operand, if any.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match self {
            Operand::Field(field) => Some(field.token),
            Operand::Method(method) => Some(method.token),
            Operand::Type(ty) => Some(ty.token),
            Operand::Member(member) => Some(member.token),
            _ => None,
        }
    }
}

/// A decoded CIL instruction, linked into its [`crate::disassembler::InstructionSequence`].
///
/// All links (`previous`, `next` and branch targets inside the operand) are sequence indices,
/// so an instruction never borrows or owns its neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Position within the sequence (0-based)
    pub index: usize,
    /// Byte offset of the first opcode byte within the method body
    pub offset: usize,
    /// Number of bytes consumed (opcode plus operand)
    pub size: usize,
    /// Decoded opcode
    pub opcode: OpCode,
    /// Resolved operand
    pub operand: Operand,
    /// Index of the preceding instruction
    pub previous: Option<usize>,
    /// Index of the following instruction
    pub next: Option<usize>,
}

impl Instruction {
    /// Instruction mnemonic, e.g. `br.s`.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.opcode.mnemonic
    }

    /// Control flow behaviour of the opcode.
    #[must_use]
    pub fn flow_type(&self) -> FlowType {
        self.opcode.flow
    }

    /// Byte offset just past this instruction.
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.offset + self.size
    }

    /// `true` for instructions carrying a branch or switch operand.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        matches!(self.operand, Operand::Branch(_) | Operand::Switch(_))
    }

    /// Sequence indices of every branch target of this instruction, in operand order.
    #[must_use]
    pub fn target_indices(&self) -> Vec<usize> {
        match &self.operand {
            Operand::Branch(target) => vec![target.index],
            Operand::Switch(table) => table.indices.clone(),
            _ => Vec::new(),
        }
    }
}
