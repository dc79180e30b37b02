//! CIL method body decoding.
//!
//! A single forward pass turns the raw IL byte stream into an arena of [`Instruction`]s. Every
//! operand is resolved while decoding: literals are read, local and argument slots are matched
//! against the [`MethodContext`], metadata tokens go through the context's
//! [`crate::metadata::resolver::TokenResolver`] and branch deltas become absolute offsets.
//! Branches to instructions that are not decoded yet are recorded and patched by the linker once
//! the pass is complete.
//!
//! # Example: Decoding a Method Body
//!
//! ```rust
//! use ilscope::{decode_method_body, MethodContext, TableResolver};
//!
//! let resolver = TableResolver::new();
//! let context = MethodContext::new(&resolver).with_static(true);
//!
//! // ldc.i4.1; brtrue.s +1; nop; ret
//! let il = [0x17, 0x2D, 0x01, 0x00, 0x2A];
//! let sequence = decode_method_body(&il, &context)?;
//!
//! assert_eq!(sequence.len(), 4);
//! assert_eq!(sequence.branch_target(1).unwrap().mnemonic(), "ret");
//! # Ok::<(), ilscope::Error>(())
//! ```

use log::{debug, trace};

use crate::{
    disassembler::{
        instructions::{lookup, FE_PREFIX},
        linker, BranchTarget, Instruction, InstructionSequence, OpCode, Operand, OperandType,
        ParameterRef, SwitchTable,
    },
    file::parser::Parser,
    metadata::{
        context::MethodContext, references::ResolvedMember, resolver::ResolveResult,
        token::Token,
    },
    Error, Result,
};

/// A stateful decoder instance for a single method body.
///
/// Owns the byte cursor, the growing instruction arena and the list of arena indices whose
/// branch targets still have to be linked.
struct Decoder<'a, 'c> {
    parser: Parser<'a>,
    context: &'c MethodContext<'c>,
    instructions: Vec<Instruction>,
    pending: Vec<usize>,
}

impl<'a, 'c> Decoder<'a, 'c> {
    /// Create a new stateful Decoder
    ///
    /// ## Arguments
    /// * 'il'      - The raw method body (code bytes only, no header)
    /// * 'context' - The method the body belongs to
    fn new(il: &'a [u8], context: &'c MethodContext<'c>) -> Self {
        Decoder {
            parser: Parser::new(il),
            context,
            instructions: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Decode the complete body, link all pending targets and hand out the sequence
    fn decode(mut self) -> Result<InstructionSequence> {
        while self.parser.has_more_data() {
            self.decode_instruction()?;
        }

        linker::link(&mut self.instructions, &self.pending)?;

        debug!(
            "Decoded {} instruction(s) from {} byte(s), {} deferred target(s)",
            self.instructions.len(),
            self.parser.len(),
            self.pending.len()
        );

        Ok(InstructionSequence::new(
            self.instructions,
            self.parser.len(),
        ))
    }

    /// Decode the instruction at the current position and append it to the arena
    fn decode_instruction(&mut self) -> Result<()> {
        let offset = self.parser.pos();
        let opcode = self.read_opcode()?;
        let operand = self.decode_operand(opcode, offset)?;

        let index = self.instructions.len();
        let previous = self.instructions.last_mut().map(|previous| {
            previous.next = Some(index);
            previous.index
        });

        self.instructions.push(Instruction {
            index,
            offset,
            size: self.parser.pos() - offset,
            opcode: *opcode,
            operand,
            previous,
            next: None,
        });

        Ok(())
    }

    /// Read one or two opcode bytes and look up the table row
    fn read_opcode(&mut self) -> Result<&'static OpCode> {
        let first_byte = self.parser.read_le::<u8>()?;
        if first_byte == FE_PREFIX {
            let second_byte = self.parser.read_le::<u8>()?;
            lookup(FE_PREFIX, second_byte)
        } else {
            lookup(0x00, first_byte)
        }
    }

    /// Decode the operand of `opcode`, which started at `offset`
    fn decode_operand(&mut self, opcode: &OpCode, offset: usize) -> Result<Operand> {
        let operand = match opcode.operand_type {
            OperandType::None => self.implicit_operand(opcode)?,
            OperandType::InlineVar => {
                let slot = self.parser.read_le::<u16>()?;
                self.slot_operand(opcode, slot)?
            }
            OperandType::ShortInlineVar => {
                let slot = u16::from(self.parser.read_le::<u8>()?);
                self.slot_operand(opcode, slot)?
            }
            OperandType::InlineI => Operand::Int32(self.parser.read_le::<i32>()?),
            OperandType::InlineI8 => Operand::Int64(self.parser.read_le::<i64>()?),
            OperandType::InlineR => Operand::Float64(self.parser.read_le::<f64>()?),
            OperandType::ShortInlineR => Operand::Float32(self.parser.read_le::<f32>()?),
            OperandType::ShortInlineI => {
                if opcode.has_signed_short_literal() {
                    Operand::Int32(i32::from(self.parser.read_le::<i8>()?))
                } else {
                    Operand::Int32(i32::from(self.parser.read_le::<u8>()?))
                }
            }
            OperandType::InlineString => {
                let token = self.read_token()?;
                Operand::String(resolved(token, self.context.resolver.resolve_string(token))?)
            }
            OperandType::InlineSig => {
                let token = self.read_token()?;
                Operand::Signature(resolved(
                    token,
                    self.context.resolver.resolve_signature(token),
                )?)
            }
            OperandType::InlineField => {
                let token = self.read_token()?;
                let field = self.context.resolver.resolve_field(
                    token,
                    &self.context.declaring_type_generic_args,
                    &self.context.method_generic_args,
                );
                Operand::Field(resolved(token, field)?)
            }
            OperandType::InlineMethod => {
                let token = self.read_token()?;
                let method = self.context.resolver.resolve_method(
                    token,
                    &self.context.declaring_type_generic_args,
                    &self.context.method_generic_args,
                );
                Operand::Method(resolved(token, method)?)
            }
            OperandType::InlineType => {
                let token = self.read_token()?;
                let ty = self.context.resolver.resolve_type(
                    token,
                    &self.context.declaring_type_generic_args,
                    &self.context.method_generic_args,
                );
                Operand::Type(resolved(token, ty)?)
            }
            OperandType::InlineTok => {
                let token = self.read_token()?;
                let member = self.context.resolver.resolve_member(
                    token,
                    &self.context.declaring_type_generic_args,
                    &self.context.method_generic_args,
                );
                match resolved(token, member)? {
                    ResolvedMember::Field(field) => Operand::Field(field),
                    ResolvedMember::Method(method) => Operand::Method(method),
                    ResolvedMember::Type(ty) => Operand::Type(ty),
                    ResolvedMember::Other(member) => Operand::Member(member),
                }
            }
            OperandType::InlineBrTarget => {
                let delta = i64::from(self.parser.read_le::<i32>()?);
                self.branch_operand(offset, delta)?
            }
            OperandType::ShortInlineBrTarget => {
                let delta = i64::from(self.parser.read_le::<i8>()?);
                self.branch_operand(offset, delta)?
            }
            OperandType::InlineSwitch => self.switch_operand()?,
        };

        Ok(operand)
    }

    /// The implicit operand of the compact `ldarg.N`, `ldloc.N` and `stloc.N` forms
    fn implicit_operand(&self, opcode: &OpCode) -> Result<Operand> {
        match opcode.code() {
            code @ 0x02..=0x05 => self.argument_operand(code - 0x02),
            code @ 0x06..=0x09 => self.local_operand(code - 0x06),
            code @ 0x0A..=0x0D => self.local_operand(code - 0x0A),
            _ => Ok(Operand::None),
        }
    }

    /// The operand of an explicit slot (`InlineVar` / `ShortInlineVar`)
    fn slot_operand(&self, opcode: &OpCode, slot: u16) -> Result<Operand> {
        if opcode.is_local_access() {
            self.local_operand(slot)
        } else {
            self.argument_operand(slot)
        }
    }

    /// Map a raw argument slot to `this` or a declared parameter
    fn argument_operand(&self, slot: u16) -> Result<Operand> {
        if !self.context.is_static && slot == 0 {
            return Ok(Operand::This);
        }

        match self.context.parameter_for_slot(slot) {
            Some(parameter) => Ok(Operand::Parameter(ParameterRef {
                slot,
                parameter: parameter.clone(),
            })),
            None => Err(Error::UnresolvedParameterSlot(slot)),
        }
    }

    fn local_operand(&self, slot: u16) -> Result<Operand> {
        match self.context.local(slot) {
            Some(local) => Ok(Operand::Local(local.clone())),
            None => Err(Error::UnresolvedLocalSlot(slot)),
        }
    }

    fn read_token(&mut self) -> Result<Token> {
        Ok(Token::new(self.parser.read_le::<u32>()?))
    }

    /// Resolve a branch delta; backward targets link immediately, all others are deferred
    fn branch_operand(&mut self, offset: usize, delta: i64) -> Result<Operand> {
        let target = linker::target_offset(self.parser.pos(), delta)?;

        if target < offset {
            let index = linker::find(&self.instructions, target)?;
            return Ok(Operand::Branch(BranchTarget {
                offset: target,
                index,
            }));
        }

        trace!("IL_{offset:04x}: deferring branch target IL_{target:04x}");
        self.pending.push(self.instructions.len());
        Ok(Operand::Branch(BranchTarget::unresolved(target)))
    }

    /// Read a `switch` jump table; its targets are always deferred
    fn switch_operand(&mut self) -> Result<Operand> {
        let count = self.parser.read_le::<u32>()?;
        let table_size = usize::try_from(u64::from(count) * 4).unwrap_or(usize::MAX);
        self.parser.ensure_remaining(table_size)?;

        let base = self.parser.pos() + table_size;
        let mut offsets = Vec::with_capacity(table_size / 4);
        for _ in 0..count {
            let delta = i64::from(self.parser.read_le::<i32>()?);
            offsets.push(linker::target_offset(base, delta)?);
        }

        trace!("deferring {count} switch target(s) {offsets:?}");
        self.pending.push(self.instructions.len());
        Ok(Operand::Switch(SwitchTable {
            offsets,
            indices: Vec::new(),
        }))
    }
}

/// Wrap a resolver failure into [`Error::UnresolvableToken`]
fn resolved<T>(token: Token, result: ResolveResult<T>) -> Result<T> {
    result.map_err(|source| Error::UnresolvableToken { token, source })
}

/// Decode a complete CIL method body into a fully linked [`InstructionSequence`].
///
/// `il` holds the code bytes of the body only; the method header and any exception handling
/// sections are not part of it. `context` describes the method the body belongs to and supplies
/// the token resolver.
///
/// Decoding is all-or-nothing: on success every branch and switch target is linked, on failure
/// no partial sequence is returned.
///
/// # Arguments
/// * `il` - The raw IL byte stream
/// * `context` - Parameters, locals, generic arguments and resolver of the method
///
/// # Errors
/// - [`Error::TruncatedInstructionStream`] if an opcode or operand runs past the end of `il`
/// - [`Error::UnsupportedOpcode`] for opcode bytes that select an unused table row
/// - [`Error::UnresolvableToken`] if the resolver fails for a token
/// - [`Error::UnresolvedBranchTarget`] if a branch or switch target does not start an instruction
/// - [`Error::UnresolvedLocalSlot`] / [`Error::UnresolvedParameterSlot`] for undeclared slots
///
/// # Examples
///
/// ```rust
/// use ilscope::{decode_method_body, MethodContext, TableResolver};
///
/// let resolver = TableResolver::new();
/// let context = MethodContext::new(&resolver);
///
/// // ldarg.0 (this); ret
/// let sequence = decode_method_body(&[0x02, 0x2A], &context)?;
/// assert_eq!(sequence.len(), 2);
/// assert_eq!(sequence.code_size(), 2);
/// # Ok::<(), ilscope::Error>(())
/// ```
pub fn decode_method_body(il: &[u8], context: &MethodContext<'_>) -> Result<InstructionSequence> {
    Decoder::new(il, context).decode()
}
