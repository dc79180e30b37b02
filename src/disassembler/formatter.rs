//! Text rendering of decoded instructions.
//!
//! [`InstructionFormatter`] is the extension point: implementations write one instruction at a
//! time and have the whole [`InstructionSequence`] at hand to follow branch links.
//! [`TextFormatter`] produces ildasm-like listings:
//!
//! ```text
//! IL_0000: [0] ldc.i4.1
//! IL_0001: [1] brtrue.s     IL_0004 (-> #3)
//! IL_0003: [2] nop
//! IL_0004: [3] ret
//! ```

use std::fmt::{self, Write};

use crate::disassembler::{Instruction, InstructionSequence, Operand};

/// Options controlling [`TextFormatter`] output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Prefix every line with its `IL_xxxx:` offset label
    pub offsets: bool,
    /// Show sequence indices, both of the instruction and of its branch targets
    pub indices: bool,
    /// Append the raw metadata token to resolved references
    pub tokens: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            offsets: true,
            indices: true,
            tokens: false,
        }
    }
}

/// Renders a single instruction as text.
pub trait InstructionFormatter {
    /// Write `instruction`, an element of `sequence`, to `w` without a trailing newline.
    ///
    /// # Errors
    /// Propagates failures of the underlying writer.
    fn format_instruction(
        &self,
        sequence: &InstructionSequence,
        instruction: &Instruction,
        w: &mut dyn Write,
    ) -> fmt::Result;
}

/// The default [`InstructionFormatter`], producing one ildasm-style line per instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextFormatter {
    /// Output options
    pub opts: FormatOptions,
}

impl TextFormatter {
    /// Create a formatter with the given options.
    #[must_use]
    pub fn new(opts: FormatOptions) -> Self {
        Self { opts }
    }

    fn format_operand(&self, instruction: &Instruction) -> String {
        let mut text = match &instruction.operand {
            Operand::None => String::new(),
            Operand::Int32(value) => value.to_string(),
            Operand::Int64(value) => value.to_string(),
            Operand::Float32(value) => value.to_string(),
            Operand::Float64(value) => value.to_string(),
            Operand::String(value) => format!("{value:?}"),
            Operand::This => "this".to_string(),
            Operand::Parameter(parameter) => {
                if parameter.parameter.name.is_empty() {
                    format!("A_{}", parameter.slot)
                } else {
                    parameter.parameter.name.clone()
                }
            }
            Operand::Local(local) => format!("V_{}", local.index),
            Operand::Field(field) => field.to_string(),
            Operand::Method(method) => method.to_string(),
            Operand::Type(ty) => ty.to_string(),
            Operand::Member(member) => member.to_string(),
            Operand::Signature(blob) => format!("signature ({} bytes)", blob.len()),
            Operand::Branch(target) => {
                if self.opts.indices {
                    format!("IL_{:04x} (-> #{})", target.offset, target.index)
                } else {
                    format!("IL_{:04x}", target.offset)
                }
            }
            Operand::Switch(table) => {
                let labels: Vec<String> = table
                    .offsets
                    .iter()
                    .map(|offset| format!("IL_{offset:04x}"))
                    .collect();
                if self.opts.indices {
                    let indices: Vec<String> =
                        table.indices.iter().map(|index| format!("#{index}")).collect();
                    format!("({}) (-> {})", labels.join(", "), indices.join(", "))
                } else {
                    format!("({})", labels.join(", "))
                }
            }
        };

        if self.opts.tokens {
            if let Some(token) = instruction.operand.token() {
                text.push_str(&format!(" /* 0x{:08X} */", token.value()));
            }
        }

        text
    }
}

impl InstructionFormatter for TextFormatter {
    fn format_instruction(
        &self,
        _sequence: &InstructionSequence,
        instruction: &Instruction,
        w: &mut dyn Write,
    ) -> fmt::Result {
        if self.opts.offsets {
            write!(w, "IL_{:04x}: ", instruction.offset)?;
        }
        if self.opts.indices {
            write!(w, "[{}] ", instruction.index)?;
        }

        let operand = self.format_operand(instruction);
        if operand.is_empty() {
            w.write_str(instruction.mnemonic())
        } else {
            write!(w, "{:<12} {operand}", instruction.mnemonic())
        }
    }
}

impl InstructionSequence {
    /// Render the whole sequence, one instruction per line.
    ///
    /// # Errors
    /// Propagates formatter failures.
    pub fn render(&self, formatter: &dyn InstructionFormatter) -> Result<String, fmt::Error> {
        let mut out = String::new();
        for instruction in self {
            formatter.format_instruction(self, instruction, &mut out)?;
            out.push('\n');
        }
        Ok(out)
    }
}

impl fmt::Display for InstructionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatter = TextFormatter::default();
        for instruction in self {
            formatter.format_instruction(self, instruction, f)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
