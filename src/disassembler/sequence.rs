//! The decoded, linked instruction sequence.

use std::ops::Index;

use crate::disassembler::{Instruction, Operand};

/// A fully linked sequence of decoded instructions.
///
/// Instructions are stored in decode order, which is also strictly increasing offset order.
/// Neighbour and branch links inside each [`Instruction`] are indices into this sequence and are
/// followed with the index-based accessors below.
///
/// A sequence is only ever produced by [`crate::disassembler::decode_method_body`] and is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionSequence {
    instructions: Vec<Instruction>,
    code_size: usize,
}

impl InstructionSequence {
    pub(crate) fn new(instructions: Vec<Instruction>, code_size: usize) -> Self {
        InstructionSequence {
            instructions,
            code_size,
        }
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// `true` for an empty method body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Size of the decoded IL byte stream. Equals the sum of all instruction sizes.
    #[must_use]
    pub fn code_size(&self) -> usize {
        self.code_size
    }

    /// Iterate the instructions in offset order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// The instructions as a slice.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The instruction at sequence index `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// The instruction preceding the one at `index`.
    #[must_use]
    pub fn previous(&self, index: usize) -> Option<&Instruction> {
        self.get(index)?.previous.and_then(|previous| self.get(previous))
    }

    /// The instruction following the one at `index`.
    #[must_use]
    pub fn next(&self, index: usize) -> Option<&Instruction> {
        self.get(index)?.next.and_then(|next| self.get(next))
    }

    /// The branch target of the instruction at `index`.
    ///
    /// Returns `None` if the instruction has no single branch target (see
    /// [`InstructionSequence::switch_targets`] for `switch`).
    #[must_use]
    pub fn branch_target(&self, index: usize) -> Option<&Instruction> {
        match &self.get(index)?.operand {
            Operand::Branch(target) => self.get(target.index),
            _ => None,
        }
    }

    /// The case targets of the `switch` instruction at `index`, in case order.
    ///
    /// Empty for anything that is not a `switch`.
    #[must_use]
    pub fn switch_targets(&self, index: usize) -> Vec<&Instruction> {
        match self.get(index).map(|instruction| &instruction.operand) {
            Some(Operand::Switch(table)) => table
                .indices
                .iter()
                .filter_map(|&target| self.get(target))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The instruction starting exactly at byte offset `offset`.
    #[must_use]
    pub fn find_by_offset(&self, offset: usize) -> Option<&Instruction> {
        self.instructions
            .binary_search_by_key(&offset, |instruction| instruction.offset)
            .ok()
            .and_then(|index| self.get(index))
    }

    /// Consume the sequence and return the instruction arena.
    #[must_use]
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl Index<usize> for InstructionSequence {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl<'a> IntoIterator for &'a InstructionSequence {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
