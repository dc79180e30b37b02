//! Branch target resolution.
//!
//! Instructions are appended to the arena in strictly increasing offset order, so the arena is
//! always sorted and targets are found by binary search. Backward targets are resolved while
//! decoding; everything else is recorded in a pending list and patched by [`link`] once the
//! main loop has finished.

use log::trace;

use crate::{
    disassembler::{Instruction, Operand},
    Error, Result,
};

/// Compute the absolute target of a branch delta relative to `base`.
///
/// `base` is the position just past the branch operand (or past the whole jump table for
/// `switch`).
///
/// # Errors
/// Returns [`Error::UnresolvedBranchTarget`] if the target lies before the start of the body.
pub(crate) fn target_offset(base: usize, delta: i64) -> Result<usize> {
    let target = i64::try_from(base)
        .unwrap_or(i64::MAX)
        .saturating_add(delta);
    usize::try_from(target).map_err(|_| Error::UnresolvedBranchTarget(target))
}

/// Find the index of the instruction starting exactly at `offset`.
///
/// # Errors
/// Returns [`Error::UnresolvedBranchTarget`] if no instruction starts at `offset`.
pub(crate) fn find(instructions: &[Instruction], offset: usize) -> Result<usize> {
    instructions
        .binary_search_by_key(&offset, |instruction| instruction.offset)
        .map_err(|_| Error::UnresolvedBranchTarget(i64::try_from(offset).unwrap_or(i64::MAX)))
}

/// Resolve the targets of every pending branch and switch instruction.
///
/// `pending` holds arena indices of instructions whose targets were not yet decoded when they
/// were seen. Each target offset must match the offset of exactly one instruction.
///
/// # Errors
/// Returns [`Error::UnresolvedBranchTarget`] for the first target that does not start an
/// instruction.
///
/// # Panics
/// If `pending` names an index outside `instructions`.
pub(crate) fn link(instructions: &mut [Instruction], pending: &[usize]) -> Result<()> {
    for &index in pending {
        let instruction = &instructions[index];

        match &instruction.operand {
            Operand::Branch(target) => {
                let offset = target.offset;
                let target_index = find(instructions, offset)?;
                trace!(
                    "IL_{:04x}: branch -> IL_{offset:04x} (#{target_index})",
                    instruction.offset
                );

                if let Operand::Branch(target) = &mut instructions[index].operand {
                    target.index = target_index;
                }
            }
            Operand::Switch(table) => {
                let indices = table
                    .offsets
                    .iter()
                    .map(|&offset| find(instructions, offset))
                    .collect::<Result<Vec<_>>>()?;
                trace!(
                    "IL_{:04x}: switch -> {} case(s) {indices:?}",
                    instruction.offset,
                    indices.len()
                );

                if let Operand::Switch(table) = &mut instructions[index].operand {
                    table.indices = indices;
                }
            }
            _ => {}
        }
    }

    Ok(())
}
