//! Parallel decoding of independent method bodies.

use log::warn;
use rayon::prelude::*;

use crate::{
    disassembler::{decode_method_body, InstructionSequence},
    metadata::context::MethodContext,
    Result,
};

/// One method body queued for [`decode_method_bodies`].
#[derive(Debug, Clone)]
pub struct MethodBodyInput<'a> {
    /// The raw IL byte stream
    pub il: &'a [u8],
    /// The method the body belongs to
    pub context: MethodContext<'a>,
}

impl<'a> MethodBodyInput<'a> {
    /// Pair a body with its method context.
    #[must_use]
    pub fn new(il: &'a [u8], context: MethodContext<'a>) -> Self {
        MethodBodyInput { il, context }
    }
}

/// Decode many method bodies in parallel.
///
/// Results are returned in input order. Bodies are independent: a failing body yields its
/// `Err` in place and does not affect the others. Failures are additionally logged at `warn`.
///
/// # Examples
///
/// ```rust
/// use ilscope::{decode_method_bodies, MethodBodyInput, MethodContext, TableResolver};
///
/// let resolver = TableResolver::new();
/// let bodies = vec![
///     MethodBodyInput::new(&[0x00, 0x2A], MethodContext::new(&resolver)),
///     MethodBodyInput::new(&[0x20, 0x01], MethodContext::new(&resolver)),
/// ];
///
/// let results = decode_method_bodies(&bodies);
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// ```
#[must_use]
pub fn decode_method_bodies(bodies: &[MethodBodyInput<'_>]) -> Vec<Result<InstructionSequence>> {
    bodies
        .par_iter()
        .enumerate()
        .map(|(index, body)| {
            let result = decode_method_body(body.il, &body.context);
            if let Err(error) = &result {
                warn!("Failed to decode method body #{index}: {error}");
            }
            result
        })
        .collect()
}
