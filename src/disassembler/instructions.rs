//! Static CIL opcode tables.
//!
//! [`INSTRUCTIONS`] covers the single-byte opcode space and is indexed directly by the opcode
//! byte. [`INSTRUCTIONS_FE`] covers the two-byte space introduced by the `0xFE` escape and is
//! indexed by the second byte. Rows no instruction occupies hold [`OpCode::UNUSED`].
//!
//! Both tables are built at compile time, so a lookup is a plain array index.

use crate::{
    disassembler::{FlowType, OpCode, OperandType},
    Error, Result,
};

/// The escape byte introducing the two-byte opcode space.
pub const FE_PREFIX: u8 = 0xFE;

macro_rules! row {
    ($table:ident, $value:expr, $mnemonic:expr, $operand:ident, $flow:ident) => {
        row!($table, 0x00, $value, $mnemonic, $operand, $flow)
    };
    ($table:ident, $prefix:expr, $value:expr, $mnemonic:expr, $operand:ident, $flow:ident) => {
        $table[$value] = OpCode {
            mnemonic: $mnemonic,
            operand_type: OperandType::$operand,
            flow: FlowType::$flow,
            prefix: $prefix,
            value: $value,
        };
    };
}

/// Single-byte opcodes, indexed by the opcode byte.
pub static INSTRUCTIONS: [OpCode; 256] = single_byte_table();

/// Two-byte opcodes (`0xFE xx`), indexed by the second byte.
pub static INSTRUCTIONS_FE: [OpCode; 32] = two_byte_table();

const fn single_byte_table() -> [OpCode; 256] {
    let mut t = [OpCode::UNUSED; 256];

    row!(t, 0x00, "nop", None, Sequential);
    row!(t, 0x01, "break", None, Sequential);
    row!(t, 0x02, "ldarg.0", None, Sequential);
    row!(t, 0x03, "ldarg.1", None, Sequential);
    row!(t, 0x04, "ldarg.2", None, Sequential);
    row!(t, 0x05, "ldarg.3", None, Sequential);
    row!(t, 0x06, "ldloc.0", None, Sequential);
    row!(t, 0x07, "ldloc.1", None, Sequential);
    row!(t, 0x08, "ldloc.2", None, Sequential);
    row!(t, 0x09, "ldloc.3", None, Sequential);
    row!(t, 0x0A, "stloc.0", None, Sequential);
    row!(t, 0x0B, "stloc.1", None, Sequential);
    row!(t, 0x0C, "stloc.2", None, Sequential);
    row!(t, 0x0D, "stloc.3", None, Sequential);
    row!(t, 0x0E, "ldarg.s", ShortInlineVar, Sequential);
    row!(t, 0x0F, "ldarga.s", ShortInlineVar, Sequential);
    row!(t, 0x10, "starg.s", ShortInlineVar, Sequential);
    row!(t, 0x11, "ldloc.s", ShortInlineVar, Sequential);
    row!(t, 0x12, "ldloca.s", ShortInlineVar, Sequential);
    row!(t, 0x13, "stloc.s", ShortInlineVar, Sequential);
    row!(t, 0x14, "ldnull", None, Sequential);
    row!(t, 0x15, "ldc.i4.m1", None, Sequential);
    row!(t, 0x16, "ldc.i4.0", None, Sequential);
    row!(t, 0x17, "ldc.i4.1", None, Sequential);
    row!(t, 0x18, "ldc.i4.2", None, Sequential);
    row!(t, 0x19, "ldc.i4.3", None, Sequential);
    row!(t, 0x1A, "ldc.i4.4", None, Sequential);
    row!(t, 0x1B, "ldc.i4.5", None, Sequential);
    row!(t, 0x1C, "ldc.i4.6", None, Sequential);
    row!(t, 0x1D, "ldc.i4.7", None, Sequential);
    row!(t, 0x1E, "ldc.i4.8", None, Sequential);
    row!(t, 0x1F, "ldc.i4.s", ShortInlineI, Sequential);
    row!(t, 0x20, "ldc.i4", InlineI, Sequential);
    row!(t, 0x21, "ldc.i8", InlineI8, Sequential);
    row!(t, 0x22, "ldc.r4", ShortInlineR, Sequential);
    row!(t, 0x23, "ldc.r8", InlineR, Sequential);
    row!(t, 0x25, "dup", None, Sequential);
    row!(t, 0x26, "pop", None, Sequential);
    row!(t, 0x27, "jmp", InlineMethod, Call);
    row!(t, 0x28, "call", InlineMethod, Call);
    row!(t, 0x29, "calli", InlineSig, Call);
    row!(t, 0x2A, "ret", None, Return);

    row!(t, 0x2B, "br.s", ShortInlineBrTarget, UnconditionalBranch);
    row!(t, 0x2C, "brfalse.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x2D, "brtrue.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x2E, "beq.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x2F, "bge.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x30, "bgt.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x31, "ble.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x32, "blt.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x33, "bne.un.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x34, "bge.un.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x35, "bgt.un.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x36, "ble.un.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x37, "blt.un.s", ShortInlineBrTarget, ConditionalBranch);
    row!(t, 0x38, "br", InlineBrTarget, UnconditionalBranch);
    row!(t, 0x39, "brfalse", InlineBrTarget, ConditionalBranch);
    row!(t, 0x3A, "brtrue", InlineBrTarget, ConditionalBranch);
    row!(t, 0x3B, "beq", InlineBrTarget, ConditionalBranch);
    row!(t, 0x3C, "bge", InlineBrTarget, ConditionalBranch);
    row!(t, 0x3D, "bgt", InlineBrTarget, ConditionalBranch);
    row!(t, 0x3E, "ble", InlineBrTarget, ConditionalBranch);
    row!(t, 0x3F, "blt", InlineBrTarget, ConditionalBranch);
    row!(t, 0x40, "bne.un", InlineBrTarget, ConditionalBranch);
    row!(t, 0x41, "bge.un", InlineBrTarget, ConditionalBranch);
    row!(t, 0x42, "bgt.un", InlineBrTarget, ConditionalBranch);
    row!(t, 0x43, "ble.un", InlineBrTarget, ConditionalBranch);
    row!(t, 0x44, "blt.un", InlineBrTarget, ConditionalBranch);
    row!(t, 0x45, "switch", InlineSwitch, Switch);

    row!(t, 0x46, "ldind.i1", None, Sequential);
    row!(t, 0x47, "ldind.u1", None, Sequential);
    row!(t, 0x48, "ldind.i2", None, Sequential);
    row!(t, 0x49, "ldind.u2", None, Sequential);
    row!(t, 0x4A, "ldind.i4", None, Sequential);
    row!(t, 0x4B, "ldind.u4", None, Sequential);
    row!(t, 0x4C, "ldind.i8", None, Sequential);
    row!(t, 0x4D, "ldind.i", None, Sequential);
    row!(t, 0x4E, "ldind.r4", None, Sequential);
    row!(t, 0x4F, "ldind.r8", None, Sequential);
    row!(t, 0x50, "ldind.ref", None, Sequential);
    row!(t, 0x51, "stind.ref", None, Sequential);
    row!(t, 0x52, "stind.i1", None, Sequential);
    row!(t, 0x53, "stind.i2", None, Sequential);
    row!(t, 0x54, "stind.i4", None, Sequential);
    row!(t, 0x55, "stind.i8", None, Sequential);
    row!(t, 0x56, "stind.r4", None, Sequential);
    row!(t, 0x57, "stind.r8", None, Sequential);

    row!(t, 0x58, "add", None, Sequential);
    row!(t, 0x59, "sub", None, Sequential);
    row!(t, 0x5A, "mul", None, Sequential);
    row!(t, 0x5B, "div", None, Sequential);
    row!(t, 0x5C, "div.un", None, Sequential);
    row!(t, 0x5D, "rem", None, Sequential);
    row!(t, 0x5E, "rem.un", None, Sequential);
    row!(t, 0x5F, "and", None, Sequential);
    row!(t, 0x60, "or", None, Sequential);
    row!(t, 0x61, "xor", None, Sequential);
    row!(t, 0x62, "shl", None, Sequential);
    row!(t, 0x63, "shr", None, Sequential);
    row!(t, 0x64, "shr.un", None, Sequential);
    row!(t, 0x65, "neg", None, Sequential);
    row!(t, 0x66, "not", None, Sequential);
    row!(t, 0x67, "conv.i1", None, Sequential);
    row!(t, 0x68, "conv.i2", None, Sequential);
    row!(t, 0x69, "conv.i4", None, Sequential);
    row!(t, 0x6A, "conv.i8", None, Sequential);
    row!(t, 0x6B, "conv.r4", None, Sequential);
    row!(t, 0x6C, "conv.r8", None, Sequential);
    row!(t, 0x6D, "conv.u4", None, Sequential);
    row!(t, 0x6E, "conv.u8", None, Sequential);

    row!(t, 0x6F, "callvirt", InlineMethod, Call);
    row!(t, 0x70, "cpobj", InlineType, Sequential);
    row!(t, 0x71, "ldobj", InlineType, Sequential);
    row!(t, 0x72, "ldstr", InlineString, Sequential);
    row!(t, 0x73, "newobj", InlineMethod, Call);
    row!(t, 0x74, "castclass", InlineType, Sequential);
    row!(t, 0x75, "isinst", InlineType, Sequential);
    row!(t, 0x76, "conv.r.un", None, Sequential);
    row!(t, 0x79, "unbox", InlineType, Sequential);
    row!(t, 0x7A, "throw", None, Throw);
    row!(t, 0x7B, "ldfld", InlineField, Sequential);
    row!(t, 0x7C, "ldflda", InlineField, Sequential);
    row!(t, 0x7D, "stfld", InlineField, Sequential);
    row!(t, 0x7E, "ldsfld", InlineField, Sequential);
    row!(t, 0x7F, "ldsflda", InlineField, Sequential);
    row!(t, 0x80, "stsfld", InlineField, Sequential);
    row!(t, 0x81, "stobj", InlineType, Sequential);
    row!(t, 0x82, "conv.ovf.i1.un", None, Sequential);
    row!(t, 0x83, "conv.ovf.i2.un", None, Sequential);
    row!(t, 0x84, "conv.ovf.i4.un", None, Sequential);
    row!(t, 0x85, "conv.ovf.i8.un", None, Sequential);
    row!(t, 0x86, "conv.ovf.u1.un", None, Sequential);
    row!(t, 0x87, "conv.ovf.u2.un", None, Sequential);
    row!(t, 0x88, "conv.ovf.u4.un", None, Sequential);
    row!(t, 0x89, "conv.ovf.u8.un", None, Sequential);
    row!(t, 0x8A, "conv.ovf.i.un", None, Sequential);
    row!(t, 0x8B, "conv.ovf.u.un", None, Sequential);

    row!(t, 0x8C, "box", InlineType, Sequential);
    row!(t, 0x8D, "newarr", InlineType, Sequential);
    row!(t, 0x8E, "ldlen", None, Sequential);
    row!(t, 0x8F, "ldelema", InlineType, Sequential);
    row!(t, 0x90, "ldelem.i1", None, Sequential);
    row!(t, 0x91, "ldelem.u1", None, Sequential);
    row!(t, 0x92, "ldelem.i2", None, Sequential);
    row!(t, 0x93, "ldelem.u2", None, Sequential);
    row!(t, 0x94, "ldelem.i4", None, Sequential);
    row!(t, 0x95, "ldelem.u4", None, Sequential);
    row!(t, 0x96, "ldelem.i8", None, Sequential);
    row!(t, 0x97, "ldelem.i", None, Sequential);
    row!(t, 0x98, "ldelem.r4", None, Sequential);
    row!(t, 0x99, "ldelem.r8", None, Sequential);
    row!(t, 0x9A, "ldelem.ref", None, Sequential);
    row!(t, 0x9B, "stelem.i", None, Sequential);
    row!(t, 0x9C, "stelem.i1", None, Sequential);
    row!(t, 0x9D, "stelem.i2", None, Sequential);
    row!(t, 0x9E, "stelem.i4", None, Sequential);
    row!(t, 0x9F, "stelem.i8", None, Sequential);
    row!(t, 0xA0, "stelem.r4", None, Sequential);
    row!(t, 0xA1, "stelem.r8", None, Sequential);
    row!(t, 0xA2, "stelem.ref", None, Sequential);
    row!(t, 0xA3, "ldelem", InlineType, Sequential);
    row!(t, 0xA4, "stelem", InlineType, Sequential);
    row!(t, 0xA5, "unbox.any", InlineType, Sequential);

    row!(t, 0xB3, "conv.ovf.i1", None, Sequential);
    row!(t, 0xB4, "conv.ovf.u1", None, Sequential);
    row!(t, 0xB5, "conv.ovf.i2", None, Sequential);
    row!(t, 0xB6, "conv.ovf.u2", None, Sequential);
    row!(t, 0xB7, "conv.ovf.i4", None, Sequential);
    row!(t, 0xB8, "conv.ovf.u4", None, Sequential);
    row!(t, 0xB9, "conv.ovf.i8", None, Sequential);
    row!(t, 0xBA, "conv.ovf.u8", None, Sequential);
    row!(t, 0xC2, "refanyval", InlineType, Sequential);
    row!(t, 0xC3, "ckfinite", None, Sequential);
    row!(t, 0xC6, "mkrefany", InlineType, Sequential);
    row!(t, 0xD0, "ldtoken", InlineTok, Sequential);
    row!(t, 0xD1, "conv.u2", None, Sequential);
    row!(t, 0xD2, "conv.u1", None, Sequential);
    row!(t, 0xD3, "conv.i", None, Sequential);
    row!(t, 0xD4, "conv.ovf.i", None, Sequential);
    row!(t, 0xD5, "conv.ovf.u", None, Sequential);
    row!(t, 0xD6, "add.ovf", None, Sequential);
    row!(t, 0xD7, "add.ovf.un", None, Sequential);
    row!(t, 0xD8, "mul.ovf", None, Sequential);
    row!(t, 0xD9, "mul.ovf.un", None, Sequential);
    row!(t, 0xDA, "sub.ovf", None, Sequential);
    row!(t, 0xDB, "sub.ovf.un", None, Sequential);
    row!(t, 0xDC, "endfinally", None, EndFinally);
    row!(t, 0xDD, "leave", InlineBrTarget, Leave);
    row!(t, 0xDE, "leave.s", ShortInlineBrTarget, Leave);
    row!(t, 0xDF, "stind.i", None, Sequential);
    row!(t, 0xE0, "conv.u", None, Sequential);

    t
}

const fn two_byte_table() -> [OpCode; 32] {
    let mut t = [OpCode::UNUSED; 32];

    row!(t, FE_PREFIX, 0x00, "arglist", None, Sequential);
    row!(t, FE_PREFIX, 0x01, "ceq", None, Sequential);
    row!(t, FE_PREFIX, 0x02, "cgt", None, Sequential);
    row!(t, FE_PREFIX, 0x03, "cgt.un", None, Sequential);
    row!(t, FE_PREFIX, 0x04, "clt", None, Sequential);
    row!(t, FE_PREFIX, 0x05, "clt.un", None, Sequential);
    row!(t, FE_PREFIX, 0x06, "ldftn", InlineMethod, Sequential);
    row!(t, FE_PREFIX, 0x07, "ldvirtftn", InlineMethod, Sequential);
    row!(t, FE_PREFIX, 0x09, "ldarg", InlineVar, Sequential);
    row!(t, FE_PREFIX, 0x0A, "ldarga", InlineVar, Sequential);
    row!(t, FE_PREFIX, 0x0B, "starg", InlineVar, Sequential);
    row!(t, FE_PREFIX, 0x0C, "ldloc", InlineVar, Sequential);
    row!(t, FE_PREFIX, 0x0D, "ldloca", InlineVar, Sequential);
    row!(t, FE_PREFIX, 0x0E, "stloc", InlineVar, Sequential);
    row!(t, FE_PREFIX, 0x0F, "localloc", None, Sequential);
    row!(t, FE_PREFIX, 0x11, "endfilter", None, EndFinally);
    row!(t, FE_PREFIX, 0x12, "unaligned.", ShortInlineI, Meta);
    row!(t, FE_PREFIX, 0x13, "volatile.", None, Meta);
    row!(t, FE_PREFIX, 0x14, "tail.", None, Meta);
    row!(t, FE_PREFIX, 0x15, "initobj", InlineType, Sequential);
    row!(t, FE_PREFIX, 0x16, "constrained.", InlineType, Meta);
    row!(t, FE_PREFIX, 0x17, "cpblk", None, Sequential);
    row!(t, FE_PREFIX, 0x18, "initblk", None, Sequential);
    row!(t, FE_PREFIX, 0x19, "no.", ShortInlineI, Meta);
    row!(t, FE_PREFIX, 0x1A, "rethrow", None, Throw);
    row!(t, FE_PREFIX, 0x1C, "sizeof", InlineType, Sequential);
    row!(t, FE_PREFIX, 0x1D, "refanytype", None, Sequential);
    row!(t, FE_PREFIX, 0x1E, "readonly.", None, Meta);

    t
}

/// Look up the table row for an opcode.
///
/// `prefix` is [`FE_PREFIX`] for the two-byte space and `0` otherwise; `opcode` is the byte
/// following the prefix (or the only byte).
///
/// # Errors
/// Returns [`Error::UnsupportedOpcode`] for unused rows and for second bytes beyond the
/// two-byte table.
///
/// # Examples
///
/// ```rust
/// use ilscope::disassembler::lookup;
///
/// assert_eq!(lookup(0x00, 0x2A).unwrap().mnemonic, "ret");
/// assert_eq!(lookup(0xFE, 0x01).unwrap().mnemonic, "ceq");
/// assert!(lookup(0x00, 0x24).is_err());
/// ```
pub fn lookup(prefix: u8, opcode: u8) -> Result<&'static OpCode> {
    let row = if prefix == FE_PREFIX {
        INSTRUCTIONS_FE.get(usize::from(opcode))
    } else {
        INSTRUCTIONS.get(usize::from(opcode))
    };

    match row {
        Some(row) if !row.is_unused() => Ok(row),
        _ => Err(Error::UnsupportedOpcode { prefix, opcode }),
    }
}
