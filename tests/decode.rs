//! Integration tests for method body decoding.

use ilscope::{
    disassembler::{INSTRUCTIONS, INSTRUCTIONS_FE},
    prelude::*,
};

fn int32() -> TypeRefRc {
    TypeRef::new(Token(0x0100_0001), "System", "Int32")
}

fn locals(resolver: &TableResolver, count: u16) -> MethodContext<'_> {
    (0..count).fold(
        MethodContext::new(resolver).with_static(true),
        |context, index| context.with_local(LocalVariable::new(index, int32(), false)),
    )
}

/// Every fixed-width property that has to hold for any successfully decoded body
fn assert_well_formed(il: &[u8], sequence: &InstructionSequence) {
    let consumed: usize = sequence.iter().map(|instruction| instruction.size).sum();
    assert_eq!(consumed, il.len());
    assert_eq!(sequence.code_size(), il.len());

    for pair in sequence.instructions().windows(2) {
        assert!(pair[0].offset < pair[1].offset);
        assert_eq!(pair[0].end_offset(), pair[1].offset);
        assert_eq!(pair[0].next, Some(pair[1].index));
        assert_eq!(pair[1].previous, Some(pair[0].index));
    }

    for (index, instruction) in sequence.iter().enumerate() {
        assert_eq!(instruction.index, index);
        match &instruction.operand {
            Operand::Branch(target) => {
                assert_eq!(sequence[target.index].offset, target.offset);
            }
            Operand::Switch(table) => {
                assert_eq!(table.offsets.len(), table.indices.len());
                for (offset, index) in table.offsets.iter().zip(&table.indices) {
                    assert_eq!(sequence[*index].offset, *offset);
                }
            }
            _ => {}
        }
    }
}

#[test]
fn straight_line_with_branch_to_next() {
    // { v0 = 5; v1 = 10; v2 = v0 + v1; return v2; } without optimizations
    let il = [
        0x00, // nop
        0x1B, // ldc.i4.5
        0x0A, // stloc.0
        0x1F, 0x0A, // ldc.i4.s 10
        0x0B, // stloc.1
        0x06, // ldloc.0
        0x07, // ldloc.1
        0x58, // add
        0x0C, // stloc.2
        0x2B, 0x00, // br.s IL_000c
        0x08, // ldloc.2
        0x2A, // ret
    ];
    let resolver = TableResolver::new();
    let context = locals(&resolver, 3);

    let sequence = decode_method_body(&il, &context).unwrap();
    assert_well_formed(&il, &sequence);

    let mnemonics: Vec<&str> = sequence.iter().map(Instruction::mnemonic).collect();
    assert_eq!(
        mnemonics,
        [
            "nop", "ldc.i4.5", "stloc.0", "ldc.i4.s", "stloc.1", "ldloc.0", "ldloc.1", "add",
            "stloc.2", "br.s", "ldloc.2", "ret"
        ]
    );

    assert_eq!(sequence[3].operand, Operand::Int32(10));
    assert!(matches!(&sequence[8].operand, Operand::Local(local) if local.index == 2));

    let branch = &sequence[9];
    assert_eq!(branch.flow_type(), FlowType::UnconditionalBranch);
    assert_eq!(
        branch.operand,
        Operand::Branch(BranchTarget {
            offset: 12,
            index: 10
        })
    );
    assert_eq!(sequence.branch_target(9).unwrap().index, branch.next.unwrap());
}

#[test]
fn forward_branch_is_deferred() {
    // brfalse.s +2; nop; nop; ret
    let il = [0x2C, 0x02, 0x00, 0x00, 0x2A];
    let resolver = TableResolver::new();
    let context = locals(&resolver, 0);

    let sequence = decode_method_body(&il, &context).unwrap();
    assert_well_formed(&il, &sequence);

    let target = sequence.branch_target(0).unwrap();
    assert_eq!(target.mnemonic(), "ret");
    assert_eq!(target.offset, 4);
    assert_eq!(target.index, 3);
}

#[test]
fn five_case_switch() {
    let mut il = vec![
        0x18, // ldc.i4.2
        0x45, 0x05, 0x00, 0x00, 0x00, // switch (5)
    ];
    for case in 0..5i32 {
        il.extend_from_slice(&(1 + 2 * case).to_le_bytes());
    }
    il.push(0x2A); // default: ret
    for case in 0..5u8 {
        il.push(0x16 + case); // ldc.i4.<case>
        il.push(0x2A); // ret
    }

    let resolver = TableResolver::new();
    let context = locals(&resolver, 0);
    let sequence = decode_method_body(&il, &context).unwrap();
    assert_well_formed(&il, &sequence);

    let switch = &sequence[1];
    assert_eq!(switch.flow_type(), FlowType::Switch);
    assert_eq!(switch.size - switch.opcode.size(), 4 + 4 * 5);

    let targets = sequence.switch_targets(1);
    assert_eq!(targets.len(), 5);
    for (case, target) in targets.iter().enumerate() {
        assert_eq!(target.offset, 27 + 2 * case);
        assert_eq!(target.operand, Operand::None);
        assert_eq!(target.mnemonic(), format!("ldc.i4.{case}"));
    }
}

#[test]
fn truncated_operand() {
    // nop; ldc.i4 with three of four operand bytes
    let il = [0x00, 0x20, 0x01, 0x02, 0x03];
    let resolver = TableResolver::new();
    let context = locals(&resolver, 0);

    match decode_method_body(&il, &context) {
        Err(Error::TruncatedInstructionStream { offset, needed }) => {
            assert_eq!(offset, 2);
            assert_eq!(needed, 4);
        }
        other => panic!("expected a truncation error, got {other:?}"),
    }

    // the complete body decodes
    let mut complete = il.to_vec();
    complete.push(0x04);
    assert_eq!(decode_method_body(&complete, &context).unwrap().len(), 2);
}

#[test]
fn truncated_switch_table() {
    // switch (2) with only one delta
    let il = [0x45, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
    let resolver = TableResolver::new();
    let context = locals(&resolver, 0);

    assert!(matches!(
        decode_method_body(&il, &context),
        Err(Error::TruncatedInstructionStream { .. })
    ));
}

#[test]
fn branch_into_instruction() {
    // br.s +1 lands on the operand byte of ldc.i4.s
    let il = [0x2B, 0x01, 0x1F, 0x05, 0x2A];
    let resolver = TableResolver::new();
    let context = locals(&resolver, 0);

    assert!(matches!(
        decode_method_body(&il, &context),
        Err(Error::UnresolvedBranchTarget(3))
    ));
}

#[test]
fn branch_past_end() {
    // br.s +5 beyond the last instruction
    let il = [0x2B, 0x05, 0x2A];
    let resolver = TableResolver::new();
    let context = locals(&resolver, 0);

    assert!(matches!(
        decode_method_body(&il, &context),
        Err(Error::UnresolvedBranchTarget(7))
    ));
}

#[test]
fn every_opcode_size() {
    let resolver = TableResolver::new();
    let mut context = MethodContext::new(&resolver);
    for index in 0..4 {
        context = context
            .with_parameter(Parameter::new(index, int32(), &format!("p{index}")))
            .with_local(LocalVariable::new(index, int32(), false));
    }

    let opcodes = INSTRUCTIONS.iter().chain(INSTRUCTIONS_FE.iter());
    for opcode in opcodes.filter(|opcode| !opcode.is_unused()) {
        let Some(operand_size) = opcode.operand_type.size() else {
            continue;
        };
        if operand_size == 4
            && !matches!(
                opcode.operand_type,
                OperandType::InlineI | OperandType::ShortInlineR | OperandType::InlineBrTarget
            )
        {
            // token operands need a populated resolver
            continue;
        }

        let mut il = Vec::new();
        if opcode.prefix != 0 {
            il.push(opcode.prefix);
        }
        il.push(opcode.value);
        il.extend(std::iter::repeat_n(0x00, operand_size));
        il.push(0x2A);

        let sequence = decode_method_body(&il, &context)
            .unwrap_or_else(|error| panic!("{}: {error}", opcode.mnemonic));
        assert_well_formed(&il, &sequence);
        assert_eq!(sequence[0].size, opcode.size() + operand_size, "{}", opcode.mnemonic);
        assert_eq!(sequence[0].opcode, *opcode);
    }
}

#[test]
fn decoding_is_pure() {
    let object = TypeRef::new(Token(0x0100_0002), "System", "Object");
    let ctor = MethodRef::new(Token(0x0A00_0001), object.clone(), ".ctor");
    let resolver = TableResolver::new()
        .with_type(object.clone())
        .with_method(ctor)
        .with_string(Token(0x7000_0001), "text");
    let context = MethodContext::new(&resolver)
        .with_parameter(Parameter::new(0, object.clone(), "value"))
        .with_local(LocalVariable::new(0, object, true));

    let il = [
        0x02, // ldarg.0
        0x28, 0x01, 0x00, 0x00, 0x0A, // call .ctor
        0x03, // ldarg.1
        0x2D, 0x06, // brtrue.s IL_000f
        0x72, 0x01, 0x00, 0x00, 0x70, // ldstr "text"
        0x26, // pop
        0x16, // ldc.i4.0
        0x45, 0x01, 0x00, 0x00, 0x00, 0xF6, 0xFF, 0xFF, 0xFF, // switch (IL_000f)
        0x14, // ldnull
        0x0A, // stloc.0
        0x2B, 0xEC, // br.s IL_0009
    ];

    let first = decode_method_body(&il, &context).unwrap();
    let second = decode_method_body(&il, &context).unwrap();

    assert_well_formed(&il, &first);
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(first.branch_target(3).unwrap().mnemonic(), "ldc.i4.0");
    assert_eq!(first.switch_targets(7)[0].mnemonic(), "ldc.i4.0");
    assert_eq!(first.branch_target(10).unwrap().mnemonic(), "ldstr");
}

#[test]
fn concurrent_decoding() {
    let resolver = TableResolver::new();
    let il = [0x00, 0x2C, 0x02, 0x00, 0x00, 0x2A];

    let bodies: Vec<MethodBodyInput<'_>> = (0..16)
        .map(|_| MethodBodyInput::new(&il, locals(&resolver, 0)))
        .collect();
    let expected = decode_method_body(&il, &locals(&resolver, 0)).unwrap();

    for result in decode_method_bodies(&bodies) {
        assert_eq!(result.unwrap(), expected);
    }

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let context = locals(&resolver, 0);
                assert_eq!(decode_method_body(&il, &context).unwrap(), expected);
            });
        }
    });
}
