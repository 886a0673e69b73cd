//! End-to-end scenario tests exercising the CPU core purely through its
//! public interface, the way an external shell or test harness would.

use d17b_cpu::{Cpu, Instruction, MachineVariant, StepStatus};

#[test]
fn s1_add_program() {
    let mut cpu = Cpu::new(MachineVariant::D37c, false);
    cpu.load_program(
        0,
        &[
            Instruction::encode(9, false, 2, 0, 1), // CLA 0,1 Sp=2
            5,
            Instruction::encode(13, false, 4, 0, 3), // ADD 0,3 Sp=4
            3,
            Instruction::encode(11, false, 5, 0, 6), // STO 0,6 Sp=5
            Instruction::encode(8, false, 6, 0, 18), // HPR Sp=6
            0,
        ],
    );
    let status = cpu.run(20);
    assert_eq!(status, StepStatus::AlreadyHalted);
    assert!(cpu.halted);
    assert_eq!(cpu.regs.a, 8);
    assert_eq!(cpu.read(0, 6), 8);
    assert_eq!(cpu.cycle_count, 5);
}

#[test]
fn s2_division() {
    let mut cpu = Cpu::new(MachineVariant::D37c, true);
    cpu.regs.a = 0;
    cpu.regs.l = 24;
    cpu.load_program(
        0,
        &[
            Instruction::encode(7, false, 2, 0, 1), // DIV 0,1 Sp=2
            4,
            Instruction::encode(8, false, 0, 0, 18), // HPR
        ],
    );
    cpu.run(10);
    assert_eq!(cpu.regs.a, 6);
    assert_eq!(cpu.regs.l, 0);
    assert!(!cpu.error);
}

#[test]
fn s3_division_by_zero() {
    let mut cpu = Cpu::new(MachineVariant::D37c, true);
    cpu.regs.a = 0;
    cpu.regs.l = 100;
    cpu.load_program(
        0,
        &[
            Instruction::encode(7, false, 2, 0, 1), // DIV 0,1 Sp=2
            0,
            Instruction::encode(8, false, 0, 0, 18), // HPR
        ],
    );
    cpu.run(10);
    assert!(cpu.error);
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.regs.l, 100);
}

#[test]
fn s4_rotate_left() {
    let mut cpu = Cpu::new(MachineVariant::D37c, true);
    cpu.regs.a = 0x80_0001;
    // ALC (opcode 0, sub-op 0x0B resolved to ALC in D37C mode) with count=1.
    cpu.load_program(0, &[Instruction::encode(0, false, 0, 0, 0b01011_001)]);
    cpu.step();
    assert_eq!(cpu.regs.a, 0x00_0003);
}

#[test]
fn s5_sign_magnitude_subtract() {
    let mut cpu = Cpu::new(MachineVariant::D37c, false);
    cpu.regs.a = 2; // +2
    cpu.load_program(0, &[Instruction::encode(15, false, 0, 0, 1), 5]); // SUB 0,1, operand +5
    cpu.step();
    assert_eq!(cpu.regs.a, 0x80_0003);
}

#[test]
fn s6_d17b_tmi_vs_d37c_tze_dispatch() {
    let mut d37c = Cpu::new(MachineVariant::D37c, true);
    d37c.regs.a = 0;
    d37c.load_program(0, &[Instruction::encode(2, false, 0, 0, 40)]);
    d37c.step();
    assert_eq!(d37c.regs.location(), (0, 40));

    let mut d17b = Cpu::new(MachineVariant::D17b, false);
    d17b.regs.a = 0;
    d17b.load_program(0, &[Instruction::encode(2, false, 7, 0, 40)]);
    d17b.step();
    assert_eq!(d17b.regs.location(), (0, 7));
}

#[test]
fn reset_clears_registers_but_not_bulk_memory() {
    let mut cpu = Cpu::new(MachineVariant::D37c, false);
    cpu.regs.a = 42;
    cpu.write(0, 5, 99);
    cpu.reset();
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.read(0, 5), 99);
}

#[test]
fn already_halted_step_still_advances_the_word_time_clock() {
    let mut cpu = Cpu::new(MachineVariant::D37c, false);
    cpu.load_program(0, &[Instruction::encode(8, false, 0, 0, 18)]); // HPR
    assert_eq!(cpu.step(), StepStatus::JustHalted);
    let cycles_after_halt = cpu.cycle_count;
    assert_eq!(cpu.step(), StepStatus::AlreadyHalted);
    assert_eq!(cpu.cycle_count, cycles_after_halt + 1);
}
