//! Single-instruction disassembly, consumed by the external debug shell.
//!
//! Produces a short mnemonic of the form `NAME[*] CC,SSS`, where `*` marks
//! the FLAG bit and `CC`/`SSS` are the operand channel/sector in octal.

use crate::decode::Instruction;
use crate::shifts;
use crate::special;

/// Disassembles a raw instruction word into its mnemonic line.
#[must_use]
pub fn disassemble(word: crate::word::Word, d37c_mode: bool) -> String {
    let instr = Instruction::decode(word);
    let flag_mark = if instr.flag { "*" } else { "" };
    let name = detail(instr, d37c_mode);
    format!(
        "{name}{flag_mark} {:02o},{:03o}",
        instr.channel, instr.sector
    )
}

fn detail(instr: Instruction, d37c_mode: bool) -> String {
    match instr.op {
        0 => {
            let (op, _) = shifts::decode(instr.sector);
            let op = shifts::resolve(op, d37c_mode);
            format!("SHIFT({})", shift_name(op))
        }
        2 => (if d37c_mode { "TZE" } else { "TMI" }).to_string(),
        7 => (if d37c_mode { "DIV" } else { "MPM" }).to_string(),
        8 => {
            let op = special::sub_op(instr.sector);
            format!("SPEC({op:#04o})")
        }
        _ => instr.mnemonic().to_string(),
    }
}

fn shift_name(op: shifts::ShiftOp) -> &'static str {
    match op {
        shifts::ShiftOp::Sal => "SAL",
        shifts::ShiftOp::Als => "ALS",
        shifts::ShiftOp::Sll => "SLL",
        shifts::ShiftOp::Srl => "SRL",
        shifts::ShiftOp::Alc => "ALC",
        shifts::ShiftOp::Sar => "SAR",
        shifts::ShiftOp::Ars => "ARS",
        shifts::ShiftOp::Slr => "SLR",
        shifts::ShiftOp::Srr => "SRR",
        shifts::ShiftOp::Arc => "ARC",
        shifts::ShiftOp::Coa => "COA",
        shifts::ShiftOp::Unknown => "???",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Instruction;

    #[test]
    fn disassembles_add_with_flag_set() {
        let word = Instruction::encode(13, true, 0, 0o12, 0o045);
        let line = disassemble(word, false);
        assert_eq!(line, "ADD* 12,045");
    }

    #[test]
    fn disassembles_opcode_two_by_mode() {
        let word = Instruction::encode(2, false, 0, 0, 0);
        assert_eq!(disassemble(word, true), "TZE 00,000");
        assert_eq!(disassemble(word, false), "TMI 00,000");
    }
}
