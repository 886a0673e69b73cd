//! Special / IO operations (opcode 8). Sub-op is `(S >> 1) & 0x3F`.
//!
//! Unknown sub-ops are no-ops, not errors — this family is a grab-bag of
//! single-purpose discrete operations, most of which this core only needs
//! to recognize well enough to flip one latch or register.

use crate::word::{Word, to_signed};

/// Decodes the special sub-operation from the operand sector field.
#[must_use]
pub const fn sub_op(sector: u8) -> u8 {
    (sector >> 1) & 0x3F
}

/// A discrete input/output/voltage side effect produced by a special
/// operation, applied by the caller against the CPU's I/O latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialEffect {
    pub halt: bool,
    pub reset_detector: bool,
    pub enable_countdown: Option<bool>,
    pub set_phase: Option<u8>,
    pub load_a_from_discrete_a: bool,
    pub load_a_from_discrete_b: bool,
    pub discrete_out_a: Option<Word>,
    pub voltage_out: Option<(usize, i16)>,
    pub binary_out: Option<(usize, u8)>,
    pub and_with_l: bool,
    pub or_with_l: bool,
    pub set_sign: bool,
    pub toggle_sign: bool,
}

/// Decodes the effect of a special/IO sub-op. `a` and `sector` are needed
/// to compute data-carrying effects (`DOA`, `VOx`, `BOx`, `LPR`).
#[must_use]
pub fn decode(op: u8, a: Word, sector: u8, d37c_mode: bool) -> SpecialEffect {
    let mut effect = SpecialEffect::default();
    match op {
        0x08 => effect.reset_detector = true, // RSD
        0x09 => effect.halt = true,           // HPR
        0x04 => effect.binary_out = Some((0, top_two_bits(a))), // BOA
        0x05 => effect.binary_out = Some((1, top_two_bits(a))), // BOB
        0x01 => effect.binary_out = Some((2, top_two_bits(a))), // BOC
        0x0B => effect.discrete_out_a = Some(a), // DOA
        0x0C => effect.voltage_out = Some((0, voltage_from(a))), // VOA
        0x0D => effect.voltage_out = Some((1, voltage_from(a))), // VOB
        0x0E => effect.voltage_out = Some((2, voltage_from(a))), // VOC
        0x10 => {
            // ORA: D37C only; no-op in D17B mode.
            if d37c_mode {
                effect.or_with_l = true;
            }
        }
        0x11 => effect.and_with_l = true, // ANA
        0x12 => effect.set_sign = true,   // MIM
        0x13 => effect.toggle_sign = true, // COM
        0x14 => effect.load_a_from_discrete_b = true, // DIB
        0x15 => effect.load_a_from_discrete_a = true, // DIA
        0x18 => effect.enable_countdown = Some(false), // HFC
        0x19 => effect.enable_countdown = Some(true), // EFC
        0x1E | 0x1F => effect.set_phase = Some(sector & 0x7), // LPR
        _ => {}
    }
    effect
}

fn top_two_bits(a: Word) -> u8 {
    ((a >> 22) & 0x3) as u8
}

/// Derives the signed 16-bit voltage output from `to_signed(A >> 15)`.
/// Plausible but unverified against hardware; this is the emulator's
/// documented current behavior, not a claim about the real DAC.
fn voltage_from(a: Word) -> i16 {
    let shifted = a >> 15;
    to_signed(shifted).clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hpr_sets_halt() {
        let effect = decode(0x09, 0, 0, false);
        assert!(effect.halt);
    }

    #[test]
    fn ora_is_noop_in_d17b_mode() {
        let effect = decode(0x10, 0, 0, false);
        assert!(!effect.or_with_l);
        let effect = decode(0x10, 0, 0, true);
        assert!(effect.or_with_l);
    }

    #[test]
    fn lpr_masks_phase_to_three_bits() {
        let effect = decode(0x1E, 0, 0xFF, false);
        assert_eq!(effect.set_phase, Some(0x7));
    }

    #[test]
    fn unknown_sub_op_produces_no_effect() {
        let effect = decode(0x3F, 0, 0, false);
        assert_eq!(effect, SpecialEffect::default());
    }
}
