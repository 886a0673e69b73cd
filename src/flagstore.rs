//! Flag store: the side-effect write of the accumulator into a loop (or
//! other destination) that piggybacks on arithmetic-class instructions.
//!
//! The flag-store code is the low 3 bits of the operand sector field.
//! The table in the source manuals writes these codes as even octal digits
//! (02, 04, 06, 10, 12, 14, 16); that is exactly `raw * 2` where
//! `raw = S & 0x7`, giving the ordered mapping below.

use crate::memory::write_loop;
use crate::registers::{CH_E, CH_F, CH_H, CH_U, Registers};
use crate::word::Word;

/// A flag-store destination, decoded from a raw 3-bit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagDestination {
    /// Raw code 0: flag store disabled, no write.
    None,
    /// Raw code 1: F-loop, indexed by `S mod 4`.
    FLoop,
    /// Raw code 2: telemetry pulse — no data, externally observable only.
    Telemetry,
    /// Raw code 3: channel 50 (modifiable bulk cell), indexed `(S - 2) mod 128`.
    Channel50,
    /// Raw code 4: E-loop, indexed by `S mod 8`.
    ELoop,
    /// Raw code 5: the `L` lower accumulator, aliased as a loop.
    LLoop,
    /// Raw code 6: H-loop, indexed by `S mod 16`.
    HLoop,
    /// Raw code 7: the one-word U-loop.
    ULoop,
}

/// Decodes a raw 3-bit flag-store code (`S & 0x7`) into its destination.
#[must_use]
pub const fn decode(raw: u8) -> FlagDestination {
    match raw & 0x7 {
        0 => FlagDestination::None,
        1 => FlagDestination::FLoop,
        2 => FlagDestination::Telemetry,
        3 => FlagDestination::Channel50,
        4 => FlagDestination::ELoop,
        5 => FlagDestination::LLoop,
        6 => FlagDestination::HLoop,
        _ => FlagDestination::ULoop,
    }
}

/// Result of a flag-store side effect, for observers that need to know a
/// telemetry pulse fired (there is no memory location to inspect for it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagStoreEffect {
    pub telemetry_pulsed: bool,
}

/// Performs the flag-store write of `value` (the post-instruction `A`) to
/// the destination selected by `raw`. Must be called after the main
/// instruction effect has already been applied.
pub fn store(regs: &mut Registers, raw: u8, sector: u8, value: Word) -> FlagStoreEffect {
    match decode(raw) {
        FlagDestination::None => FlagStoreEffect::default(),
        FlagDestination::FLoop => {
            write_loop(regs, CH_F, sector, value);
            FlagStoreEffect::default()
        }
        FlagDestination::Telemetry => FlagStoreEffect {
            telemetry_pulsed: true,
        },
        FlagDestination::Channel50 => {
            // Channel 50 is an ordinary bulk channel; the sector offset is
            // (S - 2) mod 128, handled by the caller via the bulk memory
            // path since this module only owns loop/register destinations.
            // Stored by the caller through `Memory::write` instead.
            let _ = sector;
            FlagStoreEffect::default()
        }
        FlagDestination::ELoop => {
            write_loop(regs, CH_E, sector, value);
            FlagStoreEffect::default()
        }
        FlagDestination::LLoop => {
            regs.l = value & crate::word::WORD_MASK;
            FlagStoreEffect::default()
        }
        FlagDestination::HLoop => {
            write_loop(regs, CH_H, sector, value);
            FlagStoreEffect::default()
        }
        FlagDestination::ULoop => {
            write_loop(regs, CH_U, sector, value);
            FlagStoreEffect::default()
        }
    }
}

/// Computes the bulk (channel, sector) target for the `Channel50` flag-store
/// destination.
#[must_use]
pub const fn channel_50_sector(sector: u8) -> u8 {
    sector.wrapping_sub(2) % 128
}
