//! The CPU aggregate: owns the register file, memory substrate, and I/O
//! latches, and drives the sequencer one instruction at a time.

use crate::decode::Instruction;
use crate::execute::{self, ArithOutcome};
use crate::flagstore::{self, FlagDestination};
use crate::memory::{MachineVariant, Memory};
use crate::registers::Registers;
use crate::shifts;
use crate::special;
use crate::word::{Word, WORD_MASK, complement, minus_magnitude};

/// Channel constant for the flag-store's modifiable bulk destination
/// (octal channel 50).
const CH_MODIFIABLE_BULK: u8 = 0o50;

/// Number of sectors per channel, used to advance the free-running
/// word-time clock.
const SECTORS_PER_CHANNEL: u8 = 128;

/// Outcome of a single `step()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// An instruction was fetched and executed normally.
    Ran,
    /// This step's instruction halted the CPU (`HPR`).
    JustHalted,
    /// The CPU was already halted; no instruction was fetched, but the
    /// free-running word-time clock still advanced one tick (the disc
    /// keeps rotating even though the CPU is no longer reading it).
    AlreadyHalted,
}

/// The D17B/D37C CPU core.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub regs: Registers,
    memory: Memory,

    pub halted: bool,
    pub error: bool,
    pub d37c_mode: bool,

    pub current_sector: u8,
    pub cycle_count: u64,

    pub discrete_in_a: Word,
    pub discrete_in_b: Word,
    pub discrete_out_a: Word,
    pub voltage_out: [i16; 4],
    pub binary_out: [u8; 4],
    pub detector: bool,
    pub fine_countdown: u32,
    pub countdown_enabled: bool,

    /// Last 4-bit value emitted by `COA`. A boundary stub: the spec defines
    /// the trigger, not the sink, so this just latches the most recent value.
    pub char_output: Option<u8>,
    /// Set for the duration of one `step()` call when a flag-store
    /// telemetry pulse (raw code 2) fires; cleared at the start of the
    /// next step.
    pub telemetry_pulsed: bool,
}

impl Cpu {
    /// Constructs a CPU for the given machine variant, in the given mode.
    #[must_use]
    pub fn new(variant: MachineVariant, d37c_mode: bool) -> Self {
        Self {
            regs: Registers::new(),
            memory: Memory::new(variant),
            halted: false,
            error: false,
            d37c_mode,
            current_sector: 0,
            cycle_count: 0,
            discrete_in_a: 0,
            discrete_in_b: 0,
            discrete_out_a: 0,
            voltage_out: [0; 4],
            binary_out: [0; 4],
            detector: false,
            fine_countdown: 0,
            countdown_enabled: false,
            char_output: None,
            telemetry_pulsed: false,
        }
    }

    /// Resets registers, loops, I/O latches, and cycle counters to zero and
    /// clears `halted`/`error`. `d37c_mode` persists across reset. Bulk
    /// memory is left untouched — programs are expected to be reloaded by
    /// the host, not wiped by a mode reset.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.halted = false;
        self.error = false;
        self.current_sector = 0;
        self.cycle_count = 0;
        self.discrete_in_a = 0;
        self.discrete_in_b = 0;
        self.discrete_out_a = 0;
        self.voltage_out = [0; 4];
        self.binary_out = [0; 4];
        self.detector = false;
        self.fine_countdown = 0;
        self.countdown_enabled = false;
        self.char_output = None;
        self.telemetry_pulsed = false;
    }

    /// Reads a word at `(channel, sector)` through the unified memory
    /// substrate.
    #[must_use]
    pub fn read(&self, channel: u8, sector: u8) -> Word {
        self.memory.read(&self.regs, channel, sector)
    }

    /// Writes a word at `(channel, sector)` through the unified memory
    /// substrate.
    pub fn write(&mut self, channel: u8, sector: u8, value: Word) {
        self.memory.write(&mut self.regs, channel, sector, value);
    }

    /// Loads a contiguous run of words into a channel starting at sector 0.
    /// A thin generalization of `write` for bulk program loading.
    pub fn load_program(&mut self, channel: u8, words: &[Word]) {
        for (sector, &word) in words.iter().enumerate() {
            self.write(channel, sector as u8, word);
        }
    }

    /// Executes a single instruction, or advances the word-time clock alone
    /// if already halted.
    pub fn step(&mut self) -> StepStatus {
        self.telemetry_pulsed = false;

        if self.halted {
            self.tick_clock();
            return StepStatus::AlreadyHalted;
        }

        let (fetch_channel, fetch_sector) = self.regs.location();
        let word = self.read(fetch_channel, fetch_sector);
        let instr = Instruction::decode(word);
        let mut branched = false;

        match instr.op {
            10 => {
                // TRA: unconditional jump.
                self.regs.set_location(instr.channel, instr.sector);
                branched = true;
            }
            2 => {
                if execute::tmi_tze_branch(self.regs.a, self.d37c_mode) {
                    self.regs.set_location(instr.channel, instr.sector);
                    branched = true;
                }
            }
            6 => {
                if execute::tmi_branch(self.regs.a) {
                    self.regs.set_location(instr.channel, instr.sector);
                    branched = true;
                }
            }
            11 => {
                // STO: write A, no A change, no flag store.
                let a = self.regs.a;
                self.write(instr.channel, instr.sector, a);
            }
            0 => self.execute_shift(instr),
            8 => self.execute_special(instr),
            _ => self.execute_arith_family(instr),
        }

        if !branched {
            self.regs.set_location(fetch_channel, instr.sp);
        }

        self.tick_clock();

        if self.halted {
            StepStatus::JustHalted
        } else {
            StepStatus::Ran
        }
    }

    /// Repeatedly steps until the CPU halts (including the one extra tick
    /// that observes `AlreadyHalted`) or `max_cycles` steps have run.
    pub fn run(&mut self, max_cycles: u32) -> StepStatus {
        let mut last = StepStatus::Ran;
        for _ in 0..max_cycles {
            last = self.step();
            if last == StepStatus::AlreadyHalted {
                break;
            }
        }
        last
    }

    fn tick_clock(&mut self) {
        self.current_sector = (self.current_sector + 1) % SECTORS_PER_CHANNEL;
        self.cycle_count = self.cycle_count.wrapping_add(1);
        if self.countdown_enabled && self.fine_countdown > 0 {
            self.fine_countdown -= 1;
        }
    }

    fn execute_shift(&mut self, instr: Instruction) {
        let (op, count) = shifts::decode(instr.sector);
        let op = shifts::resolve(op, self.d37c_mode);
        let (new_a, emitted) = shifts::apply(op, self.regs.a, count);
        self.regs.a = new_a;
        if let Some(ch) = emitted {
            self.char_output = Some(ch);
        }
    }

    fn execute_special(&mut self, instr: Instruction) {
        let sub_op = special::sub_op(instr.sector);
        let effect = special::decode(sub_op, self.regs.a, instr.sector, self.d37c_mode);

        if effect.halt {
            self.halted = true;
        }
        if effect.reset_detector {
            self.detector = false;
        }
        if let Some(enabled) = effect.enable_countdown {
            self.countdown_enabled = enabled;
        }
        if let Some(phase) = effect.set_phase {
            self.regs.p = phase;
        }
        if effect.load_a_from_discrete_a {
            self.regs.a = self.discrete_in_a;
        }
        if effect.load_a_from_discrete_b {
            self.regs.a = self.discrete_in_b;
        }
        if let Some(value) = effect.discrete_out_a {
            self.discrete_out_a = value;
        }
        if let Some((channel, value)) = effect.voltage_out {
            self.voltage_out[channel] = value;
        }
        if let Some((channel, value)) = effect.binary_out {
            self.binary_out[channel] = value;
        }
        if effect.and_with_l {
            self.regs.a &= self.regs.l;
            self.regs.a &= WORD_MASK;
        }
        if effect.or_with_l {
            self.regs.a |= self.regs.l;
            self.regs.a &= WORD_MASK;
        }
        if effect.set_sign {
            self.regs.a = minus_magnitude(self.regs.a);
        }
        if effect.toggle_sign {
            self.regs.a = complement(self.regs.a);
        }
    }

    fn execute_arith_family(&mut self, instr: Instruction) {
        let operand = self.read(instr.channel, instr.sector);
        let ArithOutcome { a, l, error } =
            execute::execute_arith(instr.op, self.regs.a, self.regs.l, operand, self.d37c_mode);
        self.regs.a = a;
        self.regs.l = l;
        if error {
            self.error = true;
        }

        if instr.flag {
            self.flag_store(instr);
        }
    }

    fn flag_store(&mut self, instr: Instruction) {
        let raw = instr.flag_store_code();
        let a = self.regs.a;
        match flagstore::decode(raw) {
            FlagDestination::None => {}
            FlagDestination::Telemetry => self.telemetry_pulsed = true,
            FlagDestination::Channel50 => {
                let sector = flagstore::channel_50_sector(instr.sector);
                self.write(CH_MODIFIABLE_BULK, sector, a);
            }
            _ => {
                flagstore::store(&mut self.regs, raw, instr.sector, a);
            }
        }
    }
}
