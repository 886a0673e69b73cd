//! Interactive shell and self-test runner for the D17B/D37C CPU core.
//!
//! Usage:
//!   d17b-cpu -t         run the canned self-test, exit 0 on success
//!   d17b-cpu -i         interactive shell (commands: s, r, d, m CH SEC [V], l ADDR, q)

use d17b_cpu::{Cpu, Instruction, MachineVariant, disassemble};
use std::io::{self, BufRead, Write};

fn main() {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("-t") => {
            if run_self_test() {
                println!("self-test: PASS");
            } else {
                eprintln!("self-test: FAIL");
                std::process::exit(1);
            }
        }
        Some("-i") => run_shell(),
        Some(other) => {
            eprintln!("unknown flag: {other}");
            eprintln!("usage: d17b-cpu [-t | -i]");
            std::process::exit(1);
        }
        None => {
            eprintln!("usage: d17b-cpu [-t | -i]");
            std::process::exit(1);
        }
    }
}

fn run_self_test() -> bool {
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
    cpu.run(20);
    cpu.halted && cpu.regs.a == 8 && cpu.read(0, 6) == 8 && cpu.cycle_count == 5
}

fn run_shell() {
    let mut cpu = Cpu::new(MachineVariant::D37c, true);
    let stdin = io::stdin();
    print!("> ");
    let _ = io::stdout().flush();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("s") => {
                let status = cpu.step();
                println!("{status:?}");
            }
            Some("r") => {
                let status = cpu.run(100_000);
                println!("{status:?}");
            }
            Some("d") => {
                let (channel, sector) = cpu.regs.location();
                let word = cpu.read(channel, sector);
                println!("{}", disassemble(word, cpu.d37c_mode));
            }
            Some("m") => match (parts.next(), parts.next(), parts.next()) {
                (Some(ch), Some(sec), value) => {
                    if let (Ok(channel), Ok(sector)) =
                        (u8::from_str_radix(ch, 8), u8::from_str_radix(sec, 8))
                    {
                        if let Some(v) = value {
                            if let Ok(w) = u32::from_str_radix(v, 8) {
                                cpu.write(channel, sector, w);
                            } else {
                                eprintln!("bad value: {v}");
                            }
                        }
                        println!("{:08o}", cpu.read(channel, sector));
                    } else {
                        eprintln!("usage: m CH SEC [VALUE] (octal)");
                    }
                }
                _ => eprintln!("usage: m CH SEC [VALUE] (octal)"),
            },
            Some("l") => {
                if let Some(addr) = parts.next() {
                    if let Ok(i) = u32::from_str_radix(addr, 8) {
                        cpu.regs.set_location(((i >> 9) & 0x3F) as u8, ((i >> 2) & 0x7F) as u8);
                    } else {
                        eprintln!("bad address: {addr}");
                    }
                } else {
                    eprintln!("usage: l ADDR (octal)");
                }
            }
            Some("q") => break,
            Some(other) => eprintln!("unknown command: {other}"),
            None => {}
        }
        print!("> ");
        let _ = io::stdout().flush();
    }
}
