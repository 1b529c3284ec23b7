//! Bytecode to assembly listing CLI.
//!
//! Loads a binary program and prints it as an assembly listing on stdout.
//!
//! # Usage
//! ```text
//! delasm <input.lvm>
//! ```

use lvm::error;
use lvm::vm::disasm::disassemble;
use lvm::vm::program::Program;
use std::env;
use std::io;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        eprintln!("USAGE: {} <input.lvm>", args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let program = Program::load_file(&args[1]).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });

    disassemble(&program, &mut io::stdout().lock()).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });
}
