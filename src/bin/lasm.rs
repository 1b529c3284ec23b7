//! Assembly to bytecode compiler CLI.
//!
//! Reads an assembly source file and compiles it to a binary program.
//!
//! # Usage
//! ```text
//! lasm <input.lasm> <output.lvm>
//! ```

use lvm::vm::assembler::Assembler;
use lvm::vm::program::INST_RECORD_SIZE;
use lvm::{error, info};
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 3 { 1 } else { 0 });
    }

    let input_path = &args[1];
    let output_path = &args[2];

    let program = Assembler::assemble_file(input_path).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });

    program.save_file(output_path).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });

    info!(
        "Compiled {} -> {} ({} bytes)",
        input_path,
        output_path,
        program.len() * INST_RECORD_SIZE
    );
}

const USAGE: &str = "\
Assembly Compiler

USAGE:
    {program} <input.lasm> <output.lvm>

ARGS:
    <input.lasm>    Assembly source file to compile
    <output.lvm>    Binary program file to write
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
