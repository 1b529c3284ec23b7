//! Bytecode runner CLI.
//!
//! Loads a binary program and executes it to completion, to an error, or to
//! an instruction limit.
//!
//! # Usage
//! ```text
//! lvm -i <input.lvm> [OPTIONS]
//! ```
//!
//! # Options
//! - `-i <file>`: Binary program to execute (required)
//! - `-l <limit>`: Maximum instructions to execute (negative = unbounded)
//! - `-d`: Interactive debug mode, one instruction per enter press
//! - `-h`: Print this help message

use lvm::vm::machine::Lvm;
use lvm::{error, info};
use lvm::vm::program::Program;
use std::env;
use std::io;
use std::io::{BufRead, Write};
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<&str> = None;
    let mut limit: i64 = -1;
    let mut debug = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" => {
                i += 1;
                if i >= args.len() {
                    error!("-i requires an argument");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
                i += 1;
            }
            "-l" => {
                i += 1;
                if i >= args.len() {
                    error!("-l requires an argument");
                    process::exit(1);
                }
                limit = args[i].parse::<i64>().unwrap_or_else(|_| {
                    error!("Invalid limit: '{}' is not a number", args[i]);
                    process::exit(1);
                });
                i += 1;
            }
            "-d" => {
                debug = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let Some(input_path) = input_path else {
        print_usage(&args[0]);
        process::exit(1);
    };

    let program = Program::load_file(input_path).unwrap_or_else(|e| {
        error!("{e}");
        process::exit(1);
    });

    let mut machine = Lvm::new(program);

    let result = if debug {
        run_debugger(&mut machine, limit)
    } else {
        machine.execute_program(limit).map_err(Into::into)
    };

    if let Err(e) = result {
        error!("{input_path}: {e}");
        let _ = machine.dump_stack(&mut io::stderr());
        process::exit(1);
    }

    machine
        .dump_stack(&mut io::stdout())
        .unwrap_or_else(|e| {
            error!("{e}");
            process::exit(1);
        });
}

/// Single-steps the machine, showing the stack and the next instruction
/// before each step and waiting for an enter press in between.
fn run_debugger(machine: &mut Lvm, mut limit: i64) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut line = String::new();

    while limit != 0 && !machine.is_halted() {
        machine.dump_stack(&mut io::stdout())?;
        match machine.program().get(machine.pc()) {
            Some(inst) => println!("=> {:>4}: {inst}", machine.pc()),
            None => println!("=> {:>4}: <end of program>", machine.pc()),
        }
        io::stdout().flush()?;

        line.clear();
        // EOF on stdin ends the session without an error.
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        machine.execute_instruction()?;
        if limit > 0 {
            limit -= 1;
        }
    }
    Ok(())
}

const USAGE: &str = "\
Bytecode Runner

USAGE:
    {program} -i <input.lvm> [OPTIONS]

OPTIONS:
    -i <file>     Binary program to execute
    -l <limit>    Maximum instructions to execute (negative = unbounded)
    -d            Interactive debug mode, one instruction per enter press
    -h, --help    Print this help message

EXAMPLES:
    # Run to completion
    {program} -i program.lvm

    # Run at most 100 instructions
    {program} -i program.lvm -l 100

    # Step through interactively
    {program} -i program.lvm -d
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
