//! Bytecode virtual machine library.
//!
//! Provides a stack-based virtual machine, an assembler for its assembly
//! language, a disassembler, and the binary program format shared by all
//! three.

pub mod utils;
pub mod vm;
