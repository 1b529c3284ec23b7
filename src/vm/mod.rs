//! Stack-based bytecode virtual machine, assembler, and disassembler.
//!
//! The VM executes bytecode produced by the assembler or loaded from a
//! binary program file.
//!
//! # Architecture
//!
//! - **Stack**: up to 1024 untagged [`word::Word`] slots; every operand and
//!   result lives here
//! - **Memory**: a flat, byte-addressable, zero-initialized region shared
//!   with native functions
//! - **Instruction format**: fixed-size records, one opcode byte plus one
//!   operand word
//! - **Execution model**: arithmetic, comparisons, bitwise operations,
//!   jumps, calls/returns, memory access, and host-registered natives
//! - **Step limiting**: runs can be bounded to a fixed instruction count
//!
//! # Modules
//!
//! - [`assembler`]: Assembly parsing, preprocessing, and label resolution
//! - [`disasm`]: Bytecode to assembly listing
//! - [`errors`]: Execution, translation, and program-file error types
//! - [`isa`]: Instruction set definition and opcode mappings
//! - [`machine`]: Core virtual machine implementation
//! - [`program`]: Bytecode program representation and binary format
//! - [`word`]: The untagged 8-byte value cell

pub mod assembler;
pub mod disasm;
pub mod errors;
pub mod isa;
pub mod machine;
pub mod program;
pub mod word;
