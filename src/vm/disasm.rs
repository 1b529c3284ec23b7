//! Bytecode to assembly listing.
//!
//! The inverse of the assembler, minus names: labels do not survive
//! compilation, so jump targets come back as bare addresses. The listing is
//! itself valid assembly input.

use crate::vm::program::Program;
use std::io;
use std::io::Write;

/// Writes `program` as an assembly listing, one instruction per line in
/// address order.
pub fn disassemble<W: Write>(program: &Program, out: &mut W) -> io::Result<()> {
    for inst in program.instructions() {
        writeln!(out, "{inst}")?;
    }
    Ok(())
}
