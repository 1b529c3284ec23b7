//! Execution, translation, and program-file error types.

use std::io;
use thiserror::Error;

/// Errors that can occur while executing bytecode.
///
/// This is a closed taxonomy: each variant names the precise precondition
/// that failed. The execution engine never recovers internally; the first
/// error is returned to the caller and is fatal to the run.
#[derive(Debug, Error)]
pub enum ExecError {
    /// A push, call, or dup would exceed the stack capacity.
    #[error("stack overflow")]
    StackOverflow,
    /// An operation required more stack slots than are present.
    #[error("stack underflow")]
    StackUnderflow,
    /// Unrecognized opcode tag, only reachable via a corrupted or
    /// hand-crafted binary.
    #[error("illegal instruction: opcode {opcode:#04x}")]
    IllegalInst { opcode: u8 },
    /// The program counter points outside the program.
    #[error("illegal instruction access: address {addr} (program size {program_size})")]
    IllegalInstAccess { addr: u64, program_size: u64 },
    /// A `native` index at or beyond the registered table size.
    #[error("illegal operand: native index {index} ({registered} natives registered)")]
    IllegalOperand { index: u64, registered: usize },
    /// A memory access whose address plus width exceeds the memory region.
    #[error("illegal memory access: {width} bytes at address {addr}")]
    IllegalMemoryAccess { addr: u64, width: usize },
    /// Integer division by zero. Float division is exempt per IEEE-754.
    #[error("divide by zero")]
    DivByZero,
}

/// Errors that can occur while loading or saving a binary program file.
///
/// All format violations are fatal load errors, never recoverable.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("could not access `{path}`: {source}")]
    Io { path: String, source: io::Error },
    /// The file length is not an exact multiple of the instruction record.
    #[error("file length {len} is not a multiple of the {record}-byte instruction record")]
    UnalignedLength { len: u64, record: usize },
    /// More instructions than the program capacity allows.
    #[error("program holds {count} instructions, capacity is {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },
    /// An instruction record carried an opcode tag outside the ISA.
    #[error(transparent)]
    Inst(#[from] ExecError),
}

/// Errors that can occur while translating assembly source.
///
/// Every malformed-input condition is fatal to the whole translation unit
/// and reports the source file and line where it was encountered; the
/// assembler never produces partial output.
#[derive(Debug, Error)]
pub enum AsmError {
    #[error("{file}:{line}: unknown instruction `{name}`")]
    UnknownInstruction { file: String, line: usize, name: String },
    #[error("{file}:{line}: instruction `{name}` requires an operand")]
    MissingOperand { file: String, line: usize, name: String },
    #[error("{file}:{line}: instruction `{name}` takes no operand")]
    UnexpectedOperand { file: String, line: usize, name: String },
    #[error("{file}:{line}: label `{label}` is already defined")]
    DuplicateLabel { file: String, line: usize, label: String },
    #[error("{file}:{line}: unknown label `{label}`")]
    UnresolvedLabel { file: String, line: usize, label: String },
    #[error("{file}:{line}: unknown preprocessor directive `%{directive}`")]
    UnknownDirective { file: String, line: usize, directive: String },
    #[error("{file}:{line}: `{literal}` is not a number literal")]
    BadLiteral { file: String, line: usize, literal: String },
    #[error("{file}:{line}: `%{directive}` is missing its argument")]
    MissingDirectiveArg { file: String, line: usize, directive: String },
    #[error("{file}:{line}: include path must be surrounded with quotation marks")]
    MalformedInclude { file: String, line: usize },
    #[error("{file}:{line}: exceeded maximum include depth ({max})")]
    IncludeDepthExceeded { file: String, line: usize, max: usize },
    #[error("{file}:{line}: program exceeds the capacity of {capacity} instructions")]
    ProgramTooLarge { file: String, line: usize, capacity: usize },
    #[error("could not read `{path}`: {source}")]
    Io { path: String, source: io::Error },
}
