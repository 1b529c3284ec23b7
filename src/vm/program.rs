//! Bytecode program representation and serialization.
//!
//! A [`Program`] is an ordered, bounded sequence of [`Instruction`]s where
//! insertion order is execution order and addresses are instruction indices.
//!
//! # Binary Format
//!
//! The on-disk format is headerless: a contiguous run of fixed-size
//! instruction records, each `1` opcode byte followed by the `8`-byte
//! little-endian operand word. There is no magic number, version tag, or
//! length prefix; the file length must be an exact multiple of
//! [`INST_RECORD_SIZE`]. Saving then loading reproduces an identical
//! program, bit for bit.

use crate::vm::errors::ProgramError;
use crate::vm::isa::OpCode;
use crate::vm::word::Word;
use std::fmt;
use std::fs;
use std::path::Path;

/// Maximum number of instructions a program may hold.
pub const PROGRAM_CAPACITY: usize = 1024;

/// Encoded size of one instruction record in bytes.
pub const INST_RECORD_SIZE: usize = 9;

/// A single bytecode unit: an opcode plus one optional [`Word`] operand.
///
/// Whether the operand is meaningful is decided by
/// [`OpCode::has_operand`] alone; operand-free instructions still encode a
/// (zero) operand word so records stay fixed-size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub kind: OpCode,
    pub operand: Word,
}

impl Instruction {
    /// Creates an instruction without a meaningful operand.
    pub const fn new(kind: OpCode) -> Self {
        Self {
            kind,
            operand: Word::ZERO,
        }
    }

    /// Creates an instruction with the given operand word.
    pub const fn with_operand(kind: OpCode, operand: Word) -> Self {
        Self { kind, operand }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.kind as u8);
        out.extend_from_slice(&self.operand.as_u64().to_le_bytes());
    }

    fn decode(record: &[u8; INST_RECORD_SIZE]) -> Result<Self, ProgramError> {
        let kind = OpCode::try_from(record[0])?;
        let mut operand = [0u8; 8];
        operand.copy_from_slice(&record[1..]);
        Ok(Self {
            kind,
            operand: Word::from_u64(u64::from_le_bytes(operand)),
        })
    }
}

/// Renders the instruction as disassembly: the mnemonic, followed by the
/// operand's unsigned interpretation only for operand-bearing opcodes.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.has_operand() {
            write!(f, "{} {}", self.kind.mnemonic(), self.operand.as_u64())
        } else {
            write!(f, "{}", self.kind.mnemonic())
        }
    }
}

/// An ordered, bounded sequence of instructions.
///
/// Built once by the assembler (which may still patch deferred operands
/// before execution begins) or loaded from a binary file, then treated as
/// immutable by the execution engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    insts: Vec<Instruction>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instructions, which is also one past the last valid address.
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Returns the instruction at `addr`, if it is within the program.
    pub fn get(&self, addr: u64) -> Option<Instruction> {
        usize::try_from(addr).ok().and_then(|i| self.insts.get(i)).copied()
    }

    /// All instructions in address order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.insts
    }

    /// Appends an instruction, enforcing [`PROGRAM_CAPACITY`].
    pub fn push(&mut self, inst: Instruction) -> Result<(), ProgramError> {
        if self.insts.len() >= PROGRAM_CAPACITY {
            return Err(ProgramError::CapacityExceeded {
                count: self.insts.len() + 1,
                capacity: PROGRAM_CAPACITY,
            });
        }
        self.insts.push(inst);
        Ok(())
    }

    /// Replaces the operand of the instruction at `addr`.
    ///
    /// Used by the assembler's second pass to patch deferred label
    /// references; `addr` always comes from the deferred-operand list and
    /// therefore refers to an instruction emitted during the first pass.
    pub(crate) fn patch_operand(&mut self, addr: u64, operand: Word) {
        self.insts[addr as usize].operand = operand;
    }

    /// Serializes the program as a run of fixed-size instruction records.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.insts.len() * INST_RECORD_SIZE);
        for inst in &self.insts {
            inst.encode(&mut out);
        }
        out
    }

    /// Deserializes a program, validating record alignment, capacity, and
    /// opcode tags.
    pub fn from_bytes(input: &[u8]) -> Result<Self, ProgramError> {
        if input.len() % INST_RECORD_SIZE != 0 {
            return Err(ProgramError::UnalignedLength {
                len: input.len() as u64,
                record: INST_RECORD_SIZE,
            });
        }
        let count = input.len() / INST_RECORD_SIZE;
        if count > PROGRAM_CAPACITY {
            return Err(ProgramError::CapacityExceeded {
                count,
                capacity: PROGRAM_CAPACITY,
            });
        }

        let mut insts = Vec::with_capacity(count);
        for record in input.chunks_exact(INST_RECORD_SIZE) {
            let record: &[u8; INST_RECORD_SIZE] = record.try_into().unwrap();
            insts.push(Instruction::decode(record)?);
        }
        Ok(Self { insts })
    }

    /// Writes exactly `len()` records to `path` and nothing else.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ProgramError> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()).map_err(|source| ProgramError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads a program from a binary file.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ProgramError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_program() -> Program {
        let mut p = Program::new();
        p.push(Instruction::with_operand(OpCode::Push, Word::from_u64(10)))
            .unwrap();
        p.push(Instruction::with_operand(OpCode::Push, Word::from_f64(2.5)))
            .unwrap();
        p.push(Instruction::new(OpCode::PlusF)).unwrap();
        p.push(Instruction::with_operand(OpCode::Jmp, Word::from_u64(0)))
            .unwrap();
        p.push(Instruction::new(OpCode::Halt)).unwrap();
        p
    }

    #[test]
    fn round_trip_preserves_every_bit() {
        let program = sample_program();
        let decoded = Program::from_bytes(&program.to_bytes()).unwrap();
        assert_eq!(decoded, program);
    }

    #[test]
    fn round_trip_empty_program() {
        let decoded = Program::from_bytes(&Program::new().to_bytes()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn from_bytes_rejects_unaligned_length() {
        let mut bytes = sample_program().to_bytes();
        bytes.push(0x00);
        assert!(matches!(
            Program::from_bytes(&bytes),
            Err(ProgramError::UnalignedLength { record: INST_RECORD_SIZE, .. })
        ));
    }

    #[test]
    fn from_bytes_rejects_oversized_program() {
        let bytes = vec![0u8; (PROGRAM_CAPACITY + 1) * INST_RECORD_SIZE];
        assert!(matches!(
            Program::from_bytes(&bytes),
            Err(ProgramError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn from_bytes_rejects_unknown_opcode() {
        let mut record = [0u8; INST_RECORD_SIZE];
        record[0] = 0xFF;
        assert!(matches!(
            Program::from_bytes(&record),
            Err(ProgramError::Inst(_))
        ));
    }

    #[test]
    fn push_enforces_capacity() {
        let mut p = Program::new();
        for _ in 0..PROGRAM_CAPACITY {
            p.push(Instruction::new(OpCode::Nop)).unwrap();
        }
        assert!(matches!(
            p.push(Instruction::new(OpCode::Halt)),
            Err(ProgramError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.lvm");
        let program = sample_program();
        program.save_file(&path).unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            (program.len() * INST_RECORD_SIZE) as u64
        );
        assert_eq!(Program::load_file(&path).unwrap(), program);
    }

    #[test]
    fn display_shows_operand_only_when_meaningful() {
        let push = Instruction::with_operand(OpCode::Push, Word::from_u64(42));
        assert_eq!(push.to_string(), "push 42");
        assert_eq!(Instruction::new(OpCode::Halt).to_string(), "halt");
    }
}
