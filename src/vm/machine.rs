//! Core virtual machine implementation.
//!
//! The VM executes bytecode using a stack-based architecture: every operand
//! and every stack slot is a [`Word`], and the opcode alone decides which of
//! its interpretations applies. Integer arithmetic uses wrapping semantics
//! to prevent overflow panics; float arithmetic follows IEEE-754 silently.
//!
//! The machine has two states, running and halted. It starts running and
//! only the `halt` instruction moves it to halted. Every opcode validates
//! all of its preconditions before mutating anything, so a returned error
//! never leaves the machine in a half-updated position.

use crate::vm::errors::ExecError;
use crate::vm::isa::OpCode;
use crate::vm::program::Program;
use crate::vm::word::Word;
use std::io;
use std::io::Write;

/// Maximum number of words the operand stack may hold.
pub const STACK_CAPACITY: usize = 1024;

/// Size of the flat byte-addressable memory region.
pub const MEMORY_CAPACITY: usize = 640 * 1000;

/// Maximum number of native functions that can be registered.
pub const NATIVES_CAPACITY: usize = 1024;

/// A host-registered callback invocable from bytecode via the `native`
/// opcode.
///
/// Natives receive the whole machine by mutable reference and may read or
/// mutate the stack and memory arbitrarily. This is a deliberate trust
/// boundary: native code is host-authored and not subject to the bytecode
/// bounds checks.
pub type Native = fn(&mut Lvm) -> Result<(), ExecError>;

/// The virtual machine: operand stack, flat memory, program, program
/// counter, halt flag, and native table, all exclusively owned by one
/// instance.
pub struct Lvm {
    stack: Vec<Word>,
    memory: Vec<u8>,
    program: Program,
    pc: u64,
    halt: bool,
    natives: Vec<Native>,
}

impl Lvm {
    /// Creates a machine with a zero-initialized memory region, an empty
    /// stack, and no registered natives.
    pub fn new(program: Program) -> Self {
        Self {
            stack: Vec::new(),
            memory: vec![0; MEMORY_CAPACITY],
            program,
            pc: 0,
            halt: false,
            natives: Vec::new(),
        }
    }

    /// The current program counter, an instruction index.
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Whether the `halt` instruction has been executed.
    pub fn is_halted(&self) -> bool {
        self.halt
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Word] {
        &self.stack
    }

    /// The loaded program.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The flat memory region.
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    /// Mutable access to the memory region, for native functions.
    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Registers a native function, returning its index.
    ///
    /// The table is append-only and must be populated before execution
    /// begins, never during.
    ///
    /// # Panics
    ///
    /// Panics when the table already holds [`NATIVES_CAPACITY`] entries;
    /// registration is host code, not bytecode, so exceeding the bound is a
    /// programming error rather than a runtime condition.
    pub fn push_native(&mut self, native: Native) -> u64 {
        assert!(
            self.natives.len() < NATIVES_CAPACITY,
            "native table capacity exceeded"
        );
        self.natives.push(native);
        (self.natives.len() - 1) as u64
    }

    /// Pushes a word, failing when the stack is full.
    pub fn push(&mut self, word: Word) -> Result<(), ExecError> {
        if self.stack.len() >= STACK_CAPACITY {
            return Err(ExecError::StackOverflow);
        }
        self.stack.push(word);
        Ok(())
    }

    /// Pops the top word, failing when the stack is empty.
    pub fn pop(&mut self) -> Result<Word, ExecError> {
        self.stack.pop().ok_or(ExecError::StackUnderflow)
    }

    /// Executes exactly the instruction at the current program counter.
    pub fn execute_instruction(&mut self) -> Result<(), ExecError> {
        let inst = self.program.get(self.pc).ok_or(ExecError::IllegalInstAccess {
            addr: self.pc,
            program_size: self.program.len() as u64,
        })?;

        match inst.kind {
            OpCode::Nop => self.pc += 1,

            OpCode::Push => {
                self.push(inst.operand)?;
                self.pc += 1;
            }
            OpCode::Drop => {
                self.pop()?;
                self.pc += 1;
            }
            OpCode::Dup => {
                if self.stack.len() >= STACK_CAPACITY {
                    return Err(ExecError::StackOverflow);
                }
                let n = inst.operand.as_u64();
                // Checked rather than `stack_size - n > 0` so a large n can
                // never wrap around into a valid-looking offset.
                if n >= self.stack.len() as u64 {
                    return Err(ExecError::StackUnderflow);
                }
                let slot = self.stack[self.stack.len() - 1 - n as usize];
                self.stack.push(slot);
                self.pc += 1;
            }
            OpCode::Swap => {
                let n = inst.operand.as_u64();
                if n >= self.stack.len() as u64 {
                    return Err(ExecError::StackUnderflow);
                }
                let top = self.stack.len() - 1;
                self.stack.swap(top, top - n as usize);
                self.pc += 1;
            }

            OpCode::PlusI => self.binary_u64(u64::wrapping_add)?,
            OpCode::MinusI => self.binary_u64(u64::wrapping_sub)?,
            OpCode::MultI => self.binary_u64(u64::wrapping_mul)?,
            OpCode::DivI => {
                let (_, b) = self.peek2()?;
                if b.as_u64() == 0 {
                    return Err(ExecError::DivByZero);
                }
                self.binary_u64(|a, b| a / b)?;
            }

            OpCode::PlusF => self.binary_f64(|a, b| a + b)?,
            OpCode::MinusF => self.binary_f64(|a, b| a - b)?,
            OpCode::MultF => self.binary_f64(|a, b| a * b)?,
            // Division by zero yields an infinity or NaN per IEEE-754.
            OpCode::DivF => self.binary_f64(|a, b| a / b)?,

            OpCode::Jmp => {
                // Deliberately unchecked: an out-of-range target is only
                // detected on the next fetch.
                self.pc = inst.operand.as_u64();
            }
            OpCode::JmpIf => {
                // The flag is consumed whether or not the branch is taken.
                let flag = self.pop()?;
                if flag.as_u64() != 0 {
                    self.pc = inst.operand.as_u64();
                } else {
                    self.pc += 1;
                }
            }
            OpCode::Call => {
                self.push(Word::from_u64(self.pc + 1))?;
                self.pc = inst.operand.as_u64();
            }
            OpCode::Ret => {
                self.pc = self.pop()?.as_u64();
            }
            OpCode::Native => {
                let index = inst.operand.as_u64();
                let native = usize::try_from(index)
                    .ok()
                    .and_then(|i| self.natives.get(i))
                    .copied()
                    .ok_or(ExecError::IllegalOperand {
                        index,
                        registered: self.natives.len(),
                    })?;
                native(self)?;
                self.pc += 1;
            }

            OpCode::Halt => self.halt = true,

            OpCode::Eq => self.binary_u64(|a, b| u64::from(a == b))?,
            OpCode::Gef => {
                let (a, b) = self.peek2()?;
                let result = Word::from_u64(u64::from(b.as_f64() >= a.as_f64()));
                self.stack.pop();
                let top = self.stack.len() - 1;
                self.stack[top] = result;
                self.pc += 1;
            }
            OpCode::Not => {
                let top = self.stack.last_mut().ok_or(ExecError::StackUnderflow)?;
                *top = Word::from_u64(u64::from(top.as_u64() == 0));
                self.pc += 1;
            }

            OpCode::AndB => self.binary_u64(|a, b| a & b)?,
            OpCode::OrB => self.binary_u64(|a, b| a | b)?,
            OpCode::Xor => self.binary_u64(|a, b| a ^ b)?,
            OpCode::Shr => self.binary_u64(|a, b| a.wrapping_shr(b as u32))?,
            OpCode::Shl => self.binary_u64(|a, b| a.wrapping_shl(b as u32))?,
            OpCode::NotB => {
                let top = self.stack.last_mut().ok_or(ExecError::StackUnderflow)?;
                *top = Word::from_u64(!top.as_u64());
                self.pc += 1;
            }

            OpCode::Read8 => self.read_memory(1)?,
            OpCode::Read16 => self.read_memory(2)?,
            OpCode::Read32 => self.read_memory(4)?,
            OpCode::Read64 => self.read_memory(8)?,
            OpCode::Write8 => self.write_memory(1)?,
            OpCode::Write16 => self.write_memory(2)?,
            OpCode::Write32 => self.write_memory(4)?,
            OpCode::Write64 => self.write_memory(8)?,

            OpCode::PrintDebug => {
                let word = self.pop()?;
                println!("  {word}");
                self.pc += 1;
            }
        }
        Ok(())
    }

    /// Drives the fetch-execute loop until the machine halts, an error
    /// occurs, or `limit` instructions have run.
    ///
    /// A negative `limit` means unbounded; a limit of zero executes
    /// nothing. The first error is returned immediately and is fatal to
    /// the run.
    pub fn execute_program(&mut self, mut limit: i64) -> Result<(), ExecError> {
        while limit != 0 && !self.halt {
            self.execute_instruction()?;
            if limit > 0 {
                limit -= 1;
            }
        }
        Ok(())
    }

    /// Writes every stack slot's four interpretations to `out`.
    pub fn dump_stack<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Stack:")?;
        if self.stack.is_empty() {
            writeln!(out, "  [empty]")?;
        } else {
            for word in &self.stack {
                writeln!(out, "  {word}")?;
            }
        }
        Ok(())
    }

    /// Reads the two topmost words as `(second-from-top, top)`.
    fn peek2(&self) -> Result<(Word, Word), ExecError> {
        if self.stack.len() < 2 {
            return Err(ExecError::StackUnderflow);
        }
        Ok((
            self.stack[self.stack.len() - 2],
            self.stack[self.stack.len() - 1],
        ))
    }

    /// Pops two words under the unsigned interpretation and pushes
    /// `f(second-from-top, top)` in their place.
    fn binary_u64(&mut self, f: impl FnOnce(u64, u64) -> u64) -> Result<(), ExecError> {
        let (a, b) = self.peek2()?;
        let result = Word::from_u64(f(a.as_u64(), b.as_u64()));
        self.stack.pop();
        let top = self.stack.len() - 1;
        self.stack[top] = result;
        self.pc += 1;
        Ok(())
    }

    /// Pops two words under the float interpretation and pushes
    /// `f(second-from-top, top)` in their place.
    fn binary_f64(&mut self, f: impl FnOnce(f64, f64) -> f64) -> Result<(), ExecError> {
        let (a, b) = self.peek2()?;
        let result = Word::from_f64(f(a.as_f64(), b.as_f64()));
        self.stack.pop();
        let top = self.stack.len() - 1;
        self.stack[top] = result;
        self.pc += 1;
        Ok(())
    }

    /// Pops an address and pushes `width` bytes from memory widened to the
    /// unsigned interpretation.
    fn read_memory(&mut self, width: usize) -> Result<(), ExecError> {
        if self.stack.is_empty() {
            return Err(ExecError::StackUnderflow);
        }
        let addr = self.stack[self.stack.len() - 1].as_u64();
        let start = self.check_memory_bounds(addr, width)?;

        let mut bytes = [0u8; 8];
        bytes[..width].copy_from_slice(&self.memory[start..start + width]);
        let top = self.stack.len() - 1;
        self.stack[top] = Word::from_u64(u64::from_le_bytes(bytes));
        self.pc += 1;
        Ok(())
    }

    /// Pops an address (second from top) and a value (top) and stores the
    /// value truncated to `width` bytes.
    fn write_memory(&mut self, width: usize) -> Result<(), ExecError> {
        let (addr, value) = self.peek2()?;
        let start = self.check_memory_bounds(addr.as_u64(), width)?;

        let bytes = value.as_u64().to_le_bytes();
        self.memory[start..start + width].copy_from_slice(&bytes[..width]);
        self.stack.truncate(self.stack.len() - 2);
        self.pc += 1;
        Ok(())
    }

    /// Validates `addr + width <= MEMORY_CAPACITY` and returns the address
    /// as a usable index. No alignment requirement.
    fn check_memory_bounds(&self, addr: u64, width: usize) -> Result<usize, ExecError> {
        let in_bounds = addr
            .checked_add(width as u64)
            .is_some_and(|end| end <= MEMORY_CAPACITY as u64);
        if !in_bounds {
            return Err(ExecError::IllegalMemoryAccess { addr, width });
        }
        Ok(addr as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::assembler::Assembler;

    fn machine(source: &str) -> Lvm {
        let program = Assembler::assemble_source(source).expect("assembly failed");
        Lvm::new(program)
    }

    fn run(source: &str) -> Lvm {
        let mut lvm = machine(source);
        lvm.execute_program(-1).expect("execution failed");
        lvm
    }

    fn run_expect_err(source: &str) -> ExecError {
        let mut lvm = machine(source);
        lvm.execute_program(-1).expect_err("expected error")
    }

    fn top_u64(lvm: &Lvm) -> u64 {
        lvm.stack().last().expect("stack is empty").as_u64()
    }

    // ==================== Arithmetic ====================

    #[test]
    fn integer_arithmetic() {
        assert_eq!(top_u64(&run("push 10\npush 32\nplusi\nhalt")), 42);
        assert_eq!(top_u64(&run("push 50\npush 8\nminusi\nhalt")), 42);
        assert_eq!(top_u64(&run("push 6\npush 7\nmulti\nhalt")), 42);
        assert_eq!(top_u64(&run("push 84\npush 2\ndivi\nhalt")), 42);
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let lvm = run("push 18446744073709551615\npush 1\nplusi\nhalt");
        assert_eq!(top_u64(&lvm), 0);
    }

    #[test]
    fn divi_by_zero_errors() {
        assert!(matches!(
            run_expect_err("push 10\npush 0\ndivi"),
            ExecError::DivByZero
        ));
    }

    #[test]
    fn float_arithmetic() {
        let lvm = run("push 1.5\npush 2.25\nplusf\nhalt");
        assert_eq!(lvm.stack().last().unwrap().as_f64(), 3.75);
    }

    #[test]
    fn divf_by_zero_is_infinity() {
        let lvm = run("push 10.0\npush 0.0\ndivf\nhalt");
        assert!(lvm.stack().last().unwrap().as_f64().is_infinite());
    }

    #[test]
    fn arithmetic_replaces_both_operands() {
        let lvm = run("push 1\npush 2\npush 3\nplusi\nhalt");
        assert_eq!(lvm.stack().len(), 2);
        assert_eq!(top_u64(&lvm), 5);
    }

    #[test]
    fn arithmetic_underflow() {
        assert!(matches!(
            run_expect_err("push 1\nplusi"),
            ExecError::StackUnderflow
        ));
    }

    // ==================== Bitwise / boolean ====================

    #[test]
    fn bitwise_ops() {
        assert_eq!(top_u64(&run("push 12\npush 10\nandb\nhalt")), 8);
        assert_eq!(top_u64(&run("push 12\npush 10\norb\nhalt")), 14);
        assert_eq!(top_u64(&run("push 12\npush 10\nxor\nhalt")), 6);
        assert_eq!(top_u64(&run("push 16\npush 2\nshr\nhalt")), 4);
        assert_eq!(top_u64(&run("push 1\npush 4\nshl\nhalt")), 16);
        assert_eq!(top_u64(&run("push 0\nnotb\nhalt")), u64::MAX);
    }

    #[test]
    fn boolean_not() {
        assert_eq!(top_u64(&run("push 42\nnot\nhalt")), 0);
        assert_eq!(top_u64(&run("push 0\nnot\nhalt")), 1);
    }

    #[test]
    fn eq_compares_unsigned() {
        assert_eq!(top_u64(&run("push 5\npush 5\neq\nhalt")), 1);
        assert_eq!(top_u64(&run("push 5\npush 6\neq\nhalt")), 0);
    }

    #[test]
    fn gef_compares_floats() {
        assert_eq!(top_u64(&run("push 2.0\npush 3.0\ngef\nhalt")), 1);
        assert_eq!(top_u64(&run("push 3.0\npush 2.0\ngef\nhalt")), 0);
        assert_eq!(top_u64(&run("push 2.0\npush 2.0\ngef\nhalt")), 1);
    }

    // ==================== Stack manipulation ====================

    #[test]
    fn dup_zero_duplicates_the_top() {
        let lvm = run("push 7\ndup 0\nhalt");
        assert_eq!(lvm.stack().len(), 2);
        assert_eq!(lvm.stack()[0].as_u64(), 7);
        assert_eq!(lvm.stack()[1].as_u64(), 7);
    }

    #[test]
    fn dup_reaches_below_the_top() {
        let lvm = run("push 1\npush 2\ndup 1\nhalt");
        assert_eq!(top_u64(&lvm), 1);
    }

    #[test]
    fn dup_beyond_stack_underflows() {
        assert!(matches!(
            run_expect_err("push 7\ndup 1"),
            ExecError::StackUnderflow
        ));
    }

    #[test]
    fn dup_on_full_stack_overflows() {
        let mut lvm = Lvm::new(Assembler::assemble_source("dup 0\nhalt").unwrap());
        for _ in 0..STACK_CAPACITY {
            lvm.push(Word::from_u64(1)).unwrap();
        }
        assert!(matches!(
            lvm.execute_program(-1),
            Err(ExecError::StackOverflow)
        ));
    }

    #[test]
    fn swap_exchanges_slots() {
        let lvm = run("push 1\npush 2\npush 3\nswap 2\nhalt");
        assert_eq!(lvm.stack()[0].as_u64(), 3);
        assert_eq!(lvm.stack()[2].as_u64(), 1);
    }

    #[test]
    fn swap_beyond_stack_underflows() {
        assert!(matches!(
            run_expect_err("push 1\nswap 1"),
            ExecError::StackUnderflow
        ));
    }

    #[test]
    fn push_onto_full_stack_overflows() {
        let mut lvm = Lvm::new(Assembler::assemble_source("push 1\nhalt").unwrap());
        for _ in 0..STACK_CAPACITY {
            lvm.push(Word::from_u64(0)).unwrap();
        }
        assert!(matches!(
            lvm.execute_program(-1),
            Err(ExecError::StackOverflow)
        ));
    }

    #[test]
    fn drop_removes_the_top() {
        let lvm = run("push 1\npush 2\ndrop\nhalt");
        assert_eq!(lvm.stack().len(), 1);
        assert_eq!(top_u64(&lvm), 1);
    }

    // ==================== Control flow ====================

    #[test]
    fn jmp_if_consumes_flag_on_both_branches() {
        let taken = run("push 1\njmp_if 2\nhalt\nhalt");
        assert!(taken.stack().is_empty());
        let not_taken = run("push 0\njmp_if 3\nhalt\nhalt");
        assert!(not_taken.stack().is_empty());
        assert_eq!(not_taken.pc(), 2);
    }

    #[test]
    fn call_and_ret() {
        // call pushes the return address, the callee rets back to halt.
        let lvm = run("call 2\nhalt\npush 42\nswap 1\nret");
        assert_eq!(top_u64(&lvm), 42);
        assert!(lvm.is_halted());
    }

    #[test]
    fn jmp_out_of_range_fails_on_next_fetch() {
        let err = run_expect_err("jmp 100");
        assert!(matches!(
            err,
            ExecError::IllegalInstAccess { addr: 100, .. }
        ));
    }

    #[test]
    fn running_off_the_end_is_illegal_access() {
        assert!(matches!(
            run_expect_err("nop"),
            ExecError::IllegalInstAccess { addr: 1, .. }
        ));
    }

    #[test]
    fn step_limit_executes_exactly_that_many() {
        let mut lvm = machine("jmp 0");
        lvm.execute_program(3).unwrap();
        assert!(!lvm.is_halted());
        assert_eq!(lvm.pc(), 0);
        lvm.execute_program(0).unwrap();
        assert_eq!(lvm.pc(), 0);
    }

    #[test]
    fn halt_stops_the_loop() {
        let mut lvm = machine("push 1\nhalt\npush 2");
        lvm.execute_program(-1).unwrap();
        assert!(lvm.is_halted());
        assert_eq!(lvm.stack().len(), 1);
    }

    // ==================== Memory ====================

    #[test]
    fn write_then_read_round_trips() {
        let lvm = run("push 100\npush 123456789\nwrite64\npush 100\nread64\nhalt");
        assert_eq!(top_u64(&lvm), 123456789);
    }

    #[test]
    fn narrow_writes_truncate() {
        let lvm = run("push 0\npush 511\nwrite8\npush 0\nread8\nhalt");
        assert_eq!(top_u64(&lvm), 255);
    }

    #[test]
    fn narrow_reads_widen_zero_extended() {
        let lvm = run("push 0\npush 65535\nwrite16\npush 0\nread32\nhalt");
        assert_eq!(top_u64(&lvm), 65535);
    }

    #[test]
    fn write_at_the_edge_of_memory() {
        let at_edge = format!("push {}\npush 1\nwrite64\nhalt", MEMORY_CAPACITY - 8);
        run(&at_edge);

        let past_edge = format!("push {}\npush 1\nwrite64", MEMORY_CAPACITY - 4);
        assert!(matches!(
            run_expect_err(&past_edge),
            ExecError::IllegalMemoryAccess { width: 8, .. }
        ));
    }

    #[test]
    fn read_past_memory_fails() {
        let source = format!("push {MEMORY_CAPACITY}\nread8");
        assert!(matches!(
            run_expect_err(&source),
            ExecError::IllegalMemoryAccess { width: 1, .. }
        ));
    }

    #[test]
    fn memory_starts_zeroed() {
        let lvm = run("push 639000\nread64\nhalt");
        assert_eq!(top_u64(&lvm), 0);
    }

    // ==================== Natives ====================

    fn native_double_top(lvm: &mut Lvm) -> Result<(), ExecError> {
        let word = lvm.pop()?;
        lvm.push(Word::from_u64(word.as_u64().wrapping_mul(2)))
    }

    #[test]
    fn native_dispatch_runs_the_callback() {
        let mut lvm = machine("push 21\nnative 0\nhalt");
        lvm.push_native(native_double_top);
        lvm.execute_program(-1).unwrap();
        assert_eq!(top_u64(&lvm), 42);
    }

    #[test]
    fn native_index_at_table_size_is_illegal_operand() {
        let mut lvm = machine("native 1");
        lvm.push_native(native_double_top);
        assert!(matches!(
            lvm.execute_program(-1),
            Err(ExecError::IllegalOperand {
                index: 1,
                registered: 1
            })
        ));
    }

    #[test]
    fn native_errors_propagate() {
        let mut lvm = machine("native 0");
        lvm.push_native(|lvm| lvm.pop().map(|_| ()));
        assert!(matches!(
            lvm.execute_program(-1),
            Err(ExecError::StackUnderflow)
        ));
    }

    #[test]
    fn natives_may_touch_memory_directly() {
        let mut lvm = machine("native 0\npush 0\nread8\nhalt");
        lvm.push_native(|lvm| {
            lvm.memory_mut()[0] = 7;
            Ok(())
        });
        lvm.execute_program(-1).unwrap();
        assert_eq!(top_u64(&lvm), 7);
    }

    // ==================== Errors leave state consistent ====================

    #[test]
    fn failed_write_consumes_nothing() {
        let source = format!("push {MEMORY_CAPACITY}\npush 1\nwrite64");
        let mut lvm = machine(&source);
        let err = lvm.execute_program(-1).expect_err("expected error");
        assert!(matches!(err, ExecError::IllegalMemoryAccess { .. }));
        // Both operands are still on the stack and pc points at the write.
        assert_eq!(lvm.stack().len(), 2);
        assert_eq!(lvm.pc(), 2);
    }

    #[test]
    fn illegal_instruction_from_crafted_binary() {
        let mut record = [0u8; crate::vm::program::INST_RECORD_SIZE];
        record[0] = 0xEE;
        let err = Program::from_bytes(&record).unwrap_err();
        assert!(matches!(
            err,
            crate::vm::errors::ProgramError::Inst(ExecError::IllegalInst { opcode: 0xEE })
        ));
    }

    #[test]
    fn dump_stack_renders_interpretations() {
        let mut lvm = Lvm::new(Program::new());
        lvm.push(Word::from_i64(-1)).unwrap();
        let mut out = Vec::new();
        lvm.dump_stack(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Stack:\n"));
        assert!(text.contains("i64: -1"));
    }

    #[test]
    fn dump_stack_empty() {
        let lvm = Lvm::new(Program::new());
        let mut out = Vec::new();
        lvm.dump_stack(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("[empty]"));
    }

    #[test]
    fn execute_instruction_moves_one_step() {
        let mut lvm = Lvm::new(Program::new());
        // Empty program: the very first fetch is already out of bounds.
        assert!(matches!(
            lvm.execute_instruction(),
            Err(ExecError::IllegalInstAccess {
                addr: 0,
                program_size: 0
            })
        ));
    }
}
