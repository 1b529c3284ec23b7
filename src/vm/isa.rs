//! Instruction Set Architecture (ISA) definitions.
//!
//! Defines the VM's instruction set. The [`for_each_instruction!`](crate::for_each_instruction)
//! macro holds the canonical instruction definitions and invokes a callback
//! macro for code generation. This enables multiple modules to generate
//! instruction-related code without duplicating definitions.
//!
//! This module generates:
//! - The [`OpCode`] enum with wire-stable tag values
//! - `TryFrom<u8>` for decoding tags from a binary program
//! - The static per-opcode mnemonic and operand table shared by the
//!   execution engine, the assembler, and the disassembler
//!
//! See [`assembler`](super::assembler) for mnemonic lookup generation.

use crate::vm::errors::ExecError;

/// Invokes a callback macro with the complete instruction definition list.
///
/// Tag values are part of the binary program format and must never be
/// reordered or reused. `operand` marks whether the instruction carries a
/// meaningful [`Word`](crate::vm::word::Word) operand; this is a static
/// property of the opcode, never of runtime state.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            /// nop ; advances pc, no other effect
            Nop = 0x00, "nop", operand = false,
            /// push <word> ; appends the operand to the stack
            Push = 0x01, "push", operand = true,
            /// drop ; removes the top slot
            Drop = 0x02, "drop", operand = false,
            /// dup <n> ; duplicates the slot n positions below the top
            Dup = 0x03, "dup", operand = true,
            /// swap <n> ; exchanges the top slot with the slot n below it
            Swap = 0x04, "swap", operand = true,
            /// plusi ; unsigned integer addition, pops 2 pushes 1
            PlusI = 0x05, "plusi", operand = false,
            /// minusi ; unsigned integer subtraction
            MinusI = 0x06, "minusi", operand = false,
            /// multi ; unsigned integer multiplication
            MultI = 0x07, "multi", operand = false,
            /// divi ; unsigned integer division, errors on zero divisor
            DivI = 0x08, "divi", operand = false,
            /// plusf ; float addition
            PlusF = 0x09, "plusf", operand = false,
            /// minusf ; float subtraction
            MinusF = 0x0A, "minusf", operand = false,
            /// multf ; float multiplication
            MultF = 0x0B, "multf", operand = false,
            /// divf ; float division, IEEE semantics on zero divisor
            DivF = 0x0C, "divf", operand = false,
            /// jmp <addr> ; unconditional jump, unchecked until the next fetch
            Jmp = 0x0D, "jmp", operand = true,
            /// jmp_if <addr> ; pops a flag, jumps when it is nonzero
            JmpIf = 0x0E, "jmp_if", operand = true,
            /// eq ; unsigned equality of the top two, pushes boolean-as-u64
            Eq = 0x0F, "eq", operand = false,
            /// ret ; pops the return address into pc
            Ret = 0x10, "ret", operand = false,
            /// call <addr> ; pushes pc + 1, then jumps
            Call = 0x11, "call", operand = true,
            /// native <idx> ; invokes the registered native at idx
            Native = 0x12, "native", operand = true,
            /// halt ; sets the halt flag
            Halt = 0x13, "halt", operand = false,
            /// not ; boolean negation of the unsigned interpretation
            Not = 0x14, "not", operand = false,
            /// gef ; float >= comparison of the top two
            Gef = 0x15, "gef", operand = false,
            /// andb ; bitwise and
            AndB = 0x16, "andb", operand = false,
            /// orb ; bitwise or
            OrB = 0x17, "orb", operand = false,
            /// xor ; bitwise xor
            Xor = 0x18, "xor", operand = false,
            /// shr ; logical shift right
            Shr = 0x19, "shr", operand = false,
            /// shl ; shift left
            Shl = 0x1A, "shl", operand = false,
            /// notb ; bitwise complement, one slot in, one out
            NotB = 0x1B, "notb", operand = false,
            /// read8 ; pops an address, pushes the byte at it widened to u64
            Read8 = 0x1C, "read8", operand = false,
            /// read16 ; pops an address, pushes 2 bytes widened to u64
            Read16 = 0x1D, "read16", operand = false,
            /// read32 ; pops an address, pushes 4 bytes widened to u64
            Read32 = 0x1E, "read32", operand = false,
            /// read64 ; pops an address, pushes 8 bytes
            Read64 = 0x1F, "read64", operand = false,
            /// write8 ; pops address then value, stores the low byte
            Write8 = 0x20, "write8", operand = false,
            /// write16 ; pops address then value, stores the low 2 bytes
            Write16 = 0x21, "write16", operand = false,
            /// write32 ; pops address then value, stores the low 4 bytes
            Write32 = 0x22, "write32", operand = false,
            /// write64 ; pops address then value, stores all 8 bytes
            Write64 = 0x23, "write64", operand = false,
            /// print_debug ; pops a slot and prints its four interpretations
            PrintDebug = 0x24, "print_debug", operand = false,
        }
    };
}

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $tag:expr, $mnemonic:literal, operand = $has_operand:literal
        ),* $(,)?
    ) => {
        /// Operation code of a single VM instruction.
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        #[repr(u8)]
        pub enum OpCode {
            $(
                $(#[$doc])*
                $name = $tag,
            )*
        }

        impl TryFrom<u8> for OpCode {
            type Error = ExecError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $tag => Ok(OpCode::$name), )*
                    _ => Err(ExecError::IllegalInst { opcode: value }),
                }
            }
        }

        impl OpCode {
            /// Returns the assembly mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( OpCode::$name => $mnemonic, )*
                }
            }

            /// Whether this opcode carries a meaningful operand.
            pub const fn has_operand(&self) -> bool {
                match self {
                    $( OpCode::$name => $has_operand, )*
                }
            }
        }
    };
}

for_each_instruction!(define_opcodes);
