//! Assembly language parser and bytecode compiler.
//!
//! Converts human-readable assembly source into an executable [`Program`].
//! Uses [`for_each_instruction!`](crate::for_each_instruction) to generate
//! the mnemonic lookup table, so the assembler can never drift from the ISA.
//!
//! # Syntax
//!
//! ```text
//! label: instruction operand   ; comment
//! %label name literal
//! %include "path"
//! ```
//!
//! - One instruction per line, mnemonics are lowercase
//! - `name:` binds a label to the address of the next emitted instruction
//! - Operands are unsigned integers (`42`), floats (`2.5`, `-1`), or label
//!   names resolved in the second pass
//! - `;` starts a comment, blank lines are ignored
//! - Preprocessor lines start with `%`
//!
//! Assembly is two passes. The first pass tokenizes every line, emits
//! instructions, binds labels, and records operands it cannot resolve yet.
//! The second pass runs once, after all includes have been processed, and
//! patches every deferred operand. This lets a file reference labels defined
//! later in the same file or in a sibling include.

use crate::for_each_instruction;
use crate::vm::errors::AsmError;
use crate::vm::isa::OpCode;
use crate::vm::program::{Instruction, PROGRAM_CAPACITY, Program};
use crate::vm::word::Word;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const COMMENT_CHAR: char = ';';
const LABEL_SUFFIX: char = ':';
const DIRECTIVE_PREFIX: char = '%';

/// Maximum `%include` nesting depth before translation is aborted.
pub const MAX_INCLUDE_LEVEL: usize = 64;

macro_rules! define_mnemonic_lookup {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $tag:expr, $mnemonic:literal, operand = $has_operand:literal
        ),* $(,)?
    ) => {
        /// Resolves an assembly mnemonic to its opcode. Case-sensitive.
        fn opcode_from_mnemonic(name: &str) -> Option<OpCode> {
            match name {
                $( $mnemonic => Some(OpCode::$name), )*
                _ => None,
            }
        }
    };
}

for_each_instruction!(define_mnemonic_lookup);

/// An operand that named a label not yet bound during the first pass.
struct DeferredOperand {
    /// Address of the instruction whose operand needs patching.
    addr: u64,
    label: String,
    /// Source location of the reference, for the error when it never binds.
    file: String,
    line: usize,
}

/// Translation state shared across the whole unit, includes and all.
///
/// There is a single label namespace and a single deferred-operand list no
/// matter how many files participate, so a label defined in one include can
/// be referenced from any other.
pub struct Assembler {
    labels: HashMap<String, Word>,
    deferred: Vec<DeferredOperand>,
    include_level: usize,
}

impl Assembler {
    fn new() -> Self {
        Self {
            labels: HashMap::new(),
            deferred: Vec::new(),
            include_level: 0,
        }
    }

    /// Assembles the source file at `path` into a program.
    ///
    /// Any error aborts the whole translation; no partial program is ever
    /// returned.
    pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<Program, AsmError> {
        let mut asm = Self::new();
        let mut program = Program::new();
        asm.first_pass_file(path.as_ref(), &mut program)?;
        asm.second_pass(&mut program)?;
        Ok(program)
    }

    /// Assembles a source string directly, reporting errors against the
    /// pseudo-file `<source>`. `%include` paths resolve relative to the
    /// current directory.
    pub fn assemble_source(source: &str) -> Result<Program, AsmError> {
        let mut asm = Self::new();
        let mut program = Program::new();
        asm.first_pass_source(source, "<source>", Path::new("."), &mut program)?;
        asm.second_pass(&mut program)?;
        Ok(program)
    }

    fn first_pass_file(&mut self, path: &Path, program: &mut Program) -> Result<(), AsmError> {
        let source = fs::read_to_string(path).map_err(|source| AsmError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        self.first_pass_source(&source, &path.display().to_string(), dir, program)
    }

    /// First pass over one translation unit: tokenize, emit, bind labels,
    /// record deferred operands, recurse into includes.
    ///
    /// `file` is the name used in diagnostics; `dir` is the directory
    /// relative to which `%include` paths resolve.
    fn first_pass_source(
        &mut self,
        source: &str,
        file: &str,
        dir: &Path,
        program: &mut Program,
    ) -> Result<(), AsmError> {
        for (line_no, raw_line) in source.lines().enumerate() {
            let line_no = line_no + 1;
            let line = raw_line
                .split(COMMENT_CHAR)
                .next()
                .unwrap_or("")
                .trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with(DIRECTIVE_PREFIX) {
                self.process_directive(line, file, line_no, dir, program)?;
                continue;
            }

            let mut tokens = line.split_whitespace();
            let mut head = tokens.next().unwrap_or("");

            // A label binds to the address of the next emitted instruction;
            // the rest of the line may still hold one.
            if let Some(name) = head.strip_suffix(LABEL_SUFFIX) {
                self.bind_label(name, Word::from_u64(program.len() as u64), file, line_no)?;
                match tokens.next() {
                    Some(next) => head = next,
                    None => continue,
                }
            }

            let kind = opcode_from_mnemonic(head).ok_or_else(|| AsmError::UnknownInstruction {
                file: file.to_string(),
                line: line_no,
                name: head.to_string(),
            })?;

            let operand_token = tokens.next();
            let operand = match (kind.has_operand(), operand_token) {
                (true, Some(token)) => self.parse_operand(token, program.len() as u64, file, line_no),
                (true, None) => {
                    return Err(AsmError::MissingOperand {
                        file: file.to_string(),
                        line: line_no,
                        name: head.to_string(),
                    });
                }
                (false, Some(_)) => {
                    return Err(AsmError::UnexpectedOperand {
                        file: file.to_string(),
                        line: line_no,
                        name: head.to_string(),
                    });
                }
                (false, None) => Word::ZERO,
            };

            if tokens.next().is_some() {
                return Err(AsmError::UnexpectedOperand {
                    file: file.to_string(),
                    line: line_no,
                    name: head.to_string(),
                });
            }

            program
                .push(Instruction::with_operand(kind, operand))
                .map_err(|_| AsmError::ProgramTooLarge {
                    file: file.to_string(),
                    line: line_no,
                    capacity: PROGRAM_CAPACITY,
                })?;
        }

        Ok(())
    }

    /// Parses an instruction operand: unsigned integer, then float, then a
    /// label reference deferred to the second pass.
    ///
    /// Negative literals such as `-5` fail the unsigned parse and land in
    /// the float interpretation.
    fn parse_operand(&mut self, token: &str, addr: u64, file: &str, line: usize) -> Word {
        if let Ok(value) = token.parse::<u64>() {
            return Word::from_u64(value);
        }
        if let Ok(value) = token.parse::<f64>() {
            return Word::from_f64(value);
        }
        self.deferred.push(DeferredOperand {
            addr,
            label: token.to_string(),
            file: file.to_string(),
            line,
        });
        Word::ZERO
    }

    fn process_directive(
        &mut self,
        line: &str,
        file: &str,
        line_no: usize,
        dir: &Path,
        program: &mut Program,
    ) -> Result<(), AsmError> {
        let body = &line[DIRECTIVE_PREFIX.len_utf8()..];
        let mut tokens = body.split_whitespace();
        let directive = tokens.next().unwrap_or("");

        match directive {
            "label" => {
                let name = tokens.next().ok_or_else(|| AsmError::MissingDirectiveArg {
                    file: file.to_string(),
                    line: line_no,
                    directive: directive.to_string(),
                })?;
                let literal = tokens.next().ok_or_else(|| AsmError::MissingDirectiveArg {
                    file: file.to_string(),
                    line: line_no,
                    directive: directive.to_string(),
                })?;
                let word = parse_literal(literal).ok_or_else(|| AsmError::BadLiteral {
                    file: file.to_string(),
                    line: line_no,
                    literal: literal.to_string(),
                })?;
                self.bind_label(name, word, file, line_no)
            }
            "include" => {
                // The path is everything after the directive token, quoted,
                // so it may contain spaces.
                let arg = body.trim_start()["include".len()..].trim();
                let target = arg
                    .strip_prefix('"')
                    .and_then(|rest| rest.strip_suffix('"'))
                    .filter(|inner| !inner.contains('"'))
                    .ok_or(AsmError::MalformedInclude {
                        file: file.to_string(),
                        line: line_no,
                    })?;

                if self.include_level >= MAX_INCLUDE_LEVEL {
                    return Err(AsmError::IncludeDepthExceeded {
                        file: file.to_string(),
                        line: line_no,
                        max: MAX_INCLUDE_LEVEL,
                    });
                }
                self.include_level += 1;
                let result = self.first_pass_file(&dir.join(target), program);
                self.include_level -= 1;
                result
            }
            _ => Err(AsmError::UnknownDirective {
                file: file.to_string(),
                line: line_no,
                directive: directive.to_string(),
            }),
        }
    }

    fn bind_label(
        &mut self,
        name: &str,
        word: Word,
        file: &str,
        line: usize,
    ) -> Result<(), AsmError> {
        if self.labels.contains_key(name) {
            return Err(AsmError::DuplicateLabel {
                file: file.to_string(),
                line,
                label: name.to_string(),
            });
        }
        self.labels.insert(name.to_string(), word);
        Ok(())
    }

    /// Second pass: patch every deferred operand with its label's word.
    ///
    /// Runs exactly once at top level, after all includes, so forward
    /// references across file boundaries resolve like local ones.
    fn second_pass(&mut self, program: &mut Program) -> Result<(), AsmError> {
        for deferred in self.deferred.drain(..) {
            let word = self
                .labels
                .get(&deferred.label)
                .copied()
                .ok_or(AsmError::UnresolvedLabel {
                    file: deferred.file,
                    line: deferred.line,
                    label: deferred.label,
                })?;
            program.patch_operand(deferred.addr, word);
        }
        Ok(())
    }
}

/// Parses a standalone number literal: unsigned integer first, float second.
fn parse_literal(token: &str) -> Option<Word> {
    if let Ok(value) = token.parse::<u64>() {
        return Some(Word::from_u64(value));
    }
    token.parse::<f64>().ok().map(Word::from_f64)
}
