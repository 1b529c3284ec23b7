//! The VM's universal value representation.

use std::fmt;

/// An 8-byte storage cell with four overlapping interpretations: unsigned
/// integer, signed integer, IEEE-754 double, and an opaque address-sized
/// handle.
///
/// There is no discriminant tag; the opcode that reads or writes a [`Word`]
/// alone determines which interpretation applies. All four interpretations
/// share the same 8-byte bit pattern, so stack slots and memory transfers of
/// differing widths stay bit-compatible.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Word(u64);

impl Word {
    /// The all-zeroes word, identical under every interpretation.
    pub const ZERO: Word = Word(0);

    /// Constructs a word from its unsigned interpretation.
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Constructs a word from its signed interpretation.
    pub const fn from_i64(value: i64) -> Self {
        Self(value as u64)
    }

    /// Constructs a word from its float interpretation.
    pub fn from_f64(value: f64) -> Self {
        Self(value.to_bits())
    }

    /// Reads the word as an unsigned 64-bit integer.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Reads the word as a signed 64-bit integer.
    pub const fn as_i64(self) -> i64 {
        self.0 as i64
    }

    /// Reads the word as a 64-bit IEEE-754 float.
    pub fn as_f64(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// Reads the word as an opaque address-sized handle.
    pub const fn as_handle(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#018x})", self.0)
    }
}

/// Renders all four interpretations, used by stack dumps and `print_debug`.
impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "u64: {}, i64: {}, f64: {}, handle: {:#x}",
            self.as_u64(),
            self.as_i64(),
            self.as_f64(),
            self.as_handle()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpretations_share_bits() {
        let w = Word::from_f64(3.5);
        assert_eq!(w.as_u64(), 3.5f64.to_bits());
        assert_eq!(Word::from_u64(w.as_u64()), w);
    }

    #[test]
    fn signed_round_trip() {
        let w = Word::from_i64(-1);
        assert_eq!(w.as_i64(), -1);
        assert_eq!(w.as_u64(), u64::MAX);
    }

    #[test]
    fn word_is_eight_bytes() {
        assert_eq!(std::mem::size_of::<Word>(), 8);
    }
}
