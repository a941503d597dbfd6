//! PSTATE condition flags.
//!
//! The four NZCV bits are the only PSTATE state the core models. They are
//! produced by the flag-setting arithmetic/logical forms (ADDS, SUBS, ANDS)
//! and consumed by conditional branches via the full ARM condition table.

use std::fmt;

use crate::isa::Cond;

/// N/Z/C/V condition flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pstate {
    /// Negative: bit 63 (or 31) of the last flag-setting result.
    pub n: bool,
    /// Zero: the last flag-setting result was zero.
    pub z: bool,
    /// Carry: unsigned overflow on ADDS, NOT borrow on SUBS.
    pub c: bool,
    /// Overflow: signed overflow of the last flag-setting operation.
    pub v: bool,
}

impl Pstate {
    /// Evaluates a condition code against the current flags.
    ///
    /// This is the full architectural table; both `AL` (0b1110) and the
    /// reserved `NV` slot (0b1111) evaluate true.
    pub fn condition_holds(self, cond: Cond) -> bool {
        let bits = cond.bits();
        let result = match bits >> 1 {
            0b000 => self.z,
            0b001 => self.c,
            0b010 => self.n,
            0b011 => self.v,
            0b100 => self.c && !self.z,
            0b101 => self.n == self.v,
            0b110 => !self.z && self.n == self.v,
            _ => true,
        };
        // The low bit inverts the base condition, except for the AL/NV pair.
        if bits & 1 == 1 && bits != 0b1111 {
            !result
        } else {
            result
        }
    }
}

impl fmt::Display for Pstate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nzcv={}{}{}{}",
            u8::from(self.n),
            u8::from(self.z),
            u8::from(self.c),
            u8::from(self.v)
        )
    }
}
