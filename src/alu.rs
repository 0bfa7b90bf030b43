use std::cmp::Ordering;

use crate::flags::CpuFlags;

/// Register arithmetic. All results stay 8-bit: add, subtract and multiply
/// wrap, shifts are logical and a shift of 8 or more clears the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Not,
    Inc,
    Dec,
}

impl AluOp {
    /// Unary operations ignore `b`.
    pub fn is_unary(self) -> bool {
        matches!(self, AluOp::Not | AluOp::Inc | AluOp::Dec)
    }

    /// Returns `None` for division or modulo by zero.
    pub fn apply(self, a: u8, b: u8) -> Option<u8> {
        let result = match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Sub => a.wrapping_sub(b),
            AluOp::Mul => a.wrapping_mul(b),
            AluOp::Div => a.checked_div(b)?,
            AluOp::Mod => a.checked_rem(b)?,
            AluOp::And => a & b,
            AluOp::Or => a | b,
            AluOp::Xor => a ^ b,
            AluOp::Shl => a.checked_shl(b as u32).unwrap_or(0),
            AluOp::Shr => a.checked_shr(b as u32).unwrap_or(0),
            AluOp::Not => !a,
            AluOp::Inc => a.wrapping_add(1),
            AluOp::Dec => a.wrapping_sub(1),
        };
        Some(result)
    }
}

pub fn compare(a: u8, b: u8) -> CpuFlags {
    match a.cmp(&b) {
        Ordering::Less => CpuFlags::LESS,
        Ordering::Greater => CpuFlags::GREATER,
        Ordering::Equal => CpuFlags::EQUAL,
    }
}
