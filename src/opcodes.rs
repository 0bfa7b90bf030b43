use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::alu::AluOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Hlt,
    Nop,
    Ldi,
    Ld,
    St,
    Prn,
    Pra,
    Alu(AluOp),
    Addi,
    Cmp,
    Jmp,
    Jeq,
    Jne,
    Jgt,
    Jlt,
    Jge,
    Jle,
    Push,
    Pop,
    Call,
    Ret,
}

pub struct OpCode {
    pub code: u8,
    pub mnemonic: &'static str,
    pub len: u8,
    pub instruction: Instruction,
}

impl OpCode {
    fn new(code: u8, mnemonic: &'static str, len: u8, instruction: Instruction) -> Self {
        OpCode {
            code: code,
            mnemonic: mnemonic,
            len: len,
            instruction: instruction,
        }
    }

    pub fn operand_count(&self) -> u8 {
        self.len - 1
    }
}

// Opcode layout: AABCDDDD
//   AA   operand count
//   B    handled by the ALU
//   C    sets the program counter
//   DDDD instruction id
pub static CPU_OPS_CODES: Lazy<Vec<OpCode>> = Lazy::new(|| {
    vec![
        OpCode::new(0b0000_0000, "NOP", 1, Instruction::Nop),
        OpCode::new(0b0000_0001, "HLT", 1, Instruction::Hlt),
        OpCode::new(0b0001_0001, "RET", 1, Instruction::Ret),
        OpCode::new(0b0100_0101, "PUSH", 2, Instruction::Push),
        OpCode::new(0b0100_0110, "POP", 2, Instruction::Pop),
        OpCode::new(0b0100_0111, "PRN", 2, Instruction::Prn),
        OpCode::new(0b0100_1000, "PRA", 2, Instruction::Pra),
        OpCode::new(0b0101_0000, "CALL", 2, Instruction::Call),
        OpCode::new(0b0101_0100, "JMP", 2, Instruction::Jmp),
        OpCode::new(0b0101_0101, "JEQ", 2, Instruction::Jeq),
        OpCode::new(0b0101_0110, "JNE", 2, Instruction::Jne),
        OpCode::new(0b0101_0111, "JGT", 2, Instruction::Jgt),
        OpCode::new(0b0101_1000, "JLT", 2, Instruction::Jlt),
        OpCode::new(0b0101_1001, "JLE", 2, Instruction::Jle),
        OpCode::new(0b0101_1010, "JGE", 2, Instruction::Jge),
        OpCode::new(0b0110_0101, "INC", 2, Instruction::Alu(AluOp::Inc)),
        OpCode::new(0b0110_0110, "DEC", 2, Instruction::Alu(AluOp::Dec)),
        OpCode::new(0b0110_1001, "NOT", 2, Instruction::Alu(AluOp::Not)),
        OpCode::new(0b1000_0010, "LDI", 3, Instruction::Ldi),
        OpCode::new(0b1000_0011, "LD", 3, Instruction::Ld),
        OpCode::new(0b1000_0100, "ST", 3, Instruction::St),
        OpCode::new(0b1010_0000, "ADD", 3, Instruction::Alu(AluOp::Add)),
        OpCode::new(0b1010_0001, "SUB", 3, Instruction::Alu(AluOp::Sub)),
        OpCode::new(0b1010_0010, "MUL", 3, Instruction::Alu(AluOp::Mul)),
        OpCode::new(0b1010_0011, "DIV", 3, Instruction::Alu(AluOp::Div)),
        OpCode::new(0b1010_0100, "MOD", 3, Instruction::Alu(AluOp::Mod)),
        OpCode::new(0b1010_0111, "CMP", 3, Instruction::Cmp),
        OpCode::new(0b1010_1000, "AND", 3, Instruction::Alu(AluOp::And)),
        OpCode::new(0b1010_1010, "OR", 3, Instruction::Alu(AluOp::Or)),
        OpCode::new(0b1010_1011, "XOR", 3, Instruction::Alu(AluOp::Xor)),
        OpCode::new(0b1010_1100, "SHL", 3, Instruction::Alu(AluOp::Shl)),
        OpCode::new(0b1010_1101, "SHR", 3, Instruction::Alu(AluOp::Shr)),
        OpCode::new(0b1010_1110, "ADDI", 3, Instruction::Addi),
    ]
});

pub static OPCODES_MAP: Lazy<HashMap<u8, &'static OpCode>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for cpuop in CPU_OPS_CODES.iter() {
        map.insert(cpuop.code, cpuop);
    }
    map
});

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        assert_eq!(OPCODES_MAP.len(), CPU_OPS_CODES.len());
    }

    #[test]
    fn test_width_matches_encoded_operand_count() {
        for op in CPU_OPS_CODES.iter() {
            assert_eq!(op.operand_count(), op.code >> 6, "{}", op.mnemonic);
        }
    }

    #[test]
    fn test_alu_and_pc_bits() {
        for op in CPU_OPS_CODES.iter() {
            let alu = matches!(
                op.instruction,
                Instruction::Alu(_) | Instruction::Cmp | Instruction::Addi
            );
            let sets_pc = matches!(
                op.instruction,
                Instruction::Jmp
                    | Instruction::Jeq
                    | Instruction::Jne
                    | Instruction::Jgt
                    | Instruction::Jlt
                    | Instruction::Jge
                    | Instruction::Jle
                    | Instruction::Call
                    | Instruction::Ret
            );
            assert_eq!(op.code & 0b0010_0000 != 0, alu, "{}", op.mnemonic);
            assert_eq!(op.code & 0b0001_0000 != 0, sets_pc, "{}", op.mnemonic);
        }
    }

    #[test]
    fn test_lookup() {
        let ldi = OPCODES_MAP.get(&0b1000_0010).unwrap();
        assert_eq!(ldi.mnemonic, "LDI");
        assert_eq!(ldi.instruction, Instruction::Ldi);
        assert!(OPCODES_MAP.get(&0b1111_1111).is_none());
    }
}
