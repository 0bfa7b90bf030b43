use crate::alu::{self, AluOp};
use crate::error::{CpuError, Target};
use crate::flags::CpuFlags;
use crate::memory::Memory;
use crate::opcodes::{Instruction, OpCode, OPCODES_MAP};

pub const REGISTER_COUNT: usize = 8;
/// R5 holds the L/G/E condition code.
pub const FLAGS: usize = 5;
/// R7 is the stack pointer.
pub const SP: usize = 7;
pub const STACK_START: u8 = 0xF4;

/// Values emitted by the print instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// PRN: the register value as a decimal number.
    Number(u8),
    /// PRA: the register value as an ASCII character.
    Char(u8),
}

/// What happens to the program counter after an instruction.
enum Flow {
    Next,
    Jump(u8),
    Halt,
}

pub trait Mem {
    fn mem_read(&self, addr: u16) -> Result<u8, CpuError>;

    fn mem_write(&mut self, addr: u16, data: u8) -> Result<(), CpuError>;
}

impl Mem for CPU<'_> {
    fn mem_read(&self, addr: u16) -> Result<u8, CpuError> {
        self.memory.read(addr).ok_or(CpuError::OutOfRange {
            target: Target::Address(addr),
            address: self.program_counter,
        })
    }

    fn mem_write(&mut self, addr: u16, data: u8) -> Result<(), CpuError> {
        self.memory.write(addr, data).ok_or(CpuError::OutOfRange {
            target: Target::Address(addr),
            address: self.program_counter,
        })
    }
}

pub struct CPU<'call> {
    pub registers: [u8; REGISTER_COUNT],
    pub program_counter: u16,
    pub running: bool,
    pub memory: Memory,
    /// Address of the instruction that stopped the machine with a fault.
    fault: Option<u16>,
    output: Box<dyn FnMut(Output) + 'call>,
}

impl CPU<'static> {
    /// A machine that prints PRN values one per line and PRA characters
    /// as-is on stdout.
    pub fn new() -> Self {
        CPU::with_output(|output| match output {
            Output::Number(value) => println!("{}", value),
            Output::Char(value) => print!("{}", value as char),
        })
    }
}

impl Default for CPU<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'call> CPU<'call> {
    pub fn with_output<F>(output: F) -> Self
    where
        F: FnMut(Output) + 'call,
    {
        let mut registers = [0; REGISTER_COUNT];
        registers[SP] = STACK_START;
        CPU {
            registers: registers,
            program_counter: 0,
            running: true,
            memory: Memory::new(),
            fault: None,
            output: Box::new(output),
        }
    }

    /// Restores power-on register state. Memory is left untouched.
    pub fn reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
        self.registers[SP] = STACK_START;
        self.program_counter = 0;
        self.running = true;
        self.fault = None;
    }

    pub fn load(&mut self, program: &[u8]) -> Result<(), CpuError> {
        self.load_at(program, 0)
    }

    pub fn load_at(&mut self, program: &[u8], origin: u16) -> Result<(), CpuError> {
        self.memory.place(program, origin)?;
        log::debug!("placed {} words at {:#04x}", program.len(), origin);
        Ok(())
    }

    pub fn stack_pointer(&self) -> u8 {
        self.registers[SP]
    }

    /// Set once a fault (or an exhausted step limit) has halted the machine.
    pub fn fault_address(&self) -> Option<u16> {
        self.fault
    }

    pub fn flags(&self) -> CpuFlags {
        CpuFlags::from_register(self.registers[FLAGS])
    }

    pub fn run(&mut self) -> Result<(), CpuError> {
        self.run_with_callback(|_| {})
    }

    /// Runs until halted, calling `callback` before each fetch.
    pub fn run_with_callback<F>(&mut self, callback: F) -> Result<(), CpuError>
    where
        F: FnMut(&mut CPU<'call>),
    {
        self.run_bounded(None, callback)
    }

    /// Like `run`, but gives up with `Timeout` after `limit` instructions.
    pub fn run_with_limit(&mut self, limit: u64) -> Result<(), CpuError> {
        self.run_bounded(Some(limit), |_| {})
    }

    pub fn run_bounded<F>(&mut self, limit: Option<u64>, mut callback: F) -> Result<(), CpuError>
    where
        F: FnMut(&mut CPU<'call>),
    {
        self.check_fault()?;
        let mut steps = 0;
        while self.running {
            if limit == Some(steps) {
                self.running = false;
                self.fault = Some(self.program_counter);
                return Err(CpuError::Timeout {
                    limit: steps,
                    address: self.program_counter,
                });
            }
            callback(self);
            self.step()?;
            steps += 1;
        }
        Ok(())
    }

    /// Executes one instruction. Any fault halts the machine.
    pub fn step(&mut self) -> Result<(), CpuError> {
        self.check_fault()?;
        if !self.running {
            return Ok(());
        }
        let result = self.execute();
        if let Err(ref err) = result {
            self.running = false;
            self.fault = Some(self.program_counter);
            log::debug!("halted on fault: {}", err);
        }
        result
    }

    fn check_fault(&self) -> Result<(), CpuError> {
        match self.fault {
            Some(address) => Err(CpuError::Faulted { address: address }),
            None => Ok(()),
        }
    }

    /// `TRACE: PC | op a b | R0 .. R7`, all in hex.
    pub fn trace(&self) -> String {
        let pc = self.program_counter;
        let peek = |offset: u16| self.memory.read(pc + offset).unwrap_or_default();

        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            pc,
            peek(0),
            peek(1),
            peek(2)
        );
        let registers: Vec<String> = self
            .registers
            .iter()
            .map(|value| format!("{:02X}", value))
            .collect();
        line.push(' ');
        line.push_str(&registers.join(" "));
        line
    }

    fn execute(&mut self) -> Result<(), CpuError> {
        let address = self.program_counter;
        let code = self.mem_read(address)?;
        let opcode: &OpCode = OPCODES_MAP
            .get(&code)
            .copied()
            .ok_or(CpuError::InvalidOpcode {
                opcode: code,
                address: address,
            })?;

        // Only declared operand bytes are fetched; the rest stay zero and
        // are never interpreted.
        let mut operands = [0u8; 2];
        for (i, operand) in operands
            .iter_mut()
            .take(opcode.operand_count() as usize)
            .enumerate()
        {
            *operand = self.mem_read(address + 1 + i as u16)?;
        }
        let [a, b] = operands;

        log::trace!("{:02X}: {} {:02X} {:02X}", address, opcode.mnemonic, a, b);

        let flow = match opcode.instruction {
            Instruction::Hlt => Flow::Halt,
            Instruction::Nop => Flow::Next,
            Instruction::Ldi => self.ldi(a, b)?,
            Instruction::Ld => self.ld(a, b)?,
            Instruction::St => self.st(a, b)?,
            Instruction::Prn => self.prn(a)?,
            Instruction::Pra => self.pra(a)?,
            Instruction::Alu(op) => self.alu(op, a, b)?,
            Instruction::Addi => self.addi(a, b)?,
            Instruction::Cmp => self.cmp(a, b)?,
            Instruction::Jmp => self.jump_if(true, a)?,
            Instruction::Jeq => self.jump_if(self.flags().contains(CpuFlags::EQUAL), a)?,
            Instruction::Jne => self.jump_if(!self.flags().contains(CpuFlags::EQUAL), a)?,
            Instruction::Jgt => self.jump_if(self.flags().contains(CpuFlags::GREATER), a)?,
            Instruction::Jlt => self.jump_if(self.flags().contains(CpuFlags::LESS), a)?,
            Instruction::Jge => {
                self.jump_if(self.flags().intersects(CpuFlags::GREATER | CpuFlags::EQUAL), a)?
            }
            Instruction::Jle => {
                self.jump_if(self.flags().intersects(CpuFlags::LESS | CpuFlags::EQUAL), a)?
            }
            Instruction::Push => self.push(a)?,
            Instruction::Pop => self.pop(a)?,
            Instruction::Call => self.call(a)?,
            Instruction::Ret => self.ret()?,
        };

        match flow {
            Flow::Next => self.program_counter = address + opcode.len as u16,
            Flow::Jump(target) => self.program_counter = target as u16,
            Flow::Halt => {
                self.running = false;
                log::debug!("HLT at {:#04x}", address);
            }
        }
        Ok(())
    }

    fn reg(&self, index: u8) -> Result<u8, CpuError> {
        self.registers
            .get(index as usize)
            .copied()
            .ok_or(CpuError::OutOfRange {
                target: Target::Register(index),
                address: self.program_counter,
            })
    }

    fn set_reg(&mut self, index: u8, value: u8) -> Result<(), CpuError> {
        let address = self.program_counter;
        let register = self
            .registers
            .get_mut(index as usize)
            .ok_or(CpuError::OutOfRange {
                target: Target::Register(index),
                address: address,
            })?;
        *register = value;
        Ok(())
    }

    fn push_stack(&mut self, data: u8) -> Result<(), CpuError> {
        let sp = self.stack_pointer();
        let next = sp.checked_sub(1).ok_or(CpuError::OutOfRange {
            target: Target::StackPointer(sp),
            address: self.program_counter,
        })?;
        self.mem_write(next as u16, data)?;
        self.registers[SP] = next;
        Ok(())
    }

    fn pop_stack(&mut self) -> Result<u8, CpuError> {
        let sp = self.stack_pointer();
        let next = sp.checked_add(1).ok_or(CpuError::OutOfRange {
            target: Target::StackPointer(sp),
            address: self.program_counter,
        })?;
        let data = self.mem_read(sp as u16)?;
        self.registers[SP] = next;
        Ok(data)
    }

    fn ldi(&mut self, reg_a: u8, value: u8) -> Result<Flow, CpuError> {
        self.set_reg(reg_a, value)?;
        Ok(Flow::Next)
    }

    fn ld(&mut self, reg_a: u8, reg_b: u8) -> Result<Flow, CpuError> {
        let addr = self.reg(reg_b)?;
        let value = self.mem_read(addr as u16)?;
        self.set_reg(reg_a, value)?;
        Ok(Flow::Next)
    }

    fn st(&mut self, reg_a: u8, reg_b: u8) -> Result<Flow, CpuError> {
        let addr = self.reg(reg_a)?;
        let value = self.reg(reg_b)?;
        self.mem_write(addr as u16, value)?;
        Ok(Flow::Next)
    }

    fn prn(&mut self, reg_a: u8) -> Result<Flow, CpuError> {
        let value = self.reg(reg_a)?;
        (self.output)(Output::Number(value));
        Ok(Flow::Next)
    }

    fn pra(&mut self, reg_a: u8) -> Result<Flow, CpuError> {
        let value = self.reg(reg_a)?;
        (self.output)(Output::Char(value));
        Ok(Flow::Next)
    }

    fn alu(&mut self, op: AluOp, reg_a: u8, reg_b: u8) -> Result<Flow, CpuError> {
        let lhs = self.reg(reg_a)?;
        let rhs = if op.is_unary() { 0 } else { self.reg(reg_b)? };
        let result = op.apply(lhs, rhs).ok_or(CpuError::DivideByZero {
            register: reg_b,
            address: self.program_counter,
        })?;
        self.set_reg(reg_a, result)?;
        Ok(Flow::Next)
    }

    fn addi(&mut self, reg_a: u8, immediate: u8) -> Result<Flow, CpuError> {
        let value = self.reg(reg_a)?.wrapping_add(immediate);
        self.set_reg(reg_a, value)?;
        Ok(Flow::Next)
    }

    fn cmp(&mut self, reg_a: u8, reg_b: u8) -> Result<Flow, CpuError> {
        let flags = alu::compare(self.reg(reg_a)?, self.reg(reg_b)?);
        self.registers[FLAGS] = flags.bits();
        Ok(Flow::Next)
    }

    fn jump_if(&mut self, condition: bool, reg_a: u8) -> Result<Flow, CpuError> {
        let target = self.reg(reg_a)?;
        if condition {
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next)
        }
    }

    fn push(&mut self, reg_a: u8) -> Result<Flow, CpuError> {
        let value = self.reg(reg_a)?;
        let sp = self.stack_pointer();
        let next = sp.checked_sub(1).ok_or(CpuError::OutOfRange {
            target: Target::StackPointer(sp),
            address: self.program_counter,
        })?;
        // SP moves before the source is read, so PUSH R7 stores the new SP
        let value = if reg_a as usize == SP { next } else { value };
        self.mem_write(next as u16, value)?;
        self.registers[SP] = next;
        Ok(Flow::Next)
    }

    fn pop(&mut self, reg_a: u8) -> Result<Flow, CpuError> {
        self.reg(reg_a)?;
        let value = self.mem_read(self.stack_pointer() as u16)?;
        // the destination is written before SP moves, so POP R7 ends at value + 1
        let base = if reg_a as usize == SP {
            value
        } else {
            self.stack_pointer()
        };
        let next = base.checked_add(1).ok_or(CpuError::OutOfRange {
            target: Target::StackPointer(base),
            address: self.program_counter,
        })?;
        self.set_reg(reg_a, value)?;
        self.registers[SP] = next;
        Ok(Flow::Next)
    }

    fn call(&mut self, reg_a: u8) -> Result<Flow, CpuError> {
        let target = self.reg(reg_a)?;
        let return_addr = self.program_counter + 2;
        let return_addr = u8::try_from(return_addr).map_err(|_| CpuError::OutOfRange {
            target: Target::Address(return_addr),
            address: self.program_counter,
        })?;
        self.push_stack(return_addr)?;
        Ok(Flow::Jump(target))
    }

    fn ret(&mut self) -> Result<Flow, CpuError> {
        Ok(Flow::Jump(self.pop_stack()?))
    }
}
