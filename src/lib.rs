pub mod alu;
pub mod cpu;
pub mod error;
pub mod flags;
pub mod loader;
pub mod memory;
pub mod opcodes;
