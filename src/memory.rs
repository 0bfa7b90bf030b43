use crate::error::LoadError;

pub const MEMORY_SIZE: usize = 256;

/// Flat RAM shared by program, data and the downward-growing stack.
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            cells: [0; MEMORY_SIZE],
        }
    }

    pub fn read(&self, addr: u16) -> Option<u8> {
        self.cells.get(addr as usize).copied()
    }

    pub fn write(&mut self, addr: u16, data: u8) -> Option<()> {
        let cell = self.cells.get_mut(addr as usize)?;
        *cell = data;
        Some(())
    }

    /// Copies `program` into RAM starting at `origin`. Nothing is written
    /// unless the whole program fits.
    pub fn place(&mut self, program: &[u8], origin: u16) -> Result<(), LoadError> {
        let start = origin as usize;
        let end = start + program.len();
        if end > MEMORY_SIZE {
            return Err(LoadError::TooLarge {
                words: program.len(),
                origin: origin,
            });
        }
        self.cells[start..end].copy_from_slice(program);
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
