use bitflags::bitflags;

// Condition code written by CMP into R5. At most one bit is set.
//
//  7 6 5 4 3 2 1 0
//  0 0 0 0 0 L G E
bitflags! {
  pub struct CpuFlags: u8 {
    const EQUAL   = 0b0000_0001;
    const GREATER = 0b0000_0010;
    const LESS    = 0b0000_0100;
  }
}

impl CpuFlags {
    pub fn from_register(data: u8) -> Self {
        CpuFlags::from_bits_truncate(data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_register_drops_unknown_bits() {
        let flags = CpuFlags::from_register(0b1111_1001);
        assert_eq!(flags, CpuFlags::EQUAL);
        assert!(CpuFlags::from_register(0).is_empty());
    }

    #[test]
    fn test_layout() {
        assert_eq!(CpuFlags::LESS.bits(), 0b100);
        assert_eq!(CpuFlags::GREATER.bits(), 0b010);
        assert_eq!(CpuFlags::EQUAL.bits(), 0b001);
    }
}
