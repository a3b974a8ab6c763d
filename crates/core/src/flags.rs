//! Single-bit access on the legacy style bitfields.

/// Whether `bit` is set in `bits`.
pub fn get_flag(bits: u16, bit: u8) -> bool {
    (bits >> bit) & 1 != 0
}

/// `bits` with `bit` set to `value`.
pub fn set_flag(bits: u16, bit: u8, value: bool) -> u16 {
    let mask = 1 << bit;
    if value { bits | mask } else { bits & !mask }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_single_bits() {
        assert!(get_flag(0b0100_0001, 0));
        assert!(!get_flag(0b0100_0001, 1));
        assert!(get_flag(0b0100_0001, 6));
        assert!(get_flag(0x8000, 15));
    }

    #[test]
    fn round_trip_leaves_other_bits() {
        for bits in [0u16, 0xFFFF, 0b1010_0101_1100_0011] {
            for bit in 0..16 {
                for value in [true, false] {
                    let updated = set_flag(bits, bit, value);
                    assert_eq!(get_flag(updated, bit), value);
                    let mask = !(1u16 << bit);
                    assert_eq!(updated & mask, bits & mask);
                }
            }
        }
    }
}
