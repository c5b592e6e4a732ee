//! Wheel-30 bit layout shared by the segment producer and the analyzer.
//!
//! Each sieve byte covers 30 consecutive integers, of which only the eight
//! residues coprime to 2, 3 and 5 can be prime. Bit `b` of byte `j` in a
//! segment starting at `low` stands for `low + 30 * j + BIT_VALUES[b]`.

/// Integers encoded by one sieve byte.
pub const NUMBERS_PER_BYTE: u64 = 30;

/// Offset of each bit within its byte's 30-number window.
pub const BIT_VALUES: [u64; 8] = [7, 11, 13, 17, 19, 23, 29, 31];

const NONE: u8 = 0xFF;

/// `n % 30` → bit index, or `NONE` when `n` shares a factor with 30.
/// Residue 1 maps to bit 7 (value 31 of the previous window).
#[rustfmt::skip]
const RESIDUE_TO_BIT: [u8; 30] = [
    NONE, 7, NONE, NONE, NONE, NONE, NONE, 0, NONE, NONE,
    NONE, 1, NONE, 2, NONE, NONE, NONE, 3, NONE, 4,
    NONE, NONE, NONE, 5, NONE, NONE, NONE, NONE, NONE, 6,
];

/// Decode and clear the lowest set bit of `bits`, returning the integer it
/// represents in byte `byte_index` of the segment starting at `low`.
///
/// `bits` must be non-zero.
#[inline]
pub fn next_prime(low: u64, byte_index: usize, bits: &mut u64) -> u64 {
    debug_assert!(*bits != 0);
    let tz = bits.trailing_zeros() as usize;
    *bits &= *bits - 1;
    low + byte_index as u64 * NUMBERS_PER_BYTE + BIT_VALUES[tz]
}

/// Locate `n` inside the segment starting at `low`: `(byte index, bit mask)`.
///
/// Returns `None` when `n` is not coprime to 30 or lies before the first bit.
#[inline]
pub fn locate(low: u64, n: u64) -> Option<(usize, u8)> {
    let bit = RESIDUE_TO_BIT[(n % NUMBERS_PER_BYTE) as usize];
    if bit == NONE || n < low + BIT_VALUES[bit as usize] {
        return None;
    }
    let byte = (n - low - BIT_VALUES[bit as usize]) / NUMBERS_PER_BYTE;
    Some((byte as usize, 1u8 << bit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_prime_ascending() {
        let mut bits = 0x1Eu64;
        let decoded: Vec<u64> = std::iter::from_fn(|| {
            (bits != 0).then(|| next_prime(0, 0, &mut bits))
        })
        .collect();
        assert_eq!(decoded, vec![11, 13, 17, 19]);
    }

    #[test]
    fn test_next_prime_byte_offset() {
        let mut bits = 0x80u64;
        assert_eq!(next_prime(300, 2, &mut bits), 300 + 60 + 31);
        assert_eq!(bits, 0);
    }

    #[test]
    fn test_locate_inverts_next_prime() {
        let low = 90;
        for byte in 0..4usize {
            for bit in 0..8 {
                let mut bits = 1u64 << bit;
                let n = next_prime(low, byte, &mut bits);
                assert_eq!(locate(low, n), Some((byte, 1u8 << bit)), "n={}", n);
            }
        }
    }

    #[test]
    fn test_locate_rejects() {
        assert_eq!(locate(0, 9), None);
        assert_eq!(locate(0, 25), None);
        assert_eq!(locate(30, 31), None);
        assert_eq!(locate(0, 1), None);
    }
}
