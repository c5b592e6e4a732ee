use crate::wheel::{self, NUMBERS_PER_BYTE};

/// A finished sieve segment, borrowed from its producer.
///
/// Bit `b` of byte `j` is set iff `low + 30 * j + BIT_VALUES[b]` survived
/// sieving. Bits for values outside `[low, high]` (and outside the range the
/// producer was asked for) are already cleared.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    bytes: &'a [u8],
    low: u64,
    high: u64,
}

impl<'a> Segment<'a> {
    /// `low` must be a multiple of 30 and `high` the inclusive last value the
    /// bytes can encode.
    pub fn new(bytes: &'a [u8], low: u64, high: u64) -> Self {
        debug_assert_eq!(low % NUMBERS_PER_BYTE, 0);
        debug_assert!(low <= high);
        Segment { bytes, low, high }
    }

    /// Segment spanning exactly `bytes.len()` wheel windows from `low`.
    pub fn spanning(bytes: &'a [u8], low: u64) -> Self {
        let high = low + bytes.len() as u64 * NUMBERS_PER_BYTE + 1;
        Segment::new(bytes, low, high)
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub fn low(&self) -> u64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> u64 {
        self.high
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Numbers of the integer line this segment covers.
    pub fn span(&self) -> u64 {
        self.bytes.len() as u64 * NUMBERS_PER_BYTE
    }

    /// Every value whose bit is set, ascending.
    pub fn primes(&self) -> impl Iterator<Item = u64> + 'a {
        let low = self.low;
        self.bytes
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b != 0)
            .flat_map(move |(j, &b)| {
                let mut bits = b as u64;
                std::iter::from_fn(move || (bits != 0).then(|| wheel::next_prime(low, j, &mut bits)))
            })
    }
}
