//! Segmented wheel-30 Sieve of Eratosthenes producing finished segments.
//!
//! Strategy:
//!   1. Small sieve: find all primes ≤ √stop (odd-only bit sieve, a few KB)
//!   2. Walk `[start, stop]` in `sieve_size`-byte segments, 30 numbers per byte
//!   3. For each segment, strike odd multiples of every sieving prime ≥ 7
//!   4. Clear bits outside `[start, stop]` and hand the segment to the consumer
//!
//! Only values ≥ 7 are produced; 2, 3 and 5 are not representable on the wheel.

use crate::error::Result;
use crate::segment::Segment;
use crate::wheel::{self, BIT_VALUES, NUMBERS_PER_BYTE};

/// Smallest value the wheel can represent.
pub const WHEEL_START: u64 = 7;

/// Largest accepted stop value; keeps multiple stepping clear of overflow.
pub const MAX_STOP: u64 = u64::MAX - 10 * u32::MAX as u64;

// ─── Utilities ─────────────────────────────────────────────────────────────

/// Integer square root — overflow-safe for all u64 values.
#[inline]
pub fn isqrt(n: u64) -> u64 {
    if n == 0 { return 0; }
    let mut x = (n as f64).sqrt() as u64;
    while x > 0 && x.checked_mul(x).map_or(true, |sq| sq > n) { x -= 1; }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) { x += 1; }
    x
}

// ─── Small flat sieve (for bootstrapping primes ≤ √stop) ───────────────────

/// All primes ≤ `n`, bit per odd number.
pub fn small_sieve(n: u64) -> Vec<u64> {
    if n < 2 { return vec![]; }
    let h = n / 2;
    let num_words = ((h >> 6) + 1) as usize;
    let mut b = vec![!0u64; num_words];
    b[0] ^= 1;
    let sqrt_n = isqrt(n);

    for i in 1..=(sqrt_n / 2) {
        if (b[(i >> 6) as usize] >> (i & 63)) & 1 == 1 {
            let step = 2 * i + 1;
            let mut j = 2 * i * (i + 1);
            while j <= h {
                b[(j >> 6) as usize] &= !(1u64 << (j & 63));
                j += step;
            }
        }
    }

    let mut r = vec![2];
    for (i, &word) in b.iter().enumerate() {
        let mut w = word;
        while w != 0 {
            let tz = w.trailing_zeros() as usize;
            let p = (((i << 6) + tz) * 2 + 1) as u64;
            if p <= n { r.push(p); }
            w &= w - 1;
        }
    }
    r
}

// ─── Segmented sieve ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SegmentSieve {
    start: u64,
    stop: u64,
    sieve_size: usize,
    sieving_primes: Vec<u64>,
    /// Next odd multiple of each sieving prime still to strike.
    next_multiple: Vec<u64>,
}

impl SegmentSieve {
    /// Sieve `[max(start, 7), stop]` in segments of `sieve_size` bytes.
    pub fn new(start: u64, stop: u64, sieve_size: usize) -> Self {
        debug_assert!(sieve_size > 0);
        debug_assert!(stop <= MAX_STOP);
        let start = start.max(WHEEL_START);
        let low = first_low(start);

        let sieving_primes: Vec<u64> = small_sieve(isqrt(stop))
            .into_iter()
            .filter(|&p| p >= WHEEL_START)
            .collect();
        let next_multiple = sieving_primes
            .iter()
            .map(|&p| {
                let first = low + WHEEL_START;
                let mut m = (p * p).max(first.div_ceil(p) * p);
                if m % 2 == 0 { m += p; }
                m
            })
            .collect();

        SegmentSieve { start, stop, sieve_size, sieving_primes, next_multiple }
    }

    /// Run the sieve, handing each finished segment to `consume` in ascending
    /// order. Stops at the first error.
    pub fn run<F>(&mut self, mut consume: F) -> Result<()>
    where
        F: FnMut(&Segment) -> Result<()>,
    {
        if self.start > self.stop {
            return Ok(());
        }
        let mut seg = vec![0u8; self.sieve_size];
        let mut low = first_low(self.start);

        while low + WHEEL_START <= self.stop {
            // Bytes needed to reach stop, capped at the segment size
            let last_byte = (self.stop - low - WHEEL_START) / NUMBERS_PER_BYTE;
            let len = (last_byte as usize + 1).min(self.sieve_size);
            let bytes = &mut seg[..len];
            bytes.fill(0xFF);

            let seg_high = low + len as u64 * NUMBERS_PER_BYTE + 1;
            self.cross_off(bytes, low, seg_high);

            // Mask values outside [start, stop]
            self.mask_edge(bytes, low, 0);
            self.mask_edge(bytes, low, len - 1);

            consume(&Segment::spanning(bytes, low))?;
            low += len as u64 * NUMBERS_PER_BYTE;
        }
        Ok(())
    }

    /// Strike odd multiples of each sieving prime within `[low, high]`.
    fn cross_off(&mut self, bytes: &mut [u8], low: u64, high: u64) {
        for (pi, &p) in self.sieving_primes.iter().enumerate() {
            let mut m = self.next_multiple[pi];
            if m > high { continue; }
            let step = 2 * p;
            while m <= high {
                if let Some((j, mask)) = wheel::locate(low, m) {
                    if j < bytes.len() {
                        bytes[j] &= !mask;
                    }
                }
                m += step;
            }
            self.next_multiple[pi] = m;
        }
    }

    fn mask_edge(&self, bytes: &mut [u8], low: u64, j: usize) {
        let base = low + j as u64 * NUMBERS_PER_BYTE;
        for (bit, &offset) in BIT_VALUES.iter().enumerate() {
            let n = base + offset;
            if n < self.start || n > self.stop {
                bytes[j] &= !(1u8 << bit);
            }
        }
    }
}

/// Wheel-aligned low bound whose first byte covers `start`.
#[inline]
fn first_low(start: u64) -> u64 {
    (start - WHEEL_START) / NUMBERS_PER_BYTE * NUMBERS_PER_BYTE
}
