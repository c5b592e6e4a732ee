//! Population count over byte buffers.
//!
//! The bulk of the buffer is read as little-endian 64-bit words and summed
//! with a Harley-Seal carry-save adder network: eight words are folded into
//! `ones`/`twos`/`fours` accumulators and only the `eights` carry needs a full
//! word popcount per block. The remaining `< 8` bytes go through a Kernighan
//! loop. Words are assembled with `u64::from_le_bytes`, so the buffer has no
//! alignment precondition.

// ─── Word-level primitives ─────────────────────────────────────────────────

const WORD_BYTES: usize = 8;
const BLOCK_WORDS: usize = 8;
const BLOCK_BYTES: usize = WORD_BYTES * BLOCK_WORDS;

/// SWAR popcount of one word. No native instruction required.
#[inline(always)]
fn popcount_word(mut x: u64) -> u64 {
    const M1: u64 = 0x5555_5555_5555_5555;
    const M2: u64 = 0x3333_3333_3333_3333;
    const M4: u64 = 0x0f0f_0f0f_0f0f_0f0f;
    const H01: u64 = 0x0101_0101_0101_0101;

    x -= (x >> 1) & M1;
    x = (x & M2) + ((x >> 2) & M2);
    x = (x + (x >> 4)) & M4;
    x.wrapping_mul(H01) >> 56
}

/// Carry-save adder: returns `(carry, sum)` of three words, bitwise.
#[inline(always)]
fn csa(a: u64, b: u64, c: u64) -> (u64, u64) {
    let u = a ^ b;
    ((a & b) | (u & c), u ^ c)
}

#[inline(always)]
fn load_word(chunk: &[u8]) -> u64 {
    let mut w = [0u8; WORD_BYTES];
    w.copy_from_slice(chunk);
    u64::from_le_bytes(w)
}

// ─── Buffer popcount ───────────────────────────────────────────────────────

/// Harley-Seal popcount over whole words. `bytes.len()` must be a multiple of 8.
fn popcount_words(bytes: &[u8]) -> u64 {
    debug_assert_eq!(bytes.len() % WORD_BYTES, 0);

    let mut total = 0u64;
    let mut ones = 0u64;
    let mut twos = 0u64;
    let mut fours = 0u64;

    let mut blocks = bytes.chunks_exact(BLOCK_BYTES);
    for block in &mut blocks {
        let w = |i: usize| load_word(&block[i * WORD_BYTES..(i + 1) * WORD_BYTES]);

        let (twos_a, o) = csa(ones, w(0), w(1));
        let (twos_b, o) = csa(o, w(2), w(3));
        let (fours_a, t) = csa(twos, twos_a, twos_b);
        let (twos_a, o) = csa(o, w(4), w(5));
        let (twos_b, o) = csa(o, w(6), w(7));
        let (fours_b, t) = csa(t, twos_a, twos_b);
        let (eights, f) = csa(fours, fours_a, fours_b);

        ones = o;
        twos = t;
        fours = f;
        total += popcount_word(eights);
    }

    total = 8 * total + 4 * popcount_word(fours) + 2 * popcount_word(twos) + popcount_word(ones);

    for chunk in blocks.remainder().chunks_exact(WORD_BYTES) {
        total += popcount_word(load_word(chunk));
    }
    total
}

/// Kernighan popcount: clear the lowest set bit until the byte is empty.
fn popcount_kernighan(bytes: &[u8]) -> u64 {
    let mut total = 0u64;
    for &b in bytes {
        let mut v = b;
        while v != 0 {
            v &= v - 1;
            total += 1;
        }
    }
    total
}

/// Number of 1 bits in `bytes`.
pub fn popcount(bytes: &[u8]) -> u64 {
    let split = bytes.len() - bytes.len() % WORD_BYTES;
    let (words, tail) = bytes.split_at(split);
    popcount_words(words) + popcount_kernighan(tail)
}
