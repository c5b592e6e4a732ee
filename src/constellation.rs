//! Prime k-tuplet kinds, their per-byte bitmasks and the lookup tables used
//! to count them a byte at a time.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A prime constellation shape. Index 0 is reserved for plain primes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ConstellationKind {
    Twins = 1,
    Triplets = 2,
    Quadruplets = 3,
    Quintuplets = 4,
    Sextuplets = 5,
    Septuplets = 6,
}

impl ConstellationKind {
    pub const ALL: [ConstellationKind; 6] = [
        ConstellationKind::Twins,
        ConstellationKind::Triplets,
        ConstellationKind::Quadruplets,
        ConstellationKind::Quintuplets,
        ConstellationKind::Sextuplets,
        ConstellationKind::Septuplets,
    ];

    /// Accumulator slot, 1..=6.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of primes in one instance of this constellation.
    pub fn size(self) -> usize {
        self as usize + 1
    }

    /// Ascending bitmasks of this shape within one wheel-30 byte.
    ///
    /// Bits map to offsets 7, 11, 13, 17, 19, 23, 29, 31, so e.g. twin mask
    /// `0x06` is the pair (11, 13).
    pub fn bitmasks(self) -> &'static [u8] {
        match self {
            ConstellationKind::Twins => &[0x06, 0x18, 0xc0],
            ConstellationKind::Triplets => &[0x07, 0x0e, 0x1c, 0x38],
            ConstellationKind::Quadruplets => &[0x1e],
            ConstellationKind::Quintuplets => &[0x1f, 0x3e],
            ConstellationKind::Sextuplets => &[0x3f],
            ConstellationKind::Septuplets => &[0xfe],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConstellationKind::Twins => "twins",
            ConstellationKind::Triplets => "triplets",
            ConstellationKind::Quadruplets => "quadruplets",
            ConstellationKind::Quintuplets => "quintuplets",
            ConstellationKind::Sextuplets => "sextuplets",
            ConstellationKind::Septuplets => "septuplets",
        }
    }

    /// Human label used in count summaries, e.g. "Twin prime".
    pub fn label(self) -> &'static str {
        match self {
            ConstellationKind::Twins => "Twin prime",
            ConstellationKind::Triplets => "Prime triplet",
            ConstellationKind::Quadruplets => "Prime quadruplet",
            ConstellationKind::Quintuplets => "Prime quintuplet",
            ConstellationKind::Sextuplets => "Prime sextuplet",
            ConstellationKind::Septuplets => "Prime septuplet",
        }
    }
}

impl TryFrom<u8> for ConstellationKind {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self> {
        match index {
            1 => Ok(ConstellationKind::Twins),
            2 => Ok(ConstellationKind::Triplets),
            3 => Ok(ConstellationKind::Quadruplets),
            4 => Ok(ConstellationKind::Quintuplets),
            5 => Ok(ConstellationKind::Sextuplets),
            6 => Ok(ConstellationKind::Septuplets),
            other => Err(Error::InvalidKind(other)),
        }
    }
}

impl FromStr for ConstellationKind {
    type Err = Error;

    /// Accepts the plural name ("twins") or the tuple size ("2").
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(size) = s.parse::<u8>() {
            return match size {
                2..=7 => ConstellationKind::try_from(size - 1),
                _ => Err(Error::InvalidConfig(format!("no constellation of size {}", size))),
            };
        }
        ConstellationKind::ALL
            .into_iter()
            .find(|k| k.name() == s || k.name().trim_end_matches('s') == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown constellation '{}'", s)))
    }
}

impl fmt::Display for ConstellationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Lookup table ──────────────────────────────────────────────────────────

/// Byte value → number of `kind` masks contained in it.
#[derive(Clone)]
pub struct ConstellationTable {
    kind: ConstellationKind,
    counts: [u8; 256],
}

impl ConstellationTable {
    pub fn build(kind: ConstellationKind) -> Self {
        let mut counts = [0u8; 256];
        for (v, slot) in counts.iter_mut().enumerate() {
            let v = v as u8;
            // A submask of v is never numerically larger than v, and masks
            // are ascending, so the scan stops at the first mask above v.
            *slot = kind
                .bitmasks()
                .iter()
                .take_while(|&&m| m <= v)
                .filter(|&&m| v & m == m)
                .count() as u8;
        }
        tracing::debug!(%kind, "built constellation table");
        ConstellationTable { kind, counts }
    }

    pub fn kind(&self) -> ConstellationKind {
        self.kind
    }

    #[inline]
    pub fn get(&self, byte: u8) -> u8 {
        self.counts[byte as usize]
    }

    /// Total constellation instances across `bytes`.
    pub fn count(&self, bytes: &[u8]) -> u64 {
        bytes.iter().map(|&b| self.counts[b as usize] as u64).sum()
    }
}

impl fmt::Debug for ConstellationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstellationTable")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
