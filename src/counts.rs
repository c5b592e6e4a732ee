use std::ops::{AddAssign, Index};

use crate::constellation::ConstellationKind;

/// Slot of the plain prime count.
pub const PRIMES: usize = 0;

/// Running totals: slot 0 = primes, slots 1..=6 = constellation kinds.
///
/// Contributions are commutative, so per-worker partials can be merged with
/// `+=` in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts([u64; 7]);

impl Counts {
    pub fn new() -> Self {
        Counts::default()
    }

    #[inline]
    pub fn add(&mut self, slot: usize, delta: u64) {
        self.0[slot] += delta;
    }

    pub fn primes(&self) -> u64 {
        self.0[PRIMES]
    }

    pub fn constellations(&self, kind: ConstellationKind) -> u64 {
        self.0[kind.index()]
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, other: Counts) {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a += b;
        }
    }
}

impl std::iter::Sum for Counts {
    fn sum<I: Iterator<Item = Counts>>(iter: I) -> Counts {
        iter.fold(Counts::default(), |mut acc, c| {
            acc += c;
            acc
        })
    }
}

impl Index<usize> for Counts {
    type Output = u64;

    fn index(&self, slot: usize) -> &u64 {
        &self.0[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = Counts::new();
        a.add(PRIMES, 10);
        a.add(ConstellationKind::Twins.index(), 3);
        let mut b = Counts::new();
        b.add(PRIMES, 5);
        b.add(ConstellationKind::Septuplets.index(), 1);

        let ab: Counts = [a, b].into_iter().sum();
        let ba: Counts = [b, a].into_iter().sum();
        assert_eq!(ab, ba);
        assert_eq!(ab.primes(), 15);
        assert_eq!(ab.constellations(ConstellationKind::Twins), 3);
        assert_eq!(ab[6], 1);
    }
}
