//! Pair and PairSet definitions.
//!
//! Compact integer-based representation of base pairs, can
//! be used as alternative to `FoldingPairs` partner tables.
//!
//! A `Pair` is defined by two 16-bit indices (`NAIDX`) packed into a
//! 32-bit integer key (`P1KEY`) for efficient set and map storage.
//! Indices are 0-based throughout.
//!

use std::fmt;
use nohash_hasher::IntSet;
use serde::Deserialize;
use serde::Serialize;

use crate::FoldingPairs;
use crate::NAIDX;
use crate::P1KEY;


/// A base pair (i, j) with i < j.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pair {
    i: NAIDX,
    j: NAIDX,
}

impl Pair {
    /// Create a new pair (i, j). Panics in debug if i >= j.
    pub fn new(i: NAIDX, j: NAIDX) -> Self {
        debug_assert!(i < j);
        debug_assert!(j < NAIDX::MAX);
        Pair { i, j }
    }

    /// Return the 5'-side index.
    pub fn i(&self) -> NAIDX {
        self.i
    }

    /// Return the 3'-side index.
    pub fn j(&self) -> NAIDX {
        self.j
    }

    /// True if `k` is one of the two paired positions.
    pub fn touches(&self, k: NAIDX) -> bool {
        self.i == k || self.j == k
    }

    /// Compact 32-bit key encoding both indices.
    pub fn key(&self) -> P1KEY {
        ((self.i as P1KEY) << 16) | (self.j as P1KEY)
    }

    /// Decode a key back into a `Pair`.
    pub fn from_key(key: P1KEY) -> Self {
        let i = (key >> 16) as NAIDX;
        let j = (key & 0xFFFF) as NAIDX;
        debug_assert!(i < j);
        Pair { i, j }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.i, self.j)
    }
}

/// A collection of base pairs represented as compact integer keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairSet {
    pairs: IntSet<P1KEY>,
}

impl PairSet {
    /// Number of pairs contained in the set.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Insert a new pair; returns true if it was newly inserted.
    pub fn insert(&mut self, pair: Pair) -> bool {
        self.pairs.insert(pair.key())
    }

    /// Check if a pair exists in the set.
    pub fn contains(&self, pair: &Pair) -> bool {
        self.pairs.contains(&pair.key())
    }

    /// Keep only the pairs that also appear in `others`.
    pub fn retain_common<'a>(&mut self, others: impl IntoIterator<Item = &'a Pair>) {
        let keep: IntSet<P1KEY> = others.into_iter().map(|p| p.key()).collect();
        self.pairs.retain(|k| keep.contains(k));
    }

    /// Iterator over all pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = Pair> + '_ {
        self.pairs.iter().map(|&k| Pair::from_key(k))
    }

    /// Return all pairs as a Vec (for deterministic inspection).
    pub fn to_vec(&self) -> Vec<Pair> {
        let mut v: Vec<_> = self.iter().collect();
        v.sort_unstable();
        v
    }
}

impl FromIterator<Pair> for PairSet {
    fn from_iter<T: IntoIterator<Item = Pair>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().map(|p| p.key()).collect(),
        }
    }
}

impl<'a> FromIterator<&'a Pair> for PairSet {
    fn from_iter<T: IntoIterator<Item = &'a Pair>>(iter: T) -> Self {
        iter.into_iter().copied().collect()
    }
}

impl From<&FoldingPairs> for PairSet {
    fn from(fp: &FoldingPairs) -> Self {
        fp.pairs().collect()
    }
}

impl fmt::Display for PairSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pair in self.to_vec() {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{pair}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_roundtrip() {
        let p = Pair::new(1, 42);
        let k = p.key();
        let q = Pair::from_key(k);
        assert_eq!(p, q);
    }

    #[test]
    fn test_pair_set_from_folding() {
        let fp = FoldingPairs::try_from("((..))").unwrap();
        let ps = PairSet::from(&fp);

        let expected = vec![Pair::new(0, 5), Pair::new(1, 4)];
        assert_eq!(ps.to_vec(), expected);

        for p in &expected {
            assert!(ps.contains(p));
        }
        assert!(!ps.contains(&Pair::new(0, 4)));
    }

    #[test]
    fn test_retain_common() {
        let mut ps: PairSet = [Pair::new(0, 5), Pair::new(1, 4), Pair::new(2, 3)]
            .iter()
            .collect();
        ps.retain_common(&[Pair::new(1, 4), Pair::new(2, 3), Pair::new(6, 9)]);
        assert_eq!(ps.to_vec(), vec![Pair::new(1, 4), Pair::new(2, 3)]);
        ps.retain_common(&[]);
        assert!(ps.is_empty());
    }

    #[test]
    fn test_display() {
        let fp = FoldingPairs::try_from("((..))").unwrap();
        let ps = PairSet::from(&fp);
        assert_eq!(format!("{}", ps), "(0,5),(1,4)");
    }
}

