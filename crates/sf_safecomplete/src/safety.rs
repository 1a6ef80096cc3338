//! Exact safety counts from a `FoldTree`.
//!
//! The propagator walks the tree top-down with the number of foldings
//! passing through the current node. Facts stored at a node hold in all of
//! those foldings, so they receive the full incoming count. Branches split
//! the count in proportion to their solution counts, join children both
//! receive it unchanged.
//!
//! A base is safe if it has the same partner (or is free) in every
//! optimal folding.
//!

use log::warn;
use nohash_hasher::IntMap;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use sf_structure::FoldingPairs;
use sf_structure::Pair;
use sf_structure::NAIDX;
use sf_structure::P1KEY;
use sf_structure::StructureError;

use crate::FoldError;
use crate::FoldTree;
use crate::Split;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyReport {
    total: BigUint,
    single: Vec<BigUint>,
    pairs: IntMap<P1KEY, BigUint>,
    safe: Vec<bool>,
}

impl SafetyReport {
    /// Distribute `total` foldings over the (simplified or raw) tree of a
    /// sequence of length `len`, then verify and classify every base.
    pub fn propagate(tree: &FoldTree, len: usize, total: &BigUint) -> Result<Self, FoldError> {
        let mut report = SafetyReport {
            total: total.clone(),
            single: vec![BigUint::zero(); len],
            pairs: IntMap::default(),
            safe: Vec::new(),
        };
        report.walk(tree, total)?;
        report.verify_sums()?;
        report.safe = (0..len).map(|i| report.classify(i)).collect();
        Ok(report)
    }

    fn walk(&mut self, node: &FoldTree, num_sols: &BigUint) -> Result<(), FoldError> {
        if node.sols().is_zero() {
            return Err(inconsistent("node without foldings".to_string()));
        }
        let (scale, rem) = num_sols.div_rem(node.sols());
        if !rem.is_zero() {
            return Err(inconsistent(format!(
                "{num_sols} foldings do not divide evenly over {} node foldings",
                node.sols()
            )));
        }

        let len = self.single.len();
        for pair in node.pairs() {
            if pair.i().max(pair.j()) as usize >= len {
                return Err(inconsistent(format!("pair {pair} lies outside {len} bases")));
            }
            *self.pairs.entry(pair.key()).or_default() += num_sols;
        }
        for &k in node.free() {
            let Some(single) = self.single.get_mut(k as usize) else {
                return Err(inconsistent(format!("free base {k} lies outside {len} bases")));
            };
            *single += num_sols;
        }

        match node.split() {
            Split::Leaf => Ok(()),
            Split::Branches(branches) => {
                let sum: BigUint = branches.iter().map(|b| b.sols()).sum();
                if &sum != node.sols() {
                    return Err(inconsistent(format!(
                        "branches cover {sum} foldings, node has {}",
                        node.sols()
                    )));
                }
                for b in branches {
                    self.walk(b, &(b.sols() * &scale))?;
                }
                Ok(())
            }
            Split::Join(prefix, suffix) => {
                let product = prefix.sols() * suffix.sols();
                if &product != node.sols() {
                    return Err(inconsistent(format!(
                        "join covers {product} foldings, node has {}",
                        node.sols()
                    )));
                }
                let part = product * scale;
                self.walk(prefix, &part)?;
                self.walk(suffix, &part)
            }
        }
    }

    /// Every base is either free or paired in each folding.
    fn verify_sums(&self) -> Result<(), FoldError> {
        let mut seen = self.single.clone();
        for (&key, count) in &self.pairs {
            let pair = Pair::from_key(key);
            seen[pair.i() as usize] += count;
            seen[pair.j() as usize] += count;
        }
        match seen.iter().position(|s| s != &self.total) {
            None => Ok(()),
            Some(i) => Err(inconsistent(format!(
                "base {i} is accounted for in {} of {} foldings",
                seen[i], self.total
            ))),
        }
    }

    fn classify(&self, i: usize) -> bool {
        let partners = self.partners(i).len();
        let single = &self.single[i];
        (single.is_zero() && partners == 1) || (single == &self.total && partners == 0)
    }

    /// Number of foldings considered.
    pub fn total(&self) -> &BigUint {
        &self.total
    }

    /// Number of foldings leaving `i` unpaired.
    pub fn single(&self, i: usize) -> &BigUint {
        &self.single[i]
    }

    /// Number of foldings containing the pair `(i, j)`.
    pub fn pair_count(&self, i: NAIDX, j: NAIDX) -> BigUint {
        let pair = Pair::new(i.min(j), i.max(j));
        self.pairs.get(&pair.key()).cloned().unwrap_or_default()
    }

    /// All pairs with a nonzero count, sorted.
    pub fn pair_counts(&self) -> Vec<(Pair, &BigUint)> {
        let mut all: Vec<(Pair, &BigUint)> = self
            .pairs
            .iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(&k, c)| (Pair::from_key(k), c))
            .collect();
        all.sort_unstable_by_key(|(p, _)| *p);
        all
    }

    /// Every position `i` pairs with in some folding, ascending.
    pub fn partners(&self, i: usize) -> Vec<NAIDX> {
        let i = i as NAIDX;
        let mut partners: Vec<NAIDX> = self
            .pairs
            .iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(&k, _)| Pair::from_key(k))
            .filter(|p| p.touches(i))
            .map(|p| if p.i() == i { p.j() } else { p.i() })
            .collect();
        partners.sort_unstable();
        partners
    }

    pub fn is_safe(&self, i: usize) -> bool {
        self.safe[i]
    }

    pub fn safe(&self) -> &[bool] {
        &self.safe
    }

    pub fn num_safe(&self) -> usize {
        self.safe.iter().filter(|&&s| s).count()
    }

    /// Compare against an independent classification, e.g. from
    /// `trivial_safety` over the enumerated foldings.
    pub fn check_against(&self, other: &[bool]) -> Result<(), FoldError> {
        if other.len() != self.safe.len() {
            return Err(inconsistent(format!(
                "classifications cover {} and {} bases",
                self.safe.len(),
                other.len()
            )));
        }
        match self.safe.iter().zip(other).position(|(a, b)| a != b) {
            None => Ok(()),
            Some(i) => Err(inconsistent(format!(
                "base {i} is {} but the other classification says {}",
                if self.safe[i] { "safe" } else { "unsafe" },
                if other[i] { "safe" } else { "unsafe" },
            ))),
        }
    }
}

fn inconsistent(msg: String) -> FoldError {
    warn!("Safety consistency check failed: {msg}");
    FoldError::Consistency(msg)
}

/// A base is safe if its entry is identical across all `foldings`.
pub fn trivial_safety(foldings: &[FoldingPairs]) -> Result<Vec<bool>, FoldError> {
    let Some((first, rest)) = foldings.split_first() else {
        return Ok(Vec::new());
    };
    let mut safe = vec![true; first.len()];
    for f in rest {
        if f.len() != first.len() {
            return Err(StructureError::LengthMismatch {
                expected: first.len(),
                found: f.len(),
            }
            .into());
        }
        for ((s, a), b) in safe.iter_mut().zip(first.iter()).zip(f.iter()) {
            if a != b {
                *s = false;
            }
        }
    }
    Ok(safe)
}
