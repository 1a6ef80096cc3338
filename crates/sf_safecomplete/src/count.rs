//! Exact counting of optimal foldings.
//!
//! Every optimal folding of an interval `[i, j]` (length >= 2) falls into
//! exactly one of three shapes, distinguished by what happens to `j`:
//!  - `j` pairs with `i` (outer pair),
//!  - `j` pairs with some `k+1` in `(i, j)` (interior pair),
//!  - `j` is unpaired (trailing free).
//!
//! `DpTables::decompositions` lists the shapes that attain `V[i][j]`. The
//! counter sums their solution counts, the tree builder turns each of
//! them into a branch. Sharing the rule set keeps the two in lockstep.
//!

use log::debug;
use ndarray::Array2;
use num_bigint::BigUint;
use num_traits::One;
use num_traits::Zero;
use sf_structure::Pair;
use sf_structure::NAIDX;

use crate::DpTables;

/// One optimal way to decompose an interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    /// Interval that continues the folding (may be empty, `i > j`).
    pub prefix: (usize, usize),
    /// Independent second interval; its foldings combine with every
    /// folding of `prefix`.
    pub suffix: Option<(usize, usize)>,
    /// The pair this decomposition fixes, if any.
    pub pair: Option<Pair>,
}

impl Decomposition {
    /// Number of optimal foldings that take this decomposition.
    pub fn count(&self, sol: &Array2<BigUint>) -> BigUint {
        match self.suffix {
            Some(suffix) => &sol[self.prefix] * &sol[suffix],
            None => sol[self.prefix].clone(),
        }
    }
}

impl DpTables {
    /// All decompositions of `[i, j]` (with `i < j`) that attain `V[i][j]`,
    /// in the order: outer pair, interior pairs by ascending `k`, trailing
    /// free.
    pub fn decompositions(&self, i: usize, j: usize) -> Vec<Decomposition> {
        debug_assert!(i < j);
        let (v, w) = (self.v(), self.w());
        let best = v[(i, j)];
        let mut found = Vec::new();

        if w[(i, j)] > 0 && best == w[(i, j)] {
            found.push(Decomposition {
                prefix: (i + 1, j - 1),
                suffix: None,
                pair: Some(Pair::new(i as NAIDX, j as NAIDX)),
            });
        }
        for k in i..j {
            let wk = w[(k + 1, j)];
            if wk > 0 && best == v[(i, k)] + wk {
                found.push(Decomposition {
                    prefix: (i, k),
                    suffix: Some((k + 2, j - 1)),
                    pair: Some(Pair::new((k + 1) as NAIDX, j as NAIDX)),
                });
            }
        }
        if best == v[(i, j - 1)] {
            found.push(Decomposition {
                prefix: (i, j - 1),
                suffix: Some((j, j)),
                pair: None,
            });
        }
        found
    }
}

/// Sol[i][j]: the number of distinct optimal foldings of `[i, j]`.
///
/// Empty intervals `(i, i-1)` and singletons count as one (trivial)
/// folding. Counts are exact; they grow exponentially with the length.
pub fn count_solutions(tables: &DpTables) -> Array2<BigUint> {
    let n = tables.len();
    let mut sol = Array2::from_elem((n, n), BigUint::zero());
    for i in 0..n {
        sol[(i, i)] = BigUint::one();
        if i > 0 {
            sol[(i, i - 1)] = BigUint::one();
        }
    }

    for l in 1..n {
        for i in 0..n - l {
            let j = i + l;
            let total: BigUint = tables
                .decompositions(i, j)
                .iter()
                .map(|d| d.count(&sol))
                .sum();
            debug_assert!(!total.is_zero());
            sol[(i, j)] = total;
        }
    }
    if n > 0 {
        debug!("Counted {} optimal foldings.", sol[(0, n - 1)]);
    }
    sol
}
