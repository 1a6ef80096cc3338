//! Complete enumeration of optimal foldings with an explicit stack
//! (Wuchty, Fontana, Hofacker, Schuster, Biopolymers 1999).
//!
//! Each stack entry is a partial folding plus the intervals still to be
//! decomposed. The last base of an interval is either unpaired or paired
//! with exactly one `l`, so every folding is produced exactly once. This
//! is independent of the `FoldTree` machinery and serves as its oracle.
//!

use ndarray::Array2;
use sf_structure::FoldingPairs;
use sf_structure::Pair;
use sf_structure::Sequence;
use sf_structure::NAIDX;

use crate::FoldError;

/// Fill the maximum-pairing table by the "last base" decomposition.
pub fn wuchty_fill(seq: &Sequence, min_hairpin: usize) -> Array2<usize> {
    let n = seq.len();
    let mut v = Array2::from_elem((n, n), 0);
    for i in (0..n).rev() {
        for j in i + 1..n {
            let mut best = v[(i, j - 1)];
            for l in i..j {
                if !seq.can_pair(l, j, min_hairpin) {
                    continue;
                }
                let mut val = 1 + v[(l + 1, j - 1)];
                if l > i + 1 {
                    val += v[(i, l - 1)];
                }
                best = best.max(val);
            }
            v[(i, j)] = best;
        }
    }
    v
}

#[derive(Debug, Clone)]
struct State {
    intervals: Vec<(usize, usize)>,
    pairs: Vec<Pair>,
}

impl State {
    /// Intervals shorter than two bases have nothing left to decide.
    fn push_interval(&mut self, i: usize, j: usize) {
        if i < j {
            self.intervals.push((i, j));
        }
    }

    fn into_folding(self, len: usize) -> FoldingPairs {
        let mut folding = FoldingPairs::unpaired(len);
        for pair in self.pairs {
            folding.set_pair(pair);
        }
        folding
    }
}

/// All optimal foldings from a table filled by `wuchty_fill`. Fails once
/// more than `max_stack` partial foldings are pending.
pub fn wuchty_all(
    seq: &Sequence,
    v: &Array2<usize>,
    min_hairpin: usize,
    max_stack: usize,
) -> Result<Vec<FoldingPairs>, FoldError> {
    let n = seq.len();
    let mut out = Vec::new();
    let mut root = State {
        intervals: Vec::new(),
        pairs: Vec::new(),
    };
    if n > 0 {
        root.push_interval(0, n - 1);
    }
    let mut stack = vec![root];

    while let Some(mut state) = stack.pop() {
        let Some((i, j)) = state.intervals.pop() else {
            out.push(state.into_folding(n));
            continue;
        };

        if v[(i, j)] == v[(i, j - 1)] {
            let mut next = state.clone();
            next.push_interval(i, j - 1);
            stack.push(next);
        }
        for l in i..j {
            if !seq.can_pair(l, j, min_hairpin) {
                continue;
            }
            let mut val = 1 + v[(l + 1, j - 1)];
            if l > i + 1 {
                val += v[(i, l - 1)];
            }
            if val == v[(i, j)] {
                let mut next = state.clone();
                if l > i {
                    next.push_interval(i, l - 1);
                }
                next.push_interval(l + 1, j - 1);
                next.pairs.push(Pair::new(l as NAIDX, j as NAIDX));
                stack.push(next);
            }
        }
        if stack.len() > max_stack {
            return Err(FoldError::EnumerationLimit(max_stack));
        }
    }
    Ok(out)
}
