//! Maximum base-pair DP fill.
//!
//! `V[i][j]` is the maximum number of pairs within `[i, j]`, `W[i][j]` the
//! maximum given that `i` and `j` pair with each other (zero if they
//! cannot). Both tables are `n x n`; only the upper triangle and the
//! empty intervals `(i, i-1)` are ever read.
//!

use log::debug;
use ndarray::Array2;
use sf_structure::Sequence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpTables {
    v: Array2<usize>,
    w: Array2<usize>,
}

impl DpTables {
    /// O(n^3) fill of V, followed by the O(n^2) fill of W.
    pub fn fill(seq: &Sequence, min_hairpin: usize) -> Self {
        let v = fill_v(seq, min_hairpin);
        let w = fill_w(seq, &v, min_hairpin);
        debug!(
            "Filled DP tables for {} bases: {} optimal pairs.",
            seq.len(),
            if seq.is_empty() { 0 } else { v[(0, seq.len() - 1)] }
        );
        Self { v, w }
    }

    pub fn v(&self) -> &Array2<usize> {
        &self.v
    }

    pub fn w(&self) -> &Array2<usize> {
        &self.w
    }

    /// Sequence length the tables were filled for.
    pub fn len(&self) -> usize {
        self.v.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of pairs of the whole sequence.
    pub fn optimal_pairs(&self) -> usize {
        match self.len() {
            0 => 0,
            n => self.v[(0, n - 1)],
        }
    }
}

fn fill_v(seq: &Sequence, min_hairpin: usize) -> Array2<usize> {
    let n = seq.len();
    let mut v = Array2::from_elem((n, n), 0);
    for l in 1..n {
        for i in 0..n - l {
            let j = i + l;
            let mut best = 0;
            for k in i..j {
                best = best.max(v[(i, k)] + v[(k + 1, j)]);
            }
            if seq.can_pair(i, j, min_hairpin) {
                best = best.max(v[(i + 1, j - 1)] + 1);
            }
            v[(i, j)] = best;
        }
    }
    v
}

fn fill_w(seq: &Sequence, v: &Array2<usize>, min_hairpin: usize) -> Array2<usize> {
    let n = seq.len();
    let mut w = Array2::from_elem((n, n), 0);
    for l in 1..n {
        for i in 0..n - l {
            let j = i + l;
            if seq.can_pair(i, j, min_hairpin) {
                w[(i, j)] = v[(i + 1, j - 1)] + 1;
            }
        }
    }
    w
}
