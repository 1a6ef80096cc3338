//! Plain Nussinov base-pair maximization.
//!
//! Baseline predictor over the `V` table alone: one optimal folding by
//! traceback, or all of them by a stack enumeration that decides the
//! first base of every open interval. It does not count and cannot tell
//! safe bases apart, but it is a useful oracle.
//!

use ndarray::Array2;
use sf_structure::FoldingPairs;
use sf_structure::Pair;
use sf_structure::Sequence;
use sf_structure::NAIDX;

use crate::FoldError;

#[derive(Debug, Clone)]
pub struct NussinovDP<'a> {
    seq: &'a Sequence,
    min_hairpin: usize,
    v: Array2<usize>,
}

impl<'a> NussinovDP<'a> {
    pub fn new(seq: &'a Sequence, min_hairpin: usize) -> Self {
        let v = nussinov_fill(seq, min_hairpin);
        Self { seq, min_hairpin, v }
    }

    pub fn dp_table(&self) -> &Array2<usize> {
        &self.v
    }

    pub fn optimal_pairs(&self) -> usize {
        match self.v.nrows() {
            0 => 0,
            n => self.v[(0, n - 1)],
        }
    }

    /// A single optimal folding.
    pub fn mfe_folding(&self) -> FoldingPairs {
        nussinov_traceback(self.seq, &self.v, self.min_hairpin)
    }

    /// Every optimal folding exactly once, in sorted order. Fails once
    /// more than `max` foldings are found.
    pub fn all_mfe_foldings(&self, max: usize) -> Result<Vec<FoldingPairs>, FoldError> {
        let n = self.seq.len();
        let mut out = Vec::new();
        let mut pending = vec![(open_interval(n), Vec::new())];

        while let Some((mut open, pairs)) = pending.pop() {
            let Some((i, j)) = open.pop() else {
                if out.len() == max {
                    return Err(FoldError::EnumerationLimit(max));
                }
                let mut folding = FoldingPairs::unpaired(n);
                for pair in pairs {
                    folding.set_pair(pair);
                }
                out.push(folding);
                continue;
            };
            let best = self.v[(i, j)];
            let rest = |k: usize| if k < j { self.v[(k + 1, j)] } else { 0 };

            if self.v[(i + 1, j)] == best {
                let mut open = open.clone();
                push_open(&mut open, i + 1, j);
                pending.push((open, pairs.clone()));
            }
            for k in i + 1..=j {
                if !self.seq.can_pair(i, k, self.min_hairpin)
                    || self.v[(i + 1, k - 1)] + 1 + rest(k) != best
                {
                    continue;
                }
                let mut open = open.clone();
                push_open(&mut open, i + 1, k - 1);
                push_open(&mut open, k + 1, j);
                let mut pairs = pairs.clone();
                pairs.push(Pair::new(i as NAIDX, k as NAIDX));
                pending.push((open, pairs));
            }
        }
        out.sort_unstable();
        Ok(out)
    }
}

fn open_interval(n: usize) -> Vec<(usize, usize)> {
    let mut open = Vec::new();
    if n > 0 {
        push_open(&mut open, 0, n - 1);
    }
    open
}

/// Only intervals of two or more bases have a choice left.
fn push_open(open: &mut Vec<(usize, usize)>, i: usize, j: usize) {
    if i < j {
        open.push((i, j));
    }
}

/// Fill the Nussinov table of `seq`: either `i` and `j` pair around an
/// optimal inner interval, or the interval splits into two at some `k`.
pub fn nussinov_fill(seq: &Sequence, min_hairpin: usize) -> Array2<usize> {
    let n = seq.len();
    let mut v = Array2::zeros((n, n));
    for l in 1..n {
        for i in 0..n - l {
            let j = i + l;
            let split = (i..j).map(|k| v[(i, k)] + v[(k + 1, j)]).max().unwrap_or(0);
            let closed = if seq.can_pair(i, j, min_hairpin) {
                v[(i + 1, j - 1)] + 1
            } else {
                0
            };
            v[(i, j)] = split.max(closed);
        }
    }
    v
}

/// One optimal folding from a table filled by `nussinov_fill`. Closing
/// pairs are preferred over splits, and the first optimal split is taken.
pub fn nussinov_traceback(seq: &Sequence, v: &Array2<usize>, min_hairpin: usize) -> FoldingPairs {
    let n = seq.len();
    let mut folding = FoldingPairs::unpaired(n);
    let mut stack = open_interval(n);
    while let Some((i, j)) = stack.pop() {
        if i >= j || v[(i, j)] == 0 {
            continue;
        }
        let best = v[(i, j)];
        if seq.can_pair(i, j, min_hairpin) && best == v[(i + 1, j - 1)] + 1 {
            folding.set_pair(Pair::new(i as NAIDX, j as NAIDX));
            stack.push((i + 1, j - 1));
        } else if let Some(k) = (i..j).find(|&k| best == v[(i, k)] + v[(k + 1, j)]) {
            stack.push((i, k));
            stack.push((k + 1, j));
        }
    }
    folding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DpTables;

    #[test]
    fn test_nussinov_fill() {
        let seq = Sequence::try_from("GGGAAAUCC").unwrap();
        let v = nussinov_fill(&seq, 0);
        assert_eq!(v.row(0).to_vec(), vec![0, 0, 0, 0, 0, 0, 1, 2, 3]);
        assert_eq!(v.row(2).to_vec(), vec![0, 0, 0, 0, 0, 0, 1, 2, 2]);
        assert_eq!(v.row(5).to_vec(), vec![0, 0, 0, 0, 0, 0, 1, 1, 1]);

        let seq = Sequence::try_from("AC").unwrap();
        assert_eq!(nussinov_fill(&seq, 0)[(0, 1)], 0);
    }

    #[test]
    fn test_nussinov_matches_fill() {
        let seq = Sequence::try_from("GGACUUCGAGCAUUAGCCGAUC").unwrap();
        for mh in [0, 1, 3] {
            let dp = nussinov_fill(&seq, mh);
            let tables = DpTables::fill(&seq, mh);
            let n = seq.len();
            for i in 0..n {
                for j in i..n {
                    assert_eq!(dp[(i, j)], tables.v()[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn test_nussinov_traceback() {
        let seq = Sequence::try_from("GGGAAAUCC").unwrap();
        let dp = nussinov_fill(&seq, 3);
        let folding = nussinov_traceback(&seq, &dp, 3);
        assert_eq!(folding.to_partners(), vec![8, 7, 6, -1, -1, -1, 2, 1, 0]);

        let seq = Sequence::try_from("CG").unwrap();
        let folding = NussinovDP::new(&seq, 0).mfe_folding();
        assert_eq!(folding.to_partners(), vec![1, 0]);

        let seq = Sequence::try_from("ACGUACGUACGUACGU").unwrap();
        let nuss = NussinovDP::new(&seq, 3);
        let folding = nuss.mfe_folding();
        assert_eq!(folding.pair_count(), nuss.optimal_pairs());
        folding.validate(&seq, 3).unwrap();
    }

    #[test]
    fn test_nussinov_all() {
        let seq = Sequence::try_from("GAAAACC").unwrap();
        let all: Vec<String> = NussinovDP::new(&seq, 3)
            .all_mfe_foldings(10)
            .unwrap()
            .iter()
            .map(|f| f.to_dot_bracket())
            .collect();
        assert_eq!(all, vec!["(....).", "(.....)"]);

        let seq = Sequence::try_from("GCGCGCGC").unwrap();
        let nuss = NussinovDP::new(&seq, 0);
        assert_eq!(nuss.all_mfe_foldings(14).unwrap().len(), 14);
        assert!(matches!(nuss.all_mfe_foldings(13), Err(FoldError::EnumerationLimit(13))));

        let seq = Sequence::try_from("A").unwrap();
        let all = NussinovDP::new(&seq, 3).all_mfe_foldings(1).unwrap();
        assert_eq!(all, vec![FoldingPairs::unpaired(1)]);
    }
}
