//! Backtracking into a `FoldTree` without enumerating foldings.
//!
//! A node works through a list of independent intervals. Intervals with a
//! single optimal decomposition write their pair and free bases straight
//! into the node and hand their subintervals back to the list. Intervals
//! with several decompositions are set aside: one of them becomes a set of
//! branches, several of them a balanced join. Nesting therefore only grows
//! with the ambiguity of the sequence, not with its length.
//!

use ndarray::Array2;
use num_bigint::BigUint;
use num_traits::One;
use sf_structure::NAIDX;

use crate::Decomposition;
use crate::DpTables;
use crate::FoldError;
use crate::FoldTree;
use crate::Split;

/// Default bound on the nesting depth of a built tree.
pub const MAX_TREE_DEPTH: usize = 500;

type Interval = (usize, usize);

pub struct TreeBuilder<'a> {
    tables: &'a DpTables,
    sol: &'a Array2<BigUint>,
    max_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    /// Panics unless `sol` holds the solution counts for `tables`.
    pub fn new(tables: &'a DpTables, sol: &'a Array2<BigUint>) -> Self {
        assert_eq!(
            sol.dim(),
            tables.v().dim(),
            "solution counts must be computed before backtracking"
        );
        assert!(
            tables.is_empty() || sol[(0, 0)].is_one(),
            "solution counts must be computed before backtracking"
        );
        Self { tables, sol, max_depth: MAX_TREE_DEPTH }
    }

    /// Refuse to build trees nesting deeper than `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The tree of all optimal foldings of the whole sequence.
    pub fn build(&self) -> Result<FoldTree, FoldError> {
        match self.tables.len() {
            0 => Ok(FoldTree::leaf(vec![], vec![])),
            n => self.build_interval((0, n - 1)),
        }
    }

    /// The tree of all optimal foldings of `[i, j]`.
    pub fn build_interval(&self, interval: Interval) -> Result<FoldTree, FoldError> {
        self.build_node(vec![interval], 0)
    }

    fn build_node(&self, todo: Vec<Interval>, depth: usize) -> Result<FoldTree, FoldError> {
        let sols = todo.iter().map(|&iv| self.interval_sols(iv)).product();
        let mut node = FoldTree::with_sols(sols);
        self.expand(todo, &mut node, depth)?;
        Ok(node)
    }

    fn interval_sols(&self, (i, j): Interval) -> BigUint {
        if i > j { BigUint::one() } else { self.sol[(i, j)].clone() }
    }

    fn expand(
        &self,
        mut todo: Vec<Interval>,
        node: &mut FoldTree,
        depth: usize,
    ) -> Result<(), FoldError> {
        if depth > self.max_depth {
            return Err(FoldError::DepthLimit(self.max_depth));
        }
        let mut ambiguous = Vec::new();
        while let Some((i, j)) = todo.pop() {
            if i > j {
                continue;
            }
            if i == j {
                node.free.push(i as NAIDX);
                continue;
            }
            let mut found = self.tables.decompositions(i, j);
            if found.len() > 1 {
                ambiguous.push((i, j, found));
                continue;
            }
            let Some(d) = found.pop() else {
                unreachable!("interval ({i}, {j}) has no optimal decomposition");
            };
            apply(d, node, &mut todo);
        }
        node.split = self.split(ambiguous, depth)?;
        Ok(())
    }

    fn split(
        &self,
        mut ambiguous: Vec<(usize, usize, Vec<Decomposition>)>,
        depth: usize,
    ) -> Result<Split, FoldError> {
        match ambiguous.len() {
            0 => Ok(Split::Leaf),
            1 => {
                let (_, _, found) = ambiguous.remove(0);
                let branches = found
                    .into_iter()
                    .map(|d| {
                        let mut branch = FoldTree::with_sols(d.count(self.sol));
                        let mut todo = Vec::new();
                        apply(d, &mut branch, &mut todo);
                        self.expand(todo, &mut branch, depth + 1)?;
                        Ok(branch)
                    })
                    .collect::<Result<Vec<_>, FoldError>>()?;
                Ok(Split::Branches(branches))
            }
            n => {
                let second: Vec<Interval> =
                    ambiguous.split_off(n / 2).into_iter().map(|(i, j, _)| (i, j)).collect();
                let first: Vec<Interval> = ambiguous.into_iter().map(|(i, j, _)| (i, j)).collect();
                Ok(Split::Join(
                    Box::new(self.build_node(first, depth + 1)?),
                    Box::new(self.build_node(second, depth + 1)?),
                ))
            }
        }
    }
}

/// Write the pair of `d` into `node` and queue its subintervals.
fn apply(d: Decomposition, node: &mut FoldTree, todo: &mut Vec<Interval>) {
    node.pairs.extend(d.pair);
    todo.push(d.prefix);
    todo.extend(d.suffix);
}
