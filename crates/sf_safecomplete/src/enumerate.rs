//! Lazy expansion of a `FoldTree` into explicit foldings.
//!
//! The number of foldings grows exponentially with the sequence length,
//! so nothing is materialized up front: a join re-expands its suffix for
//! every folding of its prefix, and branches are expanded one after the
//! other.
//!

use std::iter;
use num_bigint::BigUint;
use sf_structure::FoldingPairs;

use crate::FoldError;
use crate::FoldTree;
use crate::Split;

/// Pull-based iterator over all foldings represented by a tree.
pub struct Foldings<'a> {
    inner: Box<dyn Iterator<Item = FoldingPairs> + 'a>,
}

impl Iterator for Foldings<'_> {
    type Item = FoldingPairs;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// All foldings of `tree`, as partner tables of length `len`.
pub fn foldings(tree: &FoldTree, len: usize) -> Foldings<'_> {
    Foldings { inner: expand(tree, len) }
}

/// Materialize all foldings of `tree`, refusing to produce more than `max`.
pub fn collect_foldings(
    tree: &FoldTree,
    len: usize,
    max: usize,
) -> Result<Vec<FoldingPairs>, FoldError> {
    if tree.count_solutions() > BigUint::from(max) {
        return Err(FoldError::EnumerationLimit(max));
    }
    Ok(foldings(tree, len).collect())
}

fn expand(node: &FoldTree, len: usize) -> Box<dyn Iterator<Item = FoldingPairs> + '_> {
    let below: Box<dyn Iterator<Item = FoldingPairs> + '_> = match node.split() {
        Split::Leaf => Box::new(iter::once(FoldingPairs::unpaired(len))),
        Split::Branches(branches) => Box::new(branches.iter().flat_map(move |b| expand(b, len))),
        Split::Join(prefix, suffix) => Box::new(expand(prefix, len).flat_map(move |left| {
            expand(suffix, len).map(move |right| {
                let mut both = left.clone();
                both.overlay(&right);
                both
            })
        })),
    };
    Box::new(below.map(move |mut folding| {
        for &pair in node.pairs() {
            folding.set_pair(pair);
        }
        folding
    }))
}
