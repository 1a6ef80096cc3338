//! Compact representation of a whole set of optimal foldings.
//!
//! A `FoldTree` node carries facts (forced pairs and forced free bases)
//! that hold in every folding it represents, and at most one way of
//! splitting further:
//!  - `Split::Join`: every folding of the prefix combines with every
//!    folding of the suffix (counts multiply),
//!  - `Split::Branches`: mutually exclusive alternatives (counts add),
//!  - `Split::Leaf`: exactly one folding.
//!
//! Each node owns its children. Every node also caches its solution count,
//! which the builder takes from the Sol table and which the structural
//! rewrites keep intact.
//!

use std::fmt;
use itertools::Itertools;
use num_bigint::BigUint;
use num_traits::One;
use sf_structure::Pair;
use sf_structure::NAIDX;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Split {
    #[default]
    Leaf,
    Join(Box<FoldTree>, Box<FoldTree>),
    Branches(Vec<FoldTree>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldTree {
    pub(crate) pairs: Vec<Pair>,
    pub(crate) free: Vec<NAIDX>,
    pub(crate) split: Split,
    pub(crate) sols: BigUint,
}

impl FoldTree {
    /// An empty node standing for `sols` foldings, filled in by the builder.
    pub(crate) fn with_sols(sols: BigUint) -> Self {
        Self {
            pairs: Vec::new(),
            free: Vec::new(),
            split: Split::Leaf,
            sols,
        }
    }

    /// A node representing exactly one folding.
    pub fn leaf(pairs: Vec<Pair>, free: Vec<NAIDX>) -> Self {
        Self {
            pairs,
            free,
            split: Split::Leaf,
            sols: BigUint::one(),
        }
    }

    /// Independent composition of `prefix` and `suffix`.
    pub fn join(pairs: Vec<Pair>, free: Vec<NAIDX>, prefix: FoldTree, suffix: FoldTree) -> Self {
        let sols = &prefix.sols * &suffix.sols;
        Self {
            pairs,
            free,
            split: Split::Join(Box::new(prefix), Box::new(suffix)),
            sols,
        }
    }

    /// Mutually exclusive alternatives. Panics if `branches` is empty.
    pub fn branches(pairs: Vec<Pair>, free: Vec<NAIDX>, branches: Vec<FoldTree>) -> Self {
        assert!(!branches.is_empty(), "a branching node needs at least one branch");
        let sols: BigUint = branches.iter().map(|b| &b.sols).sum();
        Self {
            pairs,
            free,
            split: Split::Branches(branches),
            sols,
        }
    }

    /// Pairs present in every folding of this node.
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Positions unpaired in every folding of this node.
    pub fn free(&self) -> &[NAIDX] {
        &self.free
    }

    pub fn split(&self) -> &Split {
        &self.split
    }

    /// Cached number of foldings this node represents.
    pub fn sols(&self) -> &BigUint {
        &self.sols
    }

    /// Neither branches nor a join below this node.
    pub fn is_branchless(&self) -> bool {
        matches!(self.split, Split::Leaf)
    }

    /// Number of foldings, recomputed from the structure: sum across
    /// branches, product across joins, one at a leaf.
    pub fn count_solutions(&self) -> BigUint {
        match &self.split {
            Split::Leaf => BigUint::one(),
            Split::Join(prefix, suffix) => prefix.count_solutions() * suffix.count_solutions(),
            Split::Branches(branches) => branches.iter().map(|b| b.count_solutions()).sum(),
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + match &self.split {
            Split::Leaf => 0,
            Split::Join(prefix, suffix) => prefix.node_count() + suffix.node_count(),
            Split::Branches(branches) => branches.iter().map(|b| b.node_count()).sum(),
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        if !self.pairs.is_empty() {
            writeln!(f, "{indent}Pairs: {}", self.pairs.iter().join(", "))?;
        }
        if !self.free.is_empty() {
            writeln!(f, "{indent}Free: {}", self.free.iter().join(", "))?;
        }
        match &self.split {
            Split::Leaf => Ok(()),
            Split::Join(prefix, suffix) => {
                writeln!(f, "{indent}Join prefix:")?;
                prefix.write_indented(f, depth + 1)?;
                writeln!(f, "{indent}Join suffix:")?;
                suffix.write_indented(f, depth + 1)
            }
            Split::Branches(branches) => {
                for (k, b) in branches.iter().enumerate() {
                    writeln!(f, "{indent}Alternative {} of {}:", k + 1, branches.len())?;
                    b.write_indented(f, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for FoldTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
