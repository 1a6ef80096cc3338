//! Structure-preserving rewrites of a `FoldTree`.
//!
//! Neither rewrite changes the set of represented foldings or any cached
//! solution count. After `simplify`, every fact that holds in all
//! foldings of a node is stored at that node or above it.
//!

use std::mem;
use nohash_hasher::IntSet;
use sf_structure::PairSet;
use sf_structure::NAIDX;

use crate::FoldTree;
use crate::Split;

impl FoldTree {
    /// Apply both rewrites bottom-up, then sort the facts of every node.
    /// Applying it a second time leaves the tree unchanged.
    pub fn simplify(&mut self) {
        match &mut self.split {
            Split::Leaf => (),
            Split::Join(prefix, suffix) => {
                prefix.simplify();
                suffix.simplify();
            }
            Split::Branches(branches) => {
                for b in branches.iter_mut() {
                    b.simplify();
                }
            }
        }
        self.lift_common();
        self.collapse_join();
        self.pairs.sort_unstable();
        self.free.sort_unstable();
    }

    /// Move pairs and free positions shared by all branches into this node.
    /// A node with a single branch absorbs it completely.
    pub fn lift_common(&mut self) {
        let Split::Branches(branches) = &mut self.split else {
            return;
        };
        if branches.len() == 1 {
            let Some(only) = branches.pop() else {
                return;
            };
            self.pairs.extend(only.pairs);
            self.free.extend(only.free);
            self.split = only.split;
            return;
        }

        let mut pairs: PairSet = branches[0].pairs.iter().collect();
        let mut free: IntSet<NAIDX> = branches[0].free.iter().copied().collect();
        for b in &branches[1..] {
            pairs.retain_common(&b.pairs);
            free.retain(|k| b.free.contains(k));
        }
        if pairs.is_empty() && free.is_empty() {
            return;
        }
        for b in branches.iter_mut() {
            b.pairs.retain(|p| !pairs.contains(p));
            b.free.retain(|k| !free.contains(k));
        }
        self.pairs.extend(pairs.iter());
        self.free.extend(free);
    }

    /// Pull the facts of both join children into this node. A child left
    /// without further split is dropped, and the other child's split takes
    /// the place of the join.
    pub fn collapse_join(&mut self) {
        let Split::Join(prefix, suffix) = &mut self.split else {
            return;
        };
        for child in [&mut **prefix, &mut **suffix] {
            self.pairs.append(&mut child.pairs);
            self.free.append(&mut child.free);
        }
        let promoted = match (prefix.is_branchless(), suffix.is_branchless()) {
            (true, true) => Split::Leaf,
            (true, false) => mem::take(&mut suffix.split),
            (false, true) => mem::take(&mut prefix.split),
            (false, false) => return,
        };
        self.split = promoted;
    }
}
