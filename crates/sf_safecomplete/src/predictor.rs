use std::time::Duration;
use std::time::Instant;
use ahash::AHashSet;
use log::debug;
use log::info;
use log::warn;
use ndarray::Array2;
use num_bigint::BigUint;
use sf_structure::FoldingPairs;
use sf_structure::Sequence;

use crate::collect_foldings;
use crate::count_solutions;
use crate::foldings;
use crate::report::TreeStats;
use crate::trivial_safety;
use crate::wuchty_all;
use crate::wuchty_fill;
use crate::DpTables;
use crate::FoldError;
use crate::FoldTree;
use crate::Foldings;
use crate::FoldingRules;
use crate::NussinovDP;
use crate::SafetyReport;
use crate::TreeBuilder;

/// One folding run over a single sequence.
///
/// Construction fills the DP tables and counts the optimal foldings;
/// everything else is derived on demand and discarded with the predictor.
#[derive(Debug)]
pub struct Predictor<'a> {
    seq: &'a Sequence,
    rules: FoldingRules,
    tables: DpTables,
    sol: Array2<BigUint>,
    fill_time: Duration,
}

impl<'a> Predictor<'a> {
    pub fn new(seq: &'a Sequence, rules: FoldingRules) -> Result<Self, FoldError> {
        if seq.is_empty() {
            return Err(FoldError::EmptySequence);
        }
        let start = Instant::now();
        let tables = DpTables::fill(seq, rules.min_hairpin);
        let sol = count_solutions(&tables);
        let fill_time = start.elapsed();
        info!(
            "{}: {} bases, {} optimal pairs, {} optimal foldings.",
            seq.name(),
            seq.len(),
            tables.optimal_pairs(),
            sol[(0, seq.len() - 1)]
        );
        Ok(Self { seq, rules, tables, sol, fill_time })
    }

    pub fn sequence(&self) -> &Sequence {
        self.seq
    }

    pub fn rules(&self) -> &FoldingRules {
        &self.rules
    }

    pub fn tables(&self) -> &DpTables {
        &self.tables
    }

    /// Solution counts of every interval.
    pub fn sol(&self) -> &Array2<BigUint> {
        &self.sol
    }

    /// Time spent filling the tables and counting.
    pub fn fill_time(&self) -> Duration {
        self.fill_time
    }

    /// Maximum number of pairs.
    pub fn optimal_pairs(&self) -> usize {
        self.tables.optimal_pairs()
    }

    /// Number of distinct optimal foldings.
    pub fn num_solutions(&self) -> &BigUint {
        &self.sol[(0, self.seq.len() - 1)]
    }

    /// The tree exactly as the backtracking produces it.
    pub fn build_tree(&self) -> Result<FoldTree, FoldError> {
        TreeBuilder::new(&self.tables, &self.sol).build()
    }

    /// The simplified tree of all optimal foldings, checked against the
    /// solution count.
    pub fn fold_tree(&self) -> Result<FoldTree, FoldError> {
        self.fold_tree_with_stats().map(|(tree, _)| tree)
    }

    /// As `fold_tree`, also reporting tree sizes and the time it took.
    pub fn fold_tree_with_stats(&self) -> Result<(FoldTree, TreeStats), FoldError> {
        let start = Instant::now();
        let mut tree = self.build_tree()?;
        let raw_nodes = tree.node_count();
        tree.simplify();
        let stats = TreeStats {
            raw_nodes,
            simplified_nodes: tree.node_count(),
            build_time: start.elapsed(),
        };
        debug!("Simplified fold tree from {raw_nodes} to {} nodes.", stats.simplified_nodes);

        let counted = tree.count_solutions();
        if &counted != self.num_solutions() {
            return Err(inconsistent(format!(
                "fold tree holds {counted} foldings, expected {}",
                self.num_solutions()
            )));
        }
        Ok((tree, stats))
    }

    /// Exact safety counts and classification for every base.
    pub fn safety(&self, tree: &FoldTree) -> Result<SafetyReport, FoldError> {
        SafetyReport::propagate(tree, self.seq.len(), self.num_solutions())
    }

    /// Lazily enumerate the foldings of `tree`.
    pub fn foldings<'t>(&self, tree: &'t FoldTree) -> Foldings<'t> {
        foldings(tree, self.seq.len())
    }

    /// All foldings of `tree`, unless there are more than `max`.
    pub fn collect_foldings(
        &self,
        tree: &FoldTree,
        max: usize,
    ) -> Result<Vec<FoldingPairs>, FoldError> {
        collect_foldings(tree, self.seq.len(), max)
    }

    /// Recompute the result by independent means and compare: the trivial
    /// safety of the explicit foldings against `safety`, and the foldings
    /// of `tree` against the Nussinov and Wuchty enumerations. Gives up
    /// with `EnumerationLimit` if there are more than `max` foldings.
    pub fn cross_check(
        &self,
        tree: &FoldTree,
        safety: &SafetyReport,
        max: usize,
    ) -> Result<(), FoldError> {
        let (seq, mh) = (self.seq, self.rules.min_hairpin);
        let all = self.collect_foldings(tree, max)?;
        safety.check_against(&trivial_safety(&all)?)?;
        let explicit: AHashSet<&FoldingPairs> = all.iter().collect();
        if explicit.len() != all.len() {
            return Err(inconsistent(format!(
                "fold tree repeats foldings, {} distinct of {}",
                explicit.len(),
                all.len()
            )));
        }

        let nussinov = NussinovDP::new(seq, mh);
        if !explicit.contains(&nussinov.mfe_folding()) {
            return Err(inconsistent(
                "Nussinov traceback is not among the optimal foldings".to_string(),
            ));
        }
        same_foldings("Nussinov", &explicit, &nussinov.all_mfe_foldings(max)?)?;

        let v = wuchty_fill(seq, mh);
        same_foldings("Wuchty", &explicit, &wuchty_all(seq, &v, mh, max)?)?;
        info!("{}: cross-checked {} optimal foldings.", seq.name(), all.len());
        Ok(())
    }

    /// Validate the reference folding of the sequence, if there is one,
    /// and report whether it is among the optimal foldings.
    pub fn reference_is_optimal(&self) -> Result<Option<bool>, FoldError> {
        let Some(reference) = self.seq.reference() else {
            return Ok(None);
        };
        reference.validate(self.seq, self.rules.min_hairpin)?;
        Ok(Some(reference.pair_count() == self.optimal_pairs()))
    }
}

fn same_foldings(
    name: &str,
    expected: &AHashSet<&FoldingPairs>,
    found: &[FoldingPairs],
) -> Result<(), FoldError> {
    let distinct: AHashSet<&FoldingPairs> = found.iter().collect();
    if found.len() != expected.len() || &distinct != expected {
        return Err(inconsistent(format!(
            "{name} finds {} optimal foldings ({} distinct), the fold tree holds {}",
            found.len(),
            distinct.len(),
            expected.len()
        )));
    }
    Ok(())
}

fn inconsistent(msg: String) -> FoldError {
    warn!("Consistency check failed: {msg}");
    FoldError::Consistency(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_structure::StructureError;

    #[test]
    fn test_predictor_pipeline() {
        let seq = Sequence::try_from("GGGAAAUCC").unwrap();
        let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
        assert_eq!(pred.optimal_pairs(), 3);
        assert_eq!(pred.num_solutions(), &BigUint::from(1u32));

        let tree = pred.fold_tree().unwrap();
        let all: Vec<FoldingPairs> = pred.foldings(&tree).collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].to_partners(), vec![8, 7, 6, -1, -1, -1, 2, 1, 0]);
        assert_eq!(all[0].to_dot_bracket(), "(((...)))");

        let safety = pred.safety(&tree).unwrap();
        assert_eq!(safety.num_safe(), 9);
    }

    #[test]
    fn test_predictor_cross_check() {
        let seq = Sequence::try_from("GGACUUCGAGCAUUAGCC").unwrap();
        let pred = Predictor::new(&seq, FoldingRules::with_min_hairpin(1)).unwrap();
        let tree = pred.fold_tree().unwrap();
        let safety = pred.safety(&tree).unwrap();
        let all = pred.collect_foldings(&tree, 100_000).unwrap();
        assert_eq!(BigUint::from(all.len()), *pred.num_solutions());
        pred.cross_check(&tree, &safety, 100_000).unwrap();
        assert!(matches!(
            pred.cross_check(&tree, &safety, all.len() - 1),
            Err(FoldError::EnumerationLimit(_))
        ));
    }

    #[test]
    fn test_cross_check_detects_mismatch() {
        let two = Sequence::try_from("GAAAACC").unwrap();
        let one = Sequence::try_from("GAAAAAC").unwrap();
        let pred_two = Predictor::new(&two, FoldingRules::default()).unwrap();
        let pred_one = Predictor::new(&one, FoldingRules::default()).unwrap();
        let tree_two = pred_two.fold_tree().unwrap();
        let safety_two = pred_two.safety(&tree_two).unwrap();
        let tree_one = pred_one.fold_tree().unwrap();
        let safety_one = pred_one.safety(&tree_one).unwrap();
        pred_one.cross_check(&tree_one, &safety_one, 10).unwrap();

        // Safety that does not describe the foldings of the tree.
        assert!(matches!(
            pred_one.cross_check(&tree_two, &safety_one, 10),
            Err(FoldError::Consistency(_))
        ));
        // Foldings the baselines do not find for this sequence.
        assert!(matches!(
            pred_one.cross_check(&tree_two, &safety_two, 10),
            Err(FoldError::Consistency(_))
        ));
    }

    #[test]
    fn test_tree_stats() {
        let seq = Sequence::try_from("GGGAAAUCC").unwrap();
        let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
        let (tree, stats) = pred.fold_tree_with_stats().unwrap();
        assert_eq!(stats.raw_nodes, pred.build_tree().unwrap().node_count());
        assert_eq!(stats.simplified_nodes, tree.node_count());
        assert_eq!(stats.simplified_nodes, 1);
    }

    #[test]
    fn test_predictor_long_unpaired() {
        // A small stack: no stage may nest once per base.
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let seq = Sequence::try_from("A".repeat(400).as_str()).unwrap();
                let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
                let tree = pred.fold_tree().unwrap();
                let safety = pred.safety(&tree).unwrap();
                let all = pred.collect_foldings(&tree, 1).unwrap();
                (safety.num_safe(), all.len(), all[0].pair_count())
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), (400, 1, 0));
    }

    #[test]
    fn test_predictor_empty() {
        let seq = Sequence::try_from("").unwrap();
        assert!(matches!(
            Predictor::new(&seq, FoldingRules::default()),
            Err(FoldError::EmptySequence)
        ));
    }

    #[test]
    fn test_predictor_limit() {
        let seq = Sequence::try_from("GCGCGCGCGCGC").unwrap();
        let pred = Predictor::new(&seq, FoldingRules::with_min_hairpin(0)).unwrap();
        assert_eq!(pred.num_solutions(), &BigUint::from(132u32));
        let tree = pred.fold_tree().unwrap();
        assert!(matches!(
            pred.collect_foldings(&tree, 131),
            Err(FoldError::EnumerationLimit(131))
        ));
        assert_eq!(pred.collect_foldings(&tree, 132).unwrap().len(), 132);
    }

    #[test]
    fn test_predictor_reference() {
        let seq = Sequence::try_from("GGGAAAUCC")
            .unwrap()
            .with_reference(FoldingPairs::try_from("(((...)))").unwrap())
            .unwrap();
        let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
        assert_eq!(pred.reference_is_optimal().unwrap(), Some(true));

        let seq = Sequence::try_from("GGGAAAUCC")
            .unwrap()
            .with_reference(FoldingPairs::try_from("((.....))").unwrap())
            .unwrap();
        let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
        assert_eq!(pred.reference_is_optimal().unwrap(), Some(false));

        let seq = Sequence::try_from("GGGAAAUCC")
            .unwrap()
            .with_reference(FoldingPairs::try_from("((((.))))").unwrap())
            .unwrap();
        let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
        assert!(matches!(pred.reference_is_optimal(), Err(FoldError::Structure(_))));
    }

    #[test]
    fn test_predictor_crossing_reference() {
        let seq = Sequence::try_from("GGCC")
            .unwrap()
            .with_reference(FoldingPairs::try_from("([)]").unwrap())
            .unwrap();
        let pred = Predictor::new(&seq, FoldingRules::with_min_hairpin(0)).unwrap();
        assert!(matches!(
            pred.reference_is_optimal(),
            Err(FoldError::Structure(StructureError::Pseudoknot { .. }))
        ));
    }
}
