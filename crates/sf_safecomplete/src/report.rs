//! Serializable summary of one folding run.
//!
//! Solution counts are exact and usually exceed any JSON number type, so
//! they are written as decimal strings.
//!

use std::time::Duration;
use num_bigint::BigUint;
use serde::Serialize;
use serde::Serializer;
use sf_structure::NAIDX;

use crate::FoldError;
use crate::FoldTree;
use crate::Predictor;
use crate::SafetyReport;

#[derive(Debug, Clone, Serialize)]
pub struct PairCount {
    pub i: NAIDX,
    pub j: NAIDX,
    #[serde(serialize_with = "as_decimal")]
    pub count: BigUint,
}

/// Fold tree sizes before and after simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub raw_nodes: usize,
    pub simplified_nodes: usize,
    /// Backtracking and simplification together.
    #[serde(serialize_with = "as_seconds")]
    pub build_time: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldingReport {
    pub name: String,
    pub sequence: String,
    pub min_hairpin: usize,
    pub optimal_pairs: usize,
    #[serde(serialize_with = "as_decimal")]
    pub num_solutions: BigUint,
    /// One optimal folding in dot-bracket notation.
    pub example: String,
    /// The sequence with unsafe bases in lower case.
    pub safety: String,
    pub num_safe: usize,
    pub safe: Vec<bool>,
    #[serde(serialize_with = "all_as_decimal")]
    pub free_counts: Vec<BigUint>,
    pub pair_counts: Vec<PairCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_optimal: Option<bool>,
    pub tree: TreeStats,
    #[serde(serialize_with = "as_seconds")]
    pub fill_time: Duration,
    /// Set once the result was confirmed by `Predictor::cross_check`.
    pub cross_checked: bool,
}

impl FoldingReport {
    pub fn new(
        pred: &Predictor<'_>,
        tree: &FoldTree,
        stats: TreeStats,
        safety: &SafetyReport,
    ) -> Result<Self, FoldError> {
        let seq = pred.sequence();
        let example = pred
            .foldings(tree)
            .next()
            .ok_or_else(|| FoldError::Consistency("fold tree without foldings".to_string()))?;
        Ok(Self {
            name: seq.name().to_string(),
            sequence: seq.bases_string(),
            min_hairpin: pred.rules().min_hairpin,
            optimal_pairs: pred.optimal_pairs(),
            num_solutions: pred.num_solutions().clone(),
            example: example.to_dot_bracket(),
            safety: seq.safety_string(safety.safe()),
            num_safe: safety.num_safe(),
            safe: safety.safe().to_vec(),
            free_counts: (0..seq.len()).map(|i| safety.single(i).clone()).collect(),
            pair_counts: safety
                .pair_counts()
                .into_iter()
                .map(|(p, c)| PairCount { i: p.i(), j: p.j(), count: c.clone() })
                .collect(),
            reference_optimal: pred.reference_is_optimal()?,
            tree: stats,
            fill_time: pred.fill_time(),
            cross_checked: false,
        })
    }
}

fn as_decimal<S: Serializer>(n: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(n)
}

fn as_seconds<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(d.as_secs_f64())
}

fn all_as_decimal<S: Serializer>(ns: &[BigUint], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(ns.iter().map(|n| n.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sf_structure::Sequence;
    use crate::FoldingRules;

    #[test]
    fn test_report_json() {
        let seq = "GAAAACC".parse::<Sequence>().unwrap().with_comment("hp demo");
        let pred = Predictor::new(&seq, FoldingRules::default()).unwrap();
        let (tree, stats) = pred.fold_tree_with_stats().unwrap();
        let safety = pred.safety(&tree).unwrap();
        let report = FoldingReport::new(&pred, &tree, stats, &safety).unwrap();

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["name"], json!("hp"));
        assert_eq!(value["num_solutions"], json!("2"));
        assert_eq!(value["safety"], json!("gAAAAcc"));
        assert_eq!(value["num_safe"], json!(4));
        assert_eq!(value["free_counts"], json!(["0", "2", "2", "2", "2", "1", "1"]));
        assert_eq!(value["pair_counts"], json!([
            {"i": 0, "j": 5, "count": "1"},
            {"i": 0, "j": 6, "count": "1"},
        ]));
        assert_eq!(value["example"], json!("(.....)"));
        assert!(value.get("reference_optimal").is_none());
        assert_eq!(value["tree"]["simplified_nodes"], json!(3));
        assert!(value["tree"]["build_time"].is_f64());
        assert!(value["fill_time"].is_f64());
        assert_eq!(value["cross_checked"], json!(false));
    }
}
