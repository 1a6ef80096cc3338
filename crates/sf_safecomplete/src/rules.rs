use serde::Deserialize;
use serde::Serialize;

/// Folding rules that are configuration, not hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldingRules {
    /// Minimum number of free bases enclosed by a hairpin loop.
    pub min_hairpin: usize,
}

impl Default for FoldingRules {
    fn default() -> Self {
        Self { min_hairpin: 3 }
    }
}

impl FoldingRules {
    pub fn with_min_hairpin(min_hairpin: usize) -> Self {
        Self { min_hairpin }
    }
}

