use sf_structure::StructureError;

/// Error type for the safe and complete folding engine.
#[derive(thiserror::Error, Debug)]
pub enum FoldError {
    /// Malformed sequence or folding handed in by the caller.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// An internal invariant did not hold: non-exact division while
    /// distributing solution counts, safety sums not matching the total,
    /// or two safety determinations disagreeing.
    #[error("consistency check failed: {0}")]
    Consistency(String),

    /// A bounded enumeration would have exceeded its limit.
    #[error("enumeration limit of {0} exceeded")]
    EnumerationLimit(usize),

    /// The fold tree would nest deeper than the builder allows.
    #[error("fold tree deeper than {0} levels")]
    DepthLimit(usize),

    /// There is nothing to fold.
    #[error("cannot fold an empty sequence")]
    EmptySequence,
}
