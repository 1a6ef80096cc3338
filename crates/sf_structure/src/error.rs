use std::io;

/// Errors for malformed sequences, foldings and input files.
#[derive(thiserror::Error, Debug)]
pub enum StructureError {
    /// A character that is neither a bracket nor a dot.
    #[error("invalid dot-bracket character '{c}' at position {pos}")]
    InvalidDotBracket { pos: usize, c: char },

    /// A closing bracket without opener, or openers left at the end.
    #[error("unbalanced dot-bracket string: {0}")]
    UnbalancedDotBracket(String),

    /// Sequence and folding (or two foldings) differ in length.
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// A position lists itself as partner.
    #[error("base {0} is paired with itself")]
    SelfPaired(usize),

    /// `i -> j` but `j` does not point back to `i`.
    #[error("non-symmetric pair: {i} -> {j} but {j} {}", pointing_back(.back))]
    AsymmetricPair { i: usize, j: usize, back: Option<usize> },

    /// Two positions are paired but may not pair under the folding rules.
    #[error("{i} and {j} are paired, but not a valid base pair")]
    InvalidPair { i: usize, j: usize },

    /// Two pairs cross, which no secondary structure allows.
    #[error("pairs ({i},{j}) and ({k},{l}) cross")]
    Pseudoknot { i: usize, j: usize, k: usize, l: usize },

    /// The sequence is too long for `NAIDX` indexing.
    #[error("sequence of length {0} exceeds the supported maximum")]
    IndexOverflow(usize),

    /// Malformed FASTA content.
    #[error("FASTA format error: {0}")]
    Fasta(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn pointing_back(back: &Option<usize>) -> String {
    match back {
        Some(k) => format!("-> {k}"),
        None => "is unpaired".to_string(),
    }
}
