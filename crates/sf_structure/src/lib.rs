//! The sf_structure crate.
//!
//! Sequence and secondary structure representations shared by all
//! predictors in the workspace:
//!  - Bases and sequences (with the pairing rule).
//!  - Pairs and pair sets.
//!  - Partner tables (`FoldingPairs`) and dot-bracket conversion.
//!  - A small FASTA reader that also picks up reference foldings.
//!

mod error;
mod base;
mod pair_set;
mod folding;
mod fasta;

pub use error::*;
pub use base::*;
pub use pair_set::*;
pub use folding::*;
pub use fasta::*;

/// Nucleic Acid INdeX: we use `u16` (0 to 65k), which is plenty for nucleic acids.
/// Should you ever want to fold longer sequences, beware that `P1KEY` needs to
/// be *twice as large* (in bits) as `NAIDX`, since pairs `(NAIDX, NAIDX)` are
/// compacted into one `P1KEY`.
pub type NAIDX = u16;

/// Pair key. Must be >= 2×`NAIDX` in bit width so we can safely pack two indices.
pub type P1KEY = u32;

/// Compile-time sanity check: 2×NAIDX bits must fit into P1KEY.
const _: () = {
    assert!(2 * NAIDX::BITS <= P1KEY::BITS);
};

