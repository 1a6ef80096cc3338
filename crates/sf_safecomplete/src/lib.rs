//! The sf_safecomplete crate.
//!
//! Safe and complete maximum base-pair folding:
//!  - DP fill and exact counting of all optimal foldings.
//!  - A compact tree of the whole optimal solution space (FoldTree).
//!  - Exact per-base and per-pair safety counts derived from that tree.
//!  - Lazy enumeration of the represented foldings.
//!
//! Provides baseline predictors, used as oracles.
//!  - Nussinov fill and traceback.
//!  - Wuchty complete enumeration.
//!

/// Serializable run summaries.
pub mod report;

mod error;
mod rules;
mod fill;
mod count;
mod foldtree;
mod backtrack;
mod simplify;
mod safety;
mod enumerate;
mod predictor;
mod nussinov;
mod wuchty;

pub use error::*;
pub use rules::*;
pub use fill::*;
pub use count::*;
pub use foldtree::*;
pub use backtrack::*;
pub use safety::*;
pub use enumerate::*;
pub use predictor::*;
pub use nussinov::*;
pub use wuchty::*;
