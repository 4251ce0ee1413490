//! elif-refine: reachability-based else-if refinement for decompiled code
//!
//! This library collapses runs of independent `if` statements, as emitted by
//! a decompiler's structuring phase, into `if / else if / else` cascades. Each
//! collapse is justified by Z3 proofs that the guards are mutually exclusive
//! (and, for a trailing plain `else`, that they cover every outcome).

pub mod cli;
pub mod error;
pub mod refine;
pub mod refiner;
pub mod smt;

pub use error::{Error as RefineError, Result as RefineResult};
pub use refiner::{RefineOutput, Refiner};

// Re-export commonly used types
pub use refine::{
    refine_to_fixpoint, scan_cascades, CascadeReport, ReachBasedRefine, RefineOptions,
    RefinementPass, RefinementStats,
};
pub use smt::{ConditionProver, ConditionTranslator};
