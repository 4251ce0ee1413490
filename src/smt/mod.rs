//! SMT support for the refinement passes
//!
//! - `translator`: guard expressions to Z3 formulas
//! - `prover`: validity and exclusivity proofs over those formulas

pub mod prover;
pub mod translator;

pub use prover::ConditionProver;
pub use translator::{member_path, ConditionTranslator, Formula, NumericTerm};
