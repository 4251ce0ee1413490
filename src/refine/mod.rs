//! Refinement passes over the structured statement tree
//!
//! The passes in this module rewrite an already structured program into a
//! more idiomatic shape without changing its behaviour:
//!
//! - `reach_based_refine`: collapse independent `if` statements whose guards
//!   are proved mutually exclusive into `if / else if / else` cascades
//! - `cascade_scan`: report the cascades the refinement would build
//!
//! The building blocks (`cascade_detector`, `cascade_builder`,
//! `block_rewriter`) work on a single statement list at a time.

pub mod block_rewriter;
pub mod cascade_builder;
pub mod cascade_detector;
pub mod cascade_scan;
pub mod condition_extractor;
pub mod footprint;
pub mod locals;
pub mod reach_based_refine;

pub use block_rewriter::{apply_substitutions, BlockRewriter, Substitution, SubstitutionMap};
pub use cascade_builder::{CascadeBuilder, CascadeSummary};
pub use cascade_detector::{collect_candidates, Candidate, CascadeDetector, CascadeRun};
pub use cascade_scan::{scan_cascades, CascadeReport, CascadeScanner};
pub use condition_extractor::ConditionExtractor;
pub use footprint::{GuardFootprint, WriteSet};
pub use locals::PrivateLocals;
pub use reach_based_refine::ReachBasedRefine;

use crate::error::Result;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use serde::Serialize;
use std::time::Duration;

/// Trait for refinement passes
pub trait RefinementPass<'a> {
    /// Get the name of this refinement pass
    fn name(&self) -> &'static str;

    /// Run the pass over the whole program, returning whether it changed
    fn run(&mut self, program: &mut Program<'a>) -> Result<bool>;

    /// Check if this pass should run
    fn should_run(&self) -> bool {
        true
    }
}

/// Configuration for the refinement passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineOptions {
    /// Time budget of a single proof in milliseconds (0 disables the limit)
    pub solver_timeout_ms: u64,
    /// Upper bound on refinement passes run by the fixpoint driver
    pub max_iterations: usize,
    /// Report every eligible run of a statement list, not only the last one open
    pub collect_all_runs: bool,
    /// Turn the last guard of an exhaustive run into a plain `else`
    pub drop_exhaustive_guard: bool,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self {
            solver_timeout_ms: 2000,
            max_iterations: 8,
            collect_all_runs: true,
            drop_exhaustive_guard: true,
        }
    }
}

impl RefineOptions {
    /// Build options from command line flags, falling back to defaults
    pub fn from_cli(
        timeout_ms: Option<u64>,
        max_iterations: Option<usize>,
        single_run: bool,
        keep_exhaustive_guard: bool,
    ) -> Self {
        let defaults = Self::default();
        Self {
            solver_timeout_ms: timeout_ms.unwrap_or(defaults.solver_timeout_ms),
            max_iterations: max_iterations.unwrap_or(defaults.max_iterations),
            collect_all_runs: !single_run,
            drop_exhaustive_guard: !keep_exhaustive_guard,
        }
    }

    /// Proof time limit, if any
    pub fn solver_timeout(&self) -> Option<Duration> {
        (self.solver_timeout_ms > 0).then(|| Duration::from_millis(self.solver_timeout_ms))
    }
}

/// Counters collected while refining a program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefinementStats {
    /// Passes run by the fixpoint driver
    pub iterations: usize,
    /// Statement lists that were rewritten
    pub blocks_rewritten: usize,
    /// Else-if cascades created
    pub cascades_built: usize,
    /// `if` statements folded into a preceding cascade head
    pub statements_absorbed: usize,
    /// Cascades whose last guard became a plain `else`
    pub guards_dropped: usize,
}

impl RefinementStats {
    /// Add the counters of one pass run
    pub fn merge(&mut self, other: &RefinementStats) {
        self.iterations += other.iterations;
        self.blocks_rewritten += other.blocks_rewritten;
        self.cascades_built += other.cascades_built;
        self.statements_absorbed += other.statements_absorbed;
        self.guards_dropped += other.guards_dropped;
    }
}

/// Run reachability-based refinement until it stops changing the program
pub fn refine_to_fixpoint<'a>(
    allocator: &'a Allocator,
    program: &mut Program<'a>,
    options: &RefineOptions,
) -> Result<RefinementStats> {
    let mut stats = RefinementStats::default();
    let mut changed = true;

    while changed && stats.iterations < options.max_iterations {
        let mut pass = ReachBasedRefine::new(allocator, program.source_text, options);
        if !pass.should_run() {
            break;
        }
        log::debug!("Running {} (iteration {})", pass.name(), stats.iterations + 1);
        changed = pass.run(program)?;
        stats.merge(pass.stats());
        stats.iterations += 1;
    }

    if changed && stats.iterations == options.max_iterations && options.max_iterations > 0 {
        log::warn!(
            "Refinement still changing after {} iterations",
            options.max_iterations
        );
    }
    Ok(stats)
}
