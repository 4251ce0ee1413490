//! Detection of `if` runs that can be collapsed into else-if cascades
//!
//! The detector walks the `if` children of a statement list from last to
//! first. Scanning backwards treats the bottom-most statements as the
//! innermost branches of the cascade, and lets the detector notice when the
//! guards gathered so far already cover every outcome: no earlier statement
//! can be mutually exclusive with such a run.

use super::condition_extractor::ConditionExtractor;
use super::footprint::{GuardFootprint, WriteSet};
use super::locals::PrivateLocals;
use crate::error::Result;
use crate::smt::ConditionProver;
use oxc_ast::ast::{IfStatement, Statement};
use z3::ast::Bool;

/// An `if` statement and its position in the enclosing statement list
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'s, 'a> {
    /// Position in the statement list
    pub index: usize,
    /// The `if` statement at that position
    pub statement: &'s IfStatement<'a>,
}

/// Collect the direct `if` children of a statement list in source order
pub fn collect_candidates<'s, 'a>(statements: &'s [Statement<'a>]) -> Vec<Candidate<'s, 'a>> {
    statements
        .iter()
        .enumerate()
        .filter_map(|(index, stmt)| match stmt {
            Statement::IfStatement(if_stmt) => Some(Candidate {
                index,
                statement: if_stmt,
            }),
            _ => None,
        })
        .collect()
}

/// A run of adjacent `if` statements proved safe to collapse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeRun {
    /// Statement list indices of the members, in source order
    pub members: Vec<usize>,
    /// The members' guards were proved to cover every outcome
    pub exhaustive: bool,
}

/// Run under construction, members in scan (reverse source) order
#[derive(Default)]
struct OpenRun {
    members: Vec<usize>,
    formulas: Vec<Bool>,
    reads: GuardFootprint,
}

impl OpenRun {
    fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    /// `index` sits directly before the earliest member
    fn follows(&self, index: usize) -> bool {
        self.members.last().map_or(true, |&first| index + 1 == first)
    }

    fn push(&mut self, index: usize, formula: Bool, footprint: GuardFootprint) {
        self.members.push(index);
        self.formulas.push(formula);
        self.reads.extend(&footprint);
    }

    fn finish(self, exhaustive: bool) -> Option<CascadeRun> {
        if self.len() < 2 {
            return None;
        }
        let mut members = self.members;
        members.reverse();
        Some(CascadeRun {
            members,
            exhaustive,
        })
    }
}

/// Finds collapsible runs among the `if` children of one statement list
pub struct CascadeDetector<'r, 's> {
    extractor: &'r mut ConditionExtractor<'s>,
    prover: &'r ConditionProver,
    collect_all_runs: bool,
}

impl<'r, 's> CascadeDetector<'r, 's> {
    /// Create a detector. With `collect_all_runs` unset only the run still
    /// open when the scan ends is reported.
    pub fn new(
        extractor: &'r mut ConditionExtractor<'s>,
        prover: &'r ConditionProver,
        collect_all_runs: bool,
    ) -> Self {
        Self {
            extractor,
            prover,
            collect_all_runs,
        }
    }

    /// Detect the eligible runs among `candidates` (given in source order).
    /// `locals` are the bindings calls in branch bodies cannot reach.
    pub fn detect(
        &mut self,
        candidates: &[Candidate<'_, '_>],
        locals: &PrivateLocals,
    ) -> Result<Vec<CascadeRun>> {
        let mut runs = Vec::new();
        let mut open = OpenRun::default();
        let mut stopped_exhaustive = false;

        for candidate in candidates.iter().rev() {
            // Once the run covers every outcome, nothing earlier can join it.
            if !open.is_empty() && self.prover.exhaustive(&open.formulas)? {
                if !self.collect_all_runs {
                    stopped_exhaustive = true;
                    break;
                }
                self.close(&mut open, true, &mut runs);
            }

            let stmt = candidate.statement;
            let footprint = GuardFootprint::of(&stmt.test);
            if stmt.alternate.is_some() || footprint.has_side_effects {
                self.close(&mut open, false, &mut runs);
                continue;
            }

            let guard = self.extractor.extract(stmt);
            let joins = open.follows(candidate.index)
                && !WriteSet::of(&stmt.consequent).interferes_with(&open.reads, locals)
                && self.prover.mutually_exclusive(&guard, &open.formulas)?;
            if !joins {
                self.close(&mut open, false, &mut runs);
            }
            open.push(candidate.index, guard, footprint);
        }

        let exhaustive =
            stopped_exhaustive || (open.len() >= 2 && self.prover.exhaustive(&open.formulas)?);
        runs.extend(open.finish(exhaustive));

        for run in &runs {
            log::debug!(
                "Found else-if run at {:?} (exhaustive: {})",
                run.members,
                run.exhaustive
            );
        }
        Ok(runs)
    }

    /// End the open run, keeping it only when every run is collected
    fn close(&self, open: &mut OpenRun, exhaustive: bool, runs: &mut Vec<CascadeRun>) {
        let run = std::mem::take(open);
        if self.collect_all_runs {
            runs.extend(run.finish(exhaustive));
        }
    }
}
