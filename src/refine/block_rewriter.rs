//! Per-statement-list rewriting driven by a substitution map

use super::cascade_builder::{CascadeBuilder, CascadeSummary};
use super::cascade_detector::{collect_candidates, CascadeDetector};
use super::condition_extractor::ConditionExtractor;
use super::locals::PrivateLocals;
use crate::error::Result;
use crate::smt::ConditionProver;
use oxc_allocator::Vec as AllocVec;
use oxc_ast::ast::Statement;
use oxc_ast::AstBuilder;
use std::collections::HashMap;

/// Replacement for a statement at a given index of its list
pub enum Substitution<'a> {
    Replace(Statement<'a>),
    Delete,
}

/// Pending substitutions for one statement list, keyed by index
pub type SubstitutionMap<'a> = HashMap<usize, Substitution<'a>>;

/// Apply `substitutions` to `statements`, returning whether anything changed.
///
/// Replaced entries take their replacement and deleted entries are dropped;
/// the order of the remaining statements is kept.
pub fn apply_substitutions<'a>(
    ast: AstBuilder<'a>,
    statements: &mut AllocVec<'a, Statement<'a>>,
    mut substitutions: SubstitutionMap<'a>,
) -> bool {
    if substitutions.is_empty() {
        return false;
    }
    let original = std::mem::replace(statements, ast.vec());
    for (index, stmt) in original.into_iter().enumerate() {
        match substitutions.remove(&index) {
            Some(Substitution::Replace(replacement)) => statements.push(replacement),
            Some(Substitution::Delete) => {}
            None => statements.push(stmt),
        }
    }
    true
}

/// Collapses the eligible `if` runs of statement lists into cascades
pub struct BlockRewriter<'r, 'a, 's> {
    ast: AstBuilder<'a>,
    extractor: &'r mut ConditionExtractor<'s>,
    prover: &'r ConditionProver,
    builder: CascadeBuilder<'a>,
    collect_all_runs: bool,
}

impl<'r, 'a, 's> BlockRewriter<'r, 'a, 's> {
    pub fn new(
        ast: AstBuilder<'a>,
        extractor: &'r mut ConditionExtractor<'s>,
        prover: &'r ConditionProver,
        collect_all_runs: bool,
        drop_exhaustive_guard: bool,
    ) -> Self {
        Self {
            ast,
            extractor,
            prover,
            builder: CascadeBuilder::new(ast, drop_exhaustive_guard),
            collect_all_runs,
        }
    }

    /// Rewrite one statement list in place, returning a summary per cascade
    /// built. `locals` are the private bindings of the enclosing function.
    pub fn rewrite(
        &mut self,
        statements: &mut AllocVec<'a, Statement<'a>>,
        locals: &PrivateLocals,
    ) -> Result<Vec<CascadeSummary>> {
        let runs = {
            let candidates = collect_candidates(statements);
            if candidates.len() < 2 {
                return Ok(Vec::new());
            }
            CascadeDetector::new(&mut *self.extractor, self.prover, self.collect_all_runs)
                .detect(&candidates, locals)?
        };

        let mut substitutions = SubstitutionMap::new();
        let mut summaries = Vec::with_capacity(runs.len());
        for run in &runs {
            summaries.push(self.builder.build(statements, run, &mut substitutions)?);
        }

        apply_substitutions(self.ast, statements, substitutions);
        Ok(summaries)
    }
}
