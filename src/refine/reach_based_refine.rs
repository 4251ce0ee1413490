//! Reachability-based refinement
//!
//! Decompiled code often contains sequences of independent conditionals:
//!
//! ```js
//! if (x === 1) { a(); }
//! if (x === 2) { b(); }
//! if (x !== 1 && x !== 2) { c(); }
//! ```
//!
//! When the guards are proved mutually exclusive, at most one branch can run
//! and the sequence is equivalent to a cascade. When they also cover every
//! outcome, the last guard is implied and becomes a plain `else`:
//!
//! ```js
//! if (x === 1) { a(); } else if (x === 2) { b(); } else { c(); }
//! ```

use super::block_rewriter::BlockRewriter;
use super::condition_extractor::ConditionExtractor;
use super::locals::PrivateLocals;
use super::{RefineOptions, RefinementPass, RefinementStats};
use crate::error::{Error, Result};
use crate::smt::ConditionProver;
use oxc_allocator::{Allocator, Vec as AllocVec};
use oxc_ast::ast::{ArrowFunctionExpression, Function, Program, Statement, StaticBlock};
use oxc_ast::AstBuilder;
use oxc_ast_visit::{walk_mut, VisitMut};
use oxc_syntax::scope::ScopeFlags;

/// Collapses mutually exclusive `if` runs into else-if cascades
pub struct ReachBasedRefine<'a> {
    ast: AstBuilder<'a>,
    options: RefineOptions,
    extractor: ConditionExtractor<'a>,
    prover: ConditionProver,
    stats: RefinementStats,
    /// Private bindings of the enclosing functions, innermost last
    scopes: Vec<PrivateLocals>,
    changed: bool,
    error: Option<Error>,
}

impl<'a> ReachBasedRefine<'a> {
    /// Create a pass for a program parsed from `source_text`
    pub fn new(allocator: &'a Allocator, source_text: &'a str, options: &RefineOptions) -> Self {
        Self {
            ast: AstBuilder::new(allocator),
            options: options.clone(),
            extractor: ConditionExtractor::new(source_text),
            prover: ConditionProver::new(options.solver_timeout()),
            stats: RefinementStats::default(),
            scopes: Vec::new(),
            changed: false,
            error: None,
        }
    }

    /// Counters of the last run
    pub fn stats(&self) -> &RefinementStats {
        &self.stats
    }

    fn rewrite_block(&mut self, statements: &mut AllocVec<'a, Statement<'a>>) -> Result<bool> {
        let none = PrivateLocals::none();
        let locals = self.scopes.last().unwrap_or(&none);
        let summaries = BlockRewriter::new(
            self.ast,
            &mut self.extractor,
            &self.prover,
            self.options.collect_all_runs,
            self.options.drop_exhaustive_guard,
        )
        .rewrite(statements, locals)?;

        if summaries.is_empty() {
            return Ok(false);
        }
        self.stats.blocks_rewritten += 1;
        for summary in &summaries {
            self.stats.cascades_built += 1;
            self.stats.statements_absorbed += summary.absorbed;
            if summary.guard_dropped {
                self.stats.guards_dropped += 1;
            }
        }
        Ok(true)
    }
}

impl<'a> RefinementPass<'a> for ReachBasedRefine<'a> {
    fn name(&self) -> &'static str {
        "ReachBasedRefine"
    }

    fn run(&mut self, program: &mut Program<'a>) -> Result<bool> {
        log::info!("Reachability-based refinement");
        self.changed = false;
        self.stats = RefinementStats::default();

        self.visit_program(program);

        if let Some(error) = self.error.take() {
            return Err(error);
        }
        Ok(self.changed)
    }
}

impl<'a> VisitMut<'a> for ReachBasedRefine<'a> {
    fn visit_program(&mut self, it: &mut Program<'a>) {
        self.scopes.push(PrivateLocals::of_program(it));
        walk_mut::walk_program(self, it);
        self.scopes.pop();
    }

    fn visit_function(&mut self, it: &mut Function<'a>, flags: ScopeFlags) {
        self.scopes.push(PrivateLocals::of_function(it));
        walk_mut::walk_function(self, it, flags);
        self.scopes.pop();
    }

    fn visit_arrow_function_expression(&mut self, it: &mut ArrowFunctionExpression<'a>) {
        self.scopes.push(PrivateLocals::of_arrow(it));
        walk_mut::walk_arrow_function_expression(self, it);
        self.scopes.pop();
    }

    fn visit_static_block(&mut self, it: &mut StaticBlock<'a>) {
        self.scopes.push(PrivateLocals::none());
        walk_mut::walk_static_block(self, it);
        self.scopes.pop();
    }

    fn visit_statements(&mut self, it: &mut AllocVec<'a, Statement<'a>>) {
        // Nested lists first, so cascades are built from refined bodies.
        walk_mut::walk_statements(self, it);
        if self.error.is_some() {
            return;
        }
        match self.rewrite_block(it) {
            Ok(changed) => self.changed |= changed,
            Err(error) => self.error = Some(error),
        }
    }
}
