//! Read-only preview of the cascades reachability-based refinement would build

use super::cascade_detector::{collect_candidates, CascadeDetector};
use super::condition_extractor::ConditionExtractor;
use super::locals::PrivateLocals;
use super::RefineOptions;
use crate::error::{Error, Result};
use crate::smt::ConditionProver;
use oxc_allocator::Vec as AllocVec;
use oxc_ast::ast::{ArrowFunctionExpression, Function, Program, Statement, StaticBlock};
use oxc_ast_visit::{walk, Visit};
use oxc_span::{GetSpan, Span};
use oxc_syntax::scope::ScopeFlags;

/// A cascade found in the program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    /// Spans of the member `if` statements in source order
    pub members: Vec<Span>,
    /// The last member's guard would be dropped
    pub exhaustive: bool,
}

/// Visitor running cascade detection over every statement list
pub struct CascadeScanner<'s> {
    extractor: ConditionExtractor<'s>,
    prover: ConditionProver,
    collect_all_runs: bool,
    reports: Vec<CascadeReport>,
    scopes: Vec<PrivateLocals>,
    error: Option<Error>,
}

impl<'s> CascadeScanner<'s> {
    pub fn new(source_text: &'s str, options: &RefineOptions) -> Self {
        Self {
            extractor: ConditionExtractor::new(source_text),
            prover: ConditionProver::new(options.solver_timeout()),
            collect_all_runs: options.collect_all_runs,
            reports: Vec::new(),
            scopes: Vec::new(),
            error: None,
        }
    }

    /// Consume the scanner, returning the cascades found
    pub fn finish(mut self) -> Result<Vec<CascadeReport>> {
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(self.reports),
        }
    }
}

impl<'a, 's> Visit<'a> for CascadeScanner<'s> {
    fn visit_program(&mut self, it: &Program<'a>) {
        self.scopes.push(PrivateLocals::of_program(it));
        walk::walk_program(self, it);
        self.scopes.pop();
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        self.scopes.push(PrivateLocals::of_function(it));
        walk::walk_function(self, it, flags);
        self.scopes.pop();
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        self.scopes.push(PrivateLocals::of_arrow(it));
        walk::walk_arrow_function_expression(self, it);
        self.scopes.pop();
    }

    fn visit_static_block(&mut self, it: &StaticBlock<'a>) {
        self.scopes.push(PrivateLocals::none());
        walk::walk_static_block(self, it);
        self.scopes.pop();
    }

    fn visit_statements(&mut self, it: &AllocVec<'a, Statement<'a>>) {
        walk::walk_statements(self, it);
        if self.error.is_some() {
            return;
        }

        let candidates = collect_candidates(it);
        if candidates.len() < 2 {
            return;
        }
        let none = PrivateLocals::none();
        let locals = self.scopes.last().unwrap_or(&none);
        let detected = CascadeDetector::new(&mut self.extractor, &self.prover, self.collect_all_runs)
            .detect(&candidates, locals);
        match detected {
            Ok(runs) => {
                for run in runs {
                    self.reports.push(CascadeReport {
                        members: run.members.iter().map(|&index| it[index].span()).collect(),
                        exhaustive: run.exhaustive,
                    });
                }
            }
            Err(error) => self.error = Some(error),
        }
    }
}

/// Find the cascades refinement would build in `program`, without rewriting it
pub fn scan_cascades(program: &Program<'_>, options: &RefineOptions) -> Result<Vec<CascadeReport>> {
    let mut scanner = CascadeScanner::new(program.source_text, options);
    scanner.visit_program(program);
    let mut reports = scanner.finish()?;
    reports.sort_by_key(|report| report.members.first().map(|span| span.start));
    Ok(reports)
}
