//! Construction of else-if cascades from detected runs

use super::block_rewriter::{Substitution, SubstitutionMap};
use super::cascade_detector::CascadeRun;
use crate::error::{Error, Result};
use oxc_ast::ast::{Expression, Statement};
use oxc_ast::AstBuilder;
use oxc_span::{Span, SPAN};

/// Guard and body moved out of a run member
struct Branch<'a> {
    span: Span,
    test: Expression<'a>,
    consequent: Statement<'a>,
}

/// What building one cascade did to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeSummary {
    /// Members folded into the chain behind the head statement
    pub absorbed: usize,
    /// The last member became an unconditional `else`
    pub guard_dropped: bool,
}

/// Builds `if / else if / else` chains replacing collapsible runs
pub struct CascadeBuilder<'a> {
    ast: AstBuilder<'a>,
    drop_exhaustive_guard: bool,
}

impl<'a> CascadeBuilder<'a> {
    /// Create a builder. With `drop_exhaustive_guard` set, the last guard of
    /// an exhaustive run is omitted since it always holds at that point.
    pub fn new(ast: AstBuilder<'a>, drop_exhaustive_guard: bool) -> Self {
        Self {
            ast,
            drop_exhaustive_guard,
        }
    }

    /// Build the cascade for `run` and record the substitutions for `statements`.
    ///
    /// The first member is replaced by the cascade head; every other member
    /// is deleted since the chain absorbs it.
    pub fn build(
        &self,
        statements: &mut [Statement<'a>],
        run: &CascadeRun,
        substitutions: &mut SubstitutionMap<'a>,
    ) -> Result<CascadeSummary> {
        if run.members.len() < 2 {
            return Err(Error::internal(format!(
                "cascade needs at least two statements, got {}",
                run.members.len()
            )));
        }
        for &index in &run.members {
            if !matches!(statements.get(index), Some(Statement::IfStatement(_))) {
                return Err(Error::internal(format!(
                    "cascade member {} is not an if statement",
                    index
                )));
            }
        }

        let mut branches: Vec<Branch<'a>> = run
            .members
            .iter()
            .filter_map(|&index| self.take_branch(&mut statements[index]))
            .collect();

        let guard_dropped = run.exhaustive && self.drop_exhaustive_guard;
        let last = branches
            .pop()
            .ok_or_else(|| Error::internal("cascade lost its last branch"))?;
        let mut tail = if guard_dropped {
            self.else_block(last.consequent)
        } else {
            self.ast
                .statement_if(last.span, last.test, last.consequent, None)
        };

        for branch in branches.drain(1..).rev() {
            tail = self.conditional(branch, tail);
        }
        let head = branches
            .pop()
            .ok_or_else(|| Error::internal("cascade lost its first branch"))?;
        let cascade = self.conditional(head, tail);

        substitutions.insert(run.members[0], Substitution::Replace(cascade));
        for &index in &run.members[1..] {
            substitutions.insert(index, Substitution::Delete);
        }

        Ok(CascadeSummary {
            absorbed: run.members.len() - 1,
            guard_dropped,
        })
    }

    fn take_branch(&self, stmt: &mut Statement<'a>) -> Option<Branch<'a>> {
        let Statement::IfStatement(if_stmt) = stmt else {
            return None;
        };
        let test = std::mem::replace(
            &mut if_stmt.test,
            self.ast.expression_boolean_literal(SPAN, false),
        );
        let consequent = std::mem::replace(&mut if_stmt.consequent, self.ast.statement_empty(SPAN));
        Some(Branch {
            span: if_stmt.span,
            test,
            consequent,
        })
    }

    /// `if (test) consequent else alternate`
    fn conditional(&self, branch: Branch<'a>, alternate: Statement<'a>) -> Statement<'a> {
        let consequent = if may_capture_else(&branch.consequent) {
            self.ast
                .statement_block(SPAN, self.ast.vec1(branch.consequent))
        } else {
            branch.consequent
        };
        self.ast
            .statement_if(branch.span, branch.test, consequent, Some(alternate))
    }

    fn else_block(&self, body: Statement<'a>) -> Statement<'a> {
        match body {
            Statement::BlockStatement(_) => body,
            other => self.ast.statement_block(SPAN, self.ast.vec1(other)),
        }
    }
}

/// A trailing `else` placed after `stmt` would bind to an `if` inside it
fn may_capture_else(stmt: &Statement<'_>) -> bool {
    match stmt {
        Statement::IfStatement(if_stmt) => match &if_stmt.alternate {
            Some(alternate) => may_capture_else(alternate),
            None => true,
        },
        Statement::LabeledStatement(labeled) => may_capture_else(&labeled.body),
        Statement::WhileStatement(while_stmt) => may_capture_else(&while_stmt.body),
        Statement::ForStatement(for_stmt) => may_capture_else(&for_stmt.body),
        Statement::ForInStatement(for_in) => may_capture_else(&for_in.body),
        Statement::ForOfStatement(for_of) => may_capture_else(&for_of.body),
        Statement::WithStatement(with_stmt) => may_capture_else(&with_stmt.body),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use std::collections::HashMap;

    fn alternate_of<'s, 'a>(stmt: &'s Statement<'a>) -> Option<&'s Statement<'a>> {
        match stmt {
            Statement::IfStatement(if_stmt) => if_stmt.alternate.as_ref(),
            _ => None,
        }
    }

    #[test]
    fn test_build_chains_members_in_source_order() {
        let allocator = Allocator::default();
        let source = "if (x == 1) a(); if (x == 2) b(); if (x == 3) c();";
        let mut program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let builder = CascadeBuilder::new(AstBuilder::new(&allocator), true);
        let run = CascadeRun {
            members: vec![0, 1, 2],
            exhaustive: false,
        };
        let mut substitutions = HashMap::new();

        let summary = builder
            .build(&mut program.body, &run, &mut substitutions)
            .expect("build should succeed");

        assert_eq!(summary.absorbed, 2);
        assert!(!summary.guard_dropped);
        assert!(matches!(substitutions.get(&1), Some(Substitution::Delete)));
        assert!(matches!(substitutions.get(&2), Some(Substitution::Delete)));

        let Some(Substitution::Replace(head)) = substitutions.get(&0) else {
            panic!("head should be replaced");
        };
        let second = alternate_of(head).expect("head should have an else-if");
        let third = alternate_of(second).expect("second branch should have an else-if");
        assert!(matches!(third, Statement::IfStatement(_)));
        assert!(alternate_of(third).is_none());
    }

    #[test]
    fn test_exhaustive_run_ends_in_plain_else() {
        let allocator = Allocator::default();
        let source = "if (x < 0) a(); if (!(x < 0)) b();";
        let mut program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let builder = CascadeBuilder::new(AstBuilder::new(&allocator), true);
        let run = CascadeRun {
            members: vec![0, 1],
            exhaustive: true,
        };
        let mut substitutions = HashMap::new();

        let summary = builder
            .build(&mut program.body, &run, &mut substitutions)
            .expect("build should succeed");

        assert!(summary.guard_dropped);
        let Some(Substitution::Replace(head)) = substitutions.get(&0) else {
            panic!("head should be replaced");
        };
        assert!(matches!(alternate_of(head), Some(Statement::BlockStatement(_))));
    }

    #[test]
    fn test_nested_if_body_is_wrapped() {
        let allocator = Allocator::default();
        let source = "if (x == 1) if (y) a(); if (x == 2) b();";
        let mut program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let builder = CascadeBuilder::new(AstBuilder::new(&allocator), true);
        let run = CascadeRun {
            members: vec![0, 1],
            exhaustive: false,
        };
        let mut substitutions = HashMap::new();

        builder
            .build(&mut program.body, &run, &mut substitutions)
            .expect("build should succeed");

        let Some(Substitution::Replace(Statement::IfStatement(head))) = substitutions.get(&0) else {
            panic!("head should be an if statement");
        };
        assert!(matches!(head.consequent, Statement::BlockStatement(_)));
    }

    #[test]
    fn test_rejects_non_conditional_member() {
        let allocator = Allocator::default();
        let source = "if (x == 1) a(); b();";
        let mut program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let builder = CascadeBuilder::new(AstBuilder::new(&allocator), true);
        let run = CascadeRun {
            members: vec![0, 1],
            exhaustive: false,
        };
        let mut substitutions = HashMap::new();

        assert!(builder
            .build(&mut program.body, &run, &mut substitutions)
            .is_err());
        assert!(substitutions.is_empty());
    }
}
