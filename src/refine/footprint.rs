//! Read and write footprints of guards and branch bodies
//!
//! Collapsing `if (a) A; if (b) B;` into `if (a) A; else if (b) B;` moves the
//! evaluation of `b` from "after A ran" to "only when `a` was false". That is
//! only equivalent when `A` cannot change what `b` reads and evaluating a guard
//! has no effect of its own.

use super::locals::PrivateLocals;
use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_syntax::operator::{BinaryOperator, UnaryOperator};
use std::collections::HashSet;

/// What evaluating a guard expression depends on
#[derive(Debug, Default, Clone)]
pub struct GuardFootprint {
    /// Identifiers the guard reads
    pub names: HashSet<String>,
    /// The guard reads object properties
    pub reads_memory: bool,
    /// Evaluating the guard may itself change program state
    pub has_side_effects: bool,
}

impl GuardFootprint {
    /// Compute the footprint of a guard expression
    pub fn of(expr: &Expression<'_>) -> Self {
        let mut footprint = Self::default();
        footprint.visit_expression(expr);
        footprint
    }

    /// Merge another footprint into this one
    pub fn extend(&mut self, other: &GuardFootprint) {
        self.names.extend(other.names.iter().cloned());
        self.reads_memory |= other.reads_memory;
        self.has_side_effects |= other.has_side_effects;
    }
}

impl<'a> Visit<'a> for GuardFootprint {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        self.names.insert(it.name.to_string());
    }

    fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
        self.reads_memory = true;
        walk::walk_static_member_expression(self, it);
    }

    fn visit_computed_member_expression(&mut self, it: &ComputedMemberExpression<'a>) {
        self.reads_memory = true;
        walk::walk_computed_member_expression(self, it);
    }

    fn visit_private_field_expression(&mut self, it: &PrivateFieldExpression<'a>) {
        self.reads_memory = true;
        walk::walk_private_field_expression(self, it);
    }

    fn visit_binary_expression(&mut self, it: &BinaryExpression<'a>) {
        if matches!(it.operator, BinaryOperator::In | BinaryOperator::Instanceof) {
            self.reads_memory = true;
        }
        walk::walk_binary_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_call_expression(self, it);
    }

    fn visit_new_expression(&mut self, it: &NewExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_new_expression(self, it);
    }

    fn visit_assignment_expression(&mut self, it: &AssignmentExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_assignment_expression(self, it);
    }

    fn visit_update_expression(&mut self, it: &UpdateExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_update_expression(self, it);
    }

    fn visit_unary_expression(&mut self, it: &UnaryExpression<'a>) {
        if it.operator == UnaryOperator::Delete {
            self.has_side_effects = true;
        }
        walk::walk_unary_expression(self, it);
    }

    fn visit_await_expression(&mut self, it: &AwaitExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_await_expression(self, it);
    }

    fn visit_yield_expression(&mut self, it: &YieldExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_yield_expression(self, it);
    }

    fn visit_tagged_template_expression(&mut self, it: &TaggedTemplateExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_tagged_template_expression(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        self.has_side_effects = true;
        walk::walk_import_expression(self, it);
    }
}

/// What executing a statement may modify
#[derive(Debug, Default, Clone)]
pub struct WriteSet {
    /// Identifiers assigned, updated or declared
    pub names: HashSet<String>,
    /// Object properties may change (member writes, calls, `delete`)
    pub clobbers_memory: bool,
    /// Control may reach code outside the statement: calls, setters, iterator
    /// protocols and suspension points
    pub runs_foreign_code: bool,
}

impl WriteSet {
    /// Compute the write set of a statement
    pub fn of(stmt: &Statement<'_>) -> Self {
        let mut writes = Self::default();
        writes.visit_statement(stmt);
        writes
    }

    /// Executing the statement could change the value of a guard with
    /// `footprint`. Foreign code may assign every name except `locals`.
    pub fn interferes_with(&self, footprint: &GuardFootprint, locals: &PrivateLocals) -> bool {
        (self.clobbers_memory && footprint.reads_memory)
            || !self.names.is_disjoint(&footprint.names)
            || (self.runs_foreign_code && footprint.names.iter().any(|name| !locals.contains(name)))
    }

    fn foreign_code(&mut self) {
        self.clobbers_memory = true;
        self.runs_foreign_code = true;
    }
}

impl<'a> Visit<'a> for WriteSet {
    fn visit_simple_assignment_target(&mut self, it: &SimpleAssignmentTarget<'a>) {
        match it {
            SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) => {
                self.names.insert(ident.name.to_string());
            }
            // Member writes may run setters.
            _ => self.foreign_code(),
        }
        walk::walk_simple_assignment_target(self, it);
    }

    fn visit_assignment_target_property_identifier(
        &mut self,
        it: &AssignmentTargetPropertyIdentifier<'a>,
    ) {
        self.names.insert(it.binding.name.to_string());
        walk::walk_assignment_target_property_identifier(self, it);
    }

    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.names.insert(it.name.to_string());
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        self.foreign_code();
        walk::walk_call_expression(self, it);
    }

    fn visit_new_expression(&mut self, it: &NewExpression<'a>) {
        self.foreign_code();
        walk::walk_new_expression(self, it);
    }

    fn visit_unary_expression(&mut self, it: &UnaryExpression<'a>) {
        if it.operator == UnaryOperator::Delete {
            self.foreign_code();
        }
        walk::walk_unary_expression(self, it);
    }

    fn visit_tagged_template_expression(&mut self, it: &TaggedTemplateExpression<'a>) {
        self.foreign_code();
        walk::walk_tagged_template_expression(self, it);
    }

    fn visit_await_expression(&mut self, it: &AwaitExpression<'a>) {
        self.foreign_code();
        walk::walk_await_expression(self, it);
    }

    fn visit_yield_expression(&mut self, it: &YieldExpression<'a>) {
        self.foreign_code();
        walk::walk_yield_expression(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        self.foreign_code();
        walk::walk_import_expression(self, it);
    }

    fn visit_for_of_statement(&mut self, it: &ForOfStatement<'a>) {
        self.foreign_code();
        walk::walk_for_of_statement(self, it);
    }

    fn visit_spread_element(&mut self, it: &SpreadElement<'a>) {
        self.foreign_code();
        walk::walk_spread_element(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn first_if<'a>(program: &'a Program<'a>) -> &'a IfStatement<'a> {
        match &program.body[0] {
            Statement::IfStatement(if_stmt) => if_stmt,
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_guard_footprint_collects_reads() {
        let allocator = Allocator::default();
        let source = "if (a === 1 && obj.kind > b) {}";
        let program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let footprint = GuardFootprint::of(&first_if(&program).test);

        assert!(footprint.names.contains("a"));
        assert!(footprint.names.contains("b"));
        assert!(footprint.names.contains("obj"));
        assert!(footprint.reads_memory);
        assert!(!footprint.has_side_effects);
    }

    #[test]
    fn test_guard_with_call_has_side_effects() {
        let allocator = Allocator::default();
        let source = "if (next() === 1) {}";
        let program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let footprint = GuardFootprint::of(&first_if(&program).test);

        assert!(footprint.has_side_effects);
    }

    #[test]
    fn test_write_set_of_branch_body() {
        let allocator = Allocator::default();
        let source = "if (x) { y = 1; z++; let w = 2; ({ v } = src); }";
        let program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let writes = WriteSet::of(&first_if(&program).consequent);

        for name in ["y", "z", "w", "v"] {
            assert!(writes.names.contains(name), "missing write to {}", name);
        }
        assert!(!writes.names.contains("src"));
        assert!(!writes.clobbers_memory);
    }

    #[test]
    fn test_calls_interfere_with_non_private_names() {
        let allocator = Allocator::default();
        let source = "if (x) { log(x); }";
        let program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let writes = WriteSet::of(&first_if(&program).consequent);
        assert!(writes.runs_foreign_code);

        let mut plain = GuardFootprint::default();
        plain.names.insert("x".to_string());
        assert!(writes.interferes_with(&plain, &PrivateLocals::none()));

        let locals: PrivateLocals = ["x".to_string()].into_iter().collect();
        assert!(!writes.interferes_with(&plain, &locals));

        let mut member = plain.clone();
        member.reads_memory = true;
        assert!(writes.interferes_with(&member, &locals));
    }

    #[test]
    fn test_plain_assignments_stay_local() {
        let allocator = Allocator::default();
        let source = "if (x) { y = x + 1; }";
        let program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let writes = WriteSet::of(&first_if(&program).consequent);
        assert!(!writes.runs_foreign_code);

        let mut footprint = GuardFootprint::default();
        footprint.names.insert("x".to_string());
        assert!(!writes.interferes_with(&footprint, &PrivateLocals::none()));

        footprint.names.insert("y".to_string());
        assert!(writes.interferes_with(&footprint, &PrivateLocals::none()));
    }

    #[test]
    fn test_member_write_runs_foreign_code() {
        let allocator = Allocator::default();
        let source = "if (x) { obj.value = 1; }";
        let program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        let writes = WriteSet::of(&first_if(&program).consequent);
        assert!(writes.clobbers_memory);
        assert!(writes.runs_foreign_code);
    }
}
