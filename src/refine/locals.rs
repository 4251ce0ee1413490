//! Bindings that no other function can observe or modify
//!
//! A call made from a branch body may run arbitrary code, which can assign
//! any variable it can see. The only variables safe from such calls are the
//! bindings of the enclosing function that no nested function mentions.
//! Functions that use `eval`, `with` or `arguments` have none.

use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_syntax::scope::ScopeFlags;
use std::collections::HashSet;

/// Names bound in one function (or module) and never captured by a closure
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrivateLocals {
    names: HashSet<String>,
}

impl PrivateLocals {
    /// No binding is private
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Private bindings of a function: parameters and its own declarations
    pub fn of_function(func: &Function<'_>) -> Self {
        match &func.body {
            Some(body) => Self::collect(Some(&func.params), &body.statements),
            None => Self::none(),
        }
    }

    /// Private bindings of an arrow function
    pub fn of_arrow(arrow: &ArrowFunctionExpression<'_>) -> Self {
        Self::collect(Some(&arrow.params), &arrow.body.statements)
    }

    /// Private bindings of a module's top level. Top-level bindings of a
    /// script are global properties and never private.
    pub fn of_program(program: &Program<'_>) -> Self {
        if !program.source_type.is_module() {
            return Self::none();
        }
        Self::collect(None, &program.body)
    }

    fn collect(params: Option<&FormalParameters<'_>>, statements: &[Statement<'_>]) -> Self {
        let mut scan = ScopeScan::default();
        if let Some(params) = params {
            let mut bindings = BindingNames::default();
            bindings.visit_formal_parameters(params);
            scan.declared.extend(bindings.names);
            scan.visit_formal_parameters(params);
        }
        for stmt in statements {
            // Block-scoped declarations only count at the top level.
            if let Statement::VariableDeclaration(decl) = stmt {
                scan.declare(decl);
            }
            scan.visit_statement(stmt);
        }

        if scan.dynamic {
            return Self::none();
        }
        Self {
            names: scan.declared.difference(&scan.captured).cloned().collect(),
        }
    }
}

impl FromIterator<String> for PrivateLocals {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Declarations of the scanned function and names mentioned by its closures
#[derive(Default)]
struct ScopeScan {
    declared: HashSet<String>,
    captured: HashSet<String>,
    depth: usize,
    dynamic: bool,
}

impl ScopeScan {
    fn declare(&mut self, decl: &VariableDeclaration<'_>) {
        let mut bindings = BindingNames::default();
        for declarator in &decl.declarations {
            bindings.visit_binding_pattern(&declarator.id);
        }
        self.declared.extend(bindings.names);
    }
}

impl<'a> Visit<'a> for ScopeScan {
    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        self.depth += 1;
        walk::walk_function(self, it, flags);
        self.depth -= 1;
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        self.depth += 1;
        walk::walk_arrow_function_expression(self, it);
        self.depth -= 1;
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        self.depth += 1;
        walk::walk_class(self, it);
        self.depth -= 1;
    }

    fn visit_variable_declaration(&mut self, it: &VariableDeclaration<'a>) {
        if self.depth == 0 && it.kind == VariableDeclarationKind::Var {
            self.declare(it);
        }
        walk::walk_variable_declaration(self, it);
    }

    fn visit_with_statement(&mut self, it: &WithStatement<'a>) {
        self.dynamic = true;
        walk::walk_with_statement(self, it);
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if matches!(it.name.as_str(), "eval" | "arguments") {
            self.dynamic = true;
        }
        if self.depth > 0 {
            self.captured.insert(it.name.to_string());
        }
    }
}

/// Names bound by a pattern, not descending into nested functions
#[derive(Default)]
struct BindingNames {
    names: HashSet<String>,
}

impl<'a> Visit<'a> for BindingNames {
    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.names.insert(it.name.to_string());
    }

    fn visit_function(&mut self, _it: &Function<'a>, _flags: ScopeFlags) {}

    fn visit_arrow_function_expression(&mut self, _it: &ArrowFunctionExpression<'a>) {}

    fn visit_class(&mut self, _it: &Class<'a>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn locals_of_first_function(source: &str) -> PrivateLocals {
        let allocator = Allocator::default();
        let program = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        match &program.body[0] {
            Statement::FunctionDeclaration(func) => PrivateLocals::of_function(func),
            other => panic!("expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_parameters_and_declarations_are_private() {
        let locals = locals_of_first_function(
            "function f(a, { b }, ...c) { let d = 1; if (a) { var e = 2; } { let g; } }",
        );
        for name in ["a", "b", "c", "d", "e"] {
            assert!(locals.contains(name), "{} should be private", name);
        }
        assert!(!locals.contains("g"));
        assert!(!locals.contains("outer"));
    }

    #[test]
    fn test_captured_bindings_are_not_private() {
        let locals = locals_of_first_function(
            "function f(x, y) { let z = 0; function set() { z = 1; } [1].map(() => x); }",
        );
        assert!(!locals.contains("x"));
        assert!(!locals.contains("z"));
        assert!(locals.contains("y"));
    }

    #[test]
    fn test_dynamic_scoping_disables_privacy() {
        assert!(locals_of_first_function("function f(x) { eval('x = 1'); }").is_empty());
        assert!(locals_of_first_function("function f(x) { g(arguments); }").is_empty());
    }

    #[test]
    fn test_script_top_level_is_never_private() {
        let allocator = Allocator::default();
        let source = "let y = 1; if (y) {}";
        let script = Parser::new(&allocator, source, SourceType::cjs()).parse().program;
        assert!(PrivateLocals::of_program(&script).is_empty());

        let module = Parser::new(&allocator, source, SourceType::mjs()).parse().program;
        assert!(PrivateLocals::of_program(&module).contains("y"));
    }
}
