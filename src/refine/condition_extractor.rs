//! Guard formulas of `if` statements

use crate::smt::ConditionTranslator;
use oxc_ast::ast::IfStatement;
use z3::ast::{Ast, Bool};

/// Obtains the simplified boolean formula of an `if` statement's guard
pub struct ConditionExtractor<'s> {
    translator: ConditionTranslator<'s>,
}

impl<'s> ConditionExtractor<'s> {
    /// Create an extractor for statements parsed from `source_text`
    pub fn new(source_text: &'s str) -> Self {
        Self {
            translator: ConditionTranslator::new(source_text),
        }
    }

    /// Guard of `if_stmt` as a simplified boolean formula
    pub fn extract(&mut self, if_stmt: &IfStatement<'_>) -> Bool {
        let formula = self.translator.get_or_create(&if_stmt.test);
        self.translator.to_bool(formula).simplify()
    }
}
