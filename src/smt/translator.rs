//! Guard expression to Z3 formula translation
//!
//! Guards compare JavaScript values, so an operand is not simply a number.
//! Every identifier or static member chain `v` is described by a numeric
//! view:
//!
//! - `v` (real): the result of `ToNumber(v)` when that is not NaN
//! - `v#nan`: `ToNumber(v)` is NaN (`undefined`, `"abc"`, `NaN`, ...)
//! - `v#number`: `v` is of type number, as `===` requires
//! - `v#nullish`: `v` is `null` or `undefined`, which `==` never equates
//!   with a number
//! - `v#truthy`: truthiness of `v` when it is not a number
//!
//! Comparisons are only interpreted when one side is a numeric constant,
//! which forces JavaScript's numeric comparison. Everything else (two
//! variables, strings, arithmetic over variables) becomes an opaque boolean
//! atom keyed by its source text. Conversions (`valueOf`, `toString`,
//! getters) are assumed deterministic and free of side effects.

use oxc_ast::ast::Expression;
use oxc_span::{GetSpan, Span};
use oxc_syntax::operator::{BinaryOperator, LogicalOperator, UnaryOperator};
use std::collections::HashMap;
use z3::ast::{Ast, Bool, Int, Real};

/// Largest integer magnitude a JavaScript number represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Numeric view of a guard operand
#[derive(Debug, Clone)]
pub struct NumericTerm {
    /// `ToNumber` of the operand, meaningful when `nan` is false
    pub value: Real,
    /// `ToNumber` of the operand is NaN
    pub nan: Bool,
    /// The operand is of type number
    pub number: Bool,
    /// The operand is `null` or `undefined`
    pub nullish: Bool,
    /// Truthiness of the operand when it is not a number
    pub truthy: Bool,
    /// The operand is a numeric constant
    pub constant: bool,
}

impl NumericTerm {
    /// View of a constant number
    fn constant(value: f64) -> Option<Self> {
        let (value, nan) = if value.is_nan() {
            (zero(), true)
        } else {
            (real_of(value)?, false)
        };
        Some(Self {
            value,
            nan: Bool::from_bool(nan),
            number: Bool::from_bool(true),
            nullish: Bool::from_bool(false),
            truthy: Bool::from_bool(false),
            constant: true,
        })
    }

    /// View of the value held by the variable or member chain `path`
    fn variable(path: &str) -> Self {
        let number = Bool::new_const(format!("{}#number", path));
        let nullish = Bool::and(&[&number.not(), &Bool::new_const(format!("{}#nullish", path))]);
        Self {
            value: Real::new_const(path),
            nan: Bool::new_const(format!("{}#nan", path)),
            number,
            nullish,
            truthy: Bool::new_const(format!("{}#truthy", path)),
            constant: false,
        }
    }

    /// `ToBoolean` of the operand
    pub fn truthiness(&self) -> Bool {
        let non_zero = Bool::and(&[&self.nan.not(), &self.value.eq(&zero()).not()]);
        self.number.ite(&non_zero, &self.truthy)
    }
}

/// Result of translating a guard sub-expression
#[derive(Debug, Clone)]
pub enum Formula {
    Bool(Bool),
    Numeric(NumericTerm),
}

/// Translates guard expressions into Z3 formulas, caching results per span
pub struct ConditionTranslator<'s> {
    source_text: &'s str,
    cache: HashMap<Span, Formula>,
    atoms: HashMap<String, Bool>,
}

impl<'s> ConditionTranslator<'s> {
    /// Create a translator for guards parsed from `source_text`
    pub fn new(source_text: &'s str) -> Self {
        Self {
            source_text,
            cache: HashMap::new(),
            atoms: HashMap::new(),
        }
    }

    /// Get the cached translation of `expr` or translate it now
    pub fn get_or_create(&mut self, expr: &Expression<'_>) -> Formula {
        let span = expr.span();
        if span.is_empty() {
            return self.translate(expr);
        }
        if let Some(formula) = self.cache.get(&span) {
            return formula.clone();
        }
        let formula = self.translate(expr);
        self.cache.insert(span, formula.clone());
        formula
    }

    /// Coerce a formula to boolean sort following JavaScript truthiness
    pub fn to_bool(&self, formula: Formula) -> Bool {
        match formula {
            Formula::Bool(b) => b,
            Formula::Numeric(term) => term.truthiness(),
        }
    }

    /// Number of distinct guard spans translated so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn translate(&mut self, expr: &Expression<'_>) -> Formula {
        match expr {
            Expression::BooleanLiteral(lit) => Formula::Bool(Bool::from_bool(lit.value)),
            Expression::ParenthesizedExpression(paren) => self.translate(&paren.expression),
            Expression::UnaryExpression(unary) if unary.operator == UnaryOperator::LogicalNot => {
                Formula::Bool(self.translate_bool(&unary.argument).not())
            }
            Expression::LogicalExpression(logical) => match logical.operator {
                LogicalOperator::And => {
                    let l = self.translate_bool(&logical.left);
                    let r = self.translate_bool(&logical.right);
                    Formula::Bool(Bool::and(&[&l, &r]))
                }
                LogicalOperator::Or => {
                    let l = self.translate_bool(&logical.left);
                    let r = self.translate_bool(&logical.right);
                    Formula::Bool(Bool::or(&[&l, &r]))
                }
                LogicalOperator::Coalesce => self.opaque(expr),
            },
            Expression::ConditionalExpression(cond) => {
                let test = self.translate_bool(&cond.test);
                let consequent = self.translate_bool(&cond.consequent);
                let alternate = self.translate_bool(&cond.alternate);
                Formula::Bool(test.ite(&consequent, &alternate))
            }
            Expression::BinaryExpression(binary) if is_comparison(binary.operator) => {
                match (numeric(&binary.left), numeric(&binary.right)) {
                    (Some(l), Some(r)) if l.constant || r.constant => {
                        Formula::Bool(compare(binary.operator, &l, &r))
                    }
                    _ => self.opaque(expr),
                }
            }
            _ => match numeric(expr) {
                Some(term) => Formula::Numeric(term),
                None => self.opaque(expr),
            },
        }
    }

    fn translate_bool(&mut self, expr: &Expression<'_>) -> Bool {
        let formula = self.translate(expr);
        self.to_bool(formula)
    }

    fn opaque(&mut self, expr: &Expression<'_>) -> Formula {
        let span = expr.span();
        let text = if span.is_empty() {
            None
        } else {
            self.source_text.get(span.start as usize..span.end as usize)
        };
        let atom = match text {
            Some(text) => self
                .atoms
                .entry(text.to_string())
                .or_insert_with(|| Bool::new_const(format!("|{}|", text)))
                .clone(),
            None => Bool::fresh_const("opaque"),
        };
        Formula::Bool(atom)
    }
}

/// Numeric view of an operand, or `None` outside the model
fn numeric(expr: &Expression<'_>) -> Option<NumericTerm> {
    if let Some(value) = fold_constant(expr) {
        return NumericTerm::constant(value);
    }
    member_path(expr).map(|path| NumericTerm::variable(&path))
}

/// Evaluate an expression built from numeric literals only
fn fold_constant(expr: &Expression<'_>) -> Option<f64> {
    match expr {
        Expression::NumericLiteral(lit) => Some(lit.value),
        Expression::Identifier(ident) if ident.name.as_str() == "NaN" => Some(f64::NAN),
        Expression::ParenthesizedExpression(paren) => fold_constant(&paren.expression),
        Expression::UnaryExpression(unary) => match unary.operator {
            UnaryOperator::UnaryNegation => fold_constant(&unary.argument).map(|v| -v),
            UnaryOperator::UnaryPlus => fold_constant(&unary.argument),
            _ => None,
        },
        Expression::BinaryExpression(binary) => {
            let l = fold_constant(&binary.left)?;
            let r = fold_constant(&binary.right)?;
            match binary.operator {
                BinaryOperator::Addition => Some(l + r),
                BinaryOperator::Subtraction => Some(l - r),
                BinaryOperator::Multiplication => Some(l * r),
                BinaryOperator::Division => Some(l / r),
                BinaryOperator::Remainder => Some(l % r),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Abstract equality and relational comparison with a numeric side
fn compare(operator: BinaryOperator, l: &NumericTerm, r: &NumericTerm) -> Bool {
    let ordered = Bool::and(&[&l.nan.not(), &r.nan.not()]);
    let strict = || Bool::and(&[&l.number, &r.number, &ordered, &l.value.eq(&r.value)]);
    let loose = || {
        Bool::and(&[
            &l.nullish.not(),
            &r.nullish.not(),
            &ordered,
            &l.value.eq(&r.value),
        ])
    };
    let relation = match operator {
        BinaryOperator::Equality => return loose(),
        BinaryOperator::Inequality => return loose().not(),
        BinaryOperator::StrictEquality => return strict(),
        BinaryOperator::StrictInequality => return strict().not(),
        BinaryOperator::LessThan => l.value.lt(&r.value),
        BinaryOperator::LessEqualThan => l.value.le(&r.value),
        BinaryOperator::GreaterThan => l.value.gt(&r.value),
        _ => l.value.ge(&r.value),
    };
    Bool::and(&[&ordered, &relation])
}

fn is_comparison(operator: BinaryOperator) -> bool {
    matches!(
        operator,
        BinaryOperator::Equality
            | BinaryOperator::StrictEquality
            | BinaryOperator::Inequality
            | BinaryOperator::StrictInequality
            | BinaryOperator::LessThan
            | BinaryOperator::LessEqualThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterEqualThan
    )
}

fn zero() -> Real {
    Int::from_i64(0).to_real()
}

/// Exact rational of a finite double, as `m / 2^k`
fn real_of(value: f64) -> Option<Real> {
    if !value.is_finite() {
        return None;
    }
    let mut scale: i64 = 1;
    for _ in 0..=52 {
        let scaled = value * scale as f64;
        if scaled.fract() == 0.0 && scaled.abs() <= MAX_SAFE_INTEGER {
            let numerator = Int::from_i64(scaled as i64).to_real();
            return Some(if scale == 1 {
                numerator
            } else {
                numerator / Int::from_i64(scale).to_real()
            });
        }
        scale *= 2;
    }
    None
}

/// Dotted name of an identifier or a non-optional static member chain
pub fn member_path(expr: &Expression<'_>) -> Option<String> {
    match expr {
        Expression::Identifier(ident) => match ident.name.as_str() {
            "undefined" | "NaN" | "Infinity" => None,
            name => Some(name.to_string()),
        },
        Expression::ThisExpression(_) => Some("this".to_string()),
        Expression::StaticMemberExpression(member) if !member.optional => {
            let object = member_path(&member.object)?;
            Some(format!("{}.{}", object, member.property.name))
        }
        Expression::ParenthesizedExpression(paren) => member_path(&paren.expression),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;
    use z3::{SatResult, Solver};

    fn guard(source: &str) -> Bool {
        let allocator = Allocator::default();
        let expr = Parser::new(&allocator, source, SourceType::mjs())
            .parse_expression()
            .expect("guard should parse");
        let mut translator = ConditionTranslator::new(source);
        let formula = translator.get_or_create(&expr);
        translator.to_bool(formula)
    }

    fn is_valid(formula: &Bool) -> bool {
        let solver = Solver::new();
        solver.assert(&formula.not());
        solver.check() == SatResult::Unsat
    }

    fn is_satisfiable(formula: &Bool) -> bool {
        !is_valid(&formula.not())
    }

    #[test]
    fn test_equal_constants_exclude_each_other() {
        let one = guard("x == 1");
        let two = guard("x == 2");
        assert!(!is_satisfiable(&Bool::and(&[&one, &two])));

        let strict = guard("x === 1");
        assert!(is_valid(&strict.implies(&one)));
        // "1" == 1 but not "1" === 1
        assert!(!is_valid(&one.implies(&strict)));
    }

    #[test]
    fn test_sign_tests_do_not_cover_nan() {
        let sign = guard("x < 0 || x === 0 || x > 0");
        assert!(!is_valid(&sign));

        let negated = guard("x < 0 || !(x < 0)");
        assert!(is_valid(&negated));
    }

    #[test]
    fn test_fractions_lie_between_integers() {
        assert!(is_satisfiable(&guard("x > 0 && x < 1")));
        assert!(is_satisfiable(&guard("x < 0.5 && x > 0.25")));
        assert!(!is_satisfiable(&guard("x < 0.5 && x > 0.5")));
        assert!(!is_valid(&guard("x > 0 || x < 1")));
    }

    #[test]
    fn test_truthiness_and_zero_can_overlap() {
        // "0" is truthy and loosely equal to 0
        assert!(is_satisfiable(&guard("x && x == 0")));
        // undefined is neither truthy nor equal to 0
        assert!(!is_valid(&guard("x || x == 0")));
        assert!(is_valid(&guard("x || !x")));
        assert!(!is_satisfiable(&guard("x && x === 0")));
    }

    #[test]
    fn test_member_chain_with_folded_constant() {
        let at_least = guard("this.state.mode >= 2 + 1");
        let below = guard("this.state.mode < 3");
        assert!(!is_satisfiable(&Bool::and(&[&at_least, &below])));
    }

    #[test]
    fn test_operands_outside_the_model_become_shared_atoms() {
        let typeof_check = guard("typeof x === 'string' && typeof x === 'string'");
        assert!(!is_valid(&typeof_check));
        assert!(is_satisfiable(&typeof_check));

        // Two variables may compare as strings
        assert!(!is_valid(&guard("a > b || a <= b")));
        assert!(!is_valid(&guard("x + 1 > 2 || x + 1 <= 2")));
    }

    #[test]
    fn test_nan_constant_compares_false() {
        assert!(!is_satisfiable(&guard("x === NaN")));
        assert!(!is_satisfiable(&guard("x < 0 / 0")));
    }

    #[test]
    fn test_translations_are_cached_per_span() {
        let source = "a > 1";
        let allocator = Allocator::default();
        let expr = Parser::new(&allocator, source, SourceType::mjs())
            .parse_expression()
            .expect("guard should parse");
        let mut translator = ConditionTranslator::new(source);
        translator.get_or_create(&expr);
        translator.get_or_create(&expr);
        assert_eq!(translator.cached_len(), 1);
    }
}
