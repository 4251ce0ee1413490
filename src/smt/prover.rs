//! Refutation-based proofs over guard formulas

use crate::error::{Error, Result};
use std::time::Duration;
use z3::ast::{Ast, Bool};
use z3::{Goal, Tactic};

/// Name of the Z3 tactic that decides each proof goal
const DECIDING_TACTIC: &str = "smt";

/// Proves properties of guard formulas by refuting their negation.
///
/// Every query builds a single goal from the simplified negated claim and
/// hands it to a fixed deciding tactic. The claim holds iff the tactic decides
/// the goal unsatisfiable. A tactic that fails or gives up (timeouts, resource
/// limits) leaves the claim unproved.
pub struct ConditionProver {
    tactic: Tactic,
}

impl ConditionProver {
    /// Create a prover whose tactic gives up after `timeout`
    pub fn new(timeout: Option<Duration>) -> Self {
        let tactic = Tactic::new(DECIDING_TACTIC);
        let tactic = match timeout {
            Some(timeout) => tactic.try_for(timeout),
            None => tactic,
        };
        Self { tactic }
    }

    /// Prove `claim` valid by showing `not claim` is unsatisfiable
    pub fn prove(&self, claim: &Bool) -> Result<bool> {
        let goal = Goal::new(false, false, false);
        goal.assert(&claim.not().simplify());

        let applied = match self.tactic.apply(&goal, None) {
            Ok(applied) => applied,
            Err(reason) => {
                log::debug!("Proof left undecided: {}", reason);
                return Ok(false);
            }
        };

        let subgoals: Vec<Goal> = applied.list_subgoals().collect();
        if subgoals.len() != 1 {
            return Err(Error::UnexpectedSubgoals {
                count: subgoals.len(),
            });
        }
        Ok(subgoals[0].is_decided_unsat())
    }

    /// Check that no assignment satisfies `formula`
    pub fn is_unsatisfiable(&self, formula: &Bool) -> Result<bool> {
        self.prove(&formula.not())
    }

    /// Check that every assignment satisfies `formula`
    pub fn is_tautology(&self, formula: &Bool) -> Result<bool> {
        self.prove(formula)
    }

    /// `cond` can never hold together with any of `accumulated`
    pub fn mutually_exclusive(&self, cond: &Bool, accumulated: &[Bool]) -> Result<bool> {
        if accumulated.is_empty() {
            return Ok(true);
        }
        let any = disjunction(accumulated);
        self.is_unsatisfiable(&Bool::and(&[cond, &any]))
    }

    /// At least one of `accumulated` holds under every assignment
    pub fn exhaustive(&self, accumulated: &[Bool]) -> Result<bool> {
        if accumulated.is_empty() {
            return Ok(false);
        }
        self.is_tautology(&disjunction(accumulated))
    }
}

fn disjunction(formulas: &[Bool]) -> Bool {
    let refs: Vec<&Bool> = formulas.iter().collect();
    Bool::or(&refs)
}
