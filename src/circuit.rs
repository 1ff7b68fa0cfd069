//! Boolean connectives on top of a linear model.
//!
//! The ILP surface only knows linear rows, so every gate gets a fresh binary
//! output variable tied to its inputs by the usual big-M free encoding:
//!
//! - `y = OR(x1..xn)`:  `y >= xi` for each i, `y <= x1 + .. + xn`
//! - `y = AND(x1..xn)`: `y <= xi` for each i, `y >= x1 + .. + xn - (n - 1)`
//!
//! All inputs must be binary.

use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable};

/// Collects the rows of the gates it creates until the model exists.
#[derive(Default)]
pub struct Circuit {
    constraints: Vec<Constraint>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a variable equal to the OR of `inputs`, or `None` for no inputs.
    /// A single input is returned as is.
    pub fn or(&mut self, vars: &mut ProblemVariables, inputs: &[Variable]) -> Option<Variable> {
        match inputs {
            [] => None,
            [single] => Some(*single),
            _ => {
                let out = vars.add(variable().binary());
                for input in inputs {
                    self.constraints.push(constraint!(out >= *input));
                }
                let any: Expression = inputs.iter().copied().sum();
                self.constraints.push(constraint!(out <= any));
                Some(out)
            }
        }
    }

    /// Returns a variable equal to the AND of `inputs`, or `None` for no inputs.
    pub fn and(&mut self, vars: &mut ProblemVariables, inputs: &[Variable]) -> Option<Variable> {
        match inputs {
            [] => None,
            [single] => Some(*single),
            _ => {
                let out = vars.add(variable().binary());
                for input in inputs {
                    self.constraints.push(constraint!(out <= *input));
                }
                let all: Expression = inputs.iter().copied().sum();
                let slack = (inputs.len() - 1) as f64;
                self.constraints.push(constraint!(out >= all - slack));
                Some(out)
            }
        }
    }

    pub fn push(&mut self, row: Constraint) {
        self.constraints.push(row);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
    }
}
