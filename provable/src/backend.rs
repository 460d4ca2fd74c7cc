//! Constraint-system seam.
//!
//! Accumulators and iterators never touch constraints directly: they allocate
//! witnesses, assert equalities and select between branches through a
//! [`Composer`]. [`ConstraintSystem`] is the implementation shipped with the
//! crate; it evaluates every gate eagerly and, in checked mode, keeps a log of
//! the witnesses and constraints it produced.

mod constraint;
mod witness;

use serde::{Deserialize, Serialize};

use crate::field::{self, Fp};
use crate::{Config, Error, Result};

pub use constraint::{Constraint, Gate};
pub use witness::Witness;

/// Execution mode of a composer
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Gates are evaluated and assertions enforced
    #[default]
    Checked,
    /// Host-side computation; assertions are skipped
    Native,
}

/// Circuit backend consumed by the accumulators
pub trait Composer {
    /// Execution mode of the composer
    fn mode(&self) -> Mode;

    /// Allocate a prover-supplied value
    fn append_witness(&mut self, value: Fp) -> Fp;

    /// Constrain `actual` to equal the committed `expected` value
    fn assert_equal(&mut self, label: &str, expected: Fp, actual: Fp) -> Result<()>;

    /// Boolean equality gate
    fn is_equal(&mut self, a: Fp, b: Fp) -> bool;

    /// Select `a` if `condition` holds, `b` otherwise
    fn select(&mut self, condition: bool, a: Fp, b: Fp) -> Fp;

    /// Check if the assertions are enforced
    fn is_checked(&self) -> bool {
        self.mode() == Mode::Checked
    }
}

/// Eagerly evaluated constraint system
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConstraintSystem {
    mode: Mode,
    record: bool,
    witnesses: Vec<Witness>,
    constraints: Vec<Constraint>,
}

impl ConstraintSystem {
    /// Checked constraint system that records its gates
    pub fn checked() -> Self {
        Self {
            mode: Mode::Checked,
            record: true,
            ..Default::default()
        }
    }

    /// Native constraint system
    pub fn native() -> Self {
        Self {
            mode: Mode::Native,
            ..Default::default()
        }
    }

    /// Constraint system built from a configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            mode: config.mode,
            record: config.record_constraints && config.mode == Mode::Checked,
            ..Default::default()
        }
    }

    /// Allocated witnesses, in allocation order
    pub fn witnesses(&self) -> &[Witness] {
        &self.witnesses
    }

    /// Produced constraints, in creation order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Fetch a recorded witness by its id
    pub fn fetch_witness(&self, id: usize) -> Option<&Witness> {
        self.witnesses.get(id)
    }

    /// Fetch a recorded constraint by its id
    pub fn fetch_constraint(&self, id: usize) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    fn push_constraint(&mut self, gate: Gate, evaluation: bool) {
        if !self.record {
            return;
        }

        let id = self.constraints.len();

        tracing::trace!("constraint {}: {:?} -> {}", id, gate, evaluation);

        self.constraints.push(Constraint::new(id, gate, evaluation));
    }
}

impl Composer for ConstraintSystem {
    fn mode(&self) -> Mode {
        self.mode
    }

    fn append_witness(&mut self, value: Fp) -> Fp {
        if self.record {
            let id = self.witnesses.len();

            tracing::trace!("witness {}: {}", id, field::to_decimal(&value));

            self.witnesses.push(Witness::new(id, value));
        }

        value
    }

    fn assert_equal(&mut self, label: &str, expected: Fp, actual: Fp) -> Result<()> {
        if self.mode == Mode::Native {
            return Ok(());
        }

        let evaluation = expected == actual;

        self.push_constraint(
            Gate::AssertEqual {
                label: label.to_string(),
                expected,
                actual,
            },
            evaluation,
        );

        if !evaluation {
            tracing::warn!("assertion `{}` failed", label);

            return Err(Error::ChainIntegrity {
                label: label.to_string(),
                expected: field::to_decimal(&expected),
                actual: field::to_decimal(&actual),
            });
        }

        Ok(())
    }

    fn is_equal(&mut self, a: Fp, b: Fp) -> bool {
        let evaluation = a == b;

        self.push_constraint(Gate::IsEqual { a, b }, evaluation);

        evaluation
    }

    fn select(&mut self, condition: bool, a: Fp, b: Fp) -> Fp {
        let out = if condition { a } else { b };

        self.push_constraint(Gate::Select { condition, a, b }, true);

        out
    }
}
