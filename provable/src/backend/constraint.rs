use crate::field::Fp;

/// Gate kinds produced by the accumulators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// `expected == actual` must hold
    AssertEqual {
        /// Name of the assertion
        label: String,
        /// Committed value
        expected: Fp,
        /// Recomputed value
        actual: Fp,
    },
    /// Boolean output `a == b`
    IsEqual {
        /// Left operand
        a: Fp,
        /// Right operand
        b: Fp,
    },
    /// Output `a` if `condition`, `b` otherwise
    Select {
        /// Selector
        condition: bool,
        /// Value of the true branch
        a: Fp,
        /// Value of the false branch
        b: Fp,
    },
}

/// Gate of the constraint system with its evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    id: usize,
    gate: Gate,
    evaluation: bool,
}

impl Constraint {
    pub(crate) const fn new(id: usize, gate: Gate, evaluation: bool) -> Self {
        Self {
            id,
            gate,
            evaluation,
        }
    }

    /// Id of the constraint in the constraint system
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Gate of the constraint
    pub const fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Evaluation of the gate; `false` for a failed assertion
    pub const fn evaluation(&self) -> bool {
        self.evaluation
    }
}
