use crate::field::Fp;

/// Value allocated by the prover in a constraint system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Witness {
    id: usize,
    value: Fp,
}

impl Witness {
    pub(crate) const fn new(id: usize, value: Fp) -> Self {
        Self { id, value }
    }

    /// Id of the witness in the constraint system
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Value of the witness
    pub const fn value(&self) -> &Fp {
        &self.value
    }
}
