/// Prover-side cell
///
/// The contents never reach the constraint system on their own: they can only
/// be read or mutated inside closures, and the only way for circuit code to
/// use them is to witness a value computed by such a closure.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Unconstrained<T> {
    value: T,
}

impl<T> Unconstrained<T> {
    /// Wrap a prover-side value
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Compute from the contents of the cell
    pub fn as_prover<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value)
    }

    /// Mutate the contents of the cell
    pub fn update_as_prover<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.value)
    }

    /// Unwrap the contents of the cell
    pub fn into_inner(self) -> T {
        self.value
    }
}
