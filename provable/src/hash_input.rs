use crate::field::{self, Fp};

/// Structured hash preimage
///
/// `fields` are hashed as full field elements; every entry of `packed` is a
/// small value together with its bit width, and consecutive entries are packed
/// into as few field elements as possible before hashing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HashInput {
    /// Full-width field elements
    pub fields: Vec<Fp>,
    /// Values with their bit widths
    pub packed: Vec<(Fp, u32)>,
}

impl HashInput {
    /// Identity of [`HashInput::append`]
    pub const fn empty() -> Self {
        Self {
            fields: Vec::new(),
            packed: Vec::new(),
        }
    }

    /// Input made of full field elements only
    pub fn from_fields(fields: Vec<Fp>) -> Self {
        Self {
            fields,
            packed: Vec::new(),
        }
    }

    /// Input made of a single packed chunk of `bits` bits
    pub fn packed(value: Fp, bits: u32) -> Self {
        Self {
            fields: Vec::new(),
            packed: vec![(value, bits)],
        }
    }

    /// Concatenate `fields` and `packed` of both inputs independently
    pub fn append(mut self, other: Self) -> Self {
        self.fields.extend(other.fields);
        self.packed.extend(other.packed);
        self
    }

    /// Check if the input carries no data
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.packed.is_empty()
    }

    /// Flatten the input into field elements
    ///
    /// The full-width elements come first, followed by the packed chunks
    /// filled left to right: a word keeps absorbing chunks as `word * 2^bits +
    /// chunk` while the accumulated width fits [`field::CAPACITY_BITS`].
    pub fn pack_to_fields(&self) -> Vec<Fp> {
        let mut out = self.fields.clone();

        let (first, rest) = match self.packed.split_first() {
            Some(s) => s,
            None => return out,
        };

        let (mut word, mut width) = *first;

        for (chunk, bits) in rest {
            let next = width.saturating_add(*bits);

            if next <= field::CAPACITY_BITS {
                word = word * field::pow2(*bits) + *chunk;
                width = next;
            } else {
                out.push(word);
                word = *chunk;
                width = *bits;
            }
        }

        out.push(word);
        out
    }
}

impl From<Vec<Fp>> for HashInput {
    fn from(fields: Vec<Fp>) -> Self {
        Self::from_fields(fields)
    }
}
