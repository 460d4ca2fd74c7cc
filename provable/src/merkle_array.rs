//! Read-only iterator over a hash-chained sequence.
//!
//! A [`MerkleArray`] walks a committed sequence from its first element to the
//! last one, checking every element against the commitment of the remaining
//! suffix. Once the end is reached, further calls to [`MerkleArray::next`]
//! return the empty element and leave the iterator unchanged, so a circuit can
//! consume a sequence of bounded length with a fixed number of calls.

use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::field::{self, Fp};
use crate::merkle_list::field_from_json;
use crate::provable::{expect_fields, select, witness};
use crate::{
    Aux, Composer, Config, Error, HashChain, MerkleList, NextHash, PrefixedPoseidon, Provable,
    Result, Unconstrained, Value, WithHash,
};

/// Type of an iterator over a hash-chained sequence of `P` elements
#[derive(Debug)]
pub struct MerkleArrayType<P, H = PrefixedPoseidon> {
    chain: Arc<HashChain<P, H>>,
}

impl<P, H> Clone for MerkleArrayType<P, H> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<P: Provable> MerkleArrayType<P> {
    /// Iterator type hashed with the empty prefix
    pub fn new(element: P) -> Self {
        Self::from_chain(HashChain::new(element))
    }

    /// Iterator type hashed with the provided prefix
    pub fn with_prefix(element: P, prefix: &str) -> Result<Self> {
        HashChain::with_prefix(element, prefix).map(Self::from_chain)
    }

    /// Iterator type hashed with the prefix of the configuration
    pub fn with_config(element: P, config: &Config) -> Result<Self> {
        HashChain::with_config(element, config).map(Self::from_chain)
    }
}

impl<P, H> MerkleArrayType<P, H>
where
    P: Provable,
    H: NextHash<P>,
{
    /// Iterator type hashed with a custom hash function
    pub fn with_next_hash(element: P, next_hash: H) -> Self {
        Self::from_chain(HashChain::with_next_hash(element, next_hash))
    }

    /// Iterator type of a commitment scheme
    pub fn from_chain(chain: HashChain<P, H>) -> Self {
        Self::from_shared(Arc::new(chain))
    }

    pub(crate) fn from_shared(chain: Arc<HashChain<P, H>>) -> Self {
        Self { chain }
    }

    /// Commitment scheme of the type
    pub fn chain(&self) -> &HashChain<P, H> {
        &self.chain
    }

    /// Iterator over an empty sequence
    pub fn empty(&self) -> MerkleArray<P, H> {
        MerkleArray::from_parts(Arc::clone(&self.chain), vec![], self.chain.empty_hash())
    }

    /// Iterator yielding `elements` in order
    ///
    /// The whole chain is computed in one pass, from the last element to the
    /// first.
    pub fn from(&self, elements: Vec<P::Value>) -> Result<MerkleArray<P, H>> {
        let (data, hash) = self.chain.with_hashes(elements)?;

        Ok(MerkleArray::from_parts(Arc::clone(&self.chain), data, hash))
    }

    /// Iterator over a list, newest element first
    pub fn start_iterating(&self, list: &MerkleList<P, H>) -> MerkleArray<P, H> {
        list.start_iterating()
    }
}

/// Iterator over a hash-chained sequence
#[derive(Debug)]
pub struct MerkleArray<P: Provable, H = PrefixedPoseidon> {
    chain: Arc<HashChain<P, H>>,
    data: Unconstrained<Vec<WithHash<P::Value>>>,
    hash: Fp,
    current_hash: Fp,
    current_index: Unconstrained<usize>,
}

impl<P: Provable, H> Clone for MerkleArray<P, H> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            data: self.data.clone(),
            hash: self.hash,
            current_hash: self.current_hash,
            current_index: self.current_index.clone(),
        }
    }
}

impl<P, H> PartialEq for MerkleArray<P, H>
where
    P: Provable,
    P::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.current_hash == other.current_hash
            && self.current_index == other.current_index
            && self
                .data
                .as_prover(|a| other.data.as_prover(|b| a == b))
    }
}

impl<P, H> MerkleArray<P, H>
where
    P: Provable,
    H: NextHash<P>,
{
    pub(crate) fn from_parts(
        chain: Arc<HashChain<P, H>>,
        data: Vec<WithHash<P::Value>>,
        hash: Fp,
    ) -> Self {
        Self {
            chain,
            data: Unconstrained::new(data),
            hash,
            current_hash: hash,
            current_index: Unconstrained::new(0),
        }
    }

    /// Commitment of the whole sequence
    pub const fn hash(&self) -> Fp {
        self.hash
    }

    /// Commitment of the elements not yet returned
    pub const fn current_hash(&self) -> Fp {
        self.current_hash
    }

    /// Position of the next element
    pub const fn current_index(&self) -> &Unconstrained<usize> {
        &self.current_index
    }

    /// Commitment scheme of the iterator
    pub fn chain(&self) -> &HashChain<P, H> {
        &self.chain
    }

    /// Shadow array, in iteration order
    pub const fn data(&self) -> &Unconstrained<Vec<WithHash<P::Value>>> {
        &self.data
    }

    /// Mutable shadow array, in iteration order
    pub fn data_mut(&mut self) -> &mut Unconstrained<Vec<WithHash<P::Value>>> {
        &mut self.data
    }

    fn len(&self) -> usize {
        self.data.as_prover(Vec::len)
    }

    /// Assert no element was consumed
    pub fn assert_at_start<C>(&self, cs: &mut C) -> Result<()>
    where
        C: Composer + ?Sized,
    {
        cs.assert_equal("merkle array at start", self.hash, self.current_hash)
    }

    /// Check if every element was consumed
    pub fn is_at_end<C>(&self, cs: &mut C) -> bool
    where
        C: Composer + ?Sized,
    {
        cs.is_equal(self.current_hash, self.chain.empty_hash())
    }

    /// Assert every element was consumed
    pub fn assert_at_end<C>(&self, cs: &mut C) -> Result<()>
    where
        C: Composer + ?Sized,
    {
        cs.assert_equal(
            "merkle array at end",
            self.chain.empty_hash(),
            self.current_hash,
        )
    }

    /// Skip the remaining elements
    pub fn jump_to_end(&mut self) {
        let len = self.len();

        self.current_index.update_as_prover(|i| *i = len);
        self.current_hash = self.chain.empty_hash();
    }

    /// Skip the remaining elements if `condition` holds
    pub fn jump_to_end_if<C>(&mut self, cs: &mut C, condition: bool)
    where
        C: Composer + ?Sized,
    {
        let len = self.len();

        if condition {
            self.current_index.update_as_prover(|i| *i = len);
        }

        self.current_hash = cs.select(condition, self.chain.empty_hash(), self.current_hash);
    }

    /// Next element of the sequence
    ///
    /// Past the end, the empty element is returned and the iterator is left
    /// unchanged.
    pub fn next<C>(&mut self, cs: &mut C) -> Result<P::Value>
    where
        C: Composer + ?Sized,
    {
        let (element, is_dummy) = self.next_unchecked_dummy(cs)?;
        let provable = self.chain.element();

        select(cs, provable, is_dummy, &provable.empty(), &element)
    }

    /// Next element of the sequence with a flag set past the end
    ///
    /// The returned element is only meaningful when the flag is unset; past
    /// the end it is whatever placeholder the prover witnessed.
    pub fn next_unchecked_dummy<C>(&mut self, cs: &mut C) -> Result<(P::Value, bool)>
    where
        C: Composer + ?Sized,
    {
        let empty_hash = self.chain.empty_hash();

        let WithHash {
            previous_hash,
            element,
        } = witness(cs, self.chain.link_type(), || {
            let index = self.current_index.as_prover(|i| *i);

            self.data
                .as_prover(|data| data.get(index).cloned())
                .unwrap_or_else(|| self.chain.dummy())
        })?;

        let is_dummy = self.is_at_end(cs);

        let recomputed = self.chain.next_hash(previous_hash, &element)?;
        let expected = cs.select(is_dummy, empty_hash, recomputed);

        cs.assert_equal("merkle array next", self.current_hash, expected)?;

        let len = self.len();

        self.current_index
            .update_as_prover(|i| *i = (*i + 1).min(len));
        self.current_hash = cs.select(is_dummy, empty_hash, previous_hash);

        tracing::trace!(
            "merkle array next: {}, dummy: {}",
            field::to_decimal(&self.current_hash),
            is_dummy
        );

        Ok((element, is_dummy))
    }
}

const HASH: &str = "hash";
const DATA: &str = "data";
const CURRENT_HASH: &str = "currentHash";
const CURRENT_INDEX: &str = "currentIndex";

impl<P, H> Provable for MerkleArrayType<P, H>
where
    P: Provable,
    H: NextHash<P>,
{
    type Value = MerkleArray<P, H>;

    fn size_in_fields(&self) -> usize {
        2
    }

    fn to_fields(&self, value: &Self::Value) -> Result<Vec<Fp>> {
        Ok(vec![value.hash, value.current_hash])
    }

    fn to_auxiliary(&self, value: Option<&Self::Value>) -> Result<Vec<Aux>> {
        match value {
            Some(array) => {
                let data = array
                    .data
                    .as_prover(|data| self.chain.data_to_auxiliary(data))?;
                let index = array.current_index.as_prover(|i| *i as u64);

                Ok(vec![data, Aux::Leaf(Value::UInt64(index))])
            }
            None => Ok(vec![Aux::Node(vec![]), Aux::Leaf(Value::UInt64(0))]),
        }
    }

    fn from_fields(&self, fields: &[Fp], aux: &[Aux]) -> Result<Self::Value> {
        expect_fields(fields, 2)?;

        let data = self.chain.data_from_auxiliary(aux.first())?;
        let index = match aux.get(1).and_then(Aux::as_leaf) {
            Some(Value::UInt64(i)) => *i as usize,
            None => 0,
            _ => return Err(Error::decode(CURRENT_INDEX, "expected an index")),
        };

        Ok(MerkleArray {
            chain: Arc::clone(&self.chain),
            data: Unconstrained::new(data),
            hash: fields[0],
            current_hash: fields[1],
            current_index: Unconstrained::new(index),
        })
    }

    fn to_json(&self, value: &Self::Value) -> Result<Json> {
        let data = value.data.as_prover(|data| self.chain.data_to_json(data))?;
        let index = value.current_index.as_prover(|i| *i);

        let mut object = Map::with_capacity(4);

        object.insert(HASH.into(), Json::String(field::to_decimal(&value.hash)));
        object.insert(DATA.into(), data);
        object.insert(
            CURRENT_HASH.into(),
            Json::String(field::to_decimal(&value.current_hash)),
        );
        object.insert(CURRENT_INDEX.into(), Json::from(index));

        Ok(Json::Object(object))
    }

    fn from_json(&self, json: &Json) -> Result<Self::Value> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::decode("", "expected an object"))?;

        let hash = field_from_json(object, HASH)?;
        let current_hash = field_from_json(object, CURRENT_HASH)?;
        let data = self.chain.data_from_json(object.get(DATA))?;

        let index = object
            .get(CURRENT_INDEX)
            .and_then(Json::as_u64)
            .and_then(|i| usize::try_from(i).ok())
            .filter(|i| *i <= data.len())
            .ok_or_else(|| Error::decode(CURRENT_INDEX, "expected an index within the data"))?;

        let suffixes = self.chain.fold_backward(&data)?;

        if suffixes[0] != hash {
            return Err(Error::decode(DATA, "shadow array doesn't fold to the hash"));
        }

        if suffixes[index] != current_hash {
            return Err(Error::decode(
                CURRENT_HASH,
                "doesn't commit to the remaining elements",
            ));
        }

        tracing::debug!(
            "merkle array restored at {} of {} elements",
            index,
            data.len()
        );

        Ok(MerkleArray {
            chain: Arc::clone(&self.chain),
            data: Unconstrained::new(data),
            hash,
            current_hash,
            current_index: Unconstrained::new(index),
        })
    }

    fn check(&self, _value: &Self::Value) -> Result<()> {
        Ok(())
    }

    fn empty(&self) -> Self::Value {
        MerkleArrayType::empty(self)
    }
}
