//! Write-once, hash-chained list accumulator.
//!
//! A [`MerkleList`] is committed to by a single field element: every push
//! hashes the new element onto the previous commitment. The elements are kept
//! in a prover-side shadow array, and every element read back from it is
//! checked against a link of the chain before it reaches the circuit.

mod chain;
mod with_hash;


use std::sync::Arc;

use serde_json::{Map, Value as Json};

use crate::field::{self, Fp};
use crate::provable::{expect_fields, select, witness};
use crate::{Aux, Composer, Config, Error, MerkleArray, MerkleArrayType, Provable, Result};
use crate::Unconstrained;

pub(crate) use chain::field_from_json;
pub use chain::{HashChain, HashFn, NextHash, PrefixedPoseidon};
pub use with_hash::{WithHash, WithHashType};

/// Type of a hash-chained list of `P` elements
///
/// Lists created from a type share its [`HashChain`], and so its hash
/// function, for their whole lifetime.
#[derive(Debug)]
pub struct MerkleListType<P, H = PrefixedPoseidon> {
    chain: Arc<HashChain<P, H>>,
}

impl<P, H> Clone for MerkleListType<P, H> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<P: Provable> MerkleListType<P> {
    /// List type hashed with the empty prefix
    pub fn new(element: P) -> Self {
        Self::from_chain(HashChain::new(element))
    }

    /// List type hashed with the provided prefix
    pub fn with_prefix(element: P, prefix: &str) -> Result<Self> {
        HashChain::with_prefix(element, prefix).map(Self::from_chain)
    }

    /// List type hashed with the prefix of the configuration
    pub fn with_config(element: P, config: &Config) -> Result<Self> {
        HashChain::with_config(element, config).map(Self::from_chain)
    }
}

impl<P, H> MerkleListType<P, H>
where
    P: Provable,
    H: NextHash<P>,
{
    /// List type hashed with a custom hash function
    pub fn with_next_hash(element: P, next_hash: H) -> Self {
        Self::from_chain(HashChain::with_next_hash(element, next_hash))
    }

    /// List type of a commitment scheme
    pub fn from_chain(chain: HashChain<P, H>) -> Self {
        Self {
            chain: Arc::new(chain),
        }
    }

    /// Commitment scheme of the type
    pub fn chain(&self) -> &HashChain<P, H> {
        &self.chain
    }

    /// Iterator type sharing the commitment scheme
    pub fn iterator_type(&self) -> MerkleArrayType<P, H> {
        MerkleArrayType::from_shared(Arc::clone(&self.chain))
    }

    /// Empty list
    pub fn empty(&self) -> MerkleList<P, H> {
        MerkleList {
            hash: self.chain.empty_hash(),
            chain: Arc::clone(&self.chain),
            data: Unconstrained::default(),
        }
    }

    /// List with `elements` pushed in order
    ///
    /// The last element is the first one to be popped.
    pub fn from(&self, elements: Vec<P::Value>) -> Result<MerkleList<P, H>> {
        let mut list = self.empty();

        elements.into_iter().try_for_each(|x| list.push(x))?;

        Ok(list)
    }

    /// List with `elements` pushed from the last to the first
    ///
    /// Popping and iterating yield `elements` in order, and the commitment is
    /// the one of [`MerkleArrayType::from`] over the same elements.
    pub fn from_reverse(&self, elements: Vec<P::Value>) -> Result<MerkleList<P, H>> {
        let (mut data, hash) = self.chain.with_hashes(elements)?;

        // the shadow array of a list is stored oldest first
        data.reverse();

        Ok(MerkleList {
            chain: Arc::clone(&self.chain),
            hash,
            data: Unconstrained::new(data),
        })
    }
}

/// Hash-chained list
#[derive(Debug)]
pub struct MerkleList<P: Provable, H = PrefixedPoseidon> {
    chain: Arc<HashChain<P, H>>,
    hash: Fp,
    data: Unconstrained<Vec<WithHash<P::Value>>>,
}

impl<P: Provable, H> Clone for MerkleList<P, H> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            hash: self.hash,
            data: self.data.clone(),
        }
    }
}

impl<P, H> PartialEq for MerkleList<P, H>
where
    P: Provable,
    P::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self
                .data
                .as_prover(|a| other.data.as_prover(|b| a == b))
    }
}

impl<P, H> MerkleList<P, H>
where
    P: Provable,
    H: NextHash<P>,
{
    /// Commitment of the list
    pub const fn hash(&self) -> Fp {
        self.hash
    }

    /// Commitment scheme of the list
    pub fn chain(&self) -> &HashChain<P, H> {
        &self.chain
    }

    /// Shadow array, oldest element first
    pub const fn data(&self) -> &Unconstrained<Vec<WithHash<P::Value>>> {
        &self.data
    }

    /// Mutable shadow array, oldest element first
    pub fn data_mut(&mut self) -> &mut Unconstrained<Vec<WithHash<P::Value>>> {
        &mut self.data
    }

    /// Append an element
    pub fn push(&mut self, element: P::Value) -> Result<()> {
        let previous_hash = self.hash;

        self.hash = self.chain.next_hash(previous_hash, &element)?;

        tracing::debug!("merkle list push: {}", field::to_decimal(&self.hash));

        self.data
            .update_as_prover(|data| data.push(WithHash::new(previous_hash, element)));

        Ok(())
    }

    /// Append an element if `condition` holds
    ///
    /// Both commitments are computed and the composer selects one of them.
    pub fn push_if<C>(&mut self, cs: &mut C, condition: bool, element: P::Value) -> Result<()>
    where
        C: Composer + ?Sized,
    {
        let previous_hash = self.hash;
        let next = self.chain.next_hash(previous_hash, &element)?;

        self.hash = cs.select(condition, next, previous_hash);

        tracing::debug!(
            "merkle list push if {}: {}",
            condition,
            field::to_decimal(&self.hash)
        );

        if condition {
            self.data
                .update_as_prover(|data| data.push(WithHash::new(previous_hash, element)));
        }

        Ok(())
    }

    /// Remove the last element; the list must not be empty
    pub fn pop_exn<C>(&mut self, cs: &mut C) -> Result<P::Value>
    where
        C: Composer + ?Sized,
    {
        if self.hash == self.chain.empty_hash() {
            return Err(Error::EmptyAccumulator);
        }

        let WithHash {
            previous_hash,
            element,
        } = self.witness_last(cs)?;

        let actual = self.chain.next_hash(previous_hash, &element)?;

        cs.assert_equal("merkle list pop", self.hash, actual)?;

        self.hash = previous_hash;
        self.data.update_as_prover(|data| data.pop());

        tracing::debug!("merkle list pop: {}", field::to_decimal(&self.hash));

        Ok(element)
    }

    /// Remove the last element
    ///
    /// An empty list is left unchanged and the empty element is returned.
    pub fn pop<C>(&mut self, cs: &mut C) -> Result<P::Value>
    where
        C: Composer + ?Sized,
    {
        self.pop_if(cs, true)
    }

    /// Return the last element, removing it only if `condition` holds
    ///
    /// The last link is checked regardless of the condition. The empty element
    /// is returned when the list is empty.
    pub fn pop_if<C>(&mut self, cs: &mut C, condition: bool) -> Result<P::Value>
    where
        C: Composer + ?Sized,
    {
        let is_empty = self.is_empty(cs);
        let empty_hash = self.chain.empty_hash();

        let WithHash {
            previous_hash,
            element,
        } = self.witness_last(cs)?;

        let recomputed = self.chain.next_hash(previous_hash, &element)?;
        let expected = cs.select(is_empty, empty_hash, recomputed);

        cs.assert_equal("merkle list pop", self.hash, expected)?;

        let popped = cs.select(is_empty, empty_hash, previous_hash);

        self.hash = cs.select(condition, popped, self.hash);

        if condition && !is_empty {
            self.data.update_as_prover(|data| data.pop());
        }

        tracing::debug!(
            "merkle list pop if {}: {}",
            condition,
            field::to_decimal(&self.hash)
        );

        let provable = self.chain.element();

        select(cs, provable, is_empty, &provable.empty(), &element)
    }

    fn witness_last<C>(&self, cs: &mut C) -> Result<WithHash<P::Value>>
    where
        C: Composer + ?Sized,
    {
        witness(cs, self.chain.link_type(), || {
            self.data
                .as_prover(|data| data.last().cloned())
                .unwrap_or_else(|| self.chain.dummy())
        })
    }

    /// Number of elements in the shadow array
    pub fn length_unconstrained(&self) -> Unconstrained<usize> {
        Unconstrained::new(self.data.as_prover(Vec::len))
    }

    /// Elements of the shadow array, oldest first
    pub fn to_vec_unconstrained(&self) -> Unconstrained<Vec<P::Value>> {
        Unconstrained::new(
            self.data
                .as_prover(|data| data.iter().map(|link| link.element.clone()).collect()),
        )
    }

    /// Check if the commitment is the empty hash
    pub fn is_empty<C>(&self, cs: &mut C) -> bool
    where
        C: Composer + ?Sized,
    {
        cs.is_equal(self.hash, self.chain.empty_hash())
    }

    /// Check if the commitment isn't the empty hash
    pub fn not_empty<C>(&self, cs: &mut C) -> bool
    where
        C: Composer + ?Sized,
    {
        !self.is_empty(cs)
    }

    /// Iterator over the list, newest element first
    pub fn start_iterating(&self) -> MerkleArray<P, H> {
        let data = self.data.as_prover(|data| data.iter().rev().cloned().collect());

        MerkleArray::from_parts(Arc::clone(&self.chain), data, self.hash)
    }

    /// Call `f` on exactly `length` elements, newest first
    ///
    /// Past the end of the list `f` receives the empty element with the dummy
    /// flag set. The list must have at most `length` elements.
    pub fn for_each<C, F>(&self, cs: &mut C, length: usize, mut f: F) -> Result<()>
    where
        C: Composer + ?Sized,
        F: FnMut(&mut C, P::Value, bool, usize) -> Result<()>,
    {
        let mut iter = self.start_iterating();

        for i in 0..length {
            let (element, is_dummy) = iter.next_unchecked_dummy(cs)?;

            f(cs, element, is_dummy, i)?;
        }

        iter.assert_at_end(cs)
    }
}

const HASH: &str = "hash";
const DATA: &str = "data";

impl<P, H> Provable for MerkleListType<P, H>
where
    P: Provable,
    H: NextHash<P>,
{
    type Value = MerkleList<P, H>;

    fn size_in_fields(&self) -> usize {
        1
    }

    fn to_fields(&self, value: &Self::Value) -> Result<Vec<Fp>> {
        Ok(vec![value.hash])
    }

    fn to_auxiliary(&self, value: Option<&Self::Value>) -> Result<Vec<Aux>> {
        let data = match value {
            Some(list) => list
                .data
                .as_prover(|data| self.chain.data_to_auxiliary(data))?,
            None => Aux::Node(vec![]),
        };

        Ok(vec![data])
    }

    fn from_fields(&self, fields: &[Fp], aux: &[Aux]) -> Result<Self::Value> {
        expect_fields(fields, 1)?;

        let data = self.chain.data_from_auxiliary(aux.first())?;

        Ok(MerkleList {
            chain: Arc::clone(&self.chain),
            hash: fields[0],
            data: Unconstrained::new(data),
        })
    }

    fn to_json(&self, value: &Self::Value) -> Result<Json> {
        let data = value.data.as_prover(|data| self.chain.data_to_json(data))?;

        let mut object = Map::with_capacity(2);

        object.insert(HASH.into(), Json::String(field::to_decimal(&value.hash)));
        object.insert(DATA.into(), data);

        Ok(Json::Object(object))
    }

    fn from_json(&self, json: &Json) -> Result<Self::Value> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::decode("", "expected an object"))?;

        let hash = field_from_json(object, HASH)?;
        let data = self.chain.data_from_json(object.get(DATA))?;

        if self.chain.fold_forward(&data)? != hash {
            return Err(Error::decode(DATA, "shadow array doesn't fold to the hash"));
        }

        tracing::debug!("merkle list restored with {} elements", data.len());

        Ok(MerkleList {
            chain: Arc::clone(&self.chain),
            hash,
            data: Unconstrained::new(data),
        })
    }

    fn check(&self, _value: &Self::Value) -> Result<()> {
        Ok(())
    }

    fn empty(&self) -> Self::Value {
        MerkleListType::empty(self)
    }
}
