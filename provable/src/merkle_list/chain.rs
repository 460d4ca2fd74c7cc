use std::fmt;

use serde_json::Value as Json;

use super::{WithHash, WithHashType};
use crate::field::{self, Fp};
use crate::poseidon::Sponge;
use crate::{Aux, Config, Error, Provable, Result, Value};

/// Hash function extending a commitment with one more element
pub trait NextHash<P: Provable + ?Sized>: fmt::Debug {
    /// Commitment of `element` appended to the elements committed by `hash`
    fn next_hash(&self, provable: &P, hash: Fp, element: &P::Value) -> Result<Fp>;
}

/// Poseidon hash salted with a domain separation prefix
///
/// `next_hash(hash, x) = hash_with_prefix(prefix, [hash, ...pack(to_input(x))])`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixedPoseidon {
    sponge: Sponge,
}

impl PrefixedPoseidon {
    /// Hasher of the provided prefix
    pub fn new(prefix: &str) -> Result<Self> {
        Sponge::salted(prefix).map(|sponge| Self { sponge })
    }
}

impl Default for PrefixedPoseidon {
    fn default() -> Self {
        // the empty prefix maps to the zero element
        let mut sponge = Sponge::default();

        sponge.update(&[Fp::zero()]);

        Self { sponge }
    }
}

impl<P: Provable + ?Sized> NextHash<P> for PrefixedPoseidon {
    fn next_hash(&self, provable: &P, hash: Fp, element: &P::Value) -> Result<Fp> {
        let mut input = vec![hash];

        input.extend(provable.to_input(element)?.pack_to_fields());

        let mut sponge = self.sponge;

        sponge.update(&input);

        Ok(sponge.squeeze())
    }
}

/// Custom hash function of a chain
#[derive(Clone, Copy)]
pub struct HashFn<F>(pub F);

impl<F> fmt::Debug for HashFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashFn")
    }
}

impl<P, F> NextHash<P> for HashFn<F>
where
    P: Provable,
    F: Fn(Fp, &P::Value) -> Result<Fp>,
{
    fn next_hash(&self, _provable: &P, hash: Fp, element: &P::Value) -> Result<Fp> {
        (self.0)(hash, element)
    }
}

/// Commitment scheme shared by a list type and its iterators
///
/// Holds the element codec, the hash function and the commitment of the empty
/// sequence.
#[derive(Debug, Clone)]
pub struct HashChain<P, H = PrefixedPoseidon> {
    with_hash: WithHashType<P>,
    next_hash: H,
    empty_hash: Fp,
}

impl<P: Provable> HashChain<P> {
    /// Chain hashed with the empty prefix
    pub fn new(element: P) -> Self {
        Self::with_next_hash(element, PrefixedPoseidon::default())
    }

    /// Chain hashed with the provided prefix
    pub fn with_prefix(element: P, prefix: &str) -> Result<Self> {
        PrefixedPoseidon::new(prefix).map(|h| Self::with_next_hash(element, h))
    }

    /// Chain hashed with the prefix of the configuration
    pub fn with_config(element: P, config: &Config) -> Result<Self> {
        Self::with_prefix(element, &config.list_prefix)
    }
}

impl<P, H> HashChain<P, H>
where
    P: Provable,
    H: NextHash<P>,
{
    /// Chain hashed with a custom hash function
    pub fn with_next_hash(element: P, next_hash: H) -> Self {
        Self {
            with_hash: WithHashType::new(element),
            next_hash,
            empty_hash: Fp::zero(),
        }
    }

    /// Replace the commitment of the empty sequence
    pub fn with_empty_hash(mut self, empty_hash: Fp) -> Self {
        self.empty_hash = empty_hash;
        self
    }

    /// Codec of the elements
    pub const fn element(&self) -> &P {
        self.with_hash.element()
    }

    /// Codec of the links
    pub const fn link_type(&self) -> &WithHashType<P> {
        &self.with_hash
    }

    /// Commitment of the empty sequence
    pub const fn empty_hash(&self) -> Fp {
        self.empty_hash
    }

    /// Commitment of `element` appended to `hash`
    pub fn next_hash(&self, hash: Fp, element: &P::Value) -> Result<Fp> {
        self.next_hash.next_hash(self.element(), hash, element)
    }

    /// Placeholder link witnessed past the end of a sequence
    pub fn dummy(&self) -> WithHash<P::Value> {
        WithHash::new(self.empty_hash, self.element().empty())
    }

    /// Links of `elements`, each committing to the elements after it, with the
    /// commitment of the whole sequence
    pub fn with_hashes(&self, elements: Vec<P::Value>) -> Result<(Vec<WithHash<P::Value>>, Fp)> {
        let mut hash = self.empty_hash;
        let mut data = Vec::with_capacity(elements.len());

        for element in elements.into_iter().rev() {
            let previous_hash = hash;

            hash = self.next_hash(previous_hash, &element)?;
            data.push(WithHash::new(previous_hash, element));
        }

        data.reverse();

        Ok((data, hash))
    }

    /// Commitment of links stored oldest first, checking every link
    pub(crate) fn fold_forward(&self, data: &[WithHash<P::Value>]) -> Result<Fp> {
        data.iter()
            .enumerate()
            .try_fold(self.empty_hash, |hash, (i, link)| {
                if link.previous_hash != hash {
                    return Err(Error::decode(
                        format!("data[{}]", i),
                        "link doesn't extend the previous commitment",
                    ));
                }

                self.next_hash(hash, &link.element)
            })
    }

    /// Commitments of every suffix of links stored newest first, checking
    /// every link; the last entry is the empty hash
    pub(crate) fn fold_backward(&self, data: &[WithHash<P::Value>]) -> Result<Vec<Fp>> {
        let mut hashes = vec![self.empty_hash; data.len() + 1];

        for (i, link) in data.iter().enumerate().rev() {
            if link.previous_hash != hashes[i + 1] {
                return Err(Error::decode(
                    format!("data[{}]", i),
                    "link doesn't extend the next commitment",
                ));
            }

            hashes[i] = self.next_hash(link.previous_hash, &link.element)?;
        }

        Ok(hashes)
    }

    /// Auxiliary payload of a shadow array
    ///
    /// Every link is a node of its previous hash, its element fields and its
    /// element payload.
    pub(crate) fn data_to_auxiliary(&self, data: &[WithHash<P::Value>]) -> Result<Aux> {
        data.iter()
            .enumerate()
            .map(|(i, link)| {
                self.link_to_auxiliary(link)
                    .map_err(|e| e.within(&format!("data[{}]", i)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Aux::Node)
    }

    fn link_to_auxiliary(&self, link: &WithHash<P::Value>) -> Result<Aux> {
        let element = self.element();
        let fields = element.to_fields(&link.element)?;
        let aux = element.to_auxiliary(Some(&link.element))?;

        Ok(Aux::Node(vec![
            Aux::Leaf(Value::Field(link.previous_hash)),
            Aux::Node(fields.into_iter().map(|x| Aux::Leaf(Value::Field(x))).collect()),
            Aux::Node(aux),
        ]))
    }

    /// Rebuild a shadow array from its auxiliary payload
    pub(crate) fn data_from_auxiliary(&self, aux: Option<&Aux>) -> Result<Vec<WithHash<P::Value>>> {
        let links = match aux {
            Some(Aux::Node(links)) => links.as_slice(),
            None => return Ok(vec![]),
            Some(Aux::Leaf(_)) => return Err(Error::decode("data", "expected a node")),
        };

        links
            .iter()
            .enumerate()
            .map(|(i, link)| {
                self.link_from_auxiliary(link)
                    .map_err(|e| e.within(&format!("data[{}]", i)))
            })
            .collect()
    }

    fn link_from_auxiliary(&self, link: &Aux) -> Result<WithHash<P::Value>> {
        let parts = link.as_node().unwrap_or_default();

        let previous_hash = match parts.first().and_then(Aux::as_leaf) {
            Some(Value::Field(x)) => *x,
            _ => return Err(Error::decode("", "missing previous hash")),
        };

        let fields = parts
            .get(1)
            .and_then(Aux::as_node)
            .ok_or_else(|| Error::decode("", "missing element fields"))?
            .iter()
            .map(|x| match x.as_leaf() {
                Some(Value::Field(x)) => Ok(*x),
                _ => Err(Error::decode("", "expected a field element")),
            })
            .collect::<Result<Vec<_>>>()?;

        let aux = parts
            .get(2)
            .and_then(Aux::as_node)
            .ok_or_else(|| Error::decode("", "missing element payload"))?;

        self.element()
            .from_fields(&fields, aux)
            .map(|element| WithHash::new(previous_hash, element))
            .map_err(|e| e.within("element"))
    }

    pub(crate) fn data_to_json(&self, data: &[WithHash<P::Value>]) -> Result<Json> {
        data.iter()
            .enumerate()
            .map(|(i, link)| {
                self.with_hash
                    .to_json(link)
                    .map_err(|e| e.within(&format!("data[{}]", i)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Json::Array)
    }

    pub(crate) fn data_from_json(&self, json: Option<&Json>) -> Result<Vec<WithHash<P::Value>>> {
        json.and_then(Json::as_array)
            .ok_or_else(|| Error::decode("data", "expected an array"))?
            .iter()
            .enumerate()
            .map(|(i, j)| {
                self.with_hash
                    .from_json(j)
                    .map_err(|e| e.within(&format!("data[{}]", i)))
            })
            .collect()
    }
}

/// Parse a decimal field element stored under `key` of a checkpoint
pub(crate) fn field_from_json(object: &serde_json::Map<String, Json>, key: &str) -> Result<Fp> {
    object
        .get(key)
        .and_then(Json::as_str)
        .ok_or_else(|| Error::decode(key, "expected a decimal string"))
        .and_then(|s| field::from_decimal(s).map_err(|e| e.within(key)))
}
