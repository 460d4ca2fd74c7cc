//! The structural encode/decode/hash/validate protocol.
//!
//! A [`Provable`] describes how a value of some type is laid out in a circuit:
//! a fixed number of field elements plus an auxiliary payload ([`Aux`]) for
//! everything that can't live in a field element. The same description
//! provides the hash preimage of the value, its JSON form and the validity
//! check applied to prover-supplied witnesses.
//!
//! Terminal codecs are implemented as plain types ([`FieldType`],
//! [`BoolType`], [`UInt32Type`], [`UInt64Type`]). They can be composed
//! statically, as [`WithHashType`](crate::WithHashType) does, or lifted into a
//! dynamic [`TypeDesc`](crate::TypeDesc) through [`Dynamic`].

mod impls;


use std::fmt;

use crate::field::Fp;
use crate::{Aux, Composer, Error, HashInput, Result};

pub use impls::{BoolType, Dynamic, DynamicValue, FieldType, UInt32Type, UInt64Type};

/// Codec of a value type
pub trait Provable: fmt::Debug {
    /// Native representation of the encoded values
    type Value: Clone + fmt::Debug;

    /// Number of field elements of every encoded value
    fn size_in_fields(&self) -> usize;

    /// Field elements of a value; always [`Provable::size_in_fields`] long.
    fn to_fields(&self, value: &Self::Value) -> Result<Vec<Fp>>;

    /// Auxiliary payload of a value
    ///
    /// When the value is absent, the payload of the default value is produced
    /// so a layout can be computed before the value is known.
    fn to_auxiliary(&self, value: Option<&Self::Value>) -> Result<Vec<Aux>>;

    /// Rebuild a value from its field elements and auxiliary payload
    fn from_fields(&self, fields: &[Fp], aux: &[Aux]) -> Result<Self::Value>;

    /// Hash preimage of a value
    fn to_input(&self, value: &Self::Value) -> Result<HashInput> {
        self.to_fields(value).map(HashInput::from_fields)
    }

    /// JSON representation of a value
    fn to_json(&self, value: &Self::Value) -> Result<serde_json::Value>;

    /// Parse the JSON representation of a value
    fn from_json(&self, json: &serde_json::Value) -> Result<Self::Value>;

    /// Validity check of a value
    ///
    /// The built-in terminals can't hold invalid values, so they validate
    /// their field elements in `from_fields` and accept every value here.
    fn check(&self, value: &Self::Value) -> Result<()>;

    /// Default value of the type
    fn empty(&self) -> Self::Value;

    /// Check if the codec never produces auxiliary data
    fn is_pure(&self) -> bool {
        false
    }
}

/// Fail with a decode error unless exactly `len` field elements are provided
pub(crate) fn expect_fields(fields: &[Fp], len: usize) -> Result<()> {
    if fields.len() != len {
        return Err(Error::decode(
            "",
            format!("expected {} field elements, got {}", len, fields.len()),
        ));
    }

    Ok(())
}

/// Allocate a prover-supplied value in the constraint system
///
/// The value is computed by `compute`, its field elements are appended as
/// witnesses and the value is rebuilt from them. In checked mode the validity
/// check of the codec is enforced on the rebuilt value.
pub fn witness<P, C, F>(cs: &mut C, provable: &P, compute: F) -> Result<P::Value>
where
    P: Provable + ?Sized,
    C: Composer + ?Sized,
    F: FnOnce() -> P::Value,
{
    let value = compute();

    let aux = provable.to_auxiliary(Some(&value))?;
    let fields: Vec<Fp> = provable
        .to_fields(&value)?
        .into_iter()
        .map(|x| cs.append_witness(x))
        .collect();

    let value = provable.from_fields(&fields, &aux)?;

    if cs.is_checked() {
        provable.check(&value)?;
    }

    Ok(value)
}

/// Select `a` if `condition` holds, `b` otherwise
///
/// Field elements are selected one by one through the composer; the auxiliary
/// payload is taken from the selected branch.
pub fn select<P, C>(
    cs: &mut C,
    provable: &P,
    condition: bool,
    a: &P::Value,
    b: &P::Value,
) -> Result<P::Value>
where
    P: Provable + ?Sized,
    C: Composer + ?Sized,
{
    let fa = provable.to_fields(a)?;
    let fb = provable.to_fields(b)?;

    let fields: Vec<Fp> = fa
        .into_iter()
        .zip(fb)
        .map(|(x, y)| cs.select(condition, x, y))
        .collect();

    let aux = provable.to_auxiliary(Some(if condition { a } else { b }))?;

    provable.from_fields(&fields, &aux)
}
