#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

//! A value is laid out in a circuit by a [`Provable`] codec: a fixed number of
//! field elements ([`Fp`]) plus an auxiliary payload ([`Aux`]) for the data
//! that doesn't live in field elements.
//!
//! Codecs are either typed ([`FieldType`], [`BoolType`], [`UInt32Type`],
//! [`UInt64Type`], [`WithHashType`]) or driven by a dynamic [`TypeDesc`]
//! through [`Codec`].
//!
//! A [`MerkleList`] commits to a sequence with a single field element, and a
//! [`MerkleArray`] iterates a committed sequence. Both keep their elements in
//! an [`Unconstrained`] shadow array and check every element read from it
//! against the hash chain, through a [`Composer`].

mod backend;
mod codec;
mod config;
mod error;
mod hash_input;
mod merkle_array;
mod merkle_list;
mod provable;
mod unconstrained;
mod value;

pub mod field;
pub mod poseidon;

pub use backend::{Composer, Constraint, ConstraintSystem, Gate, Mode, Witness};
pub use codec::{Codec, CustomType, Extended, Primitive, Pure, Purity, TypeDesc, MAX_NODES};
pub use config::{BaseConfig, Config};
pub use error::{Error, Result};
pub use field::Fp;
pub use hash_input::HashInput;
pub use merkle_array::{MerkleArray, MerkleArrayType};
pub use merkle_list::{
    HashChain, HashFn, MerkleList, MerkleListType, NextHash, PrefixedPoseidon, WithHash,
    WithHashType,
};
pub use provable::{
    select, witness, BoolType, Dynamic, DynamicValue, FieldType, Provable, UInt32Type,
    UInt64Type,
};
pub use unconstrained::Unconstrained;
pub use value::{Aux, Value};
