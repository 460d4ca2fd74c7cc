//! Field element boundary.
//!
//! The arithmetic backend is the BLS12-381 scalar field. Everything above this
//! module only relies on `+`, `*`, equality and the canonical decimal text
//! representation provided here.

use std::sync::OnceLock;

use dusk_bytes::Serializable;
use num_bigint::BigUint;

use crate::{Error, Result};

pub use dusk_bls12_381::BlsScalar as Fp;

/// Serialized length of a field element
pub const LEN: usize = 32;

/// Maximum number of bytes of a hash prefix so it fits a single field element
pub const PREFIX_MAX_LEN: usize = LEN - 1;

/// Number of bits that can be packed in a single field element without
/// reduction.
pub const CAPACITY_BITS: u32 = 254;

/// Field modulus as an unsigned big integer.
pub fn modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();

    MODULUS.get_or_init(|| to_biguint(&-Fp::one()) + 1u32)
}

/// Canonical integer representative of a field element.
pub fn to_biguint(x: &Fp) -> BigUint {
    BigUint::from_bytes_le(&x.to_bytes())
}

/// Field element of a canonical integer; `None` if it isn't smaller than the
/// modulus.
pub fn from_biguint(n: &BigUint) -> Option<Fp> {
    if n >= modulus() {
        return None;
    }

    let digits = n.to_bytes_le();
    let mut bytes = [0u8; LEN];

    bytes[..digits.len()].copy_from_slice(&digits);

    <Fp as Serializable<LEN>>::from_bytes(&bytes).ok()
}

/// Canonical decimal text of a field element.
pub fn to_decimal(x: &Fp) -> String {
    to_biguint(x).to_str_radix(10)
}

/// Parse the canonical decimal text of a field element.
pub fn from_decimal(s: &str) -> Result<Fp> {
    let n: BigUint = s
        .parse()
        .map_err(|e| Error::decode("", format!("invalid decimal `{}`: {}", s, e)))?;

    from_biguint(&n)
        .ok_or_else(|| Error::decode("", format!("`{}` exceeds the field modulus", s)))
}

/// Small integer value of a field element, if it fits 64 bits.
pub fn to_u64(x: &Fp) -> Option<u64> {
    let bytes = x.to_bytes();

    if bytes[8..].iter().any(|b| *b != 0) {
        return None;
    }

    let mut word = [0u8; 8];

    word.copy_from_slice(&bytes[..8]);

    Some(u64::from_le_bytes(word))
}

/// `2^bits` as a field element.
pub fn pow2(bits: u32) -> Fp {
    Fp::from(2u64).pow(&[u64::from(bits), 0, 0, 0])
}

/// Convert a domain separation prefix into a field element.
///
/// The bytes of the prefix are read as a little-endian integer, padded with
/// zeroes to the field length.
pub fn prefix_to_field(prefix: &str) -> Result<Fp> {
    let bytes = prefix.as_bytes();

    if bytes.len() > PREFIX_MAX_LEN {
        return Err(Error::PrefixTooLong {
            len: bytes.len(),
            max: PREFIX_MAX_LEN,
        });
    }

    let mut buf = [0u8; LEN];

    buf[..bytes.len()].copy_from_slice(bytes);

    <Fp as Serializable<LEN>>::from_bytes(&buf).map_err(|_| Error::PrefixTooLong {
        len: bytes.len(),
        max: PREFIX_MAX_LEN,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_roundtrip() {
        for x in [Fp::zero(), Fp::one(), Fp::from(5u64), -Fp::one()] {
            let s = to_decimal(&x);
            let y = from_decimal(&s).expect("failed to parse decimal");

            assert_eq!(x, y);
        }

        assert_eq!(to_decimal(&Fp::from(1234u64)), "1234");
    }

    #[test]
    fn decimal_rejects_out_of_range() {
        let m = modulus().to_str_radix(10);

        from_decimal(&m).expect_err("modulus isn't a canonical element");
        from_decimal("-1").expect_err("negative text isn't canonical");
        from_decimal("0x12").expect_err("hex isn't decimal");
    }

    #[test]
    fn small_integers() {
        assert_eq!(to_u64(&Fp::from(u64::MAX)), Some(u64::MAX));
        assert_eq!(to_u64(&(Fp::from(u64::MAX) + Fp::one())), None);
        assert_eq!(pow2(10), Fp::from(1024u64));
        assert_eq!(pow2(0), Fp::one());
        assert_eq!(pow2(64), Fp::from(u64::MAX) + Fp::one());
    }

    #[test]
    fn prefixes() {
        assert_eq!(prefix_to_field("").unwrap(), Fp::zero());
        assert_eq!(prefix_to_field("a").unwrap(), Fp::from(b'a' as u64));

        let long = "x".repeat(PREFIX_MAX_LEN + 1);

        assert!(matches!(
            prefix_to_field(&long),
            Err(Error::PrefixTooLong { .. })
        ));
    }
}
