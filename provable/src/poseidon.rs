//! Poseidon sponge over [`Fp`] with domain separation prefixes.
//!
//! The permutation follows the classic HADES layout: `NB_FULL_ROUNDS / 2`
//! full rounds, `NB_PARTIAL_ROUNDS` partial rounds and `NB_FULL_ROUNDS / 2`
//! full rounds, each adding the round constants, applying the `x^5` S-box and
//! mixing the state with a Cauchy MDS matrix.
//!
//! The sponge absorbs `RATE` elements per permutation and squeezes the first
//! state element. A prefix is absorbed as one field element before the input,
//! so hashes with distinct prefixes are domain separated.

use std::sync::OnceLock;

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use crate::field::{self, Fp};
use crate::Result;

/// Length of the Poseidon state.
pub const WIDTH: usize = 3;

/// Elements absorbed per permutation.
pub const RATE: usize = 2;

/// Number of full rounds of the permutation.
pub const NB_FULL_ROUNDS: usize = 8;

/// Number of partial rounds of the permutation.
pub const NB_PARTIAL_ROUNDS: usize = 60;

const NB_ROUNDS: usize = NB_FULL_ROUNDS + NB_PARTIAL_ROUNDS;

const ROUND_CONSTANTS_DOMAIN: &[u8] = b"zk-provable.poseidon.round-constants";

struct Parameters {
    mds: [[Fp; WIDTH]; WIDTH],
    round_constants: Vec<[Fp; WIDTH]>,
}

fn parameters() -> &'static Parameters {
    static PARAMETERS: OnceLock<Parameters> = OnceLock::new();

    PARAMETERS.get_or_init(|| Parameters {
        mds: mds(),
        round_constants: (0..NB_ROUNDS).map(round_constants).collect(),
    })
}

fn reduce(n: BigUint) -> Fp {
    let n = n % field::modulus();

    // a reduced integer is always canonical
    field::from_biguint(&n).unwrap_or_else(Fp::zero)
}

// Cauchy matrix `1 / (x_i + y_j)` with `x_i = i` and `y_j = WIDTH + j`; all
// the sums are distinct and non-zero.
fn mds() -> [[Fp; WIDTH]; WIDTH] {
    let mut mds = [[Fp::zero(); WIDTH]; WIDTH];

    for (i, row) in mds.iter_mut().enumerate() {
        for (j, m) in row.iter_mut().enumerate() {
            *m = Fp::from((i + WIDTH + j) as u64)
                .invert()
                .unwrap_or(Fp::zero());
        }
    }

    mds
}

// Round constants are derived by hashing the domain tag with the round and
// position indexes into 512 bits and reducing modulo the field order.
fn round_constants(round: usize) -> [Fp; WIDTH] {
    let mut constants = [Fp::zero(); WIDTH];

    for (i, c) in constants.iter_mut().enumerate() {
        let mut wide = Vec::with_capacity(64);

        for half in 0u8..2 {
            let digest = Sha256::new()
                .chain_update(ROUND_CONSTANTS_DOMAIN)
                .chain_update((round as u32).to_le_bytes())
                .chain_update((i as u32).to_le_bytes())
                .chain_update([half])
                .finalize();

            wide.extend_from_slice(&digest);
        }

        *c = reduce(BigUint::from_bytes_le(&wide));
    }

    constants
}

fn sbox(x: Fp) -> Fp {
    let x2 = x * x;
    let x4 = x2 * x2;

    x4 * x
}

fn mix(mds: &[[Fp; WIDTH]; WIDTH], state: &mut [Fp; WIDTH]) {
    let mut out = [Fp::zero(); WIDTH];

    for (o, row) in out.iter_mut().zip(mds.iter()) {
        *o = row
            .iter()
            .zip(state.iter())
            .fold(Fp::zero(), |acc, (m, s)| acc + *m * *s);
    }

    *state = out;
}

/// Apply the Poseidon permutation to a state.
pub fn permutation(state: &mut [Fp; WIDTH]) {
    let Parameters {
        mds,
        round_constants,
    } = parameters();

    let half = NB_FULL_ROUNDS / 2;

    for (round, constants) in round_constants.iter().enumerate() {
        state
            .iter_mut()
            .zip(constants.iter())
            .for_each(|(s, c)| *s += *c);

        let full = round < half || round >= half + NB_PARTIAL_ROUNDS;

        if full {
            state.iter_mut().for_each(|s| *s = sbox(*s));
        } else {
            state[0] = sbox(state[0]);
        }

        mix(mds, state);
    }
}

/// Sponge state of the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sponge {
    state: [Fp; WIDTH],
}

impl Default for Sponge {
    fn default() -> Self {
        Self {
            state: [Fp::zero(); WIDTH],
        }
    }
}

impl Sponge {
    /// Sponge with the prefix already absorbed.
    pub fn salted(prefix: &str) -> Result<Self> {
        let prefix = field::prefix_to_field(prefix)?;
        let mut sponge = Self::default();

        sponge.update(&[prefix]);

        Ok(sponge)
    }

    /// Absorb the input, `RATE` elements per permutation.
    ///
    /// An empty input still applies one permutation.
    pub fn update(&mut self, input: &[Fp]) {
        if input.is_empty() {
            permutation(&mut self.state);
            return;
        }

        for chunk in input.chunks(RATE) {
            self.state
                .iter_mut()
                .zip(chunk.iter())
                .for_each(|(s, x)| *s += *x);

            permutation(&mut self.state);
        }
    }

    /// Current digest.
    pub const fn squeeze(&self) -> Fp {
        self.state[0]
    }
}

/// Hash a list of field elements without domain separation.
pub fn hash(input: &[Fp]) -> Fp {
    let mut sponge = Sponge::default();

    sponge.update(input);
    sponge.squeeze()
}

/// Hash a list of field elements under a domain separation prefix.
///
/// Fails if the prefix doesn't fit a field element.
pub fn hash_with_prefix(prefix: &str, input: &[Fp]) -> Result<Fp> {
    let mut sponge = Sponge::salted(prefix)?;

    sponge.update(input);

    Ok(sponge.squeeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mds_is_inverted_cauchy() {
        let mds = mds();

        for (i, row) in mds.iter().enumerate() {
            for (j, m) in row.iter().enumerate() {
                assert_eq!(*m * Fp::from((i + WIDTH + j) as u64), Fp::one());
            }
        }
    }

    #[test]
    fn hash_is_deterministic() {
        let input = [Fp::from(1u64), Fp::from(2u64), Fp::from(3u64)];

        assert_eq!(hash(&input), hash(&input));
        assert_ne!(hash(&input), hash(&input[..2]));
        assert_ne!(hash(&[]), Fp::zero());
    }

    #[test]
    fn prefixes_separate_domains() {
        let input = [Fp::from(7u64)];

        let a = hash_with_prefix("list-a", &input).expect("valid prefix");
        let b = hash_with_prefix("list-b", &input).expect("valid prefix");

        assert_ne!(a, b);
        assert_ne!(a, hash(&input));

        hash_with_prefix(&"p".repeat(40), &input).expect_err("prefix too long");
    }

    #[test]
    fn salted_sponge_matches_hash_with_prefix() {
        let input = [Fp::from(11u64), Fp::from(13u64)];
        let mut sponge = Sponge::salted("test").expect("valid prefix");

        sponge.update(&input);

        assert_eq!(
            sponge.squeeze(),
            hash_with_prefix("test", &input).expect("valid prefix")
        );
    }
}
