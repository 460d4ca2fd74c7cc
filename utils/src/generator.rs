use dusk_bytes::Serializable;
use num_bigint::BigInt;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use zk_provable::field::LEN;
use zk_provable::{Fp, Primitive, TypeDesc, Value};

/// Seeded generator of type descriptions and matching values
pub struct ValueGenerator {
    rng: StdRng,
    depth: usize,
    max_len: usize,
    key_index: usize,
}

impl ValueGenerator {
    /// Generator of nested descriptions up to depth 3
    pub fn new(seed: u64) -> Self {
        let rng = StdRng::seed_from_u64(seed);

        Self {
            rng,
            depth: 3,
            max_len: 4,
            key_index: 0,
        }
    }

    /// Set the maximum nesting of the generated descriptions
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set the maximum number of parts of a generated composite
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn gen_field(&mut self) -> Fp {
        let mut bytes = [0u8; LEN];

        self.fill_bytes(&mut bytes);

        // 254 bits are always below the modulus
        bytes[LEN - 1] &= 0x3f;

        Fp::from_bytes(&bytes).expect("masked bytes are canonical")
    }

    pub fn gen_fields(&mut self, n: usize) -> Vec<Fp> {
        (0..n).map(|_| self.gen_field()).collect()
    }

    pub fn gen_flag(&mut self) -> bool {
        self.gen()
    }

    pub fn gen_text(&mut self) -> String {
        let n = self.gen_range(0..16);

        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(n)
            .map(char::from)
            .collect()
    }

    fn gen_key(&mut self) -> String {
        let key = format!("{}-{}", self.gen_text(), self.key_index);

        self.key_index += 1;

        key
    }

    pub fn gen_primitive(&mut self) -> Primitive {
        match self.gen_range(0..5) {
            0 => Primitive::Number,
            1 => Primitive::Text,
            2 => Primitive::Boolean,
            3 => Primitive::BigInt,
            _ => Primitive::Unit,
        }
    }

    pub fn gen_desc(&mut self) -> TypeDesc {
        let depth = self.depth;

        self.gen_desc_with_depth(depth)
    }

    pub fn gen_pure_desc(&mut self) -> TypeDesc {
        let depth = self.depth;

        self.gen_pure_desc_with_depth(depth)
    }

    fn gen_terminal(&mut self) -> TypeDesc {
        match self.gen_range(0..4) {
            0 => TypeDesc::field(),
            1 => TypeDesc::bool(),
            2 => TypeDesc::uint32(),
            _ => TypeDesc::uint64(),
        }
    }

    fn gen_desc_with_depth(&mut self, depth: usize) -> TypeDesc {
        let variants = if depth == 0 { 2 } else { 5 };

        match self.gen_range(0..variants) {
            0 => TypeDesc::Primitive(self.gen_primitive()),
            1 => self.gen_terminal(),
            2 => {
                let n = self.gen_range(0..=self.max_len);

                TypeDesc::Tuple((0..n).map(|_| self.gen_desc_with_depth(depth - 1)).collect())
            }
            3 => {
                let n = self.gen_range(0..=self.max_len);

                TypeDesc::array(self.gen_desc_with_depth(depth - 1), n)
            }
            _ => {
                let n = self.gen_range(0..=self.max_len);

                TypeDesc::Record(
                    (0..n)
                        .map(|_| (self.gen_key(), self.gen_desc_with_depth(depth - 1)))
                        .collect(),
                )
            }
        }
    }

    fn gen_pure_desc_with_depth(&mut self, depth: usize) -> TypeDesc {
        let variants = if depth == 0 { 1 } else { 4 };

        match self.gen_range(0..variants) {
            0 => self.gen_terminal(),
            1 => {
                let n = self.gen_range(0..=self.max_len);

                TypeDesc::Tuple(
                    (0..n)
                        .map(|_| self.gen_pure_desc_with_depth(depth - 1))
                        .collect(),
                )
            }
            2 => {
                let n = self.gen_range(0..=self.max_len);

                TypeDesc::array(self.gen_pure_desc_with_depth(depth - 1), n)
            }
            _ => {
                let n = self.gen_range(0..=self.max_len);

                TypeDesc::Record(
                    (0..n)
                        .map(|_| (self.gen_key(), self.gen_pure_desc_with_depth(depth - 1)))
                        .collect(),
                )
            }
        }
    }

    pub fn gen_value(&mut self, desc: &TypeDesc) -> Value {
        match desc {
            TypeDesc::Primitive(Primitive::Number) => {
                Value::Number(self.gen_range(-1_000_000i32..1_000_000) as f64 / 4.0)
            }
            TypeDesc::Primitive(Primitive::Text) => Value::Text(self.gen_text()),
            TypeDesc::Primitive(Primitive::Boolean) => Value::Boolean(self.gen()),
            TypeDesc::Primitive(Primitive::BigInt) => {
                let n: i128 = self.gen();

                Value::BigInt(BigInt::from(n))
            }
            TypeDesc::Primitive(Primitive::Unit) => Value::Unit,
            TypeDesc::Custom(p) => match p.empty() {
                Value::Field(_) => Value::Field(self.gen_field()),
                Value::Bool(_) => Value::Bool(self.gen()),
                Value::UInt32(_) => Value::UInt32(self.gen()),
                Value::UInt64(_) => Value::UInt64(self.gen()),
                v => v,
            },
            TypeDesc::Tuple(items) => {
                Value::Tuple(items.iter().map(|d| self.gen_value(d)).collect())
            }
            TypeDesc::Array(item, n) => {
                Value::Tuple((0..*n).map(|_| self.gen_value(item)).collect())
            }
            TypeDesc::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(k, d)| (k.clone(), self.gen_value(d)))
                    .collect(),
            ),
        }
    }
}

impl RngCore for ValueGenerator {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[test]
fn generator_is_rng() {
    let mut generator = ValueGenerator::new(0x348);

    let mut bytes = vec![0xfa; 32];

    generator
        .try_fill_bytes(&mut bytes)
        .expect("failed to fill bytes");
}

#[test]
fn generation_is_deterministic() {
    let mut a = ValueGenerator::new(0x348);
    let mut b = ValueGenerator::new(0x348);

    for _ in 0..10 {
        let desc_a = a.gen_desc();
        let desc_b = b.gen_desc();

        assert_eq!(format!("{:?}", desc_a), format!("{:?}", desc_b));
        assert_eq!(a.gen_value(&desc_a), b.gen_value(&desc_b));
    }
}

#[test]
fn pure_descriptions_have_no_primitives() {
    fn has_primitive(desc: &TypeDesc) -> bool {
        match desc {
            TypeDesc::Primitive(_) => true,
            TypeDesc::Custom(_) => false,
            TypeDesc::Tuple(items) => items.iter().any(has_primitive),
            TypeDesc::Array(item, _) => has_primitive(item),
            TypeDesc::Record(fields) => fields.iter().any(|(_, d)| has_primitive(d)),
        }
    }

    let mut generator = ValueGenerator::new(0x348);

    for _ in 0..50 {
        assert!(!has_primitive(&generator.gen_pure_desc()));
    }
}
