use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;

use crate::field::{self, Fp};

/// Dynamic value described by a [`TypeDesc`](crate::TypeDesc)
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unit value
    Unit,
    /// Floating point number
    Number(f64),
    /// Text
    Text(String),
    /// Native boolean, carried as auxiliary data
    Boolean(bool),
    /// Arbitrary precision integer, carried as auxiliary data
    BigInt(BigInt),
    /// Field element
    Field(Fp),
    /// Provable boolean
    Bool(bool),
    /// Provable 32-bit unsigned integer
    UInt32(u32),
    /// Provable 64-bit unsigned integer
    UInt64(u64),
    /// Tuple or fixed-length array
    Tuple(Vec<Value>),
    /// Record keyed by field name
    Record(BTreeMap<String, Value>),
}

impl Value {
    /// Name of the shape of the value, used in error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::BigInt(_) => "bigint",
            Value::Field(_) => "field",
            Value::Bool(_) => "bool",
            Value::UInt32(_) => "uint32",
            Value::UInt64(_) => "uint64",
            Value::Tuple(_) => "tuple",
            Value::Record(_) => "record",
        }
    }

    /// Build a record from `(name, value)` pairs
    pub fn record<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Boolean(b) | Value::Bool(b) => write!(f, "{}", b),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::Field(x) => write!(f, "{}", field::to_decimal(x)),
            Value::UInt32(n) => write!(f, "{}", n),
            Value::UInt64(n) => write!(f, "{}", n),
            Value::Tuple(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Record(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<Fp> for Value {
    fn from(x: Fp) -> Self {
        Value::Field(x)
    }
}

/// Auxiliary payload tree
///
/// Carries the data of a value that doesn't live in field elements. Its shape
/// mirrors the type description that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Aux {
    /// Payload slot of a terminal
    Leaf(Value),
    /// Payload of a composite part
    Node(Vec<Aux>),
}

impl Aux {
    /// Children of a composite slot
    pub fn as_node(&self) -> Option<&[Aux]> {
        match self {
            Aux::Node(children) => Some(children),
            Aux::Leaf(_) => None,
        }
    }

    /// Value of a terminal slot
    pub const fn as_leaf(&self) -> Option<&Value> {
        match self {
            Aux::Leaf(v) => Some(v),
            Aux::Node(_) => None,
        }
    }
}

#[test]
fn display_is_readable() {
    let v = Value::record([
        ("a", Value::Field(Fp::from(5u64))),
        ("b", Value::Tuple(vec![Value::Bool(true), Value::BigInt(3.into())])),
    ]);

    assert_eq!(v.to_string(), "{a: 5, b: [true, 3n]}");
}
