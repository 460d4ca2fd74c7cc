//! Codecs driven by type descriptions.
//!
//! A [`TypeDesc`] is a closed description of a value shape. [`Codec`] checks
//! and canonicalizes it once, at construction, and then implements every
//! [`Provable`] operation by matching the description exhaustively.
//!
//! Record ordering is fixed by the canonicalization: the outermost record
//! keeps its declared order while every record nested below it is sorted by
//! key. All the operations iterate the stored order.
//!
//! The purity of a codec is a type parameter. A `Codec<Pure>` is rejected at
//! construction if any part of its description carries auxiliary data, and
//! decodes from field elements alone.

mod schema;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashSet};
use std::{fmt, iter};
use std::marker::PhantomData;
use std::sync::Arc;

use num_bigint::BigInt;
use serde_json::Value as Json;

use crate::field::Fp;
use crate::{
    Aux, BoolType, Dynamic, Error, FieldType, HashInput, Provable, Result, UInt32Type,
    UInt64Type, Value,
};

/// Maximum number of nodes of the description tree of a [`Codec`]
pub const MAX_NODES: usize = 1 << 24;

/// Path segment of a part of a composite description
#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Index(usize),
    Key(&'a str),
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "[{}]", i),
            Segment::Key(k) => f.write_str(k),
        }
    }
}

/// Shared dynamic codec used as a terminal of a type description
pub type CustomType = Arc<dyn Provable<Value = Value> + Send + Sync>;

/// Primitive values carried as auxiliary data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Floating point number
    Number,
    /// Text
    Text,
    /// Native boolean
    Boolean,
    /// Arbitrary precision integer
    BigInt,
    /// Unit; carries nothing
    Unit,
}

impl Primitive {
    /// Schema name of the primitive
    pub const fn name(&self) -> &'static str {
        match self {
            Primitive::Number => "number",
            Primitive::Text => "string",
            Primitive::Boolean => "boolean",
            Primitive::BigInt => "bigint",
            Primitive::Unit => "null",
        }
    }

    /// Default value of the primitive
    pub fn default_value(&self) -> Value {
        match self {
            Primitive::Number => Value::Number(0.0),
            Primitive::Text => Value::Text(String::new()),
            Primitive::Boolean => Value::Boolean(false),
            Primitive::BigInt => Value::BigInt(BigInt::from(0)),
            Primitive::Unit => Value::Unit,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Primitive::Number, Value::Number(_))
                | (Primitive::Text, Value::Text(_))
                | (Primitive::Boolean, Value::Boolean(_))
                | (Primitive::BigInt, Value::BigInt(_))
                | (Primitive::Unit, Value::Unit)
        )
    }

    fn expect(&self, value: &Value) -> Result<()> {
        if self.matches(value) {
            Ok(())
        } else {
            Err(Error::mismatch("", self.name()))
        }
    }
}

/// Type description of a dynamic value
#[derive(Debug, Clone)]
pub enum TypeDesc {
    /// Primitive carried as auxiliary data
    Primitive(Primitive),
    /// Terminal with its own codec
    Custom(CustomType),
    /// Ordered heterogeneous composition
    Tuple(Vec<TypeDesc>),
    /// Homogeneous composition of a fixed length
    Array(Box<TypeDesc>, usize),
    /// Named fields
    Record(Vec<(String, TypeDesc)>),
}

impl TypeDesc {
    /// Single field element
    pub fn field() -> Self {
        Self::custom(Dynamic(FieldType))
    }

    /// Provable boolean
    pub fn bool() -> Self {
        Self::custom(Dynamic(BoolType))
    }

    /// Provable 32-bit unsigned integer
    pub fn uint32() -> Self {
        Self::custom(Dynamic(UInt32Type))
    }

    /// Provable 64-bit unsigned integer
    pub fn uint64() -> Self {
        Self::custom(Dynamic(UInt64Type))
    }

    /// Terminal backed by a dynamic codec
    pub fn custom<P>(provable: P) -> Self
    where
        P: Provable<Value = Value> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(provable))
    }

    /// Fixed-length array of `desc`
    pub fn array(desc: TypeDesc, len: usize) -> Self {
        Self::Array(Box::new(desc), len)
    }

    /// Record of the provided `(name, desc)` pairs, in declared order
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeDesc)>,
        K: Into<String>,
    {
        Self::Record(fields.into_iter().map(|(k, d)| (k.into(), d)).collect())
    }

    /// Number of field elements of a value of this type
    ///
    /// Saturates on overflow; [`Codec::new`] rejects such descriptions.
    pub fn size_in_fields(&self) -> usize {
        match self {
            TypeDesc::Primitive(_) => 0,
            TypeDesc::Custom(p) => p.size_in_fields(),
            TypeDesc::Array(item, len) => item.size_in_fields().saturating_mul(*len),
            _ => self
                .parts()
                .map(|(_, d)| d.size_in_fields())
                .fold(0, usize::saturating_add),
        }
    }

    /// Field width and node count of the description, `None` on overflow
    fn measure(&self) -> Option<(usize, usize)> {
        match self {
            TypeDesc::Primitive(_) => Some((0, 1)),
            TypeDesc::Custom(p) => Some((p.size_in_fields(), 1)),
            TypeDesc::Array(item, len) => {
                let (size, nodes) = item.measure()?;

                Some((size.checked_mul(*len)?, nodes.checked_mul(*len)?.checked_add(1)?))
            }
            _ => self.parts().try_fold((0usize, 1usize), |(size, nodes), (_, d)| {
                let (s, n) = d.measure()?;

                Some((size.checked_add(s)?, nodes.checked_add(n)?))
            }),
        }
    }

    /// Parts of a composite description with their path segments
    fn parts(&self) -> Box<dyn Iterator<Item = (Segment<'_>, &TypeDesc)> + '_> {
        match self {
            TypeDesc::Primitive(_) | TypeDesc::Custom(_) => Box::new(iter::empty()),
            TypeDesc::Tuple(items) => Box::new(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, d)| (Segment::Index(i), d)),
            ),
            TypeDesc::Array(item, len) => {
                Box::new((0..*len).map(move |i| (Segment::Index(i), item.as_ref())))
            }
            TypeDesc::Record(fields) => {
                Box::new(fields.iter().map(|(k, d)| (Segment::Key(k.as_str()), d)))
            }
        }
    }

    fn parts_len(&self) -> usize {
        match self {
            TypeDesc::Primitive(_) | TypeDesc::Custom(_) => 0,
            TypeDesc::Tuple(items) => items.len(),
            TypeDesc::Array(_, len) => *len,
            TypeDesc::Record(fields) => fields.len(),
        }
    }

    /// Split a composite value into the sub-values of its parts, in stored
    /// order
    fn split<'a>(&self, value: &'a Value) -> Result<Vec<&'a Value>> {
        match (self, value) {
            (TypeDesc::Tuple(items), Value::Tuple(values)) if items.len() == values.len() => {
                Ok(values.iter().collect())
            }
            (TypeDesc::Array(_, len), Value::Tuple(values)) if *len == values.len() => {
                Ok(values.iter().collect())
            }
            (TypeDesc::Tuple(items), _) => {
                Err(Error::mismatch("", format!("tuple of {}", items.len())))
            }
            (TypeDesc::Array(_, len), _) => Err(Error::mismatch("", format!("array of {}", len))),
            (TypeDesc::Record(fields), Value::Record(values)) => fields
                .iter()
                .map(|(k, _)| values.get(k).ok_or_else(|| Error::mismatch(k, "a value")))
                .collect(),
            (TypeDesc::Record(_), _) => Err(Error::mismatch("", "record")),
            (TypeDesc::Primitive(_), _) | (TypeDesc::Custom(_), _) => Ok(vec![]),
        }
    }

    /// Rebuild a composite value from the values of its parts
    fn join(&self, values: Vec<Value>) -> Value {
        match self {
            TypeDesc::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(k, _)| k.clone())
                    .zip(values)
                    .collect::<BTreeMap<_, _>>(),
            ),
            _ => Value::Tuple(values),
        }
    }

    fn canonicalize(self, outermost: bool) -> Result<Self> {
        match self {
            TypeDesc::Primitive(_) | TypeDesc::Custom(_) => Ok(self),
            TypeDesc::Tuple(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, d)| d.canonicalize(false).map_err(|e| e.within(&format!("[{}]", i))))
                .collect::<Result<Vec<_>>>()
                .map(TypeDesc::Tuple),
            TypeDesc::Array(item, len) => item
                .canonicalize(false)
                .map(|d| TypeDesc::Array(Box::new(d), len))
                .map_err(|e| e.within("[]")),
            TypeDesc::Record(fields) => {
                let mut seen = HashSet::with_capacity(fields.len());

                if let Some((k, _)) = fields.iter().find(|(k, _)| !seen.insert(k.clone())) {
                    return Err(Error::unsupported(k, "duplicate record key"));
                }

                let mut fields = fields
                    .into_iter()
                    .map(|(k, d)| match d.canonicalize(false) {
                        Ok(d) => Ok((k, d)),
                        Err(e) => Err(e.within(&k)),
                    })
                    .collect::<Result<Vec<_>>>()?;

                if !outermost {
                    fields.sort_by(|(a, _), (b, _)| a.cmp(b));
                }

                Ok(TypeDesc::Record(fields))
            }
        }
    }

    fn ensure_pure(&self) -> Result<()> {
        match self {
            TypeDesc::Primitive(Primitive::Unit) => Ok(()),
            TypeDesc::Primitive(p) => Err(Error::unsupported(
                "",
                format!("`{}` carries auxiliary data", p.name()),
            )),
            TypeDesc::Custom(p) if p.is_pure() => Ok(()),
            TypeDesc::Custom(p) => Err(Error::unsupported(
                "",
                format!("custom codec {:?} carries auxiliary data", p),
            )),
            TypeDesc::Array(item, _) => item.ensure_pure().map_err(|e| e.within("[]")),
            _ => self
                .parts()
                .try_for_each(|(s, d)| d.ensure_pure().map_err(|e| e.within(&s.to_string()))),
        }
    }

    fn to_fields(&self, value: &Value, out: &mut Vec<Fp>) -> Result<()> {
        match self {
            TypeDesc::Primitive(p) => p.expect(value),
            TypeDesc::Custom(p) => {
                out.extend(p.to_fields(value)?);
                Ok(())
            }
            _ => self
                .parts()
                .zip(self.split(value)?)
                .try_for_each(|((s, d), v)| {
                    d.to_fields(v, out).map_err(|e| e.within(&s.to_string()))
                }),
        }
    }

    fn to_auxiliary(&self, value: Option<&Value>) -> Result<Vec<Aux>> {
        match self {
            TypeDesc::Primitive(Primitive::Unit) => {
                value.map(|v| Primitive::Unit.expect(v)).transpose()?;
                Ok(vec![])
            }
            TypeDesc::Primitive(p) => match value {
                Some(v) => p.expect(v).map(|_| vec![Aux::Leaf(v.clone())]),
                None => Ok(vec![Aux::Leaf(p.default_value())]),
            },
            TypeDesc::Custom(p) => p.to_auxiliary(value),
            _ => {
                let values = match value {
                    Some(v) => self.split(v)?.into_iter().map(Some).collect(),
                    None => vec![None; self.parts_len()],
                };

                self.parts()
                    .zip(values)
                    .map(|((s, d), v)| {
                        d.to_auxiliary(v)
                            .map(Aux::Node)
                            .map_err(|e| e.within(&s.to_string()))
                    })
                    .collect()
            }
        }
    }

    fn from_fields(&self, fields: &[Fp], aux: &[Aux], strict: bool) -> Result<Value> {
        crate::provable::expect_fields(fields, self.size_in_fields())?;

        match self {
            TypeDesc::Primitive(Primitive::Unit) => Ok(Value::Unit),
            TypeDesc::Primitive(p) => match aux.first() {
                Some(Aux::Leaf(v)) if p.matches(v) => Ok(v.clone()),
                Some(_) => Err(Error::decode(
                    "",
                    format!("expected a `{}` auxiliary slot", p.name()),
                )),
                None => Err(Error::decode("", "missing auxiliary slot")),
            },
            TypeDesc::Custom(p) => p.from_fields(fields, aux),
            _ => {
                let mut offset = 0;
                let mut values = Vec::with_capacity(self.parts_len());

                for (i, (s, d)) in self.parts().enumerate() {
                    let len = d.size_in_fields();
                    let sub = &fields[offset..offset + len];

                    let children = match aux.get(i) {
                        Some(Aux::Node(children)) => children.as_slice(),
                        None if !strict => &[],
                        Some(Aux::Leaf(_)) => {
                            return Err(Error::decode(s, "expected a composite auxiliary slot"))
                        }
                        None => return Err(Error::decode(s, "missing auxiliary slot")),
                    };

                    values.push(
                        d.from_fields(sub, children, strict)
                            .map_err(|e| e.within(&s.to_string()))?,
                    );

                    offset += len;
                }

                Ok(self.join(values))
            }
        }
    }

    fn to_input(&self, value: &Value) -> Result<HashInput> {
        match self {
            TypeDesc::Primitive(p) => p.expect(value).map(|_| HashInput::empty()),
            TypeDesc::Custom(p) => p.to_input(value),
            _ => self
                .parts()
                .zip(self.split(value)?)
                .try_fold(HashInput::empty(), |acc, ((s, d), v)| {
                    d.to_input(v)
                        .map(|input| acc.append(input))
                        .map_err(|e| e.within(&s.to_string()))
                }),
        }
    }

    fn to_json(&self, value: &Value) -> Result<Json> {
        match (self, value) {
            (TypeDesc::Primitive(Primitive::Number), Value::Number(n)) => {
                serde_json::Number::from_f64(*n)
                    .map(Json::Number)
                    .ok_or_else(|| Error::validity("", "non-finite numbers have no JSON form"))
            }
            (TypeDesc::Primitive(Primitive::Text), Value::Text(s)) => Ok(Json::String(s.clone())),
            (TypeDesc::Primitive(Primitive::Boolean), Value::Boolean(b)) => Ok(Json::Bool(*b)),
            (TypeDesc::Primitive(Primitive::BigInt), Value::BigInt(n)) => {
                Ok(Json::String(n.to_string()))
            }
            (TypeDesc::Primitive(Primitive::Unit), Value::Unit) => Ok(Json::Null),
            (TypeDesc::Primitive(p), _) => Err(Error::mismatch("", p.name())),
            (TypeDesc::Custom(p), _) => p.to_json(value),
            (TypeDesc::Record(_), _) => self
                .parts()
                .zip(self.split(value)?)
                .map(|((s, d), v)| {
                    let key = s.to_string();

                    match d.to_json(v) {
                        Ok(json) => Ok((key, json)),
                        Err(e) => Err(e.within(&key)),
                    }
                })
                .collect::<Result<serde_json::Map<_, _>>>()
                .map(Json::Object),
            _ => self
                .parts()
                .zip(self.split(value)?)
                .map(|((s, d), v)| d.to_json(v).map_err(|e| e.within(&s.to_string())))
                .collect::<Result<Vec<_>>>()
                .map(Json::Array),
        }
    }

    fn from_json(&self, json: &Json) -> Result<Value> {
        match self {
            TypeDesc::Primitive(p) => primitive_from_json(*p, json),
            TypeDesc::Custom(p) => p.from_json(json),
            TypeDesc::Tuple(_) | TypeDesc::Array(_, _) => {
                let len = self.parts_len();
                let items = json
                    .as_array()
                    .filter(|items| items.len() == len)
                    .ok_or_else(|| Error::decode("", format!("expected an array of {}", len)))?;

                self.parts()
                    .zip(items)
                    .map(|((s, d), j)| d.from_json(j).map_err(|e| e.within(&s.to_string())))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Tuple)
            }
            TypeDesc::Record(fields) => {
                let object = json
                    .as_object()
                    .ok_or_else(|| Error::decode("", "expected an object"))?;

                fields
                    .iter()
                    .map(|(k, d)| {
                        let j = object
                            .get(k)
                            .ok_or_else(|| Error::decode(k, "missing field"))?;

                        d.from_json(j).map(|v| (k.clone(), v)).map_err(|e| e.within(k))
                    })
                    .collect::<Result<BTreeMap<_, _>>>()
                    .map(Value::Record)
            }
        }
    }

    fn check(&self, value: &Value) -> Result<()> {
        match self {
            TypeDesc::Primitive(_) => Ok(()),
            TypeDesc::Custom(p) => p.check(value),
            _ => self
                .parts()
                .zip(self.split(value)?)
                .try_for_each(|((s, d), v)| d.check(v).map_err(|e| e.within(&s.to_string()))),
        }
    }

    fn empty(&self) -> Value {
        match self {
            TypeDesc::Primitive(p) => p.default_value(),
            TypeDesc::Custom(p) => p.empty(),
            _ => self.join(self.parts().map(|(_, d)| d.empty()).collect()),
        }
    }
}

fn primitive_from_json(p: Primitive, json: &Json) -> Result<Value> {
    let value = match (p, json) {
        (Primitive::Number, Json::Number(n)) => n.as_f64().map(Value::Number),
        (Primitive::Text, Json::String(s)) => Some(Value::Text(s.clone())),
        (Primitive::Boolean, Json::Bool(b)) => Some(Value::Boolean(*b)),
        (Primitive::BigInt, Json::String(s)) => s.parse().ok().map(Value::BigInt),
        (Primitive::Unit, Json::Null) => Some(Value::Unit),
        _ => None,
    };

    value.ok_or_else(|| Error::decode("", format!("expected a `{}`, got `{}`", p.name(), json)))
}

/// Purity of a [`Codec`]
pub trait Purity: fmt::Debug + Clone + Copy + Default + Send + Sync + 'static {
    /// Check if auxiliary data is forbidden
    const PURE: bool;
}

/// Codecs whose values live in field elements only
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pure;

impl Purity for Pure {
    const PURE: bool = true;
}

/// Codecs carrying auxiliary data
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Extended;

impl Purity for Extended {
    const PURE: bool = false;
}

/// Codec of a canonicalized type description
#[derive(Debug, Clone)]
pub struct Codec<M: Purity = Extended> {
    desc: TypeDesc,
    size: usize,
    _mode: PhantomData<M>,
}

impl<M: Purity> Codec<M> {
    /// Check and canonicalize a type description
    pub fn new(desc: TypeDesc) -> Result<Self> {
        let desc = desc.canonicalize(true)?;

        if M::PURE {
            desc.ensure_pure()?;
        }

        let (size, nodes) = desc
            .measure()
            .ok_or_else(|| Error::unsupported("", "size overflows"))?;

        if nodes > MAX_NODES {
            return Err(Error::unsupported(
                "",
                format!("{} nodes exceed the limit of {}", nodes, MAX_NODES),
            ));
        }

        tracing::debug!("codec constructed with {} field elements, pure: {}", size, M::PURE);

        Ok(Self {
            desc,
            size,
            _mode: PhantomData,
        })
    }

    /// Codec of a JSON schema
    pub fn from_schema(schema: &Json) -> Result<Self> {
        TypeDesc::from_schema(schema).and_then(Self::new)
    }

    /// Canonical description of the codec
    pub const fn desc(&self) -> &TypeDesc {
        &self.desc
    }

    /// Shared handle of the codec, to nest it in another description
    pub fn into_desc(self) -> TypeDesc {
        TypeDesc::custom(self)
    }
}

impl Codec<Pure> {
    /// Rebuild a value from its field elements alone
    pub fn from_fields_pure(&self, fields: &[Fp]) -> Result<Value> {
        self.desc.from_fields(fields, &[], false)
    }
}

impl<M: Purity> Provable for Codec<M> {
    type Value = Value;

    fn size_in_fields(&self) -> usize {
        self.size
    }

    fn to_fields(&self, value: &Value) -> Result<Vec<Fp>> {
        let mut fields = Vec::with_capacity(self.size);

        self.desc.to_fields(value, &mut fields)?;

        Ok(fields)
    }

    fn to_auxiliary(&self, value: Option<&Value>) -> Result<Vec<Aux>> {
        if M::PURE {
            return Ok(vec![]);
        }

        self.desc.to_auxiliary(value)
    }

    fn from_fields(&self, fields: &[Fp], aux: &[Aux]) -> Result<Value> {
        self.desc.from_fields(fields, aux, !M::PURE)
    }

    fn to_input(&self, value: &Value) -> Result<HashInput> {
        self.desc.to_input(value)
    }

    fn to_json(&self, value: &Value) -> Result<Json> {
        self.desc.to_json(value)
    }

    fn from_json(&self, json: &Json) -> Result<Value> {
        self.desc.from_json(json)
    }

    fn check(&self, value: &Value) -> Result<()> {
        self.desc.check(value)
    }

    fn empty(&self) -> Value {
        self.desc.empty()
    }

    fn is_pure(&self) -> bool {
        M::PURE
    }
}
