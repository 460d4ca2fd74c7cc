use serde_json::Value as Json;

use super::{expect_fields, Provable};
use crate::field::{self, Fp};
use crate::{Aux, Error, HashInput, Result, Value};

/// A single field element
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldType;

impl Provable for FieldType {
    type Value = Fp;

    fn size_in_fields(&self) -> usize {
        1
    }

    fn to_fields(&self, value: &Fp) -> Result<Vec<Fp>> {
        Ok(vec![*value])
    }

    fn to_auxiliary(&self, _value: Option<&Fp>) -> Result<Vec<Aux>> {
        Ok(vec![])
    }

    fn from_fields(&self, fields: &[Fp], _aux: &[Aux]) -> Result<Fp> {
        expect_fields(fields, 1)?;

        Ok(fields[0])
    }

    fn to_json(&self, value: &Fp) -> Result<Json> {
        Ok(Json::String(field::to_decimal(value)))
    }

    fn from_json(&self, json: &Json) -> Result<Fp> {
        json.as_str()
            .ok_or_else(|| Error::decode("", "expected a decimal string"))
            .and_then(field::from_decimal)
    }

    fn check(&self, _value: &Fp) -> Result<()> {
        Ok(())
    }

    fn empty(&self) -> Fp {
        Fp::zero()
    }

    fn is_pure(&self) -> bool {
        true
    }
}

/// A boolean constrained to the field elements `0` and `1`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoolType;

impl Provable for BoolType {
    type Value = bool;

    fn size_in_fields(&self) -> usize {
        1
    }

    fn to_fields(&self, value: &bool) -> Result<Vec<Fp>> {
        Ok(vec![Fp::from(*value as u64)])
    }

    fn to_auxiliary(&self, _value: Option<&bool>) -> Result<Vec<Aux>> {
        Ok(vec![])
    }

    fn from_fields(&self, fields: &[Fp], _aux: &[Aux]) -> Result<bool> {
        expect_fields(fields, 1)?;

        match field::to_u64(&fields[0]) {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(Error::validity("", "field element is neither 0 nor 1")),
        }
    }

    fn to_input(&self, value: &bool) -> Result<HashInput> {
        Ok(HashInput::packed(Fp::from(*value as u64), 1))
    }

    fn to_json(&self, value: &bool) -> Result<Json> {
        Ok(Json::Bool(*value))
    }

    fn from_json(&self, json: &Json) -> Result<bool> {
        json.as_bool()
            .ok_or_else(|| Error::decode("", "expected a boolean"))
    }

    fn check(&self, _value: &bool) -> Result<()> {
        Ok(())
    }

    fn empty(&self) -> bool {
        false
    }

    fn is_pure(&self) -> bool {
        true
    }
}

macro_rules! uint_type {
    ($name:ident, $ty:ty, $bits:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl Provable for $name {
            type Value = $ty;

            fn size_in_fields(&self) -> usize {
                1
            }

            fn to_fields(&self, value: &$ty) -> Result<Vec<Fp>> {
                Ok(vec![Fp::from(*value as u64)])
            }

            fn to_auxiliary(&self, _value: Option<&$ty>) -> Result<Vec<Aux>> {
                Ok(vec![])
            }

            fn from_fields(&self, fields: &[Fp], _aux: &[Aux]) -> Result<$ty> {
                expect_fields(fields, 1)?;

                field::to_u64(&fields[0])
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .ok_or_else(|| {
                        Error::validity("", concat!("field element exceeds ", $bits, " bits"))
                    })
            }

            fn to_input(&self, value: &$ty) -> Result<HashInput> {
                Ok(HashInput::packed(Fp::from(*value as u64), $bits))
            }

            fn to_json(&self, value: &$ty) -> Result<Json> {
                Ok(Json::String(value.to_string()))
            }

            fn from_json(&self, json: &Json) -> Result<$ty> {
                let s = json
                    .as_str()
                    .ok_or_else(|| Error::decode("", "expected a decimal string"))?;

                s.parse()
                    .map_err(|e| Error::decode("", format!("invalid integer `{}`: {}", s, e)))
            }

            fn check(&self, _value: &$ty) -> Result<()> {
                Ok(())
            }

            fn empty(&self) -> $ty {
                0
            }

            fn is_pure(&self) -> bool {
                true
            }
        }
    };
}

uint_type!(UInt32Type, u32, 32, "An unsigned integer range checked to 32 bits");
uint_type!(UInt64Type, u64, 64, "An unsigned integer range checked to 64 bits");

/// Native value that can be carried by a dynamic [`Value`]
pub trait DynamicValue: Sized {
    /// Name of the expected shape, used in error messages
    const KIND: &'static str;

    /// Wrap into a dynamic value
    fn into_value(self) -> Value;

    /// Unwrap from a dynamic value of the matching shape
    fn try_from_value(value: &Value) -> Option<Self>;
}

impl DynamicValue for Fp {
    const KIND: &'static str = "field";

    fn into_value(self) -> Value {
        Value::Field(self)
    }

    fn try_from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Field(x) => Some(*x),
            _ => None,
        }
    }
}

impl DynamicValue for bool {
    const KIND: &'static str = "bool";

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn try_from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl DynamicValue for u32 {
    const KIND: &'static str = "uint32";

    fn into_value(self) -> Value {
        Value::UInt32(self)
    }

    fn try_from_value(value: &Value) -> Option<Self> {
        match value {
            Value::UInt32(n) => Some(*n),
            _ => None,
        }
    }
}

impl DynamicValue for u64 {
    const KIND: &'static str = "uint64";

    fn into_value(self) -> Value {
        Value::UInt64(self)
    }

    fn try_from_value(value: &Value) -> Option<Self> {
        match value {
            Value::UInt64(n) => Some(*n),
            _ => None,
        }
    }
}

/// Typed codec lifted to dynamic values
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dynamic<P>(pub P);

impl<P> Dynamic<P>
where
    P: Provable,
    P::Value: DynamicValue,
{
    fn unwrap_value(value: &Value) -> Result<P::Value> {
        <P::Value as DynamicValue>::try_from_value(value)
            .ok_or_else(|| Error::mismatch("", <P::Value as DynamicValue>::KIND))
    }
}

impl<P> Provable for Dynamic<P>
where
    P: Provable,
    P::Value: DynamicValue,
{
    type Value = Value;

    fn size_in_fields(&self) -> usize {
        self.0.size_in_fields()
    }

    fn to_fields(&self, value: &Value) -> Result<Vec<Fp>> {
        self.0.to_fields(&Self::unwrap_value(value)?)
    }

    fn to_auxiliary(&self, value: Option<&Value>) -> Result<Vec<Aux>> {
        let value = value.map(Self::unwrap_value).transpose()?;

        self.0.to_auxiliary(value.as_ref())
    }

    fn from_fields(&self, fields: &[Fp], aux: &[Aux]) -> Result<Value> {
        self.0.from_fields(fields, aux).map(DynamicValue::into_value)
    }

    fn to_input(&self, value: &Value) -> Result<HashInput> {
        self.0.to_input(&Self::unwrap_value(value)?)
    }

    fn to_json(&self, value: &Value) -> Result<Json> {
        self.0.to_json(&Self::unwrap_value(value)?)
    }

    fn from_json(&self, json: &Json) -> Result<Value> {
        self.0.from_json(json).map(DynamicValue::into_value)
    }

    fn check(&self, value: &Value) -> Result<()> {
        self.0.check(&Self::unwrap_value(value)?)
    }

    fn empty(&self) -> Value {
        self.0.empty().into_value()
    }

    fn is_pure(&self) -> bool {
        self.0.is_pure()
    }
}
