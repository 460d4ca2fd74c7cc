use serde_json::{Map, Value as Json};

use crate::field::{self, Fp};
use crate::provable::expect_fields;
use crate::{Aux, Error, HashInput, Provable, Result};

const PREVIOUS_HASH: &str = "previousHash";
const ELEMENT: &str = "element";

/// Link of a hash chain: an element with the commitment of the elements
/// before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithHash<T> {
    /// Commitment the element was hashed onto
    pub previous_hash: Fp,
    /// Element of the link
    pub element: T,
}

impl<T> WithHash<T> {
    /// Create a new link
    pub const fn new(previous_hash: Fp, element: T) -> Self {
        Self {
            previous_hash,
            element,
        }
    }
}

/// Codec of a hash-chain link
///
/// Laid out as the record `{previousHash, element}`, in that order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WithHashType<P> {
    element: P,
}

impl<P> WithHashType<P> {
    /// Link codec of an element codec
    pub const fn new(element: P) -> Self {
        Self { element }
    }

    /// Codec of the element
    pub const fn element(&self) -> &P {
        &self.element
    }
}

impl<P: Provable> Provable for WithHashType<P> {
    type Value = WithHash<P::Value>;

    fn size_in_fields(&self) -> usize {
        1 + self.element.size_in_fields()
    }

    fn to_fields(&self, value: &Self::Value) -> Result<Vec<Fp>> {
        let mut fields = vec![value.previous_hash];

        fields.extend(
            self.element
                .to_fields(&value.element)
                .map_err(|e| e.within(ELEMENT))?,
        );

        Ok(fields)
    }

    fn to_auxiliary(&self, value: Option<&Self::Value>) -> Result<Vec<Aux>> {
        self.element
            .to_auxiliary(value.map(|v| &v.element))
            .map_err(|e| e.within(ELEMENT))
    }

    fn from_fields(&self, fields: &[Fp], aux: &[Aux]) -> Result<Self::Value> {
        expect_fields(fields, self.size_in_fields())?;

        let element = self
            .element
            .from_fields(&fields[1..], aux)
            .map_err(|e| e.within(ELEMENT))?;

        Ok(WithHash::new(fields[0], element))
    }

    fn to_input(&self, value: &Self::Value) -> Result<HashInput> {
        let element = self
            .element
            .to_input(&value.element)
            .map_err(|e| e.within(ELEMENT))?;

        Ok(HashInput::from_fields(vec![value.previous_hash]).append(element))
    }

    fn to_json(&self, value: &Self::Value) -> Result<Json> {
        let element = self
            .element
            .to_json(&value.element)
            .map_err(|e| e.within(ELEMENT))?;

        let mut object = Map::with_capacity(2);

        object.insert(
            PREVIOUS_HASH.into(),
            Json::String(field::to_decimal(&value.previous_hash)),
        );
        object.insert(ELEMENT.into(), element);

        Ok(Json::Object(object))
    }

    fn from_json(&self, json: &Json) -> Result<Self::Value> {
        let object = json
            .as_object()
            .ok_or_else(|| Error::decode("", "expected an object"))?;

        let previous_hash = object
            .get(PREVIOUS_HASH)
            .and_then(Json::as_str)
            .ok_or_else(|| Error::decode(PREVIOUS_HASH, "expected a decimal string"))
            .and_then(|s| field::from_decimal(s).map_err(|e| e.within(PREVIOUS_HASH)))?;

        let element = object
            .get(ELEMENT)
            .ok_or_else(|| Error::decode(ELEMENT, "missing field"))
            .and_then(|j| self.element.from_json(j).map_err(|e| e.within(ELEMENT)))?;

        Ok(WithHash::new(previous_hash, element))
    }

    fn check(&self, value: &Self::Value) -> Result<()> {
        self.element
            .check(&value.element)
            .map_err(|e| e.within(ELEMENT))
    }

    fn empty(&self) -> Self::Value {
        WithHash::new(Fp::zero(), self.element.empty())
    }

    fn is_pure(&self) -> bool {
        self.element.is_pure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoolType, FieldType};

    #[test]
    fn links_are_laid_out_as_records() {
        let ty = WithHashType::new(BoolType);
        let link = WithHash::new(Fp::from(42u64), true);

        assert_eq!(ty.size_in_fields(), 2);
        assert_eq!(
            ty.to_fields(&link).expect("failed to encode"),
            vec![Fp::from(42u64), Fp::one()]
        );
        assert_eq!(
            ty.to_json(&link).expect("failed to encode json").to_string(),
            r#"{"previousHash":"42","element":true}"#
        );

        let input = ty.to_input(&link).expect("failed to hash");

        assert_eq!(input.fields, vec![Fp::from(42u64)]);
        assert_eq!(input.packed, vec![(Fp::one(), 1)]);
    }

    #[test]
    fn element_errors_are_nested() {
        let ty = WithHashType::new(FieldType);
        let json = serde_json::json!({"previousHash": "1", "element": 3});

        match ty.from_json(&json) {
            Err(Error::Decode { path, .. }) => assert_eq!(path, "element"),
            r => panic!("unexpected result {:?}", r),
        }
    }
}
