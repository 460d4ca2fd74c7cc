use serde_json::Value as Json;

use super::{Primitive, TypeDesc};
use crate::{Error, Result};

const ARRAY_KEY: &str = "$array";
const LENGTH_KEY: &str = "$length";

impl TypeDesc {
    /// Build a type description from its JSON schema
    ///
    /// - `"number"`, `"string"`, `"boolean"`, `"bigint"` and `"null"` are
    ///   primitives;
    /// - `"field"`, `"bool"`, `"uint32"` and `"uint64"` are the built-in
    ///   provable terminals;
    /// - a JSON array is a tuple of its item schemas;
    /// - `{"$array": <schema>, "$length": <n>}` is an array of `n` items;
    /// - any other object is a record, in the order of its keys.
    pub fn from_schema(schema: &Json) -> Result<Self> {
        match schema {
            Json::String(name) => Self::from_name(name),

            Json::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, s)| Self::from_schema(s).map_err(|e| e.within(&format!("[{}]", i))))
                .collect::<Result<Vec<_>>>()
                .map(TypeDesc::Tuple),

            Json::Object(object) if object.contains_key(ARRAY_KEY) => {
                if object.len() != 2 {
                    return Err(Error::unsupported(
                        "",
                        format!("an array schema has only `{}` and `{}`", ARRAY_KEY, LENGTH_KEY),
                    ));
                }

                let len = object
                    .get(LENGTH_KEY)
                    .and_then(Json::as_u64)
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| {
                        Error::unsupported(LENGTH_KEY, "expected a non-negative integer")
                    })?;

                object
                    .get(ARRAY_KEY)
                    .ok_or_else(|| Error::unsupported(ARRAY_KEY, "missing item schema"))
                    .and_then(|s| Self::from_schema(s).map_err(|e| e.within("[]")))
                    .map(|item| TypeDesc::array(item, len))
            }

            Json::Object(object) => object
                .iter()
                .map(|(k, s)| match Self::from_schema(s) {
                    Ok(d) => Ok((k.clone(), d)),
                    Err(e) => Err(e.within(k)),
                })
                .collect::<Result<Vec<_>>>()
                .map(TypeDesc::Record),

            _ => Err(Error::unsupported(
                "",
                format!("`{}` isn't a type schema", schema),
            )),
        }
    }

    fn from_name(name: &str) -> Result<Self> {
        let desc = match name {
            "number" => TypeDesc::Primitive(Primitive::Number),
            "string" => TypeDesc::Primitive(Primitive::Text),
            "boolean" => TypeDesc::Primitive(Primitive::Boolean),
            "bigint" => TypeDesc::Primitive(Primitive::BigInt),
            "null" => TypeDesc::Primitive(Primitive::Unit),
            "field" => TypeDesc::field(),
            "bool" => TypeDesc::bool(),
            "uint32" => TypeDesc::uint32(),
            "uint64" => TypeDesc::uint64(),
            _ => return Err(Error::unsupported("", format!("unknown type `{}`", name))),
        };

        Ok(desc)
    }
}
