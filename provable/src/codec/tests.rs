use num_bigint::BigInt;
use quickcheck::{quickcheck, Arbitrary, Gen};
use serde_json::json;

use super::*;

const KEYS: [&str; 4] = ["zeta", "beta", "mu", "alpha"];

fn arbitrary_desc(g: &mut Gen, depth: usize) -> TypeDesc {
    let variants = if depth == 0 { 9 } else { 12 };
    let len = usize::arbitrary(g) % 4;

    match u8::arbitrary(g) % variants {
        0 => TypeDesc::Primitive(Primitive::Number),
        1 => TypeDesc::Primitive(Primitive::Text),
        2 => TypeDesc::Primitive(Primitive::Boolean),
        3 => TypeDesc::Primitive(Primitive::BigInt),
        4 => TypeDesc::Primitive(Primitive::Unit),
        5 => TypeDesc::field(),
        6 => TypeDesc::bool(),
        7 => TypeDesc::uint32(),
        8 => TypeDesc::uint64(),
        9 => TypeDesc::Tuple((0..len).map(|_| arbitrary_desc(g, depth - 1)).collect()),
        10 => TypeDesc::array(arbitrary_desc(g, depth - 1), len),
        _ => TypeDesc::record(
            KEYS[..len]
                .iter()
                .map(|k| (*k, arbitrary_desc(g, depth - 1)))
                .collect::<Vec<_>>(),
        ),
    }
}

fn arbitrary_value(g: &mut Gen, desc: &TypeDesc) -> Value {
    match desc {
        TypeDesc::Primitive(Primitive::Number) => Value::Number(i32::arbitrary(g) as f64),
        TypeDesc::Primitive(Primitive::Text) => Value::Text(String::arbitrary(g)),
        TypeDesc::Primitive(Primitive::Boolean) => Value::Boolean(bool::arbitrary(g)),
        TypeDesc::Primitive(Primitive::BigInt) => Value::BigInt(BigInt::from(i64::arbitrary(g))),
        TypeDesc::Primitive(Primitive::Unit) => Value::Unit,
        TypeDesc::Custom(p) => match p.empty() {
            Value::Field(_) if bool::arbitrary(g) => Value::Field(-Fp::from(u64::arbitrary(g))),
            Value::Field(_) => Value::Field(Fp::from(u64::arbitrary(g))),
            Value::Bool(_) => Value::Bool(bool::arbitrary(g)),
            Value::UInt32(_) => Value::UInt32(u32::arbitrary(g)),
            Value::UInt64(_) => Value::UInt64(u64::arbitrary(g)),
            v => v,
        },
        TypeDesc::Tuple(items) => {
            Value::Tuple(items.iter().map(|d| arbitrary_value(g, d)).collect())
        }
        TypeDesc::Array(item, len) => {
            Value::Tuple((0..*len).map(|_| arbitrary_value(g, item)).collect())
        }
        TypeDesc::Record(fields) => Value::record(
            fields
                .iter()
                .map(|(k, d)| (k.clone(), arbitrary_value(g, d)))
                .collect::<Vec<_>>(),
        ),
    }
}

#[derive(Debug, Clone)]
struct Sample {
    codec: Codec,
    value: Value,
}

impl Arbitrary for Sample {
    fn arbitrary(g: &mut Gen) -> Self {
        let desc = arbitrary_desc(g, 3);
        let codec = Codec::new(desc).expect("generated descriptions are well formed");
        let value = arbitrary_value(g, codec.desc());

        Self { codec, value }
    }
}

quickcheck! {
    fn fields_roundtrip(s: Sample) -> bool {
        let fields = s.codec.to_fields(&s.value).expect("failed to encode fields");
        let aux = s.codec.to_auxiliary(Some(&s.value)).expect("failed to encode aux");

        s.codec.from_fields(&fields, &aux).expect("failed to decode") == s.value
    }

    fn json_roundtrip(s: Sample) -> bool {
        let json = s.codec.to_json(&s.value).expect("failed to encode json");

        s.codec.from_json(&json).expect("failed to decode json") == s.value
    }

    fn width_is_value_independent(s: Sample) -> bool {
        let fields = s.codec.to_fields(&s.value).expect("failed to encode fields");
        let empty = s.codec.to_fields(&s.codec.empty()).expect("failed to encode empty");

        fields.len() == s.codec.size_in_fields() && empty.len() == fields.len()
    }

    fn absent_aux_decodes_to_empty(s: Sample) -> bool {
        let empty = s.codec.empty();
        let fields = s.codec.to_fields(&empty).expect("failed to encode fields");
        let aux = s.codec.to_auxiliary(None).expect("failed to encode aux");

        s.codec.from_fields(&fields, &aux).expect("failed to decode") == empty
            && s.codec.check(&empty).is_ok()
    }
}

fn a_b_record() -> TypeDesc {
    TypeDesc::record([
        ("a", TypeDesc::field()),
        ("b", TypeDesc::Primitive(Primitive::Boolean)),
    ])
}

#[test]
fn record_of_field_and_boolean() {
    let codec: Codec = Codec::new(a_b_record()).expect("valid description");
    let value = Value::record([("a", Value::Field(Fp::from(5u64))), ("b", Value::Boolean(true))]);

    let fields = codec.to_fields(&value).expect("failed to encode");

    assert_eq!(codec.size_in_fields(), 1);
    assert_eq!(fields, vec![Fp::from(5u64)]);
    assert_eq!(
        codec.to_auxiliary(Some(&value)).expect("failed to encode aux"),
        vec![
            Aux::Node(vec![]),
            Aux::Node(vec![Aux::Leaf(Value::Boolean(true))])
        ]
    );
    assert_eq!(
        codec.to_json(&value).expect("failed to encode json"),
        json!({"a": "5", "b": true})
    );
}

#[test]
fn nested_records_are_sorted() {
    let desc = TypeDesc::record([
        ("z", TypeDesc::field()),
        (
            "a",
            TypeDesc::record([("y", TypeDesc::field()), ("b", TypeDesc::field())]),
        ),
    ]);

    let codec: Codec = Codec::new(desc).expect("valid description");
    let value = Value::record([
        ("z", Value::Field(Fp::from(1u64))),
        (
            "a",
            Value::record([
                ("y", Value::Field(Fp::from(2u64))),
                ("b", Value::Field(Fp::from(3u64))),
            ]),
        ),
    ]);

    let fields = codec.to_fields(&value).expect("failed to encode");

    // outermost order is declared, nested order is lexicographic
    assert_eq!(fields, vec![Fp::from(1u64), Fp::from(3u64), Fp::from(2u64)]);
}

#[test]
fn duplicate_keys_are_unsupported() {
    let desc = TypeDesc::record([("a", TypeDesc::field()), ("a", TypeDesc::bool())]);

    assert!(matches!(
        Codec::<Extended>::new(desc),
        Err(Error::UnsupportedType { path, .. }) if path == "a"
    ));
}

#[test]
fn pure_codecs_reject_auxiliary_data() {
    let err = Codec::<Pure>::new(a_b_record()).expect_err("boolean carries aux");

    assert!(matches!(err, Error::UnsupportedType { path, .. } if path == "b"));

    let desc = TypeDesc::record([
        ("a", TypeDesc::field()),
        ("b", TypeDesc::bool()),
        ("c", TypeDesc::Primitive(Primitive::Unit)),
    ]);
    let codec = Codec::<Pure>::new(desc).expect("provable terminals are pure");
    let value = Value::record([
        ("a", Value::Field(Fp::from(9u64))),
        ("b", Value::Bool(true)),
        ("c", Value::Unit),
    ]);

    let fields = codec.to_fields(&value).expect("failed to encode");

    assert!(codec.is_pure());
    assert!(codec.to_auxiliary(Some(&value)).expect("aux").is_empty());
    assert_eq!(codec.from_fields_pure(&fields).expect("failed to decode"), value);
}

#[test]
fn decode_errors_carry_the_path() {
    let desc = TypeDesc::record([("flags", TypeDesc::array(TypeDesc::bool(), 3))]);
    let codec: Codec = Codec::new(desc).expect("valid description");
    let aux = codec.to_auxiliary(None).expect("aux");
    let fields = [Fp::zero(), Fp::from(2u64), Fp::one()];

    match codec.from_fields(&fields, &aux) {
        Err(Error::Validity { path, .. }) => assert_eq!(path, "flags[1]"),
        r => panic!("unexpected result {:?}", r),
    }

    codec
        .from_fields(&fields[..2], &aux)
        .expect_err("wrong field count");

    match codec.from_json(&json!({"flags": [true, false]})) {
        Err(Error::Decode { path, .. }) => assert_eq!(path, "flags"),
        r => panic!("unexpected result {:?}", r),
    }

    match codec.from_json(&json!({})) {
        Err(Error::Decode { path, .. }) => assert_eq!(path, "flags"),
        r => panic!("unexpected result {:?}", r),
    }
}

#[test]
fn missing_aux_slot_is_a_decode_error() {
    let codec: Codec = Codec::new(a_b_record()).expect("valid description");
    let fields = [Fp::from(5u64)];

    let err = codec
        .from_fields(&fields, &[Aux::Node(vec![])])
        .expect_err("missing slot");
    assert!(matches!(err, Error::Decode { path, .. } if path == "b"));

    let err = codec
        .from_fields(
            &fields,
            &[Aux::Node(vec![]), Aux::Node(vec![Aux::Leaf(Value::Text("x".into()))])],
        )
        .expect_err("ill-typed slot");
    assert!(matches!(err, Error::Decode { path, .. } if path == "b"));

    let err = codec.from_fields(&fields, &[]).expect_err("no aux at all");
    assert!(matches!(err, Error::Decode { path, .. } if path == "a"));

    let aux = codec.to_auxiliary(None).expect("default aux");
    let value = codec.from_fields(&fields, &aux).expect("failed to decode");

    assert_eq!(
        value,
        Value::record([("a", Value::Field(Fp::from(5u64))), ("b", Value::Boolean(false))])
    );
}

#[derive(Debug)]
struct NonZero;

impl Provable for NonZero {
    type Value = Value;

    fn size_in_fields(&self) -> usize {
        1
    }

    fn to_fields(&self, value: &Value) -> Result<Vec<Fp>> {
        Dynamic(FieldType).to_fields(value)
    }

    fn to_auxiliary(&self, _value: Option<&Value>) -> Result<Vec<Aux>> {
        Ok(vec![])
    }

    fn from_fields(&self, fields: &[Fp], aux: &[Aux]) -> Result<Value> {
        Dynamic(FieldType).from_fields(fields, aux)
    }

    fn to_json(&self, value: &Value) -> Result<Json> {
        Dynamic(FieldType).to_json(value)
    }

    fn from_json(&self, json: &Json) -> Result<Value> {
        Dynamic(FieldType).from_json(json)
    }

    fn check(&self, value: &Value) -> Result<()> {
        match value {
            Value::Field(x) if *x == Fp::zero() => Err(Error::validity("", "zero")),
            _ => Ok(()),
        }
    }

    fn empty(&self) -> Value {
        Value::Field(Fp::one())
    }

    fn is_pure(&self) -> bool {
        true
    }
}

#[test]
fn check_reports_the_failing_path() {
    let desc = TypeDesc::record([(
        "inner",
        TypeDesc::record([("b", TypeDesc::custom(NonZero)), ("a", TypeDesc::field())]),
    )]);
    let codec = Codec::<Pure>::new(desc).expect("valid description");

    let mut value = codec.empty();

    codec.check(&value).expect("empty value is valid");

    if let Value::Record(outer) = &mut value {
        if let Some(Value::Record(inner)) = outer.get_mut("inner") {
            inner.insert("b".into(), Value::Field(Fp::zero()));
        }
    }

    match codec.check(&value) {
        Err(Error::Validity { path, .. }) => assert_eq!(path, "inner.b"),
        r => panic!("unexpected result {:?}", r),
    }
}

#[test]
fn shape_mismatches_are_reported() {
    let codec: Codec = Codec::new(a_b_record()).expect("valid description");

    let err = codec
        .to_fields(&Value::record([("a", Value::Text("5".into())), ("b", Value::Boolean(true))]))
        .expect_err("text isn't a field");
    assert!(matches!(err, Error::Mismatch { path, .. } if path == "a"));

    let err = codec
        .to_fields(&Value::record([("a", Value::Field(Fp::one()))]))
        .expect_err("missing key");
    assert!(matches!(err, Error::Mismatch { path, .. } if path == "b"));

    codec.to_fields(&Value::Unit).expect_err("not a record");
}

#[test]
fn hash_input_packs_small_terminals() {
    let desc = TypeDesc::Tuple(vec![
        TypeDesc::field(),
        TypeDesc::Primitive(Primitive::Text),
        TypeDesc::bool(),
        TypeDesc::uint32(),
    ]);
    let codec: Codec = Codec::new(desc).expect("valid description");
    let value = Value::Tuple(vec![
        Value::Field(Fp::from(7u64)),
        Value::Text("ignored".into()),
        Value::Bool(true),
        Value::UInt32(3),
    ]);

    let input = codec.to_input(&value).expect("failed to hash");

    assert_eq!(input.fields, vec![Fp::from(7u64)]);
    assert_eq!(input.packed, vec![(Fp::one(), 1), (Fp::from(3u64), 32)]);
}

#[test]
fn codecs_nest_as_terminals() {
    let inner = Codec::<Pure>::new(TypeDesc::record([
        ("y", TypeDesc::field()),
        ("x", TypeDesc::uint64()),
    ]))
    .expect("valid description");

    let outer: Codec = Codec::new(TypeDesc::Tuple(vec![
        inner.into_desc(),
        TypeDesc::Primitive(Primitive::Text),
    ]))
    .expect("valid description");

    let value = Value::Tuple(vec![
        Value::record([("y", Value::Field(Fp::from(4u64))), ("x", Value::UInt64(8))]),
        Value::Text("label".into()),
    ]);

    let fields = outer.to_fields(&value).expect("failed to encode");
    let aux = outer.to_auxiliary(Some(&value)).expect("failed to encode aux");

    // a codec keeps its own declared order when nested
    assert_eq!(fields, vec![Fp::from(4u64), Fp::from(8u64)]);
    assert_eq!(outer.from_fields(&fields, &aux).expect("failed to decode"), value);
}

#[test]
fn schemas_build_descriptions() {
    let schema = json!({
        "owner": "field",
        "meta": {"name": "string", "count": "uint32", "big": "bigint"},
        "flags": {"$array": "bool", "$length": 2},
        "pair": ["number", "null"],
    });

    let codec: Codec = Codec::from_schema(&schema).expect("valid schema");

    assert_eq!(codec.size_in_fields(), 4);

    let json = json!({
        "owner": "12",
        "meta": {"name": "n", "count": "3", "big": "-5"},
        "flags": [true, false],
        "pair": [1.5, null],
    });

    let value = codec.from_json(&json).expect("failed to decode json");

    assert_eq!(codec.to_json(&value).expect("failed to encode json"), json);
}

#[test]
fn malformed_schemas_are_unsupported() {
    let err = TypeDesc::from_schema(&json!({"x": ["field", "float"]})).expect_err("unknown type");
    assert!(matches!(err, Error::UnsupportedType { path, .. } if path == "x[1]"));

    TypeDesc::from_schema(&json!(3)).expect_err("numbers aren't schemas");
    TypeDesc::from_schema(&json!({"$array": "field"})).expect_err("missing length");
    TypeDesc::from_schema(&json!({"$array": "field", "$length": -1})).expect_err("negative length");
}

#[test]
fn oversized_descriptions_are_unsupported() {
    let len = 1u64 << 40;
    let schema = json!({"$array": {"$array": "field", "$length": len}, "$length": len});

    let desc = TypeDesc::from_schema(&schema).expect("well-formed schema");

    assert_eq!(desc.size_in_fields(), usize::MAX);
    assert!(matches!(
        Codec::<Extended>::new(desc),
        Err(Error::UnsupportedType { .. })
    ));

    let schema = json!({"$array": "number", "$length": 1u64 << 50});
    let err = Codec::<Extended>::from_schema(&schema).expect_err("too many nodes");

    assert!(matches!(err, Error::UnsupportedType { .. }));

    let schema = json!({"$array": ["field", "boolean"], "$length": 1024});
    let codec = Codec::<Extended>::from_schema(&schema).expect("within the limit");

    assert_eq!(codec.size_in_fields(), 1024);
    assert_eq!(codec.to_auxiliary(None).expect("aux").len(), 1024);
}
