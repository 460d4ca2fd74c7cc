use zk_provable::poseidon;
use zk_provable::{
    Codec, ConstraintSystem, Error, FieldType, Fp, MerkleArrayType, MerkleListType, Primitive,
    Provable, TypeDesc, Value,
};
use zk_provable_utils::ValueGenerator;

fn fp(n: u64) -> Fp {
    Fp::from(n)
}

#[test]
fn prefixed_list_matches_poseidon() {
    let ty = MerkleListType::with_prefix(FieldType, "test").expect("short prefix");
    let mut list = ty.empty();

    let mut expected = Fp::zero();

    for x in [1, 2, 3] {
        list.push(fp(x)).expect("failed to push");

        expected = poseidon::hash_with_prefix("test", &[expected, fp(x)]).expect("short prefix");

        assert_eq!(list.hash(), expected);
    }

    let mut cs = ConstraintSystem::checked();

    assert_eq!(list.pop(&mut cs).expect("pop"), fp(3));
    assert_eq!(list.pop(&mut cs).expect("pop"), fp(2));
    assert_eq!(list.pop(&mut cs).expect("pop"), fp(1));
    assert_eq!(list.hash(), Fp::zero());
    assert!(list.is_empty(&mut cs));
}

#[test]
fn list_and_array_share_commitments() {
    let mut generator = ValueGenerator::new(0x348);

    let list_type = MerkleListType::with_prefix(FieldType, "shared").expect("short prefix");
    let array_type = list_type.iterator_type();

    for n in 0..8 {
        let xs = generator.gen_fields(n);

        let list = list_type.from_reverse(xs.clone()).expect("failed to build list");
        let array = array_type.from(xs.clone()).expect("failed to build array");

        assert_eq!(list.hash(), array.hash());

        let mut cs = ConstraintSystem::checked();
        let mut iter = list.start_iterating();

        iter.assert_at_start(&mut cs).expect("fresh iterator");

        let visited = (0..n)
            .map(|_| iter.next(&mut cs))
            .collect::<Result<Vec<_>, _>>()
            .expect("failed to iterate");

        assert_eq!(visited, xs);
        iter.assert_at_end(&mut cs).expect("iterator consumed");
    }
}

#[test]
fn list_of_records() {
    let codec: Codec = Codec::new(TypeDesc::record([
        ("a", TypeDesc::field()),
        ("b", TypeDesc::Primitive(Primitive::Boolean)),
    ]))
    .expect("valid description");

    let ty = MerkleListType::new(codec);
    let mut list = ty.empty();

    let first = Value::record([("a", Value::Field(fp(1))), ("b", Value::Boolean(true))]);
    let second = Value::record([("a", Value::Field(fp(2))), ("b", Value::Boolean(false))]);

    list.push(first.clone()).expect("push");
    list.push(second.clone()).expect("push");

    let mut cs = ConstraintSystem::checked();
    let mut visited = vec![];

    list.for_each(&mut cs, 4, |_, value, is_dummy, _| {
        if !is_dummy {
            visited.push(value);
        }

        Ok(())
    })
    .expect("failed to iterate");

    assert_eq!(visited, vec![second, first]);
}

#[test]
fn list_checkpoints_survive_json() {
    let ty = MerkleListType::with_prefix(FieldType, "json").expect("short prefix");
    let list = ty.from(vec![fp(4), fp(5), fp(6)]).expect("failed to build list");

    let json = ty.to_json(&list).expect("failed to encode json");
    let decoded = ty.from_json(&json).expect("failed to decode json");

    assert_eq!(decoded, list);

    let mut tampered = json;

    tampered["hash"] = serde_json::json!("7");

    assert!(matches!(ty.from_json(&tampered), Err(Error::Decode { .. })));
}

#[test]
fn native_iteration_records_nothing() {
    let ty = MerkleArrayType::new(FieldType);
    let mut array = ty.from(vec![fp(1), fp(2)]).expect("failed to build array");

    let mut cs = ConstraintSystem::native();

    assert_eq!(array.next(&mut cs).expect("next"), fp(1));
    assert_eq!(array.next(&mut cs).expect("next"), fp(2));
    assert_eq!(array.next(&mut cs).expect("next"), fp(0));
    assert!(array.is_at_end(&mut cs));
    assert!(cs.constraints().is_empty());
}

#[test]
fn checked_and_native_modes_agree() {
    let mut generator = ValueGenerator::new(0x34b);

    let list_type = MerkleListType::with_prefix(FieldType, "modes").expect("short prefix");
    let array_type = list_type.iterator_type();

    let mut checked = ConstraintSystem::checked();
    let mut native = ConstraintSystem::native();

    let mut a = list_type.empty();
    let mut b = list_type.empty();

    for step in 0..24 {
        let x = generator.gen_field();
        let condition = generator.gen_flag();

        match step % 4 {
            0 => {
                a.push(x).expect("push");
                b.push(x).expect("push");
            }
            1 => {
                a.push_if(&mut checked, condition, x).expect("push if");
                b.push_if(&mut native, condition, x).expect("push if");
            }
            2 => assert_eq!(
                a.pop(&mut checked).expect("pop"),
                b.pop(&mut native).expect("pop")
            ),
            _ => assert_eq!(
                a.pop_if(&mut checked, condition).expect("pop if"),
                b.pop_if(&mut native, condition).expect("pop if")
            ),
        }

        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.is_empty(&mut checked), b.is_empty(&mut native));
    }

    let xs = generator.gen_fields(6);

    let mut a = array_type.from(xs.clone()).expect("failed to build array");
    let mut b = array_type.from(xs).expect("failed to build array");

    for step in 0..8 {
        assert_eq!(
            a.next(&mut checked).expect("next"),
            b.next(&mut native).expect("next")
        );

        if step == 4 {
            let condition = generator.gen_flag();

            a.jump_to_end_if(&mut checked, condition);
            b.jump_to_end_if(&mut native, condition);
        }

        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.current_hash(), b.current_hash());
        assert_eq!(a.is_at_end(&mut checked), b.is_at_end(&mut native));
    }

    a.assert_at_end(&mut checked).expect("iterator consumed");
    assert!(!checked.constraints().is_empty());
    assert!(native.constraints().is_empty());
}
