use super::*;

#[test]
fn default_value_is_null() {
    assert_eq!(Value::default(), Value::Null);
    assert!(Value::Null.is_null());
}

#[test]
fn tag_roundtrips_through_u16() {
    let values = [
        Value::I8(-1),
        Value::U64(9),
        Value::F32(1.5),
        Value::F64(2.5),
        Value::Bool(true),
        Value::Char(b'x'),
        Value::Text("hi".into()),
        Value::Size(4),
        Value::Timestamp(123),
        Value::Duration(-5),
        Value::Hex("1f".into()),
        Value::Oct("17".into()),
        Value::Bin("101".into()),
        Value::Bytes(vec![1, 2, 3]),
        Value::Null,
    ];

    for v in values {
        let t = v.tag();
        assert_eq!(ValueTag::from_u16(t.to_u16()), Some(t));
    }
}

#[test]
fn clone_is_a_deep_copy_of_heap_payloads() {
    let a = Value::Text("owned".to_string());
    let b = a.clone();
    assert_eq!(a, b);
    drop(a);
    assert_eq!(b, Value::Text("owned".to_string()));
}
