use ccbench_core::{Record, Value};

#[test]
fn next_version_starts_at_one_for_absent_key() {
    assert_eq!(Record::next_version(None), 1);
}

#[test]
fn next_version_increments_prior() {
    let prior = Record::new(5);
    assert_eq!(Record::next_version(Some(&prior)), 6);
}

#[test]
fn int_field_round_trips() {
    let mut r = Record::new(1);
    r.set_int("balance", 42);
    assert_eq!(r.get_int("balance"), Some(42));
    assert_eq!(r.get_str("balance"), None);
}

#[test]
fn str_field_round_trips() {
    let mut r = Record::new(1);
    r.set_str("name", "alice");
    assert_eq!(r.get_str("name"), Some("alice"));
}

#[test]
fn missing_field_is_none() {
    let r = Record::new(1);
    assert_eq!(r.get_int("balance"), None);
}

#[test]
fn value_conversions() {
    let v: Value = 7i64.into();
    assert_eq!(v.as_int(), Some(7));
    let v: Value = "hi".into();
    assert_eq!(v.as_str(), Some("hi"));
}
