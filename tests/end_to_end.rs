use bluecrab::db::Database;
use bluecrab::diff::DiffReport;
use bluecrab::error::ErrorClass;
use bluecrab::value::Value;

#[test]
fn scenario_basic_crud_and_verify() {
    let mut db = Database::init("/tmp/bluecrab-scenario-1.bcrb");
    db.set("k", Value::Text("v".into())).unwrap();
    assert!(db.verify_db());
    assert_eq!(db.get("k").unwrap(), Value::Text("v".into()));
    db.delete("k").unwrap();
    let err = db.get("k").unwrap_err();
    assert_eq!(err.class, ErrorClass::NotFound);
}

#[test]
fn scenario_commit_checkout_round_trip() {
    let mut db = Database::init("/tmp/bluecrab-scenario-2.bcrb");
    db.set("a", Value::I32(1)).unwrap();
    let c1 = db.commit("c1").unwrap();
    db.set("a", Value::I32(2)).unwrap();
    let c2 = db.commit("c2").unwrap();

    db.checkout(&c1).unwrap();
    assert_eq!(db.get("a").unwrap(), Value::I32(1));

    db.checkout(&c2).unwrap();
    assert_eq!(db.get("a").unwrap(), Value::I32(2));
}

#[test]
fn scenario_diff_reports_removed_modified_added() {
    let mut db = Database::init("/tmp/bluecrab-scenario-3.bcrb");
    db.set("x", Value::Text("1".into())).unwrap();
    db.set("y", Value::Text("2".into())).unwrap();
    let a = db.commit("A").unwrap();

    db.set("x", Value::Text("1b".into())).unwrap();
    db.delete("y").unwrap();
    db.set("z", Value::Text("3".into())).unwrap();
    let b = db.commit("B").unwrap();

    let report = db.diff(&a, &b).unwrap();
    assert_eq!(
        report,
        DiffReport {
            removed: vec!["y".to_string()],
            modified: vec!["x".to_string()],
            added: vec!["z".to_string()],
        }
    );
}

#[test]
fn scenario_merge_auto_resolve_and_conflict_abort() {
    let mut db = Database::init("/tmp/bluecrab-scenario-4.bcrb");
    db.set("k", Value::I32(1)).unwrap();
    let c1 = db.commit("A").unwrap();
    db.set("k", Value::I32(2)).unwrap();
    let c2 = db.commit("B").unwrap();

    // auto_resolve=true: source (c2) wins the conflict.
    let mut db_auto = Database::init("/tmp/bluecrab-scenario-4-auto.bcrb");
    db_auto.set("k", Value::I32(1)).unwrap();
    db_auto.commit("A").unwrap();
    db_auto.set("k", Value::I32(2)).unwrap();
    db_auto.commit("B").unwrap();
    db_auto.merge(&c2, &c1, true).unwrap();
    assert_eq!(db_auto.get("k").unwrap(), Value::I32(2));

    // auto_resolve=false on an actual conflict: Conflict error, live set
    // left exactly as c1's snapshot (no partial state).
    let err = db.merge(&c2, &c1, false).unwrap_err();
    assert_eq!(err.class, ErrorClass::Conflict);
    assert_eq!(db.get("k").unwrap(), Value::I32(1));
}

#[test]
fn scenario_find_keys_wildcard_preserves_insertion_order() {
    let mut db = Database::init("/tmp/bluecrab-scenario-5.bcrb");
    db.set("user_1", Value::Null).unwrap();
    db.set("admin_1", Value::Null).unwrap();
    db.set("user_2", Value::Null).unwrap();

    let keys = db.find_keys("user_*").unwrap();
    assert_eq!(keys, vec!["user_1".to_string(), "user_2".to_string()]);
}

#[test]
fn scenario_save_load_round_trip_of_a_thousand_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thousand.bcrb");

    let mut db = Database::init(&path);
    for i in 0..1000 {
        db.set(&format!("key_{i:04}"), Value::I64(i)).unwrap();
    }
    db.save().unwrap();

    let loaded = Database::load(&path).unwrap();
    assert!(loaded.verify_db());
    assert_eq!(loaded.len(), 1000);

    let original_keys: Vec<_> = db.find_keys("*").unwrap();
    let loaded_keys: Vec<_> = loaded.find_keys("*").unwrap();
    assert_eq!(original_keys, loaded_keys);
    for i in 0..1000 {
        let key = format!("key_{i:04}");
        assert_eq!(loaded.get(&key).unwrap(), Value::I64(i));
    }
}

#[test]
fn empty_database_save_and_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.bcrb");

    let db = Database::init(&path);
    db.save().unwrap();

    let loaded = Database::load(&path).unwrap();
    assert!(loaded.is_empty());
    assert!(loaded.verify_db());
}

#[test]
fn checkout_inverse_restores_live_set_after_mutation() {
    let mut db = Database::init("/tmp/bluecrab-checkout-inverse.bcrb");
    db.set("a", Value::I32(1)).unwrap();
    db.set("b", Value::I32(2)).unwrap();
    let c = db.commit("snapshot").unwrap();

    db.set("a", Value::I32(99)).unwrap();
    db.delete("b").unwrap();
    db.set("c", Value::I32(3)).unwrap();

    db.checkout(&c).unwrap();
    assert_eq!(db.get("a").unwrap(), Value::I32(1));
    assert_eq!(db.get("b").unwrap(), Value::I32(2));
    assert!(db.get("c").is_err());
}

#[test]
fn idempotent_set_only_changes_updated_at() {
    let mut db = Database::init("/tmp/bluecrab-idempotent.bcrb");
    db.set("k", Value::Text("v".into())).unwrap();
    db.set("k", Value::Text("v".into())).unwrap();
    assert_eq!(db.get("k").unwrap(), Value::Text("v".into()));
    assert!(db.verify_db());
}

#[test]
fn pattern_boundaries_empty_key_and_non_ascii_case_fold() {
    let mut db = Database::init("/tmp/bluecrab-pattern-boundaries.bcrb");
    db.set("plain", Value::Null).unwrap();

    assert_eq!(db.find_keys("").unwrap().len(), 1);
    assert!(db.find_keys("(?i)PLAIN").unwrap().contains(&"plain".to_string()));

    let err = db.find_keys("a*b*c").unwrap_err();
    assert_eq!(err.class, ErrorClass::InvalidArg);
}
