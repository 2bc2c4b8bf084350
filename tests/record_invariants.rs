//! Record Invariant Tests
//!
//! - Save followed by load reproduces an equal record
//! - Strict appends are complete, closed and atomic
//! - Defaults substitute for omitted and absent fields
//! - len() always equals the number of successful appends
//! - Rows come back in order, one value per field

use tabrec::{Record, RecordError, Row, StoreConfig, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn ecg_record(location: &std::path::Path) -> Record {
    let mut record = Record::with_schema(location, ["ecg", "qrs"]).unwrap();
    for i in 0..10i64 {
        let ecg: Vec<i64> = (0..=i).collect();
        record
            .append(Row::new().with("ecg", ecg).with("qrs", vec![0, 1]))
            .unwrap();
    }
    record
}

// =============================================================================
// Round Trip
// =============================================================================

/// Ragged strict record survives save and load into a schema-free record.
#[test]
fn test_save_load_round_trip() {
    let tmp = TempDir::new().unwrap();
    let location = tmp.path().join("test");

    let record = ecg_record(&location);
    record.save().unwrap();

    let mut restored = Record::open(&location);
    restored.load().unwrap();

    assert_eq!(restored, record);
    assert_eq!(restored.len(), 10);
    assert_eq!(restored.field_names().collect::<Vec<_>>(), vec!["ecg", "qrs"]);
    assert_eq!(restored.get_field("ecg").unwrap()[9].len(), 10);
}

/// Round trip holds with compression off as well.
#[test]
fn test_round_trip_uncompressed() {
    let tmp = TempDir::new().unwrap();
    let location = tmp.path().join("plain");

    let mut record = Record::builder(&location)
        .fields(["name", "score", "tags"])
        .config(StoreConfig::uncompressed())
        .build()
        .unwrap();
    record
        .append(
            Row::new()
                .with("name", "a")
                .with("score", 0.5)
                .with("tags", vec![Value::from("x"), Value::from(vec![1, 2]), Value::Null]),
        )
        .unwrap();
    record.save().unwrap();

    let mut restored = Record::builder(&location)
        .config(StoreConfig::uncompressed())
        .build()
        .unwrap();
    restored.load().unwrap();
    assert_eq!(restored, record);
}

/// Field access by name after reload returns the stored column.
#[test]
fn test_get_field_after_reload() {
    let tmp = TempDir::new().unwrap();
    let location = tmp.path().join("test2");

    let mut record = Record::with_schema(&location, ["x", "ys"]).unwrap();
    record.append(Row::new().with("x", 1).with("ys", vec![1, 2])).unwrap();
    record.save().unwrap();

    let mut restored = Record::with_schema(&location, ["x", "ys"]).unwrap();
    restored.load().unwrap();

    assert_eq!(restored.get_field("x").unwrap(), &[Value::Int(1)]);
    assert_eq!(restored.get_field("ys").unwrap(), &[Value::from(vec![1, 2])]);
    assert!(matches!(
        restored.get_field("z"),
        Err(RecordError::UnknownField(_))
    ));
}

/// Location given with the extension already present is not extended twice.
#[test]
fn test_location_with_extension() {
    let tmp = TempDir::new().unwrap();
    let bare = tmp.path().join("r");
    let with_ext = tmp.path().join("r.trb");

    let mut record = Record::open(&bare);
    record.append(Row::new().with("v", 1)).unwrap();
    record.save().unwrap();
    assert!(with_ext.exists());

    let mut restored = Record::open(&with_ext);
    restored.load().unwrap();
    assert_eq!(restored, record);
}

/// Loading a missing bundle fails and leaves the record untouched.
#[test]
fn test_load_missing_bundle_fails() {
    let tmp = TempDir::new().unwrap();
    let mut record = Record::open(tmp.path().join("missing"));
    record.append(Row::new().with("v", 1)).unwrap();

    assert!(matches!(record.load(), Err(RecordError::Bundle(_))));
    assert_eq!(record.len(), 1);
    assert_eq!(record.get_field("v").unwrap(), &[Value::Int(1)]);
}

// =============================================================================
// Strict Mode
// =============================================================================

/// Omitted field without default fails; field set and row count unchanged.
#[test]
fn test_strict_completeness() {
    let mut record = Record::with_schema("unused", ["a", "b"]).unwrap();
    record.append(Row::new().with("a", 1).with("b", 2)).unwrap();

    let err = record.append(Row::new().with("a", 3)).unwrap_err();
    assert!(matches!(err, RecordError::MissingFieldNoDefault(ref f) if f == "b"));

    assert_eq!(record.len(), 1);
    assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(record.get_field("a").unwrap().len(), 1);
    assert_eq!(record.get_field("b").unwrap().len(), 1);
}

/// Undeclared field fails and nothing is committed.
#[test]
fn test_strict_closedness() {
    let mut record = Record::with_schema("unused", ["a"]).unwrap();
    let err = record.append(Row::new().with("a", 1).with("extra", 2)).unwrap_err();

    assert!(matches!(err, RecordError::UnknownField(ref f) if f == &vec!["extra".to_string()]));
    assert_eq!(record.len(), 0);
    assert!(record.get_field("a").unwrap().is_empty());
}

/// Absent marker stores the registered default for that row.
#[test]
fn test_default_substitution() {
    let mut record = Record::builder("unused")
        .field_with_default("x", -1)
        .field_with_default("ys", 0)
        .build()
        .unwrap();

    for i in 0..5 {
        if i % 3 == 0 {
            record.append(Row::new().absent("x").with("ys", -13.2)).unwrap();
        } else if i % 2 == 0 {
            record.append(Row::new().with("x", 2).with("ys", 42.2)).unwrap();
        } else {
            record.append(Row::new().with("x", 1)).unwrap();
        }
    }

    let xs: Vec<i64> = record
        .get_field("x")
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(xs, vec![-1, 1, 2, -1, 2]);
    assert_eq!(record.get_field("ys").unwrap()[1], Value::Int(0));
}

/// Strict record keeps every column at len() entries.
#[test]
fn test_strict_columns_stay_rectangular() {
    let mut record = Record::builder("unused")
        .field("a")
        .field_with_default("b", Value::Null)
        .build()
        .unwrap();

    for i in 0..4 {
        let row = if i % 2 == 0 {
            Row::new().with("a", i)
        } else {
            Row::new().with("a", i).with("b", "set")
        };
        record.append(row).unwrap();
        for (_, column) in record.columns() {
            assert_eq!(column.len(), record.len());
        }
    }
}

// =============================================================================
// Length Accounting
// =============================================================================

/// len() equals row count after each append, in both modes.
#[test]
fn test_length_accounting() {
    let mut strict = Record::with_schema("unused", ["a"]).unwrap();
    let mut open = Record::open("unused");

    for i in 1..=5 {
        strict.append(Row::new().with("a", i)).unwrap();
        assert_eq!(strict.len(), i as usize);

        let row = if i % 2 == 0 {
            Row::new().with("even", i)
        } else {
            Row::new().with("odd", i)
        };
        open.append(row).unwrap();
        assert_eq!(open.len(), i as usize);
    }

    // Omitted fields are not padded in non-strict mode.
    assert_eq!(open.get_field("even").unwrap().len(), 2);
    assert_eq!(open.get_field("odd").unwrap().len(), 3);
}

/// Non-strict record: the simplest usage.
#[test]
fn test_non_strict() {
    let mut record = Record::open("test_non_strict");
    record
        .append(Row::new().with("ecg", vec![123, 4, 5]).with("x", 42).with("y", 12.12))
        .unwrap();
    assert_eq!(record.len(), 1);
    assert!(!record.is_strict());
}

/// Loaded key set is locked even for a schema-free record.
#[test]
fn test_loaded_columns_are_locked() {
    let tmp = TempDir::new().unwrap();
    let location = tmp.path().join("locked");

    let mut record = Record::open(&location);
    record.append(Row::new().with("a", 1)).unwrap();
    record.save().unwrap();

    let mut restored = Record::open(&location);
    restored.load().unwrap();

    restored.append(Row::new().with("a", 2)).unwrap();
    assert_eq!(restored.len(), 2);

    let err = restored.append(Row::new().with("a", 3).with("b", 1)).unwrap_err();
    assert!(matches!(err, RecordError::UnknownKey(ref k) if k == "b"));
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.get_field("a").unwrap().len(), 2);
}

/// Non-strict row count after reload is the longest column.
#[test]
fn test_reload_row_count_is_longest_column() {
    let tmp = TempDir::new().unwrap();
    let location = tmp.path().join("ragged");

    let mut record = Record::open(&location);
    record.append(Row::new().with("a", 1).with("b", 1)).unwrap();
    record.append(Row::new().with("a", 2)).unwrap();
    record.append(Row::new().with("a", 3)).unwrap();
    record.append(Row::new()).unwrap();
    record.save().unwrap();

    let mut restored = Record::open(&location);
    restored.load().unwrap();
    assert_eq!(record.len(), 4);
    assert_eq!(restored.len(), 3);
}

// =============================================================================
// Iteration
// =============================================================================

/// Rows carry one value per field in order.
#[test]
fn test_iterate() {
    let mut record = Record::with_schema("unused", ["a", "b"]).unwrap();
    for i in 0..3i64 {
        record.append(Row::new().with("a", i).with("b", vec![i, i + 1, i + 2])).unwrap();
    }

    let mut count = 0;
    for (i, row) in record.iter().enumerate() {
        let i = i as i64;
        assert_eq!(row.len(), 2);
        assert_eq!(row[0], &Value::Int(i));
        assert_eq!(row[1].len(), 3);
        assert_eq!(row[1].get(0), Some(&Value::Int(i)));
        assert_eq!(row[1].get(1), Some(&Value::Int(i + 1)));
        assert_eq!(row[1].get(2), Some(&Value::Int(i + 2)));
        count += 1;
    }
    assert_eq!(count, 3);
}

/// Each iteration starts from the first row.
#[test]
fn test_iteration_restarts() {
    let mut record = Record::open("unused");
    record.append(Row::new().with("v", 1)).unwrap();
    record.append(Row::new().with("v", 2)).unwrap();

    let mut first = record.iter();
    first.next();
    assert_eq!(first.len(), 1);

    let again: Vec<_> = (&record).into_iter().collect();
    assert_eq!(again.len(), 2);
    assert_eq!(again[0], vec![&Value::Int(1)]);
}

// =============================================================================
// Equality
// =============================================================================

/// Differing values, lengths or field sets compare unequal.
#[test]
fn test_equality_detects_differences() {
    let base = {
        let mut r = Record::open("a");
        r.append(Row::new().with("x", vec![1, 2])).unwrap();
        r
    };

    let mut same = Record::open("b");
    same.append(Row::new().with("x", vec![1.0, 2.0])).unwrap();
    assert_eq!(base, same);

    let mut different_value = Record::open("c");
    different_value.append(Row::new().with("x", vec![1, 3])).unwrap();
    assert_ne!(base, different_value);

    let mut different_field = Record::open("d");
    different_field.append(Row::new().with("y", vec![1, 2])).unwrap();
    assert_ne!(base, different_field);

    let mut extra_field = Record::open("e");
    extra_field
        .append(Row::new().with("x", vec![1, 2]).with("y", 0))
        .unwrap();
    assert_ne!(base, extra_field);
}
