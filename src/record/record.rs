//! Append-only columnar record
//!
//! A record accumulates rows into named columns and persists them as a
//! single bundle at `<location>.<extension>`.
//!
//! # Modes
//!
//! - **Strict** (non-empty schema): the column set is fixed at construction.
//!   Every append supplies each declared field, directly or through its
//!   default, and nothing else. All columns always hold `len()` values.
//! - **Non-strict** (empty schema): columns are created on first use.
//!   `len()` counts append calls, and a column only grows when its field is
//!   supplied, so columns may be shorter than `len()`.
//!
//! After `load`, the column set is whatever the bundle holds and is locked
//! in both modes.
//!
//! Validation always completes before any column is touched: a failed
//! append leaves the record exactly as it was.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::errors::{RecordError, RecordResult};
use super::locked_map::KeyLockedMap;
use super::rows::Rows;
use super::value::{Row, Slot, Value};
use crate::bundle::{validate_entry_name, BundleReader, BundleWriter};
use crate::config::StoreConfig;
use crate::observability::{log_event_with_fields, Event};

/// Insertion-ordered column map that grows on first use.
#[derive(Debug, Clone, Default)]
struct OpenColumns {
    entries: Vec<(String, Vec<Value>)>,
    index: HashMap<String, usize>,
}

impl OpenColumns {
    fn column_mut(&mut self, name: &str) -> &mut Vec<Value> {
        let pos = match self.index.get(name) {
            Some(&pos) => pos,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }
}

#[derive(Debug, Clone)]
enum Columns {
    Locked(KeyLockedMap<String, Vec<Value>>),
    Open(OpenColumns),
}

impl Columns {
    fn entries(&self) -> &[(String, Vec<Value>)] {
        match self {
            Columns::Locked(map) => map.as_slice(),
            Columns::Open(open) => &open.entries,
        }
    }

    fn get(&self, name: &str) -> Option<&[Value]> {
        match self {
            Columns::Locked(map) => map.get(name).ok().map(Vec::as_slice),
            Columns::Open(open) => open
                .index
                .get(name)
                .map(|&pos| open.entries[pos].1.as_slice()),
        }
    }

    /// Appends one value per named cell, or nothing at all.
    fn push_cells(&mut self, cells: Vec<(String, Value)>) -> RecordResult<()> {
        match self {
            Columns::Locked(map) => {
                if let Some((name, _)) = cells.iter().find(|(name, _)| !map.contains_key(name.as_str())) {
                    return Err(RecordError::UnknownKey(name.clone()));
                }
                for (name, value) in cells {
                    map.get_mut(name.as_str())?.push(value);
                }
            }
            Columns::Open(open) => {
                for (name, value) in cells {
                    open.column_mut(&name).push(value);
                }
            }
        }
        Ok(())
    }
}

/// Append-only, optionally schema-enforced column store.
#[derive(Debug, Clone)]
pub struct Record {
    location: PathBuf,
    schema: Vec<String>,
    defaults: KeyLockedMap<String, Value>,
    columns: Columns,
    row_count: usize,
    config: StoreConfig,
}

impl Record {
    /// Creates a schema-free (non-strict) record at `location`.
    pub fn open(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            schema: Vec::new(),
            defaults: KeyLockedMap::default(),
            columns: Columns::Open(OpenColumns::default()),
            row_count: 0,
            config: StoreConfig::default(),
        }
    }

    /// Creates a record with a schema and per-field defaults.
    ///
    /// An empty schema gives a non-strict record; defaults must then be empty.
    pub fn new<I, S, D, N, V>(location: impl Into<PathBuf>, schema: I, defaults: D) -> RecordResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        D: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        defaults
            .into_iter()
            .fold(Self::builder(location).fields(schema), |builder, (name, value)| {
                builder.default_value(name, value)
            })
            .build()
    }

    /// Creates a strict record with no defaults.
    pub fn with_schema<I, S>(location: impl Into<PathBuf>, schema: I) -> RecordResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(location).fields(schema).build()
    }

    /// Starts building a record with a schema, defaults and configuration.
    pub fn builder(location: impl Into<PathBuf>) -> RecordBuilder {
        RecordBuilder::new(location)
    }

    /// Opens the record stored at `location` without loading its columns.
    ///
    /// Fails unless a readable bundle header exists at the bundle path.
    pub fn probe(location: impl Into<PathBuf>, config: &StoreConfig) -> RecordResult<Self> {
        let mut record = Self::open(location);
        record.config = config.clone();
        BundleReader::probe(&record.bundle_path())?;
        Ok(record)
    }

    /// Storage location this record was created with
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// File the record saves to and loads from: the location with the
    /// configured extension appended unless it is already there.
    pub fn bundle_path(&self) -> PathBuf {
        let suffix = self.config.suffix();
        if self.location.as_os_str().to_string_lossy().ends_with(&suffix) {
            return self.location.clone();
        }
        let mut path = self.location.as_os_str().to_owned();
        path.push(&suffix);
        PathBuf::from(path)
    }

    /// Declared schema; empty for non-strict records
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// True when a schema was declared
    pub fn is_strict(&self) -> bool {
        !self.schema.is_empty()
    }

    /// Registered default for `field`, if any
    pub fn default_for(&self, field: &str) -> Option<&Value> {
        self.defaults.get(field).ok()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of completed appends (or the longest loaded column)
    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Column names in registration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.entries().iter().map(|(name, _)| name.as_str())
    }

    /// Columns in registration order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns
            .entries()
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Full column for `name`.
    ///
    /// # Errors
    ///
    /// `UnknownField` if the record has no such column.
    pub fn get_field(&self, name: &str) -> RecordResult<&[Value]> {
        self.columns
            .get(name)
            .ok_or_else(|| RecordError::unknown_field(name))
    }

    /// Adds one row.
    ///
    /// # Errors
    ///
    /// - `MissingFieldNoDefault`: strict, a declared field is missing or
    ///   absent and has no default
    /// - `UnknownField`: strict, the row names undeclared fields
    /// - `InvalidFieldName`: non-strict, a name cannot be stored
    /// - `UnknownKey`: the column set is locked (after `load`) and the row
    ///   names a field outside it
    ///
    /// On error nothing is appended and `len()` is unchanged.
    pub fn append(&mut self, row: Row) -> RecordResult<()> {
        let cells = if self.is_strict() {
            self.resolve_strict(row)?
        } else {
            resolve_open(row)?
        };
        self.columns.push_cells(cells)?;
        self.row_count += 1;
        Ok(())
    }

    /// Maps a row onto the schema, substituting defaults.
    fn resolve_strict(&self, mut row: Row) -> RecordResult<Vec<(String, Value)>> {
        let mut cells = Vec::with_capacity(self.schema.len());
        for field in &self.schema {
            let value = match row.take(field) {
                Some(Slot::Value(value)) => value,
                Some(Slot::Absent) | None => match self.defaults.get(field.as_str()) {
                    Ok(default) => default.clone(),
                    Err(_) => return Err(RecordError::MissingFieldNoDefault(field.clone())),
                },
            };
            cells.push((field.clone(), value));
        }

        if !row.is_empty() {
            return Err(RecordError::UnknownField(
                row.names().map(str::to_string).collect(),
            ));
        }
        Ok(cells)
    }

    /// Writes every column to the bundle file.
    ///
    /// # Errors
    ///
    /// Bundle write failures (`TABREC_ARCHIVE_WRITE_FAILED`).
    pub fn save(&self) -> RecordResult<()> {
        let path = self.bundle_path();
        let result = BundleWriter::new(&path)
            .compressed(self.config.compressed)
            .write(self.columns());

        let path_str = path.display().to_string();
        match result {
            Ok(header) => {
                log_event_with_fields(
                    Event::RecordSaved,
                    &[
                        ("path", &path_str),
                        ("rows", &self.row_count.to_string()),
                        ("fields", &self.columns.entries().len().to_string()),
                        ("payload_bytes", &header.payload_len.to_string()),
                    ],
                );
                Ok(())
            }
            Err(e) => {
                log_event_with_fields(
                    Event::RecordSaveFailed,
                    &[("path", &path_str), ("error", &e.to_string())],
                );
                Err(e.into())
            }
        }
    }

    /// Replaces the in-memory columns with the bundle contents.
    ///
    /// The loaded column set is locked. `len()` becomes the longest column.
    /// The declared schema is kept but not checked against the bundle.
    ///
    /// # Errors
    ///
    /// Bundle read or verification failures; the record is unchanged.
    pub fn load(&mut self) -> RecordResult<()> {
        let path = self.bundle_path();
        let path_str = path.display().to_string();

        let loaded = BundleReader::open(&path).and_then(|reader| reader.columns());
        let columns = match loaded {
            Ok(columns) => columns,
            Err(e) => {
                log_event_with_fields(
                    Event::RecordLoadFailed,
                    &[("path", &path_str), ("error", &e.to_string())],
                );
                return Err(e.into());
            }
        };

        self.row_count = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        self.columns = Columns::Locked(KeyLockedMap::new(columns));

        log_event_with_fields(
            Event::RecordLoaded,
            &[
                ("path", &path_str),
                ("rows", &self.row_count.to_string()),
                ("fields", &self.columns.entries().len().to_string()),
            ],
        );
        Ok(())
    }

    /// Iterates rows in order.
    ///
    /// Each row holds one value per column, in registration order. A
    /// non-strict column shorter than `len()` yields `Null` past its end.
    pub fn iter(&self) -> Rows<'_> {
        Rows::new(self.columns.entries(), self.row_count)
    }
}

/// Collects present cells of a non-strict row; absent slots are omissions.
fn resolve_open(row: Row) -> RecordResult<Vec<(String, Value)>> {
    let mut cells = Vec::with_capacity(row.len());
    for (name, slot) in row {
        if validate_entry_name(&name).is_err() {
            return Err(RecordError::InvalidFieldName(name));
        }
        if let Slot::Value(value) = slot {
            cells.push((name, value));
        }
    }
    Ok(cells)
}

impl<'a> IntoIterator for &'a Record {
    type Item = Vec<&'a Value>;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Structural equality.
///
/// Same column names (order-independent), and for each column the same
/// length and deep-equal values row by row. Location, schema and
/// configuration are not compared.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        let ours = self.columns.entries();
        if ours.len() != other.columns.entries().len() {
            return false;
        }
        ours.iter().all(|(name, values)| match other.columns.get(name) {
            Some(theirs) => {
                values.len() == theirs.len()
                    && values.iter().zip(theirs).all(|(a, b)| a.deep_eq(b))
            }
            None => false,
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record size={}", self.row_count)?;
        for (i, (name, values)) in self.columns().enumerate() {
            f.write_str(if i == 0 { " " } else { "; " })?;
            write!(f, "{}={}", name, Value::Array(values.to_vec()))?;
        }
        Ok(())
    }
}

/// Builder for strict records.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    location: PathBuf,
    schema: Vec<String>,
    defaults: Vec<(String, Value)>,
    config: StoreConfig,
}

impl RecordBuilder {
    fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            schema: Vec::new(),
            defaults: Vec::new(),
            config: StoreConfig::default(),
        }
    }

    /// Declares a field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.schema.push(name.into());
        self
    }

    /// Declares several fields.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares a field with a default value.
    pub fn field_with_default(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        let name = name.into();
        self.field(name.clone()).default_value(name, default)
    }

    /// Registers a default for a declared field.
    pub fn default_value(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.defaults.push((name.into(), default.into()));
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the record.
    ///
    /// Repeated field names collapse to their first occurrence.
    ///
    /// # Errors
    ///
    /// - `InvalidFieldName` if a field name cannot be stored
    /// - `UnknownField` if a default names an undeclared field
    pub fn build(self) -> RecordResult<Record> {
        let mut schema: Vec<String> = Vec::with_capacity(self.schema.len());
        for name in self.schema {
            if validate_entry_name(&name).is_err() {
                return Err(RecordError::InvalidFieldName(name));
            }
            if !schema.contains(&name) {
                schema.push(name);
            }
        }

        let undeclared: Vec<String> = self
            .defaults
            .iter()
            .filter(|(name, _)| !schema.contains(name))
            .map(|(name, _)| name.clone())
            .collect();
        if !undeclared.is_empty() {
            return Err(RecordError::UnknownField(undeclared));
        }

        let columns = if schema.is_empty() {
            Columns::Open(OpenColumns::default())
        } else {
            Columns::Locked(KeyLockedMap::new(
                schema.iter().map(|name| (name.clone(), Vec::new())),
            ))
        };

        Ok(Record {
            location: self.location,
            schema,
            defaults: KeyLockedMap::new(self.defaults),
            columns,
            row_count: 0,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> Record {
        Record::builder("unused")
            .field("x")
            .field_with_default("ys", vec![0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_record_is_empty() {
        let record = Record::with_schema("unused", ["a", "b", "c"]).unwrap();
        assert_eq!(record.len(), 0);
        assert!(record.is_strict());
        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_field_leaves_record_unchanged() {
        let mut record = strict();
        let err = record.append(Row::new().with("ys", vec![1])).unwrap_err();
        assert!(matches!(err, RecordError::MissingFieldNoDefault(ref f) if f == "x"));
        assert_eq!(record.len(), 0);
        assert!(record.get_field("ys").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_field_is_atomic() {
        let mut record = strict();
        let err = record
            .append(Row::new().with("x", 1).with("zz", 2).with("qq", 3))
            .unwrap_err();
        match err {
            RecordError::UnknownField(names) => assert_eq!(names, vec!["zz", "qq"]),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(record.len(), 0);
        assert!(record.get_field("x").unwrap().is_empty());
    }

    #[test]
    fn test_absent_and_omitted_use_default() {
        let mut record = strict();
        record.append(Row::new().with("x", 1).absent("ys")).unwrap();
        record.append(Row::new().with("x", 2)).unwrap();
        assert_eq!(
            record.get_field("ys").unwrap(),
            &[Value::from(vec![0]), Value::from(vec![0])]
        );
    }

    #[test]
    fn test_null_is_stored_not_defaulted() {
        let mut record = strict();
        record.append(Row::new().with("x", 1).with("ys", Value::Null)).unwrap();
        assert_eq!(record.get_field("ys").unwrap(), &[Value::Null]);
    }

    #[test]
    fn test_new_registers_defaults() {
        let mut record = Record::new("unused", ["a", "b"], [("b", 0)]).unwrap();
        assert_eq!(record.default_for("b"), Some(&Value::Int(0)));
        assert_eq!(record.default_for("a"), None);

        record.append(Row::new().with("a", 1)).unwrap();
        assert_eq!(record.get_field("b").unwrap(), &[Value::Int(0)]);

        assert!(matches!(
            Record::new("unused", Vec::<String>::new(), [("x", 1)]),
            Err(RecordError::UnknownField(_))
        ));
    }

    #[test]
    fn test_probe_requires_bundle() {
        let temp = tempfile::TempDir::new().unwrap();
        let location = temp.path().join("r");
        assert!(Record::probe(&location, &StoreConfig::default()).is_err());

        let mut record = Record::open(&location);
        record.append(Row::new().with("v", 1)).unwrap();
        record.save().unwrap();

        let probed = Record::probe(&location, &StoreConfig::default()).unwrap();
        assert_eq!(probed.len(), 0);
        assert_eq!(probed.bundle_path(), record.bundle_path());
    }

    #[test]
    fn test_default_for_undeclared_field_rejected() {
        let err = Record::builder("unused")
            .field("a")
            .default_value("b", 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, RecordError::UnknownField(_)));
    }

    #[test]
    fn test_duplicate_schema_names_collapse() {
        let record = Record::with_schema("unused", ["a", "b", "a"]).unwrap();
        assert_eq!(record.schema(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_invalid_field_names_rejected() {
        assert!(matches!(
            Record::with_schema("unused", ["a/b"]),
            Err(RecordError::InvalidFieldName(_))
        ));

        let mut record = Record::open("unused");
        let err = record.append(Row::new().with("ok", 1).with("dtype", 2)).unwrap_err();
        assert!(matches!(err, RecordError::InvalidFieldName(ref n) if n == "dtype"));
        assert_eq!(record.len(), 0);
        assert_eq!(record.field_names().count(), 0);
    }

    #[test]
    fn test_non_strict_columns_diverge() {
        let mut record = Record::open("unused");
        record
            .append(Row::new().with("ecg", vec![123, 4, 5]).with("x", 42).with("y", 12.12))
            .unwrap();
        record.append(Row::new().with("x", 43)).unwrap();
        record.append(Row::new().absent("x")).unwrap();

        assert_eq!(record.len(), 3);
        assert_eq!(record.get_field("ecg").unwrap().len(), 1);
        assert_eq!(record.get_field("x").unwrap().len(), 2);

        let rows: Vec<_> = record.iter().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![&Value::Null, &Value::Int(43), &Value::Null]);
    }

    #[test]
    fn test_get_field_unknown() {
        let record = strict();
        assert!(matches!(
            record.get_field("nope"),
            Err(RecordError::UnknownField(ref n)) if n == &vec!["nope".to_string()]
        ));
    }

    #[test]
    fn test_bundle_path_appends_extension_once() {
        assert_eq!(
            Record::open("/data/r1").bundle_path(),
            PathBuf::from("/data/r1.trb")
        );
        assert_eq!(
            Record::open("/data/r1.trb").bundle_path(),
            PathBuf::from("/data/r1.trb")
        );
    }

    #[test]
    fn test_equality_ignores_column_order() {
        let mut a = Record::open("a");
        let mut b = Record::open("b");
        a.append(Row::new().with("p", 1).with("q", 2.0)).unwrap();
        b.append(Row::new().with("q", 2).with("p", 1)).unwrap();
        assert_eq!(a, b);

        b.append(Row::new().with("p", 1).with("q", 2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let mut record = strict();
        record.append(Row::new().with("x", 1).with("ys", vec![1, 2])).unwrap();
        assert_eq!(record.to_string(), "Record size=1 x=[1]; ys=[[1, 2]]");
    }
}
