//! Cell values and append rows
//!
//! A column holds one [`Value`] per row. Values are heterogeneous and arrays
//! may be ragged: `[[1, 2], [3]]` and `[1, "a", [2.5]]` are both valid cells.
//!
//! [`Slot::Absent`] is the explicit "use the default" marker. It is distinct
//! from [`Value::Null`], which is ordinary data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null data
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Ordered, possibly ragged, possibly nested array
    Array(Vec<Value>),
}

impl Value {
    /// Element count for arrays, character count for strings, 1 otherwise.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Str(s) => s.chars().count(),
            _ => 1,
        }
    }

    /// True for empty arrays and empty strings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the i-th element of an array value.
    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Returns the elements of an array value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Deep element-wise comparison.
    ///
    /// Unlike `==`, integers and floats compare by numeric value
    /// (`Int(1)` equals `Float(1.0)`). NaN never equals anything.
    pub fn deep_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_eq(y))
            }
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::Array(items.iter().cloned().map(Into::into).collect())
    }
}

/// A field slot in an append row: a value, or the explicit absence marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Store this value
    Value(Value),
    /// Substitute the field default (strict mode) or skip (non-strict mode)
    Absent,
}

impl From<Value> for Slot {
    fn from(v: Value) -> Self {
        Slot::Value(v)
    }
}

/// One logical row passed to [`Record::append`](super::Record::append).
///
/// Field order is insertion order. Setting a field twice replaces the
/// earlier slot in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    slots: Vec<(String, Slot)>,
}

impl Row {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Row::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder form of [`Row::set_absent`].
    pub fn absent(mut self, name: impl Into<String>) -> Self {
        self.set_absent(name);
        self
    }

    /// Sets a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.set_slot(name, Slot::Value(value.into()));
    }

    /// Marks a field as explicitly absent.
    pub fn set_absent(&mut self, name: impl Into<String>) {
        self.set_slot(name, Slot::Absent);
    }

    /// Sets a field slot.
    pub fn set_slot(&mut self, name: impl Into<String>, slot: Slot) {
        let name = name.into();
        match self.slots.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = slot,
            None => self.slots.push((name, slot)),
        }
    }

    /// Removes and returns the slot for `name`.
    pub fn take(&mut self, name: &str) -> Option<Slot> {
        let pos = self.slots.iter().position(|(n, _)| n == name)?;
        Some(self.slots.remove(pos).1)
    }

    /// Field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(n, _)| n.as_str())
    }

    /// Number of fields in the row
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = (String, Slot);
    type IntoIter = std::vec::IntoIter<(String, Slot)>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}
