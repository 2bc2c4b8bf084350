//! Mapping with a key set fixed at construction
//!
//! Values may be replaced or mutated in place, but no key can ever be added
//! or removed. Strict records keep their columns and defaults in one of
//! these so a misspelled field name is rejected instead of silently creating
//! a new column.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::errors::{RecordError, RecordResult};

/// A map whose key set never changes after construction.
///
/// Iteration follows construction order.
#[derive(Debug, Clone)]
pub struct KeyLockedMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> KeyLockedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Fixes the key set to the keys of `initial`.
    ///
    /// A key repeated in `initial` keeps its first position and its last value.
    pub fn new(initial: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut entries: Vec<(K, V)> = Vec::new();
        let mut index: HashMap<K, usize> = HashMap::new();
        for (key, value) in initial {
            match index.get(&key) {
                Some(&pos) => entries[pos].1 = value,
                None => {
                    index.insert(key.clone(), entries.len());
                    entries.push((key, value));
                }
            }
        }
        Self { entries, index }
    }

    /// Returns the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> RecordResult<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        match self.index.get(key) {
            Some(&pos) => Ok(&self.entries[pos].1),
            None => Err(RecordError::UnknownKey(key.to_string())),
        }
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> RecordResult<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        match self.index.get(key) {
            Some(&pos) => Ok(&mut self.entries[pos].1),
            None => Err(RecordError::UnknownKey(key.to_string())),
        }
    }

    /// Replaces the value for an existing key.
    ///
    /// # Errors
    ///
    /// `UnknownKey` if `key` is outside the fixed key set; the map is unchanged.
    pub fn set<Q>(&mut self, key: &Q, value: V) -> RecordResult<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        *self.get_mut(key)? = value;
        Ok(())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn items(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Entries in construction order.
    pub fn as_slice(&self) -> &[(K, V)] {
        &self.entries
    }
}

impl<K, V> FromIterator<(K, V)> for KeyLockedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<K, V> Default for KeyLockedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    fn sample() -> KeyLockedMap<String, Value> {
        KeyLockedMap::new([
            ("a".to_string(), Value::from(vec![1, 2, 3, 4])),
            ("b".to_string(), Value::from(5)),
        ])
    }

    #[test]
    fn test_write_to_unknown_key_fails() {
        let mut map = sample();
        let err = map.set("c", Value::from(12)).unwrap_err();
        assert!(matches!(err, RecordError::UnknownKey(ref k) if k == "c"));
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("c"));
    }

    #[test]
    fn test_write_to_known_key_updates() {
        let mut map = sample();
        map.set("a", Value::from(vec![9])).unwrap();
        assert_eq!(map.get("a").unwrap(), &Value::from(vec![9]));
    }

    #[test]
    fn test_get_unknown_key_fails() {
        let map = sample();
        assert!(matches!(map.get("zz"), Err(RecordError::UnknownKey(_))));
    }

    #[test]
    fn test_iteration_follows_construction_order() {
        let map: KeyLockedMap<&str, i32> = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_initial_key_keeps_first_position() {
        let map = KeyLockedMap::new([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(map.items().collect::<Vec<_>>(), vec![(&"a", &3), (&"b", &2)]);
    }

    #[test]
    fn test_get_mut_appends_in_place() {
        let mut map = KeyLockedMap::new([("col".to_string(), Vec::<i32>::new())]);
        map.get_mut("col").unwrap().push(7);
        assert_eq!(map.get("col").unwrap(), &vec![7]);
    }
}
