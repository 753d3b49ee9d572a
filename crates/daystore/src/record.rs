//! Records and the date-keyed history that holds them.
//!
//! Both types keep their entries in observation order and serialize as plain
//! JSON objects. Deserialization is strict: values must be strings, keys must
//! be unique, and history keys must be canonical dates.

use crate::date::DateKey;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One day's observation: an open, ordered set of string fields.
///
/// The store never interprets the field names; producers are free to change
/// shape between versions.
#[derive(Debug, Clone, Default, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, keeping its position if it already exists. Returns the old value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

// Field order is presentation only; two records are equal when they map the
// same names to the same values.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Record {
    fn from(fields: [(K, V); N]) -> Self {
        fields.into_iter().collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of string fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    if record.get(&name).is_some() {
                        return Err(de::Error::custom(format!("duplicate field {name:?}")));
                    }
                    record.fields.push((name, value));
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Every recorded day, at most one record per date key.
///
/// Iteration follows insertion order. Use [`History::chronological`] when the
/// order of days matters.
#[derive(Debug, Clone, Default, Eq)]
pub struct History {
    entries: Vec<(DateKey, Record)>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: &DateKey) -> Option<&Record> {
        self.position(date).map(|i| &self.entries[i].1)
    }

    pub fn contains(&self, date: &DateKey) -> bool {
        self.position(date).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Entries<'_> {
        Entries {
            inner: self.entries.iter(),
        }
    }

    /// Entries sorted by date, oldest first.
    pub fn chronological(&self) -> Vec<(DateKey, &Record)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by_key(|(date, _)| *date);
        sorted
    }

    /// Inserts or fully replaces the record for `date`. A replaced day keeps its position.
    pub(crate) fn upsert(&mut self, date: DateKey, record: Record) -> Option<Record> {
        match self.position(&date) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, record)),
            None => {
                self.entries.push((date, record));
                None
            }
        }
    }

    fn position(&self, date: &DateKey) -> Option<usize> {
        self.entries.iter().position(|(d, _)| d == date)
    }
}

impl PartialEq for History {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(date, record)| other.get(&date) == Some(record))
    }
}

/// Later duplicates of a date replace earlier ones.
impl FromIterator<(DateKey, Record)> for History {
    fn from_iter<I: IntoIterator<Item = (DateKey, Record)>>(iter: I) -> Self {
        let mut history = History::new();
        for (date, record) in iter {
            history.upsert(date, record);
        }
        history
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = (DateKey, &'a Record);
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over `(date, record)` pairs in insertion order.
///
/// Cheap to clone; [`History::iter`] can be called again for a fresh pass.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    inner: std::slice::Iter<'a, (DateKey, Record)>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (DateKey, &'a Record);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(d, r)| (*d, r))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Entries<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(d, r)| (*d, r))
    }
}

impl ExactSizeIterator for Entries<'_> {}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (date, record) in &self.entries {
            map.serialize_entry(date, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for History {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HistoryVisitor;

        impl<'de> Visitor<'de> for HistoryVisitor {
            type Value = History;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping YYYY-MM-DD dates to records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<History, A::Error> {
                let mut history = History::new();
                while let Some(raw) = access.next_key::<String>()? {
                    let date = DateKey::parse(&raw).map_err(de::Error::custom)?;
                    if history.contains(&date) {
                        return Err(de::Error::custom(format!("duplicate date {raw:?}")));
                    }
                    let record = access.next_value::<Record>()?;
                    history.entries.push((date, record));
                }
                Ok(history)
            }
        }

        deserializer.deserialize_map(HistoryVisitor)
    }
}
