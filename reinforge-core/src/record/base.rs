//! Key-value records.
use crate::error::ReinforgeError;
use chrono::prelude::{DateTime, Local};
use std::collections::{hash_map::Iter, HashMap};

/// Possible types of values stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically a metric.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A text value, such as a path or an action name.
    String(String),
}

/// A container of key-value pairs of [`RecordValue`]s.
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// Values of `record` overwrite values of `self` with the same key.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, ReinforgeError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(ReinforgeError::RecordValueTypeError("Scalar".to_string())),
            None => Err(ReinforgeError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a timestamp from the record.
    pub fn get_datetime(&self, k: &str) -> Result<DateTime<Local>, ReinforgeError> {
        match self.0.get(k) {
            Some(RecordValue::DateTime(t)) => Ok(*t),
            Some(_) => Err(ReinforgeError::RecordValueTypeError("DateTime".to_string())),
            None => Err(ReinforgeError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, ReinforgeError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(ReinforgeError::RecordValueTypeError("String".to_string())),
            None => Err(ReinforgeError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns `true` if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}
