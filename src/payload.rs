//! Flat, ordered form payloads and the provider's literal encodings.

use log::debug;
use std::collections::BTreeMap;

/// Literal the provider expects for a boolean flag.
///
/// The provider parses `True`/`False`; lowercase is only accepted on fields
/// that document it explicitly.
pub fn flag(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// An ordered list of string key/value pairs, sent form-encoded or as a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    pairs: Vec<(String, String)>,
}

impl FormPayload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a recognized key, replacing an earlier value for the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Set a key only when a value is present.
    pub fn set_opt<V: Into<String>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    /// Copy caller-supplied provider parameters after the recognized keys.
    ///
    /// Keys already in the payload keep their encoded value.
    pub fn extend_passthrough(&mut self, extra: &BTreeMap<String, String>) {
        for (key, value) in extra {
            if self.contains(key) {
                debug!("Ignoring passthrough parameter {} that shadows a typed field", key);
                continue;
            }
            self.pairs.push((key.clone(), value.clone()));
        }
    }

    /// Value for a key, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a key is set.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The pairs in insertion order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render as `application/x-www-form-urlencoded`.
    pub fn to_form_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}
