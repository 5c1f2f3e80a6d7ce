//! Parameter encoding for the provider's query and body formats.
//!
//! Plain keys pass through. Filter keys written as `filter.<field>.<bound>`
//! or `filter.<field>` become `filter[field][bound]` / `filter[field]`.
//! Null values are dropped, arrays expand to one pair per element.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};

static FILTER_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^filter\.([^.\[\]]+)(?:\.([^.\[\]]+))?$").expect("filter key pattern is valid")
});

/// Ordered parameter mapping handed to the executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    entries: Vec<(String, Value)>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from any struct or map that serializes to a JSON object.
    ///
    /// Field order follows serialization order.
    pub fn from_serializable<T: Serialize + ?Sized>(params: &T) -> ClientResult<Self> {
        match serde_json::to_value(params)? {
            Value::Object(map) => Ok(Self::from(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ClientError::invalid_input(format!(
                "parameters must serialize to an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Insert or replace a value. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove and return a value, e.g. when it is consumed by a path segment.
    pub fn take(&mut self, key: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Map<String, Value>> for ParameterBag {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (k, v) in iter {
            bag.insert(k, v);
        }
        bag
    }
}

/// Wire form of a bag: ordered key/value pairs, repeated keys for arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedQuery {
    pairs: Vec<(String, String)>,
}

impl EncodedQuery {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All values emitted under `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// `application/x-www-form-urlencoded` rendering, usable as a query string
    /// or a form body.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

impl IntoIterator for EncodedQuery {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

/// Rewrite `filter.a.b` / `filter.a` into bracket form; anything else is returned as-is.
pub fn rewrite_key(key: &str) -> String {
    match FILTER_KEY.captures(key) {
        Some(caps) => match caps.get(2) {
            Some(bound) => format!("filter[{}][{}]", &caps[1], bound.as_str()),
            None => format!("filter[{}]", &caps[1]),
        },
        None => key.to_string(),
    }
}

/// Encode a bag into ordered wire pairs.
pub fn encode(bag: &ParameterBag) -> EncodedQuery {
    let mut pairs = Vec::with_capacity(bag.len());
    for (key, value) in bag.iter() {
        match value {
            Value::Null => continue,
            Value::Array(items) => {
                let key = rewrite_key(key);
                pairs.extend(
                    items
                        .iter()
                        .filter_map(scalar_to_string)
                        .map(|v| (key.clone(), v)),
                );
            }
            scalar => {
                if let Some(v) = scalar_to_string(scalar) {
                    pairs.push((rewrite_key(key), v));
                }
            }
        }
    }
    EncodedQuery { pairs }
}

/// Encode a bag as a JSON object body with the same key and null rules.
///
/// Arrays stay JSON arrays (minus null elements) instead of repeated keys.
pub fn encode_json(bag: &ParameterBag) -> Map<String, Value> {
    let mut body = Map::new();
    for (key, value) in bag.iter() {
        let value = match value {
            Value::Null => continue,
            Value::Array(items) => {
                Value::Array(items.iter().filter(|v| !v.is_null()).cloned().collect())
            }
            other => other.clone(),
        };
        body.insert(rewrite_key(key), value);
    }
    body
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Nested structures have no bracket form on this API; send them as compact JSON.
        other => Some(other.to_string()),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
