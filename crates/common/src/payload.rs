//! Nested key/value payloads
//!
//! Requests and responses share one shape: named scalar fields, optionally
//! grouped into named sub-groups or lists. On the wire this is a JSON object.
//!
//! Non-string JSON scalars are accepted on the way in and kept as their JSON
//! text (`1` becomes the leaf `"1"`, `true` becomes `"true"`); `null` becomes
//! an empty leaf. Everything leaves as a string.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One node of a payload tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A scalar field value
    Leaf(String),
    /// Named children; keys are unique, insertion order is kept
    Mapping(Mapping),
    /// Unnamed children in order
    List(Vec<Payload>),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Mapping(Mapping::new())
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Leaf(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Leaf(value)
    }
}

impl From<Mapping> for Payload {
    fn from(value: Mapping) -> Self {
        Payload::Mapping(value)
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(value: Vec<Payload>) -> Self {
        Payload::List(value)
    }
}

impl<K, V> FromIterator<(K, V)> for Payload
where
    K: Into<String>,
    V: Into<Payload>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Payload::Mapping(iter.into_iter().collect())
    }
}

impl Payload {
    /// The leaf value, if this node is a leaf
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Payload::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// The mapping, if this node is a mapping
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Payload::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Look up a direct child of a mapping node
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.as_mapping().and_then(|mapping| mapping.get(key))
    }

    /// Look up a node by dotted path, e.g. `Record.0.Balance`
    ///
    /// Numeric segments index into lists.
    pub fn pointer(&self, path: &str) -> Option<&Payload> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |node, segment| match node {
            Payload::Mapping(mapping) => mapping.get(segment),
            Payload::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Payload::Leaf(_) => None,
        })
    }

    /// Every leaf with its dotted path, in tree order
    pub fn leaves(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_leaves(self, &mut path, &mut out);
        out
    }
}

fn collect_leaves<'a>(node: &'a Payload, path: &mut Vec<String>, out: &mut Vec<(String, &'a str)>) {
    match node {
        Payload::Leaf(value) => out.push((path.join("."), value.as_str())),
        Payload::Mapping(mapping) => {
            for (key, child) in mapping.iter() {
                path.push(key.to_string());
                collect_leaves(child, path, out);
                path.pop();
            }
        }
        Payload::List(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                collect_leaves(child, path, out);
                path.pop();
            }
        }
    }
}

/// Named children of a payload node
///
/// Keys are unique: inserting an existing key replaces its value in place.
/// Equality ignores order, since the counterparty does.
#[derive(Debug, Clone, Default)]
pub struct Mapping(Vec<(String, Payload)>);

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl Eq for Mapping {}

impl<K, V> FromIterator<(K, V)> for Mapping
where
    K: Into<String>,
    V: Into<Payload>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Payload);
    type IntoIter = std::vec::IntoIter<(String, Payload)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Mapping {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a field, returning the previous value for that key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Payload>) -> Option<Payload> {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Payload)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Payload::Leaf(value) => serializer.serialize_str(value),
            Payload::Mapping(mapping) => mapping.serialize(serializer),
            Payload::List(items) => serializer.collect_seq(items),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PayloadVisitor;

        impl<'de> Visitor<'de> for PayloadVisitor {
            type Value = Payload;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar, a map or a sequence")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Payload, E> {
                Ok(Payload::Leaf(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Payload, E> {
                Ok(Payload::Leaf(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Payload, E> {
                Ok(Payload::Leaf(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Payload, E> {
                Ok(Payload::Leaf(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Payload, E> {
                Ok(Payload::Leaf(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Payload, E> {
                Ok(Payload::Leaf(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Payload, E> {
                Ok(Payload::Leaf(String::new()))
            }

            fn visit_none<E: de::Error>(self) -> Result<Payload, E> {
                Ok(Payload::Leaf(String::new()))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Payload, D::Error>
            where
                D: Deserializer<'de>,
            {
                Payload::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Payload, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element::<Payload>()? {
                    items.push(item);
                }
                Ok(Payload::List(items))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Payload, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut mapping = Mapping::new();
                while let Some((key, value)) = map.next_entry::<String, Payload>()? {
                    mapping.insert(key, value);
                }
                Ok(Payload::Mapping(mapping))
            }
        }

        deserializer.deserialize_any(PayloadVisitor)
    }
}
