use crate::manifest::error::ManifestResult;
use log::warn;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::borrow::Cow;
use std::fmt;

/// A leaf value of the decoded manifest.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(value) => Some(value),
            _ => None,
        }
    }

    /// Attribute text for this scalar, `None` for null.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(flag) => Some(Cow::Borrowed(if *flag { "true" } else { "false" })),
            Scalar::Integer(num) => Some(Cow::Owned(num.to_string())),
            // Display prints integral floats without a fraction, `21.0` becomes `21`.
            Scalar::Float(num) => Some(Cow::Owned(num.to_string())),
            Scalar::String(text) => Some(Cow::Borrowed(text)),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

/// One value in the decoded manifest: a scalar, a single child object or a list of
/// child objects.
#[derive(Clone, Debug, PartialEq)]
pub enum ManifestValue {
    Scalar(Scalar),
    Node(ManifestNode),
    Sequence(Vec<ManifestNode>),
}

impl ManifestValue {
    /// Read a decoded manifest from JSON text, keeping the key order of every object.
    pub fn from_json(text: &str) -> ManifestResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert an already parsed JSON document.
    ///
    /// Key order is kept because the crate builds `serde_json` with `preserve_order`.
    pub fn from_json_value(value: serde_json::Value) -> ManifestResult<Self> {
        Ok(ManifestValue::deserialize(value)?)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            ManifestValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&ManifestNode> {
        match self {
            ManifestValue::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ManifestNode]> {
        match self {
            ManifestValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Short name of the value's shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ManifestValue::Scalar(Scalar::Null) => "null",
            ManifestValue::Scalar(_) => "scalar",
            ManifestValue::Node(_) => "object",
            ManifestValue::Sequence(_) => "array",
        }
    }
}

impl From<Scalar> for ManifestValue {
    fn from(value: Scalar) -> Self {
        ManifestValue::Scalar(value)
    }
}

impl From<&str> for ManifestValue {
    fn from(value: &str) -> Self {
        ManifestValue::Scalar(Scalar::String(value.to_owned()))
    }
}

impl From<String> for ManifestValue {
    fn from(value: String) -> Self {
        ManifestValue::Scalar(Scalar::String(value))
    }
}

impl From<bool> for ManifestValue {
    fn from(value: bool) -> Self {
        ManifestValue::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for ManifestValue {
    fn from(value: i64) -> Self {
        ManifestValue::Scalar(Scalar::Integer(value))
    }
}

impl From<i32> for ManifestValue {
    fn from(value: i32) -> Self {
        ManifestValue::Scalar(Scalar::Integer(i64::from(value)))
    }
}

impl From<f64> for ManifestValue {
    fn from(value: f64) -> Self {
        ManifestValue::Scalar(Scalar::Float(value))
    }
}

impl From<ManifestNode> for ManifestValue {
    fn from(value: ManifestNode) -> Self {
        ManifestValue::Node(value)
    }
}

impl From<Vec<ManifestNode>> for ManifestValue {
    fn from(value: Vec<ManifestNode>) -> Self {
        ManifestValue::Sequence(value)
    }
}

/// An object of the decoded manifest. Entries keep the order the decoder produced them
/// in, which is the order attributes and children are written back out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManifestNode {
    entries: Vec<(String, ManifestValue)>,
}

impl ManifestNode {
    pub fn new() -> Self {
        ManifestNode {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`ManifestNode::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ManifestValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`. An existing key keeps its position and takes the new value.
    ///
    /// Lookup is a linear scan, so building a node is quadratic in its key count. Manifest
    /// elements carry tens of keys at most.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ManifestValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&ManifestValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ManifestValue::as_str)
    }

    pub fn get_scalar(&self, key: &str) -> Option<&Scalar> {
        self.get(key).and_then(ManifestValue::as_scalar)
    }

    pub fn get_node(&self, key: &str) -> Option<&ManifestNode> {
        self.get(key).and_then(ManifestValue::as_node)
    }

    pub fn get_sequence(&self, key: &str) -> Option<&[ManifestNode]> {
        self.get(key).and_then(ManifestValue::as_sequence)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &ManifestValue)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

struct ManifestValueVisitor;

impl<'de> Visitor<'de> for ManifestValueVisitor {
    type Value = ManifestValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decoded manifest value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(ManifestValue::from(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(ManifestValue::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(match i64::try_from(value) {
            Ok(num) => ManifestValue::from(num),
            Err(_) => ManifestValue::from(value as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(ManifestValue::from(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(ManifestValue::from(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(ManifestValue::from(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ManifestValue::Scalar(Scalar::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ManifestValue::Scalar(Scalar::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        ManifestValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        let mut index = 0usize;
        while let Some(item) = seq.next_element::<ManifestValue>()? {
            match item {
                ManifestValue::Node(node) => items.push(node),
                other => warn!(
                    "Dropping array item {index}: expected an object, found {}",
                    other.kind()
                ),
            }
            index += 1;
        }
        Ok(ManifestValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut node = ManifestNode::new();
        while let Some((key, value)) = map.next_entry::<String, ManifestValue>()? {
            node.insert(key, value);
        }
        Ok(ManifestValue::Node(node))
    }
}

impl<'de> Deserialize<'de> for ManifestValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ManifestValueVisitor)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(flag) => serializer.serialize_bool(*flag),
            Scalar::Integer(num) => serializer.serialize_i64(*num),
            Scalar::Float(num) => serializer.serialize_f64(*num),
            Scalar::String(text) => serializer.serialize_str(text),
        }
    }
}

impl Serialize for ManifestNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for ManifestValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ManifestValue::Scalar(scalar) => scalar.serialize(serializer),
            ManifestValue::Node(node) => node.serialize(serializer),
            ManifestValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_key_order() {
        let value = ManifestValue::from_json(
            r#"{"package":"com.example","versionCode":3,"usesSdk":{"minSdkVersion":21},"debuggable":false}"#,
        )
        .expect("parse manifest json");
        let node = value.as_node().expect("object root");
        let keys: Vec<&str> = node.entries().map(|(key, _)| key).collect();
        assert_eq!(keys, ["package", "versionCode", "usesSdk", "debuggable"]);
        assert_eq!(node.get_scalar("versionCode"), Some(&Scalar::Integer(3)));
        assert_eq!(node.get_scalar("debuggable"), Some(&Scalar::Bool(false)));
    }

    #[test]
    fn json_value_keeps_key_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"zeta":1,"alpha":2}"#).expect("parse json");
        let value = ManifestValue::from_json_value(json).expect("convert value");
        let keys: Vec<&str> = value
            .as_node()
            .expect("object root")
            .entries()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn non_object_array_items_are_dropped() {
        let value = ManifestValue::from_json(r#"{"actions":[{"name":"a"}, "b", 3, [1], {"name":"c"}]}"#)
            .expect("parse manifest json");
        let actions = value
            .as_node()
            .and_then(|node| node.get_sequence("actions"))
            .expect("actions array");
        let names: Vec<&str> = actions.iter().filter_map(|n| n.get_str("name")).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn null_and_float_scalars() {
        let value = ManifestValue::from_json(r#"{"icon":null,"glEsVersion":2.0,"ratio":1.5}"#)
            .expect("parse manifest json");
        let node = value.as_node().expect("object root");
        assert!(node.get_scalar("icon").expect("icon").is_null());
        assert_eq!(node.get_scalar("icon").and_then(Scalar::to_text), None);
        assert_eq!(
            node.get_scalar("glEsVersion").and_then(Scalar::to_text).as_deref(),
            Some("2")
        );
        assert_eq!(node.get_scalar("ratio").map(|s| s.to_string()).as_deref(), Some("1.5"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let node = ManifestNode::new()
            .with("a", 1)
            .with("b", 2)
            .with("a", "three");
        let entries: Vec<(&str, &ManifestValue)> = node.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("a", &ManifestValue::from("three")));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(ManifestValue::from_json("{\"package\":").is_err());
    }

    #[test]
    fn serializes_back_in_order() {
        let node = ManifestNode::new()
            .with("package", "com.example")
            .with("activities", vec![ManifestNode::new().with("name", ".Main")]);
        let text = serde_json::to_string(&ManifestValue::from(node)).expect("to json");
        assert_eq!(text, r#"{"package":"com.example","activities":[{"name":".Main"}]}"#);
    }
}
