//! Dynamic resource representation.
//!
//! A [`Resource`] is a typed bag of attribute values and loaded relations.
//! Its [`ResourceKind`] plays the part of a runtime type: the registry maps
//! kinds to entries and walks declared parents for kinds that are not
//! registered directly.

use crate::{HeronError, HeronResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Runtime type token of a resource, e.g. `Task`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(String);

impl ResourceKind {
    /// Creates a kind from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the kind name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for ResourceKind {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Declared value type of a resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// Signed 64-bit integer.
    Integer,
    /// Opaque string.
    String,
    /// UUID.
    Uuid,
}

impl IdType {
    /// Parses a wire identifier into this id type.
    ///
    /// `resource_type` only feeds the error message.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_core::{IdType, ResourceId};
    ///
    /// assert_eq!(IdType::Integer.parse("tasks", "12").unwrap(), ResourceId::Integer(12));
    /// assert!(IdType::Integer.parse("tasks", "twelve").is_err());
    /// ```
    pub fn parse(&self, resource_type: &str, raw: &str) -> HeronResult<ResourceId> {
        match self {
            Self::Integer => raw.parse::<i64>().map(ResourceId::Integer).map_err(|e| {
                HeronError::invalid_identifier(resource_type, raw, e.to_string())
            }),
            Self::String => {
                if raw.is_empty() {
                    Err(HeronError::invalid_identifier(
                        resource_type,
                        raw,
                        "identifier must not be empty",
                    ))
                } else {
                    Ok(ResourceId::String(raw.to_string()))
                }
            }
            Self::Uuid => Uuid::parse_str(raw)
                .map(ResourceId::Uuid)
                .map_err(|e| HeronError::invalid_identifier(resource_type, raw, e.to_string())),
        }
    }

    /// Parses every identifier in `raw`, stopping at the first failure.
    pub fn parse_all<'a>(
        &self,
        resource_type: &str,
        raw: impl IntoIterator<Item = &'a str>,
    ) -> HeronResult<Vec<ResourceId>> {
        raw.into_iter()
            .map(|id| self.parse(resource_type, id))
            .collect()
    }
}

/// Resource identifier value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// Integer identifier.
    Integer(i64),
    /// String identifier.
    String(String),
    /// UUID identifier.
    Uuid(Uuid),
}

impl ResourceId {
    /// Returns the id type of this value.
    #[must_use]
    pub const fn id_type(&self) -> IdType {
        match self {
            Self::Integer(_) => IdType::Integer,
            Self::String(_) => IdType::String,
            Self::Uuid(_) => IdType::Uuid,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(id) => write!(f, "{id}"),
            Self::String(id) => f.write_str(id),
            Self::Uuid(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        Self::Integer(id)
    }
}

impl From<i32> for ResourceId {
    fn from(id: i32) -> Self {
        Self::Integer(i64::from(id))
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::String(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self::String(id)
    }
}

impl From<Uuid> for ResourceId {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

/// Attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// `null`
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer or floating point number.
    Number(serde_json::Number),
    /// String.
    String(String),
    /// Ordered list.
    List(Vec<AttributeValue>),
    /// Nested object.
    Object(IndexMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns `true` for [`AttributeValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integral number.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<AttributeValue> for serde_json::Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => Self::Null,
            AttributeValue::Bool(b) => Self::Bool(b),
            AttributeValue::Number(n) => Self::Number(n),
            AttributeValue::String(s) => Self::String(s),
            AttributeValue::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            AttributeValue::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Declared type of an attribute field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// String values.
    String,
    /// Integral numbers.
    Integer,
    /// Any number.
    Number,
    /// Booleans.
    Boolean,
    /// Lists.
    List,
    /// Nested objects.
    Object,
    /// Anything.
    Any,
}

impl AttributeType {
    /// Returns `true` if `value` may be stored in a field of this type.
    ///
    /// `null` is accepted by every type.
    #[must_use]
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        match (self, value) {
            (_, AttributeValue::Null) | (Self::Any, _) => true,
            (Self::String, AttributeValue::String(_))
            | (Self::Number, AttributeValue::Number(_))
            | (Self::Boolean, AttributeValue::Bool(_))
            | (Self::List, AttributeValue::List(_))
            | (Self::Object, AttributeValue::Object(_)) => true,
            (Self::Integer, AttributeValue::Number(n)) => n.is_i64() || n.is_u64(),
            _ => false,
        }
    }
}

/// A loaded relation value.
///
/// A relationship that is absent from [`Resource::relationships`] is `null`
/// (not loaded, or set to nothing).
#[derive(Debug, Clone, PartialEq)]
pub enum RelationValue {
    /// To-one target.
    One(Box<Resource>),
    /// To-many targets.
    Many(Vec<Resource>),
}

impl RelationValue {
    /// Iterates over the targets.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        match self {
            Self::One(resource) => std::slice::from_ref(&**resource).iter(),
            Self::Many(resources) => resources.iter(),
        }
    }

    /// Iterates mutably over the targets.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Resource> {
        match self {
            Self::One(resource) => std::slice::from_mut(&mut **resource).iter_mut(),
            Self::Many(resources) => resources.iter_mut(),
        }
    }

    /// Returns `true` for an empty to-many relation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Many(items) if items.is_empty())
    }
}

/// A resource instance.
///
/// # Example
///
/// ```
/// use heron_core::{Resource, ResourceId};
///
/// let project = Resource::new("Project").with_id(2).with_attribute("name", "Heron");
/// let task = Resource::new("Task")
///     .with_id(1)
///     .with_attribute("name", "write docs")
///     .with_to_one("project", project);
///
/// assert_eq!(task.id(), Some(&ResourceId::Integer(1)));
/// assert_eq!(task.relation("project").unwrap().iter().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    kind: ResourceKind,
    id: Option<ResourceId>,
    attributes: IndexMap<String, AttributeValue>,
    relationships: IndexMap<String, RelationValue>,
}

impl Resource {
    /// Creates an empty resource of `kind` without an id.
    #[must_use]
    pub fn new(kind: impl Into<ResourceKind>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    /// Sets the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ResourceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets a to-one relation.
    #[must_use]
    pub fn with_to_one(mut self, field: impl Into<String>, target: Resource) -> Self {
        self.relationships
            .insert(field.into(), RelationValue::One(Box::new(target)));
        self
    }

    /// Sets a to-many relation.
    #[must_use]
    pub fn with_to_many(mut self, field: impl Into<String>, targets: Vec<Resource>) -> Self {
        self.relationships
            .insert(field.into(), RelationValue::Many(targets));
        self
    }

    /// Returns the runtime kind.
    #[must_use]
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Returns the id, if assigned.
    #[must_use]
    pub fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }

    /// Assigns the id.
    pub fn set_id(&mut self, id: ResourceId) {
        self.id = Some(id);
    }

    /// Returns all attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, AttributeValue> {
        &self.attributes
    }

    /// Returns one attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Sets one attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Returns all loaded relations.
    #[must_use]
    pub fn relationships(&self) -> &IndexMap<String, RelationValue> {
        &self.relationships
    }

    /// Returns one loaded relation.
    #[must_use]
    pub fn relation(&self, field: &str) -> Option<&RelationValue> {
        self.relationships.get(field)
    }

    /// Returns one loaded relation mutably.
    pub fn relation_mut(&mut self, field: &str) -> Option<&mut RelationValue> {
        self.relationships.get_mut(field)
    }

    /// Replaces a relation.
    pub fn set_relation(&mut self, field: impl Into<String>, value: RelationValue) {
        self.relationships.insert(field.into(), value);
    }

    /// Clears a relation back to `null`.
    pub fn clear_relation(&mut self, field: &str) -> Option<RelationValue> {
        self.relationships.shift_remove(field)
    }

    /// Returns the ids of the loaded targets of `field`.
    #[must_use]
    pub fn relation_ids(&self, field: &str) -> Vec<ResourceId> {
        self.relation(field)
            .map(|value| value.iter().filter_map(|r| r.id().cloned()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_id_parse_by_type() {
        assert_eq!(
            IdType::String.parse("users", "alice").unwrap(),
            ResourceId::from("alice")
        );
        let uuid = Uuid::now_v7();
        assert_eq!(
            IdType::Uuid.parse("users", &uuid.to_string()).unwrap(),
            ResourceId::Uuid(uuid)
        );
        assert!(IdType::Uuid.parse("users", "nope").is_err());
        assert!(IdType::String.parse("users", "").is_err());
    }

    #[test]
    fn test_parse_all_stops_at_failure() {
        let ids = IdType::Integer.parse_all("tasks", ["1", "2"]).unwrap();
        assert_eq!(ids, vec![ResourceId::Integer(1), ResourceId::Integer(2)]);

        let err = IdType::Integer.parse_all("tasks", ["1", "x"]).unwrap_err();
        assert!(matches!(err, HeronError::InvalidIdentifier { value, .. } if value == "x"));
    }

    #[test]
    fn test_attribute_type_accepts() {
        assert!(AttributeType::String.accepts(&"x".into()));
        assert!(!AttributeType::String.accepts(&AttributeValue::Bool(true)));
        assert!(AttributeType::Integer.accepts(&AttributeValue::from(3)));
        assert!(!AttributeType::Integer.accepts(&AttributeValue::from(serde_json::json!(1.5))));
        assert!(AttributeType::Number.accepts(&AttributeValue::from(serde_json::json!(1.5))));
        assert!(AttributeType::Boolean.accepts(&AttributeValue::Null));
        assert!(AttributeType::Any.accepts(&AttributeValue::from(serde_json::json!({"a": 1}))));
    }

    #[test]
    fn test_attribute_value_json_conversion() {
        let json = serde_json::json!({"tags": ["a", "b"], "done": false, "count": 2});
        let value = AttributeValue::from(json.clone());
        assert!(matches!(value, AttributeValue::Object(_)));
        assert_eq!(serde_json::Value::from(value), json);
    }

    #[test]
    fn test_attribute_value_serde_untagged() {
        let value: AttributeValue = serde_json::from_str("[1, \"two\", null]").unwrap();
        assert_eq!(
            value,
            AttributeValue::List(vec![
                AttributeValue::from(1),
                AttributeValue::from("two"),
                AttributeValue::Null
            ])
        );
    }

    #[test]
    fn test_relation_mutation() {
        let mut task = Resource::new("Task").with_id(1);
        assert!(task.relation("project").is_none());

        task.set_relation(
            "project",
            RelationValue::One(Box::new(Resource::new("Project").with_id(2))),
        );
        assert_eq!(task.relation_ids("project"), vec![ResourceId::Integer(2)]);

        task.clear_relation("project");
        assert!(task.relation_ids("project").is_empty());
    }

    #[test]
    fn test_relation_value_iter_mut() {
        let mut value = RelationValue::Many(vec![Resource::new("User"), Resource::new("User")]);
        for (i, user) in value.iter_mut().enumerate() {
            user.set_id(ResourceId::Integer(i as i64));
        }
        let ids: Vec<_> = value.iter().filter_map(Resource::id).cloned().collect();
        assert_eq!(ids, vec![ResourceId::Integer(0), ResourceId::Integer(1)]);
        assert!(!value.is_empty());
        assert!(RelationValue::Many(vec![]).is_empty());
    }

    proptest! {
        #[test]
        fn test_integer_id_round_trip(id in any::<i64>()) {
            let rendered = ResourceId::Integer(id).to_string();
            prop_assert_eq!(IdType::Integer.parse("tasks", &rendered).unwrap(), ResourceId::Integer(id));
        }

        #[test]
        fn test_string_id_round_trip(id in "[a-zA-Z0-9_-]{1,24}") {
            let rendered = ResourceId::String(id.clone()).to_string();
            prop_assert_eq!(IdType::String.parse("users", &rendered).unwrap(), ResourceId::String(id));
        }
    }
}
