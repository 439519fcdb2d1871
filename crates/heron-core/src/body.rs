//! Parsed request bodies.
//!
//! The `data` member of a request body is either one resource object
//! (possibly `null`) or an array of them. Controllers check that shape
//! against what the operation expects before doing anything else.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// A `{type, id}` pair identifying a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// Protocol type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Identifier rendered as a string.
    pub id: String,
}

impl ResourceIdentifier {
    /// Creates an identifier.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// Linkage carried by a relationship in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    /// To-many linkage (possibly empty).
    Many(Vec<ResourceIdentifier>),
    /// To-one linkage.
    One(ResourceIdentifier),
}

/// One relationship member of a resource object in a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipBody {
    /// Linkage; `None` for `null`.
    #[serde(default)]
    pub data: Option<Linkage>,
}

/// One resource object in a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBody {
    /// Protocol type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Client-supplied id, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Attribute values.
    #[serde(default)]
    pub attributes: IndexMap<String, serde_json::Value>,
    /// Relationship linkages.
    #[serde(default)]
    pub relationships: IndexMap<String, RelationshipBody>,
}

impl DataBody {
    /// Creates a resource object of `resource_type`.
    #[must_use]
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: None,
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    /// Returns this object as an identifier, when it carries an id.
    #[must_use]
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .as_ref()
            .map(|id| ResourceIdentifier::new(&self.resource_type, id))
    }
}

/// The `data` member of a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyData {
    /// An array of resource objects.
    Multiple(Vec<DataBody>),
    /// A single resource object, or `null`.
    Single(Option<DataBody>),
}

impl BodyData {
    /// Returns `true` for an array.
    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }
}

/// A parsed request body.
///
/// A missing `data` key and `"data": null` are distinguished: the former is
/// `data == None`, the latter `Some(BodyData::Single(None))`.
///
/// # Example
///
/// ```rust
/// use heron_core::{BodyData, RequestBody};
///
/// let body: RequestBody = serde_json::from_str(r#"{"data": []}"#).unwrap();
/// assert!(matches!(body.data, Some(BodyData::Multiple(ref items)) if items.is_empty()));
///
/// let body: RequestBody = serde_json::from_str(r#"{"data": null}"#).unwrap();
/// assert_eq!(body.data, Some(BodyData::Single(None)));
///
/// let body: RequestBody = serde_json::from_str("{}").unwrap();
/// assert!(body.data.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// The `data` member.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<BodyData>,
}

impl RequestBody {
    /// Creates a body carrying one resource object.
    #[must_use]
    pub fn single(data: DataBody) -> Self {
        Self {
            data: Some(BodyData::Single(Some(data))),
        }
    }

    /// Creates a body carrying an array of resource objects.
    #[must_use]
    pub fn multiple(data: Vec<DataBody>) -> Self {
        Self {
            data: Some(BodyData::Multiple(data)),
        }
    }

    /// Returns `true` when `data` is an array.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.data.as_ref().is_some_and(BodyData::is_multiple)
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<BodyData>, D::Error>
where
    D: Deserializer<'de>,
{
    BodyData::deserialize(deserializer).map(Some)
}
