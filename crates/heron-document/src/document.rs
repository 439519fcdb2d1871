//! Wire document types.
//!
//! These types serialize to the JSON:API document shape:
//!
//! ```json
//! {
//!   "data": {
//!     "type": "tasks",
//!     "id": "1",
//!     "attributes": {"name": "write docs"},
//!     "relationships": {
//!       "project": {
//!         "links": {
//!           "self": "http://localhost:8080/tasks/1/relationships/project",
//!           "related": "http://localhost:8080/tasks/1/project"
//!         },
//!         "data": {"type": "projects", "id": "2"}
//!       }
//!     },
//!     "links": {"self": "http://localhost:8080/tasks/1"}
//!   },
//!   "included": []
//! }
//! ```

use heron_core::{AttributeValue, Linkage, Links, Meta, ResourceIdentifier};
use indexmap::IndexMap;
use serde::Serialize;

/// Links of a resource object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLinks {
    /// Canonical URL of the resource.
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Links of a relationship object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipLinks {
    /// URL of the relationship itself.
    #[serde(rename = "self")]
    pub self_link: String,
    /// URL of the related resource(s).
    pub related: String,
}

/// One relationship of a resource object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipObject {
    /// Relationship links.
    pub links: RelationshipLinks,
    /// Linkage; `None` omits `data` (lazy relationships), `Some(None)` renders `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Option<Linkage>>,
}

impl RelationshipObject {
    /// Returns the rendered linkage, if `data` is present and not `null`.
    #[must_use]
    pub fn linkage(&self) -> Option<&Linkage> {
        self.data.as_ref().and_then(Option::as_ref)
    }
}

/// A rendered resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    /// Protocol type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Identifier as a string.
    pub id: String,
    /// Rendered attributes.
    pub attributes: IndexMap<String, AttributeValue>,
    /// Rendered relationships.
    pub relationships: IndexMap<String, RelationshipObject>,
    /// Resource links.
    pub links: ResourceLinks,
}

impl ResourceObject {
    /// Returns the `{type, id}` identifier of this object.
    #[must_use]
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.resource_type, &self.id)
    }
}

/// Top-level `data` member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// A single resource, or `null`.
    Resource(Option<Box<ResourceObject>>),
    /// An array of resources.
    Collection(Vec<ResourceObject>),
    /// Relationship linkage, or `null`.
    Linkage(Option<Linkage>),
}

/// A complete response document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Primary data; absent for documents that carry only meta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    /// Related resources, each at most once.
    pub included: Vec<ResourceObject>,
    /// Top-level meta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    /// Top-level links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl Document {
    /// Returns the single primary resource, if the data is a single resource.
    #[must_use]
    pub fn resource(&self) -> Option<&ResourceObject> {
        match &self.data {
            Some(PrimaryData::Resource(Some(resource))) => Some(&**resource),
            _ => None,
        }
    }

    /// Returns the primary resources of a collection document.
    #[must_use]
    pub fn collection(&self) -> Option<&[ResourceObject]> {
        match &self.data {
            Some(PrimaryData::Collection(resources)) => Some(resources),
            _ => None,
        }
    }

    /// Serializes the document to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> ResourceObject {
        ResourceObject {
            resource_type: "tasks".into(),
            id: "1".into(),
            attributes: IndexMap::from([("name".to_string(), AttributeValue::from("x"))]),
            relationships: IndexMap::from([
                (
                    "project".to_string(),
                    RelationshipObject {
                        links: RelationshipLinks {
                            self_link: "http://h/tasks/1/relationships/project".into(),
                            related: "http://h/tasks/1/project".into(),
                        },
                        data: Some(None),
                    },
                ),
                (
                    "assignees".to_string(),
                    RelationshipObject {
                        links: RelationshipLinks {
                            self_link: "http://h/tasks/1/relationships/assignees".into(),
                            related: "http://h/tasks/1/assignees".into(),
                        },
                        data: None,
                    },
                ),
            ]),
            links: ResourceLinks {
                self_link: "http://h/tasks/1".into(),
            },
        }
    }

    #[test]
    fn test_relationship_data_states() {
        let json = serde_json::to_value(object()).unwrap();
        let project = &json["relationships"]["project"];
        assert!(project.get("data").unwrap().is_null());
        assert!(json["relationships"]["assignees"].get("data").is_none());
        assert_eq!(json["links"]["self"], "http://h/tasks/1");
        assert_eq!(project["links"]["related"], "http://h/tasks/1/project");
    }

    #[test]
    fn test_document_shape() {
        let document = Document {
            data: Some(PrimaryData::Collection(vec![object()])),
            included: Vec::new(),
            meta: Some(Meta::new().with("total", 1)),
            links: None,
        };
        let json = document.to_value();
        assert_eq!(json["data"][0]["type"], "tasks");
        assert_eq!(json["included"], serde_json::json!([]));
        assert_eq!(json["meta"]["total"], 1);
        assert!(json.get("links").is_none());
        assert_eq!(document.collection().unwrap().len(), 1);
        assert!(document.resource().is_none());
    }

    #[test]
    fn test_null_primary_data() {
        let document = Document {
            data: Some(PrimaryData::Resource(None)),
            included: Vec::new(),
            meta: None,
            links: None,
        };
        assert!(document.to_value()["data"].is_null());
        assert!(document.to_value().get("data").is_some());
    }

    #[test]
    fn test_identifier() {
        assert_eq!(object().identifier(), ResourceIdentifier::new("tasks", "1"));
    }
}
