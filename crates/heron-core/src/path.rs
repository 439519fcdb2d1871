//! Parsed request paths.
//!
//! A [`JsonPath`] is the boundary input describing which resource(s) a
//! request addresses. Four shapes exist:
//!
//! | Path | Shape |
//! |---|---|
//! | `/tasks` | collection |
//! | `/tasks/1` or `/tasks/1,2` | resource(s) |
//! | `/tasks/1/project` | field (related resources) |
//! | `/tasks/1/relationships/project` | relationship (linkage) |

use crate::{HeronError, HeronResult};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of ids stored inline (stack allocated).
const INLINE_IDS: usize = 4;

const RELATIONSHIPS_SEGMENT: &str = "relationships";

/// Raw (unparsed) identifiers carried by a path.
pub type PathIds = SmallVec<[String; INLINE_IDS]>;

/// Element addressed below a resource id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// `/type/id/field`
    Field(String),
    /// `/type/id/relationships/field`
    Relationship(String),
}

impl PathElement {
    /// Returns the relationship field name.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Field(name) | Self::Relationship(name) => name,
        }
    }
}

/// A parsed request path.
///
/// # Example
///
/// ```rust
/// use heron_core::{JsonPath, PathElement};
///
/// let path = JsonPath::parse("/tasks/1/relationships/project").unwrap();
/// assert_eq!(path.resource_name(), "tasks");
/// assert_eq!(path.ids().unwrap().as_slice(), ["1"]);
/// assert_eq!(path.element(), Some(&PathElement::Relationship("project".into())));
/// assert!(!path.is_collection());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    resource_name: String,
    ids: Option<PathIds>,
    element: Option<PathElement>,
}

impl JsonPath {
    /// Creates a collection path.
    #[must_use]
    pub fn collection(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            ids: None,
            element: None,
        }
    }

    /// Creates a path addressing one or more resources by id.
    #[must_use]
    pub fn resource<I, S>(resource_name: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource_name: resource_name.into(),
            ids: Some(ids.into_iter().map(Into::into).collect()),
            element: None,
        }
    }

    /// Creates a field path, `/type/id/field`.
    #[must_use]
    pub fn field(
        resource_name: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            ids: Some(std::iter::once(id.into()).collect()),
            element: Some(PathElement::Field(field.into())),
        }
    }

    /// Creates a relationship path, `/type/id/relationships/field`.
    #[must_use]
    pub fn relationship(
        resource_name: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            ids: Some(std::iter::once(id.into()).collect()),
            element: Some(PathElement::Relationship(field.into())),
        }
    }

    /// Parses a URL path.
    ///
    /// Leading, trailing and repeated slashes are ignored. Ids are
    /// comma-separated.
    pub fn parse(path: &str) -> HeronResult<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let invalid = || HeronError::not_found(format!("Invalid path: {path}"));

        let ids = |raw: &str| -> HeronResult<PathIds> {
            let ids: PathIds = raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(ToString::to_string)
                .collect();
            if ids.is_empty() {
                Err(invalid())
            } else {
                Ok(ids)
            }
        };

        match segments.as_slice() {
            [resource] => Ok(Self::collection(*resource)),
            [resource, raw_ids] => Ok(Self {
                resource_name: (*resource).to_string(),
                ids: Some(ids(*raw_ids)?),
                element: None,
            }),
            [resource, raw_ids, field] if *field != RELATIONSHIPS_SEGMENT => Ok(Self {
                resource_name: (*resource).to_string(),
                ids: Some(ids(*raw_ids)?),
                element: Some(PathElement::Field((*field).to_string())),
            }),
            [resource, raw_ids, relationships, field] if *relationships == RELATIONSHIPS_SEGMENT => {
                Ok(Self {
                    resource_name: (*resource).to_string(),
                    ids: Some(ids(*raw_ids)?),
                    element: Some(PathElement::Relationship((*field).to_string())),
                })
            }
            _ => Err(invalid()),
        }
    }

    /// Returns the resource type name (first segment).
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Returns the raw ids, if any.
    #[must_use]
    pub fn ids(&self) -> Option<&PathIds> {
        self.ids.as_ref()
    }

    /// Returns the first raw id, if any.
    #[must_use]
    pub fn first_id(&self) -> Option<&str> {
        self.ids.as_ref().and_then(|ids| ids.first()).map(String::as_str)
    }

    /// Returns the element below the id, if any.
    #[must_use]
    pub fn element(&self) -> Option<&PathElement> {
        self.element.as_ref()
    }

    /// Returns `true` for a collection: no id, or several ids without an element.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.element.is_none() && self.ids.as_ref().map_or(true, |ids| ids.len() > 1)
    }

    /// Returns `true` when the path names exactly one id.
    #[must_use]
    pub fn has_single_id(&self) -> bool {
        self.ids.as_ref().is_some_and(|ids| ids.len() == 1)
    }

    /// Returns `true` for `/type/id[,id]` paths.
    #[must_use]
    pub fn is_resource(&self) -> bool {
        self.element.is_none() && self.ids.is_some()
    }

    /// Returns `true` for `/type/id/field` paths.
    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self.element, Some(PathElement::Field(_)))
    }

    /// Returns `true` for `/type/id/relationships/field` paths.
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        matches!(self.element, Some(PathElement::Relationship(_)))
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.resource_name)?;
        if let Some(ids) = &self.ids {
            write!(f, "/{}", ids.join(","))?;
        }
        match &self.element {
            Some(PathElement::Field(field)) => write!(f, "/{field}"),
            Some(PathElement::Relationship(field)) => {
                write!(f, "/{RELATIONSHIPS_SEGMENT}/{field}")
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection() {
        let path = JsonPath::parse("/tasks/").unwrap();
        assert_eq!(path, JsonPath::collection("tasks"));
        assert!(path.is_collection());
        assert!(!path.is_resource());
    }

    #[test]
    fn test_parse_single_and_multiple_ids() {
        let single = JsonPath::parse("/tasks/1").unwrap();
        assert!(!single.is_collection());
        assert!(single.is_resource());
        assert_eq!(single.first_id(), Some("1"));
        assert!(single.has_single_id());

        let multiple = JsonPath::parse("/tasks/1,2").unwrap();
        assert!(multiple.is_collection());
        assert!(multiple.is_resource());
        assert_eq!(multiple.ids().unwrap().len(), 2);
        assert!(!multiple.has_single_id());
        assert!(!JsonPath::parse("/tasks/1,2/relationships/project").unwrap().has_single_id());
        assert!(!JsonPath::parse("/tasks").unwrap().has_single_id());
    }

    #[test]
    fn test_parse_field_and_relationship() {
        let field = JsonPath::parse("/tasks/1/project").unwrap();
        assert!(field.is_field());
        assert_eq!(field.element().unwrap().field(), "project");

        let relationship = JsonPath::parse("tasks/1/relationships/project").unwrap();
        assert!(relationship.is_relationship());
        assert_eq!(relationship, JsonPath::relationship("tasks", "1", "project"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(JsonPath::parse("/").is_err());
        assert!(JsonPath::parse("/tasks/1/relationships").is_err());
        assert!(JsonPath::parse("/tasks/1/project/extra").is_err());
        assert!(JsonPath::parse("/tasks/,").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for raw in [
            "/tasks",
            "/tasks/1,2",
            "/tasks/1/project",
            "/tasks/1/relationships/project",
        ] {
            assert_eq!(JsonPath::parse(raw).unwrap().to_string(), raw);
        }
    }
}
