//! Resource descriptors.
//!
//! A [`ResourceDescriptor`] is the static metadata of one resource type: its
//! protocol type name, identifier field, attribute fields and relationship
//! fields. Descriptors are built once at startup and shared read-only.

use crate::{AttributeType, IdType, ResourceKind};

/// Identifier field of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdField {
    /// Field name, usually `id`.
    pub name: String,
    /// Declared value type.
    pub id_type: IdType,
}

/// Attribute field of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeField {
    /// Field name.
    pub name: String,
    /// Declared value type.
    pub value_type: AttributeType,
}

impl AttributeField {
    /// Creates an attribute field.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// Cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// At most one target.
    ToOne,
    /// Any number of targets.
    ToMany,
}

/// Relationship field of a resource.
///
/// # Example
///
/// ```
/// use heron_core::{Cardinality, RelationshipField};
///
/// let project = RelationshipField::to_one("project", "Project")
///     .include_by_default()
///     .lookup_if_null();
/// assert_eq!(project.cardinality, Cardinality::ToOne);
/// assert!(project.include_by_default);
/// assert!(!project.lazy);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipField {
    /// Field name.
    pub name: String,
    /// To-one or to-many.
    pub cardinality: Cardinality,
    /// Kind of the target resource.
    pub target: ResourceKind,
    /// Linkage is rendered only when the field is explicitly included.
    pub lazy: bool,
    /// Targets are added to `included` without an explicit inclusion path.
    pub include_by_default: bool,
    /// A `null` value is fetched through the relationship repository on inclusion.
    pub lookup_if_null: bool,
}

impl RelationshipField {
    /// Creates a to-one relationship field.
    #[must_use]
    pub fn to_one(name: impl Into<String>, target: impl Into<ResourceKind>) -> Self {
        Self::new(name, Cardinality::ToOne, target)
    }

    /// Creates a to-many relationship field.
    #[must_use]
    pub fn to_many(name: impl Into<String>, target: impl Into<ResourceKind>) -> Self {
        Self::new(name, Cardinality::ToMany, target)
    }

    fn new(name: impl Into<String>, cardinality: Cardinality, target: impl Into<ResourceKind>) -> Self {
        Self {
            name: name.into(),
            cardinality,
            target: target.into(),
            lazy: false,
            include_by_default: false,
            lookup_if_null: false,
        }
    }

    /// Marks the field lazy.
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Marks the field included by default.
    #[must_use]
    pub fn include_by_default(mut self) -> Self {
        self.include_by_default = true;
        self
    }

    /// Marks the field for lookup when `null`.
    #[must_use]
    pub fn lookup_if_null(mut self) -> Self {
        self.lookup_if_null = true;
        self
    }

    /// Returns `true` for to-many fields.
    #[must_use]
    pub fn is_to_many(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }
}

/// Static metadata of one resource type.
///
/// # Example
///
/// ```
/// use heron_core::{AttributeType, IdType, RelationshipField, ResourceDescriptor};
///
/// let tasks = ResourceDescriptor::builder("Task", "tasks")
///     .id("id", IdType::Integer)
///     .attribute("name", AttributeType::String)
///     .relationship(RelationshipField::to_one("project", "Project"))
///     .build();
///
/// assert_eq!(tasks.type_name(), "tasks");
/// assert!(tasks.matches_scope("Task"));
/// assert!(tasks.relationship("project").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    type_name: String,
    id_field: IdField,
    attributes: Vec<AttributeField>,
    relationships: Vec<RelationshipField>,
}

impl ResourceDescriptor {
    /// Creates a builder for a descriptor of `kind` exposed as `type_name`.
    #[must_use]
    pub fn builder(
        kind: impl Into<ResourceKind>,
        type_name: impl Into<String>,
    ) -> ResourceDescriptorBuilder {
        ResourceDescriptorBuilder::new(kind.into(), type_name.into())
    }

    /// Returns the runtime kind.
    #[must_use]
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Returns the protocol type name (`tasks`).
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the identifier field.
    #[must_use]
    pub fn id_field(&self) -> &IdField {
        &self.id_field
    }

    /// Returns the identifier type.
    #[must_use]
    pub fn id_type(&self) -> IdType {
        self.id_field.id_type
    }

    /// Returns the attribute fields in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeField] {
        &self.attributes
    }

    /// Looks up an attribute field by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeField> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the relationship fields in declaration order.
    #[must_use]
    pub fn relationships(&self) -> &[RelationshipField] {
        &self.relationships
    }

    /// Looks up a relationship field by name.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipField> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Returns `true` if a query parameter scope addresses this resource.
    ///
    /// Both the protocol type name and the kind are accepted.
    #[must_use]
    pub fn matches_scope(&self, scope: &str) -> bool {
        scope == self.type_name || scope == self.kind.as_str()
    }

    /// Scopes to look up in resource-scoped query parameters, most specific first.
    #[must_use]
    pub fn scopes(&self) -> [&str; 2] {
        [self.kind.as_str(), self.type_name.as_str()]
    }
}

/// Builder for [`ResourceDescriptor`].
#[derive(Debug)]
pub struct ResourceDescriptorBuilder {
    kind: ResourceKind,
    type_name: String,
    id_field: IdField,
    attributes: Vec<AttributeField>,
    relationships: Vec<RelationshipField>,
}

impl ResourceDescriptorBuilder {
    fn new(kind: ResourceKind, type_name: String) -> Self {
        Self {
            kind,
            type_name,
            id_field: IdField {
                name: "id".to_string(),
                id_type: IdType::Integer,
            },
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Sets the identifier field. Defaults to an integer `id`.
    #[must_use]
    pub fn id(mut self, name: impl Into<String>, id_type: IdType) -> Self {
        self.id_field = IdField {
            name: name.into(),
            id_type,
        };
        self
    }

    /// Adds an attribute field; a repeated name replaces the earlier declaration.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value_type: AttributeType) -> Self {
        let field = AttributeField::new(name, value_type);
        self.attributes.retain(|a| a.name != field.name);
        self.attributes.push(field);
        self
    }

    /// Adds a relationship field; a repeated name replaces the earlier declaration.
    #[must_use]
    pub fn relationship(mut self, field: RelationshipField) -> Self {
        self.relationships.retain(|r| r.name != field.name);
        self.relationships.push(field);
        self
    }

    /// Builds the descriptor.
    #[must_use]
    pub fn build(self) -> ResourceDescriptor {
        ResourceDescriptor {
            kind: self.kind,
            type_name: self.type_name,
            id_field: self.id_field,
            attributes: self.attributes,
            relationships: self.relationships,
        }
    }
}
