//! Typed, resource-scoped parameter groups.
//!
//! Each group is keyed by the resource scope that appeared in the first
//! bracket segment of the query key (`fields[Task]` is scoped to `Task`).
//! All collections preserve insertion order and are immutable once built.

use crate::ParametersError;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Parameters of one group, keyed by resource scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedParams<T> {
    params: IndexMap<String, T>,
}

impl<T> Default for TypedParams<T> {
    fn default() -> Self {
        Self {
            params: IndexMap::new(),
        }
    }
}

impl<T> TypedParams<T> {
    pub(crate) fn from_map(params: IndexMap<String, T>) -> Self {
        Self { params }
    }

    /// Returns the parameters scoped to `resource`.
    #[must_use]
    pub fn get(&self, resource: &str) -> Option<&T> {
        self.params.get(resource)
    }

    /// Returns the parameters of the first scope in `scopes` that is present.
    ///
    /// A resource can be addressed by more than one name (its protocol type
    /// name or its runtime kind); this looks them up in order.
    #[must_use]
    pub fn get_any(&self, scopes: &[&str]) -> Option<&T> {
        scopes.iter().find_map(|scope| self.params.get(*scope))
    }

    /// Returns `true` when no scope has parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterates over `(scope, params)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Filter values keyed by dot-joined property path.
///
/// `filter[Task][author][name]=John` is stored under the path `author.name`.
/// A key with only the resource segment is stored under the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    params: IndexMap<String, IndexSet<String>>,
}

impl FilterParams {
    pub(crate) fn insert(&mut self, path: String, values: impl IntoIterator<Item = String>) {
        self.params.entry(path).or_default().extend(values);
    }

    /// Returns the values for a property path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&IndexSet<String>> {
        self.params.get(path)
    }

    /// Iterates over `(path, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` when no filter is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Sort direction of a single property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SortDirection {
    /// `asc`
    #[serde(rename = "asc")]
    Ascending,
    /// `desc`
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Returns the wire literal.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _ => Err(()),
        }
    }
}

/// Sort directions keyed by dot-joined property path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortingParams {
    params: IndexMap<String, SortDirection>,
}

impl SortingParams {
    pub(crate) fn insert(&mut self, path: String, direction: SortDirection) {
        self.params.insert(path, direction);
    }

    /// Returns the direction for a property path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<SortDirection> {
        self.params.get(path).copied()
    }

    /// Iterates over `(path, direction)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.params.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Grouping property paths of one resource scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingParams {
    params: IndexSet<String>,
}

impl GroupingParams {
    pub(crate) fn extend(&mut self, values: impl IntoIterator<Item = String>) {
        self.params.extend(values);
    }

    /// Returns `true` if the property path is requested.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.params.contains(path)
    }

    /// Iterates over the requested paths.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(String::as_str)
    }
}

/// Sparse fieldset of one resource scope.
///
/// An empty set places no restriction on the rendered fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludedFieldsParams {
    params: IndexSet<String>,
}

impl IncludedFieldsParams {
    pub(crate) fn extend(&mut self, values: impl IntoIterator<Item = String>) {
        self.params.extend(values);
    }

    /// Returns `true` if the field is named in the set.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.params.contains(field)
    }

    /// Returns `true` if `field` should be rendered under this fieldset.
    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        self.params.is_empty() || self.params.contains(field)
    }

    /// Returns `true` when no field is named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over the named fields.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(String::as_str)
    }
}

/// One dot-delimited inclusion path, e.g. `comments.author`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Inclusion {
    path: String,
    path_list: Vec<String>,
}

impl Inclusion {
    /// Creates an inclusion from a dotted path.
    ///
    /// # Example
    ///
    /// ```rust
    /// use heron_query::Inclusion;
    ///
    /// let inclusion = Inclusion::new("comments.author");
    /// assert_eq!(inclusion.path_list(), ["comments", "author"]);
    /// assert_eq!(inclusion.first(), Some("comments"));
    /// ```
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path_list = path
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { path, path_list }
    }

    /// Returns the dotted path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the pre-split path segments.
    #[must_use]
    pub fn path_list(&self) -> &[String] {
        &self.path_list
    }

    /// Returns the first relationship name of the path.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.path_list.first().map(String::as_str)
    }
}

/// Inclusion paths of one resource scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludedRelationsParams {
    params: IndexSet<Inclusion>,
}

impl IncludedRelationsParams {
    pub(crate) fn insert(&mut self, inclusion: Inclusion) {
        self.params.insert(inclusion);
    }

    /// Iterates over the inclusion paths.
    pub fn iter(&self) -> impl Iterator<Item = &Inclusion> {
        self.params.iter()
    }

    /// Returns `true` if some path starts with `field`.
    #[must_use]
    pub fn starts_with(&self, field: &str) -> bool {
        self.params.iter().any(|inclusion| inclusion.first() == Some(field))
    }

    /// Returns `true` when no path is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Restricted pagination keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationKey {
    /// `page[offset]`
    Offset,
    /// `page[limit]`
    Limit,
}

impl FromStr for PaginationKey {
    type Err = ParametersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offset" => Ok(Self::Offset),
            "limit" => Ok(Self::Limit),
            other => Err(ParametersError::InvalidPaginationKey {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PaginationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offset => f.write_str("offset"),
            Self::Limit => f.write_str("limit"),
        }
    }
}
