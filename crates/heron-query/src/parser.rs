//! Query string grammar.
//!
//! Keys have the shape `group[Scope][segment]...`. The bracket contents are
//! tokenized, empty segments (`fields[Task][]`) are dropped, and the first
//! remaining segment is the resource scope.

use crate::params::{
    FilterParams, GroupingParams, IncludedFieldsParams, IncludedRelationsParams, Inclusion,
    PaginationKey, SortDirection, SortingParams, TypedParams,
};
use crate::{ParameterGroup, ParametersError};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Parsed, immutable query parameters.
///
/// # Example
///
/// ```rust
/// use heron_query::{PaginationKey, QueryParams, SortDirection};
///
/// let params = QueryParams::from_query_string(
///     "fields[Task]=name,dueDate&sort[Task][name]=desc&page[limit]=10",
/// )
/// .unwrap();
///
/// let fields = params.included_fields().get("Task").unwrap();
/// assert!(fields.contains("dueDate"));
/// assert_eq!(
///     params.sorting().get("Task").unwrap().get("name"),
///     Some(SortDirection::Descending)
/// );
/// assert_eq!(params.pagination().get(&PaginationKey::Limit), Some(&10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    filters: TypedParams<FilterParams>,
    sorting: TypedParams<SortingParams>,
    grouping: TypedParams<GroupingParams>,
    included_fields: TypedParams<IncludedFieldsParams>,
    included_relations: TypedParams<IncludedRelationsParams>,
    pagination: IndexMap<PaginationKey, u64>,
}

impl QueryParams {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a URL query string (without the leading `?`).
    pub fn from_query_string(query: &str) -> Result<Self, ParametersError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| ParametersError::Decode(e.to_string()))?;
        Self::from_pairs(pairs)
    }

    /// Parses key/value pairs; repeated keys accumulate.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, ParametersError>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut raw: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, value) in pairs {
            raw.entry(key.into()).or_default().push(value.into());
        }
        Self::from_raw(raw)
    }

    /// Parses a raw multi-valued parameter map.
    ///
    /// Keys that do not belong to a known group are ignored.
    pub fn from_raw(raw: IndexMap<String, Vec<String>>) -> Result<Self, ParametersError> {
        let mut filters: IndexMap<String, FilterParams> = IndexMap::new();
        let mut sorting: IndexMap<String, SortingParams> = IndexMap::new();
        let mut grouping: IndexMap<String, GroupingParams> = IndexMap::new();
        let mut fields: IndexMap<String, IncludedFieldsParams> = IndexMap::new();
        let mut includes: IndexMap<String, IncludedRelationsParams> = IndexMap::new();
        let mut pagination = IndexMap::new();

        for (key, values) in raw {
            let Some(group) = classify(&key) else {
                continue;
            };
            let segments = segments(group, &key)?;
            let (scope, rest) = segments.split_at(1);
            let scope = scope[0].clone();

            match group {
                ParameterGroup::Filter => {
                    filters.entry(scope).or_default().insert(rest.join("."), values);
                }
                ParameterGroup::Sort => {
                    let value = values
                        .into_iter()
                        .next()
                        .ok_or_else(|| ParametersError::MissingValue { key: key.clone() })?;
                    let direction = value.parse::<SortDirection>().map_err(|()| {
                        ParametersError::InvalidSortDirection {
                            key: key.clone(),
                            value,
                        }
                    })?;
                    sorting
                        .entry(scope)
                        .or_default()
                        .insert(rest.join("."), direction);
                }
                ParameterGroup::Group => {
                    grouping.entry(scope).or_default().extend(values);
                }
                ParameterGroup::Fields => {
                    fields.entry(scope).or_default().extend(split_list(&values));
                }
                ParameterGroup::Include => {
                    let entry = includes.entry(scope).or_default();
                    for path in split_list(&values) {
                        entry.insert(Inclusion::new(path));
                    }
                }
                ParameterGroup::Page => {
                    let page_key: PaginationKey = scope.parse()?;
                    let value = values
                        .into_iter()
                        .next()
                        .ok_or_else(|| ParametersError::MissingValue { key: key.clone() })?;
                    let number = value.trim().parse::<u64>().map_err(|_| {
                        ParametersError::InvalidPaginationValue {
                            key: page_key.to_string(),
                            value: value.clone(),
                        }
                    })?;
                    pagination.insert(page_key, number);
                }
            }
        }

        Ok(Self {
            filters: TypedParams::from_map(filters),
            sorting: TypedParams::from_map(sorting),
            grouping: TypedParams::from_map(grouping),
            included_fields: TypedParams::from_map(fields),
            included_relations: TypedParams::from_map(includes),
            pagination,
        })
    }

    /// Filters grouped by resource scope.
    #[must_use]
    pub fn filters(&self) -> &TypedParams<FilterParams> {
        &self.filters
    }

    /// Sort directions grouped by resource scope.
    #[must_use]
    pub fn sorting(&self) -> &TypedParams<SortingParams> {
        &self.sorting
    }

    /// Grouping paths grouped by resource scope.
    #[must_use]
    pub fn grouping(&self) -> &TypedParams<GroupingParams> {
        &self.grouping
    }

    /// Sparse fieldsets grouped by resource scope.
    #[must_use]
    pub fn included_fields(&self) -> &TypedParams<IncludedFieldsParams> {
        &self.included_fields
    }

    /// Inclusion paths grouped by resource scope.
    #[must_use]
    pub fn included_relations(&self) -> &TypedParams<IncludedRelationsParams> {
        &self.included_relations
    }

    /// Pagination values.
    #[must_use]
    pub fn pagination(&self) -> &IndexMap<PaginationKey, u64> {
        &self.pagination
    }
}

fn classify(key: &str) -> Option<ParameterGroup> {
    ParameterGroup::ALL.into_iter().find(|group| {
        key.strip_prefix(group.prefix())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('['))
    })
}

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\[[^\[\]]*\])+$").expect("valid regex"))
}

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^\[\]]*)\]").expect("valid regex"))
}

/// Extracts the non-empty bracket segments of `key` and enforces the group's
/// nesting limit. The returned list always has at least one element.
fn segments(group: ParameterGroup, key: &str) -> Result<Vec<String>, ParametersError> {
    let brackets = &key[group.prefix().len()..];
    if !key_pattern().is_match(brackets) {
        return Err(ParametersError::malformed(group, key));
    }

    let segments: Vec<String> = segment_pattern()
        .captures_iter(brackets)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();

    if segments.is_empty() {
        return Err(ParametersError::malformed(group, key));
    }
    if group.max_segments().is_some_and(|max| segments.len() > max) {
        return Err(ParametersError::nesting_exceeded(group, key));
    }
    Ok(segments)
}

fn split_list(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
