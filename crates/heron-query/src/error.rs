//! Query parameter parsing errors.
//!
//! Every malformed query parameter is reported as a [`ParametersError`].
//! The error carries the parameter group it came from so callers can
//! report precisely which part of the query string was rejected.

use std::fmt;
use thiserror::Error;

/// Parameter group a query key belongs to (`filter`, `sort`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterGroup {
    /// `filter[Type][path...]`
    Filter,
    /// `sort[Type][path...]`
    Sort,
    /// `group[Type]`
    Group,
    /// `fields[Type]`
    Fields,
    /// `include[Type]`
    Include,
    /// `page[offset|limit]`
    Page,
}

impl ParameterGroup {
    /// All groups, in the order they are matched against a key.
    pub const ALL: [Self; 6] = [
        Self::Filter,
        Self::Sort,
        Self::Group,
        Self::Fields,
        Self::Include,
        Self::Page,
    ];

    /// Returns the literal key prefix for this group.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Sort => "sort",
            Self::Group => "group",
            Self::Fields => "fields",
            Self::Include => "include",
            Self::Page => "page",
        }
    }

    /// Maximum number of bracket segments accepted, `None` when unbounded.
    #[must_use]
    pub const fn max_segments(&self) -> Option<usize> {
        match self {
            Self::Filter | Self::Sort => None,
            Self::Group | Self::Fields | Self::Include | Self::Page => Some(1),
        }
    }
}

impl fmt::Display for ParameterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Error raised while deserializing query parameters.
///
/// # Example
///
/// ```rust
/// use heron_query::{ParameterGroup, ParametersError};
///
/// let err = ParametersError::nesting_exceeded(ParameterGroup::Fields, "fields[Task][name]");
/// assert!(err.to_string().contains("fields"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParametersError {
    /// Key does not consist of bracketed segments after its prefix.
    #[error("Malformed {group} parameter: {key}")]
    MalformedKey {
        /// Group the key was matched against.
        group: ParameterGroup,
        /// The offending key.
        key: String,
    },

    /// Key carries more bracket segments than its group allows.
    #[error("Exceeded maximum level of nesting of '{group}' parameter (1): {key}")]
    NestingExceeded {
        /// Group the key was matched against.
        group: ParameterGroup,
        /// The offending key.
        key: String,
    },

    /// Sort value is neither `asc` nor `desc`.
    #[error("Invalid sort direction '{value}' for {key}, expected 'asc' or 'desc'")]
    InvalidSortDirection {
        /// The offending key.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// Page key is not one of the restricted pagination keys.
    #[error("Invalid pagination key '{value}', expected 'offset' or 'limit'")]
    InvalidPaginationKey {
        /// The rejected pagination key.
        value: String,
    },

    /// Page value is not a non-negative integer.
    #[error("Invalid pagination value '{value}' for page[{key}]")]
    InvalidPaginationValue {
        /// Pagination key.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// A parameter was given without any value.
    #[error("Missing value for parameter {key}")]
    MissingValue {
        /// The offending key.
        key: String,
    },

    /// The query string itself could not be decoded.
    #[error("Failed to decode query string: {0}")]
    Decode(String),
}

impl ParametersError {
    /// Creates a malformed key error.
    #[must_use]
    pub fn malformed(group: ParameterGroup, key: impl Into<String>) -> Self {
        Self::MalformedKey {
            group,
            key: key.into(),
        }
    }

    /// Creates a nesting limit error.
    #[must_use]
    pub fn nesting_exceeded(group: ParameterGroup, key: impl Into<String>) -> Self {
        Self::NestingExceeded {
            group,
            key: key.into(),
        }
    }

    /// Returns the parameter group involved, if any.
    #[must_use]
    pub const fn group(&self) -> Option<ParameterGroup> {
        match self {
            Self::MalformedKey { group, .. } | Self::NestingExceeded { group, .. } => Some(*group),
            Self::InvalidSortDirection { .. } => Some(ParameterGroup::Sort),
            Self::InvalidPaginationKey { .. } | Self::InvalidPaginationValue { .. } => {
                Some(ParameterGroup::Page)
            }
            Self::MissingValue { .. } | Self::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_prefixes() {
        let prefixes: Vec<_> = ParameterGroup::ALL.iter().map(ParameterGroup::prefix).collect();
        assert_eq!(
            prefixes,
            vec!["filter", "sort", "group", "fields", "include", "page"]
        );
    }

    #[test]
    fn test_nesting_limits() {
        assert_eq!(ParameterGroup::Filter.max_segments(), None);
        assert_eq!(ParameterGroup::Sort.max_segments(), None);
        assert_eq!(ParameterGroup::Include.max_segments(), Some(1));
        assert_eq!(ParameterGroup::Page.max_segments(), Some(1));
    }

    #[test]
    fn test_error_messages() {
        let err = ParametersError::nesting_exceeded(ParameterGroup::Group, "group[Task][name]");
        assert_eq!(
            err.to_string(),
            "Exceeded maximum level of nesting of 'group' parameter (1): group[Task][name]"
        );

        let err = ParametersError::malformed(ParameterGroup::Filter, "filter]Task[");
        assert!(err.to_string().starts_with("Malformed filter parameter"));
    }

    #[test]
    fn test_error_group() {
        let err = ParametersError::InvalidSortDirection {
            key: "sort[Task][name]".into(),
            value: "up".into(),
        };
        assert_eq!(err.group(), Some(ParameterGroup::Sort));
        assert_eq!(ParametersError::Decode("bad".into()).group(), None);
    }
}
