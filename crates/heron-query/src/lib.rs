//! # Heron Query
//!
//! Query parameter model for the Heron document protocol.
//!
//! Parameters are grouped by kind and scoped by resource:
//!
//! | Key | Nesting | Value |
//! |---|---|---|
//! | `filter[Type][path...]` | unbounded, joined with `.` | any string, repeated values accumulate |
//! | `sort[Type][path...]` | unbounded, joined with `.` | `asc` or `desc` |
//! | `group[Type]` | one segment | property path |
//! | `fields[Type]` | one segment | comma-separated field names |
//! | `include[Type]` | one segment | comma-separated dotted relationship paths |
//! | `page[offset\|limit]` | one segment | non-negative integer |
//!
//! Exceeding the nesting limit, an unknown sort literal, or a bad page value
//! is a [`ParametersError`]. Keys outside these groups are ignored.
//!
//! ```rust
//! use heron_query::QueryParams;
//!
//! let params = QueryParams::from_query_string("include[Task]=project").unwrap();
//! let includes = params.included_relations().get("Task").unwrap();
//! assert!(includes.starts_with("project"));
//! ```

#![doc(html_root_url = "https://docs.rs/heron-query/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod params;
mod parser;

pub use error::{ParameterGroup, ParametersError};
pub use params::{
    FilterParams, GroupingParams, IncludedFieldsParams, IncludedRelationsParams, Inclusion,
    PaginationKey, SortDirection, SortingParams, TypedParams,
};
pub use parser::QueryParams;
