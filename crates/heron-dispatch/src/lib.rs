//! # Heron Dispatch
//!
//! Request dispatch for Heron.
//!
//! - [`RequestDispatcher`] - selects a controller, runs it, resolves includes
//!   and renders the response document
//! - [`Controller`] - one (method, path shape) operation; the built-in set
//!   lives in [`controllers`]
//! - [`IncludeResolver`] - default and explicit inclusion, depth-bounded
//!
//! ## Example
//!
//! ```rust,ignore
//! use heron_dispatch::RequestDispatcher;
//!
//! let dispatcher = RequestDispatcher::new(registry);
//! let response = dispatcher
//!     .dispatch(&JsonPath::parse("/tasks/1")?, &Method::GET, &params, None)
//!     .await?;
//! ```

#![doc(html_root_url = "https://docs.rs/heron-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod controller;
pub mod controllers;
mod dispatcher;
mod include;

pub use controller::Controller;
pub use controllers::default_controllers;
pub use dispatcher::{DispatchResponse, RequestDispatcher};
pub use include::{IncludeResolver, DEFAULT_MAX_DEPTH};
