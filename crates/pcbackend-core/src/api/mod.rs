//! Transport layer for the Planning Center API and web frontend.
//!
//! This module provides the `SessionClient` seam, its reqwest-backed
//! implementation `HttpSession`, the JSON:API document types, and the
//! paginated `ResourceQuery` used by every list operation.

pub mod client;
pub mod error;
pub mod jsonapi;
pub mod paths;
pub mod query;
pub mod session;

pub use client::{Credentials, HttpSession};
pub use error::{ApiError, Result};
pub use jsonapi::{Document, Resource};
pub use query::{fetch_resource, ResourceQuery};
pub use session::{ApiRequest, ApiResponse, Method, RequestBody, Service, SessionClient};
