//! REST API client module for the LifeHub backend.
//!
//! This module provides the `ApiClient` for reading and writing areas,
//! projects and tasks. Every request carries the session's bearer token
//! when one is present.

pub mod client;
pub mod error;
mod resources;

pub use client::{resolve_url, ApiClient, RequestOptions};
pub use error::ApiError;
