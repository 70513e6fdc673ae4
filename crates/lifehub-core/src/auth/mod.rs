//! Authentication module for the client session.
//!
//! This module provides:
//! - `SessionStore`: the bearer token and the profile resolved for it
//! - `Storage`: durable key-value port the token is persisted through,
//!   with file, OS keychain and in-memory backends
//!
//! The token lives under the `lifehub_token` key; no key means logged out.

pub mod session;
pub mod storage;

pub use session::{SessionCheckError, SessionStore, TOKEN_KEY};
pub use storage::{FileStorage, KeyringStorage, MemoryStorage, Storage};
