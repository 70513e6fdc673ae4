//! LifeHub client core.
//!
//! Session state, authenticated access to the LifeHub API and the
//! navigation guard that keeps protected routes behind a confirmed login.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use lifehub_core::{ApiClient, Config, Router, RouteTable, SessionStore};
//!
//! let config = Config::load()?;
//! let session = Arc::new(SessionStore::load(config.open_storage()?, &config.api_url())?);
//! let api = ApiClient::new(session.clone());
//! let router = Router::new(RouteTable::lifehub(), session.clone());
//!
//! let nav = router.navigate("/dashboard").await?;
//! if nav.redirected_from.is_none() {
//!     let areas = api.list_areas().await?;
//!     println!("{} areas", areas.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;

pub use api::{ApiClient, ApiError, RequestOptions};
pub use auth::{SessionCheckError, SessionStore, Storage};
pub use config::Config;
pub use router::{GuardDecision, Navigation, NavigationGuard, RouteTable, Router, RouterError};
