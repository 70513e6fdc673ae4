//! Data models for LifeHub API entities.
//!
//! - `UserProfile`, `Credentials`, `Registration`, `TokenResponse`: account and login
//! - `Area`: top-level life areas
//! - `Project`, `NextAction`: projects inside an area and their next steps
//! - `OneShotTask`: standalone tasks outside any project
//!
//! The `New*` and `*Patch` types are request bodies; patch types only
//! serialize the fields that are set.

pub mod area;
pub mod project;
pub mod task;
pub mod user;

pub use area::{Area, AreaPatch, NewArea};
pub use project::{NewNextAction, NewProject, NextAction, NextActionPatch, Project, ProjectPatch};
pub use task::{NewOneShotTask, OneShotTask, OneShotTaskPatch};
pub use user::{Credentials, Registration, TokenResponse, UserProfile};
