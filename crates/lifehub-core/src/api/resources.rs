//! Typed endpoints of the LifeHub API.
//!
//! Thin wrappers over the generic verbs, so they share the same error
//! handling. None of them touch the session; a token returned by `login`
//! has to be handed to `SessionStore::set_token` by the caller.

use serde::de::IgnoredAny;

use super::{ApiClient, ApiError};
use crate::models::{
    Area, AreaPatch, Credentials, NewArea, NewNextAction, NewOneShotTask, NewProject, NextAction,
    NextActionPatch, OneShotTask, OneShotTaskPatch, Project, ProjectPatch, Registration,
    TokenResponse, UserProfile,
};

impl ApiClient {
    // ===== Account =====

    /// Exchange credentials for a bearer token
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, ApiError> {
        self.post("auth/login", credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        self.post("auth/register", registration).await
    }

    // ===== Areas =====

    pub async fn list_areas(&self) -> Result<Vec<Area>, ApiError> {
        self.get("areas").await
    }

    pub async fn get_area(&self, id: i64) -> Result<Area, ApiError> {
        self.get(&format!("areas/{}", id)).await
    }

    pub async fn create_area(&self, area: &NewArea) -> Result<Area, ApiError> {
        self.post("areas", area).await
    }

    pub async fn update_area(&self, id: i64, patch: &AreaPatch) -> Result<Area, ApiError> {
        self.patch(&format!("areas/{}", id), patch).await
    }

    pub async fn delete_area(&self, id: i64) -> Result<(), ApiError> {
        self.delete::<IgnoredAny>(&format!("areas/{}", id)).await?;
        Ok(())
    }

    // ===== Projects =====

    /// List projects, optionally only those of one area
    pub async fn list_projects(&self, area_id: Option<i64>) -> Result<Vec<Project>, ApiError> {
        match area_id {
            Some(area_id) => self.get(&format!("projects?area_id={}", area_id)).await,
            None => self.get("projects").await,
        }
    }

    pub async fn get_project(&self, id: i64) -> Result<Project, ApiError> {
        self.get(&format!("projects/{}", id)).await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<Project, ApiError> {
        self.post("projects", project).await
    }

    pub async fn update_project(&self, id: i64, patch: &ProjectPatch) -> Result<Project, ApiError> {
        self.patch(&format!("projects/{}", id), patch).await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.delete::<IgnoredAny>(&format!("projects/{}", id)).await?;
        Ok(())
    }

    // ===== Project next actions =====

    pub async fn list_next_actions(&self, project_id: i64) -> Result<Vec<NextAction>, ApiError> {
        self.get(&format!("projects/{}/next-actions", project_id)).await
    }

    pub async fn create_next_action(
        &self,
        project_id: i64,
        action: &NewNextAction,
    ) -> Result<NextAction, ApiError> {
        self.post(&format!("projects/{}/next-actions", project_id), action)
            .await
    }

    pub async fn update_next_action(
        &self,
        id: i64,
        patch: &NextActionPatch,
    ) -> Result<NextAction, ApiError> {
        self.patch(&format!("project-next-actions/{}", id), patch).await
    }

    pub async fn delete_next_action(&self, id: i64) -> Result<(), ApiError> {
        self.delete::<IgnoredAny>(&format!("project-next-actions/{}", id))
            .await?;
        Ok(())
    }

    // ===== One-shot tasks =====

    pub async fn list_tasks(&self) -> Result<Vec<OneShotTask>, ApiError> {
        self.get("one-shot-tasks").await
    }

    pub async fn get_task(&self, id: i64) -> Result<OneShotTask, ApiError> {
        self.get(&format!("one-shot-tasks/{}", id)).await
    }

    pub async fn create_task(&self, task: &NewOneShotTask) -> Result<OneShotTask, ApiError> {
        self.post("one-shot-tasks", task).await
    }

    pub async fn update_task(
        &self,
        id: i64,
        patch: &OneShotTaskPatch,
    ) -> Result<OneShotTask, ApiError> {
        self.patch(&format!("one-shot-tasks/{}", id), patch).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.delete::<IgnoredAny>(&format!("one-shot-tasks/{}", id))
            .await?;
        Ok(())
    }
}
