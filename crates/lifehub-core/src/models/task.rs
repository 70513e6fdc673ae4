use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A standalone task that does not belong to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneShotTask {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub area_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOneShotTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OneShotTaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<i64>,
}
