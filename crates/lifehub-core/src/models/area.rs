use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Palette colour as `#rrggbb`
    #[serde(default)]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewArea {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AreaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = AreaPatch {
            name: Some("Salud".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"name":"Salud"}"#);
    }

    #[test]
    fn test_parse_area_without_color() {
        let json = r#"{"id":1,"user_id":2,"name":"Trabajo","description":null,"created_at":"2025-01-02T10:00:00Z","updated_at":"2025-01-02T10:00:00Z"}"#;
        let area: Area = serde_json::from_str(json).expect("Failed to parse area");
        assert_eq!(area.name, "Trabajo");
        assert!(area.color.is_none());
    }
}
