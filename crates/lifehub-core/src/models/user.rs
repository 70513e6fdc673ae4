use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Profile returned by `GET /auth/me`.
///
/// Fields the client does not know about are kept in `extra`, so a profile
/// serializes back to what the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl UserProfile {
    /// Name to greet the user with: full name, then email, then the id.
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("user #{}", self.id))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id":1,"name":"Ana"}"#).expect("Failed to parse profile");
        assert_eq!(profile.id, 1);
        assert_eq!(profile.extra.get("name"), Some(&Value::from("Ana")));

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back, serde_json::json!({"id": 1, "name": "Ana"}));
    }

    #[test]
    fn test_profile_from_backend() {
        let json = r#"{"id":7,"email":"test@lifehub.local","full_name":"Usuario Test","created_at":"2025-01-02T10:00:00Z"}"#;
        let profile: UserProfile = serde_json::from_str(json).expect("Failed to parse profile");
        assert_eq!(profile.display_name(), "Usuario Test");
        assert!(profile.created_at.is_some());
        assert!(profile.extra.is_empty());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut profile: UserProfile = serde_json::from_str(r#"{"id":3}"#).unwrap();
        assert_eq!(profile.display_name(), "user #3");

        profile.email = Some("a@b.c".to_string());
        profile.full_name = Some("  ".to_string());
        assert_eq!(profile.display_name(), "a@b.c");
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"jwt"}"#).unwrap();
        assert_eq!(token.access_token, "jwt");
        assert_eq!(token.token_type, "bearer");
    }
}
