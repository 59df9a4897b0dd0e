use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// `{"success": true}`
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserForm {
    pub username: String,
}

/// Body of `POST /admin/api/update`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateConfigRequest {
    pub key: Option<String>,
    pub value: Option<serde_json::Value>,
}

impl UpdateConfigRequest {
    /// The value as stored text. Non-string JSON scalars use their JSON
    /// spelling; a missing or null value stores "".
    #[must_use]
    pub fn value_text(&self) -> String {
        match &self.value {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response_has_no_payload() {
        let json = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));
    }

    #[test]
    fn test_error_response() {
        let json = serde_json::to_value(ApiResponse::error("Key missing")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Key missing" })
        );
    }

    #[test]
    fn test_update_request_value_text() {
        let parse = |body: &str| serde_json::from_str::<UpdateConfigRequest>(body).unwrap();

        assert_eq!(parse(r#"{"key":"a","value":"6"}"#).value_text(), "6");
        assert_eq!(parse(r#"{"key":"a","value":6}"#).value_text(), "6");
        assert_eq!(parse(r#"{"key":"a","value":true}"#).value_text(), "true");
        assert_eq!(parse(r#"{"key":"a","value":null}"#).value_text(), "");
        assert_eq!(parse(r#"{"key":"a"}"#).value_text(), "");
        assert!(parse("{}").key.is_none());
    }
}
