//! Data Transfer Objects - request bodies accepted by the API.

use serde::{Deserialize, Serialize};

/// Signup form posted as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn is_complete(&self) -> bool {
        !self.full_name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.password.is_empty()
    }
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Contact form submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub topic: String,
    pub message: String,
}

/// Newsletter subscription.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Urlencoded comment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub content: String,
}

/// `GET /blog/all` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_reads_camel_case_and_tolerates_missing_fields() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"fullName":"Ada","email":"ada@x.io"}"#).unwrap();

        assert_eq!(req.full_name, "Ada");
        assert!(req.password.is_empty());
        assert!(!req.is_complete());
    }
}
