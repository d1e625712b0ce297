//! JSON response bodies.

use serde::{Deserialize, Serialize};

/// Error body: `{"error": "..."}`, with a login redirect hint for session failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            redirect: None,
        }
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }
}

/// `{"status": "success", ...}` with either a redirect target or a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn redirect(to: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            redirect: Some(to.into()),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            redirect: None,
            message: Some(message.into()),
        }
    }
}

/// Result of a like toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub status: String,
    pub likes: i64,
    pub is_liked: bool,
}

impl LikeResponse {
    pub fn new(likes: i64, is_liked: bool) -> Self {
        Self {
            status: "success".to_string(),
            likes,
            is_liked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_omits_missing_redirect() {
        let body = serde_json::to_value(ErrorBody::new("nope")).unwrap();
        assert_eq!(body, json!({"error": "nope"}));

        let body =
            serde_json::to_value(ErrorBody::new("Please log in").with_redirect("/user/login"))
                .unwrap();
        assert_eq!(body, json!({"error": "Please log in", "redirect": "/user/login"}));
    }

    #[test]
    fn test_like_response_shape() {
        let body = serde_json::to_value(LikeResponse::new(3, true)).unwrap();
        assert_eq!(body, json!({"status": "success", "likes": 3, "isLiked": true}));
    }
}
