use serde::{Deserialize, Serialize};

/// Literal the server puts in `status` when an action completed.
pub const STATUS_SUCCESS: &str = "success";

/// JSON body returned by the `*-ajax` endpoints.
///
/// Every field is optional on the wire: the server only sets `image_url` on
/// success and only sets `message` when it has something to say.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Success { image_url: String },
    Failure { message: String },
}

impl ActionResult {
    /// Interprets a decoded body. Anything other than a `success` status
    /// carrying a usable `image_url` is a failure; empty server messages are
    /// replaced by `fallback`, and so is the message of a `success` body
    /// that lacks the image.
    pub fn from_response(response: ActionResponse, fallback: &str) -> Self {
        let succeeded = response.status.as_deref() == Some(STATUS_SUCCESS);
        match response.image_url {
            Some(image_url) if succeeded && !image_url.is_empty() => {
                ActionResult::Success { image_url }
            }
            _ => ActionResult::Failure {
                message: response
                    .message
                    .filter(|m| !succeeded && !m.is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            },
        }
    }

    /// Decodes an arbitrary JSON value. Bodies that are JSON but not an
    /// object of the expected shape count as failures, not transport errors.
    pub fn from_json(value: serde_json::Value, fallback: &str) -> Self {
        let response = serde_json::from_value::<ActionResponse>(value).unwrap_or_default();
        Self::from_response(response, fallback)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }
}
