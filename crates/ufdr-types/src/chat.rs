//! Chat request/response shapes exchanged with the route layer.

use serde::{Deserialize, Serialize};

/// Incoming chat message about one report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    pub report_id: String,
    /// Base64-encoded image attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: ChatStatus,
}

impl ChatResponse {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            status: ChatStatus::Success,
        }
    }

    pub fn error(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            status: ChatStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_image_optional() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"message":"who called?","report_id":"r-1"}"#).unwrap();
        assert_eq!(msg.report_id, "r-1");
        assert!(msg.image_data.is_none());

        let msg: ChatMessage = serde_json::from_str(
            r#"{"message":"what is this?","report_id":"r-1","image_data":null}"#,
        )
        .unwrap();
        assert!(msg.image_data.is_none());
    }

    #[test]
    fn test_chat_response_status_wire_format() {
        let ok = serde_json::to_value(ChatResponse::success("done")).unwrap();
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["response"], "done");

        let err = serde_json::to_value(ChatResponse::error("boom")).unwrap();
        assert_eq!(err["status"], "error");
    }
}
