//! HTTP API client.
//!
//! Three endpoints back the visualizer: starting a conversation,
//! listing the persona profiles (display names for the roster), and
//! fetching session metadata. Start-request failures carry no partial
//! state: the caller flips its running flag back and nothing else
//! happened.

use crate::config::FeedConfig;
use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Body of `POST /api/conversation/start`.
#[derive(Debug, Clone, Serialize)]
pub struct StartConversationRequest {
    pub session_id: String,

    /// Persona the conversation is aimed at.
    pub target_profile_id: String,

    /// Predefined profile to speak as; `None` means the session's own
    /// built profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile_id: Option<String>,

    pub max_turns: u32,

    pub enable_research: bool,

    /// Backend pacing between streamed turns.
    pub message_pause_seconds: f64,
}

/// Response of `POST /api/conversation/start`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartedConversation {
    pub conversation_id: String,

    pub status: String,

    /// Display name the backend resolved for the user side.
    #[serde(default)]
    pub user_profile: Option<String>,

    /// Display name of the target persona.
    #[serde(default)]
    pub target_profile: Option<String>,
}

/// One persona profile as listed by the backend. Only the display name
/// is load-bearing; the rest of the profile document is carried opaquely.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInfo {
    pub name: String,

    #[serde(default)]
    pub occupation: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ProfilesResponse {
    profiles: HashMap<String, ProfileInfo>,
}

/// One chat line from the session's profile-builder history.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatLine {
    pub message: String,

    /// `"bot"`, `"user"`, or `"system"`.
    pub message_type: String,

    pub timestamp: String,
}

/// Response of `GET /api/session/{session_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,

    #[serde(default)]
    pub profile: Option<Value>,

    #[serde(default)]
    pub profile_complete: bool,

    #[serde(default)]
    pub chat_history: Vec<ChatLine>,
}

/// Thin reqwest wrapper over the backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: config.http_base(),
        }
    }

    /// Asks the backend to run a conversation, streamed back over the
    /// session socket. Callers must hold an observed `Connected` state
    /// before issuing this; the request is never queued.
    pub async fn start_conversation(
        &self,
        request: &StartConversationRequest,
    ) -> Result<StartedConversation, FeedError> {
        let endpoint = format!("{}/api/conversation/start", self.base);
        debug!(target = %request.target_profile_id, "starting conversation");

        let response = self.http.post(&endpoint).json(request).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::status(endpoint, response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Fetches the persona directory, consumed once at session start to
    /// resolve display names.
    pub async fn profiles(&self) -> Result<HashMap<String, ProfileInfo>, FeedError> {
        let endpoint = format!("{}/api/profiles", self.base);

        let response = self.http.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::status(endpoint, response.status().as_u16()));
        }
        let listing: ProfilesResponse = response.json().await?;
        Ok(listing.profiles)
    }

    /// Fetches session metadata.
    pub async fn session(&self, session_id: &str) -> Result<SessionInfo, FeedError> {
        let endpoint = format!("{}/api/session/{}", self.base, session_id);

        let response = self.http.get(&endpoint).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::status(endpoint, response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_wire_shape() {
        let request = StartConversationRequest {
            session_id: "s1".to_string(),
            target_profile_id: "maya_chen".to_string(),
            user_profile_id: Some("jordan".to_string()),
            max_turns: 8,
            enable_research: false,
            message_pause_seconds: 2.5,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["session_id"], "s1");
        assert_eq!(value["target_profile_id"], "maya_chen");
        assert_eq!(value["user_profile_id"], "jordan");
        assert_eq!(value["max_turns"], 8);
        assert_eq!(value["enable_research"], false);
        assert_eq!(value["message_pause_seconds"], 2.5);
    }

    #[test]
    fn test_start_request_omits_absent_user_profile() {
        let request = StartConversationRequest {
            session_id: "s1".to_string(),
            target_profile_id: "maya_chen".to_string(),
            user_profile_id: None,
            max_turns: 8,
            enable_research: true,
            message_pause_seconds: 2.5,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("user_profile_id").is_none());
    }

    #[test]
    fn test_profiles_response_decodes() {
        let body = r#"{
            "profiles": {
                "maya_chen": {
                    "name": "Maya Chen",
                    "occupation": "Product designer",
                    "hobbies": ["climbing", "ceramics"]
                },
                "minimal": {"name": "Just A Name"}
            }
        }"#;

        let listing: ProfilesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(listing.profiles["maya_chen"].name, "Maya Chen");
        assert_eq!(
            listing.profiles["maya_chen"].occupation.as_deref(),
            Some("Product designer")
        );
        assert!(listing.profiles["maya_chen"].extra.contains_key("hobbies"));
        assert!(listing.profiles["minimal"].occupation.is_none());
    }

    #[test]
    fn test_started_conversation_decodes() {
        let body = r#"{
            "conversation_id": "abc-123",
            "status": "started",
            "user_profile": "Jordan",
            "target_profile": "Maya Chen"
        }"#;

        let started: StartedConversation = serde_json::from_str(body).unwrap();
        assert_eq!(started.conversation_id, "abc-123");
        assert_eq!(started.status, "started");
        assert_eq!(started.target_profile.as_deref(), Some("Maya Chen"));
    }

    #[test]
    fn test_session_info_tolerates_minimal_body() {
        let body = r#"{"session_id": "s1", "profile": null, "profile_complete": false, "chat_history": []}"#;
        let info: SessionInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.session_id, "s1");
        assert!(!info.profile_complete);
        assert!(info.chat_history.is_empty());
    }
}
