//! External request/response API: case initialization and transcript
//! persistence.
//!
//! The backend contract is consumed, not owned, here. Failure responses
//! carry a `detail` message which is surfaced to the user verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::SessionError;
use crate::session::SaveCandidate;

/// Request body for case initialization.
#[derive(Debug, Clone, Serialize)]
pub struct StartCaseRequest {
    pub incident_description: String,
    pub evidence: String,
    pub session_id: String,
}

/// Request body for transcript persistence.
#[derive(Debug, Clone, Serialize)]
pub struct SaveDebateRequest {
    pub session_id: String,
    pub debate_history: Value,
    pub ipc_section: Option<String>,
    pub similar_case: Option<Value>,
}

impl SaveDebateRequest {
    pub fn from_candidate(session_id: impl Into<String>, candidate: SaveCandidate) -> Self {
        Self {
            session_id: session_id.into(),
            debate_history: candidate.debate_history,
            ipc_section: candidate.ipc_section,
            similar_case: candidate.similar_case,
        }
    }
}

/// Error body shape used by the backend on non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
}

/// The backend operations the session controller depends on.
#[async_trait]
pub trait CaseApi: Send + Sync {
    /// Register a case submission ahead of opening the realtime channel.
    async fn start_case(&self, request: StartCaseRequest) -> Result<(), SessionError>;

    /// Persist a concluded debate.
    async fn save_debate(&self, request: SaveDebateRequest) -> Result<(), SessionError>;
}

/// HTTP implementation of [`CaseApi`].
///
/// No request timeout is configured: failure is observed only through
/// explicit error responses or transport errors, matching the channel's
/// behavior.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn failure_detail(response: reqwest::Response, fallback: &str) -> String {
        let status = response.status();
        match response.json::<ErrorDetail>().await {
            Ok(ErrorDetail { detail: Some(d) }) => d,
            _ => format!("{} (HTTP {})", fallback, status),
        }
    }
}

#[async_trait]
impl CaseApi for ApiClient {
    async fn start_case(&self, request: StartCaseRequest) -> Result<(), SessionError> {
        let url = format!("{}/api/user/start-case", self.base_url);
        debug!(%url, session_id = %request.session_id, "initializing case");

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SessionError::InitializationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let detail =
                Self::failure_detail(response, "Failed to initialize case on server.").await;
            return Err(SessionError::InitializationFailed(detail));
        }
        Ok(())
    }

    async fn save_debate(&self, request: SaveDebateRequest) -> Result<(), SessionError> {
        let url = format!("{}/api/user/save-debate", self.base_url);
        debug!(%url, session_id = %request.session_id, "saving debate");

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SessionError::SaveFailed(e.to_string()))?;

        if !response.status().is_success() {
            let detail =
                Self::failure_detail(response, "Failed to save debate to database.").await;
            return Err(SessionError::SaveFailed(detail));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_case_request_matches_wire_contract() {
        let request = StartCaseRequest {
            incident_description: "A".into(),
            evidence: "B".into(),
            session_id: "s-1".into(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "incident_description": "A",
                "evidence": "B",
                "session_id": "s-1"
            })
        );
    }

    #[test]
    fn test_save_request_built_from_candidate() {
        let candidate = SaveCandidate {
            debate_history: json!([{"round": 0}]),
            ipc_section: Some("302".into()),
            similar_case: None,
        };
        let request = SaveDebateRequest::from_candidate("s-2", candidate);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["session_id"], "s-2");
        assert_eq!(value["ipc_section"], "302");
        assert!(value["debate_history"].is_array());
    }
}
