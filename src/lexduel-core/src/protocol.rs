//! Wire protocol for the realtime debate channel.
//!
//! The debate server speaks named JSON events over a bidirectional channel.
//! Each frame is an envelope of `{"event": <name>, "data": <payload>}`.
//! Payload shapes are declared here and narrowed on receipt; the server is
//! not trusted to send well-formed objects, so optional fields default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SessionError;

/// Which side of the courtroom a counsel argues for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CounselRole {
    Supporting,
    Opposing,
}

impl CounselRole {
    pub fn display_name(&self) -> &str {
        match self {
            CounselRole::Supporting => "Supporting Counsel",
            CounselRole::Opposing => "Opposing Counsel",
        }
    }
}

/// A structured legal argument as produced by a counsel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Argument {
    /// The central point being argued.
    #[serde(default)]
    pub point: Option<String>,
    /// Evidence items cited in support.
    #[serde(default)]
    pub evidence: Vec<String>,
    /// The legal demand made on the basis of the argument.
    #[serde(default)]
    pub demand: Option<String>,
}

/// A matched precedent case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimilarCase {
    #[serde(default)]
    pub case_id_name: Option<String>,
    #[serde(default)]
    pub court: Option<String>,
    #[serde(default)]
    pub date_of_judgment: Option<String>,
    #[serde(default)]
    pub case_summary: Option<String>,
}

/// The server's refinement of the submitted incident description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProcessedPrompt {
    #[serde(default)]
    pub refined_prompt: Option<String>,
}

/// Case metadata pushed once per session, before the round-0 argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CaseDetails {
    #[serde(default)]
    pub processed_prompt: Option<ProcessedPrompt>,
    #[serde(default)]
    pub ipc_section: Option<String>,
    #[serde(default)]
    pub similar_case: Option<SimilarCase>,
}

/// Payload of a `new_argument` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArgumentEvent {
    pub round: u32,
    #[serde(default)]
    pub role: Option<CounselRole>,
    #[serde(default)]
    pub argument: Argument,
}

/// Payload of a `debate_concluded` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConcludedEvent {
    #[serde(default)]
    pub debate_history: Value,
    #[serde(default)]
    pub ipc_section: Option<String>,
    #[serde(default)]
    pub similar_case: Option<Value>,
    #[serde(default)]
    pub total_rounds: Option<u32>,
}

/// Payload of a `debate_failed` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FailedEvent {
    #[serde(default)]
    pub message: Option<String>,
}

/// Events the client emits on the channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom { session_id: String },
    StartDebateFlow { session_id: String },
}

/// Events the server (or the transport itself) delivers to the client.
///
/// `Connect` and `Disconnect` are transport-level signals; the rest carry
/// server payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connect,
    Disconnect,
    Error { message: String },
    CaseDetails(CaseDetails),
    Typing { role: CounselRole },
    NewArgument(ArgumentEvent),
    DebateConcluded(ConcludedEvent),
    DebateFailed(FailedEvent),
}

impl ClientEvent {
    /// Encode as a wire frame.
    pub fn to_frame(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerEvent {
    /// Decode a wire frame into a typed event.
    pub fn from_frame(frame: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(frame)?)
    }
}
