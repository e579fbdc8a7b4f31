//! LexDuel Core Library
//!
//! Client-side session controller for the live legal debate service:
//! typed event protocol, transcript accumulation, session state machine,
//! realtime channel transport, and the external API contract.

pub mod api;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transcript;

pub use api::{ApiClient, CaseApi, SaveDebateRequest, StartCaseRequest};
pub use channel::{ChannelConnector, DebateChannel, WsChannel, WsConnector};
pub use config::{ClientConfig, EndpointsConfig};
pub use controller::{DebateSessionController, SessionCallback, SessionNotification};
pub use error::SessionError;
pub use protocol::{Argument, CaseDetails, ClientEvent, CounselRole, ServerEvent, SimilarCase};
pub use session::{ConnectionState, DebateState, SaveCandidate, Session};
pub use transcript::{EntryBody, TranscriptEntry};
