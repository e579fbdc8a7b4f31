//! Transcript entries accumulated over a debate session.
//!
//! The transcript is append-only while a session is live; array position is
//! the ordering source. Timestamps are display-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::protocol::{Argument, CaseDetails, ConcludedEvent, CounselRole};

/// Case metadata held back until the round-0 argument arrives, then merged
/// into the initial-analysis entry.
pub type CaseContext = CaseDetails;

/// Kind-specific content of a transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryBody {
    /// Round 0: the opening supporting argument merged with the case context.
    InitialAnalysis {
        argument: Argument,
        #[serde(default)]
        context: CaseContext,
    },
    /// A numbered exchange from one of the counsels.
    DebateArgument {
        round: u32,
        role: Option<CounselRole>,
        argument: Argument,
    },
    /// The final verdict summary.
    Conclusion { total_rounds: Option<u32> },
    /// Progress messages (submitting, connecting, saving, ...).
    StatusNotice { message: String },
    /// Failures surfaced to the user.
    ErrorNotice { message: String },
}

/// One immutable entry in the session transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptEntry {
    #[serde(flatten)]
    pub body: EntryBody,
    pub created_at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(body: EntryBody) -> Self {
        Self {
            body,
            created_at: Utc::now(),
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::new(EntryBody::StatusNotice {
            message: message.into(),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EntryBody::ErrorNotice {
            message: message.into(),
        })
    }

    pub fn conclusion(event: &ConcludedEvent) -> Self {
        Self::new(EntryBody::Conclusion {
            total_rounds: event.total_rounds,
        })
    }

    /// The round this entry belongs to, where applicable.
    pub fn round(&self) -> Option<u32> {
        match &self.body {
            EntryBody::InitialAnalysis { .. } => Some(0),
            EntryBody::DebateArgument { round, .. } => Some(*round),
            _ => None,
        }
    }

    pub fn is_initial_analysis(&self) -> bool {
        matches!(self.body, EntryBody::InitialAnalysis { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, EntryBody::ErrorNotice { .. })
    }
}
