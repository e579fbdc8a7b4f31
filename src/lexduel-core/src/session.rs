//! Session state machine for one debate.
//!
//! A [`Session`] is pure state: it owns the transcript and the small debate
//! state machine, and maps inbound channel events to transcript mutations.
//! All I/O (the HTTP API, the realtime channel) lives in the controller, so
//! every transition here is unit-testable without a socket.

use serde_json::Value;
use uuid::Uuid;

use crate::protocol::{ArgumentEvent, CounselRole, ServerEvent};
use crate::transcript::{CaseContext, EntryBody, TranscriptEntry};

/// State of the underlying realtime connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Lifecycle of the debate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebateState {
    /// No debate running; accepts a new submission.
    Idle,
    /// Handshake sent, waiting for the round-0 argument.
    AwaitingFirstArgument,
    /// Arguments are flowing.
    InProgress,
    /// Terminal: verdict received, save available.
    Concluded,
    /// Terminal: server reported failure.
    Failed,
}

impl DebateState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DebateState::Concluded | DebateState::Failed)
    }
}

/// Concluded debate data retained until the user confirms persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveCandidate {
    pub debate_history: Value,
    pub ipc_section: Option<String>,
    pub similar_case: Option<Value>,
}

/// What the controller must do after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The channel reported connected: emit the join + begin-debate commands.
    SendHandshake,
    /// A terminal event landed: close the channel.
    CloseChannel,
}

/// One user-initiated debate interaction.
#[derive(Debug)]
pub struct Session {
    session_id: String,
    connection_state: ConnectionState,
    debate_state: DebateState,
    transcript: Vec<TranscriptEntry>,
    pending_typing: Option<CounselRole>,
    initial_case_context: Option<CaseContext>,
    save_candidate: Option<SaveCandidate>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            connection_state: ConnectionState::Disconnected,
            debate_state: DebateState::Idle,
            transcript: Vec::new(),
            pending_typing: None,
            initial_case_context: None,
            save_candidate: None,
        }
    }

    /// Supersede this session: mint a fresh id, drop all accumulated state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    pub fn debate_state(&self) -> DebateState {
        self.debate_state
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn pending_typing(&self) -> Option<CounselRole> {
        self.pending_typing
    }

    pub fn save_candidate(&self) -> Option<&SaveCandidate> {
        self.save_candidate.as_ref()
    }

    /// Take the save candidate, leaving none. Used after a successful save.
    pub fn take_save_candidate(&mut self) -> Option<SaveCandidate> {
        self.save_candidate.take()
    }

    pub fn set_connecting(&mut self) {
        self.connection_state = ConnectionState::Connecting;
    }

    /// Append an entry directly (status/error notices from the controller).
    pub fn push_entry(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
    }

    /// Apply one inbound channel event.
    ///
    /// Once the debate is terminal the channel is dead to this session:
    /// every further event is dropped without mutating anything.
    pub fn apply(&mut self, event: ServerEvent) -> Effect {
        if self.debate_state.is_terminal() {
            tracing::debug!(?event, "ignoring event after terminal state");
            return Effect::None;
        }

        match event {
            ServerEvent::Connect => {
                self.connection_state = ConnectionState::Connected;
                self.pending_typing = None;
                self.debate_state = DebateState::AwaitingFirstArgument;
                self.transcript.push(TranscriptEntry::status(
                    "Connected! Waiting for debate to begin...",
                ));
                Effect::SendHandshake
            }
            ServerEvent::Disconnect => {
                self.connection_state = ConnectionState::Disconnected;
                Effect::None
            }
            ServerEvent::Error { message } => {
                self.transcript.push(TranscriptEntry::error(message));
                Effect::None
            }
            ServerEvent::CaseDetails(details) => {
                self.initial_case_context = Some(details);
                Effect::None
            }
            ServerEvent::Typing { role } => {
                self.pending_typing = Some(role);
                Effect::None
            }
            ServerEvent::NewArgument(arg) => {
                self.pending_typing = None;
                self.push_argument(arg);
                self.debate_state = DebateState::InProgress;
                Effect::None
            }
            ServerEvent::DebateConcluded(done) => {
                self.pending_typing = None;
                self.transcript.push(TranscriptEntry::conclusion(&done));
                self.save_candidate = Some(SaveCandidate {
                    debate_history: done.debate_history,
                    ipc_section: done.ipc_section,
                    similar_case: done.similar_case,
                });
                self.debate_state = DebateState::Concluded;
                self.connection_state = ConnectionState::Disconnected;
                Effect::CloseChannel
            }
            ServerEvent::DebateFailed(failed) => {
                self.pending_typing = None;
                let message = failed
                    .message
                    .unwrap_or_else(|| "The debate failed on the server.".to_string());
                self.transcript.push(TranscriptEntry::error(message));
                self.debate_state = DebateState::Failed;
                self.connection_state = ConnectionState::Disconnected;
                Effect::CloseChannel
            }
        }
    }

    /// Round 0 with stored case context becomes the single initial-analysis
    /// entry, consuming the context. A round-0 argument arriving without
    /// context degrades to an ordinary debate-argument entry.
    fn push_argument(&mut self, arg: ArgumentEvent) {
        if arg.round == 0 && self.initial_case_context.is_some() {
            let context = self.initial_case_context.take().unwrap_or_default();
            self.transcript.push(TranscriptEntry::new(EntryBody::InitialAnalysis {
                argument: arg.argument,
                context,
            }));
        } else {
            self.transcript.push(TranscriptEntry::new(EntryBody::DebateArgument {
                round: arg.round,
                role: arg.role,
                argument: arg.argument,
            }));
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Argument, CaseDetails, ConcludedEvent, FailedEvent};
    use serde_json::json;

    fn argument_event(round: u32, role: Option<CounselRole>, point: &str) -> ServerEvent {
        ServerEvent::NewArgument(ArgumentEvent {
            round,
            role,
            argument: Argument {
                point: Some(point.into()),
                evidence: vec![],
                demand: None,
            },
        })
    }

    fn case_details(section: &str) -> ServerEvent {
        ServerEvent::CaseDetails(CaseDetails {
            processed_prompt: None,
            ipc_section: Some(section.into()),
            similar_case: None,
        })
    }

    #[test]
    fn test_connect_requests_handshake_and_appends_status() {
        let mut session = Session::new();
        let effect = session.apply(ServerEvent::Connect);
        assert_eq!(effect, Effect::SendHandshake);
        assert_eq!(session.connection_state(), ConnectionState::Connected);
        assert_eq!(session.debate_state(), DebateState::AwaitingFirstArgument);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_round_zero_with_context_becomes_initial_analysis() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        session.apply(case_details("302"));
        // Case details are held back, not appended.
        assert_eq!(session.transcript().len(), 1);

        session.apply(argument_event(0, None, "P"));
        let entry = session.transcript().last().unwrap();
        match &entry.body {
            EntryBody::InitialAnalysis { argument, context } => {
                assert_eq!(argument.point.as_deref(), Some("P"));
                assert_eq!(context.ipc_section.as_deref(), Some("302"));
            }
            other => panic!("expected initial analysis, got {:?}", other),
        }

        // The context is consumed exactly once: a second round-0 argument
        // falls through to a plain debate-argument entry.
        session.apply(argument_event(0, Some(CounselRole::Supporting), "Q"));
        assert!(!session.transcript().last().unwrap().is_initial_analysis());
    }

    #[test]
    fn test_round_zero_without_context_degrades_to_debate_argument() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        session.apply(argument_event(0, None, "P"));
        let entry = session.transcript().last().unwrap();
        assert!(!entry.is_initial_analysis());
        assert_eq!(entry.round(), Some(0));
    }

    #[test]
    fn test_transcript_preserves_arrival_order_with_one_initial_analysis() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        session.apply(case_details("420"));
        session.apply(argument_event(0, None, "opening"));
        session.apply(argument_event(1, Some(CounselRole::Opposing), "rebuttal"));
        session.apply(argument_event(2, Some(CounselRole::Supporting), "reply"));

        let rounds: Vec<Option<u32>> =
            session.transcript().iter().map(|e| e.round()).collect();
        assert_eq!(rounds, vec![None, Some(0), Some(1), Some(2)]);
        let initial_count = session
            .transcript()
            .iter()
            .filter(|e| e.is_initial_analysis())
            .count();
        assert_eq!(initial_count, 1);
    }

    #[test]
    fn test_typing_cleared_exactly_when_argument_appends() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        session.apply(ServerEvent::Typing {
            role: CounselRole::Opposing,
        });
        assert_eq!(session.pending_typing(), Some(CounselRole::Opposing));

        // Unrelated events leave the indicator alone.
        session.apply(ServerEvent::Error {
            message: "hiccup".into(),
        });
        assert_eq!(session.pending_typing(), Some(CounselRole::Opposing));

        session.apply(argument_event(1, Some(CounselRole::Opposing), "point"));
        assert_eq!(session.pending_typing(), None);
    }

    #[test]
    fn test_conclusion_is_terminal_and_freezes_transcript() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        session.apply(argument_event(0, None, "opening"));

        let effect = session.apply(ServerEvent::DebateConcluded(ConcludedEvent {
            debate_history: json!([{"round": 0}]),
            ipc_section: Some("302".into()),
            similar_case: None,
            total_rounds: Some(1),
        }));
        assert_eq!(effect, Effect::CloseChannel);
        assert_eq!(session.debate_state(), DebateState::Concluded);
        assert!(session.save_candidate().is_some());

        let frozen = session.transcript().len();
        assert_eq!(session.apply(argument_event(2, None, "late")), Effect::None);
        assert_eq!(
            session.apply(ServerEvent::Error {
                message: "late".into()
            }),
            Effect::None
        );
        assert_eq!(session.transcript().len(), frozen);
    }

    #[test]
    fn test_failure_is_terminal_and_leaves_no_save_candidate() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        let effect = session.apply(ServerEvent::DebateFailed(FailedEvent {
            message: Some("timeout".into()),
        }));
        assert_eq!(effect, Effect::CloseChannel);
        assert_eq!(session.debate_state(), DebateState::Failed);
        assert!(session.save_candidate().is_none());

        let last = session.transcript().last().unwrap();
        assert!(last.is_error());
        match &last.body {
            EntryBody::ErrorNotice { message } => assert_eq!(message, "timeout"),
            other => panic!("expected error notice, got {:?}", other),
        }
    }

    #[test]
    fn test_error_event_does_not_change_debate_state() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        session.apply(ServerEvent::Error {
            message: "transient".into(),
        });
        assert_eq!(session.debate_state(), DebateState::AwaitingFirstArgument);
        assert!(session.transcript().last().unwrap().is_error());
    }

    #[test]
    fn test_disconnect_mutates_nothing_but_connection_state() {
        let mut session = Session::new();
        session.apply(ServerEvent::Connect);
        let len = session.transcript().len();
        session.apply(ServerEvent::Disconnect);
        assert_eq!(session.connection_state(), ConnectionState::Disconnected);
        assert_eq!(session.transcript().len(), len);
    }

    #[test]
    fn test_reset_mints_a_fresh_identity() {
        let mut session = Session::new();
        let old_id = session.session_id().to_string();
        session.apply(ServerEvent::Connect);
        session.reset();
        assert_ne!(session.session_id(), old_id);
        assert!(session.transcript().is_empty());
        assert_eq!(session.debate_state(), DebateState::Idle);
    }
}
