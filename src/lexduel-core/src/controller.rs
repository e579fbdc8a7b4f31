//! Debate session controller.
//!
//! Drives one [`Session`] from submission through conclusion (or failure)
//! and optional persistence: issues the case-initialization request, opens
//! the realtime channel, pumps inbound events into the session, and exposes
//! the accumulated transcript to the presentation layer through a callback.

use tracing::{debug, info, warn};

use crate::api::{CaseApi, SaveDebateRequest, StartCaseRequest};
use crate::channel::{ChannelConnector, DebateChannel};
use crate::error::SessionError;
use crate::protocol::{ClientEvent, CounselRole};
use crate::session::{DebateState, Effect, Session};
use crate::transcript::TranscriptEntry;

/// Presentation-layer notifications, delivered in occurrence order.
#[derive(Debug)]
pub enum SessionNotification<'a> {
    /// A new transcript entry was appended.
    EntryAppended(&'a TranscriptEntry),
    /// The typing indicator changed; `None` clears it.
    TypingChanged(Option<CounselRole>),
}

/// Callback for session notifications.
pub type SessionCallback = Box<dyn Fn(SessionNotification<'_>) + Send + Sync>;

const EMPTY_FIELDS_MESSAGE: &str =
    "Please fill out both the incident description and evidence fields.";

/// Owns one realtime connection per case submission.
pub struct DebateSessionController {
    api: Box<dyn CaseApi>,
    connector: Box<dyn ChannelConnector>,
    session: Session,
    channel: Option<Box<dyn DebateChannel>>,
    callback: Option<SessionCallback>,
    /// Transcript entries already reported through the callback.
    notified: usize,
    last_typing: Option<CounselRole>,
}

impl DebateSessionController {
    pub fn new(api: Box<dyn CaseApi>, connector: Box<dyn ChannelConnector>) -> Self {
        Self {
            api,
            connector,
            session: Session::new(),
            channel: None,
            callback: None,
            notified: 0,
            last_typing: None,
        }
    }

    /// Set a callback for session notifications.
    pub fn with_callback(mut self, callback: SessionCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Submit case details and open the realtime channel.
    ///
    /// Empty input appends exactly one error notice and performs no request.
    /// A rejected or unreachable initialization request appends the server's
    /// error detail and leaves the session idle; the caller may retry with a
    /// fresh `start_session`.
    pub async fn start_session(
        &mut self,
        incident_description: &str,
        evidence: &str,
    ) -> Result<(), SessionError> {
        if incident_description.trim().is_empty() || evidence.trim().is_empty() {
            self.append(TranscriptEntry::error(EMPTY_FIELDS_MESSAGE));
            let field = if incident_description.trim().is_empty() {
                "incident_description"
            } else {
                "evidence"
            };
            return Err(SessionError::EmptyField(field));
        }

        // A prior channel is superseded before anything else happens.
        self.drop_channel().await;
        self.session.reset();
        self.notified = 0;
        self.last_typing = None;

        self.append(TranscriptEntry::status("Submitting case details..."));

        let request = StartCaseRequest {
            incident_description: incident_description.to_string(),
            evidence: evidence.to_string(),
            session_id: self.session.session_id().to_string(),
        };
        if let Err(e) = self.api.start_case(request).await {
            warn!(error = %e, "case initialization failed");
            self.append(TranscriptEntry::error(detail_of(&e)));
            return Err(e);
        }

        self.append(TranscriptEntry::status("Connecting to debate server..."));
        self.session.set_connecting();

        match self.connector.connect().await {
            Ok(channel) => {
                info!(session_id = %self.session.session_id(), "channel opened");
                self.channel = Some(channel);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "channel connection failed");
                self.append(TranscriptEntry::error(detail_of(&e)));
                Err(e)
            }
        }
    }

    /// Pump inbound events until the debate reaches a terminal state.
    ///
    /// Returns the terminal [`DebateState`]. If the channel dies without a
    /// terminal event the session is left as-is and `ChannelClosed` is
    /// returned; the caller may start a fresh session.
    pub async fn run_to_completion(&mut self) -> Result<DebateState, SessionError> {
        loop {
            let event = match self.channel.as_mut() {
                Some(channel) => channel.next_event().await,
                None => return Err(SessionError::ChannelClosed),
            };

            let Some(event) = event else {
                self.drop_channel().await;
                if self.session.debate_state().is_terminal() {
                    break;
                }
                return Err(SessionError::ChannelClosed);
            };

            debug!(?event, "inbound channel event");
            let effect = self.session.apply(event);

            // The join + begin-debate commands go out before the connected
            // status notice is reported.
            if effect == Effect::SendHandshake {
                self.send_handshake().await?;
            }
            self.notify();
            if effect == Effect::CloseChannel {
                self.drop_channel().await;
                break;
            }
        }
        Ok(self.session.debate_state())
    }

    /// Persist the concluded debate, then supersede the session.
    ///
    /// On a non-concluded session this is a rejection, not a transcript
    /// mutation: the caller is expected to gate on conclusion.
    pub async fn save_and_reset(&mut self) -> Result<(), SessionError> {
        if self.session.debate_state() != DebateState::Concluded {
            return Err(SessionError::NoSaveCandidate);
        }
        let candidate = self
            .session
            .save_candidate()
            .cloned()
            .ok_or(SessionError::NoSaveCandidate)?;

        self.append(TranscriptEntry::status("Saving debate to database..."));

        let request =
            SaveDebateRequest::from_candidate(self.session.session_id(), candidate);
        if let Err(e) = self.api.save_debate(request).await {
            warn!(error = %e, "save failed");
            self.append(TranscriptEntry::error(detail_of(&e)));
            return Err(e);
        }

        self.append(TranscriptEntry::status("Debate saved successfully!"));
        info!(session_id = %self.session.session_id(), "debate saved, session superseded");
        self.session.reset();
        self.notified = 0;
        self.last_typing = None;
        Ok(())
    }

    /// Unconditional teardown; no further events are processed afterwards.
    pub async fn close(&mut self) {
        self.drop_channel().await;
    }

    async fn send_handshake(&mut self) -> Result<(), SessionError> {
        let session_id = self.session.session_id().to_string();
        if let Some(channel) = self.channel.as_mut() {
            channel
                .emit(ClientEvent::JoinRoom {
                    session_id: session_id.clone(),
                })
                .await?;
            channel
                .emit(ClientEvent::StartDebateFlow { session_id })
                .await?;
        }
        Ok(())
    }

    async fn drop_channel(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close().await;
        }
    }

    fn append(&mut self, entry: TranscriptEntry) {
        self.session.push_entry(entry);
        self.notify();
    }

    /// Report entries appended since the last notification, then any typing
    /// change. Typing is cleared in the same batch as the argument entry
    /// that superseded it, never before.
    fn notify(&mut self) {
        let transcript = self.session.transcript();
        if let Some(callback) = &self.callback {
            for entry in &transcript[self.notified..] {
                callback(SessionNotification::EntryAppended(entry));
            }
        }
        self.notified = transcript.len();

        let typing = self.session.pending_typing();
        if typing != self.last_typing {
            if let Some(callback) = &self.callback {
                callback(SessionNotification::TypingChanged(typing));
            }
            self.last_typing = typing;
        }
    }
}

/// Message to surface in the transcript for a failed collaborator call.
fn detail_of(error: &SessionError) -> String {
    match error {
        SessionError::InitializationFailed(detail)
        | SessionError::ChannelError(detail)
        | SessionError::SaveFailed(detail) => detail.clone(),
        other => other.to_string(),
    }
}
