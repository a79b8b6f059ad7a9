//! Messages, claps and voice notes between partners.

use chrono::{DateTime, TimeZone, Utc};
use fit_core::{daily_claps, window_start, DailyClaps};
use fit_store::{MessageQuery, NewMessage, NewVoiceRecording, RecordStore};
use fit_types::{Message, MessageKind, UserId, VoiceRecording};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// Content stored on clap messages.
pub const CLAP_CONTENT: &str = "👏";

/// Content stored on voice messages; the audio lives in the attachment.
pub const VOICE_CONTENT: &str = "🎤 Voice message";

/// What the viewer is sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encouragement {
    /// Free text.
    Text(String),
    /// A sticker glyph.
    Sticker(String),
    /// A number of claps (at least 1).
    Clap(u32),
    /// A recorded voice note.
    Voice {
        /// Reference to the stored audio.
        audio_ref: String,
        /// Approximate duration in seconds.
        duration_secs: u32,
    },
}

impl Encouragement {
    fn kind(&self) -> MessageKind {
        match self {
            Encouragement::Text(_) => MessageKind::Text,
            Encouragement::Sticker(_) => MessageKind::Sticker,
            Encouragement::Clap(_) => MessageKind::Clap,
            Encouragement::Voice { .. } => MessageKind::Voice,
        }
    }
}

/// A message to the viewer's partner.
#[derive(Debug, Clone)]
pub struct SendMessage {
    /// Message body.
    pub body: Encouragement,
    /// Creation time; now when absent.
    pub created_at: Option<DateTime<Utc>>,
    /// Extra metadata.
    pub metadata: Map<String, Value>,
}

impl SendMessage {
    /// A message carrying `body`, created now.
    pub fn new(body: Encouragement) -> Self {
        Self {
            body,
            created_at: None,
            metadata: Map::new(),
        }
    }

    /// Backdate or forward-date the message.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// A stored message and, for voice notes, its recording.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    /// The stored message.
    pub message: Message,
    /// The stored recording (voice messages only).
    pub recording: Option<VoiceRecording>,
}

/// Sends encouragement and aggregates claps.
pub struct EncouragementService<S> {
    store: S,
    clap_window_days: u32,
}

impl<S: RecordStore> EncouragementService<S> {
    /// Create a service over `store`.
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            clap_window_days: config.encouragement.clap_window_days,
        }
    }

    /// Send `req` from `viewer` to the viewer's current partner.
    pub async fn send_message(&self, viewer: &UserId, req: SendMessage) -> ClientResult<SentMessage> {
        let (content, clap_count) = match &req.body {
            Encouragement::Text(text) | Encouragement::Sticker(text) => {
                if text.trim().is_empty() {
                    return Err(ClientError::InvalidInput("Message cannot be empty".into()));
                }
                (text.clone(), None)
            }
            Encouragement::Clap(count) => {
                if *count == 0 {
                    return Err(ClientError::InvalidInput(
                        "Send at least one clap".into(),
                    ));
                }
                (CLAP_CONTENT.to_string(), Some(*count))
            }
            Encouragement::Voice { audio_ref, .. } => {
                if audio_ref.trim().is_empty() {
                    return Err(ClientError::InvalidInput(
                        "Voice message has no recording".into(),
                    ));
                }
                (VOICE_CONTENT.to_string(), None)
            }
        };

        let profile = self
            .store
            .find_profile(viewer)
            .await?
            .ok_or(ClientError::ProfileNotFound(*viewer))?;
        let partner = profile.partner_id.ok_or(ClientError::NotPaired)?;

        let kind = req.body.kind();
        let message = self
            .store
            .insert_message(NewMessage {
                sender_id: *viewer,
                recipient_id: partner,
                content,
                kind,
                clap_count,
                created_at: req.created_at.unwrap_or_else(Utc::now),
                metadata: req.metadata,
            })
            .await?;

        let recording = match req.body {
            Encouragement::Voice {
                audio_ref,
                duration_secs,
            } => {
                let stored = self
                    .store
                    .insert_voice_recording(NewVoiceRecording {
                        message_id: message.id,
                        audio_ref,
                        duration_secs,
                    })
                    .await
                    .map_err(|e| {
                        error!(message = %message.id, error = %e, "voice attachment not stored");
                        e
                    })?;
                Some(stored)
            }
            _ => None,
        };

        info!(
            user = %viewer,
            partner = %partner,
            kind = kind.as_str(),
            "message sent"
        );
        Ok(SentMessage { message, recording })
    }

    /// Clap totals of `viewer` per local day over the trailing window,
    /// with days taken in the timezone of `now`.
    pub async fn daily_claps<Tz: TimeZone>(
        &self,
        viewer: &UserId,
        now: &DateTime<Tz>,
    ) -> ClientResult<DailyClaps> {
        let messages = self
            .store
            .query_messages(&MessageQuery {
                participant: *viewer,
                kind: Some(MessageKind::Clap),
                since: Some(window_start(now, self.clap_window_days)),
                limit: None,
            })
            .await?;
        debug!(user = %viewer, count = messages.len(), "fetched clap history");
        Ok(daily_claps(&messages, viewer, now, self.clap_window_days))
    }
}
