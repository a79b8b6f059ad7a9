//! Record types read from and written to the record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;
use crate::ids::{MessageId, RecordingId, UserId, WorkoutId};
use crate::invite::InviteCode;

/// Fallback shown when a partner has no display name.
pub const DEFAULT_PARTNER_LABEL: &str = "Partner";

/// One profile per user account.
///
/// `partner_id` is either empty on both sides of a pairing or points at a
/// profile whose own `partner_id` points back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning user.
    pub user_id: UserId,
    /// Display name chosen by the user.
    pub display_name: Option<String>,
    /// Avatar reference (URL or storage key).
    pub avatar_url: Option<String>,
    /// Invite code assigned at creation; never changes.
    pub invite_code: InviteCode,
    /// Current partner, if paired.
    pub partner_id: Option<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Whether this profile currently references a partner.
    pub fn is_paired(&self) -> bool {
        self.partner_id.is_some()
    }

    /// Whether this profile references `other` as its partner.
    pub fn is_paired_with(&self, other: &UserId) -> bool {
        self.partner_id.as_ref() == Some(other)
    }

    /// Name to show for this profile when it is someone's partner.
    pub fn partner_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_PARTNER_LABEL)
    }
}

/// Kind of exercise session.
///
/// The known categories are matched case-insensitively; anything else is
/// kept verbatim as [`ActivityType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityType {
    /// Running, cycling, rowing...
    Cardio,
    /// Weights and resistance work.
    Strength,
    /// Yoga, stretching, mobility.
    Flexibility,
    /// Team or racket sports.
    Sports,
    /// Free-form activity label.
    Other(String),
}

impl ActivityType {
    /// Label used for storage and display.
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Cardio => "Cardio",
            ActivityType::Strength => "Strength",
            ActivityType::Flexibility => "Flexibility",
            ActivityType::Sports => "Sports",
            ActivityType::Other(label) => label,
        }
    }
}

impl From<&str> for ActivityType {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "cardio" => ActivityType::Cardio,
            "strength" => ActivityType::Strength,
            "flexibility" => ActivityType::Flexibility,
            "sports" => ActivityType::Sports,
            _ => ActivityType::Other(trimmed.to_string()),
        }
    }
}

impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        ActivityType::from(value.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ActivityType::from(s))
    }
}

impl From<ActivityType> for String {
    fn from(value: ActivityType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged exercise session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    /// Workout identifier.
    pub id: WorkoutId,
    /// Owning user.
    pub user_id: UserId,
    /// Kind of session.
    pub activity_type: ActivityType,
    /// Duration in minutes.
    pub duration_minutes: u32,
    /// Calorie estimate, if known.
    pub calories: Option<u32>,
    /// When the session was completed.
    pub completed_at: DateTime<Utc>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Kind of encouragement message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text.
    Text,
    /// Sticker glyph.
    Sticker,
    /// Voice note placeholder; the audio lives in a [`VoiceRecording`].
    Voice,
    /// Clap burst carrying a clap count.
    Clap,
}

impl MessageKind {
    /// Storage discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Sticker => "sticker",
            MessageKind::Voice => "voice",
            MessageKind::Clap => "clap",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "sticker" => Ok(MessageKind::Sticker),
            "voice" => Ok(MessageKind::Voice),
            "clap" => Ok(MessageKind::Clap),
            other => Err(TypeError::UnknownMessageKind(other.to_string())),
        }
    }
}

/// One encouragement event between partners. Immutable, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: MessageId,
    /// Sending user.
    pub sender_id: UserId,
    /// Receiving user.
    pub recipient_id: UserId,
    /// Text, sticker glyph, or voice placeholder.
    pub content: String,
    /// Message kind.
    pub kind: MessageKind,
    /// Clap count; only set for [`MessageKind::Clap`].
    pub clap_count: Option<u32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Free-form metadata bag.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    /// Claps carried by this message (1 when no count, or a zero count,
    /// was recorded).
    pub fn claps(&self) -> u32 {
        self.clap_count.filter(|&n| n > 0).unwrap_or(1)
    }

    /// Whether `user` sent or received this message.
    pub fn involves(&self, user: &UserId) -> bool {
        &self.sender_id == user || &self.recipient_id == user
    }
}

/// Audio attachment of a voice message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRecording {
    /// Recording identifier.
    pub id: RecordingId,
    /// The voice message this recording belongs to.
    pub message_id: MessageId,
    /// Reference to the stored audio.
    pub audio_ref: String,
    /// Approximate duration in seconds.
    pub duration_secs: u32,
}
