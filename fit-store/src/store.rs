//! The record store contract.
//!
//! One typed trait covers the find/insert/update/query operations for the
//! four record kinds. The pairing write is exposed as a compare-and-swap
//! (`set_partner_if_empty`) so the two-sided link never overwrites a
//! partner reference written by a concurrent caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fit_types::{
    ActivityType, InviteCode, Message, MessageId, MessageKind, Profile, UserId, VoiceRecording,
    Workout,
};
use std::sync::Arc;

use crate::error::StorageResult;

/// Request to create a profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub display_name: Option<String>,
    /// Avatar reference.
    pub avatar_url: Option<String>,
    /// Invite code, already checked for uniqueness by the caller.
    pub invite_code: InviteCode,
}

/// Replacement values for the user-editable profile fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileDetails {
    /// New display name (`None` clears it).
    pub display_name: Option<String>,
    /// New avatar reference (`None` clears it).
    pub avatar_url: Option<String>,
}

/// Request to store a workout.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    /// Owning user.
    pub user_id: UserId,
    /// Kind of session.
    pub activity_type: ActivityType,
    /// Duration in minutes.
    pub duration_minutes: u32,
    /// Calorie estimate.
    pub calories: Option<u32>,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
    /// Notes.
    pub notes: Option<String>,
}

/// Filter for workout queries.
#[derive(Debug, Clone)]
pub struct WorkoutQuery {
    /// Owner of the workouts.
    pub user_id: UserId,
    /// Only workouts completed at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of rows.
    pub limit: u32,
}

impl WorkoutQuery {
    /// Latest `limit` workouts of `user_id`.
    pub fn recent(user_id: UserId, limit: u32) -> Self {
        Self {
            user_id,
            since: None,
            limit,
        }
    }
}

/// Request to store a message.
#[derive(Debug, Clone)]
pub struct NewMessage {
    /// Sender.
    pub sender_id: UserId,
    /// Recipient.
    pub recipient_id: UserId,
    /// Text, sticker glyph or voice placeholder.
    pub content: String,
    /// Message kind.
    pub kind: MessageKind,
    /// Clap count (clap messages only).
    pub clap_count: Option<u32>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Metadata bag.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Filter for message queries.
#[derive(Debug, Clone)]
pub struct MessageQuery {
    /// Messages sent or received by this user.
    pub participant: UserId,
    /// Restrict to one kind.
    pub kind: Option<MessageKind>,
    /// Only messages created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of rows (`None` = unbounded).
    pub limit: Option<u32>,
}

/// Request to store a voice recording for an existing message.
#[derive(Debug, Clone)]
pub struct NewVoiceRecording {
    /// The voice message.
    pub message_id: MessageId,
    /// Reference to the audio.
    pub audio_ref: String,
    /// Approximate duration in seconds.
    pub duration_secs: u32,
}

/// Trait for record store backends.
///
/// Queries return rows newest first. No method holds state across calls;
/// every read goes to the backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up the profile of `user_id`.
    async fn find_profile(&self, user_id: &UserId) -> StorageResult<Option<Profile>>;

    /// Look up the profile holding `code`.
    async fn find_profile_by_invite_code(&self, code: &InviteCode)
        -> StorageResult<Option<Profile>>;

    /// Create a profile with no partner.
    ///
    /// Fails with `DuplicateInviteCode` or `DuplicateProfile` on collision.
    async fn insert_profile(&self, req: NewProfile) -> StorageResult<Profile>;

    /// Replace display name and avatar. Never touches code or partner.
    async fn update_profile_details(
        &self,
        user_id: &UserId,
        details: ProfileDetails,
    ) -> StorageResult<Profile>;

    /// Set `user_id`'s partner to `partner_id` only if it is currently empty.
    ///
    /// Returns `true` if the write happened, `false` if a partner was
    /// already set. Fails with `ProfileNotFound` if there is no profile.
    async fn set_partner_if_empty(
        &self,
        user_id: &UserId,
        partner_id: &UserId,
    ) -> StorageResult<bool>;

    /// Clear `user_id`'s partner only if it currently equals `expected`.
    ///
    /// Returns `true` if the reference was cleared.
    async fn clear_partner_if(&self, user_id: &UserId, expected: &UserId) -> StorageResult<bool>;

    /// All profiles with a non-empty partner reference.
    async fn list_paired_profiles(&self) -> StorageResult<Vec<Profile>>;

    /// Store a workout and return it with its assigned id.
    async fn insert_workout(&self, req: NewWorkout) -> StorageResult<Workout>;

    /// Workouts matching `query`, newest `completed_at` first.
    async fn query_workouts(&self, query: &WorkoutQuery) -> StorageResult<Vec<Workout>>;

    /// Store a message and return it with its assigned id.
    async fn insert_message(&self, req: NewMessage) -> StorageResult<Message>;

    /// Messages matching `query`, newest `created_at` first.
    async fn query_messages(&self, query: &MessageQuery) -> StorageResult<Vec<Message>>;

    /// Attach a voice recording to an existing message.
    async fn insert_voice_recording(&self, req: NewVoiceRecording)
        -> StorageResult<VoiceRecording>;

    /// Recording attached to `message_id`, if any.
    async fn find_voice_recording(
        &self,
        message_id: &MessageId,
    ) -> StorageResult<Option<VoiceRecording>>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn find_profile(&self, user_id: &UserId) -> StorageResult<Option<Profile>> {
        (**self).find_profile(user_id).await
    }

    async fn find_profile_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> StorageResult<Option<Profile>> {
        (**self).find_profile_by_invite_code(code).await
    }

    async fn insert_profile(&self, req: NewProfile) -> StorageResult<Profile> {
        (**self).insert_profile(req).await
    }

    async fn update_profile_details(
        &self,
        user_id: &UserId,
        details: ProfileDetails,
    ) -> StorageResult<Profile> {
        (**self).update_profile_details(user_id, details).await
    }

    async fn set_partner_if_empty(
        &self,
        user_id: &UserId,
        partner_id: &UserId,
    ) -> StorageResult<bool> {
        (**self).set_partner_if_empty(user_id, partner_id).await
    }

    async fn clear_partner_if(&self, user_id: &UserId, expected: &UserId) -> StorageResult<bool> {
        (**self).clear_partner_if(user_id, expected).await
    }

    async fn list_paired_profiles(&self) -> StorageResult<Vec<Profile>> {
        (**self).list_paired_profiles().await
    }

    async fn insert_workout(&self, req: NewWorkout) -> StorageResult<Workout> {
        (**self).insert_workout(req).await
    }

    async fn query_workouts(&self, query: &WorkoutQuery) -> StorageResult<Vec<Workout>> {
        (**self).query_workouts(query).await
    }

    async fn insert_message(&self, req: NewMessage) -> StorageResult<Message> {
        (**self).insert_message(req).await
    }

    async fn query_messages(&self, query: &MessageQuery) -> StorageResult<Vec<Message>> {
        (**self).query_messages(query).await
    }

    async fn insert_voice_recording(
        &self,
        req: NewVoiceRecording,
    ) -> StorageResult<VoiceRecording> {
        (**self).insert_voice_recording(req).await
    }

    async fn find_voice_recording(
        &self,
        message_id: &MessageId,
    ) -> StorageResult<Option<VoiceRecording>> {
        (**self).find_voice_recording(message_id).await
    }
}
