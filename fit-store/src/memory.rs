//! In-memory record store for tests and demos.
//!
//! Besides plain storage it can inject failures into partner writes and
//! simulate a concurrent pairing landing between a caller's check and its
//! write, which is how the pairing code's partial-failure and race paths
//! are exercised.

use async_trait::async_trait;
use chrono::Utc;
use fit_types::{
    InviteCode, Message, MessageId, Profile, RecordingId, UserId, VoiceRecording, Workout,
    WorkoutId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{StorageError, StorageResult};
use crate::store::{
    MessageQuery, NewMessage, NewProfile, NewVoiceRecording, NewWorkout, ProfileDetails,
    RecordStore, WorkoutQuery,
};

/// In-memory record store.
///
/// Clones share the same underlying state.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    profiles: HashMap<UserId, Profile>,
    workouts: Vec<Workout>,
    messages: Vec<Message>,
    recordings: Vec<VoiceRecording>,
    fail_all: Option<String>,
    fail_partner_set_for: HashMap<UserId, String>,
    fail_partner_clear_for: HashMap<UserId, String>,
    interleave_pairing: Option<(UserId, UserId)>,
}

impl MemoryStoreInner {
    fn check_available(&self) -> StorageResult<()> {
        match &self.fail_all {
            Some(reason) => Err(StorageError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn take_failure(armed: &mut HashMap<UserId, String>, user_id: &UserId) -> StorageResult<()> {
        match armed.remove(user_id) {
            Some(reason) => Err(StorageError::Unavailable(reason)),
            None => Ok(()),
        }
    }

    /// Apply a pending simulated concurrent pairing that involves `user_id`.
    fn run_interleaved(&mut self, user_id: &UserId) {
        let hit = matches!(
            self.interleave_pairing,
            Some((target, _)) if &target == user_id
        );
        if !hit {
            return;
        }
        if let Some((target, rival)) = self.interleave_pairing.take() {
            let now = Utc::now();
            for (a, b) in [(target, rival), (rival, target)] {
                if let Some(profile) = self.profiles.get_mut(&a) {
                    profile.partner_id = Some(b);
                    profile.updated_at = now;
                }
            }
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, MemoryStoreInner>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Unavailable(format!("memory store poisoned: {}", e)))
    }

    /// Make every operation fail with `StorageError::Unavailable` until
    /// [`MemoryStore::recover`] is called.
    pub fn fail_all(&self, reason: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_all = Some(reason.to_string());
        }
    }

    /// Undo [`MemoryStore::fail_all`].
    pub fn recover(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_all = None;
        }
    }

    /// Cause the next `set_partner_if_empty` on `user_id` to fail.
    pub fn fail_next_partner_update_for(&self, user_id: &UserId, reason: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_partner_set_for.insert(*user_id, reason.to_string());
        }
    }

    /// Cause the next `clear_partner_if` on `user_id` to fail.
    pub fn fail_next_partner_clear_for(&self, user_id: &UserId, reason: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .fail_partner_clear_for
                .insert(*user_id, reason.to_string());
        }
    }

    /// Before the next partner write on `target`, pair `target` with
    /// `rival` as if a concurrent caller had won the race.
    pub fn interleave_pairing(&self, target: &UserId, rival: &UserId) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.interleave_pairing = Some((*target, *rival));
        }
    }

    /// Overwrite a partner reference without any checks.
    ///
    /// Used to build inconsistent states for reconciliation tests.
    pub fn force_partner(&self, user_id: &UserId, partner_id: Option<UserId>) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(profile) = inner.profiles.get_mut(user_id) {
                profile.partner_id = partner_id;
            }
        }
    }

    /// Number of stored profiles.
    #[cfg(test)]
    pub fn profile_count(&self) -> usize {
        self.inner.lock().map(|i| i.profiles.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_profile(&self, user_id: &UserId) -> StorageResult<Option<Profile>> {
        let inner = self.lock()?;
        inner.check_available()?;
        Ok(inner.profiles.get(user_id).cloned())
    }

    async fn find_profile_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> StorageResult<Option<Profile>> {
        let inner = self.lock()?;
        inner.check_available()?;
        Ok(inner
            .profiles
            .values()
            .find(|p| &p.invite_code == code)
            .cloned())
    }

    async fn insert_profile(&self, req: NewProfile) -> StorageResult<Profile> {
        let mut inner = self.lock()?;
        inner.check_available()?;

        if inner.profiles.contains_key(&req.user_id) {
            return Err(StorageError::DuplicateProfile {
                user_id: req.user_id,
            });
        }
        if inner
            .profiles
            .values()
            .any(|p| p.invite_code == req.invite_code)
        {
            return Err(StorageError::DuplicateInviteCode {
                code: req.invite_code,
            });
        }

        let now = Utc::now();
        let profile = Profile {
            user_id: req.user_id,
            display_name: req.display_name,
            avatar_url: req.avatar_url,
            invite_code: req.invite_code,
            partner_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn update_profile_details(
        &self,
        user_id: &UserId,
        details: ProfileDetails,
    ) -> StorageResult<Profile> {
        let mut inner = self.lock()?;
        inner.check_available()?;

        let profile = inner
            .profiles
            .get_mut(user_id)
            .ok_or(StorageError::ProfileNotFound { user_id: *user_id })?;
        profile.display_name = details.display_name;
        profile.avatar_url = details.avatar_url;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_partner_if_empty(
        &self,
        user_id: &UserId,
        partner_id: &UserId,
    ) -> StorageResult<bool> {
        let mut inner = self.lock()?;
        inner.check_available()?;
        inner.run_interleaved(user_id);
        MemoryStoreInner::take_failure(&mut inner.fail_partner_set_for, user_id)?;

        let profile = inner
            .profiles
            .get_mut(user_id)
            .ok_or(StorageError::ProfileNotFound { user_id: *user_id })?;
        if profile.partner_id.is_some() {
            return Ok(false);
        }
        profile.partner_id = Some(*partner_id);
        profile.updated_at = Utc::now();
        Ok(true)
    }

    async fn clear_partner_if(&self, user_id: &UserId, expected: &UserId) -> StorageResult<bool> {
        let mut inner = self.lock()?;
        inner.check_available()?;
        MemoryStoreInner::take_failure(&mut inner.fail_partner_clear_for, user_id)?;

        match inner.profiles.get_mut(user_id) {
            Some(profile) if profile.partner_id.as_ref() == Some(expected) => {
                profile.partner_id = None;
                profile.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_paired_profiles(&self) -> StorageResult<Vec<Profile>> {
        let inner = self.lock()?;
        inner.check_available()?;
        let mut paired: Vec<Profile> = inner
            .profiles
            .values()
            .filter(|p| p.is_paired())
            .cloned()
            .collect();
        paired.sort_by_key(|p| p.created_at);
        Ok(paired)
    }

    async fn insert_workout(&self, req: NewWorkout) -> StorageResult<Workout> {
        let mut inner = self.lock()?;
        inner.check_available()?;

        let workout = Workout {
            id: WorkoutId::new(),
            user_id: req.user_id,
            activity_type: req.activity_type,
            duration_minutes: req.duration_minutes,
            calories: req.calories,
            completed_at: req.completed_at,
            notes: req.notes,
        };
        inner.workouts.push(workout.clone());
        Ok(workout)
    }

    async fn query_workouts(&self, query: &WorkoutQuery) -> StorageResult<Vec<Workout>> {
        let inner = self.lock()?;
        inner.check_available()?;

        let mut rows: Vec<Workout> = inner
            .workouts
            .iter()
            .rev()
            .filter(|w| w.user_id == query.user_id)
            .filter(|w| query.since.map_or(true, |since| w.completed_at >= since))
            .cloned()
            .collect();
        // Stable sort over newest-inserted first, so ties keep that order.
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        rows.truncate(query.limit as usize);
        Ok(rows)
    }

    async fn insert_message(&self, req: NewMessage) -> StorageResult<Message> {
        let mut inner = self.lock()?;
        inner.check_available()?;

        let message = Message {
            id: MessageId::new(),
            sender_id: req.sender_id,
            recipient_id: req.recipient_id,
            content: req.content,
            kind: req.kind,
            clap_count: req.clap_count,
            created_at: req.created_at,
            metadata: req.metadata,
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn query_messages(&self, query: &MessageQuery) -> StorageResult<Vec<Message>> {
        let inner = self.lock()?;
        inner.check_available()?;

        let mut rows: Vec<Message> = inner
            .messages
            .iter()
            .rev()
            .filter(|m| m.involves(&query.participant))
            .filter(|m| query.kind.map_or(true, |kind| m.kind == kind))
            .filter(|m| query.since.map_or(true, |since| m.created_at >= since))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn insert_voice_recording(
        &self,
        req: NewVoiceRecording,
    ) -> StorageResult<VoiceRecording> {
        let mut inner = self.lock()?;
        inner.check_available()?;

        if !inner.messages.iter().any(|m| m.id == req.message_id) {
            return Err(StorageError::invalid(format!(
                "voice recording for unknown message {}",
                req.message_id
            )));
        }

        let recording = VoiceRecording {
            id: RecordingId::new(),
            message_id: req.message_id,
            audio_ref: req.audio_ref,
            duration_secs: req.duration_secs,
        };
        inner.recordings.push(recording.clone());
        Ok(recording)
    }

    async fn find_voice_recording(
        &self,
        message_id: &MessageId,
    ) -> StorageResult<Option<VoiceRecording>> {
        let inner = self.lock()?;
        inner.check_available()?;
        Ok(inner
            .recordings
            .iter()
            .find(|r| &r.message_id == message_id)
            .cloned())
    }
}
