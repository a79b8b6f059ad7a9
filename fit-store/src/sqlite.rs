//! SQLite record store backend.

use crate::error::{StorageError, StorageResult};
use crate::store::{
    MessageQuery, NewMessage, NewProfile, NewVoiceRecording, NewWorkout, ProfileDetails,
    RecordStore, WorkoutQuery,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fit_types::{
    ActivityType, InviteCode, Message, MessageId, MessageKind, Profile, RecordingId, UserId,
    VoiceRecording, Workout, WorkoutId,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// SQLite-based record store.
///
/// Uses WAL mode for concurrent reads/writes. Timestamps are stored as
/// milliseconds since the Unix epoch, ids as 16-byte blobs.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub async fn new(path: &Path) -> StorageResult<Self> {
        if path.is_dir() {
            return Err(StorageError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        let store = Self { pool };
        store.run_migrations().await?;
        tracing::debug!(path = %path.display(), "opened sqlite record store");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(":memory:")
            .map_err(StorageError::Database)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StorageResult<()> {
        const MIGRATIONS: &[&str] = &[
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id BLOB PRIMARY KEY,
                display_name TEXT,
                avatar_url TEXT,
                invite_code TEXT NOT NULL UNIQUE,
                partner_id BLOB,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id BLOB PRIMARY KEY,
                user_id BLOB NOT NULL,
                activity_type TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                calories INTEGER,
                completed_at INTEGER NOT NULL,
                notes TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id BLOB PRIMARY KEY,
                sender_id BLOB NOT NULL,
                recipient_id BLOB NOT NULL,
                content TEXT NOT NULL,
                kind TEXT NOT NULL,
                clap_count INTEGER,
                created_at INTEGER NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}'
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS voice_recordings (
                id BLOB PRIMARY KEY,
                message_id BLOB NOT NULL UNIQUE REFERENCES messages(id),
                audio_ref TEXT NOT NULL,
                duration_secs INTEGER NOT NULL
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_profiles_partner ON profiles(partner_id)",
            "CREATE INDEX IF NOT EXISTS idx_workouts_user_completed ON workouts(user_id, completed_at)",
            "CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender_id, created_at)",
            "CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages(recipient_id, created_at)",
        ];

        for statement in MIGRATIONS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::Migration(e.to_string()))?;
        }
        Ok(())
    }

    async fn profile_exists(&self, user_id: &UserId) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE user_id = ?1")
            .bind(user_id.as_bytes())
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

fn to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

fn from_millis(ms: i64, column: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::invalid(format!("{} out of range: {}", column, ms)))
}

fn decode_id<T>(bytes: &[u8], column: &str, parse: fn(&[u8]) -> Option<T>) -> StorageResult<T> {
    parse(bytes).ok_or_else(|| StorageError::invalid(format!("malformed {}", column)))
}

fn decode_count(value: Option<i64>, column: &str) -> StorageResult<Option<u32>> {
    value
        .map(|v| u32::try_from(v).map_err(|_| StorageError::invalid(format!("{} out of range", column))))
        .transpose()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn find_profile(&self, user_id: &UserId) -> StorageResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, display_name, avatar_url, invite_code, partner_id, created_at, updated_at
            FROM profiles
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id.as_bytes())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn find_profile_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> StorageResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, display_name, avatar_url, invite_code, partner_id, created_at, updated_at
            FROM profiles
            WHERE invite_code = ?1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn insert_profile(&self, req: NewProfile) -> StorageResult<Profile> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, display_name, avatar_url, invite_code, partner_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?5)
            "#,
        )
        .bind(req.user_id.as_bytes())
        .bind(req.display_name.as_deref())
        .bind(req.avatar_url.as_deref())
        .bind(req.invite_code.as_str())
        .bind(to_millis(&now))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                let message = e.to_string();
                return Err(if message.contains("invite_code") {
                    StorageError::DuplicateInviteCode {
                        code: req.invite_code,
                    }
                } else {
                    StorageError::DuplicateProfile {
                        user_id: req.user_id,
                    }
                });
            }
            Err(e) => return Err(StorageError::Database(e)),
        }

        // Read back so the returned timestamps carry the stored precision.
        self.find_profile(&req.user_id)
            .await?
            .ok_or(StorageError::ProfileNotFound {
                user_id: req.user_id,
            })
    }

    async fn update_profile_details(
        &self,
        user_id: &UserId,
        details: ProfileDetails,
    ) -> StorageResult<Profile> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET display_name = ?2, avatar_url = ?3, updated_at = ?4
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id.as_bytes())
        .bind(details.display_name.as_deref())
        .bind(details.avatar_url.as_deref())
        .bind(to_millis(&Utc::now()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ProfileNotFound { user_id: *user_id });
        }
        self.find_profile(user_id)
            .await?
            .ok_or(StorageError::ProfileNotFound { user_id: *user_id })
    }

    async fn set_partner_if_empty(
        &self,
        user_id: &UserId,
        partner_id: &UserId,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET partner_id = ?2, updated_at = ?3
            WHERE user_id = ?1 AND partner_id IS NULL
            "#,
        )
        .bind(user_id.as_bytes())
        .bind(partner_id.as_bytes())
        .bind(to_millis(&Utc::now()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        if !self.profile_exists(user_id).await? {
            return Err(StorageError::ProfileNotFound { user_id: *user_id });
        }
        Ok(false)
    }

    async fn clear_partner_if(&self, user_id: &UserId, expected: &UserId) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET partner_id = NULL, updated_at = ?3
            WHERE user_id = ?1 AND partner_id = ?2
            "#,
        )
        .bind(user_id.as_bytes())
        .bind(expected.as_bytes())
        .bind(to_millis(&Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_paired_profiles(&self) -> StorageResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, display_name, avatar_url, invite_code, partner_id, created_at, updated_at
            FROM profiles
            WHERE partner_id IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Profile::try_from).collect()
    }

    async fn insert_workout(&self, req: NewWorkout) -> StorageResult<Workout> {
        let workout = Workout {
            id: WorkoutId::new(),
            user_id: req.user_id,
            activity_type: req.activity_type,
            duration_minutes: req.duration_minutes,
            calories: req.calories,
            completed_at: req.completed_at,
            notes: req.notes,
        };

        sqlx::query(
            r#"
            INSERT INTO workouts (id, user_id, activity_type, duration_minutes, calories, completed_at, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(workout.id.as_bytes())
        .bind(workout.user_id.as_bytes())
        .bind(workout.activity_type.as_str())
        .bind(i64::from(workout.duration_minutes))
        .bind(workout.calories.map(i64::from))
        .bind(to_millis(&workout.completed_at))
        .bind(workout.notes.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(workout)
    }

    async fn query_workouts(&self, query: &WorkoutQuery) -> StorageResult<Vec<Workout>> {
        let rows = sqlx::query_as::<_, WorkoutRow>(
            r#"
            SELECT id, user_id, activity_type, duration_minutes, calories, completed_at, notes
            FROM workouts
            WHERE user_id = ?1 AND (?2 IS NULL OR completed_at >= ?2)
            ORDER BY completed_at DESC, rowid DESC
            LIMIT ?3
            "#,
        )
        .bind(query.user_id.as_bytes())
        .bind(query.since.as_ref().map(to_millis))
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Workout::try_from).collect()
    }

    async fn insert_message(&self, req: NewMessage) -> StorageResult<Message> {
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
        let metadata = serde_json::to_string(&message.metadata)
            .map_err(|e| StorageError::invalid(format!("metadata: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, content, kind, clap_count, created_at, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(message.id.as_bytes())
        .bind(message.sender_id.as_bytes())
        .bind(message.recipient_id.as_bytes())
        .bind(&message.content)
        .bind(message.kind.as_str())
        .bind(message.clap_count.map(i64::from))
        .bind(to_millis(&message.created_at))
        .bind(metadata)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    async fn query_messages(&self, query: &MessageQuery) -> StorageResult<Vec<Message>> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = query.limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, sender_id, recipient_id, content, kind, clap_count, created_at, metadata
            FROM messages
            WHERE (sender_id = ?1 OR recipient_id = ?1)
              AND (?2 IS NULL OR kind = ?2)
              AND (?3 IS NULL OR created_at >= ?3)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?4
            "#,
        )
        .bind(query.participant.as_bytes())
        .bind(query.kind.map(|k| k.as_str()))
        .bind(query.since.as_ref().map(to_millis))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn insert_voice_recording(
        &self,
        req: NewVoiceRecording,
    ) -> StorageResult<VoiceRecording> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE id = ?1")
            .bind(req.message_id.as_bytes())
            .fetch_one(&self.pool)
            .await?;
        if exists == 0 {
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

        sqlx::query(
            r#"
            INSERT INTO voice_recordings (id, message_id, audio_ref, duration_secs)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(recording.id.as_bytes())
        .bind(recording.message_id.as_bytes())
        .bind(&recording.audio_ref)
        .bind(i64::from(recording.duration_secs))
        .execute(&self.pool)
        .await?;

        Ok(recording)
    }

    async fn find_voice_recording(
        &self,
        message_id: &MessageId,
    ) -> StorageResult<Option<VoiceRecording>> {
        let row = sqlx::query_as::<_, RecordingRow>(
            r#"
            SELECT id, message_id, audio_ref, duration_secs
            FROM voice_recordings
            WHERE message_id = ?1
            "#,
        )
        .bind(message_id.as_bytes())
        .fetch_optional(&self.pool)
        .await?;

        row.map(VoiceRecording::try_from).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: Vec<u8>,
    display_name: Option<String>,
    avatar_url: Option<String>,
    invite_code: String,
    partner_id: Option<Vec<u8>>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StorageError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            user_id: decode_id(&row.user_id, "user_id", UserId::from_bytes)?,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            invite_code: InviteCode::parse(&row.invite_code)
                .map_err(|e| StorageError::invalid(e.to_string()))?,
            partner_id: row
                .partner_id
                .as_deref()
                .map(|b| decode_id(b, "partner_id", UserId::from_bytes))
                .transpose()?,
            created_at: from_millis(row.created_at, "created_at")?,
            updated_at: from_millis(row.updated_at, "updated_at")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct WorkoutRow {
    id: Vec<u8>,
    user_id: Vec<u8>,
    activity_type: String,
    duration_minutes: i64,
    calories: Option<i64>,
    completed_at: i64,
    notes: Option<String>,
}

impl TryFrom<WorkoutRow> for Workout {
    type Error = StorageError;

    fn try_from(row: WorkoutRow) -> Result<Self, Self::Error> {
        Ok(Workout {
            id: decode_id(&row.id, "workout id", WorkoutId::from_bytes)?,
            user_id: decode_id(&row.user_id, "user_id", UserId::from_bytes)?,
            activity_type: ActivityType::from(row.activity_type),
            duration_minutes: decode_count(Some(row.duration_minutes), "duration_minutes")?
                .unwrap_or_default(),
            calories: decode_count(row.calories, "calories")?,
            completed_at: from_millis(row.completed_at, "completed_at")?,
            notes: row.notes,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Vec<u8>,
    sender_id: Vec<u8>,
    recipient_id: Vec<u8>,
    content: String,
    kind: String,
    clap_count: Option<i64>,
    created_at: i64,
    metadata: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = StorageError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: decode_id(&row.id, "message id", MessageId::from_bytes)?,
            sender_id: decode_id(&row.sender_id, "sender_id", UserId::from_bytes)?,
            recipient_id: decode_id(&row.recipient_id, "recipient_id", UserId::from_bytes)?,
            content: row.content,
            kind: MessageKind::from_str(&row.kind)
                .map_err(|e| StorageError::invalid(e.to_string()))?,
            clap_count: decode_count(row.clap_count, "clap_count")?,
            created_at: from_millis(row.created_at, "created_at")?,
            metadata: serde_json::from_str(&row.metadata)
                .map_err(|e| StorageError::invalid(format!("metadata: {}", e)))?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecordingRow {
    id: Vec<u8>,
    message_id: Vec<u8>,
    audio_ref: String,
    duration_secs: i64,
}

impl TryFrom<RecordingRow> for VoiceRecording {
    type Error = StorageError;

    fn try_from(row: RecordingRow) -> Result<Self, Self::Error> {
        Ok(VoiceRecording {
            id: decode_id(&row.id, "recording id", RecordingId::from_bytes)?,
            message_id: decode_id(&row.message_id, "message_id", MessageId::from_bytes)?,
            audio_ref: row.audio_ref,
            duration_secs: decode_count(Some(row.duration_secs), "duration_secs")?
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_profile(code: &str) -> NewProfile {
        NewProfile {
            user_id: UserId::new(),
            display_name: Some("Sam".into()),
            avatar_url: None,
            invite_code: InviteCode::parse(code).unwrap(),
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn equal_timestamps_newest_insert_first() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = UserId::new();
        let partner = UserId::new();
        let at = Utc::now();
        for calories in [100, 200] {
            store
                .insert_workout(NewWorkout {
                    user_id: user,
                    activity_type: ActivityType::Cardio,
                    duration_minutes: 30,
                    calories: Some(calories),
                    completed_at: at,
                    notes: None,
                })
                .await
                .unwrap();
        }
        for content in ["first", "second"] {
            store
                .insert_message(NewMessage {
                    sender_id: user,
                    recipient_id: partner,
                    content: content.into(),
                    kind: MessageKind::Text,
                    clap_count: None,
                    created_at: at,
                    metadata: Default::default(),
                })
                .await
                .unwrap();
        }

        let workouts = store
            .query_workouts(&WorkoutQuery::recent(user, 10))
            .await
            .unwrap();
        assert_eq!(workouts[0].calories, Some(200));
        assert_eq!(workouts[1].calories, Some(100));

        let messages = store
            .query_messages(&MessageQuery {
                participant: user,
                kind: None,
                since: None,
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(messages[0].content, "second");
        assert_eq!(messages[1].content, "first");
    }

    #[tokio::test]
    async fn test_profile_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();
        let created = store.insert_profile(new_profile("HJKM2345")).await.unwrap();

        let found = store.find_profile(&created.user_id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.partner_id, None);

        let by_code = store
            .find_profile_by_invite_code(&InviteCode::parse("HJKM2345").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_code.user_id, created.user_id);
    }

    #[tokio::test]
    async fn test_unknown_code_finds_nothing() {
        let store = SqliteStore::in_memory().await.unwrap();
        let found = store
            .find_profile_by_invite_code(&InviteCode::parse("ZZZZ9999").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_invite_code() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.insert_profile(new_profile("HJKM2345")).await.unwrap();
        let err = store
            .insert_profile(new_profile("HJKM2345"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateInviteCode { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_profile() {
        let store = SqliteStore::in_memory().await.unwrap();
        let first = store.insert_profile(new_profile("HJKM2345")).await.unwrap();
        let mut again = new_profile("PQRS6789");
        again.user_id = first.user_id;
        let err = store.insert_profile(again).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateProfile { .. }));
    }

    #[tokio::test]
    async fn test_update_details_keeps_code_and_partner() {
        let store = SqliteStore::in_memory().await.unwrap();
        let profile = store.insert_profile(new_profile("HJKM2345")).await.unwrap();
        let partner = UserId::new();
        store
            .set_partner_if_empty(&profile.user_id, &partner)
            .await
            .unwrap();

        let updated = store
            .update_profile_details(
                &profile.user_id,
                ProfileDetails {
                    display_name: Some("Samira".into()),
                    avatar_url: Some("avatars/s.png".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Samira"));
        assert_eq!(updated.invite_code, profile.invite_code);
        assert_eq!(updated.partner_id, Some(partner));
    }

    #[tokio::test]
    async fn test_partner_cas() {
        let store = SqliteStore::in_memory().await.unwrap();
        let profile = store.insert_profile(new_profile("HJKM2345")).await.unwrap();
        let first = UserId::new();
        let second = UserId::new();

        assert!(store
            .set_partner_if_empty(&profile.user_id, &first)
            .await
            .unwrap());
        assert!(!store
            .set_partner_if_empty(&profile.user_id, &second)
            .await
            .unwrap());

        let stored = store.find_profile(&profile.user_id).await.unwrap().unwrap();
        assert_eq!(stored.partner_id, Some(first));
    }

    #[tokio::test]
    async fn test_partner_cas_missing_profile() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store
            .set_partner_if_empty(&UserId::new(), &UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::ProfileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_clear_partner_if() {
        let store = SqliteStore::in_memory().await.unwrap();
        let profile = store.insert_profile(new_profile("HJKM2345")).await.unwrap();
        let partner = UserId::new();
        store
            .set_partner_if_empty(&profile.user_id, &partner)
            .await
            .unwrap();
        assert_eq!(store.list_paired_profiles().await.unwrap().len(), 1);

        assert!(!store
            .clear_partner_if(&profile.user_id, &UserId::new())
            .await
            .unwrap());
        assert!(store
            .clear_partner_if(&profile.user_id, &partner)
            .await
            .unwrap());
        assert!(store.list_paired_profiles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_workouts() {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = UserId::new();
        let other = UserId::new();

        for (owner, day) in [(user, 1), (user, 3), (user, 2), (other, 4)] {
            store
                .insert_workout(NewWorkout {
                    user_id: owner,
                    activity_type: ActivityType::from("yoga"),
                    duration_minutes: 30,
                    calories: Some(day * 100),
                    completed_at: at(day, 9),
                    notes: None,
                })
                .await
                .unwrap();
        }

        let rows = store
            .query_workouts(&WorkoutQuery::recent(user, 10))
            .await
            .unwrap();
        let days: Vec<_> = rows.iter().map(|w| w.completed_at).collect();
        assert_eq!(days, vec![at(3, 9), at(2, 9), at(1, 9)]);
        assert_eq!(rows[0].activity_type, ActivityType::Other("yoga".into()));

        let since = store
            .query_workouts(&WorkoutQuery {
                user_id: user,
                since: Some(at(2, 0)),
                limit: 10,
            })
            .await
            .unwrap();
        assert_eq!(since.len(), 2);

        let limited = store
            .query_workouts(&WorkoutQuery::recent(user, 1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_query_messages() {
        let store = SqliteStore::in_memory().await.unwrap();
        let a = UserId::new();
        let b = UserId::new();
        let now = at(20, 12);

        let mut metadata = serde_json::Map::new();
        metadata.insert("source".into(), serde_json::json!("button"));

        store
            .insert_message(NewMessage {
                sender_id: a,
                recipient_id: b,
                content: "👏".into(),
                kind: MessageKind::Clap,
                clap_count: Some(3),
                created_at: now - Duration::days(1),
                metadata: metadata.clone(),
            })
            .await
            .unwrap();
        store
            .insert_message(NewMessage {
                sender_id: b,
                recipient_id: a,
                content: "nice".into(),
                kind: MessageKind::Text,
                clap_count: None,
                created_at: now,
                metadata: Default::default(),
            })
            .await
            .unwrap();

        let all = store
            .query_messages(&MessageQuery {
                participant: a,
                kind: None,
                since: None,
                limit: None,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, MessageKind::Text);

        let claps = store
            .query_messages(&MessageQuery {
                participant: b,
                kind: Some(MessageKind::Clap),
                since: Some(now - Duration::days(30)),
                limit: Some(5),
            })
            .await
            .unwrap();
        assert_eq!(claps.len(), 1);
        assert_eq!(claps[0].clap_count, Some(3));
        assert_eq!(claps[0].metadata, metadata);
    }

    #[tokio::test]
    async fn test_voice_recording() {
        let store = SqliteStore::in_memory().await.unwrap();
        let message = store
            .insert_message(NewMessage {
                sender_id: UserId::new(),
                recipient_id: UserId::new(),
                content: "voice note".into(),
                kind: MessageKind::Voice,
                clap_count: None,
                created_at: at(5, 8),
                metadata: Default::default(),
            })
            .await
            .unwrap();

        let recording = store
            .insert_voice_recording(NewVoiceRecording {
                message_id: message.id,
                audio_ref: "voice/abc.webm".into(),
                duration_secs: 12,
            })
            .await
            .unwrap();
        let found = store.find_voice_recording(&message.id).await.unwrap();
        assert_eq!(found, Some(recording));

        let err = store
            .insert_voice_recording(NewVoiceRecording {
                message_id: MessageId::new(),
                audio_ref: "voice/missing.webm".into(),
                duration_secs: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.db");

        let user_id = {
            let store = SqliteStore::new(&path).await.unwrap();
            store
                .insert_profile(new_profile("HJKM2345"))
                .await
                .unwrap()
                .user_id
        };

        let reopened = SqliteStore::new(&path).await.unwrap();
        assert!(reopened.find_profile(&user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_directory_path_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteStore::new(dir.path()).await;
        assert!(matches!(result, Err(StorageError::InvalidPath { .. })));
    }
}
