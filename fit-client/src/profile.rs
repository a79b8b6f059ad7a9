//! Profile creation and loading.

use fit_core::{ByteSource, InviteCodeGenerator, OsRandom};
use fit_store::{NewProfile, ProfileDetails, RecordStore, StorageError};
use fit_types::{Profile, UserId, DEFAULT_PARTNER_LABEL};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// A viewer's profile together with the partner profile it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    /// The viewer's own profile.
    pub profile: Profile,
    /// The referenced partner profile, if it exists.
    pub partner: Option<Profile>,
}

impl ProfileView {
    /// True when both partner references point at each other.
    pub fn is_connected(&self) -> bool {
        match &self.partner {
            Some(partner) => {
                self.profile.is_paired_with(&partner.user_id)
                    && partner.is_paired_with(&self.profile.user_id)
            }
            None => false,
        }
    }

    /// Partner's display name, or "Partner".
    pub fn partner_name(&self) -> &str {
        self.partner
            .as_ref()
            .map(|p| p.partner_label())
            .unwrap_or(DEFAULT_PARTNER_LABEL)
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Creates, loads and edits profiles.
pub struct ProfileService<S, R = OsRandom> {
    store: S,
    generator: InviteCodeGenerator<R>,
    max_attempts: u32,
}

impl<S: RecordStore> ProfileService<S, OsRandom> {
    /// Create a service using OS randomness for invite codes.
    pub fn new(store: S, config: &Config) -> ClientResult<Self> {
        let generator = InviteCodeGenerator::new(config.pairing.invite_code_length)?;
        Ok(Self::with_generator(
            store,
            generator,
            config.pairing.max_generation_attempts,
        ))
    }
}

impl<S: RecordStore, R: ByteSource> ProfileService<S, R> {
    /// Create a service with a custom code generator.
    pub fn with_generator(store: S, generator: InviteCodeGenerator<R>, max_attempts: u32) -> Self {
        Self {
            store,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Create the profile of `user` with a fresh, unique invite code.
    ///
    /// A candidate already held by another profile is discarded and a new
    /// one drawn, up to the configured number of attempts.
    pub async fn create_profile(
        &self,
        user: &UserId,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> ClientResult<Profile> {
        let display_name = clean(display_name);
        let avatar_url = clean(avatar_url);

        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate()?;
            if self.store.find_profile_by_invite_code(&code).await?.is_some() {
                debug!(attempt, "invite code collision, regenerating");
                continue;
            }

            let request = NewProfile {
                user_id: *user,
                display_name: display_name.clone(),
                avatar_url: avatar_url.clone(),
                invite_code: code,
            };
            match self.store.insert_profile(request).await {
                Ok(profile) => {
                    info!(user = %user, code = %profile.invite_code, "profile created");
                    return Ok(profile);
                }
                Err(StorageError::DuplicateInviteCode { .. }) => {
                    debug!(attempt, "invite code taken during insert, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(user = %user, attempts = self.max_attempts, "no unique invite code found");
        Err(ClientError::InviteCodeExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Load the viewer's profile and the partner it references.
    pub async fn load(&self, viewer: &UserId) -> ClientResult<ProfileView> {
        let profile = self
            .store
            .find_profile(viewer)
            .await?
            .ok_or(ClientError::ProfileNotFound(*viewer))?;

        let partner = match profile.partner_id {
            Some(partner_id) => {
                let partner = self.store.find_profile(&partner_id).await?;
                let points_back = partner
                    .as_ref()
                    .map_or(false, |p| p.is_paired_with(viewer));
                if !points_back {
                    warn!(
                        user = %viewer,
                        partner = %partner_id,
                        "partner reference is one-sided"
                    );
                }
                partner
            }
            None => None,
        };

        Ok(ProfileView { profile, partner })
    }

    /// Replace the viewer's display name and avatar.
    pub async fn update_details(
        &self,
        viewer: &UserId,
        display_name: Option<String>,
        avatar_url: Option<String>,
    ) -> ClientResult<Profile> {
        let details = ProfileDetails {
            display_name: clean(display_name),
            avatar_url: clean(avatar_url),
        };
        match self.store.update_profile_details(viewer, details).await {
            Ok(profile) => Ok(profile),
            Err(StorageError::ProfileNotFound { user_id }) => {
                Err(ClientError::ProfileNotFound(user_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::PairingManager;
    use async_trait::async_trait;
    use fit_core::{InviteCodeError, INVITE_ALPHABET};
    use fit_store::{
        MemoryStore, MessageQuery, NewMessage, NewVoiceRecording, NewWorkout, StorageResult,
        WorkoutQuery,
    };
    use fit_types::{InviteCode, Message, MessageId, VoiceRecording, Workout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose invite-code lookup never finds anything, so a taken code
    /// is only detected by the insert.
    struct BlindLookup(MemoryStore);

    #[async_trait]
    impl RecordStore for BlindLookup {
        async fn find_profile(&self, user_id: &UserId) -> StorageResult<Option<Profile>> {
            self.0.find_profile(user_id).await
        }

        async fn find_profile_by_invite_code(
            &self,
            _code: &InviteCode,
        ) -> StorageResult<Option<Profile>> {
            Ok(None)
        }

        async fn insert_profile(&self, req: NewProfile) -> StorageResult<Profile> {
            self.0.insert_profile(req).await
        }

        async fn update_profile_details(
            &self,
            user_id: &UserId,
            details: ProfileDetails,
        ) -> StorageResult<Profile> {
            self.0.update_profile_details(user_id, details).await
        }

        async fn set_partner_if_empty(
            &self,
            user_id: &UserId,
            partner_id: &UserId,
        ) -> StorageResult<bool> {
            self.0.set_partner_if_empty(user_id, partner_id).await
        }

        async fn clear_partner_if(
            &self,
            user_id: &UserId,
            expected: &UserId,
        ) -> StorageResult<bool> {
            self.0.clear_partner_if(user_id, expected).await
        }

        async fn list_paired_profiles(&self) -> StorageResult<Vec<Profile>> {
            self.0.list_paired_profiles().await
        }

        async fn insert_workout(&self, req: NewWorkout) -> StorageResult<Workout> {
            self.0.insert_workout(req).await
        }

        async fn query_workouts(&self, query: &WorkoutQuery) -> StorageResult<Vec<Workout>> {
            self.0.query_workouts(query).await
        }

        async fn insert_message(&self, req: NewMessage) -> StorageResult<Message> {
            self.0.insert_message(req).await
        }

        async fn query_messages(&self, query: &MessageQuery) -> StorageResult<Vec<Message>> {
            self.0.query_messages(query).await
        }

        async fn insert_voice_recording(
            &self,
            req: NewVoiceRecording,
        ) -> StorageResult<VoiceRecording> {
            self.0.insert_voice_recording(req).await
        }

        async fn find_voice_recording(
            &self,
            message_id: &MessageId,
        ) -> StorageResult<Option<VoiceRecording>> {
            self.0.find_voice_recording(message_id).await
        }
    }

    /// Every fill returns the next alphabet index, so codes come out as
    /// "AAAAAAAA", "BBBBBBBB", ...
    #[derive(Default)]
    struct Sequential(AtomicUsize);

    impl ByteSource for Sequential {
        fn fill(&self, buf: &mut [u8]) -> Result<(), InviteCodeError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) as u8;
            buf.fill(n);
            Ok(())
        }
    }

    fn sequential_service(store: MemoryStore, attempts: u32) -> ProfileService<MemoryStore, Sequential> {
        let generator = InviteCodeGenerator::with_source(8, Sequential::default()).unwrap();
        ProfileService::with_generator(store, generator, attempts)
    }

    fn code_of(index: usize) -> InviteCode {
        let ch = INVITE_ALPHABET[index] as char;
        InviteCode::parse(&ch.to_string().repeat(8)).unwrap()
    }

    #[tokio::test]
    async fn create_profile_assigns_code() {
        let store = MemoryStore::new();
        let service = ProfileService::new(store.clone(), &Config::default()).unwrap();
        let user = UserId::new();

        let profile = service
            .create_profile(&user, Some("  Alex ".into()), Some(String::new()))
            .await
            .unwrap();
        assert_eq!(profile.user_id, user);
        assert_eq!(profile.display_name.as_deref(), Some("Alex"));
        assert_eq!(profile.avatar_url, None);
        assert_eq!(profile.invite_code.len(), 8);
        assert_eq!(profile.partner_id, None);
        assert!(profile
            .invite_code
            .as_str()
            .bytes()
            .all(|b| INVITE_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn collision_regenerates() {
        let store = MemoryStore::new();
        store
            .insert_profile(NewProfile {
                user_id: UserId::new(),
                display_name: None,
                avatar_url: None,
                invite_code: code_of(0),
            })
            .await
            .unwrap();

        let service = sequential_service(store, 4);
        let profile = service
            .create_profile(&UserId::new(), None, None)
            .await
            .unwrap();
        assert_eq!(profile.invite_code, code_of(1));
    }

    #[tokio::test]
    async fn exhausted_attempts() {
        let store = MemoryStore::new();
        store
            .insert_profile(NewProfile {
                user_id: UserId::new(),
                display_name: None,
                avatar_url: None,
                invite_code: code_of(0),
            })
            .await
            .unwrap();

        let service = sequential_service(store, 1);
        let err = service
            .create_profile(&UserId::new(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InviteCodeExhausted { attempts: 1 }));
    }

    async fn store_holding_first_code() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_profile(NewProfile {
                user_id: UserId::new(),
                display_name: None,
                avatar_url: None,
                invite_code: code_of(0),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn code_taken_at_insert_regenerates() {
        let store = BlindLookup(store_holding_first_code().await);
        let generator = InviteCodeGenerator::with_source(8, Sequential::default()).unwrap();
        let service = ProfileService::with_generator(store, generator, 4);

        let profile = service
            .create_profile(&UserId::new(), None, None)
            .await
            .unwrap();
        assert_eq!(profile.invite_code.as_str(), "BBBBBBBB");
    }

    #[tokio::test]
    async fn code_taken_at_insert_exhausts_attempts() {
        let store = BlindLookup(store_holding_first_code().await);
        let generator = InviteCodeGenerator::with_source(8, Sequential::default()).unwrap();
        let service = ProfileService::with_generator(store, generator, 1);

        let err = service
            .create_profile(&UserId::new(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InviteCodeExhausted { attempts: 1 }));
    }

    #[tokio::test]
    async fn second_profile_for_user_rejected() {
        let store = MemoryStore::new();
        let service = sequential_service(store, 4);
        let user = UserId::new();
        service.create_profile(&user, None, None).await.unwrap();

        let err = service.create_profile(&user, None, None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Storage(StorageError::DuplicateProfile { .. })
        ));
    }

    #[tokio::test]
    async fn load_reports_partner() {
        let store = MemoryStore::new();
        let service = sequential_service(store.clone(), 4);
        let alex = UserId::new();
        let blake = UserId::new();
        service
            .create_profile(&alex, Some("Alex".into()), None)
            .await
            .unwrap();
        let blake_profile = service
            .create_profile(&blake, Some("Blake".into()), None)
            .await
            .unwrap();

        let view = service.load(&alex).await.unwrap();
        assert!(!view.is_connected());
        assert_eq!(view.partner_name(), "Partner");

        PairingManager::new(store, &Config::default())
            .connect(&alex, blake_profile.invite_code.as_str())
            .await
            .unwrap();

        let view = service.load(&alex).await.unwrap();
        assert!(view.is_connected());
        assert_eq!(view.partner_name(), "Blake");
    }

    #[tokio::test]
    async fn load_one_sided_is_not_connected() {
        let store = MemoryStore::new();
        let service = sequential_service(store.clone(), 4);
        let alex = UserId::new();
        let blake = UserId::new();
        service.create_profile(&alex, None, None).await.unwrap();
        service.create_profile(&blake, None, None).await.unwrap();
        store.force_partner(&alex, Some(blake));

        let view = service.load(&alex).await.unwrap();
        assert!(view.partner.is_some());
        assert!(!view.is_connected());
    }

    #[tokio::test]
    async fn load_missing_profile() {
        let service = sequential_service(MemoryStore::new(), 4);
        let user = UserId::new();
        let err = service.load(&user).await.unwrap_err();
        assert!(matches!(err, ClientError::ProfileNotFound(id) if id == user));
    }

    #[tokio::test]
    async fn update_details_keeps_code() {
        let store = MemoryStore::new();
        let service = sequential_service(store, 4);
        let user = UserId::new();
        let created = service
            .create_profile(&user, Some("Alex".into()), None)
            .await
            .unwrap();

        let updated = service
            .update_details(&user, Some("Alexis".into()), Some("avatars/a.png".into()))
            .await
            .unwrap();
        assert_eq!(updated.display_name.as_deref(), Some("Alexis"));
        assert_eq!(updated.avatar_url.as_deref(), Some("avatars/a.png"));
        assert_eq!(updated.invite_code, created.invite_code);

        let err = service
            .update_details(&UserId::new(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ProfileNotFound(_)));
    }
}
