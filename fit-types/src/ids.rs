//! Identity types for FitTogether records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Create a new random identifier (UUID v4).
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Create an identifier from raw bytes.
            pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
                uuid::Uuid::from_slice(bytes).ok().map(Self)
            }

            /// Get the raw bytes of this identifier.
            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }

            /// Get the inner UUID.
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.0.simple().to_string()[..8])
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| TypeError::InvalidId(format!("{}: {}", stringify!($name), e)))
            }
        }
    };
}

uuid_id!(
    /// Opaque identifier of a user account.
    ///
    /// Owned by the external authentication system; this crate never mints
    /// user ids except in tests and the demo CLI.
    UserId
);

uuid_id!(
    /// Identifier of a logged workout.
    WorkoutId
);

uuid_id!(
    /// Identifier of an encouragement message.
    MessageId
);

uuid_id!(
    /// Identifier of a voice recording attachment.
    RecordingId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_roundtrip_bytes() {
        let original = UserId::new();
        let restored = UserId::from_bytes(original.as_bytes()).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn user_id_parses_display_form() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn invalid_id_is_rejected() {
        let err = "not-a-uuid".parse::<WorkoutId>().unwrap_err();
        assert!(matches!(err, TypeError::InvalidId(_)));
        assert!(err.to_string().contains("WorkoutId"));
    }

    #[test]
    fn from_invalid_length_fails() {
        assert!(MessageId::from_bytes(&[0u8; 8]).is_none());
    }

    #[test]
    fn debug_is_short() {
        let id = RecordingId::new();
        let debug = format!("{:?}", id);
        assert!(debug.starts_with("RecordingId("));
        assert_eq!(debug.len(), "RecordingId(".len() + 8 + 1);
    }

    #[test]
    fn ids_are_uuid_v4() {
        assert_eq!(UserId::new().as_uuid().get_version_num(), 4);
    }
}
