//! Invite code value type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// A human-shareable code identifying a profile for pairing.
///
/// Codes are case-insensitive on input and always stored upper-case.
/// Parsing trims surrounding whitespace, so `" ab12cd34 "` and
/// `"AB12CD34"` name the same code.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
    /// Normalise and validate a raw code.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::InvalidInviteCode`] if the trimmed input is empty
    /// or contains anything other than ASCII letters and digits.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(TypeError::InvalidInviteCode("code is empty".into()));
        }

        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TypeError::InvalidInviteCode(format!(
                "invalid characters in {:?}",
                raw.trim()
            )));
        }

        Ok(Self(normalized))
    }

    /// The normalised code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the code.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an `InviteCode` is never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InviteCode({})", self.0)
    }
}

impl FromStr for InviteCode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InviteCode {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InviteCode> for String {
    fn from(code: InviteCode) -> Self {
        code.0
    }
}
