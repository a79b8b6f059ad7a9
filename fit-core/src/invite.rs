//! Invite code generation.
//!
//! Codes are drawn from an unambiguous upper-case alphabet: no `0`/`O`
//! and no `1`/`I`, so a code read aloud or copied from a screenshot
//! survives the trip. Uniqueness is not decided here; the caller checks
//! the store and asks for another code on collision.

use fit_types::InviteCode;

/// Alphabet used for generated codes (32 symbols).
pub const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Default code length.
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Shortest code length accepted by [`InviteCodeGenerator::new`].
pub const MIN_CODE_LENGTH: usize = 6;

/// Longest code length accepted by [`InviteCodeGenerator::new`].
pub const MAX_CODE_LENGTH: usize = 12;

/// Error type for invite code generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteCodeError {
    /// Requested length is outside the supported range.
    #[error("invite code length {0} outside 6..=12")]
    InvalidLength(usize),
    /// The random source failed.
    #[error("random source failed: {0}")]
    Random(String),
}

/// Source of random bytes for code generation.
pub trait ByteSource: Send + Sync {
    /// Fill `buf` with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<(), InviteCodeError>;
}

/// Operating system randomness via `getrandom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl ByteSource for OsRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), InviteCodeError> {
        getrandom::getrandom(buf).map_err(|e| InviteCodeError::Random(e.to_string()))
    }
}

/// Generates fixed-length invite codes.
#[derive(Debug, Clone)]
pub struct InviteCodeGenerator<R = OsRandom> {
    length: usize,
    source: R,
}

impl InviteCodeGenerator<OsRandom> {
    /// Create a generator backed by OS randomness.
    pub fn new(length: usize) -> Result<Self, InviteCodeError> {
        Self::with_source(length, OsRandom)
    }
}

impl Default for InviteCodeGenerator<OsRandom> {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
            source: OsRandom,
        }
    }
}

impl<R: ByteSource> InviteCodeGenerator<R> {
    /// Create a generator with a custom byte source.
    pub fn with_source(length: usize, source: R) -> Result<Self, InviteCodeError> {
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
            return Err(InviteCodeError::InvalidLength(length));
        }
        Ok(Self { length, source })
    }

    /// Length of generated codes.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate one candidate code.
    pub fn generate(&self) -> Result<InviteCode, InviteCodeError> {
        let mut code = String::with_capacity(self.length);
        let mut buf = [0u8; 16];

        while code.len() < self.length {
            self.source.fill(&mut buf)?;
            for byte in buf {
                // 256 is a multiple of 32, so masking keeps the draw uniform
                let index = (byte & 0x1F) as usize;
                code.push(INVITE_ALPHABET[index] as char);
                if code.len() == self.length {
                    break;
                }
            }
        }

        InviteCode::parse(&code).map_err(|e| InviteCodeError::Random(e.to_string()))
    }
}
