//! Single-use tokens for email verification and password reset.
//!
//! The plain token goes out in the email link; only its SHA-256 digest is
//! stored, so a database leak does not expose usable links.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// How long a verification or reset link stays valid.
pub const TEMPORARY_TOKEN_TTL_MINUTES: i64 = 20;

#[derive(Debug, Clone)]
pub struct TemporaryToken {
    /// Sent to the user.
    pub unhashed: String,
    /// Stored on the user row.
    pub hashed: String,
    pub expires_at: DateTime<Utc>,
}

pub fn generate_temporary_token() -> TemporaryToken {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    let unhashed = hex::encode(bytes);

    TemporaryToken {
        hashed: hash_token(&unhashed),
        unhashed,
        expires_at: Utc::now() + Duration::minutes(TEMPORARY_TOKEN_TTL_MINUTES),
    }
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
