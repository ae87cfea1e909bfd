//! # ProjeX Auth
//!
//! Token handling for the ProjeX API:
//!
//! - [`claims`]: JWT claim structures
//! - [`jwt`]: access and refresh token issue/verify
//! - [`temp_token`]: hashed single-use tokens for verification and reset links
//!
//! Only one refresh token is valid per user at a time. It is stored on the
//! user row, and logout or rotation replaces it.

pub mod claims;
pub mod jwt;
pub mod temp_token;

pub use claims::{Claims, RefreshTokenClaims};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
pub use temp_token::{TemporaryToken, generate_temporary_token, hash_token};
