//! # ProjeX Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token secrets, expiries and cookie flags
//! - [`cors`]: allowed origins
//! - [`email`]: SMTP settings and the public base URL used in mail links
//! - [`rate_limit`]: per-IP rate limiting
//! - [`storage`]: upload directory and limits
//!
//! ```ignore
//! use projex_config::{JwtConfig, EmailConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let email_config = EmailConfig::from_env();
//! ```

pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod storage;

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use storage::StorageConfig;
