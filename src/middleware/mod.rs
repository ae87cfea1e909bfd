//! Request authentication and project-scoped authorization.
//!
//! - [`auth`]: the `require_auth` layer and the [`auth::AuthUser`] extractor
//! - [`permission`]: the role policy and per-action extractors

pub mod auth;
pub mod permission;
