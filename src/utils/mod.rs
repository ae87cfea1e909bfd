//! Shared utilities for the HTTP layer.
//!
//! - [`cookies`]: auth cookie names and builders
//! - [`email`]: verification and password reset mail
//! - [`multipart`]: multipart form extraction with file uploads
//! - [`uploads`]: storing and discarding uploaded files

pub mod cookies;
pub mod email;
pub mod multipart;
pub mod uploads;
