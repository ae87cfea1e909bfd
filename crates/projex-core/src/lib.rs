//! # ProjeX Core
//!
//! Foundational types shared by every ProjeX crate:
//!
//! - [`errors`]: `AppError` and the failure envelope
//! - [`response`]: `ApiResponse<T>`, the success envelope
//! - [`pagination`]: pagination parameters and metadata
//! - [`password`]: bcrypt hashing and verification
//! - [`file_storage`]: storage abstraction for uploads
//! - [`serde`]: deserialization helpers for request DTOs

pub mod errors;
pub mod file_storage;
pub mod pagination;
pub mod password;
pub mod response;
pub mod serde;

pub use errors::{AppError, ErrorBody, FieldError};
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use response::{ApiResponse, Empty};
