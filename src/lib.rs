//! # ProjeX API
//!
//! A project management REST API built with Rust, Axum and PostgreSQL.
//! Users create projects, invite members with a project role, and track work
//! as tasks with subtasks, attachments and project notes.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Cookie auth, silent refresh, project policy
//! ├── modules/          # Feature modules
//! │   ├── healthcheck/
//! │   ├── users/        # Registration, sessions, password recovery
//! │   ├── projects/
//! │   ├── members/
//! │   ├── tasks/
//! │   ├── subtasks/
//! │   └── notes/
//! └── utils/            # Cookies, email, multipart, uploads
//! ```
//!
//! Each feature module has `controller.rs` (handlers), `service.rs` (queries
//! and business rules), `model.rs` and `router.rs`.
//!
//! ## Project roles
//!
//! | Role | Read | Tasks & subtasks | Notes | Project & members |
//! |------|------|------------------|-------|-------------------|
//! | admin | yes | yes | yes | yes |
//! | project_admin | yes | yes | no | no |
//! | member | yes | no | no | no |
//!
//! Every rule lives in [`middleware::permission::authorize`].
//!
//! ## Sessions
//!
//! Login sets `accessToken` and `refreshToken` httpOnly cookies. When the
//! access token has expired, [`middleware::auth::require_auth`] rotates the
//! pair from the refresh cookie and carries on with the request.
//!
//! ## API documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

#[cfg(feature = "test-utils")]
pub mod testing;

pub use projex_auth;
pub use projex_config;
pub use projex_core;
pub use projex_db;
pub use projex_models;
