//! # ProjeX CLI
//!
//! Account creation and database seeding for ProjeX development.
//!
//! ## Usage
//!
//! ```ignore
//! use projex_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::new(20); // 20 users with default project counts
//! seed_all(&pool, config).await?;
//! ```
//!
//! Seeded accounts use the `@seed.projex.dev` email domain, which is how
//! [`seeder::clear_all`] finds them again.

pub mod accounts;
pub mod seeder;
