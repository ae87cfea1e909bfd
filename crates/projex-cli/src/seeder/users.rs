//! User seeding.

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::UserSeed;
use super::{SEED_EMAIL_DOMAIN, values_placeholders};

/// Generates verified-looking users with unique emails and usernames.
pub fn generate_users(count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let slug = |s: &str| {
                s.chars()
                    .filter(char::is_ascii_alphanumeric)
                    .collect::<String>()
                    .to_lowercase()
            };

            UserSeed {
                email: format!(
                    "{}.{}{}@{}",
                    slug(&first_name),
                    slug(&last_name),
                    idx,
                    SEED_EMAIL_DOMAIN
                ),
                username: format!("seed_{:06}", idx),
                full_name: format!("{} {}", first_name, last_name),
                password_hash: password_hash.to_string(),
            }
        })
        .collect()
}

pub async fn seed_users(
    db: &PgPool,
    count: usize,
    password_hash: &str,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("👥 Seeding {} users...", count);

    let users = generate_users(count, password_hash);

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(users.len());
    for chunk in users.chunks(1000) {
        ids.extend(insert_users_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO users (email, username, full_name, password) VALUES {} RETURNING id",
        values_placeholders(users.len(), 4)
    );

    let mut q = sqlx::query_scalar(&query);
    for user in users {
        q = q
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.full_name)
            .bind(&user.password_hash);
    }

    let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;

    sqlx::query("UPDATE users SET is_email_verified = TRUE WHERE id = ANY($1)")
        .bind(&ids)
        .execute(&mut **tx)
        .await?;

    Ok(ids)
}
