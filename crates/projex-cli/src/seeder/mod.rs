//! Fake data for local development.
//!
//! Rows are generated in parallel with Rayon and inserted with multi-row
//! `INSERT` statements inside one transaction per table.

pub mod models;
pub mod projects;
pub mod users;
pub mod work;

use sqlx::PgPool;
use std::time::Instant;

pub use models::SeedConfig;

/// Email domain of every seeded account.
pub const SEED_EMAIL_DOMAIN: &str = "seed.projex.dev";

/// Password of every seeded account.
pub const SEED_PASSWORD: &str = "password123";

/// Seeds users, projects with their members, then tasks, subtasks and notes.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} users and {} projects...\n",
        config.users, config.projects
    );

    if config.users == 0 {
        return Err("At least one user is required".into());
    }

    // Low cost: seeded accounts are throwaway and bcrypt dominates otherwise.
    let password_hash = bcrypt::hash(SEED_PASSWORD, 4)?;

    let user_ids = users::seed_users(db, config.users, &password_hash).await?;
    let projects = projects::seed_projects(db, &user_ids, &config).await?;
    work::seed_work(db, &projects, &config).await?;

    println!("\n✅ Seeding finished in {:?}", start_time.elapsed());
    println!("   Every seeded account uses the password `{}`", SEED_PASSWORD);

    Ok(())
}

/// Removes every row that belongs to a seeded user, children first.
pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;

    let seeded_projects = "SELECT p.id FROM projects p JOIN users u ON u.id = p.created_by WHERE u.email LIKE $1";
    let statements = [
        format!(
            "DELETE FROM subtasks WHERE task_id IN (SELECT id FROM tasks WHERE project_id IN ({seeded_projects}))"
        ),
        format!("DELETE FROM tasks WHERE project_id IN ({seeded_projects})"),
        format!("DELETE FROM project_notes WHERE project_id IN ({seeded_projects})"),
        format!("DELETE FROM project_members WHERE project_id IN ({seeded_projects})"),
        format!("DELETE FROM projects WHERE id IN ({seeded_projects})"),
    ];

    for statement in &statements {
        sqlx::query(statement).bind(&pattern).execute(&mut *tx).await?;
    }

    // Seeded users may still be referenced from projects they were invited to.
    let seeded_users = "SELECT id FROM users WHERE email LIKE $1";
    let leftovers = [
        format!("DELETE FROM subtasks WHERE created_by IN ({seeded_users})"),
        format!(
            "DELETE FROM subtasks WHERE task_id IN (SELECT id FROM tasks WHERE assigned_to IN ({seeded_users}) OR assigned_by IN ({seeded_users}))"
        ),
        format!(
            "DELETE FROM tasks WHERE assigned_to IN ({seeded_users}) OR assigned_by IN ({seeded_users})"
        ),
        format!("DELETE FROM project_notes WHERE created_by IN ({seeded_users})"),
        format!("DELETE FROM project_members WHERE user_id IN ({seeded_users})"),
    ];

    for statement in &leftovers {
        sqlx::query(statement).bind(&pattern).execute(&mut *tx).await?;
    }

    let users_deleted = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    println!(
        "   ✓ Deleted {} seeded users and their projects in {:?}",
        users_deleted,
        start_time.elapsed()
    );

    Ok(())
}

/// Builds `($1, $2, ..), ($n+1, ..)` for a multi-row insert.
pub(crate) fn values_placeholders(rows: usize, columns: usize) -> String {
    (0..rows)
        .map(|row| {
            let params: Vec<String> = (1..=columns)
                .map(|col| format!("${}", row * columns + col))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_placeholders() {
        assert_eq!(values_placeholders(2, 3), "($1, $2, $3), ($4, $5, $6)");
        assert_eq!(values_placeholders(0, 3), "");
    }
}
