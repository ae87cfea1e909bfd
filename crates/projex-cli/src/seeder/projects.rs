//! Project and membership seeding.
//!
//! Project `i` is owned by user `i % users`, who becomes its admin. The next
//! users in line join as one project admin followed by plain members.

use fake::Fake;
use fake::faker::company::en::{Buzzword, CatchPhrase};
use projex_models::ProjectRole;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{MemberSeed, ProjectSeed, SeedConfig, SeededProject};
use super::values_placeholders;

pub fn generate_projects(user_ids: &[Uuid], count: usize) -> Vec<ProjectSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let buzzword: String = Buzzword().fake();
            ProjectSeed {
                name: format!("{} {}", buzzword, idx + 1),
                description: Some(CatchPhrase().fake()),
                created_by: user_ids[idx % user_ids.len()],
            }
        })
        .collect()
}

/// Admin first, then `members_per_project - 1` other users.
pub fn plan_members(
    project_idx: usize,
    user_ids: &[Uuid],
    members_per_project: usize,
) -> Vec<(Uuid, ProjectRole)> {
    let owner = project_idx % user_ids.len();
    let wanted = members_per_project.clamp(1, user_ids.len());

    (0..wanted)
        .map(|offset| {
            let role = match offset {
                0 => ProjectRole::Admin,
                1 => ProjectRole::ProjectAdmin,
                _ => ProjectRole::Member,
            };
            (user_ids[(owner + offset) % user_ids.len()], role)
        })
        .collect()
}

pub async fn seed_projects(
    db: &PgPool,
    user_ids: &[Uuid],
    config: &SeedConfig,
) -> Result<Vec<SeededProject>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📁 Seeding {} projects...", config.projects);

    let projects = generate_projects(user_ids, config.projects);

    let mut tx = db.begin().await?;
    let mut project_ids = Vec::with_capacity(projects.len());
    for chunk in projects.chunks(1000) {
        project_ids.extend(insert_projects_chunk(&mut tx, chunk).await?);
    }

    let seeded: Vec<SeededProject> = project_ids
        .iter()
        .enumerate()
        .map(|(idx, &id)| SeededProject {
            id,
            members: plan_members(idx, user_ids, config.members_per_project),
        })
        .collect();

    let members: Vec<MemberSeed> = seeded
        .iter()
        .flat_map(|project| {
            project.members.iter().map(|&(user_id, role)| MemberSeed {
                project_id: project.id,
                user_id,
                role,
            })
        })
        .collect();

    for chunk in members.chunks(2000) {
        insert_members_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} projects with {} memberships in {:?}",
        seeded.len(),
        members.len(),
        start_time.elapsed()
    );

    Ok(seeded)
}

async fn insert_projects_chunk(
    tx: &mut Transaction<'_, Postgres>,
    projects: &[ProjectSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if projects.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO projects (name, description, created_by) VALUES {} RETURNING id",
        values_placeholders(projects.len(), 3)
    );

    let mut q = sqlx::query_scalar(&query);
    for project in projects {
        q = q
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.created_by);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

async fn insert_members_chunk(
    tx: &mut Transaction<'_, Postgres>,
    members: &[MemberSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    if members.is_empty() {
        return Ok(());
    }

    let query = format!(
        "INSERT INTO project_members (project_id, user_id, role) VALUES {} ON CONFLICT (project_id, user_id) DO NOTHING",
        values_placeholders(members.len(), 3)
    );

    let mut q = sqlx::query(&query);
    for member in members {
        q = q.bind(member.project_id).bind(member.user_id).bind(member.role);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}
