//! Task, subtask and note seeding for already seeded projects.

use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence, Words};
use projex_models::TaskStatus;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{NoteSeed, SeedConfig, SeededProject, SubTaskSeed, TaskSeed};
use super::values_placeholders;

/// Lorem words joined and cut to fit a 4 to 50 character title.
fn title() -> String {
    let words: Vec<String> = Words(2..5).fake();
    let mut title = words.join(" ");
    title.truncate(50);
    while title.len() < 4 {
        title.push('!');
    }
    title
}

fn status_for(idx: usize) -> TaskStatus {
    match idx % 3 {
        0 => TaskStatus::Todo,
        1 => TaskStatus::InProgress,
        _ => TaskStatus::Done,
    }
}

pub fn generate_tasks(projects: &[SeededProject], per_project: usize) -> Vec<TaskSeed> {
    projects
        .par_iter()
        .flat_map(|project| {
            let writers: Vec<Uuid> = project.task_writers().collect();
            (0..per_project)
                .map(|idx| TaskSeed {
                    project_id: project.id,
                    title: title(),
                    description: Some(Sentence(6..14).fake()),
                    assigned_to: project.members[idx % project.members.len()].0,
                    assigned_by: writers[idx % writers.len()],
                    status: status_for(idx),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn generate_subtasks(tasks: &[(Uuid, Uuid)], per_task: usize) -> Vec<SubTaskSeed> {
    tasks
        .par_iter()
        .flat_map(|&(task_id, created_by)| {
            (0..per_task)
                .map(|idx| SubTaskSeed {
                    task_id,
                    title: title(),
                    is_completed: idx % 2 == 0,
                    created_by,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn generate_notes(projects: &[SeededProject], per_project: usize) -> Vec<NoteSeed> {
    projects
        .par_iter()
        .flat_map(|project| {
            (0..per_project)
                .map(|_| {
                    let mut content: String = Paragraph(1..3).fake();
                    content.truncate(500);
                    NoteSeed {
                        project_id: project.id,
                        created_by: project.admin(),
                        content,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_work(
    db: &PgPool,
    projects: &[SeededProject],
    config: &SeedConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "📝 Seeding {} tasks, {} subtasks and {} notes...",
        config.total_tasks(),
        config.total_subtasks(),
        projects.len() * config.notes_per_project
    );

    let tasks = generate_tasks(projects, config.tasks_per_project);
    let notes = generate_notes(projects, config.notes_per_project);

    let mut tx = db.begin().await?;

    let mut task_ids = Vec::with_capacity(tasks.len());
    for chunk in tasks.chunks(1000) {
        let ids = insert_tasks_chunk(&mut tx, chunk).await?;
        task_ids.extend(ids.into_iter().zip(chunk.iter().map(|t| t.assigned_by)));
    }

    let subtasks = generate_subtasks(&task_ids, config.subtasks_per_task);
    for chunk in subtasks.chunks(2000) {
        insert_subtasks_chunk(&mut tx, chunk).await?;
    }

    for chunk in notes.chunks(2000) {
        insert_notes_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;

    println!("   ✓ Inserted project work in {:?}", start_time.elapsed());

    Ok(())
}

async fn insert_tasks_chunk(
    tx: &mut Transaction<'_, Postgres>,
    tasks: &[TaskSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO tasks (project_id, title, description, assigned_to, assigned_by, status) VALUES {} RETURNING id",
        values_placeholders(tasks.len(), 6)
    );

    let mut q = sqlx::query_scalar(&query);
    for task in tasks {
        q = q
            .bind(task.project_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.assigned_to)
            .bind(task.assigned_by)
            .bind(task.status);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

async fn insert_subtasks_chunk(
    tx: &mut Transaction<'_, Postgres>,
    subtasks: &[SubTaskSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    if subtasks.is_empty() {
        return Ok(());
    }

    let query = format!(
        "INSERT INTO subtasks (task_id, title, is_completed, created_by) VALUES {}",
        values_placeholders(subtasks.len(), 4)
    );

    let mut q = sqlx::query(&query);
    for subtask in subtasks {
        q = q
            .bind(subtask.task_id)
            .bind(&subtask.title)
            .bind(subtask.is_completed)
            .bind(subtask.created_by);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

async fn insert_notes_chunk(
    tx: &mut Transaction<'_, Postgres>,
    notes: &[NoteSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    if notes.is_empty() {
        return Ok(());
    }

    let query = format!(
        "INSERT INTO project_notes (project_id, created_by, content) VALUES {}",
        values_placeholders(notes.len(), 3)
    );

    let mut q = sqlx::query(&query);
    for note in notes {
        q = q
            .bind(note.project_id)
            .bind(note.created_by)
            .bind(&note.content);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use projex_models::ProjectRole;

    fn project() -> SeededProject {
        SeededProject {
            id: Uuid::new_v4(),
            members: vec![
                (Uuid::new_v4(), ProjectRole::Admin),
                (Uuid::new_v4(), ProjectRole::Member),
            ],
        }
    }

    #[test]
    fn test_titles_fit_validation_bounds() {
        for _ in 0..100 {
            let t = title();
            assert!((4..=50).contains(&t.len()), "{t:?}");
        }
    }

    #[test]
    fn test_tasks_are_assigned_by_task_writers() {
        let project = project();
        let tasks = generate_tasks(std::slice::from_ref(&project), 6);

        assert_eq!(tasks.len(), 6);
        for task in &tasks {
            assert_eq!(task.assigned_by, project.admin());
            assert!(project.members.iter().any(|(id, _)| *id == task.assigned_to));
        }
    }

    #[test]
    fn test_notes_are_written_by_the_admin() {
        let project = project();
        let notes = generate_notes(std::slice::from_ref(&project), 3);
        assert!(notes.iter().all(|n| n.created_by == project.admin()));
        assert!(notes.iter().all(|n| n.content.len() <= 500));
    }
}
