//! Seed rows and seeding configuration.

use projex_models::{ProjectRole, TaskStatus};
use uuid::Uuid;

pub struct UserSeed {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
}

pub struct ProjectSeed {
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
}

pub struct MemberSeed {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
}

pub struct TaskSeed {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    pub status: TaskStatus,
}

pub struct SubTaskSeed {
    pub task_id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub created_by: Uuid,
}

pub struct NoteSeed {
    pub project_id: Uuid,
    pub created_by: Uuid,
    pub content: String,
}

/// A seeded project with its members. The first member is the admin.
#[derive(Clone, Debug)]
pub struct SeededProject {
    pub id: Uuid,
    pub members: Vec<(Uuid, ProjectRole)>,
}

impl SeededProject {
    pub fn admin(&self) -> Uuid {
        self.members[0].0
    }

    /// Members who may create tasks.
    pub fn task_writers(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.members
            .iter()
            .filter(|(_, role)| matches!(role, ProjectRole::Admin | ProjectRole::ProjectAdmin))
            .map(|(id, _)| *id)
    }
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub users: usize,
    pub projects: usize,
    pub members_per_project: usize,
    pub tasks_per_project: usize,
    pub subtasks_per_task: usize,
    pub notes_per_project: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            users: 20,
            projects: 5,
            members_per_project: 4,
            tasks_per_project: 10,
            subtasks_per_task: 3,
            notes_per_project: 3,
        }
    }
}

impl SeedConfig {
    pub fn new(users: usize) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    pub fn total_tasks(&self) -> usize {
        self.projects * self.tasks_per_project
    }

    pub fn total_subtasks(&self) -> usize {
        self.total_tasks() * self.subtasks_per_task
    }
}
