use axum::{Router, routing::get};

use crate::modules::{
    members::init_members_router, notes::init_notes_router, tasks::init_tasks_router,
};
use crate::state::AppState;

use super::controller::{
    create_project, delete_project, get_project, list_projects, update_project,
};

pub fn init_projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{project_id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .nest("/{project_id}/members", init_members_router())
        .nest("/{project_id}/tasks", init_tasks_router())
        .nest("/{project_id}/notes", init_notes_router())
}
