use axum::{Router, routing::get};

use crate::modules::subtasks::init_subtasks_router;
use crate::state::AppState;

use super::controller::{create_task, delete_task, get_task, list_tasks, update_task};

pub fn init_tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .nest("/{task_id}/subtasks", init_subtasks_router())
}
