use axum::{
    Router,
    routing::{post, put},
};

use crate::state::AppState;

use super::controller::{create_subtask, delete_subtask, update_subtask};

pub fn init_subtasks_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_subtask))
        .route("/{subtask_id}", put(update_subtask).delete(delete_subtask))
}
