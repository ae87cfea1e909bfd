use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{add_member, list_members, remove_member, update_member_role};

pub fn init_members_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(add_member))
        .route("/{user_id}", put(update_member_role).delete(remove_member))
}
