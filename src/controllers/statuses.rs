use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Router,
};

use crate::controllers::extract::{CurrentUser, ValidJson};
use crate::controllers::requests::UpdateStatusRequest;
use crate::controllers::response::{ok, Reply};
use crate::db::models::Status;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/statuses", get(list))
        .route("/statuses/:status_id", patch(update))
}

async fn list(State(state): State<AppState>, _: CurrentUser) -> Reply<Vec<Status>> {
    ok(state.statuses().list().await?)
}

async fn update(
    State(state): State<AppState>,
    _: CurrentUser,
    Path(status_id): Path<i32>,
    ValidJson(request): ValidJson<UpdateStatusRequest>,
) -> Reply<Status> {
    ok(state
        .statuses()
        .update(status_id, request.name, request.color_code)
        .await?)
}
