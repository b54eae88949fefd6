//! Columns are reachable under their board and, flattened, by id alone.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};

use crate::controllers::extract::{CurrentUser, ValidJson};
use crate::controllers::requests::{CreateColumnRequest, UpdateColumnRequest};
use crate::controllers::response::{created, empty, ok, Reply};
use crate::db::models::Column;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/boards/:board_id/columns", get(list).post(create))
        .route(
            "/boards/:board_id/columns/:column_id",
            get(show).patch(update).delete(remove),
        )
        .route(
            "/columns/:column_id",
            get(show_flat).patch(update_flat).delete(remove_flat),
        )
}

async fn list(
    State(state): State<AppState>,
    _: CurrentUser,
    Path(board_id): Path<i32>,
) -> Reply<Vec<Column>> {
    ok(state.columns().list(board_id).await?)
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(board_id): Path<i32>,
    ValidJson(request): ValidJson<CreateColumnRequest>,
) -> Reply<Column> {
    created(state.columns().create(user.id, board_id, request.name).await?)
}

async fn show(
    State(state): State<AppState>,
    _: CurrentUser,
    Path((board_id, column_id)): Path<(i32, i32)>,
) -> Reply<Column> {
    ok(state.columns().get(Some(board_id), column_id).await?)
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((board_id, column_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<UpdateColumnRequest>,
) -> Reply<Column> {
    ok(state
        .columns()
        .update(user.id, Some(board_id), column_id, request.into())
        .await?)
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((board_id, column_id)): Path<(i32, i32)>,
) -> Reply<()> {
    state.columns().delete(user.id, Some(board_id), column_id).await?;
    empty()
}

async fn show_flat(
    State(state): State<AppState>,
    _: CurrentUser,
    Path(column_id): Path<i32>,
) -> Reply<Column> {
    ok(state.columns().get(None, column_id).await?)
}

async fn update_flat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(column_id): Path<i32>,
    ValidJson(request): ValidJson<UpdateColumnRequest>,
) -> Reply<Column> {
    ok(state
        .columns()
        .update(user.id, None, column_id, request.into())
        .await?)
}

async fn remove_flat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(column_id): Path<i32>,
) -> Reply<()> {
    state.columns().delete(user.id, None, column_id).await?;
    empty()
}
