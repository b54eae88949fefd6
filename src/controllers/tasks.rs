use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};

use crate::controllers::extract::{CurrentUser, WithFiles};
use crate::controllers::requests::{CreateTaskRequest, UpdateTaskRequest};
use crate::controllers::response::{created, empty, ok, Reply};
use crate::db::models::Task;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/columns/:column_id/tasks", get(list).post(create))
        .route(
            "/columns/:column_id/tasks/:task_id",
            get(show).patch(update).delete(remove),
        )
}

async fn list(
    State(state): State<AppState>,
    _: CurrentUser,
    Path(column_id): Path<i32>,
) -> Reply<Vec<Task>> {
    ok(state.tasks().list(column_id).await?)
}

async fn show(
    State(state): State<AppState>,
    _: CurrentUser,
    Path((column_id, task_id)): Path<(i32, i32)>,
) -> Reply<Task> {
    ok(state.tasks().get(column_id, task_id).await?)
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(column_id): Path<i32>,
    form: WithFiles<CreateTaskRequest>,
) -> Reply<Task> {
    let draft = form.body.into_draft(form.files);
    created(state.tasks().create(user.id, column_id, draft).await?)
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((column_id, task_id)): Path<(i32, i32)>,
    form: WithFiles<UpdateTaskRequest>,
) -> Reply<Task> {
    let edit = form.body.into_edit(form.files);
    ok(state
        .tasks()
        .update(user.id, column_id, task_id, edit)
        .await?)
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((column_id, task_id)): Path<(i32, i32)>,
) -> Reply<()> {
    state.tasks().delete(user.id, column_id, task_id).await?;
    empty()
}
