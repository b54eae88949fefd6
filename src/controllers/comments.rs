use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Router,
};

use crate::controllers::extract::{CurrentUser, ValidJson};
use crate::controllers::requests::{CreateCommentRequest, UpdateCommentRequest};
use crate::controllers::response::{created, empty, ok, Reply};
use crate::db::models::Comment;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks/:task_id/comments", get(list).post(create))
        .route(
            "/tasks/:task_id/comments/:comment_id",
            patch(update).delete(remove),
        )
}

async fn list(
    State(state): State<AppState>,
    _: CurrentUser,
    Path(task_id): Path<i32>,
) -> Reply<Vec<Comment>> {
    ok(state.comments().list(task_id).await?)
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<i32>,
    ValidJson(request): ValidJson<CreateCommentRequest>,
) -> Reply<Comment> {
    created(
        state
            .comments()
            .create(user.id, task_id, request.into())
            .await?,
    )
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, comment_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<UpdateCommentRequest>,
) -> Reply<Comment> {
    ok(state
        .comments()
        .update(user.id, task_id, comment_id, request.content)
        .await?)
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((task_id, comment_id)): Path<(i32, i32)>,
) -> Reply<()> {
    state.comments().delete(user.id, task_id, comment_id).await?;
    empty()
}
