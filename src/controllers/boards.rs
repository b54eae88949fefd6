use axum::{
    extract::{Path, State},
    routing::{delete, get, patch},
    Router,
};

use crate::controllers::extract::{CurrentUser, ValidJson};
use crate::controllers::requests::{AddMemberRequest, CreateBoardRequest, UpdateBoardRequest};
use crate::controllers::response::{created, empty, ok, Reply};
use crate::db::models::{Board, BoardMember, BoardUserRole, BoardWithMembers};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/boards", get(list).post(create))
        .route("/boards/:board_id", patch(update).delete(remove))
        .route("/boards/:board_id/members", get(members).post(add_member))
        .route("/boards/:board_id/members/:user_id", delete(remove_member))
}

async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Reply<Vec<BoardWithMembers>> {
    ok(state.boards().list_for(user.id).await?)
}

async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(request): ValidJson<CreateBoardRequest>,
) -> Reply<Board> {
    created(state.boards().create(user.id, request.name).await?)
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(board_id): Path<i32>,
    ValidJson(request): ValidJson<UpdateBoardRequest>,
) -> Reply<BoardWithMembers> {
    ok(state
        .boards()
        .update(user.id, board_id, request.into())
        .await?)
}

async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(board_id): Path<i32>,
) -> Reply<()> {
    state.boards().delete(user.id, board_id).await?;
    empty()
}

async fn members(
    State(state): State<AppState>,
    _: CurrentUser,
    Path(board_id): Path<i32>,
) -> Reply<Vec<BoardMember>> {
    ok(state.boards().members(board_id).await?)
}

async fn add_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(board_id): Path<i32>,
    ValidJson(request): ValidJson<AddMemberRequest>,
) -> Reply<BoardUserRole> {
    created(
        state
            .boards()
            .add_member(user.id, board_id, request.user_id)
            .await?,
    )
}

async fn remove_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((board_id, member_id)): Path<(i32, i32)>,
) -> Reply<BoardUserRole> {
    ok(state
        .boards()
        .remove_member(user.id, board_id, member_id)
        .await?)
}
