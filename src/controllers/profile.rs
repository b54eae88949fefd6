use axum::{extract::State, routing::get, Router};

use crate::controllers::extract::{CurrentUser, WithFiles};
use crate::controllers::requests::ProfileRequest;
use crate::controllers::response::{ok, Reply};
use crate::db::models::User;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/profile", get(show).patch(update))
}

async fn show(CurrentUser(user): CurrentUser) -> Reply<User> {
    ok(user)
}

async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    form: WithFiles<ProfileRequest>,
) -> Reply<User> {
    let edit = form.body.into_edit(form.files);
    ok(state.users().update_profile(user.id, edit).await?)
}
