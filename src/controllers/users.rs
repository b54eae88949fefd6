use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::controllers::extract::CurrentUser;
use crate::controllers::response::{ok, Reply};
use crate::db::models::User;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(search))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    name: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    _: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Reply<Vec<User>> {
    ok(state.users().search(query.name).await?)
}
