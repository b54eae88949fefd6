use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::controllers::extract::ValidJson;
use crate::controllers::requests::{SignInRequest, SignUpRequest};
use crate::controllers::response::Payload;
use crate::db::models::User;
use crate::error::AppError;
use crate::services::auth::Session;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    user: User,
    access_token: String,
}

fn with_cookie(status: StatusCode, session: Session) -> Response {
    let body = Payload {
        payload: SessionBody {
            user: session.user,
            access_token: session.token,
        },
    };
    (status, [(SET_COOKIE, session.cookie)], Json(body)).into_response()
}

async fn sign_in(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignInRequest>,
) -> Result<Response, AppError> {
    let session = state
        .auth()
        .sign_in(&request.email, &request.password)
        .await?;
    Ok(with_cookie(StatusCode::OK, session))
}

async fn sign_up(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<SignUpRequest>,
) -> Result<Response, AppError> {
    let session = state.auth().sign_up(request.into()).await?;
    Ok(with_cookie(StatusCode::CREATED, session))
}
