use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::error::AppError;

/// Success envelope: `{ "payload": ... }`.
#[derive(Debug, Serialize)]
pub struct Payload<T> {
    pub payload: T,
}

pub type Reply<T> = Result<(StatusCode, Json<Payload<T>>), AppError>;

pub fn ok<T: Serialize>(payload: T) -> Reply<T> {
    Ok((StatusCode::OK, Json(Payload { payload })))
}

pub fn created<T: Serialize>(payload: T) -> Reply<T> {
    Ok((StatusCode::CREATED, Json(Payload { payload })))
}

/// `{ "payload": null }` for deletions.
pub fn empty() -> Reply<()> {
    ok(())
}
