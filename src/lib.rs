#[macro_use]
extern crate diesel;

pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod logging;
pub mod ordering;
pub mod photos;
pub mod services;
pub mod state;
pub mod storage;
pub mod validation;

use axum::{extract::DefaultBodyLimit, Router};

pub use crate::error::AppError;
pub use crate::state::AppState;

/// Largest request body accepted, sized for a handful of photo uploads.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(controllers::auth::routes())
        .merge(controllers::profile::routes())
        .merge(controllers::users::routes())
        .merge(controllers::boards::routes())
        .merge(controllers::columns::routes())
        .merge(controllers::tasks::routes())
        .merge(controllers::comments::routes())
        .merge(controllers::statuses::routes())
        .merge(controllers::files::routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
