//! HTTP surface. Every module exposes `routes()`, merged by
//! [`crate::build_router`].

pub mod auth;
pub mod boards;
pub mod columns;
pub mod comments;
pub mod extract;
pub mod files;
pub mod profile;
pub mod requests;
pub mod response;
pub mod statuses;
pub mod tasks;
pub mod users;
