use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use crate::auth::{hash_password, verify_password, SessionKeys};
use crate::db::models::{NewUser, User};
use crate::db::prelude::*;
use crate::db::StoreError;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// A signed-in user together with the token and cookie carrying the session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub cookie: String,
}

pub struct AuthService {
    store: Arc<dyn Store>,
    sessions: Arc<SessionKeys>,
}

fn email_in_use(email: &str) -> AppError {
    AppError::validation(format!("Email {email} is already in use"))
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, sessions: Arc<SessionKeys>) -> Self {
        AuthService { store, sessions }
    }

    fn open_session(&self, user: User) -> Result<Session, AppError> {
        let token = self.sessions.issue(&user)?;
        let cookie = self.sessions.cookie(&token);
        Ok(Session { user, token, cookie })
    }

    #[instrument(skip(self, sign_up), fields(email = %sign_up.email))]
    pub async fn sign_up(&self, sign_up: SignUp) -> Result<Session, AppError> {
        if self.store.find_user_by_email(&sign_up.email).await?.is_some() {
            return Err(email_in_use(&sign_up.email));
        }
        let password = hash_password(&sign_up.password)?;
        let created = self
            .store
            .create_user(NewUser {
                email: sign_up.email.clone(),
                password,
                name: sign_up.name,
                photo: None,
                timestamps: Utc::now(),
            })
            .await;
        let user = match created {
            Ok(user) => user,
            Err(StoreError::Conflict(_)) => return Err(email_in_use(&sign_up.email)),
            Err(err) => return Err(err.into()),
        };
        info!(user_id = user.id, "user signed up");
        self.open_session(user)
    }

    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !verify_password(password, &user.password) {
            return Err(AppError::Unauthorized);
        }
        self.open_session(user)
    }

    /// Resolves a session token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = self
            .sessions
            .verify(token)
            .map_err(|_| AppError::Unauthorized)?;
        self.store
            .find_user(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
