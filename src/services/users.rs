use std::sync::Arc;

use tracing::instrument;

use crate::db::models::{User, UserChangeSet};
use crate::db::prelude::*;
use crate::db::StoreError;
use crate::error::{AppError, Missing};
use crate::services::OrMissing;
use crate::storage::{remove_urls, upload_all, ObjectStore, UploadedFile};

#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<UploadedFile>,
}

pub struct UserService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        UserService { store, objects }
    }

    pub async fn search(&self, name: Option<String>) -> Result<Vec<User>, AppError> {
        let needle = name.filter(|name| !name.trim().is_empty());
        Ok(self.store.search_users(needle).await?)
    }

    pub async fn profile(&self, user_id: i32) -> Result<User, AppError> {
        self.store.find_user(user_id).await?.or_missing(Missing::User)
    }

    /// Updates the caller's profile. A new photo replaces the stored one,
    /// whose object is removed.
    #[instrument(skip(self, edit))]
    pub async fn update_profile(&self, user_id: i32, edit: ProfileEdit) -> Result<User, AppError> {
        let current = self.profile(user_id).await?;

        if let Some(email) = &edit.email {
            let taken = self
                .store
                .find_user_by_email(email)
                .await?
                .is_some_and(|other| other.id != user_id);
            if taken {
                return Err(AppError::validation(format!("Email {email} is already in use")));
            }
        }

        let requested_email = edit.email.clone().unwrap_or_default();
        let mut changes = UserChangeSet {
            email: edit.email,
            name: edit.name,
            photo: None,
        };
        if let Some(photo) = edit.photo {
            let uploaded = upload_all(self.objects.as_ref(), std::slice::from_ref(&photo)).await?;
            changes.photo = uploaded.into_iter().next();
            if let Some(old) = &current.photo {
                remove_urls(self.objects.as_ref(), std::slice::from_ref(old)).await?;
            }
        }

        match self.store.update_user(user_id, changes).await {
            Ok(user) => user.or_missing(Missing::User),
            Err(StoreError::Conflict(_)) => Err(AppError::validation(format!(
                "Email {requested_email} is already in use"
            ))),
            Err(err) => Err(err.into()),
        }
    }
}
