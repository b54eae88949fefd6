use std::sync::Arc;

use crate::auth::SessionKeys;
use crate::db::Store;
use crate::services::{
    auth::AuthService, boards::BoardService, columns::ColumnService, comments::CommentService,
    statuses::StatusService, tasks::TaskService, users::UserService,
};
use crate::storage::ObjectStore;

/// Handles shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub objects: Arc<dyn ObjectStore>,
    pub sessions: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>, sessions: SessionKeys) -> Self {
        AppState {
            store,
            objects,
            sessions: Arc::new(sessions),
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.store.clone(), self.sessions.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.store.clone(), self.objects.clone())
    }

    pub fn boards(&self) -> BoardService {
        BoardService::new(self.store.clone(), self.objects.clone())
    }

    pub fn columns(&self) -> ColumnService {
        ColumnService::new(self.store.clone(), self.objects.clone())
    }

    pub fn tasks(&self) -> TaskService {
        TaskService::new(self.store.clone(), self.objects.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.store.clone())
    }

    pub fn statuses(&self) -> StatusService {
        StatusService::new(self.store.clone())
    }
}
