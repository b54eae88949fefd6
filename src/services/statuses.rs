use std::sync::Arc;

use tracing::instrument;

use crate::db::models::{Status, StatusChangeSet};
use crate::db::prelude::*;
use crate::error::{AppError, Missing};
use crate::services::OrMissing;

pub struct StatusService {
    store: Arc<dyn Store>,
}

impl StatusService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        StatusService { store }
    }

    pub async fn list(&self) -> Result<Vec<Status>, AppError> {
        Ok(self.store.list_statuses().await?)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        status_id: i32,
        name: Option<String>,
        color_code: Option<String>,
    ) -> Result<Status, AppError> {
        self.store
            .update_status(status_id, StatusChangeSet { name, color_code })
            .await?
            .or_missing(Missing::Status)
    }
}
