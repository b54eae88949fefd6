use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::db::models::{Column, NewTask, Task, TaskChangeSet, FALLBACK_STATUS_ID, NOT_STATUS};
use crate::db::prelude::*;
use crate::error::{AppError, Missing};
use crate::photos;
use crate::services::{boards::BoardService, OrMissing};
use crate::storage::{remove_urls, upload_all, ObjectStore, UploadedFile};

#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status_id: Option<i32>,
    pub recepient_id: Option<i32>,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status_id: Option<i32>,
    pub recepient_id: Option<i32>,
    pub column_id: Option<i32>,
    /// Indices into the task's current photo list.
    pub deleted_images: Vec<i64>,
    pub files: Vec<UploadedFile>,
}

pub struct TaskService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        TaskService { store, objects }
    }

    async fn column(&self, column_id: i32) -> Result<Column, AppError> {
        self.store.find_column(column_id).await?.or_missing(Missing::Column)
    }

    async fn check_recepient(&self, recepient_id: Option<i32>) -> Result<(), AppError> {
        if let Some(recepient_id) = recepient_id {
            self.store.find_user(recepient_id).await?.or_missing(Missing::User)?;
        }
        Ok(())
    }

    /// The requested status when it exists, otherwise `NotStatus`, otherwise
    /// the fallback id.
    pub async fn resolve_status(&self, requested: Option<i32>) -> Result<i32, AppError> {
        if let Some(status_id) = requested {
            if self.store.find_status(status_id).await?.is_some() {
                return Ok(status_id);
            }
            debug!(status_id, "unknown status requested, falling back");
        }
        match self.store.find_status_by_name(NOT_STATUS).await {
            Ok(Some(status)) => Ok(status.id),
            Ok(None) => Ok(FALLBACK_STATUS_ID),
            Err(err) => {
                warn!(%err, "NotStatus lookup failed, using fallback status");
                Ok(FALLBACK_STATUS_ID)
            }
        }
    }

    /// Owners edit their tasks; board admins edit any task on the board.
    async fn require_editor(&self, user_id: i32, task: &Task) -> Result<(), AppError> {
        if task.owner_id == user_id {
            return Ok(());
        }
        let column = self.column(task.column_id).await?;
        let boards = BoardService::new(self.store.clone(), self.objects.clone());
        if boards.is_admin(column.board_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub async fn list(&self, column_id: i32) -> Result<Vec<Task>, AppError> {
        self.column(column_id).await?;
        Ok(self.store.list_tasks(column_id).await?)
    }

    pub async fn get(&self, column_id: i32, task_id: i32) -> Result<Task, AppError> {
        self.column(column_id).await?;
        self.store
            .find_task(task_id)
            .await?
            .filter(|task| task.column_id == column_id)
            .or_missing(Missing::Task)
    }

    #[instrument(skip(self, draft), fields(files = draft.files.len()))]
    pub async fn create(
        &self,
        user_id: i32,
        column_id: i32,
        draft: TaskDraft,
    ) -> Result<Task, AppError> {
        self.column(column_id).await?;
        self.check_recepient(draft.recepient_id).await?;
        let status_id = self.resolve_status(draft.status_id).await?;
        let photos = upload_all(self.objects.as_ref(), &draft.files).await?;

        let now = Utc::now();
        let task = self
            .store
            .insert_task(NewTask {
                name: draft.name,
                description: draft.description,
                deadline: draft.deadline.unwrap_or(now + Duration::days(1)),
                owner_id: user_id,
                column_id,
                status_id,
                recepient_id: draft.recepient_id,
                photos,
                timestamps: now,
            })
            .await?;
        info!(task_id = task.id, "task created");
        Ok(task)
    }

    /// Applies a partial edit. The status is resolved again on every update,
    /// so an edit without `statusId` puts the task back on `NotStatus`.
    #[instrument(skip(self, edit), fields(files = edit.files.len()))]
    pub async fn update(
        &self,
        user_id: i32,
        column_id: i32,
        task_id: i32,
        edit: TaskEdit,
    ) -> Result<Task, AppError> {
        let task = self.get(column_id, task_id).await?;
        self.require_editor(user_id, &task).await?;
        if let Some(target) = edit.column_id {
            let target = self.column(target).await?;
            let current = self.column(column_id).await?;
            if target.board_id != current.board_id {
                BoardService::new(self.store.clone(), self.objects.clone())
                    .require_member(target.board_id, user_id)
                    .await?;
            }
        }
        self.check_recepient(edit.recepient_id).await?;
        let status_id = self.resolve_status(edit.status_id).await?;

        let photos = if edit.deleted_images.is_empty() && edit.files.is_empty() {
            None
        } else {
            let photo_edit = photos::split(&task.photos, &edit.deleted_images);
            remove_urls(self.objects.as_ref(), &photo_edit.removed).await?;
            let uploaded = upload_all(self.objects.as_ref(), &edit.files).await?;
            Some(photos::merge(photo_edit.kept, uploaded))
        };

        self.store
            .update_task(
                task_id,
                TaskChangeSet {
                    name: edit.name,
                    description: edit.description,
                    deadline: edit.deadline,
                    column_id: edit.column_id,
                    status_id: Some(status_id),
                    recepient_id: edit.recepient_id,
                    photos,
                },
            )
            .await?
            .or_missing(Missing::Task)
    }

    /// Deletes a task after removing its photos from object storage.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i32, column_id: i32, task_id: i32) -> Result<(), AppError> {
        let task = self.get(column_id, task_id).await?;
        self.require_editor(user_id, &task).await?;
        remove_urls(self.objects.as_ref(), &task.photos).await?;
        self.store
            .delete_task(task_id)
            .await?
            .or_missing(Missing::Task)?;
        info!(task_id, removed_photos = task.photos.len(), "task deleted");
        Ok(())
    }
}
