use std::sync::Arc;

use tracing::instrument;

use crate::db::models::{Comment, NewComment, Task};
use crate::db::prelude::*;
use crate::error::{AppError, Missing};
use crate::services::OrMissing;

#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub content: String,
    pub answer_id: Option<i32>,
    pub kind: Option<bool>,
}

pub struct CommentService {
    store: Arc<dyn Store>,
}

impl CommentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        CommentService { store }
    }

    async fn task(&self, task_id: i32) -> Result<Task, AppError> {
        self.store.find_task(task_id).await?.or_missing(Missing::Task)
    }

    async fn comment_on(&self, task_id: i32, comment_id: i32) -> Result<Comment, AppError> {
        self.task(task_id).await?;
        self.store
            .find_comment(comment_id)
            .await?
            .filter(|comment| comment.task_id == task_id)
            .or_missing(Missing::Comment)
    }

    async fn authored(
        &self,
        user_id: i32,
        task_id: i32,
        comment_id: i32,
    ) -> Result<Comment, AppError> {
        let comment = self.comment_on(task_id, comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::PermissionDenied);
        }
        Ok(comment)
    }

    pub async fn list(&self, task_id: i32) -> Result<Vec<Comment>, AppError> {
        self.task(task_id).await?;
        Ok(self.store.list_comments(task_id).await?)
    }

    /// A reply must point at a comment on the same task.
    #[instrument(skip(self, draft))]
    pub async fn create(
        &self,
        user_id: i32,
        task_id: i32,
        draft: CommentDraft,
    ) -> Result<Comment, AppError> {
        self.task(task_id).await?;
        if let Some(answer_id) = draft.answer_id {
            self.comment_on(task_id, answer_id).await?;
        }
        Ok(self
            .store
            .insert_comment(NewComment {
                content: draft.content,
                task_id,
                user_id,
                answer_id: draft.answer_id,
                kind: draft.kind,
            })
            .await?)
    }

    #[instrument(skip(self, content))]
    pub async fn update(
        &self,
        user_id: i32,
        task_id: i32,
        comment_id: i32,
        content: String,
    ) -> Result<Comment, AppError> {
        self.authored(user_id, task_id, comment_id).await?;
        self.store
            .update_comment(comment_id, content)
            .await?
            .or_missing(Missing::Comment)
    }

    /// Deletes the comment and all replies beneath it.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i32, task_id: i32, comment_id: i32) -> Result<(), AppError> {
        self.authored(user_id, task_id, comment_id).await?;
        Ok(self.store.delete_comment(comment_id).await?)
    }
}
