use std::sync::Arc;

use tracing::{info, instrument};

use crate::db::models::Column;
use crate::db::prelude::*;
use crate::error::{AppError, Missing};
use crate::ordering::ColumnChange;
use crate::services::{boards::BoardService, OrMissing};
use crate::storage::{remove_urls, ObjectStore};

#[derive(Debug, Clone, Default)]
pub struct ColumnEdit {
    pub name: Option<String>,
    pub column_number: Option<i32>,
}

pub struct ColumnService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl ColumnService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        ColumnService { store, objects }
    }

    fn boards(&self) -> BoardService {
        BoardService::new(self.store.clone(), self.objects.clone())
    }

    async fn board_columns(&self, board_id: i32) -> Result<Vec<Column>, AppError> {
        self.store.find_board(board_id).await?.or_missing(Missing::Board)?;
        Ok(self.store.list_columns(board_id).await?)
    }

    pub async fn list(&self, board_id: i32) -> Result<Vec<Column>, AppError> {
        self.board_columns(board_id).await
    }

    /// A column by id, optionally required to sit on `board_id`.
    pub async fn get(&self, board_id: Option<i32>, column_id: i32) -> Result<Column, AppError> {
        let column = self
            .store
            .find_column(column_id)
            .await?
            .or_missing(Missing::Column)?;
        match board_id {
            Some(board_id) if column.board_id != board_id => {
                self.store.find_board(board_id).await?.or_missing(Missing::Board)?;
                Err(AppError::NotFound(Missing::Column))
            }
            _ => Ok(column),
        }
    }

    /// Appends a column after the board's last one. Board members only.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        user_id: i32,
        board_id: i32,
        name: String,
    ) -> Result<Column, AppError> {
        self.boards().require_member(board_id, user_id).await?;
        let column = self.store.append_column(board_id, name).await?;
        info!(column_id = column.id, column_number = column.column_number, "column created");
        Ok(column)
    }

    /// Renames and/or moves a column. Moving onto an occupied number swaps
    /// the two columns in one transaction. Board members only.
    #[instrument(skip(self, edit))]
    pub async fn update(
        &self,
        user_id: i32,
        board_id: Option<i32>,
        column_id: i32,
        edit: ColumnEdit,
    ) -> Result<Column, AppError> {
        let column = self.get(board_id, column_id).await?;
        self.boards().require_member(column.board_id, user_id).await?;
        if edit.name.is_some() || edit.column_number.is_some() {
            let change = ColumnChange::Move {
                column_id,
                name: edit.name,
                number: edit.column_number,
            };
            self.store.change_columns(column.board_id, change).await?;
        }
        self.get(None, column_id).await
    }

    /// Deletes a column with its tasks and closes the numbering gap. Board
    /// admins only.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        user_id: i32,
        board_id: Option<i32>,
        column_id: i32,
    ) -> Result<(), AppError> {
        let column = self.get(board_id, column_id).await?;
        self.boards().require_admin(column.board_id, user_id).await?;

        let photos: Vec<String> = self
            .store
            .list_tasks(column_id)
            .await?
            .into_iter()
            .flat_map(|task| task.photos)
            .collect();
        remove_urls(self.objects.as_ref(), &photos).await?;

        self.store
            .change_columns(column.board_id, ColumnChange::Delete { column_id })
            .await?;
        info!(column_id, board_id = column.board_id, "column deleted");
        Ok(())
    }
}
