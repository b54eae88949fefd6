use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{info, instrument};

use crate::db::models::{
    Board, BoardChanges, BoardMember, BoardUserRole, BoardWithMembers, NewBoard, Role, RoleName,
};
use crate::db::prelude::*;
use crate::error::{AppError, Missing};
use crate::services::OrMissing;
use crate::storage::{remove_urls, ObjectStore};

#[derive(Debug, Clone, Default)]
pub struct BoardEdit {
    pub name: Option<String>,
    pub added_users: Vec<i32>,
    pub removed_users: Vec<i32>,
}

pub struct BoardService {
    store: Arc<dyn Store>,
    objects: Arc<dyn ObjectStore>,
}

impl BoardService {
    pub fn new(store: Arc<dyn Store>, objects: Arc<dyn ObjectStore>) -> Self {
        BoardService { store, objects }
    }

    async fn role(&self, name: RoleName) -> Result<Role, AppError> {
        self.store.find_role(name).await?.or_missing(Missing::Role(name))
    }

    async fn with_members(&self, board: Board) -> Result<BoardWithMembers, AppError> {
        let members = self.store.board_members(board.id).await?;
        Ok(BoardWithMembers {
            id: board.id,
            name: board.name,
            members,
        })
    }

    pub async fn find(&self, board_id: i32) -> Result<Board, AppError> {
        self.store.find_board(board_id).await?.or_missing(Missing::Board)
    }

    /// Fails with PermissionDenied unless `user_id` is an Admin of the board.
    pub async fn require_admin(&self, board_id: i32, user_id: i32) -> Result<Board, AppError> {
        let board = self.find(board_id).await?;
        let admin = self.role(RoleName::Admin).await?;
        self.store
            .find_membership(board_id, user_id, admin.id)
            .await?
            .ok_or(AppError::PermissionDenied)?;
        Ok(board)
    }

    /// Fails with PermissionDenied unless `user_id` holds any role on the
    /// board.
    pub async fn require_member(&self, board_id: i32, user_id: i32) -> Result<Board, AppError> {
        let board = self.find(board_id).await?;
        let on_board = self
            .store
            .board_members(board_id)
            .await?
            .iter()
            .any(|member| member.id == user_id);
        if !on_board {
            return Err(AppError::PermissionDenied);
        }
        Ok(board)
    }

    pub async fn is_admin(&self, board_id: i32, user_id: i32) -> Result<bool, AppError> {
        let Some(admin) = self.store.find_role(RoleName::Admin).await? else {
            return Ok(false);
        };
        Ok(self
            .store
            .find_membership(board_id, user_id, admin.id)
            .await?
            .is_some())
    }

    pub async fn list_for(&self, user_id: i32) -> Result<Vec<BoardWithMembers>, AppError> {
        let boards = self.store.boards_for_user(user_id).await?;
        try_join_all(boards.into_iter().map(|board| self.with_members(board))).await
    }

    #[instrument(skip(self))]
    pub async fn create(&self, user_id: i32, name: String) -> Result<Board, AppError> {
        let board = self
            .store
            .create_board_with_admin(NewBoard { name }, user_id)
            .await?;
        info!(board_id = board.id, "board created");
        Ok(board)
    }

    #[instrument(skip(self, edit))]
    pub async fn update(
        &self,
        user_id: i32,
        board_id: i32,
        edit: BoardEdit,
    ) -> Result<BoardWithMembers, AppError> {
        self.require_admin(board_id, user_id).await?;

        let member_role_id = if edit.added_users.is_empty() && edit.removed_users.is_empty() {
            0
        } else {
            self.role(RoleName::Member).await?.id
        };
        for added in &edit.added_users {
            self.store.find_user(*added).await?.or_missing(Missing::User)?;
        }
        if !edit.added_users.is_empty() {
            // a Member row on the removed list no longer counts
            let members = self.store.board_members(board_id).await?;
            let staying = |member: &&BoardMember| {
                !(member.role == RoleName::Member.as_str()
                    && edit.removed_users.contains(&member.id))
            };
            if let Some(added) = edit
                .added_users
                .iter()
                .find(|added| members.iter().filter(staying).any(|member| member.id == **added))
            {
                return Err(AppError::validation(format!(
                    "user {added} is already a member of this board"
                )));
            }
        }

        let board = self
            .store
            .update_board(
                board_id,
                BoardChanges {
                    name: edit.name,
                    removed_users: edit.removed_users,
                    added_users: edit.added_users,
                    member_role_id,
                },
            )
            .await?;
        self.with_members(board).await
    }

    /// Removes the board and everything on it. Task photos leave object
    /// storage before the rows go.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: i32, board_id: i32) -> Result<(), AppError> {
        self.require_admin(board_id, user_id).await?;

        let photos: Vec<String> = self
            .store
            .tasks_for_board(board_id)
            .await?
            .into_iter()
            .flat_map(|task| task.photos)
            .collect();
        remove_urls(self.objects.as_ref(), &photos).await?;

        self.store.delete_board(board_id).await?;
        info!(board_id, removed_photos = photos.len(), "board deleted");
        Ok(())
    }

    pub async fn members(&self, board_id: i32) -> Result<Vec<BoardMember>, AppError> {
        self.find(board_id).await?;
        Ok(self.store.board_members(board_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn add_member(
        &self,
        user_id: i32,
        board_id: i32,
        member_id: i32,
    ) -> Result<BoardUserRole, AppError> {
        self.require_admin(board_id, user_id).await?;
        self.store.find_user(member_id).await?.or_missing(Missing::User)?;
        let member_role = self.role(RoleName::Member).await?;

        let already = self
            .store
            .board_members(board_id)
            .await?
            .iter()
            .any(|member| member.id == member_id);
        if already {
            return Err(AppError::validation(format!(
                "user {member_id} is already a member of this board"
            )));
        }

        Ok(self
            .store
            .add_membership(BoardUserRole {
                board_id,
                user_id: member_id,
                role_id: member_role.id,
            })
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        user_id: i32,
        board_id: i32,
        member_id: i32,
    ) -> Result<BoardUserRole, AppError> {
        self.require_admin(board_id, user_id).await?;
        let member_role = self.role(RoleName::Member).await?;
        self.store
            .remove_membership(board_id, member_id, member_role.id)
            .await?
            .or_missing(Missing::Membership)
    }
}
