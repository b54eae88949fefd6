//! Data access: the `Store` seam, its Postgres implementation and an
//! in-memory twin with the same transactional behavior.

pub mod connection;
pub mod memory;
pub mod models;
pub mod repos;
pub mod schema;

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::ordering::{ColumnChange, OrderingError};
use models::{
    Board, BoardChanges, BoardMember, BoardUserRole, Column, Comment, NewBoard, NewComment, NewStatus, NewTask, NewUser, Role, RoleName, Status, StatusChangeSet, Task,
    TaskChangeSet, User, UserChangeSet,
};

pub use memory::MemoryStore;
pub use repos::PgStore;

/// Every repository trait, for callers holding a `dyn Store`.
pub mod prelude {
    pub use super::{
        BoardRepo, ColumnRepo, CommentRepo, RoleRepo, StatusRepo, Store, TaskRepo, UserRepo,
    };
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("query failed: {0}")]
    Query(DieselError),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("{table} row {id} does not exist")]
    MissingRow { table: &'static str, id: i32 },
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    #[error("{0} role is not seeded")]
    MissingRole(RoleName),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(info.message().to_owned())
            }
            other => StoreError::Query(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserRepo {
    async fn find_user(&self, id: i32) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Users whose name or email contains `needle`, or everyone when absent.
    async fn search_users(&self, needle: Option<String>) -> StoreResult<Vec<User>>;
    async fn create_user(&self, new_user: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: i32, changes: UserChangeSet) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait RoleRepo {
    async fn find_role(&self, name: RoleName) -> StoreResult<Option<Role>>;
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;
    async fn insert_role(&self, name: RoleName) -> StoreResult<Role>;
}

#[async_trait]
pub trait StatusRepo {
    async fn find_status(&self, id: i32) -> StoreResult<Option<Status>>;
    async fn find_status_by_name(&self, name: &str) -> StoreResult<Option<Status>>;
    async fn list_statuses(&self) -> StoreResult<Vec<Status>>;
    async fn insert_status(&self, new_status: NewStatus) -> StoreResult<Status>;
    async fn update_status(&self, id: i32, changes: StatusChangeSet)
        -> StoreResult<Option<Status>>;
}

#[async_trait]
pub trait BoardRepo {
    async fn find_board(&self, id: i32) -> StoreResult<Option<Board>>;
    async fn boards_for_user(&self, user_id: i32) -> StoreResult<Vec<Board>>;
    async fn board_members(&self, board_id: i32) -> StoreResult<Vec<BoardMember>>;
    async fn find_membership(
        &self,
        board_id: i32,
        user_id: i32,
        role_id: i32,
    ) -> StoreResult<Option<BoardUserRole>>;
    /// Inserts the board and the creator's Admin membership atomically.
    async fn create_board_with_admin(&self, new_board: NewBoard, user_id: i32)
        -> StoreResult<Board>;
    async fn update_board(&self, board_id: i32, changes: BoardChanges) -> StoreResult<Board>;
    async fn add_membership(&self, membership: BoardUserRole) -> StoreResult<BoardUserRole>;
    async fn remove_membership(
        &self,
        board_id: i32,
        user_id: i32,
        role_id: i32,
    ) -> StoreResult<Option<BoardUserRole>>;
    /// Removes comments, tasks, columns, memberships and the board itself.
    async fn delete_board(&self, board_id: i32) -> StoreResult<()>;
}

#[async_trait]
pub trait ColumnRepo {
    async fn find_column(&self, id: i32) -> StoreResult<Option<Column>>;
    /// Columns of a board ordered by `column_number`.
    async fn list_columns(&self, board_id: i32) -> StoreResult<Vec<Column>>;
    /// Appends a column after the board's last one. Numbering and insert
    /// share one transaction.
    async fn append_column(&self, board_id: i32, name: String) -> StoreResult<Column>;
    /// Plans `change` against the board's current columns and applies every
    /// step, all in one transaction with the board's columns held locked.
    async fn change_columns(&self, board_id: i32, change: ColumnChange) -> StoreResult<()>;
}

#[async_trait]
pub trait TaskRepo {
    async fn find_task(&self, id: i32) -> StoreResult<Option<Task>>;
    async fn list_tasks(&self, column_id: i32) -> StoreResult<Vec<Task>>;
    async fn tasks_for_board(&self, board_id: i32) -> StoreResult<Vec<Task>>;
    async fn insert_task(&self, new_task: NewTask) -> StoreResult<Task>;
    async fn update_task(&self, id: i32, changes: TaskChangeSet) -> StoreResult<Option<Task>>;
    /// Deletes the task together with its comments.
    async fn delete_task(&self, id: i32) -> StoreResult<Option<Task>>;
}

#[async_trait]
pub trait CommentRepo {
    async fn find_comment(&self, id: i32) -> StoreResult<Option<Comment>>;
    async fn list_comments(&self, task_id: i32) -> StoreResult<Vec<Comment>>;
    async fn insert_comment(&self, new_comment: NewComment) -> StoreResult<Comment>;
    async fn update_comment(&self, id: i32, content: String) -> StoreResult<Option<Comment>>;
    /// Deletes the comment and every reply beneath it.
    async fn delete_comment(&self, id: i32) -> StoreResult<()>;
}

/// The full data-access handle handed to services.
pub trait Store:
    UserRepo + RoleRepo + StatusRepo + BoardRepo + ColumnRepo + TaskRepo + CommentRepo + Send + Sync
{
}

impl<T> Store for T where
    T: UserRepo
        + RoleRepo
        + StatusRepo
        + BoardRepo
        + ColumnRepo
        + TaskRepo
        + CommentRepo
        + Send
        + Sync
{
}
