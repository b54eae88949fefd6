//! In-memory `Store`.
//!
//! Tables live behind one mutex. Every mutation runs against a clone of the
//! tables which replaces the live copy only when the whole closure
//! succeeds, so multi-step writes are all-or-nothing exactly as they are in
//! Postgres. The unique keys of the SQL schema are enforced on every single
//! write.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::models::{
    Board, BoardChanges, BoardMember, BoardUserRole, Column, Comment, NewBoard, NewColumn,
    NewComment, NewStatus, NewTask, NewUser, Role, RoleName, Status, StatusChangeSet, Task,
    TaskChangeSet, User, UserChangeSet,
};
use super::{
    BoardRepo, ColumnRepo, CommentRepo, RoleRepo, StatusRepo, StoreError, StoreResult, TaskRepo,
    UserRepo,
};
use crate::ordering::{self, ColumnChange, ColumnPlan, ColumnStep};

#[derive(Debug, Clone, Default)]
struct Sequences {
    users: i32,
    roles: i32,
    statuses: i32,
    boards: i32,
    columns: i32,
    tasks: i32,
    comments: i32,
}

fn next(sequence: &mut i32) -> i32 {
    *sequence += 1;
    *sequence
}

#[derive(Debug, Clone, Default)]
struct Tables {
    sequences: Sequences,
    users: BTreeMap<i32, User>,
    roles: BTreeMap<i32, Role>,
    statuses: BTreeMap<i32, Status>,
    boards: BTreeMap<i32, Board>,
    memberships: Vec<BoardUserRole>,
    columns: BTreeMap<i32, Column>,
    tasks: BTreeMap<i32, Task>,
    comments: BTreeMap<i32, Comment>,
}

impl Tables {
    fn role_by_name(&self, name: RoleName) -> Option<&Role> {
        self.roles.values().find(|role| role.name == name.as_str())
    }

    fn insert_membership(&mut self, membership: BoardUserRole) -> StoreResult<()> {
        if self.memberships.contains(&membership) {
            return Err(StoreError::Conflict(format!(
                "membership ({}, {}, {}) already exists",
                membership.board_id, membership.user_id, membership.role_id
            )));
        }
        self.memberships.push(membership);
        Ok(())
    }

    fn renumber_column(&mut self, board_id: i32, column_id: i32, number: i32) -> StoreResult<()> {
        let taken = self.columns.values().any(|column| {
            column.board_id == board_id && column.column_number == number && column.id != column_id
        });
        if taken {
            return Err(StoreError::Conflict(format!(
                "column_number {number} already used on board {board_id}"
            )));
        }
        let column = self
            .columns
            .get_mut(&column_id)
            .filter(|column| column.board_id == board_id)
            .ok_or(StoreError::MissingRow { table: "columns", id: column_id })?;
        column.column_number = number;
        Ok(())
    }

    fn remove_task(&mut self, task_id: i32) -> Option<Task> {
        self.comments.retain(|_, comment| comment.task_id != task_id);
        self.tasks.remove(&task_id)
    }

    fn remove_column(&mut self, column_id: i32) -> Option<Column> {
        let task_ids: Vec<i32> = self
            .tasks
            .values()
            .filter(|task| task.column_id == column_id)
            .map(|task| task.id)
            .collect();
        for task_id in task_ids {
            self.remove_task(task_id);
        }
        self.columns.remove(&column_id)
    }

    fn board_columns(&self, board_id: i32) -> StoreResult<Vec<Column>> {
        if !self.boards.contains_key(&board_id) {
            return Err(StoreError::MissingRow { table: "boards", id: board_id });
        }
        let mut columns: Vec<Column> = self
            .columns
            .values()
            .filter(|column| column.board_id == board_id)
            .cloned()
            .collect();
        columns.sort_by_key(|column| column.column_number);
        Ok(columns)
    }

    fn insert_column(&mut self, new_column: NewColumn) -> StoreResult<Column> {
        if !self.boards.contains_key(&new_column.board_id) {
            return Err(StoreError::MissingRow { table: "boards", id: new_column.board_id });
        }
        let taken = self.columns.values().any(|column| {
            column.board_id == new_column.board_id
                && column.column_number == new_column.column_number
        });
        if taken {
            return Err(StoreError::Conflict(format!(
                "column_number {} already used on board {}",
                new_column.column_number, new_column.board_id
            )));
        }
        let column = Column {
            id: next(&mut self.sequences.columns),
            name: new_column.name,
            column_number: new_column.column_number,
            board_id: new_column.board_id,
        };
        self.columns.insert(column.id, column.clone());
        Ok(column)
    }

    fn apply_plan(&mut self, plan: ColumnPlan) -> StoreResult<()> {
        for step in plan.steps {
            match step {
                ColumnStep::Rename { column_id, name } => {
                    let column = self
                        .columns
                        .get_mut(&column_id)
                        .filter(|column| column.board_id == plan.board_id)
                        .ok_or(StoreError::MissingRow { table: "columns", id: column_id })?;
                    column.name = name;
                }
                ColumnStep::Renumber { column_id, number } => {
                    self.renumber_column(plan.board_id, column_id, number)?;
                }
                ColumnStep::Remove { column_id } => {
                    let belongs = self
                        .columns
                        .get(&column_id)
                        .is_some_and(|column| column.board_id == plan.board_id);
                    if !belongs {
                        return Err(StoreError::MissingRow { table: "columns", id: column_id });
                    }
                    self.remove_column(column_id);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T> {
        let tables = self.lock()?;
        Ok(f(&tables))
    }

    fn transaction<T>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let mut tables = self.lock()?;
        let mut draft = tables.clone();
        let out = f(&mut draft)?;
        *tables = draft;
        Ok(out)
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user(&self, id: i32) -> StoreResult<Option<User>> {
        self.read(|t| t.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.read(|t| t.users.values().find(|user| user.email == email).cloned())
    }

    async fn search_users(&self, needle: Option<String>) -> StoreResult<Vec<User>> {
        let needle = needle.map(|needle| needle.to_lowercase());
        self.read(|t| {
            t.users
                .values()
                .filter(|user| match &needle {
                    Some(needle) => {
                        user.name.to_lowercase().contains(needle)
                            || user.email.to_lowercase().contains(needle)
                    }
                    None => true,
                })
                .cloned()
                .collect()
        })
    }

    async fn create_user(&self, new_user: NewUser) -> StoreResult<User> {
        self.transaction(|t| {
            if t.users.values().any(|user| user.email == new_user.email) {
                return Err(StoreError::Conflict(format!(
                    "email {} already exists",
                    new_user.email
                )));
            }
            let user = User {
                id: next(&mut t.sequences.users),
                email: new_user.email,
                password: new_user.password,
                name: new_user.name,
                photo: new_user.photo,
                timestamps: new_user.timestamps,
            };
            t.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    async fn update_user(&self, id: i32, changes: UserChangeSet) -> StoreResult<Option<User>> {
        self.transaction(|t| {
            if let Some(email) = &changes.email {
                if t.users.values().any(|user| &user.email == email && user.id != id) {
                    return Err(StoreError::Conflict(format!("email {email} already exists")));
                }
            }
            let Some(user) = t.users.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(email) = changes.email {
                user.email = email;
            }
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(photo) = changes.photo {
                user.photo = Some(photo);
            }
            Ok(Some(user.clone()))
        })
    }
}

#[async_trait]
impl RoleRepo for MemoryStore {
    async fn find_role(&self, name: RoleName) -> StoreResult<Option<Role>> {
        self.read(|t| t.role_by_name(name).cloned())
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.read(|t| t.roles.values().cloned().collect())
    }

    async fn insert_role(&self, name: RoleName) -> StoreResult<Role> {
        self.transaction(|t| {
            if t.role_by_name(name).is_some() {
                return Err(StoreError::Conflict(format!("role {name} already exists")));
            }
            let role = Role {
                id: next(&mut t.sequences.roles),
                name: name.as_str().to_owned(),
            };
            t.roles.insert(role.id, role.clone());
            Ok(role)
        })
    }
}

#[async_trait]
impl StatusRepo for MemoryStore {
    async fn find_status(&self, id: i32) -> StoreResult<Option<Status>> {
        self.read(|t| t.statuses.get(&id).cloned())
    }

    async fn find_status_by_name(&self, name: &str) -> StoreResult<Option<Status>> {
        self.read(|t| t.statuses.values().find(|status| status.name == name).cloned())
    }

    async fn list_statuses(&self) -> StoreResult<Vec<Status>> {
        self.read(|t| t.statuses.values().cloned().collect())
    }

    async fn insert_status(&self, new_status: NewStatus) -> StoreResult<Status> {
        self.transaction(|t| {
            let status = Status {
                id: next(&mut t.sequences.statuses),
                name: new_status.name,
                color_code: new_status.color_code,
            };
            t.statuses.insert(status.id, status.clone());
            Ok(status)
        })
    }

    async fn update_status(
        &self,
        id: i32,
        changes: StatusChangeSet,
    ) -> StoreResult<Option<Status>> {
        self.transaction(|t| {
            let Some(status) = t.statuses.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = changes.name {
                status.name = name;
            }
            if let Some(color_code) = changes.color_code {
                status.color_code = color_code;
            }
            Ok(Some(status.clone()))
        })
    }
}

#[async_trait]
impl BoardRepo for MemoryStore {
    async fn find_board(&self, id: i32) -> StoreResult<Option<Board>> {
        self.read(|t| t.boards.get(&id).cloned())
    }

    async fn boards_for_user(&self, user_id: i32) -> StoreResult<Vec<Board>> {
        self.read(|t| {
            t.boards
                .values()
                .filter(|board| {
                    t.memberships
                        .iter()
                        .any(|m| m.board_id == board.id && m.user_id == user_id)
                })
                .cloned()
                .collect()
        })
    }

    async fn board_members(&self, board_id: i32) -> StoreResult<Vec<BoardMember>> {
        self.read(|t| {
            let mut members: Vec<BoardMember> = t
                .memberships
                .iter()
                .filter(|m| m.board_id == board_id)
                .filter_map(|m| {
                    let user = t.users.get(&m.user_id)?;
                    let role = t.roles.get(&m.role_id)?;
                    Some(BoardMember {
                        id: user.id,
                        email: user.email.clone(),
                        name: user.name.clone(),
                        photo: user.photo.clone(),
                        role: role.name.clone(),
                    })
                })
                .collect();
            members.sort_by_key(|member| member.id);
            members
        })
    }

    async fn find_membership(
        &self,
        board_id: i32,
        user_id: i32,
        role_id: i32,
    ) -> StoreResult<Option<BoardUserRole>> {
        let wanted = BoardUserRole { board_id, user_id, role_id };
        self.read(|t| t.memberships.iter().find(|m| **m == wanted).copied())
    }

    async fn create_board_with_admin(
        &self,
        new_board: NewBoard,
        user_id: i32,
    ) -> StoreResult<Board> {
        self.transaction(|t| {
            let board = Board {
                id: next(&mut t.sequences.boards),
                name: new_board.name,
            };
            t.boards.insert(board.id, board.clone());

            let admin = t
                .role_by_name(RoleName::Admin)
                .ok_or(StoreError::MissingRole(RoleName::Admin))?
                .id;
            if !t.users.contains_key(&user_id) {
                return Err(StoreError::MissingRow { table: "users", id: user_id });
            }
            t.insert_membership(BoardUserRole {
                board_id: board.id,
                user_id,
                role_id: admin,
            })?;
            Ok(board)
        })
    }

    async fn update_board(&self, board_id: i32, changes: BoardChanges) -> StoreResult<Board> {
        self.transaction(|t| {
            if !t.boards.contains_key(&board_id) {
                return Err(StoreError::MissingRow { table: "boards", id: board_id });
            }
            t.memberships.retain(|m| {
                !(m.board_id == board_id
                    && m.role_id == changes.member_role_id
                    && changes.removed_users.contains(&m.user_id))
            });
            for user_id in &changes.added_users {
                if !t.users.contains_key(user_id) {
                    return Err(StoreError::MissingRow { table: "users", id: *user_id });
                }
                let on_board = t
                    .memberships
                    .iter()
                    .any(|m| m.board_id == board_id && m.user_id == *user_id);
                if !on_board {
                    t.memberships.push(BoardUserRole {
                        board_id,
                        user_id: *user_id,
                        role_id: changes.member_role_id,
                    });
                }
            }
            let board = t
                .boards
                .get_mut(&board_id)
                .ok_or(StoreError::MissingRow { table: "boards", id: board_id })?;
            if let Some(name) = changes.name {
                board.name = name;
            }
            Ok(board.clone())
        })
    }

    async fn add_membership(&self, membership: BoardUserRole) -> StoreResult<BoardUserRole> {
        self.transaction(|t| {
            t.insert_membership(membership)?;
            Ok(membership)
        })
    }

    async fn remove_membership(
        &self,
        board_id: i32,
        user_id: i32,
        role_id: i32,
    ) -> StoreResult<Option<BoardUserRole>> {
        let wanted = BoardUserRole { board_id, user_id, role_id };
        self.transaction(|t| {
            let before = t.memberships.len();
            t.memberships.retain(|m| *m != wanted);
            Ok((t.memberships.len() != before).then_some(wanted))
        })
    }

    async fn delete_board(&self, board_id: i32) -> StoreResult<()> {
        self.transaction(|t| {
            let column_ids: Vec<i32> = t
                .columns
                .values()
                .filter(|column| column.board_id == board_id)
                .map(|column| column.id)
                .collect();
            for column_id in column_ids {
                t.remove_column(column_id);
            }
            t.memberships.retain(|m| m.board_id != board_id);
            t.boards
                .remove(&board_id)
                .map(|_| ())
                .ok_or(StoreError::MissingRow { table: "boards", id: board_id })
        })
    }
}

#[async_trait]
impl ColumnRepo for MemoryStore {
    async fn find_column(&self, id: i32) -> StoreResult<Option<Column>> {
        self.read(|t| t.columns.get(&id).cloned())
    }

    async fn list_columns(&self, board_id: i32) -> StoreResult<Vec<Column>> {
        self.read(|t| {
            let mut columns: Vec<Column> = t
                .columns
                .values()
                .filter(|column| column.board_id == board_id)
                .cloned()
                .collect();
            columns.sort_by_key(|column| column.column_number);
            columns
        })
    }

    async fn append_column(&self, board_id: i32, name: String) -> StoreResult<Column> {
        self.transaction(|t| {
            let column_number = ordering::next_number(&t.board_columns(board_id)?);
            t.insert_column(NewColumn { name, column_number, board_id })
        })
    }

    async fn change_columns(&self, board_id: i32, change: ColumnChange) -> StoreResult<()> {
        self.transaction(|t| {
            let plan = change.plan(board_id, &t.board_columns(board_id)?)?;
            t.apply_plan(plan)
        })
    }
}

#[async_trait]
impl TaskRepo for MemoryStore {
    async fn find_task(&self, id: i32) -> StoreResult<Option<Task>> {
        self.read(|t| t.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, column_id: i32) -> StoreResult<Vec<Task>> {
        self.read(|t| {
            t.tasks
                .values()
                .filter(|task| task.column_id == column_id)
                .cloned()
                .collect()
        })
    }

    async fn tasks_for_board(&self, board_id: i32) -> StoreResult<Vec<Task>> {
        self.read(|t| {
            t.tasks
                .values()
                .filter(|task| {
                    t.columns
                        .get(&task.column_id)
                        .is_some_and(|column| column.board_id == board_id)
                })
                .cloned()
                .collect()
        })
    }

    async fn insert_task(&self, new_task: NewTask) -> StoreResult<Task> {
        self.transaction(|t| {
            if !t.columns.contains_key(&new_task.column_id) {
                return Err(StoreError::MissingRow { table: "columns", id: new_task.column_id });
            }
            if !t.statuses.contains_key(&new_task.status_id) {
                return Err(StoreError::MissingRow { table: "statuses", id: new_task.status_id });
            }
            let task = Task {
                id: next(&mut t.sequences.tasks),
                name: new_task.name,
                description: new_task.description,
                deadline: new_task.deadline,
                owner_id: new_task.owner_id,
                column_id: new_task.column_id,
                status_id: new_task.status_id,
                recepient_id: new_task.recepient_id,
                photos: new_task.photos,
                timestamps: new_task.timestamps,
            };
            t.tasks.insert(task.id, task.clone());
            Ok(task)
        })
    }

    async fn update_task(&self, id: i32, changes: TaskChangeSet) -> StoreResult<Option<Task>> {
        self.transaction(|t| {
            if let Some(column_id) = changes.column_id {
                if !t.columns.contains_key(&column_id) {
                    return Err(StoreError::MissingRow { table: "columns", id: column_id });
                }
            }
            if let Some(status_id) = changes.status_id {
                if !t.statuses.contains_key(&status_id) {
                    return Err(StoreError::MissingRow { table: "statuses", id: status_id });
                }
            }
            let Some(task) = t.tasks.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = changes.name {
                task.name = name;
            }
            if let Some(description) = changes.description {
                task.description = Some(description);
            }
            if let Some(deadline) = changes.deadline {
                task.deadline = deadline;
            }
            if let Some(column_id) = changes.column_id {
                task.column_id = column_id;
            }
            if let Some(status_id) = changes.status_id {
                task.status_id = status_id;
            }
            if let Some(recepient_id) = changes.recepient_id {
                task.recepient_id = Some(recepient_id);
            }
            if let Some(photos) = changes.photos {
                task.photos = photos;
            }
            Ok(Some(task.clone()))
        })
    }

    async fn delete_task(&self, id: i32) -> StoreResult<Option<Task>> {
        self.transaction(|t| Ok(t.remove_task(id)))
    }
}

#[async_trait]
impl CommentRepo for MemoryStore {
    async fn find_comment(&self, id: i32) -> StoreResult<Option<Comment>> {
        self.read(|t| t.comments.get(&id).cloned())
    }

    async fn list_comments(&self, task_id: i32) -> StoreResult<Vec<Comment>> {
        self.read(|t| {
            t.comments
                .values()
                .filter(|comment| comment.task_id == task_id)
                .cloned()
                .collect()
        })
    }

    async fn insert_comment(&self, new_comment: NewComment) -> StoreResult<Comment> {
        self.transaction(|t| {
            if !t.tasks.contains_key(&new_comment.task_id) {
                return Err(StoreError::MissingRow { table: "tasks", id: new_comment.task_id });
            }
            if let Some(answer_id) = new_comment.answer_id {
                if !t.comments.contains_key(&answer_id) {
                    return Err(StoreError::MissingRow { table: "comments", id: answer_id });
                }
            }
            let comment = Comment {
                id: next(&mut t.sequences.comments),
                content: new_comment.content,
                task_id: new_comment.task_id,
                user_id: new_comment.user_id,
                answer_id: new_comment.answer_id,
                kind: new_comment.kind,
            };
            t.comments.insert(comment.id, comment.clone());
            Ok(comment)
        })
    }

    async fn update_comment(&self, id: i32, content: String) -> StoreResult<Option<Comment>> {
        self.transaction(|t| {
            let Some(comment) = t.comments.get_mut(&id) else {
                return Ok(None);
            };
            comment.content = content;
            Ok(Some(comment.clone()))
        })
    }

    async fn delete_comment(&self, id: i32) -> StoreResult<()> {
        self.transaction(|t| {
            let mut doomed = vec![id];
            let mut cursor = 0;
            while cursor < doomed.len() {
                let parent = doomed[cursor];
                doomed.extend(
                    t.comments
                        .values()
                        .filter(|comment| comment.answer_id == Some(parent))
                        .map(|comment| comment.id),
                );
                cursor += 1;
            }
            for comment_id in doomed {
                t.comments.remove(&comment_id);
            }
            Ok(())
        })
    }
}
