use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::{board_user_roles, boards, columns, comments, roles, statuses, tasks, users};

/// Name of the status every task falls back to.
pub const NOT_STATUS: &str = "NotStatus";

/// Status id used when even the `NotStatus` lookup fails.
pub const FALLBACK_STATUS_ID: i32 = 1;

/// Seeded statuses and their colors, in insertion order.
pub const DEFAULT_STATUSES: [(&str, &str); 6] = [
    (NOT_STATUS, "6C757D"),
    ("TODO", "FFA500"),
    ("InProgress", "007BFF"),
    ("Review", "FFC107"),
    ("Done", "28A745"),
    ("Blocked", "DC3545"),
];

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub photo: Option<String>,
    pub timestamps: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub photo: Option<String>,
    pub timestamps: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeSet {
    pub email: Option<String>,
    pub name: Option<String>,
    pub photo: Option<String>,
}

impl UserChangeSet {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.name.is_none() && self.photo.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleName {
    Admin,
    Member,
}

impl RoleName {
    pub const ALL: [RoleName; 2] = [RoleName::Admin, RoleName::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "Admin",
            RoleName::Member => "Member",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Role {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = roles)]
pub struct NewRole {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Status {
    pub id: i32,
    pub name: String,
    pub color_code: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = statuses)]
pub struct NewStatus {
    pub name: String,
    pub color_code: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = statuses)]
pub struct StatusChangeSet {
    pub name: Option<String>,
    pub color_code: Option<String>,
}

impl StatusChangeSet {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color_code.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Board {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = boards)]
pub struct NewBoard {
    pub name: String,
}

/// Everything a board update may touch, applied in one transaction.
/// Additions and removals both concern the Member role.
#[derive(Debug, Clone, Default)]
pub struct BoardChanges {
    pub name: Option<String>,
    pub removed_users: Vec<i32>,
    pub added_users: Vec<i32>,
    pub member_role_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize)]
#[diesel(table_name = board_user_roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct BoardUserRole {
    pub board_id: i32,
    pub user_id: i32,
    pub role_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardMember {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub photo: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardWithMembers {
    pub id: i32,
    pub name: String,
    pub members: Vec<BoardMember>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Column {
    pub id: i32,
    pub name: String,
    pub column_number: i32,
    pub board_id: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = columns)]
pub struct NewColumn {
    pub name: String,
    pub column_number: i32,
    pub board_id: i32,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Task {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub owner_id: i32,
    pub column_id: i32,
    #[serde(rename = "statusId")]
    pub status_id: i32,
    pub recepient_id: Option<i32>,
    pub photos: Vec<String>,
    pub timestamps: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub owner_id: i32,
    pub column_id: i32,
    pub status_id: i32,
    pub recepient_id: Option<i32>,
    pub photos: Vec<String>,
    pub timestamps: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeSet {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub column_id: Option<i32>,
    pub status_id: Option<i32>,
    pub recepient_id: Option<i32>,
    pub photos: Option<Vec<String>>,
}

impl TaskChangeSet {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.column_id.is_none()
            && self.status_id.is_none()
            && self.recepient_id.is_none()
            && self.photos.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub content: String,
    pub task_id: i32,
    pub user_id: i32,
    pub answer_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<bool>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub content: String,
    pub task_id: i32,
    pub user_id: i32,
    pub answer_id: Option<i32>,
    pub kind: Option<bool>,
}
