//! Request bodies and their field rules.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::controllers::extract::{FormFields, FromForm};
use crate::services::{
    auth::SignUp, boards::BoardEdit, columns::ColumnEdit, comments::CommentDraft,
    tasks::{TaskDraft, TaskEdit},
    users::ProfileEdit,
};
use crate::storage::UploadedFile;
use crate::validation::{Validate, Violations, MAX_NAME_LEN};

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl Validate for SignInRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.email("email", &self.email);
        violations.required_text("password", &self.password, None);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for SignUpRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.email("email", &self.email);
        violations.required_text("email", &self.email, Some(MAX_NAME_LEN));
        violations.required_text("password", &self.password, None);
        violations.required_text("name", &self.name, Some(MAX_NAME_LEN));
    }
}

impl From<SignUpRequest> for SignUp {
    fn from(request: SignUpRequest) -> Self {
        SignUp {
            email: request.email,
            password: request.password,
            name: request.name,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Validate for ProfileRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.optional_text("name", self.name.as_deref(), Some(MAX_NAME_LEN));
        if let Some(email) = &self.email {
            violations.email("email", email);
        }
    }
}

impl FromForm for ProfileRequest {
    fn from_form(form: &FormFields, _: &mut Violations) -> Self {
        ProfileRequest {
            name: form.text("name"),
            email: form.text("email"),
        }
    }
}

impl ProfileRequest {
    pub fn into_edit(self, files: Vec<UploadedFile>) -> ProfileEdit {
        ProfileEdit {
            name: self.name,
            email: self.email,
            photo: files.into_iter().next(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoardRequest {
    pub name: String,
}

impl Validate for CreateBoardRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.required_text("name", &self.name, Some(MAX_NAME_LEN));
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub added_user_list: Vec<i32>,
    #[serde(default)]
    pub deleted_users_list: Vec<i32>,
}

impl Validate for UpdateBoardRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.optional_text("name", self.name.as_deref(), Some(MAX_NAME_LEN));
    }
}

impl From<UpdateBoardRequest> for BoardEdit {
    fn from(request: UpdateBoardRequest) -> Self {
        BoardEdit {
            name: request.name,
            added_users: request.added_user_list,
            removed_users: request.deleted_users_list,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: i32,
}

impl Validate for AddMemberRequest {
    fn validate(&self, _: &mut Violations) {}
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateColumnRequest {
    pub name: String,
}

impl Validate for CreateColumnRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.required_text("name", &self.name, Some(MAX_NAME_LEN));
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumnRequest {
    pub name: Option<String>,
    pub column_number: Option<i32>,
}

impl Validate for UpdateColumnRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.optional_text("name", self.name.as_deref(), Some(MAX_NAME_LEN));
        if let Some(number) = self.column_number {
            violations.non_negative("columnNumber", number.into());
        }
    }
}

impl From<UpdateColumnRequest> for ColumnEdit {
    fn from(request: UpdateColumnRequest) -> Self {
        ColumnEdit {
            name: request.name,
            column_number: request.column_number,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status_id: Option<i32>,
    pub recepient_id: Option<i32>,
}

impl Validate for CreateTaskRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.required_text("name", &self.name, Some(MAX_NAME_LEN));
        violations.optional_text("description", self.description.as_deref(), None);
        if let Some(deadline) = &self.deadline {
            violations.not_in_past("deadline", deadline);
        }
    }
}

impl FromForm for CreateTaskRequest {
    fn from_form(form: &FormFields, violations: &mut Violations) -> Self {
        CreateTaskRequest {
            name: form.text("name").unwrap_or_default(),
            description: form.text("description"),
            deadline: form.date("deadline", violations),
            status_id: form.int("statusId", violations),
            recepient_id: form.int("recepientId", violations),
        }
    }
}

impl CreateTaskRequest {
    pub fn into_draft(self, files: Vec<UploadedFile>) -> TaskDraft {
        TaskDraft {
            name: self.name,
            description: self.description,
            deadline: self.deadline,
            status_id: self.status_id,
            recepient_id: self.recepient_id,
            files,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status_id: Option<i32>,
    pub recepient_id: Option<i32>,
    pub column_id: Option<i32>,
    #[serde(default)]
    pub deleted_images_id: Vec<i64>,
}

impl Validate for UpdateTaskRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.optional_text("name", self.name.as_deref(), Some(MAX_NAME_LEN));
        violations.optional_text("description", self.description.as_deref(), None);
        if let Some(deadline) = &self.deadline {
            violations.not_in_past("deadline", deadline);
        }
    }
}

impl FromForm for UpdateTaskRequest {
    fn from_form(form: &FormFields, violations: &mut Violations) -> Self {
        UpdateTaskRequest {
            name: form.text("name"),
            description: form.text("description"),
            deadline: form.date("deadline", violations),
            status_id: form.int("statusId", violations),
            recepient_id: form.int("recepientId", violations),
            column_id: form.int("columnId", violations),
            deleted_images_id: form.ints("deletedImagesId", violations),
        }
    }
}

impl UpdateTaskRequest {
    pub fn into_edit(self, files: Vec<UploadedFile>) -> TaskEdit {
        TaskEdit {
            name: self.name,
            description: self.description,
            deadline: self.deadline,
            status_id: self.status_id,
            recepient_id: self.recepient_id,
            column_id: self.column_id,
            deleted_images: self.deleted_images_id,
            files,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub answer_id: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<bool>,
}

impl Validate for CreateCommentRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.required_text("content", &self.content, None);
        if self.answer_id.is_some() != self.kind.is_some() {
            violations.push("Both answerId and type are required when one is provided");
        }
    }
}

impl From<CreateCommentRequest> for CommentDraft {
    fn from(request: CreateCommentRequest) -> Self {
        CommentDraft {
            content: request.content,
            answer_id: request.answer_id,
            kind: request.kind,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

impl Validate for UpdateCommentRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.required_text("content", &self.content, None);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub name: Option<String>,
    pub color_code: Option<String>,
}

impl Validate for UpdateStatusRequest {
    fn validate(&self, violations: &mut Violations) {
        violations.optional_text("name", self.name.as_deref(), Some(MAX_NAME_LEN));
        if let Some(color_code) = &self.color_code {
            violations.color_code("colorCode", color_code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_reply_needs_both_fields() {
        let request: CreateCommentRequest =
            serde_json::from_str(r#"{"content":"hi","answerId":1}"#).unwrap();
        let mut violations = Violations::default();
        request.validate(&mut violations);
        assert_eq!(
            violations.messages(),
            &["Both answerId and type are required when one is provided".to_string()]
        );

        let request: CreateCommentRequest =
            serde_json::from_str(r#"{"content":"hi","answerId":1,"type":true}"#).unwrap();
        assert!(request.check().is_ok());
    }

    #[test]
    fn task_form_collects_every_problem() {
        let mut form = FormFields::default();
        form.push_text("name", "");
        form.push_text("statusId", "x");
        form.push_text("deadline", "2001-01-01T00:00:00Z");
        let mut violations = Violations::default();
        let request = CreateTaskRequest::from_form(&form, &mut violations);
        request.validate(&mut violations);

        let messages = violations.messages();
        assert!(messages.contains(&"statusId must be an integer number".to_string()));
        assert!(messages.contains(&"name should not be empty".to_string()));
        assert!(messages.iter().any(|m| m.starts_with("deadline ")));
    }

    #[test]
    fn board_update_lists_default_to_empty() {
        let request: UpdateBoardRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        let edit = BoardEdit::from(request);
        assert!(edit.added_users.is_empty());
        assert!(edit.removed_users.is_empty());
    }

    #[test]
    fn negative_column_number_is_rejected() {
        let request = UpdateColumnRequest {
            name: None,
            column_number: Some(-2),
        };
        assert!(request.check().is_err());
    }
}
