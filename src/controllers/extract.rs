//! Request extractors: the signed-in user, validated JSON bodies and
//! bodies that may arrive as multipart forms carrying files.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE},
        request::Parts,
        HeaderMap,
    },
    Json,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::auth::SESSION_COOKIE;
use crate::db::models::User;
use crate::error::AppError;
use crate::state::AppState;
use crate::storage::UploadedFile;
use crate::validation::{Validate, Violations};

/// Session token from the `jwt` cookie, or from a bearer header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_owned())
        });
    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(|token| token.trim().to_owned())
    })
}

/// The user behind the request's session. Rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = state.auth().authenticate(&token).await?;
        Ok(CurrentUser(user))
    }
}

/// A JSON body that passed its field rules.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

async fn json_body<T, S>(req: Request, state: &S) -> Result<T, AppError>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    let Json(body) = Json::<T>::from_request(req, state)
        .await
        .map_err(|rejection| AppError::validation(rejection.body_text()))?;
    Ok(body)
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body: T = json_body(req, state).await?;
        body.check()?;
        Ok(ValidJson(body))
    }
}

/// Text parts and file parts of a multipart form.
#[derive(Debug, Default)]
pub struct FormFields {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FormFields {
    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    // `ids` and `ids[]` name the same field
    fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().filter_map(move |(key, value)| {
            let key = key.strip_suffix("[]").unwrap_or(key.as_str());
            (key == name).then_some(value.as_str())
        })
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.values(name).next().map(str::to_owned)
    }

    pub fn int(&self, name: &str, violations: &mut Violations) -> Option<i32> {
        let raw = self.values(name).next()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                violations.push(format!("{name} must be an integer number"));
                None
            }
        }
    }

    /// Integers sent as repeated fields, a JSON array or a comma list.
    pub fn ints(&self, name: &str, violations: &mut Violations) -> Vec<i64> {
        let mut out = Vec::new();
        for raw in self.values(name) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if let Ok(list) = serde_json::from_str::<Vec<i64>>(raw) {
                out.extend(list);
                continue;
            }
            for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
                match item.parse() {
                    Ok(value) => out.push(value),
                    Err(_) => violations
                        .push(format!("each value in {name} must be an integer number")),
                }
            }
        }
        out
    }

    pub fn boolean(&self, name: &str, violations: &mut Violations) -> Option<bool> {
        match self.values(name).next()?.trim() {
            "" => None,
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => {
                violations.push(format!("{name} must be a boolean value"));
                None
            }
        }
    }

    pub fn date(&self, name: &str, violations: &mut Violations) -> Option<DateTime<Utc>> {
        let raw = self.values(name).next()?.trim();
        if raw.is_empty() {
            return None;
        }
        match DateTime::parse_from_rfc3339(raw) {
            Ok(date) => Some(date.with_timezone(&Utc)),
            Err(_) => {
                violations.push(format!("{name} must be a valid ISO 8601 date string"));
                None
            }
        }
    }
}

/// Bodies that can be read from multipart text fields.
pub trait FromForm: Sized {
    fn from_form(form: &FormFields, violations: &mut Violations) -> Self;
}

/// A validated body plus any uploaded files. Accepts `multipart/form-data`
/// or JSON; a JSON body never carries files.
#[derive(Debug)]
pub struct WithFiles<T> {
    pub body: T,
    pub files: Vec<UploadedFile>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormFields, AppError> {
    let mut form = FormFields::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::validation(err.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::validation(err.body_text()))?;
                if !bytes.is_empty() {
                    form.files.push(UploadedFile { file_name, bytes });
                }
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| AppError::validation(err.body_text()))?;
                form.push_text(name, value);
            }
        }
    }
    Ok(form)
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

#[async_trait]
impl<T, S> FromRequest<S> for WithFiles<T>
where
    T: DeserializeOwned + FromForm + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(req.headers()) {
            let ValidJson(body) = ValidJson::<T>::from_request(req, state).await?;
            return Ok(WithFiles { body, files: Vec::new() });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        let form = read_multipart(multipart).await?;

        let mut violations = Violations::default();
        let body = T::from_form(&form, &mut violations);
        body.validate(&mut violations);
        violations.into_result()?;
        Ok(WithFiles {
            body,
            files: form.files,
        })
    }
}
