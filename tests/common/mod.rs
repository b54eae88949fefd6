#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        Method, Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use taskhub::{
    auth::SessionKeys, build_router, db::memory::MemoryStore, db::Store, services,
    storage::FsObjectStore, AppState,
};

pub const PUBLIC_URL: &str = "http://files.test";
const BOUNDARY: &str = "taskhub-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _storage: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

impl Response {
    pub fn payload(&self) -> &Value {
        &self.body["payload"]
    }

    pub fn id(&self) -> i64 {
        self.payload()["id"].as_i64().unwrap()
    }
}

/// A user signed up through the API.
pub struct Caller {
    pub id: i64,
    pub cookie: String,
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(true).await
}

/// `seeded: false` starts without roles and statuses.
pub async fn spawn_app_with(seeded: bool) -> TestApp {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    if seeded {
        services::seed::run(store.as_ref()).await.unwrap();
    }
    let storage = tempfile::tempdir().unwrap();
    let objects = FsObjectStore::open(storage.path(), PUBLIC_URL).await.unwrap();
    let state = AppState::new(store, Arc::new(objects), SessionKeys::new("test-secret", 30));
    TestApp {
        router: build_router(state.clone()),
        state,
        _storage: storage,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Response {
            status,
            cookie,
            body,
        }
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, caller: &Caller) -> Response {
        self.json(Method::GET, uri, Some(&caller.cookie), None).await
    }

    pub async fn post(&self, uri: &str, caller: &Caller, body: Value) -> Response {
        self.json(Method::POST, uri, Some(&caller.cookie), Some(body))
            .await
    }

    pub async fn patch(&self, uri: &str, caller: &Caller, body: Value) -> Response {
        self.json(Method::PATCH, uri, Some(&caller.cookie), Some(body))
            .await
    }

    pub async fn delete(&self, uri: &str, caller: &Caller) -> Response {
        self.json(Method::DELETE, uri, Some(&caller.cookie), None)
            .await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        caller: &Caller,
        parts: &[Part<'_>],
    ) -> Response {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(COOKIE, &caller.cookie)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn sign_up(&self, name: &str) -> Caller {
        let response = self
            .json(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "email": format!("{name}@example.com"),
                    "password": "correct horse",
                    "name": name,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        Caller {
            id: response.payload()["user"]["id"].as_i64().unwrap(),
            cookie: response.cookie.expect("signup sets the session cookie"),
        }
    }

    pub async fn create_board(&self, caller: &Caller, name: &str) -> i64 {
        let response = self.post("/boards", caller, json!({ "name": name })).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }

    pub async fn create_column(&self, caller: &Caller, board_id: i64, name: &str) -> Value {
        let response = self
            .post(
                &format!("/boards/{board_id}/columns"),
                caller,
                json!({ "name": name }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.payload().clone()
    }

    pub async fn column_names(&self, caller: &Caller, board_id: i64) -> Vec<(String, i64)> {
        let response = self.get(&format!("/boards/{board_id}/columns"), caller).await;
        assert_eq!(response.status, StatusCode::OK);
        response
            .payload()
            .as_array()
            .unwrap()
            .iter()
            .map(|column| {
                (
                    column["name"].as_str().unwrap().to_owned(),
                    column["column_number"].as_i64().unwrap(),
                )
            })
            .collect()
    }
}
