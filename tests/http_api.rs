mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{spawn_app, Part, PUBLIC_URL};

#[tokio::test]
async fn sign_up_sets_a_session_cookie() {
    let app = spawn_app().await;
    let response = app
        .json(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "email": "dana@example.com", "password": "pw", "name": "Dana" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.cookie.as_deref().unwrap().starts_with("jwt="));
    let user = &response.payload()["user"];
    assert_eq!(user["email"], json!("dana@example.com"));
    assert!(user.get("password").is_none());
    assert!(response.payload()["accessToken"].is_string());

    let again = app
        .json(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "email": "dana@example.com", "password": "pw", "name": "Dana" })),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        again.body["message"],
        json!(["Email dana@example.com is already in use"])
    );
}

#[tokio::test]
async fn sign_in_checks_the_password() {
    let app = spawn_app().await;
    app.sign_up("erin").await;

    let wrong = app
        .json(
            Method::POST,
            "/auth/signin",
            None,
            Some(json!({ "email": "erin@example.com", "password": "nope" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, json!({ "message": "Unauthorized", "statusCode": 401 }));

    let right = app
        .json(
            Method::POST,
            "/auth/signin",
            None,
            Some(json!({ "email": "erin@example.com", "password": "correct horse" })),
        )
        .await;
    assert_eq!(right.status, StatusCode::OK);
    let cookie = right.cookie.unwrap();
    let profile = app.json(Method::GET, "/profile", Some(&cookie), None).await;
    assert_eq!(profile.payload()["name"], json!("erin"));
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let app = spawn_app().await;
    for uri in ["/boards", "/profile", "/users", "/statuses"] {
        let response = app.json(Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let forged = app
        .json(Method::GET, "/boards", Some("jwt=not.a.token"), None)
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn validation_errors_are_collected() {
    let app = spawn_app().await;
    let response = app
        .json(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "email": "not-an-email", "password": "", "name": "" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({
            "message": [
                "email must be an email",
                "password should not be empty",
                "name should not be empty",
            ],
            "error": "Bad Request",
            "statusCode": 400,
        })
    );
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let response = app.post("/boards", &alice, json!({ "title": "wrong field" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], json!("Bad Request"));
}

#[tokio::test]
async fn users_are_searchable_by_name_or_email() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    app.sign_up("bob").await;

    let all = app.get("/users", &alice).await;
    assert_eq!(all.payload().as_array().unwrap().len(), 2);

    let found = app.get("/users?name=BO", &alice).await;
    let names: Vec<&str> = found
        .payload()
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bob"]);
}

#[tokio::test]
async fn profile_photo_replacement_removes_the_old_object() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;

    let first = app
        .multipart(
            Method::PATCH,
            "/profile",
            &alice,
            &[Part::Text("name", "Alice"), Part::File("me.png", b"one")],
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);
    assert_eq!(first.payload()["name"], json!("Alice"));
    let old = first.payload()["photo"].as_str().unwrap().to_owned();
    let old_path = old.strip_prefix(PUBLIC_URL).unwrap().to_owned();
    assert_eq!(app.get(&old_path, &alice).await.status, StatusCode::OK);

    let second = app
        .multipart(Method::PATCH, "/profile", &alice, &[Part::File("me2.png", b"two")])
        .await;
    assert_ne!(second.payload()["photo"], json!(old));
    assert_eq!(app.get(&old_path, &alice).await.status, StatusCode::NOT_FOUND);

    app.sign_up("bob").await;
    let taken = app
        .patch("/profile", &alice, json!({ "email": "bob@example.com" }))
        .await;
    assert_eq!(taken.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        taken.body["message"],
        json!(["Email bob@example.com is already in use"])
    );
}

#[tokio::test]
async fn statuses_are_seeded_and_editable() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;

    let statuses = app.get("/statuses", &alice).await;
    let names: Vec<&str> = statuses
        .payload()
        .as_array()
        .unwrap()
        .iter()
        .map(|status| status["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["NotStatus", "TODO", "InProgress", "Review", "Done", "Blocked"]
    );

    let lowercase = app
        .patch("/statuses/2", &alice, json!({ "colorCode": "ffa500" }))
        .await;
    assert_eq!(lowercase.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        lowercase.body["message"],
        json!(["colorCode must be in uppercase."])
    );

    let updated = app
        .patch(
            "/statuses/2",
            &alice,
            json!({ "name": "Todo", "colorCode": "112233" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(
        updated.payload(),
        &json!({ "id": 2, "name": "Todo", "color_code": "112233" })
    );

    let missing = app
        .patch("/statuses/99", &alice, json!({ "name": "Ghost" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], json!("Status not found"));
}

#[tokio::test]
async fn unknown_files_are_not_found() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let response = app.get("/files/nothing-here.png", &alice).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], json!("File not found"));
}
