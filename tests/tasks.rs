mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{spawn_app, spawn_app_with, Caller, Part, TestApp, PUBLIC_URL};

async fn column_for(app: &TestApp, caller: &Caller) -> i64 {
    let board = app.create_board(caller, "Sprint").await;
    app.create_column(caller, board, "Todo").await["id"]
        .as_i64()
        .unwrap()
}

async fn status_id(app: &TestApp, caller: &Caller, name: &str) -> i64 {
    let statuses = app.get("/statuses", caller).await;
    statuses
        .payload()
        .as_array()
        .unwrap()
        .iter()
        .find(|status| status["name"] == json!(name))
        .and_then(|status| status["id"].as_i64())
        .unwrap()
}

fn file_path(url: &Value) -> String {
    url.as_str()
        .unwrap()
        .strip_prefix(PUBLIC_URL)
        .unwrap()
        .to_owned()
}

#[tokio::test]
async fn unknown_status_falls_back_to_not_status() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let column = column_for(&app, &alice).await;
    let not_status = status_id(&app, &alice, "NotStatus").await;
    let review = status_id(&app, &alice, "Review").await;

    let task = app
        .post(
            &format!("/columns/{column}/tasks"),
            &alice,
            json!({ "name": "ship it", "statusId": 4242 }),
        )
        .await;
    assert_eq!(task.status, StatusCode::CREATED, "{:?}", task.body);
    assert_eq!(task.payload()["statusId"], json!(not_status));
    assert_eq!(task.payload()["owner_id"], json!(alice.id));

    let uri = format!("/columns/{column}/tasks/{}", task.id());
    let updated = app.patch(&uri, &alice, json!({ "statusId": review })).await;
    assert_eq!(updated.payload()["statusId"], json!(review));

    let renamed = app.patch(&uri, &alice, json!({ "name": "ship it now" })).await;
    assert_eq!(renamed.payload()["name"], json!("ship it now"));
    assert_eq!(renamed.payload()["statusId"], json!(not_status));
}

#[tokio::test]
async fn missing_status_table_uses_the_fallback_id() {
    let app = spawn_app_with(false).await;
    let tasks = app.state.tasks();
    assert_eq!(tasks.resolve_status(Some(3)).await.unwrap(), 1);
    assert_eq!(tasks.resolve_status(None).await.unwrap(), 1);
}

#[tokio::test]
async fn photo_edits_remove_and_append() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let column = column_for(&app, &alice).await;

    let created = app
        .multipart(
            Method::POST,
            &format!("/columns/{column}/tasks"),
            &alice,
            &[
                Part::Text("name", "with photos"),
                Part::File("first.png", b"first"),
                Part::File("second.png", b"second"),
            ],
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
    let photos = created.payload()["photos"].as_array().unwrap().clone();
    assert_eq!(photos.len(), 2);
    let first = file_path(&photos[0]);
    let second = file_path(&photos[1]);
    assert!(first.ends_with("-first.png"));

    let updated = app
        .multipart(
            Method::PATCH,
            &format!("/columns/{column}/tasks/{}", created.id()),
            &alice,
            &[
                Part::Text("deletedImagesId[]", "0"),
                Part::File("third.png", b"third"),
            ],
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    let photos = updated.payload()["photos"].as_array().unwrap().clone();
    assert_eq!(photos.len(), 2);
    assert_eq!(file_path(&photos[0]), second);
    assert!(file_path(&photos[1]).ends_with("-third.png"));

    assert_eq!(app.get(&first, &alice).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&second, &alice).await.status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_a_task_removes_its_photos() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let column = column_for(&app, &alice).await;

    let created = app
        .multipart(
            Method::POST,
            &format!("/columns/{column}/tasks"),
            &alice,
            &[Part::Text("name", "doomed"), Part::File("photo.jpg", b"jpeg")],
        )
        .await;
    let photo = file_path(&created.payload()["photos"][0]);
    assert_eq!(app.get(&photo, &alice).await.status, StatusCode::OK);

    let uri = format!("/columns/{column}/tasks/{}", created.id());
    assert_eq!(app.delete(&uri, &alice).await.status, StatusCode::OK);
    assert_eq!(app.get(&photo, &alice).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&uri, &alice).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_owner_or_board_admin_may_edit() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let bob = app.sign_up("bob").await;
    let column = column_for(&app, &alice).await;

    let task = app
        .post(
            &format!("/columns/{column}/tasks"),
            &bob,
            json!({ "name": "bob's task" }),
        )
        .await;
    let uri = format!("/columns/{column}/tasks/{}", task.id());

    let carol = app.sign_up("carol").await;
    let denied = app.patch(&uri, &carol, json!({ "name": "mine now" })).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(
        denied.body["message"],
        json!("The user does not have permissions for these actions")
    );

    let by_admin = app.patch(&uri, &alice, json!({ "name": "tidied" })).await;
    assert_eq!(by_admin.status, StatusCode::OK);
    assert_eq!(app.delete(&uri, &bob).await.status, StatusCode::OK);
}

#[tokio::test]
async fn task_fields_are_validated_together() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let column = column_for(&app, &alice).await;

    let response = app
        .post(
            &format!("/columns/{column}/tasks"),
            &alice,
            json!({ "name": "", "deadline": "2001-01-01T00:00:00Z" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["error"], json!("Bad Request"));
}

#[tokio::test]
async fn unknown_recepient_is_not_found() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let column = column_for(&app, &alice).await;

    let response = app
        .post(
            &format!("/columns/{column}/tasks"),
            &alice,
            json!({ "name": "delegate", "recepientId": 777 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], json!("User not found"));
}

#[tokio::test]
async fn moving_a_task_to_another_board_needs_membership_there() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let bob = app.sign_up("bob").await;
    let board = app.create_board(&bob, "Sprint").await;
    let own_column = app.create_column(&bob, board, "Todo").await["id"].as_i64().unwrap();
    let next_column = app.create_column(&bob, board, "Doing").await["id"].as_i64().unwrap();
    let foreign_board = app.create_board(&alice, "Private").await;
    let foreign_column = app.create_column(&alice, foreign_board, "Todo").await["id"]
        .as_i64()
        .unwrap();

    let task = app
        .post(
            &format!("/columns/{own_column}/tasks"),
            &bob,
            json!({ "name": "wander" }),
        )
        .await;
    let uri = format!("/columns/{own_column}/tasks/{}", task.id());

    let denied = app.patch(&uri, &bob, json!({ "columnId": foreign_column })).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    let foreign_tasks = app.get(&format!("/columns/{foreign_column}/tasks"), &alice).await;
    assert!(foreign_tasks.payload().as_array().unwrap().is_empty());

    app.post(
        &format!("/boards/{foreign_board}/members"),
        &alice,
        json!({ "userId": bob.id }),
    )
    .await;
    let moved = app.patch(&uri, &bob, json!({ "columnId": foreign_column })).await;
    assert_eq!(moved.status, StatusCode::OK, "{:?}", moved.body);
    assert_eq!(moved.payload()["column_id"], json!(foreign_column));

    let back = app
        .post(&format!("/columns/{own_column}/tasks"), &bob, json!({ "name": "stay" }))
        .await;
    let within_board = app
        .patch(
            &format!("/columns/{own_column}/tasks/{}", back.id()),
            &bob,
            json!({ "columnId": next_column }),
        )
        .await;
    assert_eq!(within_board.status, StatusCode::OK);
}
