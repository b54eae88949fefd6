mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{spawn_app, spawn_app_with};
use taskhub::db::prelude::*;

#[tokio::test]
async fn creator_becomes_admin() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let board = app.create_board(&alice, "Launch").await;

    let boards = app.get("/boards", &alice).await;
    assert_eq!(boards.status, StatusCode::OK);
    assert_eq!(
        boards.payload(),
        &json!([{
            "id": board,
            "name": "Launch",
            "members": [{
                "id": alice.id,
                "email": "alice@example.com",
                "name": "alice",
                "photo": null,
                "role": "Admin",
            }],
        }])
    );
}

#[tokio::test]
async fn board_creation_without_roles_leaves_nothing_behind() {
    let app = spawn_app_with(false).await;
    let alice = app.sign_up("alice").await;

    let response = app.post("/boards", &alice, json!({ "name": "Orphan" })).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], json!("admin role not found"));

    let user_id = alice.id as i32;
    assert!(app.state.store.boards_for_user(user_id).await.unwrap().is_empty());
    assert_eq!(app.state.store.find_board(1).await.unwrap(), None);
}

#[tokio::test]
async fn only_admins_change_a_board() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let bob = app.sign_up("bob").await;
    let board = app.create_board(&alice, "Launch").await;

    let added = app
        .patch(
            &format!("/boards/{board}"),
            &alice,
            json!({ "addedUserList": [bob.id] }),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK, "{:?}", added.body);
    assert_eq!(added.payload()["members"].as_array().unwrap().len(), 2);

    let denied = app
        .patch(&format!("/boards/{board}"), &bob, json!({ "name": "Hijacked" }))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.delete(&format!("/boards/{board}"), &bob).await.status,
        StatusCode::FORBIDDEN
    );

    let renamed = app
        .patch(&format!("/boards/{board}"), &alice, json!({ "name": "Relaunch" }))
        .await;
    assert_eq!(renamed.payload()["name"], json!("Relaunch"));
}

#[tokio::test]
async fn update_removes_members_before_adding() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let bob = app.sign_up("bob").await;
    let board = app.create_board(&alice, "Launch").await;

    let response = app
        .patch(
            &format!("/boards/{board}"),
            &alice,
            json!({ "addedUserList": [bob.id], "deletedUsersList": [bob.id] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let member_ids: Vec<i64> = response.payload()["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member["id"].as_i64().unwrap())
        .collect();
    assert!(member_ids.contains(&bob.id));

    let unknown = app
        .patch(
            &format!("/boards/{board}"),
            &alice,
            json!({ "addedUserList": [999] }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["message"], json!("User not found"));
}

#[tokio::test]
async fn update_does_not_list_an_existing_member_twice() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let bob = app.sign_up("bob").await;
    let board = app.create_board(&alice, "Launch").await;
    let uri = format!("/boards/{board}");

    let self_added = app.patch(&uri, &alice, json!({ "addedUserList": [alice.id] })).await;
    assert_eq!(self_added.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        self_added.body["message"],
        json!([format!("user {} is already a member of this board", alice.id)])
    );

    app.patch(&uri, &alice, json!({ "addedUserList": [bob.id] })).await;
    let again = app.patch(&uri, &alice, json!({ "addedUserList": [bob.id] })).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);

    let members = app.get(&format!("{uri}/members"), &alice).await;
    let ids: Vec<i64> = members
        .payload()
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![alice.id, bob.id]);
}

#[tokio::test]
async fn member_endpoints() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let bob = app.sign_up("bob").await;
    let board = app.create_board(&alice, "Launch").await;
    let members_uri = format!("/boards/{board}/members");

    let added = app.post(&members_uri, &alice, json!({ "userId": bob.id })).await;
    assert_eq!(added.status, StatusCode::CREATED, "{:?}", added.body);
    assert_eq!(added.payload()["userId"], json!(bob.id));

    let again = app.post(&members_uri, &alice, json!({ "userId": bob.id })).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        again.body["message"],
        json!([format!("user {} is already a member of this board", bob.id)])
    );

    let listed = app.get(&members_uri, &bob).await;
    let roles: Vec<&str> = listed
        .payload()
        .as_array()
        .unwrap()
        .iter()
        .map(|member| member["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles.len(), 2);
    assert!(roles.contains(&"Member"));

    let not_admin = app
        .delete(&format!("{members_uri}/{}", alice.id), &bob)
        .await;
    assert_eq!(not_admin.status, StatusCode::FORBIDDEN);

    let removed = app.delete(&format!("{members_uri}/{}", bob.id), &alice).await;
    assert_eq!(removed.status, StatusCode::OK);
    let gone = app.delete(&format!("{members_uri}/{}", bob.id), &alice).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert!(app.get("/boards", &bob).await.payload().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_board_cascades() {
    let app = spawn_app().await;
    let alice = app.sign_up("alice").await;
    let board = app.create_board(&alice, "Launch").await;
    let column = app.create_column(&alice, board, "Todo").await;
    let column_id = column["id"].as_i64().unwrap();
    let task = app
        .post(
            &format!("/columns/{column_id}/tasks"),
            &alice,
            json!({ "name": "plan" }),
        )
        .await;
    app.post(
        &format!("/tasks/{}/comments", task.id()),
        &alice,
        json!({ "content": "first" }),
    )
    .await;

    let response = app.delete(&format!("/boards/{board}"), &alice).await;
    assert_eq!(response.status, StatusCode::OK);

    let store = &app.state.store;
    assert_eq!(store.find_board(board as i32).await.unwrap(), None);
    assert_eq!(store.find_column(column_id as i32).await.unwrap(), None);
    assert_eq!(store.find_task(task.id() as i32).await.unwrap(), None);
    assert!(store.list_comments(task.id() as i32).await.unwrap().is_empty());
    assert!(app.get("/boards", &alice).await.payload().as_array().unwrap().is_empty());

    let missing = app.delete(&format!("/boards/{board}"), &alice).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], json!("Board not found"));
}
