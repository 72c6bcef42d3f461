//! In-process router tests against a migrated in-memory database.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use db::pool::open_in_memory;
use engine::{BoardSnapshot, DragEnd, PositionBase, PositionUpdates, reorder};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, router};

async fn test_app() -> Router {
    let pool = open_in_memory().await.unwrap();
    router(AppState::new(pool, PositionBase::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_as(app, method, uri, body, Some("user_1")).await
}

async fn send_as(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    user: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user).header("x-user-name", "Ada");
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

struct Seeded {
    workspace_id: String,
    board_id: String,
}

/// Workspace + board with lists "Todo" (cards a, b, c) and "Done" (empty).
async fn seed(app: &Router) -> Seeded {
    let (status, workspace) = send(app, Method::POST, "/api/workspaces", Some(json!({"name": "Acme"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let workspace_id = workspace["id"].as_str().unwrap().to_string();

    let (status, board) = send(
        app,
        Method::POST,
        &format!("/api/workspaces/{workspace_id}/boards"),
        Some(json!({"title": "Launch"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let board_id = board["id"].as_str().unwrap().to_string();

    let mut list_ids = Vec::new();
    for title in ["Todo", "Done"] {
        let (status, list) = send(
            app,
            Method::POST,
            &format!("/api/boards/{board_id}/lists"),
            Some(json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        list_ids.push(list["id"].as_str().unwrap().to_string());
    }
    for title in ["a", "b", "c"] {
        let (status, _) = send(
            app,
            Method::POST,
            &format!("/api/lists/{}/cards", list_ids[0]),
            Some(json!({ "title": title })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    Seeded { workspace_id, board_id }
}

async fn snapshot(app: &Router, board_id: &str) -> BoardSnapshot {
    let (status, body) = send(app, Method::GET, &format!("/api/boards/{board_id}/lists"), None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).unwrap()
}

fn card_titles(snapshot: &BoardSnapshot, list: usize) -> Vec<String> {
    snapshot.lists[list].cards.iter().map(|c| c.title.clone()).collect()
}

#[tokio::test]
async fn health_check() {
    let app = test_app().await;
    let (status, body) = send_as(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn board_loads_in_position_order() {
    let app = test_app().await;
    let seeded = seed(&app).await;

    let board = snapshot(&app, &seeded.board_id).await;
    assert_eq!(board.lists.len(), 2);
    assert_eq!(board.lists[0].list.title, "Todo");
    assert_eq!(card_titles(&board, 0), vec!["a", "b", "c"]);
    assert_eq!(
        board.lists[0].cards.iter().map(|c| c.position).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn card_drag_across_lists_is_saved() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let before = snapshot(&app, &seeded.board_id).await;
    let (todo, done) = (before.lists[0].id(), before.lists[1].id());

    let outcome = reorder(
        before.board.id,
        &before.lists,
        &DragEnd::card(todo, 1, done, 0),
        PositionBase::default(),
    )
    .unwrap();
    let PositionUpdates::Cards(updates) = outcome.updates else {
        panic!("expected card updates");
    };

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/boards/{}/cards/positions", seeded.board_id),
        Some(json!({ "expectedVersion": before.board.version, "updates": updates })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "version": before.board.version + 1 }));

    let after = snapshot(&app, &seeded.board_id).await;
    assert_eq!(card_titles(&after, 0), vec!["a", "c"]);
    assert_eq!(card_titles(&after, 1), vec!["b"]);
}

#[tokio::test]
async fn list_drag_with_stale_version_conflicts() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let before = snapshot(&app, &seeded.board_id).await;

    let outcome = reorder(
        before.board.id,
        &before.lists,
        &DragEnd::list(before.board.id, 1, 0),
        PositionBase::default(),
    )
    .unwrap();
    let PositionUpdates::Lists(updates) = outcome.updates else {
        panic!("expected list updates");
    };
    let uri = format!("/api/boards/{}/lists/positions", seeded.board_id);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "expectedVersion": before.board.version - 1, "updates": updates })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("version"));

    // Unchanged after the rejected batch.
    let after = snapshot(&app, &seeded.board_id).await;
    assert_eq!(after.lists[0].list.title, "Todo");
    assert_eq!(after.board.version, before.board.version);
}

#[tokio::test]
async fn unknown_card_in_batch_rejects_whole_batch() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let before = snapshot(&app, &seeded.board_id).await;
    let todo = &before.lists[0];

    let mut updates: Vec<Value> = todo
        .cards
        .iter()
        .rev()
        .enumerate()
        .map(|(i, c)| {
            json!({
                "id": c.id,
                "position": i + 1,
                "listId": todo.id(),
                "boardId": before.board.id,
            })
        })
        .collect();
    updates.push(json!({
        "id": uuid::Uuid::new_v4(),
        "position": 4,
        "listId": todo.id(),
        "boardId": before.board.id,
    }));

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/boards/{}/cards/positions", seeded.board_id),
        Some(json!({ "updates": updates })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let after = snapshot(&app, &seeded.board_id).await;
    assert_eq!(card_titles(&after, 0), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn updates_for_another_board_are_bad_requests() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let before = snapshot(&app, &seeded.board_id).await;

    let updates = json!([{
        "id": before.lists[0].id(),
        "position": 2,
        "boardId": uuid::Uuid::new_v4(),
    }]);
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/boards/{}/lists/positions", seeded.board_id),
        Some(json!({ "updates": updates })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mutations_require_identity() {
    let app = test_app().await;
    let (status, body) =
        send_as(&app, Method::POST, "/api/workspaces", Some(json!({"name": "Acme"})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn blank_titles_are_rejected() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/boards/{}/lists", seeded.board_id),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn missing_board_is_not_found() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/boards/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn copy_list_appends_copy_with_cards() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let before = snapshot(&app, &seeded.board_id).await;

    let (status, copy) = send(
        &app,
        Method::POST,
        &format!("/api/lists/{}/copy", before.lists[0].id()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["title"], "Todo - Copy");
    assert_eq!(copy["position"], 3);

    let after = snapshot(&app, &seeded.board_id).await;
    assert_eq!(card_titles(&after, 2), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn card_edits_are_audited_newest_first() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let board = snapshot(&app, &seeded.board_id).await;
    let card = &board.lists[0].cards[0];

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/cards/{}", card.id),
        Some(json!({ "title": "renamed", "description": "details" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "details");

    let (status, fetched) = send(&app, Method::GET, &format!("/api/cards/{}", card.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "renamed");
    assert_eq!(fetched["list"]["title"], "Todo");

    let (status, logs) = send(
        &app,
        Method::GET,
        &format!(
            "/api/audit-logs?workspaceId={}&entityId={}&entityType=CARD",
            seeded.workspace_id, card.id
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["UPDATE", "CREATE"]);
    assert_eq!(logs[0]["entityTitle"], "renamed");
    assert_eq!(logs[0]["userName"], "Ada");
}

#[tokio::test]
async fn unknown_entity_type_is_rejected() {
    let app = test_app().await;
    let uri = format!(
        "/api/audit-logs?workspaceId={}&entityId={}&entityType=WIDGET",
        uuid::Uuid::new_v4(),
        uuid::Uuid::new_v4()
    );
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_list_leaves_a_gap_and_bumps_version() {
    let app = test_app().await;
    let seeded = seed(&app).await;
    let before = snapshot(&app, &seeded.board_id).await;

    let (status, deleted) = send(
        &app,
        Method::DELETE,
        &format!("/api/lists/{}", before.lists[0].id()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["title"], "Todo");

    let after = snapshot(&app, &seeded.board_id).await;
    assert_eq!(after.lists.len(), 1);
    assert_eq!(after.lists[0].list.position, 2);
    assert_eq!(after.board.version, before.board.version + 1);
}
