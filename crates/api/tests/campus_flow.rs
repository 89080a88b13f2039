//! End-to-end flows across events, interests, applications and
//! notifications, including live delivery to registered connections.

mod common;

use std::sync::Arc;

use axum::extract::ws::Message;
use axum::http::StatusCode;
use campus_api::router::build_app_router;
use campus_core::roles::Role;
use common::{
    assert_error, body_json, create_account, delete_auth, get, get_auth, patch_auth,
    patch_json_auth, post_auth, post_json_auth,
};
use sqlx::PgPool;

fn event_body(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description": "Tours and talks",
        "event_date": "2026-11-02T10:00:00Z",
        "location": "Main Hall",
        "media": ["https://cdn.example/hall.jpg"]
    })
}

async fn create_event(app: axum::Router, token: &str, title: &str) -> i64 {
    let response = post_json_auth(app, "/api/events", token, event_body(title)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn notification_count(pool: &PgPool, recipient_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE recipient_id = $1")
        .bind(recipient_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

fn frame(message: Message) -> serde_json::Value {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Interests and event fan-out
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn new_event_notifies_each_follower_once(pool: PgPool) {
    let (uni, uni_token) = create_account(&pool, "uni@example.edu", "Tech U", Role::University).await;
    let (follower, follower_token) =
        create_account(&pool, "f@example.edu", "Follower", Role::Student).await;
    let (bystander, _) = create_account(&pool, "b@example.edu", "Bystander", Role::Student).await;
    let app = common::build_test_app(pool.clone());

    let uri = format!("/api/students/interests/{}", uni.id);
    let response = post_auth(app.clone(), &uri, &follower_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["changed"], true);

    // Following twice does not duplicate the membership.
    let response = post_auth(app.clone(), &uri, &follower_token).await;
    assert_eq!(body_json(response).await["data"]["changed"], false);

    let event_id = create_event(app.clone(), &uni_token, "Open Day").await;

    assert_eq!(notification_count(&pool, follower.id).await, 1);
    assert_eq!(notification_count(&pool, bystander.id).await, 0);
    assert_eq!(notification_count(&pool, uni.id).await, 0);

    let response = get_auth(app, "/api/notifications", &follower_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["unread_count"], 1);
    let item = &json["data"]["items"][0];
    assert_eq!(item["kind"], "new_event");
    assert_eq!(item["event_id"], event_id);
    assert_eq!(item["message"], "Tech U published a new event: Open Day");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unfollowed_university_sends_nothing(pool: PgPool) {
    let (uni, uni_token) = create_account(&pool, "uni@example.edu", "Tech U", Role::University).await;
    let (student, token) = create_account(&pool, "s@example.edu", "S", Role::Student).await;
    let app = common::build_test_app(pool.clone());

    let uri = format!("/api/students/interests/{}", uni.id);
    post_auth(app.clone(), &uri, &token).await;
    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(body_json(response).await["data"]["following"], false);

    create_event(app.clone(), &uni_token, "Quiet Day").await;
    assert_eq!(notification_count(&pool, student.id).await, 0);

    let response = get_auth(app, "/api/students/interests", &token).await;
    assert_eq!(body_json(response).await["data"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn following_a_student_is_404(pool: PgPool) {
    let (other, _) = create_account(&pool, "o@example.edu", "Other", Role::Student).await;
    let (_, token) = create_account(&pool, "s@example.edu", "S", Role::Student).await;
    let app = common::build_test_app(pool);

    let response = post_auth(app, &format!("/api/students/interests/{}", other.id), &token).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn new_event_is_pushed_to_live_connections(pool: PgPool) {
    let (uni, uni_token) = create_account(&pool, "uni@example.edu", "Tech U", Role::University).await;
    let (student, token) = create_account(&pool, "s@example.edu", "S", Role::Student).await;

    let state = common::test_state(pool.clone(), None);
    let ws_manager = Arc::clone(&state.ws_manager);
    let app = build_app_router(state, &common::test_config());

    let mut live = ws_manager.add("tab".into(), student.id, Role::Student).await;

    post_auth(
        app.clone(),
        &format!("/api/students/interests/{}", uni.id),
        &token,
    )
    .await;
    create_event(app.clone(), &uni_token, "Open Day").await;

    let pushed = frame(live.recv().await.unwrap());
    assert_eq!(pushed["event"], "notification:new");
    assert_eq!(pushed["data"]["kind"], "new_event");
    assert_eq!(pushed["data"]["recipient_id"], student.id);

    let id = pushed["data"]["id"].as_i64().unwrap();
    patch_auth(app, &format!("/api/notifications/{id}/read"), &token).await;

    let count = frame(live.recv().await.unwrap());
    assert_eq!(count["event"], "notifications:unreadCount");
    assert_eq!(count["data"]["count"], 0);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn events_are_listed_with_totals_and_filters(pool: PgPool) {
    let (a, a_token) = create_account(&pool, "a@example.edu", "A", Role::University).await;
    let (_, b_token) = create_account(&pool, "b@example.edu", "B", Role::University).await;
    let app = common::build_test_app(pool);

    for title in ["One", "Two", "Three"] {
        create_event(app.clone(), &a_token, title).await;
    }
    create_event(app.clone(), &b_token, "Other").await;

    let json = body_json(get(app.clone(), "/api/events?limit=2").await).await;
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(json["data"]["limit"], 2);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);

    let json = body_json(get(app, &format!("/api/events?university_id={}", a.id)).await).await;
    assert_eq!(json["data"]["total"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_the_owner_edits_and_deletes_events(pool: PgPool) {
    let (_, owner) = create_account(&pool, "a@example.edu", "A", Role::University).await;
    let (_, rival) = create_account(&pool, "b@example.edu", "B", Role::University).await;
    let app = common::build_test_app(pool);

    let id = create_event(app.clone(), &owner, "Open Day").await;
    let uri = format!("/api/events/{id}");

    let response = common::put_json_auth(
        app.clone(),
        &uri,
        &rival,
        serde_json::json!({ "title": "Hijacked" }),
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let response = common::put_json_auth(
        app.clone(),
        &uri,
        &owner,
        serde_json::json!({ "title": "  Open Day 2  " }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Open Day 2");
    assert_eq!(json["data"]["location"], "Main Hall");

    let response = delete_auth(app.clone(), &uri, &rival).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let response = delete_auth(app.clone(), &uri, &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, &uri).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn applying_twice_is_409_and_owner_is_notified_once(pool: PgPool) {
    let (uni, uni_token) = create_account(&pool, "uni@example.edu", "Tech U", Role::University).await;
    let (student, token) = create_account(&pool, "s@example.edu", "Sam", Role::Student).await;
    let app = common::build_test_app(pool.clone());

    let event_id = create_event(app.clone(), &uni_token, "Open Day").await;
    let uri = format!("/api/events/{event_id}/applications");

    let response = post_json_auth(
        app.clone(),
        &uri,
        &token,
        serde_json::json!({ "message": "  Excited!  " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["message"], "Excited!");
    assert_eq!(json["data"]["student_id"], student.id);

    // No body at all is also accepted, but the pair already exists.
    let response = post_auth(app.clone(), &uri, &token).await;
    let json = assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
    assert_eq!(json["message"], "You have already applied to this event");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE event_id = $1")
        .bind(event_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(notification_count(&pool, uni.id).await, 1);

    let response = get_auth(app, &uri, &uni_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["student_name"], "Sam");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn applying_to_a_missing_event_is_404(pool: PgPool) {
    let (_, token) = create_account(&pool, "s@example.edu", "Sam", Role::Student).await;
    let app = common::build_test_app(pool);

    let response = post_auth(app, "/api/events/999999/applications", &token).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn decisions_are_final_and_notify_the_student(pool: PgPool) {
    let (_, uni_token) = create_account(&pool, "uni@example.edu", "Tech U", Role::University).await;
    let (_, rival_token) = create_account(&pool, "r@example.edu", "Rival U", Role::University).await;
    let (student, token) = create_account(&pool, "s@example.edu", "Sam", Role::Student).await;
    let app = common::build_test_app(pool.clone());

    let event_id = create_event(app.clone(), &uni_token, "Open Day").await;
    let response = post_auth(
        app.clone(),
        &format!("/api/events/{event_id}/applications"),
        &token,
    )
    .await;
    let application_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/applications/{application_id}/status");

    let response = patch_json_auth(
        app.clone(),
        &uri,
        &rival_token,
        serde_json::json!({ "status": "accepted" }),
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    let response = patch_json_auth(
        app.clone(),
        &uri,
        &uni_token,
        serde_json::json!({ "status": "pending" }),
    )
    .await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let response = patch_json_auth(
        app.clone(),
        &uri,
        &uni_token,
        serde_json::json!({ "status": "accepted" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "accepted");
    assert!(json["data"]["decided_at"].is_string());

    let response = patch_json_auth(
        app.clone(),
        &uri,
        &uni_token,
        serde_json::json!({ "status": "rejected" }),
    )
    .await;
    let json = assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    assert_eq!(json["message"], "Application has already been accepted");

    let response = get_auth(app.clone(), "/api/applications/mine", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["status"], "accepted");

    let response = get_auth(app, "/api/notifications?unread_only=true", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["kind"], "application_status");
    assert_eq!(json["data"]["items"][0]["application_id"], application_id);
    assert_eq!(notification_count(&pool, student.id).await, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn applications_are_private(pool: PgPool) {
    let (_, uni_token) = create_account(&pool, "uni@example.edu", "Tech U", Role::University).await;
    let (_, rival_token) = create_account(&pool, "r@example.edu", "Rival U", Role::University).await;
    let (_, token) = create_account(&pool, "s@example.edu", "Sam", Role::Student).await;
    let (_, other_token) = create_account(&pool, "o@example.edu", "Olive", Role::Student).await;
    let app = common::build_test_app(pool);

    let event_id = create_event(app.clone(), &uni_token, "Open Day").await;
    let response = post_auth(
        app.clone(),
        &format!("/api/events/{event_id}/applications"),
        &token,
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/applications/{id}");

    assert_eq!(get_auth(app.clone(), &uri, &token).await.status(), StatusCode::OK);
    assert_eq!(get_auth(app.clone(), &uri, &uni_token).await.status(), StatusCode::OK);
    assert_eq!(
        get_auth(app.clone(), &uri, &other_token).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        get_auth(app.clone(), &uri, &rival_token).await.status(),
        StatusCode::FORBIDDEN
    );

    let response = get_auth(
        app,
        &format!("/api/events/{event_id}/applications"),
        &rival_token,
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

// ---------------------------------------------------------------------------
// Notification management
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn marking_read_is_idempotent_and_counts_follow(pool: PgPool) {
    let (uni, uni_token) = create_account(&pool, "uni@example.edu", "Tech U", Role::University).await;
    let (_, token) = create_account(&pool, "s@example.edu", "S", Role::Student).await;
    let (_, other_token) = create_account(&pool, "o@example.edu", "O", Role::Student).await;
    let app = common::build_test_app(pool);

    post_auth(
        app.clone(),
        &format!("/api/students/interests/{}", uni.id),
        &token,
    )
    .await;
    for title in ["One", "Two", "Three"] {
        create_event(app.clone(), &uni_token, title).await;
    }

    let json = body_json(get_auth(app.clone(), "/api/notifications/unread-count", &token).await).await;
    assert_eq!(json["data"]["count"], 3);

    let json = body_json(get_auth(app.clone(), "/api/notifications", &token).await).await;
    let first = json["data"]["items"][0]["id"].as_i64().unwrap();
    let read_uri = format!("/api/notifications/{first}/read");

    let response = patch_auth(app.clone(), &read_uri, &other_token).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let json = body_json(patch_auth(app.clone(), &read_uri, &token).await).await;
    assert_eq!(json["data"]["is_read"], true);
    let read_at = json["data"]["read_at"].clone();
    let json = body_json(patch_auth(app.clone(), &read_uri, &token).await).await;
    assert_eq!(json["data"]["read_at"], read_at, "first read time is kept");

    let json = body_json(get_auth(app.clone(), "/api/notifications/unread-count", &token).await).await;
    assert_eq!(json["data"]["count"], 2);

    let json = body_json(patch_auth(app.clone(), "/api/notifications/read-all", &token).await).await;
    assert_eq!(json["data"]["updated"], 2);
    let json = body_json(patch_auth(app.clone(), "/api/notifications/read-all", &token).await).await;
    assert_eq!(json["data"]["updated"], 0);

    let response = delete_auth(app.clone(), &format!("/api/notifications/{first}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app.clone(), "/api/notifications", &token).await).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["unread_count"], 0);
    assert_eq!(json["data"]["limit"], 20);

    // Paging is clamped the same way as every other list endpoint.
    let json = body_json(
        get_auth(app, "/api/notifications?limit=1000&offset=-3", &token).await,
    )
    .await;
    assert_eq!(json["data"]["limit"], 100);
    assert_eq!(json["data"]["offset"], 0);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
}
