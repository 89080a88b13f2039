use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use campus_db::repositories::NotificationRepo;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::session::candidate_tokens;
use crate::error::{AppError, AppResult};
use crate::extract::AppQuery;
use crate::middleware::auth::AuthUser;
use crate::notifications::NotificationDispatcher;
use crate::state::AppState;
use crate::supervisor::{self, TaskExit};
use crate::ws::messages::{parse_client_frame, ClientFrame};

/// Browsers cannot set headers on a WebSocket handshake, so the token may
/// also travel in the query string.
#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// HTTP handler that authenticates the caller and upgrades to WebSocket.
///
/// Authentication happens once, before the upgrade: a missing or invalid
/// session is rejected with 401 and no socket is opened, even when the
/// request is not a valid upgrade.
pub async fn ws_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    AppQuery(query): AppQuery<WsAuthQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> AppResult<Response> {
    let mut tokens = candidate_tokens(&jar, &headers);
    tokens.extend(query.token.filter(|t| !t.is_empty()));
    let user = AuthUser::from_candidates(&tokens, &state)?;
    let ws = ws.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` under the caller's account and role.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound frames on the current task until either side closes.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        conn_id = %conn_id,
        account_id = user.account_id,
        role = %user.role,
        "WebSocket connected"
    );

    let mut rx = state
        .ws_manager
        .add(conn_id.clone(), user.account_id, user.role)
        .await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let inbound = async {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Close(_)) => break,
                Ok(Message::Pong(_)) => {
                    tracing::trace!(conn_id = %conn_id, "Pong received");
                }
                Ok(Message::Text(text)) => match parse_client_frame(text.as_str()) {
                    Ok(frame) => handle_client_frame(&state, user, frame).await,
                    Err(e) => {
                        tracing::debug!(conn_id = %conn_id, error = %e, "Ignoring WebSocket frame");
                    }
                },
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    };

    // A closed sink ends the connection; a panicking sender ends the process.
    tokio::select! {
        () = inbound => {}
        exit = supervisor::watch(&mut send_task) => {
            if let TaskExit::Panicked(_) = exit {
                supervisor::terminate("websocket sender", &exit);
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, account_id = user.account_id, "WebSocket disconnected");
}

/// Apply a client frame on behalf of the connection's account, then push the
/// new unread count to all of that account's connections.
async fn handle_client_frame(state: &AppState, user: AuthUser, frame: ClientFrame) {
    let result = match frame {
        ClientFrame::MarkRead { notification_id } => {
            NotificationRepo::mark_read(&state.pool, notification_id, user.account_id)
                .await
                .map(|_| ())
        }
        ClientFrame::MarkAllRead => {
            NotificationRepo::mark_all_read(&state.pool, user.account_id)
                .await
                .map(|_| ())
        }
    };

    if let Err(e) = result {
        tracing::error!(account_id = user.account_id, error = %e, ?frame, "WebSocket frame failed");
        return;
    }

    NotificationDispatcher::from_state(state)
        .push_unread_count(user.account_id)
        .await;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use campus_core::notification::NotificationDraft;
    use campus_core::roles::Role;
    use campus_db::models::account::{Account, CreateAccount};
    use campus_db::models::event::{CreateEvent, Event};
    use campus_db::models::notification::Notification;
    use campus_db::repositories::{AccountRepo, EventRepo};
    use sqlx::PgPool;

    use super::*;
    use crate::auth::jwt::JwtConfig;
    use crate::config::{Environment, ServerConfig};
    use crate::ws::WsManager;

    fn state(pool: PgPool) -> AppState {
        AppState {
            pool,
            config: Arc::new(ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                environment: Environment::Development,
                cors_origins: vec![],
                client_url: "http://localhost:5173".into(),
                request_timeout_secs: 30,
                jwt: JwtConfig {
                    secret: "ws-frame-secret".into(),
                    session_expiry_days: 1,
                },
                google: None,
            }),
            ws_manager: Arc::new(WsManager::new()),
            identity_provider: None,
        }
    }

    async fn account(pool: &PgPool, email: &str, role: Role) -> Account {
        AccountRepo::create(
            pool,
            &CreateAccount {
                email: email.to_string(),
                password_hash: Some("$argon2id$placeholder".to_string()),
                google_id: None,
                name: email.to_string(),
                avatar_url: None,
                role,
            },
        )
        .await
        .unwrap()
    }

    async fn open_day(pool: &PgPool, university: &Account) -> Event {
        EventRepo::create(
            pool,
            &CreateEvent {
                university_id: university.id,
                title: "Open Day".to_string(),
                description: String::new(),
                event_date: chrono::Utc::now() + chrono::Duration::days(7),
                location: "Main Hall".to_string(),
                media: vec![],
            },
        )
        .await
        .unwrap()
    }

    async fn notify(pool: &PgPool, student: &Account, event: &Event, uni: &Account) -> Notification {
        NotificationRepo::create(
            pool,
            &NotificationDraft::new_event(student.id, event.summary(), &uni.name),
        )
        .await
        .unwrap()
    }

    fn as_user(account: &Account) -> AuthUser {
        AuthUser {
            account_id: account.id,
            role: account.role,
        }
    }

    fn unread_count_frame(message: Message) -> i64 {
        let Message::Text(text) = message else {
            panic!("expected a text frame, got {message:?}");
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["event"], "notifications:unreadCount");
        json["data"]["count"].as_i64().unwrap()
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn read_frame_marks_own_notification_and_pushes_count(pool: PgPool) {
        let state = state(pool.clone());
        let uni = account(&pool, "uni@example.edu", Role::University).await;
        let student = account(&pool, "s@example.edu", Role::Student).await;
        let other = account(&pool, "o@example.edu", Role::Student).await;
        let event = open_day(&pool, &uni).await;

        let mine = notify(&pool, &student, &event, &uni).await;
        notify(&pool, &student, &event, &uni).await;
        let theirs = notify(&pool, &other, &event, &uni).await;

        let mut live = state
            .ws_manager
            .add("tab".into(), student.id, Role::Student)
            .await;

        handle_client_frame(
            &state,
            as_user(&student),
            ClientFrame::MarkRead {
                notification_id: mine.id,
            },
        )
        .await;

        assert_eq!(unread_count_frame(live.recv().await.unwrap()), 1);
        assert_eq!(NotificationRepo::unread_count(&pool, student.id).await.unwrap(), 1);

        // Another account's notification id is ignored, but the count is still pushed.
        handle_client_frame(
            &state,
            as_user(&student),
            ClientFrame::MarkRead {
                notification_id: theirs.id,
            },
        )
        .await;

        assert_eq!(unread_count_frame(live.recv().await.unwrap()), 1);
        assert_eq!(NotificationRepo::unread_count(&pool, other.id).await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn read_all_frame_only_touches_the_callers_notifications(pool: PgPool) {
        let state = state(pool.clone());
        let uni = account(&pool, "uni@example.edu", Role::University).await;
        let student = account(&pool, "s@example.edu", Role::Student).await;
        let other = account(&pool, "o@example.edu", Role::Student).await;
        let event = open_day(&pool, &uni).await;

        for _ in 0..3 {
            notify(&pool, &student, &event, &uni).await;
        }
        notify(&pool, &other, &event, &uni).await;

        let mut first_tab = state
            .ws_manager
            .add("tab-1".into(), student.id, Role::Student)
            .await;
        let mut second_tab = state
            .ws_manager
            .add("tab-2".into(), student.id, Role::Student)
            .await;
        let mut bystander = state
            .ws_manager
            .add("tab-3".into(), other.id, Role::Student)
            .await;

        handle_client_frame(&state, as_user(&student), ClientFrame::MarkAllRead).await;

        assert_eq!(unread_count_frame(first_tab.recv().await.unwrap()), 0);
        assert_eq!(unread_count_frame(second_tab.recv().await.unwrap()), 0);
        assert!(bystander.try_recv().is_err());

        assert_eq!(NotificationRepo::unread_count(&pool, student.id).await.unwrap(), 0);
        assert_eq!(NotificationRepo::unread_count(&pool, other.id).await.unwrap(), 1);
    }
}
