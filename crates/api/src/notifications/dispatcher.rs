use std::sync::Arc;

use campus_core::notification::{drafts_for_new_event, NotificationDraft};
use campus_core::types::DbId;
use campus_db::models::application::Application;
use campus_db::models::event::Event;
use campus_db::models::notification::Notification;
use campus_db::repositories::{InterestRepo, NotificationRepo};
use campus_db::DbPool;
use serde_json::json;

use crate::state::AppState;
use crate::ws::messages::{server_frame, EVENT_NOTIFICATION_NEW, EVENT_UNREAD_COUNT};
use crate::ws::WsManager;

/// Turns domain events into persisted notifications and pushes each one to
/// the recipient's live connections.
///
/// Dispatch runs after the domain write has committed and never fails the
/// request that triggered it: errors are logged and the method returns the
/// number of notifications actually stored. Recipients that are offline
/// read the stored rows later.
#[derive(Clone)]
pub struct NotificationDispatcher {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl NotificationDispatcher {
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.pool.clone(), Arc::clone(&state.ws_manager))
    }

    /// One `new_event` notification per student following the publishing
    /// university.
    pub async fn notify_new_event(&self, event: &Event, university_name: &str) -> usize {
        let followers = match InterestRepo::follower_ids(&self.pool, event.university_id).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(event_id = event.id, error = %e, "Failed to resolve event followers");
                return 0;
            }
        };

        let drafts = drafts_for_new_event(&followers, event.summary(), university_name);
        let mut delivered = 0;
        for draft in &drafts {
            if self.deliver(draft).await.is_some() {
                delivered += 1;
            }
        }
        tracing::info!(
            event_id = event.id,
            university_id = event.university_id,
            followers = drafts.len(),
            delivered,
            "Dispatched new event notifications"
        );
        delivered
    }

    /// One `new_application` notification for the university owning `event`.
    pub async fn notify_new_application(
        &self,
        application: &Application,
        event: &Event,
        student_name: &str,
    ) -> usize {
        let draft = NotificationDraft::new_application(
            application.id,
            event.summary(),
            application.student_id,
            student_name,
        );
        usize::from(self.deliver(&draft).await.is_some())
    }

    /// One `application_status` notification for the applicant.
    pub async fn notify_application_status(&self, application: &Application, event: &Event) -> usize {
        let draft = match NotificationDraft::application_status(
            application.student_id,
            application.id,
            event.summary(),
            application.status,
        ) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::error!(application_id = application.id, error = %e, "Cannot compose status notification");
                return 0;
            }
        };
        usize::from(self.deliver(&draft).await.is_some())
    }

    /// Push the current unread count to every connection of `account_id`.
    pub async fn push_unread_count(&self, account_id: DbId) {
        match NotificationRepo::unread_count(&self.pool, account_id).await {
            Ok(count) => {
                self.push(account_id, EVENT_UNREAD_COUNT, &json!({ "count": count }))
                    .await;
            }
            Err(e) => {
                tracing::error!(account_id, error = %e, "Failed to load unread count");
            }
        }
    }

    /// Persist one draft, then push it live. Returns the stored row, or
    /// `None` when persistence failed.
    async fn deliver(&self, draft: &NotificationDraft) -> Option<Notification> {
        let notification = match NotificationRepo::create(&self.pool, draft).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(
                    recipient_id = draft.recipient_id,
                    kind = %draft.kind,
                    error = %e,
                    "Failed to persist notification"
                );
                return None;
            }
        };

        self.push(notification.recipient_id, EVENT_NOTIFICATION_NEW, &notification)
            .await;
        Some(notification)
    }

    async fn push<T: serde::Serialize>(&self, account_id: DbId, event: &str, data: &T) {
        match server_frame(event, data) {
            Ok(message) => {
                let sent = self.ws_manager.send_to_account(account_id, message).await;
                tracing::debug!(account_id, event, connections = sent, "Pushed live frame");
            }
            Err(e) => {
                tracing::error!(account_id, event, error = %e, "Failed to encode live frame");
            }
        }
    }
}
