//! Notification kinds and message composition.
//!
//! The dispatcher in the API crate decides *who* receives a notification and
//! when; the text and references of each notification are built here.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::application::ApplicationStatus;
use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A followed university published an event.
    NewEvent,
    /// A student applied to one of the university's events.
    NewApplication,
    /// The university decided on the student's application.
    ApplicationStatus,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::NewEvent => "new_event",
            NotificationKind::NewApplication => "new_application",
            NotificationKind::ApplicationStatus => "application_status",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_event" => Ok(NotificationKind::NewEvent),
            "new_application" => Ok(NotificationKind::NewApplication),
            "application_status" => Ok(NotificationKind::ApplicationStatus),
            other => Err(CoreError::Validation(format!(
                "Unknown notification kind '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for NotificationKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A notification ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub recipient_id: DbId,
    pub recipient_kind: Role,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub event_id: Option<DbId>,
    pub application_id: Option<DbId>,
    /// The account whose action caused the notification.
    pub actor_id: Option<DbId>,
}

/// The event a notification talks about.
#[derive(Debug, Clone, Copy)]
pub struct EventSummary<'a> {
    pub id: DbId,
    pub title: &'a str,
    pub owner_id: DbId,
}

impl NotificationDraft {
    /// Notification for a student following the university that published `event`.
    pub fn new_event(student_id: DbId, event: EventSummary<'_>, university_name: &str) -> Self {
        Self {
            recipient_id: student_id,
            recipient_kind: Role::Student,
            kind: NotificationKind::NewEvent,
            title: "New event".to_string(),
            message: format!("{university_name} published a new event: {}", event.title),
            event_id: Some(event.id),
            application_id: None,
            actor_id: Some(event.owner_id),
        }
    }

    /// Notification for the university owning `event` when a student applies.
    pub fn new_application(
        application_id: DbId,
        event: EventSummary<'_>,
        student_id: DbId,
        student_name: &str,
    ) -> Self {
        Self {
            recipient_id: event.owner_id,
            recipient_kind: Role::University,
            kind: NotificationKind::NewApplication,
            title: "New application".to_string(),
            message: format!("{student_name} applied to your event: {}", event.title),
            event_id: Some(event.id),
            application_id: Some(application_id),
            actor_id: Some(student_id),
        }
    }

    /// Notification for the student whose application was decided.
    ///
    /// Fails for [`ApplicationStatus::Pending`], which is never announced.
    pub fn application_status(
        student_id: DbId,
        application_id: DbId,
        event: EventSummary<'_>,
        status: ApplicationStatus,
    ) -> Result<Self, CoreError> {
        let (title, message) = match status {
            ApplicationStatus::Accepted => (
                "Application accepted",
                format!("Your application to {} has been accepted", event.title),
            ),
            ApplicationStatus::Rejected => (
                "Application rejected",
                format!("Your application to {} has been rejected", event.title),
            ),
            ApplicationStatus::Pending => {
                return Err(CoreError::Internal(
                    "Pending status does not produce a notification".into(),
                ))
            }
        };
        Ok(Self {
            recipient_id: student_id,
            recipient_kind: Role::Student,
            kind: NotificationKind::ApplicationStatus,
            title: title.to_string(),
            message,
            event_id: Some(event.id),
            application_id: Some(application_id),
            actor_id: Some(event.owner_id),
        })
    }
}

/// One draft per distinct follower of the publishing university.
pub fn drafts_for_new_event(
    follower_ids: &[DbId],
    event: EventSummary<'_>,
    university_name: &str,
) -> Vec<NotificationDraft> {
    follower_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|student_id| NotificationDraft::new_event(student_id, event, university_name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn open_day() -> EventSummary<'static> {
        EventSummary {
            id: 7,
            title: "Open Day",
            owner_id: 100,
        }
    }

    #[test]
    fn new_event_fans_out_once_per_follower() {
        let drafts = drafts_for_new_event(&[3, 1, 3, 2], open_day(), "Tech University");

        let recipients: Vec<_> = drafts.iter().map(|d| d.recipient_id).collect();
        assert_eq!(recipients, vec![1, 2, 3]);
        for draft in &drafts {
            assert_eq!(draft.kind, NotificationKind::NewEvent);
            assert_eq!(draft.recipient_kind, Role::Student);
            assert_eq!(draft.event_id, Some(7));
            assert_eq!(draft.actor_id, Some(100));
            assert_eq!(draft.message, "Tech University published a new event: Open Day");
        }
    }

    #[test]
    fn new_event_without_followers_produces_nothing() {
        assert!(drafts_for_new_event(&[], open_day(), "Tech University").is_empty());
    }

    #[test]
    fn new_application_targets_event_owner() {
        let draft = NotificationDraft::new_application(55, open_day(), 3, "Ada");
        assert_eq!(draft.recipient_id, 100);
        assert_eq!(draft.recipient_kind, Role::University);
        assert_eq!(draft.kind, NotificationKind::NewApplication);
        assert_eq!(draft.application_id, Some(55));
        assert_eq!(draft.actor_id, Some(3));
        assert!(draft.message.starts_with("Ada applied"));
    }

    #[test]
    fn status_message_varies_by_decision() {
        let accepted =
            NotificationDraft::application_status(3, 55, open_day(), ApplicationStatus::Accepted)
                .unwrap();
        let rejected =
            NotificationDraft::application_status(3, 55, open_day(), ApplicationStatus::Rejected)
                .unwrap();

        assert_eq!(accepted.recipient_id, 3);
        assert_eq!(accepted.title, "Application accepted");
        assert!(accepted.message.contains("accepted"));
        assert_eq!(rejected.title, "Application rejected");
        assert!(rejected.message.contains("rejected"));
    }

    #[test]
    fn pending_status_is_never_announced() {
        assert_matches!(
            NotificationDraft::application_status(3, 55, open_day(), ApplicationStatus::Pending),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn kind_text_round_trip() {
        for kind in [
            NotificationKind::NewEvent,
            NotificationKind::NewApplication,
            NotificationKind::ApplicationStatus,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::Value::String(kind.as_str().to_string())
            );
        }
    }
}
