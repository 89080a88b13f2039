//! Live channel frame format.
//!
//! Every frame, in both directions, is a JSON text message of the form
//! `{ "event": "<name>", "data": <payload> }`.

use axum::extract::ws::Message;
use campus_core::types::DbId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server → client: a notification was just created for the recipient.
pub const EVENT_NOTIFICATION_NEW: &str = "notification:new";
/// Server → client: the recipient's current unread count.
pub const EVENT_UNREAD_COUNT: &str = "notifications:unreadCount";
/// Client → server: mark one notification read.
pub const EVENT_NOTIFICATION_READ: &str = "notification:read";
/// Client → server: mark all of the caller's notifications read.
pub const EVENT_NOTIFICATIONS_READ_ALL: &str = "notifications:readAll";

#[derive(Debug, Serialize, Deserialize)]
struct Frame<T> {
    event: String,
    #[serde(default)]
    data: T,
}

/// A recognised client → server frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFrame {
    MarkRead { notification_id: DbId },
    MarkAllRead,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(String),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("missing or invalid notification id")]
    MissingId,
}

/// Parse an inbound text frame.
///
/// The id for `notification:read` may be sent as a number, a numeric
/// string, or an object with an `id` / `notificationId` field.
pub fn parse_client_frame(text: &str) -> Result<ClientFrame, FrameError> {
    let frame: Frame<Value> =
        serde_json::from_str(text).map_err(|e| FrameError::Malformed(e.to_string()))?;

    match frame.event.as_str() {
        EVENT_NOTIFICATION_READ => notification_id(&frame.data)
            .map(|notification_id| ClientFrame::MarkRead { notification_id })
            .ok_or(FrameError::MissingId),
        EVENT_NOTIFICATIONS_READ_ALL => Ok(ClientFrame::MarkAllRead),
        other => Err(FrameError::UnknownEvent(other.to_string())),
    }
}

fn notification_id(data: &Value) -> Option<DbId> {
    let id = match data {
        Value::Object(map) => map.get("id").or_else(|| map.get("notificationId"))?,
        other => other,
    };
    match id {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}

/// Encode a server → client frame as a WebSocket text message.
pub fn server_frame<T: Serialize>(event: &str, data: &T) -> Result<Message, serde_json::Error> {
    let text = serde_json::to_string(&Frame {
        event: event.to_string(),
        data,
    })?;
    Ok(Message::Text(text.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn mark_read_accepts_several_id_shapes() {
        for text in [
            r#"{"event":"notification:read","data":12}"#,
            r#"{"event":"notification:read","data":"12"}"#,
            r#"{"event":"notification:read","data":{"id":12}}"#,
            r#"{"event":"notification:read","data":{"notificationId":"12"}}"#,
        ] {
            assert_eq!(
                parse_client_frame(text),
                Ok(ClientFrame::MarkRead { notification_id: 12 }),
                "{text}"
            );
        }
    }

    #[test]
    fn read_all_needs_no_payload() {
        assert_eq!(
            parse_client_frame(r#"{"event":"notifications:readAll"}"#),
            Ok(ClientFrame::MarkAllRead)
        );
    }

    #[test]
    fn bad_frames_are_reported() {
        assert_matches!(parse_client_frame("not json"), Err(FrameError::Malformed(_)));
        assert_matches!(
            parse_client_frame(r#"{"event":"chat:send","data":{}}"#),
            Err(FrameError::UnknownEvent(e)) if e == "chat:send"
        );
        assert_eq!(
            parse_client_frame(r#"{"event":"notification:read","data":{"id":"abc"}}"#),
            Err(FrameError::MissingId)
        );
        assert_eq!(
            parse_client_frame(r#"{"event":"notification:read","data":-4}"#),
            Err(FrameError::MissingId)
        );
    }

    #[test]
    fn server_frames_wrap_event_and_data() {
        let msg = server_frame(EVENT_UNREAD_COUNT, &serde_json::json!({ "count": 3 })).unwrap();
        let Message::Text(text) = msg else {
            panic!("expected a text frame");
        };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(value["event"], "notifications:unreadCount");
        assert_eq!(value["data"]["count"], 3);
    }
}
