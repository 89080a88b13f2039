//! Application status lifecycle.
//!
//! An application starts `pending` and is decided exactly once by the
//! university that owns the event. Decided applications never change again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of the optional cover message attached to an application.
pub const MAX_APPLICATION_MESSAGE_LENGTH: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown application status '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Check that `current -> next` is a legal status change.
///
/// Only `pending -> accepted` and `pending -> rejected` are allowed.
pub fn validate_transition(
    current: ApplicationStatus,
    next: ApplicationStatus,
) -> Result<(), CoreError> {
    if next == ApplicationStatus::Pending {
        return Err(CoreError::Validation(
            "Status must be 'accepted' or 'rejected'".into(),
        ));
    }
    if current.is_terminal() {
        return Err(CoreError::Validation(format!(
            "Application has already been {current}"
        )));
    }
    Ok(())
}

/// Validate the optional cover message a student sends with an application.
pub fn validate_application_message(message: Option<&str>) -> Result<(), CoreError> {
    match message {
        Some(m) if m.chars().count() > MAX_APPLICATION_MESSAGE_LENGTH => {
            Err(CoreError::Validation(format!(
                "Message must be at most {MAX_APPLICATION_MESSAGE_LENGTH} characters"
            )))
        }
        _ => Ok(()),
    }
}
