//! Account roles.
//!
//! Stored as lowercase text in the `accounts.role` column (guarded by a CHECK
//! constraint) and embedded in session tokens under the same spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_UNIVERSITY: &str = "university";
pub const ROLE_ADMIN: &str = "admin";

/// The closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    University,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => ROLE_STUDENT,
            Role::University => ROLE_UNIVERSITY,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Whether a self-service signup (password or OAuth) may pick this role.
    ///
    /// Admin accounts are provisioned out of band.
    pub fn is_self_assignable(self) -> bool {
        matches!(self, Role::Student | Role::University)
    }

    /// Parse a role requested during signup, rejecting roles that cannot be
    /// self-assigned.
    pub fn parse_signup(value: &str) -> Result<Self, CoreError> {
        let role: Role = value.parse()?;
        if !role.is_self_assignable() {
            return Err(CoreError::Validation(format!(
                "Role '{value}' cannot be chosen at signup"
            )));
        }
        Ok(role)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_STUDENT => Ok(Role::Student),
            ROLE_UNIVERSITY => Ok(Role::University),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
