//! Path identifier parsing.

use crate::error::CoreError;
use crate::types::DbId;

/// Parse a raw path segment into a [`DbId`].
///
/// Anything that is not a positive integer is reported as
/// [`CoreError::MalformedId`], which the HTTP layer renders as 404.
pub fn parse_id(entity: &'static str, raw: &str) -> Result<DbId, CoreError> {
    match raw.parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::MalformedId {
            entity,
            raw: raw.to_string(),
        }),
    }
}
