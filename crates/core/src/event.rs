//! Event field limits and validation.

use crate::error::CoreError;

/// An event carries at most this many media references.
pub const MAX_EVENT_MEDIA: usize = 4;

pub const MAX_EVENT_TITLE_LENGTH: usize = 200;
pub const MAX_EVENT_DESCRIPTION_LENGTH: usize = 5_000;
pub const MAX_EVENT_LOCATION_LENGTH: usize = 300;

/// Maximum length of a single media reference (URL).
pub const MAX_MEDIA_REF_LENGTH: usize = 2_048;

fn validate_required_text(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    validate_required_text("Title", title, MAX_EVENT_TITLE_LENGTH)
}

pub fn validate_location(location: &str) -> Result<(), CoreError> {
    validate_required_text("Location", location, MAX_EVENT_LOCATION_LENGTH)
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_EVENT_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description must be at most {MAX_EVENT_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate the media list: no more than [`MAX_EVENT_MEDIA`] entries, each a
/// non-empty reference of bounded length.
pub fn validate_media(media: &[String]) -> Result<(), CoreError> {
    if media.len() > MAX_EVENT_MEDIA {
        return Err(CoreError::Validation(format!(
            "An event can have at most {MAX_EVENT_MEDIA} media items"
        )));
    }
    for item in media {
        if item.trim().is_empty() {
            return Err(CoreError::Validation("Media references must not be empty".into()));
        }
        if item.len() > MAX_MEDIA_REF_LENGTH {
            return Err(CoreError::Validation(format!(
                "Media references must be at most {MAX_MEDIA_REF_LENGTH} characters"
            )));
        }
    }
    Ok(())
}
