//! Description length rules.

/// Shortest accepted description, in characters.
pub const MIN_DESCRIPTION_CHARS: usize = 4;
/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 255;

pub const TOO_SHORT: &str = "Description must be at least 4 characters";
pub const TOO_LONG: &str = "Description must be at most 255 characters";

/// Result of [`validate_description`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionCheck {
    pub success: bool,
    pub errors: Vec<String>,
}

/// Check the length of an already sanitized description.
///
/// Length is counted in Unicode scalar values, so a composed `"é"` is one
/// character.
pub fn validate_description(description: &str) -> DescriptionCheck {
    let len = description.chars().count();
    let mut errors = Vec::new();
    if len < MIN_DESCRIPTION_CHARS {
        errors.push(TOO_SHORT.to_string());
    }
    if len > MAX_DESCRIPTION_CHARS {
        errors.push(TOO_LONG.to_string());
    }
    DescriptionCheck {
        success: errors.is_empty(),
        errors,
    }
}
