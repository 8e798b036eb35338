//! Local input validation for board mutations.
//!
//! Every rule here runs before a persistence call is dispatched.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures raised without any network round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Tier name is blank after trim.
    EmptyTierName,
    /// Note content is blank after trim.
    EmptyNote,
    /// Tier anchor rank is outside `1..=max`.
    AnchorOutOfRange { anchor: u32, max: u32 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTierName => write!(f, "Tier name cannot be empty"),
            Self::EmptyNote => write!(f, "Note cannot be empty"),
            Self::AnchorOutOfRange { anchor, max } => {
                write!(f, "anchor rank {anchor} is outside 1..={max}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims a tier name and rejects blank values.
pub fn normalize_tier_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTierName);
    }
    Ok(trimmed.to_string())
}

/// Rejects blank note content. The content itself is kept verbatim.
pub fn validate_note(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyNote);
    }
    Ok(())
}

/// Checks that a new tier anchor lands on an existing rank or right after
/// the last one.
pub fn validate_anchor(anchor: u32, max_rank: u32) -> Result<(), ValidationError> {
    let max = max_rank + 1;
    if anchor == 0 || anchor > max {
        return Err(ValidationError::AnchorOutOfRange { anchor, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{normalize_tier_name, validate_anchor, validate_note, ValidationError};

    #[test]
    fn tier_name_is_trimmed() {
        assert_eq!(normalize_tier_name("  Elite ").unwrap(), "Elite");
        assert_eq!(
            normalize_tier_name(" \t").unwrap_err(),
            ValidationError::EmptyTierName
        );
    }

    #[test]
    fn whitespace_note_is_rejected_with_user_message() {
        let err = validate_note(" \n ").unwrap_err();
        assert_eq!(err.to_string(), "Note cannot be empty");
        assert!(validate_note(" keep spacing ").is_ok());
    }

    #[test]
    fn anchor_may_follow_last_rank() {
        assert!(validate_anchor(1, 0).is_ok());
        assert!(validate_anchor(4, 3).is_ok());
        assert_eq!(
            validate_anchor(5, 3).unwrap_err(),
            ValidationError::AnchorOutOfRange { anchor: 5, max: 4 }
        );
        assert!(validate_anchor(0, 3).is_err());
    }
}
