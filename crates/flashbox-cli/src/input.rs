//! Validation of user-typed names and card text.

use validator::Validate;

use flashbox_core::error::{AppError, ErrorKind};
use flashbox_core::result::AppResult;

/// A folder or collection name.
#[derive(Debug, Validate)]
pub struct NameInput {
    #[validate(length(min = 1, max = 80, message = "name must be 1 to 80 characters"))]
    pub name: String,
}

impl NameInput {
    /// Trim and validate a name.
    pub fn parse(raw: &str) -> AppResult<String> {
        let input = Self {
            name: raw.trim().to_string(),
        };
        check(&input)?;
        Ok(input.name)
    }
}

/// Both sides of a card.
#[derive(Debug, Validate)]
pub struct CardInput {
    #[validate(length(min = 1, max = 300, message = "front must be 1 to 300 characters"))]
    pub front: String,
    #[validate(length(min = 1, max = 300, message = "back must be 1 to 300 characters"))]
    pub back: String,
}

impl CardInput {
    /// Trim and validate both sides.
    pub fn parse(front: &str, back: &str) -> AppResult<Self> {
        let input = Self {
            front: front.trim().to_string(),
            back: back.trim().to_string(),
        };
        check(&input)?;
        Ok(input)
    }
}

fn check<T: Validate>(input: &T) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::with_source(ErrorKind::Validation, e.to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_trimmed_and_bounded() {
        assert_eq!(NameInput::parse("  Kazakh ").unwrap(), "Kazakh");
        assert!(NameInput::parse("   ").is_err());
        assert!(NameInput::parse(&"x".repeat(80)).is_ok());
        assert!(NameInput::parse(&"x".repeat(81)).is_err());
    }

    #[test]
    fn test_card_length_counts_characters() {
        let kazakh = "ә".repeat(300);
        assert!(CardInput::parse(&kazakh, "hello").is_ok());
        assert!(CardInput::parse("front", &"y".repeat(301)).is_err());
        assert!(CardInput::parse("", "back").is_err());
    }
}
