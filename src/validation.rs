//! Client-side checks run before any call leaves the process.

/// Maximum accepted length, in characters.
pub const MAX_CHARS: usize = 280;

/// Above this length the counter warns that the limit is close.
pub const WARN_CHARS: usize = 240;

/// Why a text was refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty or whitespace only.
    #[error("text is empty")]
    Empty,
    /// More than [`MAX_CHARS`] characters.
    #[error("text is {chars} characters long (max {max})", max = MAX_CHARS)]
    TooLong { chars: usize },
    /// No letter, digit or underscore anywhere.
    #[error("text contains no word character")]
    NoWordCharacter,
}

/// Checks that `text` may be submitted.
///
/// # Examples
///
/// ```
/// use sentiment_client::validation::{validate_text, ValidationError};
///
/// assert!(validate_text("J'adore ce produit").is_ok());
/// assert_eq!(validate_text("   "), Err(ValidationError::Empty));
/// assert_eq!(validate_text("?!..."), Err(ValidationError::NoWordCharacter));
/// ```
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let chars = text.chars().count();
    if chars > MAX_CHARS {
        return Err(ValidationError::TooLong { chars });
    }

    if !text.chars().any(is_word_char) {
        return Err(ValidationError::NoWordCharacter);
    }

    Ok(())
}

/// Unicode letters and digits, plus `_`.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// How close a text is to the length limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharBudget {
    Comfortable,
    NearLimit,
    OverLimit,
}

impl CharBudget {
    pub fn for_text(text: &str) -> Self {
        match text.chars().count() {
            n if n <= WARN_CHARS => CharBudget::Comfortable,
            n if n <= MAX_CHARS => CharBudget::NearLimit,
            _ => CharBudget::OverLimit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_regular_text() {
        assert_eq!(validate_text("J'adore ce produit"), Ok(()));
        assert_eq!(validate_text("a"), Ok(()));
        assert_eq!(validate_text("_"), Ok(()));
        assert_eq!(validate_text("Ce film est excellent ❤️"), Ok(()));
    }

    #[test]
    fn test_rejects_empty_and_blank() {
        assert_eq!(validate_text(""), Err(ValidationError::Empty));
        assert_eq!(validate_text(" \n\t "), Err(ValidationError::Empty));
    }

    #[test]
    fn test_rejects_punctuation_only() {
        assert_eq!(validate_text("!!! ???"), Err(ValidationError::NoWordCharacter));
        assert_eq!(validate_text("❤️❤️"), Err(ValidationError::NoWordCharacter));
    }

    #[test]
    fn test_length_boundary_counts_characters() {
        let at_limit = "é".repeat(MAX_CHARS);
        assert_eq!(validate_text(&at_limit), Ok(()));

        let over = "é".repeat(MAX_CHARS + 1);
        assert_eq!(
            validate_text(&over),
            Err(ValidationError::TooLong { chars: MAX_CHARS + 1 })
        );
    }

    #[test]
    fn test_every_length_in_range() {
        for n in 1..=MAX_CHARS {
            assert!(validate_text(&"x".repeat(n)).is_ok(), "length {n}");
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ValidationError::Empty.to_string(), "text is empty");
        assert_eq!(
            ValidationError::TooLong { chars: 300 }.to_string(),
            "text is 300 characters long (max 280)"
        );
        assert_eq!(
            ValidationError::NoWordCharacter.to_string(),
            "text contains no word character"
        );
    }

    #[test]
    fn test_char_budget() {
        assert_eq!(CharBudget::for_text(""), CharBudget::Comfortable);
        assert_eq!(CharBudget::for_text(&"a".repeat(240)), CharBudget::Comfortable);
        assert_eq!(CharBudget::for_text(&"a".repeat(241)), CharBudget::NearLimit);
        assert_eq!(CharBudget::for_text(&"a".repeat(280)), CharBudget::NearLimit);
        assert_eq!(CharBudget::for_text(&"a".repeat(281)), CharBudget::OverLimit);
    }
}
