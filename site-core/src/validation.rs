use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter a number!")]
    Missing,
    #[error("Please enter a valid whole number")]
    NotANumber { input: String },
}

/// Parses form input for a guess or a balance before anything is sent.
pub fn parse_whole_number(input: &str) -> Result<i64, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Missing);
    }

    trimmed.parse::<i64>().map_err(|_| {
        tracing::debug!("Rejected non-numeric input: {:?}", trimmed);
        InputError::NotANumber {
            input: trimmed.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_number() {
        assert_eq!(parse_whole_number("750"), Ok(750));
        assert_eq!(parse_whole_number("  1200 "), Ok(1200));
    }

    #[test]
    fn test_empty_input_is_missing() {
        assert_eq!(parse_whole_number(""), Err(InputError::Missing));
        assert_eq!(parse_whole_number("   "), Err(InputError::Missing));
    }

    #[test]
    fn test_non_numeric_input_rejected() {
        assert!(matches!(
            parse_whole_number("abc"),
            Err(InputError::NotANumber { .. })
        ));
        assert!(matches!(
            parse_whole_number("12.5"),
            Err(InputError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(InputError::Missing.to_string(), "Please enter a number!");
    }
}
