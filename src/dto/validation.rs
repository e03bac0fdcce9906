//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a command word is `!` followed by ASCII letters and digits.
///
/// # Examples
///
/// ```ignore
/// validate_command_name("!shoot") // Ok
/// validate_command_name("!top7")  // Ok
/// validate_command_name("shoot")  // Err - missing prefix
/// ```
pub fn validate_command_name(command: &str) -> Result<(), ValidationError> {
    let Some(word) = command.strip_prefix('!') else {
        let mut err = ValidationError::new("command_prefix");
        err.message = Some("Command must start with '!'".into());
        return Err(err);
    };

    if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("command_format");
        err.message =
            Some("Command must contain only ASCII letters and digits after '!'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a nick has visible characters and no whitespace inside it.
pub fn validate_nick(nick: &str) -> Result<(), ValidationError> {
    let trimmed = nick.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("nick_blank");
        err.message = Some("Caller nick must not be blank".into());
        return Err(err);
    }

    if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
        let mut err = ValidationError::new("nick_format");
        err.message = Some("Caller nick must not contain whitespace or control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_command_name_valid() {
        assert!(validate_command_name("!shoot").is_ok());
        assert!(validate_command_name("!top10").is_ok());
        assert!(validate_command_name("!EGGS").is_ok());
    }

    #[test]
    fn test_validate_command_name_invalid() {
        assert!(validate_command_name("shoot").is_err()); // no prefix
        assert!(validate_command_name("!").is_err()); // empty word
        assert!(validate_command_name("!top-5").is_err()); // punctuation
        assert!(validate_command_name("!!shoot").is_err());
    }

    #[test]
    fn test_validate_nick() {
        assert!(validate_nick("alice").is_ok());
        assert!(validate_nick(" alice ").is_ok()); // padding is canonicalised later
        assert!(validate_nick("").is_err());
        assert!(validate_nick("al ice").is_err());
        assert!(validate_nick("al\u{1}ice").is_err());
    }
}
