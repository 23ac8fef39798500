use std::borrow::Cow;

use validator::ValidationError;
use zxcvbn::zxcvbn;

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 128;
const MIN_STRENGTH_SCORE: u8 = 2;

/// Registration password rule: bounded length, a letter and a digit, and a zxcvbn score of at least 2.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    validate_password_against(password, &[])
}

/// Same rule, with the account's own details (email, name) counted as guessable.
pub fn validate_password_against(password: &str, user_inputs: &[&str]) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < MIN_LENGTH || length > MAX_LENGTH {
        return Err(password_error(
            "password_length",
            format!("Must be between {} and {} characters", MIN_LENGTH, MAX_LENGTH),
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err(password_error(
            "password_complexity",
            "Must include at least one letter and one number".to_string(),
        ));
    }

    let estimate = zxcvbn(password, user_inputs);
    if (estimate.score() as u8) < MIN_STRENGTH_SCORE {
        let feedback = estimate.feedback()
            .and_then(|f| f.warning().map(|w| w.to_string()))
            .unwrap_or_else(|| "Password is too easy to guess".to_string());
        return Err(password_error("password_strength", feedback));
    }

    Ok(())
}

fn password_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_password() {
        assert!(validate_password_strength("tram-line-94-porto").is_ok());
    }

    #[test]
    fn rejects_short_password() {
        let err = validate_password_strength("ab1").unwrap_err();
        assert_eq!(err.code, "password_length");
    }

    #[test]
    fn rejects_password_without_digit() {
        let err = validate_password_strength("onlyletters").unwrap_err();
        assert_eq!(err.code, "password_complexity");
    }

    #[test]
    fn rejects_common_password() {
        let err = validate_password_strength("password1").unwrap_err();
        assert_eq!(err.code, "password_strength");
    }

    #[test]
    fn account_details_weaken_password() {
        let err = validate_password_against("tram-line-94-porto", &["tram-line-94-porto"]).unwrap_err();
        assert_eq!(err.code, "password_strength");
    }
}
