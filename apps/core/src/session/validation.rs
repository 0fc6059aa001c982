/// Pre-network validation for login and signup forms.
///
/// Every rule here runs before the authentication collaborator is
/// contacted; a failure short-circuits with a `validation-error` and the
/// provider never sees the request.
use crate::errors::AuthError;
use crate::session::{Credentials, RegistrationData};

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 120;

/// `local@domain.tld` shape: exactly one `@`, non-empty local part, a dot
/// in the domain with non-empty segments, no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let (local, domain) = match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn validate_login(credentials: &Credentials, min_password_len: usize) -> Result<(), AuthError> {
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(AuthError::Validation(
            "Please fill in all fields".to_string(),
        ));
    }
    if !is_valid_email(&credentials.email) {
        return Err(AuthError::Validation(
            "Please enter a valid email".to_string(),
        ));
    }
    if credentials.password.chars().count() < min_password_len {
        return Err(AuthError::Validation(format!(
            "Password must be at least {min_password_len} characters"
        )));
    }
    Ok(())
}

pub fn validate_signup(data: &RegistrationData, min_password_len: usize) -> Result<(), AuthError> {
    let required = [
        &data.full_name,
        &data.email,
        &data.phone,
        &data.password,
        &data.confirm_password,
        &data.age,
        &data.gender,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(AuthError::Validation(
            "Please fill in all fields".to_string(),
        ));
    }
    if !is_valid_email(&data.email) {
        return Err(AuthError::Validation(
            "Please enter a valid email".to_string(),
        ));
    }
    if data.password.chars().count() < min_password_len {
        return Err(AuthError::Validation(format!(
            "Password must be at least {min_password_len} characters"
        )));
    }
    if data.password != data.confirm_password {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }
    match data.age.trim().parse::<i64>() {
        Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => Ok(()),
        _ => Err(AuthError::Validation(format!(
            "Please enter a valid age ({MIN_AGE}-{MAX_AGE})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegistrationData {
        RegistrationData {
            full_name: "Demo User".to_string(),
            email: "demo@medai.com".to_string(),
            phone: "+8801700000000".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            age: "30".to_string(),
            gender: "female".to_string(),
        }
    }

    #[test]
    fn test_valid_email_shapes() {
        assert!(is_valid_email("demo@medai.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));
    }

    #[test]
    fn test_invalid_email_shapes() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@missing-local.com"));
        assert!(!is_valid_email("no-tld@domain"));
        assert!(!is_valid_email("dot-at-end@domain."));
        assert!(!is_valid_email(".starts@ok"));
        assert!(!is_valid_email("has space@domain.com"));
        assert!(!is_valid_email("two@@domain.com"));
    }

    #[test]
    fn test_login_empty_fields() {
        let creds = Credentials {
            email: String::new(),
            password: "secret1".to_string(),
        };
        let err = validate_login(&creds, 6).unwrap_err();
        assert_eq!(err.user_message(), "Please fill in all fields");
    }

    #[test]
    fn test_login_short_password() {
        let creds = Credentials {
            email: "demo@medai.com".to_string(),
            password: "abc".to_string(),
        };
        let err = validate_login(&creds, 6).unwrap_err();
        assert_eq!(err.user_message(), "Password must be at least 6 characters");
    }

    #[test]
    fn test_login_configurable_minimum() {
        let creds = Credentials {
            email: "demo@medai.com".to_string(),
            password: "demo".to_string(),
        };
        assert!(validate_login(&creds, 4).is_ok());
        assert!(validate_login(&creds, 6).is_err());
    }

    #[test]
    fn test_signup_ok() {
        assert!(validate_signup(&registration(), 6).is_ok());
    }

    #[test]
    fn test_signup_password_mismatch() {
        let mut data = registration();
        data.password = "abcdef".to_string();
        data.confirm_password = "xyzdef".to_string();
        let err = validate_signup(&data, 6).unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match");
    }

    #[test]
    fn test_signup_age_bounds() {
        for (age, ok) in [("17", false), ("18", true), ("120", true), ("121", false)] {
            let mut data = registration();
            data.age = age.to_string();
            assert_eq!(validate_signup(&data, 6).is_ok(), ok, "age {age}");
        }
    }

    #[test]
    fn test_signup_non_numeric_age() {
        let mut data = registration();
        data.age = "thirty".to_string();
        let err = validate_signup(&data, 6).unwrap_err();
        assert_eq!(err.user_message(), "Please enter a valid age (18-120)");
    }

    #[test]
    fn test_signup_missing_field() {
        let mut data = registration();
        data.gender = "  ".to_string();
        let err = validate_signup(&data, 6).unwrap_err();
        assert_eq!(err.user_message(), "Please fill in all fields");
    }
}
