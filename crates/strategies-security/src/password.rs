const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Checks a password against the registration policy.
///
/// Requires at least 8 characters with an uppercase letter, a lowercase
/// letter, a digit and a special character. The error is the message shown
/// to the user.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit");
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err("Password must contain at least one special character");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert!(validate_password_strength("Str0ng!pass").is_ok());

        assert_eq!(
            validate_password_strength("Sh0rt!"),
            Err("Password must be at least 8 characters long")
        );
        assert!(validate_password_strength("alllower1!").is_err());
        assert!(validate_password_strength("ALLUPPER1!").is_err());
        assert!(validate_password_strength("NoDigits!!").is_err());
        assert_eq!(
            validate_password_strength("NoSpecial1"),
            Err("Password must contain at least one special character")
        );
    }
}
