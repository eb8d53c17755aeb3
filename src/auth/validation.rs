use rustrict::CensorStr;

/// Names no player may register (checked case-insensitively).
const RESERVED_NAMES: &[&str] = &["admin", "gm", "system", "operator", "npc"];

/// Validate a login username.
///
/// Rules: 3-20 characters, lowercase letters, digits, and underscores only,
/// not reserved.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if username.len() > 20 {
        return Err("Username must be 20 characters or less".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err("Username may only contain lowercase letters, digits, and underscores".to_string());
    }
    if RESERVED_NAMES.contains(&username) {
        return Err("That username is reserved".to_string());
    }
    Ok(())
}

/// Validate an in-game display name.
///
/// Rules:
/// - 2-20 characters after trimming
/// - Letters (any script), digits, and single spaces
/// - Cannot start or end with a space, no consecutive spaces
/// - Not reserved, no profanity (rustrict catches leetspeak variants)
pub fn validate_display_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();

    if trimmed.chars().count() < 2 {
        return Err("Display name must be at least 2 characters".to_string());
    }
    if trimmed.chars().count() > 20 {
        return Err("Display name must be 20 characters or less".to_string());
    }
    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        return Err("Display name may only contain letters, numbers, and spaces".to_string());
    }
    if name.starts_with(' ') || name.ends_with(' ') {
        return Err("Display name cannot start or end with a space".to_string());
    }
    if trimmed.contains("  ") {
        return Err("Display name cannot contain consecutive spaces".to_string());
    }
    let lower = trimmed.to_lowercase();
    if RESERVED_NAMES.contains(&lower.as_str()) {
        return Err("That display name is reserved".to_string());
    }
    if trimmed.is_inappropriate() {
        return Err("Display name contains inappropriate language".to_string());
    }
    Ok(())
}

/// Validate an email address (basic structural validation).
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.len() > 254 {
        return Err("Email address is too long".to_string());
    }
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err("Email must contain exactly one '@'".to_string());
    }
    let (local, domain) = (parts[0], parts[1]);
    if local.is_empty() {
        return Err("Email must have characters before '@'".to_string());
    }
    if domain.is_empty() || !domain.contains('.') {
        return Err("Email domain is invalid".to_string());
    }
    Ok(())
}

/// Validate a password: 8-128 characters, at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password must be 128 characters or less".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }
    Ok(())
}
