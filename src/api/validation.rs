//! Input validation for API requests.
//!
//! Field checks return `Result<_, String>` with a human readable message;
//! handlers collect them with `ValidationErrorBuilder` from the `error`
//! module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::Role;

lazy_static! {
    /// Loose `local@domain.tld` shape, no attempt at full RFC 5322
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^@\s]+@[^@\s]+\.[^@\s]+$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("username is required".to_string());
    }

    if username.len() > 100 {
        return Err("Username is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a password before hashing
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("password is required".to_string());
    }

    if password.len() > 1024 {
        return Err("Password is too long (max 1024 characters)".to_string());
    }

    Ok(())
}

/// Parse an optional role, defaulting to buyer
pub fn validate_role(role: Option<&str>) -> Result<Role, String> {
    match role {
        None => Ok(Role::default()),
        Some(r) if r.trim().is_empty() => Ok(Role::default()),
        Some(r) => r
            .parse()
            .map_err(|_| "Invalid role. Must be one of: buyer, seller, admin".to_string()),
    }
}

/// Validate a product price
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() {
        return Err("Price must be a number".to_string());
    }

    if price <= 0.0 {
        return Err("Price must be greater than 0".to_string());
    }

    Ok(())
}

/// Validate a cart quantity
pub fn validate_quantity(quantity: i64) -> Result<(), String> {
    if quantity < 1 {
        return Err("Quantity must be at least 1".to_string());
    }

    Ok(())
}

/// Validate a checkout total. Zero is accepted, the amount is recorded as-is.
pub fn validate_total(total: &serde_json::Value) -> Result<f64, String> {
    match total.as_f64() {
        Some(t) if t.is_finite() => Ok(t),
        _ => Err("total_price must be a number".to_string()),
    }
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}
