//! Input validation for master data forms

use validator::{ValidateEmail, ValidationError};

use bizdash_common::BizdashError;

/// Maximum length for primary key codes
pub const MAX_CODE_LENGTH: usize = 64;

/// Maximum length for display names
pub const MAX_NAME_LENGTH: usize = 255;

pub const SITE_CATEGORIES: [&str; 2] = ["addressable", "technical"];

pub const SITE_STATUSES: [&str; 3] = ["active", "inactive", "maintenance"];

pub const DATA_SOURCES: [&str; 2] = ["etl", "manual"];

/// Validate a primary key code
///
/// Codes must:
/// - Not be empty
/// - Not exceed MAX_CODE_LENGTH characters
/// - Contain only alphanumeric characters, dots, hyphens, and underscores
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::new("code_empty"));
    }
    if code.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::new("code_too_long"));
    }
    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ValidationError::new("code_invalid_chars"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name_empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::new("name_too_long"));
    }
    Ok(())
}

/// An absent or empty email is accepted
pub fn validate_email(email: Option<&str>) -> Result<(), ValidationError> {
    match email {
        Some(email) if !email.is_empty() && !email.validate_email() => {
            Err(ValidationError::new("email_invalid"))
        }
        _ => Ok(()),
    }
}

pub fn validate_latitude(latitude: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::new("latitude_out_of_range"));
    }
    Ok(())
}

pub fn validate_longitude(longitude: f64) -> Result<(), ValidationError> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::new("longitude_out_of_range"));
    }
    Ok(())
}

pub fn validate_positive(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new("value_not_positive"));
    }
    Ok(())
}

pub fn validate_one_of(value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if !allowed.contains(&value) {
        return Err(ValidationError::new("value_not_allowed"));
    }
    Ok(())
}

/// "lat,lng" pair of coordinates
pub fn validate_coordinates(coordinates: Option<&str>) -> Result<(), ValidationError> {
    let Some(coordinates) = coordinates.filter(|c| !c.is_empty()) else {
        return Ok(());
    };

    let parts: Vec<&str> = coordinates.split(',').map(str::trim).collect();
    let [lat, lng] = parts.as_slice() else {
        return Err(ValidationError::new("coordinates_invalid"));
    };

    match (lat.parse::<f64>(), lng.parse::<f64>()) {
        (Ok(lat), Ok(lng)) => {
            validate_latitude(lat)?;
            validate_longitude(lng)
        }
        _ => Err(ValidationError::new("coordinates_invalid")),
    }
}

/// Attach the field name to a validation failure
pub fn check(field: &str, result: Result<(), ValidationError>) -> Result<(), BizdashError> {
    result.map_err(|e| BizdashError::IllegalArgument(format!("{field} is invalid ({})", e.code)))
}
