//! API request/response models.
//!
//! These are the wire-facing DTOs (camelCase JSON). Each request model
//! validates itself into the corresponding `db::models` request type;
//! response models convert from the DB rows with `From`.

pub mod auth;
pub mod clinics;
pub mod contacts;
pub mod messaging;
pub mod pagination;
pub mod salons;
pub mod users;

use crate::errors::FieldError;

/// Trims an optional text field and maps empty strings to `None`, so that
/// `""` from a cleared form field is stored as NULL rather than empty text.
pub(crate) fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Same three-state normalization for partial-update fields: an explicit
/// empty string behaves like an explicit null.
pub(crate) fn normalize_patch(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(normalize)
}

/// Loose structural email check: one `@` with non-empty sides, a dot in the
/// domain, and no whitespace.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

pub(crate) fn check_required_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError {
            field: "name".to_string(),
            message: "name is required".to_string(),
        });
    }
}

pub(crate) fn check_email(email: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(email) = email
        && !email.trim().is_empty()
        && !is_valid_email(email.trim())
    {
        errors.push(FieldError {
            field: "email".to_string(),
            message: "email is not a valid address".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_blank_strings() {
        assert_eq!(normalize(Some("  ".to_string())), None);
        assert_eq!(normalize(Some("".to_string())), None);
        assert_eq!(normalize(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn normalize_patch_keeps_the_outer_level() {
        // Outer None means "field untouched" and must survive normalization.
        assert_eq!(normalize_patch(None), None);
        assert_eq!(normalize_patch(Some(None)), Some(None));
        assert_eq!(normalize_patch(Some(Some("".to_string()))), Some(None));
        assert_eq!(
            normalize_patch(Some(Some(" a ".to_string()))),
            Some(Some("a".to_string()))
        );
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ana@clinic.example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@.com"));
    }
}
