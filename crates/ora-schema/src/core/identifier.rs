//! Identifier validation, quoting, and comparison for Oracle DDL.
//!
//! SQL identifiers (table, column, index, constraint names) cannot be passed
//! as bind parameters, so every DDL statement embeds them as text. To keep
//! that safe and case-preserving we:
//!
//! 1. Validate identifiers for suspicious patterns (null bytes, excessive length)
//! 2. Wrap them in double quotes, which also permits reserved words
//! 3. Escape embedded double quotes by doubling them
//!
//! Name comparisons against the catalog go through [`names_equal`] so that
//! every table, index, trigger, sequence and owner comparison uses the same
//! case-insensitive rule.

use crate::error::{Result, SchemaError};

/// Maximum identifier length in bytes (Oracle 12.2 and later).
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers (reported against `param`)
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
pub fn validate_identifier(param: &'static str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SchemaError::InvalidArgument(param));
    }

    if name.contains('\0') {
        return Err(SchemaError::InvalidIdentifier(format!(
            "SECURITY: {} contains null byte (possible injection attempt): {:?}",
            param, name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(SchemaError::InvalidIdentifier(format!(
            "{} exceeds maximum length of {} bytes (got {} bytes): {:?}",
            param,
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote an Oracle identifier.
///
/// # Examples
///
/// ```
/// use ora_schema::core::identifier::quote_ident;
///
/// assert_eq!(quote_ident("Users"), "\"Users\"");
/// assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Case-insensitive name equality used for all catalog name comparisons.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || (!a.is_ascii() && a.to_lowercase() == b.to_lowercase())
}

/// Whether `names` contains `name` under [`names_equal`].
pub fn contains_name<S: AsRef<str>>(names: &[S], name: &str) -> bool {
    names.iter().any(|n| names_equal(n.as_ref(), name))
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Fold an unquoted principal name the way Oracle stores it.
pub fn fold_owner(user: &str) -> String {
    user.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("table", "USERS").is_ok());
        assert!(validate_identifier("table", "my_table").is_ok());
        assert!(validate_identifier("table", "column with spaces").is_ok());
        assert!(validate_identifier("table", "日本語").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        let err = validate_identifier("index_name", "").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArgument("index_name")));
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let err = validate_identifier("table", "table\0name").unwrap_err();
        assert!(err.to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_length_limit() {
        let max_name = "a".repeat(MAX_IDENTIFIER_LENGTH);
        assert!(validate_identifier("table", &max_name).is_ok());

        let long_name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let err = validate_identifier("table", &long_name).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Users"), "\"Users\"");
        assert_eq!(quote_ident("ORDER"), "\"ORDER\"");
        assert_eq!(quote_ident("a\"b\"c"), "\"a\"\"b\"\"c\"");
    }

    #[test]
    fn test_quote_ident_injection_stays_inside_quotes() {
        let quoted = quote_ident("x\"); DROP TABLE t; --");
        assert_eq!(quoted, "\"x\"\"); DROP TABLE t; --\"");
    }

    #[test]
    fn test_names_equal() {
        assert!(names_equal("IX_USERS_NAME", "ix_users_name"));
        assert!(names_equal("Straße", "straße"));
        assert!(!names_equal("IX1", "IX2"));
    }

    #[test]
    fn test_contains_name() {
        let names = vec!["SQ_USERS_ID".to_string(), "SQ_ORDERS_ID".to_string()];
        assert!(contains_name(&names, "sq_users_id"));
        assert!(!contains_name(&names, "SQ_USERS_NAME"));
    }

    #[test]
    fn test_fold_owner() {
        assert_eq!(fold_owner("scott"), "SCOTT");
        assert_eq!(fold_owner(" app_user "), "APP_USER");
    }
}
