//! Pattern validation for identifiers and class names.
//!
//! Manifest formats constrain many string fields (plugin names, mod ids, fully
//! qualified class names). A [`Pattern`] describes such a constraint and
//! [`validate`] / [`validate_all`] enforce it with whole-string match semantics.
//!
//! ```rust
//! use resource_factory_api::validate::{validate, Pattern};
//!
//! static PLUGIN_NAME: Pattern = Pattern::new(r"^[A-Za-z0-9_.-]+$");
//!
//! assert_eq!(validate("my-plugin", &PLUGIN_NAME, "plugin name").unwrap(), "my-plugin");
//! assert!(validate("bad name!", &PLUGIN_NAME, "plugin name").is_err());
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;

/// A regular expression constraint on a string value.
///
/// Patterns are declared as statics and compiled on first use. The expression is
/// always applied to the whole string, whether or not it carries its own anchors.
///
/// Some platforms reserve a package prefix for their own classes (for example
/// `org.bukkit.`). Since lookaround is not available in [`regex`], such
/// constraints are expressed with [`Pattern::excluding_prefix`].
pub struct Pattern {
    source: &'static str,
    excluded_prefix: Option<&'static str>,
    compiled: OnceLock<Result<Regex, String>>,
}

impl Pattern {
    /// Create a pattern from a regular expression.
    pub const fn new(source: &'static str) -> Self {
        Self {
            source,
            excluded_prefix: None,
            compiled: OnceLock::new(),
        }
    }

    /// Create a pattern that additionally rejects values starting with `prefix`.
    pub const fn excluding_prefix(source: &'static str, prefix: &'static str) -> Self {
        Self {
            source,
            excluded_prefix: Some(prefix),
            compiled: OnceLock::new(),
        }
    }

    /// The regular expression source.
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Whether `value` satisfies this pattern.
    ///
    /// An expression that fails to compile matches nothing; [`validate`] reports it instead.
    pub fn is_match(&self, value: &str) -> bool {
        self.try_match(value).unwrap_or(false)
    }

    /// Like [`Pattern::is_match`], failing when the expression does not compile.
    pub fn try_match(&self, value: &str) -> Result<bool, ValidationError> {
        let regex = self.compile()?;
        if let Some(prefix) = self.excluded_prefix {
            if value.starts_with(prefix) {
                return Ok(false);
            }
        }
        Ok(regex.is_match(value))
    }

    /// The compiled, whole-string expression.
    pub fn compile(&self) -> Result<&Regex, ValidationError> {
        self.compiled
            .get_or_init(|| {
                Regex::new(&format!("^(?:{})$", self.source)).map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|message| ValidationError::InvalidPattern {
                pattern: self.source.to_string(),
                message: message.clone(),
            })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.excluded_prefix {
            Some(prefix) => write!(f, "{} (not starting with '{}')", self.source, prefix),
            None => f.write_str(self.source),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("excluded_prefix", &self.excluded_prefix)
            .finish()
    }
}

/// Validate that `value` fully matches `pattern`.
///
/// Returns the value unchanged on success. On mismatch the error names
/// `description` and the pattern.
pub fn validate<'a>(
    value: &'a str,
    pattern: &Pattern,
    description: &str,
) -> Result<&'a str, ValidationError> {
    if pattern.try_match(value)? {
        Ok(value)
    } else {
        Err(ValidationError::InvalidValue {
            description: description.to_string(),
            value: value.to_string(),
            pattern: pattern.to_string(),
        })
    }
}

/// Validate an optional value, passing `None` through.
pub fn validate_opt(
    value: Option<&str>,
    pattern: &Pattern,
    description: &str,
) -> Result<Option<String>, ValidationError> {
    value
        .map(|v| validate(v, pattern, description).map(str::to_string))
        .transpose()
}

/// Validate a required value: `None` is a [`ValidationError::MissingField`].
pub fn validate_required(
    value: Option<&str>,
    pattern: &Pattern,
    field: &str,
    description: &str,
) -> Result<String, ValidationError> {
    let value = value.ok_or_else(|| ValidationError::missing(field))?;
    validate(value, pattern, description).map(str::to_string)
}

/// Validate every element, failing on the first element that does not match.
///
/// `description` should identify the field the elements belong to, e.g.
/// `"Bukkit plugin name (of depend)"`.
pub fn validate_all<'a, I>(values: I, pattern: &Pattern, description: &str) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a String>,
{
    for value in values {
        validate(value, pattern, description)?;
    }
    Ok(())
}

/// Unwrap a required field.
pub fn require<T: Clone>(value: &Option<T>, field: &str) -> Result<T, ValidationError> {
    value.clone().ok_or_else(|| ValidationError::missing(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    static NAME: Pattern = Pattern::new(r"^[A-Za-z0-9_.-]+$");
    static UNANCHORED: Pattern = Pattern::new(r"[a-z]+");
    static CLASS: Pattern = Pattern::excluding_prefix(
        r"([a-zA-Z_$][a-zA-Z\d_$]*\.)*[a-zA-Z_$][a-zA-Z\d_$]*",
        "org.bukkit.",
    );

    #[test]
    fn returns_value_unchanged_on_match() {
        assert_eq!(validate("test", &NAME, "name").unwrap(), "test");
        assert_eq!(validate("a.b-c_1", &NAME, "name").unwrap(), "a.b-c_1");
    }

    #[test]
    fn rejects_partial_matches() {
        assert!(UNANCHORED.is_match("abc"));
        assert!(!UNANCHORED.is_match("abc1"));
        assert!(!UNANCHORED.is_match("1abc"));
    }

    #[test]
    fn error_mentions_description_and_pattern() {
        let err = validate("bad name!", &NAME, "Bukkit plugin name").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Bukkit plugin name"));
        assert!(message.contains("^[A-Za-z0-9_.-]+$"));
        assert!(message.contains("bad name!"));
    }

    #[test]
    fn excluded_prefix_is_rejected() {
        assert!(CLASS.is_match("com.example.Main"));
        assert!(CLASS.is_match("$Weird_Name"));
        assert!(!CLASS.is_match("org.bukkit.Main"));
        assert!(!CLASS.is_match("com..Main"));
        assert!(CLASS.to_string().contains("org.bukkit."));
    }

    #[test]
    fn broken_expression_is_reported() {
        static BROKEN: Pattern = Pattern::new(r"[a-z");
        assert!(!BROKEN.is_match("abc"));
        let err = validate("abc", &BROKEN, "name").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
        assert!(err.to_string().contains("[a-z"), "{err}");
        assert!(NAME.compile().is_ok());
        assert!(CLASS.compile().is_ok());
    }

    #[test]
    fn validate_all_stops_at_first_failure() {
        let values = vec!["ok".to_string(), "not ok".to_string(), "also bad!".to_string()];
        let err = validate_all(&values, &NAME, "name (of depend)").unwrap_err();
        match err {
            ValidationError::InvalidValue { value, description, .. } => {
                assert_eq!(value, "not ok");
                assert_eq!(description, "name (of depend)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn required_and_optional_helpers() {
        assert!(matches!(
            validate_required(None, &NAME, "name", "plugin name"),
            Err(ValidationError::MissingField { .. })
        ));
        assert_eq!(validate_opt(None, &NAME, "loader").unwrap(), None);
        assert_eq!(
            validate_opt(Some("x"), &NAME, "loader").unwrap(),
            Some("x".to_string())
        );
    }
}
