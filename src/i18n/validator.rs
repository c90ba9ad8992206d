//! String table validation.
//!
//! Checks that each locale's templates carry exactly the placeholders the
//! default locale uses, so parameter substitution behaves the same in every
//! language.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::i18n::{LocaleRegistry, MessageKey, MessageStrings};

/// Validation report containing errors and warnings about the tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Defects that change runtime behaviour (placeholder drift, empty strings)
    pub errors: Vec<String>,

    /// Suspicious but harmless findings (untranslated copies of the default)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for the locale string tables.
pub struct TableValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Keys whose text is legitimately identical across locales.
const LANGUAGE_NEUTRAL: &[MessageKey] = &[MessageKey::InvalidEmailDetail];

impl TableValidator {
    /// Validate every registered locale against the default locale.
    pub fn validate_registry() -> ValidationReport {
        let registry = LocaleRegistry::get();
        let default = registry.default_locale();
        let mut report = ValidationReport::new();

        for locale in registry.list_all() {
            let locale_report = if locale.is_default {
                Self::validate_default(default.strings)
            } else {
                Self::validate(locale.code, default.strings, locale.strings)
            };
            report.errors.extend(locale_report.errors);
            report.warnings.extend(locale_report.warnings);
        }

        report
    }

    /// Validate one table against the default table.
    pub fn validate(code: &str, default: &MessageStrings, table: &MessageStrings) -> ValidationReport {
        let mut report = ValidationReport::new();

        for key in MessageKey::ALL {
            let expected = Self::extract_placeholders(default.get(key));
            let text = table.get(key);

            if text.trim().is_empty() {
                report
                    .errors
                    .push(format!("[{}] '{}' is empty", code, key.name()));
                continue;
            }

            let actual = Self::extract_placeholders(text);
            if expected != actual {
                report.errors.push(format!(
                    "[{}] '{}' placeholder mismatch: default has {:?}, locale has {:?}",
                    code,
                    key.name(),
                    expected,
                    actual
                ));
            }

            if text == default.get(key) && !LANGUAGE_NEUTRAL.contains(&key) {
                report.warnings.push(format!(
                    "[{}] '{}' is identical to the default locale",
                    code,
                    key.name()
                ));
            }
        }

        report
    }

    fn validate_default(table: &MessageStrings) -> ValidationReport {
        let mut report = ValidationReport::new();
        for key in MessageKey::ALL {
            if table.get(key).trim().is_empty() {
                report
                    .errors
                    .push(format!("[default] '{}' is empty", key.name()));
            }
        }
        report
    }

    /// Extract the set of `{name}` placeholders in a template
    pub fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
