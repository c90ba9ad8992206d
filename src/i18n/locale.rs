//! Locale type: validated locale with default-locale fallback.

use crate::i18n::{LocaleConfig, LocaleRegistry, MessageStrings};
use anyhow::{bail, Result};
use tracing::debug;

/// A locale that has been validated against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// ISO 639-1 language code (e.g., "en", "es")
    code: &'static str,
}

impl Locale {
    pub const ENGLISH: Locale = Locale { code: "en" };
    pub const SPANISH: Locale = Locale { code: "es" };
    pub const FRENCH: Locale = Locale { code: "fr" };

    /// Create a Locale from a code string, failing for unsupported codes.
    pub fn from_code(code: &str) -> Result<Locale> {
        match LocaleRegistry::get().get_by_code(code) {
            Some(config) => Ok(Locale { code: config.code }),
            None if code.is_empty() => bail!("Empty locale code"),
            None => bail!("Unknown locale code: '{}'", code),
        }
    }

    /// Resolve a requested code, falling back to the default locale.
    pub fn resolve(code: &str) -> Locale {
        Locale::from_code(code).unwrap_or_else(|_| {
            let fallback = Locale::default_locale();
            debug!(
                "Locale '{}' is not supported, using '{}'",
                code,
                fallback.code()
            );
            fallback
        })
    }

    /// The locale every other table is checked against.
    pub fn default_locale() -> Locale {
        Locale {
            code: LocaleRegistry::get().default_locale().code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen
    /// for a Locale built through `from_code`, `resolve` or the constants.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be valid")
    }

    pub fn strings(&self) -> &'static MessageStrings {
        self.config().strings
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::default_locale()
    }
}
