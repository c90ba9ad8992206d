//! Locale registry: Single source of truth for all supported locales.
//!
//! Uses a singleton pattern with `OnceLock` to ensure thread-safe
//! initialization and access.

use std::sync::OnceLock;

use super::strings::{MessageStrings, ENGLISH_STRINGS, FRENCH_STRINGS, SPANISH_STRINGS};

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Español")
    pub native_name: &'static str,

    /// Whether this is the default locale (exactly one should be true)
    pub is_default: bool,

    /// The complete string table for this locale
    pub strings: &'static MessageStrings,
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Get a locale configuration by its code.
    ///
    /// Matching is case-insensitive and ignores a region suffix, so
    /// `"es-MX"` and `"ES"` both resolve to Spanish.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        self.locales.iter().find(|locale| locale.code == primary)
    }

    /// Get all supported locales.
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    /// Get the default locale configuration.
    ///
    /// # Panics
    /// Panics if no default locale or several default locales are defined
    /// (this indicates a configuration error).
    pub fn default_locale(&self) -> &LocaleConfig {
        let defaults: Vec<_> = self
            .locales
            .iter()
            .filter(|locale| locale.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default locale found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default locales found in registry"),
        }
    }

    /// Check if a locale code is supported.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

/// Default locale configurations: English (default), Spanish and French.
fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            strings: &ENGLISH_STRINGS,
        },
        LocaleConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_default: false,
            strings: &SPANISH_STRINGS,
        },
        LocaleConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            is_default: false,
            strings: &FRENCH_STRINGS,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LocaleRegistry::get();
        let registry2 = LocaleRegistry::get();
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_spanish() {
        let config = LocaleRegistry::get().get_by_code("es").expect("spanish");
        assert_eq!(config.name, "Spanish");
        assert_eq!(config.native_name, "Español");
        assert!(!config.is_default);
    }

    #[test]
    fn test_get_by_code_ignores_region_and_case() {
        let registry = LocaleRegistry::get();
        assert_eq!(registry.get_by_code("fr-CA").unwrap().code, "fr");
        assert_eq!(registry.get_by_code("ES").unwrap().code, "es");
        assert_eq!(registry.get_by_code("en_GB").unwrap().code, "en");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        let registry = LocaleRegistry::get();
        assert!(registry.get_by_code("de").is_none());
        assert!(registry.get_by_code("").is_none());
    }

    #[test]
    fn test_list_all_contains_three_locales() {
        let all = LocaleRegistry::get().list_all();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|l| l.code == "fr"));
    }

    #[test]
    fn test_default_locale_is_english() {
        let default = LocaleRegistry::get().default_locale();
        assert_eq!(default.code, "en");
        assert!(std::ptr::eq(default.strings, &ENGLISH_STRINGS));
    }

    #[test]
    fn test_is_supported() {
        let registry = LocaleRegistry::get();
        assert!(registry.is_supported("en"));
        assert!(!registry.is_supported("pt"));
    }
}
