//! Message lookup with literal `{param}` substitution.

use std::fmt::Display;

use crate::i18n::{Locale, MessageKey, MessageStrings};

/// Resolves one locale's table and renders its templates.
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    locale: Locale,
}

impl Translator {
    /// Build a translator for `code`; unsupported codes get the default
    /// locale's whole table.
    pub fn new(code: &str) -> Self {
        Self {
            locale: Locale::resolve(code),
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn table(&self) -> &'static MessageStrings {
        self.locale.strings()
    }

    /// Look up `key` and replace every `{name}` listed in `params`.
    pub fn translate(&self, key: MessageKey, params: &[(&str, &dyn Display)]) -> String {
        substitute(self.table().get(key), params)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::for_locale(Locale::default_locale())
    }
}

/// Replace each `{name}` occurrence for the given params.
///
/// Placeholders with no matching param are left untouched.
pub fn substitute(template: &str, params: &[(&str, &dyn Display)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in params {
        let placeholder = format!("{{{}}}", name);
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, &value.to_string());
        }
    }
    rendered
}
