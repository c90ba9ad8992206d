//! Internationalization (i18n) for the copy widget's user-facing strings.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported locales and their metadata
//! - `locale`: Validated locale type with fallback to the default locale
//! - `strings`: Per-locale string tables, one struct field per message key
//! - `translator`: Key lookup and `{param}` substitution
//! - `validator`: Placeholder consistency checks across locale tables
//!
//! # Example
//!
//! ```rust
//! use contact_clipboard::i18n::{MessageKey, Translator};
//!
//! let t = Translator::new("es");
//! assert_eq!(t.translate(MessageKey::Copying, &[]), "Copiando...");
//!
//! // Unsupported locales use the whole default table
//! let t = Translator::new("de");
//! assert_eq!(t.locale().code(), "en");
//! ```

mod locale;
mod registry;
mod strings;
mod translator;
mod validator;

pub use locale::Locale;
pub use registry::{LocaleConfig, LocaleRegistry};
pub use strings::{MessageKey, MessageStrings};
pub use translator::{substitute, Translator};
pub use validator::{TableValidator, ValidationReport};
