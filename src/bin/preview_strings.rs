//! Preview strings binary - prints a locale's message table and the
//! table consistency report
//!
//! Usage:
//!   cargo run --bin preview-strings            # Default locale
//!   cargo run --bin preview-strings -- es      # Spanish table
//!   cargo run --bin preview-strings -- --all   # Every registered locale
//!
//! Exits non-zero when the validator reports errors.

use anyhow::Result;
use contact_clipboard::i18n::{Locale, LocaleRegistry, MessageKey, TableValidator};
use tracing::info;

fn print_table(locale: Locale) {
    println!("{} ({}, {})", locale.name(), locale.native_name(), locale.code());
    println!("{}", "-".repeat(60));
    let strings = locale.strings();
    for key in MessageKey::ALL {
        println!("{:<22} {}", key.name(), strings.get(key));
    }
    println!();
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contact_clipboard=info".parse()?),
        )
        .init();

    let arg = std::env::args().nth(1);
    match arg.as_deref() {
        Some("--all") => {
            for config in LocaleRegistry::get().list_all() {
                print_table(Locale::from_code(config.code)?);
            }
        }
        Some(code) => print_table(Locale::from_code(code)?),
        None => print_table(Locale::default_locale()),
    }

    let report = TableValidator::validate_registry();
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    for error in &report.errors {
        println!("error: {}", error);
    }

    if report.has_errors() {
        anyhow::bail!("{} string table error(s)", report.errors.len());
    }
    info!(
        "String tables valid ({} warning(s))",
        report.warnings.len()
    );
    Ok(())
}
