use anyhow::Result;
use contact_clipboard::clipboard::CopyOutcome;
use contact_clipboard::platform::{HeadlessPlatform, NativePlatform};
use contact_clipboard::{Config, CopyWidget};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when not present)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contact_clipboard=info".parse()?),
        )
        .init();

    // Load configuration from environment
    let mut config = Config::from_env()?;

    // First positional argument overrides the configured address
    let mut headless = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--headless" => headless = true,
            value => config.email = value.to_string(),
        }
    }

    let platform = if headless {
        info!("Using in-memory platform");
        HeadlessPlatform::new().platform()
    } else {
        NativePlatform::new().platform()
    };

    let widget = CopyWidget::mount(&config, platform.clone());
    println!("[{}] {}", widget.label(), widget.aria_label());

    widget.click();
    let outcome = widget.wait_settled(1).await;

    match &outcome {
        Some(CopyOutcome::Succeeded {
            method,
            retry_count,
            duration,
        }) => info!(
            "Copied {} via {} ({} retries, {:?})",
            config.email,
            method.as_str(),
            retry_count,
            duration
        ),
        Some(CopyOutcome::Failed { error, .. }) => warn!("Copy failed: {}", error),
        None => warn!("Widget stopped before the copy settled"),
    }

    println!("[{}]", widget.label());
    for toast in widget.toasts() {
        println!("  {:?}: {}", toast.severity, toast.message);
    }

    // Let the celebration and announcements play out before tearing down
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    widget.unmount().await;
    platform.shutdown();

    match outcome {
        Some(CopyOutcome::Succeeded { .. }) => Ok(()),
        Some(CopyOutcome::Failed { message, .. }) => anyhow::bail!(message),
        None => anyhow::bail!("copy did not settle"),
    }
}
