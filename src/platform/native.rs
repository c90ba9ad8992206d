//! Desktop platform used by the binary.
//!
//! The modern strategy is the system clipboard through `arboard`. The
//! fallback writes the text to a temp file and pipes it into the OS copy
//! command. Haptics are unsupported; audio is the terminal bell.

use futures::future::BoxFuture;
use std::io::{IsTerminal, Seek, SeekFrom, Write};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{Collaborators, Platform};
use crate::accessibility::{PlatformPreferences, PreferenceProbe};
use crate::clipboard::{LegacyCopy, ModernClipboard, TransientSurface};
use crate::config::parse_bool;
use crate::error::{Channel, CopyError};
use crate::feedback::{
    AudioBackend, AudioOutput, BurstSpec, Capability, CapabilityProbe, Celebration, HapticDriver,
    LiveRegion, NodeId, OutputState, Politeness, TonePlan,
};
use crate::telemetry::{AmbientContext, SignalSource};

#[derive(Clone, Default)]
pub struct NativePlatform;

impl NativePlatform {
    pub fn new() -> Self {
        Self
    }

    pub fn platform(&self) -> Platform {
        Platform::new(Collaborators {
            modern: Arc::new(self.clone()),
            legacy: Arc::new(self.clone()),
            haptics: Arc::new(self.clone()),
            audio: Arc::new(self.clone()),
            live_region: Arc::new(StderrLiveRegion::default()),
            celebration: Arc::new(self.clone()),
            capabilities: Arc::new(self.clone()),
            preferences: Arc::new(self.clone()),
            signals: Arc::new(self.clone()),
            ambient: ambient_from_env(),
        })
    }
}

fn ambient_from_env() -> AmbientContext {
    let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    let dimension = |name: &str| env(name).and_then(|v| v.parse().ok()).unwrap_or(0);

    AmbientContext {
        user_agent: format!(
            "contact-clipboard/{} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        ),
        language: env("LANG")
            .and_then(|lang| lang.split(['.', '_']).next().map(str::to_string))
            .filter(|lang| !lang.is_empty() && lang != "C")
            .unwrap_or_else(|| "en".to_string()),
        screen_width: dimension("COLUMNS"),
        screen_height: dimension("LINES"),
        timezone: env("TZ").unwrap_or_else(|| "UTC".to_string()),
    }
}

// ==================== Clipboard ====================

impl ModernClipboard for NativePlatform {
    fn write_text(&self, text: &str) -> BoxFuture<'static, Result<(), CopyError>> {
        let text = text.to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let mut clipboard =
                    arboard::Clipboard::new().map_err(|e| CopyError::classify(e.to_string()))?;
                clipboard
                    .set_text(text)
                    .map_err(|e| CopyError::classify(e.to_string()))
            })
            .await
            .map_err(|e| CopyError::CopyFailed(format!("clipboard task failed: {}", e)))?
        })
    }
}

/// OS copy commands, tried in order until one exists.
fn copy_commands() -> Vec<(&'static str, &'static [&'static str])> {
    let mut commands: Vec<(&'static str, &'static [&'static str])> = Vec::new();
    if cfg!(target_os = "macos") {
        commands.push(("pbcopy", &[]));
    } else if cfg!(target_os = "windows") {
        commands.push(("clip", &[]));
    } else {
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            commands.push(("wl-copy", &[]));
        }
        commands.push(("xclip", &["-selection", "clipboard"]));
        commands.push(("xsel", &["--clipboard", "--input"]));
    }
    commands
}

/// Temp file holding the text until the copy command has read it.
struct FileSurface {
    file: Option<NamedTempFile>,
}

impl TransientSurface for FileSurface {
    fn select_all(&mut self) -> Result<(), CopyError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CopyError::CopyFailed("surface already removed".to_string()))?;
        file.as_file_mut()
            .seek(SeekFrom::Start(0))
            .map_err(|e| CopyError::CopyFailed(e.to_string()))?;
        Ok(())
    }

    fn exec_copy(&mut self) -> Result<bool, CopyError> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| CopyError::CopyFailed("surface already removed".to_string()))?;

        for (command, args) in copy_commands() {
            let input = file
                .reopen()
                .map_err(|e| CopyError::CopyFailed(e.to_string()))?;
            let status = Command::new(command)
                .args(args)
                .stdin(Stdio::from(input))
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();

            match status {
                Ok(status) if status.success() => {
                    debug!("Fallback copy via {}", command);
                    return Ok(true);
                }
                Ok(status) => {
                    warn!("{} exited with {}", command, status);
                    return Ok(false);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(CopyError::classify(e.to_string())),
            }
        }

        debug!("No OS copy command available");
        Ok(false)
    }

    fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = file.close() {
                warn!("Failed to remove fallback surface: {}", e);
            }
        }
    }
}

impl LegacyCopy for NativePlatform {
    fn create_surface(&self, text: &str) -> Result<Box<dyn TransientSurface>, CopyError> {
        let mut file = NamedTempFile::new().map_err(|e| CopyError::classify(e.to_string()))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| CopyError::CopyFailed(e.to_string()))?;
        Ok(Box::new(FileSurface { file: Some(file) }))
    }
}

// ==================== Feedback ====================

impl CapabilityProbe for NativePlatform {
    fn probe(&self, channel: Channel) -> Capability {
        match channel {
            Channel::Haptics => Capability::Unsupported,
            Channel::Audio | Channel::Animation if !std::io::stderr().is_terminal() => {
                Capability::Unsupported
            }
            _ => Capability::Supported,
        }
    }
}

impl HapticDriver for NativePlatform {
    fn vibrate(&self, _pattern: &[u64]) -> Result<(), CopyError> {
        Err(CopyError::ChannelUnavailable(Channel::Haptics))
    }
}

/// Terminal bell, one ring per tone segment.
struct BellOutput {
    state: Mutex<OutputState>,
}

impl AudioOutput for BellOutput {
    fn state(&self) -> OutputState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn resume(&self) -> Result<(), CopyError> {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = OutputState::Running;
        Ok(())
    }

    fn play(&self, plan: &TonePlan) -> Result<(), CopyError> {
        let bells = "\x07".repeat(plan.segments.len());
        let mut stderr = std::io::stderr();
        stderr
            .write_all(bells.as_bytes())
            .and_then(|_| stderr.flush())
            .map_err(|_| CopyError::ChannelUnavailable(Channel::Audio))
    }

    fn close(&self) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = OutputState::Closed;
    }
}

impl AudioBackend for NativePlatform {
    fn open(&self) -> Result<Arc<dyn AudioOutput>, CopyError> {
        Ok(Arc::new(BellOutput {
            state: Mutex::new(OutputState::Running),
        }))
    }
}

/// Announcements written to stderr; removal has nothing to undo.
#[derive(Default)]
struct StderrLiveRegion {
    next: AtomicU64,
}

impl LiveRegion for StderrLiveRegion {
    fn insert(&self, message: &str, politeness: Politeness) -> Result<NodeId, CopyError> {
        let marker = match politeness {
            Politeness::Polite => "ℹ️",
            Politeness::Assertive => "⚠️",
        };
        eprintln!("{}  {}", marker, message);
        Ok(self.next.fetch_add(1, Ordering::Relaxed))
    }

    fn remove(&self, _id: NodeId) {}
}

impl Celebration for NativePlatform {
    fn burst(&self, spec: &BurstSpec) -> Result<(), CopyError> {
        eprintln!("🎉 {}", "✦".repeat((spec.particle_count / 5) as usize));
        Ok(())
    }
}

impl PreferenceProbe for NativePlatform {
    fn detect(&self) -> PlatformPreferences {
        let flag = |name: &str| {
            std::env::var(name)
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(false)
        };
        PlatformPreferences {
            prefers_reduced_motion: flag("PREFERS_REDUCED_MOTION"),
            prefers_high_contrast: flag("PREFERS_HIGH_CONTRAST"),
            prefers_dark: flag("PREFERS_DARK"),
        }
    }
}

impl SignalSource for NativePlatform {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::SurfaceGuard;
    use serial_test::serial;

    #[test]
    fn test_surface_holds_text_until_removed() {
        let mut surface = NativePlatform::new()
            .create_surface("a@b.co")
            .expect("surface");
        surface.select_all().expect("select");
        surface.remove();
        surface.remove();
        assert!(surface.select_all().is_err());
    }

    #[test]
    fn test_guard_deletes_temp_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"a@b.co").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());

        drop(SurfaceGuard::new(Box::new(FileSurface { file: Some(file) })));
        assert!(!path.exists());
    }

    #[test]
    fn test_haptics_unsupported() {
        let native = NativePlatform::new();
        assert_eq!(native.probe(Channel::Haptics), Capability::Unsupported);
        assert!(native.vibrate(&[50]).is_err());
    }

    #[test]
    #[serial]
    fn test_preferences_from_env() {
        std::env::set_var("PREFERS_REDUCED_MOTION", "true");
        std::env::remove_var("PREFERS_HIGH_CONTRAST");
        std::env::set_var("PREFERS_DARK", "0");
        let prefs = NativePlatform::new().detect();
        std::env::remove_var("PREFERS_REDUCED_MOTION");
        std::env::remove_var("PREFERS_DARK");

        assert!(prefs.prefers_reduced_motion);
        assert!(!prefs.prefers_high_contrast);
        assert!(!prefs.prefers_dark);
    }

    #[test]
    fn test_copy_commands_never_empty() {
        assert!(!copy_commands().is_empty());
    }
}
