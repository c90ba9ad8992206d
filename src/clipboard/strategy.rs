//! The two copy strategies: the platform's modern clipboard write and the
//! legacy select-and-copy fallback on a transient offscreen surface.

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, warn};

use super::machine::CopyMethod;
use crate::error::CopyError;

/// Primary copy mechanism (an asynchronous clipboard write).
pub trait ModernClipboard: Send + Sync {
    /// Whether the platform exposes the modern API at all.
    fn is_available(&self) -> bool {
        true
    }

    fn write_text(&self, text: &str) -> BoxFuture<'static, Result<(), CopyError>>;
}

/// An offscreen, unfocusable, ARIA-hidden editable surface holding the text.
pub trait TransientSurface: Send {
    /// Select the full contents of the surface.
    fn select_all(&mut self) -> Result<(), CopyError>;

    /// Issue the selection-based copy command; `Ok(false)` means the
    /// platform declined without raising.
    fn exec_copy(&mut self) -> Result<bool, CopyError>;

    /// Detach the surface from the document. Must tolerate repeat calls.
    fn remove(&mut self);
}

/// Factory for fallback surfaces.
pub trait LegacyCopy: Send + Sync {
    fn create_surface(&self, text: &str) -> Result<Box<dyn TransientSurface>, CopyError>;
}

/// Owns a mounted surface and removes it on every exit path, including
/// early returns and unwinding.
pub struct SurfaceGuard {
    surface: Box<dyn TransientSurface>,
}

impl SurfaceGuard {
    pub fn new(surface: Box<dyn TransientSurface>) -> Self {
        Self { surface }
    }

    pub fn surface(&mut self) -> &mut dyn TransientSurface {
        self.surface.as_mut()
    }
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.surface.remove();
    }
}

/// Copy `text` through a transient surface.
pub fn fallback_copy(legacy: &dyn LegacyCopy, text: &str) -> Result<(), CopyError> {
    let mut guard = SurfaceGuard::new(legacy.create_surface(text)?);
    let surface = guard.surface();
    surface.select_all()?;
    if surface.exec_copy()? {
        Ok(())
    } else {
        Err(CopyError::CopyFailed("Fallback copy failed".to_string()))
    }
}

/// Try the modern strategy, then the fallback. Returns which one worked.
///
/// The fallback runs on the blocking pool since surfaces may shell out.
/// When both fail, the most specific of the two errors is returned so a
/// permission or secure-context rejection is not masked by a generic
/// fallback failure.
pub async fn attempt_copy(
    modern: Arc<dyn ModernClipboard>,
    legacy: Arc<dyn LegacyCopy>,
    text: String,
) -> Result<CopyMethod, CopyError> {
    let modern_error = if modern.is_available() {
        match modern.write_text(&text).await {
            Ok(()) => return Ok(CopyMethod::Modern),
            Err(e) => {
                warn!("Modern clipboard API failed: {}", e);
                Some(e)
            }
        }
    } else {
        debug!("Modern clipboard API unavailable, using fallback");
        None
    };

    let fallback = tokio::task::spawn_blocking(move || fallback_copy(legacy.as_ref(), &text))
        .await
        .unwrap_or_else(|e| Err(CopyError::CopyFailed(format!("fallback task failed: {}", e))));

    match fallback {
        Ok(()) => Ok(CopyMethod::Fallback),
        Err(fallback_error) => {
            warn!("Fallback copy failed: {}", fallback_error);
            Err(match modern_error {
                Some(modern_error) => CopyError::most_specific(modern_error, fallback_error),
                None => fallback_error,
            })
        }
    }
}
