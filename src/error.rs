//! Error taxonomy for the copy engine.
//!
//! Only `InvalidInput` and the terminal failure after retries ever reach the
//! user. `ChannelUnavailable` is produced by feedback channels and is always
//! swallowed by the orchestrator.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A feedback side-channel that may be missing on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Audio,
    Haptics,
    Animation,
    Announcer,
    Toast,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Audio => "audio",
            Channel::Haptics => "haptics",
            Channel::Animation => "animation",
            Channel::Announcer => "announcer",
            Channel::Toast => "toast",
        };
        f.write_str(name)
    }
}

/// Errors produced while copying or while running a feedback channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    /// Malformed or oversized target text; no copy is attempted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Clipboard access was refused.
    #[error("clipboard permission denied: {0}")]
    PermissionDenied(String),

    /// Clipboard access requires a secure context.
    #[error("secure context required: {0}")]
    InsecureContext(String),

    /// Generic failure from both copy strategies.
    #[error("copy failed: {0}")]
    CopyFailed(String),

    /// A feedback channel is not supported here.
    #[error("{0} channel unavailable")]
    ChannelUnavailable(Channel),
}

/// Coarse category used to pick the user-facing failure wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    PermissionDenied,
    InsecureContext,
    Generic,
}

impl CopyError {
    /// Map a raw platform rejection message onto the taxonomy.
    ///
    /// Browser-style error names (`NotAllowedError`, `SecurityError`) and the
    /// free-text hints native clipboard backends emit are both recognised.
    pub fn classify(message: impl Into<String>) -> CopyError {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("notallowed")
            || lower.contains("denied")
            || lower.contains("permission")
        {
            CopyError::PermissionDenied(message)
        } else if lower.contains("secure") || lower.contains("https") {
            CopyError::InsecureContext(message)
        } else {
            CopyError::CopyFailed(message)
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            CopyError::PermissionDenied(_) => FailureCategory::PermissionDenied,
            CopyError::InsecureContext(_) => FailureCategory::InsecureContext,
            _ => FailureCategory::Generic,
        }
    }

    /// Short stable identifier used in analytics payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            CopyError::InvalidInput(_) => "invalid_input",
            CopyError::PermissionDenied(_) => "permission_denied",
            CopyError::InsecureContext(_) => "insecure_context",
            CopyError::CopyFailed(_) => "copy_failed",
            CopyError::ChannelUnavailable(_) => "channel_unavailable",
        }
    }

    /// Pick the more informative of two strategy failures.
    ///
    /// Ranked PermissionDenied, then InsecureContext, then generic. On a tie
    /// the secondary (later) error wins.
    pub fn most_specific(primary: CopyError, secondary: CopyError) -> CopyError {
        if primary.category().rank() > secondary.category().rank() {
            primary
        } else {
            secondary
        }
    }
}

impl FailureCategory {
    fn rank(self) -> u8 {
        match self {
            FailureCategory::PermissionDenied => 2,
            FailureCategory::InsecureContext => 1,
            FailureCategory::Generic => 0,
        }
    }
}
