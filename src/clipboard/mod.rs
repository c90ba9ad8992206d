//! Copy operation lifecycle: validation, strategies and the state machine.

pub mod machine;
pub mod strategy;
pub mod validation;

pub use machine::{
    ClipboardAttempt, ClipboardMachine, ClipboardState, CopyMethod, CopyOutcome, Effect, Event,
    Phase,
};
pub use strategy::{attempt_copy, fallback_copy, LegacyCopy, ModernClipboard, SurfaceGuard, TransientSurface};
pub use validation::{is_valid_email, validate_email, MAX_EMAIL_LENGTH};
