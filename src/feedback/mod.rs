//! Perceptible feedback for settled copy results: audio, haptics,
//! announcements, toasts and the celebration burst.

pub mod announcer;
pub mod audio;
pub mod capability;
pub mod celebration;
pub mod haptics;
pub mod orchestrator;

pub use announcer::{Announcer, LiveRegion, NodeId, Politeness};
pub use audio::{AudioBackend, AudioHandle, AudioOutput, OutputState, ToneKind, TonePlan, ToneSegment};
pub use capability::{Capability, CapabilityCache, CapabilityProbe};
pub use celebration::{BurstSpec, Celebration, ParticleShape};
pub use haptics::{HapticDriver, HapticPattern, Intensity};
pub use orchestrator::{FeedbackChannels, FeedbackOrchestrator};
