//! Celebratory particle burst shown after a successful copy.

use crate::error::CopyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleShape {
    Circle,
    Square,
    Triangle,
}

/// Parameters for one burst. Renderers are free to approximate.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstSpec {
    pub particle_count: u32,
    pub colors: &'static [&'static str],
    pub shapes: &'static [ParticleShape],
    pub gravity: f32,
}

impl Default for BurstSpec {
    fn default() -> Self {
        Self {
            particle_count: 50,
            colors: &["#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeaa7", "#dda0dd"],
            shapes: &[ParticleShape::Circle, ParticleShape::Square, ParticleShape::Triangle],
            gravity: 0.1,
        }
    }
}

pub trait Celebration: Send + Sync {
    fn burst(&self, spec: &BurstSpec) -> Result<(), CopyError>;

    /// Stop any running animation and release its surface.
    fn release(&self) {}
}
