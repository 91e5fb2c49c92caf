//! Sound cues
//!
//! Fire-and-forget hooks played when a roll starts and finishes.
//! Playback itself lives outside this crate.

use std::fmt;

use tracing::info;

use crate::dice::RollOutcome;

/// A moment in a roll that may play a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Dice leave the hand
    RollStart,
    /// Dice settled on a neutral outcome
    RollComplete,
    /// Dice settled on a natural 20 or natural 1
    Critical(RollOutcome),
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundCue::RollStart => write!(f, "roll-start"),
            SoundCue::RollComplete => write!(f, "roll-complete"),
            SoundCue::Critical(RollOutcome::CriticalFailure) => write!(f, "critical-failure"),
            SoundCue::Critical(_) => write!(f, "critical-success"),
        }
    }
}

/// Audio collaborator. Implementations must not block.
pub trait SoundEffects: Send + Sync {
    fn play(&self, cue: SoundCue);
}

/// Plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SoundEffects for Silent {
    fn play(&self, _cue: SoundCue) {}
}

/// Emits a tracing event per cue
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSounds;

impl SoundEffects for LogSounds {
    fn play(&self, cue: SoundCue) {
        info!(%cue, "sfx");
    }
}
