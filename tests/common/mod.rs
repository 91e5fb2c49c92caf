//! Scripted collaborators for controller tests
//!
//! - `Scripted`: answers with fixed faces after a delay, fails, or panics
//! - `Recorder`: captures sound cues

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use dicer::feedback::{SoundCue, SoundEffects};
use dicer::source::{DiceSource, DieSpec, SourceError};

/// What a scripted source does when asked to roll
#[derive(Debug, Clone)]
pub enum Script {
    /// Answer with these faces after the delay
    Answer(Vec<u32>, Duration),
    /// Fail after the delay
    Fail(Duration),
    /// Never answer
    Stall,
    /// Panic instead of answering
    Panic,
}

/// Dice source driven by a script, recording every request it receives
#[derive(Debug, Clone)]
pub struct Scripted {
    script: Script,
    pub requests: Arc<Mutex<Vec<Vec<DieSpec>>>>,
}

impl Scripted {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer immediately
    pub fn answer(values: &[u32]) -> Self {
        Self::new(Script::Answer(values.to_vec(), Duration::ZERO))
    }

    /// Answer after `delay`
    pub fn answer_after(values: &[u32], delay: Duration) -> Self {
        Self::new(Script::Answer(values.to_vec(), delay))
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

impl DiceSource for Scripted {
    async fn roll(&self, dice: Vec<DieSpec>) -> Result<Vec<u32>, SourceError> {
        self.requests.lock().push(dice);
        match &self.script {
            Script::Answer(values, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(values.clone())
            }
            Script::Fail(delay) => {
                tokio::time::sleep(*delay).await;
                Err(SourceError::Failed("physics engine crashed".to_string()))
            }
            Script::Stall => std::future::pending().await,
            Script::Panic => panic!("physics engine panicked"),
        }
    }
}

/// Captures every cue played
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub cues: Arc<Mutex<Vec<SoundCue>>>,
}

impl Recorder {
    pub fn played(&self) -> Vec<SoundCue> {
        self.cues.lock().clone()
    }
}

impl SoundEffects for Recorder {
    fn play(&self, cue: SoundCue) {
        self.cues.lock().push(cue);
    }
}
