//! Dice sources
//!
//! Provides:
//! - `DiceSource`: the collaborator that physically rolls dice
//! - Fallback generation when a source stalls or fails
//! - Watchdog timeouts that grow with the number of dice
//! - `Tumbler`: a simulated source with a settle delay

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dice::DiceGroup;
use crate::session::PendingRollRequest;

/// One physical die handed to a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieSpec {
    /// Sides on the die
    pub faces: u32,
    /// Body colour from the roll's skin
    pub color: String,
}

/// Errors a dice source can report
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("dice source failed: {0}")]
    Failed(String),

    #[error("dice source returned {got} values for {expected} dice")]
    CountMismatch { expected: usize, got: usize },

    #[error("dice source did not answer within {0:?}")]
    TimedOut(Duration),
}

/// Something that rolls dice and reports faces in the order given.
///
/// A source may fail or never finish; callers race it against a watchdog.
pub trait DiceSource: Send + Sync + 'static {
    fn roll(
        &self,
        dice: Vec<DieSpec>,
    ) -> impl Future<Output = Result<Vec<u32>, SourceError>> + Send;
}

/// Flatten a request into one entry per die, groups in order
pub fn expand(pending: &PendingRollRequest) -> Vec<DieSpec> {
    pending
        .groups
        .iter()
        .flat_map(|group| {
            std::iter::repeat_with(|| DieSpec {
                faces: group.faces,
                color: pending.skin.skin_color.clone(),
            })
            .take(group.quantity as usize)
        })
        .collect()
}

/// Uniform faces in `[1, faces]`, `quantity` per group, groups in order
pub fn fallback_values<R: Rng + ?Sized>(groups: &[DiceGroup], rng: &mut R) -> Vec<u32> {
    let mut values = Vec::new();
    for group in groups {
        let faces = group.faces.max(1);
        for _ in 0..group.quantity {
            values.push(rng.random_range(1..=faces));
        }
    }
    values
}

/// One watchdog step: rolls of up to `max_dice` wait `timeout_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogStep {
    pub max_dice: u32,
    pub timeout_ms: u64,
}

/// Watchdog configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Steps checked in ascending `max_dice` order
    pub steps: Vec<WatchdogStep>,
    /// Timeout for rolls larger than every step (default: 10s)
    pub ceiling_ms: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            steps: vec![
                WatchdogStep { max_dice: 4, timeout_ms: 3_000 },
                WatchdogStep { max_dice: 8, timeout_ms: 5_000 },
                WatchdogStep { max_dice: 12, timeout_ms: 7_000 },
            ],
            ceiling_ms: 10_000,
        }
    }
}

impl WatchdogConfig {
    /// How long to wait for a source rolling `total_dice` dice.
    ///
    /// Never shorter than the timeout for fewer dice, even if steps are
    /// misordered in config.
    pub fn timeout_for(&self, total_dice: u64) -> Duration {
        let mut steps = self.steps.clone();
        steps.sort_by_key(|s| s.max_dice);

        let mut floor = 0;
        for step in &steps {
            floor = floor.max(step.timeout_ms);
            if total_dice <= u64::from(step.max_dice) {
                return Duration::from_millis(floor);
            }
        }
        Duration::from_millis(floor.max(self.ceiling_ms))
    }
}

/// Tumbler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TumblerConfig {
    /// Time for thrown dice to settle (default: 1.2s)
    pub settle_ms: u64,
}

impl Default for TumblerConfig {
    fn default() -> Self {
        Self { settle_ms: 1_200 }
    }
}

/// Simulated physics: waits for dice to settle, then reads uniform faces
#[derive(Debug, Clone)]
pub struct Tumbler {
    settle: Duration,
}

impl Tumbler {
    pub fn new(config: &TumblerConfig) -> Self {
        Self {
            settle: Duration::from_millis(config.settle_ms),
        }
    }
}

impl DiceSource for Tumbler {
    async fn roll(&self, dice: Vec<DieSpec>) -> Result<Vec<u32>, SourceError> {
        tokio::time::sleep(self.settle).await;
        let mut rng = rand::rng();
        Ok(dice
            .iter()
            .map(|d| rng.random_range(1..=d.faces.max(1)))
            .collect())
    }
}

/// A source that never answers. Every roll ends on the watchdog.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stalled;

impl DiceSource for Stalled {
    async fn roll(&self, _dice: Vec<DieSpec>) -> Result<Vec<u32>, SourceError> {
        std::future::pending().await
    }
}
