//! Roll controller
//!
//! Drives a session against a dice source:
//! - Publishes each pending request on a watch channel
//! - Races the source against a watchdog and falls back to local dice
//! - Supersedes: a new roll aborts the task of the roll before it

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{watch, RwLock};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::{PendingRollRequest, RollId, RollSession};
use crate::config::Config;
use crate::dice::RollResult;
use crate::feedback::{Silent, SoundCue, SoundEffects};
use crate::prefs::UserPreferences;
use crate::skin::SkinRegistry;
use crate::source::{expand, fallback_values, DiceSource, SourceError, WatchdogConfig};

/// State shared between the controller and its roll tasks
struct Shared {
    session: RwLock<RollSession>,
    published: watch::Sender<Option<PendingRollRequest>>,
    sounds: Arc<dyn SoundEffects>,
}

impl Shared {
    /// Withdraw the published request if it is still `id`
    fn unpublish(&self, id: RollId) {
        self.published.send_if_modified(|current| {
            if current.as_ref().is_some_and(|p| p.id == id) {
                *current = None;
                true
            } else {
                false
            }
        });
    }

    fn announce(&self, result: &RollResult, sfx: bool) {
        if !sfx {
            return;
        }
        if result.outcome.is_critical() {
            self.sounds.play(SoundCue::Critical(result.outcome));
        } else {
            self.sounds.play(SoundCue::RollComplete);
        }
    }
}

/// Async front end for a roll session
pub struct RollController<S> {
    shared: Arc<Shared>,
    source: Arc<S>,
    skins: SkinRegistry,
    watchdog: WatchdogConfig,
    prefs: parking_lot::RwLock<UserPreferences>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl<S> std::fmt::Debug for RollController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollController")
            .field("watchdog", &self.watchdog)
            .field("in_flight", &self.in_flight.lock().is_some())
            .finish()
    }
}

impl<S: DiceSource> RollController<S> {
    /// Create a controller with silent sound cues
    pub fn new(source: S, config: &Config) -> Self {
        Self::with_sounds(source, config, Silent)
    }

    /// Create a controller that plays cues through `sounds`
    pub fn with_sounds(source: S, config: &Config, sounds: impl SoundEffects + 'static) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                session: RwLock::new(RollSession::new(config.max_dice)),
                published,
                sounds: Arc::new(sounds),
            }),
            source: Arc::new(source),
            skins: SkinRegistry::new(),
            watchdog: config.watchdog.clone(),
            prefs: parking_lot::RwLock::new(config.preferences.clone()),
            in_flight: Mutex::new(None),
        }
    }

    /// Roll a formula to completion.
    ///
    /// Returns `None` when the formula has nothing to roll, exceeds the dice
    /// cap, or is superseded by a later roll before it finishes.
    pub async fn roll(&self, formula: &str, label: &str, author_name: &str) -> Option<RollResult> {
        let prefs = self.prefs.read().clone();

        // Request, publish and swap the in-flight task under the session
        // lock so concurrent callers cannot interleave.
        let (pending, task) = {
            let mut session = self.shared.session.write().await;
            let pending =
                session.request_roll(formula, label, author_name, &prefs, &self.skins)?;

            let timeout = self.watchdog.timeout_for(pending.total_dice());
            info!(
                "Rolling {} ({}) for {}, watchdog {:?}",
                pending.formula, pending.id, pending.author_name, timeout
            );

            self.shared.published.send_replace(Some(pending.clone()));
            if prefs.enable_sfx {
                self.shared.sounds.play(SoundCue::RollStart);
            }

            let task = tokio::spawn(run_roll(
                self.shared.clone(),
                self.source.clone(),
                pending.clone(),
                timeout,
                prefs.clone(),
            ));
            if let Some(previous) = self.in_flight.lock().replace(task.abort_handle()) {
                previous.abort();
            }
            (pending, task)
        };

        match task.await {
            Ok(Some(result)) => Some(result),
            Ok(None) => self.completed(pending.id).await,
            Err(e) if e.is_cancelled() => {
                debug!("Roll task {} cancelled", pending.id);
                self.completed(pending.id).await
            }
            Err(e) => {
                warn!("Roll task {} failed: {}", pending.id, e);
                self.recover(&pending, prefs.enable_sfx).await
            }
        }
    }

    /// Finish a roll whose task died, using local dice
    async fn recover(&self, pending: &PendingRollRequest, sfx: bool) -> Option<RollResult> {
        let result = {
            let mut session = self.shared.session.write().await;
            let Some(result) = session.resolve_roll(pending.id, &local_values(pending), true)
            else {
                drop(session);
                return self.completed(pending.id).await;
            };
            self.shared.unpublish(pending.id);
            result
        };
        self.shared.announce(&result, sfx);
        Some(result)
    }

    /// Resolve the pending roll from outside, e.g. from a collaborator
    /// watching `subscribe()`. Stale ids are ignored.
    pub async fn resolve(&self, id: RollId, values: &[u32]) -> Option<RollResult> {
        let result = {
            let mut session = self.shared.session.write().await;
            let result = session.resolve_roll(id, values, false)?;
            if let Some(task) = self.in_flight.lock().take() {
                task.abort();
            }
            self.shared.unpublish(id);
            result
        };
        self.shared.announce(&result, self.prefs.read().enable_sfx);
        Some(result)
    }

    /// Watch pending requests as they are published and withdrawn
    pub fn subscribe(&self) -> watch::Receiver<Option<PendingRollRequest>> {
        self.shared.published.subscribe()
    }

    /// The most recent completed roll
    pub async fn last_result(&self) -> Option<RollResult> {
        self.shared.session.read().await.last_result().cloned()
    }

    /// The roll in flight, if any
    pub async fn pending(&self) -> Option<PendingRollRequest> {
        self.shared.session.read().await.pending().cloned()
    }

    /// Whether a roll is in flight
    pub async fn is_rolling(&self) -> bool {
        self.shared.session.read().await.is_rolling()
    }

    /// Current preferences
    pub fn preferences(&self) -> UserPreferences {
        self.prefs.read().clone()
    }

    /// Replace preferences; applies to the next roll
    pub fn set_preferences(&self, prefs: UserPreferences) {
        *self.prefs.write() = prefs;
    }

    /// Result for `id` if some other path already completed it
    async fn completed(&self, id: RollId) -> Option<RollResult> {
        self.shared
            .session
            .read()
            .await
            .last_result()
            .filter(|r| r.id == id)
            .cloned()
    }
}

/// Body of one roll task: gather faces, then resolve if still current
async fn run_roll<S: DiceSource>(
    shared: Arc<Shared>,
    source: Arc<S>,
    pending: PendingRollRequest,
    timeout: Duration,
    prefs: UserPreferences,
) -> Option<RollResult> {
    let (values, approximate) = if prefs.enable_3d {
        gather(source.as_ref(), &pending, timeout).await
    } else {
        (local_values(&pending), false)
    };

    let result = {
        let mut session = shared.session.write().await;
        let result = session.resolve_roll(pending.id, &values, approximate)?;
        shared.unpublish(pending.id);
        result
    };

    info!(
        "Roll {} = {} [{}]{}",
        result.id,
        result.total,
        result.breakdown,
        if result.approximate { " (fallback)" } else { "" }
    );
    shared.announce(&result, prefs.enable_sfx);
    Some(result)
}

/// Race the source against the watchdog. The loser is dropped.
///
/// A panicking source counts as a failed one.
async fn gather<S: DiceSource>(
    source: &S,
    pending: &PendingRollRequest,
    timeout: Duration,
) -> (Vec<u32>, bool) {
    let dice = expand(pending);
    let expected = dice.len();

    let outcome = tokio::select! {
        result = AssertUnwindSafe(source.roll(dice)).catch_unwind() => match result {
            Ok(Ok(values)) if values.len() == expected => Ok(values),
            Ok(Ok(values)) => Err(SourceError::CountMismatch { expected, got: values.len() }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(SourceError::Failed("dice source panicked".to_string())),
        },
        _ = tokio::time::sleep(timeout) => Err(SourceError::TimedOut(timeout)),
    };

    match outcome {
        Ok(values) => (values, false),
        Err(e) => {
            warn!("Roll {} using fallback dice: {}", pending.id, e);
            (local_values(pending), true)
        }
    }
}

fn local_values(pending: &PendingRollRequest) -> Vec<u32> {
    fallback_values(&pending.groups, &mut rand::rng())
}
