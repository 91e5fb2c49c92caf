//! Roll session state
//!
//! Holds the single roll in flight and the latest result:
//! - `request_roll` moves the session from idle to rolling
//! - `resolve_roll` reduces raw faces and returns to idle
//!
//! A resolution is only honored when its id matches the pending request,
//! so late answers for superseded rolls are inert.

mod controller;

pub use controller::RollController;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::dice::{parse, reduce, total_dice, DiceGroup, RollResult};
use crate::prefs::UserPreferences;
use crate::skin::{SkinDescriptor, SkinRegistry};

/// Default cap on dice per roll
pub const DEFAULT_MAX_DICE: u32 = 20;

/// Unique id of a roll request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RollId(Uuid);

impl RollId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RollId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "roll-{}", self.0)
    }
}

/// Who may see a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" | "open" => Ok(Visibility::Public),
            "private" | "hidden" | "secret" => Ok(Visibility::Private),
            _ => Err(format!("unknown visibility: {}", s)),
        }
    }
}

/// A roll waiting for raw faces from a dice source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRollRequest {
    pub id: RollId,
    /// Formula exactly as the caller wrote it
    pub formula: String,
    pub groups: Vec<DiceGroup>,
    pub modifier: i64,
    pub is_fudge: bool,
    pub author_name: String,
    pub label: String,
    pub visibility: Visibility,
    /// Cosmetic data for the dice source; not used in scoring
    pub skin: SkinDescriptor,
    pub requested_at: DateTime<Utc>,
}

impl PendingRollRequest {
    /// Number of individual dice requested
    pub fn total_dice(&self) -> u64 {
        total_dice(&self.groups)
    }
}

/// Roll state machine: idle, or rolling with one pending request
#[derive(Debug, Clone)]
pub struct RollSession {
    max_dice: u32,
    pending: Option<PendingRollRequest>,
    last_result: Option<RollResult>,
}

impl Default for RollSession {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DICE)
    }
}

impl RollSession {
    /// Create an idle session with the given dice cap
    pub fn new(max_dice: u32) -> Self {
        Self {
            max_dice,
            pending: None,
            last_result: None,
        }
    }

    /// Start a roll.
    ///
    /// Returns `None` (and changes nothing) when the formula has no dice or
    /// asks for more than the cap. Otherwise any previous pending request is
    /// replaced and a copy of the new one is returned for publication.
    pub fn request_roll(
        &mut self,
        formula: &str,
        label: &str,
        author_name: &str,
        prefs: &UserPreferences,
        skins: &SkinRegistry,
    ) -> Option<PendingRollRequest> {
        let parsed = parse(formula);
        if parsed.is_empty() {
            debug!("Ignoring roll with no dice: {:?}", formula);
            return None;
        }

        let total = parsed.total_dice();
        if total > u64::from(self.max_dice) {
            debug!("Ignoring roll of {} dice (cap {}): {:?}", total, self.max_dice, formula);
            return None;
        }

        if let Some(prev) = &self.pending {
            debug!("Roll {} superseded", prev.id);
        }

        let request = PendingRollRequest {
            id: RollId::new(),
            formula: formula.to_string(),
            groups: parsed.groups,
            modifier: parsed.modifier,
            is_fudge: parsed.is_fudge,
            author_name: author_name.to_string(),
            label: label.to_string(),
            visibility: prefs.visibility,
            skin: skins.get(&prefs.skin_id).descriptor(),
            requested_at: Utc::now(),
        };

        self.pending = Some(request.clone());
        Some(request)
    }

    /// Finish the pending roll with raw faces.
    ///
    /// Returns `None` without touching state when nothing is pending or the
    /// id belongs to another request.
    pub fn resolve_roll(
        &mut self,
        id: RollId,
        raw_values: &[u32],
        approximate: bool,
    ) -> Option<RollResult> {
        let Some(pending) = self.pending.as_ref().filter(|p| p.id == id) else {
            debug!("Ignoring stale resolution for {}", id);
            return None;
        };

        let result = reduce(pending, raw_values, approximate);
        self.pending = None;
        self.last_result = Some(result.clone());
        Some(result)
    }

    /// The roll in flight, if any
    pub fn pending(&self) -> Option<&PendingRollRequest> {
        self.pending.as_ref()
    }

    /// The most recent completed roll
    pub fn last_result(&self) -> Option<&RollResult> {
        self.last_result.as_ref()
    }

    /// Whether a roll is in flight
    pub fn is_rolling(&self) -> bool {
        self.pending.is_some()
    }

    /// Dice cap for a single roll
    pub fn max_dice(&self) -> u32 {
        self.max_dice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::RollOutcome;

    fn request(session: &mut RollSession, formula: &str) -> Option<PendingRollRequest> {
        session.request_roll(
            formula,
            "Attack",
            "Alice",
            &UserPreferences::default(),
            &SkinRegistry::new(),
        )
    }

    #[test]
    fn test_request_sets_pending() {
        let mut session = RollSession::default();
        assert!(!session.is_rolling());

        let pending = request(&mut session, "2d6+1d8+5").unwrap();
        assert!(session.is_rolling());
        assert_eq!(session.pending(), Some(&pending));
        assert_eq!(pending.formula, "2d6+1d8+5");
        assert_eq!(pending.modifier, 5);
        assert_eq!(pending.total_dice(), 3);
        assert_eq!(pending.label, "Attack");
        assert_eq!(pending.author_name, "Alice");
        assert_eq!(pending.visibility, Visibility::Public);
        assert_eq!(pending.skin.skin_id, "default");
    }

    #[test]
    fn test_empty_formula_is_noop() {
        let mut session = RollSession::default();
        assert!(request(&mut session, "").is_none());
        assert!(request(&mut session, "+5").is_none());
        assert!(!session.is_rolling());
    }

    #[test]
    fn test_cap_enforced() {
        let mut session = RollSession::default();
        assert!(request(&mut session, "21d6").is_none());
        assert!(request(&mut session, "10d6+10d8+1d4").is_none());
        assert!(request(&mut session, "6dF+15d6").is_none());
        assert!(!session.is_rolling());

        assert!(request(&mut session, "20d6").is_some());
    }

    #[test]
    fn test_custom_cap() {
        let mut session = RollSession::new(3);
        assert!(request(&mut session, "4d6").is_none());
        assert!(request(&mut session, "3d6").is_some());
        assert_eq!(session.max_dice(), 3);
    }

    #[test]
    fn test_resolve_publishes_result_and_clears_pending() {
        let mut session = RollSession::default();
        let pending = request(&mut session, "1d20").unwrap();

        let result = session.resolve_roll(pending.id, &[20], false).unwrap();
        assert_eq!(result.outcome, RollOutcome::CriticalSuccess);
        assert_eq!(result.id, pending.id);
        assert!(!session.is_rolling());
        assert_eq!(session.last_result(), Some(&result));
    }

    #[test]
    fn test_resolve_only_once() {
        let mut session = RollSession::default();
        let pending = request(&mut session, "1d6").unwrap();

        assert!(session.resolve_roll(pending.id, &[3], false).is_some());
        assert!(session.resolve_roll(pending.id, &[6], false).is_none());
        assert_eq!(session.last_result().unwrap().total, 3);
    }

    #[test]
    fn test_stale_id_ignored() {
        let mut session = RollSession::default();
        let first = request(&mut session, "1d6").unwrap();
        let second = request(&mut session, "1d8").unwrap();
        assert_ne!(first.id, second.id);

        assert!(session.resolve_roll(first.id, &[6], false).is_none());
        assert_eq!(session.pending(), Some(&second));
        assert!(session.last_result().is_none());

        assert!(session.resolve_roll(second.id, &[8], false).is_some());
    }

    #[test]
    fn test_resolve_without_pending() {
        let mut session = RollSession::default();
        assert!(session.resolve_roll(RollId::new(), &[1], false).is_none());
        assert!(session.last_result().is_none());
    }

    #[test]
    fn test_preferences_flow_into_request() {
        let mut session = RollSession::default();
        let prefs = UserPreferences {
            skin_id: "crimson".to_string(),
            visibility: Visibility::Private,
            ..UserPreferences::default()
        };
        let pending = session
            .request_roll("1d6", "", "Bob", &prefs, &SkinRegistry::new())
            .unwrap();
        assert_eq!(pending.visibility, Visibility::Private);
        assert_eq!(pending.skin.skin_id, "crimson");
        assert_eq!(pending.skin.skin_color, "#dc2626");
    }

    #[test]
    fn test_roll_id_display() {
        let id = RollId::new();
        assert!(id.to_string().starts_with("roll-"));
        assert_ne!(id, RollId::new());
    }

    #[test]
    fn test_visibility_from_str() {
        assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
        assert_eq!("private".parse::<Visibility>(), Ok(Visibility::Private));
        assert_eq!("Hidden".parse::<Visibility>(), Ok(Visibility::Private));
        assert!("nope".parse::<Visibility>().is_err());
    }
}
