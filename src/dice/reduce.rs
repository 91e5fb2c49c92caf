//! Roll reduction
//!
//! Folds raw die faces into a scored result:
//! - Standard dice add their face value
//! - Fudge dice map 1-2 to -1, 3-4 to 0, 5-6 to +1
//! - A lone d20 showing 20 or 1 is a critical success or failure

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::formula::DiceGroup;
use crate::session::{PendingRollRequest, RollId, Visibility};

/// Categorical outcome of a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RollOutcome {
    #[default]
    Neutral,
    CriticalSuccess,
    CriticalFailure,
}

impl RollOutcome {
    /// Check if this is either kind of critical
    pub fn is_critical(&self) -> bool {
        !matches!(self, RollOutcome::Neutral)
    }
}

/// What kind of dice produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieType {
    /// Every group used this many faces
    Faces(u32),
    /// Every group was Fudge
    Fudge,
    /// Groups had different kinds or face counts
    Mixed,
}

impl DieType {
    /// Classify a list of groups
    pub fn of(groups: &[DiceGroup]) -> DieType {
        let mut kinds = groups.iter().map(|g| (g.fudge, g.faces));
        let Some(first) = kinds.next() else {
            return DieType::Mixed;
        };
        if kinds.any(|k| k != first) {
            return DieType::Mixed;
        }
        match first {
            (true, _) => DieType::Fudge,
            (false, faces) => DieType::Faces(faces),
        }
    }
}

/// A Fudge die face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FudgeFace {
    Minus,
    Blank,
    Plus,
}

impl FudgeFace {
    /// Map a six-sided face to its Fudge symbol
    pub fn from_raw(value: u32) -> Self {
        match value {
            0..=2 => FudgeFace::Minus,
            3..=4 => FudgeFace::Blank,
            _ => FudgeFace::Plus,
        }
    }

    /// Contribution to the total
    pub fn value(&self) -> i64 {
        match self {
            FudgeFace::Minus => -1,
            FudgeFace::Blank => 0,
            FudgeFace::Plus => 1,
        }
    }

    /// Symbol used in breakdown text
    pub fn symbol(&self) -> char {
        match self {
            FudgeFace::Minus => '-',
            FudgeFace::Blank => '0',
            FudgeFace::Plus => '+',
        }
    }
}

/// Final, immutable record of a completed roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Id of the request this result completed
    pub id: RollId,
    pub total: i64,
    pub formula: String,
    /// Human-readable arithmetic, e.g. "(3 + 5 + 7) + 2 = 17"
    pub breakdown: String,
    pub outcome: RollOutcome,
    pub author_name: String,
    pub label: String,
    pub visibility: Visibility,
    pub die_type: DieType,
    /// Raw faces in dice order
    pub values: Vec<u32>,
    /// True when values came from the fallback generator
    pub approximate: bool,
}

/// Reduce raw faces for a pending request into a result.
///
/// Values are consumed positionally, group by group. The count is trusted:
/// missing values contribute nothing and extras are ignored.
pub fn reduce(pending: &PendingRollRequest, raw: &[u32], approximate: bool) -> RollResult {
    let mut remaining = raw;
    let mut sum: i64 = 0;
    // Adjacent groups of the same kind share one segment
    let mut segments: Vec<(bool, Vec<String>)> = Vec::new();

    for group in &pending.groups {
        let take = (group.quantity as usize).min(remaining.len());
        let (faces, rest) = remaining.split_at(take);
        remaining = rest;

        let text: Vec<String> = if group.fudge {
            let symbols: Vec<FudgeFace> = faces.iter().map(|v| FudgeFace::from_raw(*v)).collect();
            sum += symbols.iter().map(FudgeFace::value).sum::<i64>();
            symbols.iter().map(|s| s.symbol().to_string()).collect()
        } else {
            sum += faces.iter().map(|v| i64::from(*v)).sum::<i64>();
            faces.iter().map(u32::to_string).collect()
        };

        match segments.last_mut() {
            Some((fudge, run)) if *fudge == group.fudge => run.extend(text),
            _ => segments.push((group.fudge, text)),
        }
    }

    let total = sum.saturating_add(pending.modifier);
    let used = raw.len() - remaining.len();

    let mut breakdown = segments
        .iter()
        .map(|(fudge, run)| {
            if *fudge {
                format!("[{}]", run.join(" "))
            } else {
                format!("({})", run.join(" + "))
            }
        })
        .collect::<Vec<_>>()
        .join(" + ");
    if pending.modifier > 0 {
        let _ = write!(breakdown, " + {}", pending.modifier);
    } else if pending.modifier < 0 {
        let _ = write!(breakdown, " - {}", pending.modifier.unsigned_abs());
    }
    let _ = write!(breakdown, " = {}", total);

    RollResult {
        id: pending.id,
        total,
        formula: pending.formula.clone(),
        breakdown,
        outcome: classify(&pending.groups, &raw[..used]),
        author_name: pending.author_name.clone(),
        label: pending.label.clone(),
        visibility: pending.visibility,
        die_type: DieType::of(&pending.groups),
        values: raw[..used].to_vec(),
        approximate,
    }
}

/// Natural 20/1 on a single standard d20 is critical; anything else is neutral
pub fn classify(groups: &[DiceGroup], values: &[u32]) -> RollOutcome {
    match (groups, values) {
        ([group], [value]) if group.is_single_d20() => match *value {
            20 => RollOutcome::CriticalSuccess,
            1 => RollOutcome::CriticalFailure,
            _ => RollOutcome::Neutral,
        },
        _ => RollOutcome::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::parse;
    use crate::session::RollSession;
    use crate::prefs::UserPreferences;
    use crate::skin::SkinRegistry;

    fn pending(formula: &str) -> PendingRollRequest {
        let mut session = RollSession::default();
        session
            .request_roll(
                formula,
                "test",
                "tester",
                &UserPreferences::default(),
                &SkinRegistry::new(),
            )
            .expect("formula should produce a request")
    }

    #[test]
    fn test_fudge_mapping() {
        assert_eq!(FudgeFace::from_raw(1).value(), -1);
        assert_eq!(FudgeFace::from_raw(2).value(), -1);
        assert_eq!(FudgeFace::from_raw(3).value(), 0);
        assert_eq!(FudgeFace::from_raw(4).value(), 0);
        assert_eq!(FudgeFace::from_raw(5).value(), 1);
        assert_eq!(FudgeFace::from_raw(6).value(), 1);
    }

    #[test]
    fn test_fudge_total() {
        let result = reduce(&pending("4dF"), &[1, 3, 5, 6], false);
        assert_eq!(result.total, 1);
        assert_eq!(result.breakdown, "[- 0 + +] = 1");
        assert_eq!(result.die_type, DieType::Fudge);
        assert_eq!(result.outcome, RollOutcome::Neutral);
    }

    #[test]
    fn test_fudge_with_modifier() {
        let result = reduce(&pending("4dF+2"), &[1, 1, 2, 4], false);
        assert_eq!(result.total, -1);
        assert_eq!(result.breakdown, "[- - - 0] + 2 = -1");
    }

    #[test]
    fn test_standard_sum() {
        let result = reduce(&pending("2d6+1d8+5"), &[3, 5, 7], false);
        assert_eq!(result.total, 20);
        assert_eq!(result.breakdown, "(3 + 5 + 7) + 5 = 20");
        assert_eq!(result.die_type, DieType::Mixed);
        assert_eq!(result.values, vec![3, 5, 7]);
    }

    #[test]
    fn test_standard_without_modifier() {
        let result = reduce(&pending("3d6"), &[1, 2, 3], false);
        assert_eq!(result.total, 6);
        assert_eq!(result.breakdown, "(1 + 2 + 3) = 6");
        assert_eq!(result.die_type, DieType::Faces(6));
    }

    #[test]
    fn test_negative_modifier() {
        let result = reduce(&pending("1d8+-3"), &[2], false);
        assert_eq!(result.total, -1);
        assert_eq!(result.breakdown, "(2) - 3 = -1");
    }

    #[test]
    fn test_mixed_fudge_and_standard_scored_per_group() {
        let result = reduce(&pending("4dF+2d6+1"), &[6, 6, 1, 3, 6, 6], false);
        // +1 +1 -1 0, then 6 + 6, then +1
        assert_eq!(result.total, 14);
        assert_eq!(result.breakdown, "[+ + - 0] + (6 + 6) + 1 = 14");
    }

    #[test]
    fn test_breakdown_splits_only_between_kinds() {
        let result = reduce(&pending("1d4+2dF+1dF+1d6+1d8"), &[2, 1, 6, 3, 5, 7], false);
        assert_eq!(result.breakdown, "(2) + [- + 0] + (5 + 7) = 14");

        let result = reduce(&pending("1d20+1d20+-1"), &[20, 1], false);
        assert_eq!(result.breakdown, "(20 + 1) - 1 = 20");
    }

    #[test]
    fn test_critical_success_and_failure() {
        let result = reduce(&pending("1d20+5"), &[20], false);
        assert_eq!(result.outcome, RollOutcome::CriticalSuccess);
        assert_eq!(result.total, 25);

        let result = reduce(&pending("d20"), &[1], false);
        assert_eq!(result.outcome, RollOutcome::CriticalFailure);

        let result = reduce(&pending("d20"), &[19], false);
        assert_eq!(result.outcome, RollOutcome::Neutral);
    }

    #[test]
    fn test_multi_d20_never_critical() {
        for values in [[20, 20], [1, 1], [20, 1]] {
            let result = reduce(&pending("2d20"), &values, false);
            assert_eq!(result.outcome, RollOutcome::Neutral);
        }
        let result = reduce(&pending("1d20+1d20"), &[20, 20], false);
        assert_eq!(result.outcome, RollOutcome::Neutral);
    }

    #[test]
    fn test_fudge_never_critical() {
        let result = reduce(&pending("1dF"), &[6], false);
        assert_eq!(result.outcome, RollOutcome::Neutral);
    }

    #[test]
    fn test_reduce_is_pure() {
        let request = pending("2d6+1d8+5");
        let a = reduce(&request, &[4, 4, 8], true);
        let b = reduce(&request, &[4, 4, 8], true);
        assert_eq!(a, b);
        assert!(a.approximate);
    }

    #[test]
    fn test_short_and_long_value_lists() {
        let request = pending("3d6");
        let short = reduce(&request, &[2, 2], false);
        assert_eq!(short.total, 4);
        let long = reduce(&request, &[1, 1, 1, 6, 6], false);
        assert_eq!(long.total, 3);
        assert_eq!(long.values, vec![1, 1, 1]);
    }

    #[test]
    fn test_die_type_of() {
        assert_eq!(DieType::of(&parse("2d6+1d6").groups), DieType::Faces(6));
        assert_eq!(DieType::of(&parse("2dF+dF").groups), DieType::Fudge);
        assert_eq!(DieType::of(&parse("1d6+1d8").groups), DieType::Mixed);
        assert_eq!(DieType::of(&[]), DieType::Mixed);
    }
}
