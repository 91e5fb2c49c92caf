//! Dice formula parsing
//!
//! Parses notation like "2d6+1d8+5", "4dF+2", "d20". Parsing is lenient:
//! malformed terms are dropped or read as 0, never reported.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Quantity used when a Fudge term omits it ("dF" means "4dF")
pub const DEFAULT_FUDGE_QUANTITY: u32 = 4;

/// Physical die used to roll Fudge dice
pub const FUDGE_FACES: u32 = 6;

/// One homogeneous cluster of dice within a formula, e.g. "3d6"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceGroup {
    /// Number of dice in the group
    pub quantity: u32,
    /// Sides per die (always 6 for Fudge dice)
    pub faces: u32,
    /// Whether faces are read as Fudge symbols instead of numbers
    pub fudge: bool,
}

impl DiceGroup {
    /// Create a standard numeric group
    pub fn standard(quantity: u32, faces: u32) -> Self {
        Self { quantity, faces, fudge: false }
    }

    /// Create a Fudge/Fate group
    pub fn fudge(quantity: u32) -> Self {
        Self { quantity, faces: FUDGE_FACES, fudge: true }
    }

    /// Check if this is a single standard d20
    pub fn is_single_d20(&self) -> bool {
        !self.fudge && self.quantity == 1 && self.faces == 20
    }
}

impl fmt::Display for DiceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fudge {
            write!(f, "{}dF", self.quantity)
        } else {
            write!(f, "{}d{}", self.quantity, self.faces)
        }
    }
}

/// A formula decomposed into dice groups and a flat modifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFormula {
    /// Dice groups in the order they were written
    pub groups: Vec<DiceGroup>,
    /// Sum of all plain integer terms
    pub modifier: i64,
    /// True iff any group uses Fudge notation
    pub is_fudge: bool,
}

impl ParsedFormula {
    /// Total number of individual dice across all groups
    pub fn total_dice(&self) -> u64 {
        total_dice(&self.groups)
    }

    /// Check if there is nothing to roll
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Display for ParsedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for group in &self.groups {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", group)?;
            first = false;
        }
        if self.modifier != 0 || first {
            // "-" is not an operator, so a negative modifier is its own term
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", self.modifier)?;
        }
        Ok(())
    }
}

/// Number of individual dice across `groups`
pub fn total_dice(groups: &[DiceGroup]) -> u64 {
    groups.iter().map(|g| u64::from(g.quantity)).sum()
}

/// Parse a dice formula. Never fails.
pub fn parse(formula: &str) -> ParsedFormula {
    let normalized: String = formula
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let mut parsed = ParsedFormula::default();
    if normalized.is_empty() {
        return parsed;
    }

    for term in normalized.split('+') {
        if let Some((qty, _)) = term.split_once("df") {
            let quantity = positive(qty).unwrap_or(DEFAULT_FUDGE_QUANTITY);
            parsed.groups.push(DiceGroup::fudge(quantity));
            parsed.is_fudge = true;
        } else if let Some((qty, faces)) = term.split_once('d') {
            // "d6" means "1d6"; a bad face count drops the group
            let quantity = positive(qty).unwrap_or(1);
            if let Some(faces) = positive(faces) {
                parsed.groups.push(DiceGroup::standard(quantity, faces));
            }
        } else {
            parsed.modifier = parsed
                .modifier
                .saturating_add(leading_int(term).unwrap_or(0));
        }
    }

    parsed
}

/// Read the longest `[+-]?[0-9]+` prefix, saturating on overflow
fn leading_int(s: &str) -> Option<i64> {
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

/// Leading integer as a positive u32 (saturating), or None
fn positive(s: &str) -> Option<u32> {
    leading_int(s)
        .filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}
