//! Dice notation and scoring
//!
//! Implements the pure half of a roll:
//! - Formula parsing (e.g., "2d6+1d8+5", "4dF+2")
//! - Reduction of raw faces into totals and breakdown text
//! - Critical detection on a lone d20

mod formula;
mod reduce;

pub use formula::{parse, total_dice, DiceGroup, ParsedFormula, DEFAULT_FUDGE_QUANTITY, FUDGE_FACES};
pub use reduce::{classify, reduce, DieType, FudgeFace, RollOutcome, RollResult};
