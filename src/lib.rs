//! dicer - dice formula interpreter and roll session controller
//!
//! Parses tabletop dice notation, hands the dice to a roll source with a
//! watchdog, and scores the faces that come back.

pub mod config;
pub mod dice;
pub mod feedback;
pub mod prefs;
pub mod session;
pub mod skin;
pub mod source;

pub use config::Config;
pub use dice::{parse, RollOutcome, RollResult};
pub use session::{PendingRollRequest, RollController, RollId, RollSession, Visibility};
