//! Read-only view of the daily-challenge collaborator's document.

use crate::storage::read_doc;
use crate::{DAILY_KEY, ProgressStore};
use serde::{Deserialize, Serialize};

/// Side-channel inputs for streak-gated rules, owned by the daily-challenge
/// subsystem and read here at evaluation time only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyExtras {
    /// Length of the current consecutive-day completion streak.
    #[serde(default)]
    pub streak: u32,
    /// Count of distinct days ever completed.
    #[serde(default)]
    pub completed_days: u32,
}

/// Read the collaborator's document. Absent or corrupt storage yields
/// `None`; predicates treat that as "not satisfied", never as an error.
/// Unknown fields in the document are ignored.
#[must_use]
pub fn read_daily_extras<S: ProgressStore>(store: &S) -> Option<DailyExtras> {
    read_doc(store, DAILY_KEY)
}
