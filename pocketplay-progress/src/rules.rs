//! Pure rule evaluation over the latest statistics snapshot.

use crate::catalog::{ACHIEVEMENTS, AchievementDef};
use crate::daily::DailyExtras;
use crate::ledger::EarnedMap;
use crate::stats::StatsSnapshot;

/// Evaluate the full catalog against `snapshot` and `extras`, skipping ids
/// already present in `earned`, and return every newly qualified entry as
/// one batch in catalog order.
///
/// Deterministic and side-effect free: identical inputs always produce the
/// identical batch. Nothing is unlocked here; callers merge the result into
/// the ledger, which re-checks presence at merge time.
#[must_use]
pub fn evaluate(
    snapshot: &StatsSnapshot,
    extras: Option<&DailyExtras>,
    earned: &EarnedMap,
) -> Vec<&'static AchievementDef> {
    ACHIEVEMENTS
        .iter()
        .filter(|def| !earned.contains_key(def.id))
        .filter(|def| (def.predicate)(snapshot, extras))
        .collect()
}
