use super::history::BoundedHistory;
use super::instance::MapInstance;
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Where an XP observation came from. Ladder data is a remote leaderboard
/// feed and lags behind local observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XpSource {
    Ocr,
    Ladder,
    Manual,
}

/// One discrete, timestamped observation of total accumulated experience.
/// Immutable once created; `delta` is settled at insertion and never
/// recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct XpSnapshot {
    pub id: u64,
    pub timestamp: NaiveDateTime,
    pub xp: u64,
    pub delta: i64,
    pub area_level: Option<u32>,
    pub source: XpSource,
    pub encounter_type: Option<String>,
}

/// Result of offering an observation to the ledger. Suppression is an
/// explicit outcome, not a silent nothing: callers that care (tests, debug
/// tooling) can see it, callers that don't just ignore it.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    Recorded(XpSnapshot),
    Suppressed { delta: i64 },
}

/// Ladder reads this far behind a fresher local observation are stale, not
/// an actual XP loss.
const LADDER_REGRESSION_WINDOW_SECS: i64 = 300;

/// How long after instance entry a snapshot may still become the instance's
/// XP baseline.
const BASELINE_GRACE_SECS: i64 = 30;

/// Append-only bounded ledger of XP observations.
///
/// Owns the snapshot history exclusively; the tracker hands in the active
/// instance for attribution but never touches the history itself.
#[derive(Debug, Clone)]
pub struct XpLedger {
    snapshots: BoundedHistory<XpSnapshot>,
    next_snapshot_id: u64,
}

impl XpLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: BoundedHistory::new(capacity),
            next_snapshot_id: 0,
        }
    }

    pub fn newest(&self) -> Option<&XpSnapshot> {
        self.snapshots.newest()
    }

    pub fn history(&self) -> &BoundedHistory<XpSnapshot> {
        &self.snapshots
    }

    /// Record one observation, resolving source conflicts and attributing
    /// gained XP to the active instance.
    pub fn apply(
        &mut self,
        xp: u64,
        timestamp: NaiveDateTime,
        source: XpSource,
        encounter_type: Option<String>,
        current: Option<&mut MapInstance>,
    ) -> SnapshotOutcome {
        let prev = self.snapshots.newest();
        let delta = prev.map(|p| xp as i64 - p.xp as i64).unwrap_or(0);

        // Remote ladder data lags; a regression shortly after a local
        // observation is staleness, not lost XP. Drop it entirely.
        if source == XpSource::Ladder
            && let Some(prev) = prev
            && prev.source != source
            && delta < 0
            && timestamp - prev.timestamp <= TimeDelta::seconds(LADDER_REGRESSION_WINDOW_SECS)
        {
            info!(delta, "skipping ladder XP snapshot regressing a newer local observation");
            return SnapshotOutcome::Suppressed { delta };
        }

        let snapshot = XpSnapshot {
            id: self.next_snapshot_id,
            timestamp,
            xp,
            delta,
            area_level: current.as_deref().map(|map| map.area_level),
            source,
            encounter_type,
        };
        self.next_snapshot_id += 1;
        self.snapshots.push(snapshot.clone());

        if let Some(map) = current {
            if let Some(xp_start) = map.xp_start {
                map.xp_gained = xp as i64 - xp_start as i64;
            } else {
                // Tolerate capturing XP a few seconds after entering without
                // retroactively crediting XP earned before entry.
                let since_entry = timestamp - map.span.start - map.span.idle_time();
                if since_entry <= TimeDelta::seconds(BASELINE_GRACE_SECS) {
                    map.xp_start = Some(xp);
                }
            }
        }

        SnapshotOutcome::Recorded(snapshot)
    }

    /// Restore persisted snapshots (handed over newest-first) and advance
    /// the id counter past everything restored.
    pub fn rehydrate_newest_first<I>(&mut self, newest_first: I)
    where
        I: IntoIterator<Item = XpSnapshot>,
    {
        self.snapshots.rehydrate_newest_first(newest_first);
        self.next_snapshot_id = self
            .snapshots
            .iter()
            .map(|s| s.id + 1)
            .max()
            .unwrap_or(self.next_snapshot_id);
    }
}
