use super::error::TrackerError;
use super::history::BoundedHistory;
use super::instance::{MapInstance, Waystone};
use super::ledger::{SnapshotOutcome, XpLedger, XpSnapshot, XpSource};
use super::signal::TrackerSignal;
use crate::client_log::AreaInfo;
use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, warn};

/// An instance whose implied active time crosses this is presumed abandoned
/// without an observed closing transition (client closed mid-session).
const STALE_MAP_THRESHOLD_SECS: i64 = 6 * 60 * 60;

const RECENT_HISTORY_CAPACITY: usize = 100;

/// The area/instance state machine.
///
/// Consumes area-enter events in timestamp order, owns the single
/// current-instance slot and the bounded recent history, and returns the
/// signals each transition produced for the session to dispatch. The
/// normal end of an instance is only ever observed indirectly: the player
/// entering a map with a different seed.
#[derive(Debug)]
pub struct InstanceTracker {
    current: Option<MapInstance>,
    recent_maps: BoundedHistory<MapInstance>,
    ledger: XpLedger,
    next_waystone: Option<Waystone>,
    paused_at: Option<NaiveDateTime>,
    next_map_id: u64,
}

impl Default for InstanceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceTracker {
    pub fn new() -> Self {
        Self {
            current: None,
            recent_maps: BoundedHistory::new(RECENT_HISTORY_CAPACITY),
            ledger: XpLedger::new(RECENT_HISTORY_CAPACITY),
            next_waystone: None,
            paused_at: None,
            next_map_id: 0,
        }
    }

    // --- Accessors ---

    pub fn current_map(&self) -> Option<&MapInstance> {
        self.current.as_ref()
    }

    pub fn recent_maps(&self) -> &BoundedHistory<MapInstance> {
        &self.recent_maps
    }

    pub fn recent_snapshots(&self) -> &BoundedHistory<XpSnapshot> {
        self.ledger.history()
    }

    /// True when the player is not inside an active map: no instance at
    /// all, or the instance sits in its hideout interval.
    pub fn in_hideout(&self) -> bool {
        self.current.as_ref().map(|m| m.in_hideout()).unwrap_or(true)
    }

    pub fn in_map(&self) -> bool {
        !self.in_hideout()
    }

    // --- Transitions ---

    /// Apply one area-enter event. Returns the signals the transition
    /// produced; a rejected event leaves all state untouched.
    pub fn enter_area(&mut self, area: AreaInfo) -> Result<Vec<TrackerSignal>, TrackerError> {
        if area.area_name.trim().is_empty() {
            return Err(TrackerError::EmptyAreaName);
        }

        let mut signals = Vec::new();

        if let Some(current) = &self.current
            && area.timestamp <= current.span.start
            && area.seed != Some(current.seed)
        {
            return Err(TrackerError::ChronologyViolation {
                timestamp: area.timestamp,
                span_start: current.span.start,
            });
        }

        self.close_stale_instance(&area, &mut signals)?;

        signals.push(TrackerSignal::AreaEntered {
            timestamp: area.timestamp,
            area: area.clone(),
        });

        let Some(seed) = area.seed.filter(|&s| s > 1) else {
            // Safe area: hideout/town visits never create instances, they
            // open the active instance's hideout interval.
            if let Some(current) = self.current.as_mut() {
                current.enter_hideout(area.timestamp);
                signals.push(TrackerSignal::HideoutEntered {
                    timestamp: area.timestamp,
                    map: current.clone(),
                });
            }
            return Ok(signals);
        };

        if let Some(current) = self.current.as_mut()
            && current.seed == seed
        {
            // Same instance again: refresh the load baseline, close an open
            // hideout interval. Never a new instance, xp_start untouched.
            current.span.set_area_entered_at(area.timestamp)?;
            if current.in_hideout() {
                current.exit_hideout(area.timestamp)?;
                signals.push(TrackerSignal::HideoutExited {
                    timestamp: area.timestamp,
                    map: current.clone(),
                });
            }
            signals.push(TrackerSignal::MapReentered {
                timestamp: area.timestamp,
                map: current.clone(),
            });
            return Ok(signals);
        }

        // Different seed: the previous instance is over. This can be
        // inaccurate if the player enters a party member's map.
        let xp_start = self.ledger.newest().map(|s| s.xp);
        let map = MapInstance::new(
            self.next_map_id,
            &area,
            seed,
            xp_start,
            self.next_waystone.clone(),
        )?;

        let previous = if self.current.is_some() {
            self.complete_current(area.timestamp, &mut signals)?
        } else {
            None
        };
        self.next_map_id += 1;
        self.next_waystone = None;
        self.current = Some(map.clone());
        signals.push(TrackerSignal::MapEntered {
            timestamp: area.timestamp,
            map,
            previous: previous.map(Box::new),
        });
        Ok(signals)
    }

    /// Stale-instance detection: a different-seed event whose implied
    /// active time crosses the threshold means the active instance was
    /// abandoned without a closing transition. Resolve a best-effort end
    /// time and finalize before continuing.
    fn close_stale_instance(
        &mut self,
        area: &AreaInfo,
        signals: &mut Vec<TrackerSignal>,
    ) -> Result<(), TrackerError> {
        let Some(current) = &self.current else {
            return Ok(());
        };
        if area.seed == Some(current.seed)
            || current.span.active_time(area.timestamp)
                <= TimeDelta::seconds(STALE_MAP_THRESHOLD_SECS)
        {
            return Ok(());
        }

        // End-time priority: hideout entry if the player idled out there,
        // else the last interaction, else the incoming timestamp.
        let end_time = if let Some(hideout_start) = current.hideout_start {
            hideout_start
        } else if let Some(last) = current.span.last_interaction
            && last >= current.span.start
        {
            last
        } else {
            warn!(
                map = %current.area_name,
                seed = current.seed,
                "unable to determine stale instance end time, using incoming event timestamp"
            );
            area.timestamp
        };

        self.complete_current(end_time, signals)?;
        Ok(())
    }

    /// Finalize and clear the current instance. Logged no-op when there is
    /// none. Returns the finalized instance for callers that chain it into
    /// their own signal payloads.
    fn complete_current(
        &mut self,
        end_time: NaiveDateTime,
        signals: &mut Vec<TrackerSignal>,
    ) -> Result<Option<MapInstance>, TrackerError> {
        let Some(current) = self.current.as_mut() else {
            debug!("complete called without an active instance");
            return Ok(None);
        };

        current.finalize(end_time, self.ledger.newest().map(|s| s.xp))?;

        let completed = self.current.take();
        if let Some(completed) = &completed {
            self.recent_maps.push(completed.clone());
            signals.push(TrackerSignal::MapCompleted {
                timestamp: end_time,
                map: completed.clone(),
            });
        }
        Ok(completed)
    }

    /// Post-load marker: the interval since the last area entry was spent
    /// loading, not playing. Negative deltas are a clock/ordering anomaly,
    /// published but discarded from accounting.
    pub fn load_complete(&mut self, timestamp: NaiveDateTime) -> Vec<TrackerSignal> {
        let Some(current) = self.current.as_mut() else {
            return Vec::new();
        };

        let load_delta = timestamp - current.span.area_entered_at;
        if load_delta >= TimeDelta::zero() {
            // non-negative delta cannot fail accumulation
            let _ = current.span.add_to_load_time(load_delta);
        } else {
            warn!(?load_delta, "negative load delta discarded");
        }
        vec![TrackerSignal::LoadProgressed {
            timestamp,
            load_delta,
        }]
    }

    /// Evidence that the player is still at the controls. Only meaningful
    /// while actually in a map.
    pub fn inform_interaction(&mut self, ts: NaiveDateTime) {
        if self.in_map()
            && let Some(current) = self.current.as_mut()
        {
            current.span.set_last_interaction(ts);
        }
    }

    /// Start a pause interval (e.g. the game window lost focus). Idempotent
    /// while already paused; only armed while in a map.
    pub fn pause(&mut self, ts: NaiveDateTime) {
        if self.in_map() && self.paused_at.is_none() {
            self.paused_at = Some(ts);
        }
    }

    /// Close an open pause interval. While in a map the elapsed interval
    /// counts as pause time; if the instance moved into its hideout
    /// meanwhile, only the stretch before the hideout entry counts (the
    /// rest is already hideout time).
    pub fn unpause(&mut self, ts: NaiveDateTime) -> Result<(), TrackerError> {
        let Some(paused_at) = self.paused_at.take() else {
            debug!("unpause without an open pause");
            return Ok(());
        };

        if self.in_map() {
            if let Some(current) = self.current.as_mut() {
                current.span.add_to_pause_time(ts - paused_at)?;
            }
        } else if let Some(current) = self.current.as_mut()
            && let Some(hideout_start) = current.hideout_start
            && hideout_start > paused_at
        {
            current.span.add_to_pause_time(hideout_start - paused_at)?;
        }
        Ok(())
    }

    /// Stage an item reference consumed by the next created instance.
    pub fn set_next_waystone(&mut self, item: Waystone) {
        self.next_waystone = Some(item);
    }

    pub fn next_waystone(&self) -> Option<&Waystone> {
        self.next_waystone.as_ref()
    }

    /// Record one XP observation. The outcome is explicit so debug tooling
    /// can distinguish a suppressed ladder read from a recorded snapshot.
    pub fn apply_xp_snapshot(
        &mut self,
        xp: u64,
        timestamp: NaiveDateTime,
        source: XpSource,
        encounter_type: Option<String>,
    ) -> (SnapshotOutcome, Vec<TrackerSignal>) {
        let outcome = self
            .ledger
            .apply(xp, timestamp, source, encounter_type, self.current.as_mut());

        let mut signals = Vec::new();
        if let SnapshotOutcome::Recorded(snapshot) = &outcome {
            signals.push(TrackerSignal::XpSnapshotTaken {
                timestamp: snapshot.timestamp,
                snapshot: snapshot.clone(),
            });
        }
        (outcome, signals)
    }

    // --- Rehydration (startup restore from persisted state) ---

    pub fn rehydrate_maps<I>(&mut self, newest_first: I)
    where
        I: IntoIterator<Item = MapInstance>,
    {
        self.recent_maps.rehydrate_newest_first(newest_first);
        self.next_map_id = self
            .recent_maps
            .iter()
            .map(|m| m.id + 1)
            .max()
            .unwrap_or(self.next_map_id);
    }

    pub fn rehydrate_snapshots<I>(&mut self, newest_first: I)
    where
        I: IntoIterator<Item = XpSnapshot>,
    {
        self.ledger.rehydrate_newest_first(newest_first);
    }

    /// Restore an instance that was active when the process last exited.
    pub fn restore_current_map(&mut self, map: MapInstance) {
        self.next_map_id = self.next_map_id.max(map.id + 1);
        self.current = Some(map);
    }
}
