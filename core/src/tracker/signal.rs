use super::instance::MapInstance;
use super::ledger::XpSnapshot;
use crate::client_log::AreaInfo;
use chrono::{NaiveDateTime, TimeDelta};

/// Signals emitted by the instance tracker for cross-cutting concerns:
/// persistence, UI refresh, audio cues. Every payload is an owned snapshot
/// of the entity at emission time, never a live reference.
#[derive(Debug, Clone)]
pub enum TrackerSignal {
    /// Any recognized area-enter line, map or safe area alike.
    AreaEntered {
        timestamp: NaiveDateTime,
        area: AreaInfo,
    },

    /// The active instance's player stepped into a hideout/town.
    HideoutEntered {
        timestamp: NaiveDateTime,
        map: MapInstance,
    },
    HideoutExited {
        timestamp: NaiveDateTime,
        map: MapInstance,
    },

    /// Re-entry into the already-active instance (same seed).
    MapReentered {
        timestamp: NaiveDateTime,
        map: MapInstance,
    },

    /// A genuinely new instance became active. `previous` is the instance
    /// that was finalized to make room, if any.
    MapEntered {
        timestamp: NaiveDateTime,
        map: MapInstance,
        previous: Option<Box<MapInstance>>,
    },

    /// Post-load marker observed. `load_delta` is the raw interval since
    /// the last area entry; negative deltas are published but not
    /// accumulated.
    LoadProgressed {
        timestamp: NaiveDateTime,
        load_delta: TimeDelta,
    },

    /// An instance was finalized, by an observed transition or the stale
    /// heuristic.
    MapCompleted {
        timestamp: NaiveDateTime,
        map: MapInstance,
    },

    /// A new XP observation entered the ledger.
    XpSnapshotTaken {
        timestamp: NaiveDateTime,
        snapshot: XpSnapshot,
    },
}

impl TrackerSignal {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::AreaEntered { timestamp, .. }
            | Self::HideoutEntered { timestamp, .. }
            | Self::HideoutExited { timestamp, .. }
            | Self::MapReentered { timestamp, .. }
            | Self::MapEntered { timestamp, .. }
            | Self::LoadProgressed { timestamp, .. }
            | Self::MapCompleted { timestamp, .. }
            | Self::XpSnapshotTaken { timestamp, .. } => *timestamp,
        }
    }
}
