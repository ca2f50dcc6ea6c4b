use crate::tracker::{MapInstance, MapSpan, TrackerError, Waystone, XpSnapshot, XpSource};
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Persisted shape of a [`MapSpan`]: all four instants plus the three idle
/// buckets as whole milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpanRecord {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub area_entered_at: NaiveDateTime,
    pub last_interaction: Option<NaiveDateTime>,
    pub load_ms: i64,
    pub hideout_ms: i64,
    pub pause_ms: i64,
}

impl From<&MapSpan> for MapSpanRecord {
    fn from(span: &MapSpan) -> Self {
        Self {
            start: span.start,
            end: span.end,
            area_entered_at: span.area_entered_at,
            last_interaction: span.last_interaction,
            load_ms: span.load_time().num_milliseconds(),
            hideout_ms: span.hideout_time().num_milliseconds(),
            pause_ms: span.pause_time().num_milliseconds(),
        }
    }
}

impl TryFrom<MapSpanRecord> for MapSpan {
    type Error = TrackerError;

    fn try_from(record: MapSpanRecord) -> Result<Self, Self::Error> {
        MapSpan::from_parts(
            record.start,
            record.end,
            record.area_entered_at,
            record.last_interaction,
            TimeDelta::milliseconds(record.load_ms),
            TimeDelta::milliseconds(record.hideout_ms),
            TimeDelta::milliseconds(record.pause_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInstanceRecord {
    pub id: u64,
    pub span: MapSpanRecord,
    pub area_name: String,
    pub area_level: u32,
    pub seed: u64,
    pub xp_start: Option<u64>,
    pub xp_gained: i64,
    pub xp_per_hour: f64,
    pub waystone: Option<Waystone>,
    pub hideout_start: Option<NaiveDateTime>,
    pub hideout_exit: Option<NaiveDateTime>,
}

impl From<&MapInstance> for MapInstanceRecord {
    fn from(map: &MapInstance) -> Self {
        Self {
            id: map.id,
            span: MapSpanRecord::from(&map.span),
            area_name: map.area_name.clone(),
            area_level: map.area_level,
            seed: map.seed,
            xp_start: map.xp_start,
            xp_gained: map.xp_gained,
            xp_per_hour: map.xp_per_hour,
            waystone: map.waystone.clone(),
            hideout_start: map.hideout_start,
            hideout_exit: map.hideout_exit,
        }
    }
}

impl TryFrom<MapInstanceRecord> for MapInstance {
    type Error = TrackerError;

    fn try_from(record: MapInstanceRecord) -> Result<Self, Self::Error> {
        if record.area_name.trim().is_empty() {
            return Err(TrackerError::EmptyAreaName);
        }
        Ok(Self {
            id: record.id,
            span: MapSpan::try_from(record.span)?,
            area_name: record.area_name,
            area_level: record.area_level,
            seed: record.seed,
            xp_start: record.xp_start,
            xp_gained: record.xp_gained,
            xp_per_hour: record.xp_per_hour,
            waystone: record.waystone,
            hideout_start: record.hideout_start,
            hideout_exit: record.hideout_exit,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpSnapshotRecord {
    pub id: u64,
    pub timestamp: NaiveDateTime,
    pub xp: u64,
    pub delta: i64,
    pub area_level: Option<u32>,
    pub source: XpSource,
    pub encounter_type: Option<String>,
}

impl From<&XpSnapshot> for XpSnapshotRecord {
    fn from(snapshot: &XpSnapshot) -> Self {
        Self {
            id: snapshot.id,
            timestamp: snapshot.timestamp,
            xp: snapshot.xp,
            delta: snapshot.delta,
            area_level: snapshot.area_level,
            source: snapshot.source,
            encounter_type: snapshot.encounter_type.clone(),
        }
    }
}

impl From<XpSnapshotRecord> for XpSnapshot {
    fn from(record: XpSnapshotRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp,
            xp: record.xp,
            delta: record.delta,
            area_level: record.area_level,
            source: record.source,
            encounter_type: record.encounter_type,
        }
    }
}

/// Everything a store hands back at startup. History rows are newest-first,
/// the order rehydration expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub recent_maps: Vec<MapInstanceRecord>,
    pub recent_snapshots: Vec<XpSnapshotRecord>,
    pub current_map: Option<MapInstanceRecord>,
    pub next_waystone: Option<Waystone>,
}
