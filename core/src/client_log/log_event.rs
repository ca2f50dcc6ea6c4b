use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One recognized area-enter line from the client log.
///
/// Instance seeds of 0/1 (or no seed at all) are persistent safe areas:
/// towns and hideouts. Everything above 1 is a generated map instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaInfo {
    pub timestamp: NaiveDateTime,
    pub area_level: u32,
    pub area_name: String,
    pub seed: Option<u64>,
}

impl AreaInfo {
    pub fn is_map(&self) -> bool {
        matches!(self.seed, Some(seed) if seed > 1)
    }
}

/// Structured output of the line parser.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    AreaEntered(AreaInfo),
    /// The shader/load-delay marker the client writes once an area finished
    /// loading. Closes the loading interval opened by the last area enter.
    LoadComplete { timestamp: NaiveDateTime },
    /// Any other line carrying a valid timestamp. Only consumed as
    /// interaction evidence while an instance is active.
    Interaction { timestamp: NaiveDateTime },
}

impl LogEvent {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::AreaEntered(area) => area.timestamp,
            Self::LoadComplete { timestamp } | Self::Interaction { timestamp } => *timestamp,
        }
    }
}
