use super::error::TrackerError;
use super::span::MapSpan;
use crate::client_log::AreaInfo;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Item reference staged for the next created instance. Produced by an
/// external collaborator (clipboard parsing); the tracker only carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waystone {
    pub name: String,
    pub base_type: String,
    pub rarity: String,
    pub item_level: Option<u32>,
    pub tier: Option<u32>,
    pub corrupted: bool,
}

/// One play session inside a generated map instance, identified by seed.
///
/// Created by the tracker when a genuinely new seed is entered, mutated
/// while active, finalized exactly once, then treated as immutable history.
#[derive(Debug, Clone, PartialEq)]
pub struct MapInstance {
    pub id: u64,
    pub span: MapSpan,
    pub area_name: String,
    pub area_level: u32,
    pub seed: u64,
    /// XP baseline at instance entry. Set once, either from the newest
    /// ledger snapshot at creation or via the grace-period rule.
    pub xp_start: Option<u64>,
    /// Signed: dying loses experience.
    pub xp_gained: i64,
    pub xp_per_hour: f64,
    pub waystone: Option<Waystone>,
    pub hideout_start: Option<NaiveDateTime>,
    pub hideout_exit: Option<NaiveDateTime>,
}

impl MapInstance {
    pub fn new(
        id: u64,
        area: &AreaInfo,
        seed: u64,
        xp_start: Option<u64>,
        waystone: Option<Waystone>,
    ) -> Result<Self, TrackerError> {
        if area.area_name.trim().is_empty() {
            return Err(TrackerError::EmptyAreaName);
        }
        Ok(Self {
            id,
            span: MapSpan::new(area.timestamp),
            area_name: area.area_name.clone(),
            area_level: area.area_level,
            seed,
            xp_start,
            xp_gained: 0,
            xp_per_hour: 0.0,
            waystone,
            hideout_start: None,
            hideout_exit: None,
        })
    }

    pub fn in_hideout(&self) -> bool {
        self.hideout_start.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.span.end.is_some()
    }

    pub fn enter_hideout(&mut self, ts: NaiveDateTime) {
        self.hideout_start = Some(ts);
        self.hideout_exit = None;
    }

    /// Close an open hideout interval, folding the elapsed time into the
    /// span's hideout bucket. No-op on the bucket if none is open.
    pub fn exit_hideout(&mut self, ts: NaiveDateTime) -> Result<(), TrackerError> {
        if let Some(hideout_start) = self.hideout_start {
            self.span.add_to_hideout_time(ts - hideout_start)?;
        }
        self.hideout_start = None;
        self.hideout_exit = Some(ts);
        Ok(())
    }

    /// Finalize the instance: close any open hideout interval, settle the
    /// XP fields against the newest observed total, and set the end time.
    ///
    /// Validates before mutating, so a rejected end time leaves the
    /// instance exactly as it was.
    pub(crate) fn finalize(
        &mut self,
        end_time: NaiveDateTime,
        xp_end: Option<u64>,
    ) -> Result<(), TrackerError> {
        if end_time < self.span.start {
            return Err(TrackerError::EndBeforeStart {
                end: end_time,
                start: self.span.start,
            });
        }
        if let Some(hideout_start) = self.hideout_start
            && end_time < hideout_start
        {
            return Err(TrackerError::NegativeDuration { bucket: "hideout" });
        }

        if self.in_hideout() {
            self.exit_hideout(end_time)?;
        }
        self.xp_gained = match (xp_end, self.xp_start) {
            (Some(end), Some(start)) => end as i64 - start as i64,
            _ => 0,
        };
        self.span.set_end(end_time)?;

        let active_secs = self.span.active_time(end_time).num_milliseconds() as f64 / 1000.0;
        self.xp_per_hour = if active_secs > 0.0 {
            self.xp_gained as f64 / active_secs * 3600.0
        } else {
            0.0
        };
        Ok(())
    }

    /// Human-facing label: the internal `Map` prefix stripped and the
    /// CamelCase name split into words (`MapHiddenGrotto` -> `Hidden Grotto`).
    pub fn display_name(&self) -> String {
        let name = self
            .area_name
            .strip_prefix("Map")
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&self.area_name);

        let mut label = String::with_capacity(name.len() + 4);
        for ch in name.chars() {
            if ch == '_' {
                if !label.ends_with(' ') {
                    label.push(' ');
                }
                continue;
            }
            if ch.is_ascii_uppercase() && !label.is_empty() && !label.ends_with(' ') {
                label.push(' ');
            }
            label.push(ch);
        }
        label
    }
}
