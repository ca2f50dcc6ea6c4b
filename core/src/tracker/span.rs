use super::error::TrackerError;
use chrono::{NaiveDateTime, TimeDelta};

/// Time accounting for one instance: start/end plus the three idle buckets.
///
/// All mutation goes through the accumulator methods, which reject negative
/// deltas instead of clamping. Silent clamping would quietly corrupt the
/// XP-per-hour figures derived from active time.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSpan {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    /// Last instant the player entered this instance's area; the load-time
    /// baseline for the post-load marker.
    pub area_entered_at: NaiveDateTime,
    pub last_interaction: Option<NaiveDateTime>,
    load_time: TimeDelta,
    hideout_time: TimeDelta,
    pause_time: TimeDelta,
}

impl MapSpan {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            end: None,
            area_entered_at: start,
            last_interaction: None,
            load_time: TimeDelta::zero(),
            hideout_time: TimeDelta::zero(),
            pause_time: TimeDelta::zero(),
        }
    }

    pub fn load_time(&self) -> TimeDelta {
        self.load_time
    }

    pub fn hideout_time(&self) -> TimeDelta {
        self.hideout_time
    }

    pub fn pause_time(&self) -> TimeDelta {
        self.pause_time
    }

    pub fn idle_time(&self) -> TimeDelta {
        self.load_time + self.hideout_time + self.pause_time
    }

    /// Wall-clock time actively spent in the instance: elapsed minus idle.
    /// Once `end` is set it wins over `now`.
    pub fn active_time(&self, now: NaiveDateTime) -> TimeDelta {
        self.end.unwrap_or(now) - self.start - self.idle_time()
    }

    pub fn add_to_load_time(&mut self, delta: TimeDelta) -> Result<(), TrackerError> {
        if delta < TimeDelta::zero() {
            return Err(TrackerError::NegativeDuration { bucket: "load" });
        }
        self.load_time += delta;
        Ok(())
    }

    pub fn add_to_hideout_time(&mut self, delta: TimeDelta) -> Result<(), TrackerError> {
        if delta < TimeDelta::zero() {
            return Err(TrackerError::NegativeDuration { bucket: "hideout" });
        }
        self.hideout_time += delta;
        Ok(())
    }

    pub fn add_to_pause_time(&mut self, delta: TimeDelta) -> Result<(), TrackerError> {
        if delta < TimeDelta::zero() {
            return Err(TrackerError::NegativeDuration { bucket: "pause" });
        }
        self.pause_time += delta;
        Ok(())
    }

    pub fn set_area_entered_at(&mut self, entered_at: NaiveDateTime) -> Result<(), TrackerError> {
        if entered_at < self.start {
            return Err(TrackerError::EnteredBeforeStart {
                entered_at,
                start: self.start,
            });
        }
        self.area_entered_at = entered_at;
        Ok(())
    }

    pub fn set_last_interaction(&mut self, ts: NaiveDateTime) {
        self.last_interaction = Some(ts);
    }

    pub fn set_end(&mut self, end: NaiveDateTime) -> Result<(), TrackerError> {
        if end < self.start {
            return Err(TrackerError::EndBeforeStart {
                end,
                start: self.start,
            });
        }
        self.end = Some(end);
        Ok(())
    }

    /// Rebuild a span from persisted parts. Bucket values are validated the
    /// same way live accumulation is.
    pub fn from_parts(
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        area_entered_at: NaiveDateTime,
        last_interaction: Option<NaiveDateTime>,
        load_time: TimeDelta,
        hideout_time: TimeDelta,
        pause_time: TimeDelta,
    ) -> Result<Self, TrackerError> {
        let mut span = Self::new(start);
        span.set_area_entered_at(area_entered_at)?;
        span.last_interaction = last_interaction;
        span.add_to_load_time(load_time)?;
        span.add_to_hideout_time(hideout_time)?;
        span.add_to_pause_time(pause_time)?;
        if let Some(end) = end {
            span.set_end(end)?;
        }
        Ok(span)
    }
}
