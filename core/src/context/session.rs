use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{error, warn};

use crate::client_log::{LogEvent, LogParser};
use crate::storage::SessionState;
use crate::tracker::{
    BoundedHistory, InstanceTracker, MapInstance, SignalHandler, SnapshotOutcome, TrackerError,
    TrackerSignal, Waystone, XpSnapshot, XpSource,
};

/// A live tracking session: the instance tracker plus everything the
/// drivers need around it.
///
/// This is the one context object the process constructs at startup and
/// hands to the log tailer, capture triggers, and UI layer. The tracker and
/// ledger inside are single-writer; callers serialize access through the
/// shared session handle, one logical transition per lock acquisition.
pub struct TrackingSession {
    /// Byte offset the live tail resumes from.
    pub current_byte: Option<u64>,
    pub active_file: Option<PathBuf>,
    tracker: InstanceTracker,
    signal_handlers: Vec<Box<dyn SignalHandler + Send + Sync>>,
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self {
            current_byte: None,
            active_file: None,
            tracker: InstanceTracker::new(),
            signal_handlers: Vec::new(),
        }
    }
}

impl TrackingSession {
    pub fn new(path: PathBuf) -> Self {
        Self {
            active_file: Some(path),
            ..Default::default()
        }
    }

    /// Register a signal handler to receive tracker signals
    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler + Send + Sync>) {
        self.signal_handlers.push(handler);
    }

    /// Run one log line through the parser and the state machine, then
    /// dispatch whatever signals the transition produced.
    pub fn process_line(&mut self, line: &str) {
        let Some(event) = LogParser::parse_line(line) else {
            return;
        };

        match event {
            LogEvent::AreaEntered(area) => match self.tracker.enter_area(area) {
                Ok(signals) => self.dispatch_signals(&signals),
                Err(err) => error!(%err, "rejected area event"),
            },
            LogEvent::LoadComplete { timestamp } => {
                let signals = self.tracker.load_complete(timestamp);
                self.dispatch_signals(&signals);
            }
            LogEvent::Interaction { timestamp } => {
                self.tracker.inform_interaction(timestamp);
            }
        }
    }

    pub fn process_lines<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for line in lines {
            self.process_line(line);
        }
    }

    fn dispatch_signals(&mut self, signals: &[TrackerSignal]) {
        for handler in &mut self.signal_handlers {
            handler.handle_signals(signals);
        }
    }

    /// Record an XP observation from OCR, manual debug input, or a ladder
    /// feed. A missing timestamp means "now".
    pub fn apply_xp_snapshot(
        &mut self,
        xp: u64,
        timestamp: Option<NaiveDateTime>,
        source: XpSource,
        encounter_type: Option<String>,
    ) -> SnapshotOutcome {
        let timestamp = timestamp.unwrap_or_else(|| chrono::Local::now().naive_local());
        let (outcome, signals) = self
            .tracker
            .apply_xp_snapshot(xp, timestamp, source, encounter_type);
        self.dispatch_signals(&signals);
        outcome
    }

    pub fn pause(&mut self, ts: NaiveDateTime) {
        self.tracker.pause(ts);
    }

    pub fn unpause(&mut self, ts: NaiveDateTime) {
        if let Err(err) = self.tracker.unpause(ts) {
            warn!(%err, "unpause rejected");
        }
    }

    pub fn inform_interaction(&mut self, ts: NaiveDateTime) {
        self.tracker.inform_interaction(ts);
    }

    pub fn set_next_waystone(&mut self, item: Waystone) {
        self.tracker.set_next_waystone(item);
    }

    // --- Query accessors (read-only views for collaborators) ---

    pub fn current_map(&self) -> Option<&MapInstance> {
        self.tracker.current_map()
    }

    pub fn recent_maps(&self) -> &BoundedHistory<MapInstance> {
        self.tracker.recent_maps()
    }

    pub fn recent_snapshots(&self) -> &BoundedHistory<XpSnapshot> {
        self.tracker.recent_snapshots()
    }

    pub fn in_map(&self) -> bool {
        self.tracker.in_map()
    }

    pub fn in_hideout(&self) -> bool {
        self.tracker.in_hideout()
    }

    /// Restore persisted state on startup. History rows arrive newest-first
    /// and land in the bounded buffers exactly as live operation would have
    /// left them.
    pub fn rehydrate(&mut self, state: SessionState) -> Result<(), TrackerError> {
        let maps = state
            .recent_maps
            .into_iter()
            .map(MapInstance::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        self.tracker.rehydrate_maps(maps);

        self.tracker
            .rehydrate_snapshots(state.recent_snapshots.into_iter().map(XpSnapshot::from));

        if let Some(record) = state.current_map {
            self.tracker.restore_current_map(MapInstance::try_from(record)?);
        }
        if let Some(waystone) = state.next_waystone {
            self.tracker.set_next_waystone(waystone);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MapInstanceRecord;

    fn line(secs: u32, rest: &str) -> String {
        format!("2024/12/26 20:{:02}:{:02} 123 abc {}", secs / 60, secs % 60, rest)
    }

    struct Recorder(std::sync::Arc<std::sync::Mutex<Vec<&'static str>>>);

    impl SignalHandler for Recorder {
        fn handle_signal(&mut self, signal: &TrackerSignal) {
            let name = match signal {
                TrackerSignal::AreaEntered { .. } => "area_entered",
                TrackerSignal::HideoutEntered { .. } => "hideout_entered",
                TrackerSignal::HideoutExited { .. } => "hideout_exited",
                TrackerSignal::MapReentered { .. } => "map_reentered",
                TrackerSignal::MapEntered { .. } => "map_entered",
                TrackerSignal::LoadProgressed { .. } => "load_progressed",
                TrackerSignal::MapCompleted { .. } => "map_completed",
                TrackerSignal::XpSnapshotTaken { .. } => "xp_snapshot",
            };
            self.0.lock().unwrap().push(name);
        }
    }

    #[test]
    fn test_log_lines_drive_state_and_signals() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut session = TrackingSession::default();
        session.add_signal_handler(Box::new(Recorder(seen.clone())));

        session.process_line(&line(0, "Generating level 1 area \"HideoutFelled\""));
        session.process_line(&line(
            10,
            "Generating level 80 area \"MapAugury\" with seed 12345",
        ));
        session.process_line(&line(15, "[SHADER] Delay: 12ms"));
        session.process_line(&line(30, "[INFO Client 1] : You have entered Augury."));
        session.process_line(&line(
            90,
            "Generating level 81 area \"MapVaal\" with seed 99999",
        ));
        session.process_line("not a log line at all");

        let current = session.current_map().unwrap();
        assert_eq!(current.seed, 99999);
        assert_eq!(session.recent_maps().len(), 1);
        let completed = session.recent_maps().newest().unwrap();
        assert_eq!(completed.seed, 12345);
        assert_eq!(
            completed.span.load_time(),
            chrono::TimeDelta::seconds(5)
        );
        assert!(completed.span.last_interaction.is_some());

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                "area_entered",
                "area_entered",
                "map_entered",
                "load_progressed",
                "area_entered",
                "map_completed",
                "map_entered",
            ]
        );
    }

    #[test]
    fn test_rehydrate_round_trips_live_state() {
        let mut session = TrackingSession::default();
        session.process_line(&line(0, "Generating level 80 area \"MapAugury\" with seed 111"));
        session.apply_xp_snapshot(
            1000,
            Some(session.current_map().unwrap().span.start),
            XpSource::Manual,
            None,
        );
        session.process_line(&line(60, "Generating level 81 area \"MapVaal\" with seed 222"));

        let state = SessionState {
            recent_maps: session
                .recent_maps()
                .iter_newest_first()
                .map(MapInstanceRecord::from)
                .collect(),
            recent_snapshots: session
                .recent_snapshots()
                .iter_newest_first()
                .map(crate::storage::XpSnapshotRecord::from)
                .collect(),
            current_map: session.current_map().map(MapInstanceRecord::from),
            next_waystone: None,
        };

        let mut restored = TrackingSession::default();
        restored.rehydrate(state).unwrap();

        assert_eq!(
            restored.current_map().unwrap(),
            session.current_map().unwrap()
        );
        assert_eq!(restored.recent_maps().len(), session.recent_maps().len());
        assert_eq!(
            restored.recent_snapshots().newest().unwrap(),
            session.recent_snapshots().newest().unwrap()
        );
    }
}
