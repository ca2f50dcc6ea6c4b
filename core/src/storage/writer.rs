//! Persistence hook: a signal handler forwarding tracker events to a store.

use super::error::StorageError;
use super::records::{MapInstanceRecord, SessionState, XpSnapshotRecord};
use crate::tracker::{SignalHandler, TrackerSignal};
use tracing::error;

/// Call contract of the external persistence engine.
///
/// Implementations own durability entirely; the core only promises to call
/// these with finalized, self-contained records.
pub trait TrackerStore {
    /// Persist a finalized instance.
    fn save_map(&mut self, map: &MapInstanceRecord) -> Result<(), StorageError>;

    /// Persist one ledger snapshot.
    fn save_snapshot(&mut self, snapshot: &XpSnapshotRecord) -> Result<(), StorageError>;

    /// Upsert the currently active instance (crash recovery).
    fn save_current_map(&mut self, map: &MapInstanceRecord) -> Result<(), StorageError>;

    /// State handed back at startup, history rows newest-first.
    fn load_state(&mut self) -> Result<SessionState, StorageError>;
}

/// Writes tracker state through a [`TrackerStore`] as signals arrive.
/// Failures are logged, never propagated into the tracking path.
pub struct StoreWriter<S> {
    store: S,
}

impl<S: TrackerStore> StoreWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: TrackerStore> SignalHandler for StoreWriter<S> {
    fn handle_signal(&mut self, signal: &TrackerSignal) {
        let result = match signal {
            TrackerSignal::MapCompleted { map, .. } => {
                self.store.save_map(&MapInstanceRecord::from(map))
            }
            TrackerSignal::MapEntered { map, .. } => {
                self.store.save_current_map(&MapInstanceRecord::from(map))
            }
            TrackerSignal::XpSnapshotTaken { snapshot, .. } => {
                self.store.save_snapshot(&XpSnapshotRecord::from(snapshot))
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            error!(%err, "failed to persist tracker state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TrackingSession;
    use crate::tracker::XpSource;
    use std::sync::{Arc, Mutex};

    /// Stand-in for the external engine: rows newest-first, like a real
    /// store's `ORDER BY ... DESC` queries.
    #[derive(Default, Clone)]
    struct MemoryStore {
        inner: Arc<Mutex<SessionState>>,
    }

    impl TrackerStore for MemoryStore {
        fn save_map(&mut self, map: &MapInstanceRecord) -> Result<(), StorageError> {
            self.inner.lock().unwrap().recent_maps.insert(0, map.clone());
            Ok(())
        }

        fn save_snapshot(&mut self, snapshot: &XpSnapshotRecord) -> Result<(), StorageError> {
            self.inner
                .lock()
                .unwrap()
                .recent_snapshots
                .insert(0, snapshot.clone());
            Ok(())
        }

        fn save_current_map(&mut self, map: &MapInstanceRecord) -> Result<(), StorageError> {
            self.inner.lock().unwrap().current_map = Some(map.clone());
            Ok(())
        }

        fn load_state(&mut self) -> Result<SessionState, StorageError> {
            Ok(self.inner.lock().unwrap().clone())
        }
    }

    #[test]
    fn test_store_writer_persists_and_rehydrates() {
        let mut store = MemoryStore::default();
        let mut session = TrackingSession::default();
        session.add_signal_handler(Box::new(StoreWriter::new(store.clone())));

        session.process_line(
            "2024/12/26 20:00:00 1 a Generating level 80 area \"MapAugury\" with seed 111",
        );
        let entry_ts = session.current_map().unwrap().span.start;
        session.apply_xp_snapshot(1000, Some(entry_ts), XpSource::Manual, None);
        session.process_line(
            "2024/12/26 20:10:00 1 a Generating level 81 area \"MapVaal\" with seed 222",
        );

        let state = store.load_state().unwrap();
        assert_eq!(state.recent_maps.len(), 1);
        assert_eq!(state.recent_snapshots.len(), 1);
        assert_eq!(state.current_map.as_ref().map(|m| m.seed), Some(222));

        let mut restored = TrackingSession::default();
        restored.rehydrate(state).unwrap();
        assert_eq!(restored.current_map().map(|m| m.seed), Some(222));
        assert_eq!(
            restored.recent_maps().newest().map(|m| (m.seed, m.xp_gained)),
            Some((111, 0))
        );
        assert_eq!(restored.recent_snapshots().newest().unwrap().xp, 1000);
    }
}
