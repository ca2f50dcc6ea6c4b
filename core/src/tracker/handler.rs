use super::signal::TrackerSignal;

/// Trait for systems that react to tracker signals.
/// Implement this for persistence writers, UI refresh, audio cues, etc.
///
/// Handlers run synchronously on the processing thread, in registration
/// order, after a transition has fully committed. They receive payload
/// snapshots and must stay cheap: no blocking, no re-entry into the session.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &TrackerSignal);

    /// Handle multiple signals (default implementation calls handle_signal for each)
    fn handle_signals(&mut self, signals: &[TrackerSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}
