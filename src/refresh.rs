use std::time::{Duration, Instant};
use tracing::debug;

use crate::actions::{Notification, Notifier};

/// A refresh that shows an in-progress indicator for a fixed duration.
/// No I/O happens; the list is already live. Requests made while a refresh
/// is running are ignored, and a running refresh cannot be cancelled.
#[derive(Debug, Clone)]
pub struct RefreshState {
    delay: Duration,
    started_at: Option<Instant>,
}

impl RefreshState {
    pub fn new(delay: Duration) -> Self {
        Self { delay, started_at: None }
    }

    pub fn is_refreshing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Begin a refresh. Returns false if one is already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        debug!(delay_ms = self.delay.as_millis() as u64, "refresh started");
        self.started_at = Some(now);
        true
    }

    /// Finish the refresh once the delay has elapsed, emitting the
    /// "Refreshed" notification. Returns true on the tick that finished it.
    pub fn poll<N: Notifier + ?Sized>(&mut self, now: Instant, notifier: &mut N) -> bool {
        match self.started_at {
            Some(started) if now.saturating_duration_since(started) >= self.delay => {
                self.started_at = None;
                notifier.notify(Notification::refreshed());
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_after_delay() {
        let mut refresh = RefreshState::new(Duration::from_millis(1000));
        let mut notes = Vec::new();
        let t0 = Instant::now();

        assert!(refresh.start(t0));
        assert!(refresh.is_refreshing());
        assert!(!refresh.poll(t0 + Duration::from_millis(999), &mut notes));
        assert!(notes.is_empty());

        assert!(refresh.poll(t0 + Duration::from_millis(1000), &mut notes));
        assert!(!refresh.is_refreshing());
        assert_eq!(notes, vec![Notification::refreshed()]);
    }

    #[test]
    fn ignores_requests_while_running() {
        let mut refresh = RefreshState::new(Duration::from_millis(500));
        let mut notes = Vec::new();
        let t0 = Instant::now();

        assert!(refresh.start(t0));
        assert!(!refresh.start(t0 + Duration::from_millis(100)));
        assert!(refresh.poll(t0 + Duration::from_millis(500), &mut notes));
        assert_eq!(notes.len(), 1);
        assert!(!refresh.poll(t0 + Duration::from_millis(600), &mut notes));
        assert!(refresh.start(t0 + Duration::from_millis(700)));
    }
}
