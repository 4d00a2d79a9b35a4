//! Periodic task bookkeeping.
//!
//! A `PeriodicTask` tracks the schedule of one repeating fire: created
//! stopped, anchored when started, re-anchored on every fire. The embassy
//! tasks in the binary sleep until `next_fire` and then `try_fire`; the state
//! machine itself is time-driver-free so it can be tested with synthetic
//! instants.

use embassy_time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    interval: Duration,
    running: bool,
    last_fire: Option<Instant>,
}

impl PeriodicTask {
    /// A new task in the stopped state.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
            last_fire: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start (or restart) the schedule, anchored at `now`. The first fire is
    /// due one interval later; a restart resumes from the restart time, not
    /// from any earlier anchor.
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.last_fire = Some(now);
    }

    /// Cancel all future fires. A stopped task never fires again without an
    /// explicit restart; an in-flight fire body is unaffected.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// When the next fire is due, or `None` while stopped.
    pub fn next_fire(&self) -> Option<Instant> {
        if !self.running {
            return None;
        }
        let anchor = self.last_fire.unwrap_or(Instant::from_ticks(0));
        Some(anchor + self.interval)
    }

    /// Fire if running and due. Records the fire time on success, so the
    /// following fire is due one interval after `now`.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        match self.next_fire() {
            Some(due) if now >= due => {
                self.last_fire = Some(now);
                true
            }
            _ => false,
        }
    }
}
