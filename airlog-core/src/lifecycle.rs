//! Lifecycle controller for the three periodic tasks.
//!
//! Activation starts the upload schedule immediately; the two sampling
//! schedules are gated on their sensor's one-time initialization handshake,
//! which completes independently and in either order. Shutdown stops all
//! three and is terminal.

use embassy_time::{Duration, Instant};

use crate::schedule::PeriodicTask;

/// CO2 sampling interval.
pub const CO2_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Environmental sampling interval.
pub const ENVIRONMENT_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Telemetry upload interval.
pub const UPLOAD_INTERVAL: Duration = Duration::from_secs(120);

/// Sea-level reference pressure for altitude derivation, in hectopascals.
pub const SEA_LEVEL_PRESSURE_HPA: f32 = 1022.00;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    SensorsInitializing,
    Running,
    /// Terminal; no transition leads back out.
    Unloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    phase: Phase,
    co2_ready: bool,
    environment_ready: bool,
    co2_task: PeriodicTask,
    environment_task: PeriodicTask,
    upload_task: PeriodicTask,
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            co2_ready: false,
            environment_ready: false,
            co2_task: PeriodicTask::new(CO2_SAMPLE_INTERVAL),
            environment_task: PeriodicTask::new(ENVIRONMENT_SAMPLE_INTERVAL),
            upload_task: PeriodicTask::new(UPLOAD_INTERVAL),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// System activation: the upload task starts right away (early fires will
    /// carry empty field values), sensor initialization begins.
    pub fn activate(&mut self, now: Instant) {
        if self.phase != Phase::Uninitialized {
            return;
        }
        self.phase = Phase::SensorsInitializing;
        self.upload_task.start(now);
    }

    /// The ADC finished its continuous-conversion handshake; start sampling.
    /// Ignored after shutdown.
    pub fn co2_sensor_ready(&mut self, now: Instant) {
        if self.phase == Phase::Unloaded {
            return;
        }
        self.co2_ready = true;
        self.co2_task.start(now);
        self.update_phase();
    }

    /// The environmental sensor reported ready; start sampling. Ignored after
    /// shutdown.
    pub fn environment_ready(&mut self, now: Instant) {
        if self.phase == Phase::Unloaded {
            return;
        }
        self.environment_ready = true;
        self.environment_task.start(now);
        self.update_phase();
    }

    fn update_phase(&mut self) {
        if self.phase == Phase::SensorsInitializing && self.co2_ready && self.environment_ready {
            self.phase = Phase::Running;
        }
    }

    /// Teardown: stop all schedules. Idempotent, terminal.
    pub fn shutdown(&mut self) {
        self.co2_task.stop();
        self.environment_task.stop();
        self.upload_task.stop();
        self.phase = Phase::Unloaded;
    }

    pub fn co2_task(&self) -> &PeriodicTask {
        &self.co2_task
    }

    pub fn co2_task_mut(&mut self) -> &mut PeriodicTask {
        &mut self.co2_task
    }

    pub fn environment_task(&self) -> &PeriodicTask {
        &self.environment_task
    }

    pub fn environment_task_mut(&mut self) -> &mut PeriodicTask {
        &mut self.environment_task
    }

    pub fn upload_task(&self) -> &PeriodicTask {
        &self.upload_task
    }

    pub fn upload_task_mut(&mut self) -> &mut PeriodicTask {
        &mut self.upload_task
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ticks: u64) -> Instant {
        Instant::from_ticks(ticks)
    }

    #[test]
    fn activation_starts_only_the_upload_task() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.phase(), Phase::Uninitialized);

        lc.activate(at(0));
        assert_eq!(lc.phase(), Phase::SensorsInitializing);
        assert!(lc.upload_task().is_running());
        assert!(!lc.co2_task().is_running());
        assert!(!lc.environment_task().is_running());
    }

    #[test]
    fn sensors_become_ready_in_either_order() {
        let mut lc = Lifecycle::new();
        lc.activate(at(0));

        lc.environment_ready(at(10));
        assert_eq!(lc.phase(), Phase::SensorsInitializing);
        assert!(lc.environment_task().is_running());
        assert!(!lc.co2_task().is_running());

        lc.co2_sensor_ready(at(20));
        assert_eq!(lc.phase(), Phase::Running);
        assert!(lc.co2_task().is_running());
    }

    #[test]
    fn sensor_readiness_is_independent_of_the_uploader() {
        let mut lc = Lifecycle::new();
        lc.activate(at(0));

        // Sensors come up long before the first upload is due; their
        // schedules start and fire without any upload having happened.
        lc.co2_sensor_ready(at(1));
        lc.environment_ready(at(2));
        assert_eq!(lc.phase(), Phase::Running);
        assert!(lc.co2_task_mut().try_fire(at(1) + CO2_SAMPLE_INTERVAL));
        assert!(
            lc.environment_task_mut()
                .try_fire(at(2) + ENVIRONMENT_SAMPLE_INTERVAL)
        );
        assert_eq!(lc.upload_task().next_fire(), Some(at(0) + UPLOAD_INTERVAL));
    }

    #[test]
    fn partial_readiness_still_samples() {
        let mut lc = Lifecycle::new();
        lc.activate(at(0));
        lc.co2_sensor_ready(at(5));

        // Environment never comes up; CO2 sampling runs regardless.
        assert!(lc.co2_task_mut().try_fire(at(5) + CO2_SAMPLE_INTERVAL));
        assert_eq!(lc.phase(), Phase::SensorsInitializing);
    }

    #[test]
    fn shutdown_stops_everything_and_is_idempotent() {
        let mut lc = Lifecycle::new();
        lc.activate(at(0));
        lc.co2_sensor_ready(at(1));
        lc.environment_ready(at(2));

        lc.shutdown();
        assert_eq!(lc.phase(), Phase::Unloaded);
        assert!(!lc.co2_task().is_running());
        assert!(!lc.environment_task().is_running());
        assert!(!lc.upload_task().is_running());

        // No task fires even after its interval elapses.
        assert!(!lc.upload_task_mut().try_fire(at(0) + UPLOAD_INTERVAL * 2));

        // Calling teardown twice is safe.
        lc.shutdown();
        assert_eq!(lc.phase(), Phase::Unloaded);
    }

    #[test]
    fn readiness_after_shutdown_is_ignored() {
        let mut lc = Lifecycle::new();
        lc.activate(at(0));
        lc.shutdown();

        lc.co2_sensor_ready(at(100));
        lc.environment_ready(at(100));
        assert_eq!(lc.phase(), Phase::Unloaded);
        assert!(!lc.co2_task().is_running());
        assert!(!lc.environment_task().is_running());
    }
}
