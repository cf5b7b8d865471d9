//! # Telemetry reporter
//!
//! A background thread which samples the motion controller's pose at a fixed
//! period and writes it to a telemetry sink. The reporter only reads the
//! pose, and a sink failing never affects control: failures are counted and
//! the sampling carries on.
//!
//! The phase status line and the motor diagnostics are written from the
//! control loop instead, since only it has the hardware.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod sinks;
mod status;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use tiger_if::{
    motion::MotionController,
    tlm::{SinkError, TelemetrySink, TlmEvent},
};
use util::time::Clock;

pub use sinks::*;
pub use status::*;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// A warning is given on the first failure and then on every this many
/// consecutive failures.
pub const FAILURE_WARN_INTERVAL: u64 = 100;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to the running reporter thread.
pub struct TlmReporter {
    bg_jh: Option<JoinHandle<TlmStats>>,
    bg_run: Arc<AtomicBool>,
}

/// Takes one pose sample per call and writes it to the sink.
pub struct PoseSampler {
    motion: Arc<dyn MotionController>,
    sink: Box<dyn TelemetrySink>,
    start_ms: u64,
    consecutive_failures: u64,
    stats: TlmStats,
}

/// Statistics of a reporter's run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TlmStats {
    /// Number of pose samples taken.
    pub samples: u64,

    /// Number of samples which could not be fully written to the sink.
    pub sink_failures: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TlmReporterError {
    #[error("Could not start the reporter thread: {0}")]
    SpawnError(std::io::Error),

    #[error("The reporter thread panicked")]
    ThreadPanicked,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TlmReporter {
    /// Start sampling every `period_ms` on a new thread.
    pub fn start(
        motion: Arc<dyn MotionController>,
        sink: Box<dyn TelemetrySink>,
        clock: Arc<dyn Clock>,
        period_ms: u64,
    ) -> Result<Self, TlmReporterError> {
        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_run_clone = bg_run.clone();

        let mut sampler = PoseSampler::new(motion, sink, clock.now_ms());

        let bg_jh = thread::Builder::new()
            .name(String::from("tlm"))
            .spawn(move || {
                while bg_run_clone.load(Ordering::Relaxed) {
                    sampler.sample(clock.now_ms());
                    clock.sleep_ms(period_ms);
                }
                sampler.stats()
            })
            .map_err(TlmReporterError::SpawnError)?;

        info!("Telemetry reporter started, period {} ms", period_ms);

        Ok(Self {
            bg_jh: Some(bg_jh),
            bg_run,
        })
    }

    /// Stop the thread and return its statistics.
    ///
    /// Blocks for up to one period while the thread finishes its sleep.
    pub fn stop(mut self) -> Result<TlmStats, TlmReporterError> {
        self.bg_run.store(false, Ordering::Relaxed);

        let stats = match self.bg_jh.take() {
            Some(jh) => jh.join().map_err(|_| TlmReporterError::ThreadPanicked)?,
            None => TlmStats::default(),
        };

        info!(
            "Telemetry reporter stopped: {} sample(s), {} sink failure(s)",
            stats.samples, stats.sink_failures
        );

        Ok(stats)
    }
}

impl Drop for TlmReporter {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);
        if let Some(jh) = self.bg_jh.take() {
            jh.join().ok();
        }
    }
}

impl PoseSampler {
    pub fn new(
        motion: Arc<dyn MotionController>,
        sink: Box<dyn TelemetrySink>,
        start_ms: u64,
    ) -> Self {
        Self {
            motion,
            sink,
            start_ms,
            consecutive_failures: 0,
            stats: TlmStats::default(),
        }
    }

    /// Sample the pose and write it to the display and the log.
    pub fn sample(&mut self, now_ms: u64) {
        let pose = self.motion.get_pose();
        self.stats.samples += 1;

        let event = TlmEvent::PoseSample {
            elapsed_ms: now_ms.saturating_sub(self.start_ms),
            pose,
        };

        let result = self.write(&[
            format!("X: {:.2}", pose.x),
            format!("Y: {:.2}", pose.y),
            format!("Theta: {:.2}", pose.heading_deg),
        ], &event);

        match result {
            Ok(()) => self.consecutive_failures = 0,
            Err(e) => {
                if self.consecutive_failures % FAILURE_WARN_INTERVAL == 0 {
                    warn!(
                        "Telemetry sink failed ({} consecutive): {}",
                        self.consecutive_failures + 1,
                        e
                    );
                }
                self.consecutive_failures += 1;
                self.stats.sink_failures += 1;
            }
        }
    }

    pub fn stats(&self) -> TlmStats {
        self.stats
    }

    /// Write the lines and the event, attempting all of them even if one
    /// fails.
    fn write(&mut self, lines: &[String], event: &TlmEvent) -> Result<(), SinkError> {
        let mut result = Ok(());

        for (i, text) in lines.iter().enumerate() {
            if let Err(e) = self.sink.display(i as u8, text) {
                result = result.and(Err(e));
            }
        }

        if let Err(e) = self.sink.log(event) {
            result = result.and(Err(e));
        }

        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{profile::test_profile, sim::SimMotion};
    use std::time::Duration;
    use tiger_if::motion::Pose;
    use util::time::{SimClock, SysClock};

    fn sampler() -> (Arc<SimClock>, Arc<SimMotion>, MemSink, PoseSampler) {
        let clock = Arc::new(SimClock::new());
        let motion = Arc::new(SimMotion::new(&test_profile(), clock.clone()));
        let sink = MemSink::new();

        let sampler = PoseSampler::new(motion.clone(), Box::new(sink.clone()), clock.now_ms());

        (clock, motion, sink, sampler)
    }

    #[test]
    fn test_sample() {
        let (clock, motion, sink, mut sampler) = sampler();

        motion.set_pose(Pose::new(1.0, -2.0, 45.0));
        clock.advance_ms(50);
        sampler.sample(clock.now_ms());

        let contents = sink.contents();
        assert_eq!(contents.lines, vec!["X: 1.00", "Y: -2.00", "Theta: 45.00"]);
        assert_eq!(contents.events, vec![TlmEvent::PoseSample {
            elapsed_ms: 50,
            pose: Pose::new(1.0, -2.0, 45.0),
        }]);
        assert_eq!(sampler.stats(), TlmStats { samples: 1, sink_failures: 0 });
    }

    #[test]
    fn test_failures_counted() {
        let (clock, _, sink, mut sampler) = sampler();

        sink.set_failing(true);
        for _ in 0..250 {
            sampler.sample(clock.now_ms());
        }
        sink.set_failing(false);
        sampler.sample(clock.now_ms());

        assert_eq!(sampler.stats(), TlmStats { samples: 251, sink_failures: 250 });
        assert_eq!(sink.contents().events.len(), 1);
    }

    #[test]
    fn test_thread() {
        let clock: Arc<dyn Clock> = Arc::new(SysClock::new());
        let motion = Arc::new(SimMotion::new(&test_profile(), clock.clone()));
        let sink = MemSink::new();
        sink.set_failing(true);

        let reporter = TlmReporter::start(motion, Box::new(sink.clone()), clock, 1).unwrap();
        thread::sleep(Duration::from_millis(50));
        let stats = reporter.stop().unwrap();

        // The reporter keeps going while the sink fails
        assert!(stats.samples > 1);
        assert_eq!(stats.samples, stats.sink_failures);
    }
}
