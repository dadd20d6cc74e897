//! Progress Notification Surface
//!
//! The pipeline reports coarse progress through a small sink trait so
//! that external front ends can display stage and step counters. Events
//! are purely informational: the sink cannot pause or cancel the
//! computation, and the pipeline's results are returned as values, not
//! delivered through callbacks.
//!
//! Three event kinds, matching the reference protocol:
//!
//! - `advance_stage`: the pipeline moved to its next stage
//! - `set_stage_steps`: total step count for the current stage
//! - `progress`: steps completed so far within the current stage

/// Sink for progress events emitted during [`crate::pipeline::compute`].
///
/// Implementations must be callable from the thread running the
/// computation; the default implementations of nothing are provided so
/// sinks can implement only what they display.
pub trait ProgressSink: Send + Sync {
    /// The pipeline advanced to the next stage.
    fn advance_stage(&self) {}

    /// Total number of steps in the current stage.
    fn set_stage_steps(&self, _steps: usize) {}

    /// Number of steps completed so far in the current stage.
    fn progress(&self, _amount: usize) {}
}

/// Sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// Sink that forwards events to `tracing` at debug level, in the same
/// line-oriented shape the reference console printed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn advance_stage(&self) {
        tracing::debug!("STAGE");
    }

    fn set_stage_steps(&self, steps: usize) {
        tracing::debug!(steps, "STEPS_IN_STAGE");
    }

    fn progress(&self, amount: usize) {
        tracing::debug!(amount, "PROGRESS");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test sink counting events, used by pipeline tests.
    #[derive(Debug, Default)]
    pub(crate) struct CountingProgress {
        pub stages: AtomicUsize,
        pub ticks: AtomicUsize,
    }

    impl ProgressSink for CountingProgress {
        fn advance_stage(&self) {
            self.stages.fetch_add(1, Ordering::Relaxed);
        }

        fn progress(&self, _amount: usize) {
            self.ticks.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_noop_accepts_all_events() {
        let sink = NoopProgress;
        sink.advance_stage();
        sink.set_stage_steps(10);
        sink.progress(3);
    }

    #[test]
    fn test_counting_sink() {
        let sink = CountingProgress::default();
        sink.advance_stage();
        sink.advance_stage();
        sink.progress(1);
        assert_eq!(sink.stages.load(Ordering::Relaxed), 2);
        assert_eq!(sink.ticks.load(Ordering::Relaxed), 1);
    }
}
