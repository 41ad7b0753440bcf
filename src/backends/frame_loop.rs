// SPDX-License-Identifier: GPL-3.0-only

//! Frame loop: one tick acquires, processes and presents a single frame
//!
//! Ticks are synchronous. [`FrameLoopController`] runs them on a worker thread
//! at a target interval while the mode controller and parameter store stay
//! shared with the UI thread.

use super::{DisplaySink, FrameSource};
use crate::errors::PipelineError;
use crate::mode::ModeController;
use crate::params::ParameterStore;
use crate::pipeline::{PipelineEngine, ProcessedFrame};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Action returned by a loop iteration to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue running the loop
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Instantaneous frame rate from the spacing of consecutive frames
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    prev: Option<Instant>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now`; the first frame reports 0
    pub fn tick(&mut self, now: Instant) -> f64 {
        let fps = match self.prev {
            Some(prev) => {
                let dt = now.saturating_duration_since(prev).as_secs_f64();
                if dt > 0.0 { 1.0 / dt } else { 0.0 }
            }
            None => 0.0,
        };
        self.prev = Some(now);
        fps
    }
}

/// Processed frame handed to the display sink
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub processed: ProcessedFrame,
    /// Measured frame rate at presentation time
    pub fps: f64,
    /// 1-based count of presented frames
    pub sequence: u64,
}

impl FrameReport {
    /// Annotation text: mode, in-effect parameters and FPS
    pub fn status_line(&self) -> String {
        format!("{} | FPS: {:.1}", self.processed.status_line(), self.fps)
    }
}

/// Acquire → process → present, one frame per [`FrameLoop::tick`]
pub struct FrameLoop<S, D> {
    source: S,
    sink: D,
    engine: PipelineEngine,
    modes: Arc<ModeController>,
    params: Arc<ParameterStore>,
    fps: FpsCounter,
    sequence: u64,
}

impl<S: FrameSource, D: DisplaySink> FrameLoop<S, D> {
    pub fn new(
        source: S,
        sink: D,
        modes: Arc<ModeController>,
        params: Arc<ParameterStore>,
    ) -> Self {
        Self {
            source,
            sink,
            engine: PipelineEngine::new(),
            modes,
            params,
            fps: FpsCounter::new(),
            sequence: 0,
        }
    }

    /// Number of frames presented so far
    pub fn presented(&self) -> u64 {
        self.sequence
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Run one frame through the pipeline
    ///
    /// A missing frame is reported as [`PipelineError::InvalidFrame`]; the
    /// caller skips the tick and tries again with the next frame.
    pub fn tick(&mut self) -> Result<LoopAction, PipelineError> {
        let frame = self
            .source
            .next_frame()
            .ok_or(PipelineError::InvalidFrame {
                width: 0,
                height: 0,
            })?;

        let processed = self.engine.run(&frame, &self.modes, &self.params)?;
        let fps = self.fps.tick(Instant::now());
        self.sequence += 1;

        Ok(self.sink.present(FrameReport {
            processed,
            fps,
            sequence: self.sequence,
        }))
    }

    /// Tick with the skip-and-retry policy applied
    ///
    /// Transient frame errors are logged and the loop continues; contract
    /// violations stop it.
    pub fn step(&mut self) -> LoopAction {
        match self.tick() {
            Ok(action) => action,
            Err(e) if e.is_transient() => {
                debug!(source = self.source.name(), error = %e, "Skipping tick");
                LoopAction::Continue
            }
            Err(e) => {
                error!(source = self.source.name(), error = %e, "Frame loop stopped");
                LoopAction::Stop
            }
        }
    }
}

impl<S, D> FrameLoop<S, D>
where
    S: FrameSource + 'static,
    D: DisplaySink + 'static,
{
    /// Move the loop onto a worker thread paced at `interval`
    pub fn spawn(mut self, name: &str, interval: Duration) -> FrameLoopController {
        info!(name, source = self.source.name(), "Spawning frame loop");
        FrameLoopController::start(name, interval, move || self.step())
    }
}

/// Controller for a frame loop running in a separate thread
///
/// Dropping the controller stops the loop and joins the thread.
pub struct FrameLoopController {
    /// Thread handle for joining
    thread_handle: Option<JoinHandle<()>>,
    /// Signal to stop the loop
    stop_signal: Arc<AtomicBool>,
    /// Name for logging
    name: String,
}

impl FrameLoopController {
    /// Start calling `loop_fn` every `interval` until it returns
    /// [`LoopAction::Stop`] or [`FrameLoopController::stop`] is called
    ///
    /// An iteration that overruns the interval is followed immediately by
    /// the next one.
    pub fn start<F>(name: &str, interval: Duration, mut loop_fn: F) -> Self
    where
        F: FnMut() -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, interval_ms = interval.as_millis() as u64, "Starting frame loop");

        let thread_handle = thread::spawn(move || {
            debug!(name = %name_clone, "Frame loop thread started");

            loop {
                if stop_signal_clone.load(Ordering::SeqCst) {
                    debug!(name = %name_clone, "Stop signal received");
                    break;
                }

                let started = Instant::now();
                if loop_fn() == LoopAction::Stop {
                    debug!(name = %name_clone, "Loop requested stop");
                    break;
                }

                let remaining = interval.saturating_sub(started.elapsed());
                if !remaining.is_zero() {
                    thread::sleep(remaining);
                }
            }

            info!(name = %name_clone, "Frame loop thread exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Get a clone of the stop signal, e.g. for a Ctrl-C handler
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting frame loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for frame loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Frame loop thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Frame loop thread finished");
            }
        }
    }
}

impl Drop for FrameLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "FrameLoopController dropped, stopping loop");
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_fps_first_frame_is_zero() {
        let mut fps = FpsCounter::new();
        let t0 = Instant::now();
        assert_eq!(fps.tick(t0), 0.0);
        let rate = fps.tick(t0 + Duration::from_millis(40));
        assert!((rate - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_fps_same_instant_is_zero() {
        let mut fps = FpsCounter::new();
        let t0 = Instant::now();
        fps.tick(t0);
        assert_eq!(fps.tick(t0), 0.0);
    }

    #[test]
    fn test_loop_stops_itself() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller =
            FrameLoopController::start("test-loop", Duration::ZERO, move || {
                let count = counter_clone.fetch_add(1, Ordering::SeqCst);
                if count >= 10 {
                    LoopAction::Stop
                } else {
                    LoopAction::Continue
                }
            });

        controller.join();
        assert_eq!(counter.load(Ordering::SeqCst), 11);
        assert!(!controller.is_running());
    }

    #[test]
    fn test_stop_signal() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller =
            FrameLoopController::start("test-loop", Duration::from_millis(5), move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                LoopAction::Continue
            });

        thread::sleep(Duration::from_millis(50));
        controller.stop();
        assert!(counter.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_interval_paces_iterations() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let controller =
            FrameLoopController::start("test-pacing", Duration::from_millis(20), move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                LoopAction::Continue
            });

        thread::sleep(Duration::from_millis(100));
        drop(controller);
        // ~5 iterations in 100ms; never hundreds
        assert!(counter.load(Ordering::SeqCst) < 20);
    }
}
