// SPDX-License-Identifier: GPL-3.0-only

//! Display sinks for processed frames

use super::{DisplaySink, FrameReport, LoopAction};
use futures::channel::mpsc;
use tracing::{debug, info, trace};

/// Forwards reports to a UI thread over a bounded channel
///
/// When the consumer lags the newest frame is dropped rather than blocking
/// the loop. A closed receiver stops the loop.
pub struct ChannelSink {
    sender: mpsc::Sender<FrameReport>,
    dropped: u64,
}

impl ChannelSink {
    /// Sink plus the receiving end for the UI
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<FrameReport>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender, dropped: 0 }, receiver)
    }

    /// Frames discarded because the consumer was behind
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl DisplaySink for ChannelSink {
    fn present(&mut self, report: FrameReport) -> LoopAction {
        match self.sender.try_send(report) {
            Ok(()) => LoopAction::Continue,
            Err(e) if e.is_disconnected() => {
                debug!("Display channel closed");
                LoopAction::Stop
            }
            Err(_) => {
                self.dropped += 1;
                trace!(dropped = self.dropped, "Display lagging, frame dropped");
                LoopAction::Continue
            }
        }
    }
}

/// Headless sink: counts frames and logs the annotation periodically
pub struct LogSink {
    presented: u64,
    limit: Option<u64>,
    log_every: u64,
    last_status: Option<String>,
}

impl LogSink {
    /// Stop after `limit` frames when set; log one status line every `log_every`
    pub fn new(limit: Option<u64>, log_every: u64) -> Self {
        Self {
            presented: 0,
            limit,
            log_every: log_every.max(1),
            last_status: None,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Annotation of the most recent frame
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }
}

impl DisplaySink for LogSink {
    fn present(&mut self, report: FrameReport) -> LoopAction {
        self.presented += 1;
        let status = report.status_line();
        if report.sequence % self.log_every == 1 || self.log_every == 1 {
            info!(sequence = report.sequence, "{}", status);
        }
        self.last_status = Some(status);

        match self.limit {
            Some(limit) if self.presented >= limit => LoopAction::Stop,
            _ => LoopAction::Continue,
        }
    }
}
