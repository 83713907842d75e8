//! Background polling task
//!
//! Samples the session at a fixed interval on a dedicated thread and hands
//! the results to the control thread over a channel. The poller never
//! touches presentation state; it only sends [`Tagged`] events.
//!
//! Every event carries the generation the session had when it was sampled,
//! so the control thread can drop events that were produced before a seek or
//! stop but delivered after it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::events::{RenderEvent, SessionEvent};

/// Default sampling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default time to wait for a poller to exit before detaching it.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_millis(1000);

/// Result of one sample of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// Nothing observable changed
    Idle,
    /// Something changed and should be displayed
    Render(RenderEvent),
    /// Playback ran out; the poller exits after reporting it
    Finished,
}

/// A session event stamped with the generation it was sampled under.
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged {
    pub generation: u64,
    pub event: SessionEvent,
}

/// Handle to a running polling thread.
///
/// Dropping the handle stops the thread (bounded by the join timeout).
pub struct Poller {
    stop_tx: Option<Sender<()>>,
    done_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
    join_timeout: Duration,
}

impl Poller {
    /// Spawn a polling thread. The first sample is taken one interval after
    /// spawning.
    ///
    /// # Arguments
    /// * `interval` - Time between samples
    /// * `join_timeout` - How long `shutdown` waits for the thread to exit
    /// * `generation` - Session generation at spawn time
    /// * `sample` - Called once per tick; returns the current generation and
    ///   what changed
    /// * `events_tx` - Where events are delivered
    pub fn spawn<F>(
        interval: Duration,
        join_timeout: Duration,
        generation: u64,
        sample: F,
        events_tx: Sender<Tagged>,
    ) -> std::io::Result<Self>
    where
        F: FnMut() -> (u64, Sample) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("srtp-poller".to_string())
            .spawn(move || {
                poll_loop(interval, generation, sample, &events_tx, &stop_rx);
                // Ignore send errors (nobody is waiting)
                let _ = done_tx.send(());
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            done_rx,
            handle: Some(handle),
            join_timeout,
        })
    }

    /// Whether the thread has exited on its own (after end of media or a
    /// failed sample).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |handle| handle.is_finished())
    }

    /// Signal the thread to stop and wait for it.
    ///
    /// Returns `false` when the thread did not exit within the join timeout;
    /// it is then detached and will exit on its next wake-up.
    pub fn shutdown(mut self) -> bool {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };
        // Dropping the sender wakes the thread out of its sleep
        self.stop_tx.take();

        match self.done_rx.recv_timeout(self.join_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = self.join_timeout.as_millis() as u64,
                    "Poller did not exit in time, detaching"
                );
                false
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn poll_loop<F>(
    interval: Duration,
    mut generation: u64,
    mut sample: F,
    events_tx: &Sender<Tagged>,
    stop_rx: &Receiver<()>,
) where
    F: FnMut() -> (u64, Sample),
{
    loop {
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }

        let (finished, event) = match panic::catch_unwind(AssertUnwindSafe(&mut sample)) {
            Ok((current, outcome)) => {
                generation = current;
                match outcome {
                    Sample::Idle => (false, None),
                    Sample::Render(render) => (false, Some(SessionEvent::Render(render))),
                    Sample::Finished => (true, Some(SessionEvent::EndOfMedia)),
                }
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::warn!(%reason, "Poll failed");
                // Reported under the last generation seen
                (true, Some(SessionEvent::PollFailed { reason }))
            }
        };

        if let Some(event) = event {
            if events_tx.send(Tagged { generation, event }).is_err() {
                // Receiver gone, nobody to report to
                return;
            }
        }
        if finished {
            return;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
