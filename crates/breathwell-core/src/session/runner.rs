//! Async heartbeat driver for a [`BreathingSession`].
//!
//! Owns exactly one tokio task. The task wakes on a fixed interval, measures
//! the real time since the previous beat and feeds it to
//! [`BreathingSession::advance`]. All access to the session goes through one
//! async mutex. Stopping, shutting down or dropping the runner aborts the
//! task, so no tick can touch the session afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::controller::{BreathingSession, SessionState};
use crate::error::CoreError;
use crate::events::Event;
use crate::storage::KvStore;

struct Shared<S> {
    session: BreathingSession<S>,
    last_beat: Instant,
}

impl<S: KvStore> Shared<S> {
    /// Credit the session with time since the last beat.
    fn flush_elapsed(&mut self) -> Vec<Event> {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last_beat);
        self.last_beat = now;
        self.session.advance(dt)
    }
}

pub struct SessionRunner<S> {
    shared: Arc<Mutex<Shared<S>>>,
    tx: mpsc::UnboundedSender<Event>,
    handle: Option<JoinHandle<()>>,
}

impl<S: KvStore + Send + 'static> SessionRunner<S> {
    /// Start driving an already started session.
    ///
    /// Returns the runner and the stream of events it produces. The task
    /// exits on its own after forwarding `SessionCompleted`.
    pub fn spawn(
        session: BreathingSession<S>,
        period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(Shared {
            session,
            last_beat: Instant::now(),
        }));

        let task_shared = Arc::clone(&shared);
        let task_tx = tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let events = {
                    let mut guard = task_shared.lock().await;
                    guard.flush_elapsed()
                };
                let done = events.iter().any(Event::is_completion);
                for event in events {
                    if task_tx.send(event).is_err() {
                        tracing::debug!("event receiver dropped");
                    }
                }
                if done {
                    tracing::debug!("heartbeat task finished");
                    break;
                }
            }
        });

        (
            Self {
                shared,
                tx,
                handle: Some(handle),
            },
            rx,
        )
    }

    fn forward(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            let _ = self.tx.send(event);
        }
    }

    pub async fn state(&self) -> SessionState {
        self.shared.lock().await.session.state()
    }

    pub async fn snapshot(&self) -> Event {
        self.shared.lock().await.session.snapshot()
    }

    /// Pause, counting the partial interval before the pause.
    ///
    /// If that interval runs the session out, it completes instead and the
    /// heartbeat is halted.
    pub async fn pause(&mut self) -> bool {
        let mut guard = self.shared.lock().await;
        let mut events = guard.flush_elapsed();
        let paused = guard.session.pause();
        let applied = paused.is_some();
        events.extend(paused);
        drop(guard);
        if events.iter().any(Event::is_completion) {
            self.halt().await;
        }
        self.forward(events);
        applied
    }

    /// Resume; the paused span is never credited to the session.
    pub async fn resume(&self) -> bool {
        let mut guard = self.shared.lock().await;
        guard.last_beat = Instant::now();
        let resumed = guard.session.resume();
        drop(guard);
        let applied = resumed.is_some();
        self.forward(resumed);
        applied
    }

    /// End the session early, record it and halt the heartbeat.
    pub async fn stop(&mut self) {
        let mut guard = self.shared.lock().await;
        let mut events = guard.flush_elapsed();
        events.extend(guard.session.stop());
        drop(guard);
        self.halt().await;
        self.forward(events);
    }

    /// Halt the heartbeat and hand the session back to the caller.
    ///
    /// # Errors
    /// Fails only if the session is still shared after the task ended.
    pub async fn shutdown(mut self) -> Result<BreathingSession<S>, CoreError> {
        self.halt().await;
        let shared = Arc::clone(&self.shared);
        drop(self);
        match Arc::try_unwrap(shared) {
            Ok(mutex) => Ok(mutex.into_inner().session),
            Err(_) => Err(CoreError::Custom(
                "session still in use by heartbeat task".into(),
            )),
        }
    }
}

impl<S> SessionRunner<S> {
    /// Abort the task and wait until it has released the session.
    async fn halt(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            // Cancellation is the expected outcome here.
            let _ = handle.await;
        }
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl<S> Drop for SessionRunner<S> {
    fn drop(&mut self) {
        self.abort();
    }
}
