// src/watch/controller.rs

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::resource::Resource;

use super::session::{Change, WatchSession};
use super::{Notification, StopReason, WatchSettings, WatchState};

/// Starts and stops watch sessions.
///
/// While watching, a background task owns the [`WatchSession`] and drives it
/// from two timers:
/// - the poll timer (`watch_interval`) takes a snapshot and checks it;
/// - the idle timer is armed for the first instant the session counts as
///   idle and re-armed whenever a change moves `last_update`; when it fires
///   the session ends.
///
/// Snapshot reads and sampling run on the blocking pool. The session record
/// is moved into the blocking closure and handed back when it finishes, and
/// the next tick is not looked at before that, so two ticks never run at the
/// same time.
///
/// Dropping the controller cancels the active session.
pub struct WatchController {
    notify_tx: mpsc::Sender<Notification>,
    active: Option<ActiveWatch>,
}

struct ActiveWatch {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    watching: Arc<AtomicBool>,
    description: String,
}

impl fmt::Debug for WatchController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchController")
            .field("state", &self.state())
            .field(
                "resource",
                &self.active.as_ref().map(|a| a.description.as_str()),
            )
            .finish_non_exhaustive()
    }
}

impl WatchController {
    pub fn new(notify_tx: mpsc::Sender<Notification>) -> Self {
        Self {
            notify_tx,
            active: None,
        }
    }

    /// Start watching `resource`, replacing any active session.
    ///
    /// The initial timestamp and baseline are captured before this returns;
    /// if that first read fails the controller stays idle and the error is
    /// returned.
    pub async fn start<R: Resource>(&mut self, resource: Arc<R>, settings: WatchSettings) -> Result<()> {
        self.stop().await;

        let description = resource.describe();
        let now = Instant::now();
        let session = {
            let resource = Arc::clone(&resource);
            tokio::task::spawn_blocking(move || {
                let snapshot = resource.snapshot()?;
                WatchSession::start(settings.sampler, settings.max_delta, &snapshot, now)
            })
            .await
            .map_err(|err| anyhow::anyhow!("baseline capture task failed: {err}"))??
        };

        info!(
            resource = %description,
            block_size = settings.sampler.block_size,
            sample_count = settings.sampler.sample_count,
            interval_ms = settings.watch_interval.as_millis() as u64,
            max_delta_ms = settings.max_delta.as_millis() as u64,
            "started watching"
        );

        let watching = Arc::new(AtomicBool::new(true));
        let (stop_tx, stop_rx) = oneshot::channel();

        let watch_loop = WatchLoop {
            resource,
            settings,
            notify_tx: self.notify_tx.clone(),
            watching: Arc::clone(&watching),
            stop_rx,
        };
        let handle = tokio::spawn(watch_loop.run(session));

        self.active = Some(ActiveWatch {
            stop_tx,
            handle,
            watching,
            description,
        });
        Ok(())
    }

    /// Stop the active session, if any, and wait for its task to exit.
    ///
    /// A tick that is still reading when this is called is abandoned; its
    /// result is discarded. A notification still waiting for room in the
    /// channel is dropped as well.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        active.watching.store(false, Ordering::SeqCst);
        // Err means the loop already ended on its own.
        let _ = active.stop_tx.send(());
        if let Err(err) = active.handle.await {
            error!("watch task failed: {err}");
        }
        info!(resource = %active.description, "stopped watching");
    }

    pub fn is_watching(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.watching.load(Ordering::SeqCst))
    }

    pub fn state(&self) -> WatchState {
        if self.is_watching() {
            WatchState::Watching
        } else {
            WatchState::Idle
        }
    }
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

enum Flow {
    Continue,
    Stop,
}

struct WatchLoop<R: Resource> {
    resource: Arc<R>,
    settings: WatchSettings,
    notify_tx: mpsc::Sender<Notification>,
    watching: Arc<AtomicBool>,
    stop_rx: oneshot::Receiver<()>,
}

impl<R: Resource> WatchLoop<R> {
    async fn run(mut self, mut session: WatchSession) {
        // tokio intervals panic on a zero period.
        let poll_period = self.settings.watch_interval.max(MIN_PERIOD);
        let mut poll = interval_at(Instant::now() + poll_period, poll_period);
        poll.set_missed_tick_behavior(self.settings.missed_tick_behaviour.into());

        let idle = sleep_until(session.idle_deadline());
        tokio::pin!(idle);

        loop {
            tokio::select! {
                biased;

                _ = &mut self.stop_rx => {
                    debug!("stop requested");
                    break;
                }

                _ = &mut idle => {
                    if session.is_idle(Instant::now()) {
                        info!(
                            max_delta_ms = self.settings.max_delta.as_millis() as u64,
                            "no changes within idle timeout"
                        );
                        self.finish(StopReason::IdleTimeout).await;
                        break;
                    }
                    idle.as_mut().reset(session.idle_deadline());
                }

                _ = poll.tick() => {
                    let resource = Arc::clone(&self.resource);
                    let now = Instant::now();
                    let tick = tokio::task::spawn_blocking(move || {
                        let outcome = poll_once(resource.as_ref(), &mut session, now);
                        (session, outcome)
                    });

                    let joined = tokio::select! {
                        biased;
                        _ = &mut self.stop_rx => {
                            debug!("stop requested during tick; discarding its result");
                            break;
                        }
                        joined = tick => joined,
                    };

                    let outcome = match joined {
                        Ok((returned, outcome)) => {
                            session = returned;
                            outcome
                        }
                        Err(err) => {
                            error!("poll tick failed to complete: {err}");
                            self.watching.store(false, Ordering::SeqCst);
                            break;
                        }
                    };

                    if let Ok(Some(_)) = outcome {
                        idle.as_mut().reset(session.idle_deadline());
                    }

                    if let Flow::Stop = self.handle_outcome(outcome).await {
                        break;
                    }
                }
            }
        }

        debug!("watch loop finished");
    }

    async fn handle_outcome(&mut self, outcome: Result<Option<Change>>) -> Flow {
        match outcome {
            Ok(None) => Flow::Continue,
            Ok(Some(change)) => {
                info!(?change, resource = %self.resource.describe(), "change detected");
                self.emit(change.into()).await
            }
            Err(err) if err.is_permission_denied() => {
                warn!(error = %err, "resource no longer readable; stopping");
                if let Flow::Stop = self.emit(Notification::ReadError(err.to_string())).await {
                    return Flow::Stop;
                }
                self.finish(StopReason::PermissionDenied).await;
                Flow::Stop
            }
            Err(err) => {
                warn!(error = %err, "poll tick failed; retrying on next tick");
                self.emit(Notification::ReadError(err.to_string())).await
            }
        }
    }

    /// Deliver a notification. A full channel never holds up a stop request.
    async fn emit(&mut self, notification: Notification) -> Flow {
        tokio::select! {
            biased;

            _ = &mut self.stop_rx => {
                debug!("stop requested while a notification was pending; dropping it");
                self.watching.store(false, Ordering::SeqCst);
                Flow::Stop
            }

            sent = self.notify_tx.send(notification) => match sent {
                Ok(()) => Flow::Continue,
                Err(err) => {
                    warn!("notification receiver dropped ({err}); stopping watch");
                    self.watching.store(false, Ordering::SeqCst);
                    Flow::Stop
                }
            },
        }
    }

    async fn finish(&mut self, reason: StopReason) {
        self.watching.store(false, Ordering::SeqCst);
        tokio::select! {
            biased;
            _ = &mut self.stop_rx => {}
            _ = self.notify_tx.send(Notification::Stopped(reason)) => {}
        }
    }
}

fn poll_once<R: Resource>(resource: &R, session: &mut WatchSession, now: Instant) -> Result<Option<Change>> {
    let snapshot = resource.snapshot()?;
    session.poll(&snapshot, now)
}
