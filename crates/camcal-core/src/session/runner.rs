//! Cooperative session runner
//!
//! One tokio task owns the [`MeasurementSession`]. It ticks the sampler at
//! display cadence and applies user commands in between, so sampling and
//! state changes never interleave. The camera is released on every exit path.

use std::fmt;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::machine::MeasurementSession;
use super::state::SessionState;
use crate::error::{Error, Result};

const COMMAND_QUEUE_DEPTH: usize = 16;

/// User actions forwarded to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Lock,
    Freeze,
    Unfreeze,
    Advance,
    Reset,
    Cancel,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::Lock => "lock",
            SessionCommand::Freeze => "freeze",
            SessionCommand::Unfreeze => "unfreeze",
            SessionCommand::Advance => "advance",
            SessionCommand::Reset => "reset",
            SessionCommand::Cancel => "cancel",
        }
    }
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command paired with the channel its result goes back on
pub struct SessionRequest {
    pub command: SessionCommand,
    pub reply: oneshot::Sender<Result<SessionState>>,
}

/// Control side of a running session
pub struct SessionHandle {
    commands: mpsc::Sender<SessionRequest>,
    cancel: CancellationToken,
    task: JoinHandle<MeasurementSession>,
}

impl SessionHandle {
    /// Spawn a runner for an already started session
    pub fn spawn(session: MeasurementSession) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_session(session, rx, cancel.clone()));
        Self {
            commands: tx,
            cancel,
            task,
        }
    }

    /// Send a command and wait for the state it produced
    pub async fn send(&self, command: SessionCommand) -> Result<SessionState> {
        let (reply, response) = oneshot::channel();
        let stopped = || Error::InvalidTransition {
            action: command.name(),
            state: "Stopped".to_string(),
        };

        self.commands
            .send(SessionRequest { command, reply })
            .await
            .map_err(|_| stopped())?;
        response.await.map_err(|_| stopped())?
    }

    pub async fn lock(&self) -> Result<SessionState> {
        self.send(SessionCommand::Lock).await
    }

    pub async fn freeze(&self) -> Result<SessionState> {
        self.send(SessionCommand::Freeze).await
    }

    pub async fn unfreeze(&self) -> Result<SessionState> {
        self.send(SessionCommand::Unfreeze).await
    }

    pub async fn advance(&self) -> Result<SessionState> {
        self.send(SessionCommand::Advance).await
    }

    pub async fn reset(&self) -> Result<SessionState> {
        self.send(SessionCommand::Reset).await
    }

    pub async fn cancel(&self) -> Result<SessionState> {
        self.send(SessionCommand::Cancel).await
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the runner and take the session back. `None` if the task panicked.
    pub async fn shutdown(self) -> Option<MeasurementSession> {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the runner to stop on its own (cancel or failure)
    pub async fn join(self) -> Option<MeasurementSession> {
        match self.task.await {
            Ok(session) => Some(session),
            Err(err) => {
                warn!("Session runner task failed: {}", err);
                None
            }
        }
    }
}

/// Drive a session until cancelled, all handles are dropped, or the session
/// reaches a terminal state. Returns the session with its camera released.
pub async fn run_session(
    mut session: MeasurementSession,
    mut commands: mpsc::Receiver<SessionRequest>,
    cancel: CancellationToken,
) -> MeasurementSession {
    let mut ticker = tokio::time::interval(session.config().tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("Session runner started ({:?} cadence)", ticker.period());

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                info!("Session runner cancelled");
                break;
            }
            request = commands.recv() => {
                let Some(SessionRequest { command, reply }) = request else {
                    debug!("All session handles dropped");
                    break;
                };
                let result = apply(&mut session, command).await;
                match &result {
                    Err(err) if err.is_recoverable() => debug!("{} rejected: {}", command, err),
                    Err(err) => warn!("{} failed: {}", command, err),
                    Ok(_) => {}
                }
                let _ = reply.send(result);
            }
            _ = ticker.tick() => {
                session.tick().await;
            }
        }

        if session.state().is_terminal() {
            debug!("Session reached {}, stopping runner", session.state());
            break;
        }
    }

    session.teardown();
    session
}

async fn apply(session: &mut MeasurementSession, command: SessionCommand) -> Result<SessionState> {
    match command {
        SessionCommand::Lock => session.lock().await.map(|_| ())?,
        SessionCommand::Freeze => session.freeze().map(|_| ())?,
        SessionCommand::Unfreeze => session.unfreeze()?,
        SessionCommand::Advance => session.advance().map(|_| ())?,
        SessionCommand::Reset => session.reset().await?,
        SessionCommand::Cancel => session.cancel()?,
    }
    Ok(session.state().clone())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::capture::{CapabilitySet, MockCameraProvider};
    use crate::color::Rgb8;
    use crate::session::machine::SessionConfig;
    use crate::session::observer::{EventLog, SessionEvent};
    use crate::session::point::{TargetPatch, default_targets};
    use crate::session::state::CapturePhase;

    async fn spawn_with(
        provider: &MockCameraProvider,
        targets: Vec<TargetPatch>,
    ) -> (SessionHandle, EventLog) {
        let log = EventLog::new();
        let mut session = MeasurementSession::new(targets, SessionConfig::default())
            .unwrap()
            .with_observer(log.clone());
        session.start(provider).await.unwrap();
        (SessionHandle::spawn(session), log)
    }

    async fn ticks(n: u64) {
        tokio::time::sleep(Duration::from_millis(16 * n)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_runner_walks_patches() {
        let provider = MockCameraProvider::new(CapabilitySet::full()).with_color(Rgb8::WHITE);
        let targets = default_targets();
        let (handle, log) = spawn_with(&provider, targets.clone()).await;
        let camera = provider.handle().unwrap();

        ticks(10).await;
        assert_eq!(
            handle.lock().await.unwrap(),
            SessionState::Measuring {
                index: 0,
                phase: CapturePhase::Live
            }
        );

        for patch in &targets {
            camera.show(patch.target);
            ticks(3).await;
            handle.freeze().await.unwrap();
            handle.advance().await.unwrap();
        }

        let session = handle.shutdown().await.unwrap();
        assert_eq!(*session.state(), SessionState::Complete);
        assert!(!camera.is_active());

        let completes: Vec<_> = log
            .transitions()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Complete(points) => Some(points),
                _ => None,
            })
            .collect();
        assert_eq!(completes.len(), 1);
        let measured: Vec<_> = completes[0].iter().map(|p| p.measured_color).collect();
        let expected: Vec<_> = targets.iter().map(|t| Some(t.target)).collect();
        assert_eq!(measured, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_command_keeps_running() {
        let provider = MockCameraProvider::new(CapabilitySet::full());
        let (handle, _log) = spawn_with(&provider, default_targets()).await;

        assert!(matches!(
            handle.advance().await,
            Err(Error::InvalidTransition { .. })
        ));
        assert!(!handle.is_finished());
        assert_eq!(handle.lock().await.unwrap().active_index(), Some(0));
        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_command_stops_runner() {
        let provider = MockCameraProvider::new(CapabilitySet::full());
        let (handle, log) = spawn_with(&provider, default_targets()).await;
        let camera = provider.handle().unwrap();

        assert_eq!(handle.cancel().await.unwrap(), SessionState::Cancelled);
        let token = handle.cancellation_token();
        let session = handle.join().await.unwrap();
        assert!(!token.is_cancelled());
        assert_eq!(*session.state(), SessionState::Cancelled);
        assert!(!camera.is_active());
        assert!(log.transitions().contains(&SessionEvent::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_cancellation_releases_camera() {
        let provider = MockCameraProvider::new(CapabilitySet::full());
        let (handle, _log) = spawn_with(&provider, default_targets()).await;
        let camera = provider.handle().unwrap();

        handle.cancellation_token().cancel();
        let session = handle.join().await.unwrap();
        assert_eq!(*session.state(), SessionState::Setup);
        assert!(!camera.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_reach_observer() {
        let provider =
            MockCameraProvider::new(CapabilitySet::full()).with_color(Rgb8::new(9, 9, 9));
        let (handle, log) = spawn_with(&provider, default_targets()).await;

        ticks(8).await;
        handle.shutdown().await.unwrap();

        let samples: Vec<_> = log.events().into_iter().filter(SessionEvent::is_sample).collect();
        assert!(samples.len() >= 5, "{}", samples.len());
        assert!(samples.contains(&SessionEvent::Sample {
            sample: Rgb8::new(9, 9, 9),
            stable: true
        }));
    }
}
