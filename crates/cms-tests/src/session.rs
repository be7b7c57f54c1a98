//! Driving a measurement session against the mock camera

use std::time::Duration;

use anyhow::{Context, ensure};

use camcal_core::capture::{CapabilitySet, MockCameraHandle, MockCameraProvider};
use camcal_core::color::Rgb8;
use camcal_core::session::{
    EventLog, MeasurementSession, SessionConfig, SessionHandle, SessionState, TargetPatch,
};

/// A started session running on its own task, plus what the test needs to
/// watch and steer it
pub struct Rig {
    pub handle: SessionHandle,
    pub camera: MockCameraHandle,
    pub log: EventLog,
    pub targets: Vec<TargetPatch>,
}

impl Rig {
    /// Acquire a mock camera with `caps`, start a session and spawn its runner
    pub async fn start(
        caps: CapabilitySet,
        targets: Vec<TargetPatch>,
        config: SessionConfig,
    ) -> anyhow::Result<Self> {
        let log = EventLog::new();
        let session = MeasurementSession::new(targets, config)?.with_observer(log.clone());
        Self::attach(session, log, caps).await
    }

    /// Start an existing session (fresh or failed) on a new mock camera and
    /// spawn its runner
    pub async fn attach(
        mut session: MeasurementSession,
        log: EventLog,
        caps: CapabilitySet,
    ) -> anyhow::Result<Self> {
        let provider = MockCameraProvider::new(caps).with_color(Rgb8::WHITE);
        session.start(&provider).await?;
        let camera = provider.handle().context("provider kept no camera handle")?;
        let targets = session
            .points()
            .iter()
            .map(|p| TargetPatch::new(p.label.clone(), p.target_color))
            .collect();

        Ok(Self {
            handle: SessionHandle::spawn(session),
            camera,
            log,
            targets,
        })
    }

    /// Let the runner sample for `n` tick periods
    pub async fn wait_ticks(&self, n: u32) {
        tokio::time::sleep(Duration::from_millis(16) * n).await;
    }

    /// Lock on the reference white, then show each patch through `display`
    /// and commit whatever the camera reads
    pub async fn measure_all(&self, display: impl Fn(Rgb8) -> Rgb8) -> anyhow::Result<()> {
        self.camera.show(Rgb8::WHITE);
        self.wait_ticks(8).await;
        self.handle.lock().await?;

        for patch in &self.targets {
            self.camera.show(display(patch.target));
            self.wait_ticks(3).await;
            self.handle.freeze().await?;
            self.handle.advance().await?;
        }
        Ok(())
    }

    /// Stop the runner and return the session, checking the camera was released
    pub async fn finish(self) -> anyhow::Result<MeasurementSession> {
        let session = self
            .handle
            .shutdown()
            .await
            .context("session runner panicked")?;
        ensure!(!self.camera.is_active(), "camera still active after shutdown");
        Ok(session)
    }
}

/// Whether the runner reported `state` to the observer at least once
pub fn saw_state(log: &EventLog, state: &SessionState) -> bool {
    log.transitions()
        .iter()
        .any(|e| matches!(e, camcal_core::session::SessionEvent::StateChanged(s) if s == state))
}
