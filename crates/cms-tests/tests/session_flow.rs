//! End-to-end runs: mock camera -> session runner -> oracle -> profile
//!
//! Time is paused, so the 16 ms ticker advances only when every task is idle
//! and runs are deterministic.

use camcal_core::analysis::{
    AnalysisSettings, DEFAULT_TARGET_GAMMA, FALLBACK_PROFILE_NAME, OfflineOracle, ReplayOracle,
    WhitePointTarget, mean_delta_e,
};
use camcal_core::capture::{
    CameraSettings, Capability, CapabilitySet, ControlMode, LockState, ParameterStatus,
};
use camcal_core::color::Rgb8;
use camcal_core::profile::analyze_and_encode;
use camcal_core::session::{
    CapturePhase, EventLog, MeasurementSession, SessionConfig, SessionState, default_targets,
};
use camcal_core::{Error, capture::MockCameraProvider};
use cms_tests::session::{Rig, saw_state};
use cms_tests::{Cmm, init_logging, transform_to_srgb};

fn oracle_reply() -> String {
    let body = serde_json::json!({
        "profileName": "Office Monitor",
        "gamma": 2.2,
        "colorTemperature": "6500K",
        "deltaE": 1.4,
        "redGain": 0.96,
        "greenGain": 1.0,
        "blueGain": 1.03,
        "contrastRatio": "900:1",
        "feedback": "Slight blue deficit corrected."
    });
    format!("```json\n{body}\n```")
}

async fn full_rig() -> Rig {
    Rig::start(CapabilitySet::full(), default_targets(), SessionConfig::default())
        .await
        .expect("start session")
}

#[tokio::test(start_paused = true)]
async fn test_measure_analyze_encode() -> anyhow::Result<()> {
    init_logging();
    let rig = full_rig().await;
    rig.measure_all(|target| target).await?;

    assert_eq!(rig.camera.mode(Capability::Exposure), ControlMode::Manual);
    assert!(saw_state(&rig.log, &SessionState::Complete));
    let session = rig.finish().await?;

    let points = session.completed_points().expect("all patches measured");
    assert_eq!(points.len(), 6);
    for point in points {
        assert_eq!(point.measured_color, Some(point.target_color), "{}", point.label);
        assert_eq!(point.delta_e(), Some(0.0));
    }
    assert!(session.lock_state().hardware_locked);
    assert_eq!(session.lock_state().reference_white, Some(Rgb8::WHITE));

    let oracle = ReplayOracle::new(oracle_reply());
    let (outcome, profile) =
        analyze_and_encode(&oracle, points, &AnalysisSettings::default()).await?;
    assert!(!outcome.is_fallback);
    assert_eq!(profile.name(), "Office Monitor");
    assert_eq!(profile.inspect()?.description(), Some("Office Monitor"));

    for cmm in Cmm::ALL {
        transform_to_srgb(cmm, profile.as_bytes(), &[255, 255, 255])
            .map_err(anyhow::Error::msg)?;
    }

    let dir = std::env::temp_dir().join(format!("camcal-e2e-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = profile.save_to_dir(&dir)?;
    assert_eq!(std::fs::read(&path)?, profile.as_bytes());
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_offline_fallback_keeps_targets() -> anyhow::Result<()> {
    let rig = full_rig().await;
    // A display that crushes red
    rig.measure_all(|t| Rgb8::new(t.r.saturating_sub(20), t.g, t.b)).await?;
    let session = rig.finish().await?;
    let points = session.completed_points().expect("complete");

    let settings = AnalysisSettings {
        target_gamma: 2.4,
        target_white_point: WhitePointTarget::D50,
    };
    let (outcome, profile) = analyze_and_encode(&OfflineOracle, points, &settings).await?;

    assert!(outcome.is_fallback);
    let result = &outcome.result;
    assert_eq!(result.profile_name, FALLBACK_PROFILE_NAME);
    assert_eq!(result.gamma, 2.4);
    assert_eq!(result.color_temperature, "5000K");
    assert_eq!(result.gains(), [1.0; 3]);
    assert!(result.delta_e > 0.0);
    assert!((result.delta_e - mean_delta_e(points)).abs() < 1e-12);

    let mox = profile.to_moxcms()?;
    assert!(mox.is_matrix_shaper());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_malformed_oracle_reply_falls_back() -> anyhow::Result<()> {
    let rig = full_rig().await;
    rig.measure_all(|t| t).await?;
    let session = rig.finish().await?;
    let points = session.completed_points().expect("complete");

    let json_reply = |name: &str, gamma: f64, red_gain: f64| {
        serde_json::json!({
            "profileName": name,
            "gamma": gamma,
            "deltaE": 1,
            "redGain": red_gain,
            "greenGain": 1,
            "blueGain": 1
        })
        .to_string()
    };
    for reply in [
        "I could not analyze these measurements.".to_string(),
        json_reply("Broken", -1.0, 1.0),
        json_reply("Hot", 2.2, 5.0),
    ] {
        let oracle = ReplayOracle::new(reply.as_str());
        let (outcome, profile) =
            analyze_and_encode(&oracle, points, &AnalysisSettings::default()).await?;
        assert!(outcome.is_fallback, "{reply}");
        assert_eq!(profile.name(), FALLBACK_PROFILE_NAME);
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_auto_only_camera_degrades_but_measures() -> anyhow::Result<()> {
    let rig = Rig::start(
        CapabilitySet::auto_only(),
        default_targets(),
        SessionConfig::default(),
    )
    .await?;
    rig.measure_all(|t| t).await?;
    assert!(
        rig.camera
            .applied_constraints()
            .iter()
            .all(|c| c.mode != ControlMode::Manual)
    );

    let session = rig.finish().await?;
    assert_eq!(*session.state(), SessionState::Complete);
    assert!(!session.lock_state().hardware_locked);

    let outcome = session.lock_outcome().expect("lock attempted");
    assert_eq!(outcome.state, LockState::LockDegraded);
    assert_eq!(outcome.locked().count(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_rejected_focus_is_partial_lock() -> anyhow::Result<()> {
    let rig = full_rig().await;
    rig.camera.reject_constraint(Capability::Focus);
    rig.measure_all(|t| t).await?;

    assert_eq!(rig.camera.mode(Capability::WhiteBalance), ControlMode::Manual);
    assert_ne!(rig.camera.mode(Capability::Focus), ControlMode::Manual);

    let session = rig.finish().await?;
    let outcome = session.lock_outcome().expect("lock attempted");
    assert_eq!(outcome.state, LockState::LockDegraded);
    assert_eq!(outcome.continuous().collect::<Vec<_>>(), vec![Capability::Focus]);
    assert!(session.lock_state().hardware_locked);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_reset_mid_run_unlocks_and_restarts() -> anyhow::Result<()> {
    let rig = full_rig().await;
    rig.wait_ticks(8).await;
    rig.handle.lock().await?;

    for color in [Rgb8::WHITE, Rgb8::new(255, 0, 0)] {
        rig.camera.show(color);
        rig.wait_ticks(3).await;
        rig.handle.freeze().await?;
        rig.handle.advance().await?;
    }
    rig.handle.freeze().await?;

    assert_eq!(rig.handle.reset().await?, SessionState::Setup);
    assert_eq!(rig.camera.mode(Capability::Exposure), ControlMode::Continuous);

    // Everything is allowed again from Setup, starting at the first patch
    assert!(rig.handle.advance().await.is_err());
    rig.camera.show(Rgb8::WHITE);
    rig.wait_ticks(8).await;
    assert_eq!(
        rig.handle.lock().await?,
        SessionState::Measuring {
            index: 0,
            phase: CapturePhase::Live
        }
    );
    assert_eq!(rig.camera.mode(Capability::Exposure), ControlMode::Manual);

    let session = rig.finish().await?;
    assert_eq!(session.points()[1].measured_color, Some(Rgb8::new(255, 0, 0)));
    assert!(session.completed_points().is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_runner_and_releases_camera() -> anyhow::Result<()> {
    let rig = full_rig().await;
    rig.wait_ticks(4).await;

    assert_eq!(rig.handle.cancel().await?, SessionState::Cancelled);
    rig.wait_ticks(1).await;
    assert!(rig.handle.is_finished());
    assert!(rig.handle.lock().await.is_err());
    assert!(!rig.camera.is_active());
    assert_eq!(rig.camera.stop_count(), 1);
    assert!(saw_state(&rig.log, &SessionState::Cancelled));

    let camera = rig.camera.clone();
    let session = rig.handle.join().await.expect("runner returned the session");
    assert_eq!(*session.state(), SessionState::Cancelled);
    drop(session);
    assert_eq!(camera.stop_count(), 1, "teardown must not stop twice");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_lock_waits_for_stable_reading() -> anyhow::Result<()> {
    let mut config = SessionConfig::default();
    config.negotiation.require_stable = true;
    let rig = Rig::start(CapabilitySet::full(), default_targets(), config).await?;

    assert!(matches!(rig.handle.lock().await, Err(Error::Unstable)));
    rig.wait_ticks(8).await;
    assert!(rig.handle.lock().await.is_ok());
    rig.finish().await?;
    Ok(())
}

#[tokio::test]
async fn test_denied_camera_fails_session() {
    let provider = MockCameraProvider::denied("permission denied");
    let log = EventLog::new();
    let mut session = MeasurementSession::new(default_targets(), SessionConfig::default())
        .unwrap()
        .with_observer(log.clone());

    assert!(matches!(
        session.start(&provider).await,
        Err(Error::CameraUnavailable(_))
    ));
    assert!(matches!(session.state(), SessionState::Failed(_)));
    assert_eq!(log.errors().len(), 1);
    assert!(session.tick().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_session_reacquires_camera() -> anyhow::Result<()> {
    let log = EventLog::new();
    let mut session = MeasurementSession::new(default_targets(), SessionConfig::default())?
        .with_observer(log.clone());

    let denied = MockCameraProvider::denied("permission denied");
    assert!(session.start(&denied).await.is_err());
    assert!(matches!(session.state(), SessionState::Failed(_)));
    assert_eq!(log.errors().len(), 1);

    // Permission granted on the second try
    let rig = Rig::attach(session, log, CapabilitySet::full()).await?;
    assert_eq!(rig.log.errors().len(), 1);
    assert!(saw_state(&rig.log, &SessionState::Setup));

    rig.measure_all(|t| t).await?;
    assert!(saw_state(&rig.log, &SessionState::Complete));
    let session = rig.finish().await?;
    assert_eq!(session.completed_points().map(<[_]>::len), Some(6));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_offline_fallback_replaces_unencodable_gamma() -> anyhow::Result<()> {
    let rig = full_rig().await;
    rig.measure_all(|t| t).await?;
    let session = rig.finish().await?;
    let points = session.completed_points().expect("complete");

    let settings = AnalysisSettings {
        target_gamma: 300.0,
        ..Default::default()
    };
    assert!(settings.validate().is_err());
    let (outcome, profile) = analyze_and_encode(&OfflineOracle, points, &settings).await?;

    assert!(outcome.is_fallback);
    assert_eq!(outcome.result.gamma, DEFAULT_TARGET_GAMMA);
    outcome.result.validate()?;
    let gammas = profile.inspect()?.trc_gammas().expect("parametric gamma curves");
    assert!(gammas.iter().all(|g| (g - DEFAULT_TARGET_GAMMA).abs() < 1.0 / 256.0));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_focus_is_partial_lock() -> anyhow::Result<()> {
    let rig = full_rig().await;
    rig.camera.set_settings(CameraSettings {
        focus_distance: None,
        ..rig.camera.settings()
    });
    rig.measure_all(|t| t).await?;

    assert_eq!(rig.camera.mode(Capability::Exposure), ControlMode::Manual);
    assert_eq!(rig.camera.mode(Capability::Focus), ControlMode::Continuous);

    let session = rig.finish().await?;
    let outcome = session.lock_outcome().expect("lock attempted");
    assert_eq!(outcome.state, LockState::LockDegraded);
    let focus = outcome
        .parameters
        .iter()
        .find(|p| p.capability == Capability::Focus)
        .expect("focus reported");
    assert_eq!(
        focus.status,
        ParameterStatus::Continuous {
            reason: "current value unavailable".to_string()
        }
    );
    assert!(session.lock_state().hardware_locked);
    Ok(())
}
