//! Configuration files resolved into settings and fed to the session logic.

use std::time::Duration;

use beacon_config::{ConfigError, Settings};
use beacon_core::{FeedbackEvent, SessionController};
use beacon_types::{SessionState, SettingsError, TierName};
use tempfile::tempdir;

use crate::common::{FAST_CONFIG, ScriptedStage, pose, two_objectives, write_config};

#[test]
fn fast_config_drives_controller_timing() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), FAST_CONFIG);
    let settings = Settings::load_from(&path).unwrap();

    assert_eq!(
        settings.guidance.distance_check_wait_time(),
        Duration::from_millis(500)
    );
    assert_eq!(settings.session.end_game_delay, Duration::from_secs(2));

    let mut controller = SessionController::new(
        settings.guidance,
        settings.session,
        ScriptedStage::new(two_objectives()),
    );
    controller
        .request_transition(SessionState::Game, &mut ())
        .unwrap();

    let agent = pose(0.0, 0.0);
    controller.tick(Duration::from_millis(999), &agent, &mut ());
    assert_eq!(controller.guidance().unwrap().current_tier(), None);

    let mut events = Vec::new();
    controller.tick(Duration::from_millis(1), &agent, &mut events);
    assert_eq!(
        controller.guidance().unwrap().current_tier(),
        Some(TierName::Medium)
    );

    // Polls every 500ms from here on.
    events.clear();
    for _ in 0..4 {
        controller.tick(Duration::from_millis(500), &agent, &mut events);
    }
    let polls = events
        .iter()
        .filter(|e| matches!(e, FeedbackEvent::GrainIntensity(_)))
        .count();
    assert_eq!(polls, 4);
}

#[test]
fn configured_tiers_reach_the_poller() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r"
[guidance]
initial_distance_check_wait_time = 0.0

[tiers.high]
distance = 25.0
grain_intensity = 0.05
animator_speed = 8.0
proximity_fill = 1.0
interference_volume = 1.0

[tiers.medium]
distance = 50.0
grain_intensity = 0.2
animator_speed = 4.0
proximity_fill = 0.7
interference_volume = 0.6

[tiers.low]
distance = 100.0
grain_intensity = 0.4
animator_speed = 2.0
proximity_fill = 0.4
interference_volume = 0.3

[tiers.default]
distance = 200.0
grain_intensity = 0.8
animator_speed = 0.5
proximity_fill = 0.0
interference_volume = 0.0
",
    );
    let settings = Settings::load_from(&path).unwrap();
    let mut controller = SessionController::new(
        settings.guidance,
        settings.session,
        ScriptedStage::new(two_objectives()),
    );

    let mut events = Vec::new();
    controller
        .request_transition(SessionState::Game, &mut events)
        .unwrap();
    assert_eq!(events, vec![FeedbackEvent::GrainIntensity(0.8)]);

    // Zero warm-up: the first poll runs on the next tick.
    events.clear();
    controller.tick(Duration::ZERO, &pose(0.0, 0.0), &mut events);
    assert_eq!(
        controller.guidance().unwrap().current_tier(),
        Some(TierName::High)
    );
    assert!(events.contains(&FeedbackEvent::Interference { volume: 1.0 }));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = Settings::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert_eq!(err.path(), &path);
}

fn tiers_toml(high_grain: f32, default_distance: f32) -> String {
    format!(
        r"
[tiers.high]
distance = 10.0
grain_intensity = {high_grain:?}
animator_speed = 1.0
proximity_fill = 0.5
interference_volume = 0.5

[tiers.medium]
distance = 30.0
grain_intensity = 0.3
animator_speed = 1.0
proximity_fill = 0.4
interference_volume = 0.4

[tiers.low]
distance = 60.0
grain_intensity = 0.5
animator_speed = 1.0
proximity_fill = 0.3
interference_volume = 0.2

[tiers.default]
distance = {default_distance:?}
grain_intensity = 0.7
animator_speed = 0.5
proximity_fill = 0.1
interference_volume = 0.0
"
    )
}

#[test]
fn tier_tables_parse_when_valid() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), &tiers_toml(0.2, 200.0));
    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.guidance.tiers().fallback().distance(), 200.0);
}

#[test]
fn out_of_range_tier_field_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), &tiers_toml(1.5, 200.0));
    let err = Settings::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("grain_intensity"), "{err}");
}

#[test]
fn default_threshold_must_exceed_low() {
    let dir = tempdir().unwrap();
    for default_distance in [5.0, 60.0] {
        let path = write_config(dir.path(), &tiers_toml(0.2, default_distance));
        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let message = err.to_string();
        assert!(message.contains("tier `default`"), "{message}");
        assert!(message.contains("tier `low`"), "{message}");
    }
}

#[test]
fn invalid_values_are_rejected_with_path() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r"
[guidance]
distance_check_wait_time = 0.0
",
    );
    let err = Settings::load_from(&path).unwrap_err();
    match err {
        ConfigError::Invalid { path: reported, source } => {
            assert_eq!(reported, path);
            assert_eq!(
                source,
                SettingsError::ZeroInterval {
                    field: "distance_check_wait_time"
                }
            );
        }
        other => panic!("expected invalid config, got {other:?}"),
    }
}
