//! End-to-end guidance behaviour through the public core API.

use beacon_core::{
    FeedbackEvent, InterferenceJitter, PollOutcome, Probe, ProbeSet, ProximityPoller, Resolution,
    SequenceJitter, classify, nearest_direction,
};
use beacon_types::{Direction, Objective, ProbeKind, TierName, Vec3};

use crate::common::{id, pose, registry, scenario_tiers};

#[test]
fn medium_band_scenario() {
    let mut objectives = registry(vec![
        Objective::new(id(1), Vec3::new(15.0, 0.0, 20.0)),
        Objective::terminal(id(2), Vec3::new(0.0, 0.0, -120.0)),
    ]);
    let mut poller = ProximityPoller::new(scenario_tiers());
    let mut events = Vec::new();

    poller.poll(&mut objectives, &pose(0.0, 0.0), &mut events);

    assert_eq!(poller.state().current_tier(), Some(TierName::Medium));
    assert!(poller.state().suppress_direction());
    assert!(events.contains(&FeedbackEvent::Interference { volume: 0.5 }));
    assert_eq!(
        events.last(),
        Some(&FeedbackEvent::Direction(Direction::None))
    );
}

#[test]
fn minimum_distance_wins() {
    let mut objectives = registry(vec![
        Objective::new(id(1), Vec3::new(0.0, 0.0, 12.0)),
        Objective::new(id(2), Vec3::new(0.0, 0.0, -8.0)),
        Objective::terminal(id(3), Vec3::new(100.0, 0.0, 0.0)),
    ]);
    let mut poller = ProximityPoller::new(scenario_tiers());
    let outcome = poller.poll(&mut objectives, &pose(0.0, 0.0), &mut ());
    assert_eq!(
        outcome,
        PollOutcome::Tracking {
            target: id(2),
            terminal: false,
            distance: 8.0,
            tier: TierName::High,
        }
    );
}

#[test]
fn resolution_is_permanent_and_idempotent() {
    let mut objectives = registry(vec![
        Objective::new(id(1), Vec3::new(0.0, 0.0, 5.0)),
        Objective::new(id(2), Vec3::new(0.0, 0.0, 50.0)),
        Objective::terminal(id(3), Vec3::new(0.0, 0.0, 150.0)),
    ]);
    let mut poller = ProximityPoller::new(scenario_tiers());
    let agent = pose(0.0, 0.0);

    assert_eq!(
        objectives.mark_resolved(id(1)),
        Ok(Resolution::Resolved { terminal: false })
    );
    assert_eq!(objectives.mark_resolved(id(1)), Ok(Resolution::AlreadyResolved));

    for _ in 0..3 {
        let outcome = poller.poll(&mut objectives, &agent, &mut ());
        assert!(matches!(outcome, PollOutcome::Tracking { target, .. } if target == id(2)));
    }
}

#[test]
fn terminal_fallback_uses_exact_position() {
    let terminal_at = Vec3::new(3.0, 0.0, -4.0);
    let mut objectives = registry(vec![
        Objective::new(id(1), Vec3::new(1.0, 0.0, 1.0)),
        Objective::terminal(id(2), terminal_at),
    ]);
    objectives.mark_resolved(id(1)).unwrap();

    let mut poller = ProximityPoller::new(scenario_tiers());
    let mut events = Vec::new();
    let outcome = poller.poll(&mut objectives, &pose(0.0, 0.0), &mut events);

    assert_eq!(
        outcome,
        PollOutcome::Tracking {
            target: id(2),
            terminal: true,
            distance: 5.0,
            tier: TierName::High,
        }
    );
    assert_eq!(poller.state().nearest_point(), terminal_at);
    assert_eq!(events.first(), Some(&FeedbackEvent::Reveal(id(2))));
}

#[test]
fn classification_covers_every_distance() {
    let tiers = scenario_tiers();
    let expected = [
        (0.0, TierName::High),
        (9.99, TierName::High),
        (10.0, TierName::Medium),
        (25.0, TierName::Medium),
        (30.0, TierName::Low),
        (59.9, TierName::Low),
        (60.0, TierName::Default),
        (10_000.0, TierName::Default),
    ];
    for (distance, tier) in expected {
        assert_eq!(classify(distance, &tiers).name(), tier, "distance {distance}");
    }
}

#[test]
fn direction_reporter_scenario() {
    let at = |kind, x| Probe {
        kind,
        position: Vec3::new(x, 0.0, 0.0),
    };
    let probes = ProbeSet::new(vec![
        at(ProbeKind::Front, 5.0),
        at(ProbeKind::Back, 9.0),
        at(ProbeKind::Left, 3.0),
        at(ProbeKind::Right, 7.0),
    ])
    .unwrap();
    assert_eq!(nearest_direction(&probes, Vec3::ZERO), Direction::Left);

    let tied = ProbeSet::new(vec![
        at(ProbeKind::Front, 4.0),
        at(ProbeKind::Back, 4.0),
        at(ProbeKind::Left, 6.0),
        at(ProbeKind::Right, 6.0),
    ])
    .unwrap();
    assert_eq!(nearest_direction(&tied, Vec3::ZERO), Direction::Up);
}

#[test]
fn jitter_stays_in_band_for_every_tier() {
    let samples = vec![0.0, 0.1, 0.37, 0.5, 0.73, 0.99, 1.0];
    // One agent position per band: high, medium, low, default.
    for z in [5.0, 20.0, 45.0, 150.0] {
        let mut objectives = registry(vec![
            Objective::new(id(1), Vec3::new(0.0, 0.0, z)),
            Objective::terminal(id(2), Vec3::new(0.0, 0.0, -190.0)),
        ]);
        let mut poller = ProximityPoller::new(scenario_tiers());
        poller.poll(&mut objectives, &pose(0.0, 0.0), &mut ());
        let tier = poller.current_tier().unwrap();

        for variance in [0.0, 0.05, 0.25, 1.0] {
            let jitter = InterferenceJitter::new(variance);
            let mut source = SequenceJitter::new(samples.clone());
            for _ in 0..samples.len() {
                let fill = jitter
                    .tick(poller.state(), poller.tiers(), &mut source, &mut ())
                    .unwrap();
                let low = tier.proximity_fill() - variance;
                let high = tier.proximity_fill() + variance;
                assert!(
                    (low..=high).contains(&fill),
                    "{fill} outside [{low}, {high}] for {}",
                    tier.name()
                );
            }
        }
    }
}
