//! Animation System Tests
//!
//! Tests for:
//! - Ease curves and their serde representation
//! - Frame-rate aware damping (damp, Smoothed)
//! - EntranceTimeline validation, absolute offsets and sampling
//! - TimelinePlayback one-shot semantics
//! - ContinuousAnimator transform follow, pulsing light, moving light, freeze
//! - Transform version tracking

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::Vec3;

use vitrine::VitrineError;
use vitrine::animation::continuous::{
    AnimationTarget, AnimatorConfig, ContinuousAnimator, LightMotionState, MovingLightConfig,
    PulsingLightConfig, TransformRange,
};
use vitrine::animation::easing::Ease;
use vitrine::animation::smoothing::{Smoothed, damp};
use vitrine::animation::timeline::{
    EntranceTimeline, TimelineEntry, TimelinePlayback, Timing, Tween,
};
use vitrine::scene::Transform;
use vitrine::scroll::ScrollProgress;

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn visible(progress: f32) -> ScrollProgress {
    ScrollProgress {
        progress,
        in_view: true,
    }
}

fn slide_config() -> AnimatorConfig {
    AnimatorConfig {
        transform: TransformRange {
            start: AnimationTarget::default(),
            end: AnimationTarget {
                position: Vec3::new(10.0, 0.0, 0.0),
                ..AnimationTarget::default()
            },
        },
        follow_speed: 4.0,
        pulsing_light: None,
        moving_light: None,
    }
}

// ============================================================================
// Ease
// ============================================================================

#[test]
fn ease_power_curves_midpoint() {
    assert!(approx(Ease::Linear.apply(0.5, 1.0), 0.5));
    assert!(approx(Ease::QuadIn.apply(0.5, 1.0), 0.25));
    assert!(approx(Ease::QuadOut.apply(0.5, 1.0), 0.75));
    assert!(approx(Ease::CubicIn.apply(0.5, 1.0), 0.125));
    assert!(approx(Ease::CubicOut.apply(0.5, 1.0), 0.875));
    assert!(approx(Ease::CubicInOut.apply(0.5, 1.0), 0.5));
}

#[test]
fn ease_clamps_input() {
    assert!(approx(Ease::QuadIn.apply(-1.0, 1.0), 0.0));
    assert!(approx(Ease::back_out().apply(2.0, 1.0), 1.0));
}

#[test]
fn ease_deserializes_with_defaults() {
    let back: Ease = serde_json::from_str(r#"{ "kind": "back_out" }"#).unwrap();
    assert_eq!(back, Ease::back_out());

    let spring: Ease = serde_json::from_str(r#"{ "kind": "spring", "stiffness": 100.0 }"#).unwrap();
    assert_eq!(spring, Ease::spring(1.0, 100.0, 26.0));

    let linear: Ease = serde_json::from_str(r#"{ "kind": "linear" }"#).unwrap();
    assert_eq!(linear, Ease::Linear);
}

#[test]
fn ease_spring_validation() {
    assert!(Ease::spring(0.0, 100.0, 10.0).validate().is_err());
    assert!(Ease::spring(1.0, -1.0, 10.0).validate().is_err());
    assert!(Ease::spring(1.0, 100.0, 10.0).validate().is_ok());
}

// ============================================================================
// Damping
// ============================================================================

#[test]
fn damp_long_frame_lands_on_target() {
    assert!(approx(damp(0.0_f32, 5.0, 4.0, 1.0), 5.0));
    assert!(approx(damp(0.0_f32, 5.0, 4.0, 0.1), 2.0));
}

#[test]
fn damp_is_roughly_frame_rate_independent() {
    fn run(hz: u32) -> f32 {
        let dt = 1.0 / hz as f32;
        let mut value = 0.0_f32;
        for _ in 0..hz {
            value = damp(value, 5.0, 4.0, dt);
        }
        value
    }

    let slow = run(30);
    let fast = run(144);
    assert!((slow - fast).abs() < 0.05, "30 Hz {slow} vs 144 Hz {fast}");
    assert!(slow > 4.8 && fast > 4.8);
}

#[test]
fn smoothed_value_settles() {
    let mut smoothed = Smoothed::new(Vec3::ZERO, 8.0);
    for _ in 0..120 {
        smoothed.update(Vec3::ONE, 1.0 / 60.0);
    }
    assert!(smoothed.is_settled(Vec3::ONE, 1e-3));

    smoothed.reset(Vec3::splat(2.0));
    assert_eq!(smoothed.value(), Vec3::splat(2.0));
}

// ============================================================================
// EntranceTimeline
// ============================================================================

fn two_track_timeline() -> EntranceTimeline {
    EntranceTimeline::new(vec![
        TimelineEntry::new(
            Tween::GroupPosition {
                from: Vec3::ZERO,
                to: Vec3::new(0.0, 10.0, 0.0),
            },
            Timing::new(2.0, Ease::Linear, 1.0),
        ),
        TimelineEntry::new(
            Tween::OverlayOffsetY {
                from: 0.0,
                to: 100.0,
            },
            Timing::new(1.0, Ease::Linear, 0.0),
        ),
    ])
    .unwrap()
}

#[test]
fn timeline_duration_is_latest_end() {
    let timeline = two_track_timeline();
    assert!(approx(timeline.duration(), 3.0));
}

#[test]
fn timeline_entries_sorted_by_offset() {
    let timeline = two_track_timeline();
    let offsets: Vec<f32> = timeline.entries().iter().map(|e| e.timing.offset).collect();
    assert_eq!(offsets, vec![0.0, 1.0]);
}

#[test]
fn timeline_offsets_are_absolute() {
    let timeline = two_track_timeline();

    let early = timeline.sample(0.5);
    assert!(approx(early.overlay_offset_y.unwrap(), 50.0));
    // Not started yet: holds its `from` value.
    assert!(vec3_approx(early.group_position.unwrap(), Vec3::ZERO));

    let late = timeline.sample(2.0);
    assert!(approx(late.overlay_offset_y.unwrap(), 100.0));
    assert!(vec3_approx(late.group_position.unwrap(), Vec3::new(0.0, 5.0, 0.0)));

    assert!(late.camera_position.is_none());
    assert!(late.group_rotation.is_none());
}

#[test]
fn timeline_later_entry_takes_over_property() {
    let timeline = EntranceTimeline::new(vec![
        TimelineEntry::new(
            Tween::OverlayOffsetY {
                from: 0.0,
                to: 100.0,
            },
            Timing::new(1.0, Ease::Linear, 0.0),
        ),
        TimelineEntry::new(
            Tween::OverlayOffsetY {
                from: 100.0,
                to: 0.0,
            },
            Timing::new(1.0, Ease::Linear, 2.0),
        ),
    ])
    .unwrap();

    assert!(approx(timeline.sample(1.5).overlay_offset_y.unwrap(), 100.0));
    assert!(approx(timeline.sample(2.5).overlay_offset_y.unwrap(), 50.0));
    assert!(approx(timeline.sample(3.0).overlay_offset_y.unwrap(), 0.0));
}

#[test]
fn timeline_rejects_empty_and_bad_timing() {
    assert!(matches!(
        EntranceTimeline::new(Vec::new()),
        Err(VitrineError::EmptyTimeline)
    ));

    let negative = EntranceTimeline::new(vec![
        TimelineEntry::new(
            Tween::OverlayOffsetY { from: 0.0, to: 1.0 },
            Timing::new(1.0, Ease::Linear, 0.0),
        ),
        TimelineEntry::new(
            Tween::OverlayOffsetY { from: 0.0, to: 1.0 },
            Timing::new(-1.0, Ease::Linear, 0.0),
        ),
    ]);
    assert!(matches!(
        negative,
        Err(VitrineError::InvalidTiming { index: 1, .. })
    ));
}

#[test]
fn timeline_entry_deserializes() {
    let json = r#"{
        "tween": { "target": "camera_position", "from": [0.0, 0.0, 12.0], "to": [0.0, 0.0, 6.0] },
        "timing": { "duration": 2.0, "ease": { "kind": "quad_in_out" } }
    }"#;
    let entry: TimelineEntry = serde_json::from_str(json).unwrap();
    assert_eq!(
        entry.tween,
        Tween::CameraPosition {
            from: Vec3::new(0.0, 0.0, 12.0),
            to: Vec3::new(0.0, 0.0, 6.0),
        }
    );
    assert_eq!(entry.timing.ease, Ease::QuadInOut);
    assert!(approx(entry.timing.offset, 0.0));
}

// ============================================================================
// TimelinePlayback
// ============================================================================

#[test]
fn playback_finishes_once() {
    let mut playback = TimelinePlayback::new(Arc::new(two_track_timeline()));

    assert!(!playback.update(1.5));
    assert!(!playback.is_finished());
    assert!(playback.update(2.0));
    assert!(playback.is_finished());
    assert!(approx(playback.time, 3.0));

    // Stays parked at the end.
    assert!(!playback.update(1.0));
    assert!(approx(playback.time, 3.0));
}

#[test]
fn playback_paused_does_not_advance() {
    let mut playback = TimelinePlayback::new(Arc::new(two_track_timeline()));
    playback.paused = true;
    assert!(!playback.update(10.0));
    assert!(approx(playback.time, 0.0));
}

// ============================================================================
// ContinuousAnimator: Transform
// ============================================================================

#[test]
fn animator_follows_scroll_target() {
    let mut animator = ContinuousAnimator::new(slide_config());
    animator.set_scroll(visible(0.5));

    let frame = animator.tick(0.1, 0.0).unwrap();
    assert!(vec3_approx(frame.transform.position, Vec3::new(2.0, 0.0, 0.0)));

    for _ in 0..200 {
        animator.tick(1.0 / 60.0, 0.0);
    }
    assert!(vec3_approx(animator.current().position, Vec3::new(5.0, 0.0, 0.0)));
}

#[test]
fn animator_starts_at_progress_zero() {
    let animator = ContinuousAnimator::new(slide_config());
    assert_eq!(animator.scroll(), ScrollProgress::INITIAL);
    assert!(vec3_approx(animator.current().position, Vec3::ZERO));
}

#[test]
fn animator_frozen_while_not_visible() {
    let mut config = slide_config();
    config.moving_light = Some(MovingLightConfig::default());
    let mut animator = ContinuousAnimator::new(config);

    animator.set_scroll(visible(1.0));
    animator.tick(0.1, 0.0);
    let before = animator.current();
    let lights_before = *animator.lights();

    animator.set_scroll(ScrollProgress {
        progress: 1.0,
        in_view: false,
    });
    for _ in 0..100 {
        assert!(animator.tick(0.1, 0.0).is_none());
    }
    assert_eq!(animator.current(), before);
    assert_eq!(*animator.lights(), lights_before);

    // Resumes from the frozen values, no catch-up.
    animator.set_scroll(visible(1.0));
    let resumed = animator.tick(0.1, 0.0).unwrap();
    let expected = before.position.lerp(Vec3::new(10.0, 0.0, 0.0), 0.4);
    assert!(vec3_approx(resumed.transform.position, expected));
}

#[test]
fn animator_sync_transform_avoids_snap() {
    let mut animator = ContinuousAnimator::new(slide_config());
    let handed = AnimationTarget {
        position: Vec3::new(0.0, -2.0, 0.0),
        ..AnimationTarget::default()
    };
    animator.sync_transform(handed);
    animator.set_scroll(visible(0.0));

    let frame = animator.tick(0.1, 0.0).unwrap();
    assert!(vec3_approx(frame.transform.position, Vec3::new(0.0, -1.2, 0.0)));
}

// ============================================================================
// ContinuousAnimator: Lights
// ============================================================================

#[test]
fn pulsing_light_target_branches() {
    let pulse = PulsingLightConfig::default();

    assert!(approx(pulse.target(0.0, FRAC_PI_2), 2.0));
    assert!(approx(pulse.target(0.0, 0.0), 1.5));
    assert!(approx(pulse.target(0.3, FRAC_PI_2), 1.5));
    assert!(approx(pulse.target(0.75, 0.0), 0.75));
    assert!(approx(pulse.target(1.0, 0.0), 0.0));
}

#[test]
fn pulsing_light_is_smoothed() {
    let config = AnimatorConfig {
        pulsing_light: Some(PulsingLightConfig::default()),
        ..slide_config()
    };
    let mut animator = ContinuousAnimator::new(config);
    animator.set_scroll(visible(1.0));

    // 1.5 toward 0.0 at smoothing 3.0 over 0.1 s
    let frame = animator.tick(0.1, 0.0).unwrap();
    assert!(approx(frame.pulsing_intensity.unwrap(), 1.05));
}

#[test]
fn moving_light_reflects_at_bound() {
    let config = MovingLightConfig {
        speed: 0.0375,
        bound: 10.0,
    };
    let mut state = LightMotionState::default();

    let mut ticks = 0;
    while state.moving_forward {
        state.advance_moving_light(&config);
        ticks += 1;
        assert!(ticks < 1000, "never reached the bound");
    }
    assert!((266..=268).contains(&ticks), "flipped after {ticks} ticks");
    assert!(approx(state.current_x, 10.0));

    let at_bound = state.current_x;
    state.advance_moving_light(&config);
    assert!(state.current_x < at_bound);
    state.advance_moving_light(&config);
    assert!(approx(state.current_x, 10.0 - 2.0 * 0.0375));
}

#[test]
fn moving_light_stays_within_bounds() {
    let config = AnimatorConfig {
        moving_light: Some(MovingLightConfig::default()),
        ..slide_config()
    };
    let mut animator = ContinuousAnimator::new(config);
    animator.set_scroll(visible(0.5));

    let mut flips = 0;
    let mut forward = animator.lights().moving_forward;
    for _ in 0..2000 {
        let frame = animator.tick(1.0 / 60.0, 0.0).unwrap();
        let x = frame.moving_light_x.unwrap();
        assert!((-10.0..=10.0).contains(&x), "x = {x} escaped the bound");
        if animator.lights().moving_forward != forward {
            forward = animator.lights().moving_forward;
            flips += 1;
        }
    }
    assert!(flips >= 3);
}

#[test]
fn animator_config_validation() {
    let mut config = AnimatorConfig::default();
    assert!(config.validate().is_ok());

    config.follow_speed = -1.0;
    assert!(config.validate().is_err());

    let mut config = AnimatorConfig::default();
    config.moving_light = Some(MovingLightConfig {
        speed: 0.1,
        bound: 0.0,
    });
    assert!(config.validate().is_err());
}

// ============================================================================
// Transform
// ============================================================================

#[test]
fn transform_version_bumps_only_on_change() {
    let mut transform = Transform::new();
    assert_eq!(transform.version(), 0);

    assert!(!transform.commit());
    assert_eq!(transform.version(), 0);

    transform.position = Vec3::new(1.0, 2.0, 3.0);
    assert!(transform.commit());
    assert_eq!(transform.version(), 1);

    let same = transform.target();
    assert!(!transform.apply_target(&same));
    assert_eq!(transform.version(), 1);
}

#[test]
fn transform_matrix_translation() {
    let mut transform = Transform::new();
    transform.position = Vec3::new(1.0, 2.0, 3.0);
    let m = transform.matrix();
    assert!(vec3_approx(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0)));
}
