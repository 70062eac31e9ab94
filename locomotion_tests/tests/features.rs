//! Jump sequencing, teleport, speed adjustment, hybrid blending, and the
//! other controller-level features.

use std::sync::Arc;

use locomotion_controller::{
    events::ControllerEvent, input::InputState, jump::JumpState, SetupError, SpeedAdjustment,
};
use locomotion_shared::{
    config::{ControllerConfig, HistoryCadence},
    game_state::{CharState, MovementMethod},
    math::{Quat, Vec3},
    physics::{CharacterMotor, MotorInputs},
    profile::{InputProfile, InputRange},
};
use locomotion_tests::{approx, init_tracing, Rig, JUMP_FRAMES};

fn jump_input() -> InputState {
    InputState {
        jump_pressed: true,
        ..InputState::from_axes(0.0, 1.0)
    }
}

#[test]
fn jump_runs_to_completion_and_is_not_reentrant() -> anyhow::Result<()> {
    init_tracing();
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.set_input(jump_input());

    let (_, command) = rig.frame();

    let events = rig.controller.drain_events();
    assert!(events.contains(&ControllerEvent::JumpStarted {
        contact: Vec3::ZERO,
        ground_aligned: true,
    }));
    assert_eq!(rig.controller.jump_state(), JumpState::InProgress);
    let command = command.ok_or_else(|| anyhow::anyhow!("no motor command"))?;
    assert_eq!(command.inputs, MotorInputs::Null);
    assert!(!command.zero_base_velocity);

    // Holding jump while the event plays does not restart it.
    rig.frame();
    let log = rig.matcher.log();
    assert_eq!(log.events_begun, vec!["jump".to_string()]);
    assert_eq!(log.modified_contacts, vec![Vec3::ZERO]);

    rig.controller.set_input(InputState::from_axes(0.0, 1.0));
    let mut completed = false;
    for _ in 0..=JUMP_FRAMES {
        rig.frame();
        if rig
            .controller
            .drain_events()
            .contains(&ControllerEvent::JumpCompleted)
        {
            completed = true;
            break;
        }
    }
    assert!(completed);
    assert_eq!(rig.controller.jump_state(), JumpState::Idle);

    let (_, command) = rig.frame();
    assert!(matches!(
        command.map(|c| c.inputs),
        Some(MotorInputs::Player(_))
    ));
    Ok(())
}

#[test]
fn jump_is_ignored_in_point_and_click() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.game.edit(|g| {
        g.movement_method = MovementMethod::PointAndClick;
        g.char_state = CharState::Moving;
        g.target_position = Some(Vec3::new(0.0, 0.0, 8.0));
    });
    rig.controller.set_input(jump_input());
    rig.frame();

    assert_eq!(rig.controller.jump_state(), JumpState::Idle);
    assert!(rig.matcher.log().events_begun.is_empty());
    Ok(())
}

#[test]
fn jump_without_event_definition_does_nothing() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    let mut bare = locomotion_controller::CharacterController::builder(ControllerConfig::default())
        .motor(Box::new(rig.motor.clone()))
        .predictor(None)
        .animation_matcher(Box::new(rig.matcher.clone()))
        .game_state(Box::new(rig.game.clone()))
        .build()?;
    bare.set_input(jump_input());
    bare.frame_update(1.0 / 60.0);
    assert_eq!(bare.jump_state(), JumpState::Idle);

    // The rig's own controller still jumps.
    rig.controller.set_input(jump_input());
    rig.frame();
    assert_eq!(rig.controller.jump_state(), JumpState::InProgress);
    Ok(())
}

#[test]
fn teleport_snaps_motor_and_stomps_trajectory() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.set_input(InputState::from_axes(0.0, 1.0));
    for _ in 0..30 {
        rig.physics(1.0 / 60.0);
        rig.frame();
    }
    rig.controller.drain_events();

    rig.game.edit(|g| {
        g.target_position = Some(Vec3::new(5.0, 0.0, -5.0));
        g.target_rotation = Quat::from_yaw_degrees(90.0);
    });
    rig.controller.teleport();

    let body = rig.motor.body();
    assert_eq!(body.position, Vec3::new(5.0, 0.0, -5.0));
    assert!(approx(body.facing, 90.0));
    assert_eq!(body.base_velocity, Vec3::ZERO);
    for point in rig.controller.trajectory().points() {
        assert_eq!(point.position, Vec3::ZERO);
        assert!(approx(point.facing, 90.0));
    }
    match rig.controller.drain_events().as_slice() {
        [ControllerEvent::Teleported { position, facing }] => {
            assert_eq!(*position, Vec3::new(5.0, 0.0, -5.0));
            assert!(approx(*facing, 90.0));
        }
        other => panic!("unexpected events {other:?}"),
    }
    Ok(())
}

#[test]
fn speed_adjustment_reaches_motor_adapter_and_predictor() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    let speeds = SpeedAdjustment {
        max_stable_move_speed: 2.0,
        move_speed: 0.5,
        max_speed: 3.0,
    };
    rig.controller.adjust_movement_speed(speeds);
    rig.controller.set_input(InputState::from_axes(0.0, 1.0));

    let (prediction, command) = rig.frame();

    assert!(approx(rig.motor.body().max_stable_move_speed, 2.0));
    assert!(approx(prediction.desired_velocity.z, 3.0));
    match command.map(|c| c.inputs) {
        Some(MotorInputs::Player(inputs)) => assert!(approx(inputs.move_axis_forward, 1.5)),
        other => panic!("expected player inputs, got {other:?}"),
    }
    assert!(approx(rig.controller.config().max_speed, 3.0));
    assert!(rig
        .controller
        .drain_events()
        .contains(&ControllerEvent::SpeedAdjusted {
            max_speed: 3.0,
            move_speed: 0.5,
            max_stable_move_speed: 2.0,
        }));
    Ok(())
}

#[test]
fn physics_cadence_records_history_only_in_fixed_update() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig {
        history_cadence: HistoryCadence::Physics,
        ..Default::default()
    })?;
    rig.controller.fixed_update(0.06);

    let mut motor = rig.motor.clone();
    motor.set_position(Vec3::new(1.0, 0.0, 0.0));
    for _ in 0..10 {
        rig.controller.frame_update(0.06);
    }
    assert_eq!(rig.controller.trajectory().past()[0].position, Vec3::ZERO);

    rig.controller.fixed_update(0.06);
    assert_eq!(
        rig.controller.trajectory().past()[0].position,
        Vec3::new(-1.0, 0.0, 0.0)
    );
    Ok(())
}

#[test]
fn frame_cadence_ignores_fixed_update() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.frame_update(0.06);

    let mut motor = rig.motor.clone();
    motor.set_position(Vec3::new(0.0, 0.0, 2.0));
    for _ in 0..10 {
        rig.controller.fixed_update(0.06);
    }
    assert_eq!(rig.controller.trajectory().past()[0].position, Vec3::ZERO);

    rig.controller.frame_update(0.06);
    assert_eq!(
        rig.controller.trajectory().past()[0].position,
        Vec3::new(0.0, 0.0, -2.0)
    );
    Ok(())
}

#[test]
fn hybrid_animation_blends_out_on_input() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.play_animation(None);
    assert!(rig.controller.is_hybrid());
    assert_eq!(rig.matcher.log().blend_ins, 1);

    rig.frame();
    assert!(rig.controller.is_hybrid());
    assert_eq!(rig.matcher.log().blend_outs, 0);

    rig.controller.set_input(InputState::from_axes(1.0, 0.0));
    rig.frame();
    assert!(!rig.controller.is_hybrid());
    assert_eq!(rig.matcher.log().blend_outs, 1);
    assert!(rig
        .controller
        .drain_events()
        .contains(&ControllerEvent::HybridBlendedOut));

    rig.controller.play_animation(Some("wave"));
    assert_eq!(rig.matcher.log().triggers, vec!["wave".to_string()]);
    assert_eq!(rig.matcher.log().blend_ins, 1);
    Ok(())
}

#[test]
fn hybrid_blends_out_on_input_below_deadzone() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.play_animation(None);

    rig.controller.set_input(InputState::from_axes(0.01, 0.02));
    rig.frame();

    assert!(!rig.controller.has_movement_input());
    assert!(!rig.controller.is_hybrid());
    assert_eq!(rig.matcher.log().blend_outs, 1);
    Ok(())
}

#[test]
fn hybrid_stays_on_after_point_and_click_arrival() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.game.edit(|g| {
        g.movement_method = MovementMethod::PointAndClick;
        g.target_position = Some(Vec3::new(0.5, 0.0, 0.0));
    });
    rig.controller.play_animation(None);
    rig.frame();

    assert!(rig.controller.is_hybrid());
    assert_eq!(rig.matcher.log().blend_outs, 0);
    Ok(())
}

#[test]
fn disabled_collision_skips_motor_input() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.set_collision_enabled(false);
    assert!(!rig.motor.body().enabled);

    rig.controller.set_input(InputState::from_axes(0.0, 1.0));
    let (_, command) = rig.frame();
    assert_eq!(command, None);
    assert_eq!(rig.motor.body().inputs, MotorInputs::Null);

    rig.controller.set_collision_enabled(true);
    let (_, command) = rig.frame();
    assert!(command.is_some());
    assert!(rig.motor.body().enabled);
    Ok(())
}

#[test]
fn input_profile_reshapes_speed_and_warp_scale() -> anyhow::Result<()> {
    let profile = InputProfile {
        name: "walk".into(),
        ranges: vec![InputRange {
            min: 0.1,
            max: 1.0,
            remap: 0.5,
            pos_bias: 2.0,
            dir_bias: 1.0,
        }],
    };
    let mut rig = Rig::with(ControllerConfig::default(), |b| {
        b.predictor(Some(Arc::new(profile)))
    })?;
    rig.controller.set_input(InputState::from_axes(0.0, 1.0));

    let (prediction, _) = rig.frame();

    assert!(approx(prediction.desired_velocity.z, 2.0));
    assert!(approx(rig.matcher.log().warp_scale, 2.0));
    Ok(())
}

#[test]
fn builder_reports_missing_game_state() {
    let err = locomotion_controller::CharacterController::builder(ControllerConfig::default())
        .motor(Box::new(locomotion_host::sim::SimMotor::new()))
        .predictor(None)
        .animation_matcher(Box::new(locomotion_host::sim::StubMatcher::new(1)))
        .build()
        .err();
    assert_eq!(err, Some(SetupError::MissingGameState));
}
