//! Scenario tests for arbitration, prediction, and motor input.

use locomotion_controller::{
    arbiter::ControlState, events::ControllerEvent, input::InputState,
};
use locomotion_shared::{
    config::ControllerConfig,
    game_state::{CharState, MovementMethod},
    math::Vec3,
    physics::{CharacterMotor, MotorInputs},
};
use locomotion_tests::{approx, init_tracing, Rig};

/// Stick input beyond unit length is clamped, then scaled by max speed.
#[test]
fn direct_input_is_clamped_and_scaled() -> anyhow::Result<()> {
    init_tracing();
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.set_input(InputState::from_axes(2.0, 0.0));

    let (prediction, command) = rig.frame();

    assert_eq!(rig.controller.control_state(), ControlState::UnderDirectControl);
    assert!(!rig.controller.is_point_and_click());
    assert!(approx(prediction.desired_velocity.x, 4.0));
    assert!(approx(prediction.desired_velocity.z, 0.0));
    assert!(approx(prediction.desired_orientation, 90.0));
    match command.map(|c| c.inputs) {
        Some(MotorInputs::Player(inputs)) => {
            assert!(approx(inputs.move_axis_right, 4.0));
            assert!(approx(inputs.move_axis_forward, 0.0));
        }
        other => panic!("expected player inputs, got {other:?}"),
    }
    Ok(())
}

/// Outside gameplay a moving character follows the game's path.
#[test]
fn non_gameplay_moving_character_is_pathfinding_driven() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.game.edit(|g| {
        g.in_gameplay = false;
        g.char_state = CharState::Moving;
        g.target_position = Some(Vec3::new(10.0, 0.0, 0.0));
    });
    rig.controller.set_input(InputState {
        jump_pressed: true,
        ..InputState::from_axes(0.0, -1.0)
    });

    let (prediction, command) = rig.frame();

    assert_eq!(rig.controller.control_state(), ControlState::PathfindingDriven);
    assert!(rig.controller.is_point_and_click());
    // The stick is ignored; the target decides.
    assert!(approx(prediction.desired_velocity.x, 4.0));
    match command.map(|c| c.inputs) {
        Some(MotorInputs::Player(inputs)) => assert!(!inputs.jump_down),
        other => panic!("expected player inputs, got {other:?}"),
    }
    assert!(rig.matcher.log().events_begun.is_empty());
    Ok(())
}

#[test]
fn click_to_move_in_gameplay_is_pathfinding_driven() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.game.edit(|g| {
        g.movement_method = MovementMethod::PointAndClick;
        g.char_state = CharState::Moving;
        g.target_position = Some(Vec3::new(0.0, 0.0, 6.0));
    });
    rig.frame();
    assert_eq!(rig.controller.control_state(), ControlState::PathfindingDriven);
    Ok(())
}

#[test]
fn direct_flags_give_direct_control() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.frame();
    assert_eq!(rig.controller.control_state(), ControlState::UnderDirectControl);
    assert!(!rig.controller.is_point_and_click());
    Ok(())
}

/// A target closer than the stopping distance means stop.
#[test]
fn arrival_within_stopping_distance_stops() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig {
        stopping_distance: 1.0,
        ..Default::default()
    })?;
    rig.game.edit(|g| {
        g.in_gameplay = false;
        g.char_state = CharState::Moving;
        g.target_position = Some(Vec3::new(0.5, 0.0, 0.0));
    });

    let (prediction, _) = rig.frame();

    assert_eq!(prediction.desired_velocity, Vec3::ZERO);
    assert!(!rig.controller.has_movement_input());
    Ok(())
}

/// The stop rule compares the squared distance with the stopping distance.
#[test]
fn stopping_distance_applies_to_squared_distance() -> anyhow::Result<()> {
    let pathing = |target: Vec3| {
        move |g: &mut locomotion_host::sim::GameScript| {
            g.in_gameplay = false;
            g.char_state = CharState::Moving;
            g.target_position = Some(target);
        }
    };

    // 0.36 < 0.5: stop.
    let mut rig = Rig::new(ControllerConfig {
        stopping_distance: 0.5,
        ..Default::default()
    })?;
    rig.game.edit(pathing(Vec3::new(0.6, 0.0, 0.0)));
    let (prediction, _) = rig.frame();
    assert_eq!(prediction.desired_velocity, Vec3::ZERO);
    assert!(!rig.controller.has_movement_input());

    // 3.24 >= 3.0: keep going.
    let mut rig = Rig::new(ControllerConfig {
        stopping_distance: 3.0,
        ..Default::default()
    })?;
    rig.game.edit(pathing(Vec3::new(1.8, 0.0, 0.0)));
    let (prediction, _) = rig.frame();
    assert!(approx(prediction.desired_velocity.x, 4.0));
    assert!(rig.controller.has_movement_input());
    Ok(())
}

#[test]
fn turning_only_zeroes_base_velocity() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    let mut motor = rig.motor.clone();
    motor.set_base_velocity(Vec3::new(3.0, 0.0, -2.0));
    rig.game.edit(|g| {
        g.in_gameplay = false;
        g.char_state = CharState::Idle;
    });

    let (_, command) = rig.frame();
    let command = command.ok_or_else(|| anyhow::anyhow!("collision is enabled"))?;

    assert_eq!(rig.controller.control_state(), ControlState::TurningOnly);
    assert_eq!(command.inputs, MotorInputs::Null);
    assert!(command.zero_base_velocity);
    assert_eq!(rig.motor.body().base_velocity, Vec3::ZERO);

    rig.physics(0.02);
    assert_eq!(rig.motor.body().position, Vec3::ZERO);
    Ok(())
}

#[test]
fn state_change_is_reported_once() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.frame();
    assert_eq!(
        rig.controller.drain_events(),
        vec![ControllerEvent::ControlStateChanged {
            from: ControlState::Uninitialized,
            to: ControlState::UnderDirectControl,
        }]
    );

    rig.frame();
    assert!(rig.controller.drain_events().is_empty());

    rig.game.edit(|g| g.is_player = false);
    rig.frame();
    assert_eq!(
        rig.controller.drain_events(),
        vec![ControllerEvent::ControlStateChanged {
            from: ControlState::UnderDirectControl,
            to: ControlState::TurningOnly,
        }]
    );
    Ok(())
}

/// Steady forward input drives the character and shapes the goal.
#[test]
fn forward_input_moves_character_and_goal() -> anyhow::Result<()> {
    let mut rig = Rig::new(ControllerConfig::default())?;
    rig.controller.set_input(InputState::from_axes(0.0, 1.0));

    for _ in 0..120 {
        rig.physics(1.0 / 60.0);
        rig.frame();
    }

    let body = rig.motor.body();
    assert!(body.position.z > 5.0, "moved to {:?}", body.position);
    assert!(body.position.x.abs() < 1e-3);

    let log = rig.matcher.log();
    assert_eq!(log.goal.len(), 6);
    assert!(approx(log.warp_scale, 1.0));
    let last = log.goal[5];
    assert!(last.position.z > 3.0, "goal end {:?}", last.position);
    let first = log.goal[0];
    assert!(first.position.z < 0.0, "goal start {:?}", first.position);
    Ok(())
}

#[test]
fn camera_rotates_direct_input() -> anyhow::Result<()> {
    let mut rig = Rig::with(ControllerConfig::default(), |b| {
        b.camera_forward(Vec3::new(1.0, -0.5, 0.0))
    })?;
    rig.controller.set_input(InputState::from_axes(0.0, 1.0));

    let (prediction, _) = rig.frame();

    assert!(approx(prediction.desired_velocity.x, 4.0));
    assert!(approx(prediction.desired_velocity.z, 0.0));
    Ok(())
}
