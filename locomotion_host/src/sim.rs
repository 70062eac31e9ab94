//! Headless stand-ins for the engine collaborators.
//!
//! Each type is a cheap clonable handle over shared state so the host keeps
//! a view of what it boxed into the controller.

use std::sync::{Arc, Mutex, MutexGuard};

use locomotion_shared::{
    animation::{AnimationMatcher, EventDefinition, TrajectoryPoint},
    game_state::{CharState, GameStateProvider, MovementMethod},
    math::{lerp_angle, Quat, Vec3},
    physics::{Capsule, CharacterMotor, MotorInputs},
};
use tracing::trace;

fn lock<T>(shared: &Mutex<T>) -> MutexGuard<'_, T> {
    // Guarded states are plain data; poisoning is ignored.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Kinematic body integrated on the physics cadence.
#[derive(Debug, Clone)]
pub struct MotorBody {
    pub position: Vec3,
    /// World yaw in degrees.
    pub facing: f32,
    pub base_velocity: Vec3,
    pub inputs: MotorInputs,
    pub capsule: Capsule,
    pub enabled: bool,
    pub max_stable_move_speed: f32,
    pub ground_height: f32,
}

impl Default for MotorBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            facing: 0.0,
            base_velocity: Vec3::ZERO,
            inputs: MotorInputs::Null,
            capsule: Capsule::default(),
            enabled: true,
            max_stable_move_speed: 10.0,
            ground_height: 0.0,
        }
    }
}

/// Flat-ground motor. Player axes are read as a planar velocity request
/// capped at the max stable move speed.
#[derive(Debug, Clone, Default)]
pub struct SimMotor {
    body: Arc<Mutex<MotorBody>>,
}

impl SimMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> MotorBody {
        lock(&self.body).clone()
    }

    /// Advances the body by one physics step.
    pub fn integrate(&self, dt: f32) {
        let mut body = lock(&self.body);
        if !body.enabled {
            return;
        }
        if let MotorInputs::Player(inputs) = body.inputs {
            let request = Vec3::new(inputs.move_axis_right, 0.0, inputs.move_axis_forward);
            let cap = body.max_stable_move_speed;
            body.base_velocity = if request.len() > cap {
                request.normalized() * cap
            } else {
                request
            };
        }
        let step = body.base_velocity * dt;
        body.position += step;
        body.position.y = body.ground_height;
        trace!(position = ?body.position, velocity = ?body.base_velocity, "Motor integrated");
    }

    /// Rotates the body towards `yaw` by fraction `t`.
    pub fn turn_towards(&self, yaw: f32, t: f32) {
        let mut body = lock(&self.body);
        body.facing = lerp_angle(body.facing, yaw, t);
    }
}

impl CharacterMotor for SimMotor {
    fn set_inputs(&mut self, inputs: MotorInputs) {
        lock(&self.body).inputs = inputs;
    }

    fn base_velocity(&self) -> Vec3 {
        lock(&self.body).base_velocity
    }

    fn set_base_velocity(&mut self, velocity: Vec3) {
        lock(&self.body).base_velocity = velocity;
    }

    fn is_stable_on_ground(&self) -> bool {
        let body = lock(&self.body);
        body.position.y <= body.ground_height
    }

    fn capsule(&self) -> Capsule {
        lock(&self.body).capsule
    }

    fn set_capsule(&mut self, capsule: Capsule) {
        lock(&self.body).capsule = capsule;
    }

    fn position(&self) -> Vec3 {
        lock(&self.body).position
    }

    fn facing(&self) -> f32 {
        lock(&self.body).facing
    }

    fn set_position(&mut self, position: Vec3) {
        lock(&self.body).position = position;
    }

    fn set_rotation(&mut self, rotation: Quat) {
        lock(&self.body).facing = rotation.yaw_degrees();
    }

    fn set_enabled(&mut self, enabled: bool) {
        lock(&self.body).enabled = enabled;
    }

    fn set_max_stable_move_speed(&mut self, speed: f32) {
        lock(&self.body).max_stable_move_speed = speed;
    }
}

/// Game-side view of the character, mutated by the host script.
#[derive(Debug, Clone)]
pub struct GameScript {
    pub in_gameplay: bool,
    pub is_player: bool,
    pub is_pathfinding: bool,
    pub movement_method: MovementMethod,
    pub char_state: CharState,
    pub target_position: Option<Vec3>,
    pub target_rotation: Quat,
}

impl Default for GameScript {
    fn default() -> Self {
        Self {
            in_gameplay: true,
            is_player: true,
            is_pathfinding: false,
            movement_method: MovementMethod::Direct,
            char_state: CharState::Idle,
            target_position: None,
            target_rotation: Quat::IDENTITY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedGameState {
    script: Arc<Mutex<GameScript>>,
}

impl ScriptedGameState {
    pub fn new(script: GameScript) -> Self {
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    pub fn script(&self) -> GameScript {
        lock(&self.script).clone()
    }

    pub fn edit(&self, f: impl FnOnce(&mut GameScript)) {
        f(&mut lock(&self.script));
    }
}

impl GameStateProvider for ScriptedGameState {
    fn in_gameplay(&self) -> bool {
        lock(&self.script).in_gameplay
    }

    fn is_player(&self) -> bool {
        lock(&self.script).is_player
    }

    fn is_pathfinding(&self) -> bool {
        lock(&self.script).is_pathfinding
    }

    fn movement_method(&self) -> MovementMethod {
        lock(&self.script).movement_method
    }

    fn char_state(&self) -> CharState {
        lock(&self.script).char_state
    }

    fn target_position(&self) -> Option<Vec3> {
        lock(&self.script).target_position
    }

    fn target_rotation(&self) -> Quat {
        lock(&self.script).target_rotation
    }
}

/// What the stub matcher has been told.
#[derive(Debug, Clone, Default)]
pub struct MatcherLog {
    pub goal: Vec<TrajectoryPoint>,
    pub goals_received: u64,
    pub warp_scale: f32,
    pub events_begun: Vec<String>,
    pub modified_contacts: Vec<Vec3>,
    pub blend_ins: u32,
    pub blend_outs: u32,
    pub triggers: Vec<String>,
    /// World position goal points are relative to.
    pub origin: Vec3,
    frames_left_in_event: Option<u32>,
}

/// Matcher that "plays" each event for a fixed number of goal updates.
#[derive(Debug, Clone)]
pub struct StubMatcher {
    log: Arc<Mutex<MatcherLog>>,
    event_frames: u32,
}

impl StubMatcher {
    pub fn new(event_frames: u32) -> Self {
        Self {
            log: Arc::default(),
            event_frames,
        }
    }

    pub fn log(&self) -> MatcherLog {
        lock(&self.log).clone()
    }

    pub fn set_origin(&self, origin: Vec3) {
        lock(&self.log).origin = origin;
    }
}

impl AnimationMatcher for StubMatcher {
    fn set_trajectory_goal(&mut self, goal: &[TrajectoryPoint]) {
        let mut log = lock(&self.log);
        log.goal.clear();
        log.goal.extend_from_slice(goal);
        log.goals_received += 1;
        if let Some(left) = log.frames_left_in_event.as_mut() {
            *left = left.saturating_sub(1);
        }
    }

    fn set_long_error_warp_scale(&mut self, scale: f32) {
        lock(&self.log).warp_scale = scale;
    }

    fn begin_event(&mut self, definition: &EventDefinition) {
        let mut log = lock(&self.log);
        log.events_begun.push(definition.id.clone());
        log.frames_left_in_event = Some(self.event_frames);
    }

    fn is_event_complete(&self) -> bool {
        matches!(lock(&self.log).frames_left_in_event, None | Some(0))
    }

    /// Lands where the trajectory goal ends.
    fn next_event_contact_world_position(&self) -> Vec3 {
        let log = lock(&self.log);
        let end = log.goal.last().map(|p| p.position).unwrap_or(Vec3::ZERO);
        log.origin + end
    }

    fn modify_desired_event_contact_position(&mut self, position: Vec3) {
        lock(&self.log).modified_contacts.push(position);
    }

    fn blend_in_controller(&mut self, _blend_time: f32) {
        lock(&self.log).blend_ins += 1;
    }

    fn blend_out_controller(&mut self, _blend_time: f32) {
        lock(&self.log).blend_outs += 1;
    }

    fn set_trigger(&mut self, name: &str) {
        lock(&self.log).triggers.push(name.to_string());
    }
}
