//! Input handling.
//!
//! The host samples devices (or game logic) once per tick and hands the
//! controller an `InputState`. This module turns that state into the raw
//! movement vector the trajectory predictor works from.

use locomotion_shared::{
    config::MoveMode,
    math::{Vec2, Vec3},
};

/// Movement input for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    /// Stick/axis input: `x` is horizontal, `y` is vertical.
    pub axes: Vec2,
    /// Host-provided vector that replaces the axes when set.
    pub custom: Option<Vec3>,
    /// Point-and-click destination in world space.
    pub target: Option<Vec3>,
    pub move_mode: MoveMode,
    /// Jump was pressed this tick.
    pub jump_pressed: bool,
}

impl InputState {
    pub fn from_axes(horizontal: f32, vertical: f32) -> Self {
        Self {
            axes: Vec2::new(horizontal, vertical),
            ..Default::default()
        }
    }

    /// Planar input vector before any mode remapping.
    pub fn wish_vector(&self) -> Vec3 {
        self.custom
            .unwrap_or(Vec3::new(self.axes.x, 0.0, self.axes.y))
    }
}

/// Sources the raw input vector for a tick.
///
/// Direct mode uses the axes (or the custom vector); climbing moves the
/// vertical axis into Y. Point-and-click mode steers towards the target.
/// Returns `None` when the character should stop: no target, or the squared
/// distance to it is below `stopping_distance`.
pub fn source_raw_input(
    input: &InputState,
    point_and_click: bool,
    position: Vec3,
    stopping_distance: f32,
) -> Option<Vec3> {
    if point_and_click {
        let to_target = input.target? - position;
        if to_target.len_sq() < stopping_distance {
            return None;
        }
        return Some(to_target);
    }

    let wish = input.wish_vector();
    match input.move_mode {
        MoveMode::Climb => Some(Vec3::new(wish.x, wish.z, wish.y)),
        MoveMode::Normal | MoveMode::Strafe => Some(wish),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_axes_map_to_planar_vector() {
        let input = InputState::from_axes(0.5, -1.0);
        assert_eq!(
            source_raw_input(&input, false, Vec3::ZERO, 1.0),
            Some(Vec3::new(0.5, 0.0, -1.0))
        );
    }

    #[test]
    fn climb_moves_vertical_axis_into_y() {
        let input = InputState {
            move_mode: MoveMode::Climb,
            ..InputState::from_axes(0.25, 1.0)
        };
        assert_eq!(
            source_raw_input(&input, false, Vec3::ZERO, 1.0),
            Some(Vec3::new(0.25, 1.0, 0.0))
        );
    }

    #[test]
    fn custom_vector_overrides_axes() {
        let input = InputState {
            custom: Some(Vec3::new(0.0, 0.0, 0.3)),
            ..InputState::from_axes(1.0, 1.0)
        };
        assert_eq!(
            source_raw_input(&input, false, Vec3::ZERO, 1.0),
            Some(Vec3::new(0.0, 0.0, 0.3))
        );
    }

    #[test]
    fn point_and_click_stops_inside_radius() {
        let input = InputState {
            target: Some(Vec3::new(0.5, 0.0, 0.0)),
            ..Default::default()
        };
        assert_eq!(source_raw_input(&input, true, Vec3::ZERO, 1.0), None);
    }

    #[test]
    fn stopping_distance_compares_squared_distance() {
        let near = InputState {
            target: Some(Vec3::new(0.6, 0.0, 0.0)),
            ..Default::default()
        };
        // 0.36 < 0.5
        assert_eq!(source_raw_input(&near, true, Vec3::ZERO, 0.5), None);
        // 0.36 >= 0.3
        assert_eq!(
            source_raw_input(&near, true, Vec3::ZERO, 0.3),
            Some(Vec3::new(0.6, 0.0, 0.0))
        );

        let far = InputState {
            target: Some(Vec3::new(1.8, 0.0, 0.0)),
            ..Default::default()
        };
        // 3.24 >= 3.0
        assert_eq!(
            source_raw_input(&far, true, Vec3::ZERO, 3.0),
            Some(Vec3::new(1.8, 0.0, 0.0))
        );
        // 3.24 < 4.0
        assert_eq!(source_raw_input(&far, true, Vec3::ZERO, 4.0), None);
    }

    #[test]
    fn point_and_click_without_target_stops() {
        let input = InputState::from_axes(1.0, 0.0);
        assert_eq!(source_raw_input(&input, true, Vec3::ZERO, 1.0), None);
    }

    #[test]
    fn point_and_click_steers_to_target() {
        let input = InputState {
            target: Some(Vec3::new(3.0, 0.0, 4.0)),
            ..Default::default()
        };
        assert_eq!(
            source_raw_input(&input, true, Vec3::new(1.0, 0.0, 0.0), 1.0),
            Some(Vec3::new(2.0, 0.0, 4.0))
        );
    }
}
