//! Keyboard and mouse state for driving the tank.
//!
//! The host forwards DOM events here; the simulation reads a
//! [`ControlInput`] snapshot once per frame.

use nalgebra::{Vector2, Vector3};

const MOVEMENT_MULTIPLIER: f32 = 0.5;
const ROTATION_MULTIPLIER: f32 = 0.5;
const DRAG_BUTTON: i16 = 0;

/// One frame of control intent.
///
/// `move_vector.x` is turn intent, `move_vector.z` is throttle with
/// negative meaning forward. `rotation_vector` is (pitch, yaw) look intent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlInput {
    pub move_vector: Vector3<f32>,
    pub rotation_vector: Vector2<f32>,
    pub mouse_drag_on: bool,
}

impl Default for ControlInput {
    fn default() -> Self {
        ControlInput {
            move_vector: Vector3::zeros(),
            rotation_vector: Vector2::zeros(),
            mouse_drag_on: false,
        }
    }
}

#[derive(Default, Debug, Clone, Copy)]
struct MoveState {
    up: f32,
    down: f32,
    left: f32,
    right: f32,
    forward: f32,
    back: f32,
    pitch_up: f32,
    pitch_down: f32,
    yaw_left: f32,
    yaw_right: f32,
}

#[derive(Default, Debug, Clone)]
pub struct InputState {
    moves: MoveState,
    mouse_drag_on: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `code` is a driving key.
    pub fn key_down(&mut self, code: &str) -> bool {
        self.set_key(code, 1.0)
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.set_key(code, 0.0)
    }

    fn set_key(&mut self, code: &str, value: f32) -> bool {
        let slot = match code {
            "ArrowUp" | "KeyW" => &mut self.moves.forward,
            "ArrowDown" | "KeyS" => &mut self.moves.back,
            "ArrowLeft" | "KeyA" => &mut self.moves.left,
            "ArrowRight" | "KeyD" => &mut self.moves.right,
            "KeyR" | "Space" => &mut self.moves.up,
            "KeyF" | "ShiftLeft" => &mut self.moves.down,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn mouse_down(&mut self, button: i16) {
        if button == DRAG_BUTTON {
            self.mouse_drag_on = true;
        }
    }

    /// Ending a drag drops any pitch/yaw intent.
    pub fn mouse_up(&mut self, button: i16) {
        if button == DRAG_BUTTON {
            self.mouse_drag_on = false;
            self.moves.pitch_up = 0.0;
            self.moves.pitch_down = 0.0;
            self.moves.yaw_left = 0.0;
            self.moves.yaw_right = 0.0;
        }
    }

    /// Pointer position in page pixels against a `width` x `height` viewport.
    pub fn mouse_move(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if !self.mouse_drag_on || width <= 0.0 || height <= 0.0 {
            return;
        }

        let half_width = width / 2.0;
        let half_height = height / 2.0;
        let nx = (x - half_width) / half_width;
        let ny = (y - half_height) / half_height;

        self.moves.yaw_left = if nx < 0.0 { -nx } else { 0.0 };
        self.moves.yaw_right = if nx > 0.0 { nx } else { 0.0 };
        self.moves.pitch_down = if ny > 0.0 { ny } else { 0.0 };
        self.moves.pitch_up = if ny < 0.0 { -ny } else { 0.0 };
    }

    pub fn mouse_drag_on(&self) -> bool {
        self.mouse_drag_on
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn controls(&self) -> ControlInput {
        let m = &self.moves;
        ControlInput {
            move_vector: Vector3::new(
                m.right - m.left,
                m.up - m.down,
                m.back - m.forward,
            ) * MOVEMENT_MULTIPLIER,
            rotation_vector: Vector2::new(
                m.pitch_up - m.pitch_down,
                m.yaw_left - m.yaw_right,
            ) * ROTATION_MULTIPLIER,
            mouse_drag_on: self.mouse_drag_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forward_key_yields_negative_z() {
        let mut input = InputState::new();
        assert!(input.key_down("KeyW"));
        assert_relative_eq!(input.controls().move_vector.z, -0.5);
        input.key_up("KeyW");
        assert_relative_eq!(input.controls().move_vector.z, 0.0);
    }

    #[test]
    fn opposing_keys_cancel() {
        let mut input = InputState::new();
        input.key_down("ArrowLeft");
        input.key_down("KeyD");
        assert_relative_eq!(input.controls().move_vector.x, 0.0);
        input.key_up("ArrowLeft");
        assert_relative_eq!(input.controls().move_vector.x, 0.5);
    }

    #[test]
    fn unknown_keys_are_not_handled() {
        let mut input = InputState::new();
        assert!(!input.key_down("KeyZ"));
        assert_eq!(input.controls(), ControlInput::default());
    }

    #[test]
    fn mouse_move_ignored_without_drag() {
        let mut input = InputState::new();
        input.mouse_move(0.0, 0.0, 800.0, 600.0);
        assert_eq!(input.controls().rotation_vector, Vector2::zeros());
    }

    #[test]
    fn drag_maps_pointer_to_look_intent() {
        let mut input = InputState::new();
        input.mouse_down(0);
        // Top-left corner: full yaw left and full pitch up.
        input.mouse_move(0.0, 0.0, 800.0, 600.0);
        let controls = input.controls();
        assert!(controls.mouse_drag_on);
        assert_relative_eq!(controls.rotation_vector.x, 0.5);
        assert_relative_eq!(controls.rotation_vector.y, 0.5);

        input.mouse_move(600.0, 450.0, 800.0, 600.0);
        let controls = input.controls();
        assert_relative_eq!(controls.rotation_vector.x, -0.25);
        assert_relative_eq!(controls.rotation_vector.y, -0.25);
    }

    #[test]
    fn releasing_drag_clears_look_intent() {
        let mut input = InputState::new();
        input.mouse_down(0);
        input.mouse_move(100.0, 100.0, 800.0, 600.0);
        input.mouse_up(0);
        let controls = input.controls();
        assert!(!controls.mouse_drag_on);
        assert_eq!(controls.rotation_vector, Vector2::zeros());
    }

    #[test]
    fn only_primary_button_drags() {
        let mut input = InputState::new();
        input.mouse_down(2);
        assert!(!input.mouse_drag_on());
    }

    #[test]
    fn clear_drops_held_keys() {
        let mut input = InputState::new();
        input.key_down("KeyW");
        input.key_down("Space");
        input.mouse_down(0);
        input.clear();
        assert_eq!(input.controls(), ControlInput::default());
    }
}
