use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::capture::CaptureCommand;
use crate::character_controller::{ControllerInput, ControllerSet, ControllerState};

/// Fills [`ControllerInput`] from keyboard and mouse, and applies [`CaptureCommand`]s to the
/// primary window.
pub struct ControllerInputPlugin;

impl Plugin for ControllerInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                controller_input.in_set(ControllerSet::Input),
                apply_capture_commands.after(ControllerSet::Capture),
            ),
        );
    }
}

#[derive(Component, Debug, Clone)]
pub struct ControllerBindings {
    pub keys_forward: [KeyCode; 2],
    pub keys_back: [KeyCode; 2],
    pub keys_left: [KeyCode; 2],
    pub keys_right: [KeyCode; 2],
    pub key_run: KeyCode,
    pub key_jump: KeyCode,
    pub key_release: KeyCode,
    pub engage_button: MouseButton,
    /// Converts raw mouse pixels into look axis units.
    pub pointer_scale: f32,
}

impl Default for ControllerBindings {
    fn default() -> Self {
        Self {
            keys_forward: [KeyCode::KeyW, KeyCode::ArrowUp],
            keys_back: [KeyCode::KeyS, KeyCode::ArrowDown],
            keys_left: [KeyCode::KeyA, KeyCode::ArrowLeft],
            keys_right: [KeyCode::KeyD, KeyCode::ArrowRight],
            key_run: KeyCode::ShiftLeft,
            key_jump: KeyCode::Space,
            key_release: KeyCode::Escape,
            engage_button: MouseButton::Left,
            pointer_scale: 0.1,
        }
    }
}

pub fn controller_input(
    key_input: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_events: EventReader<MouseMotion>,
    mut query: Query<(&ControllerBindings, &ControllerState, &mut ControllerInput)>,
) {
    let mut mouse_delta = Vec2::ZERO;
    for mouse_event in mouse_events.read() {
        mouse_delta += mouse_event.delta;
    }

    for (bindings, state, mut input) in query.iter_mut() {
        // screen y grows downward, look y grows upward
        input.look = if state.capture.is_captured() {
            Vec2::new(mouse_delta.x, -mouse_delta.y) * bindings.pointer_scale
        } else {
            Vec2::ZERO
        };
        input.movement = Vec2::new(
            get_axis(&key_input, bindings.keys_right, bindings.keys_left),
            get_axis(&key_input, bindings.keys_forward, bindings.keys_back),
        );
        input.run = key_input.pressed(bindings.key_run);
        input.jump = key_input.just_pressed(bindings.key_jump);
        input.release_capture = key_input.just_pressed(bindings.key_release);
        input.engage_capture = mouse_buttons.just_pressed(bindings.engage_button);
    }
}

fn apply_capture_commands(
    mut capture_commands: EventReader<CaptureCommand>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(command) = capture_commands.read().last() else {
        return;
    };
    for mut window in &mut windows {
        if command.locked {
            window.cursor_options.grab_mode = CursorGrabMode::Locked;
            window.cursor_options.visible = false;
        } else {
            window.cursor_options.grab_mode = CursorGrabMode::None;
            window.cursor_options.visible = true;
        }
    }
}

fn get_pressed(key_input: &ButtonInput<KeyCode>, keys: [KeyCode; 2]) -> f32 {
    if key_input.any_pressed(keys) { 1.0 } else { 0.0 }
}

fn get_axis(key_input: &ButtonInput<KeyCode>, keys_pos: [KeyCode; 2], keys_neg: [KeyCode; 2]) -> f32 {
    get_pressed(key_input, keys_pos) - get_pressed(key_input, keys_neg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        let bindings = ControllerBindings::default();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::ArrowDown);
        assert_eq!(get_axis(&keys, bindings.keys_forward, bindings.keys_back), 0.0);
    }

    #[test]
    fn either_binding_drives_axis() {
        let bindings = ControllerBindings::default();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::ArrowLeft);
        assert_eq!(get_axis(&keys, bindings.keys_right, bindings.keys_left), -1.0);
    }
}
