use bevy::prelude::*;

use crate::character_controller::{ControllerInput, ControllerState, FirstPersonController};
use crate::config::ControllerConfig;

/// Applies one tick of pointer input.
///
/// Updates `state.pitch` (clamped to the configured limit) and returns the yaw delta in
/// degrees for whoever owns the body transform. Positive yaw turns right.
///
/// A sensitivity of zero or below disables look; it never inverts the axes.
pub fn apply_look(state: &mut ControllerState, config: &ControllerConfig, delta: Vec2) -> f32 {
    let sensitivity = config.look_sensitivity();
    let yaw_delta = delta.x * sensitivity;
    let limit = config.look_limit();
    state.pitch = (state.pitch - delta.y * sensitivity).clamp(-limit, limit);
    yaw_delta
}

/// Head rotation for a pitch in degrees: about the local right axis only.
pub fn head_rotation(pitch: f32) -> Quat {
    // positive pitch looks down, which is a negative turn about +X with -Z forward
    Quat::from_rotation_x(-pitch.to_radians())
}

/// Body rotation step for a yaw delta in degrees, about world up.
pub fn body_yaw(yaw_delta: f32) -> Quat {
    Quat::from_rotation_y(-yaw_delta.to_radians())
}

pub fn controller_look(
    mut controllers: Query<(
        &FirstPersonController,
        &ControllerConfig,
        &ControllerInput,
        &mut ControllerState,
        &mut Transform,
    )>,
    mut heads: Query<&mut Transform, Without<FirstPersonController>>,
) {
    for (controller, config, input, mut state, mut transform) in controllers.iter_mut() {
        let yaw_delta = apply_look(&mut state, config, input.look);
        if yaw_delta != 0.0 {
            transform.rotate(body_yaw(yaw_delta));
        }

        if let Ok(mut head) = heads.get_mut(controller.head) {
            head.rotation = head_rotation(state.pitch);
        }
    }
}
