use bevy::prelude::*;

use crate::character_controller::{
    ControllerInput, ControllerState, GROUNDED_BIAS, GroundContact, MoveRequest,
};
use crate::config::ControllerConfig;

/// Horizontal directions of the body after this tick's look was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveBasis {
    pub right: Vec3,
    pub forward: Vec3,
}

impl MoveBasis {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            right: *transform.right(),
            forward: *transform.forward(),
        }
    }
}

/// Locomotion-relevant slice of [`ControllerInput`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionInput {
    /// (lateral, forward), each in [-1, 1]
    pub movement: Vec2,
    pub run: bool,
    /// Edge: true only on the tick the jump button went down.
    pub jump: bool,
}

impl From<&ControllerInput> for LocomotionInput {
    fn from(input: &ControllerInput) -> Self {
        Self {
            movement: input.movement,
            run: input.run,
            jump: input.jump,
        }
    }
}

/// Integrates one tick and returns the displacement to hand to the collision stage.
///
/// `grounded_now` is the contact reported after the previous tick's move. The jump impulse
/// is assigned before this tick's gravity is added, so a launch loses `gravity * dt` at once.
pub fn apply_locomotion(
    state: &mut ControllerState,
    config: &ControllerConfig,
    basis: MoveBasis,
    input: LocomotionInput,
    grounded_now: bool,
    dt: f32,
) -> Vec3 {
    state.grounded = grounded_now;
    if state.grounded && state.vertical_velocity <= 0.0 {
        state.vertical_velocity = GROUNDED_BIAS;
    }

    let direction = (basis.right * input.movement.x + basis.forward * input.movement.y)
        .normalize_or_zero();
    let speed = if input.run {
        config.run_speed
    } else {
        config.walk_speed
    };
    let horizontal = direction * speed * dt;

    if input.jump && state.grounded {
        state.vertical_velocity = config.jump_velocity();
    }

    state.vertical_velocity += config.gravity * dt;

    horizontal + Vec3::Y * state.vertical_velocity * dt
}

pub fn controller_move(
    time: Res<Time>,
    mut query: Query<(
        &ControllerConfig,
        &ControllerInput,
        &GroundContact,
        &Transform,
        &mut ControllerState,
        &mut MoveRequest,
    )>,
) {
    let dt = time.delta_secs();

    for (config, input, contact, transform, mut state, mut request) in query.iter_mut() {
        let was_grounded = state.grounded;
        request.0 = apply_locomotion(
            &mut state,
            config,
            MoveBasis::from_transform(transform),
            input.into(),
            contact.grounded,
            dt,
        );
        if was_grounded != state.grounded {
            debug!("grounded: {}", state.grounded);
        }
    }
}
