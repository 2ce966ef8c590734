use bevy::prelude::*;

use crate::capture::{CaptureCommand, CaptureState, controller_capture};
use crate::config::ControllerConfig;
use crate::input_plugin::ControllerBindings;
use crate::locomotion::controller_move;
use crate::look::controller_look;

/// Runs the look/locomotion integrator once per frame in `Update`.
///
/// The sets are chained, so anything gathering input belongs in [`ControllerSet::Input`]
/// and anything resolving [`MoveRequest`]s belongs in [`ControllerSet::Collision`]:
///
/// ```
/// # use bevy::prelude::*;
/// # use fp_controller::ControllerSet;
/// struct MyCollisionPlugin;
/// impl Plugin for MyCollisionPlugin {
///     fn build(&self, app: &mut App) {
///         app.add_systems(Update, my_resolver.in_set(ControllerSet::Collision));
///     }
/// }
///
/// fn my_resolver() { }
/// ```
pub struct FirstPersonControllerPlugin;

impl Plugin for FirstPersonControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CaptureCommand>()
            .configure_sets(
                Update,
                (
                    ControllerSet::Input,
                    ControllerSet::Look,
                    ControllerSet::Locomotion,
                    ControllerSet::Collision,
                    ControllerSet::Capture,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    announce_controllers.before(ControllerSet::Input),
                    controller_look.in_set(ControllerSet::Look),
                    controller_move.in_set(ControllerSet::Locomotion),
                    controller_capture.in_set(ControllerSet::Capture),
                ),
            );
    }
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    Input,
    Look,
    Locomotion,
    Collision,
    Capture,
}

/// The controlled body. `head` is the camera/head entity the host spawned for it;
/// it receives the pitch while the body itself receives the yaw.
#[derive(Component, Debug)]
#[require(
    ControllerConfig,
    ControllerState,
    ControllerInput,
    ControllerBindings,
    MoveRequest,
    GroundContact
)]
pub struct FirstPersonController {
    pub head: Entity,
}

impl FirstPersonController {
    pub fn new(head: Entity) -> Self {
        Self { head }
    }
}

/// Vertical velocity the controller holds while standing, keeps it pressed into the floor.
pub const GROUNDED_BIAS: f32 = -2.0;

/// Mutable per-tick state of a controller.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Head tilt in degrees, positive looks down.
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    pub capture: CaptureState,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            vertical_velocity: 0.0,
            grounded: false,
            capture: CaptureState::Captured,
        }
    }
}

/// Input sampled for the current tick.
///
/// `look` is in input-axis units with +y meaning the pointer moved up. `movement` is
/// (lateral, forward) in [-1, 1]. `jump`, `release_capture` and `engage_capture` are edges.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ControllerInput {
    pub look: Vec2,
    pub movement: Vec2,
    pub run: bool,
    pub jump: bool,
    pub release_capture: bool,
    pub engage_capture: bool,
}

/// Displacement the locomotion stage asks the collision stage to perform this tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveRequest(pub Vec3);

/// Ground contact reported by the collision stage, read by the next tick's locomotion.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundContact {
    pub grounded: bool,
}

fn announce_controllers(
    query: Query<(Entity, &ControllerConfig, &ControllerState), Added<FirstPersonController>>,
    mut capture_commands: EventWriter<CaptureCommand>,
) {
    for (entity, config, state) in query.iter() {
        info!(
            "first person controller {entity} spawned (walk {}, run {}, jump {})",
            config.walk_speed, config.run_speed, config.jump_height
        );
        for issue in config.validate() {
            warn!("controller {entity}: {issue}");
        }
        capture_commands.write(CaptureCommand {
            entity,
            locked: state.capture.is_captured(),
        });
    }
}
