use bevy::prelude::*;

use crate::character_controller::{ControllerInput, ControllerState};

/// Whether pointer motion is routed to look input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Captured,
    Free,
}

impl CaptureState {
    pub fn is_captured(self) -> bool {
        self == CaptureState::Captured
    }

    /// Steps the toggle with this tick's edges. A release is handled before an engage.
    /// Returns the new state and whether it changed.
    pub fn step(self, release: bool, engage: bool) -> (Self, bool) {
        let mut next = self;
        if release {
            next = CaptureState::Free;
        }
        if engage {
            next = CaptureState::Captured;
        }
        (next, next != self)
    }
}

/// Lock (`locked == true`) or release the pointer on behalf of `entity`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureCommand {
    pub entity: Entity,
    pub locked: bool,
}

pub fn controller_capture(
    mut query: Query<(Entity, &ControllerInput, &mut ControllerState)>,
    mut capture_commands: EventWriter<CaptureCommand>,
) {
    for (entity, input, mut state) in query.iter_mut() {
        let (next, changed) = state
            .capture
            .step(input.release_capture, input.engage_capture);
        if changed {
            state.capture = next;
            debug!("controller {entity} capture: {next:?}");
            capture_commands.write(CaptureCommand {
                entity,
                locked: next.is_captured(),
            });
        }
    }
}
