//! Headless runs of the controller plugin.
//!
//! No physics or window plugins are added: tests play the collision stage by writing
//! `GroundContact` and reading `MoveRequest`, and drive input through `ControllerInput`.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use fp_controller::*;

const DT: f32 = 0.02;
const EPS: f32 = 1e-3;

fn headless_app() -> (App, Entity, Entity) {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, FirstPersonControllerPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)))
        .init_resource::<CaptureLog>()
        .add_systems(Update, record_capture.after(ControllerSet::Capture));

    let head = app
        .world_mut()
        .spawn(Transform::from_xyz(0.0, 0.7, 0.0))
        .id();
    let body = app
        .world_mut()
        .spawn((FirstPersonController::new(head), Transform::default()))
        .id();

    // first frame has a zero delta
    app.update();
    (app, body, head)
}

fn set_input(app: &mut App, body: Entity, input: ControllerInput) {
    *app.world_mut().get_mut::<ControllerInput>(body).unwrap() = input;
}

fn set_grounded(app: &mut App, body: Entity, grounded: bool) {
    app.world_mut().get_mut::<GroundContact>(body).unwrap().grounded = grounded;
}

fn state(app: &App, body: Entity) -> ControllerState {
    app.world().get::<ControllerState>(body).unwrap().clone()
}

#[derive(Resource, Default)]
struct CaptureLog(Vec<CaptureCommand>);

fn record_capture(mut capture_commands: EventReader<CaptureCommand>, mut log: ResMut<CaptureLog>) {
    log.0.extend(capture_commands.read().copied());
}

/// Commands the window collaborator would have received since the last call.
fn capture_commands(app: &mut App) -> Vec<CaptureCommand> {
    std::mem::take(&mut app.world_mut().resource_mut::<CaptureLog>().0)
}

#[test]
fn spawn_brings_default_parts_and_requests_lock() {
    let (mut app, body, _) = headless_app();

    assert_eq!(
        app.world().get::<ControllerConfig>(body),
        Some(&ControllerConfig::default())
    );
    assert_eq!(state(&app, body).capture, CaptureState::Captured);
    assert_eq!(
        capture_commands(&mut app),
        vec![CaptureCommand {
            entity: body,
            locked: true
        }]
    );
}

#[test]
fn jump_from_ground_end_to_end() {
    let (mut app, body, _) = headless_app();

    set_grounded(&mut app, body, true);
    set_input(
        &mut app,
        body,
        ControllerInput {
            movement: Vec2::new(0.0, 1.0),
            jump: true,
            ..default()
        },
    );
    app.update();

    let after = state(&app, body);
    assert!(after.grounded);
    let expected_velocity = (2.0f32 * 2.0 * 9.81).sqrt() - 9.81 * DT;
    assert!((after.vertical_velocity - expected_velocity).abs() < EPS);

    let request = app.world().get::<MoveRequest>(body).unwrap().0;
    // identity body: forward is -Z
    assert!((request.z + 0.1).abs() < EPS);
    assert!(request.x.abs() < EPS);
    assert!((request.y - expected_velocity * DT).abs() < EPS);
}

#[test]
fn standing_still_holds_grounded_bias() {
    let (mut app, body, _) = headless_app();

    set_grounded(&mut app, body, true);
    for _ in 0..5 {
        app.update();
    }

    let after = state(&app, body);
    assert!((after.vertical_velocity - (GROUNDED_BIAS - 9.81 * DT)).abs() < EPS);
    let request = app.world().get::<MoveRequest>(body).unwrap().0;
    assert!(request.y < 0.0);
    assert_eq!(request.x, 0.0);
}

#[test]
fn held_jump_does_not_bounce_again() {
    let (mut app, body, _) = headless_app();

    set_grounded(&mut app, body, true);
    set_input(
        &mut app,
        body,
        ControllerInput {
            jump: true,
            ..default()
        },
    );
    app.update();
    let launched = state(&app, body).vertical_velocity;

    // edge consumed, still touching the ground on the way up
    set_input(&mut app, body, ControllerInput::default());
    app.update();
    let next = state(&app, body).vertical_velocity;
    assert!((launched - next - 9.81 * DT).abs() < EPS);
}

#[test]
fn look_turns_body_and_tilts_head() {
    let (mut app, body, head) = headless_app();

    set_input(
        &mut app,
        body,
        ControllerInput {
            look: Vec2::new(45.0, -10.0),
            ..default()
        },
    );
    app.update();

    assert!((state(&app, body).pitch - 20.0).abs() < EPS);

    let body_forward = app.world().get::<Transform>(body).unwrap().forward();
    assert!((*body_forward - Vec3::X).length() < EPS);

    let head_transform = app.world().get::<Transform>(head).unwrap();
    assert!((head_transform.rotation.angle_between(head_rotation(20.0))).abs() < EPS);
    assert_eq!(head_transform.translation, Vec3::new(0.0, 0.7, 0.0));
}

#[test]
fn look_runs_before_locomotion_in_the_same_tick() {
    let (mut app, body, _) = headless_app();

    // a quarter turn right and a forward push arrive together
    set_input(
        &mut app,
        body,
        ControllerInput {
            look: Vec2::new(45.0, 0.0),
            movement: Vec2::Y,
            ..default()
        },
    );
    app.update();

    let request = app.world().get::<MoveRequest>(body).unwrap().0;
    assert!((request.x - 5.0 * DT).abs() < EPS);
    assert!(request.z.abs() < EPS);
}

#[test]
fn capture_toggle_emits_only_on_change() {
    let (mut app, body, _) = headless_app();
    assert_eq!(capture_commands(&mut app).len(), 1);
    app.update();
    assert!(capture_commands(&mut app).is_empty());

    set_input(
        &mut app,
        body,
        ControllerInput {
            release_capture: true,
            ..default()
        },
    );
    app.update();
    assert_eq!(state(&app, body).capture, CaptureState::Free);
    assert_eq!(
        capture_commands(&mut app),
        vec![CaptureCommand {
            entity: body,
            locked: false
        }]
    );

    // releasing again is a no-op
    app.update();
    assert_eq!(state(&app, body).capture, CaptureState::Free);
    assert!(capture_commands(&mut app).is_empty());

    set_input(
        &mut app,
        body,
        ControllerInput {
            engage_capture: true,
            ..default()
        },
    );
    app.update();
    assert_eq!(state(&app, body).capture, CaptureState::Captured);
    assert_eq!(
        capture_commands(&mut app),
        vec![CaptureCommand {
            entity: body,
            locked: true
        }]
    );
}
