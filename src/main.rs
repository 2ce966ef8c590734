//! A small walk-around scene for the first-person controller.
//!
//! - WASD / arrows to move, left shift to run, space to jump
//! - Escape frees the cursor, left click captures it again
//! - Tuning is read from `assets/controller.ron` when present

use std::f32::consts::TAU;
use std::path::Path;

use avian3d::prelude::*;
use bevy::diagnostic::{EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::render::camera::Exposure;
use bevy_framepace::FramepacePlugin;
use iyes_perf_ui::prelude::*;

use fp_controller::*;

const CONFIG_PATH: &str = "assets/controller.ron";
const BODY_HEIGHT: f32 = 1.8;
const EYE_OFFSET: f32 = 0.7;

#[derive(Component)]
struct StatusText;

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            PhysicsPlugins::default(),
            FramepacePlugin,
            FrameTimeDiagnosticsPlugin::default(),
            EntityCountDiagnosticsPlugin,
            PerfUiPlugin,
        ))
        .add_plugins((
            FirstPersonControllerPlugin,
            ControllerInputPlugin,
            KinematicCollisionPlugin,
        ))
        .add_systems(Startup, (setup, spawn_player))
        .add_systems(Update, display_text.after(ControllerSet::Capture))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: light_consts::lux::FULL_DAYLIGHT,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 7.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // floor
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(100.0, 1.0, 100.0),
        Mesh3d(meshes.add(Cuboid::new(100.0, 1.0, 100.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));

    // a few blocks to slide along and jump onto
    let block_material = materials.add(Color::srgb(0.4, 0.5, 0.6));
    for (i, height) in [0.5, 1.0, 1.5, 3.0].into_iter().enumerate() {
        commands.spawn((
            RigidBody::Static,
            Collider::cuboid(2.0, height, 2.0),
            Mesh3d(meshes.add(Cuboid::new(2.0, height, 2.0))),
            MeshMaterial3d(block_material.clone()),
            Transform::from_xyz(-6.0 + 4.0 * i as f32, height * 0.5, -8.0),
        ));
    }

    // a ramp
    commands.spawn((
        RigidBody::Static,
        Collider::cuboid(4.0, 0.2, 8.0),
        Mesh3d(meshes.add(Cuboid::new(4.0, 0.2, 8.0))),
        MeshMaterial3d(block_material),
        Transform::from_xyz(8.0, 1.0, 4.0).with_rotation(Quat::from_rotation_x(TAU / 24.0)),
    ));

    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: 50.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 15.0, 0.0),
    ));

    commands.spawn(PerfUiDefaultEntries::default());
    commands.spawn((
        StatusText,
        Text::default(),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

fn spawn_player(mut commands: Commands) {
    let config = match load_config(Path::new(CONFIG_PATH)) {
        Ok(config) => config,
        Err(err) => {
            warn!("{err}, using default tuning");
            ControllerConfig::default()
        }
    };

    // The head is created by the host and handed to the controller
    let head = commands
        .spawn((
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov: TAU / 5.0,
                ..default()
            }),
            Exposure::SUNLIGHT,
            Transform::from_xyz(0.0, EYE_OFFSET, 0.0),
        ))
        .id();

    commands
        .spawn((
            FirstPersonController::new(head),
            config,
            RigidBody::Kinematic,
            Collider::cylinder(0.4, BODY_HEIGHT),
            Transform::from_xyz(0.0, BODY_HEIGHT * 0.5 + 0.05, 6.0),
            Visibility::default(),
        ))
        .add_child(head);
}

fn display_text(
    controller_query: Query<(&Transform, &ControllerState), With<FirstPersonController>>,
    mut text_query: Query<&mut Text, With<StatusText>>,
) {
    for (transform, state) in &controller_query {
        for mut text in &mut text_query {
            text.0 = format!(
                "pos: {:.2}, {:.2}, {:.2}\npitch: {:.1}\nvy: {:.2}\ngrounded: {}\ncursor: {:?}",
                transform.translation.x,
                transform.translation.y,
                transform.translation.z,
                state.pitch,
                state.vertical_velocity,
                state.grounded,
                state.capture,
            );
        }
    }
}
