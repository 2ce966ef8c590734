//! Resolves [`MoveRequest`]s against the avian3d world and reports ground contact.
//!
//! The body is expected to be a `RigidBody::Kinematic` with a `Collider`; this stage moves its
//! `Transform` directly and never applies forces.

use avian3d::prelude::*;
use bevy::prelude::*;

use crate::character_controller::{
    ControllerSet, FirstPersonController, GroundContact, MoveRequest,
};

pub struct KinematicCollisionPlugin;

impl Plugin for KinematicCollisionPlugin {
    fn build(&self, app: &mut App) {
        app.register_required_components::<FirstPersonController, KinematicMover>()
            .add_systems(Update, controller_collide.in_set(ControllerSet::Collision));
    }
}

#[derive(Component, Debug, Clone)]
pub struct KinematicMover {
    /// Gap kept between the collider and anything it touches.
    pub skin_width: f32,
    /// If the distance to the ground is less than this value, the body is considered grounded
    pub grounded_distance: f32,
    /// If the dot product (alignment) of the normal of the surface and the upward vector,
    /// which is a value from [-1, 1], is greater than this value, the surface is walkable
    pub traction_normal_cutoff: f32,
    pub max_slides: u8,
}

impl Default for KinematicMover {
    fn default() -> Self {
        Self {
            skin_width: 0.02,
            grounded_distance: 0.125,
            traction_normal_cutoff: 0.7,
            max_slides: 4,
        }
    }
}

// Used when probing for ground so a wall touching the side is not mistaken for a floor
const SLIGHT_SCALE_DOWN: f32 = 0.9375;

pub fn controller_collide(
    spatial_query: SpatialQuery,
    mut query: Query<
        (
            Entity,
            &KinematicMover,
            &Collider,
            &mut Transform,
            &mut MoveRequest,
            &mut GroundContact,
        ),
        With<FirstPersonController>,
    >,
) {
    for (entity, mover, collider, mut transform, mut request, mut contact) in query.iter_mut() {
        let filter = SpatialQueryFilter::default().with_excluded_entities([entity]);

        let displacement = std::mem::take(&mut request.0);
        if displacement.is_finite() {
            transform.translation = collide_and_slide(
                &spatial_query,
                collider,
                transform.translation,
                transform.rotation,
                displacement,
                mover,
                &filter,
            );
            transform.translation = restore_floor_gap(
                &spatial_query,
                collider,
                transform.translation,
                transform.rotation,
                mover,
                &filter,
            );
        } else {
            warn!("controller {entity}: dropping non-finite move {displacement}");
        }

        contact.grounded = spatial_query
            .cast_shape(
                &scaled_collider_laterally(collider, SLIGHT_SCALE_DOWN),
                transform.translation,
                transform.rotation,
                Dir3::NEG_Y,
                &ShapeCastConfig::from_max_distance(mover.grounded_distance),
                &filter,
            )
            .is_some_and(|hit| has_traction(hit.normal1, mover.traction_normal_cutoff));
    }
}

/// Moves `origin` by `displacement`, stopping at obstacles and sliding the remainder along
/// them. Returns the resolved translation.
pub fn collide_and_slide(
    spatial_query: &SpatialQuery,
    collider: &Collider,
    origin: Vec3,
    rotation: Quat,
    displacement: Vec3,
    mover: &KinematicMover,
    filter: &SpatialQueryFilter,
) -> Vec3 {
    let mut translation = origin;
    let mut remaining = displacement;

    for _ in 0..mover.max_slides {
        let distance = remaining.length();
        let Ok(direction) = Dir3::new(remaining) else {
            break;
        };

        let Some(hit) = spatial_query.cast_shape(
            collider,
            translation,
            rotation,
            direction,
            &ShapeCastConfig::from_max_distance(distance + mover.skin_width),
            filter,
        ) else {
            translation += remaining;
            break;
        };

        let travel = (hit.distance - mover.skin_width).clamp(0.0, distance);
        translation += *direction * travel;

        let mut leftover = remaining * (1.0 - travel / distance);
        if has_traction(hit.normal1, mover.traction_normal_cutoff) {
            // walkable: don't creep down slopes, walk up them instead
            leftover.y = 0.0;
        }
        remaining = slide(leftover, hit.normal1);
    }

    translation
}

/// Lifts the body back out of the skin gap above a walkable floor.
///
/// Sliding along a wall keeps the downward part of the move, which can sink the body a little
/// below `skin_width` without the slide itself ever touching the floor.
pub fn restore_floor_gap(
    spatial_query: &SpatialQuery,
    collider: &Collider,
    translation: Vec3,
    rotation: Quat,
    mover: &KinematicMover,
    filter: &SpatialQueryFilter,
) -> Vec3 {
    let lifted = translation + Vec3::Y * mover.skin_width;
    spatial_query
        .cast_shape(
            &scaled_collider_laterally(collider, SLIGHT_SCALE_DOWN),
            lifted,
            rotation,
            Dir3::NEG_Y,
            &ShapeCastConfig::from_max_distance(2.0 * mover.skin_width),
            filter,
        )
        .filter(|hit| has_traction(hit.normal1, mover.traction_normal_cutoff))
        .map_or(translation, |hit| {
            translation + Vec3::Y * floor_lift(hit.distance, mover.skin_width)
        })
}

/// Upward correction for a floor found `distance` below a cast started one skin above the body.
pub fn floor_lift(distance: f32, skin_width: f32) -> f32 {
    (2.0 * skin_width - distance).clamp(0.0, skin_width)
}

/// Removes the part of `motion` that points into the surface with `normal`.
pub fn slide(motion: Vec3, normal: Vec3) -> Vec3 {
    motion - Vec3::dot(motion, normal) * normal
}

pub fn has_traction(normal: Vec3, cutoff: f32) -> bool {
    Vec3::dot(normal, Vec3::Y) > cutoff
}

/// Return a collider that is scaled laterally (XZ plane) but not vertically (Y axis).
/// Non-cylinder shapes are used as they are.
fn scaled_collider_laterally(collider: &Collider, scale: f32) -> Collider {
    if let Some(cylinder) = collider.shape().as_cylinder() {
        Collider::cylinder(cylinder.radius * scale, cylinder.half_height * 2.0)
    } else {
        collider.clone()
    }
}
