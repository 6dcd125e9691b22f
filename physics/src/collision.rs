//! Collision response against the wall and between cars.

use fixmath::{Fixed, Vec2};

use crate::car::CarState;
use crate::track::Track;

/// Pushes a car that left the track back onto the boundary and bounces it.
///
/// The outward normal component of the velocity is reflected and scaled by
/// `elasticity`; the tangential component is kept. Returns the outward
/// normal speed at impact (zero when already moving inward), or `None` if
/// the car was inside the track.
pub fn resolve_wall(car: &mut CarState, track: &Track, elasticity: Fixed) -> Option<Fixed> {
    let contact = track.wall_contact(car.position)?;
    car.position -= contact.normal.scale(contact.penetration);

    let normal_speed = car.velocity.dot(contact.normal);
    if normal_speed > Fixed::ZERO {
        let rebound = normal_speed + elasticity * normal_speed;
        car.velocity -= contact.normal.scale(rebound);
        car.speed = car.velocity.length();
        Some(normal_speed)
    } else {
        Some(Fixed::ZERO)
    }
}

/// Separates two overlapping cars and exchanges their velocities.
///
/// Each car moves half the overlap along the line between their centers.
/// Coincident cars separate along +x so both peers agree on the outcome.
/// Returns `true` if the cars were in contact.
pub fn resolve_car_pair(first: &mut CarState, second: &mut CarState, separation: Fixed) -> bool {
    let delta = first.position - second.position;
    let distance = delta.length();
    if distance >= separation {
        return false;
    }

    std::mem::swap(&mut first.velocity, &mut second.velocity);
    std::mem::swap(&mut first.speed, &mut second.speed);

    let direction = if delta.is_zero() {
        Vec2::new(Fixed::ONE, Fixed::ZERO)
    } else {
        delta.normalize()
    };
    let push = direction.scale((separation - distance) * Fixed::HALF);
    first.position += push;
    second.position -= push;
    true
}
