//! Deterministic race-world digests.

use blake3::Hasher;
use fixmath::{Fixed, Vec2};

use crate::car::CarState;
use crate::world::{CarProgress, RaceWorld};

/// Computes a digest of every simulated quantity in the world.
///
/// Two peers that stepped identical inputs from identical starts produce the
/// same value.
#[must_use]
pub fn state_hash(world: &RaceWorld) -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, world.frame());
    write_u32(&mut hasher, world.car_count() as u32);

    for (car, progress) in world.cars().iter().zip(world.progress()) {
        write_car(&mut hasher, car);
        write_progress(&mut hasher, progress);
    }

    write_u32(&mut hasher, world.checkpoints().len() as u32);
    for checkpoint in world.checkpoints() {
        write_vec2(&mut hasher, checkpoint.position);
        write_fixed(&mut hasher, checkpoint.radius);
        write_u8(&mut hasher, u8::from(checkpoint.passed));
    }

    let hash = hasher.finalize();
    let bytes = hash.as_bytes();
    let mut head = [0u8; 8];
    head.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(head)
}

fn write_car(hasher: &mut Hasher, car: &CarState) {
    write_vec2(hasher, car.position);
    write_vec2(hasher, car.velocity);
    write_vec2(hasher, car.acceleration);
    write_fixed(hasher, car.heading);
    write_fixed(hasher, car.angular_velocity);
    write_fixed(hasher, car.speed);
    write_fixed(hasher, car.mass);
    write_fixed(hasher, car.drag);
    write_fixed(hasher, car.friction);
}

fn write_progress(hasher: &mut Hasher, progress: &CarProgress) {
    write_u32(hasher, progress.next_checkpoint as u32);
    write_u8(hasher, progress.laps);
    write_u8(hasher, u8::from(progress.finished));
    write_u32(hasher, progress.race_time_ms);
}

fn write_vec2(hasher: &mut Hasher, value: Vec2) {
    write_fixed(hasher, value.x);
    write_fixed(hasher, value.y);
}

fn write_fixed(hasher: &mut Hasher, value: Fixed) {
    hasher.update(&value.raw().to_le_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{checkpoint, PhysicsConfig};

    fn world() -> RaceWorld {
        RaceWorld::new(
            PhysicsConfig::for_testing(),
            checkpoint::ring(4, Fixed::from_int(10), Fixed::TWO),
        )
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(state_hash(&world()), state_hash(&world()));
    }

    #[test]
    fn hash_changes_with_state() {
        let base = world();
        let mut moved = world();
        if let Some(car) = moved.car_mut(1) {
            car.position.x += Fixed::EPSILON;
        }
        assert_ne!(state_hash(&base), state_hash(&moved));
    }

    #[test]
    fn hash_covers_progress() {
        let base = world();
        let mut other = world();
        other.set_progress(
            0,
            CarProgress {
                laps: 1,
                ..CarProgress::default()
            },
        );
        assert_ne!(state_hash(&base), state_hash(&other));
    }
}
