//! Deterministic car physics for the slipstream race core.
//!
//! A [`RaceWorld`] holds up to two [`CarState`]s, an ordered list of
//! [`Checkpoint`]s and per-car [`CarProgress`]. Each call to
//! [`RaceWorld::step`] advances every unfinished car by one fixed time step
//! using only [`fixmath`] arithmetic, so two peers fed the same inputs stay
//! bit-identical.
//!
//! # Example
//!
//! ```
//! use fixmath::Fixed;
//! use physics::{checkpoint, ControlInput, PhysicsConfig, RaceWorld};
//!
//! let config = PhysicsConfig::default();
//! let mut world = RaceWorld::new(config, checkpoint::ring(8, Fixed::from_int(40), Fixed::from_int(6)));
//!
//! let throttle = ControlInput::new(Fixed::ONE, Fixed::ZERO, Fixed::ZERO);
//! world.handle_input(0, &throttle);
//! let events = world.step();
//!
//! assert!(events.is_empty());
//! assert!(world.car(0).unwrap().velocity.x > Fixed::ZERO);
//! ```

mod car;
pub mod checkpoint;
mod collision;
mod config;
mod events;
mod hash;
mod track;
mod world;

pub use car::{CarState, ControlInput};
pub use checkpoint::Checkpoint;
pub use collision::{resolve_car_pair, resolve_wall};
pub use config::{PhysicsConfig, MAX_CARS};
pub use events::RaceEvent;
pub use hash::state_hash;
pub use track::{RayHit, Track, WallContact};
pub use world::{CarProgress, RaceWorld};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = PhysicsConfig::default();
        let _ = PhysicsConfig::for_testing();
        let _ = ControlInput::NEUTRAL;
        let _ = MAX_CARS;
        let _ = CarProgress::default();
        let _ = Track::new(fixmath::Fixed::ONE);
        let _ = checkpoint::ring(1, fixmath::Fixed::ONE, fixmath::Fixed::ONE);
    }
}
