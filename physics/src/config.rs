//! Physics tuning.

use fixmath::{Fixed, Vec2};

/// Cars in a race.
pub const MAX_CARS: usize = 2;

/// Tuning constants for the car integrator, collisions and race rules.
///
/// Both peers must run with identical values; nothing here is negotiated
/// over the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhysicsConfig {
    /// Fixed time step (1/60 s).
    pub dt: Fixed,
    /// Default car mass.
    pub mass: Fixed,
    /// Default drag coefficient.
    pub drag: Fixed,
    /// Default rolling friction coefficient.
    pub friction: Fixed,
    /// Engine force at full throttle.
    pub engine_force: Fixed,
    /// Brake force at full brake.
    pub brake_force: Fixed,
    /// Speed used to attenuate steering.
    pub max_speed: Fixed,
    /// Steering torque at full lock, before speed attenuation.
    pub steering_torque: Fixed,
    /// Angular damping rate `k` in `w *= 1 - k*dt`.
    pub angular_damping: Fixed,
    /// Radius of the circular track boundary around the origin.
    pub wall_radius: Fixed,
    /// Fraction of the outward wall-normal speed kept after a bounce.
    pub elasticity: Fixed,
    /// Minimum distance between car centers.
    pub car_separation: Fixed,
    /// Laps needed to finish.
    pub required_laps: u8,
    /// Grid position of car 0.
    pub grid_origin: Vec2,
    /// Distance between grid slots, behind car 0 along -y.
    pub grid_spacing: Fixed,
}

impl PhysicsConfig {
    /// Values for a small test track.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            dt: Fixed::from_raw(1092),
            mass: Fixed::ONE,
            drag: Fixed::from_raw(9830),      // 0.15
            friction: Fixed::from_raw(55706), // 0.85
            engine_force: Fixed::from_int(12),
            brake_force: Fixed::from_int(18),
            max_speed: Fixed::from_int(20),
            steering_torque: Fixed::from_int(4),
            angular_damping: Fixed::from_int(2),
            wall_radius: Fixed::from_int(20),
            elasticity: Fixed::from_raw(49152), // 0.75
            car_separation: Fixed::from_int(2),
            required_laps: 1,
            grid_origin: Vec2::ZERO,
            grid_spacing: Fixed::from_int(3),
        }
    }

    /// Race time added per tick, in whole milliseconds.
    #[must_use]
    pub const fn dt_millis(&self) -> u32 {
        ((self.dt.raw() as i64 * 1000) >> fixmath::FRAC_BITS) as u32
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            wall_radius: Fixed::from_int(60),
            required_laps: 3,
            grid_origin: Vec2::from_ints(0, -40),
            ..Self::for_testing()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_time_step_is_one_sixtieth() {
        let config = PhysicsConfig::default();
        assert!((config.dt.to_f64() - 1.0 / 60.0).abs() < 1e-4);
        assert_eq!(config.dt_millis(), 16);
    }

    #[test]
    fn tuning_fractions() {
        let config = PhysicsConfig::for_testing();
        assert_eq!(config.drag, Fixed::from_f64(0.15));
        assert_eq!(config.friction, Fixed::from_f64(0.85));
        assert_eq!(config.elasticity, Fixed::from_f64(0.75));
        assert!(config.elasticity < Fixed::ONE);
    }

    #[test]
    fn default_grid_fits_inside_wall() {
        let config = PhysicsConfig::default();
        let last = config.grid_origin.y - config.grid_spacing;
        assert!(last.abs() < config.wall_radius);
        assert!(config.grid_spacing > config.car_separation);
    }
}
