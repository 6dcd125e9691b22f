//! Per-car rigid-body state and the semi-implicit integrator.

use fixmath::{Fixed, Vec2};
use tracing::warn;

use crate::config::PhysicsConfig;

/// Normalized driver controls in fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlInput {
    /// `[0, 1]`
    pub throttle: Fixed,
    /// `[0, 1]`
    pub brake: Fixed,
    /// `[-1, 1]`, positive turns toward increasing heading.
    pub steering: Fixed,
}

impl ControlInput {
    /// No throttle, brake or steering.
    pub const NEUTRAL: Self = Self {
        throttle: Fixed::ZERO,
        brake: Fixed::ZERO,
        steering: Fixed::ZERO,
    };

    /// Creates controls, clamping each axis into its range.
    #[must_use]
    pub fn new(throttle: Fixed, brake: Fixed, steering: Fixed) -> Self {
        Self {
            throttle,
            brake,
            steering,
        }
        .clamped()
    }

    /// Returns a copy with each axis clamped into its range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            throttle: self.throttle.clamp(Fixed::ZERO, Fixed::ONE),
            brake: self.brake.clamp(Fixed::ZERO, Fixed::ONE),
            steering: self.steering.clamp(-Fixed::ONE, Fixed::ONE),
        }
    }
}

/// Kinematic state of one car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Accumulated for the next integration, then cleared.
    pub acceleration: Vec2,
    /// Radians.
    pub heading: Fixed,
    pub angular_velocity: Fixed,
    /// `|velocity|` as of the last integration.
    pub speed: Fixed,
    pub mass: Fixed,
    pub drag: Fixed,
    pub friction: Fixed,
}

impl CarState {
    /// A car at rest at the origin with the configured body constants.
    #[must_use]
    pub const fn new(config: &PhysicsConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            heading: Fixed::ZERO,
            angular_velocity: Fixed::ZERO,
            speed: Fixed::ZERO,
            mass: config.mass,
            drag: config.drag,
            friction: config.friction,
        }
    }

    /// Places the car at rest at `position` facing `heading`.
    pub fn reset(&mut self, position: Vec2, heading: Fixed) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
        self.heading = heading;
        self.angular_velocity = Fixed::ZERO;
        self.speed = Fixed::ZERO;
    }

    /// Unit vector along the heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Adds `force / mass` to the acceleration. Zero mass is ignored.
    pub fn apply_force(&mut self, force: Vec2) {
        match (force.x.try_div(self.mass), force.y.try_div(self.mass)) {
            (Ok(x), Ok(y)) => self.acceleration += Vec2::new(x, y),
            _ => warn!(mass = %self.mass, "ignoring force on car with zero mass"),
        }
    }

    /// Adds `torque / mass` to the angular velocity. Zero mass is ignored.
    pub fn apply_torque(&mut self, torque: Fixed) {
        match torque.try_div(self.mass) {
            Ok(alpha) => self.angular_velocity += alpha,
            Err(_) => warn!(mass = %self.mass, "ignoring torque on car with zero mass"),
        }
    }

    /// Turns driver controls into engine, brake and steering impulses.
    ///
    /// Steering authority falls off with speed by
    /// `max_speed / (speed + max_speed + 1)`.
    pub fn handle_input(&mut self, input: &ControlInput, config: &PhysicsConfig) {
        let input = input.clamped();
        let forward = self.forward();

        let engine = config.engine_force * input.throttle;
        let brake = config.brake_force * input.brake;
        self.apply_force(forward.scale(engine));
        self.apply_force(forward.scale(-brake));

        let speed_factor = config
            .max_speed
            .try_div(self.speed + config.max_speed + Fixed::ONE)
            .unwrap_or(Fixed::ZERO);
        let torque = config.steering_torque * input.steering * config.dt * speed_factor;
        self.apply_torque(torque);
    }

    /// Semi-implicit Euler step: velocity first, then position from the new velocity.
    pub fn integrate(&mut self, dt: Fixed) {
        self.velocity += self.acceleration.scale(dt);
        self.position += self.velocity.scale(dt);
        self.heading += self.angular_velocity * dt;
        self.speed = self.velocity.length();
        self.acceleration = Vec2::ZERO;
    }

    /// Queues drag and rolling friction for the next step and damps rotation.
    pub fn apply_friction(&mut self, dt: Fixed, angular_damping: Fixed) {
        let drag = self.velocity.scale(-self.drag);
        self.apply_force(drag);
        let rolling = self.velocity.scale(-(self.friction * self.mass));
        self.apply_force(rolling);
        self.angular_velocity = self.angular_velocity * (Fixed::ONE - angular_damping * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car() -> CarState {
        CarState::new(&PhysicsConfig::for_testing())
    }

    #[test]
    fn force_divided_by_mass() {
        let mut car = car();
        car.mass = Fixed::TWO;
        car.apply_force(Vec2::from_ints(4, -2));
        assert_eq!(car.acceleration, Vec2::from_ints(2, -1));
    }

    #[test]
    fn zero_mass_is_noop() {
        let mut car = car();
        car.mass = Fixed::ZERO;
        car.apply_force(Vec2::from_ints(4, -2));
        car.apply_torque(Fixed::ONE);
        assert_eq!(car.acceleration, Vec2::ZERO);
        assert_eq!(car.angular_velocity, Fixed::ZERO);
    }

    #[test]
    fn integrate_is_semi_implicit() {
        let mut car = car();
        car.acceleration = Vec2::from_ints(2, 0);
        car.integrate(Fixed::HALF);
        // v = 0 + 2 * 0.5 = 1, p = 0 + 1 * 0.5 = 0.5
        assert_eq!(car.velocity, Vec2::from_ints(1, 0));
        assert_eq!(car.position, Vec2::new(Fixed::HALF, Fixed::ZERO));
        assert_eq!(car.speed, Fixed::ONE);
        assert_eq!(car.acceleration, Vec2::ZERO);
    }

    #[test]
    fn heading_follows_angular_velocity() {
        let mut car = car();
        car.angular_velocity = Fixed::TWO;
        car.integrate(Fixed::HALF);
        assert_eq!(car.heading, Fixed::ONE);
    }

    #[test]
    fn throttle_pushes_along_heading() {
        let config = PhysicsConfig::for_testing();
        let mut car = car();
        car.heading = Fixed::HALF_PI;
        car.handle_input(
            &ControlInput::new(Fixed::ONE, Fixed::ZERO, Fixed::ZERO),
            &config,
        );
        assert!(car.acceleration.x.abs().raw() < 16);
        assert_eq!(car.acceleration.y, config.engine_force);
    }

    #[test]
    fn brake_opposes_heading() {
        let config = PhysicsConfig::for_testing();
        let mut car = car();
        car.handle_input(
            &ControlInput::new(Fixed::ZERO, Fixed::ONE, Fixed::ZERO),
            &config,
        );
        assert_eq!(car.acceleration.x, -config.brake_force);
    }

    #[test]
    fn inputs_are_clamped() {
        let input = ControlInput::new(Fixed::TWO, -Fixed::ONE, Fixed::from_int(-3));
        assert_eq!(input.throttle, Fixed::ONE);
        assert_eq!(input.brake, Fixed::ZERO);
        assert_eq!(input.steering, -Fixed::ONE);
    }

    #[test]
    fn steering_weakens_with_speed() {
        let config = PhysicsConfig::for_testing();
        let left = ControlInput::new(Fixed::ZERO, Fixed::ZERO, Fixed::ONE);

        let mut slow = car();
        slow.handle_input(&left, &config);

        let mut fast = car();
        fast.speed = Fixed::from_int(15);
        fast.handle_input(&left, &config);

        assert!(slow.angular_velocity > fast.angular_velocity);
        assert!(fast.angular_velocity > Fixed::ZERO);
    }

    #[test]
    fn friction_slows_and_damps() {
        let config = PhysicsConfig::for_testing();
        let mut car = car();
        car.velocity = Vec2::from_ints(10, 0);
        car.angular_velocity = Fixed::ONE;
        car.apply_friction(config.dt, config.angular_damping);
        assert!(car.acceleration.x < Fixed::ZERO);
        assert_eq!(car.acceleration.y, Fixed::ZERO);
        assert!(car.angular_velocity < Fixed::ONE);
        assert!(car.angular_velocity > Fixed::ZERO);
    }

    #[test]
    fn reset_clears_motion() {
        let mut car = car();
        car.velocity = Vec2::from_ints(3, 3);
        car.angular_velocity = Fixed::ONE;
        car.reset(Vec2::from_ints(1, 2), Fixed::PI);
        assert_eq!(car.position, Vec2::from_ints(1, 2));
        assert_eq!(car.velocity, Vec2::ZERO);
        assert_eq!(car.heading, Fixed::PI);
        assert_eq!(car.angular_velocity, Fixed::ZERO);
    }
}
