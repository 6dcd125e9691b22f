//! The shared race simulation.

use fixmath::{Fixed, Vec2};
use tracing::{debug, info, warn};

use crate::car::{CarState, ControlInput};
use crate::checkpoint::Checkpoint;
use crate::collision::{resolve_car_pair, resolve_wall};
use crate::config::{PhysicsConfig, MAX_CARS};
use crate::events::RaceEvent;
use crate::hash::state_hash;
use crate::track::{RayHit, Track};

/// Race progress of one car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarProgress {
    /// Index of the next checkpoint the car must enter.
    pub next_checkpoint: usize,
    /// Completed laps.
    pub laps: u8,
    pub finished: bool,
    pub race_time_ms: u32,
}

/// Cars, checkpoints and per-car progress, advanced one fixed step at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceWorld {
    config: PhysicsConfig,
    track: Track,
    cars: Vec<CarState>,
    progress: Vec<CarProgress>,
    checkpoints: Vec<Checkpoint>,
    frame: u32,
}

impl RaceWorld {
    /// Creates a two-car world with both cars on the starting grid.
    #[must_use]
    pub fn new(config: PhysicsConfig, checkpoints: Vec<Checkpoint>) -> Self {
        Self::with_car_count(config, checkpoints, MAX_CARS)
    }

    /// Creates a world with `count` cars (at most [`MAX_CARS`]).
    #[must_use]
    pub fn with_car_count(config: PhysicsConfig, checkpoints: Vec<Checkpoint>, count: usize) -> Self {
        let count = count.min(MAX_CARS);
        let mut world = Self {
            config,
            track: Track::new(config.wall_radius),
            cars: vec![CarState::new(&config); count],
            progress: vec![CarProgress::default(); count],
            checkpoints,
            frame: 0,
        };
        world.reset_race();
        world
    }

    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub const fn track(&self) -> &Track {
        &self.track
    }

    pub fn cars(&self) -> &[CarState] {
        &self.cars
    }

    pub fn car_count(&self) -> usize {
        self.cars.len()
    }

    pub fn car(&self, index: usize) -> Option<&CarState> {
        self.cars.get(index)
    }

    pub fn car_mut(&mut self, index: usize) -> Option<&mut CarState> {
        self.cars.get_mut(index)
    }

    pub fn progress(&self) -> &[CarProgress] {
        &self.progress
    }

    pub fn car_progress(&self, index: usize) -> Option<CarProgress> {
        self.progress.get(index).copied()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Steps taken since the race started.
    pub const fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_finished(&self, index: usize) -> bool {
        self.progress.get(index).is_some_and(|p| p.finished)
    }

    pub fn all_finished(&self) -> bool {
        self.progress.iter().all(|p| p.finished)
    }

    /// Overwrites a car's progress, typically from an authoritative packet.
    ///
    /// A checkpoint index past the end of the track wraps to zero.
    pub fn set_progress(&mut self, index: usize, mut progress: CarProgress) {
        if progress.next_checkpoint >= self.checkpoints.len() {
            progress.next_checkpoint = 0;
        }
        match self.progress.get_mut(index) {
            Some(slot) => *slot = progress,
            None => warn!(car = index, "ignoring progress for unknown car"),
        }
    }

    /// Applies driver controls to a car. Finished cars ignore input.
    pub fn handle_input(&mut self, index: usize, input: &ControlInput) {
        if self.is_finished(index) {
            return;
        }
        match self.cars.get_mut(index) {
            Some(car) => car.handle_input(input, &self.config),
            None => warn!(car = index, "ignoring input for unknown car"),
        }
    }

    pub fn apply_force(&mut self, index: usize, force: Vec2) {
        match self.cars.get_mut(index) {
            Some(car) => car.apply_force(force),
            None => warn!(car = index, "ignoring force for unknown car"),
        }
    }

    pub fn apply_torque(&mut self, index: usize, torque: Fixed) {
        match self.cars.get_mut(index) {
            Some(car) => car.apply_torque(torque),
            None => warn!(car = index, "ignoring torque for unknown car"),
        }
    }

    /// Advances the simulation by one fixed step.
    ///
    /// Each unfinished car integrates, takes friction, checks its next
    /// checkpoint and accrues race time. Wall contacts resolve next, then
    /// car-car contacts.
    pub fn step(&mut self) -> Vec<RaceEvent> {
        let dt = self.config.dt;
        let dt_ms = self.config.dt_millis();
        let mut events = Vec::new();

        for index in 0..self.cars.len() {
            if self.progress[index].finished {
                continue;
            }
            let car = &mut self.cars[index];
            car.integrate(dt);
            car.apply_friction(dt, self.config.angular_damping);

            let finished_now = self.update_checkpoint_progress(index, &mut events);
            let progress = &mut self.progress[index];
            progress.race_time_ms = progress.race_time_ms.saturating_add(dt_ms);
            if finished_now {
                info!(
                    car = index,
                    race_time_ms = progress.race_time_ms,
                    "car finished"
                );
                events.push(RaceEvent::Finished {
                    car: index,
                    race_time_ms: progress.race_time_ms,
                });
            }
        }

        for (index, car) in self.cars.iter_mut().enumerate() {
            if let Some(impact_speed) = resolve_wall(car, &self.track, self.config.elasticity) {
                debug!(car = index, impact = %impact_speed, "wall contact");
                events.push(RaceEvent::WallContact {
                    car: index,
                    impact_speed,
                });
            }
        }

        for second in 1..self.cars.len() {
            for first in 0..second {
                let (left, right) = self.cars.split_at_mut(second);
                if resolve_car_pair(&mut left[first], &mut right[0], self.config.car_separation) {
                    debug!(first, second, "car contact");
                    events.push(RaceEvent::CarContact { first, second });
                }
            }
        }

        self.frame = self.frame.wrapping_add(1);
        events
    }

    /// Returns `true` if the car just completed its final lap.
    fn update_checkpoint_progress(&mut self, index: usize, events: &mut Vec<RaceEvent>) -> bool {
        let position = self.cars[index].position;
        let progress = &mut self.progress[index];
        let current = progress.next_checkpoint;
        let Some(checkpoint) = self.checkpoints.get_mut(current) else {
            return false;
        };
        if !checkpoint.contains(position) {
            return false;
        }

        checkpoint.passed = true;
        debug!(car = index, checkpoint = current, "checkpoint passed");
        events.push(RaceEvent::CheckpointPassed {
            car: index,
            checkpoint: current,
        });

        progress.next_checkpoint = current + 1;
        if progress.next_checkpoint < self.checkpoints.len() {
            return false;
        }

        progress.next_checkpoint = 0;
        progress.laps = progress.laps.saturating_add(1);
        for checkpoint in &mut self.checkpoints {
            checkpoint.passed = false;
        }
        debug!(car = index, laps = progress.laps, "lap completed");
        events.push(RaceEvent::LapCompleted {
            car: index,
            laps: progress.laps,
        });

        if progress.laps >= self.config.required_laps {
            progress.finished = true;
            return true;
        }
        false
    }

    /// Clears race time, laps, finish flags and checkpoint progress.
    pub fn start_race(&mut self) {
        for progress in &mut self.progress {
            *progress = CarProgress::default();
        }
        for checkpoint in &mut self.checkpoints {
            checkpoint.passed = false;
        }
        self.frame = 0;
        info!(
            cars = self.cars.len(),
            checkpoints = self.checkpoints.len(),
            "race started"
        );
    }

    /// Restarts the race with every car at rest on its grid slot.
    pub fn reset_race(&mut self) {
        self.start_race();
        for index in 0..self.cars.len() {
            let position = self.grid_position(index);
            self.cars[index].reset(position, Fixed::ZERO);
        }
    }

    /// Places one car at rest at `position` facing `heading`.
    pub fn reset_car(&mut self, index: usize, position: Vec2, heading: Fixed) {
        match self.cars.get_mut(index) {
            Some(car) => car.reset(position, heading),
            None => warn!(car = index, "ignoring reset of unknown car"),
        }
    }

    /// Starting slot for a car: behind the grid origin along -y.
    pub fn grid_position(&self, index: usize) -> Vec2 {
        let offset = self.config.grid_spacing * Fixed::from_int(index as i32);
        self.config.grid_origin - Vec2::new(Fixed::ZERO, offset)
    }

    pub fn ray_cast(&self, origin: Vec2, direction: Vec2, max_distance: Fixed) -> Option<RayHit> {
        self.track.ray_cast(origin, direction, max_distance)
    }

    pub fn distance_to_wall(&self, position: Vec2, heading: Fixed) -> Fixed {
        self.track.distance_to_wall(position, heading)
    }

    pub fn closest_point_on_track(&self, position: Vec2) -> Vec2 {
        self.track.closest_point(position)
    }

    pub fn is_position_valid(&self, position: Vec2) -> bool {
        self.track.is_position_valid(position)
    }

    /// Digest of the full simulation state; see [`state_hash`].
    pub fn state_hash(&self) -> u64 {
        state_hash(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint;

    fn config() -> PhysicsConfig {
        PhysicsConfig {
            required_laps: 2,
            ..PhysicsConfig::for_testing()
        }
    }

    fn world_with_line() -> RaceWorld {
        // Three checkpoints spaced along +x, far from the grid.
        let checkpoints = (0..3)
            .map(|i| Checkpoint::new(i, Vec2::from_ints(5 + 4 * i32::from(i), 10), Fixed::ONE))
            .collect();
        RaceWorld::new(config(), checkpoints)
    }

    fn place(world: &mut RaceWorld, car: usize, x: i32, y: i32) {
        world.reset_car(car, Vec2::from_ints(x, y), Fixed::ZERO);
    }

    #[test]
    fn new_world_is_on_grid() {
        let world = world_with_line();
        assert_eq!(world.car_count(), 2);
        assert_eq!(world.car(0).unwrap().position, Vec2::ZERO);
        assert_eq!(world.car(1).unwrap().position, Vec2::from_ints(0, -3));
        assert!(world.progress().iter().all(|p| *p == CarProgress::default()));
    }

    #[test]
    fn car_count_capped() {
        let world = RaceWorld::with_car_count(config(), Vec::new(), 5);
        assert_eq!(world.car_count(), MAX_CARS);
    }

    #[test]
    fn entering_expected_checkpoint_advances() {
        let mut world = world_with_line();
        place(&mut world, 0, 5, 10);
        let events = world.step();
        assert!(events.contains(&RaceEvent::CheckpointPassed { car: 0, checkpoint: 0 }));
        assert_eq!(world.car_progress(0).unwrap().next_checkpoint, 1);
        assert!(world.checkpoints()[0].passed);
    }

    #[test]
    fn out_of_order_checkpoint_ignored() {
        let mut world = world_with_line();
        place(&mut world, 0, 9, 10);
        world.step();
        assert_eq!(world.car_progress(0).unwrap().next_checkpoint, 0);
        assert!(!world.checkpoints()[1].passed);
    }

    #[test]
    fn wrap_increments_lap_and_clears_flags() {
        let mut world = world_with_line();
        for x in [5, 9, 13] {
            place(&mut world, 0, x, 10);
            let events = world.step();
            if x == 13 {
                assert!(events.contains(&RaceEvent::LapCompleted { car: 0, laps: 1 }));
            }
        }
        let progress = world.car_progress(0).unwrap();
        assert_eq!(progress.next_checkpoint, 0);
        assert_eq!(progress.laps, 1);
        assert!(!progress.finished);
        assert!(world.checkpoints().iter().all(|c| !c.passed));
    }

    #[test]
    fn finishes_after_required_laps_and_stops() {
        let mut world = world_with_line();
        let mut finished_event = None;
        for _lap in 0..2 {
            for x in [5, 9, 13] {
                place(&mut world, 0, x, 10);
                for event in world.step() {
                    if let RaceEvent::Finished { .. } = event {
                        finished_event = Some(event);
                    }
                }
            }
        }
        assert!(world.is_finished(0));
        assert_eq!(
            finished_event,
            Some(RaceEvent::Finished {
                car: 0,
                race_time_ms: 6 * 16
            })
        );

        // Finished cars no longer integrate or accrue time.
        let time = world.car_progress(0).unwrap().race_time_ms;
        world.car_mut(0).unwrap().velocity = Vec2::from_ints(1, 0);
        let before = world.car(0).unwrap().position;
        world.step();
        assert_eq!(world.car(0).unwrap().position, before);
        assert_eq!(world.car_progress(0).unwrap().race_time_ms, time);
    }

    #[test]
    fn race_time_accrues_per_step() {
        let mut world = world_with_line();
        for _ in 0..60 {
            world.step();
        }
        assert_eq!(world.car_progress(1).unwrap().race_time_ms, 960);
        assert_eq!(world.frame(), 60);
    }

    #[test]
    fn wall_contact_emitted_and_resolved() {
        let mut world = world_with_line();
        place(&mut world, 1, 0, 25);
        world.car_mut(1).unwrap().velocity = Vec2::from_ints(0, 2);
        let events = world.step();
        assert!(events
            .iter()
            .any(|e| matches!(e, RaceEvent::WallContact { car: 1, .. })));
        let r = world.car(1).unwrap().position.length();
        assert!((r - world.config().wall_radius).abs().raw() <= 2);
        assert!(world.car(1).unwrap().velocity.y < Fixed::ZERO);
    }

    #[test]
    fn car_contact_emitted() {
        let mut world = world_with_line();
        place(&mut world, 0, 0, 0);
        place(&mut world, 1, 1, 0);
        let events = world.step();
        assert!(events.contains(&RaceEvent::CarContact { first: 0, second: 1 }));
        let a = world.car(0).unwrap().position;
        let b = world.car(1).unwrap().position;
        assert!(a.distance(b) >= world.config().car_separation - Fixed::from_raw(4));
    }

    #[test]
    fn unknown_car_is_noop() {
        let mut world = world_with_line();
        let before = world.clone();
        world.handle_input(7, &ControlInput::new(Fixed::ONE, Fixed::ZERO, Fixed::ZERO));
        world.apply_force(7, Vec2::from_ints(1, 1));
        world.apply_torque(9, Fixed::ONE);
        world.reset_car(2, Vec2::ZERO, Fixed::ZERO);
        world.set_progress(3, CarProgress::default());
        assert_eq!(world, before);
        assert!(world.car(2).is_none());
    }

    #[test]
    fn throttle_moves_car_forward() {
        let mut world = world_with_line();
        let full = ControlInput::new(Fixed::ONE, Fixed::ZERO, Fixed::ZERO);
        for _ in 0..60 {
            world.handle_input(0, &full);
            world.step();
        }
        let car = world.car(0).unwrap();
        assert!(car.position.x > Fixed::TWO);
        assert!(car.speed > Fixed::ONE);
    }

    #[test]
    fn reset_race_restores_grid_and_progress() {
        let mut world = world_with_line();
        place(&mut world, 0, 5, 10);
        world.step();
        world.reset_race();
        assert_eq!(world.car(0).unwrap().position, Vec2::ZERO);
        assert_eq!(world.car_progress(0).unwrap(), CarProgress::default());
        assert!(world.checkpoints().iter().all(|c| !c.passed));
        assert_eq!(world.frame(), 0);
    }

    #[test]
    fn set_progress_wraps_bad_index() {
        let mut world = world_with_line();
        world.set_progress(
            1,
            CarProgress {
                next_checkpoint: 9,
                laps: 1,
                ..CarProgress::default()
            },
        );
        assert_eq!(world.car_progress(1).unwrap().next_checkpoint, 0);
        assert_eq!(world.car_progress(1).unwrap().laps, 1);
    }

    #[test]
    fn track_queries_delegate() {
        let world = RaceWorld::new(config(), checkpoint::ring(3, Fixed::from_int(10), Fixed::ONE));
        assert!(world.is_position_valid(Vec2::from_ints(3, 3)));
        assert_eq!(
            world.closest_point_on_track(Vec2::from_ints(0, 50)),
            Vec2::from_ints(0, 20)
        );
        assert!(world.ray_cast(Vec2::ZERO, Vec2::from_ints(0, 1), Fixed::from_int(30)).is_some());
        assert!(world.distance_to_wall(Vec2::ZERO, Fixed::ZERO) > Fixed::from_int(19));
    }
}
