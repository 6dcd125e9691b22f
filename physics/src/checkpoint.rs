//! Radius-gated waypoints.

use fixmath::{Fixed, Vec2};

/// A waypoint a car must enter, in order, to make race progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Checkpoint {
    pub position: Vec2,
    pub radius: Fixed,
    /// Set when any car passes this checkpoint in the current lap; cleared on lap wrap.
    pub passed: bool,
    /// Ordinal within the track.
    pub index: u8,
}

impl Checkpoint {
    /// Creates an unpassed checkpoint.
    #[must_use]
    pub const fn new(index: u8, position: Vec2, radius: Fixed) -> Self {
        Self {
            position,
            radius,
            passed: false,
            index,
        }
    }

    /// Returns `true` if `point` lies strictly inside the radius.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.position) < self.radius
    }
}

/// Lays `count` checkpoints evenly around a circle, counter-clockwise from +x.
#[must_use]
pub fn ring(count: u8, ring_radius: Fixed, checkpoint_radius: Fixed) -> Vec<Checkpoint> {
    let step = Fixed::TWO_PI.raw() / i32::from(count.max(1));
    (0..count)
        .map(|index| {
            let angle = Fixed::from_raw(step * i32::from(index));
            let position = Vec2::from_angle(angle).scale(ring_radius);
            Checkpoint::new(index, position, checkpoint_radius)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_strict() {
        let checkpoint = Checkpoint::new(0, Vec2::from_ints(5, 0), Fixed::TWO);
        assert!(checkpoint.contains(Vec2::from_ints(6, 1)));
        assert!(!checkpoint.contains(Vec2::from_ints(7, 0)));
        assert!(!checkpoint.contains(Vec2::from_ints(0, 0)));
    }

    #[test]
    fn ring_layout() {
        let checkpoints = ring(4, Fixed::from_int(10), Fixed::ONE);
        assert_eq!(checkpoints.len(), 4);
        assert_eq!(checkpoints[0].position, Vec2::from_ints(10, 0));
        for (i, checkpoint) in checkpoints.iter().enumerate() {
            assert_eq!(usize::from(checkpoint.index), i);
            assert!(!checkpoint.passed);
            let r = checkpoint.position.length();
            assert!((r - Fixed::from_int(10)).abs() < Fixed::from_f64(0.01));
        }
        assert!(checkpoints[1].position.y > Fixed::from_int(9));
    }

    #[test]
    fn empty_ring() {
        assert!(ring(0, Fixed::ONE, Fixed::ONE).is_empty());
    }
}
