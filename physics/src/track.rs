//! Circular track boundary and geometric queries against it.

use fixmath::{Fixed, Vec2, FRAC_BITS};

/// Where a point sits outside the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallContact {
    /// Unit vector from the origin toward the point.
    pub normal: Vec2,
    /// Distance beyond the wall.
    pub penetration: Fixed,
}

/// Result of a ray hitting the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RayHit {
    pub point: Vec2,
    /// Ray parameter `t`; equals the distance for a unit direction.
    pub distance: Fixed,
}

/// A track bounded by a circle of `wall_radius` around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    wall_radius: Fixed,
}

impl Track {
    /// Creates a track with the given boundary radius.
    #[must_use]
    pub const fn new(wall_radius: Fixed) -> Self {
        Self { wall_radius }
    }

    /// Returns the boundary radius.
    #[must_use]
    pub const fn wall_radius(&self) -> Fixed {
        self.wall_radius
    }

    /// Returns the contact if `position` lies beyond the wall.
    #[must_use]
    pub fn wall_contact(&self, position: Vec2) -> Option<WallContact> {
        let distance = position.length();
        if distance <= self.wall_radius {
            return None;
        }
        Some(WallContact {
            normal: position.normalize(),
            penetration: distance - self.wall_radius,
        })
    }

    /// Returns `true` if `position` is on or inside the boundary.
    #[must_use]
    pub fn is_position_valid(&self, position: Vec2) -> bool {
        position.length() <= self.wall_radius
    }

    /// Nearest point on or inside the boundary.
    #[must_use]
    pub fn closest_point(&self, position: Vec2) -> Vec2 {
        if self.is_position_valid(position) {
            position
        } else {
            position.normalize().scale(self.wall_radius)
        }
    }

    /// Intersects the ray `origin + t * direction` with the boundary circle.
    ///
    /// Returns the nearest non-negative hit with `t <= max_distance`. From
    /// inside the track that is the exit point. The quadratic is solved in
    /// 128-bit intermediates so tracks larger than the 16.16 square range
    /// still resolve.
    #[must_use]
    pub fn ray_cast(&self, origin: Vec2, direction: Vec2, max_distance: Fixed) -> Option<RayHit> {
        let a = i128::from(direction.wide_dot(direction));
        if a == 0 {
            return None;
        }
        let b = 2 * i128::from(origin.wide_dot(direction));
        let c = i128::from(origin.wide_dot(origin))
            - i128::from(self.wall_radius.wide_mul(self.wall_radius));

        let discriminant = ((b * b) >> FRAC_BITS) - 4 * ((a * c) >> FRAC_BITS);
        if discriminant < 0 {
            return None;
        }
        let root = i128::from(
            Fixed::sqrt_wide(i64::try_from(discriminant).unwrap_or(i64::MAX)).raw(),
        );

        let two_a = 2 * a;
        let near = ((-b - root) << FRAC_BITS) / two_a;
        let far = ((-b + root) << FRAC_BITS) / two_a;
        let t = if near < 0 { far } else { near.min(far) };
        if t < 0 || t > i128::from(max_distance.raw()) {
            return None;
        }

        let distance = Fixed::from_raw(t as i32);
        Some(RayHit {
            point: origin + direction.scale(distance),
            distance,
        })
    }

    /// Distance to the wall looking along `heading` from `position`.
    ///
    /// Zero when `position` is already outside the track.
    #[must_use]
    pub fn distance_to_wall(&self, position: Vec2, heading: Fixed) -> Fixed {
        if !self.is_position_valid(position) {
            return Fixed::ZERO;
        }
        let diameter = self.wall_radius + self.wall_radius;
        self.ray_cast(position, Vec2::from_angle(heading), diameter)
            .map_or(self.wall_radius, |hit| hit.distance)
    }
}
