//! Two-dimensional fixed-point vectors.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::scalar::{isqrt, saturate, Fixed};
use crate::trig::sin_cos;

/// A 2D vector of [`Fixed`] components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: Fixed,
    pub y: Fixed,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Creates a vector from components.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Creates a vector from integer components.
    #[must_use]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: Fixed::from_int(x),
            y: Fixed::from_int(y),
        }
    }

    /// Unit vector pointing along `angle` (radians).
    #[must_use]
    pub fn from_angle(angle: Fixed) -> Self {
        let (sin, cos) = sin_cos(angle);
        Self { x: cos, y: sin }
    }

    /// Multiplies both components by `s`.
    #[must_use]
    pub fn scale(self, s: Fixed) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// Dot product, saturating on overflow.
    #[must_use]
    pub fn dot(self, rhs: Self) -> Fixed {
        Fixed::from_raw(saturate(self.wide_dot(rhs)))
    }

    /// 2D cross product (z component of the 3D cross product), saturating.
    #[must_use]
    pub fn cross(self, rhs: Self) -> Fixed {
        Fixed::from_raw(saturate(
            self.x.wide_mul(rhs.y) - self.y.wide_mul(rhs.x),
        ))
    }

    /// Euclidean length, rounded down to the nearest raw unit.
    ///
    /// The raw components are squared in 128 bits, so both tiny vectors and
    /// vectors longer than `sqrt(Fixed::MAX)` measure correctly. Lengths
    /// beyond the scalar range saturate.
    #[must_use]
    pub fn length(self) -> Fixed {
        let x = u128::from(self.x.raw().unsigned_abs());
        let y = u128::from(self.y.raw().unsigned_abs());
        let root = isqrt(x * x + y * y);
        Fixed::from_raw(saturate(i64::try_from(root).unwrap_or(i64::MAX)))
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        (self - other).length()
    }

    /// Unit vector in the same direction, or the zero vector when the length is zero.
    #[must_use]
    pub fn normalize(self) -> Self {
        let length = self.length();
        match (self.x.try_div(length), self.y.try_div(length)) {
            (Ok(x), Ok(y)) => Self { x, y },
            _ => Self::ZERO,
        }
    }

    /// Returns `true` if both components are zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Dot product as a widened raw value, without saturation.
    #[must_use]
    pub const fn wide_dot(self, rhs: Self) -> i64 {
        self.x.wide_mul(rhs.x) + self.y.wide_mul(rhs.y)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_neg() {
        let a = Vec2::from_ints(1, 2);
        let b = Vec2::from_ints(3, -5);
        assert_eq!(a + b, Vec2::from_ints(4, -3));
        assert_eq!(a - b, Vec2::from_ints(-2, 7));
        assert_eq!(-a, Vec2::from_ints(-1, -2));
    }

    #[test]
    fn scale_and_dot() {
        let v = Vec2::from_ints(3, 4);
        assert_eq!(v.scale(Fixed::HALF), Vec2::new(Fixed::from_f64(1.5), Fixed::TWO));
        assert_eq!(v.dot(Vec2::from_ints(2, 1)), Fixed::from_int(10));
    }

    #[test]
    fn cross_sign_gives_turn_direction() {
        let forward = Vec2::from_ints(1, 0);
        assert!(forward.cross(Vec2::from_ints(0, 1)) > Fixed::ZERO);
        assert!(forward.cross(Vec2::from_ints(0, -1)) < Fixed::ZERO);
    }

    #[test]
    fn length_of_pythagorean_triple() {
        let v = Vec2::from_ints(3, 4);
        assert!((v.length() - Fixed::from_int(5)).abs().raw() <= 2);
    }

    #[test]
    fn length_beyond_scalar_square_range() {
        // 200^2 + 200^2 does not fit in a 16.16 scalar but its root does.
        let v = Vec2::from_ints(200, 200);
        let expected = 200.0f64 * std::f64::consts::SQRT_2;
        assert!((v.length().to_f64() - expected).abs() < 0.001);
    }

    #[test]
    fn length_far_from_origin_is_exact() {
        assert_eq!(Vec2::from_ints(20_000, 0).length(), Fixed::from_int(20_000));
        assert_eq!(
            Vec2::from_ints(12_000, -16_000).length(),
            Fixed::from_int(20_000)
        );
        assert_eq!(Vec2::from_ints(30_000, 30_000).length(), Fixed::MAX);
        assert_eq!(Vec2::new(Fixed::MIN, Fixed::MIN).length(), Fixed::MAX);
    }

    #[test]
    fn length_of_tiny_vector_is_not_zero() {
        let v = Vec2::new(Fixed::from_raw(3), Fixed::from_raw(4));
        assert_eq!(v.length(), Fixed::from_raw(5));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vec2::from_ints(10, -3);
        let b = Vec2::from_ints(-2, 2);
        assert_eq!(a.distance(b), b.distance(a));
        assert!((a.distance(b) - Fixed::from_int(13)).abs().raw() <= 2);
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn normalize_axis_aligned_is_exact() {
        assert_eq!(Vec2::from_ints(0, -7).normalize(), Vec2::from_ints(0, -1));
        assert_eq!(Vec2::from_ints(130, 0).normalize(), Vec2::from_ints(1, 0));
    }

    #[test]
    fn from_angle_is_unit() {
        let v = Vec2::from_angle(Fixed::from_f64(0.9));
        assert!((v.length() - Fixed::ONE).abs().raw() <= 4);
        assert_eq!(Vec2::from_angle(Fixed::ZERO), Vec2::from_ints(1, 0));
    }
}
