//! The 16.16 fixed-point scalar.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::{MathError, MathResult};

/// Number of fractional bits.
pub const FRAC_BITS: u32 = 16;

/// Newton-Raphson iterations used by [`Fixed::sqrt`].
pub const SQRT_ITERATIONS: usize = 16;

/// A real value scaled by 65536 and stored in an `i32`.
///
/// Every numeric value that crosses the peer boundary is a `Fixed`. All
/// arithmetic is integer-only, so identical inputs produce identical outputs
/// on every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Fixed(i32);

impl Fixed {
    /// 0.0
    pub const ZERO: Self = Self(0);
    /// 1.0
    pub const ONE: Self = Self(1 << FRAC_BITS);
    /// 0.5
    pub const HALF: Self = Self(1 << (FRAC_BITS - 1));
    /// 2.0
    pub const TWO: Self = Self(2 << FRAC_BITS);
    /// Smallest positive value (one least significant bit).
    pub const EPSILON: Self = Self(1);
    /// Largest representable value.
    pub const MAX: Self = Self(i32::MAX);
    /// Smallest representable value.
    pub const MIN: Self = Self(i32::MIN);
    /// pi, rounded to the nearest raw unit.
    pub const PI: Self = Self(205_887);
    /// 2 * pi, rounded to the nearest raw unit.
    pub const TWO_PI: Self = Self(411_775);
    /// pi / 2, rounded to the nearest raw unit.
    pub const HALF_PI: Self = Self(102_944);

    /// Creates a value from its raw scaled representation.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw scaled representation.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts an integer, saturating outside the representable range.
    #[must_use]
    pub const fn from_int(value: i32) -> Self {
        Self(saturate((value as i64) << FRAC_BITS))
    }

    /// Returns the integer part, rounded toward negative infinity.
    #[must_use]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRAC_BITS
    }

    /// Converts a native real, rounding to the nearest raw unit.
    ///
    /// Values outside the representable range saturate and NaN maps to zero.
    /// Only for use at the edge of the simulation; never inside a tick.
    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        Self((value * f64::from(1u32 << FRAC_BITS)).round() as i32)
    }

    /// Converts a native `f32` (see [`Fixed::from_f64`]).
    #[must_use]
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(f64::from(value))
    }

    /// Converts to a native real.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        f64::from(self.0) / f64::from(1u32 << FRAC_BITS)
    }

    /// Converts to a native `f32`.
    #[must_use]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Builds `numerator / denominator` exactly, without passing through a float.
    pub fn from_ratio(numerator: i32, denominator: i32) -> MathResult<Self> {
        Self::from_int(numerator).try_div(Self::from_int(denominator))
    }

    /// Multiplies with a 64-bit intermediate and returns the exact shifted product.
    #[must_use]
    pub const fn wide_mul(self, rhs: Self) -> i64 {
        (self.0 as i64 * rhs.0 as i64) >> FRAC_BITS
    }

    /// Multiplies, failing if the product does not fit in 16.16.
    pub fn checked_mul(self, rhs: Self) -> MathResult<Self> {
        let wide = self.wide_mul(rhs);
        i32::try_from(wide)
            .map(Self)
            .map_err(|_| MathError::Overflow { wide })
    }

    /// Multiplies, clamping the product to the representable range.
    #[must_use]
    pub const fn saturating_mul(self, rhs: Self) -> Self {
        Self(saturate(self.wide_mul(rhs)))
    }

    /// Divides, failing with [`MathError::DivideByZero`] when `rhs` is exactly zero.
    ///
    /// The quotient is computed with a 64-bit intermediate and clamped to the
    /// representable range.
    pub fn try_div(self, rhs: Self) -> MathResult<Self> {
        if rhs.0 == 0 {
            return Err(MathError::DivideByZero);
        }
        let wide = ((self.0 as i64) << FRAC_BITS) / rhs.0 as i64;
        Ok(Self(saturate(wide)))
    }

    /// Square root by Newton-Raphson seeded with the input.
    ///
    /// Non-positive input yields zero.
    #[must_use]
    pub fn sqrt(self) -> Self {
        Self(saturate(sqrt_raw(i64::from(self.0))))
    }

    /// Absolute value, saturating `MIN` to `MAX`.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Clamps into `[min, max]`.
    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Ord::clamp(self, min, max)
    }

    /// Returns `true` if the value is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the value is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Clamps a widened raw value (such as a [`Fixed::wide_mul`] result) into range.
    #[must_use]
    pub const fn from_wide(wide: i64) -> Self {
        Self(saturate(wide))
    }

    /// Square root of a widened raw value, saturating the root.
    ///
    /// Used for squared magnitudes that do not fit in 16.16 themselves. Unlike
    /// [`Fixed::sqrt`] this iterates until the estimate settles, so the result
    /// is the exact floor of the root at any magnitude.
    #[must_use]
    pub fn sqrt_wide(wide: i64) -> Self {
        Self(saturate(sqrt_wide_raw(wide)))
    }
}

/// Newton-Raphson square root over a widened raw 16.16 value.
///
/// The input is a raw fixed-point value held in an `i64` so that squared
/// lengths larger than `Fixed::MAX` can still be rooted.
fn sqrt_raw(x: i64) -> i64 {
    if x <= 0 {
        return 0;
    }
    let numerator = i128::from(x) << FRAC_BITS;
    let mut result = i128::from(x);
    for _ in 0..SQRT_ITERATIONS {
        if result == 0 {
            break;
        }
        let quotient = numerator / result;
        result = (result + quotient) >> 1;
    }
    result as i64
}

/// Square root of a widened raw 16.16 value, as a raw value.
fn sqrt_wide_raw(x: i64) -> i64 {
    if x <= 0 {
        return 0;
    }
    isqrt((x as u128) << FRAC_BITS) as i64
}

/// Floor of the square root of `n`.
///
/// Seeded at a power of two no smaller than the root, from which Newton's
/// method decreases monotonically onto the floor.
pub(crate) fn isqrt(n: u128) -> u128 {
    if n == 0 {
        return 0;
    }
    let bits = u128::BITS - n.leading_zeros();
    let mut root = 1u128 << bits.div_ceil(2);
    loop {
        let next = (root + n / root) >> 1;
        if next >= root {
            return root;
        }
        root = next;
    }
}

pub(crate) const fn saturate(wide: i64) -> i32 {
    if wide > i32::MAX as i64 {
        i32::MAX
    } else if wide < i32::MIN as i64 {
        i32::MIN
    } else {
        wide as i32
    }
}

impl Add for Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for Fixed {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.saturating_mul(rhs)
    }
}

impl MulAssign for Fixed {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Neg for Fixed {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!(Fixed::ONE.raw(), 65536);
        assert_eq!(Fixed::HALF.raw(), 32768);
        assert_eq!(Fixed::TWO.raw(), 131_072);
        assert!((Fixed::PI.to_f64() - std::f64::consts::PI).abs() < 1.0 / 65536.0);
        assert!((Fixed::TWO_PI.to_f64() - std::f64::consts::TAU).abs() < 1.0 / 65536.0);
    }

    #[test]
    fn int_conversions() {
        assert_eq!(Fixed::from_int(3).raw(), 3 * 65536);
        assert_eq!(Fixed::from_int(-2).to_int(), -2);
        assert_eq!(Fixed::from_f64(-0.5).to_int(), -1);
        assert_eq!(Fixed::from_int(40_000), Fixed::MAX);
    }

    #[test]
    fn float_conversion_rounds_to_nearest() {
        assert_eq!(Fixed::from_f64(1.5).raw(), 98_304);
        assert_eq!(Fixed::from_f64(0.1).raw(), 6554);
        assert_eq!(Fixed::from_f64(f64::NAN), Fixed::ZERO);
        assert_eq!(Fixed::from_f64(1.0e12), Fixed::MAX);
    }

    #[test]
    fn from_ratio_is_exact_for_dyadics() {
        assert_eq!(Fixed::from_ratio(3, 4).unwrap().raw(), 49_152);
        assert_eq!(
            Fixed::from_ratio(1, 0).unwrap_err(),
            MathError::DivideByZero
        );
    }

    #[test]
    fn multiply_basic() {
        let a = Fixed::from_f64(2.5);
        let b = Fixed::from_f64(-4.0);
        assert_eq!(a * b, Fixed::from_int(-10));
        assert_eq!(Fixed::HALF * Fixed::HALF, Fixed::from_f64(0.25));
    }

    #[test]
    fn multiply_wide_matches_reference_for_extremes() {
        for (a, b) in [
            (i32::MAX, i32::MAX),
            (i32::MIN, i32::MAX),
            (i32::MIN, i32::MIN),
            (i32::MAX, -1),
        ] {
            let reference = (i64::from(a) * i64::from(b)) >> 16;
            assert_eq!(Fixed::from_raw(a).wide_mul(Fixed::from_raw(b)), reference);
        }
    }

    #[test]
    fn multiply_largest_representable_product() {
        // 181.0 * 181.0 = 32761.0 is the largest integer square that fits.
        let a = Fixed::from_int(181);
        let reference = (i64::from(a.raw()) * i64::from(a.raw())) >> 16;
        assert_eq!(i64::from((a * a).raw()), reference);
        assert_eq!(a.checked_mul(a).unwrap(), Fixed::from_int(32_761));
    }

    #[test]
    fn multiply_out_of_range_is_reported_or_saturated() {
        let err = Fixed::MAX.checked_mul(Fixed::MAX).unwrap_err();
        assert!(matches!(err, MathError::Overflow { .. }));
        assert_eq!(Fixed::MAX * Fixed::MAX, Fixed::MAX);
        assert_eq!(Fixed::MAX * Fixed::MIN, Fixed::MIN);
    }

    #[test]
    fn divide() {
        let a = Fixed::from_int(10);
        let b = Fixed::from_int(4);
        assert_eq!(a.try_div(b).unwrap(), Fixed::from_f64(2.5));
        assert_eq!(a.try_div(-b).unwrap(), Fixed::from_f64(-2.5));
    }

    #[test]
    fn divide_by_zero_fails() {
        assert_eq!(
            Fixed::ONE.try_div(Fixed::ZERO).unwrap_err(),
            MathError::DivideByZero
        );
        // The smallest non-zero divisor is still a valid divisor.
        assert_eq!(Fixed::ONE.try_div(Fixed::EPSILON).unwrap(), Fixed::MAX);
    }

    #[test]
    fn sqrt_of_perfect_squares() {
        for n in [1, 4, 9, 16, 100, 1024, 32_761] {
            let root = Fixed::from_int(n).sqrt();
            let expected = f64::from(n).sqrt();
            assert!(
                (root.to_f64() - expected).abs() <= 2.0 / 65536.0,
                "sqrt({n}) = {root}"
            );
        }
    }

    #[test]
    fn sqrt_of_fractions() {
        let root = Fixed::from_f64(0.25).sqrt();
        assert!((root.to_f64() - 0.5).abs() <= 2.0 / 65536.0);
        let root = Fixed::EPSILON.sqrt();
        assert!((root.to_f64() - (1.0f64 / 65536.0).sqrt()).abs() <= 2.0 / 65536.0);
    }

    #[test]
    fn sqrt_wide_beyond_scalar_range() {
        let square = Fixed::from_int(300).wide_mul(Fixed::from_int(300));
        assert_eq!(Fixed::sqrt_wide(square), Fixed::from_int(300));
        assert_eq!(Fixed::from_wide(square), Fixed::MAX);
        assert_eq!(Fixed::from_wide(-square), Fixed::MIN);
    }

    #[test]
    fn sqrt_wide_is_exact_at_large_magnitudes() {
        for n in [20_000, 32_767, 46_341, 1_000_000] {
            let square = (i64::from(n) * i64::from(n)) << 16;
            let root = sqrt_wide_raw(square);
            assert_eq!(root, i64::from(n) << 16, "sqrt_wide({n}^2)");
        }
        let root = sqrt_wide_raw(i64::MAX);
        let expected = ((i64::MAX as f64) * 65536.0).sqrt();
        assert!((root as f64 - expected).abs() <= expected * 1e-12 + 1.0);
        assert_eq!(sqrt_wide_raw(1), 256);
        assert_eq!(sqrt_wide_raw(0), 0);
        assert_eq!(sqrt_wide_raw(-9), 0);
        assert_eq!(isqrt(u128::from(u64::MAX)), u128::from(u32::MAX));
        assert_eq!(isqrt(24), 4);
        assert_eq!(isqrt(25), 5);
    }

    #[test]
    fn sqrt_non_positive_is_zero() {
        assert_eq!(Fixed::ZERO.sqrt(), Fixed::ZERO);
        assert_eq!(Fixed::from_int(-4).sqrt(), Fixed::ZERO);
        assert_eq!(Fixed::MIN.sqrt(), Fixed::ZERO);
    }

    #[test]
    fn add_sub_neg_saturate() {
        assert_eq!(Fixed::MAX + Fixed::ONE, Fixed::MAX);
        assert_eq!(Fixed::MIN - Fixed::ONE, Fixed::MIN);
        assert_eq!(-Fixed::MIN, Fixed::MAX);
        assert_eq!(Fixed::MIN.abs(), Fixed::MAX);
    }

    #[test]
    fn assign_ops() {
        let mut value = Fixed::ONE;
        value += Fixed::ONE;
        value *= Fixed::from_int(3);
        value -= Fixed::HALF;
        assert_eq!(value, Fixed::from_f64(5.5));
    }

    #[test]
    fn clamp_and_predicates() {
        let value = Fixed::from_int(5).clamp(Fixed::ZERO, Fixed::ONE);
        assert_eq!(value, Fixed::ONE);
        assert!(Fixed::from_int(-1).is_negative());
        assert!(Fixed::ZERO.is_zero());
    }

    #[test]
    fn display_shows_decimal() {
        assert_eq!(Fixed::from_f64(1.25).to_string(), "1.2500");
    }
}
