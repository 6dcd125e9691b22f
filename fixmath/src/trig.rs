//! Table-driven sine and cosine.

use crate::scalar::Fixed;
use crate::table::SIN_TABLE;

/// Number of entries covering one full period.
pub const TABLE_SIZE: usize = 1024;

const TABLE_MASK: i64 = TABLE_SIZE as i64 - 1;
const QUARTER_PERIOD: i64 = TABLE_SIZE as i64 / 4;

/// Maps an angle in radians to its (unmasked) table position, rounded to nearest.
fn table_position(angle: Fixed) -> i64 {
    let two_pi = i64::from(Fixed::TWO_PI.raw());
    (i64::from(angle.raw()) * TABLE_SIZE as i64 + two_pi / 2).div_euclid(two_pi)
}

fn lookup(position: i64) -> Fixed {
    // Masking keeps the index in 0..TABLE_SIZE for any position, negative included.
    Fixed::from_raw(SIN_TABLE[(position & TABLE_MASK) as usize])
}

/// Sine of an angle in radians.
#[must_use]
pub fn sin(angle: Fixed) -> Fixed {
    lookup(table_position(angle))
}

/// Cosine of an angle in radians, read a quarter period ahead of sine.
#[must_use]
pub fn cos(angle: Fixed) -> Fixed {
    lookup(table_position(angle) + QUARTER_PERIOD)
}

/// Returns `(sin, cos)` for an angle from a single table position.
#[must_use]
pub fn sin_cos(angle: Fixed) -> (Fixed, Fixed) {
    let position = table_position(angle);
    (lookup(position), lookup(position + QUARTER_PERIOD))
}

impl Fixed {
    /// Sine of `self` interpreted as radians.
    #[must_use]
    pub fn sin(self) -> Self {
        sin(self)
    }

    /// Cosine of `self` interpreted as radians.
    #[must_use]
    pub fn cos(self) -> Self {
        cos(self)
    }
}
