//! Deterministic 16.16 fixed-point math for the slipstream race core.
//!
//! This crate provides [`Fixed`], a scaled-integer real, and [`Vec2`], along
//! with table-driven trigonometry and a Newton-Raphson square root. It is the
//! numeric foundation for every value that crosses the peer boundary.
//!
//! # Design Principles
//!
//! - **No floating point in the simulation** - Floats appear only in the
//!   explicit `from_f64`/`to_f64` conversions at the edge.
//! - **Widened multiplication** - Products are formed in 64 bits before
//!   shifting, so intermediates never overflow.
//! - **Explicit errors** - Division by zero returns [`MathError::DivideByZero`].
//!
//! # Example
//!
//! ```
//! use fixmath::{Fixed, Vec2};
//!
//! let velocity = Vec2::new(Fixed::from_int(3), Fixed::from_int(4));
//! let dt = Fixed::from_ratio(1, 2).unwrap();
//! let step = velocity.scale(dt);
//!
//! assert_eq!(step, Vec2::new(Fixed::from_f64(1.5), Fixed::from_int(2)));
//! assert_eq!(velocity.length(), Fixed::from_int(5));
//! ```

mod error;
mod scalar;
mod table;
mod trig;
mod vec2;

pub use error::{MathError, MathResult};
pub use scalar::{Fixed, FRAC_BITS, SQRT_ITERATIONS};
pub use trig::{cos, sin, sin_cos, TABLE_SIZE};
pub use vec2::Vec2;
