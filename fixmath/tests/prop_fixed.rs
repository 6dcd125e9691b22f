use fixmath::{cos, sin, Fixed, Vec2};
use proptest::prelude::*;

const LSB: f64 = 1.0 / 65536.0;

proptest! {
    #[test]
    fn prop_real_roundtrip_within_one_lsb(value in -32767.0f64..32767.0) {
        let back = Fixed::from_f64(value).to_f64();
        prop_assert!((back - value).abs() <= LSB, "{value} -> {back}");
    }

    #[test]
    fn prop_mul_matches_wide_reference(a in any::<i32>(), b in any::<i32>()) {
        let reference = (i64::from(a) * i64::from(b)) >> 16;
        let fa = Fixed::from_raw(a);
        let fb = Fixed::from_raw(b);
        prop_assert_eq!(fa.wide_mul(fb), reference);
        match fa.checked_mul(fb) {
            Ok(product) => prop_assert_eq!(i64::from(product.raw()), reference),
            Err(_) => prop_assert!(reference > i64::from(i32::MAX) || reference < i64::from(i32::MIN)),
        }
        let clamped = reference.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
        prop_assert_eq!(i64::from((fa * fb).raw()), clamped);
    }

    #[test]
    fn prop_pythagorean_identity(raw in any::<i32>()) {
        let angle = Fixed::from_raw(raw);
        let s = sin(angle);
        let c = cos(angle);
        let sum = s * s + c * c;
        prop_assert!((sum - Fixed::ONE).abs().raw() <= 4);
    }

    #[test]
    fn prop_div_by_nonzero_succeeds(a in any::<i32>(), b in any::<i32>().prop_filter("nonzero", |b| *b != 0)) {
        prop_assert!(Fixed::from_raw(a).try_div(Fixed::from_raw(b)).is_ok());
    }

    #[test]
    fn prop_sqrt_close_to_reference(value in 0.0f64..32767.0) {
        let fixed = Fixed::from_f64(value);
        let root = fixed.sqrt().to_f64();
        let expected = fixed.to_f64().sqrt();
        prop_assert!((root - expected).abs() <= 4.0 * LSB, "sqrt({value}) = {root}");
    }

    #[test]
    fn prop_length_matches_reference_at_any_magnitude(x in any::<i32>(), y in any::<i32>()) {
        let v = Vec2::new(Fixed::from_raw(x), Fixed::from_raw(y));
        let expected = (f64::from(x) / 65536.0).hypot(f64::from(y) / 65536.0);
        let length = v.length();
        if expected >= Fixed::MAX.to_f64() {
            prop_assert_eq!(length, Fixed::MAX);
        } else {
            prop_assert!(
                (length.to_f64() - expected).abs() <= 2.0 * LSB,
                "|({x}, {y})| = {length}, expected {expected}"
            );
        }
    }

    #[test]
    fn prop_normalize_is_unit_or_zero(x in -1000i32..1000, y in -1000i32..1000) {
        let v = Vec2::from_ints(x, y).normalize();
        if x == 0 && y == 0 {
            prop_assert_eq!(v, Vec2::ZERO);
        } else {
            prop_assert!((v.length() - Fixed::ONE).abs().raw() <= 8);
        }
    }
}
