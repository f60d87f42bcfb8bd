//! Fixed-point conversions for protocol quantities.
//!
//! Aave expresses the health factor as a ray: a 1e27-scaled integer where
//! exactly 1e27 marks the solvency boundary. Conversions go through
//! `rust_decimal` so the boundary comparison is exact rather than subject to
//! f64 rounding.

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Ray scale exponent (1e27 = 1.0).
pub const RAY_DECIMALS: u32 = 27;

/// Basis points denominator (10000 = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Convert a ray-scaled integer to an exact decimal.
///
/// Values too large for the decimal mantissa (Aave reports `U256::MAX` for
/// debt-free accounts) saturate to `Decimal::MAX`, which is always on the
/// healthy side of the threshold.
pub fn ray_to_decimal(ray: U256) -> Decimal {
    match i128::try_from(ray) {
        Ok(v) => Decimal::try_from_i128_with_scale(v, RAY_DECIMALS).unwrap_or(Decimal::MAX),
        Err(_) => Decimal::MAX,
    }
}

/// Convert an integer token amount to a decimal, saturating on overflow.
///
/// Used only for ratio computations and logging; wei-denominated arithmetic
/// stays in `U256`.
pub fn u256_to_decimal(value: U256) -> Decimal {
    match u128::try_from(value) {
        Ok(v) => Decimal::from(v),
        Err(_) => Decimal::MAX,
    }
}

/// Convert basis points to a fraction (500 -> 0.05).
pub fn bps_to_fraction(bps: u16) -> Decimal {
    Decimal::from(bps) / Decimal::from(BPS_DENOMINATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ray(pow10_27_multiples: u64) -> U256 {
        U256::from(pow10_27_multiples) * U256::from(10u64).pow(U256::from(27u64))
    }

    #[test]
    fn test_ray_to_decimal_zero() {
        assert_eq!(ray_to_decimal(U256::ZERO), dec!(0));
    }

    #[test]
    fn test_ray_to_decimal_boundary_is_exact_one() {
        assert_eq!(ray_to_decimal(ray(1)), Decimal::ONE);
    }

    #[test]
    fn test_ray_to_decimal_just_below_two_is_exact() {
        // 2e27 - 1 must round-trip exactly, not saturate or round
        let value = ray(2) - U256::from(1u64);
        let expected = Decimal::try_from_i128_with_scale(
            1_999_999_999_999_999_999_999_999_999i128,
            RAY_DECIMALS,
        )
        .unwrap();
        assert_eq!(ray_to_decimal(value), expected);
        assert!(ray_to_decimal(value) < dec!(2));
        assert!(ray_to_decimal(value) > dec!(1.9));
    }

    #[test]
    fn test_ray_to_decimal_fractional() {
        // 0.9e27 -> 0.9
        let value = U256::from(9u64) * U256::from(10u64).pow(U256::from(26u64));
        assert_eq!(ray_to_decimal(value), dec!(0.9));
    }

    #[test]
    fn test_ray_to_decimal_saturates_on_debt_free_sentinel() {
        assert_eq!(ray_to_decimal(U256::MAX), Decimal::MAX);
    }

    #[test]
    fn test_bps_to_fraction() {
        assert_eq!(bps_to_fraction(500), dec!(0.05));
        assert_eq!(bps_to_fraction(10_000), dec!(1));
        assert_eq!(bps_to_fraction(0), dec!(0));
    }
}
