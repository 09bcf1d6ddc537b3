// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fixed-precision decimal text for LDraw coordinates
//!
//! Values are rounded half-to-even on their exact binary value, then trailing
//! zeros and a trailing decimal point are stripped. Negative zero prints as `0`.
//! See <https://www.ldraw.org/article/512.html#precision>.

/// Largest supported number of decimal places
pub const MAX_PLACES: u32 = 18;

/// Format `value` with at most `places` decimals (clamped to [`MAX_PLACES`])
pub fn format_decimal(value: f64, places: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let places = places.min(MAX_PLACES);
    let negative = value.is_sign_negative();
    let (mantissa, exponent) = decompose(value.abs());

    // Integral already; every digit is exact
    if exponent >= 0 {
        let digits = format!("{:.0}", value.abs());
        return if negative && digits != "0" {
            format!("-{}", digits)
        } else {
            digits
        };
    }

    // value * 10^places = mantissa * 10^places / 2^shift
    let scale = 10u128.pow(places);
    let numerator = mantissa as u128 * scale;
    let shift = exponent.unsigned_abs();
    let rounded = if shift >= 120 {
        // numerator < 2^113, below half of the divisor
        0
    } else {
        let quotient = numerator >> shift;
        let remainder = numerator - (quotient << shift);
        let half = 1u128 << (shift - 1);
        if remainder > half || (remainder == half && quotient % 2 == 1) {
            quotient + 1
        } else {
            quotient
        }
    };

    let integer = rounded / scale;
    let fraction = rounded % scale;
    let mut text = if places == 0 {
        integer.to_string()
    } else {
        let full = format!("{}.{:0width$}", integer, fraction, width = places as usize);
        full.trim_end_matches('0').trim_end_matches('.').to_string()
    };

    if negative && rounded != 0 {
        text.insert(0, '-');
    }
    text
}

/// Split a finite, non-negative value into `mantissa * 2^exponent`
fn decompose(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_value_decides_near_ties() {
        // 1.005 is stored as 1.00499999999999989...
        assert_eq!(format_decimal(1.005, 2), "1");
        assert_eq!(format_decimal(2.675, 2), "2.67");
    }

    #[test]
    fn test_exact_ties_round_to_even() {
        assert_eq!(format_decimal(0.125, 2), "0.12");
        assert_eq!(format_decimal(0.375, 2), "0.38");
        assert_eq!(format_decimal(2.5, 0), "2");
        assert_eq!(format_decimal(3.5, 0), "4");
        assert_eq!(format_decimal(-0.5, 0), "0");
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        assert_eq!(format_decimal(-0.001, 2), "0");
        assert_eq!(format_decimal(-0.0, 2), "0");
        assert_eq!(format_decimal(-0.004, 2), "0");
        assert_eq!(format_decimal(-0.006, 2), "-0.01");
    }

    #[test]
    fn test_trailing_zeros_and_point_stripped() {
        assert_eq!(format_decimal(1.10, 2), "1.1");
        assert_eq!(format_decimal(100.0, 2), "100");
        assert_eq!(format_decimal(-24.0, 3), "-24");
        assert_eq!(format_decimal(0.0, 2), "0");
        assert_eq!(format_decimal(10.0, 0), "10");
    }

    #[test]
    fn test_precision_is_respected() {
        assert_eq!(format_decimal(1.23456, 3), "1.235");
        assert_eq!(format_decimal(-7.5e-5, 4), "-0.0001");
        assert_eq!(format_decimal(0.1, 6), "0.1");
        assert_eq!(format_decimal(1.0e-30, 2), "0");
    }

    #[test]
    fn test_large_values() {
        assert_eq!(format_decimal(1.0e16, 2), "10000000000000000");
        assert_eq!(format_decimal(123456.789, 1), "123456.8");
    }
}
