//! Conversion between user-facing decimal strings and scaled integer amounts.
//!
//! Token quantities are unbounded 256-bit integers on chain, so every
//! conversion runs on `BigUint`. No floating-point intermediate is ever
//! used; a float would silently lose precision above 2^53.

use num_bigint::BigUint;
use num_traits::Num;

use crate::error::AmmError;

/// Scale a decimal string to an integer amount in the token's smallest unit.
///
/// The input must be an unsigned decimal number (`123`, `0.5`, `1.25`).
/// Fractional digits beyond `decimals` are truncated, never rounded;
/// missing digits are zero-padded on the right. Leading zeros are stripped
/// and an all-zero input yields zero.
pub fn scale_to_integer(input: &str, decimals: u32) -> Result<BigUint, AmmError> {
    let trimmed = input.trim();

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (trimmed, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.is_none_or(all_digits) {
        return Err(AmmError::InvalidFormat(format!(
            "not a decimal amount: {input}"
        )));
    }

    let frac_part = frac_part.unwrap_or("");
    let keep = frac_part.len().min(decimals as usize);

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(&frac_part[..keep]);
    for _ in keep..decimals as usize {
        digits.push('0');
    }

    BigUint::from_str_radix(&digits, 10)
        .map_err(|_| AmmError::InvalidFormat(format!("not a decimal amount: {input}")))
}

/// Render a scaled integer amount as its canonical shortest decimal string.
///
/// The integer part carries no leading zeros (a bare `0` when empty), the
/// fractional part carries no trailing zeros, and neither the fractional
/// part nor the decimal point is emitted for whole multiples of the scale.
pub fn format_integer(amount: &BigUint, decimals: u32) -> String {
    let digits = amount.to_str_radix(10);
    let scale = decimals as usize;
    if scale == 0 {
        return digits;
    }

    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}
