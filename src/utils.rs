use num_bigint::BigUint;
use num_traits::Num;

use crate::error::AmmError;

/// Declares how an incoming big-integer string is encoded.
///
/// The flag always comes from the caller. A `0x` prefix on its own is never
/// trusted to disambiguate, because providers emit both prefixed and bare
/// hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerEncoding {
    Decimal,
    Hex,
}

/// Parse an opaque big-integer string under an explicit encoding flag.
pub fn parse_big_integer(raw: &str, encoding: IntegerEncoding) -> Result<BigUint, AmmError> {
    let trimmed = raw.trim();
    match encoding {
        IntegerEncoding::Decimal => {
            if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmmError::InvalidFormat(format!(
                    "not a decimal integer: {raw}"
                )));
            }
            BigUint::from_str_radix(trimmed, 10)
                .map_err(|_| AmmError::InvalidFormat(format!("not a decimal integer: {raw}")))
        }
        IntegerEncoding::Hex => {
            let digits = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
                .unwrap_or(trimmed);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AmmError::InvalidFormat(format!("not a hex integer: {raw}")));
            }
            BigUint::from_str_radix(digits, 16)
                .map_err(|_| AmmError::InvalidFormat(format!("not a hex integer: {raw}")))
        }
    }
}

/// Whether a spender allowance is too small to move `amount`.
pub fn needs_approval(
    allowance_raw: &str,
    encoding: IntegerEncoding,
    amount: &BigUint,
) -> Result<bool, AmmError> {
    let allowance = parse_big_integer(allowance_raw, encoding)?;
    Ok(&allowance < amount)
}

/// Render bytes as `0x`-prefixed hexadecimal.
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// One 32-byte big-endian word for an unsigned integer argument.
///
/// Values above 256 bits cannot be represented on chain and are rejected.
pub(crate) fn abi_word_uint(value: &BigUint) -> Result<[u8; 32], AmmError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(AmmError::InvalidFormat(format!(
            "value exceeds 256 bits: {value}"
        )));
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

/// One 32-byte word for a left-padded 20-byte address argument.
pub(crate) fn abi_word_bytes20(address: &[u8; 20]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_rejects_wrong_encoding() {
        assert_matches!(
            parse_big_integer("0xff", IntegerEncoding::Decimal),
            Err(AmmError::InvalidFormat(_))
        );
        assert!(parse_big_integer("ff", IntegerEncoding::Hex).is_ok());
        assert_matches!(
            parse_big_integer("", IntegerEncoding::Hex),
            Err(AmmError::InvalidFormat(_))
        );
    }

    #[test]
    fn parse_handles_both_encodings() {
        let dec = parse_big_integer("255", IntegerEncoding::Decimal).unwrap();
        let hex_bare = parse_big_integer("ff", IntegerEncoding::Hex).unwrap();
        let hex_prefixed = parse_big_integer("0xFF", IntegerEncoding::Hex).unwrap();
        assert_eq!(dec, hex_bare);
        assert_eq!(dec, hex_prefixed);
    }

    #[test]
    fn allowance_check() {
        let amount = BigUint::from(1_000u32);
        assert!(needs_approval("999", IntegerEncoding::Decimal, &amount).unwrap());
        assert!(!needs_approval("1000", IntegerEncoding::Decimal, &amount).unwrap());
    }
}
