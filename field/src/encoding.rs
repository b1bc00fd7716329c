//! Text encodings of field elements used by circuit and input files.

use p3_field::{Field, PrimeField};

use crate::errors::FieldError;

/// Parse a hexadecimal string (optionally prefixed with `0x`) into a field element.
///
/// Values at or above the modulus are reduced, so any hex string of any length
/// maps to a field element.
pub fn from_hex<F: Field>(s: &str) -> Result<F, FieldError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(FieldError::EmptyHex);
    }

    let sixteen = F::from_u8(16);
    digits.chars().try_fold(F::ZERO, |acc, c| {
        let digit = c.to_digit(16).ok_or_else(|| FieldError::InvalidHexDigit {
            input: s.to_string(),
            digit: c,
        })?;
        Ok(acc * sixteen + F::from_u8(digit as u8))
    })
}

/// Lower-case hex of the canonical representative, without prefix.
pub fn to_hex<F: PrimeField>(x: &F) -> String {
    format!("{:x}", x.as_canonical_biguint())
}

/// The `k` low bits of the canonical representative, least significant first.
pub fn bits_le<F: PrimeField>(x: &F, k: usize) -> Vec<bool> {
    let value = x.as_canonical_biguint();
    (0..k as u64).map(|i| value.bit(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BabyBear, Bn254Fr};
    use p3_field::PrimeCharacteristicRing;

    #[test]
    fn test_hex_small_values() {
        assert_eq!(from_hex::<BabyBear>("1").unwrap(), BabyBear::ONE);
        assert_eq!(from_hex::<BabyBear>("ff").unwrap(), BabyBear::from_u32(255));
        assert_eq!(from_hex::<Bn254Fr>("0x2A").unwrap(), Bn254Fr::from_u32(42));
    }

    #[test]
    fn test_hex_reduces_modulo_p() {
        // BabyBear modulus is 0x78000001
        assert_eq!(from_hex::<BabyBear>("78000001").unwrap(), BabyBear::ZERO);
        assert_eq!(from_hex::<BabyBear>("78000003").unwrap(), BabyBear::TWO);
    }

    #[test]
    fn test_hex_full_width_bn254() {
        let minus_one = "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000000";
        assert_eq!(from_hex::<Bn254Fr>(minus_one).unwrap(), Bn254Fr::NEG_ONE);
        assert_eq!(to_hex(&Bn254Fr::NEG_ONE), minus_one);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(matches!(from_hex::<BabyBear>(""), Err(FieldError::EmptyHex)));
        assert!(matches!(
            from_hex::<BabyBear>("12g4"),
            Err(FieldError::InvalidHexDigit { digit: 'g', .. })
        ));
    }

    #[test]
    fn test_bits_le() {
        let x = BabyBear::from_u32(0b1011);
        assert_eq!(bits_le(&x, 6), vec![true, true, false, true, false, false]);
        assert_eq!(bits_le(&x, 2), vec![true, true]);
    }
}
