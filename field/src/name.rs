//! Names of the prime fields a circuit can be compiled over.

use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

use num_bigint::BigUint;
use p3_field::Field;
use serde::{Deserialize, Serialize};

use crate::errors::FieldError;
use crate::{BabyBear, Bls381Fr, Bn254Fr, KoalaBear};

/// Prime field selector, spelled the way circuit generators name their output files
/// (`circuit.arith.LIBSNARK`, `circuit.in.Bls381`, ...).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldName {
    /// BN254 scalar field, libsnark's default curve
    Libsnark,
    /// BN254 scalar field as used by Aurora
    Aurora,
    /// BLS12-381 scalar field
    Bls381,
    BabyBear,
    KoalaBear,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::Libsnark,
        FieldName::Aurora,
        FieldName::Bls381,
        FieldName::BabyBear,
        FieldName::KoalaBear,
    ];

    /// The prime modulus of the named field.
    pub fn modulus(&self) -> BigUint {
        match self {
            FieldName::Libsnark | FieldName::Aurora => Bn254Fr::order(),
            FieldName::Bls381 => Bls381Fr::order(),
            FieldName::BabyBear => BabyBear::order(),
            FieldName::KoalaBear => KoalaBear::order(),
        }
    }
}

impl FromStr for FieldName {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "libsnark" => Ok(FieldName::Libsnark),
            "aurora" => Ok(FieldName::Aurora),
            "bls381" | "bls12-381" => Ok(FieldName::Bls381),
            "babybear" => Ok(FieldName::BabyBear),
            "koalabear" => Ok(FieldName::KoalaBear),
            _ => Err(FieldError::UnknownFieldName(s.to_string())),
        }
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldName::Libsnark => "LIBSNARK",
            FieldName::Aurora => "AURORA",
            FieldName::Bls381 => "Bls381",
            FieldName::BabyBear => "BabyBear",
            FieldName::KoalaBear => "KoalaBear",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_display() {
        for name in FieldName::ALL {
            assert_eq!(name.to_string().parse::<FieldName>().unwrap(), name);
        }
    }

    #[test]
    fn test_libsnark_and_aurora_share_a_modulus() {
        assert_eq!(FieldName::Libsnark.modulus(), FieldName::Aurora.modulus());
        assert_eq!(
            FieldName::Aurora.modulus().to_string(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495617"
        );
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(
            "SPARTAN".parse::<FieldName>(),
            Err(FieldError::UnknownFieldName("SPARTAN".to_string()))
        );
    }
}
