//! Prime fields for arithmetic-circuit compilation.
//!
//! This crate provides a generic 256-bit Montgomery field, [`Fp256`], instantiated
//! for the BN254 and BLS12-381 scalar fields, and re-exports the 31-bit Plonky3
//! fields [`BabyBear`] and [`KoalaBear`]. All of them implement
//! [`p3_field::PrimeField`], which is the only interface the circuit compiler
//! relies on.
//!
//! It also carries the text encodings circuit files use for field elements
//! (hex strings and little-endian bit decompositions) and [`FieldName`], the
//! selector for the field a circuit file was generated for.

mod bls381;
mod bn254;
mod encoding;
mod errors;
mod fp256;
mod name;
mod random;

pub use bls381::{Bls381Fr, Bls381FrParams};
pub use bn254::{Bn254Fr, Bn254FrParams};
pub use encoding::{bits_le, from_hex, to_hex};
pub use errors::FieldError;
pub use fp256::{FieldParams, Fp256};
pub use name::FieldName;
pub use p3_baby_bear::BabyBear;
pub use p3_koala_bear::KoalaBear;
pub use random::RandomField;
