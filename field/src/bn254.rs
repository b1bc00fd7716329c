//! Scalar field of BN254 (alt_bn128), the field libsnark and Aurora circuits are built over.
//!
//! p = 21888242871839275222246405745257275088548364400416034343698204186575808495617

use crate::fp256::{FieldParams, Fp256};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bn254FrParams;

impl FieldParams for Bn254FrParams {
    const NAME: &'static str = "Bn254Fr";

    const MODULUS: [u64; 4] = [
        0x43e1f593f0000001,
        0x2833e84879b97091,
        0xb85045b68181585d,
        0x30644e72e131a029,
    ];

    const R: [u64; 4] = [
        0xac96341c4ffffffb,
        0x36fc76959f60cd29,
        0x666ea36f7879462e,
        0x0e0a77c19a07df2f,
    ];

    const R2: [u64; 4] = [
        0x1bb8e645ae216da7,
        0x53fe3ab1e35c59e3,
        0x8c49833d53bb8085,
        0x0216d0b17f4e44a5,
    ];

    const MU: u64 = 0xc2e1f593efffffff;

    // 5
    const GENERATOR: [u64; 4] = [
        0x1b0d0ef99fffffe6,
        0xeaba68a3a32a913f,
        0x47d8eb76d8dd0689,
        0x15d0085520f5bbc3,
    ];
}

/// BN254 scalar field element
pub type Bn254Fr = Fp256<Bn254FrParams>;
