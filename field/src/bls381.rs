//! Scalar field of BLS12-381.
//!
//! p = 52435875175126190479447740508185965837690552500527637822603658699938581184513

use crate::fp256::{FieldParams, Fp256};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bls381FrParams;

impl FieldParams for Bls381FrParams {
    const NAME: &'static str = "Bls381Fr";

    const MODULUS: [u64; 4] = [
        0xffffffff00000001,
        0x53bda402fffe5bfe,
        0x3339d80809a1d805,
        0x73eda753299d7d48,
    ];

    const R: [u64; 4] = [
        0x00000001fffffffe,
        0x5884b7fa00034802,
        0x998c4fefecbc4ff5,
        0x1824b159acc5056f,
    ];

    const R2: [u64; 4] = [
        0xc999e990f3f29c6d,
        0x2b6cedcb87925c23,
        0x05d314967254398f,
        0x0748d9d99f59ff11,
    ];

    const MU: u64 = 0xfffffffeffffffff;

    // 7
    const GENERATOR: [u64; 4] = [
        0x0000000efffffff1,
        0x17e363d300189c0f,
        0xff9c57876f8457b0,
        0x351332208fc5a8c4,
    ];
}

/// BLS12-381 scalar field element
pub type Bls381Fr = Fp256<Bls381FrParams>;
