//! Generic 256-bit prime field in Montgomery form.
//!
//! An element is stored as `[u64; 4]` little-endian limbs holding `value * R mod p`
//! with `R = 2^256`. A concrete field is obtained by plugging a [`FieldParams`]
//! implementation into [`Fp256`]. The modulus must be below `2^255`, so that the
//! sum of two reduced elements never carries out of the top limb.

extern crate alloc;

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use core::iter::{Product, Sum};
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use num_bigint::BigUint;
use p3_field::integers::QuotientMap;
use p3_field::{Field, Packable, PrimeCharacteristicRing, PrimeField, RawDataSerializable};
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Constants describing one 256-bit prime field.
pub trait FieldParams:
    'static + Copy + Send + Sync + Debug + Default + Eq + Ord + Hash
{
    /// Human readable name, used in `Debug` output.
    const NAME: &'static str;
    /// The prime modulus `p`, little-endian.
    const MODULUS: [u64; 4];
    /// `2^256 mod p`
    const R: [u64; 4];
    /// `2^512 mod p`
    const R2: [u64; 4];
    /// `-p^{-1} mod 2^64`
    const MU: u64;
    /// A multiplicative generator, already in Montgomery form.
    const GENERATOR: [u64; 4];
}

/// Element of the prime field described by `P`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Fp256<P: FieldParams> {
    /// Montgomery form: value * R mod p
    limbs: [u64; 4],
    #[serde(skip)]
    _params: PhantomData<P>,
}

impl<P: FieldParams> Fp256<P> {
    /// Zero element (in Montgomery form)
    pub const ZERO: Self = Self::from_raw([0, 0, 0, 0]);

    /// One element (in Montgomery form: R mod p)
    pub const ONE: Self = Self::from_raw(P::R);

    #[inline]
    const fn from_raw(limbs: [u64; 4]) -> Self {
        Self {
            limbs,
            _params: PhantomData,
        }
    }

    /// Create a field element from a u64 value
    #[inline]
    pub fn from_canonical_u64(val: u64) -> Self {
        Self::from_canonical_limbs([val, 0, 0, 0])
    }

    /// Create a field element from canonical little-endian limbs.
    ///
    /// The limbs must already be reduced below the modulus.
    #[inline]
    pub fn from_canonical_limbs(limbs: [u64; 4]) -> Self {
        montgomery_mul::<P>(Self::from_raw(limbs), Self::from_raw(P::R2))
    }

    /// Convert from Montgomery form to canonical little-endian limbs
    #[inline]
    pub fn to_canonical_limbs(&self) -> [u64; 4] {
        montgomery_mul::<P>(*self, Self::from_raw([1, 0, 0, 0])).limbs
    }

    /// Check if this field element is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs == [0, 0, 0, 0]
    }

    /// Compute multiplicative inverse using Fermat's little theorem: a^{-1} = a^{p-2}.
    /// Zero maps to zero.
    pub fn inverse(&self) -> Self {
        let exp = sub_mod(P::MODULUS, [2, 0, 0, 0], &P::MODULUS);
        self.pow_vartime(exp)
    }

    /// Variable-time exponentiation
    fn pow_vartime(&self, exp: [u64; 4]) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }

        let mut result = Self::ONE;
        let mut base = *self;

        for &limb in exp.iter() {
            let mut remaining = limb;
            for _ in 0..64 {
                if remaining & 1 == 1 {
                    result = result * base;
                }
                base = base * base;
                remaining >>= 1;
            }
        }

        result
    }
}

/// Helper: Add two 256-bit numbers mod p
#[inline]
const fn add_mod(a: [u64; 4], b: [u64; 4], m: &[u64; 4]) -> [u64; 4] {
    let (r0, carry) = a[0].overflowing_add(b[0]);
    let (r1, carry) = carrying_add(a[1], b[1], carry);
    let (r2, carry) = carrying_add(a[2], b[2], carry);
    let (r3, carry) = carrying_add(a[3], b[3], carry);

    let (s0, borrow) = r0.overflowing_sub(m[0]);
    let (s1, borrow) = borrowing_sub(r1, m[1], borrow);
    let (s2, borrow) = borrowing_sub(r2, m[2], borrow);
    let (s3, borrow) = borrowing_sub(r3, m[3], borrow);

    if carry || !borrow {
        [s0, s1, s2, s3]
    } else {
        [r0, r1, r2, r3]
    }
}

/// Helper: Subtract two 256-bit numbers mod p
#[inline]
const fn sub_mod(a: [u64; 4], b: [u64; 4], m: &[u64; 4]) -> [u64; 4] {
    let (r0, borrow) = a[0].overflowing_sub(b[0]);
    let (r1, borrow) = borrowing_sub(a[1], b[1], borrow);
    let (r2, borrow) = borrowing_sub(a[2], b[2], borrow);
    let (r3, borrow) = borrowing_sub(a[3], b[3], borrow);

    if borrow {
        let (r0, carry) = r0.overflowing_add(m[0]);
        let (r1, carry) = carrying_add(r1, m[1], carry);
        let (r2, carry) = carrying_add(r2, m[2], carry);
        let (r3, _) = carrying_add(r3, m[3], carry);
        [r0, r1, r2, r3]
    } else {
        [r0, r1, r2, r3]
    }
}

#[inline]
const fn neg_mod(a: [u64; 4], m: &[u64; 4]) -> [u64; 4] {
    if a[0] == 0 && a[1] == 0 && a[2] == 0 && a[3] == 0 {
        return [0, 0, 0, 0];
    }
    sub_mod(*m, a, m)
}

#[inline]
const fn is_canonical(limbs: [u64; 4], m: &[u64; 4]) -> bool {
    let (_, borrow) = limbs[0].overflowing_sub(m[0]);
    let (_, borrow) = borrowing_sub(limbs[1], m[1], borrow);
    let (_, borrow) = borrowing_sub(limbs[2], m[2], borrow);
    let (_, borrow) = borrowing_sub(limbs[3], m[3], borrow);
    borrow
}

#[inline]
const fn carrying_add(a: u64, b: u64, carry: bool) -> (u64, bool) {
    let (sum, overflow1) = a.overflowing_add(b);
    let (sum, overflow2) = sum.overflowing_add(carry as u64);
    (sum, overflow1 || overflow2)
}

#[inline]
const fn borrowing_sub(a: u64, b: u64, borrow: bool) -> (u64, bool) {
    let (diff, overflow1) = a.overflowing_sub(b);
    let (diff, overflow2) = diff.overflowing_sub(borrow as u64);
    (diff, overflow1 || overflow2)
}

/// Shift a 256-bit number right by one bit.
#[inline]
const fn shr1(a: [u64; 4]) -> [u64; 4] {
    [
        (a[0] >> 1) | (a[1] << 63),
        (a[1] >> 1) | (a[2] << 63),
        (a[2] >> 1) | (a[3] << 63),
        a[3] >> 1,
    ]
}

/// Montgomery multiplication: (a * b * R^{-1}) mod p
#[inline]
fn montgomery_mul<P: FieldParams>(a: Fp256<P>, b: Fp256<P>) -> Fp256<P> {
    let mut t = [0u64; 8];

    for i in 0..4 {
        let mut carry = 0u128;
        for j in 0..4 {
            let product = (a.limbs[i] as u128) * (b.limbs[j] as u128) + (t[i + j] as u128) + carry;
            t[i + j] = product as u64;
            carry = product >> 64;
        }
        t[i + 4] = carry as u64;
    }

    for i in 0..4 {
        let k = t[i].wrapping_mul(P::MU);
        let mut carry = 0u128;

        for j in 0..4 {
            let product =
                (k as u128) * (P::MODULUS[j] as u128) + (t[i + j] as u128) + carry;
            t[i + j] = product as u64;
            carry = product >> 64;
        }

        for j in 4..8 - i {
            let sum = (t[i + j] as u128) + carry;
            t[i + j] = sum as u64;
            carry = sum >> 64;
        }
    }

    let result = [t[4], t[5], t[6], t[7]];
    if is_canonical(result, &P::MODULUS) {
        Fp256::from_raw(result)
    } else {
        Fp256::from_raw(sub_mod(result, P::MODULUS, &P::MODULUS))
    }
}

impl<P: FieldParams> PrimeCharacteristicRing for Fp256<P> {
    type PrimeSubfield = Self;

    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;
    const TWO: Self = Self::from_raw(add_mod(P::R, P::R, &P::MODULUS));
    const NEG_ONE: Self = Self::from_raw(sub_mod(P::MODULUS, P::R, &P::MODULUS));

    #[inline]
    fn from_prime_subfield(elem: Self::PrimeSubfield) -> Self {
        elem
    }

    #[inline]
    fn halve(&self) -> Self {
        // p < 2^255, so self + p cannot overflow 256 bits
        if self.limbs[0] & 1 == 1 {
            let (r0, carry) = self.limbs[0].overflowing_add(P::MODULUS[0]);
            let (r1, carry) = carrying_add(self.limbs[1], P::MODULUS[1], carry);
            let (r2, carry) = carrying_add(self.limbs[2], P::MODULUS[2], carry);
            let (r3, _) = carrying_add(self.limbs[3], P::MODULUS[3], carry);
            Self::from_raw(shr1([r0, r1, r2, r3]))
        } else {
            Self::from_raw(shr1(self.limbs))
        }
    }
}

impl<P: FieldParams> Packable for Fp256<P> {}

impl<P: FieldParams> RawDataSerializable for Fp256<P> {
    const NUM_BYTES: usize = 32;

    fn into_bytes(self) -> impl IntoIterator<Item = u8> {
        let canonical = self.to_canonical_limbs();
        let mut bytes = Vec::with_capacity(32);
        for &limb in &canonical {
            bytes.extend_from_slice(&limb.to_le_bytes());
        }
        bytes
    }
}

impl<P: FieldParams> Distribution<Fp256<P>> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fp256<P> {
        let top_mask = u64::MAX >> P::MODULUS[3].leading_zeros();
        loop {
            let mut limbs: [u64; 4] = rng.random();
            limbs[3] &= top_mask;

            if is_canonical(limbs, &P::MODULUS) {
                return Fp256::from_canonical_limbs(limbs);
            }
        }
    }
}

impl<P: FieldParams> Field for Fp256<P> {
    type Packing = Self;

    const GENERATOR: Self = Self::from_raw(P::GENERATOR);

    fn try_inverse(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self.inverse())
        }
    }

    fn order() -> BigUint {
        limbs_to_biguint(P::MODULUS)
    }
}

impl<P: FieldParams> PrimeField for Fp256<P> {
    fn as_canonical_biguint(&self) -> BigUint {
        limbs_to_biguint(self.to_canonical_limbs())
    }
}

fn limbs_to_biguint(limbs: [u64; 4]) -> BigUint {
    let mut bytes = Vec::with_capacity(32);
    for &limb in &limbs {
        bytes.extend_from_slice(&limb.to_le_bytes());
    }
    BigUint::from_bytes_le(&bytes)
}

macro_rules! quotient_map_unsigned {
    ($($t:ty),*) => {$(
        impl<P: FieldParams> QuotientMap<$t> for Fp256<P> {
            fn from_int(int: $t) -> Self {
                Self::from_canonical_u64(int as u64)
            }

            fn from_canonical_checked(int: $t) -> Option<Self> {
                Some(Self::from_canonical_u64(int as u64))
            }

            unsafe fn from_canonical_unchecked(int: $t) -> Self {
                Self::from_canonical_u64(int as u64)
            }
        }
    )*};
}

macro_rules! quotient_map_signed {
    ($($t:ty),*) => {$(
        impl<P: FieldParams> QuotientMap<$t> for Fp256<P> {
            fn from_int(int: $t) -> Self {
                let magnitude = Self::from_canonical_u64(int.unsigned_abs() as u64);
                if int >= 0 {
                    magnitude
                } else {
                    -magnitude
                }
            }

            fn from_canonical_checked(int: $t) -> Option<Self> {
                Some(Self::from_int(int))
            }

            unsafe fn from_canonical_unchecked(int: $t) -> Self {
                Self::from_int(int)
            }
        }
    )*};
}

quotient_map_unsigned!(u8, u16, u32, u64);
quotient_map_signed!(i8, i16, i32, i64);

impl<P: FieldParams> QuotientMap<u128> for Fp256<P> {
    fn from_int(int: u128) -> Self {
        Self::from_canonical_limbs([int as u64, (int >> 64) as u64, 0, 0])
    }

    fn from_canonical_checked(int: u128) -> Option<Self> {
        Some(Self::from_int(int))
    }

    unsafe fn from_canonical_unchecked(int: u128) -> Self {
        Self::from_int(int)
    }
}

impl<P: FieldParams> QuotientMap<i128> for Fp256<P> {
    fn from_int(int: i128) -> Self {
        let magnitude = <Self as QuotientMap<u128>>::from_int(int.unsigned_abs());
        if int >= 0 {
            magnitude
        } else {
            -magnitude
        }
    }

    fn from_canonical_checked(int: i128) -> Option<Self> {
        Some(Self::from_int(int))
    }

    unsafe fn from_canonical_unchecked(int: i128) -> Self {
        Self::from_int(int)
    }
}

impl<P: FieldParams> Add for Fp256<P> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_raw(add_mod(self.limbs, rhs.limbs, &P::MODULUS))
    }
}

impl<P: FieldParams> AddAssign for Fp256<P> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<P: FieldParams> Sub for Fp256<P> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(sub_mod(self.limbs, rhs.limbs, &P::MODULUS))
    }
}

impl<P: FieldParams> SubAssign for Fp256<P> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<P: FieldParams> Neg for Fp256<P> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::from_raw(neg_mod(self.limbs, &P::MODULUS))
    }
}

impl<P: FieldParams> Mul for Fp256<P> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        montgomery_mul(self, rhs)
    }
}

impl<P: FieldParams> MulAssign for Fp256<P> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<P: FieldParams> Div for Fp256<P> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self * rhs.inverse()
    }
}

impl<P: FieldParams> DivAssign for Fp256<P> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<P: FieldParams> Sum for Fp256<P> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl<P: FieldParams> Product for Fp256<P> {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| acc * x)
    }
}

impl<P: FieldParams> PartialOrd for Fp256<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: FieldParams> Ord for Fp256<P> {
    /// Orders by canonical value, not by Montgomery representation.
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.to_canonical_limbs();
        let b = other.to_canonical_limbs();
        a.iter().rev().cmp(b.iter().rev())
    }
}

impl<P: FieldParams> Display for Fp256<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let canonical = self.to_canonical_limbs();
        write!(
            f,
            "0x{:016x}{:016x}{:016x}{:016x}",
            canonical[3], canonical[2], canonical[1], canonical[0]
        )
    }
}

impl<P: FieldParams> Debug for Fp256<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", P::NAME, self)
    }
}

impl<P: FieldParams> Hash for Fp256<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.limbs.hash(state);
    }
}
