//! Sparse affine expressions over constraint-system variables.

use std::collections::BTreeMap;
use std::ops::{AddAssign, Mul, MulAssign, SubAssign};

use p3_field::Field;

use crate::wire::Variable;

/// `constant + Σ coeff_i · x_i`, with terms kept sorted by variable and no
/// zero coefficients stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearCombination<F> {
    terms: BTreeMap<Variable, F>,
    constant: F,
}

impl<F: Field> LinearCombination<F> {
    pub fn zero() -> Self {
        Self::constant(F::ZERO)
    }

    pub fn one() -> Self {
        Self::constant(F::ONE)
    }

    pub fn constant(value: F) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    pub fn from_variable(var: Variable) -> Self {
        let mut lc = Self::zero();
        lc.add_term(var, F::ONE);
        lc
    }

    /// The constant term.
    pub fn constant_term(&self) -> F {
        self.constant
    }

    pub fn terms(&self) -> impl Iterator<Item = (Variable, F)> + '_ {
        self.terms.iter().map(|(&v, &c)| (v, c))
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn coefficient(&self, var: Variable) -> F {
        self.terms.get(&var).copied().unwrap_or(F::ZERO)
    }

    /// `self += coeff · var`
    pub fn add_term(&mut self, var: Variable, coeff: F) {
        let entry = self.terms.entry(var).or_insert(F::ZERO);
        *entry += coeff;
        if entry.is_zero() {
            self.terms.remove(&var);
        }
    }

    /// `self += scale · other`
    pub fn add_scaled(&mut self, other: &Self, scale: F) {
        if scale.is_zero() {
            return;
        }
        for (var, coeff) in other.terms() {
            self.add_term(var, coeff * scale);
        }
        self.constant += other.constant * scale;
    }

    /// Multiply every coefficient and the constant by `scale`.
    pub fn scale(&mut self, scale: F) {
        if scale.is_zero() {
            self.terms.clear();
            self.constant = F::ZERO;
            return;
        }
        for coeff in self.terms.values_mut() {
            *coeff *= scale;
        }
        self.constant *= scale;
    }

    /// Value of the expression under `assignment`, indexed by variable.
    ///
    /// Panics if a term refers to a variable beyond the assignment.
    pub fn evaluate(&self, assignment: &[F]) -> F {
        self.terms
            .iter()
            .fold(self.constant, |acc, (var, &coeff)| {
                acc + coeff * assignment[var.index()]
            })
    }
}

impl<F: Field> From<Variable> for LinearCombination<F> {
    fn from(var: Variable) -> Self {
        Self::from_variable(var)
    }
}

impl<F: Field> AddAssign<&LinearCombination<F>> for LinearCombination<F> {
    fn add_assign(&mut self, rhs: &LinearCombination<F>) {
        self.add_scaled(rhs, F::ONE);
    }
}

impl<F: Field> SubAssign<&LinearCombination<F>> for LinearCombination<F> {
    fn sub_assign(&mut self, rhs: &LinearCombination<F>) {
        self.add_scaled(rhs, F::NEG_ONE);
    }
}

impl<F: Field> AddAssign<F> for LinearCombination<F> {
    fn add_assign(&mut self, rhs: F) {
        self.constant += rhs;
    }
}

impl<F: Field> MulAssign<F> for LinearCombination<F> {
    fn mul_assign(&mut self, rhs: F) {
        self.scale(rhs);
    }
}

impl<F: Field> Mul<F> for &LinearCombination<F> {
    type Output = LinearCombination<F>;

    fn mul(self, rhs: F) -> LinearCombination<F> {
        let mut out = self.clone();
        out.scale(rhs);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    type F = BabyBear;

    fn lc(terms: &[(usize, u32)], constant: u32) -> LinearCombination<F> {
        let mut out = LinearCombination::constant(F::from_u32(constant));
        for &(var, coeff) in terms {
            out.add_term(Variable(var), F::from_u32(coeff));
        }
        out
    }

    #[test]
    fn test_add_merges_terms() {
        let mut a = lc(&[(0, 2), (3, 5)], 1);
        let b = lc(&[(3, 4), (1, 1)], 6);
        a += &b;
        assert_eq!(a, lc(&[(0, 2), (1, 1), (3, 9)], 7));
    }

    #[test]
    fn test_subtraction_drops_cancelled_terms() {
        let mut a = lc(&[(0, 2), (1, 3)], 4);
        let b = lc(&[(1, 3)], 4);
        a -= &b;
        assert_eq!(a.num_terms(), 1);
        assert_eq!(a.coefficient(Variable(1)), F::ZERO);
        assert_eq!(a.constant_term(), F::ZERO);
    }

    #[test]
    fn test_scale_and_evaluate() {
        let assignment = [F::from_u32(3), F::from_u32(10), F::from_u32(7)];
        let a = lc(&[(0, 2), (2, 1)], 5);
        assert_eq!(a.evaluate(&assignment), F::from_u32(5 + 6 + 7));

        let scaled = &a * F::from_u32(3);
        assert_eq!(scaled.evaluate(&assignment), F::from_u32(54));

        let mut negated = a.clone();
        negated *= F::NEG_ONE;
        assert_eq!(negated.evaluate(&assignment) + a.evaluate(&assignment), F::ZERO);
    }

    #[test]
    fn test_scale_by_zero_clears() {
        let mut a = lc(&[(0, 2), (2, 1)], 5);
        a.scale(F::ZERO);
        assert_eq!(a, LinearCombination::zero());
    }
}
