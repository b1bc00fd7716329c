//! The rank-1 constraint system produced by compilation.

use p3_field::Field;
use serde::{Deserialize, Serialize};

use crate::linear_combination::LinearCombination;
use crate::wire::Variable;

/// `⟨a, x⟩ · ⟨b, x⟩ = ⟨c, x⟩`, tagged with the gate kind that emitted it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct R1csConstraint<F> {
    pub a: LinearCombination<F>,
    pub b: LinearCombination<F>,
    pub c: LinearCombination<F>,
    pub annotation: &'static str,
}

impl<F: Field> R1csConstraint<F> {
    pub fn new(
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
        annotation: &'static str,
    ) -> Self {
        Self {
            a,
            b,
            c,
            annotation,
        }
    }

    pub fn is_satisfied(&self, assignment: &[F]) -> bool {
        self.a.evaluate(assignment) * self.b.evaluate(assignment) == self.c.evaluate(assignment)
    }
}

/// Constraints plus a dense assignment indexed by [`Variable`].
#[derive(Clone, Debug, Default)]
pub struct R1cs<F> {
    constraints: Vec<R1csConstraint<F>>,
    assignment: Vec<F>,
}

impl<F: Field> R1cs<F> {
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            assignment: Vec::new(),
        }
    }

    pub fn add_constraint(&mut self, constraint: R1csConstraint<F>) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[R1csConstraint<F>] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Size the assignment to `num_variables`, zero-filling new slots.
    pub fn resize_assignment(&mut self, num_variables: usize) {
        self.assignment.resize(num_variables, F::ZERO);
    }

    pub fn num_variables(&self) -> usize {
        self.assignment.len()
    }

    /// Set the value of `var`, growing the assignment if needed.
    pub fn set_value(&mut self, var: Variable, value: F) {
        if var.index() >= self.assignment.len() {
            self.assignment.resize(var.index() + 1, F::ZERO);
        }
        self.assignment[var.index()] = value;
    }

    pub fn value(&self, var: Variable) -> Option<F> {
        self.assignment.get(var.index()).copied()
    }

    pub fn assignment(&self) -> &[F] {
        &self.assignment
    }

    pub fn evaluate(&self, lc: &LinearCombination<F>) -> F {
        lc.evaluate(&self.assignment)
    }

    /// Index of the first constraint the assignment violates.
    pub fn first_unsatisfied(&self) -> Option<usize> {
        self.constraints
            .iter()
            .position(|c| !c.is_satisfied(&self.assignment))
    }

    pub fn is_satisfied(&self) -> bool {
        self.first_unsatisfied().is_none()
    }
}

/// How the assignment splits into primary input and auxiliary segments.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessLayout {
    /// Circuit inputs followed by circuit outputs.
    pub primary_input_size: usize,
    pub auxiliary_input_size: usize,
    /// Sizes of the auxiliary segments, in declaration order.
    pub segment_sizes: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use field::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    type F = BabyBear;

    #[test]
    fn test_product_constraint() {
        let mut r1cs = R1cs::<F>::new();
        r1cs.add_constraint(R1csConstraint::new(
            Variable(0).into(),
            Variable(1).into(),
            Variable(2).into(),
            "mul",
        ));

        r1cs.set_value(Variable(0), F::from_u32(6));
        r1cs.set_value(Variable(1), F::from_u32(7));
        r1cs.set_value(Variable(2), F::from_u32(42));
        assert!(r1cs.is_satisfied());

        r1cs.set_value(Variable(2), F::from_u32(41));
        assert_eq!(r1cs.first_unsatisfied(), Some(0));
    }

    #[test]
    fn test_set_value_grows_assignment() {
        let mut r1cs = R1cs::<F>::new();
        r1cs.set_value(Variable(3), F::ONE);
        assert_eq!(r1cs.num_variables(), 4);
        assert_eq!(r1cs.value(Variable(1)), Some(F::ZERO));
        assert_eq!(r1cs.value(Variable(3)), Some(F::ONE));
        assert_eq!(r1cs.value(Variable(4)), None);
    }
}
