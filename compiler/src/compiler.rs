//! Second pass: turn gate records into rank-1 constraints.

use std::rc::Rc;

use p3_field::Field;
use tracing::{debug, info, warn};

use crate::error::CompileError;
use crate::evaluator::Evaluation;
use crate::linear_combination::LinearCombination;
use crate::parser::{Gate, Opcode, Statement};
use crate::r1cs::{R1cs, R1csConstraint};
use crate::wire::{Variable, VariableAllocator, Wire, WireMap};
use crate::wire_cache::WireCache;

/// A `zerop` gate whose inverse witness is filled in once the assignment is complete.
#[derive(Clone, Debug)]
pub struct ZeroCheck<F> {
    pub aux: Variable,
    pub condition: LinearCombination<F>,
    /// Wire standing for the inverse in the gate list; it never gets a variable.
    pub wire: Wire,
}

/// Output of the compilation pass.
#[derive(Debug)]
pub struct Compilation<F> {
    pub r1cs: R1cs<F>,
    pub wire_map: WireMap,
    pub num_variables: usize,
    /// Variables allocated for circuit inputs and outputs.
    pub primary_input_size: usize,
    pub zero_checks: Vec<ZeroCheck<F>>,
}

impl<F: Field> Compilation<F> {
    /// Copy the evaluated wire values into the assignment.
    pub fn assign_values(&mut self, evaluation: &Evaluation<F>) -> Result<(), CompileError> {
        self.r1cs.resize_assignment(self.num_variables);
        for (wire, var) in self.wire_map.iter() {
            let value = evaluation
                .value(wire)
                .ok_or(CompileError::UnassignedWire {
                    line: evaluation.line_of(wire),
                    wire,
                })?;
            self.r1cs.set_value(var, value);
        }
        Ok(())
    }

    /// Set every `zerop` auxiliary to the inverse of its condition, or zero.
    ///
    /// Must run after [`assign_values`](Self::assign_values).
    pub fn resolve_zero_checks(&mut self) {
        for check in &self.zero_checks {
            let value = self.r1cs.evaluate(&check.condition);
            let aux = value.try_inverse().unwrap_or(F::ZERO);
            self.r1cs.set_value(check.aux, aux);
        }
    }
}

pub struct CircuitCompiler<'a, F> {
    evaluation: &'a Evaluation<F>,
    cache: WireCache<F>,
    wire_map: WireMap,
    allocator: VariableAllocator,
    r1cs: R1cs<F>,
    zero_checks: Vec<ZeroCheck<F>>,
    primary_input_size: usize,
}

impl<'a, F: Field> CircuitCompiler<'a, F> {
    /// Allocate variables for inputs, then outputs, then nizk inputs.
    ///
    /// The first `inputs + outputs` variables form the primary input.
    pub fn new(evaluation: &'a Evaluation<F>) -> Self {
        let mut allocator = VariableAllocator::new();
        let mut wire_map = WireMap::new();
        for &wire in evaluation
            .input_wires
            .iter()
            .chain(&evaluation.output_wires)
        {
            wire_map.get_or_alloc(wire, &mut allocator);
        }
        let primary_input_size = allocator.count();
        let declared = evaluation.input_wires.len() + evaluation.output_wires.len();
        if primary_input_size != declared {
            warn!(
                primary = primary_input_size,
                declared, "input and output declarations share wires"
            );
        }
        for &wire in &evaluation.nizk_wires {
            wire_map.get_or_alloc(wire, &mut allocator);
        }
        debug!(
            primary = primary_input_size,
            nizk = allocator.count() - primary_input_size,
            "pre-allocated variables"
        );

        Self {
            evaluation,
            cache: WireCache::new(evaluation.use_counters.clone()),
            wire_map,
            allocator,
            r1cs: R1cs::new(),
            zero_checks: Vec::new(),
            primary_input_size,
        }
    }

    pub fn run<I>(mut self, statements: I) -> Result<Compilation<F>, CompileError>
    where
        I: IntoIterator<Item = Result<(usize, Statement<F>), CompileError>>,
    {
        let mut num_statements = 0;
        for item in statements {
            let (line, statement) = item?;
            num_statements += 1;
            self.compile_statement(line, statement)?;
            self.cache.release_pending();
        }

        if num_statements != self.evaluation.num_statements {
            return Err(CompileError::SourceChanged {
                first: self.evaluation.num_statements,
                second: num_statements,
            });
        }
        if let Some((wire, remaining)) = self.cache.outstanding().next() {
            return Err(CompileError::LeakedReferences {
                line: self.evaluation.line_of(wire),
                wire,
                remaining,
            });
        }

        info!(
            constraints = self.r1cs.num_constraints(),
            variables = self.allocator.count(),
            zero_checks = self.zero_checks.len(),
            "compiled circuit"
        );
        Ok(Compilation {
            r1cs: self.r1cs,
            wire_map: self.wire_map,
            num_variables: self.allocator.count(),
            primary_input_size: self.primary_input_size,
            zero_checks: self.zero_checks,
        })
    }

    fn compile_statement(&mut self, line: usize, statement: Statement<F>) -> Result<(), CompileError> {
        match statement {
            Statement::Output(wire) => {
                self.fetch(wire, line, "output")?;
            }
            Statement::Gate(gate) => self.compile_gate(line, gate)?,
            Statement::Total(_)
            | Statement::NumSegments(_)
            | Statement::SegmentSize(_)
            | Statement::Input(_)
            | Statement::NizkInput(_) => {}
        }
        Ok(())
    }

    fn compile_gate(&mut self, line: usize, gate: Gate<F>) -> Result<(), CompileError> {
        let Gate {
            op,
            inputs,
            outputs,
        } = gate;
        let opcode = op.name();
        match op {
            Opcode::Add => {
                let mut sum = self.fetch_for_edit(inputs[0], line, opcode)?;
                for &wire in &inputs[1..] {
                    sum += &*self.fetch(wire, line, opcode)?;
                }
                self.store_linear(line, outputs[0], sum, opcode)?;
            }
            Opcode::ConstMul(constant) => {
                let mut lc = self.fetch_for_edit(inputs[0], line, opcode)?;
                lc.scale(constant);
                self.store_linear(line, outputs[0], lc, opcode)?;
            }
            Opcode::Pack => {
                let mut sum = LinearCombination::zero();
                let mut weight = F::ONE;
                for &wire in &inputs {
                    sum.add_scaled(&self.fetch(wire, line, opcode)?, weight);
                    weight = weight.double();
                }
                self.store_linear(line, outputs[0], sum, opcode)?;
            }
            Opcode::Mul => {
                let a = self.fetch(inputs[0], line, opcode)?;
                let b = self.fetch(inputs[1], line, opcode)?;
                let out = self.alloc_output(outputs[0]);
                self.constrain(owned(a), owned(b), out.into(), "mul");
            }
            Opcode::Xor => {
                // 2·l1 · l2 = l1 + l2 - out
                let l1 = self.fetch(inputs[0], line, opcode)?;
                let l2 = self.fetch(inputs[1], line, opcode)?;
                let out = self.alloc_output(outputs[0]);
                let c = sum_minus(&l1, &l2, out);
                self.constrain(&*l1 * F::TWO, owned(l2), c, "xor");
            }
            Opcode::Or => {
                // l1 · l2 = l1 + l2 - out
                let l1 = self.fetch(inputs[0], line, opcode)?;
                let l2 = self.fetch(inputs[1], line, opcode)?;
                let out = self.alloc_output(outputs[0]);
                let c = sum_minus(&l1, &l2, out);
                self.constrain(owned(l1), owned(l2), c, "or");
            }
            Opcode::Assert => {
                let l1 = self.fetch(inputs[0], line, opcode)?;
                let l2 = self.fetch(inputs[1], line, opcode)?;
                let l3 = self.fetch(outputs[0], line, opcode)?;
                self.constrain(owned(l1), owned(l2), owned(l3), "assert");
            }
            Opcode::Split => {
                let input = self.fetch(inputs[0], line, opcode)?;
                let mut sum = LinearCombination::zero();
                let mut weight = F::ONE;
                for &wire in &outputs {
                    let bit = self.alloc_output(wire);
                    let mut bit_minus_one = LinearCombination::from_variable(bit);
                    bit_minus_one += F::NEG_ONE;
                    self.constrain(
                        bit.into(),
                        bit_minus_one,
                        LinearCombination::zero(),
                        "split-bit",
                    );
                    sum.add_term(bit, weight);
                    weight = weight.double();
                }
                self.constrain(owned(input), LinearCombination::one(), sum, "split");
            }
            Opcode::ZeroCheck => {
                let condition = self.fetch(inputs[0], line, opcode)?;
                let flag = self.alloc_output(outputs[1]);
                let aux = self.allocator.alloc();

                // l · (1 - flag) = 0
                let mut one_minus_flag = LinearCombination::one();
                one_minus_flag.add_term(flag, F::NEG_ONE);
                self.constrain(
                    LinearCombination::clone(&condition),
                    one_minus_flag,
                    LinearCombination::zero(),
                    "zerop",
                );
                // l · aux = flag
                let condition = owned(condition);
                self.constrain(condition.clone(), aux.into(), flag.into(), "zerop-inverse");
                self.zero_checks.push(ZeroCheck {
                    aux,
                    condition,
                    wire: outputs[0],
                });
            }
        }
        Ok(())
    }

    fn fetch(
        &mut self,
        wire: Wire,
        line: usize,
        opcode: &'static str,
    ) -> Result<Rc<LinearCombination<F>>, CompileError> {
        self.cache.fetch(wire, &self.wire_map, line, opcode)
    }

    fn fetch_for_edit(
        &mut self,
        wire: Wire,
        line: usize,
        opcode: &'static str,
    ) -> Result<LinearCombination<F>, CompileError> {
        self.cache.fetch_for_edit(wire, &self.wire_map, line, opcode)
    }

    fn alloc_output(&mut self, wire: Wire) -> Variable {
        self.wire_map.get_or_alloc(wire, &mut self.allocator)
    }

    /// Record the expression of a linear gate's output without a constraint.
    fn store_linear(
        &mut self,
        line: usize,
        wire: Wire,
        lc: LinearCombination<F>,
        opcode: &'static str,
    ) -> Result<(), CompileError> {
        if self.wire_map.contains(wire) {
            return Err(CompileError::OutputAlreadyAllocated { line, wire, opcode });
        }
        self.cache.store(wire, lc);
        Ok(())
    }

    fn constrain(
        &mut self,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
        annotation: &'static str,
    ) {
        self.r1cs
            .add_constraint(R1csConstraint::new(a, b, c, annotation));
    }
}

fn owned<F: Field>(lc: Rc<LinearCombination<F>>) -> LinearCombination<F> {
    Rc::unwrap_or_clone(lc)
}

/// `l1 + l2 - out`
fn sum_minus<F: Field>(
    l1: &LinearCombination<F>,
    l2: &LinearCombination<F>,
    out: Variable,
) -> LinearCombination<F> {
    let mut c = l1.clone();
    c += l2;
    c.add_term(out, F::NEG_ONE);
    c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::CircuitEvaluator;
    use crate::inputs::InputValues;
    use crate::parser::read_statements;
    use field::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    type F = BabyBear;

    fn compile(text: &str, inputs: &[(Wire, u32)]) -> Result<Compilation<F>, CompileError> {
        let inputs: InputValues<F> = inputs.iter().map(|&(w, v)| (w, F::from_u32(v))).collect();
        let evaluation = CircuitEvaluator::new(&inputs).run(read_statements::<F, _>(text)?)?;
        let mut compilation = CircuitCompiler::new(&evaluation).run(read_statements::<F, _>(text)?)?;
        compilation.assign_values(&evaluation)?;
        compilation.resolve_zero_checks();
        Ok(compilation)
    }

    #[test]
    fn test_preallocation_order() {
        let text = "total 6\nnizkinput 3\ninput 0\noutput 5\ninput 1\n\
                    mul in 2 <0 1> out 1 <4>\nmul in 2 <4 3> out 1 <5>\n";
        let c = compile(text, &[(0, 1), (1, 2), (3, 4)]).unwrap();
        let vars: Vec<_> = [0, 1, 5, 3, 4]
            .iter()
            .map(|&w| c.wire_map.get(w).unwrap())
            .collect();
        assert_eq!(vars, (0..5).map(Variable).collect::<Vec<_>>());
        assert_eq!(c.primary_input_size, 3);
        assert!(c.r1cs.is_satisfied());
    }

    #[test]
    fn test_linear_gates_emit_no_constraints() {
        let text = "total 7\ninput 0\ninput 1\ninput 2\n\
                    add in 2 <1 2> out 1 <3>\n\
                    const-mul-3 in 1 <3> out 1 <4>\n\
                    pack in 2 <4 1> out 1 <5>\n\
                    mul in 2 <5 0> out 1 <6>\n\
                    output 6\n";
        let c = compile(text, &[(0, 1), (1, 2), (2, 5)]).unwrap();
        // only the final mul
        assert_eq!(c.r1cs.num_constraints(), 1);
        let out = c.wire_map.get(6).unwrap();
        assert_eq!(c.r1cs.value(out), Some(F::from_u32(21 + 2 * 2)));
        assert!(c.r1cs.is_satisfied());
        assert!(!c.wire_map.contains(3));
    }

    #[test]
    fn test_linear_gate_into_allocated_output() {
        let text = "total 3\ninput 0\ninput 1\noutput 2\nadd in 2 <0 1> out 1 <2>\n";
        let err = compile(text, &[(0, 1), (1, 1)]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::OutputAlreadyAllocated { line: 5, wire: 2, opcode: "add" }
        ));
    }

    #[test]
    fn test_scaled_and_packed_into_allocated_output() {
        let scaled = "total 3\ninput 0\ninput 1\noutput 2\nconst-mul-2 in 1 <1> out 1 <2>\n";
        let err = compile(scaled, &[(0, 1), (1, 1)]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::OutputAlreadyAllocated { line: 5, wire: 2, opcode: "const-mul" }
        ));

        let packed = "total 4\ninput 0\ninput 1\ninput 2\noutput 3\npack in 2 <1 2> out 1 <3>\n";
        let err = compile(packed, &[(0, 1), (1, 1), (2, 0)]).unwrap_err();
        assert!(matches!(
            err,
            CompileError::OutputAlreadyAllocated { line: 6, wire: 3, opcode: "pack" }
        ));
    }

    #[test]
    fn test_primary_input_counts_declarations() {
        let text = "total 5\ninput 0\ninput 1\nnizkinput 2\n\
                    mul in 2 <1 2> out 1 <3>\nmul in 2 <3 3> out 1 <4>\n\
                    output 3\noutput 4\n";
        let c = compile(text, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        assert_eq!(c.primary_input_size, 4);
        assert_eq!(c.num_variables, 5);
    }

    #[test]
    fn test_unassigned_output_variable() {
        // A zerop inverse has no value; declaring it as an output leaves its variable empty.
        let text = "total 4\ninput 0\ninput 1\noutput 2\nzerop in 1 <1> out 2 <2 3>\n";
        let err = compile(text, &[(0, 1), (1, 5)]);
        assert!(matches!(err, Err(CompileError::UnassignedWire { wire: 2, .. })));
    }

    #[test]
    fn test_zero_check_resolution() {
        let text = "total 7\ninput 0\ninput 1\n\
                    zerop in 1 <1> out 2 <2 3>\n\
                    const-mul-0 in 1 <1> out 1 <4>\n\
                    zerop in 1 <4> out 2 <5 6>\n";
        let c = compile(text, &[(0, 1), (1, 9)]).unwrap();
        assert_eq!(c.zero_checks.len(), 2);
        assert_eq!(c.r1cs.num_constraints(), 4);

        let nonzero = &c.zero_checks[0];
        assert_eq!(c.r1cs.value(nonzero.aux), Some(F::from_u32(9).inverse()));
        assert_eq!(c.r1cs.value(c.wire_map.get(3).unwrap()), Some(F::ONE));

        let zero = &c.zero_checks[1];
        assert_eq!(c.r1cs.value(zero.aux), Some(F::ZERO));
        assert_eq!(c.r1cs.value(c.wire_map.get(6).unwrap()), Some(F::ZERO));
        assert!(!c.wire_map.contains(2));
        assert!(c.r1cs.is_satisfied());
    }

    #[test]
    fn test_unconsumed_reference_is_reported() {
        // Counters from a circuit with one more consumer than the one compiled.
        let inputs: InputValues<F> = [(0, F::ONE)].into_iter().collect();
        let evaluation = CircuitEvaluator::new(&inputs)
            .run(read_statements::<F, _>("total 2\ninput 0\nadd in 2 <0 0> out 1 <1>\n").unwrap())
            .unwrap();
        let err = CircuitCompiler::new(&evaluation)
            .run(read_statements::<F, _>("total 2\ninput 0\nadd in 1 <0> out 1 <1>\n").unwrap())
            .unwrap_err();
        assert!(matches!(err, CompileError::LeakedReferences { line: 2, wire: 0, remaining: 1 }));
    }

    #[test]
    fn test_source_changed_between_passes() {
        let inputs: InputValues<F> = [(0, F::ONE)].into_iter().collect();
        let evaluation = CircuitEvaluator::new(&inputs)
            .run(read_statements::<F, _>("total 1\ninput 0\n").unwrap())
            .unwrap();
        let err = CircuitCompiler::new(&evaluation)
            .run(read_statements::<F, _>("total 1\ninput 0\ninput 0\n").unwrap())
            .unwrap_err();
        assert!(matches!(err, CompileError::SourceChanged { first: 2, second: 3 }));
    }
}
