//! First pass: compute a value for every wire and count how often each wire
//! is consumed.

use field::bits_le;
use p3_field::PrimeField;
use tracing::{info, warn};

use crate::error::CompileError;
use crate::inputs::InputValues;
use crate::parser::{Gate, Opcode, Statement};
use crate::wire::Wire;

/// Everything the compilation pass needs from evaluation.
#[derive(Clone, Debug, Default)]
pub struct Evaluation<F> {
    pub num_wires: usize,
    /// `None` for wires no line ever defined.
    pub values: Vec<Option<F>>,
    /// Consumptions the compiler will perform per wire.
    pub use_counters: Vec<u32>,
    /// Line that defined or declared each wire, 0 if none did.
    pub lines: Vec<usize>,
    pub input_wires: Vec<Wire>,
    pub nizk_wires: Vec<Wire>,
    pub output_wires: Vec<Wire>,
    pub segment_sizes: Vec<usize>,
    /// Line of the `num_segments` directive, 0 without one.
    pub segments_line: usize,
    pub num_statements: usize,
}

impl<F: Copy> Evaluation<F> {
    pub fn value(&self, wire: Wire) -> Option<F> {
        self.values.get(wire).copied().flatten()
    }

    pub fn line_of(&self, wire: Wire) -> usize {
        self.lines.get(wire).copied().unwrap_or(0)
    }
}

/// Interprets gate records against concrete input values.
pub struct CircuitEvaluator<'a, F> {
    inputs: &'a InputValues<F>,
    state: Evaluation<F>,
    /// `zerop` inverse slots: written by no one, assignable by no one else.
    reserved: Vec<bool>,
    /// Wires named by an `input`, `nizkinput` or `output` directive.
    io_declared: Vec<bool>,
}

impl<'a, F: PrimeField> CircuitEvaluator<'a, F> {
    pub fn new(inputs: &'a InputValues<F>) -> Self {
        Self {
            inputs,
            state: Evaluation::default(),
            reserved: Vec::new(),
            io_declared: Vec::new(),
        }
    }

    /// Consume the whole statement stream.
    pub fn run<I>(mut self, statements: I) -> Result<Evaluation<F>, CompileError>
    where
        I: IntoIterator<Item = Result<(usize, Statement<F>), CompileError>>,
    {
        for item in statements {
            let (line, statement) = item?;
            self.state.num_statements += 1;
            self.apply(line, statement)?;
        }

        let mut declared = self.state.input_wires.clone();
        declared.extend_from_slice(&self.state.nizk_wires);
        self.inputs.warn_unused(&declared);

        info!(
            wires = self.state.num_wires,
            inputs = self.state.input_wires.len(),
            nizk_inputs = self.state.nizk_wires.len(),
            outputs = self.state.output_wires.len(),
            statements = self.state.num_statements,
            "evaluated circuit"
        );
        Ok(self.state)
    }

    fn apply(&mut self, line: usize, statement: Statement<F>) -> Result<(), CompileError> {
        match statement {
            Statement::Total(n) => {
                self.state.num_wires = n;
                self.state.values = vec![None; n];
                self.state.use_counters = vec![0; n];
                self.state.lines = vec![0; n];
                self.reserved = vec![false; n];
                self.io_declared = vec![false; n];
            }
            Statement::NumSegments(_) => self.state.segments_line = line,
            Statement::SegmentSize(size) => self.state.segment_sizes.push(size),
            Statement::Input(wire) => {
                self.declare_io(line, wire)?;
                let value = self.input_value(line, wire)?;
                if wire == 0 && value != F::ONE {
                    warn!(%value, "wire 0 is expected to carry the constant one");
                }
                self.define(line, wire, value, "input")?;
                self.state.input_wires.push(wire);
            }
            Statement::NizkInput(wire) => {
                self.declare_io(line, wire)?;
                let value = self.input_value(line, wire)?;
                self.define(line, wire, value, "nizkinput")?;
                self.state.nizk_wires.push(wire);
            }
            Statement::Output(wire) => {
                self.declare_io(line, wire)?;
                self.state.use_counters[wire] += 1;
                if self.state.lines[wire] == 0 {
                    self.state.lines[wire] = line;
                }
                self.state.output_wires.push(wire);
            }
            Statement::Gate(gate) => self.eval_gate(line, &gate)?,
        }
        Ok(())
    }

    /// Each wire takes at most one I/O role, so the primary input holds
    /// exactly one variable per `input` and `output` line.
    fn declare_io(&mut self, line: usize, wire: Wire) -> Result<(), CompileError> {
        if std::mem::replace(&mut self.io_declared[wire], true) {
            return Err(CompileError::parse(
                line,
                format!("wire {wire} is already declared as an input or output"),
            ));
        }
        Ok(())
    }

    fn input_value(&self, line: usize, wire: Wire) -> Result<F, CompileError> {
        self.inputs
            .get(wire)
            .ok_or(CompileError::MissingInputValue { line, wire })
    }

    fn define(&mut self, line: usize, wire: Wire, value: F, opcode: &'static str) -> Result<(), CompileError> {
        let slot = &mut self.state.values[wire];
        if slot.is_some() || self.reserved[wire] {
            return Err(CompileError::Redefinition { line, wire, opcode });
        }
        *slot = Some(value);
        self.state.lines[wire] = line;
        Ok(())
    }

    fn reserve(&mut self, line: usize, wire: Wire, opcode: &'static str) -> Result<(), CompileError> {
        if self.state.values[wire].is_some() || self.reserved[wire] {
            return Err(CompileError::Redefinition { line, wire, opcode });
        }
        self.reserved[wire] = true;
        self.state.lines[wire] = line;
        Ok(())
    }

    fn consume(&mut self, line: usize, wire: Wire) -> Result<F, CompileError> {
        let value = self.state.values[wire].ok_or(CompileError::UndefinedWire { line, wire })?;
        self.state.use_counters[wire] += 1;
        Ok(value)
    }

    fn eval_gate(&mut self, line: usize, gate: &Gate<F>) -> Result<(), CompileError> {
        let inputs = gate
            .inputs
            .iter()
            .map(|&w| self.consume(line, w))
            .collect::<Result<Vec<F>, _>>()?;
        let name = gate.op.name();

        match &gate.op {
            Opcode::Add => self.define(line, gate.outputs[0], inputs.iter().copied().sum(), name)?,
            Opcode::Mul => self.define(line, gate.outputs[0], inputs[0] * inputs[1], name)?,
            Opcode::Xor => {
                let out = if inputs[0] == inputs[1] { F::ZERO } else { F::ONE };
                self.define(line, gate.outputs[0], out, name)?;
            }
            Opcode::Or => {
                let out = if inputs[0].is_zero() && inputs[1].is_zero() {
                    F::ZERO
                } else {
                    F::ONE
                };
                self.define(line, gate.outputs[0], out, name)?;
            }
            Opcode::ZeroCheck => {
                // outputs[0] stands for the inverse, which gets a fresh variable at compile time.
                self.reserve(line, gate.outputs[0], name)?;
                let flag = if inputs[0].is_zero() { F::ZERO } else { F::ONE };
                self.define(line, gate.outputs[1], flag, name)?;
            }
            Opcode::Pack => {
                let (sum, _) = inputs
                    .iter()
                    .fold((F::ZERO, F::ONE), |(sum, weight), &bit| {
                        (sum + bit * weight, weight.double())
                    });
                self.define(line, gate.outputs[0], sum, name)?;
            }
            Opcode::Split => {
                let bits = bits_le(&inputs[0], gate.outputs.len());
                for (&wire, bit) in gate.outputs.iter().zip(bits) {
                    self.define(line, wire, F::from_bool(bit), name)?;
                }
            }
            Opcode::ConstMul(c) => self.define(line, gate.outputs[0], inputs[0] * *c, name)?,
            // Asserted against, never written.
            Opcode::Assert => self.state.use_counters[gate.outputs[0]] += 1,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_statements;
    use field::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    type F = BabyBear;

    fn evaluate(text: &str, inputs: &[(Wire, u32)]) -> Result<Evaluation<F>, CompileError> {
        let inputs: InputValues<F> = inputs.iter().map(|&(w, v)| (w, F::from_u32(v))).collect();
        CircuitEvaluator::new(&inputs).run(read_statements::<F, _>(text)?)
    }

    #[test]
    fn test_gate_values() {
        let text = "total 14\n\
                    input 0\ninput 1\ninput 2\n\
                    add in 3 <0 1 2> out 1 <3>\n\
                    mul in 2 <1 2> out 1 <4>\n\
                    xor in 2 <0 0> out 1 <5>\n\
                    or in 2 <5 0> out 1 <6>\n\
                    zerop in 1 <5> out 2 <7 8>\n\
                    split in 1 <4> out 3 <9 10 11>\n\
                    pack in 3 <9 10 11> out 1 <12>\n\
                    const-mul-neg-2 in 1 <12> out 1 <13>\n";
        let eval = evaluate(text, &[(0, 1), (1, 2), (2, 3)]).unwrap();

        assert_eq!(eval.value(3), Some(F::from_u32(6)));
        assert_eq!(eval.value(4), Some(F::from_u32(6)));
        assert_eq!(eval.value(5), Some(F::ZERO));
        assert_eq!(eval.value(6), Some(F::ONE));
        assert_eq!(eval.value(7), None);
        assert_eq!(eval.value(8), Some(F::ZERO));
        assert_eq!(eval.value(9), Some(F::ZERO));
        assert_eq!(eval.value(10), Some(F::ONE));
        assert_eq!(eval.value(11), Some(F::ONE));
        assert_eq!(eval.value(12), Some(F::from_u32(6)));
        assert_eq!(eval.value(13), Some(-F::from_u32(12)));
        assert_eq!(eval.num_statements, 11);
    }

    #[test]
    fn test_use_counters() {
        let text = "total 5\n\
                    input 0\ninput 1\n\
                    mul in 2 <1 1> out 1 <2>\n\
                    add in 2 <2 0> out 1 <3>\n\
                    assert in 2 <1 1> out 1 <2>\n\
                    output 3\n";
        let eval = evaluate(text, &[(0, 1), (1, 4)]).unwrap();
        assert_eq!(eval.use_counters, vec![1, 4, 2, 1, 0]);
        assert_eq!(eval.output_wires, vec![3]);
    }

    #[test]
    fn test_undefined_and_redefined_wires() {
        let err = evaluate("total 3\ninput 0\nmul in 2 <0 1> out 1 <2>\n", &[(0, 1)]).unwrap_err();
        assert!(matches!(err, CompileError::UndefinedWire { line: 3, wire: 1 }));

        let err = evaluate(
            "total 3\ninput 0\ninput 1\nadd in 1 <0> out 1 <1>\n",
            &[(0, 1), (1, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::Redefinition { line: 4, wire: 1, opcode: "add" }));
    }

    #[test]
    fn test_missing_input_value() {
        let err = evaluate("total 2\ninput 0\nnizkinput 1\n", &[(0, 1)]).unwrap_err();
        assert!(matches!(err, CompileError::MissingInputValue { line: 3, wire: 1 }));
    }

    #[test]
    fn test_zerop_inverse_slot_is_write_once() {
        let later_write = "total 5\ninput 0\ninput 1\n\
                           zerop in 1 <1> out 2 <2 3>\n\
                           add in 1 <0> out 1 <2>\n";
        let err = evaluate(later_write, &[(0, 1), (1, 4)]).unwrap_err();
        assert!(matches!(err, CompileError::Redefinition { line: 5, wire: 2, opcode: "add" }));

        let onto_defined = "total 4\ninput 0\ninput 1\nzerop in 1 <1> out 2 <0 2>\n";
        let err = evaluate(onto_defined, &[(0, 1), (1, 4)]).unwrap_err();
        assert!(matches!(err, CompileError::Redefinition { line: 4, wire: 0, opcode: "zerop" }));

        let eval = evaluate("total 4\ninput 0\ninput 1\nzerop in 1 <1> out 2 <2 3>\n", &[(0, 1), (1, 4)]).unwrap();
        assert_eq!(eval.value(2), None);
        assert_eq!(eval.line_of(2), 4);
    }

    #[test]
    fn test_overlapping_io_declarations() {
        let twice = "total 3\ninput 0\ninput 1\nmul in 2 <1 1> out 1 <2>\noutput 2\noutput 2\n";
        let err = evaluate(twice, &[(0, 1), (1, 3)]).unwrap_err();
        assert!(matches!(err, CompileError::Parse { line: 6, .. }));

        let input_as_output = "total 2\ninput 0\ninput 1\noutput 1\n";
        let err = evaluate(input_as_output, &[(0, 1), (1, 3)]).unwrap_err();
        assert!(matches!(err, CompileError::Parse { line: 4, .. }));

        let output_then_nizk = "total 2\ninput 0\noutput 1\nnizkinput 1\n";
        let err = evaluate(output_then_nizk, &[(0, 1), (1, 3)]).unwrap_err();
        assert!(matches!(err, CompileError::Parse { line: 4, .. }));
    }

    #[test]
    fn test_definition_lines() {
        let text = "total 4\nnum_segments 0\ninput 0\noutput 3\nnizkinput 1\nmul in 2 <0 1> out 1 <3>\n";
        let eval = evaluate(text, &[(0, 1), (1, 2)]).unwrap();
        assert_eq!(eval.lines, vec![3, 5, 0, 6]);
        assert_eq!(eval.segments_line, 2);
    }

    #[test]
    fn test_wire_zero_not_one_is_accepted() {
        let eval = evaluate("total 1\ninput 0\n", &[(0, 5)]).unwrap();
        assert_eq!(eval.value(0), Some(F::from_u32(5)));
    }
}
