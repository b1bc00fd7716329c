//! The two-pass pipeline tying evaluation and compilation together.

use std::io::{self, Write};

use p3_field::PrimeField;
use tracing::{info, warn};

use crate::compiler::CircuitCompiler;
use crate::config::{CompilerConfig, UnsatisfiedPolicy};
use crate::error::CompileError;
use crate::evaluator::CircuitEvaluator;
use crate::inputs::InputValues;
use crate::parser::{read_statements, CircuitSource};
use crate::r1cs::{R1cs, WitnessLayout};
use crate::segments::finalize_segments;
use crate::wire::{Wire, WireMap};

/// A compiled circuit: constraints, full assignment and the wire mapping.
#[derive(Debug)]
pub struct CompiledCircuit<F> {
    pub r1cs: R1cs<F>,
    pub layout: WitnessLayout,
    pub wire_map: WireMap,
    pub input_wires: Vec<Wire>,
    pub nizk_wires: Vec<Wire>,
    pub output_wires: Vec<Wire>,
    /// Result of the satisfaction check, `None` if it was skipped.
    pub satisfied: Option<bool>,
}

impl<F: PrimeField> CompiledCircuit<F> {
    pub fn num_constraints(&self) -> usize {
        self.r1cs.num_constraints()
    }

    pub fn num_variables(&self) -> usize {
        self.r1cs.num_variables()
    }

    /// Values of the input and output variables.
    pub fn primary_input(&self) -> &[F] {
        &self.r1cs.assignment()[..self.layout.primary_input_size]
    }

    pub fn auxiliary_input(&self) -> &[F] {
        &self.r1cs.assignment()[self.layout.primary_input_size..]
    }

    /// Write the wire map in `.varmap` text format.
    pub fn write_varmap<W: Write>(&self, out: W) -> io::Result<()> {
        self.wire_map.write_varmap(out)
    }
}

/// Reads a gate list twice (evaluate, then compile) and assembles the result.
#[derive(Clone, Debug, Default)]
pub struct CircuitReader {
    config: CompilerConfig,
}

impl CircuitReader {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `circuit` with values read from the input file at `inputs`.
    pub fn compile_files<F, C, I>(&self, circuit: &C, inputs: &I) -> Result<CompiledCircuit<F>, CompileError>
    where
        F: PrimeField,
        C: CircuitSource + ?Sized,
        I: CircuitSource + ?Sized,
    {
        let inputs = InputValues::read(inputs)?;
        self.compile(circuit, &inputs)
    }

    pub fn compile<F, C>(&self, circuit: &C, inputs: &InputValues<F>) -> Result<CompiledCircuit<F>, CompileError>
    where
        F: PrimeField,
        C: CircuitSource + ?Sized,
    {
        let evaluation = CircuitEvaluator::new(inputs).run(read_statements(circuit)?)?;
        let mut compilation = CircuitCompiler::new(&evaluation).run(read_statements(circuit)?)?;

        compilation.assign_values(&evaluation)?;
        compilation.resolve_zero_checks();

        let segment_sizes = finalize_segments(
            evaluation.segments_line,
            &evaluation.segment_sizes,
            compilation.num_variables,
            compilation.primary_input_size,
        )?;
        let layout = WitnessLayout {
            primary_input_size: compilation.primary_input_size,
            auxiliary_input_size: compilation.num_variables - compilation.primary_input_size,
            segment_sizes,
        };

        let satisfied = if self.config.check_satisfaction {
            Some(self.check(&compilation.r1cs)?)
        } else {
            None
        };

        info!(
            constraints = compilation.r1cs.num_constraints(),
            primary = layout.primary_input_size,
            auxiliary = layout.auxiliary_input_size,
            segments = layout.segment_sizes.len(),
            "circuit ready"
        );
        Ok(CompiledCircuit {
            r1cs: compilation.r1cs,
            layout,
            wire_map: compilation.wire_map,
            input_wires: evaluation.input_wires,
            nizk_wires: evaluation.nizk_wires,
            output_wires: evaluation.output_wires,
            satisfied,
        })
    }

    fn check<F: PrimeField>(&self, r1cs: &R1cs<F>) -> Result<bool, CompileError> {
        let Some(index) = r1cs.first_unsatisfied() else {
            return Ok(true);
        };
        let annotation = r1cs.constraints()[index].annotation;
        match self.config.unsatisfied {
            UnsatisfiedPolicy::Reject => Err(CompileError::Unsatisfied { index, annotation }),
            UnsatisfiedPolicy::Warn => {
                warn!(index, annotation, "constraint system is not satisfied by the assignment");
                Ok(false)
            }
        }
    }
}

/// Compile with the default (strict) configuration.
pub fn compile<F, C>(circuit: &C, inputs: &InputValues<F>) -> Result<CompiledCircuit<F>, CompileError>
where
    F: PrimeField,
    C: CircuitSource + ?Sized,
{
    CircuitReader::default().compile(circuit, inputs)
}
