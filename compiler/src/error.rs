//! Error types for circuit reading and compilation.

use std::io;

use field::FieldError;
use thiserror::Error;

use crate::wire::Wire;

/// Everything that can abort a compilation.
///
/// Line numbers are 1-based and refer to the gate-list file unless the variant
/// says otherwise.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A circuit or input file could not be opened or read.
    #[error("failed to read {what}: {source}")]
    Io {
        what: String,
        #[source]
        source: io::Error,
    },

    /// A gate-list line is malformed or contradicts an earlier declaration.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The gate keyword is not one of the supported opcodes.
    #[error("line {line}: unknown opcode `{opcode}`")]
    UnknownOpcode { line: usize, opcode: String },

    /// A gate has the wrong number of inputs or outputs for its opcode.
    #[error("line {line}: `{opcode}` expects {expected}, got {inputs} input(s) and {outputs} output(s)")]
    Arity {
        line: usize,
        opcode: String,
        expected: &'static str,
        inputs: usize,
        outputs: usize,
    },

    /// The hex constant of a `const-mul-*` opcode does not parse.
    #[error("line {line}: constant in `{opcode}`: {source}")]
    Constant {
        line: usize,
        opcode: String,
        #[source]
        source: FieldError,
    },

    /// A wire is referenced before the `total` header fixed the wire count.
    #[error("line {line}: `total <wires>` header must come before any wire is referenced")]
    MissingHeader { line: usize },

    /// A wire id is not below the declared wire count.
    #[error("line {line}: wire {wire} out of range (circuit declares {num_wires} wires)")]
    WireOutOfRange {
        line: usize,
        wire: Wire,
        num_wires: usize,
    },

    /// A gate reads a wire no earlier line has written.
    #[error("line {line}: wire {wire} is read before it is defined")]
    UndefinedWire { line: usize, wire: Wire },

    /// A wire is written by a second directive or gate. Covers the reserved
    /// inverse slot of `zerop`.
    #[error("line {line}: wire {wire} is defined twice (by `{opcode}`)")]
    Redefinition {
        line: usize,
        wire: Wire,
        opcode: &'static str,
    },

    /// `line` is the `input`/`nizkinput` directive naming the wire.
    #[error("line {line}: input wire {wire} has no value in the input file")]
    MissingInputValue { line: usize, wire: Wire },

    /// Malformed line in the input-values file (`line` counts in that file).
    #[error("input file line {line}: {message}")]
    InputFile { line: usize, message: String },

    /// `num_segments` disagrees with the number of `segment_size` lines.
    #[error("line {line}: declared {declared} segments but found {found} segment_size lines")]
    SegmentCount {
        line: usize,
        declared: usize,
        found: usize,
    },

    /// The segments before the last claim more variables than exist outside
    /// the primary input. `line` is the `num_segments` directive.
    #[error("line {line}: segment sizes {declared} exceed the {available} variables outside the primary input")]
    SegmentOverflow {
        line: usize,
        declared: usize,
        available: usize,
    },

    /// A linear gate writes into a wire that already owns a variable.
    #[error("line {line}: output wire {wire} of `{opcode}` already has a variable")]
    OutputAlreadyAllocated {
        line: usize,
        wire: Wire,
        opcode: &'static str,
    },

    /// A consumed wire has neither a cached expression nor a variable.
    #[error("line {line}: wire {wire} read by `{opcode}` has neither an expression nor a variable")]
    UnallocatedWire {
        line: usize,
        wire: Wire,
        opcode: &'static str,
    },

    /// The compiler consumed a wire more often than the evaluator counted.
    #[error("line {line}: wire {wire} consumed by `{opcode}` more often than the evaluation pass counted")]
    UseCountUnderflow {
        line: usize,
        wire: Wire,
        opcode: &'static str,
    },

    /// A wire still has pending consumers once compilation ends. `line` is
    /// where the wire was defined or declared.
    #[error("line {line}: wire {wire} still has {remaining} unconsumed reference(s) after compilation")]
    LeakedReferences {
        line: usize,
        wire: Wire,
        remaining: u32,
    },

    /// The two reads of the gate list yielded different statement counts.
    #[error("circuit source changed between passes: {first} statements, then {second}")]
    SourceChanged { first: usize, second: usize },

    /// A wire owning a variable never received a value. `line` is where the
    /// wire was declared.
    #[error("line {line}: wire {wire} has a variable but no evaluated value")]
    UnassignedWire { line: usize, wire: Wire },

    /// The finished assignment violates constraint `index`.
    #[error("constraint {index} ({annotation}) is not satisfied by the assignment")]
    Unsatisfied {
        index: usize,
        annotation: &'static str,
    },
}

impl CompileError {
    pub(crate) fn io(what: impl Into<String>, source: io::Error) -> Self {
        CompileError::Io {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        CompileError::Parse {
            line,
            message: message.into(),
        }
    }
}
