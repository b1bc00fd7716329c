//! Compiler from wire-level arithmetic circuits to rank-1 constraint systems.
//!
//! A circuit is a gate list over a prime field: a `total <wires>` header,
//! `input`/`nizkinput`/`output` declarations and gate records such as
//! `mul in 2 <0 1> out 1 <2>`. Compilation reads the list twice:
//!
//! 1. **Evaluation** computes a value for every wire from the supplied input
//!    values and counts how often each wire is consumed.
//! 2. **Compilation** allocates a variable for every wire that needs one and
//!    emits constraints `⟨a,x⟩·⟨b,x⟩ = ⟨c,x⟩`. Linear gates (`add`,
//!    `const-mul`, `pack`) emit nothing; their outputs live on as cached linear
//!    combinations that are released as soon as their last consumer has read
//!    them.
//!
//! The result carries the constraints, a full satisfying assignment, the
//! primary/auxiliary split and the wire → variable map.
//!
//! # Example
//!
//! ```
//! use field::BabyBear;
//! use p3_field::PrimeCharacteristicRing;
//! use r1cs_compiler::{compile, InputValues};
//!
//! let circuit = "total 4\ninput 0\ninput 1\nmul in 2 <0 1> out 1 <2>\noutput 2\n";
//! let inputs: InputValues<BabyBear> =
//!     [(0, BabyBear::ONE), (1, BabyBear::from_u32(7))].into_iter().collect();
//!
//! let compiled = compile(circuit, &inputs).expect("compile");
//! assert_eq!(compiled.num_constraints(), 1);
//! assert_eq!(compiled.layout.primary_input_size, 3);
//! assert_eq!(compiled.primary_input()[2], BabyBear::from_u32(7));
//! assert_eq!(compiled.satisfied, Some(true));
//! ```
//!
//! # Gates
//!
//! | opcode | in | out | constraints |
//! |---|---|---|---|
//! | `add` | n | 1 | none |
//! | `const-mul-<hex>`, `const-mul-neg-<hex>` | 1 | 1 | none |
//! | `pack` | n | 1 | none |
//! | `mul` | 2 | 1 | `a·b = out` |
//! | `xor` | 2 | 1 | `2a·b = a + b - out` |
//! | `or` | 2 | 1 | `a·b = a + b - out` |
//! | `assert` | 2 | 1 | `a·b = c` |
//! | `split` | 1 | k | `bᵢ·(bᵢ-1) = 0`, `a·1 = Σ 2ⁱbᵢ` |
//! | `zerop` | 1 | 2 | `a·(1-f) = 0`, `a·inv = f` |

mod compiler;
mod config;
mod error;
mod evaluator;
mod inputs;
mod linear_combination;
mod parser;
mod r1cs;
mod reader;
mod segments;
mod wire;
mod wire_cache;


pub use compiler::{CircuitCompiler, Compilation, ZeroCheck};
pub use config::{CompilerConfig, UnsatisfiedPolicy};
pub use error::CompileError;
pub use evaluator::{CircuitEvaluator, Evaluation};
pub use inputs::InputValues;
pub use linear_combination::LinearCombination;
pub use parser::{read_statements, CircuitSource, Gate, Opcode, Statement, Statements};
pub use r1cs::{R1cs, R1csConstraint, WitnessLayout};
pub use reader::{compile, CircuitReader, CompiledCircuit};
pub use segments::finalize_segments;
pub use wire::{Variable, VariableAllocator, Wire, WireMap};
pub use wire_cache::WireCache;
