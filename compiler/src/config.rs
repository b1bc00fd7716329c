//! Compiler configuration.

use serde::{Deserialize, Serialize};

/// What to do when the finished assignment does not satisfy the emitted constraints.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsatisfiedPolicy {
    /// Fail the compilation with [`CompileError::Unsatisfied`](crate::CompileError::Unsatisfied).
    #[default]
    Reject,
    /// Log a warning and hand back the system with `satisfied == false`.
    Warn,
}

/// Options for a single compilation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Evaluate every constraint against the final assignment.
    pub check_satisfaction: bool,
    /// Reaction to an unsatisfied system when `check_satisfaction` is set.
    pub unsatisfied: UnsatisfiedPolicy,
}

impl CompilerConfig {
    /// Check the assignment and fail on the first violated constraint.
    pub fn strict() -> Self {
        Self {
            check_satisfaction: true,
            unsatisfied: UnsatisfiedPolicy::Reject,
        }
    }

    /// Check the assignment but only warn; useful while debugging a partially built circuit.
    pub fn lenient() -> Self {
        Self {
            check_satisfaction: true,
            unsatisfied: UnsatisfiedPolicy::Warn,
        }
    }

    /// Skip the satisfaction check entirely.
    pub fn unchecked() -> Self {
        Self {
            check_satisfaction: false,
            unsatisfied: UnsatisfiedPolicy::Warn,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::strict()
    }
}
