//! Per-wire linear-combination cache with use-count driven release.
//!
//! Every wire starts with the number of consumptions the evaluation pass
//! counted. Each fetch consumes one; the fetch that brings the count to zero
//! marks the entry for release at the end of the current line. Shared fetches
//! hand out an [`Rc`] to the cached expression, edit fetches hand out an owned
//! copy (or the cached value itself on its final use).

use std::rc::Rc;

use p3_field::Field;
use tracing::trace;

use crate::error::CompileError;
use crate::linear_combination::LinearCombination;
use crate::wire::{Wire, WireMap};

pub struct WireCache<F> {
    entries: Vec<Option<Rc<LinearCombination<F>>>>,
    use_counters: Vec<u32>,
    pending: Vec<Wire>,
}

impl<F: Field> WireCache<F> {
    /// Start from the evaluation pass's use counts.
    pub fn new(use_counters: Vec<u32>) -> Self {
        Self {
            entries: vec![None; use_counters.len()],
            use_counters,
            pending: Vec::new(),
        }
    }

    /// Remaining consumptions of `wire`.
    pub fn remaining_uses(&self, wire: Wire) -> u32 {
        self.use_counters[wire]
    }

    pub fn is_cached(&self, wire: Wire) -> bool {
        self.entries[wire].is_some()
    }

    /// Consume one use of `wire` and return its expression for reading.
    ///
    /// `line` and `opcode` name the reading statement in errors.
    pub fn fetch(
        &mut self,
        wire: Wire,
        wire_map: &WireMap,
        line: usize,
        opcode: &'static str,
    ) -> Result<Rc<LinearCombination<F>>, CompileError> {
        let lc = match &self.entries[wire] {
            Some(lc) => Rc::clone(lc),
            None => Rc::new(Self::synthesize(wire, wire_map, line, opcode)?),
        };
        self.consume(wire, line, opcode)?;
        Ok(lc)
    }

    /// Consume one use of `wire` and return an expression the caller may mutate.
    pub fn fetch_for_edit(
        &mut self,
        wire: Wire,
        wire_map: &WireMap,
        line: usize,
        opcode: &'static str,
    ) -> Result<LinearCombination<F>, CompileError> {
        if self.entries[wire].is_none() {
            let lc = Self::synthesize(wire, wire_map, line, opcode)?;
            self.consume(wire, line, opcode)?;
            return Ok(lc);
        }
        if self.consume(wire, line, opcode)? {
            if let Some(lc) = self.entries[wire].take() {
                return Ok(Rc::unwrap_or_clone(lc));
            }
        }
        match &self.entries[wire] {
            Some(lc) => Ok(LinearCombination::clone(lc)),
            None => Self::synthesize(wire, wire_map, line, opcode),
        }
    }

    /// Cache `lc` as the expression of `wire`. Returns `false` if nothing will
    /// ever read it, in which case it is dropped.
    pub fn store(&mut self, wire: Wire, lc: LinearCombination<F>) -> bool {
        if self.use_counters[wire] == 0 {
            trace!(wire, "expression has no consumers");
            return false;
        }
        self.entries[wire] = Some(Rc::new(lc));
        true
    }

    /// Drop every entry whose last use happened since the previous call.
    pub fn release_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        trace!(released = self.pending.len(), "releasing expressions");
        for wire in self.pending.drain(..) {
            self.entries[wire] = None;
        }
    }

    /// Wires that still have unconsumed uses.
    pub fn outstanding(&self) -> impl Iterator<Item = (Wire, u32)> + '_ {
        self.use_counters
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(wire, &count)| (wire, count))
    }

    pub fn num_cached(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Returns `true` when this was the last use.
    fn consume(&mut self, wire: Wire, line: usize, opcode: &'static str) -> Result<bool, CompileError> {
        let count = &mut self.use_counters[wire];
        if *count == 0 {
            return Err(CompileError::UseCountUnderflow { line, wire, opcode });
        }
        *count -= 1;
        if *count == 0 {
            self.pending.push(wire);
            return Ok(true);
        }
        Ok(false)
    }

    fn synthesize(
        wire: Wire,
        wire_map: &WireMap,
        line: usize,
        opcode: &'static str,
    ) -> Result<LinearCombination<F>, CompileError> {
        wire_map
            .get(wire)
            .map(LinearCombination::from_variable)
            .ok_or(CompileError::UnallocatedWire { line, wire, opcode })
    }
}
