//! Wires, proof-system variables and the permanent mapping between them.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

/// Identifier of a value-carrying edge in the source circuit.
///
/// A wire only indexes per-wire arrays; it never owns anything.
pub type Wire = usize;

/// Index into the constraint system's variable space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variable(pub usize);

impl Variable {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Monotonic variable counter owned by one compilation.
#[derive(Clone, Debug, Default)]
pub struct VariableAllocator {
    next: usize,
}

impl VariableAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> Variable {
        let var = Variable(self.next);
        self.next += 1;
        var
    }

    /// Number of variables handed out so far.
    pub fn count(&self) -> usize {
        self.next
    }
}

/// Ordered wire → variable map. Entries are only ever added.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMap {
    entries: BTreeMap<Wire, Variable>,
}

impl WireMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, wire: Wire) -> Option<Variable> {
        self.entries.get(&wire).copied()
    }

    pub fn contains(&self, wire: Wire) -> bool {
        self.entries.contains_key(&wire)
    }

    /// Variable of `wire`, allocating one on first use.
    pub fn get_or_alloc(&mut self, wire: Wire, alloc: &mut VariableAllocator) -> Variable {
        *self.entries.entry(wire).or_insert_with(|| alloc.alloc())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in increasing wire order.
    pub fn iter(&self) -> impl Iterator<Item = (Wire, Variable)> + '_ {
        self.entries.iter().map(|(&w, &v)| (w, v))
    }

    /// Write the map in `.varmap` format: for every entry, the wire id on one
    /// line followed by the variable index on the next.
    pub fn write_varmap<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (wire, var) in self.iter() {
            writeln!(out, "{}", wire)?;
            writeln!(out, "{}", var.index())?;
        }
        out.flush()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_monotonic_and_permanent() {
        let mut alloc = VariableAllocator::new();
        let mut map = WireMap::new();

        let a = map.get_or_alloc(7, &mut alloc);
        let b = map.get_or_alloc(3, &mut alloc);
        let again = map.get_or_alloc(7, &mut alloc);

        assert_eq!(a, Variable(0));
        assert_eq!(b, Variable(1));
        assert_eq!(again, a);
        assert_eq!(alloc.count(), 2);
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(3, b), (7, a)]);
    }

    #[test]
    fn test_varmap_text_format() {
        let mut alloc = VariableAllocator::new();
        let mut map = WireMap::new();
        map.get_or_alloc(0, &mut alloc);
        map.get_or_alloc(5, &mut alloc);
        map.get_or_alloc(2, &mut alloc);

        let mut out = Vec::new();
        map.write_varmap(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\n0\n2\n2\n5\n1\n");
    }

    #[test]
    fn test_binary_encoding_preserves_entries() {
        let mut alloc = VariableAllocator::new();
        let mut map = WireMap::new();
        for wire in [10, 4, 99] {
            map.get_or_alloc(wire, &mut alloc);
        }
        let decoded = WireMap::from_bytes(&map.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, map);
    }
}
