//! The `wireId hexValue` input-value file.

use std::collections::BTreeMap;
use std::io::BufRead;

use field::from_hex;
use p3_field::Field;
use tracing::warn;

use crate::error::CompileError;
use crate::parser::CircuitSource;
use crate::wire::Wire;

/// Values supplied for `input` and `nizkinput` wires.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputValues<F> {
    values: BTreeMap<Wire, F>,
}

impl<F: Field> InputValues<F> {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Parse `wireId hexValue` lines; blank lines and `#` comments are skipped.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, CompileError> {
        let mut out = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|e| CompileError::io(format!("input file line {line_no}"), e))?;
            let content = line.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let mut words = content.split_whitespace();
            let (Some(wire), Some(value), None) = (words.next(), words.next(), words.next()) else {
                return Err(CompileError::InputFile {
                    line: line_no,
                    message: format!("expected `<wire> <hex value>`, found `{content}`"),
                });
            };
            let wire: Wire = wire.parse().map_err(|_| CompileError::InputFile {
                line: line_no,
                message: format!("invalid wire id `{wire}`"),
            })?;
            let value = from_hex(value).map_err(|e| CompileError::InputFile {
                line: line_no,
                message: e.to_string(),
            })?;
            if out.values.insert(wire, value).is_some() {
                return Err(CompileError::InputFile {
                    line: line_no,
                    message: format!("wire {wire} given twice"),
                });
            }
        }
        Ok(out)
    }

    /// Read and parse the input file at `source`.
    pub fn read<S: CircuitSource + ?Sized>(source: &S) -> Result<Self, CompileError> {
        let reader = source
            .open()
            .map_err(|e| CompileError::io(source.describe(), e))?;
        Self::parse(reader)
    }

    pub fn insert(&mut self, wire: Wire, value: F) -> Option<F> {
        self.values.insert(wire, value)
    }

    pub fn get(&self, wire: Wire) -> Option<F> {
        self.values.get(&wire).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn wires(&self) -> impl Iterator<Item = Wire> + '_ {
        self.values.keys().copied()
    }

    /// Warn about values for wires the circuit never declared as inputs.
    pub(crate) fn warn_unused(&self, declared: &[Wire]) {
        let unused = self
            .values
            .keys()
            .filter(|w| !declared.contains(w))
            .count();
        if unused > 0 {
            warn!(unused, "input file assigns wires that are not circuit inputs; ignoring them");
        }
    }
}

impl<F: Field> FromIterator<(Wire, F)> for InputValues<F> {
    fn from_iter<I: IntoIterator<Item = (Wire, F)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use field::BabyBear;
    use p3_field::PrimeCharacteristicRing;

    type F = BabyBear;

    #[test]
    fn test_parse_values() {
        let text = "0 1\n\n1 ff\n# skipped\n7 0x10 # trailing\n";
        let inputs = InputValues::<F>::parse(text.as_bytes()).unwrap();
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs.get(0), Some(F::ONE));
        assert_eq!(inputs.get(1), Some(F::from_u32(255)));
        assert_eq!(inputs.get(7), Some(F::from_u32(16)));
        assert_eq!(inputs.get(2), None);
    }

    #[test]
    fn test_rejects_duplicates_and_garbage() {
        let err = InputValues::<F>::parse("0 1\n0 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::InputFile { line: 2, .. }));

        let err = InputValues::<F>::parse("0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::InputFile { line: 1, .. }));

        let err = InputValues::<F>::parse("0 1 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::InputFile { line: 1, .. }));

        let err = InputValues::<F>::parse("x 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::InputFile { line: 1, .. }));

        let err = InputValues::<F>::parse("3 zz\n".as_bytes()).unwrap_err();
        assert!(matches!(err, CompileError::InputFile { line: 1, .. }));
    }
}
