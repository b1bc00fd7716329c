//! Lazy reader for the line-oriented gate-list format.
//!
//! Both compilation passes consume the same [`Statements`] iterator, so the
//! order in which gate inputs are visited can never differ between them.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use field::from_hex;
use p3_field::Field;

use crate::error::CompileError;
use crate::wire::Wire;

/// Anything the gate list can be read from, once per pass.
pub trait CircuitSource {
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>>;

    /// Human-readable name used in error messages.
    fn describe(&self) -> String;
}

impl CircuitSource for Path {
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(BufReader::new(File::open(self)?)))
    }

    fn describe(&self) -> String {
        self.display().to_string()
    }
}

impl CircuitSource for PathBuf {
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        self.as_path().open()
    }

    fn describe(&self) -> String {
        self.as_path().describe()
    }
}

impl CircuitSource for str {
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        Ok(Box::new(self.as_bytes()))
    }

    fn describe(&self) -> String {
        "<in-memory circuit>".to_string()
    }
}

impl CircuitSource for String {
    fn open(&self) -> io::Result<Box<dyn BufRead + '_>> {
        self.as_str().open()
    }

    fn describe(&self) -> String {
        self.as_str().describe()
    }
}

/// Gate kinds, with the constant of `const-mul` already folded in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Opcode<F> {
    Add,
    Mul,
    Xor,
    Or,
    /// `zerop`: second output is 1 iff the input is nonzero.
    ZeroCheck,
    Pack,
    Split,
    /// `const-mul-<hex>`, or `const-mul-neg-<hex>` with the constant negated.
    ConstMul(F),
    Assert,
}

impl<F: Field> Opcode<F> {
    fn parse(token: &str, line: usize) -> Result<Self, CompileError> {
        let op = match token {
            "add" => Opcode::Add,
            "mul" => Opcode::Mul,
            "xor" => Opcode::Xor,
            "or" => Opcode::Or,
            "zerop" => Opcode::ZeroCheck,
            "pack" => Opcode::Pack,
            "split" => Opcode::Split,
            "assert" => Opcode::Assert,
            _ => {
                let Some(suffix) = token.strip_prefix("const-mul-") else {
                    return Err(CompileError::UnknownOpcode {
                        line,
                        opcode: token.to_string(),
                    });
                };
                let (negate, hex) = match suffix.strip_prefix("neg-") {
                    Some(hex) => (true, hex),
                    None => (false, suffix),
                };
                let constant: F = from_hex(hex).map_err(|source| CompileError::Constant {
                    line,
                    opcode: token.to_string(),
                    source,
                })?;
                Opcode::ConstMul(if negate { -constant } else { constant })
            }
        };
        Ok(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Mul => "mul",
            Opcode::Xor => "xor",
            Opcode::Or => "or",
            Opcode::ZeroCheck => "zerop",
            Opcode::Pack => "pack",
            Opcode::Split => "split",
            Opcode::ConstMul(_) => "const-mul",
            Opcode::Assert => "assert",
        }
    }

    /// Accepted `(inputs, outputs)` shape, as text for diagnostics.
    fn arity(&self) -> &'static str {
        match self {
            Opcode::Add | Opcode::Pack => "at least 1 input and 1 output",
            Opcode::Mul | Opcode::Xor | Opcode::Or | Opcode::Assert => "2 inputs and 1 output",
            Opcode::ZeroCheck => "1 input and 2 outputs",
            Opcode::Split => "1 input and at least 1 output",
            Opcode::ConstMul(_) => "1 input and 1 output",
        }
    }

    fn accepts(&self, inputs: usize, outputs: usize) -> bool {
        match self {
            Opcode::Add | Opcode::Pack => inputs >= 1 && outputs == 1,
            Opcode::Mul | Opcode::Xor | Opcode::Or | Opcode::Assert => inputs == 2 && outputs == 1,
            Opcode::ZeroCheck => inputs == 1 && outputs == 2,
            Opcode::Split => inputs == 1 && outputs >= 1,
            Opcode::ConstMul(_) => inputs == 1 && outputs == 1,
        }
    }
}

impl<F: Field> fmt::Display for Opcode<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::ConstMul(c) => write!(f, "const-mul({c:?})"),
            op => f.write_str(op.name()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate<F> {
    pub op: Opcode<F>,
    pub inputs: Vec<Wire>,
    pub outputs: Vec<Wire>,
}

/// One meaningful line of the gate list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement<F> {
    /// `total <n>`: number of wires.
    Total(usize),
    NumSegments(usize),
    SegmentSize(usize),
    Input(Wire),
    NizkInput(Wire),
    Output(Wire),
    Gate(Gate<F>),
}

#[derive(Copy, Clone, Debug)]
enum SegmentState {
    Undeclared,
    Open { declared: usize, found: usize },
    Closed,
}

/// Iterator over `(line_number, statement)` pairs of a gate list.
///
/// Stops after the first error.
pub struct Statements<F, R> {
    lines: Lines<R>,
    line: usize,
    num_wires: Option<usize>,
    segments: SegmentState,
    done: bool,
    _field: PhantomData<F>,
}

impl<F: Field, R: BufRead> Statements<F, R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            num_wires: None,
            segments: SegmentState::Undeclared,
            done: false,
            _field: PhantomData,
        }
    }

    /// Wire count from the `total` header, once it has been read.
    pub fn num_wires(&self) -> Option<usize> {
        self.num_wires
    }

    fn check_wire(&self, wire: Wire) -> Result<Wire, CompileError> {
        let num_wires = self
            .num_wires
            .ok_or(CompileError::MissingHeader { line: self.line })?;
        if wire >= num_wires {
            return Err(CompileError::WireOutOfRange {
                line: self.line,
                wire,
                num_wires,
            });
        }
        Ok(wire)
    }

    fn track_segments(&mut self, statement: &Statement<F>) -> Result<(), CompileError> {
        match (statement, self.segments) {
            (Statement::NumSegments(_), SegmentState::Open { .. } | SegmentState::Closed) => {
                Err(CompileError::parse(self.line, "num_segments declared twice"))
            }
            (Statement::NumSegments(k), SegmentState::Undeclared) => {
                self.segments = SegmentState::Open {
                    declared: *k,
                    found: 0,
                };
                Ok(())
            }
            (Statement::SegmentSize(_), SegmentState::Open { declared, found }) => {
                if found == declared {
                    return Err(CompileError::SegmentCount {
                        line: self.line,
                        declared,
                        found: found + 1,
                    });
                }
                self.segments = SegmentState::Open {
                    declared,
                    found: found + 1,
                };
                Ok(())
            }
            (Statement::SegmentSize(_), _) => Err(CompileError::parse(
                self.line,
                "segment_size outside a num_segments block",
            )),
            (_, SegmentState::Open { declared, found }) => {
                if found != declared {
                    return Err(CompileError::SegmentCount {
                        line: self.line,
                        declared,
                        found,
                    });
                }
                self.segments = SegmentState::Closed;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn parse_line(&mut self, text: &str) -> Result<Statement<F>, CompileError> {
        let mut rest = text;
        let keyword = take_word(&mut rest).unwrap_or_default();
        let statement = match keyword {
            "total" => {
                if self.num_wires.is_some() {
                    return Err(CompileError::parse(self.line, "duplicate `total` header"));
                }
                let n = self.take_number(&mut rest, "wire count")?;
                self.num_wires = Some(n);
                Statement::Total(n)
            }
            "num_segments" => Statement::NumSegments(self.take_number(&mut rest, "segment count")?),
            "segment_size" => Statement::SegmentSize(self.take_number(&mut rest, "segment size")?),
            "input" => Statement::Input(self.take_wire(&mut rest)?),
            "nizkinput" => Statement::NizkInput(self.take_wire(&mut rest)?),
            "output" => Statement::Output(self.take_wire(&mut rest)?),
            opcode => {
                let gate = self.parse_gate(opcode, &mut rest)?;
                Statement::Gate(gate)
            }
        };
        if let Some(extra) = take_word(&mut rest) {
            return Err(CompileError::parse(
                self.line,
                format!("unexpected trailing token `{extra}`"),
            ));
        }
        Ok(statement)
    }

    fn parse_gate(&self, opcode: &str, rest: &mut &str) -> Result<Gate<F>, CompileError> {
        let op = Opcode::parse(opcode, self.line)?;
        let inputs = self.take_wire_list(rest, "in")?;
        let outputs = self.take_wire_list(rest, "out")?;
        if !op.accepts(inputs.len(), outputs.len()) {
            return Err(CompileError::Arity {
                line: self.line,
                opcode: opcode.to_string(),
                expected: op.arity(),
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        Ok(Gate {
            op,
            inputs,
            outputs,
        })
    }

    fn take_number(&self, rest: &mut &str, what: &str) -> Result<usize, CompileError> {
        let word = take_word(rest)
            .ok_or_else(|| CompileError::parse(self.line, format!("missing {what}")))?;
        word.parse()
            .map_err(|_| CompileError::parse(self.line, format!("invalid {what} `{word}`")))
    }

    fn take_wire(&self, rest: &mut &str) -> Result<Wire, CompileError> {
        let wire = self.take_number(rest, "wire id")?;
        self.check_wire(wire)
    }

    /// `<keyword> <n> <w1 ... wn>`
    fn take_wire_list(&self, rest: &mut &str, keyword: &str) -> Result<Vec<Wire>, CompileError> {
        match take_word(rest) {
            Some(word) if word == keyword => {}
            other => {
                return Err(CompileError::parse(
                    self.line,
                    format!("expected `{keyword}`, found `{}`", other.unwrap_or("end of line")),
                ))
            }
        }
        let count = self.take_number(rest, &format!("`{keyword}` count"))?;

        let body = rest.trim_start();
        let inner = body
            .strip_prefix('<')
            .ok_or_else(|| CompileError::parse(self.line, format!("expected `<` after `{keyword} {count}`")))?;
        let close = inner
            .find('>')
            .ok_or_else(|| CompileError::parse(self.line, "unterminated wire list"))?;
        *rest = &inner[close + 1..];

        let wires = inner[..close]
            .split_whitespace()
            .map(|w| {
                let wire = w
                    .parse()
                    .map_err(|_| CompileError::parse(self.line, format!("invalid wire id `{w}`")))?;
                self.check_wire(wire)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if wires.len() != count {
            return Err(CompileError::parse(
                self.line,
                format!("`{keyword}` declares {count} wires but lists {}", wires.len()),
            ));
        }
        Ok(wires)
    }

    fn finish(&mut self) -> Option<Result<(usize, Statement<F>), CompileError>> {
        self.done = true;
        match self.segments {
            SegmentState::Open { declared, found } if found != declared => {
                Some(Err(CompileError::SegmentCount {
                    line: self.line,
                    declared,
                    found,
                }))
            }
            _ => None,
        }
    }
}

impl<F: Field, R: BufRead> Iterator for Statements<F, R> {
    type Item = Result<(usize, Statement<F>), CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let Some(read) = self.lines.next() else {
                return self.finish();
            };
            self.line += 1;
            let text = match read {
                Ok(text) => text,
                Err(e) => {
                    self.done = true;
                    return Some(Err(CompileError::io(format!("gate list line {}", self.line), e)));
                }
            };
            let content = strip_comment(&text).trim();
            if content.is_empty() {
                continue;
            }

            let result = self
                .parse_line(content)
                .and_then(|statement| {
                    self.track_segments(&statement)?;
                    Ok(statement)
                });
            return match result {
                Ok(statement) => Some(Ok((self.line, statement))),
                Err(e) => {
                    self.done = true;
                    Some(Err(e))
                }
            };
        }
    }
}

/// Open `source` and iterate over its statements.
pub fn read_statements<F: Field, S: CircuitSource + ?Sized>(
    source: &S,
) -> Result<Statements<F, Box<dyn BufRead + '_>>, CompileError> {
    let reader = source
        .open()
        .map_err(|e| CompileError::io(source.describe(), e))?;
    Ok(Statements::new(reader))
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn take_word<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        *rest = trimmed;
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (word, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(word)
}
