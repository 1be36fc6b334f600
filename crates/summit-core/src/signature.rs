//! Wildcard byte signatures.
//!
//! A signature is written as a run of two-character tokens: two hex digits for
//! a fixed byte, or `??` for a byte whose value is unknown. Whitespace between
//! tokens is ignored, so `"8B 0D ?? ?? ?? ??"` and `"8b0d????????"` compile to
//! the same pattern.
//!
//! Compiling a signature also builds a masked Horspool bad-character table,
//! which lets the scanner skip ahead by more than one byte after a mismatch.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Token character that marks half of a wildcard byte.
pub const WILDCARD: char = '?';

/// A byte pattern plus the distance from the match start to the pointer it
/// locates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub pattern: String,
    pub offset_to_ptr: i32,
}

impl Signature {
    pub fn new(pattern: impl Into<String>, offset_to_ptr: i32) -> Self {
        Self {
            pattern: pattern.into(),
            offset_to_ptr,
        }
    }

    /// Parse the pattern into bytes, wildcard mask and skip table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] when the pattern has an odd number of
    /// characters, mixes a hex digit and a wildcard inside one byte, contains
    /// any other character, or is empty.
    pub fn compile(&self) -> Result<CompiledSignature> {
        let chars: Vec<char> = self
            .pattern
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if chars.is_empty() {
            return Err(Error::invalid_signature("pattern is empty"));
        }
        if chars.len() % 2 != 0 {
            return Err(Error::invalid_signature(format!(
                "odd length ({} characters)",
                chars.len()
            )));
        }

        let mut bytes = Vec::with_capacity(chars.len() / 2);
        let mut wildcards = Vec::with_capacity(chars.len() / 2);

        for (index, pair) in chars.chunks_exact(2).enumerate() {
            match (pair[0] == WILDCARD, pair[1] == WILDCARD) {
                (true, true) => {
                    bytes.push(0);
                    wildcards.push(true);
                }
                (false, false) => {
                    let high = hex_value(pair[0], index * 2)?;
                    let low = hex_value(pair[1], index * 2 + 1)?;
                    bytes.push((high << 4) | low);
                    wildcards.push(false);
                }
                _ => {
                    return Err(Error::invalid_signature(format!(
                        "partial wildcard in byte {} ('{}{}')",
                        index, pair[0], pair[1]
                    )));
                }
            }
        }

        let skip_table = build_skip_table(&bytes, &wildcards);

        Ok(CompiledSignature {
            bytes,
            wildcards,
            skip_table,
            offset_to_ptr: self.offset_to_ptr,
        })
    }
}

fn hex_value(c: char, position: usize) -> Result<u8> {
    c.to_digit(16).map(|v| v as u8).ok_or_else(|| {
        Error::invalid_signature(format!("invalid character '{}' at position {}", c, position))
    })
}

/// Masked bad-character table.
///
/// Every fixed byte before the last position records its distance to the end of
/// the pattern, the occurrence closest to the end winning. The shift is capped
/// by the distance of the nearest wildcard before the last position, since a
/// wildcard can align with any buffer byte. A trailing wildcard is not counted.
fn build_skip_table(bytes: &[u8], wildcards: &[bool]) -> [usize; 256] {
    let len = bytes.len();
    let last = len - 1;
    let mut table = [0usize; 256];
    let mut unknown_shift = 0usize;

    for position in 0..last {
        let shift = last - position;
        if wildcards[position] {
            unknown_shift = shift;
        } else {
            table[bytes[position] as usize] = shift;
        }
    }

    if unknown_shift == 0 {
        unknown_shift = len;
    }

    for entry in table.iter_mut() {
        if *entry == 0 || *entry > unknown_shift {
            *entry = unknown_shift;
        }
    }

    table
}

/// A parsed signature ready for scanning.
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    bytes: Vec<u8>,
    wildcards: Vec<bool>,
    skip_table: [usize; 256],
    offset_to_ptr: i32,
}

impl CompiledSignature {
    /// Pattern bytes; wildcard positions hold zero.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn wildcards(&self) -> &[bool] {
        &self.wildcards
    }

    pub fn skip_table(&self) -> &[usize; 256] {
        &self.skip_table
    }

    pub fn offset_to_ptr(&self) -> i32 {
        self.offset_to_ptr
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Shift to apply when the window ending on `byte` does not match.
    pub fn skip(&self, byte: u8) -> usize {
        self.skip_table[byte as usize]
    }

    /// Compare the pattern against `buffer[start..]`, last byte first.
    pub fn matches_at(&self, buffer: &[u8], start: usize) -> bool {
        let Some(window) = buffer.get(start..start + self.bytes.len()) else {
            return false;
        };
        self.bytes
            .iter()
            .zip(&self.wildcards)
            .zip(window)
            .rev()
            .all(|((&expected, &wild), &actual)| wild || expected == actual)
    }

    /// Offset of the first match in `buffer`.
    pub fn find_in(&self, buffer: &[u8]) -> Option<usize> {
        self.probes(buffer)
            .find(|probe| probe.matched)
            .map(|probe| probe.offset)
    }

    /// Every window the search examines, in order.
    pub fn probes<'a>(&'a self, buffer: &'a [u8]) -> Probes<'a> {
        Probes {
            signature: self,
            buffer,
            current: 0,
            done: false,
        }
    }
}

/// One examined window of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub offset: usize,
    pub matched: bool,
}

/// Iterator over the windows visited by the skip-table search.
///
/// Offsets are strictly increasing because every table entry is at least one.
pub struct Probes<'a> {
    signature: &'a CompiledSignature,
    buffer: &'a [u8],
    current: usize,
    done: bool,
}

impl Iterator for Probes<'_> {
    type Item = Probe;

    fn next(&mut self) -> Option<Probe> {
        let len = self.signature.len();
        if self.done || len == 0 || self.current + len > self.buffer.len() {
            return None;
        }

        let offset = self.current;
        let matched = self.signature.matches_at(self.buffer, offset);
        if matched {
            self.done = true;
        } else {
            let last_byte = self.buffer[offset + len - 1];
            self.current += self.signature.skip(last_byte);
        }

        Some(Probe { offset, matched })
    }
}
