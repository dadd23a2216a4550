//! Line table: (line, column) ↔ offset.
//!
//! Offsets count characters by default. The editor host indexes its strings in
//! UTF-16 code units, so positions coming from it use [`LineTable::from_text_utf16`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Zero-based line/column, columns in the unit of the owning [`LineTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable {
    lengths: Vec<usize>,
    starts: Vec<usize>,
}

impl LineTable {
    pub fn from_text(text: &str) -> Self {
        Self::measured(text, |line| line.chars().count())
    }

    /// Offsets and columns in UTF-16 code units, as JS string indices are.
    pub fn from_text_utf16(text: &str) -> Self {
        Self::measured(text, |line| line.encode_utf16().count())
    }

    fn measured(text: &str, measure: impl Fn(&str) -> usize) -> Self {
        let lengths: Vec<usize> = text.split('\n').map(measure).collect();
        let mut starts = Vec::with_capacity(lengths.len());
        let mut offset = 0;
        for len in &lengths {
            starts.push(offset);
            offset += len + 1;
        }
        Self { lengths, starts }
    }

    pub fn line_count(&self) -> usize {
        self.lengths.len()
    }

    pub fn line_lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Total length of the text.
    pub fn len(&self) -> usize {
        match (self.starts.last(), self.lengths.last()) {
            (Some(start), Some(len)) => start + len,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position_to_offset(&self, line: usize, column: usize) -> Result<usize> {
        match (self.starts.get(line), self.lengths.get(line)) {
            (Some(&start), Some(&len)) if column <= len => Ok(start + column),
            _ => Err(Error::PositionOutOfRange { line, column }),
        }
    }

    pub fn offset_to_position(&self, offset: usize) -> Result<Position> {
        if offset > self.len() {
            return Err(Error::OffsetOutOfRange { offset });
        }
        // Last line whose start is <= offset.
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        Ok(Position::new(line, offset - self.starts[line]))
    }
}
