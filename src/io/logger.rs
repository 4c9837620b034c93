// ProSim: Stochastic Process Simulator written in Rust
// Copyright (C) 2025 The ProSim Developers
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Module for the fixed-schema CSV logger.

use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use super::IoError;

/// A CSV logger with a fixed schema.
///
/// Fields are declared once and the schema is emitted once; afterwards the schema is frozen and
/// every record must carry exactly as many values as there are fields.
pub struct CsvLogger<W: Write> {
    out: BufWriter<W>,
    fields: Vec<String>,
    pending: Vec<String>,
    frozen: bool,
}

impl CsvLogger<File> {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, IoError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> CsvLogger<W> {
    /// Wrap an arbitrary writer.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
            fields: Vec::new(),
            pending: Vec::new(),
            frozen: false,
        }
    }

    /// Declare the next field of the schema.
    ///
    /// Refused once the schema was emitted.
    pub fn add_field(&mut self, field: impl Into<String>) -> Result<&mut Self, IoError> {
        if self.frozen {
            return Err(IoError::SchemaFrozen);
        }
        self.fields.push(field.into());
        Ok(self)
    }

    /// Emit the schema line and freeze the schema.
    pub fn log_fields(&mut self) -> Result<&mut Self, IoError> {
        if self.frozen {
            return Err(IoError::SchemaFrozen);
        }
        writeln!(self.out, "{}", self.fields.iter().join(","))?;
        self.frozen = true;
        Ok(self)
    }

    /// Stage the next value of the current record.
    pub fn add_measurement(&mut self, value: impl Display) -> &mut Self {
        self.pending.push(value.to_string());
        self
    }

    /// Emit the staged record, which must hold exactly one value per declared field.
    pub fn log_measurement(&mut self) -> Result<&mut Self, IoError> {
        if self.pending.len() != self.fields.len() {
            return Err(IoError::RecordArity {
                got: self.pending.len(),
                expected: self.fields.len(),
            });
        }
        writeln!(self.out, "{}", self.pending.iter().join(","))?;
        self.pending.clear();
        Ok(self)
    }

    /// Flush the buffer and return the underlying writer.
    pub fn into_inner(self) -> Result<W, IoError> {
        self.out.into_inner().map_err(|e| IoError::Io(e.into()))
    }
}

impl<W: Write> fmt::Debug for CsvLogger<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvLogger")
            .field("fields", &self.fields)
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}
