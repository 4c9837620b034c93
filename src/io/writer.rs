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

//! Module for the line-oriented result writer.

use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::IoError;

/// A buffered, line-oriented text writer for simulation results.
///
/// The usual output of a model is one header line followed by `KEY VALUE` result lines. The
/// buffer is flushed when the writer is dropped, on every exit path.
pub struct OutputWriter<W: Write> {
    out: BufWriter<W>,
}

impl OutputWriter<File> {
    /// Create (or truncate) the result file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, IoError> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> OutputWriter<W> {
    /// Wrap an arbitrary writer.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    /// Append one line of text.
    pub fn write_line(&mut self, line: &str) -> Result<(), IoError> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    /// Append one `KEY VALUE` result line.
    pub fn write_result(&mut self, key: &str, value: impl Display) -> Result<(), IoError> {
        writeln!(self.out, "{key} {value}")?;
        Ok(())
    }

    /// Flush the buffer explicitly.
    pub fn flush(&mut self) -> Result<(), IoError> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush the buffer and return the underlying writer.
    pub fn into_inner(self) -> Result<W, IoError> {
        self.out.into_inner().map_err(|e| IoError::Io(e.into()))
    }
}

impl<W: Write> fmt::Debug for OutputWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputWriter").finish_non_exhaustive()
    }
}
