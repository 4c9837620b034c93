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

//! Module for the text input parsers, the result writer and the CSV logger.

use thiserror::Error;

mod logger;
mod parser;
mod writer;

pub use logger::CsvLogger;
pub use parser::{ArrayParser, Record, TagParser};
pub use writer::OutputWriter;

/// Errors of the input parsers and output writers.
#[derive(Error, Debug)]
pub enum IoError {
    /// An underlying file or stream operation failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// A record could not be parsed.
    #[error("malformed record on line {line}: {content}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// The offending token or an explanation.
        content: String,
    },
    /// A tag without a registered handler was encountered in strict mode.
    #[error("unknown tag {tag} on line {line}")]
    UnknownTag {
        /// The unhandled first token.
        tag: String,
        /// One-based line number.
        line: usize,
    },
    /// The logger schema was modified after its first emission.
    #[error("the schema is frozen after its first emission")]
    SchemaFrozen,
    /// A logger record does not match the declared schema.
    #[error("the record holds {got} values but the schema declares {expected}")]
    RecordArity {
        /// Number of pending measurements.
        got: usize,
        /// Number of declared fields.
        expected: usize,
    },
    /// The input ended before all positional records were read.
    #[error("the input ended before record {index} was read")]
    MissingRecord {
        /// Zero-based index of the missing record.
        index: usize,
    },
}
