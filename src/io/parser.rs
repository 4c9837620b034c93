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

//! Module for the tag-driven and the array-driven input parsers.
//!
//! Both parsers work on whitespace-separated records, skip blank lines and `#` comments, and
//! feed each selected record to a registered handler as a [`Record`] of typed tokens.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::{debug, trace};

use super::IoError;

/// The tokens of one input record, consumed left to right.
#[derive(Debug, Clone)]
pub struct Record {
    line: usize,
    fields: Vec<String>,
    cursor: usize,
}

impl Record {
    fn new(line: usize, fields: Vec<String>) -> Self {
        Self {
            line,
            fields,
            cursor: 0,
        }
    }

    /// One-based line number the record was read from.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Parse the next token of the record.
    pub fn next<T: FromStr>(&mut self) -> Result<T, IoError> {
        let token = self.fields.get(self.cursor).ok_or(IoError::Malformed {
            line: self.line,
            content: "unexpected end of record".to_string(),
        })?;
        self.cursor += 1;
        token.parse().map_err(|_| IoError::Malformed {
            line: self.line,
            content: token.clone(),
        })
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.fields.len() - self.cursor
    }
}

/// A record handler.
pub type Handler<'h> = Box<dyn FnMut(&mut Record) -> Result<(), IoError> + 'h>;

/// The tag-driven parser.
///
/// Every record starts with a key token (e.g. `H 100`, `A 0 1 0.5 3.2`); the handler registered
/// for that key receives the remaining tokens. Unknown keys are skipped by default and fatal in
/// strict mode.
pub struct TagParser<'h> {
    handlers: HashMap<String, Handler<'h>>,
    strict: bool,
}

impl<'h> TagParser<'h> {
    /// Create a parser without any binding.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            strict: false,
        }
    }

    /// Register the handler for a key, replacing any previous binding.
    pub fn bind<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&mut Record) -> Result<(), IoError> + 'h,
    {
        self.handlers.insert(key.into(), Box::new(handler));
        self
    }

    /// Make unknown keys fatal instead of skipping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse all records of a reader.
    pub fn parse<R: BufRead>(&mut self, reader: R) -> Result<(), IoError> {
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let Some(key) = tokens.next() else {
                continue;
            };
            let fields = tokens.map(str::to_string).collect();
            match self.handlers.get_mut(key) {
                Some(handler) => {
                    let mut record = Record::new(idx + 1, fields);
                    handler(&mut record)?;
                }
                None if self.strict => {
                    return Err(IoError::UnknownTag {
                        tag: key.to_string(),
                        line: idx + 1,
                    })
                }
                None => trace!("skipping unknown tag {key} on line {}", idx + 1),
            }
        }
        Ok(())
    }

    /// Parse all records of an in-memory input.
    pub fn parse_str(&mut self, input: &str) -> Result<(), IoError> {
        self.parse(input.as_bytes())
    }

    /// Parse all records of a file.
    pub fn parse_path(&mut self, path: impl AsRef<Path>) -> Result<(), IoError> {
        debug!("parsing {}", path.as_ref().display());
        self.parse(BufReader::new(File::open(path)?))
    }
}

impl Default for TagParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TagParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagParser")
            .field("keys", &self.handlers.keys().collect::<Vec<_>>())
            .field("strict", &self.strict)
            .finish()
    }
}

/// The array-driven parser.
///
/// Records carry no key: the `i`-th non-blank, non-comment line is fed to the `i`-th registered
/// handler. Missing lines are an error, surplus lines are ignored.
pub struct ArrayParser<'h> {
    order: Vec<Handler<'h>>,
}

impl<'h> ArrayParser<'h> {
    /// Create a parser without any handler.
    pub fn new() -> Self {
        Self { order: Vec::new() }
    }

    /// Append the handler for the next line.
    pub fn then<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&mut Record) -> Result<(), IoError> + 'h,
    {
        self.order.push(Box::new(handler));
        self
    }

    /// Parse the positional records of a reader.
    pub fn parse<R: BufRead>(&mut self, reader: R) -> Result<(), IoError> {
        let mut lines = reader.lines().enumerate();
        for (index, handler) in self.order.iter_mut().enumerate() {
            let mut record = loop {
                let Some((idx, line)) = lines.next() else {
                    return Err(IoError::MissingRecord { index });
                };
                let line = line?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let fields = line.split_whitespace().map(str::to_string).collect();
                break Record::new(idx + 1, fields);
            };
            handler(&mut record)?;
        }
        Ok(())
    }

    /// Parse the positional records of an in-memory input.
    pub fn parse_str(&mut self, input: &str) -> Result<(), IoError> {
        self.parse(input.as_bytes())
    }

    /// Parse the positional records of a file.
    pub fn parse_path(&mut self, path: impl AsRef<Path>) -> Result<(), IoError> {
        debug!("parsing {}", path.as_ref().display());
        self.parse(BufReader::new(File::open(path)?))
    }
}

impl Default for ArrayParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ArrayParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayParser")
            .field("handlers", &self.order.len())
            .finish()
    }
}
