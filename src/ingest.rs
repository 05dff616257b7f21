// SPDX-License-Identifier: MIT OR Apache-2.0
//! Getting stylesheet text in: whole files, readers, or pushed byte chunks
//!
//! Chunks are only buffered; nothing is scanned until [`ChunkBuffer::finish`]
//! hands back the assembled [`Source`].

use std::io::{self, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::dom::Stylesheet;
use crate::error::Error;
use crate::stream::{Event, Parser};

/// Failure to obtain or parse a stylesheet
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
  /// The text could not be read
  #[error(transparent)]
  Io(#[from] io::Error),
  /// The text is not a valid stylesheet
  #[error(transparent)]
  Syntax(#[from] Error),
}

/// Collects byte chunks in arrival order
///
/// Also an [`io::Write`], so a reader can be copied straight in.
#[derive(Debug, Default, Clone)]
pub struct ChunkBuffer {
  bytes: Vec<u8>,
  chunks: usize,
  path: String,
}

impl ChunkBuffer {
  /// Create an empty buffer with no source path
  pub fn new() -> Self {
    Self::default()
  }
  /// Create an empty buffer whose errors will name `path`
  pub fn with_path(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      ..Self::default()
    }
  }
  /// Append a chunk
  pub fn push(&mut self, chunk: impl AsRef<[u8]>) {
    self.bytes.extend_from_slice(chunk.as_ref());
    self.chunks += 1;
  }
  /// Bytes buffered so far
  pub fn len(&self) -> usize {
    self.bytes.len()
  }
  /// Whether nothing has been buffered
  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
  /// End of input: decode the bytes and drop trailing whitespace
  ///
  /// Invalid UTF-8 is replaced with U+FFFD rather than rejected.
  pub fn finish(self) -> Source {
    tracing::debug!(bytes = self.bytes.len(), chunks = self.chunks, path = %self.path, "input complete");
    let mut text = match String::from_utf8(self.bytes) {
      Ok(text) => text,
      Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
    };
    text.truncate(crate::cursor::trim_end(&text).len());
    Source { text, path: self.path }
  }
}

impl Write for ChunkBuffer {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.push(buf);
    Ok(buf.len())
  }
  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

/// Complete stylesheet text and the path it came from
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Source {
  text: String,
  path: String,
}

impl Source {
  /// Wrap in-memory text that has no path
  pub fn new(text: impl Into<String>) -> Self {
    Self::with_path(text, "")
  }
  /// Wrap in-memory text, naming `path` in errors
  pub fn with_path(text: impl Into<String>, path: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      path: path.into(),
    }
  }
  /// Read a whole file, taking the error path from it
  pub fn read_file(path: impl AsRef<Path>) -> io::Result<Self> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    Self::from_reader(file, path.display().to_string())
  }
  /// Drain a reader through a [`ChunkBuffer`]
  pub fn from_reader(mut reader: impl Read, path: impl Into<String>) -> io::Result<Self> {
    let mut buffer = ChunkBuffer::with_path(path);
    io::copy(&mut reader, &mut buffer)?;
    Ok(buffer.finish())
  }
  /// The stylesheet text
  pub fn text(&self) -> &str {
    &self.text
  }
  /// The source path, empty if unknown
  pub fn path(&self) -> &str {
    &self.path
  }
  /// A fresh parser over this text
  pub fn parser(&self) -> Parser<'_> {
    Parser::with_path(&self.text, self.path.as_str())
  }
  /// All events, or the first error
  pub fn events(&self) -> Result<Vec<Event<'_>>, Error> {
    self.parser().collect()
  }
  /// Collect into a tree
  pub fn stylesheet(&self) -> Result<Stylesheet<'_>, Error> {
    self.parser().collect()
  }
}

/// Read and parse a stylesheet file in one go
pub fn parse_file(path: impl AsRef<Path>) -> Result<Stylesheet<'static>, LoadError> {
  let source = Source::read_file(path)?;
  Ok(source.stylesheet()?.into_owned())
}
