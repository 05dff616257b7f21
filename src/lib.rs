// SPDX-License-Identifier: MIT OR Apache-2.0
//! Small streaming CSS scanner
//!
//! Turns stylesheet text into a sequence of [`Event`]s: comments,
//! `@charset`, `@import`, the start and end of `@media` and `@keyframes`
//! blocks, and rules with their selectors and declarations. Every event
//! carries only what a build tool needs to inspect or rewrite a stylesheet;
//! nothing is validated beyond the grammar.
//!
//! Parsing is fail-fast. The first syntax error ends the stream and reports
//! the line and column it was found at, in the form
//! `<path> SyntaxError:<message> at <line> line <column> column`.
//!
//! ```
//! use cssscan::stream::{Event, Parser};
//!
//! let mut rules = 0;
//! for event in Parser::new("@media print { a { color: black } }") {
//!   if let Event::Rule { rule, .. } = event? {
//!     assert_eq!(rule.get("color"), Some("black"));
//!     rules += 1;
//!   }
//! }
//! assert_eq!(rules, 1);
//! # Ok::<(), cssscan::error::Error>(())
//! ```
//!
//! Input that arrives in pieces goes through [`ingest::ChunkBuffer`], which
//! buffers until the end of input and then parses in one pass.
//!
//! [`Event`]: stream::Event
#![warn(missing_docs)]

use std::borrow::Cow;

mod cursor;
pub mod dom;
pub mod error;
pub mod ingest;
pub mod stream;


fn cow_static<T: ?Sized + ToOwned>(value: Cow<'_, T>) -> Cow<'static, T> {
  Cow::Owned(value.into_owned())
}
