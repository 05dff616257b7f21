// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parse errors
//!
//! Every error is fatal: the first one ends the parse and nothing parsed so
//! far is handed out.

use thiserror::Error;

/// A fatal syntax error, with the position the scanner had reached
///
/// Displays as `<path> SyntaxError:<message> at <line> line <column> column`,
/// where `<path>` is empty when the text has no source path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path} SyntaxError:{kind} at {line} line {column} column")]
pub struct Error {
	/// What went wrong
	pub kind: ErrorKind,
	/// 1-based line
	pub line: usize,
	/// 1-based column, in chars
	pub column: usize,
	/// Source path used to decorate the message, may be empty
	pub path: String,
}

impl Error {
	/// Coarse grouping of [`Error::kind`]
	pub fn category(&self) -> Category { self.kind.category() }
}

/// The specific syntax violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[non_exhaustive]
#[expect(missing_docs, reason = "error impl")]
pub enum ErrorKind {
	#[error("Missing {{")]
	MissingOpenBrace,
	#[error("Missing }}")]
	MissingCloseBrace,
	#[error("Missing :")]
	MissingColon,
	#[error("Missing ; after value")]
	MissingSemicolon,
	#[error("Css selector error")]
	BadSelector,
	#[error("Declaration with property error")]
	BadProperty,
	#[error("Declaration with value error")]
	BadValue,
	#[error("Missing @media name")]
	MissingMediaName,
	#[error("Missing @keyframes name")]
	MissingKeyframesName,
	#[error("Missing @import name")]
	MissingImportName,
	#[error("Missing @import ;")]
	MissingImportSemicolon,
	#[error("@charset can not after a space")]
	CharsetAfterSpace,
	#[error("@charset must be the first element")]
	CharsetNotFirst,
	#[error("@charset without ' or \"")]
	CharsetUnquoted,
	#[error("@charset missing ;")]
	CharsetMissingSemicolon,
	#[error("Unexpected block comment /*")]
	UnterminatedComment,
}

impl ErrorKind {
	/// Which family of mistake this is
	pub fn category(self) -> Category {
		match self {
			Self::MissingOpenBrace
			| Self::MissingCloseBrace
			| Self::MissingColon
			| Self::MissingSemicolon
			| Self::BadSelector
			| Self::BadProperty
			| Self::BadValue
			| Self::MissingImportSemicolon
			| Self::CharsetMissingSemicolon => Category::Structural,
			Self::MissingMediaName | Self::MissingKeyframesName | Self::MissingImportName => Category::Name,
			Self::CharsetAfterSpace | Self::CharsetNotFirst => Category::Order,
			Self::CharsetUnquoted | Self::UnterminatedComment => Category::QuoteOrComment,
		}
	}
}

/// Families of [`ErrorKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	/// A brace, colon, semicolon, selector, property or value is missing
	Structural,
	/// An at-rule lacks its name or expression
	Name,
	/// `@charset` is misplaced or repeated
	Order,
	/// A quote or comment is never closed
	QuoteOrComment,
}
