// SPDX-License-Identifier: MIT OR Apache-2.0
//! Position-tracked view over the unconsumed input, plus the pattern table
//!
//! Every pattern is anchored at `^`, so a match either consumes a prefix of
//! the remaining text or fails without touching the cursor.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

macro_rules! patterns {
	($($(#[$meta:meta])* $name:ident = $source:literal;)*) => {
		$(
			$(#[$meta])*
			pub(crate) static $name: LazyLock<Regex> =
				LazyLock::new(|| Regex::new($source).expect(concat!("bad pattern ", stringify!($name))));
		)*
	};
}

// `\w` is spelled out as ASCII, stylesheet identifiers never needed more.
// Whitespace classes include U+FEFF so a byte order mark reads as a blank.
patterns! {
	WHITESPACE = r"^[\s\x{FEFF}]+";
	/// leading comment, only tried when the input starts with `/*`
	COMMENT = r"^/\*[\s\S]*?\*/";
	/// comments anywhere, for scrubbing selectors and values
	ANY_COMMENT = r"/\*[\s\S]*?\*/";
	WHITESPACE_RUN = r"[\s\x{FEFF}]+";
	OPEN = r"^\{";
	CLOSE = r"^\}";
	SEMICOLON = r"^;";

	AT_CHARSET = r"^[\s\x{FEFF}]*@charset[\s\x{FEFF}]*";
	CHARSET_VALUE = r#"^('[^']+'|"[^"]+")"#;
	AT_MEDIA = r"^@media[\s\x{FEFF}]+";
	MEDIA_CONDITION = r"^[()\s\x{FEFF}0-9A-Za-z_:,-]+";
	/// group 1 is the vendor prefix, empty when absent
	AT_KEYFRAMES = r"^@([0-9A-Za-z_-]*)keyframes[\s\x{FEFF}]+";
	KEYFRAMES_NAME = r"^[0-9A-Za-z_\s\x{FEFF}-]+";
	AT_FONT_FACE = r"^@font-face[\s\x{FEFF}]*";
	AT_IMPORT = r"^@import[\s\x{FEFF}]*";
	IMPORT_EXPR = r#"^('[^']*'|"[^"]*"|[^;])+"#;

	/// quoted strings are atomic, so `,` and `{` inside them don't split
	SELECTOR = r#"^('[^']*'|"[^"]*"|[^{,])+"#;
	/// `*` and `_` are the old IE property hacks
	PROPERTY = r"^[*_]?[0-9A-Za-z_-]+";
	VALUE = r#"^('[^']*'|"[^"]*"|\([^)]*\)|[^;}\n])+"#;
	/// newline, stray indent, then the terminator
	LOOSE_SEMICOLON = r"^[\s\x{FEFF}]+;";
	CLOSE_AHEAD = r"^[\s\x{FEFF}]*\}";
}

/// Remaining input with the line/column of its first character
///
/// Lines and columns are 1-based, columns count `char`s.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'text> {
	rest: &'text str,
	line: usize,
	column: usize,
}

impl<'text> Cursor<'text> {
	pub(crate) fn new(text: &'text str) -> Self {
		Self {
			rest: text,
			line: 1,
			column: 1,
		}
	}
	pub(crate) fn rest(&self) -> &'text str { self.rest }
	pub(crate) fn is_empty(&self) -> bool { self.rest.is_empty() }
	pub(crate) fn line(&self) -> usize { self.line }
	pub(crate) fn column(&self) -> usize { self.column }
	pub(crate) fn peek(&self) -> Option<char> { self.rest.chars().next() }
	pub(crate) fn starts_with(&self, prefix: &str) -> bool { self.rest.starts_with(prefix) }
	pub(crate) fn lookahead(&self, pattern: &Regex) -> bool { pattern.is_match(self.rest) }
	/// Step over the first `len` bytes, which must end on a char boundary
	pub(crate) fn advance(&mut self, len: usize) -> &'text str {
		let (consumed, rest) = self.rest.split_at(len);
		match consumed.rfind('\n') {
			Some(last) => {
				self.line += consumed.matches('\n').count();
				self.column = consumed[last..].chars().count();
			}
			None => self.column += consumed.chars().count(),
		}
		self.rest = rest;
		consumed
	}
	/// Step over one char, if there is one
	pub(crate) fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.advance(ch.len_utf8());
		Some(ch)
	}
	pub(crate) fn try_match(&mut self, pattern: &Regex) -> Option<&'text str> {
		let found = pattern.find(self.rest)?;
		debug_assert_eq!(found.start(), 0, "unanchored pattern {pattern}");
		Some(self.advance(found.end()))
	}
	pub(crate) fn try_captures(&mut self, pattern: &Regex) -> Option<Captures<'text>> {
		let captures = pattern.captures(self.rest)?;
		let end = captures.get(0)?.end();
		self.advance(end);
		Some(captures)
	}
	pub(crate) fn skip_whitespace(&mut self) { self.try_match(&WHITESPACE); }
}

/// Whitespace as the patterns see it
pub(crate) fn is_space(ch: char) -> bool { ch.is_whitespace() || ch == '\u{FEFF}' }
pub(crate) fn trim(text: &str) -> &str { text.trim_matches(is_space) }
pub(crate) fn trim_end(text: &str) -> &str { text.trim_end_matches(is_space) }

fn map_cow<'text>(text: Cow<'text, str>, f: impl for<'a> Fn(&'a str) -> &'a str) -> Cow<'text, str> {
	match text {
		Cow::Borrowed(text) => Cow::Borrowed(f(text)),
		Cow::Owned(text) => {
			let mapped = f(&text);
			if mapped.len() == text.len() {
				Cow::Owned(text)
			} else {
				Cow::Owned(mapped.to_owned())
			}
		}
	}
}

fn collapse(text: Cow<'_, str>) -> Cow<'_, str> {
	// single spaces are already normal
	if !text.contains(|ch: char| is_space(ch) && ch != ' ') && !text.contains("  ") {
		return text;
	}
	match text {
		Cow::Borrowed(text) => WHITESPACE_RUN.replace_all(text, " "),
		Cow::Owned(text) => Cow::Owned(WHITESPACE_RUN.replace_all(&text, " ").into_owned()),
	}
}

/// Drop comments, trim, then collapse inner whitespace runs to one space
pub(crate) fn normalize(text: &str) -> Cow<'_, str> {
	let stripped = ANY_COMMENT.replace_all(text, "");
	collapse(map_cow(stripped, trim))
}
