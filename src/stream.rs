// SPDX-License-Identifier: MIT OR Apache-2.0
//! The actual scanner
//!
//! While this is technically a streaming parser, it operates on a complete
//! `&str` and hands out events that borrow from it. Text is copied only when
//! normalization (comment stripping, whitespace collapsing) changes it.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;

use crate::cow_static;
use crate::cursor::{self, Cursor, normalize};
use crate::error::{Error, ErrorKind};

type PResult<T> = Result<T, Error>;

/// The at-rule a nested [`Rule`] was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtRuleKind {
	/// Inside `@media`
	Media,
	/// Inside `@keyframes` or a vendor-prefixed variant
	Keyframes,
}

/// A `property: value` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration<'text> {
	/// Property name as written, including a leading `*` or `_` hack
	pub property: Cow<'text, str>,
	/// Value without comments, whitespace runs collapsed to one space
	pub value: Cow<'text, str>,
}

impl Declaration<'_> {
	/// Convert into an owned value
	pub fn into_static(self) -> Declaration<'static> {
		Declaration {
			property: cow_static(self.property),
			value: cow_static(self.value),
		}
	}
}

impl fmt::Display for Declaration<'_> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{}: {}", self.property, self.value) }
}

/// A selector list with its declaration block
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rule<'text> {
	/// Selectors in source order, without comments and with collapsed whitespace
	pub selectors: Vec<Cow<'text, str>>,
	/// Declarations in source order
	pub declarations: Vec<Declaration<'text>>,
}

impl<'text> Rule<'text> {
	/// Look up the last declaration of a property
	pub fn get(&self, property: &str) -> Option<&str> {
		self.declarations
			.iter()
			.rfind(|decl| decl.property == property)
			.map(|decl| &*decl.value)
	}
	/// Convert into an owned value
	pub fn into_static(self) -> Rule<'static> {
		Rule {
			selectors: self.selectors.into_iter().map(cow_static).collect(),
			declarations: self.declarations.into_iter().map(Declaration::into_static).collect(),
		}
	}
}

impl fmt::Display for Rule<'_> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let mut selectors = self.selectors.iter();
		if let Some(first) = selectors.next() {
			f.write_str(first)?;
			for selector in selectors {
				write!(f, ", {selector}")?;
			}
		}
		f.write_str(" {")?;
		for decl in &self.declarations {
			write!(f, " {decl};")?;
		}
		f.write_str(" }")
	}
}

/// a parsing event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Event<'text> {
	/// A block comment, including the `/*` and `*/` markers
	Comment(Cow<'text, str>),
	/// `@charset`, with the quotes removed
	Charset(Cow<'text, str>),
	/// `@import`, the raw expression up to the `;`
	Import(Cow<'text, str>),
	/// Start of an `@media` block with its condition
	MediaStart(Cow<'text, str>),
	/// End of the innermost `@media` block
	MediaEnd,
	/// Start of a `@keyframes` block
	KeyframesStart {
		/// Animation name
		name: Cow<'text, str>,
		/// Vendor prefix such as `-webkit-`, empty when unprefixed
		vendor: Cow<'text, str>,
	},
	/// End of the innermost `@keyframes` block
	KeyframesEnd,
	/// A qualified rule, or `@font-face` with the selector `@font-face`
	Rule {
		/// The rule itself
		rule: Rule<'text>,
		/// The at-rule block the rule sits in, if any
		within: Option<AtRuleKind>,
	},
}

impl Event<'_> {
	/// Convert into an owned value
	pub fn into_static(self) -> Event<'static> {
		match self {
			Self::Comment(text) => Event::Comment(cow_static(text)),
			Self::Charset(value) => Event::Charset(cow_static(value)),
			Self::Import(value) => Event::Import(cow_static(value)),
			Self::MediaStart(condition) => Event::MediaStart(cow_static(condition)),
			Self::MediaEnd => Event::MediaEnd,
			Self::KeyframesStart { name, vendor } => Event::KeyframesStart {
				name: cow_static(name),
				vendor: cow_static(vendor),
			},
			Self::KeyframesEnd => Event::KeyframesEnd,
			Self::Rule { rule, within } => Event::Rule {
				rule: rule.into_static(),
				within,
			},
		}
	}
}

#[derive(Debug, Clone, Copy)]
enum ParserState {
	/// right after init, `@charset` is still allowed
	BeginDocument,
	/// between top-level constructs
	TopLevel,
	/// inside an `@media` or `@keyframes` body
	Block(AtRuleKind),
	/// die
	Done,
}

/// A streaming parser, is an [`Iterator`] of [`Event`]
///
/// The first error ends the iteration.
pub struct Parser<'text> {
	cursor: Cursor<'text>,
	path: String,
	state: ParserState,
	// comments met while assembling a construct go out before it
	pending: VecDeque<Event<'text>>,
}

impl<'text> Parser<'text> {
	/// Create a new parser from a text string
	///
	/// Trailing whitespace is ignored.
	pub fn new(text: &'text str) -> Self { Self::with_path(text, "") }
	/// Create a parser whose errors name `path` as their source
	pub fn with_path(text: &'text str, path: impl Into<String>) -> Self {
		Self {
			cursor: Cursor::new(cursor::trim_end(text)),
			path: path.into(),
			state: ParserState::BeginDocument,
			pending: VecDeque::new(),
		}
	}
	/// Source path used in error messages
	pub fn path(&self) -> &str { &self.path }
	/// Current `(line, column)`, 1-based
	pub fn position(&self) -> (usize, usize) { (self.cursor.line(), self.cursor.column()) }

	fn error(&self, kind: ErrorKind) -> Error {
		Error {
			kind,
			line: self.cursor.line(),
			column: self.cursor.column(),
			path: self.path.clone(),
		}
	}
	fn require(&mut self, pattern: &regex::Regex, kind: ErrorKind) -> PResult<&'text str> {
		self.cursor.try_match(pattern).ok_or_else(|| self.error(kind))
	}
	fn open(&mut self) -> PResult<()> { self.require(&cursor::OPEN, ErrorKind::MissingOpenBrace).map(drop) }
	fn close(&mut self) -> PResult<()> { self.require(&cursor::CLOSE, ErrorKind::MissingCloseBrace).map(drop) }
	/// `/* … */`, if the input starts with one
	fn comment(&mut self) -> PResult<Option<Event<'text>>> {
		if !self.cursor.starts_with("/*") {
			return Ok(None);
		}
		let text = self.require(&cursor::COMMENT, ErrorKind::UnterminatedComment)?;
		Ok(Some(Event::Comment(Cow::Borrowed(text))))
	}
	/// whitespace and comments, queueing the comments
	fn comments(&mut self) -> PResult<()> {
		while !self.cursor.is_empty() {
			self.cursor.skip_whitespace();
			match self.comment()? {
				Some(comment) => self.pending.push_back(comment),
				None => break,
			}
		}
		Ok(())
	}

	/// `@charset "…";`
	fn at_charset(&mut self, first: bool) -> PResult<Option<Event<'text>>> {
		let Some(keyword) = self.cursor.try_match(&cursor::AT_CHARSET) else {
			return Ok(None);
		};
		if keyword.starts_with(cursor::is_space) {
			return Err(self.error(ErrorKind::CharsetAfterSpace));
		}
		if !first {
			return Err(self.error(ErrorKind::CharsetNotFirst));
		}
		let quoted = self.require(&cursor::CHARSET_VALUE, ErrorKind::CharsetUnquoted)?;
		self.require(&cursor::SEMICOLON, ErrorKind::CharsetMissingSemicolon)?;
		// the pattern guarantees a one-byte quote at each end
		Ok(Some(Event::Charset(Cow::Borrowed(&quoted[1..quoted.len() - 1]))))
	}
	/// `@media condition {`, the body is handled by [`ParserState::Block`]
	fn at_media(&mut self) -> PResult<Option<Event<'text>>> {
		if self.cursor.try_match(&cursor::AT_MEDIA).is_none() {
			return Ok(None);
		}
		let condition = self.require(&cursor::MEDIA_CONDITION, ErrorKind::MissingMediaName)?;
		self.open()?;
		self.state = ParserState::Block(AtRuleKind::Media);
		Ok(Some(Event::MediaStart(Cow::Borrowed(cursor::trim(condition)))))
	}
	/// `@keyframes name {` or `@-vendor-keyframes name {`
	fn at_keyframes(&mut self) -> PResult<Option<Event<'text>>> {
		let Some(captures) = self.cursor.try_captures(&cursor::AT_KEYFRAMES) else {
			return Ok(None);
		};
		let vendor = captures.get(1).map_or("", |vendor| vendor.as_str());
		let name = self.require(&cursor::KEYFRAMES_NAME, ErrorKind::MissingKeyframesName)?;
		self.open()?;
		self.state = ParserState::Block(AtRuleKind::Keyframes);
		Ok(Some(Event::KeyframesStart {
			name: Cow::Borrowed(cursor::trim(name)),
			vendor: Cow::Borrowed(vendor),
		}))
	}
	/// `@font-face { declarations }`
	fn at_font_face(&mut self) -> PResult<Option<Event<'text>>> {
		if self.cursor.try_match(&cursor::AT_FONT_FACE).is_none() {
			return Ok(None);
		}
		self.open()?;
		let declarations = self.declarations()?;
		Ok(Some(Event::Rule {
			rule: Rule {
				selectors: vec![Cow::Borrowed("@font-face")],
				declarations,
			},
			within: None,
		}))
	}
	/// `@import expression;`
	fn at_import(&mut self) -> PResult<Option<Event<'text>>> {
		if self.cursor.try_match(&cursor::AT_IMPORT).is_none() {
			return Ok(None);
		}
		let expr = self.require(&cursor::IMPORT_EXPR, ErrorKind::MissingImportName)?;
		self.require(&cursor::SEMICOLON, ErrorKind::MissingImportSemicolon)?;
		Ok(Some(Event::Import(Cow::Borrowed(expr))))
	}
	/// Known at-rules, tried in a fixed order; anything else is left for
	/// [`Self::rule`]
	fn at_rule(&mut self) -> PResult<Option<Event<'text>>> {
		if self.cursor.peek() != Some('@') {
			return Ok(None);
		}
		if let Some(event) = self.at_charset(false)? {
			return Ok(Some(event));
		}
		if let Some(event) = self.at_media()? {
			return Ok(Some(event));
		}
		if let Some(event) = self.at_keyframes()? {
			return Ok(Some(event));
		}
		if let Some(event) = self.at_font_face()? {
			return Ok(Some(event));
		}
		self.at_import()
	}

	/// `selector (, selector)* {`
	fn selectors(&mut self) -> PResult<Vec<Cow<'text, str>>> {
		let mut selectors = Vec::new();
		while !self.cursor.is_empty() {
			self.cursor.skip_whitespace();
			if let Some(comment) = self.comment()? {
				self.pending.push_back(comment);
				continue;
			}
			let segment = self.require(&cursor::SELECTOR, ErrorKind::BadSelector)?;
			selectors.push(normalize(segment));
			if self.cursor.peek() == Some('{') {
				break;
			}
			// the `,`
			self.cursor.bump();
		}
		self.open()?;
		Ok(selectors)
	}
	/// `property : value` after a `{`, through the closing `}`
	fn declarations(&mut self) -> PResult<Vec<Declaration<'text>>> {
		let mut declarations = Vec::new();
		while !self.cursor.is_empty() {
			self.cursor.skip_whitespace();
			if let Some(comment) = self.comment()? {
				self.pending.push_back(comment);
				continue;
			}
			if matches!(self.cursor.peek(), None | Some('}')) {
				break;
			}
			let property = self.require(&cursor::PROPERTY, ErrorKind::BadProperty)?;
			self.comments()?;
			if self.cursor.peek() != Some(':') {
				return Err(self.error(ErrorKind::MissingColon));
			}
			self.cursor.bump();
			self.comments()?;
			let value = self.require(&cursor::VALUE, ErrorKind::BadValue)?;
			let next = self.cursor.peek();
			if next == Some(';') {
				self.cursor.bump();
			} else if next == Some('\n') && self.cursor.try_match(&cursor::LOOSE_SEMICOLON).is_some() {
				// a lone `;` on the next line still terminates
			} else if !self.cursor.lookahead(&cursor::CLOSE_AHEAD) {
				// only the last declaration may omit the `;`
				return Err(self.error(ErrorKind::MissingSemicolon));
			}
			declarations.push(Declaration {
				property: Cow::Borrowed(property),
				value: normalize(value),
			});
		}
		self.close()?;
		Ok(declarations)
	}
	fn rule(&mut self, within: Option<AtRuleKind>) -> PResult<Event<'text>> {
		let selectors = self.selectors()?;
		let declarations = self.declarations()?;
		Ok(Event::Rule {
			rule: Rule {
				selectors,
				declarations,
			},
			within,
		})
	}

	fn next_event(&mut self) -> PResult<Option<Event<'text>>> {
		loop {
			if let Some(event) = self.pending.pop_front() {
				return Ok(Some(event));
			}
			let event = match self.state {
				ParserState::BeginDocument => {
					tracing::debug!(path = %self.path, bytes = self.cursor.rest().len(), "scanning stylesheet");
					self.state = ParserState::TopLevel;
					match self.at_charset(true)? {
						Some(event) => event,
						None => continue,
					}
				}
				ParserState::TopLevel => {
					self.cursor.skip_whitespace();
					if self.cursor.is_empty() {
						self.state = ParserState::Done;
						return Ok(None);
					}
					if let Some(comment) = self.comment()? {
						comment
					} else if let Some(event) = self.at_rule()? {
						event
					} else {
						self.rule(None)?
					}
				}
				ParserState::Block(kind) => {
					self.cursor.skip_whitespace();
					if self.cursor.is_empty() {
						return Err(self.error(ErrorKind::MissingCloseBrace));
					}
					if let Some(comment) = self.comment()? {
						comment
					} else if self.cursor.peek() == Some('}') {
						self.cursor.bump();
						self.state = ParserState::TopLevel;
						match kind {
							AtRuleKind::Media => Event::MediaEnd,
							AtRuleKind::Keyframes => Event::KeyframesEnd,
						}
					} else {
						self.rule(Some(kind))?
					}
				}
				ParserState::Done => return Ok(None),
			};
			self.pending.push_back(event);
		}
	}
}

impl<'text> Iterator for Parser<'text> {
	type Item = PResult<Event<'text>>;
	fn next(&mut self) -> Option<Self::Item> {
		let event = self.next_event();
		match &event {
			Ok(Some(event)) => tracing::trace!(?event, "event"),
			Ok(None) => {}
			Err(error) => {
				tracing::debug!(%error, "stylesheet rejected");
				self.state = ParserState::Done;
				self.pending.clear();
			}
		}
		event.transpose()
	}
}

impl std::iter::FusedIterator for Parser<'_> {}

/// Parse a whole stylesheet into its events
pub fn parse(text: &str) -> Result<Vec<Event<'_>>, Error> { Parser::new(text).collect() }

/// Writes `depth` levels of indentation
pub(crate) struct Indent(pub(crate) usize);

impl fmt::Display for Indent {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for _ in 0..self.0 {
			f.write_str("    ")?;
		}
		Ok(())
	}
}

/// A charset value with whichever quote it doesn't contain
pub(crate) struct Quoted<'a>(pub(crate) &'a str);

impl fmt::Display for Quoted<'_> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		if self.0.contains('"') {
			write!(f, "'{}'", self.0)
		} else {
			write!(f, "\"{}\"", self.0)
		}
	}
}

/// Write an iterator of events out as minimal CSS, without constructing a
/// [`Stylesheet`] first
///
/// Re-parsing the output yields the same events.
///
/// [`Stylesheet`]: crate::dom::Stylesheet
pub fn write_stream<'text, I: IntoIterator<Item = Event<'text>>>(
	f: &mut impl fmt::Write,
	events: I,
) -> fmt::Result {
	let mut depth = 0_usize;
	let mut non_start = false;
	for event in events {
		if let Event::MediaEnd | Event::KeyframesEnd = event {
			depth = depth.saturating_sub(1);
			write!(f, "\n{}}}", Indent(depth))?;
			continue;
		}
		if non_start {
			f.write_str("\n")?;
		}
		non_start = true;
		write!(f, "{}", Indent(depth))?;
		match event {
			Event::Comment(text) => f.write_str(&text)?,
			Event::Charset(value) => write!(f, "@charset {};", Quoted(&value))?,
			Event::Import(expr) => write!(f, "@import {expr};")?,
			Event::MediaStart(condition) => {
				write!(f, "@media {condition} {{")?;
				depth += 1;
			}
			Event::KeyframesStart { name, vendor } => {
				write!(f, "@{vendor}keyframes {name} {{")?;
				depth += 1;
			}
			Event::Rule { rule, .. } => write!(f, "{rule}")?,
			Event::MediaEnd | Event::KeyframesEnd => {}
		}
	}
	Ok(())
}
