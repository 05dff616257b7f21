// SPDX-License-Identifier: MIT OR Apache-2.0
//! stylesheet tree structures, start at [`Stylesheet`]

use std::borrow::Cow;
use std::fmt;

use crate::cow_static;
use crate::error::Error;
use crate::stream::{Event, Indent, Parser, Quoted, Rule};

/// A whole stylesheet, top-level items in source order
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Stylesheet<'text> {
  /// The items of this stylesheet, in order
  pub items: Vec<Item<'text>>,
}

impl<'text> Stylesheet<'text> {
  /// Create an empty stylesheet
  pub fn new() -> Self {
    Self::default()
  }
  /// Parse a complete stylesheet
  pub fn parse(text: &'text str) -> Result<Self, Error> {
    Parser::new(text).collect()
  }
  /// Convert into an owned value
  pub fn into_owned(self) -> Stylesheet<'static> {
    Stylesheet {
      items: self.items.into_iter().map(Item::into_owned).collect(),
    }
  }
  /// Every rule, including those nested in `@media` and `@keyframes`
  pub fn rules(&self) -> impl Iterator<Item = &Rule<'text>> {
    self.items.iter().flat_map(Item::rules)
  }
  /// Iterator over every rule that lists a particular selector
  pub fn select(&self, selector: &str) -> impl Iterator<Item = &Rule<'text>> {
    self
      .rules()
      .filter(move |rule| rule.selectors.iter().any(|item| item == selector))
  }
}

impl fmt::Display for Stylesheet<'_> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write_items(f, &self.items, 0)
  }
}

/// A stream that stops early, as one cut short by an error, leaves its
/// open blocks holding whatever they gathered; a stray end is skipped
impl<'text> FromIterator<Event<'text>> for Stylesheet<'text> {
  fn from_iter<T: IntoIterator<Item = Event<'text>>>(iter: T) -> Self {
    let mut items = Vec::new();
    // enclosing blocks, innermost last, each with its parent's items so far
    let mut open: Vec<(Block<'text>, Vec<Item<'text>>)> = Vec::new();
    for event in iter {
      let item = match event {
        Event::Comment(text) => Item::Comment(text),
        Event::Charset(value) => Item::Charset(value),
        Event::Import(value) => Item::Import(value),
        Event::Rule { rule, .. } => Item::Rule(rule),
        Event::MediaStart(condition) => {
          open.push((Block::Media(condition), std::mem::take(&mut items)));
          continue;
        }
        Event::KeyframesStart { name, vendor } => {
          open.push((Block::Keyframes { name, vendor }, std::mem::take(&mut items)));
          continue;
        }
        Event::MediaEnd | Event::KeyframesEnd => match open.pop() {
          Some((block, parent)) => block.close(std::mem::replace(&mut items, parent)),
          None => continue,
        },
      };
      items.push(item);
    }
    while let Some((block, parent)) = open.pop() {
      let item = block.close(std::mem::replace(&mut items, parent));
      items.push(item);
    }
    Self { items }
  }
}

/// An at-rule block still waiting for its end
enum Block<'text> {
  Media(Cow<'text, str>),
  Keyframes {
    name: Cow<'text, str>,
    vendor: Cow<'text, str>,
  },
}

impl<'text> Block<'text> {
  fn close(self, items: Vec<Item<'text>>) -> Item<'text> {
    match self {
      Self::Media(condition) => Item::Media { condition, items },
      Self::Keyframes { name, vendor } => Item::Keyframes { name, vendor, items },
    }
  }
}

/// One top-level construct, or one construct inside an at-rule block
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Item<'text> {
  /// A block comment, markers included
  Comment(Cow<'text, str>),
  /// `@charset`
  Charset(Cow<'text, str>),
  /// `@import`
  Import(Cow<'text, str>),
  /// `@media` and its body
  Media {
    /// The media condition
    condition: Cow<'text, str>,
    /// Comments and rules inside the block
    items: Vec<Item<'text>>,
  },
  /// `@keyframes` and its body
  Keyframes {
    /// Animation name
    name: Cow<'text, str>,
    /// Vendor prefix, may be empty
    vendor: Cow<'text, str>,
    /// Comments and keyframe rules inside the block
    items: Vec<Item<'text>>,
  },
  /// A rule, including `@font-face`
  Rule(Rule<'text>),
}

impl<'text> Item<'text> {
  /// Convert into an owned value
  pub fn into_owned(self) -> Item<'static> {
    match self {
      Self::Comment(text) => Item::Comment(cow_static(text)),
      Self::Charset(value) => Item::Charset(cow_static(value)),
      Self::Import(value) => Item::Import(cow_static(value)),
      Self::Media { condition, items } => Item::Media {
        condition: cow_static(condition),
        items: items.into_iter().map(Item::into_owned).collect(),
      },
      Self::Keyframes { name, vendor, items } => Item::Keyframes {
        name: cow_static(name),
        vendor: cow_static(vendor),
        items: items.into_iter().map(Item::into_owned).collect(),
      },
      Self::Rule(rule) => Item::Rule(rule.into_static()),
    }
  }
  fn rules(&self) -> Box<dyn Iterator<Item = &Rule<'text>> + '_> {
    match self {
      Self::Rule(rule) => Box::new(std::iter::once(rule)),
      Self::Media { items, .. } | Self::Keyframes { items, .. } => Box::new(items.iter().flat_map(Item::rules)),
      Self::Comment(_) | Self::Charset(_) | Self::Import(_) => Box::new(std::iter::empty()),
    }
  }
}

fn write_items(f: &mut fmt::Formatter, items: &[Item], depth: usize) -> fmt::Result {
  let mut iter = items.iter();
  if let Some(first) = iter.next() {
    write_item(f, first, depth)?;
    for item in iter {
      f.write_str("\n")?;
      write_item(f, item, depth)?;
    }
  }
  Ok(())
}

fn write_item(f: &mut fmt::Formatter, item: &Item, depth: usize) -> fmt::Result {
  write!(f, "{}", Indent(depth))?;
  let items = match item {
    Item::Comment(text) => return f.write_str(text),
    Item::Charset(value) => return write!(f, "@charset {};", Quoted(value)),
    Item::Import(expr) => return write!(f, "@import {expr};"),
    Item::Rule(rule) => return write!(f, "{rule}"),
    Item::Media { condition, items } => {
      write!(f, "@media {condition} {{")?;
      items
    }
    Item::Keyframes { name, vendor, items } => {
      write!(f, "@{vendor}keyframes {name} {{")?;
      items
    }
  };
  if !items.is_empty() {
    f.write_str("\n")?;
    write_items(f, items, depth + 1)?;
  }
  write!(f, "\n{}}}", Indent(depth))
}
