#![deny(missing_docs)]

//! # Struct Tag Merging
//!
//! Parses Go struct tag text (`key:"value" key2:"value2"`) into ordered items
//! and merges new items into it.
//!
//! - Keys are unique; setting an existing key replaces its value in place.
//! - New keys are appended in the order they are merged.
//! - Values keep their quotes and escapes byte for byte.
//!
//! The tokenizer is a single forward pass over the bytes, so malformed or
//! hostile input is rejected in linear time without panicking.

use derive_more::Display;
use std::fmt;

/// One `key:"value"` entry of a struct tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagItem {
    /// The tag key (e.g. `json`).
    pub key: String,
    /// The quoted value, escapes intact (e.g. `"name,omitempty"`).
    pub value: String,
}

impl TagItem {
    /// Creates an item from a key and an already-quoted value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for TagItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

/// Why a tag failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TagErrorKind {
    /// A value started without a key in front of it.
    #[display("empty key")]
    EmptyKey,
    /// The key is not followed by `:`.
    #[display("missing ':' after key")]
    MissingColon,
    /// The `:` is not followed by `"`.
    #[display("missing opening quote")]
    MissingQuote,
    /// The input ended inside a quoted value.
    #[display("unterminated value")]
    UnterminatedValue,
}

/// A tag parse failure at a byte offset of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("malformed tag: {kind} at byte {offset}")]
pub struct TagError {
    /// What went wrong.
    pub kind: TagErrorKind,
    /// Byte offset into the parsed text.
    pub offset: usize,
}

impl std::error::Error for TagError {}

/// An ordered set of tag items with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagItems(Vec<TagItem>);

impl TagItems {
    /// Parses tag text. Duplicate keys collapse onto the first position, last value wins.
    ///
    /// # Examples
    /// ```
    /// use goinject_core::tags::TagItems;
    ///
    /// let items = TagItems::parse(r#"valid:"ip" yaml:"ip, required""#).unwrap();
    /// assert_eq!(items.get("yaml"), Some(r#""ip, required""#));
    /// assert!(TagItems::parse(r#"valid:"ip"#).is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, TagError> {
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut items = TagItems::default();
        let mut i = 0;

        loop {
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i == len {
                return Ok(items);
            }

            let key_start = i;
            while i < len && is_key_byte(bytes[i]) {
                i += 1;
            }
            if i == key_start {
                return Err(error(TagErrorKind::EmptyKey, i));
            }
            let key_end = i;

            if i == len || bytes[i] != b':' {
                return Err(error(TagErrorKind::MissingColon, i));
            }
            i += 1;

            if i == len || bytes[i] != b'"' {
                return Err(error(TagErrorKind::MissingQuote, i));
            }
            let value_start = i;
            i += 1;

            loop {
                if i >= len {
                    return Err(error(TagErrorKind::UnterminatedValue, value_start));
                }
                match bytes[i] {
                    b'\\' => i += 2,
                    b'"' => {
                        i += 1;
                        break;
                    }
                    _ => i += 1,
                }
            }

            items.set(TagItem::new(&text[key_start..key_end], &text[value_start..i]));
        }
    }

    /// Returns the quoted value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.value.as_str())
    }

    /// Replaces the value of an existing key in place, or appends a new item.
    pub fn set(&mut self, item: TagItem) {
        match self.0.iter_mut().find(|existing| existing.key == item.key) {
            Some(existing) => existing.value = item.value,
            None => self.0.push(item),
        }
    }

    /// Merges every item of `other` into `self`, in order.
    pub fn merge(&mut self, other: TagItems) {
        for item in other.0 {
            self.set(item);
        }
    }

    /// Iterates the items in order.
    pub fn iter(&self) -> impl Iterator<Item = &TagItem> {
        self.0.iter()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no items.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<TagItem> for TagItems {
    fn from_iter<I: IntoIterator<Item = TagItem>>(iter: I) -> Self {
        let mut items = TagItems::default();
        for item in iter {
            items.set(item);
        }
        items
    }
}

impl fmt::Display for TagItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

/// Merges `payload` into the `existing` tag text and serializes the result.
///
/// Both inputs must be well-formed; the first malformed one is reported.
///
/// # Examples
/// ```
/// use goinject_core::tags::merge;
///
/// let merged = merge(r#"k:"v1" other:"x""#, r#"k:"v2""#).unwrap();
/// assert_eq!(merged, r#"k:"v2" other:"x""#);
/// ```
pub fn merge(existing: &str, payload: &str) -> Result<String, TagError> {
    let mut items = TagItems::parse(existing)?;
    items.merge(TagItems::parse(payload)?);
    Ok(items.to_string())
}

fn is_key_byte(b: u8) -> bool {
    b > b' ' && b != 0x7f && !matches!(b, b':' | b'"' | b'`')
}

fn error(kind: TagErrorKind, offset: usize) -> TagError {
    TagError { kind, offset }
}
