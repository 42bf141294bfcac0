/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains some common types used throughout the library: [`Span`], the [`Handle`] trait
//! and the type introspection used in (de)serialisation.

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::config::Config;

/// A half-open range `[begin, end)`. Depending on context this is either a range of token
/// indices or a range of character offsets. Character offsets are always in unicode
/// codepoints, never in bytes.
///
/// Serialises to (and deserialises from) a two-element JSON array: `[begin, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Returns the length of the span, zero for inverted spans
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Returns true if the span covers nothing (or is inverted)
    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    /// Returns a new span moved forward by `offset`
    pub fn shift(&self, offset: usize) -> Self {
        Self {
            begin: self.begin + offset,
            end: self.end + offset,
        }
    }

    /// Expresses this span relative to the specified position.
    /// Returns `None` if the span starts before that position.
    pub fn relative_to(&self, position: usize) -> Option<Self> {
        Some(Self {
            begin: self.begin.checked_sub(position)?,
            end: self.end.checked_sub(position)?,
        })
    }

    /// Tests whether `other` lies completely within this span
    pub fn embeds(&self, other: &Span) -> bool {
        other.begin >= self.begin && other.end <= self.end
    }
}

impl From<[usize; 2]> for Span {
    fn from(pair: [usize; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<Span> for [usize; 2] {
    fn from(span: Span) -> Self {
        [span.begin, span.end]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{},{})", self.begin, self.end)
    }
}

/// The handle trait is implemented on handle types. Handles refer to an item in a store by index,
/// they are lightweight, do not borrow anything and can be passed and copied freely.
/// This is a sealed trait, not implementable outside this crate.
#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait Handle:
    Clone + Copy + core::fmt::Debug + PartialEq + Eq + PartialOrd + Ord + Hash
{
    /// Create a new handle for an internal ID. You shouldn't need to use this as handles will always be generated for you by higher-level functions.
    fn new(intid: usize) -> Self;
    /// Returns the internal index for this handle
    fn as_usize(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Document,
    Annotation,
    ChangeLog,
    Config,
    TypeSystem,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Document => "Document",
            Self::Annotation => "Annotation",
            Self::ChangeLog => "ChangeLog",
            Self::Config => "Config",
            Self::TypeSystem => "TypeSystem",
        };
        write!(f, "{}", s)
    }
}

/// Provides type introspection, used in error messages and serialisation
#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait TypeInfo {
    fn typeinfo() -> Type;
}

/// Prints a debug message to standard error, but only if debug mode is enabled in the configuration.
/// The message is only constructed when it is actually printed.
pub(crate) fn debug<F>(config: &Config, message_func: F)
where
    F: FnOnce() -> String,
{
    if config.debug() {
        eprintln!("[relcas debug] {}", message_func());
    }
}
