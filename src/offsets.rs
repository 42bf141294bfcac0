/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module maps positions between token indices and character offsets within a single line.
//!
//! Tokens are joined with a single separator character. The resulting [`TokenOffsets`] table
//! holds the character span of every token in the joined text, and is used in both directions:
//! token spans are mapped to character spans by lookup, and character spans are mapped back to
//! token spans by *position*, never by comparing token strings, so lines with duplicate tokens
//! map back to the right occurrence.

use crate::error::RelCasError;
use crate::text::Text;
use crate::types::*;

/// The character span of each token in a joined text. Spans are strictly increasing and
/// non-overlapping, consecutive tokens are exactly one separator apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenOffsets {
    offsets: Vec<Span>,
}

/// The result of mapping a character span back to tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAlignment {
    /// The token span (end is exclusive)
    pub tokens: Span,
    /// Is false if the character span did not begin or end exactly on a token boundary and was
    /// widened to the tokens it overlaps
    pub exact: bool,
}

impl TokenOffsets {
    /// Joins tokens with the separator and returns the resulting text along with the offset table.
    /// The text has no leading or trailing separator; offsets are relative to it.
    pub fn join<S: AsRef<str>>(tokens: &[S], separator: char) -> (String, Self) {
        let mut text = String::with_capacity(
            tokens.iter().map(|t| t.as_ref().len() + 1).sum::<usize>(),
        );
        let mut offsets = Vec::with_capacity(tokens.len());
        let mut cursor = 0;
        for (i, token) in tokens.iter().enumerate() {
            if i > 0 {
                text.push(separator);
                cursor += 1;
            }
            let token = token.as_ref();
            let len = token.chars().count();
            text.push_str(token);
            offsets.push(Span::new(cursor, cursor + len));
            cursor += len;
        }
        (text, Self { offsets })
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the character span of a single token
    pub fn get(&self, index: usize) -> Option<&Span> {
        self.offsets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Span> {
        self.offsets.iter()
    }

    /// Maps a token span (end exclusive) to a character span in the joined text
    pub fn char_span(&self, token_span: Span) -> Result<Span, RelCasError> {
        if token_span.is_empty() || token_span.end > self.len() {
            return Err(RelCasError::MalformedSpan(
                token_span,
                "token span is empty or out of bounds",
            ));
        }
        Ok(Span::new(
            self.offsets[token_span.begin].begin,
            self.offsets[token_span.end - 1].end,
        ))
    }

    /// Maps a character span in the joined text to the span of tokens it covers.
    ///
    /// The first token is the one the span begins in, the last token the one it ends in. When a
    /// boundary falls inside a token or on a separator, the span is widened to cover the whole
    /// token, and the alignment is marked inexact.
    pub fn token_span(&self, char_span: Span) -> Result<TokenAlignment, RelCasError> {
        let textlen = self.offsets.last().map(|s| s.end).unwrap_or(0);
        if char_span.is_empty() || char_span.end > textlen {
            return Err(RelCasError::MalformedSpan(
                char_span,
                "character span is empty or out of bounds",
            ));
        }
        //first token that ends after the span begins
        let begin = self
            .offsets
            .partition_point(|offset| offset.end <= char_span.begin);
        //last token that begins before the span ends
        let end = self
            .offsets
            .partition_point(|offset| offset.begin < char_span.end);
        if begin >= end {
            return Err(RelCasError::MalformedSpan(
                char_span,
                "character span does not cover any token",
            ));
        }
        let exact = self.offsets[begin].begin == char_span.begin
            && self.offsets[end - 1].end == char_span.end;
        Ok(TokenAlignment {
            tokens: Span::new(begin, end),
            exact,
        })
    }
}

/// Maps a character span, relative to the start of a line, back to a token span of that line.
///
/// `covered_text` is the text the span covers in the document; it must be identical to what the
/// same span covers in the tokens joined by `separator`, otherwise the document text does not
/// belong to this line and a [`RelCasError::SofaMismatch`] is returned.
pub fn char_span_to_token_span<S: AsRef<str>>(
    tokens: &[S],
    char_span: Span,
    covered_text: &str,
    separator: char,
) -> Result<TokenAlignment, RelCasError> {
    let (text, offsets) = TokenOffsets::join(tokens, separator);
    let alignment = offsets.token_span(char_span)?;
    let expected = text.as_str().text_by_span(&char_span)?;
    if expected != covered_text {
        return Err(RelCasError::SofaMismatch(format!(
            "span {} covers {:?} in the document but {:?} in the line",
            char_span, covered_text, expected
        )));
    }
    Ok(alignment)
}
