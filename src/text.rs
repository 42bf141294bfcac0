/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module defines and partially implements the [`Text`] trait.

use crate::error::RelCasError;
use crate::types::*;

/// This trait provides methods that operate on structures that hold text content, addressed
/// by character offsets in unicode codepoints.
pub trait Text {
    /// Returns a reference to the text
    fn text(&self) -> &str;

    /// Returns the length of the text in unicode points
    /// For bytes, use `Self::text().len()` instead.
    fn textlen(&self) -> usize;

    /// Converts a unicode character position to a UTF-8 byte position.
    /// A position equal to the length of the text is valid and points just past its end.
    fn utf8byte(&self, charpos: usize) -> Result<usize, RelCasError>;

    /// Returns a string reference to a slice of text as specified by the span
    fn text_by_span(&self, span: &Span) -> Result<&str, RelCasError> {
        if span.end < span.begin || span.end > self.textlen() {
            return Err(RelCasError::MalformedSpan(
                *span,
                "span out of bounds of the text",
            ));
        }
        let beginbyte = self.utf8byte(span.begin)?;
        let endbyte = self.utf8byte(span.end)?;
        Ok(&self.text()[beginbyte..endbyte])
    }

    fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

impl Text for str {
    fn text(&self) -> &str {
        self
    }

    fn textlen(&self) -> usize {
        self.chars().count()
    }

    fn utf8byte(&self, charpos: usize) -> Result<usize, RelCasError> {
        let mut count = 0;
        for (bytepos, _) in self.char_indices() {
            if count == charpos {
                return Ok(bytepos);
            }
            count += 1;
        }
        if count == charpos {
            Ok(self.len())
        } else {
            Err(RelCasError::MalformedSpan(
                Span::new(charpos, charpos),
                "character position out of bounds of the text",
            ))
        }
    }
}
