/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! Encodes a single [`Line`] into a text fragment and the annotations on it, in absolute document
//! offsets.

use crate::document::Document;
use crate::error::RelCasError;
use crate::line::{EntitySpan, Line, LineContent};
use crate::offsets::TokenOffsets;
use crate::schema::AnnotationFactory;
use crate::text::Text;
use crate::types::*;

/// An entity of an encoded line: its label (the entity ID) and absolute character span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEntity {
    pub label: String,
    pub span: Span,
}

/// The result of encoding a line at a certain offset in the document. All spans are absolute
/// character offsets in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLine {
    /// The text of the line
    pub fragment: String,
    /// One span per token, empty for raw lines
    pub tokens: Vec<Span>,
    pub head: EncodedEntity,
    pub tail: EncodedEntity,
    /// The relation label
    pub relation: String,
    /// Covers exactly the fragment (no separator)
    pub sentence: Span,
}

/// Encodes a line that is to be placed at `offset` in the document
pub fn encode_line(line: &Line, offset: usize, separator: char) -> Result<EncodedLine, RelCasError> {
    let (fragment, tokens, head, tail) = match line.content() {
        LineContent::Tokenized(tokens) => {
            let (fragment, offsets) = TokenOffsets::join(tokens, separator);
            let head = nonempty(offsets.char_span(line.head().pos)?)?;
            let tail = nonempty(offsets.char_span(line.tail().pos)?)?;
            let tokens: Vec<Span> = offsets.iter().map(|span| span.shift(offset)).collect();
            (fragment, tokens, head, tail)
        }
        LineContent::Raw(text) => {
            let textlen = text.as_str().textlen();
            let head = check_char_span(line.head(), textlen)?;
            let tail = check_char_span(line.tail(), textlen)?;
            (text.clone(), Vec::new(), head, tail)
        }
    };
    let sentence = Span::new(offset, offset + fragment.as_str().textlen());
    Ok(EncodedLine {
        fragment,
        tokens,
        head: EncodedEntity {
            label: line.head().id.clone(),
            span: head.shift(offset),
        },
        tail: EncodedEntity {
            label: line.tail().id.clone(),
            span: tail.shift(offset),
        },
        relation: line.relation().to_string(),
        sentence,
    })
}

fn check_char_span(entity: &EntitySpan, textlen: usize) -> Result<Span, RelCasError> {
    if entity.pos.is_empty() || entity.pos.end > textlen {
        Err(RelCasError::MalformedSpan(
            entity.pos,
            "character span is empty or out of bounds of the text",
        ))
    } else {
        Ok(entity.pos)
    }
}

/// An entity on empty tokens only would have no text to anchor it
fn nonempty(span: Span) -> Result<Span, RelCasError> {
    if span.is_empty() {
        Err(RelCasError::MalformedSpan(
            span,
            "entity covers no characters, its tokens are empty",
        ))
    } else {
        Ok(span)
    }
}

impl EncodedLine {
    /// The span of the relation annotation, which is anchored at the tail entity
    pub fn relation_span(&self) -> Span {
        self.tail.span
    }

    /// Appends the fragment and a separator to the document text, and adds all annotations.
    /// The line must have been encoded at the current end of the document.
    pub fn commit(
        self,
        document: &mut Document,
        factory: &dyn AnnotationFactory,
        separator: char,
    ) -> Result<(), RelCasError> {
        if document.textlen() != self.sentence.begin {
            return Err(RelCasError::MalformedSpan(
                self.sentence,
                "line was not encoded at the end of the document",
            ));
        }
        document.append_text(&self.fragment);
        document.append_char(separator);
        for token in self.tokens.iter() {
            document.insert(factory.token(*token))?;
        }
        let relation_span = self.relation_span();
        let head = document.insert(factory.entity(self.head.span, &self.head.label))?;
        let tail = document.insert(factory.entity(self.tail.span, &self.tail.label))?;
        document.insert(factory.relation(relation_span, head, tail, &self.relation))?;
        document.insert(factory.sentence(self.sentence))?;
        Ok(())
    }
}
