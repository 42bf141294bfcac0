/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! Decodes the region of a [`Document`] delimited by one sentence back into a [`Line`].

use smallvec::SmallVec;

use crate::annotation::{Annotation, AnnotationHandle, AnnotationKind, AnnotationType};
use crate::changes::LineChanges;
use crate::config::Config;
use crate::document::Document;
use crate::error::RelCasError;
use crate::line::{EntitySpan, Line, LineContent};
use crate::offsets::{char_span_to_token_span, TokenOffsets};
use crate::types::*;

/// A line reconstructed from the document, along with what changed compared to the original line
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLine {
    pub line: Line,
    /// `None` if the reconstructed line is identical to the original in head, tail and relation
    pub changes: Option<LineChanges>,
}

/// Decodes the relation in a sentence, and its entities, into the native form of the original line
/// it was assembled from. `sentence_index` is only used for error reporting.
///
/// Exactly one relation annotation must lie within the sentence.
pub fn decode_line(
    document: &Document,
    sentence: &Annotation,
    sentence_index: usize,
    line: &Line,
    config: &Config,
) -> Result<DecodedLine, RelCasError> {
    check_fragment(document, sentence, line, config.separator())?;

    let relations: SmallVec<[&Annotation; 1]> = document
        .select_covered(AnnotationType::Relation, sentence.span())
        .collect();
    let relation = match relations.len() {
        0 => return Err(RelCasError::RelationNotFound(sentence_index)),
        1 => relations[0],
        n => return Err(RelCasError::AmbiguousRelation(sentence_index, n)),
    };
    let (label, governor, dependent) = match relation.kind() {
        AnnotationKind::Relation {
            label,
            governor,
            dependent,
        } => (label, *governor, *dependent),
        _ => return Err(RelCasError::HandleError("expected a relation annotation")),
    };

    let head = decode_entity(document, sentence, governor, line, config)?;
    let tail = decode_entity(document, sentence, dependent, line, config)?;
    let decoded = line.with_relation(head, tail, label.as_str());
    let changes = LineChanges::between(line, &decoded);
    Ok(DecodedLine {
        line: decoded,
        changes,
    })
}

/// Checks that the sentence covers exactly the text the line would produce
fn check_fragment(
    document: &Document,
    sentence: &Annotation,
    line: &Line,
    separator: char,
) -> Result<(), RelCasError> {
    let covered = document.covered_text(sentence)?;
    let matches = match line.content() {
        LineContent::Tokenized(tokens) => TokenOffsets::join(tokens, separator).0 == covered,
        LineContent::Raw(text) => text == covered,
    };
    if matches {
        Ok(())
    } else {
        Err(RelCasError::SofaMismatch(format!(
            "sentence {} covers {:?}, which is not the text of the line",
            sentence.span(),
            covered
        )))
    }
}

fn decode_entity(
    document: &Document,
    sentence: &Annotation,
    handle: AnnotationHandle,
    line: &Line,
    config: &Config,
) -> Result<EntitySpan, RelCasError> {
    let entity = document.get(handle)?;
    let label = match entity.kind() {
        AnnotationKind::Entity { label } => label,
        _ => {
            return Err(RelCasError::HandleError(
                "relation refers to something other than an entity annotation",
            ))
        }
    };
    if !sentence.span().embeds(&entity.span()) {
        return Err(RelCasError::MalformedSpan(
            entity.span(),
            "entity does not lie within the sentence of its relation",
        ));
    }
    let name = document.covered_text(entity)?;
    let relative = entity
        .span()
        .relative_to(sentence.begin())
        .ok_or(RelCasError::MalformedSpan(
            entity.span(),
            "entity begins before its sentence",
        ))?;
    let pos = match line.content() {
        LineContent::Tokenized(tokens) => {
            let alignment =
                char_span_to_token_span(tokens, relative, name, config.separator())?;
            if !alignment.exact {
                debug(config, || {
                    format!(
                        "decode: entity {} at {} does not align with token boundaries, widened to tokens {}",
                        label, relative, alignment.tokens
                    )
                });
            }
            alignment.tokens
        }
        LineContent::Raw(_) => relative,
    };
    Ok(EntitySpan::new(label.as_str(), pos).with_name(name))
}
