/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! ## Introduction
//!
//! This library converts between two representations of relation annotations on text:
//!
//! * **line records**: newline-delimited JSON, one object per sentence, holding either a list of
//!   tokens (`token`) or a raw text (`text`), a head entity (`h`), a tail entity (`t`) and the
//!   `relation` between them. Entity positions are token indices or character offsets, relative to
//!   the line.
//! * **documents**: a single text (the *sofa*) holding all lines, with stand-off annotations
//!   (tokens, sentences, entities and relations) anchored in it by absolute character offsets, as
//!   used in UIMA-based annotation tools.
//!
//! **What can you do with this library?**
//!
//! * Assemble line records into a [`Document`] ([`DocumentAssembler`]) and write it as document
//!   JSON or UIMA XMI.
//! * Disassemble a (possibly re-annotated) document back into line records
//!   ([`DocumentDisassembler`]), guided by the original line file, and obtain a [`ChangeLog`] of
//!   what changed.
//! * Map spans between token indices and character offsets ([`TokenOffsets`]), by position, so
//!   duplicate tokens resolve correctly.
//!
//! All character offsets are in unicode codepoints, not bytes.
//!
//! Which annotation types are used is configured through a [`TypeSystem`] and [`TypeNames`],
//! validated up front by [`TypeSystem::factory()`].
//!
//! The high-level entry points are [`lines_to_document_file()`] and [`document_to_lines_file()`].

mod annotation;
mod assembler;
mod changes;
mod config;
mod convert;
mod decoder;
mod disassembler;
mod document;
mod encoder;
mod error;
mod file;
mod json;
mod line;
mod offsets;
mod schema;
mod text;
mod types;

#[cfg(feature = "csv")]
mod csv;

#[cfg(feature = "xmi")]
mod xmi;

// Our internal crate structure is not very relevant to the outside world,
// expose all structs and traits in the root namespace, and be explicit about it:

#[cfg(feature = "csv")]
pub use crate::csv::ToCsv;
pub use annotation::{Annotation, AnnotationHandle, AnnotationKind, AnnotationType};
pub use assembler::DocumentAssembler;
pub use changes::{ChangeLog, FieldChange, LineChanges};
pub use config::{Config, Configurable};
pub use convert::{document_to_lines_file, lines_to_document_file};
pub use decoder::{decode_line, DecodedLine};
pub use disassembler::{Disassembly, DocumentDisassembler};
pub use document::Document;
pub use encoder::{encode_line, EncodedEntity, EncodedLine};
pub use error::RelCasError;
pub use file::{lines_output_path, DocumentFormat};
pub use json::ToJson;
pub use line::{
    EntitySpan, Line, LineContent, LineKind, LineReader, HEAD_KEY, RELATION_KEY, TAIL_KEY,
    TEXT_KEY, TOKEN_KEY,
};
pub use offsets::{char_span_to_token_span, TokenAlignment, TokenOffsets};
pub use schema::{
    AnnotationFactory, FeatureDescription, SchemaFactory, TypeDescription, TypeNames, TypeSystem,
    ANNOTATION_BASE_TYPE, DEFAULT_RELATION_TYPE, DEFAULT_SENTENCE_TYPE, DEFAULT_SPAN_TYPE,
    DEFAULT_TOKEN_TYPE, DEPENDENT_FEATURE, GOVERNOR_FEATURE, LABEL_FEATURE,
};
pub use text::Text;
pub use types::*;
