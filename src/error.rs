/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`RelCasError`] type, used throughout the library.

use std::error::Error;
use std::fmt;

use crate::line::LineKind;
use crate::types::Span;

/// All errors the library can produce. Every error is fatal for the conversion run it occurs in,
/// output produced up to that point should not be trusted.
#[derive(Debug)]
pub enum RelCasError {
    /// A line record could not be parsed: invalid JSON, a missing key, or no records at all.
    /// Carries the (1-based) physical line number, 0 if it pertains to the input as a whole.
    MalformedLine(usize, String),

    /// A token-index or character span is empty or out of bounds
    MalformedSpan(Span, &'static str),

    /// A requested annotation type or feature is absent from the type system, or a type name is invalid
    SchemaMismatch(String, &'static str),

    /// The number of sentences in the document does not match the number of non-empty lines
    AlignmentMismatch { sentences: usize, lines: usize },

    /// A line is of a different kind (tokenized/raw) than the first line of the input, which determines the kind for the entire document.
    /// Carries the line number and the expected kind.
    KindMismatch(usize, LineKind),

    /// No relation annotation was found inside a sentence (carries the sentence index)
    RelationNotFound(usize),

    /// More than one relation annotation was found inside a sentence (carries the sentence index and the number found)
    AmbiguousRelation(usize, usize),

    /// The text of the document does not correspond with the text of the line it is aligned with
    SofaMismatch(String),

    /// Wraps another error with the line number it occurred at
    LineError(usize, Box<RelCasError>),

    /// A handle does not refer to a (suitable) annotation, or an identifier in a document is used twice
    HandleError(&'static str),

    /// An annotation in a document lacks a feature its kind requires (carries the annotation's identifier)
    MalformedAnnotation(String, &'static str),

    IOError(std::io::Error, String, &'static str),
    JsonError(
        serde_path_to_error::Error<serde_json::Error>,
        String,
        &'static str,
    ),
    XmlError(quick_xml::Error, String, &'static str),
    SerializationError(String),
    OtherError(&'static str),
}

impl RelCasError {
    /// Attaches a line number to an error, unless the error already carries one.
    pub fn at_line(self, line_number: usize) -> Self {
        match self {
            Self::MalformedLine(..) | Self::KindMismatch(..) | Self::LineError(..) => self,
            err => Self::LineError(line_number, Box::new(err)),
        }
    }
}

impl From<&RelCasError> for String {
    /// Returns the error message as a String
    fn from(error: &RelCasError) -> String {
        match error {
            RelCasError::MalformedLine(0, msg) => format!("MalformedLine: {}", msg),
            RelCasError::MalformedLine(line, msg) => {
                format!("MalformedLine: line {}: {}", line, msg)
            }
            RelCasError::MalformedSpan(span, msg) => format!("MalformedSpan: {} ({})", span, msg),
            RelCasError::SchemaMismatch(name, msg) => {
                format!("SchemaMismatch: {} ({})", name, msg)
            }
            RelCasError::AlignmentMismatch { sentences, lines } => format!(
                "AlignmentMismatch: document has {} sentences but the line file has {} non-empty lines",
                sentences, lines
            ),
            RelCasError::KindMismatch(line, kind) => format!(
                "KindMismatch: line {} is not {}, like the first line of the input",
                line, kind
            ),
            RelCasError::RelationNotFound(index) => format!(
                "RelationNotFound: no relation annotation in sentence #{}",
                index
            ),
            RelCasError::AmbiguousRelation(index, count) => format!(
                "AmbiguousRelation: sentence #{} holds {} relation annotations, expected exactly one",
                index, count
            ),
            RelCasError::SofaMismatch(msg) => format!("SofaMismatch: {}", msg),
            RelCasError::LineError(line, err) => {
                format!("line {}: {}", line, String::from(err.as_ref()))
            }
            RelCasError::HandleError(msg) => format!("HandleError: {}", msg),
            RelCasError::MalformedAnnotation(id, msg) => {
                format!("MalformedAnnotation: {} ({})", id, msg)
            }
            RelCasError::IOError(err, filename, msg) => {
                format!("IOError: {} ({}): {}", filename, msg, err)
            }
            RelCasError::JsonError(err, filename, msg) => {
                format!("JsonError: {} ({}): {}", filename, msg, err)
            }
            RelCasError::XmlError(err, filename, msg) => {
                format!("XmlError: {} ({}): {}", filename, msg, err)
            }
            RelCasError::SerializationError(msg) => format!("SerializationError: {}", msg),
            RelCasError::OtherError(msg) => format!("OtherError: {}", msg),
        }
    }
}

impl fmt::Display for RelCasError {
    /// Formats the error message for printing
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let errmsg: String = String::from(self);
        write!(f, "[RelCasError] {}", errmsg)
    }
}

impl Error for RelCasError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IOError(err, ..) => Some(err),
            Self::JsonError(err, ..) => Some(err),
            Self::XmlError(err, ..) => Some(err),
            Self::LineError(_, err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
