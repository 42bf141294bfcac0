/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains the line records: one JSON object per line, each describing a head entity,
//! a tail entity and the relation between them, over either a list of tokens or a raw text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::io::{BufRead, Lines};

use crate::error::RelCasError;
use crate::types::*;

pub const TOKEN_KEY: &str = "token";
pub const TEXT_KEY: &str = "text";
pub const HEAD_KEY: &str = "h";
pub const TAIL_KEY: &str = "t";
pub const RELATION_KEY: &str = "relation";

/// The kind of a line, determined by which key it carries (`token` or `text`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// The line carries a `token` list, entity positions are token indices
    Tokenized,
    /// The line carries a `text`, entity positions are character offsets
    Raw,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tokenized => write!(f, "tokenized"),
            Self::Raw => write!(f, "raw text"),
        }
    }
}

/// The textual content of a line
#[derive(Debug, Clone, PartialEq)]
pub enum LineContent {
    Tokenized(Vec<String>),
    Raw(String),
}

impl LineContent {
    pub fn kind(&self) -> LineKind {
        match self {
            Self::Tokenized(_) => LineKind::Tokenized,
            Self::Raw(_) => LineKind::Raw,
        }
    }
}

/// A head or tail entity as it appears in a line record.
/// Depending on the kind of line, `pos` holds token indices or character offsets.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EntitySpan {
    pub id: String,

    /// The covered text. Optional in the input, always produced when reconstructing lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub pos: Span,
}

impl EntitySpan {
    pub fn new(id: impl Into<String>, pos: Span) -> Self {
        Self {
            id: id.into(),
            name: None,
            pos,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A single line record.
///
/// The full JSON object the line was parsed from is retained, so keys that are of no concern to us
/// survive when the line is written out again.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    content: LineContent,
    head: EntitySpan,
    tail: EntitySpan,
    relation: String,
    source: Map<String, Value>,
}

impl Line {
    /// Creates a new line record from its components
    pub fn new(
        content: LineContent,
        head: EntitySpan,
        tail: EntitySpan,
        relation: impl Into<String>,
    ) -> Self {
        let mut line = Self {
            content,
            head,
            tail,
            relation: relation.into(),
            source: Map::new(),
        };
        match &line.content {
            LineContent::Tokenized(tokens) => {
                line.source.insert(TOKEN_KEY.to_string(), tokens.clone().into())
            }
            LineContent::Raw(text) => line.source.insert(TEXT_KEY.to_string(), text.clone().into()),
        };
        line.sync_source();
        line
    }

    /// Parses a line record from a string holding a single JSON object.
    /// The line number is only used for error reporting.
    pub fn parse(s: &str, line_number: usize) -> Result<Self, RelCasError> {
        let value: Value = serde_json::from_str(s).map_err(|e| {
            RelCasError::MalformedLine(line_number, format!("invalid JSON: {}", e))
        })?;
        if let Value::Object(map) = value {
            Self::from_map(map, line_number)
        } else {
            Err(RelCasError::MalformedLine(
                line_number,
                "expected a JSON object".to_string(),
            ))
        }
    }

    /// Interprets a parsed JSON object as a line record
    pub fn from_map(map: Map<String, Value>, line_number: usize) -> Result<Self, RelCasError> {
        let content = if let Some(tokens) = map.get(TOKEN_KEY) {
            LineContent::Tokenized(field(tokens, TOKEN_KEY, line_number)?)
        } else if let Some(text) = map.get(TEXT_KEY) {
            LineContent::Raw(field(text, TEXT_KEY, line_number)?)
        } else {
            return Err(RelCasError::MalformedLine(
                line_number,
                format!("neither '{}' nor '{}' key found", TOKEN_KEY, TEXT_KEY),
            ));
        };
        let head = field(required(&map, HEAD_KEY, line_number)?, HEAD_KEY, line_number)?;
        let tail = field(required(&map, TAIL_KEY, line_number)?, TAIL_KEY, line_number)?;
        let relation = field(
            required(&map, RELATION_KEY, line_number)?,
            RELATION_KEY,
            line_number,
        )?;
        Ok(Self {
            content,
            head,
            tail,
            relation,
            source: map,
        })
    }

    pub fn kind(&self) -> LineKind {
        self.content.kind()
    }

    pub fn content(&self) -> &LineContent {
        &self.content
    }

    /// Returns the tokens, if this is a tokenized line
    pub fn tokens(&self) -> Option<&[String]> {
        match &self.content {
            LineContent::Tokenized(tokens) => Some(tokens),
            LineContent::Raw(_) => None,
        }
    }

    pub fn head(&self) -> &EntitySpan {
        &self.head
    }

    pub fn tail(&self) -> &EntitySpan {
        &self.tail
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Returns the JSON value for a key as it was found in the original input (or as set by [`Self::new()`])
    pub fn source_value(&self, key: &str) -> Option<&Value> {
        self.source.get(key)
    }

    /// Returns a copy of this line with head, tail and relation replaced. All other keys remain untouched.
    pub fn with_relation(
        &self,
        head: EntitySpan,
        tail: EntitySpan,
        relation: impl Into<String>,
    ) -> Self {
        let mut line = Self {
            content: self.content.clone(),
            head,
            tail,
            relation: relation.into(),
            source: self.source.clone(),
        };
        line.sync_source();
        line
    }

    /// Writes head, tail and relation back into the JSON object, existing keys keep their position
    fn sync_source(&mut self) {
        self.source
            .insert(HEAD_KEY.to_string(), entity_to_value(&self.head));
        self.source
            .insert(TAIL_KEY.to_string(), entity_to_value(&self.tail));
        self.source
            .insert(RELATION_KEY.to_string(), self.relation.clone().into());
    }

    /// Returns the line as a JSON value
    pub fn to_value(&self) -> Value {
        Value::Object(self.source.clone())
    }

    /// Serialises the line as a single line of JSON (without trailing newline)
    pub fn to_json_string(&self) -> Result<String, RelCasError> {
        serde_json::to_string(&self.source)
            .map_err(|e| RelCasError::SerializationError(format!("Writing line: {}", e)))
    }
}

pub(crate) fn entity_to_value(entity: &EntitySpan) -> Value {
    let mut map = Map::new();
    map.insert("id".to_string(), entity.id.clone().into());
    if let Some(name) = entity.name.as_ref() {
        map.insert("name".to_string(), name.clone().into());
    }
    map.insert(
        "pos".to_string(),
        Value::Array(vec![entity.pos.begin.into(), entity.pos.end.into()]),
    );
    Value::Object(map)
}

fn required<'a>(
    map: &'a Map<String, Value>,
    key: &'static str,
    line_number: usize,
) -> Result<&'a Value, RelCasError> {
    map.get(key).ok_or_else(|| {
        RelCasError::MalformedLine(line_number, format!("missing required key '{}'", key))
    })
}

fn field<'de, T>(value: &'de Value, key: &'static str, line_number: usize) -> Result<T, RelCasError>
where
    T: Deserialize<'de>,
{
    serde_path_to_error::deserialize(value).map_err(|e| {
        RelCasError::MalformedLine(line_number, format!("invalid value for '{}': {}", key, e))
    })
}

/// Iterator over the line records of a reader. Empty lines are skipped, each record comes with its
/// (1-based) physical line number.
pub struct LineReader<R> {
    lines: Lines<R>,
    line_number: usize,
    name: String,
}

impl<R: BufRead> LineReader<R> {
    /// Creates a new line reader, the name is only used for error reporting
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            name: name.into(),
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<(usize, Line), RelCasError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    return Some(Err(RelCasError::IOError(
                        e,
                        self.name.clone(),
                        "Reading line failed",
                    )))
                }
            };
            self.line_number += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Some(Line::parse(line, self.line_number).map(|l| (self.line_number, l)));
        }
    }
}
