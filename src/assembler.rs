/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! The forward pass: assembles line records into a single [`Document`].

use std::io::BufRead;

use crate::config::{Config, Configurable};
use crate::document::Document;
use crate::encoder::encode_line;
use crate::error::RelCasError;
use crate::file::*;
use crate::line::{LineKind, LineReader};
use crate::schema::AnnotationFactory;
use crate::text::Text;
use crate::types::*;

/// Assembles line records into a [`Document`]. Each non-empty line becomes one sentence, lines are
/// joined with the configured separator (which also follows the last line).
///
/// The first line determines the kind (tokenized or raw) of the entire document, a line of the
/// other kind is an error.
pub struct DocumentAssembler<F> {
    factory: F,
    config: Config,
}

impl<F: AnnotationFactory> DocumentAssembler<F> {
    pub fn new(factory: F, config: Config) -> Self {
        Self { factory, config }
    }

    /// Assembles a document from a file holding one JSON line record per line
    pub fn assemble_file(&self, filename: &str) -> Result<Document, RelCasError> {
        let reader = open_file_reader(filename, &self.config)?;
        self.assemble_lines(LineReader::new(reader, filename))
    }

    /// Assembles a document from a reader holding one JSON line record per line
    pub fn assemble_reader<R: BufRead>(&self, reader: R) -> Result<Document, RelCasError> {
        self.assemble_lines(LineReader::new(reader, "(reader)"))
    }

    /// Assembles a document from a string holding one JSON line record per line
    pub fn assemble_str(&self, string: &str) -> Result<Document, RelCasError> {
        self.assemble_lines(LineReader::new(string.as_bytes(), "(string)"))
    }

    fn assemble_lines<R: BufRead>(&self, lines: LineReader<R>) -> Result<Document, RelCasError> {
        let separator = self.config.separator();
        let mut document = Document::new(self.config.clone());
        let mut kind: Option<LineKind> = None;
        let mut count = 0;
        for item in lines {
            let (line_number, line) = item?;
            match kind {
                None => kind = Some(line.kind()),
                Some(kind) if kind != line.kind() => {
                    return Err(RelCasError::KindMismatch(line_number, kind))
                }
                Some(_) => {}
            }
            let offset = document.textlen();
            debug(&self.config, || {
                format!("assemble: line {} at offset {}", line_number, offset)
            });
            let encoded = encode_line(&line, offset, separator)
                .map_err(|e| e.at_line(line_number))?;
            encoded
                .commit(&mut document, &self.factory, separator)
                .map_err(|e| e.at_line(line_number))?;
            count += 1;
        }
        if count == 0 {
            return Err(RelCasError::MalformedLine(
                0,
                "input contains no line records".to_string(),
            ));
        }
        debug(&self.config, || {
            format!(
                "assemble: {} lines, {} characters, {} annotations",
                count,
                document.textlen(),
                document.len()
            )
        });
        Ok(document)
    }
}

impl<F> Configurable for DocumentAssembler<F> {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn set_config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }
}
