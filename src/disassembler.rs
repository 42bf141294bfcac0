/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! The backward pass: disassembles a [`Document`] into line records again, guided by the lines
//! it was originally assembled from.

use std::io::{BufRead, Write};

use crate::changes::ChangeLog;
use crate::config::{Config, Configurable};
use crate::decoder::{decode_line, DecodedLine};
use crate::document::Document;
use crate::error::RelCasError;
use crate::file::*;
use crate::line::{Line, LineKind, LineReader};
use crate::types::*;

/// The result of disassembling a document
#[derive(Debug, Clone)]
pub struct Disassembly {
    /// The reconstructed lines, in the order of the original line file
    pub lines: Vec<DecodedLine>,
    /// The changes compared to the original lines (empty if disabled in the configuration)
    pub changes: ChangeLog,
}

impl Disassembly {
    /// Writes the reconstructed lines as newline-delimited JSON
    pub fn write_lines<W: Write>(&self, mut writer: W) -> Result<(), RelCasError> {
        for decoded in self.lines.iter() {
            let json = decoded.line.to_json_string()?;
            writeln!(writer, "{}", json).map_err(|e| {
                RelCasError::IOError(e, "(writer)".to_string(), "Writing line failed")
            })?;
        }
        Ok(())
    }

    /// Writes the reconstructed lines to a file as newline-delimited JSON
    pub fn to_lines_file(&self, filename: &str, config: &Config) -> Result<(), RelCasError> {
        debug(config, || {
            format!("Disassembly.to_lines_file: filename={:?}", filename)
        });
        let mut writer = open_file_writer(filename, config)?;
        self.write_lines(&mut writer)?;
        writer.flush().map_err(|e| {
            RelCasError::IOError(e, filename.to_string(), "Flushing lines output failed")
        })
    }
}

/// Disassembles a [`Document`] into line records. The sentences of the document are paired, in
/// order of their offsets, with the non-empty lines of the line file the document was assembled from.
pub struct DocumentDisassembler {
    config: Config,
}

impl Default for DocumentDisassembler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DocumentDisassembler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Disassembles a document, guided by the original lines along with their line numbers.
    pub fn disassemble(
        &self,
        document: &Document,
        lines: &[(usize, Line)],
    ) -> Result<Disassembly, RelCasError> {
        let sentences = document.sentences();
        if sentences.len() != lines.len() {
            return Err(RelCasError::AlignmentMismatch {
                sentences: sentences.len(),
                lines: lines.len(),
            });
        }
        let kind: Option<LineKind> = lines.first().map(|(_, line)| line.kind());
        let mut changes = ChangeLog::new();
        let mut decoded_lines = Vec::with_capacity(lines.len());
        for (i, (sentence, (line_number, line))) in sentences.iter().zip(lines.iter()).enumerate() {
            if let Some(kind) = kind {
                if line.kind() != kind {
                    return Err(RelCasError::KindMismatch(*line_number, kind));
                }
            }
            debug(&self.config, || {
                format!(
                    "disassemble: line {} with sentence {}",
                    line_number,
                    sentence.span()
                )
            });
            let decoded = decode_line(document, sentence, i, line, &self.config)
                .map_err(|e| e.at_line(*line_number))?;
            if let Some(linechanges) = decoded.changes.as_ref() {
                debug(&self.config, || {
                    format!("disassemble: line {} has {} changed field(s)", line_number, linechanges.len())
                });
                if self.config.record_changes() {
                    changes.insert(*line_number, linechanges.clone());
                }
            }
            decoded_lines.push(decoded);
        }
        debug(&self.config, || {
            format!(
                "disassemble: {} lines, {} changed",
                decoded_lines.len(),
                changes.len()
            )
        });
        Ok(Disassembly {
            lines: decoded_lines,
            changes,
        })
    }

    /// Disassembles a document, guided by the original lines read from a reader
    pub fn disassemble_reader<R: BufRead>(
        &self,
        document: &Document,
        reader: R,
    ) -> Result<Disassembly, RelCasError> {
        let lines = LineReader::new(reader, "(reader)").collect::<Result<Vec<_>, _>>()?;
        self.disassemble(document, &lines)
    }

    /// Disassembles a document, guided by the original lines read from a file
    pub fn disassemble_file(
        &self,
        document: &Document,
        filename: &str,
    ) -> Result<Disassembly, RelCasError> {
        let reader = open_file_reader(filename, &self.config)?;
        let lines = LineReader::new(reader, filename).collect::<Result<Vec<_>, _>>()?;
        self.disassemble(document, &lines)
    }
}

impl Configurable for DocumentDisassembler {
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
