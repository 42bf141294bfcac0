/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! High-level entry points that convert between files in either direction.

use crate::assembler::DocumentAssembler;
use crate::changes::ChangeLog;
use crate::config::Config;
use crate::disassembler::DocumentDisassembler;
use crate::document::Document;
use crate::error::RelCasError;
use crate::file::*;
use crate::json::ToJson;
use crate::schema::TypeSystem;
use crate::types::*;

/// Assembles the line file `input` into a single document and writes it to `output`.
///
/// The format is chosen by the extension of `output`: `.xmi` gives UIMA XMI, `.json` gives document
/// JSON, anything else gives document JSON in a file with `.json` appended. Returns the name of the
/// file that was written.
pub fn lines_to_document_file(
    typesystem: &TypeSystem,
    input: &str,
    output: &str,
    config: &Config,
) -> Result<String, RelCasError> {
    let factory = typesystem.factory(config.typenames())?;
    let assembler = DocumentAssembler::new(factory, config.clone());
    let document = assembler.assemble_file(input)?;
    let (format, output) = DocumentFormat::from_path(output);
    debug(config, || {
        format!("lines_to_document_file: writing {:?} as {:?}", output, format)
    });
    match format {
        #[cfg(feature = "xmi")]
        DocumentFormat::Xmi => document.to_xmi_file(&output, config)?,
        #[cfg(not(feature = "xmi"))]
        DocumentFormat::Xmi => {
            return Err(RelCasError::OtherError(
                "XMI output requires the xmi feature",
            ))
        }
        DocumentFormat::Json => document.to_json_file(&output, config)?,
    }
    Ok(output)
}

/// Disassembles the document JSON (or UIMA CAS JSON) file `document` back into lines, guided by the line file `input` it
/// was assembled from, and writes the reconstructed lines to `output` (with `.txt` appended unless
/// it already has that extension). Returns the changes compared to the original lines.
pub fn document_to_lines_file(
    typesystem: &TypeSystem,
    document: &str,
    input: &str,
    output: &str,
    config: &Config,
) -> Result<ChangeLog, RelCasError> {
    let factory = typesystem.factory(config.typenames())?;
    let document = Document::from_json_file(document, &factory, config.clone())?;
    let disassembler = DocumentDisassembler::new(config.clone());
    let disassembly = disassembler.disassemble_file(&document, input)?;
    let output = lines_output_path(output);
    disassembly.to_lines_file(&output, config)?;
    Ok(disassembly.changes)
}
