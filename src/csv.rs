/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! CSV serialisation of the [`ChangeLog`]: one row per changed field.

use csv;
use sealed::sealed;
use serde::Serialize;
use std::borrow::Cow;
use std::io::Write;

use crate::changes::ChangeLog;
use crate::config::Config;
use crate::error::RelCasError;
use crate::file::*;
use crate::types::*;

#[derive(Serialize)]
struct ChangeCsv<'a> {
    #[serde(rename = "Line")]
    line: usize,
    #[serde(rename = "Field")]
    field: &'a str,
    #[serde(rename = "Old")]
    old: Cow<'a, str>,
    #[serde(rename = "New")]
    new: Cow<'a, str>,
}

/// Values are written as compact JSON, except plain strings which are written as-is
fn cell(value: &serde_json::Value) -> Cow<'_, str> {
    match value {
        serde_json::Value::String(s) => Cow::Borrowed(s.as_str()),
        value => Cow::Owned(value.to_string()),
    }
}

#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait ToCsv: TypeInfo {
    /// Writes CSV output to the writer
    fn to_csv_writer<W>(&self, writer: W) -> Result<(), RelCasError>
    where
        W: std::io::Write;

    /// Writes CSV output to a file
    fn to_csv_file(&self, filename: &str, config: &Config) -> Result<(), RelCasError> {
        debug(config, || {
            format!("{}.to_csv_file: filename={:?}", Self::typeinfo(), filename)
        });
        let mut writer = open_file_writer(filename, config)?;
        self.to_csv_writer(&mut writer)?;
        writer.flush().map_err(|e| {
            RelCasError::IOError(e, filename.to_string(), "Flushing CSV output failed")
        })
    }

    /// Writes CSV output to a string
    fn to_csv_string(&self) -> Result<String, RelCasError> {
        let mut buffer: Vec<u8> = Vec::new();
        self.to_csv_writer(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            RelCasError::SerializationError(format!("CSV output is not valid UTF-8: {}", e))
        })
    }
}

#[sealed]
impl ToCsv for ChangeLog {
    fn to_csv_writer<W>(&self, writer: W) -> Result<(), RelCasError>
    where
        W: std::io::Write,
    {
        let mut writer = csv::Writer::from_writer(writer);
        if self.is_empty() {
            //make sure the header is there even if there are no rows
            writer
                .write_record(["Line", "Field", "Old", "New"])
                .map_err(|e| {
                    RelCasError::SerializationError(format!("Failure serializing CSV: {:?}", e))
                })?;
        }
        for (line, changes) in self.iter() {
            for change in changes.iter() {
                writer
                    .serialize(ChangeCsv {
                        line,
                        field: change.field,
                        old: cell(&change.old),
                        new: cell(&change.new),
                    })
                    .map_err(|e| {
                        RelCasError::SerializationError(format!(
                            "Failure serializing CSV: {:?}",
                            e
                        ))
                    })?;
            }
        }
        writer.flush().map_err(|e| {
            RelCasError::IOError(e, "(csv)".to_string(), "Flushing CSV output failed")
        })
    }
}
