/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`ToJson`] trait that is used in serialisation to JSON. The actual
//! serialisation is implemented alongside the data structures themselves, not here.

use std::io::Write;

use crate::config::Config;
use crate::error::RelCasError;
use crate::file::*;
use crate::types::*;

pub trait ToJson
where
    Self: TypeInfo + serde::Serialize,
{
    /// Writes a serialisation to any writer
    /// Lower-level function
    fn to_json_writer<W>(&self, writer: W, compact: bool) -> Result<(), RelCasError>
    where
        W: std::io::Write,
    {
        match compact {
            false => serde_json::to_writer_pretty(writer, &self).map_err(|e| {
                RelCasError::SerializationError(format!(
                    "Writing {} to file: {}",
                    Self::typeinfo(),
                    e
                ))
            }),
            true => serde_json::to_writer(writer, &self).map_err(|e| {
                RelCasError::SerializationError(format!(
                    "Writing {} to file: {}",
                    Self::typeinfo(),
                    e
                ))
            }),
        }
    }

    /// Writes this structure to a file, pretty-printed unless `config` says otherwise
    fn to_json_file(&self, filename: &str, config: &Config) -> Result<(), RelCasError> {
        debug(config, || {
            format!("{}.to_json_file: filename={:?}", Self::typeinfo(), filename)
        });
        let mut writer = open_file_writer(filename, config)?;
        self.to_json_writer(&mut writer, config.compact())?;
        writer.flush().map_err(|e| {
            RelCasError::IOError(e, filename.to_string(), "Flushing JSON output failed")
        })
    }

    /// Serializes this structure to one string.
    fn to_json_string(&self, config: &Config) -> Result<String, RelCasError> {
        match config.compact() {
            false => serde_json::to_string_pretty(&self),
            true => serde_json::to_string(&self),
        }
        .map_err(|e| {
            RelCasError::SerializationError(format!(
                "Writing {} to string: {}",
                Self::typeinfo(),
                e
            ))
        })
    }
}
