/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains some common helper functions for dealing with file I/O

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::RelCasError;
use crate::types::*;

/// The serialisation formats for documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// UIMA XMI (write-only)
    Xmi,
    /// Document JSON
    Json,
}

impl DocumentFormat {
    /// Determines the output format from the extension of a filename, and returns it along with the
    /// filename to actually write to. Unknown extensions get JSON, in which case `.json` is appended to the filename.
    pub fn from_path(filename: &str) -> (Self, String) {
        match extension(filename) {
            Some("xmi") => (Self::Xmi, filename.to_string()),
            Some("json") => (Self::Json, filename.to_string()),
            _ => (Self::Json, format!("{}.json", filename)),
        }
    }
}

/// Returns the extension of a filename (everything after the last period of the final path component), if any
pub(crate) fn extension(filename: &str) -> Option<&str> {
    let basename = filename.rsplit(&['/', '\\']).next().unwrap_or(filename);
    basename.rsplit_once('.').map(|(_, ext)| ext)
}

/// Returns the filename to write reconstructed lines to, this is always a `.txt` file.
pub fn lines_output_path(filename: &str) -> String {
    if extension(filename) == Some("txt") {
        filename.to_string()
    } else {
        format!("{}.txt", filename)
    }
}

/// Get a file for reading or writing, this resolves relative files more intelligently
pub(crate) fn get_filepath(filename: &str, workdir: Option<&Path>) -> Result<PathBuf, RelCasError> {
    if filename == "-" {
        //designates stdin or stdout
        return Ok(filename.into());
    }
    if filename.starts_with("https://") || filename.starts_with("http://") {
        return Err(RelCasError::OtherError("Loading URLs is not supported"));
    }
    let path = if let Some(stripped) = filename.strip_prefix("file://") {
        PathBuf::from(stripped)
    } else {
        PathBuf::from(filename)
    };
    if path.is_absolute() {
        Ok(path)
    } else {
        //check whether we can find one in our workdir first
        if let Some(workdir) = workdir {
            let path = workdir.join(&path);
            if path.is_file() {
                //should also work with symlinks
                return Ok(path);
            }
        }

        //final fallback is simply relative to the current working directly
        // we don't test for existance here
        Ok(path)
    }
}

/// Auxiliary function to help open files
pub(crate) fn open_file(filename: &str, config: &Config) -> Result<File, RelCasError> {
    let found_filename = get_filepath(filename, config.workdir())?;
    debug(config, || format!("open_file: {:?}", found_filename));
    File::open(found_filename.as_path()).map_err(|e| {
        RelCasError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for reading failed",
        )
    })
}

/// Auxiliary function to help create files
pub(crate) fn create_file(filename: &str, config: &Config) -> Result<File, RelCasError> {
    let found_filename = get_filepath(filename, config.workdir())?;
    debug(config, || format!("create_file: {:?}", found_filename));
    File::create(found_filename.as_path()).map_err(|e| {
        RelCasError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for writing failed",
        )
    })
}

/// Auxiliary function to help open files
pub(crate) fn open_file_reader(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn BufRead>, RelCasError> {
    if filename == "-" {
        //read from stdin
        Ok(Box::new(std::io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(open_file(filename, config)?)))
    }
}

/// Auxiliary function to help open files
pub(crate) fn open_file_writer(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn Write>, RelCasError> {
    if filename == "-" {
        Ok(Box::new(std::io::stdout()))
    } else {
        Ok(Box::new(BufWriter::new(create_file(filename, config)?)))
    }
}
