/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::RelCasError;
use crate::file::*;
use crate::json::*;
use crate::schema::TypeNames;
use crate::types::*;

pub trait Configurable: Sized {
    //// Obtain the configuration
    fn config(&self) -> &Config;

    //// Obtain the configuration mutably
    fn config_mut(&mut self) -> &mut Config;

    ///Builder pattern to associate a configuration
    fn with_config(mut self, config: Config) -> Self {
        self.set_config(config);
        self
    }

    ///Setter to associate a configuration
    fn set_config(&mut self, config: Config) -> &mut Self;
}

/// This holds the configuration. It is not limited to configuring a single part of the conversion, but unifies all in a single configuration.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Debug mode
    pub(crate) debug: bool,

    /// The working directory
    pub(crate) workdir: Option<PathBuf>,

    /// The character that joins tokens within a line, and lines within a document
    pub(crate) separator: char,

    /// Generate a pseudo-random public identifier for documents that are created without one
    pub(crate) generate_ids: bool,

    /// Collect the changes between the original and the reconstructed lines when disassembling
    pub(crate) record_changes: bool,

    /// Serialise JSON compactly (on a single line) rather than pretty-printed
    pub(crate) compact: bool,

    /// Milestone placement interval (in unicode codepoints) when indexing the text of a loaded document. A low number above zero speeds up offset conversion at the cost of memory.
    pub(crate) milestone_interval: usize,

    /// The names of the annotation types in the type system
    pub(crate) typenames: TypeNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            workdir: None,
            separator: ' ',
            generate_ids: false,
            record_changes: true,
            compact: false,
            milestone_interval: 100,
            typenames: TypeNames::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug mode. In debug mode, verbose output will be printed to standard error output
    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    /// Is debug mode enabled or not?
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Sets the working directory, relative paths are resolved against it first
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    ///  Return the working directory, if set
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(|x| x.as_path())
    }

    /// Sets the separator character placed between tokens and between lines. Do not change this between
    /// assembling a document and disassembling it again!
    pub fn with_separator(mut self, value: char) -> Self {
        self.separator = value;
        self
    }

    /// Returns the separator character
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Generate a public ID for documents that have none
    pub fn with_generate_ids(mut self, value: bool) -> Self {
        self.generate_ids = value;
        self
    }

    /// Is generation of public IDs enabled or not?
    pub fn generate_ids(&self) -> bool {
        self.generate_ids
    }

    /// Collect a change log when disassembling?
    pub fn with_record_changes(mut self, value: bool) -> Self {
        self.record_changes = value;
        self
    }

    /// Is collection of a change log enabled?
    pub fn record_changes(&self) -> bool {
        self.record_changes
    }

    /// Serialise JSON compactly?
    pub fn with_compact(mut self, value: bool) -> Self {
        self.compact = value;
        self
    }

    /// Serialise JSON compactly?
    pub fn compact(&self) -> bool {
        self.compact
    }

    /// Set the configured milestone interval
    pub fn with_milestone_interval(mut self, value: usize) -> Self {
        self.milestone_interval = value;
        self
    }

    /// Return the configured milestone interval
    pub fn milestone_interval(&self) -> usize {
        self.milestone_interval
    }

    /// Sets the names of the four annotation types to use
    pub fn with_typenames(mut self, typenames: TypeNames) -> Self {
        self.typenames = typenames;
        self
    }

    /// Returns the names of the four annotation types to use
    pub fn typenames(&self) -> &TypeNames {
        &self.typenames
    }

    /// Loads configuration from a JSON file
    pub fn from_file(filename: &str) -> Result<Self, RelCasError> {
        let reader = open_file_reader(filename, &Config::default())?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            RelCasError::JsonError(e, filename.to_string(), "Reading config from file")
        })
    }
}

#[sealed]
impl TypeInfo for Config {
    fn typeinfo() -> Type {
        Type::Config
    }
}

impl ToJson for Config {}
