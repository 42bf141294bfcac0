/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains the type system: it names the annotation types and their features, and
//! produces the [`AnnotationFactory`] through which all annotations are created.
//!
//! Four logical kinds of annotation are used: spans (entities), relations, sentences and tokens.
//! Which type in the type system implements which kind is configured with [`TypeNames`]; the
//! factory validates these eagerly, so a mismatch is reported before any line is processed.

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::sync::Arc;

use crate::annotation::{Annotation, AnnotationHandle, AnnotationKind, AnnotationType};
use crate::config::Config;
use crate::error::RelCasError;
use crate::file::*;
use crate::json::ToJson;
use crate::types::*;

pub const DEFAULT_SPAN_TYPE: &str = "custom.Span";
pub const DEFAULT_RELATION_TYPE: &str = "custom.Relation";
pub const DEFAULT_SENTENCE_TYPE: &str = "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Sentence";
pub const DEFAULT_TOKEN_TYPE: &str = "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Token";

/// Supertype of all annotation types, provides `begin` and `end`
pub const ANNOTATION_BASE_TYPE: &str = "uima.tcas.Annotation";

pub const LABEL_FEATURE: &str = "label";
pub const GOVERNOR_FEATURE: &str = "Governor";
pub const DEPENDENT_FEATURE: &str = "Dependent";

/// Names the types in the type system that implement each of the four kinds of annotation
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TypeNames {
    pub span: String,
    pub relation: String,
    pub sentence: String,
    pub token: String,
}

impl Default for TypeNames {
    fn default() -> Self {
        Self {
            span: DEFAULT_SPAN_TYPE.to_string(),
            relation: DEFAULT_RELATION_TYPE.to_string(),
            sentence: DEFAULT_SENTENCE_TYPE.to_string(),
            token: DEFAULT_TOKEN_TYPE.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FeatureDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

impl FeatureDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            range: None,
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TypeDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(default)]
    pub features: Vec<FeatureDescription>,
}

impl TypeDescription {
    /// Creates a new annotation type (derived from the base annotation type)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertype: Some(ANNOTATION_BASE_TYPE.to_string()),
            features: Vec::new(),
        }
    }

    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn with_feature(mut self, feature: FeatureDescription) -> Self {
        self.features.push(feature);
        self
    }
}

/// A type system: the annotation types that may be used, and their features.
///
/// It can be read from a UIMA type system description (XML), or from JSON. The JSON representation is `{ "types": [ { "name": .., "supertype": .., "features": [ { "name": .., "range": .. } ] } ] }`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TypeSystem {
    types: Vec<TypeDescription>,
}

impl Default for TypeSystem {
    /// The default type system holds the four default types with the features they require.
    fn default() -> Self {
        Self::new()
            .with_type(
                TypeDescription::new(DEFAULT_SPAN_TYPE)
                    .with_feature(FeatureDescription::new(LABEL_FEATURE).with_range("uima.cas.String")),
            )
            .with_type(
                TypeDescription::new(DEFAULT_RELATION_TYPE)
                    .with_feature(
                        FeatureDescription::new(GOVERNOR_FEATURE).with_range(DEFAULT_SPAN_TYPE),
                    )
                    .with_feature(
                        FeatureDescription::new(DEPENDENT_FEATURE).with_range(DEFAULT_SPAN_TYPE),
                    )
                    .with_feature(FeatureDescription::new(LABEL_FEATURE).with_range("uima.cas.String")),
            )
            .with_type(TypeDescription::new(DEFAULT_SENTENCE_TYPE))
            .with_type(TypeDescription::new(DEFAULT_TOKEN_TYPE))
    }
}

impl TypeSystem {
    /// Creates an empty type system
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Adds a type, replacing any existing type of the same name
    pub fn with_type(mut self, typedescription: TypeDescription) -> Self {
        self.types.retain(|t| t.name != typedescription.name);
        self.types.push(typedescription);
        self
    }

    /// Loads a type system from a JSON file
    pub fn from_json_file(filename: &str, config: &Config) -> Result<Self, RelCasError> {
        let reader = open_file_reader(filename, config)?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            RelCasError::JsonError(e, filename.to_string(), "Reading type system from file")
        })
    }

    /// Loads a type system from a JSON string
    pub fn from_json_str(string: &str) -> Result<Self, RelCasError> {
        let deserializer = &mut serde_json::Deserializer::from_str(string);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            RelCasError::JsonError(e, "(string)".to_string(), "Reading type system from string")
        })
    }

    /// Loads a type system from file, UIMA type system XML if the extension is `.xml`, JSON otherwise
    pub fn from_file(filename: &str, config: &Config) -> Result<Self, RelCasError> {
        if extension(filename) == Some("xml") {
            Self::from_xml_file(filename, config)
        } else {
            Self::from_json_file(filename, config)
        }
    }

    /// Loads a type system from a UIMA type system description (XML) file
    pub fn from_xml_file(filename: &str, config: &Config) -> Result<Self, RelCasError> {
        debug(config, || format!("TypeSystem::from_xml_file: {}", filename));
        let reader = open_file_reader(filename, config)?;
        Self::from_xml_reader(reader, filename)
    }

    /// Loads a type system from a UIMA type system description (XML) string
    pub fn from_xml_str(string: &str) -> Result<Self, RelCasError> {
        Self::from_xml_reader(string.as_bytes(), "(string)")
    }

    /// Reads a UIMA type system description. Only the type names, supertypes and features (with
    /// their ranges) are read; descriptions, imports and allowed values are ignored.
    pub fn from_xml_reader<R: BufRead>(reader: R, filename: &str) -> Result<Self, RelCasError> {
        let mut reader = Reader::from_reader(reader);
        reader.trim_text(true);
        let xml_error =
            |e: quick_xml::Error| RelCasError::XmlError(e, filename.to_string(), "Reading type system");

        let mut typesystem = Self::new();
        //names of the currently open elements
        let mut path: Vec<Vec<u8>> = Vec::new();
        let mut current_type: Option<TypeDescription> = None;
        let mut current_feature: Option<FeatureDescription> = None;
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Start(e) => {
                    match e.local_name().as_ref() {
                        b"typeDescription" => {
                            current_type = Some(TypeDescription {
                                name: String::new(),
                                supertype: None,
                                features: Vec::new(),
                            })
                        }
                        b"featureDescription" => current_feature = Some(FeatureDescription::new("")),
                        _ => {}
                    }
                    path.push(e.local_name().as_ref().to_vec());
                }
                Event::End(_) => {
                    match path.pop().as_deref() {
                        Some(b"featureDescription") => {
                            if let (Some(feature), Some(t)) =
                                (current_feature.take(), current_type.as_mut())
                            {
                                t.features.push(feature);
                            }
                        }
                        Some(b"typeDescription") => {
                            if let Some(t) = current_type.take() {
                                if t.name.is_empty() {
                                    return Err(RelCasError::SchemaMismatch(
                                        filename.to_string(),
                                        "type description without a name",
                                    ));
                                }
                                typesystem = typesystem.with_type(t);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(xml_error)?.into_owned();
                    typesystem_text(&path, text, &mut current_type, &mut current_feature);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    typesystem_text(&path, text, &mut current_type, &mut current_feature);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        if path.is_empty() {
            Ok(typesystem)
        } else {
            Err(RelCasError::SchemaMismatch(
                filename.to_string(),
                "type system description ends prematurely",
            ))
        }
    }

    /// Returns a type by name
    pub fn get(&self, name: &str) -> Option<&TypeDescription> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn types(&self) -> std::slice::Iter<'_, TypeDescription> {
        self.types.iter()
    }

    /// Tests whether a type has a feature, either directly or inherited from one of its supertypes
    pub fn has_feature(&self, typename: &str, feature: &str) -> bool {
        let mut current = self.get(typename);
        //bounded, a cyclic hierarchy must not hang us
        for _ in 0..=self.types.len() {
            match current {
                Some(t) => {
                    if t.features.iter().any(|f| f.name == feature) {
                        return true;
                    }
                    current = t.supertype.as_deref().and_then(|s| self.get(s));
                }
                None => return false,
            }
        }
        false
    }

    /// Validates the type names against this type system and returns a factory for annotations of these types
    pub fn factory(&self, names: &TypeNames) -> Result<SchemaFactory, RelCasError> {
        let valid_name = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .map_err(|_| RelCasError::OtherError("Unable to compile type name expression"))?;
        let required: [(&String, &[&str]); 4] = [
            (&names.span, &[LABEL_FEATURE]),
            (&names.relation, &[GOVERNOR_FEATURE, DEPENDENT_FEATURE, LABEL_FEATURE]),
            (&names.sentence, &[]),
            (&names.token, &[]),
        ];
        for (name, features) in required.iter() {
            if !valid_name.is_match(name) {
                return Err(RelCasError::SchemaMismatch(
                    name.to_string(),
                    "not a valid type name",
                ));
            }
            if self.get(name).is_none() {
                return Err(RelCasError::SchemaMismatch(
                    name.to_string(),
                    "type not found in type system",
                ));
            }
            for feature in features.iter() {
                if !self.has_feature(name, feature) {
                    return Err(RelCasError::SchemaMismatch(
                        format!("{}:{}", name, feature),
                        "required feature not found in type system",
                    ));
                }
            }
        }
        let distinct: std::collections::HashSet<&String> =
            required.iter().map(|(name, _)| *name).collect();
        if distinct.len() != required.len() {
            return Err(RelCasError::SchemaMismatch(
                format!("{:?}", names),
                "each kind of annotation needs a distinct type",
            ));
        }
        Ok(SchemaFactory {
            span: names.span.as_str().into(),
            relation: names.relation.as_str().into(),
            sentence: names.sentence.as_str().into(),
            token: names.token.as_str().into(),
        })
    }
}

/// Assigns element text in a type system description to the type or feature being read
fn typesystem_text(
    path: &[Vec<u8>],
    text: String,
    current_type: &mut Option<TypeDescription>,
    current_feature: &mut Option<FeatureDescription>,
) {
    let (element, parent) = match path {
        [.., parent, element] => (element.as_slice(), parent.as_slice()),
        _ => return,
    };
    match (parent, element, current_feature.as_mut(), current_type.as_mut()) {
        (b"featureDescription", b"name", Some(feature), _) => feature.name = text,
        (b"featureDescription", b"rangeTypeName", Some(feature), _) => feature.range = Some(text),
        (b"typeDescription", b"name", _, Some(t)) => t.name = text,
        (b"typeDescription", b"supertypeName", _, Some(t)) => t.supertype = Some(text),
        _ => {}
    }
}

#[sealed]
impl TypeInfo for TypeSystem {
    fn typeinfo() -> Type {
        Type::TypeSystem
    }
}

impl ToJson for TypeSystem {}

/// Produces annotation records for the four logical kinds of annotation.
/// Implementations are expected to have validated their types up front, construction itself can not fail.
pub trait AnnotationFactory {
    /// Creates a head or tail entity annotation
    fn entity(&self, span: Span, label: &str) -> Annotation;

    /// Creates a relation annotation between two entity annotations
    fn relation(
        &self,
        span: Span,
        governor: AnnotationHandle,
        dependent: AnnotationHandle,
        label: &str,
    ) -> Annotation;

    fn sentence(&self, span: Span) -> Annotation;

    fn token(&self, span: Span) -> Annotation;

    /// Determines which kind of annotation a type implements, if any
    fn kind_of(&self, typename: &str) -> Option<AnnotationType>;
}

impl<T: AnnotationFactory + ?Sized> AnnotationFactory for &T {
    fn entity(&self, span: Span, label: &str) -> Annotation {
        (**self).entity(span, label)
    }

    fn relation(
        &self,
        span: Span,
        governor: AnnotationHandle,
        dependent: AnnotationHandle,
        label: &str,
    ) -> Annotation {
        (**self).relation(span, governor, dependent, label)
    }

    fn sentence(&self, span: Span) -> Annotation {
        (**self).sentence(span)
    }

    fn token(&self, span: Span) -> Annotation {
        (**self).token(span)
    }

    fn kind_of(&self, typename: &str) -> Option<AnnotationType> {
        (**self).kind_of(typename)
    }
}

/// The [`AnnotationFactory`] produced by a [`TypeSystem`], see [`TypeSystem::factory()`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFactory {
    span: Arc<str>,
    relation: Arc<str>,
    sentence: Arc<str>,
    token: Arc<str>,
}

impl SchemaFactory {
    /// Returns the name of the type that implements the specified kind of annotation
    pub fn typename(&self, annotationtype: AnnotationType) -> &str {
        match annotationtype {
            AnnotationType::Entity => &*self.span,
            AnnotationType::Relation => &*self.relation,
            AnnotationType::Sentence => &*self.sentence,
            AnnotationType::Token => &*self.token,
        }
    }
}

impl AnnotationFactory for SchemaFactory {
    fn entity(&self, span: Span, label: &str) -> Annotation {
        Annotation::new(
            self.span.clone(),
            span,
            AnnotationKind::Entity {
                label: label.to_string(),
            },
        )
    }

    fn relation(
        &self,
        span: Span,
        governor: AnnotationHandle,
        dependent: AnnotationHandle,
        label: &str,
    ) -> Annotation {
        Annotation::new(
            self.relation.clone(),
            span,
            AnnotationKind::Relation {
                label: label.to_string(),
                governor,
                dependent,
            },
        )
    }

    fn sentence(&self, span: Span) -> Annotation {
        Annotation::new(self.sentence.clone(), span, AnnotationKind::Sentence)
    }

    fn token(&self, span: Span) -> Annotation {
        Annotation::new(self.token.clone(), span, AnnotationKind::Token)
    }

    fn kind_of(&self, typename: &str) -> Option<AnnotationType> {
        if typename == &*self.span {
            Some(AnnotationType::Entity)
        } else if typename == &*self.relation {
            Some(AnnotationType::Relation)
        } else if typename == &*self.sentence {
            Some(AnnotationType::Sentence)
        } else if typename == &*self.token {
            Some(AnnotationType::Token)
        } else {
            None
        }
    }
}
