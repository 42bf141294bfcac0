/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Document`]: a single text buffer (the *sofa*) along with all
//! annotations anchored in it by character offsets.

use nanoid::nanoid;
use sealed::sealed;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;

use crate::annotation::{Annotation, AnnotationHandle, AnnotationKind, AnnotationType};
use crate::config::{Config, Configurable};
use crate::error::RelCasError;
use crate::file::*;
use crate::json::ToJson;
use crate::schema::AnnotationFactory;
use crate::text::Text;
use crate::types::*;

/// A document: one text buffer holding the text of all lines, and the annotations on it.
///
/// Documents are built by the [`crate::DocumentAssembler`], which only ever appends text and
/// annotations, and read by the [`crate::DocumentDisassembler`].
#[derive(Debug, Clone)]
pub struct Document {
    id: Option<String>,

    /// The complete text
    text: String,

    /// Length of the text in unicode codepoints
    textlen: usize,

    /// Pairs of (unicode codepoint, byte) positions in the text, sorted, the first is always (0,0).
    /// Used to quickly convert character offsets to byte offsets.
    milestones: Vec<(usize, usize)>,

    /// The annotations, the index corresponds with the [`AnnotationHandle`]
    annotations: Vec<Annotation>,

    /// Maps begin offsets to the annotations beginning there
    positionindex: BTreeMap<usize, SmallVec<[AnnotationHandle; 4]>>,

    config: Config,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Document {
    /// Creates a new empty document
    pub fn new(config: Config) -> Self {
        let id = if config.generate_ids() {
            Some(format!("D{}", nanoid!()))
        } else {
            None
        };
        Self {
            id,
            text: String::new(),
            textlen: 0,
            milestones: vec![(0, 0)],
            annotations: Vec::new(),
            positionindex: BTreeMap::new(),
            config,
        }
    }

    /// Builder pattern to set the public identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Appends a text fragment and returns the character span it occupies
    pub fn append_text(&mut self, fragment: &str) -> Span {
        let begin = self.textlen;
        if !fragment.is_empty() && self.milestones.last() != Some(&(begin, self.text.len())) {
            self.milestones.push((begin, self.text.len()));
        }
        self.text.push_str(fragment);
        self.textlen += fragment.chars().count();
        Span::new(begin, self.textlen)
    }

    /// Appends a single character (such as a separator)
    pub fn append_char(&mut self, c: char) {
        self.text.push(c);
        self.textlen += 1;
    }

    /// Adds an annotation to the document and returns its handle.
    /// The annotation's span must lie within the text, and a relation must refer to existing annotations.
    pub fn insert(&mut self, mut annotation: Annotation) -> Result<AnnotationHandle, RelCasError> {
        if annotation.handle().is_some() {
            return Err(RelCasError::HandleError(
                "annotation is already part of a document",
            ));
        }
        let span = annotation.span();
        if span.end < span.begin || span.end > self.textlen {
            return Err(RelCasError::MalformedSpan(
                span,
                "annotation span out of bounds of the document text",
            ));
        }
        if let AnnotationKind::Relation {
            governor,
            dependent,
            ..
        } = annotation.kind()
        {
            for handle in [governor, dependent] {
                if handle.as_usize() >= self.annotations.len() {
                    return Err(RelCasError::HandleError(
                        "relation refers to an annotation that is not in the document",
                    ));
                }
            }
        }
        let handle = AnnotationHandle::new(self.annotations.len());
        annotation.intid = Some(handle);
        self.positionindex
            .entry(span.begin)
            .or_default()
            .push(handle);
        self.annotations.push(annotation);
        Ok(handle)
    }

    /// Get an annotation by handle
    pub fn get(&self, handle: AnnotationHandle) -> Result<&Annotation, RelCasError> {
        self.annotations
            .get(handle.as_usize())
            .ok_or(RelCasError::HandleError("no such annotation in document"))
    }

    /// Iterate over all annotations, in insertion order
    pub fn annotations(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Iterate over all annotations of a particular type, in insertion order
    pub fn select(&self, annotationtype: AnnotationType) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |a| a.annotationtype() == annotationtype)
    }

    /// Iterate over all annotations of a particular type that lie completely within the span,
    /// ordered by begin offset
    pub fn select_covered(
        &self,
        annotationtype: AnnotationType,
        span: Span,
    ) -> impl Iterator<Item = &Annotation> {
        self.positionindex
            .range(span.begin..span.end.max(span.begin))
            .flat_map(|(_, handles)| handles.iter())
            .filter_map(move |handle| self.annotations.get(handle.as_usize()))
            .filter(move |a| a.annotationtype() == annotationtype && a.end() <= span.end)
    }

    /// Returns all sentence annotations sorted by begin offset (then end offset).
    /// This, and not the insertion order, determines the order of lines.
    pub fn sentences(&self) -> Vec<&Annotation> {
        let mut sentences: Vec<&Annotation> = self.select(AnnotationType::Sentence).collect();
        sentences.sort_by_key(|a| (a.begin(), a.end()));
        sentences
    }

    /// Returns the text covered by an annotation
    pub fn covered_text(&self, annotation: &Annotation) -> Result<&str, RelCasError> {
        self.text_by_span(&annotation.span())
    }

    /// Rebuilds the milestones for the current text, at the configured interval
    fn index_text(&mut self) {
        self.milestones = vec![(0, 0)];
        self.textlen = 0;
        let interval = self.config.milestone_interval();
        for (bytepos, _) in self.text.char_indices() {
            if interval > 0 && self.textlen > 0 && self.textlen % interval == 0 {
                self.milestones.push((self.textlen, bytepos));
            }
            self.textlen += 1;
        }
    }

    /// Reads a document from JSON. Type names are mapped back to kinds of annotation through the
    /// factory; annotations of types the factory doesn't know are skipped.
    ///
    /// Both the document JSON written by [`ToJson`] and UIMA CAS JSON (as exported by UIMA-based
    /// annotation tools) are accepted, the latter is recognised by its `%FEATURE_STRUCTURES` key.
    pub fn from_json_reader<R: BufRead>(
        reader: R,
        factory: &dyn AnnotationFactory,
        config: Config,
        filename: &str,
    ) -> Result<Self, RelCasError> {
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<serde_json::Value, _> = serde_path_to_error::deserialize(deserializer);
        let value = result.map_err(|e| {
            RelCasError::JsonError(e, filename.to_string(), "Reading document from JSON")
        })?;
        let json = if value.get(CAS_FEATURE_STRUCTURES).is_some() {
            debug(&config, || format!("Document: {} is UIMA CAS JSON", filename));
            let result: Result<CasJson, _> = serde_path_to_error::deserialize(value);
            result
                .map_err(|e| {
                    RelCasError::JsonError(e, filename.to_string(), "Reading UIMA CAS JSON")
                })?
                .into_document_json()?
        } else {
            let result: Result<DocumentJson, _> = serde_path_to_error::deserialize(value);
            result.map_err(|e| {
                RelCasError::JsonError(e, filename.to_string(), "Reading document from JSON")
            })?
        };
        json.build(factory, config)
    }

    /// Reads a document from a JSON file (document JSON or UIMA CAS JSON)
    pub fn from_json_file(
        filename: &str,
        factory: &dyn AnnotationFactory,
        config: Config,
    ) -> Result<Self, RelCasError> {
        debug(&config, || format!("Document::from_json_file: {}", filename));
        let reader = open_file_reader(filename, &config)?;
        Self::from_json_reader(reader, factory, config, filename)
    }

    /// Reads a document from a JSON string (document JSON or UIMA CAS JSON)
    pub fn from_json_str(
        string: &str,
        factory: &dyn AnnotationFactory,
        config: Config,
    ) -> Result<Self, RelCasError> {
        Self::from_json_reader(string.as_bytes(), factory, config, "(string)")
    }
}

impl Text for Document {
    fn text(&self) -> &str {
        &self.text
    }

    fn textlen(&self) -> usize {
        self.textlen
    }

    fn utf8byte(&self, charpos: usize) -> Result<usize, RelCasError> {
        if charpos == self.textlen {
            return Ok(self.text.len());
        } else if charpos > self.textlen {
            return Err(RelCasError::MalformedSpan(
                Span::new(charpos, charpos),
                "character position out of bounds of the document text",
            ));
        }
        //find the nearest milestone at or before the position
        let index = self.milestones.partition_point(|(c, _)| *c <= charpos) - 1;
        let (milestone_char, milestone_byte) = self.milestones[index];
        self.text[milestone_byte..]
            .char_indices()
            .nth(charpos - milestone_char)
            .map(|(bytepos, _)| milestone_byte + bytepos)
            .ok_or(RelCasError::OtherError(
                "Document milestones are inconsistent with the text",
            ))
    }
}

impl Configurable for Document {
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

#[sealed]
impl TypeInfo for Document {
    fn typeinfo() -> Type {
        Type::Document
    }
}

impl ToJson for Document {}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Document", 4)?;
        state.serialize_field("@type", "Document")?;
        if let Some(id) = self.id() {
            state.serialize_field("@id", id)?;
        } else {
            state.skip_field("@id")?;
        }
        state.serialize_field("text", &self.text)?;
        state.serialize_field("annotations", &self.annotations)?;
        state.end()
    }
}

/// Helper structure for JSON deserialisation
#[derive(Deserialize)]
struct DocumentJson {
    #[serde(rename = "@id")]
    id: Option<String>,
    text: String,
    #[serde(default)]
    annotations: Vec<AnnotationJson>,
}

#[derive(Deserialize)]
struct AnnotationJson {
    #[serde(rename = "@id")]
    id: usize,
    #[serde(rename = "@type")]
    typename: String,
    begin: usize,
    end: usize,
    label: Option<String>,
    #[serde(rename = "Governor")]
    governor: Option<usize>,
    #[serde(rename = "Dependent")]
    dependent: Option<usize>,
}

impl AnnotationJson {
    /// Entities and relations must carry a label
    fn label(&self) -> Result<&str, RelCasError> {
        self.label.as_deref().ok_or_else(|| {
            RelCasError::MalformedAnnotation(
                format!("{}#{}", self.typename, self.id),
                "annotation has no label",
            )
        })
    }
}

impl DocumentJson {
    fn build(self, factory: &dyn AnnotationFactory, config: Config) -> Result<Document, RelCasError> {
        let mut document = Document::new(config);
        if self.id.is_some() {
            document.id = self.id;
        }
        document.text = self.text;
        document.index_text();

        //relations refer to entities by their @id, so they are added after everything else
        let mut handles: HashMap<usize, AnnotationHandle> = HashMap::new();
        let mut relations: Vec<AnnotationJson> = Vec::new();
        for item in self.annotations {
            let span = Span::new(item.begin, item.end);
            let annotation = match factory.kind_of(&item.typename) {
                Some(AnnotationType::Token) => factory.token(span),
                Some(AnnotationType::Sentence) => factory.sentence(span),
                Some(AnnotationType::Entity) => factory.entity(span, item.label()?),
                Some(AnnotationType::Relation) => {
                    relations.push(item);
                    continue;
                }
                None => {
                    debug(&document.config, || {
                        format!("skipping annotation of unknown type {}", item.typename)
                    });
                    continue;
                }
            };
            if handles.contains_key(&item.id) {
                return Err(RelCasError::HandleError(
                    "annotation identifier occurs more than once in the document",
                ));
            }
            let handle = document.insert(annotation)?;
            handles.insert(item.id, handle);
        }
        for item in relations {
            let resolve = |id: Option<usize>| -> Result<AnnotationHandle, RelCasError> {
                id.and_then(|id| handles.get(&id).copied()).ok_or(
                    RelCasError::HandleError(
                        "relation refers to an annotation that does not exist",
                    ),
                )
            };
            let governor = resolve(item.governor)?;
            let dependent = resolve(item.dependent)?;
            let annotation = factory.relation(
                Span::new(item.begin, item.end),
                governor,
                dependent,
                item.label()?,
            );
            document.insert(annotation)?;
        }
        Ok(document)
    }
}

const CAS_FEATURE_STRUCTURES: &str = "%FEATURE_STRUCTURES";
const CAS_SOFA_TYPE: &str = "uima.cas.Sofa";
const CAS_INITIAL_VIEW: &str = "_InitialView";

/// Helper structure for reading UIMA CAS JSON. Only the parts needed to rebuild a [`Document`] are read.
#[derive(Deserialize)]
struct CasJson {
    #[serde(rename = "%FEATURE_STRUCTURES")]
    feature_structures: Vec<FeatureStructureJson>,
}

#[derive(Deserialize)]
struct FeatureStructureJson {
    #[serde(rename = "%ID")]
    id: usize,
    #[serde(rename = "%TYPE")]
    typename: String,
    #[serde(rename = "@sofa")]
    sofa: Option<usize>,
    begin: Option<usize>,
    end: Option<usize>,
    label: Option<serde_json::Value>,
    #[serde(rename = "@Governor", alias = "Governor")]
    governor: Option<usize>,
    #[serde(rename = "@Dependent", alias = "Dependent")]
    dependent: Option<usize>,
    #[serde(rename = "sofaID")]
    sofa_id: Option<String>,
    #[serde(rename = "sofaString")]
    sofa_string: Option<String>,
}

impl CasJson {
    /// Converts to the document JSON helper structure. Only annotations on the sofa of the initial
    /// view are kept. Offsets in CAS JSON count UTF-16 code units, they are converted to unicode
    /// codepoints.
    fn into_document_json(self) -> Result<DocumentJson, RelCasError> {
        let sofas: Vec<&FeatureStructureJson> = self
            .feature_structures
            .iter()
            .filter(|fs| fs.typename == CAS_SOFA_TYPE)
            .collect();
        let sofa = sofas
            .iter()
            .find(|fs| fs.sofa_id.as_deref() == Some(CAS_INITIAL_VIEW))
            .or(sofas.first())
            .ok_or_else(|| RelCasError::SofaMismatch("UIMA CAS JSON holds no sofa".to_string()))?;
        let sofa_id = sofa.id;
        let text = sofa.sofa_string.clone().ok_or_else(|| {
            RelCasError::SofaMismatch("the sofa in the UIMA CAS JSON has no sofaString".to_string())
        })?;
        let units = Utf16Offsets::new(&text);

        let mut annotations = Vec::new();
        for fs in self.feature_structures {
            let (begin, end) = match (fs.begin, fs.end) {
                (Some(begin), Some(end)) if fs.sofa.unwrap_or(sofa_id) == sofa_id => (begin, end),
                _ => continue,
            };
            annotations.push(AnnotationJson {
                id: fs.id,
                typename: fs.typename,
                begin: units.to_char(begin)?,
                end: units.to_char(end)?,
                label: fs.label.and_then(|v| v.as_str().map(|s| s.to_string())),
                governor: fs.governor,
                dependent: fs.dependent,
            });
        }
        Ok(DocumentJson {
            id: None,
            text,
            annotations,
        })
    }
}

/// Maps UTF-16 code unit offsets to unicode codepoint offsets
struct Utf16Offsets {
    /// The UTF-16 offset at which each character begins, followed by the total length
    starts: Vec<usize>,
}

impl Utf16Offsets {
    fn new(text: &str) -> Self {
        let mut starts = Vec::with_capacity(text.len() + 1);
        let mut cursor = 0;
        for c in text.chars() {
            starts.push(cursor);
            cursor += c.len_utf16();
        }
        starts.push(cursor);
        Self { starts }
    }

    fn to_char(&self, unit: usize) -> Result<usize, RelCasError> {
        self.starts.binary_search(&unit).map_err(|_| {
            RelCasError::MalformedSpan(
                Span::new(unit, unit),
                "UTF-16 offset does not fall on a character boundary of the sofa",
            )
        })
    }
}
