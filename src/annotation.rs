/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Annotation`] records held by a [`crate::Document`].

use sealed::sealed;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::schema::{DEPENDENT_FEATURE, GOVERNOR_FEATURE, LABEL_FEATURE};
use crate::types::*;

/// Refers to an [`Annotation`] in a [`crate::Document`] by index
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct AnnotationHandle(u32);

#[sealed]
impl Handle for AnnotationHandle {
    fn new(intid: usize) -> Self {
        Self(intid as u32)
    }
    fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// What an annotation expresses, along with the data specific to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    Token,
    /// Delimits the region of the document that corresponds to one line record
    Sentence,
    /// A head or tail entity, the label is the entity ID
    Entity { label: String },
    /// A relation between two entities, anchored at the dependent's span.
    /// The entities are referenced, not owned.
    Relation {
        label: String,
        governor: AnnotationHandle,
        dependent: AnnotationHandle,
    },
}

/// See [`AnnotationKind`], this is a simplified variant that carries only the type, not the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationType {
    Token,
    Sentence,
    Entity,
    Relation,
}

impl From<&AnnotationKind> for AnnotationType {
    fn from(kind: &AnnotationKind) -> Self {
        match kind {
            AnnotationKind::Token => Self::Token,
            AnnotationKind::Sentence => Self::Sentence,
            AnnotationKind::Entity { .. } => Self::Entity,
            AnnotationKind::Relation { .. } => Self::Relation,
        }
    }
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Token => "token",
            Self::Sentence => "sentence",
            Self::Entity => "entity",
            Self::Relation => "relation",
        };
        write!(f, "{}", s)
    }
}

/// A single annotation: a character span in the document text, the name of its type in the
/// type system, and its kind-specific data.
///
/// Annotations are created through an [`crate::AnnotationFactory`] and owned by a [`crate::Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub(crate) intid: Option<AnnotationHandle>,
    typename: Arc<str>,
    span: Span,
    kind: AnnotationKind,
}

impl Annotation {
    /// Creates a new unbound annotation. You usually want to obtain annotations from an [`crate::AnnotationFactory`] instead.
    pub fn new(typename: Arc<str>, span: Span, kind: AnnotationKind) -> Self {
        Self {
            intid: None,
            typename,
            span,
            kind,
        }
    }

    /// Returns the handle of this annotation, only available once it has been added to a document
    pub fn handle(&self) -> Option<AnnotationHandle> {
        self.intid
    }

    /// The name of the annotation type in the type system
    pub fn typename(&self) -> &str {
        &self.typename
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn begin(&self) -> usize {
        self.span.begin
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    pub fn kind(&self) -> &AnnotationKind {
        &self.kind
    }

    pub fn annotationtype(&self) -> AnnotationType {
        (&self.kind).into()
    }

    /// Returns the label of entities and relations
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            AnnotationKind::Entity { label } | AnnotationKind::Relation { label, .. } => {
                Some(label.as_str())
            }
            _ => None,
        }
    }

    /// Returns the governor (head entity) of a relation
    pub fn governor(&self) -> Option<AnnotationHandle> {
        match self.kind {
            AnnotationKind::Relation { governor, .. } => Some(governor),
            _ => None,
        }
    }

    /// Returns the dependent (tail entity) of a relation
    pub fn dependent(&self) -> Option<AnnotationHandle> {
        match self.kind {
            AnnotationKind::Relation { dependent, .. } => Some(dependent),
            _ => None,
        }
    }
}

#[sealed]
impl TypeInfo for Annotation {
    fn typeinfo() -> Type {
        Type::Annotation
    }
}

impl Serialize for Annotation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(handle) = self.intid {
            map.serialize_entry("@id", &handle.as_usize())?;
        }
        map.serialize_entry("@type", self.typename())?;
        map.serialize_entry("begin", &self.begin())?;
        map.serialize_entry("end", &self.end())?;
        match &self.kind {
            AnnotationKind::Entity { label } => {
                map.serialize_entry(LABEL_FEATURE, label)?;
            }
            AnnotationKind::Relation {
                label,
                governor,
                dependent,
            } => {
                map.serialize_entry(GOVERNOR_FEATURE, &governor.as_usize())?;
                map.serialize_entry(DEPENDENT_FEATURE, &dependent.as_usize())?;
                map.serialize_entry(LABEL_FEATURE, label)?;
            }
            AnnotationKind::Token | AnnotationKind::Sentence => {}
        }
        map.end()
    }
}
