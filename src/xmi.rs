/*
    relcas - line records <-> stand-off annotated documents

        Licensed under the GNU General Public License v3
*/

//! This module contains a writer for UIMA XMI, so documents can be consumed by tools in the UIMA
//! ecosystem. Reading XMI is not supported.

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use crate::annotation::{Annotation, AnnotationKind};
use crate::config::Config;
use crate::document::Document;
use crate::error::RelCasError;
use crate::file::*;
use crate::schema::{DEPENDENT_FEATURE, GOVERNOR_FEATURE, LABEL_FEATURE};
use crate::text::Text;
use crate::types::*;

const XMI_NAMESPACE: &str = "http://www.omg.org/XMI";
const CAS_NAMESPACE: &str = "http:///uima/cas.ecore";
const NO_NAMESPACE: &str = "noNamespace";
const SOFA_ID: usize = 1;

/// Escapes an attribute value. Besides the markup characters, whitespace other than the space is
/// written as a character reference, as XML parsers normalise it to spaces in attribute values.
pub(crate) fn escape_attribute(value: &str) -> String {
    let escaped = escape(value);
    if escaped.contains(&['\n', '\r', '\t'][..]) {
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;")
    } else {
        escaped.into_owned()
    }
}

/// Builds an attribute whose value is escaped with [`escape_attribute()`]
fn attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escape_attribute(value).into_bytes()),
    }
}

/// Maps the packages of all type names to namespace prefixes and URIs.
///
/// The prefix is the last segment of the package name. Packages are assigned prefixes in sorted
/// order, a prefix that is already in use for another package is numbered (`type2`, `type3`..).
#[derive(Debug, Default)]
struct Namespaces {
    /// package -> prefix
    prefixes: BTreeMap<String, String>,
}

impl Namespaces {
    fn new<'a>(typenames: impl Iterator<Item = &'a str>) -> Self {
        let packages: BTreeSet<&str> = typenames.map(|t| split_typename(t).0).collect();
        let mut namespaces = Self::default();
        for package in packages {
            let base = package.rsplit('.').next().unwrap_or(package);
            let base = if base.is_empty() { NO_NAMESPACE } else { base };
            let mut prefix = base.to_string();
            let mut n = 1;
            while prefix == "xmi"
                || prefix == "cas"
                || namespaces.prefixes.values().any(|p| *p == prefix)
            {
                n += 1;
                prefix = format!("{}{}", base, n);
            }
            namespaces.prefixes.insert(package.to_string(), prefix);
        }
        namespaces
    }

    /// Returns the qualified element name for a type name
    fn qname(&self, typename: &str) -> String {
        let (package, name) = split_typename(typename);
        let prefix = self
            .prefixes
            .get(package)
            .map(|s| s.as_str())
            .unwrap_or(NO_NAMESPACE);
        format!("{}:{}", prefix, name)
    }

    fn iter(&self) -> impl Iterator<Item = (String, &str)> {
        self.prefixes.iter().map(|(package, prefix)| {
            let uri = if package.is_empty() {
                format!("http:///uima/{}.ecore", NO_NAMESPACE)
            } else {
                format!("http:///{}.ecore", package.replace('.', "/"))
            };
            (uri, prefix.as_str())
        })
    }
}

/// Splits a fully qualified type name into package and short name
fn split_typename(typename: &str) -> (&str, &str) {
    typename.rsplit_once('.').unwrap_or(("", typename))
}

/// The XMI identifier of an annotation, 0 and 1 are taken by `cas:NULL` and the sofa
fn xmi_id(annotation: &Annotation) -> Result<usize, RelCasError> {
    annotation
        .handle()
        .map(|handle| handle.as_usize() + SOFA_ID + 1)
        .ok_or(RelCasError::HandleError(
            "annotation is not part of a document",
        ))
}

fn xml_error(e: quick_xml::Error) -> RelCasError {
    RelCasError::XmlError(e, "(xmi)".to_string(), "Writing XMI failed")
}

impl Document {
    /// Writes the document as UIMA XMI to a writer. All annotations are in the initial view.
    pub fn to_xmi_writer<W: Write>(&self, writer: W) -> Result<(), RelCasError> {
        let namespaces = Namespaces::new(self.annotations().map(|a| a.typename()));
        let mut writer = Writer::new_with_indent(writer, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;

        let mut root = BytesStart::new("xmi:XMI");
        root.push_attribute(attribute("xmlns:xmi", XMI_NAMESPACE));
        root.push_attribute(attribute("xmlns:cas", CAS_NAMESPACE));
        let declarations: Vec<(String, String)> = namespaces
            .iter()
            .map(|(uri, prefix)| (format!("xmlns:{}", prefix), uri))
            .collect();
        for (key, uri) in declarations.iter() {
            root.push_attribute(attribute(key, uri));
        }
        root.push_attribute(attribute("xmi:version", "2.0"));
        writer.write_event(Event::Start(root)).map_err(xml_error)?;

        let mut null = BytesStart::new("cas:NULL");
        null.push_attribute(attribute("xmi:id", "0"));
        writer.write_event(Event::Empty(null)).map_err(xml_error)?;

        let sofa_id = SOFA_ID.to_string();
        let mut members: Vec<String> = Vec::with_capacity(self.len());
        for annotation in self.annotations() {
            let id = xmi_id(annotation)?.to_string();
            let qname = namespaces.qname(annotation.typename());
            let mut element = BytesStart::new(qname.as_str());
            element.push_attribute(attribute("xmi:id", &id));
            element.push_attribute(attribute("sofa", &sofa_id));
            element.push_attribute(attribute("begin", &annotation.begin().to_string()));
            element.push_attribute(attribute("end", &annotation.end().to_string()));
            match annotation.kind() {
                AnnotationKind::Entity { label } => {
                    element.push_attribute(attribute(LABEL_FEATURE, label));
                }
                AnnotationKind::Relation {
                    label,
                    governor,
                    dependent,
                } => {
                    let governor = xmi_id(self.get(*governor)?)?;
                    let dependent = xmi_id(self.get(*dependent)?)?;
                    element.push_attribute(attribute(GOVERNOR_FEATURE, &governor.to_string()));
                    element.push_attribute(attribute(DEPENDENT_FEATURE, &dependent.to_string()));
                    element.push_attribute(attribute(LABEL_FEATURE, label));
                }
                AnnotationKind::Token | AnnotationKind::Sentence => {}
            }
            writer.write_event(Event::Empty(element)).map_err(xml_error)?;
            members.push(id);
        }

        let mut sofa = BytesStart::new("cas:Sofa");
        sofa.push_attribute(attribute("xmi:id", &sofa_id));
        sofa.push_attribute(attribute("sofaNum", "1"));
        sofa.push_attribute(attribute("sofaID", "_InitialView"));
        sofa.push_attribute(attribute("mimeType", "text/plain"));
        sofa.push_attribute(attribute("sofaString", self.text()));
        writer.write_event(Event::Empty(sofa)).map_err(xml_error)?;

        let mut view = BytesStart::new("cas:View");
        view.push_attribute(attribute("sofa", &sofa_id));
        view.push_attribute(attribute("members", &members.join(" ")));
        writer.write_event(Event::Empty(view)).map_err(xml_error)?;

        writer
            .write_event(Event::End(BytesEnd::new("xmi:XMI")))
            .map_err(xml_error)?;
        writer
            .into_inner()
            .write_all(b"\n")
            .map_err(|e| RelCasError::IOError(e, "(xmi)".to_string(), "Writing XMI failed"))
    }
    /// Writes the document as UIMA XMI to a file
    pub fn to_xmi_file(&self, filename: &str, config: &Config) -> Result<(), RelCasError> {
        debug(config, || {
            format!("Document.to_xmi_file: filename={:?}", filename)
        });
        let mut writer = open_file_writer(filename, config)?;
        self.to_xmi_writer(&mut writer)?;
        writer.flush().map_err(|e| {
            RelCasError::IOError(e, filename.to_string(), "Flushing XMI output failed")
        })
    }

    /// Serialises the document as UIMA XMI to a string
    pub fn to_xmi_string(&self) -> Result<String, RelCasError> {
        let mut buffer: Vec<u8> = Vec::new();
        self.to_xmi_writer(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            RelCasError::SerializationError(format!("XMI output is not valid UTF-8: {}", e))
        })
    }
}
