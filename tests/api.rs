use std::fs;

use relcas::*;

mod common;
use crate::common::*;

fn write_input(name: &str, content: &str) -> Result<String, RelCasError> {
    let filename = tmpfile(name);
    fs::write(&filename, content)
        .map_err(|e| RelCasError::IOError(e, filename.clone(), "writing test input"))?;
    Ok(filename)
}

fn read_output(filename: &str) -> Result<String, RelCasError> {
    fs::read_to_string(filename)
        .map_err(|e| RelCasError::IOError(e, filename.to_string(), "reading test output"))
}

#[test]
fn lines_to_json_document() -> Result<(), RelCasError> {
    let input = write_input("json-lines.jsonl", TOKENIZED)?;
    let output = tmpfile("json-document.json");
    let written = lines_to_document_file(&TypeSystem::default(), &input, &output, &Config::default())?;
    assert_eq!(written, output);
    let document = Document::from_json_file(&written, &factory()?, Config::default())?;
    assert_eq!(document.sentences().len(), 3);
    assert_eq!(document.text(), assemble(TOKENIZED)?.text());
    Ok(())
}

#[test]
fn lines_to_document_appends_json_extension() -> Result<(), RelCasError> {
    let input = write_input("ext-lines.jsonl", RAW)?;
    let output = tmpfile("ext-document");
    let written = lines_to_document_file(&TypeSystem::default(), &input, &output, &Config::default())?;
    assert_eq!(written, format!("{}.json", output));
    assert!(read_output(&written)?.contains("\"Bob met Al Al slept \""));
    Ok(())
}

#[cfg(feature = "xmi")]
#[test]
fn lines_to_xmi_document() -> Result<(), RelCasError> {
    let input = write_input("xmi-lines.jsonl", PARIS)?;
    let output = tmpfile("xmi-document.xmi");
    let written = lines_to_document_file(&TypeSystem::default(), &input, &output, &Config::default())?;
    assert_eq!(written, output);
    let xmi = read_output(&written)?;
    assert!(xmi.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xmi.contains("xmlns:custom=\"http:///custom.ecore\""));
    assert!(xmi.contains(
        "xmlns:type=\"http:///de/tudarmstadt/ukp/dkpro/core/api/segmentation/type.ecore\""
    ));
    assert!(xmi.contains("<cas:NULL xmi:id=\"0\"/>"));
    assert!(xmi.contains(
        "<custom:Span xmi:id=\"6\" sofa=\"1\" begin=\"0\" end=\"5\" label=\"Q90\"/>"
    ));
    assert!(xmi.contains(
        "<custom:Relation xmi:id=\"8\" sofa=\"1\" begin=\"13\" end=\"20\" Governor=\"6\" Dependent=\"7\" label=\"P1376\"/>"
    ));
    assert!(xmi.contains("<type:Sentence xmi:id=\"9\" sofa=\"1\" begin=\"0\" end=\"20\"/>"));
    assert!(xmi.contains("sofaString=\"Paris is the capital \""));
    assert!(xmi.contains("<cas:View sofa=\"1\" members=\"2 3 4 5 6 7 8 9\"/>"));
    assert!(xmi.trim_end().ends_with("</xmi:XMI>"));
    Ok(())
}

#[cfg(feature = "xmi")]
#[test]
fn xmi_escapes_text() -> Result<(), RelCasError> {
    let input = r#"{"text":"\"A&B\" <co>","h":{"id":"a&b","pos":[0,5]},"t":{"id":"co","pos":[6,10]},"relation":"<r>"}"#;
    let xmi = assemble(input)?.to_xmi_string()?;
    assert!(xmi.contains("sofaString=\"&quot;A&amp;B&quot; &lt;co&gt; \""));
    assert!(xmi.contains("label=\"a&amp;b\""));
    assert!(xmi.contains("label=\"&lt;r&gt;\""));
    Ok(())
}

#[cfg(feature = "xmi")]
#[test]
fn xmi_namespace_collision() -> Result<(), RelCasError> {
    let typesystem = TypeSystem::default()
        .with_type(
            TypeDescription::new("org.example.custom.Span")
                .with_feature(FeatureDescription::new(LABEL_FEATURE)),
        );
    let names = TypeNames {
        span: "org.example.custom.Span".to_string(),
        ..TypeNames::default()
    };
    let xmi = DocumentAssembler::new(typesystem.factory(&names)?, Config::default())
        .assemble_str(PARIS)?
        .to_xmi_string()?;
    //both packages end in "custom"
    assert!(xmi.contains("xmlns:custom=\"http:///custom.ecore\""));
    assert!(xmi.contains("xmlns:custom2=\"http:///org/example/custom.ecore\""));
    assert!(xmi.contains("<custom2:Span "));
    assert!(xmi.contains("<custom:Relation "));
    Ok(())
}

#[test]
fn document_to_lines_round_trip() -> Result<(), RelCasError> {
    let typesystem = TypeSystem::default();
    let config = Config::default();
    let input = write_input("roundtrip-lines.jsonl", TOKENIZED)?;
    let document = lines_to_document_file(&typesystem, &input, &tmpfile("roundtrip.json"), &config)?;
    let output = tmpfile("roundtrip-output");
    let changes = document_to_lines_file(&typesystem, &document, &input, &output, &config)?;
    assert!(changes.is_empty());

    let result = read_output(&format!("{}.txt", output))?;
    let lines = read_lines(&result)?;
    let originals = read_lines(TOKENIZED)?;
    assert_eq!(lines.len(), originals.len());
    for ((_, line), (_, original)) in lines.iter().zip(originals.iter()) {
        assert_eq!(line.head().pos, original.head().pos);
        assert_eq!(line.tail().pos, original.tail().pos);
        assert_eq!(line.relation(), original.relation());
        assert!(line.head().name.is_some());
    }
    Ok(())
}

#[test]
fn document_to_lines_keeps_txt_extension() -> Result<(), RelCasError> {
    let typesystem = TypeSystem::default();
    let config = Config::default();
    let input = write_input("txt-lines.jsonl", RAW)?;
    let document = lines_to_document_file(&typesystem, &input, &tmpfile("txt.json"), &config)?;
    let output = tmpfile("txt-output.txt");
    document_to_lines_file(&typesystem, &document, &input, &output, &config)?;
    assert_eq!(read_output(&output)?.lines().count(), 2);
    Ok(())
}

#[test]
fn document_to_lines_reports_changes() -> Result<(), RelCasError> {
    let typesystem = TypeSystem::default();
    let config = Config::default().with_compact(true);
    let input = write_input("changes-lines.jsonl", PARIS)?;
    let edited = write_input("changes-edited.jsonl", &PARIS.replace("P1376", "P36"))?;
    let document = lines_to_document_file(&typesystem, &edited, &tmpfile("changes.json"), &config)?;
    let changes = document_to_lines_file(
        &typesystem,
        &document,
        &input,
        &tmpfile("changes-output.txt"),
        &config,
    )?;
    assert_eq!(changes.len(), 1);
    let changelog = tmpfile("changes-log.json");
    changes.to_json_file(&changelog, &config)?;
    let json: serde_json::Value = serde_json::from_str(&read_output(&changelog)?)
        .map_err(|e| RelCasError::SerializationError(e.to_string()))?;
    assert_eq!(json["changes"]["1"]["relation"][0], "P1376");
    assert_eq!(json["changes"]["1"]["relation"][1], "P36");
    Ok(())
}

#[test]
fn document_to_lines_alignment_mismatch() -> Result<(), RelCasError> {
    let typesystem = TypeSystem::default();
    let config = Config::default();
    let input = write_input("mismatch-lines.jsonl", TOKENIZED)?;
    let other = write_input("mismatch-other.jsonl", PARIS)?;
    let document = lines_to_document_file(&typesystem, &input, &tmpfile("mismatch.json"), &config)?;
    assert!(matches!(
        document_to_lines_file(&typesystem, &document, &other, &tmpfile("mismatch-output.txt"), &config),
        Err(RelCasError::AlignmentMismatch { sentences: 3, lines: 1 })
    ));
    Ok(())
}

#[test]
fn conversion_schema_mismatch() -> Result<(), RelCasError> {
    let input = write_input("schema-lines.jsonl", PARIS)?;
    let config = Config::default().with_typenames(TypeNames {
        relation: "custom.Link".to_string(),
        ..TypeNames::default()
    });
    assert!(matches!(
        lines_to_document_file(&TypeSystem::default(), &input, &tmpfile("schema.json"), &config),
        Err(RelCasError::SchemaMismatch(..))
    ));
    Ok(())
}

#[test]
fn missing_input_file() {
    assert!(matches!(
        lines_to_document_file(
            &TypeSystem::default(),
            &tmpfile("does-not-exist.jsonl"),
            &tmpfile("does-not-exist.json"),
            &Config::default()
        ),
        Err(RelCasError::IOError(..))
    ));
}

#[test]
fn workdir_resolution() -> Result<(), RelCasError> {
    let input = write_input("workdir-lines.jsonl", PARIS)?;
    let path = std::path::PathBuf::from(&input);
    let (dir, name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_string_lossy().into_owned()),
        _ => return Err(RelCasError::OtherError("temporary file has no parent")),
    };
    let config = Config::default().with_workdir(dir);
    let document = DocumentAssembler::new(factory()?, config).assemble_file(&name)?;
    assert_eq!(document.sentences().len(), 1);
    Ok(())
}

#[test]
fn typesystem_and_config_files() -> Result<(), RelCasError> {
    let typesystem = TypeSystem::default();
    let filename = tmpfile("typesystem.json");
    typesystem.to_json_file(&filename, &Config::default())?;
    let reloaded = TypeSystem::from_json_file(&filename, &Config::default())?;
    assert_eq!(reloaded, typesystem);

    let config = Config::default().with_separator('\t').with_record_changes(false);
    let filename = tmpfile("config.json");
    config.to_json_file(&filename, &Config::default())?;
    let reloaded = Config::from_file(&filename)?;
    assert_eq!(reloaded.separator(), '\t');
    assert!(!reloaded.record_changes());
    Ok(())
}

const TYPESYSTEM_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<typeSystemDescription xmlns="http://uima.apache.org/resourceSpecifier">
  <name>relations</name>
  <description/>
  <version>1.0</version>
  <types>
    <typeDescription>
      <name>custom.Span</name>
      <description>An entity</description>
      <supertypeName>uima.tcas.Annotation</supertypeName>
      <features>
        <featureDescription>
          <name>label</name>
          <description/>
          <rangeTypeName>uima.cas.String</rangeTypeName>
        </featureDescription>
      </features>
    </typeDescription>
    <typeDescription>
      <name>custom.Relation</name>
      <description/>
      <supertypeName>uima.tcas.Annotation</supertypeName>
      <features>
        <featureDescription>
          <name>Governor</name>
          <description/>
          <rangeTypeName>custom.Span</rangeTypeName>
        </featureDescription>
        <featureDescription>
          <name>Dependent</name>
          <description/>
          <rangeTypeName>custom.Span</rangeTypeName>
        </featureDescription>
        <featureDescription>
          <name>label</name>
          <description/>
          <rangeTypeName>uima.cas.String</rangeTypeName>
        </featureDescription>
      </features>
    </typeDescription>
    <typeDescription>
      <name>de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Sentence</name>
      <description/>
      <supertypeName>uima.tcas.Annotation</supertypeName>
    </typeDescription>
    <typeDescription>
      <name>de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Token</name>
      <description><![CDATA[A token]]></description>
      <supertypeName>uima.tcas.Annotation</supertypeName>
    </typeDescription>
  </types>
</typeSystemDescription>
"#;

#[test]
fn typesystem_from_xml() -> Result<(), RelCasError> {
    let typesystem = TypeSystem::from_xml_str(TYPESYSTEM_XML)?;
    assert_eq!(typesystem, TypeSystem::default());
    assert!(typesystem.has_feature(DEFAULT_RELATION_TYPE, GOVERNOR_FEATURE));
    typesystem.factory(&TypeNames::default())?;
    Ok(())
}

#[test]
fn typesystem_xml_file_conversion() -> Result<(), RelCasError> {
    let filename = write_input("typesystem.xml", TYPESYSTEM_XML)?;
    let typesystem = TypeSystem::from_file(&filename, &Config::default())?;
    let input = write_input("xml-typesystem-lines.jsonl", PARIS)?;
    let written = lines_to_document_file(
        &typesystem,
        &input,
        &tmpfile("xml-typesystem.json"),
        &Config::default(),
    )?;
    let document = Document::from_json_file(&written, &factory()?, Config::default())?;
    assert_eq!(document.sentences().len(), 1);
    Ok(())
}

#[test]
fn typesystem_xml_missing_feature() {
    let xml = TYPESYSTEM_XML.replace("<name>Dependent</name>", "<name>Dependant</name>");
    let typesystem = TypeSystem::from_xml_str(&xml).expect("type system");
    assert!(matches!(
        typesystem.factory(&TypeNames::default()),
        Err(RelCasError::SchemaMismatch(..))
    ));
}

#[test]
fn typesystem_xml_truncated() {
    let truncated = &TYPESYSTEM_XML[..TYPESYSTEM_XML.len() / 2];
    assert!(TypeSystem::from_xml_str(truncated).is_err());
}
