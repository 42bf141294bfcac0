#![allow(dead_code)]
use relcas::*;

use std::path::PathBuf;

pub const PARIS: &str = r#"{"token":["Paris","is","the","capital"],"h":{"id":"Q90","pos":[0,1]},"t":{"id":"Q142","pos":[3,4]},"relation":"P1376"}"#;

pub const TOKENIZED: &str = r#"{"token":["Paris","is","the","capital","of","France"],"h":{"id":"Q90","pos":[0,1]},"t":{"id":"Q142","pos":[5,6]},"relation":"P1376"}
{"token":["a","b","a"],"h":{"id":"A","pos":[2,3]},"t":{"id":"B","pos":[1,2]},"relation":"r"}

{"token":["Amsterdam","is","in","the","Netherlands"],"h":{"id":"Q727","name":"Amsterdam","pos":[0,1]},"t":{"id":"Q55","name":"the Netherlands","pos":[3,5]},"relation":"P17","split":"train"}
"#;

pub const RAW: &str = r#"{"text":"Bob met Al","h":{"id":"bob","pos":[0,3]},"t":{"id":"al","pos":[8,10]},"relation":"met"}
{"text":"Al slept","h":{"id":"al","pos":[0,2]},"t":{"id":"sleep","pos":[3,8]},"relation":"does"}
"#;

pub const NON_ASCII_TOKENIZED: &str = r#"{"token":["Köln","liegt","am","Rhein"],"h":{"id":"Q365","pos":[0,1]},"t":{"id":"Q584","pos":[3,4]},"relation":"P206"}
{"token":["Ærø","ligger","i","Østersøen"],"h":{"id":"Q212","pos":[0,1]},"t":{"id":"Q545","pos":[3,4]},"relation":"P206"}
"#;

pub const NON_ASCII_RAW: &str = r#"{"text":"Zürich ist größer als Genf","h":{"id":"Q72","pos":[0,6]},"t":{"id":"Q71","pos":[22,26]},"relation":"larger"}
{"text":"東京は日本の首都","h":{"id":"Q1490","pos":[0,2]},"t":{"id":"Q17","pos":[3,5]},"relation":"capital_of"}
"#;

pub fn factory() -> Result<SchemaFactory, RelCasError> {
    TypeSystem::default().factory(&TypeNames::default())
}

pub fn assemble(input: &str) -> Result<Document, RelCasError> {
    DocumentAssembler::new(factory()?, Config::default()).assemble_str(input)
}

pub fn read_lines(input: &str) -> Result<Vec<(usize, Line)>, RelCasError> {
    LineReader::new(input.as_bytes(), "test").collect()
}

pub fn disassemble(document: &Document, input: &str) -> Result<Disassembly, RelCasError> {
    DocumentDisassembler::new(Config::default()).disassemble(document, &read_lines(input)?)
}

/// Returns a path in the temporary directory that is unique for the test
pub fn tmpfile(name: &str) -> String {
    let mut path = PathBuf::from(std::env::temp_dir());
    path.push(format!("relcas-test-{}-{}", std::process::id(), name));
    path.to_string_lossy().into_owned()
}
