use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use relcas::{
    Config, DocumentAssembler, DocumentDisassembler, Line, LineReader, TokenOffsets, TypeNames,
    TypeSystem,
};

/// Turns a text into tokenized line records of (at most) `per_line` tokens each
fn make_lines(text: &str, per_line: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut out = String::new();
    for chunk in words.chunks(per_line) {
        let len = chunk.len();
        out.push_str(
            &serde_json::json!({
                "token": chunk,
                "h": { "id": "head", "pos": [0, 1] },
                "t": { "id": "tail", "pos": [len - 1, len] },
                "relation": "rel",
            })
            .to_string(),
        );
        out.push('\n');
    }
    out
}

pub fn bench_conversion(c: &mut Criterion) {
    //a synthetic text with some multi-byte characters, enough to make offset conversion count
    let text: String = (0..20000)
        .map(|i| match i % 5 {
            0 => format!("wörd{} ", i),
            1 => format!("naïve{} ", i),
            _ => format!("w{} ", i),
        })
        .collect();
    let factory = TypeSystem::default()
        .factory(&TypeNames::default())
        .unwrap();

    let mut group = c.benchmark_group("assemble");
    for per_line in [5, 20, 80] {
        let input = make_lines(&text, per_line);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(per_line), &input, |b, input| {
            let assembler = DocumentAssembler::new(&factory, Config::default());
            b.iter(|| {
                let document = assembler.assemble_str(black_box(input)).unwrap();
                assert!(document.len() > 0);
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("disassemble");
    for per_line in [5, 20, 80] {
        let input = make_lines(&text, per_line);
        let document = DocumentAssembler::new(&factory, Config::default())
            .assemble_str(&input)
            .unwrap();
        let lines: Vec<(usize, Line)> = LineReader::new(input.as_bytes(), "bench")
            .collect::<Result<_, _>>()
            .unwrap();
        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(per_line), &lines, |b, lines| {
            let disassembler = DocumentDisassembler::new(Config::default());
            b.iter(|| {
                let disassembly = disassembler
                    .disassemble(black_box(&document), black_box(lines))
                    .unwrap();
                assert!(disassembly.changes.is_empty());
            })
        });
    }
    group.finish();

    let words: Vec<&str> = text.split_whitespace().take(500).collect();
    c.bench_function("token_offsets_map_back", |b| {
        let (_, offsets) = TokenOffsets::join(&words, ' ');
        b.iter(|| {
            let mut sum = 0;
            for offset in offsets.iter() {
                sum += black_box(offsets.token_span(*offset).unwrap()).tokens.begin;
            }
            assert!(sum > 0);
        })
    });
}

criterion_group!(benches, bench_conversion);
criterion_main!(benches);
