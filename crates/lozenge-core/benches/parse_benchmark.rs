//! Benchmarks for tokenizing, parsing and printing lozenge documents
//!
//! Run with: cargo bench -p lozenge-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lozenge_core::{Parser, Printer, Tokenizer};

/// Sample post, shaped like the blog posts the notation was written for
const SAMPLE: &str = r#"◊title§Writing a tiny markup compiler§
◊meta{date: "2024-03-01", tags: ["rust", "parsing",], draft: false, words: 900}

It starts, as these things do, with a ◊em§small§ annoyance. Markdown was
almost enough, but every post wanted one more ◊link{href: "/components"}§custom component§.

◊aside{kind: 'note'}§
The sigil is a lozenge, ◊code§\◊§, and scopes are delimited by ◊code§\§§.

Escapes keep both usable as plain characters.§

◊figure{src: "/img/tree.png", alt: "A parse tree", width: 640, height: 480}§
◊caption§Tokens in, tree out.§§

Paragraphs follow blank lines, and consecutive blank lines collapse.



Which is all there is to it.
"#;

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(SAMPLE.len() as u64));

    group.bench_function("sample", |b| {
        b.iter(|| {
            let tokens = Tokenizer::new(black_box(SAMPLE)).tokenize().unwrap();
            black_box(tokens.len())
        })
    });

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(SAMPLE.len() as u64));

    group.bench_function("sample", |b| {
        let parser = Parser::new();
        b.iter(|| {
            let doc = parser.parse(black_box(SAMPLE)).unwrap();
            black_box(doc.children.len())
        })
    });

    group.finish();
}

fn bench_print(c: &mut Criterion) {
    let doc = Parser::new().parse(SAMPLE).unwrap();
    let printer = Printer::new();

    c.bench_function("print/sample", |b| {
        b.iter(|| black_box(printer.print(black_box(&doc)).len()))
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for size in [1, 5, 10, 20].iter() {
        let content: String = SAMPLE.repeat(*size);
        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("parse", size), &content, |b, content| {
            let parser = Parser::new();
            b.iter(|| {
                let doc = parser.parse(black_box(content)).unwrap();
                black_box(doc.children.len())
            })
        });
    }

    group.finish();
}

fn bench_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("nesting");

    for depth in [8, 64, 512].iter() {
        let content = "◊d§".repeat(*depth) + "x" + &"§".repeat(*depth);
        let parser = Parser::new().with_max_depth(*depth);

        group.bench_with_input(BenchmarkId::new("parse", depth), &content, |b, content| {
            b.iter(|| {
                let doc = parser.parse(black_box(content)).unwrap();
                black_box(doc.children.len())
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_print,
    bench_scaling,
    bench_nesting
);
criterion_main!(benches);
