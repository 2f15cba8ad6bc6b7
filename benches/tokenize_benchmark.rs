//! Benchmarks for line and block tokenization.
//!
//! Run with: cargo bench
//!
//! The benchmarks build synthetic pages so that tokenization cost is
//! measured without PDF decoding.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sempdf::model::{Character, Color, Document, Font, FontFace, Line, Page, Position, Rectangle};
use sempdf::{NullObserver, Pipeline, PipelineOptions};

/// A page filled with `line_count` lines of running text.
fn build_page(number: u32, line_count: usize) -> Page {
    let font = Arc::new(Font::from_base_name("font-0", "Times-Roman"));
    let mut page = Page::letter(number);

    for line in 0..line_count {
        let y = 720.0 - line as f32 * 12.0;
        let mut x = 72.0;
        for i in 0..60 {
            let glyph = if i % 6 == 5 { " " } else { "a" };
            page.characters.push(Character {
                glyph: glyph.to_string(),
                position: Position::new(number, Rectangle::new(x, y, x + 5.0, y + 10.0)),
                font_face: FontFace::new(font.clone(), 10.0),
                color: Color::new("color-0", [0, 0, 0]),
                baseline: Line::horizontal(x, x + 5.0, y),
                rotation: 0,
            });
            x += 5.0;
        }
    }

    page
}

fn build_document(pages: usize, lines_per_page: usize) -> Document {
    let mut doc = Document::new();
    for n in 0..pages {
        doc.add_page(build_page(n as u32 + 1, lines_per_page));
    }
    doc
}

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("pipeline_1_page_50_lines", |b| {
        b.iter(|| {
            let mut doc = build_document(1, 50);
            Pipeline::new(PipelineOptions::new().sequential())
                .process(black_box(&mut doc))
                .unwrap();
            black_box(doc)
        })
    });

    c.bench_function("pipeline_10_pages_50_lines", |b| {
        b.iter(|| {
            let mut doc = build_document(10, 50);
            Pipeline::new(PipelineOptions::new().sequential())
                .process(black_box(&mut doc))
                .unwrap();
            black_box(doc)
        })
    });
}

fn bench_line_tokenizer(c: &mut Criterion) {
    use sempdf::tokenize::{LineTokenizer, TokenizerConfig};

    let page = build_page(1, 50);
    let tokenizer = LineTokenizer::new(TokenizerConfig::default());

    c.bench_function("line_tokenize_50_lines", |b| {
        b.iter(|| black_box(tokenizer.tokenize(black_box(&page), &NullObserver)))
    });
}

criterion_group!(benches, bench_pipeline, bench_line_tokenizer);
criterion_main!(benches);
