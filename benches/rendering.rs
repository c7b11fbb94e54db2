//! Benchmarks for markup scanning and rendering.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use clinmark::markup::MarkupDocument;
use clinmark::render::html::render_html;
use clinmark::render::pdf::{PageCursor, PageStyle, render_markup};

const NOTE: &str = "\
**Assessment**\n\
Patient presents with *mild* hypertension and reports <u>occasional</u> dizziness.\n\
\n\
**Plan**\n\
- continue **lisinopril 10mg** once daily\n\
- reduce sodium intake\n\
1. review in two weeks\n\
2. order lipid panel\n\
\n\
See [guidelines](http://example.com/htn) for titration.\n";

fn bench_scan(c: &mut Criterion) {
    c.bench_function("scan_note", |b| {
        b.iter(|| MarkupDocument::parse(black_box(NOTE)))
    });
}

fn bench_render_html(c: &mut Criterion) {
    let doc = MarkupDocument::parse(NOTE);
    c.bench_function("render_html_note", |b| b.iter(|| render_html(black_box(&doc))));
}

fn bench_render_pdf(c: &mut Criterion) {
    let doc = MarkupDocument::parse(NOTE);
    c.bench_function("render_pdf_note", |b| {
        b.iter(|| {
            let style = PageStyle::default();
            let (mut cursor, fonts) = PageCursor::new("bench", style).unwrap();
            render_markup(
                &mut cursor,
                &fonts,
                black_box(&doc),
                style.margin,
                style.content_width(),
                11.0,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_scan, bench_render_html, bench_render_pdf);
criterion_main!(benches);
