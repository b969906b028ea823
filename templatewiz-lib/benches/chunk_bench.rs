extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use templatewiz_lib::chunker::chunk;
use templatewiz_lib::style::color_filter::filter;
use templatewiz_lib::style::reducer::reduce;
use templatewiz_lib::tokenizer::Tokenizer;

/// Whitespace word count keeps the benchmark about packing, not BPE.
struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn truncate(&self, text: &str, max_tokens: usize) -> String {
        text.split_whitespace()
            .take(max_tokens)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn large_stylesheet(rules: usize) -> String {
    let mut css = String::from(":root { --brand: #ff5500; --ink: #222; }\n");
    for i in 0..rules {
        css.push_str(&format!(
            ".card-{i} {{ color: #{:06x}; padding: {i}px; border-top: 1px solid #ccc; }}\n",
            i * 7919 % 0xffffff
        ));
        css.push_str(&format!(".grid-{i} {{ display: grid; gap: {i}px; }}\n"));
    }
    css
}

fn bench_filter(c: &mut Criterion) {
    let rules = reduce(&large_stylesheet(10_000));
    c.bench_function("filter_10k_rules", |b| b.iter(|| filter(&rules)));
}

fn bench_chunk(c: &mut Criterion) {
    let blocks = filter(&reduce(&large_stylesheet(10_000)));
    c.bench_function("chunk_3600_tokens", |b| {
        b.iter(|| chunk(&blocks, 3600, &WordTokenizer).count())
    });
}

criterion_group!(benches, bench_filter, bench_chunk);
criterion_main!(benches);
