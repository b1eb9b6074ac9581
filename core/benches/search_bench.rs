use criterion::{criterion_group, criterion_main, Criterion};
use study_search::{MaterialRecord, MaterialType, SearchEngine, SearchOptions};

const SUBJECTS: &[&str] = &["Mathematics", "Physics", "Chemistry", "Biology", "History", "Literature"];
const WORDS: &[&str] = &[
    "vectors", "matrices", "limits", "derivatives", "entropy", "reactions", "cells", "genes",
    "empires", "poetry", "integrals", "forces", "waves", "atoms", "proteins", "revolutions",
];

fn corpus(n: usize) -> Vec<MaterialRecord> {
    (0..n)
        .map(|i| {
            let w = |k: usize| WORDS[(i * 7 + k * 3) % WORDS.len()];
            MaterialRecord::new(
                i as u64,
                format!("{} and {} lecture {i}", w(0), w(1)),
                format!("An introduction to {} with {} and {}", w(2), w(3), w(4)),
                format!("{},{}", w(5), w(6)),
                SUBJECTS[i % SUBJECTS.len()],
                MaterialType::Pdf,
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let materials = corpus(500);
    c.bench_function("build_index_500", |b| {
        b.iter(|| SearchEngine::new().build_index(&materials))
    });
}

fn bench_search(c: &mut Criterion) {
    let materials = corpus(500);
    let engine = SearchEngine::new();
    engine.build_index(&materials).expect("corpus builds");
    c.bench_function("search_500", |b| {
        b.iter(|| engine.search("entropy and waves", &materials, SearchOptions::default()))
    });
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
