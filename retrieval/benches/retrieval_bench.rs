use criterion::{black_box, criterion_group, criterion_main, Criterion};
use medrag_retrieval::{FlatIndex, HashingEmbedder, RetrievalEngine, SourceDocument};
use std::sync::Arc;

const SYMPTOMS: &[&str] = &[
    "fever", "cough", "headache", "nausea", "fatigue", "rash", "dizziness", "chills",
    "wheezing", "bloating", "insomnia", "palpitations",
];

fn synthetic_corpus(n: usize) -> Vec<SourceDocument> {
    (0..n)
        .map(|i| {
            let text = (0..5)
                .map(|j| SYMPTOMS[(i * 7 + j * 3) % SYMPTOMS.len()])
                .collect::<Vec<_>>()
                .join(", ");
            SourceDocument::new(format!("doc{}.txt", i), text)
        })
        .collect()
}

fn bench_index_search(c: &mut Criterion) {
    let dimension = 384;
    let mut index = FlatIndex::build(dimension).unwrap();
    let vectors: Vec<Vec<f32>> = (0..1000)
        .map(|i| (0..dimension).map(|d| ((i * 31 + d) % 97) as f32).collect())
        .collect();
    index.add(&vectors).unwrap();
    let query: Vec<f32> = (0..dimension).map(|d| (d % 13) as f32).collect();

    c.bench_function("flat_search_1k_384d_k1", |b| {
        b.iter(|| index.search(black_box(&query), 1).unwrap())
    });
}

fn bench_engine_query(c: &mut Criterion) {
    let engine =
        RetrievalEngine::new(Arc::new(HashingEmbedder::with_dimension(384).unwrap())).unwrap();
    engine.index_documents(synthetic_corpus(500)).unwrap();

    c.bench_function("engine_get_similar_document_500", |b| {
        b.iter(|| {
            engine
                .get_similar_document(black_box("I have a fever and a bad cough"))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_index_search, bench_engine_query);
criterion_main!(benches);
