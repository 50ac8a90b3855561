use criterion::{criterion_group, criterion_main, Criterion};
use topone_core::{build_engine, EngineConfig, NormalizationMode, RankingFunction, RawDocument};

const VOCAB: &[&str] = &[
    "river", "mountain", "city", "county", "president", "novel", "opera", "planet", "empire",
    "bridge", "island", "war", "painter", "symphony", "treaty", "canal", "desert", "harbor",
];

fn corpus(n: usize) -> Vec<RawDocument> {
    (0..n)
        .map(|i| {
            let text = (0..60).map(|j| VOCAB[(i * 7 + j * 13) % VOCAB.len()]).collect::<Vec<_>>().join(" ");
            RawDocument { id: format!("Doc {i}"), text }
        })
        .collect()
}

fn bench_retrieve(c: &mut Criterion) {
    for (name, ranking, mode) in [
        ("bm25_none", RankingFunction::Bm25, NormalizationMode::Standard),
        ("classic_stem", RankingFunction::Classic, NormalizationMode::Stem),
        ("bm25_biword", RankingFunction::Bm25, NormalizationMode::Biword),
    ] {
        let engine = build_engine(corpus(2000), EngineConfig::new(ranking, mode), None).expect("build");
        c.bench_function(name, |b| b.iter(|| engine.retrieve("painter of the river island symphony")));
    }
}

criterion_group!(benches, bench_retrieve);
criterion_main!(benches);
