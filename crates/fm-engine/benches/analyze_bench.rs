use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fm_catalog::{ItemCatalog, ModifierCatalog};
use fm_core::StatMap;
use fm_engine::ForgeEngine;

fn bench_analyze(c: &mut Criterion) {
    let engine = ForgeEngine::builtin().expect("builtin weights");
    let runes = ModifierCatalog::builtin().expect("builtin runes");
    let items = ItemCatalog::builtin().expect("builtin items");
    let item = items
        .find_by_name("Anneau Royal Gelano")
        .cloned()
        .expect("reference item");
    let targets: StatMap = [
        ("vitalite", 490),
        ("force", 70),
        ("puissance", 40),
        ("dommages", 28),
    ]
    .into_iter()
    .collect();
    let removals: StatMap = [("intelligence", 40), ("chance", 40)].into_iter().collect();

    c.bench_function("analyze royal gelano", |b| {
        b.iter(|| {
            let a = engine.analyze(
                item.clone(),
                targets.clone(),
                runes.as_slice(),
                removals.clone(),
            );
            let _ = black_box(a.map(|a| a.expected_profit()));
        })
    });

    c.bench_function("capacity pre-check", |b| {
        b.iter(|| black_box(engine.check(&item, &targets, &removals)))
    });
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
