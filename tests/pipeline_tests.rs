use carserv::{
    CancellationToken, DistinctMakes, EngineError, IndexStream, Pipeline, Query, RecordStore,
    VehicleRecord,
    matcher::Criterion,
    pipeline::FaultSlot,
};
use rust_decimal::Decimal;
use std::{collections::HashSet, sync::Arc, thread};

fn build_store(rows: &[(&str, &str, i64, u32)]) -> RecordStore {
    RecordStore::new(
        rows.iter()
            .map(|(make, model, price, year)| {
                VehicleRecord::new(*make, *model, Decimal::from(*price), *year, 1)
            })
            .collect(),
    )
    .unwrap()
}

fn sample() -> RecordStore {
    build_store(&[
        ("Ford", "Transit Van", 47000, 2021),
        ("Kia", "Rio", 18000, 2019),
        ("Ford", "Escape", 28000, 2019),
        ("Audi", "A7", 36027, 2021),
        ("Ford", "E-Series Van", 31000, 2016),
        ("Dodge", "Grand Caravan", 33000, 2018),
    ])
}

/// Runs `build` inside a fresh scope with a live token and collects its output.
fn run<'env, F>(store: &'env RecordStore, build: F) -> Vec<usize>
where
    F: for<'scope> FnOnce(&Pipeline<'scope, 'env>) -> IndexStream,
{
    thread::scope(|scope| {
        let pipeline = Pipeline::new(scope, store, CancellationToken::new(), FaultSlot::default());
        build(&pipeline).collect()
    })
}

/// Deterministic pseudo-random makes for property checks.
fn scrambled_makes(n: usize) -> Vec<VehicleRecord> {
    let names = ["Audi", "BMW", "Kia", "Ford", "Honda", "Jeep", "Mazda"];
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    (0..n)
        .map(|i| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let make = names[(seed >> 33) as usize % names.len()];
            VehicleRecord::new(make, format!("M{}", i), Decimal::from(i as i64), 2020, 1)
        })
        .collect()
}

// ============================================================================
// Generator
// ============================================================================

#[test]
fn test_generate_ascending() {
    let store = sample();
    assert_eq!(run(&store, |p| p.generate(6)), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_generate_empty() {
    let store = sample();
    assert!(run(&store, |p| p.generate(0)).is_empty());
}

#[test]
fn test_generate_after_cancel_yields_nothing() {
    let store = sample();
    let token = CancellationToken::new();
    token.cancel();
    let items: Vec<usize> = thread::scope(|scope| {
        let pipeline = Pipeline::new(scope, &store, token.clone(), FaultSlot::default());
        pipeline.generate(1000).collect()
    });
    assert!(items.is_empty());
}

#[test]
fn test_cancel_mid_stream_stops_promptly() {
    let store = sample();
    let token = CancellationToken::new();
    let (head, rest) = thread::scope(|scope| {
        let pipeline = Pipeline::new(scope, &store, token.clone(), FaultSlot::default());
        let mut stream = pipeline.generate(1_000_000);
        let head: Vec<usize> = stream.by_ref().take(2).collect();
        pipeline.token().cancel();
        let rest: Vec<usize> = stream.collect();
        (head, rest)
    });
    assert_eq!(head, vec![0, 1]);
    // At most the value the generator was already offering
    assert!(rest.len() <= 1, "received {} items after cancel", rest.len());
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_filter_make() {
    let store = sample();
    let query = Query::new().with_make("Ford");
    let out = run(&store, |p| p.filter(p.generate(store.len()), Criterion::Make(&query.make)));
    assert_eq!(out, vec![0, 2, 4]);
}

#[test]
fn test_filter_absent_is_pass_through() {
    let store = sample();
    let out = run(&store, |p| p.filter(p.generate(store.len()), Criterion::Model("")));
    assert_eq!(out, vec![0, 1, 2, 3, 4, 5]);

    let out = run(&store, |p| p.filter(p.generate(store.len()), Criterion::Budget(Decimal::ZERO)));
    assert_eq!(out.len(), store.len());

    let out = run(&store, |p| p.filter(p.generate(store.len()), Criterion::Year(0)));
    assert_eq!(out.len(), store.len());
}

#[test]
fn test_chained_filters_and_semantics() {
    let store = sample();
    let query = Query::new().with_make("Ford").with_model("Van");
    let out = run(&store, |p| {
        let makes = p.filter(p.generate(store.len()), Criterion::Make(&query.make));
        p.filter(makes, Criterion::Model(&query.model))
    });
    assert_eq!(out, vec![0, 4]);
}

#[test]
fn test_filter_year_and_budget() {
    let store = sample();
    let out = run(&store, |p| p.filter(p.generate(store.len()), Criterion::Year(2019)));
    assert_eq!(out, vec![1, 2]);

    let out = run(&store, |p| {
        p.filter(p.generate(store.len()), Criterion::Budget(Decimal::from(32000)))
    });
    // Band (28800, 35200)
    assert_eq!(out, vec![4, 5]);
}

#[test]
fn test_filter_any() {
    let store = sample();
    let query = Query::new().with_model("Van").with_year(2019);
    let out = run(&store, |p| p.filter_any(p.generate(store.len()), &query));
    assert_eq!(out, vec![0, 1, 2, 4]);

    let empty = Query::new();
    let out = run(&store, |p| p.filter_any(p.generate(store.len()), &empty));
    assert!(out.is_empty());
}

#[test]
fn test_filter_out_of_range_index_faults() {
    let store = sample();
    let token = CancellationToken::new();
    let faults = FaultSlot::default();
    let query = Query::new().with_make("Ford");

    let out: Vec<usize> = thread::scope(|scope| {
        let pipeline = Pipeline::new(scope, &store, token.clone(), Arc::clone(&faults));
        pipeline
            .filter(pipeline.generate(store.len() + 3), Criterion::Make(&query.make))
            .collect()
    });

    assert!(out.iter().all(|i| *i < store.len()));
    assert!(token.is_cancelled());
    assert_eq!(
        faults.get(),
        Some(&EngineError::IndexOutOfRange { index: 6, len: 6 })
    );
}

// ============================================================================
// Distinct makes and take
// ============================================================================

#[test]
fn test_distinct_make_keeps_first_of_each() {
    let store = sample();
    let records = build_store(&[
        ("Audi", "A4", 1, 2020),
        ("Kia", "Rio", 2, 2020),
        ("Audi", "A6", 3, 2020),
        ("BMW", "X1", 4, 2020),
        ("Kia", "Soul", 5, 2020),
    ]);
    let candidates: Arc<[&VehicleRecord]> = records.records().iter().collect();

    let out = run(&store, |p| p.distinct_make(p.generate(candidates.len()), Arc::clone(&candidates)));
    assert_eq!(out, vec![0, 1, 3]);
}

#[test]
fn test_distinct_make_unique_ordered_subsequence() {
    let store = sample();
    let records = scrambled_makes(200);
    let candidates: Arc<[&VehicleRecord]> = records.iter().collect();

    let out = run(&store, |p| p.distinct_make(p.generate(candidates.len()), Arc::clone(&candidates)));

    let makes: Vec<&str> = out.iter().map(|i| records[*i].make.as_str()).collect();
    let unique: HashSet<&str> = makes.iter().copied().collect();
    assert_eq!(unique.len(), makes.len());
    assert!(out.windows(2).all(|w| w[0] < w[1]));

    let every_make: HashSet<&str> = records.iter().map(|r| r.make.as_str()).collect();
    assert_eq!(unique, every_make);
}

#[test]
fn test_distinct_state_is_per_call() {
    let mut seen = DistinctMakes::new();
    assert!(seen.admit("Audi", 0));
    assert!(!seen.admit("Audi", 4));
    assert!(seen.admit("Kia", 5));
    assert_eq!(seen.first_index("Audi"), Some(0));
    assert_eq!(seen.len(), 2);

    let fresh = DistinctMakes::new();
    assert!(fresh.is_empty());
    assert_eq!(fresh.first_index("Audi"), None);
}

#[test]
fn test_take_bounds() {
    let store = sample();
    assert_eq!(run(&store, |p| p.take(p.generate(10), 3)), vec![0, 1, 2]);
    assert_eq!(run(&store, |p| p.take(p.generate(4), 20)), vec![0, 1, 2, 3]);
    assert!(run(&store, |p| p.take(p.generate(4), 0)).is_empty());
}

#[test]
fn test_take_releases_long_upstream() {
    // Returning at all proves the generator stopped once take was satisfied
    let store = sample();
    let out = run(&store, |p| p.take(p.generate(usize::MAX), 5));
    assert_eq!(out, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_take_does_not_fire_token() {
    let store = sample();
    let token = CancellationToken::new();
    let out: Vec<usize> = thread::scope(|scope| {
        let pipeline = Pipeline::new(scope, &store, token.clone(), FaultSlot::default());
        pipeline.take(pipeline.generate(100), 2).collect()
    });
    assert_eq!(out, vec![0, 1]);
    assert!(!token.is_cancelled());
}

#[test]
fn test_sum_and_resolve() {
    let store = sample();
    let query = Query::new().with_make("Ford");
    let (total, records) = thread::scope(|scope| {
        let pipeline = Pipeline::new(scope, &store, CancellationToken::new(), FaultSlot::default());
        let total = pipeline
            .sum_counts(pipeline.filter(pipeline.generate(store.len()), Criterion::Make(&query.make)))
            .join()
            .unwrap()
            .unwrap();
        let records = pipeline
            .resolve(pipeline.filter(pipeline.generate(store.len()), Criterion::Year(2021)))
            .unwrap();
        (total, records.into_iter().map(|r| r.model.clone()).collect::<Vec<_>>())
    });
    assert_eq!(total, 3);
    assert_eq!(records, vec!["Transit Van".to_string(), "A7".to_string()]);
}
