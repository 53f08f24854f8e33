use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use wholesale_core::{BatchId, ProductId};
use wholesale_inventory::{ProductStock, ReceiveStock};

/// A ledger of `batches` receipts of 10 units each, one per day.
fn ledger(batches: usize) -> ProductStock {
    let product_id = ProductId::new();
    let mut stock = ProductStock::empty(product_id);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for i in 0..batches {
        stock
            .receive(ReceiveStock {
                batch_id: BatchId::new(),
                product_id,
                quantity_units: 10,
                cost_per_unit: Decimal::new(500 + i as i64, 2),
                purchase_date: start + Duration::days(i as i64),
                occurred_at: at + Duration::seconds(i as i64),
            })
            .unwrap();
    }
    stock
}

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("fifo_plan");
    for batches in [10usize, 100, 1_000] {
        let stock = ledger(batches);
        // Drain half the ledger.
        let qty = (batches as i64 * 10) / 2;
        group.throughput(Throughput::Elements(batches as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batches), &qty, |b, qty| {
            b.iter(|| stock.plan_consumption(black_box(*qty)).unwrap())
        });
    }
    group.finish();
}

fn bench_consume_and_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("fifo_consume_and_diff");
    for batches in [10usize, 100, 1_000] {
        let original = ledger(batches);
        let qty = (batches as i64 * 10) / 2;
        group.bench_with_input(BenchmarkId::from_parameter(batches), &qty, |b, qty| {
            b.iter(|| {
                let mut working = original.clone();
                working.consume(black_box(*qty)).unwrap();
                working.changes_since(&original)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan, bench_consume_and_diff);
criterion_main!(benches);
