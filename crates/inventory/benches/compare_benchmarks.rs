use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use kiemke_core::SessionDate;
use kiemke_inventory::{InventoryLineItem, InventorySession, compare_sessions};
use rust_decimal::Decimal;

/// Two sessions of `size` items; a quarter of codes churn between them.
fn sessions(size: usize) -> (InventorySession, InventorySession) {
    let older_date = SessionDate::from_ymd(2024, 5, 1).expect("valid date");
    let newer_date = SessionDate::from_ymd(2024, 6, 1).expect("valid date");

    let older = (0..size)
        .map(|i| {
            InventoryLineItem::new(format!("VT-{i:06}"), format!("Vật tư {i}"))
                .with_quantity(Decimal::from(i as i64 % 97))
        })
        .collect();

    let shift = size / 4;
    let newer = (shift..size + shift)
        .map(|i| {
            InventoryLineItem::new(format!("vt-{i:06}"), format!("Vật tư {i}"))
                .with_quantity(Decimal::from(i as i64 % 89))
        })
        .collect();

    (
        InventorySession::new(older_date, older),
        InventorySession::new(newer_date, newer),
    )
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_sessions");

    for size in [100usize, 1_000, 10_000] {
        let (older, newer) = sessions(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| compare_sessions(black_box(&older), black_box(&newer)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compare);
criterion_main!(benches);
