use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use dailyround_catalog::{Offering, PriceEntry, PriceSchedule, Variant};
use dailyround_core::{CalendarDate, OfferingGid, OwnerId, VariantId};
use dailyround_infra::catalog_store::CatalogStore;
use dailyround_infra::query::{self, OfferingFilter};
use dailyround_infra::storage::InMemoryCatalogStorage;

const CATEGORIES: [&str; 5] = ["Dairy", "Bakery", "Fruit", "Vegetables", "Newspaper"];

fn day(offset: u32) -> CalendarDate {
    let month = offset / 28 % 12 + 1;
    let day = offset % 28 + 1;
    CalendarDate::from_raw(20240000 + month * 100 + day)
}

/// Schedule with `entries` offering-wide entries plus one variant entry per ten.
fn schedule(entries: u32, variant: &VariantId) -> PriceSchedule {
    (0..entries)
        .map(|i| {
            let entry = PriceEntry::new(day(i), 100.0 + i as f64, 105.0 + i as f64);
            if i % 10 == 0 {
                entry.for_variant(variant.clone())
            } else {
                entry
            }
        })
        .collect()
}

fn catalog(owner: OwnerId, size: usize) -> Vec<Offering> {
    (0..size)
        .map(|i| {
            let gid = OfferingGid::parse(format!("o-{i:05}")).unwrap();
            let mut o = Offering::new(gid, owner, format!("Item {}", size - i));
            o.category = (i % 7 != 0).then(|| CATEGORIES[i % CATEGORIES.len()].to_string());
            o.is_public = i % 2 == 0;
            o.prices.push(PriceEntry::new(day(0), 10.0, 10.5));
            o
        })
        .collect()
}

fn bench_price_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_resolution");
    let variant = VariantId::parse("v").unwrap();

    for entries in [10u32, 100, 1000].iter() {
        let prices = schedule(*entries, &variant);
        let as_of = day(entries / 2);
        group.bench_with_input(BenchmarkId::new("offering_wide", entries), entries, |b, _| {
            b.iter(|| black_box(prices.resolve(black_box(as_of), None)));
        });
        group.bench_with_input(BenchmarkId::new("variant_fallback", entries), entries, |b, _| {
            b.iter(|| black_box(prices.resolve(black_box(as_of), Some(&variant))));
        });
    }

    group.finish();
}

fn bench_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by_category");
    let owner = OwnerId::new();

    for size in [100usize, 1000, 10000].iter() {
        let offerings = catalog(owner, *size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(query::group_by_category(&offerings)));
        });
    }

    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_offerings");
    let owner = OwnerId::new();
    let filter = OfferingFilter::new().public_only();

    for size in [100usize, 1000, 10000].iter() {
        let store = CatalogStore::new(InMemoryCatalogStorage::new(), owner);
        for offering in catalog(owner, *size) {
            store.create(offering).unwrap();
        }
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("filtered_search", size), size, |b, _| {
            b.iter(|| black_box(store.list_offerings(&filter, black_box("item 1"))));
        });
    }

    group.finish();
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_create");
    let owner = OwnerId::new();

    group.bench_function("create_with_variants", |b| {
        b.iter_with_setup(
            || {
                let store = CatalogStore::new(InMemoryCatalogStorage::new(), owner);
                let mut o = Offering::new(OfferingGid::generate(), owner, "Milk");
                for i in 0..5 {
                    o.add_variant(Variant::new(VariantId::generate(), format!("Pack {i}")));
                }
                o.prices.push(PriceEntry::new(day(0), 50.0, 52.5));
                (store, o)
            },
            |(store, o)| store.create(black_box(o)).unwrap(),
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_price_resolution,
    bench_grouping,
    bench_listing,
    bench_create
);
criterion_main!(benches);
