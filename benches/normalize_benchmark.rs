use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weather_etl::models::RawObservation;
use weather_etl::processors::{deduplicate, Normalizer};
use weather_etl::store::SqliteStore;
use weather_etl::utils::round_to;

// One reading per city per hour, with every tenth record repeated
fn create_raw_batch(cities: usize, hours: usize) -> Vec<RawObservation> {
    let mut batch = Vec::with_capacity(cities * hours + cities * hours / 10);

    for city in 0..cities {
        for hour in 0..hours {
            let record = RawObservation {
                city: format!("City {}", city),
                lat: 38.0 + city as f64 * 0.123456789,
                lon: -9.0 - city as f64 * 0.987654321,
                time: Some(format!("2024-01-{:02}T{:02}:00", 1 + hour / 24, hour % 24)),
                temperature_2m: Some(10.0 + hour as f64 * 0.137),
                relative_humidity_2m: Some(70.4),
                wind_speed_10m: Some(3.456),
                weather_code: Some([0.0, 3.0, 61.0, 999.0][hour % 4]),
                european_aqi: Some(24.6),
                pm2_5: Some(4.444),
                nitrogen_dioxide: Some(12.005),
                ozone: Some(61.239),
            };

            if hour % 10 == 0 {
                batch.push(record.clone());
            }
            batch.push(record);
        }
    }

    batch
}

fn benchmark_normalize(c: &mut Criterion) {
    let normalizer = Normalizer::new();
    let mut group = c.benchmark_group("normalize_by_size");

    for size in [6, 60, 600].iter() {
        let batch = create_raw_batch(*size, 24);
        group.bench_with_input(BenchmarkId::new("normalize", size), &batch, |b, batch| {
            b.iter(|| normalizer.normalize(black_box(batch)))
        });
    }

    group.finish();
}

fn benchmark_deduplicate(c: &mut Criterion) {
    let rows = Normalizer::new().normalize(&create_raw_batch(100, 48)).rows;
    let mut doubled = rows.clone();
    doubled.extend(rows);

    c.bench_function("deduplicate_doubled_batch", |b| {
        b.iter(|| deduplicate(black_box(doubled.clone())))
    });
}

fn benchmark_rounding(c: &mut Criterion) {
    c.bench_function("round_to_two_places", |b| {
        b.iter(|| {
            (0..1000)
                .map(|i| round_to(black_box(i as f64 * 0.005), 2))
                .sum::<f64>()
        })
    });
}

fn benchmark_merge(c: &mut Criterion) {
    let rows = Normalizer::new().normalize(&create_raw_batch(6, 24)).rows;

    c.bench_function("merge_into_populated_store", |b| {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.merge_batch(&rows).unwrap();
        b.iter(|| store.merge_batch(black_box(&rows)).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_normalize,
    benchmark_deduplicate,
    benchmark_rounding,
    benchmark_merge
);
criterion_main!(benches);
