use chrono::{Duration, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use hearnear::models::ActivityRecord;
use hearnear::services::proximity::rank_by_distance;

/// Listeners scattered on a grid around Warsaw, about 0.01 degrees apart.
fn grid(count: u64) -> Vec<ActivityRecord> {
    let now = Utc::now();
    (0..count)
        .map(|i| ActivityRecord {
            user_id: i + 1,
            latitude: 52.0 + (i % 100) as f64 * 0.01,
            longitude: 20.5 + (i / 100) as f64 * 0.01,
            track_name: format!("Track {}", i),
            artist_name: "Artist".to_string(),
            album_name: None,
            last_updated: now - Duration::seconds((i % 3600) as i64),
        })
        .collect()
}

fn benchmark_rank_by_distance(c: &mut Criterion) {
    let now = Utc::now();
    let origin = ActivityRecord {
        user_id: 0,
        latitude: 52.2297,
        longitude: 21.0122,
        track_name: "Mine".to_string(),
        artist_name: "Me".to_string(),
        album_name: None,
        last_updated: now,
    };

    let mut group = c.benchmark_group("rank_by_distance");

    for count in [100u64, 10_000] {
        let candidates = grid(count);
        group.bench_function(format!("{}_candidates", count), |b| {
            b.iter(|| rank_by_distance(black_box(&origin), candidates.clone(), 50.0, now))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_rank_by_distance);
criterion_main!(benches);
