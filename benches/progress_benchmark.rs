use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use summit_tracker::models::{ActivityType, PrimaryMetric, UserData, Workout, WorkoutDetails};
use summit_tracker::services::{challenge, progress};

/// A few years of mixed history: every third workout is a run or walk.
fn history(count: usize) -> Vec<Workout> {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid date");
    (0..count)
        .map(|i| {
            let (activity_type, metric) = match i % 3 {
                0 => (ActivityType::Run, PrimaryMetric::Distance { km: 5.0 + (i % 7) as f64 }),
                1 => (ActivityType::Bike, PrimaryMetric::Energy { kj: 300.0 + (i % 11) as f64 * 40.0 }),
                _ => (ActivityType::Walk, PrimaryMetric::from_miles(2.0)),
            };
            Workout {
                id: format!("w{i}"),
                date: start + chrono::Days::new(i as u64 / 2),
                activity_type,
                metric,
                duration_minutes: Some(45),
                details: WorkoutDetails::default(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            }
        })
        .collect()
}

fn benchmark_totals(c: &mut Criterion) {
    let mut group = c.benchmark_group("progress_totals");

    for count in [100, 1_000, 5_000] {
        let workouts = history(count);
        group.bench_function(format!("{count}_workouts"), |b| {
            b.iter(|| progress::totals(black_box(&workouts), black_box(80.0)))
        });
    }

    group.finish();
}

fn benchmark_apply_and_sync(c: &mut Criterion) {
    let workouts = history(1_000);
    let ids: Vec<String> = workouts.iter().map(|w| w.id.clone()).collect();

    c.bench_function("apply_1000_workouts_to_everest", |b| {
        b.iter(|| {
            let mut data = UserData {
                workouts: workouts.clone(),
                ..Default::default()
            };
            let instance = challenge::activate(&mut data, "climb-everest").expect("builtin template");
            challenge::apply_workouts(
                &mut data,
                &instance.instance_id,
                black_box(&ids),
                80.0,
                "2024-06-01T12:00:00Z",
            )
            .expect("instance exists")
        })
    });
}

criterion_group!(benches, benchmark_totals, benchmark_apply_and_sync);
criterion_main!(benches);
