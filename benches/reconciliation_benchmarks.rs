use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::BTreeSet;

use slot_booker::booking::BannerClassifier;
use slot_booker::ledger::{parse_ledger, render_ledger, SlotStatus, Timeslot, TimeslotRecord};
use slot_booker::matcher::match_available;
use slot_booker::probe::{parse_vendor_timestamp, AvailableSlot};

fn week_of_slots() -> Vec<Timeslot> {
    let start: Timeslot = "2024-03-18 06:00:00".parse().unwrap();
    (0..7 * 24)
        .map(|i| Timeslot::new(start.at() + chrono::Duration::minutes(i * 60)))
        .collect()
}

fn benchmark_banner_classification(c: &mut Criterion) {
    let classifier = BannerClassifier::default();
    let banners = [
        Some("You are already in class at this time."),
        Some("You are already in the waitlist for this class"),
        Some("Something went wrong, please try again later"),
        None,
    ];

    c.bench_function("banner_classification", |b| {
        b.iter(|| {
            for banner in &banners {
                black_box(classifier.classify(black_box(*banner)));
            }
        })
    });
}

fn benchmark_matching(c: &mut Criterion) {
    let slots = week_of_slots();
    let wishlist: BTreeSet<Timeslot> = slots.iter().step_by(5).copied().collect();
    let available: Vec<AvailableSlot> = slots
        .iter()
        .enumerate()
        .map(|(i, ts)| AvailableSlot::new(*ts, format!("https://book.example.com/{i}"), "Sign up"))
        .collect();

    c.bench_function("match_week_of_availability", |b| {
        b.iter(|| match_available(black_box(&wishlist), black_box(&available)))
    });
}

fn benchmark_ledger_parsing(c: &mut Criterion) {
    let records: Vec<TimeslotRecord> = week_of_slots()
        .into_iter()
        .map(|ts| TimeslotRecord::new(ts, SlotStatus::Wanted))
        .collect();
    let text = render_ledger(&records);

    c.bench_function("parse_week_ledger", |b| {
        b.iter(|| parse_ledger(black_box(&text)))
    });
}

fn benchmark_vendor_timestamp(c: &mut Criterion) {
    c.bench_function("parse_vendor_timestamp", |b| {
        b.iter(|| parse_vendor_timestamp(black_box("Thu. Mar 21, 2024 11:30 AM")))
    });
}

criterion_group!(
    benches,
    benchmark_banner_classification,
    benchmark_matching,
    benchmark_ledger_parsing,
    benchmark_vendor_timestamp
);
criterion_main!(benches);
