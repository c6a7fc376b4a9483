//! Resolver performance benchmarks.
//!
//! Measures end-to-end resolution over synthetic profiles of increasing
//! borehole counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use strata::{
    Borehole, DepthInterval, Location, ProjectMetadata, Resolver, Sample, SegmentationConfig,
    SoilClass, SoilProfile, TestData, TestRecord, TestRecordStore,
};

/// A borehole with a sand layer over a clay layer and a realistic test
/// suite in each.
fn synthetic_borehole(index: usize) -> Borehole {
    let id = format!("B-{index}");
    let sand = Sample::new(format!("{id}-s1"), DepthInterval::new(0.0, 10.0), "sand")
        .with_classification(SoilClass::Sw)
        .with_record(TestRecord::new(
            format!("{id}-spt"),
            format!("{id}-s1"),
            DepthInterval::new(2.0, 3.5),
            TestData::Spt { n_value: 10.0 + (index % 30) as f64 },
        ))
        .with_record(TestRecord::new(
            format!("{id}-md"),
            format!("{id}-s1"),
            DepthInterval::new(4.0, 5.0),
            TestData::MoistureDensity {
                natural_moisture: Some(11.0),
                dry_density: Some(104.0),
                wet_density: Some(116.0),
            },
        ));
    let clay = Sample::new(format!("{id}-s2"), DepthInterval::new(10.0, 20.0), "clay")
        .with_classification(SoilClass::Cl)
        .with_record(TestRecord::new(
            format!("{id}-uc"),
            format!("{id}-s2"),
            DepthInterval::new(12.0, 13.0),
            TestData::UnconfinedCompression { qu: 2000.0 + (index % 10) as f64 * 100.0 },
        ))
        .with_record(TestRecord::new(
            format!("{id}-cn"),
            format!("{id}-s2"),
            DepthInterval::new(15.0, 16.0),
            TestData::Consolidation {
                preconsolidation_pressure: Some(3000.0),
                compression_index: Some(0.3),
                recompression_index: None,
                coefficient_consolidation: Some(0.02),
            },
        ));
    Borehole::new(id, Location::new(0.0, 0.0, 100.0), 20.0)
        .with_sample(sand)
        .with_sample(clay)
}

fn segmented_profile(boreholes: usize) -> SoilProfile {
    let mut store = TestRecordStore::new();
    for index in 0..boreholes {
        store.add_borehole(synthetic_borehole(index));
    }
    let mut profile = SoilProfile::new(ProjectMetadata::new("Bench Site", "24-999"), store);
    for index in 0..boreholes {
        profile
            .segment_borehole(
                &format!("B-{index}"),
                &[0.0, 10.0, 20.0],
                &SegmentationConfig::default(),
            )
            .unwrap();
    }
    profile
}

fn bench_resolve_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_all");
    for boreholes in [1, 10, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(boreholes),
            &boreholes,
            |b, &boreholes| {
                let profile = segmented_profile(boreholes);
                let resolver = Resolver::new();
                b.iter(|| {
                    let mut profile = profile.clone();
                    black_box(resolver.resolve_all(&mut profile))
                });
            },
        );
    }
    group.finish();
}

fn bench_segmentation(c: &mut Criterion) {
    c.bench_function("segment_borehole", |b| {
        let profile = segmented_profile(1);
        b.iter(|| {
            let mut profile = profile.clone();
            black_box(
                profile
                    .segment_borehole(
                        "B-0",
                        &[0.0, 5.0, 10.0, 15.0, 20.0],
                        &SegmentationConfig::default(),
                    )
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, bench_resolve_all, bench_segmentation);
criterion_main!(benches);
