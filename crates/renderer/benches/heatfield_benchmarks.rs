//! Benchmarks for frame rendering - heat field compositing, clipping and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench heatfield_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use forecast_common::{Bounds, Parameter};
use projection::PixelProjection;
use renderer::{
    composite_heat_field, draw_coordinate_labels, encode_png, Canvas, ClipRegion, HeatFieldConfig,
    LabelConfig,
};
use test_utils::{rainfall_points, rect_layer};

const VIEWPORT: (u32, u32) = (768, 650);

fn kenya_bounds() -> Bounds {
    Bounds::new(33.0, 44.0, -5.2, 5.5)
}

// =============================================================================
// HEAT FIELD BENCHMARKS
// =============================================================================

fn bench_heat_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("heat_field");
    group.sample_size(10);

    let bounds = kenya_bounds();
    let projection = PixelProjection::new(bounds, VIEWPORT.0, VIEWPORT.1).unwrap();
    let config = HeatFieldConfig::default();

    // Point clouds roughly matching 9km, 6km and 3km grids over the domain.
    for (nx, ny) in [(20, 20), (40, 40), (80, 80)] {
        let points = rainfall_points(&bounds, nx, ny);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("rainfall", points.len()),
            &points,
            |b, points| {
                b.iter(|| {
                    let mut canvas = Canvas::new(VIEWPORT.0, VIEWPORT.1).unwrap();
                    composite_heat_field(
                        &mut canvas,
                        &projection,
                        black_box(points),
                        Parameter::Precipitation,
                        &config,
                        None,
                    )
                })
            },
        );
    }

    // Blur cost on its own: a single point with and without passes.
    let single = rainfall_points(&bounds, 1, 1);
    for (name, passes) in [("no_blur", vec![]), ("three_pass", vec![15.0, 10.0, 5.0])] {
        let config = HeatFieldConfig {
            blur_passes: passes,
            ..HeatFieldConfig::default()
        };
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut canvas = Canvas::new(VIEWPORT.0, VIEWPORT.1).unwrap();
                composite_heat_field(
                    &mut canvas,
                    &projection,
                    black_box(&single),
                    Parameter::Precipitation,
                    &config,
                    None,
                )
            })
        });
    }

    group.finish();
}

// =============================================================================
// CLIP BENCHMARKS
// =============================================================================

fn bench_clip_region(c: &mut Criterion) {
    let bounds = kenya_bounds();
    let projection = PixelProjection::new(bounds, VIEWPORT.0, VIEWPORT.1).unwrap();
    let layers: Vec<_> = (0..8)
        .map(|i| {
            let lon = 33.5 + i as f64;
            rect_layer(&format!("territory_{}", i), lon, -4.0, lon + 0.8, 4.0)
        })
        .collect();

    c.bench_function("clip_region_8_layers", |b| {
        b.iter(|| ClipRegion::from_layers(black_box(&layers), &projection))
    });
}

// =============================================================================
// FULL FRAME BENCHMARKS
// =============================================================================

fn bench_full_frame(c: &mut Criterion) {
    let bounds = kenya_bounds();
    let projection = PixelProjection::new(bounds, VIEWPORT.0, VIEWPORT.1).unwrap();
    let points = rainfall_points(&bounds, 40, 40);
    let config = HeatFieldConfig::default();
    let labels = LabelConfig::default();

    let mut group = c.benchmark_group("full_frame");
    group.sample_size(10);
    group.throughput(Throughput::Bytes((VIEWPORT.0 * VIEWPORT.1 * 4) as u64));

    group.bench_function("render_and_encode", |b| {
        b.iter(|| {
            let mut canvas = Canvas::new(VIEWPORT.0, VIEWPORT.1).unwrap();
            composite_heat_field(
                &mut canvas,
                &projection,
                &points,
                Parameter::Precipitation,
                &config,
                None,
            )
            .unwrap();
            draw_coordinate_labels(&mut canvas, &projection, &labels);
            encode_png(black_box(&canvas))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_heat_field, bench_clip_region, bench_full_frame);
criterion_main!(benches);
