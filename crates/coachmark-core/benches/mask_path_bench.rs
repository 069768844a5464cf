//! Benchmark: mask path interpolation and rasterization.
//!
//! Run with: `cargo bench -p coachmark-core --bench mask_path_bench`
//!
//! A step transition samples the tween once per frame and the renderer
//! rasterizes the result, so both sit on the per-frame path.

use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use coachmark_core::animation::{Animation, PathTween, ease_in_out};
use coachmark_core::geometry::{CornerRadii, Point, Rect};
use coachmark_core::path::{MaskPath, Shape};

fn screen_path(hole: Shape) -> MaskPath {
    MaskPath::new(Rect::from_size(390.0, 844.0))
        .with_hole(hole)
        .with_hole(Shape::rect(Rect::new(16.0, 60.0, 120.0, 44.0)))
}

fn bench_lerp(c: &mut Criterion) {
    let from = screen_path(Shape::rounded_rect(
        Rect::new(20.0, 700.0, 350.0, 60.0),
        CornerRadii::uniform(12.0),
    ));
    let to = screen_path(Shape::circle(Point::new(340.0, 80.0), 32.0));
    c.bench_function("mask_path_lerp", |b| {
        b.iter(|| black_box(from.lerp(black_box(&to), 0.37)));
    });

    let mut tween = PathTween::new(from, to, Duration::from_millis(250)).easing(ease_in_out);
    c.bench_function("path_tween_frame", |b| {
        b.iter(|| {
            tween.tick(Duration::from_micros(16_667));
            if tween.is_complete() {
                tween.reset();
            }
            black_box(tween.sample())
        });
    });
}

fn bench_rasterize(c: &mut Criterion) {
    let path = screen_path(Shape::circle(Point::new(195.0, 420.0), 80.0));
    let mut group = c.benchmark_group("rasterize");
    for (w, h) in [(80usize, 24usize), (390, 844)] {
        group.bench_function(format!("{w}x{h}"), |b| {
            b.iter(|| black_box(path.rasterize(w, h, 179)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lerp, bench_rasterize);
criterion_main!(benches);
