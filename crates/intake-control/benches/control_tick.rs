//! 控制循环性能基准测试
//!
//! 虚拟时钟下一次完整运动的开销，以及单次曲线查表的开销。

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use intake_control::{
    Bounds, CalibratedBounds, ControllerConfig, EasingProfile, MotionController, MotionRequest,
    PositionTracker, StatusBoard,
};
use intake_driver::mock::{SimConfig, SimRig};
use std::sync::Arc;

fn bench_easing_lookup(c: &mut Criterion) {
    let profile = EasingProfile::default();
    c.bench_function("easing_speed", |b| {
        let mut offset = 0.0;
        b.iter(|| {
            offset = (offset + 7.3) % 400.0;
            black_box(profile.speed(black_box(offset)))
        })
    });
}

fn bench_full_move(c: &mut Criterion) {
    let tracker = PositionTracker::with_bounds(CalibratedBounds::new(
        Bounds::new(0.0, 500.0),
        Bounds::new(0.0, -500.0),
    ));

    c.bench_function("move_to_bound_close", |b| {
        b.iter(|| {
            let rig = SimRig::new(SimConfig::unbounded(30.0).with_start(500.0, -500.0));
            let mut pair = rig.pair();
            let controller = MotionController::new(rig.clock(), ControllerConfig::default());
            black_box(controller.move_to_bound(&mut pair, &tracker, MotionRequest::close()))
        })
    });

    c.bench_function("move_to_bound_close_with_status", |b| {
        let status = Arc::new(StatusBoard::new());
        b.iter(|| {
            let rig = SimRig::new(SimConfig::unbounded(30.0).with_start(500.0, -500.0));
            let mut pair = rig.pair();
            let controller =
                MotionController::new(rig.clock(), ControllerConfig::default()).with_status(status.clone());
            black_box(controller.move_to_bound(&mut pair, &tracker, MotionRequest::close()))
        })
    });
}

criterion_group!(benches, bench_easing_lookup, bench_full_move);
criterion_main!(benches);
