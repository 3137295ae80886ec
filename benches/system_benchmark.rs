use criterion::{black_box, criterion_group, criterion_main, Criterion};
use seesaw_balance::fitness::evaluate;
use seesaw_balance::{ControlLoopRunner, PIDController, SetpointProfile, SystemConfig};

fn benchmark_pid_control(c: &mut Criterion) {
    let mut pid = PIDController::new(-10.0, 0.0, -600.0, 5.0);
    c.bench_function("pid_next", |b| b.iter(|| pid.next(black_box(4.8))));
}

fn benchmark_simulation_step(c: &mut Criterion) {
    let config = SystemConfig::default();
    let mut sim = config.build_simulation().unwrap();
    c.bench_function("simulation_next", |b| {
        b.iter(|| sim.next(black_box(Some(1.5)), black_box(0.0)))
    });
}

fn benchmark_fitness(c: &mut Criterion) {
    let setpoints = SetpointProfile::default_steps(60);
    let positions: Vec<f64> = (0..setpoints.len())
        .map(|i| (i as f64 * 0.01).sin() * 5.0)
        .collect();
    c.bench_function("fitness_evaluate_2400", |b| {
        b.iter(|| evaluate(black_box(&positions), black_box(&setpoints), 0.5))
    });
}

fn benchmark_control_loop(c: &mut Criterion) {
    let config = SystemConfig::default();
    let setpoints = SetpointProfile::default_steps(60);
    c.bench_function("control_loop_run_2400", |b| {
        b.iter(|| {
            let mut pid = config.build_controller_for(config.gains(), setpoints[0]);
            let mut sim = config.build_simulation().unwrap();
            ControlLoopRunner::new(&mut pid, &mut sim)
                .run(black_box(&setpoints), None)
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_pid_control,
    benchmark_simulation_step,
    benchmark_fitness,
    benchmark_control_loop
);
criterion_main!(benches);
