use seesaw_balance::config::parse_config;
use seesaw_balance::sweep::evaluate_candidate;
use seesaw_balance::{
    create_session, evaluate, run_sweep, AngleActuator, ControlLoopRunner, ControlMode,
    DisturbanceGenerator, FrictionMode, GainRange, PhysicsSimulation, SetpointProfile, SimError,
    SimulationParams, SweepSpec, SystemConfig, TimingMetrics,
};

#[test]
fn disturbance_shifts_baseline() {
    let mut gen = DisturbanceGenerator::new(1).with_noise(0.0, 0.1).unwrap();
    let before = gen.generate();
    gen.inject_disturbance(5.0);
    let after = gen.generate();
    assert!((after - before).abs() > 4.0);
    assert_eq!(gen.get_sequence(), 2);
}

#[test]
fn unusable_noise_amplitude_is_rejected() {
    for amplitude in [f64::NAN, f64::INFINITY, -0.5] {
        let result = DisturbanceGenerator::new(1).with_noise(0.0, amplitude);
        assert!(
            matches!(result, Err(SimError::InvalidArgument(_))),
            "amplitude {amplitude} accepted"
        );
    }
    assert!(DisturbanceGenerator::new(1).with_noise(f64::NAN, 0.5).is_err());

    let gen = DisturbanceGenerator::new(1).with_noise(1.0, 0.0).unwrap();
    assert_eq!(gen.base_force(), 1.0);
    assert_eq!(gen.noise_amplitude(), 0.0);
}

#[test]
fn nan_integral_limit_in_config_is_rejected() {
    let err = parse_config("ki = 1.0\nintegral_limit = nan").unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));
}

#[test]
fn simulation_rejects_hand_built_zero_mass() {
    let params = SimulationParams {
        mass: 0.0,
        delta_t: 1.0 / 60.0,
        friction_coefficient: 0.04,
        friction_mode: FrictionMode::WhenMoving,
        actuator: AngleActuator::new(-60.0, 60.0, 3.0).unwrap(),
    };
    assert!(matches!(
        PhysicsSimulation::new(params),
        Err(SimError::InvalidArgument(_))
    ));
}

#[test]
fn huge_gain_grid_is_rejected() {
    let config = SystemConfig::default();
    let spec = SweepSpec {
        kp: GainRange::new(-20.0, -5.0, 1e-12),
        ki: GainRange::fixed(0.0),
        kd: GainRange::fixed(-600.0),
        workers: 2,
    };
    let metrics = TimingMetrics::new().unwrap();
    let err = run_sweep(&config, &spec, &[5.0; 10], None, &metrics).unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));
}

#[test]
fn injected_force_degrades_fitness() {
    let config = SystemConfig::default();
    let setpoints = SetpointProfile::default_steps(60);
    let mut gen = DisturbanceGenerator::new(3).with_noise(0.0, 0.0).unwrap();
    gen.inject_disturbance(2.0);
    let forces = gen.sequence(setpoints.len());

    let calm = evaluate_candidate(&config, config.gains(), &setpoints, None).unwrap();
    let pushed = evaluate_candidate(&config, config.gains(), &setpoints, Some(&forces)).unwrap();
    assert_ne!(calm.positions, pushed.positions);
}

#[test]
fn non_positive_mass_and_step_are_rejected() {
    let actuator = AngleActuator::new(-60.0, 60.0, 3.0).unwrap();
    for (mass, dt) in [(0.0, 0.1), (-1.0, 0.1), (1.0, 0.0), (1.0, -0.5), (f64::NAN, 0.1)] {
        let err = SimulationParams::new(mass, dt, actuator).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)), "{mass} {dt}");
    }
}

#[test]
fn inverted_angle_limits_are_rejected() {
    assert!(matches!(
        AngleActuator::new(10.0, -10.0, 3.0),
        Err(SimError::InvalidArgument(_))
    ));
    assert!(matches!(
        AngleActuator::new(-10.0, 10.0, -1.0),
        Err(SimError::InvalidArgument(_))
    ));
}

#[test]
fn negative_weight_factor_is_rejected() {
    let err = evaluate(&[1.0], &[2.0], -0.1).unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));

    let err = parse_config("weight_factor = -1.0").unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));
}

#[test]
fn mismatched_fitness_inputs_are_rejected() {
    let err = evaluate(&[1.0, 2.0], &[2.0], 0.5).unwrap_err();
    assert!(matches!(err, SimError::InvalidInput(_)));
}

#[test]
fn bad_gain_range_fails_the_sweep() {
    let config = SystemConfig::default();
    let spec = SweepSpec {
        kp: GainRange::new(-5.0, -10.0, 1.0),
        ki: GainRange::fixed(0.0),
        kd: GainRange::fixed(-600.0),
        workers: 2,
    };
    let metrics = TimingMetrics::new().unwrap();
    let err = run_sweep(&config, &spec, &[5.0; 10], None, &metrics).unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));
    assert_eq!(metrics.evaluations(), 0);

    let zero_step = GainRange::new(0.0, 1.0, 0.0);
    assert!(zero_step.values().is_err());
}

#[test]
fn sweep_rejects_misaligned_forces() {
    let config = SystemConfig::default();
    let metrics = TimingMetrics::new().unwrap();
    let err = run_sweep(
        &config,
        &config.sweep_spec(),
        &[5.0; 10],
        Some(&[0.0; 3]),
        &metrics,
    )
    .unwrap_err();
    assert!(matches!(err, SimError::InvalidInput(_)));
}

#[test]
fn diverging_gains_rank_last() {
    let config = SystemConfig::default();
    // positive kp tilts the seesaw away from the target
    let spec = SweepSpec {
        kp: GainRange::new(-10.0, 10.0, 20.0),
        ki: GainRange::fixed(0.0),
        kd: GainRange::fixed(-600.0),
        workers: 2,
    };
    let setpoints = SetpointProfile::steps(&[5.0, -5.0], 300);
    let metrics = TimingMetrics::new().unwrap();
    let report = run_sweep(&config, &spec, &setpoints, None, &metrics).unwrap();
    assert_eq!(report.best().unwrap().gains.kp, -10.0);
}

#[test]
fn invalid_session_config_is_rejected() {
    let config = SystemConfig {
        max_external_force: -1.0,
        ..SystemConfig::default()
    };
    assert!(matches!(
        create_session(ControlMode::Pid, &config),
        Err(SimError::InvalidArgument(_))
    ));
}

#[test]
fn zero_interval_derivative_does_not_blow_up() {
    let mut pid = seesaw_balance::PIDController::new(-10.0, 0.0, -600.0, 5.0);
    let command = pid.next_time_based(1.0, 0.0);
    assert!(command.is_finite());
    assert_eq!(command, -40.0);
}

#[test]
fn empty_run_yields_empty_trajectory() {
    let config = SystemConfig::default();
    let mut pid = config.build_controller();
    let mut sim = config.build_simulation().unwrap();
    let trajectory = ControlLoopRunner::new(&mut pid, &mut sim)
        .run(&[], None)
        .unwrap();
    assert!(trajectory.is_empty());
    assert_eq!(trajectory.fitness(0.5).unwrap(), 0.0);
}
