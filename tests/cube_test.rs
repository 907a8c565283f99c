//! End-to-end regressions against closed-form rigid-body solutions.

use selkie::config::{
    AddedMassSpec, BodySpec, DynamicsSpec, EnvironmentSpec, ForceSpec, PositionSpec,
    RotationsSpec, SimSpec,
};
use selkie::mesh::unit_cube;
use selkie::sim::{self, Sim};
use selkie::solver::{simulate, EulerStepper, Rk4Stepper};

const G: f64 = 9.81;
const RHO: f64 = 1026.;
const MASS: f64 = 1000.;
const L: f64 = 1.;

fn cube_spec(z0: f64, theta0: f64, u0: f64, forces: Vec<ForceSpec>) -> SimSpec {
    let mut inertia = [[0.; 6]; 6];
    for i in 0..3 {
        inertia[i][i] = MASS;
    }
    for i in 3..6 {
        inertia[i][i] = MASS * L * L / 6.;
    }
    SimSpec {
        rotations: RotationsSpec::default(),
        environment: EnvironmentSpec {
            g: G,
            rho: RHO,
            waves: None,
        },
        bodies: vec![BodySpec {
            name: "cube".into(),
            dynamics: DynamicsSpec {
                mass: MASS,
                centre_of_inertia: [0.; 3],
                rigid_body_inertia: inertia,
                added_mass: AddedMassSpec::Matrix([[0.; 6]; 6]),
            },
            position_of_body_frame_relative_to_mesh: Default::default(),
            initial_position: PositionSpec {
                coordinates: [4., 8., z0],
                angle: selkie::config::AngleSpec {
                    phi: 0.,
                    theta: theta0,
                    psi: 0.,
                },
            },
            initial_velocity: [u0, 0., 0., 0., 0., 0.],
            forces,
        }],
    }
}

#[test]
fn falling_ball_follows_the_euler_quadrature() {
    let spec = cube_spec(12., 0., 1., vec![ForceSpec::named("gravity")]);
    let mut sim = Sim::from_spec(&spec, vec![unit_cube()], None).unwrap();
    let x0 = sim.initial_state();
    let res = simulate(&mut sim, &EulerStepper, x0, 0., 10., 1.).unwrap();
    assert_eq!(res.len(), 11);
    for (i, sample) in res.iter().enumerate() {
        let t = i as f64;
        assert_eq!(sample.x.len(), 13);
        assert!((sample.x[sim::x_idx(0)] - (4. + t)).abs() < 1e-10, "i = {i}");
        assert!((sample.x[sim::y_idx(0)] - 8.).abs() < 1e-10, "i = {i}");
        assert!(
            (sample.x[sim::z_idx(0)] - (12. + G * t * (t - 1.) / 2.)).abs() < 1e-10,
            "i = {i}"
        );
        assert!((sample.x[sim::u_idx(0)] - 1.).abs() < 1e-10, "i = {i}");
        assert!((sample.x[sim::w_idx(0)] - G * t).abs() < 1e-10, "i = {i}");
        assert!((sample.x[sim::qr_idx(0)] - 1.).abs() < 1e-10, "i = {i}");
    }
}

#[test]
fn oscillating_cube_matches_the_harmonic_solution() {
    // Released at rest with the top face on the waterline; the restoring
    // force stays linear over the whole oscillation.
    let z0 = L / 2.;
    let spec = cube_spec(
        z0,
        0.,
        0.,
        vec![
            ForceSpec::named("gravity"),
            ForceSpec::named("non-linear hydrostatic (fast)"),
        ],
    );
    let mut sim = Sim::from_spec(&spec, vec![unit_cube()], None).unwrap();
    let mut x0 = sim.initial_state();
    x0[sim::x_idx(0)] = 0.;
    x0[sim::y_idx(0)] = 0.;

    let dt = 0.1;
    let tend = 10.;
    let res = simulate(&mut sim, &Rk4Stepper, x0, 0., tend, dt).unwrap();

    let omega = L * (RHO * G / MASS).sqrt();
    let a = MASS / (RHO * L * L) * (1. - RHO * L * L * L / (2. * MASS));
    let n = (tend / dt + 0.5).floor() as usize + 1;
    assert_eq!(res.len(), n);
    for (i, sample) in res.iter().enumerate() {
        let t = i as f64 * dt;
        let z_expected = (z0 - a) * (omega * t).cos() + a;
        let w_expected = omega * (a - z0) * (omega * t).sin();
        assert!(
            (sample.x[sim::z_idx(0)] - z_expected).abs() < 1e-3,
            "i = {i}: z = {} expected {z_expected}",
            sample.x[sim::z_idx(0)]
        );
        assert!(
            (sample.x[sim::w_idx(0)] - w_expected).abs() < 1e-3,
            "i = {i}"
        );
        assert!((sample.x[sim::x_idx(0)]).abs() < 1e-3, "i = {i}");
        assert!((sample.x[sim::p_idx(0)]).abs() < 1e-3, "i = {i}");
        assert!((sample.x[sim::qr_idx(0)] - 1.).abs() < 1e-10, "i = {i}");
    }
}

#[test]
fn stable_cube_stays_at_its_equilibrium_draft() {
    let z0 = MASS / RHO - L / 2.;
    let spec = cube_spec(
        z0,
        0.,
        0.,
        vec![
            ForceSpec::named("gravity"),
            ForceSpec::named("non-linear hydrostatic (exact)"),
        ],
    );
    let mut sim = Sim::from_spec(&spec, vec![unit_cube()], None).unwrap();
    let mut x0 = sim.initial_state();
    x0[sim::x_idx(0)] = 0.;
    x0[sim::y_idx(0)] = 0.;

    let res = simulate(&mut sim, &Rk4Stepper, x0, 0., 10., 0.1).unwrap();
    for (i, sample) in res.iter().enumerate() {
        assert!(
            (sample.x[sim::z_idx(0)] - z0).abs() < 1e-3,
            "i = {i}: z = {}",
            sample.x[sim::z_idx(0)]
        );
        assert!((sample.x[sim::w_idx(0)]).abs() < 1e-3, "i = {i}");
        assert!((sample.x[sim::u_idx(0)]).abs() < 1e-3, "i = {i}");
        assert!((sample.x[sim::q_idx(0)]).abs() < 1e-3, "i = {i}");
    }
}

#[test]
fn initial_attitude_does_not_change_a_free_fall() {
    let theta = 45_f64.to_radians();
    let spec = cube_spec(12., theta, 0., vec![ForceSpec::named("gravity")]);
    let mut sim = Sim::from_spec(&spec, vec![unit_cube()], None).unwrap();
    let x0 = sim.initial_state();
    let res = simulate(&mut sim, &EulerStepper, x0, 0., 3., 1.).unwrap();
    for (i, sample) in res.iter().enumerate() {
        let t = i as f64;
        let quat_norm_sq = sample.x[sim::qr_idx(0)].powi(2)
            + sample.x[sim::qi_idx(0)].powi(2)
            + sample.x[sim::qj_idx(0)].powi(2)
            + sample.x[sim::qk_idx(0)].powi(2);
        assert!((sample.x[sim::x_idx(0)] - 4.).abs() < 1e-10, "i = {i}");
        assert!(
            (sample.x[sim::z_idx(0)] - (12. + G * t * (t - 1.) / 2.)).abs() < 1e-10,
            "i = {i}"
        );
        assert!((sample.x[sim::p_idx(0)]).abs() < 1e-10, "i = {i}");
        assert!((quat_norm_sq - 1.).abs() < 1e-10, "i = {i}");
    }
}

#[test]
fn singular_total_inertia_aborts_the_build() {
    let mut spec = cube_spec(0., 0., 0., vec![ForceSpec::named("gravity")]);
    // Added mass cancelling the rigid-body heave inertia.
    let mut ma = [[0.; 6]; 6];
    ma[2][2] = -MASS;
    spec.bodies[0].dynamics.added_mass = AddedMassSpec::Matrix(ma);
    let err = Sim::from_spec(&spec, vec![unit_cube()], None).err().unwrap();
    assert!(err.to_string().contains("total inertia"));
}
