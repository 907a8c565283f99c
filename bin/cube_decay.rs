use std::{fs::File, io::Write, process};

use selkie::config::{
    AddedMassSpec, BodySpec, DynamicsSpec, EnvironmentSpec, ForceSpec, PositionSpec,
    RotationsSpec, SimSpec,
};
use selkie::mesh::unit_cube;
use selkie::sim::{self, Sim};
use selkie::solver::{simulate, Rk4Stepper};

const OUT_FILE: &str = "output/cube_decay.csv";

fn main() {
    let mass = 1000.;
    let mut inertia = [[0.; 6]; 6];
    for i in 0..3 {
        inertia[i][i] = mass;
    }
    for i in 3..6 {
        inertia[i][i] = mass / 6.;
    }

    // 1 m cube released with its top face on the waterline, gravity +
    // non-linear hydrostatics: a pure heave decay without damping.
    let spec = SimSpec {
        rotations: RotationsSpec::default(),
        environment: EnvironmentSpec {
            g: 9.81,
            rho: 1026.,
            waves: None,
        },
        bodies: vec![BodySpec {
            name: "cube".into(),
            dynamics: DynamicsSpec {
                mass,
                centre_of_inertia: [0.; 3],
                rigid_body_inertia: inertia,
                added_mass: AddedMassSpec::Matrix([[0.; 6]; 6]),
            },
            position_of_body_frame_relative_to_mesh: Default::default(),
            initial_position: PositionSpec {
                coordinates: [0., 0., 0.5],
                angle: Default::default(),
            },
            initial_velocity: [0.; 6],
            forces: vec![
                ForceSpec::named("gravity"),
                ForceSpec::named("non-linear hydrostatic (exact)"),
            ],
        }],
    };

    let mut system = match Sim::from_spec(&spec, vec![unit_cube()], None) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let x0 = system.initial_state();
    let res = match simulate(&mut system, &Rk4Stepper, x0, 0., 20., 0.05) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    std::fs::create_dir_all("output").unwrap();
    let mut file = File::create(OUT_FILE).unwrap();
    writeln!(file, "t,z,w").unwrap();
    for sample in &res {
        writeln!(
            file,
            "{},{},{}",
            sample.t,
            sample.x[sim::z_idx(0)],
            sample.x[sim::w_idx(0)]
        )
        .unwrap();
    }
    println!("wrote {} samples to {OUT_FILE}", res.len());
}
