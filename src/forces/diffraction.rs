//! Wave diffraction excitation from the RAO tables.
//!
//! For every discrete spectral ray, the module and phase tables are
//! interpolated at (ray frequency, wave heading relative to the body) and
//! the six components are summed with the ray's own phase. Headings outside
//! the tabulated domain surface as typed out-of-domain errors unless the
//! mirroring rule applies.

use crate::body::Body;
use crate::config::ForceSpec;
use crate::error::{SimError, SimResult};
use crate::forces::{Environment, ForceModel};
use crate::hdb::{DiffractionInterpolator, HdbData};
use crate::kinematics::Wrench;

pub struct DiffractionForceModel {
    interpolator: DiffractionInterpolator,
}

impl DiffractionForceModel {
    pub fn from_spec(spec: &ForceSpec, hdb: &HdbData) -> SimResult<Self> {
        Ok(Self {
            interpolator: DiffractionInterpolator::new(hdb, spec.mirror.unwrap_or(true))?,
        })
    }
}

impl ForceModel for DiffractionForceModel {
    fn name(&self) -> &str {
        "diffraction"
    }

    fn compute(&mut self, body: &mut Body, env: &Environment, t: f64) -> SimResult<Wrench> {
        let (spectrum, phases) = env.wave.rays().ok_or_else(|| {
            SimError::config("diffraction needs an irregular wave model with discrete rays")
        })?;
        let (x, y) = (body.states.x, body.states.y);
        let (_, _, yaw) = body.states.euler_angles();
        let mut tau = [0.; 6];
        for ray in 0..spectrum.len() {
            let heading = spectrum.psi[ray] - yaw;
            let argument = spectrum.omega[ray] * t
                - spectrum.k[ray] * (x * spectrum.cos_psi[ray] + y * spectrum.sin_psi[ray])
                + phases[ray];
            for (axis, tau_axis) in tau.iter_mut().enumerate() {
                let module = self
                    .interpolator
                    .module(axis, spectrum.omega[ray], heading)?;
                let phase = self.interpolator.phase(axis, spectrum.omega[ray], heading)?;
                *tau_axis += spectrum.a[ray] * module * (argument + phase).cos();
            }
        }
        Ok(Wrench::new(
            body.name(),
            [tau[0], tau[1], tau[2]],
            [tau[3], tau[4], tau[5]],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyBuilder;
    use crate::config::{AddedMassSpec, BodySpec, DynamicsSpec, RotationsSpec};
    use crate::hdb::Table2d;
    use crate::kinematics::Kinematics;
    use crate::mesh::unit_cube;
    use crate::waves::spectrum::{
        discretize, DiracDirectionalSpreading, DiracSpectralDensity, Stretching,
    };
    use crate::waves::{Airy, StillWater};
    use approx::assert_relative_eq;
    use faer::Mat;
    use std::f64::consts::PI;

    fn uniform_table(value: f64) -> Table2d {
        Table2d {
            omega: vec![0.01, 10.],
            psi: vec![0., 2. * PI],
            values: vec![vec![value; 2]; 2],
        }
    }

    fn hdb(module: f64) -> HdbData {
        HdbData {
            added_mass: vec![(0., Mat::identity(6, 6))],
            radiation_omega: vec![],
            radiation_damping: None,
            diffraction_module: Some(std::array::from_fn(|axis| {
                uniform_table(if axis == 0 { module } else { 0. })
            })),
            diffraction_phase: Some(std::array::from_fn(|_| uniform_table(0.))),
        }
    }

    fn body() -> Body {
        let mut rows = [[0.; 6]; 6];
        for i in 0..6 {
            rows[i][i] = 1000.;
        }
        let spec = BodySpec {
            name: "ship".into(),
            dynamics: DynamicsSpec {
                mass: 1000.,
                centre_of_inertia: [0.; 3],
                rigid_body_inertia: rows,
                added_mass: AddedMassSpec::Matrix([[0.; 6]; 6]),
            },
            position_of_body_frame_relative_to_mesh: Default::default(),
            initial_position: Default::default(),
            initial_velocity: [0.; 6],
            forces: vec![],
        };
        BodyBuilder::new(RotationsSpec::default())
            .unwrap()
            .build(&spec, unit_cube(), None)
            .unwrap()
    }

    fn wave_env(hs: f64, tp: f64) -> Environment {
        let s = DiracSpectralDensity::new(2. * PI / tp, hs);
        let d = DiracDirectionalSpreading::new(0.);
        let spectrum =
            discretize(&s, &d, 0.01, 10., 50, 9.81, None, Stretching::default()).unwrap();
        Environment {
            g: 9.81,
            rho: 1025.,
            wave: Box::new(Airy::new(spectrum.flatten(), 0)),
            kinematics: Kinematics::new(),
        }
    }

    #[test]
    fn surge_excitation_amplitude_follows_the_rao() {
        let mut model = DiffractionForceModel::from_spec(
            &ForceSpec::named("diffraction"),
            &hdb(1000.),
        )
        .unwrap();
        let mut b = body();
        let env = wave_env(3., 10.);
        let max = (0..2000)
            .map(|i| {
                model
                    .compute(&mut b, &env, 0.01 * i as f64)
                    .unwrap()
                    .force[0]
                    .abs()
            })
            .fold(0., f64::max);
        // One ray of amplitude Hs/2 against a flat unit RAO of 1000 N/m.
        assert_relative_eq!(max, 1000. * 1.5, epsilon = 1.);
    }

    #[test]
    fn still_water_model_cannot_drive_diffraction() {
        let mut model =
            DiffractionForceModel::from_spec(&ForceSpec::named("diffraction"), &hdb(1.)).unwrap();
        let mut b = body();
        let env = Environment {
            g: 9.81,
            rho: 1025.,
            wave: Box::new(StillWater),
            kinematics: Kinematics::new(),
        };
        assert!(model.compute(&mut b, &env, 0.).is_err());
    }

    #[test]
    fn missing_tables_fail_at_build_time() {
        let mut data = hdb(1.);
        data.diffraction_module = None;
        assert!(matches!(
            DiffractionForceModel::from_spec(&ForceSpec::named("diffraction"), &data),
            Err(SimError::MissingHdbSection { .. })
        ));
    }
}
