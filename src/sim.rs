//! Simulation core: the ODE right-hand side an external stepper integrates.
//!
//! The global state vector is laid out per body as
//! [x, y, z, u, v, w, p, q, r, qr, qi, qj, qk] and only ever accessed
//! through the named index functions. Every derivative evaluation rebuilds
//! kinematics and the mesh/free-surface intersection from (x, t) alone, so
//! identical inputs give bit-identical outputs — a requirement of adaptive
//! steppers that re-evaluate the same point.

use crate::body::{Body, BodyBuilder};
use crate::config::{SimSpec, SpectrumShapeSpec, SpreadingSpec, WavesSpec};
use crate::error::{SimError, SimResult};
use crate::forces::{
    body_immersions, build_force, coriolis_and_centripetal, Environment, ForceModel,
};
use crate::hdb::HdbData;
use crate::kinematics::{Kinematics, Point, Transform, Wrench};
use crate::observer::Observer;
use crate::util::{mat_vec3, quat_product};
use crate::waves::spectrum::{
    discretize, BretschneiderSpectrum, Cos2sSpreading, DiracDirectionalSpreading,
    DiracSpectralDensity, FlatDiscreteDirectionalWaveSpectrum, Stretching,
    WaveDirectionalSpreading, WaveSpectralDensity,
};
use crate::waves::{Airy, StillWater, WaveModel};

/// Number of scalar states per body.
pub const STATES_PER_BODY: usize = 13;

pub fn x_idx(body: usize) -> usize {
    STATES_PER_BODY * body
}
pub fn y_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 1
}
pub fn z_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 2
}
pub fn u_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 3
}
pub fn v_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 4
}
pub fn w_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 5
}
pub fn p_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 6
}
pub fn q_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 7
}
pub fn r_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 8
}
pub fn qr_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 9
}
pub fn qi_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 10
}
pub fn qj_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 11
}
pub fn qk_idx(body: usize) -> usize {
    STATES_PER_BODY * body + 12
}

pub struct Sim {
    pub bodies: Vec<Body>,
    forces: Vec<Vec<Box<dyn ForceModel>>>,
    pub env: Environment,
    /// Wrench of each force model at the last derivative evaluation, for
    /// observation.
    last_wrenches: Vec<Vec<Wrench>>,
}

impl Sim {
    pub fn new(
        bodies: Vec<Body>,
        forces: Vec<Vec<Box<dyn ForceModel>>>,
        env: Environment,
    ) -> SimResult<Self> {
        if bodies.len() != forces.len() {
            return Err(SimError::config(format!(
                "got {} bodies but {} force lists",
                bodies.len(),
                forces.len()
            )));
        }
        let last_wrenches = bodies
            .iter()
            .zip(forces.iter())
            .map(|(b, fs)| fs.iter().map(|_| Wrench::zero(b.name())).collect())
            .collect();
        Ok(Self {
            bodies,
            forces,
            env,
            last_wrenches,
        })
    }

    /// Assemble a simulator from its declarative specification plus one
    /// triangle list per body (from an external mesh loader) and an optional
    /// hydrodynamic database.
    pub fn from_spec(
        spec: &SimSpec,
        mut meshes: Vec<Vec<[[f64; 3]; 3]>>,
        hdb: Option<&HdbData>,
    ) -> SimResult<Self> {
        if meshes.len() != spec.bodies.len() {
            return Err(SimError::config(format!(
                "got {} bodies but {} meshes",
                spec.bodies.len(),
                meshes.len()
            )));
        }
        let builder = BodyBuilder::new(spec.rotations.clone())?;
        let mut bodies = vec![];
        let mut forces = vec![];
        for body_spec in &spec.bodies {
            let body = builder.build(body_spec, meshes.remove(0), hdb)?;
            let mut body_forces = vec![];
            for force_spec in &body_spec.forces {
                body_forces.push(build_force(force_spec, hdb)?);
            }
            bodies.push(body);
            forces.push(body_forces);
        }
        let env = Environment {
            g: spec.environment.g,
            rho: spec.environment.rho,
            wave: build_wave_model(&spec.environment.waves, spec.environment.g)?,
            kinematics: Kinematics::new(),
        };
        Self::new(bodies, forces, env)
    }

    /// Initial global state vector from the bodies' build-time states.
    pub fn initial_state(&self) -> Vec<f64> {
        let mut x = vec![0.; STATES_PER_BODY * self.bodies.len()];
        for (i, body) in self.bodies.iter().enumerate() {
            let s = &body.states;
            x[x_idx(i)] = s.x;
            x[y_idx(i)] = s.y;
            x[z_idx(i)] = s.z;
            x[u_idx(i)] = s.u;
            x[v_idx(i)] = s.v;
            x[w_idx(i)] = s.w;
            x[p_idx(i)] = s.p;
            x[q_idx(i)] = s.q;
            x[r_idx(i)] = s.r;
            x[qr_idx(i)] = s.quat[0];
            x[qi_idx(i)] = s.quat[1];
            x[qj_idx(i)] = s.quat[2];
            x[qk_idx(i)] = s.quat[3];
        }
        x
    }

    fn update_body_states(body: &mut Body, x: &[f64], i: usize, t: f64) {
        let s = &mut body.states;
        s.x = x[x_idx(i)];
        s.y = x[y_idx(i)];
        s.z = x[z_idx(i)];
        s.u = x[u_idx(i)];
        s.v = x[v_idx(i)];
        s.w = x[w_idx(i)];
        s.p = x[p_idx(i)];
        s.q = x[q_idx(i)];
        s.r = x[r_idx(i)];
        s.quat = [x[qr_idx(i)], x[qi_idx(i)], x[qj_idx(i)], x[qk_idx(i)]];
        s.history.record(t, s.velocity());
    }

    /// Register the per-step NED↔body transform and the static body↔mesh
    /// transform in the frame graph.
    fn update_kinematics(env: &mut Environment, body: &Body) {
        env.kinematics.add(Transform::new(
            body.name().to_string(),
            "NED",
            body.states.ned_rotation(),
            body.states.position(),
        ));
        env.kinematics.add(body.mesh_to_body.clone());
    }

    /// Wrench of all configured force models plus the Coriolis/centripetal
    /// correction, in the body frame about G.
    fn sum_of_forces(
        body: &mut Body,
        forces: &mut [Box<dyn ForceModel>],
        last: &mut [Wrench],
        env: &Environment,
        t: f64,
    ) -> SimResult<Wrench> {
        let mut total =
            coriolis_and_centripetal(body.name(), &body.solid_body_inertia, &body.states.velocity());
        for (force, slot) in forces.iter_mut().zip(last.iter_mut()) {
            let wrench = force.compute(body, env, t)?;
            total.accumulate(&wrench);
            *slot = wrench;
        }
        Ok(total)
    }

    /// The ODE right-hand side: stateless with respect to prior calls apart
    /// from the intersection cache, which is rebuilt here every time.
    pub fn derivative(&mut self, x: &[f64], dx_dt: &mut [f64], t: f64) -> SimResult<()> {
        let n = self.bodies.len();
        debug_assert_eq!(x.len(), STATES_PER_BODY * n);
        for i in 0..n {
            let body = &mut self.bodies[i];
            Self::update_body_states(body, x, i, t);
            Self::update_kinematics(&mut self.env, body);
            let immersions =
                body_immersions(&body.intersector.mesh, &body.states, self.env.wave.as_ref(), t)?;
            body.intersector.update_intersection(&immersions)?;
            let wrench = Self::sum_of_forces(
                body,
                &mut self.forces[i],
                &mut self.last_wrenches[i],
                &self.env,
                t,
            )?;

            // Body-frame accelerations through the precomputed inverse of
            // the total inertia.
            let tau = wrench.to_vector();
            let minv = &body.inverse_of_total_inertia;
            let mut nu_dot = [0.; 6];
            for (r, nu) in nu_dot.iter_mut().enumerate() {
                for (c, &tau_c) in tau.iter().enumerate() {
                    *nu += minv[(r, c)] * tau_c;
                }
            }
            dx_dt[u_idx(i)] = nu_dot[0];
            dx_dt[v_idx(i)] = nu_dot[1];
            dx_dt[w_idx(i)] = nu_dot[2];
            dx_dt[p_idx(i)] = nu_dot[3];
            dx_dt[q_idx(i)] = nu_dot[4];
            dx_dt[r_idx(i)] = nu_dot[5];

            // Position derivative: body velocity rotated into NED.
            let uvw_ned = mat_vec3(
                &self.bodies[i].states.ned_rotation(),
                &[x[u_idx(i)], x[v_idx(i)], x[w_idx(i)]],
            );
            dx_dt[x_idx(i)] = uvw_ned[0];
            dx_dt[y_idx(i)] = uvw_ned[1];
            dx_dt[z_idx(i)] = uvw_ned[2];

            // dq/dt = q ⊗ (0, p, q, r) / 2. Not re-normalized: drift is
            // bounded only by the stepper's accuracy.
            let q1 = [x[qr_idx(i)], x[qi_idx(i)], x[qj_idx(i)], x[qk_idx(i)]];
            let q2 = [0., x[p_idx(i)], x[q_idx(i)], x[r_idx(i)]];
            let dq = quat_product(&q1, &q2);
            dx_dt[qr_idx(i)] = 0.5 * dq[0];
            dx_dt[qi_idx(i)] = 0.5 * dq[1];
            dx_dt[qj_idx(i)] = 0.5 * dq[2];
            dx_dt[qk_idx(i)] = 0.5 * dq[3];
        }
        Ok(())
    }

    /// Free-surface elevation sampled on an output grid, returned as NED
    /// points (z down, so crests have negative z).
    pub fn wave_elevation_samples(
        &self,
        points: &[(f64, f64)],
        t: f64,
    ) -> SimResult<Vec<Point>> {
        points
            .iter()
            .map(|&(x, y)| {
                let eta = self.env.wave.elevation(x, y, t)?;
                Ok(Point::new("NED", x, y, -eta))
            })
            .collect()
    }

    /// Push the six wrench components of every force model, plus their extra
    /// observations, into the sink.
    pub fn feed_observer(&self, observer: &mut dyn Observer) {
        const COMPONENTS: [&str; 6] = ["Fx", "Fy", "Fz", "Mx", "My", "Mz"];
        for (i, body) in self.bodies.iter().enumerate() {
            for (force, wrench) in self.forces[i].iter().zip(self.last_wrenches[i].iter()) {
                let values = wrench.to_vector();
                for (component, value) in COMPONENTS.into_iter().zip(values.iter()) {
                    observer.write(&["efforts", body.name(), force.name(), component], *value);
                }
                force.extra_observations(observer);
            }
        }
    }
}

fn build_wave_model(
    spec: &Option<WavesSpec>,
    g: f64,
) -> SimResult<Box<dyn WaveModel>> {
    let Some(waves) = spec else {
        return Ok(Box::new(StillWater));
    };
    let stretching = Stretching {
        delta: waves.stretching_delta,
    };
    let mut flat: Option<FlatDiscreteDirectionalWaveSpectrum> = None;
    for component in &waves.components {
        let density: Box<dyn WaveSpectralDensity> = match component.spectrum {
            SpectrumShapeSpec::Dirac { omega0, hs } => {
                Box::new(DiracSpectralDensity::new(omega0, hs))
            }
            SpectrumShapeSpec::Bretschneider { hs, tp } => {
                Box::new(BretschneiderSpectrum::new(hs, tp))
            }
        };
        let spreading: Box<dyn WaveDirectionalSpreading> = match component.spreading {
            SpreadingSpec::Dirac { psi0 } => Box::new(DiracDirectionalSpreading::new(psi0)),
            SpreadingSpec::Cos2s { psi0, s } => Box::new(Cos2sSpreading::new(psi0, s)),
        };
        let discrete = discretize(
            density.as_ref(),
            spreading.as_ref(),
            waves.omega_min,
            waves.omega_max,
            waves.nfreq,
            g,
            waves.depth,
            stretching,
        )?;
        let component_flat = discrete.flatten();
        match flat.as_mut() {
            None => flat = Some(component_flat),
            Some(acc) => acc.extend(&component_flat),
        }
    }
    let flat = flat.ok_or_else(|| SimError::config("wave spec needs at least one component"))?;
    Ok(Box::new(Airy::new(flat, waves.seed)))
}
