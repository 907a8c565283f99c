//! Floating body: inertia, mesh, frames and time-indexed states.

use std::collections::VecDeque;

use faer::Mat;

use crate::config::{AddedMassSpec, BodySpec, MatrixRows, RotationsSpec};
use crate::error::{SimError, SimResult};
use crate::hdb::HdbData;
use crate::intersector::MeshIntersector;
use crate::kinematics::{Point, Transform};
use crate::mesh::MeshBuilder;
use crate::util::{quat_as_matrix, quat_from_euler_zyx, quat_to_euler_zyx};

/// Determinant threshold below which the total inertia matrix is considered
/// singular.
const INERTIA_DETERMINANT_THRESHOLD: f64 = 1e-10;

/// How much velocity history a body keeps for the radiation-damping
/// convolution (seconds).
const HISTORY_LENGTH: f64 = 100.;

/// Bounded record of body velocities over time, linearly interpolated on
/// query. Re-recording at or before an already recorded instant discards the
/// tail first, which keeps the record monotonic under steppers that
/// re-evaluate the same time point.
#[derive(Debug, Clone)]
pub struct VelocityHistory {
    tmax: f64,
    samples: VecDeque<(f64, [f64; 6])>,
}

impl VelocityHistory {
    pub fn new(tmax: f64) -> Self {
        Self {
            tmax,
            samples: VecDeque::new(),
        }
    }

    pub fn record(&mut self, t: f64, v: [f64; 6]) {
        while self.samples.back().is_some_and(|&(tb, _)| tb >= t) {
            self.samples.pop_back();
        }
        self.samples.push_back((t, v));
        while self.samples.front().is_some_and(|&(tf, _)| tf < t - self.tmax) {
            self.samples.pop_front();
        }
    }

    /// Velocity at absolute time `t`; zero before the recorded history
    /// (bodies start from rest), clamped after it.
    pub fn get(&self, t: f64) -> [f64; 6] {
        let (first, last) = match (self.samples.front(), self.samples.back()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => return [0.; 6],
        };
        if t < first.0 {
            return [0.; 6];
        }
        if t >= last.0 {
            return last.1;
        }
        let i = self
            .samples
            .iter()
            .position(|&(ts, _)| ts > t)
            .unwrap_or(self.samples.len() - 1);
        let (t0, v0) = self.samples[i - 1];
        let (t1, v1) = self.samples[i];
        let w = (t - t0) / (t1 - t0);
        std::array::from_fn(|k| v0[k] * (1. - w) + v1[k] * w)
    }
}

/// A body's instantaneous state: NED position, body-frame velocities and
/// attitude quaternion, plus the velocity history consumed by the radiation
/// convolution. Euler angles are derived on demand with the intrinsic
/// z-y'-x'' convention.
#[derive(Debug, Clone)]
pub struct BodyStates {
    pub name: String,
    /// Centre of inertia, expressed in the body frame.
    pub g_point: Point,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub u: f64,
    pub v: f64,
    pub w: f64,
    pub p: f64,
    pub q: f64,
    pub r: f64,
    pub quat: [f64; 4],
    pub history: VelocityHistory,
}

impl BodyStates {
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn velocity(&self) -> [f64; 6] {
        [self.u, self.v, self.w, self.p, self.q, self.r]
    }

    /// Rotation from the body frame to NED.
    pub fn ned_rotation(&self) -> Mat<f64> {
        quat_as_matrix(&self.quat)
    }

    pub fn euler_angles(&self) -> (f64, f64, f64) {
        quat_to_euler_zyx(&self.quat)
    }

    /// Copy of these states with the attitude rebuilt from shifted Euler
    /// angles; the quaternion comes out normalized by construction.
    pub fn with_roll_shift(&self, dphi: f64) -> BodyStates {
        let (phi, theta, psi) = self.euler_angles();
        let mut shifted = self.clone();
        shifted.quat = quat_from_euler_zyx(phi - dphi, theta, psi);
        shifted
    }
}

pub struct Body {
    pub states: BodyStates,
    pub mass: f64,
    /// 6×6 rigid-body inertia (Coriolis term uses this, not the total).
    pub solid_body_inertia: Mat<f64>,
    /// Rigid-body inertia + added mass.
    pub total_inertia: Mat<f64>,
    /// Precomputed inverse of the total inertia.
    pub inverse_of_total_inertia: Mat<f64>,
    /// Owns the mesh; refreshed once per force evaluation.
    pub intersector: MeshIntersector,
    /// Static transform from the mesh frame to the body frame.
    pub mesh_to_body: Transform,
}

impl Body {
    pub fn name(&self) -> &str {
        &self.states.name
    }

    pub fn mesh_frame(&self) -> String {
        format!("mesh({})", self.states.name)
    }
}

fn convert(rows: &MatrixRows) -> Mat<f64> {
    Mat::from_fn(6, 6, |i, j| rows[i][j])
}

fn fmt_mat6(m: &Mat<f64>) -> String {
    (0..6)
        .map(|i| {
            (0..6)
                .map(|j| format!("{:>12.5e}", m[(i, j)]))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds a [`Body`] from its declarative specification, re-expressing the
/// mesh in the body frame and precomputing the inertia inverse.
pub struct BodyBuilder {
    rotations: RotationsSpec,
}

impl BodyBuilder {
    pub fn new(rotations: RotationsSpec) -> SimResult<Self> {
        rotations.validate()?;
        Ok(Self { rotations })
    }

    pub fn build(
        &self,
        spec: &BodySpec,
        triangles: Vec<[[f64; 3]; 3]>,
        hdb: Option<&HdbData>,
    ) -> SimResult<Body> {
        self.rotations.validate()?;
        let mesh_frame = format!("mesh({})", spec.name);

        // The mesh loader delivers coordinates in the mesh frame; move them
        // into the body frame once, so per-step transforms stop at the body.
        let rel = &spec.position_of_body_frame_relative_to_mesh;
        let body_to_mesh = Transform::new(
            spec.name.clone(),
            mesh_frame,
            quat_as_matrix(&quat_from_euler_zyx(
                rel.angle.phi,
                rel.angle.theta,
                rel.angle.psi,
            )),
            rel.coordinates,
        );
        let mesh_to_body = body_to_mesh.inverse();
        let mut mesh = MeshBuilder::new(triangles).build()?;
        mesh.apply_transform(&mesh_to_body);

        let (solid_body_inertia, total_inertia, inverse_of_total_inertia) =
            Self::add_inertia(spec, hdb)?;

        let init = &spec.initial_position;
        let [u, v, w, p, q, r] = spec.initial_velocity;
        let states = BodyStates {
            name: spec.name.clone(),
            g_point: Point::new(
                spec.name.clone(),
                spec.dynamics.centre_of_inertia[0],
                spec.dynamics.centre_of_inertia[1],
                spec.dynamics.centre_of_inertia[2],
            ),
            x: init.coordinates[0],
            y: init.coordinates[1],
            z: init.coordinates[2],
            u,
            v,
            w,
            p,
            q,
            r,
            quat: quat_from_euler_zyx(init.angle.phi, init.angle.theta, init.angle.psi),
            history: VelocityHistory::new(HISTORY_LENGTH),
        };

        Ok(Body {
            states,
            mass: spec.dynamics.mass,
            solid_body_inertia,
            total_inertia,
            inverse_of_total_inertia,
            intersector: MeshIntersector::new(mesh),
            mesh_to_body,
        })
    }

    fn add_inertia(
        spec: &BodySpec,
        hdb: Option<&HdbData>,
    ) -> SimResult<(Mat<f64>, Mat<f64>, Mat<f64>)> {
        let mrb = convert(&spec.dynamics.rigid_body_inertia);
        let ma = match &spec.dynamics.added_mass {
            AddedMassSpec::Matrix(rows) => convert(rows),
            AddedMassSpec::FromHdb { period } => hdb
                .ok_or_else(|| {
                    SimError::config(format!(
                        "body '{}' reads its added mass from an HDB file but none was provided",
                        spec.name
                    ))
                })?
                .added_mass_at_period(*period)?,
        };
        let mt = &mrb + &ma;
        let (inverse, det) = crate::util::invert(&mt);
        if det.abs() < INERTIA_DETERMINANT_THRESHOLD {
            return Err(SimError::SingularInertia {
                message: format!(
                    "det = {det:e}\nMrb =\n{}\nMa =\n{}\nMrb+Ma =\n{}",
                    fmt_mat6(&mrb),
                    fmt_mat6(&ma),
                    fmt_mat6(&mt)
                ),
            });
        }
        let inverse = inverse.ok_or_else(|| SimError::SingularInertia {
            message: format!("det = {det:e}"),
        })?;
        Ok((mrb, mt, inverse))
    }
}
