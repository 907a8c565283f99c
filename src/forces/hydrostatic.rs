//! Hydrostatic and wave-pressure force models.
//!
//! The non-linear variants integrate pressure over the immersed facets
//! delivered by the mesh intersector; the facet geometry lives in the body
//! frame, so the resulting wrench is directly a body-frame wrench about G.

use crate::body::Body;
use crate::config::ForceSpec;
use crate::error::{SimError, SimResult};
use crate::forces::{Environment, ForceModel};
use crate::hydrostatic::{average_immersion_of, elementary_wrench};
use crate::kinematics::Wrench;
use crate::mesh::polygon_area;
use crate::util::{add, mat_vec3, scale, sub};

/// Linear small-angle hydrostatics: a precomputed stiffness about a
/// reference waterline acting on (z, phi, theta) excursions. Cheapest
/// variant, inaccurate for large motions.
pub struct LinearHydrostaticForceModel {
    stiffness: [[f64; 3]; 3],
    z_eq: f64,
    phi_eq: f64,
    theta_eq: f64,
}

impl LinearHydrostaticForceModel {
    pub fn from_spec(spec: &ForceSpec) -> SimResult<Self> {
        let stiffness = spec.stiffness.ok_or_else(|| {
            SimError::config("linear hydrostatics needs a 'stiffness' matrix over (z, phi, theta)")
        })?;
        Ok(Self {
            stiffness,
            z_eq: spec.z_eq.unwrap_or(0.),
            phi_eq: spec.phi_eq.unwrap_or(0.),
            theta_eq: spec.theta_eq.unwrap_or(0.),
        })
    }
}

impl ForceModel for LinearHydrostaticForceModel {
    fn name(&self) -> &str {
        "linear hydrostatics"
    }

    fn compute(&mut self, body: &mut Body, _env: &Environment, _t: f64) -> SimResult<Wrench> {
        let (phi, theta, _) = body.states.euler_angles();
        let d = [
            body.states.z - self.z_eq,
            phi - self.phi_eq,
            theta - self.theta_eq,
        ];
        let mut r = [0.; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i] -= self.stiffness[i][j] * d[j];
            }
        }
        Ok(Wrench::new(body.name(), [0., 0., r[0]], [r[1], r[2], 0.]))
    }
}

/// Sums ρ·g·z̄·dS over the immersed facets with each contribution applied at
/// the facet barycenter. The waterline-crossing facets were already split by
/// the intersector, so the average vertex immersion is the pressure level of
/// the facet.
pub struct FastHydrostaticForceModel;

impl ForceModel for FastHydrostaticForceModel {
    fn name(&self) -> &str {
        "non-linear hydrostatic (fast)"
    }

    fn compute(&mut self, body: &mut Body, env: &Environment, _t: f64) -> SimResult<Wrench> {
        let g_point = body.states.g_point.v;
        let orientation = body.intersector.mesh.orientation_factor;
        let mut wrench = Wrench::zero(body.name());
        for &facet_index in &body.intersector.index_of_immersed_facets {
            let facet = &body.intersector.mesh.facets[facet_index];
            if facet.area == 0. {
                continue;
            }
            let dz = average_immersion_of(&body.intersector.facet_immersions(facet_index));
            let ds = scale(&facet.unit_normal, facet.area * orientation);
            wrench.accumulate(&elementary_wrench(
                body.name(),
                &g_point,
                &facet.barycenter,
                env.rho,
                env.g,
                dz,
                &ds,
            ));
        }
        Ok(wrench)
    }
}

/// Like the fast model but applies each facet's force at its centre of
/// pressure: the first moment of the linear pressure field over the
/// polygon, evaluated exactly by fan triangulation. Exact for any attitude
/// or wave shape, O(facet count) per call.
pub struct ExactHydrostaticForceModel;

/// Centre of pressure of a planar polygon under a linear immersion field.
/// Falls back to the barycenter when the net pressure integral vanishes
/// (facet riding the waterline).
fn centre_of_pressure(points: &[[f64; 3]], dz: &[f64], barycenter: &[f64; 3]) -> [f64; 3] {
    let mut p_total = 0.;
    let mut px_total = [0.; 3];
    for i in 2..points.len() {
        let tri = [points[0], points[i - 1], points[i]];
        let z = [dz[0], dz[i - 1], dz[i]];
        let area = polygon_area(&tri);
        let z_sum = z[0] + z[1] + z[2];
        p_total += area * z_sum / 3.;
        for axis in 0..3 {
            let x = [tri[0][axis], tri[1][axis], tri[2][axis]];
            let zx_sum = z[0] * x[0] + z[1] * x[1] + z[2] * x[2];
            let x_sum = x[0] + x[1] + x[2];
            px_total[axis] += area / 12. * (zx_sum + z_sum * x_sum);
        }
    }
    if p_total.abs() < 1e-12 {
        *barycenter
    } else {
        scale(&px_total, 1. / p_total)
    }
}

impl ForceModel for ExactHydrostaticForceModel {
    fn name(&self) -> &str {
        "non-linear hydrostatic (exact)"
    }

    fn compute(&mut self, body: &mut Body, env: &Environment, _t: f64) -> SimResult<Wrench> {
        let g_point = body.states.g_point.v;
        let orientation = body.intersector.mesh.orientation_factor;
        let mut wrench = Wrench::zero(body.name());
        for &facet_index in &body.intersector.index_of_immersed_facets {
            let facet = &body.intersector.mesh.facets[facet_index];
            if facet.area == 0. {
                continue;
            }
            let points = body.intersector.facet_coordinates(facet_index);
            let dz = body.intersector.facet_immersions(facet_index);
            let application = centre_of_pressure(&points, &dz, &facet.barycenter);
            let ds = scale(&facet.unit_normal, facet.area * orientation);
            wrench.accumulate(&elementary_wrench(
                body.name(),
                &g_point,
                &application,
                env.rho,
                env.g,
                average_immersion_of(&dz),
                &ds,
            ));
        }
        Ok(wrench)
    }
}

/// Wave-excitation pressure (Froude-Krylov): the undisturbed-wave dynamic
/// pressure integrated over the immersed facets.
pub struct FroudeKrylovForceModel;

impl ForceModel for FroudeKrylovForceModel {
    fn name(&self) -> &str {
        "non-linear Froude-Krylov"
    }

    fn compute(&mut self, body: &mut Body, env: &Environment, t: f64) -> SimResult<Wrench> {
        let g_point = body.states.g_point.v;
        let orientation = body.intersector.mesh.orientation_factor;
        let r = body.states.ned_rotation();
        let position = body.states.position();
        let mut wrench = Wrench::zero(body.name());
        for &facet_index in &body.intersector.index_of_immersed_facets {
            let facet = &body.intersector.mesh.facets[facet_index];
            if facet.area == 0. {
                continue;
            }
            let c_ned = add(&mat_vec3(&r, &facet.barycenter), &position);
            let p = env
                .wave
                .dynamic_pressure(env.rho, env.g, c_ned[0], c_ned[1], c_ned[2], t)?;
            let f = scale(&facet.unit_normal, -p * facet.area * orientation);
            let arm = sub(&facet.barycenter, &g_point);
            wrench.accumulate(&Wrench::new(
                body.name(),
                f,
                crate::util::cross(&arm, &f),
            ));
        }
        Ok(wrench)
    }
}
