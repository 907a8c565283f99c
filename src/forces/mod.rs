//! Force models acting on a floating body.
//!
//! Every model satisfies the same contract: given a body's current state and
//! the environment, produce a wrench in the body frame about the body's
//! centre of gravity, plus optional named observations. The mesh intersector
//! is refreshed by the caller once per evaluation; models read it, and any
//! model that needs an alternate intersection (the GM decorator) must leave
//! the shared one as it found it.

pub mod diffraction;
pub mod gm;
pub mod gravity;
pub mod hydrostatic;
pub mod radiation;

pub use diffraction::DiffractionForceModel;
pub use gm::GMForceModel;
pub use gravity::GravityForceModel;
pub use hydrostatic::{
    ExactHydrostaticForceModel, FastHydrostaticForceModel, FroudeKrylovForceModel,
    LinearHydrostaticForceModel,
};
pub use radiation::RadiationDampingForceModel;

use faer::Mat;

use crate::body::{Body, BodyStates};
use crate::config::ForceSpec;
use crate::error::{SimError, SimResult};
use crate::hdb::HdbData;
use crate::kinematics::{Kinematics, Wrench};
use crate::mesh::Mesh;
use crate::observer::Observer;
use crate::util::{add, cross, mat_vec3};
use crate::waves::WaveModel;

/// Everything a force model may consult besides the body itself.
pub struct Environment {
    pub g: f64,
    pub rho: f64,
    pub wave: Box<dyn WaveModel>,
    pub kinematics: Kinematics,
}

/// Common contract of all force models.
pub trait ForceModel {
    fn name(&self) -> &str;

    /// Wrench in the body frame about the body's centre of gravity.
    fn compute(&mut self, body: &mut Body, env: &Environment, t: f64) -> SimResult<Wrench>;

    /// Named scalar diagnostics beyond the six wrench components.
    fn extra_observations(&self, _observer: &mut dyn Observer) {}
}

/// Relative immersion of every static mesh node for a given attitude and
/// wave field: the nodes are carried into NED and compared against the
/// instantaneous free surface.
pub fn body_immersions(
    mesh: &Mesh,
    states: &BodyStates,
    wave: &dyn WaveModel,
    t: f64,
) -> SimResult<Vec<f64>> {
    let r = states.ned_rotation();
    let position = states.position();
    let points: Vec<[f64; 3]> = (0..mesh.static_nodes)
        .map(|i| add(&mat_vec3(&r, &mesh.node(i)), &position))
        .collect();
    wave.relative_immersions(&points, t)
}

/// Rigid-body Coriolis/centripetal wrench in the body frame (momentum
/// form): the total inertia solves for the accelerations, but only the
/// rigid-body inertia generates gyroscopic loads.
pub fn coriolis_and_centripetal(frame: &str, mrb: &Mat<f64>, nu: &[f64; 6]) -> Wrench {
    let mut momentum = [0.; 6];
    for i in 0..6 {
        for (j, &nuj) in nu.iter().enumerate() {
            momentum[i] += mrb[(i, j)] * nuj;
        }
    }
    let linear = [momentum[0], momentum[1], momentum[2]];
    let angular = [momentum[3], momentum[4], momentum[5]];
    let v = [nu[0], nu[1], nu[2]];
    let omega = [nu[3], nu[4], nu[5]];
    let f = cross(&omega, &linear);
    let wxl = cross(&omega, &angular);
    let vxp = cross(&v, &linear);
    Wrench::new(
        frame,
        [-f[0], -f[1], -f[2]],
        [-wxl[0] - vxp[0], -wxl[1] - vxp[1], -wxl[2] - vxp[2]],
    )
}

/// Names accepted in a force declaration.
pub const SUPPORTED_MODELS: [&str; 8] = [
    "gravity",
    "linear hydrostatics",
    "non-linear hydrostatic (fast)",
    "non-linear hydrostatic (exact)",
    "non-linear Froude-Krylov",
    "GM",
    "radiation damping",
    "diffraction",
];

fn supported() -> Vec<String> {
    SUPPORTED_MODELS.iter().map(|s| s.to_string()).collect()
}

fn require_hdb<'a>(model: &str, hdb: Option<&'a HdbData>) -> SimResult<&'a HdbData> {
    hdb.ok_or_else(|| {
        SimError::config(format!(
            "force model '{model}' needs a hydrodynamic database but none was provided"
        ))
    })
}

/// Instantiate a force model from its declaration. Unknown names are fatal
/// and report the supported set.
pub fn build_force(spec: &ForceSpec, hdb: Option<&HdbData>) -> SimResult<Box<dyn ForceModel>> {
    match spec.model.as_str() {
        "gravity" => Ok(Box::new(GravityForceModel)),
        "linear hydrostatics" => Ok(Box::new(LinearHydrostaticForceModel::from_spec(spec)?)),
        "non-linear hydrostatic (fast)" => Ok(Box::new(FastHydrostaticForceModel)),
        "non-linear hydrostatic (exact)" => Ok(Box::new(ExactHydrostaticForceModel)),
        "non-linear Froude-Krylov" => Ok(Box::new(FroudeKrylovForceModel)),
        "GM" => Ok(Box::new(GMForceModel::from_spec(spec)?)),
        "radiation damping" => Ok(Box::new(RadiationDampingForceModel::from_spec(
            spec,
            require_hdb(&spec.model, hdb)?,
        )?)),
        "diffraction" => Ok(Box::new(DiffractionForceModel::from_spec(
            spec,
            require_hdb(&spec.model, hdb)?,
        )?)),
        other => Err(SimError::UnknownForceModel {
            name: other.into(),
            supported: supported(),
        }),
    }
}
