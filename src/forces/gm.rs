//! Metacentric-height diagnostic.
//!
//! Decorates one of the hydrostatic force models: the returned wrench is the
//! wrapped model's, and GM is derived on the side by finite-differencing the
//! righting arm between the current attitude and a small roll shift. The
//! shifted attitude is rebuilt from Euler angles, so its quaternion is unit
//! norm by construction; the shared intersector is restored before
//! returning.

use crate::body::Body;
use crate::config::ForceSpec;
use crate::error::{SimError, SimResult};
use crate::forces::{body_immersions, build_force, Environment, ForceModel};
use crate::kinematics::Wrench;
use crate::observer::Observer;
use crate::util::{mat_vec3, norm, quat_as_matrix};

const HYDROSTATIC_MODELS: [&str; 3] = [
    "linear hydrostatics",
    "non-linear hydrostatic (fast)",
    "non-linear hydrostatic (exact)",
];

pub struct GMForceModel {
    underlying: Box<dyn ForceModel>,
    body_name: String,
    dphi: f64,
    gm: f64,
}

impl GMForceModel {
    pub fn from_spec(spec: &ForceSpec) -> SimResult<Self> {
        let name = spec.hydrostatic_model.clone().ok_or_else(|| {
            SimError::config("GM needs the name of the hydrostatic force model to wrap")
        })?;
        if !HYDROSTATIC_MODELS.contains(&name.as_str()) {
            return Err(SimError::UnknownForceModel {
                name,
                supported: HYDROSTATIC_MODELS.iter().map(|s| s.to_string()).collect(),
            });
        }
        let dphi = spec
            .roll_step
            .ok_or_else(|| SimError::config("GM needs a 'roll_step' (rad)"))?;
        if dphi == 0. {
            return Err(SimError::config("GM roll step must be non-zero"));
        }
        let mut underlying_spec = spec.clone();
        underlying_spec.model = name;
        Ok(Self {
            underlying: build_force(&underlying_spec, None)?,
            body_name: String::new(),
            dphi,
            gm: 0.,
        })
    }

    /// Righting arm: the roll moment of the hydrostatic wrench projected
    /// into NED, per unit of supporting force.
    fn gz(wrench: &Wrench, quat: &[f64; 4]) -> f64 {
        let r = quat_as_matrix(quat);
        let torque_ned = mat_vec3(&r, &wrench.torque);
        let f = norm(&wrench.force);
        if f == 0. {
            0.
        } else {
            -torque_ned[0] / f
        }
    }
}

impl ForceModel for GMForceModel {
    fn name(&self) -> &str {
        "GM"
    }

    fn compute(&mut self, body: &mut Body, env: &Environment, t: f64) -> SimResult<Wrench> {
        self.body_name = body.name().to_string();
        let wrench = self.underlying.compute(body, env, t)?;
        let gz1 = Self::gz(&wrench, &body.states.quat);

        // Re-derive the intersection under the shifted attitude, evaluate,
        // then put the shared intersection back.
        let saved: Vec<f64> =
            body.intersector.all_immersions[..body.intersector.mesh.static_nodes].to_vec();
        let shifted = body.states.with_roll_shift(self.dphi);
        let immersions =
            body_immersions(&body.intersector.mesh, &shifted, env.wave.as_ref(), t)?;
        body.intersector.update_intersection(&immersions)?;
        let shifted_wrench = self.underlying.compute(body, env, t)?;
        let gz2 = Self::gz(&shifted_wrench, &shifted.quat);
        body.intersector.update_intersection(&saved)?;

        self.gm = (gz1 - gz2) / self.dphi;
        Ok(wrench)
    }

    fn extra_observations(&self, observer: &mut dyn Observer) {
        observer.write(&["efforts", self.body_name.as_str(), "GM", "GM"], self.gm);
    }
}
