//! Weight at the centre of gravity.

use crate::body::Body;
use crate::error::SimResult;
use crate::forces::{Environment, ForceModel};
use crate::kinematics::Wrench;

/// m·g along NED z, rotated into the body frame and applied at G (hence no
/// moment). The rotation is resolved through the frame graph, which the
/// simulation core refreshes before summing forces.
pub struct GravityForceModel;

impl ForceModel for GravityForceModel {
    fn name(&self) -> &str {
        "gravity"
    }

    fn compute(&mut self, body: &mut Body, env: &Environment, _t: f64) -> SimResult<Wrench> {
        let ned_to_body = env.kinematics.get("NED", body.name())?;
        let f = ned_to_body.rotate(&[0., 0., body.mass * env.g]);
        Ok(Wrench::new(body.name(), f, [0.; 3]))
    }
}
