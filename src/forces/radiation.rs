//! Radiation damping by convolution of the velocity history.
//!
//! The frequency-domain damping coefficients B_ij(ω) from the hydrodynamic
//! database are turned into time-domain retardation kernels
//! K_ij(τ) = (2/π)·∫B_ij(ω)·cos(ωτ)·dω once at build time; each evaluation
//! convolves the kernels with the recorded body velocities.

use std::f64::consts::PI;

use crate::body::Body;
use crate::config::ForceSpec;
use crate::error::{SimError, SimResult};
use crate::forces::{Environment, ForceModel};
use crate::hdb::HdbData;
use crate::kinematics::Wrench;

pub struct RadiationDampingForceModel {
    tau: Vec<f64>,
    /// `kernel[i][j]` sampled over `tau`.
    kernel: Vec<Vec<Vec<f64>>>,
}

/// Trapezoidal quadrature of samples `ys` over abscissae `xs`.
fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

impl RadiationDampingForceModel {
    pub fn from_spec(spec: &ForceSpec, hdb: &HdbData) -> SimResult<Self> {
        let tau_max = spec
            .tau_max
            .ok_or_else(|| SimError::config("radiation damping needs 'tau_max' (s)"))?;
        let n = spec.nb_of_points.unwrap_or(50);
        if n < 2 || tau_max <= 0. {
            return Err(SimError::config(format!(
                "radiation damping needs tau_max > 0 and at least two kernel points, \
                 got tau_max = {tau_max}, n = {n}"
            )));
        }
        let omegas = &hdb.radiation_omega;
        if omegas.len() < 2 {
            return Err(SimError::config(
                "radiation damping tables need at least two frequencies",
            ));
        }
        let dtau = tau_max / (n - 1) as f64;
        let tau: Vec<f64> = (0..n).map(|m| m as f64 * dtau).collect();
        let mut kernel = vec![vec![vec![0.; n]; 6]; 6];
        for i in 0..6 {
            for j in 0..6 {
                let b = hdb.radiation_damping(i, j)?;
                for (m, &tm) in tau.iter().enumerate() {
                    let integrand: Vec<f64> = omegas
                        .iter()
                        .zip(b.iter())
                        .map(|(&w, &bw)| bw * (w * tm).cos())
                        .collect();
                    kernel[i][j][m] = 2. / PI * trapezoid(omegas, &integrand);
                }
            }
        }
        Ok(Self { tau, kernel })
    }
}

impl ForceModel for RadiationDampingForceModel {
    fn name(&self) -> &str {
        "radiation damping"
    }

    fn compute(&mut self, body: &mut Body, _env: &Environment, t: f64) -> SimResult<Wrench> {
        // F_i(t) = -Σ_j ∫ K_ij(τ)·v_j(t-τ) dτ over the recorded history.
        let velocities: Vec<[f64; 6]> = self
            .tau
            .iter()
            .map(|&tau| body.states.history.get(t - tau))
            .collect();
        let mut f = [0.; 6];
        for i in 0..6 {
            for j in 0..6 {
                let integrand: Vec<f64> = self.kernel[i][j]
                    .iter()
                    .zip(velocities.iter())
                    .map(|(&k, v)| k * v[j])
                    .collect();
                f[i] -= trapezoid(&self.tau, &integrand);
            }
        }
        Ok(Wrench::new(
            body.name(),
            [f[0], f[1], f[2]],
            [f[3], f[4], f[5]],
        ))
    }
}
