//! Airy linear wave model: superposition of the discretized spectral rays.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SimResult;
use crate::waves::spectrum::FlatDiscreteDirectionalWaveSpectrum;
use crate::waves::WaveModel;

/// Linear (Airy) irregular sea: every query is an O(N) sum over the
/// discrete rays. Phases are drawn once at construction from a seeded
/// generator; the same seed always reproduces the same sea state.
pub struct Airy {
    spectrum: FlatDiscreteDirectionalWaveSpectrum,
    phase: Vec<f64>,
}

impl Airy {
    pub fn new(spectrum: FlatDiscreteDirectionalWaveSpectrum, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let phase = (0..spectrum.len())
            .map(|_| rng.gen_range(0.0..2. * std::f64::consts::PI))
            .collect();
        Self { spectrum, phase }
    }

    /// Phase of ray `i` at (x, y, t).
    #[inline]
    fn theta(&self, i: usize, x: f64, y: f64, t: f64) -> f64 {
        let s = &self.spectrum;
        s.omega[i] * t - s.k[i] * (x * s.cos_psi[i] + y * s.sin_psi[i]) + self.phase[i]
    }
}

impl WaveModel for Airy {
    fn elevation(&self, x: f64, y: f64, t: f64) -> SimResult<f64> {
        let mut eta = 0.;
        for i in 0..self.spectrum.len() {
            eta += self.spectrum.a[i] * self.theta(i, x, y, t).cos();
        }
        Ok(eta)
    }

    fn dynamic_pressure(
        &self,
        rho: f64,
        g: f64,
        x: f64,
        y: f64,
        z: f64,
        t: f64,
    ) -> SimResult<f64> {
        let eta = self.elevation(x, y, t)?;
        let s = &self.spectrum;
        let mut p = 0.;
        for i in 0..s.len() {
            let factor = s.dynamic_pressure_factor(s.k[i], z, eta)?;
            p += rho * g * s.a[i] * factor * self.theta(i, x, y, t).cos();
        }
        Ok(p)
    }

    fn orbital_velocity(&self, x: f64, y: f64, z: f64, t: f64) -> SimResult<[f64; 3]> {
        let eta = self.elevation(x, y, t)?;
        let s = &self.spectrum;
        let mut v = [0.; 3];
        for i in 0..s.len() {
            let factor = s.dynamic_pressure_factor(s.k[i], z, eta)?;
            let factor_sh = s.dynamic_pressure_factor_sh(s.k[i], z, eta)?;
            let theta = self.theta(i, x, y, t);
            let a_omega = s.a[i] * s.omega[i];
            // The deep-water limit of both factors is exp(-k z); under finite
            // depth the horizontal and vertical profiles differ.
            v[0] += a_omega * factor * theta.cos() * s.cos_psi[i];
            v[1] += a_omega * factor * theta.cos() * s.sin_psi[i];
            v[2] += a_omega * factor_sh * theta.sin();
        }
        Ok(v)
    }

    fn rays(&self) -> Option<(&FlatDiscreteDirectionalWaveSpectrum, &[f64])> {
        Some((&self.spectrum, &self.phase))
    }
}
