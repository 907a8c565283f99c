//! Directional wave-spectrum discretization.
//!
//! A continuous spectral density S(ω) and directional spreading D(ψ) are
//! sampled into discrete rays; each ray carries an amplitude
//! `a = √(2·S·D·Δω·Δψ)`. The discretized spectrum also owns the
//! depth/stretching-corrected dynamic-pressure attenuation rule consumed by
//! every wave-coupled force.

use std::f64::consts::PI;

use crate::error::{SimError, SimResult};

/// Frequency spectrum S(ω).
pub trait WaveSpectralDensity {
    fn density(&self, omega: f64) -> f64;

    /// Discretization support over [omega_min, omega_max].
    fn angular_frequencies(
        &self,
        omega_min: f64,
        omega_max: f64,
        nfreq: usize,
    ) -> SimResult<Vec<f64>>;
}

/// Directional spreading D(ψ).
pub trait WaveDirectionalSpreading {
    fn spreading(&self, psi: f64) -> f64;

    /// Discretization support (ndir directions).
    fn directions(&self, ndir: usize) -> Vec<f64>;
}

/// Regular wave of significant height Hs at a single angular frequency.
/// Its discrete density integrates to Hs²/8 so the single ray has amplitude
/// Hs/2.
pub struct DiracSpectralDensity {
    pub omega0: f64,
    pub hs: f64,
}

impl DiracSpectralDensity {
    pub fn new(omega0: f64, hs: f64) -> Self {
        Self { omega0, hs }
    }
}

impl WaveSpectralDensity for DiracSpectralDensity {
    fn density(&self, omega: f64) -> f64 {
        if omega == self.omega0 {
            self.hs * self.hs / 8.
        } else {
            0.
        }
    }

    fn angular_frequencies(
        &self,
        omega_min: f64,
        omega_max: f64,
        _nfreq: usize,
    ) -> SimResult<Vec<f64>> {
        if self.omega0 < omega_min || self.omega0 > omega_max {
            return Err(SimError::invalid_input(format!(
                "Dirac frequency {} outside requested range [{omega_min}, {omega_max}]",
                self.omega0
            )));
        }
        Ok(vec![self.omega0])
    }
}

/// Two-parameter Bretschneider spectrum (fully developed sea).
pub struct BretschneiderSpectrum {
    pub hs: f64,
    pub tp: f64,
}

impl BretschneiderSpectrum {
    pub fn new(hs: f64, tp: f64) -> Self {
        Self { hs, tp }
    }
}

impl WaveSpectralDensity for BretschneiderSpectrum {
    fn density(&self, omega: f64) -> f64 {
        let wp = 2. * PI / self.tp;
        let r = wp / omega;
        5. / 16. * self.hs * self.hs * r.powi(4) / omega * (-1.25 * r.powi(4)).exp()
    }

    fn angular_frequencies(
        &self,
        omega_min: f64,
        omega_max: f64,
        nfreq: usize,
    ) -> SimResult<Vec<f64>> {
        if nfreq < 2 || omega_max <= omega_min {
            return Err(SimError::invalid_input(format!(
                "need at least two frequencies over a non-empty range, got n={nfreq} over \
                 [{omega_min}, {omega_max}]"
            )));
        }
        let domega = (omega_max - omega_min) / (nfreq - 1) as f64;
        Ok((0..nfreq).map(|i| omega_min + i as f64 * domega).collect())
    }
}

/// All the energy propagates along a single direction psi0 (NED, radians).
pub struct DiracDirectionalSpreading {
    pub psi0: f64,
}

impl DiracDirectionalSpreading {
    pub fn new(psi0: f64) -> Self {
        Self { psi0 }
    }
}

impl WaveDirectionalSpreading for DiracDirectionalSpreading {
    fn spreading(&self, _psi: f64) -> f64 {
        1.
    }

    fn directions(&self, _ndir: usize) -> Vec<f64> {
        vec![self.psi0]
    }
}

/// cos^{2s} spreading about a primary direction. The discrete weights are
/// normalized numerically in [`discretize`], which sidesteps the Γ-function
/// closed form.
pub struct Cos2sSpreading {
    pub psi0: f64,
    pub s: f64,
}

impl Cos2sSpreading {
    pub fn new(psi0: f64, s: f64) -> Self {
        Self { psi0, s }
    }
}

impl WaveDirectionalSpreading for Cos2sSpreading {
    fn spreading(&self, psi: f64) -> f64 {
        ((psi - self.psi0) / 2.).cos().powf(2. * self.s)
    }

    fn directions(&self, ndir: usize) -> Vec<f64> {
        let dpsi = 2. * PI / ndir as f64;
        (0..ndir)
            .map(|j| self.psi0 - PI + (j as f64 + 0.5) * dpsi)
            .collect()
    }
}

/// Vertical rescaling applied near a deformed free surface so that
/// depth-dependent kinematics formulas stay well defined under the actual
/// elevation. `delta = 0` disables stretching, `delta = 1` is full Wheeler
/// stretching.
#[derive(Debug, Clone, Copy)]
pub struct Stretching {
    pub delta: f64,
}

impl Default for Stretching {
    fn default() -> Self {
        Self { delta: 1. }
    }
}

impl Stretching {
    /// Equivalent depth below the mean water level of NED-z `z` under
    /// elevation `eta` (positive up).
    pub fn rescaled_z(&self, z: f64, eta: f64, depth: Option<f64>) -> f64 {
        if eta == 0. || self.delta == 0. {
            return z;
        }
        let e = self.delta * eta;
        match depth {
            None => z + e,
            Some(h) => h * (z + e) / (h + e),
        }
    }
}

/// Wave number from the dispersion relation ω² = g·k·tanh(k·h).
pub fn wave_number(omega: f64, g: f64, depth: Option<f64>) -> f64 {
    let k_inf = omega * omega / g;
    match depth {
        None => k_inf,
        Some(h) => {
            // Newton iterations from the deep-water guess.
            let mut k = k_inf.max(1e-12);
            for _ in 0..50 {
                let th = (k * h).tanh();
                let f = g * k * th - omega * omega;
                let df = g * th + g * k * h * (1. - th * th);
                let step = f / df;
                k -= step;
                if step.abs() < 1e-14 * k.abs() {
                    break;
                }
            }
            k
        }
    }
}

/// Discrete directional spectrum: frequency/direction rays plus the
/// dynamic-pressure attenuation rule. Immutable once built.
pub struct DiscreteDirectionalWaveSpectrum {
    pub omega: Vec<f64>,
    pub psi: Vec<f64>,
    pub k: Vec<f64>,
    pub si: Vec<f64>,
    pub dj: Vec<f64>,
    pub domega: f64,
    pub dpsi: f64,
    pub depth: Option<f64>,
    pub stretching: Stretching,
}

/// Depth/stretching-corrected attenuation of the dynamic pressure at NED-z
/// `z` under elevation `eta`. NaN inputs are rejected as a fatal internal
/// error rather than silently propagated through the force sum.
pub fn dynamic_pressure_factor(
    k: f64,
    z: f64,
    eta: f64,
    depth: Option<f64>,
    stretching: Stretching,
) -> SimResult<f64> {
    if z.is_nan() {
        return Err(SimError::internal("z (value to rescale, in m) was NaN"));
    }
    if eta.is_nan() {
        return Err(SimError::internal("eta (wave elevation, in m) was NaN"));
    }
    // Above the instantaneous free surface: no water, no pressure.
    if eta != 0. && z < -eta {
        return Ok(0.);
    }
    let zr = stretching.rescaled_z(z, eta, depth);
    Ok(match depth {
        None => (-k * zr).exp(),
        Some(h) => {
            if z > h {
                0.
            } else {
                (k * (h - zr)).cosh() / (k * h).cosh()
            }
        }
    })
}

/// Same attenuation with the hyperbolic sine numerator, used for the
/// vertical orbital-velocity component under finite depth.
pub fn dynamic_pressure_factor_sh(
    k: f64,
    z: f64,
    eta: f64,
    depth: Option<f64>,
    stretching: Stretching,
) -> SimResult<f64> {
    if z.is_nan() {
        return Err(SimError::internal("z (value to rescale, in m) was NaN"));
    }
    if eta.is_nan() {
        return Err(SimError::internal("eta (wave elevation, in m) was NaN"));
    }
    if eta != 0. && z < -eta {
        return Ok(0.);
    }
    let zr = stretching.rescaled_z(z, eta, depth);
    Ok(match depth {
        None => (-k * zr).exp(),
        Some(h) => {
            if z > h {
                0.
            } else {
                (k * (h - zr)).sinh() / (k * h).cosh()
            }
        }
    })
}

impl DiscreteDirectionalWaveSpectrum {
    pub fn dynamic_pressure_factor(&self, k: f64, z: f64, eta: f64) -> SimResult<f64> {
        dynamic_pressure_factor(k, z, eta, self.depth, self.stretching)
    }

    pub fn dynamic_pressure_factor_sh(&self, k: f64, z: f64, eta: f64) -> SimResult<f64> {
        dynamic_pressure_factor_sh(k, z, eta, self.depth, self.stretching)
    }
}

/// Discretize a continuous spectrum into frequency/direction rays.
///
/// Finite depth uses the full dispersion relation and refuses genuinely
/// shallow water (k·h < π/10), where a different wave theory is required.
pub fn discretize(
    s: &dyn WaveSpectralDensity,
    d: &dyn WaveDirectionalSpreading,
    omega_min: f64,
    omega_max: f64,
    nfreq: usize,
    g: f64,
    depth: Option<f64>,
    stretching: Stretching,
) -> SimResult<DiscreteDirectionalWaveSpectrum> {
    let omega = s.angular_frequencies(omega_min, omega_max, nfreq)?;
    let psi = d.directions(nfreq);
    let domega = if omega.len() > 1 {
        omega[1] - omega[0]
    } else {
        1.
    };
    let dpsi = if psi.len() > 1 { psi[1] - psi[0] } else { 1. };
    let si = omega.iter().map(|&w| s.density(w)).collect::<Vec<_>>();
    let mut dj = psi.iter().map(|&p| d.spreading(p)).collect::<Vec<_>>();
    // Normalize the spreading weights so they integrate to one.
    let total: f64 = dj.iter().sum::<f64>() * dpsi;
    if total > 0. {
        dj.iter_mut().for_each(|v| *v /= total);
    }
    let k = omega
        .iter()
        .map(|&w| wave_number(w, g, depth))
        .collect::<Vec<_>>();
    if let Some(h) = depth {
        for (i, &ki) in k.iter().enumerate() {
            if ki * h < PI / 10. {
                return Err(SimError::invalid_input(format!(
                    "water depth h = {h} m is shallow compared to the wave length {} m at \
                     omega = {}: a shallow-water model is required",
                    2. * PI / ki,
                    omega[i]
                )));
            }
        }
    }
    Ok(DiscreteDirectionalWaveSpectrum {
        omega,
        psi,
        k,
        si,
        dj,
        domega,
        dpsi,
        depth,
        stretching,
    })
}

/// Spectrum with the frequency and direction loops unrolled: one entry per
/// ray, amplitudes precomputed.
pub struct FlatDiscreteDirectionalWaveSpectrum {
    pub a: Vec<f64>,
    pub k: Vec<f64>,
    pub omega: Vec<f64>,
    pub psi: Vec<f64>,
    pub cos_psi: Vec<f64>,
    pub sin_psi: Vec<f64>,
    pub depth: Option<f64>,
    pub stretching: Stretching,
}

impl DiscreteDirectionalWaveSpectrum {
    /// Unroll the frequency and direction loops; every ray is kept.
    pub fn flatten(&self) -> FlatDiscreteDirectionalWaveSpectrum {
        let n = self.omega.len() * self.psi.len();
        let mut flat = FlatDiscreteDirectionalWaveSpectrum {
            a: Vec::with_capacity(n),
            k: Vec::with_capacity(n),
            omega: Vec::with_capacity(n),
            psi: Vec::with_capacity(n),
            cos_psi: Vec::with_capacity(n),
            sin_psi: Vec::with_capacity(n),
            depth: self.depth,
            stretching: self.stretching,
        };
        for (i, &w) in self.omega.iter().enumerate() {
            for (j, &p) in self.psi.iter().enumerate() {
                flat.a
                    .push((2. * self.si[i] * self.dj[j] * self.domega * self.dpsi).sqrt());
                flat.k.push(self.k[i]);
                flat.omega.push(w);
                flat.psi.push(p);
                flat.cos_psi.push(p.cos());
                flat.sin_psi.push(p.sin());
            }
        }
        flat
    }
}

impl FlatDiscreteDirectionalWaveSpectrum {
    pub fn dynamic_pressure_factor(&self, k: f64, z: f64, eta: f64) -> SimResult<f64> {
        dynamic_pressure_factor(k, z, eta, self.depth, self.stretching)
    }

    pub fn dynamic_pressure_factor_sh(&self, k: f64, z: f64, eta: f64) -> SimResult<f64> {
        dynamic_pressure_factor_sh(k, z, eta, self.depth, self.stretching)
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Superpose another component sea state (e.g. swell + wind sea).
    pub fn extend(&mut self, other: &FlatDiscreteDirectionalWaveSpectrum) {
        self.a.extend_from_slice(&other.a);
        self.k.extend_from_slice(&other.k);
        self.omega.extend_from_slice(&other.omega);
        self.psi.extend_from_slice(&other.psi);
        self.cos_psi.extend_from_slice(&other.cos_psi);
        self.sin_psi.extend_from_slice(&other.sin_psi);
    }
}
