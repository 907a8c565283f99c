//! Wave field models: spectral description, discretization and the Airy
//! linear-superposition model.

pub mod airy;
pub mod spectrum;

pub use airy::Airy;
pub use spectrum::{
    discretize, BretschneiderSpectrum, Cos2sSpreading, DiracDirectionalSpreading,
    DiracSpectralDensity, DiscreteDirectionalWaveSpectrum, FlatDiscreteDirectionalWaveSpectrum,
    Stretching,
};

use crate::error::SimResult;

/// Ambient wave field: elevation, dynamic pressure and orbital velocity at a
/// point and time. Elevation is positive upward; coordinates are NED
/// (z positive down), so a point's relative immersion is `z + elevation`.
pub trait WaveModel {
    /// Free-surface elevation at (x, y), positive upward.
    fn elevation(&self, x: f64, y: f64, t: f64) -> SimResult<f64>;

    /// Wave-induced dynamic pressure at NED position (x, y, z).
    fn dynamic_pressure(&self, rho: f64, g: f64, x: f64, y: f64, z: f64, t: f64)
        -> SimResult<f64>;

    /// Orbital velocity of the fluid at NED position (x, y, z).
    fn orbital_velocity(&self, x: f64, y: f64, z: f64, t: f64) -> SimResult<[f64; 3]>;

    /// Relative immersion (positive = underwater) of a set of NED points.
    fn relative_immersions(&self, points: &[[f64; 3]], t: f64) -> SimResult<Vec<f64>> {
        points
            .iter()
            .map(|p| Ok(p[2] + self.elevation(p[0], p[1], t)?))
            .collect()
    }

    /// Discrete rays and phases of the underlying spectrum, when the model
    /// has one. Wave-excitation force models interpolate their RAO tables
    /// against these rays.
    fn rays(&self) -> Option<(&FlatDiscreteDirectionalWaveSpectrum, &[f64])> {
        None
    }
}

/// Flat, motionless free surface. Default wave model when no spectrum is
/// configured.
pub struct StillWater;

impl WaveModel for StillWater {
    fn elevation(&self, _x: f64, _y: f64, _t: f64) -> SimResult<f64> {
        Ok(0.)
    }

    fn dynamic_pressure(
        &self,
        _rho: f64,
        _g: f64,
        _x: f64,
        _y: f64,
        _z: f64,
        _t: f64,
    ) -> SimResult<f64> {
        Ok(0.)
    }

    fn orbital_velocity(&self, _x: f64, _y: f64, _z: f64, _t: f64) -> SimResult<[f64; 3]> {
        Ok([0.; 3])
    }
}
