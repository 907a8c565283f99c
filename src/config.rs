//! Declarative simulation input.
//!
//! Plain immutable data structures describing bodies, environment and force
//! models, deserialized once (e.g. from YAML) before being handed to the
//! builders. No part of the physics core parses configuration text.

use serde::Deserialize;

use crate::error::{SimError, SimResult};

/// Euler-angle rotation convention. Only the intrinsic z-y'-x'' Cardan
/// sequence, ordered by angle, is currently supported.
#[derive(Debug, Clone, Deserialize)]
pub struct RotationsSpec {
    pub order_by: String,
    pub convention: Vec<String>,
}

impl Default for RotationsSpec {
    fn default() -> Self {
        Self {
            order_by: "angle".into(),
            convention: vec!["z".into(), "y'".into(), "x''".into()],
        }
    }
}

impl RotationsSpec {
    pub fn validate(&self) -> SimResult<()> {
        let supported = vec!["angle: z, y', x''".to_string()];
        if self.order_by != "angle" {
            return Err(SimError::UnsupportedRotationConvention {
                convention: format!("order by '{}'", self.order_by),
                supported,
            });
        }
        if self.convention != ["z", "y'", "x''"] {
            return Err(SimError::UnsupportedRotationConvention {
                convention: self.convention.join(","),
                supported,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AngleSpec {
    #[serde(default)]
    pub phi: f64,
    #[serde(default)]
    pub theta: f64,
    #[serde(default)]
    pub psi: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PositionSpec {
    #[serde(default)]
    pub coordinates: [f64; 3],
    #[serde(default)]
    pub angle: AngleSpec,
}

/// 6×6 matrix given row by row.
pub type MatrixRows = [[f64; 6]; 6];

/// Added mass: either a literal matrix or a reference into the
/// hydrodynamic database handed to the builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddedMassSpec {
    Matrix(MatrixRows),
    FromHdb {
        /// Period at which to extract the added mass; 0 means the
        /// infinite-frequency limit.
        period: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DynamicsSpec {
    pub mass: f64,
    #[serde(default)]
    pub centre_of_inertia: [f64; 3],
    pub rigid_body_inertia: MatrixRows,
    pub added_mass: AddedMassSpec,
}

/// One force model declaration. `model` selects the implementation; the
/// remaining fields are read by whichever model needs them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForceSpec {
    pub model: String,
    /// GM model: roll step for the finite difference (rad).
    #[serde(default)]
    pub roll_step: Option<f64>,
    /// GM model: name of the wrapped hydrostatic model.
    #[serde(default)]
    pub hydrostatic_model: Option<String>,
    /// Linear hydrostatics: 3×3 stiffness over (z, phi, theta).
    #[serde(default)]
    pub stiffness: Option<[[f64; 3]; 3]>,
    /// Linear hydrostatics: equilibrium position.
    #[serde(default)]
    pub z_eq: Option<f64>,
    #[serde(default)]
    pub phi_eq: Option<f64>,
    #[serde(default)]
    pub theta_eq: Option<f64>,
    /// Diffraction: mirror headings beyond 180° onto the tabulated range.
    #[serde(default)]
    pub mirror: Option<bool>,
    /// Radiation damping: length of the retardation-kernel tail (s).
    #[serde(default)]
    pub tau_max: Option<f64>,
    /// Radiation damping: number of kernel samples.
    #[serde(default)]
    pub nb_of_points: Option<usize>,
}

impl ForceSpec {
    pub fn named(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BodySpec {
    pub name: String,
    pub dynamics: DynamicsSpec,
    /// Where the body frame sits in the mesh frame.
    #[serde(default)]
    pub position_of_body_frame_relative_to_mesh: PositionSpec,
    #[serde(default)]
    pub initial_position: PositionSpec,
    /// Initial (u, v, w, p, q, r) in the body frame.
    #[serde(default)]
    pub initial_velocity: [f64; 6],
    #[serde(default)]
    pub forces: Vec<ForceSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum SpectrumShapeSpec {
    Dirac { omega0: f64, hs: f64 },
    Bretschneider { hs: f64, tp: f64 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum SpreadingSpec {
    Dirac { psi0: f64 },
    Cos2s { psi0: f64, s: f64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaveComponentSpec {
    pub spectrum: SpectrumShapeSpec,
    pub spreading: SpreadingSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WavesSpec {
    #[serde(default)]
    pub seed: u64,
    pub omega_min: f64,
    pub omega_max: f64,
    pub nfreq: usize,
    /// Water depth in metres; omitted means infinite depth.
    #[serde(default)]
    pub depth: Option<f64>,
    /// Wheeler-stretching weight, 0 disables, 1 is full stretching.
    #[serde(default = "default_stretching_delta")]
    pub stretching_delta: f64,
    pub components: Vec<WaveComponentSpec>,
}

fn default_stretching_delta() -> f64 {
    1.
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentSpec {
    #[serde(default = "default_g")]
    pub g: f64,
    #[serde(default = "default_rho")]
    pub rho: f64,
    #[serde(default)]
    pub waves: Option<WavesSpec>,
}

fn default_g() -> f64 {
    9.81
}

fn default_rho() -> f64 {
    1025.
}

impl Default for EnvironmentSpec {
    fn default() -> Self {
        Self {
            g: default_g(),
            rho: default_rho(),
            waves: None,
        }
    }
}

/// Root of the declarative simulation input.
#[derive(Debug, Clone, Deserialize)]
pub struct SimSpec {
    #[serde(default)]
    pub rotations: RotationsSpec,
    #[serde(default)]
    pub environment: EnvironmentSpec,
    pub bodies: Vec<BodySpec>,
}
