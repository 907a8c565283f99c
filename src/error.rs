use thiserror::Error;

/// Result alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;

/// Error taxonomy of the simulator.
///
/// Configuration and singular-inertia errors are fatal at build time.
/// Geometry-contract violations indicate an inconsistent mesh or wave-field
/// state upstream and are never recoverable. Out-of-domain table lookups are
/// typed so the call site can decide a fallback policy.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("unknown force model '{name}', expected one of {supported:?}")]
    UnknownForceModel {
        name: String,
        supported: Vec<String>,
    },

    #[error("rotation convention '{convention}' is not supported, expected one of {supported:?}")]
    UnsupportedRotationConvention {
        convention: String,
        supported: Vec<String>,
    },

    #[error(
        "unable to compute the inverse of the total inertia matrix \
         (rigid body inertia + added mass): {message}"
    )]
    SingularInertia { message: String },

    #[error("geometry contract violation: {message}")]
    GeometryContract { message: String },

    #[error("invalid mesh: {message}")]
    InvalidMesh { message: String },

    #[error("no transform chain between frames '{from}' and '{to}'")]
    NoPathBetweenFrames { from: String, to: String },

    #[error("frame mismatch: expected '{expected}', got '{actual}'")]
    FrameMismatch { expected: String, actual: String },

    #[error("{table}: value {value} outside table domain [{min}, {max}]")]
    OutOfDomain {
        table: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("hydrodynamic database has no '{section}' section")]
    MissingHdbSection { section: String },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SimError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn geometry(message: impl Into<String>) -> Self {
        Self::GeometryContract {
            message: message.into(),
        }
    }

    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
