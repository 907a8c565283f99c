//! selkie — time-domain seakeeping simulator.
//!
//! Integrates the rigid-body equations of motion of floating bodies under
//! hydrostatic, gravitational, hydrodynamic (added mass, radiation damping,
//! diffraction) and wave-excitation forces. Each body carries a triangulated
//! hull mesh whose intersection with the instantaneous free surface is
//! recomputed at every derivative evaluation; forces integrate pressure over
//! the resulting wetted surface.
//!
//! The crate consumes already-parsed inputs: a declarative simulation
//! specification ([`config`]), a triangle list per body (from an external
//! STL reader) and optional precomputed hydrodynamic tables ([`hdb`]). The
//! external stepper drives [`sim::Sim`] through the [`solver::System`]
//! contract.

pub mod body;
pub mod config;
pub mod error;
pub mod forces;
pub mod hdb;
pub mod hydrostatic;
pub mod intersector;
pub mod kinematics;
pub mod mesh;
pub mod observer;
pub mod sim;
pub mod solver;
pub mod util;
pub mod waves;

pub use error::{SimError, SimResult};
