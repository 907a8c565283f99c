//! Frames, transforms and wrenches.
//!
//! Every point and wrench carries the name of the reference frame it is
//! expressed in; cross-frame arithmetic goes through [`Kinematics`], the
//! registry of transforms between named frames, which fails loudly when no
//! chain of registered transforms connects two frames.

use std::collections::{HashMap, VecDeque};

use faer::Mat;

use crate::error::{SimError, SimResult};
use crate::util::{add, cross, mat_vec3, sub};

/// Orthonormal 3×3 rotation.
pub type RotationMatrix = Mat<f64>;

/// A 3D coordinate tagged with the frame it is expressed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub frame: String,
    pub v: [f64; 3],
}

impl Point {
    pub fn new(frame: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            frame: frame.into(),
            v: [x, y, z],
        }
    }

    pub fn x(&self) -> f64 {
        self.v[0]
    }

    pub fn y(&self) -> f64 {
        self.v[1]
    }

    pub fn z(&self) -> f64 {
        self.v[2]
    }
}

/// Rotation + translation mapping coordinates from frame `from` to frame
/// `to`: `x_to = r·x_from + t`.
#[derive(Debug, Clone)]
pub struct Transform {
    pub from: String,
    pub to: String,
    r: RotationMatrix,
    t: [f64; 3],
}

impl Transform {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        r: RotationMatrix,
        t: [f64; 3],
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            r,
            t,
        }
    }

    pub fn identity(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, Mat::identity(3, 3), [0.; 3])
    }

    pub fn rot(&self) -> &RotationMatrix {
        &self.r
    }

    pub fn translation(&self) -> [f64; 3] {
        self.t
    }

    /// Rotate a vector (no translation), without frame bookkeeping.
    pub fn rotate(&self, v: &[f64; 3]) -> [f64; 3] {
        mat_vec3(&self.r, v)
    }

    pub fn apply(&self, p: &Point) -> SimResult<Point> {
        if p.frame != self.from {
            return Err(SimError::FrameMismatch {
                expected: self.from.clone(),
                actual: p.frame.clone(),
            });
        }
        Ok(Point {
            frame: self.to.clone(),
            v: add(&mat_vec3(&self.r, &p.v), &self.t),
        })
    }

    /// Transform raw coordinates known to be in the `from` frame.
    pub fn apply_raw(&self, v: &[f64; 3]) -> [f64; 3] {
        add(&mat_vec3(&self.r, v), &self.t)
    }

    pub fn inverse(&self) -> Transform {
        let rt = self.r.as_ref().transpose().to_owned();
        let t = mat_vec3(&rt, &self.t);
        Transform {
            from: self.to.clone(),
            to: self.from.clone(),
            r: rt,
            t: [-t[0], -t[1], -t[2]],
        }
    }

    /// `self: a→b` composed with `other: b→c` gives `a→c`.
    pub fn compose(&self, other: &Transform) -> SimResult<Transform> {
        if self.to != other.from {
            return Err(SimError::FrameMismatch {
                expected: self.to.clone(),
                actual: other.from.clone(),
            });
        }
        Ok(Transform {
            from: self.from.clone(),
            to: other.to.clone(),
            r: &other.r * &self.r,
            t: add(&mat_vec3(&other.r, &self.t), &other.t),
        })
    }
}

/// Generalized force: 3 force + 3 moment components about a stated point,
/// expressed in a stated frame. Accumulation across models assumes all
/// wrenches share frame and reference point; this is checked in debug builds
/// only to keep the hot force-summation path cheap.
#[derive(Debug, Clone)]
pub struct Wrench {
    pub frame: String,
    pub force: [f64; 3],
    pub torque: [f64; 3],
}

impl Wrench {
    pub fn new(frame: impl Into<String>, force: [f64; 3], torque: [f64; 3]) -> Self {
        Self {
            frame: frame.into(),
            force,
            torque,
        }
    }

    pub fn zero(frame: impl Into<String>) -> Self {
        Self::new(frame, [0.; 3], [0.; 3])
    }

    /// Elementary wrench of a force applied at point `c`, reduced about `o`.
    pub fn from_force_at(frame: impl Into<String>, o: &[f64; 3], c: &[f64; 3], f: [f64; 3]) -> Self {
        let arm = sub(c, o);
        Self::new(frame, f, cross(&arm, &f))
    }

    pub fn accumulate(&mut self, other: &Wrench) {
        debug_assert_eq!(self.frame, other.frame);
        for i in 0..3 {
            self.force[i] += other.force[i];
            self.torque[i] += other.torque[i];
        }
    }

    pub fn to_vector(&self) -> [f64; 6] {
        [
            self.force[0],
            self.force[1],
            self.force[2],
            self.torque[0],
            self.torque[1],
            self.torque[2],
        ]
    }
}

/// Registry of transforms between named frames.
///
/// Holds the frame graph rebuilt every integration sub-step (NED↔body) plus
/// the static body↔mesh transforms; `get` composes along the shortest chain
/// of registered transforms.
#[derive(Default)]
pub struct Kinematics {
    neighbors: HashMap<String, Vec<String>>,
    transforms: HashMap<(String, String), Transform>,
}

impl Kinematics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform (both directions become available); an existing
    /// transform between the same frames is replaced.
    pub fn add(&mut self, t: Transform) {
        let inv = t.inverse();
        let forward = self.neighbors.entry(t.from.clone()).or_default();
        forward.retain(|n| n != &t.to);
        forward.push(t.to.clone());
        let backward = self.neighbors.entry(t.to.clone()).or_default();
        backward.retain(|n| n != &t.from);
        backward.push(t.from.clone());
        self.transforms
            .insert((inv.from.clone(), inv.to.clone()), inv);
        self.transforms.insert((t.from.clone(), t.to.clone()), t);
    }

    /// Transform mapping `from` coordinates to `to` coordinates.
    pub fn get(&self, from: &str, to: &str) -> SimResult<Transform> {
        if from == to {
            return Ok(Transform::identity(from, to));
        }
        if let Some(t) = self.transforms.get(&(from.to_string(), to.to_string())) {
            return Ok(t.clone());
        }
        // Breadth-first search over the frame graph.
        let mut prev: HashMap<&str, &str> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        while let Some(frame) = queue.pop_front() {
            if frame == to {
                break;
            }
            if let Some(ns) = self.neighbors.get(frame) {
                for n in ns {
                    if n.as_str() != from && !prev.contains_key(n.as_str()) {
                        prev.insert(n, frame);
                        queue.push_back(n);
                    }
                }
            }
        }
        if !prev.contains_key(to) {
            return Err(SimError::NoPathBetweenFrames {
                from: from.into(),
                to: to.into(),
            });
        }
        let mut chain = vec![to];
        while let Some(&p) = prev.get(chain.last().unwrap()) {
            chain.push(p);
            if p == from {
                break;
            }
        }
        chain.reverse();
        let mut t = self.transforms[&(chain[0].to_string(), chain[1].to_string())].clone();
        for w in chain[1..].windows(2) {
            t = t.compose(&self.transforms[&(w[0].to_string(), w[1].to_string())])?;
        }
        Ok(t)
    }
}
