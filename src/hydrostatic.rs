//! Elementary hydrostatic computations on polygons of mesh points.
//!
//! Relative immersion is the signed height of free surface above a point,
//! positive underwater. These helpers underpin the mesh intersector and the
//! pressure-integrating force models; their failure modes are programming
//! contract violations, not recoverable runtime conditions.

use crate::error::{SimError, SimResult};
use crate::kinematics::Wrench;
use crate::util::{add, kahan_sum, scale, sub};

/// Number of points of a facet lying underwater (zero counts as underwater).
pub fn immersed_point_count(idx: &[usize], delta_z: &[f64]) -> usize {
    idx.iter().filter(|&&i| delta_z[i] >= 0.).count()
}

/// A facet is partially immersed when its immersed-point count is neither
/// zero nor the full vertex count.
pub fn partially_immersed(idx: &[usize], delta_z: &[f64]) -> bool {
    let n = immersed_point_count(idx, delta_z);
    n != 0 && n != idx.len()
}

/// Average relative immersion of a facet, compensated summation.
pub fn average_immersion(idx: &[usize], delta_z: &[f64]) -> f64 {
    kahan_sum(idx.iter().map(|&i| delta_z[i])) / idx.len() as f64
}

/// Average immersion of a point list whose immersions are given directly.
pub fn average_immersion_of(delta_z: &[f64]) -> f64 {
    kahan_sum(delta_z.iter().copied()) / delta_z.len() as f64
}

/// Index of the first emerged point (first negative immersion scanning
/// forward) and of the last emerged point of that contiguous run.
pub fn first_and_last_emerged_points(z: &[f64]) -> SimResult<(usize, usize)> {
    if z.is_empty() {
        return Err(SimError::geometry("empty immersion list"));
    }
    let first = z
        .iter()
        .position(|&v| v < 0.)
        .ok_or_else(|| SimError::geometry("all points are immersed"))?;
    let last = z[first..]
        .iter()
        .position(|&v| v >= 0.)
        .map(|i| first + i)
        .unwrap_or(z.len());
    Ok((first, last - 1))
}

/// Crossing point of segment AB with the free surface, by linear
/// interpolation between the two relative immersions. Assumes the surface is
/// locally a plane between the two points.
pub fn intersection(a: &[f64; 3], dza: f64, b: &[f64; 3], dzb: f64) -> SimResult<[f64; 3]> {
    if dza * dzb >= 0. {
        return Err(SimError::geometry(format!(
            "intersection requires opposite-sign immersions, got dzA={dza} and dzB={dzb}"
        )));
    }
    let k = dza / (dza - dzb);
    Ok(add(a, &scale(&sub(b, a), k)))
}

/// Successor of `i0` in an ordered index list, wrapping around.
pub fn next(idx: &[usize], i0: usize) -> SimResult<usize> {
    let pos = idx
        .iter()
        .position(|&i| i == i0)
        .ok_or_else(|| SimError::geometry(format!("unable to find index {i0} in list")))?;
    Ok(idx[(pos + 1) % idx.len()])
}

/// Predecessor of `i0` in an ordered index list, wrapping around.
pub fn previous(idx: &[usize], i0: usize) -> SimResult<usize> {
    let pos = idx
        .iter()
        .position(|&i| i == i0)
        .ok_or_else(|| SimError::geometry(format!("unable to find index {i0} in list")))?;
    Ok(idx[(pos + idx.len() - 1) % idx.len()])
}

/// Immersed sub-polygon of a facet given its points and immersions, walking
/// the ordered vertex list and cutting the two boundary edges. Fails unless
/// the immersions are genuinely mixed.
pub fn immersed_polygon(
    points: &[[f64; 3]],
    delta_z: &[f64],
) -> SimResult<Vec<[f64; 3]>> {
    let n = points.len();
    let immersed = delta_z.iter().filter(|&&z| z >= 0.).count();
    if immersed == 0 {
        return Err(SimError::geometry("none of the points are immersed"));
    }
    if immersed == n {
        return Err(SimError::geometry("all the points are immersed"));
    }
    let mut ret = vec![];
    for i in 0..n {
        let (za, zb) = (delta_z[i], delta_z[(i + 1) % n]);
        if za >= 0. {
            ret.push(points[i]);
        }
        if za * zb < 0. {
            ret.push(intersection(&points[i], za, &points[(i + 1) % n], zb)?);
        }
    }
    Ok(ret)
}

/// Hydrostatic wrench of a single facet about reference point `o`: the
/// elementary force ρ·g·z·dS applied at `c`, with `ds` the outward unit
/// normal scaled by the facet area. Pressure pushes against the outward
/// normal. All points share the same frame.
pub fn elementary_wrench(
    frame: &str,
    o: &[f64; 3],
    c: &[f64; 3],
    rho: f64,
    g: f64,
    immersion: f64,
    ds: &[f64; 3],
) -> Wrench {
    let f = scale(ds, -rho * g * immersion);
    Wrench::from_force_at(frame, o, c, f)
}
