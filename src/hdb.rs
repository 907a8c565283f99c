//! Precomputed hydrodynamic database (HDB) tables.
//!
//! The tables come from an external frequency-domain panel-method solver and
//! reach this crate already parsed: added-mass matrices per period,
//! radiation damping coefficients over a frequency vector, and diffraction
//! module/phase tables over (frequency, heading). This module only
//! interpolates; lookups outside a table's domain are typed errors so the
//! caller can decide a fallback policy.

use std::f64::consts::PI;

use faer::Mat;

use crate::error::{SimError, SimResult};

/// Piecewise-linear interpolation over an ascending abscissa vector.
pub fn interpolate_1d(table: &'static str, xs: &[f64], ys: &[f64], x: f64) -> SimResult<f64> {
    debug_assert_eq!(xs.len(), ys.len());
    let (min, max) = (xs[0], xs[xs.len() - 1]);
    if x < min || x > max {
        return Err(SimError::OutOfDomain {
            table,
            value: x,
            min,
            max,
        });
    }
    let i = match xs.iter().position(|&v| v >= x) {
        Some(0) => return Ok(ys[0]),
        Some(i) => i,
        None => return Ok(ys[ys.len() - 1]),
    };
    let w = (x - xs[i - 1]) / (xs[i] - xs[i - 1]);
    Ok(ys[i - 1] * (1. - w) + ys[i] * w)
}

/// A value table over (frequency, heading), bilinear interpolation.
#[derive(Debug, Clone)]
pub struct Table2d {
    pub omega: Vec<f64>,
    pub psi: Vec<f64>,
    /// `values[i][j]` at (omega\[i\], psi\[j\]).
    pub values: Vec<Vec<f64>>,
}

impl Table2d {
    fn bracket(table: &'static str, xs: &[f64], x: f64) -> SimResult<(usize, f64)> {
        let (min, max) = (xs[0], xs[xs.len() - 1]);
        if x < min || x > max {
            return Err(SimError::OutOfDomain {
                table,
                value: x,
                min,
                max,
            });
        }
        match xs.iter().position(|&v| v >= x) {
            Some(0) | None => Ok((0, 0.)),
            Some(i) => Ok((i - 1, (x - xs[i - 1]) / (xs[i] - xs[i - 1]))),
        }
    }

    pub fn interpolate(&self, table: &'static str, omega: f64, psi: f64) -> SimResult<f64> {
        let (i, u) = Self::bracket(table, &self.omega, omega)?;
        let (j, v) = Self::bracket(table, &self.psi, psi)?;
        let i1 = (i + 1).min(self.omega.len() - 1);
        let j1 = (j + 1).min(self.psi.len() - 1);
        Ok(self.values[i][j] * (1. - u) * (1. - v)
            + self.values[i1][j] * u * (1. - v)
            + self.values[i][j1] * (1. - u) * v
            + self.values[i1][j1] * u * v)
    }
}

/// Already-parsed hydrodynamic database.
pub struct HdbData {
    /// 6×6 added-mass matrix per period, ascending periods.
    pub added_mass: Vec<(f64, Mat<f64>)>,
    /// Angular frequencies of the radiation damping tables.
    pub radiation_omega: Vec<f64>,
    /// `radiation_damping[i][j]` is B_ij over `radiation_omega`.
    pub radiation_damping: Option<[[Vec<f64>; 6]; 6]>,
    /// Diffraction module tables, one per force/moment axis.
    pub diffraction_module: Option<[Table2d; 6]>,
    /// Diffraction phase tables, one per force/moment axis.
    pub diffraction_phase: Option<[Table2d; 6]>,
}

impl HdbData {
    /// Added mass at the infinite-frequency limit (first tabulated period).
    pub fn added_mass(&self) -> SimResult<Mat<f64>> {
        self.added_mass
            .first()
            .map(|(_, m)| m.clone())
            .ok_or_else(|| SimError::MissingHdbSection {
                section: "added mass".into(),
            })
    }

    /// Added mass interpolated at a given period.
    pub fn added_mass_at_period(&self, tp: f64) -> SimResult<Mat<f64>> {
        if self.added_mass.is_empty() {
            return Err(SimError::MissingHdbSection {
                section: "added mass".into(),
            });
        }
        if tp == 0. {
            return self.added_mass();
        }
        let periods: Vec<f64> = self.added_mass.iter().map(|(t, _)| *t).collect();
        let mut m = Mat::<f64>::zeros(6, 6);
        for r in 0..6 {
            for c in 0..6 {
                let values: Vec<f64> = self.added_mass.iter().map(|(_, m)| m[(r, c)]).collect();
                m[(r, c)] = interpolate_1d("added mass", &periods, &values, tp)?;
            }
        }
        Ok(m)
    }

    /// Radiation damping coefficient B_ij over the table's frequency vector.
    pub fn radiation_damping(&self, i: usize, j: usize) -> SimResult<&[f64]> {
        self.radiation_damping
            .as_ref()
            .map(|b| b[i][j].as_slice())
            .ok_or_else(|| SimError::MissingHdbSection {
                section: "radiation damping".into(),
            })
    }

    pub fn diffraction_module(&self) -> SimResult<&[Table2d; 6]> {
        self.diffraction_module
            .as_ref()
            .ok_or_else(|| SimError::MissingHdbSection {
                section: "diffraction module".into(),
            })
    }

    pub fn diffraction_phase(&self) -> SimResult<&[Table2d; 6]> {
        self.diffraction_phase
            .as_ref()
            .ok_or_else(|| SimError::MissingHdbSection {
                section: "diffraction phase".into(),
            })
    }
}

/// Interpolates the diffraction RAO tables at arbitrary (frequency,
/// heading), optionally mirroring headings beyond 180° onto the tabulated
/// 0–180° half-plane.
pub struct DiffractionInterpolator {
    module: [Table2d; 6],
    phase: [Table2d; 6],
    mirror: bool,
}

impl DiffractionInterpolator {
    pub fn new(data: &HdbData, mirror: bool) -> SimResult<Self> {
        Ok(Self {
            module: data.diffraction_module()?.clone(),
            phase: data.diffraction_phase()?.clone(),
            mirror,
        })
    }

    fn fold(&self, psi: f64) -> f64 {
        let psi = psi.rem_euclid(2. * PI);
        if self.mirror && psi > PI {
            2. * PI - psi
        } else {
            psi
        }
    }

    /// RAO module for one force/moment axis (0..3 force, 3..6 moment).
    pub fn module(&self, axis: usize, omega: f64, psi: f64) -> SimResult<f64> {
        self.module[axis].interpolate("diffraction module", omega, self.fold(psi))
    }

    /// RAO phase for one force/moment axis.
    pub fn phase(&self, axis: usize, omega: f64, psi: f64) -> SimResult<f64> {
        self.phase[axis].interpolate("diffraction phase", omega, self.fold(psi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(values: Vec<Vec<f64>>) -> Table2d {
        Table2d {
            omega: vec![1., 2., 3.],
            psi: vec![0., PI],
            values,
        }
    }

    fn hdb_with_diffraction() -> HdbData {
        let module = std::array::from_fn(|axis| {
            table(vec![
                vec![axis as f64, 1.],
                vec![2., 3.],
                vec![4., 5.],
            ])
        });
        let phase = std::array::from_fn(|_| table(vec![vec![0.; 2]; 3]));
        HdbData {
            added_mass: vec![
                (1., Mat::identity(6, 6)),
                (3., Mat::from_fn(6, 6, |i, j| if i == j { 3. } else { 0. })),
            ],
            radiation_omega: vec![0.5, 1., 2.],
            radiation_damping: None,
            diffraction_module: Some(module),
            diffraction_phase: Some(phase),
        }
    }

    #[test]
    fn linear_interpolation_between_support_points() {
        let xs = [1., 2., 4.];
        let ys = [10., 20., 0.];
        assert_relative_eq!(interpolate_1d("t", &xs, &ys, 1.5).unwrap(), 15.);
        assert_relative_eq!(interpolate_1d("t", &xs, &ys, 3.).unwrap(), 10.);
        assert_relative_eq!(interpolate_1d("t", &xs, &ys, 1.).unwrap(), 10.);
        assert_relative_eq!(interpolate_1d("t", &xs, &ys, 4.).unwrap(), 0.);
    }

    #[test]
    fn out_of_domain_lookup_is_a_typed_error() {
        let xs = [1., 2.];
        let ys = [10., 20.];
        let err = interpolate_1d("radiation damping", &xs, &ys, 5.).unwrap_err();
        assert!(matches!(err, SimError::OutOfDomain { .. }));
    }

    #[test]
    fn bilinear_interpolation() {
        let t = table(vec![vec![0., 10.], vec![2., 12.], vec![4., 14.]]);
        assert_relative_eq!(t.interpolate("t", 1.5, 0.).unwrap(), 1.);
        assert_relative_eq!(t.interpolate("t", 1., PI / 2.).unwrap(), 5.);
        assert_relative_eq!(t.interpolate("t", 2., PI).unwrap(), 12.);
    }

    #[test]
    fn added_mass_interpolates_in_period() {
        let hdb = hdb_with_diffraction();
        let m = hdb.added_mass_at_period(2.).unwrap();
        assert_relative_eq!(m[(0, 0)], 2.);
        // Tp = 0 means the infinite-frequency limit, i.e. the first entry.
        assert_relative_eq!(hdb.added_mass_at_period(0.).unwrap()[(0, 0)], 1.);
    }

    #[test]
    fn missing_section_is_reported() {
        let hdb = hdb_with_diffraction();
        assert!(matches!(
            hdb.radiation_damping(0, 0),
            Err(SimError::MissingHdbSection { .. })
        ));
    }

    #[test]
    fn mirroring_folds_headings_beyond_180_degrees() {
        let hdb = hdb_with_diffraction();
        let interp = DiffractionInterpolator::new(&hdb, true).unwrap();
        let direct = interp.module(0, 2., PI / 3.).unwrap();
        let mirrored = interp.module(0, 2., 2. * PI - PI / 3.).unwrap();
        assert_relative_eq!(direct, mirrored);
    }

    #[test]
    fn without_mirroring_folded_heading_is_out_of_domain() {
        let hdb = hdb_with_diffraction();
        let interp = DiffractionInterpolator::new(&hdb, false).unwrap();
        assert!(interp.module(0, 2., 3. * PI / 2.).is_err());
    }
}
