//! Fixed-step time integration.
//!
//! The simulator only exposes its derivative; the stepping scheme is
//! external configuration. Euler and classic fourth-order Runge-Kutta cover
//! the regression tests and the demo; anything fancier can wrap
//! [`System`] the same way.

use crate::error::SimResult;
use crate::sim::Sim;

/// An ODE system: fills `dx_dt` from `(x, t)`.
pub trait System {
    fn derivative(&mut self, x: &[f64], dx_dt: &mut [f64], t: f64) -> SimResult<()>;
}

impl System for Sim {
    fn derivative(&mut self, x: &[f64], dx_dt: &mut [f64], t: f64) -> SimResult<()> {
        Sim::derivative(self, x, dx_dt, t)
    }
}

/// Advances a state vector by one time step.
pub trait Stepper {
    fn step(&self, system: &mut dyn System, x: &mut [f64], t: f64, dt: f64) -> SimResult<()>;
}

/// Explicit first-order Euler.
pub struct EulerStepper;

impl Stepper for EulerStepper {
    fn step(&self, system: &mut dyn System, x: &mut [f64], t: f64, dt: f64) -> SimResult<()> {
        let mut dx = vec![0.; x.len()];
        system.derivative(x, &mut dx, t)?;
        for (xi, di) in x.iter_mut().zip(dx.iter()) {
            *xi += dt * di;
        }
        Ok(())
    }
}

/// Classic fourth-order Runge-Kutta.
pub struct Rk4Stepper;

impl Stepper for Rk4Stepper {
    fn step(&self, system: &mut dyn System, x: &mut [f64], t: f64, dt: f64) -> SimResult<()> {
        let n = x.len();
        let mut k1 = vec![0.; n];
        let mut k2 = vec![0.; n];
        let mut k3 = vec![0.; n];
        let mut k4 = vec![0.; n];
        let mut xt = vec![0.; n];

        system.derivative(x, &mut k1, t)?;
        for i in 0..n {
            xt[i] = x[i] + 0.5 * dt * k1[i];
        }
        system.derivative(&xt, &mut k2, t + 0.5 * dt)?;
        for i in 0..n {
            xt[i] = x[i] + 0.5 * dt * k2[i];
        }
        system.derivative(&xt, &mut k3, t + 0.5 * dt)?;
        for i in 0..n {
            xt[i] = x[i] + dt * k3[i];
        }
        system.derivative(&xt, &mut k4, t + dt)?;
        for i in 0..n {
            x[i] += dt / 6. * (k1[i] + 2. * k2[i] + 2. * k3[i] + k4[i]);
        }
        Ok(())
    }
}

/// One (t, state) sample of a simulation run.
#[derive(Debug, Clone)]
pub struct Sample {
    pub t: f64,
    pub x: Vec<f64>,
}

/// Integrate from `t0` to `tend` with fixed step `dt`, returning the state
/// at every step boundary (initial state included).
pub fn simulate(
    system: &mut dyn System,
    stepper: &dyn Stepper,
    x0: Vec<f64>,
    t0: f64,
    tend: f64,
    dt: f64,
) -> SimResult<Vec<Sample>> {
    let n_steps = ((tend - t0) / dt + 0.5).floor() as usize;
    let mut samples = Vec::with_capacity(n_steps + 1);
    let mut x = x0;
    samples.push(Sample { t: t0, x: x.clone() });
    for step in 0..n_steps {
        let t = t0 + step as f64 * dt;
        stepper.step(system, &mut x, t, dt)?;
        samples.push(Sample {
            t: t0 + (step + 1) as f64 * dt,
            x: x.clone(),
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// dx/dt = -x, solution x(t) = e^{-t}.
    struct Decay;

    impl System for Decay {
        fn derivative(&mut self, x: &[f64], dx_dt: &mut [f64], _t: f64) -> SimResult<()> {
            dx_dt[0] = -x[0];
            Ok(())
        }
    }

    #[test]
    fn euler_converges_first_order() {
        let coarse = simulate(&mut Decay, &EulerStepper, vec![1.], 0., 1., 0.1).unwrap();
        let fine = simulate(&mut Decay, &EulerStepper, vec![1.], 0., 1., 0.01).unwrap();
        let exact = (-1.0f64).exp();
        let err_coarse = (coarse.last().unwrap().x[0] - exact).abs();
        let err_fine = (fine.last().unwrap().x[0] - exact).abs();
        assert!(err_fine < err_coarse / 5.);
    }

    #[test]
    fn rk4_is_accurate_at_coarse_steps() {
        let res = simulate(&mut Decay, &Rk4Stepper, vec![1.], 0., 1., 0.1).unwrap();
        assert_relative_eq!(res.last().unwrap().x[0], (-1.0f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn sample_count_and_times() {
        let res = simulate(&mut Decay, &EulerStepper, vec![1.], 0., 10., 1.).unwrap();
        assert_eq!(res.len(), 11);
        assert_eq!(res[0].t, 0.);
        assert_eq!(res[10].t, 10.);
    }
}
