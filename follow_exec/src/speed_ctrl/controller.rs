//! # Speed controller
//!
//! Discrete PID controller with output and integral limits.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::Serialize;

use super::Params;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A PID controller driving the commanded speed.
#[derive(Debug, Serialize, Clone)]
pub struct SpeedRegulator {
    #[serde(skip)]
    params: Params,

    /// Time the error was last passed in
    prev_time_s: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral term, already multiplied by the integral gain
    integral: f64,

    /// The last output
    output: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SpeedRegulator {
    /// Create a new regulator with the given parameters.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            prev_time_s: None,
            prev_error: None,
            integral: 0.0,
            output: None,
        }
    }

    /// Clear all internal state.
    pub fn reset(&mut self) {
        self.prev_time_s = None;
        self.prev_error = None;
        self.integral = 0.0;
        self.output = None;
    }

    /// Replace the parameters and clear the internal state.
    pub fn reset_with(&mut self, params: Params) {
        self.params = params;
        self.reset();
    }

    /// Mark `now_s` as the time of the previous step, so that the first real step has a valid
    /// time delta.
    pub fn prime(&mut self, now_s: f64) {
        self.prev_time_s = Some(now_s);
    }

    /// Step the controller with the given (scaled) error and return the speed demand.
    ///
    /// If no time has passed since the previous step the previous output is held and no state
    /// changes.
    pub fn step(&mut self, now_s: f64, error: f64) -> f64 {
        let dt = match self.prev_time_s {
            Some(t0) if now_s > t0 => Some(now_s - t0),
            _ => None,
        };

        if let (None, Some(_), Some(out)) = (dt, self.prev_time_s, self.output) {
            trace!("Speed regulator: zero time step, holding output {:.4}", out);
            return out;
        }

        let limit = self.params.integral_limit;

        if let Some(dt) = dt {
            self.integral = (self.integral + self.params.k_i * error * dt).max(-limit).min(limit);
        }

        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(dt)) => (error - e) / dt,
            _ => 0.0,
        };

        let out = (self.params.k_p * error + self.integral + self.params.k_d * deriv)
            .max(self.params.output_min)
            .min(self.params.output_max);

        trace!(
            "Speed regulator: error {:.4}, integral {:.4}, output {:.4}",
            error,
            self.integral,
            out
        );

        self.prev_error = Some(error);
        self.prev_time_s = Some(now_s);
        self.output = Some(out);

        out
    }

    /// The current integral term.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// The last output, `None` if the regulator hasn't been stepped since its last reset.
    pub fn output(&self) -> Option<f64> {
        self.output
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn regulator() -> SpeedRegulator {
        SpeedRegulator::new(Params::default())
    }

    #[test]
    fn test_first_step_is_proportional() {
        let mut reg = regulator();

        let out = reg.step(0.0, 10.0);
        assert!((out - 0.8).abs() < 1e-9);
        assert_eq!(reg.integral(), 0.0);
        assert_eq!(reg.output(), Some(out));
    }

    #[test]
    fn test_primed_step_accumulates() {
        let mut reg = regulator();
        reg.prime(0.0);

        // P = 0.8, I = 0.068 * 10 * 1 = 0.68, D = 0
        let out = reg.step(1.0, 10.0);
        assert!((reg.integral() - 0.68).abs() < 1e-9);
        assert!((out - 1.48).abs() < 1e-9);
    }

    #[test]
    fn test_output_clamped() {
        let mut reg = regulator();
        reg.prime(0.0);

        for (i, e) in [1e6, -1e6, 1e3, -3.0, 0.0, 50.0].iter().enumerate() {
            let out = reg.step(i as f64 + 1.0, *e);
            assert!(out >= 0.4 && out <= 4.0, "output {} out of range", out);
        }
    }

    #[test]
    fn test_integral_clamped() {
        let mut reg = regulator();
        reg.prime(0.0);

        for i in 1..100 {
            reg.step(i as f64, 100.0);
            assert!(reg.integral() <= 1.5);
        }
        assert!((reg.integral() - 1.5).abs() < 1e-9);

        for i in 100..200 {
            reg.step(i as f64, -100.0);
            assert!(reg.integral() >= -1.5);
        }
        assert!((reg.integral() + 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_dt_holds_integral() {
        let mut reg = regulator();
        reg.prime(0.0);

        let first = reg.step(1.0, 2.0);
        let integral = reg.integral();
        let second = reg.step(1.0, 2.0);

        assert_eq!(reg.integral(), integral);
        assert!((first - second).abs() < 1e-9);
    }

    #[test]
    fn test_zero_dt_holds_derivative_output() {
        let mut reg = regulator();
        reg.prime(0.0);

        reg.step(1.0, 2.0);
        let out = reg.step(2.0, 3.0);
        let integral = reg.integral();

        // P = 0.24, I = 0.136 + 0.204, D = 0.0525
        assert!((out - 0.6325).abs() < 1e-9);

        assert_eq!(reg.step(2.0, 3.0), out);
        assert_eq!(reg.integral(), integral);
        assert_eq!(reg.output(), Some(out));

        // The next real step differentiates against the last real sample
        let next = reg.step(3.0, 3.0);
        assert!((next - (0.24 + integral + 0.204)).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut reg = regulator();
        reg.prime(0.0);
        reg.step(1.0, 5.0);
        reg.reset();

        assert_eq!(reg.integral(), 0.0);
        assert!(reg.output().is_none());
    }
}
