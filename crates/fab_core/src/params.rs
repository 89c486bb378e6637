//! Tunable parameters for simulated annealing and clock tree synthesis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulated-annealing schedule and move-mix parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaParams {
    /// Random seed driving every stochastic decision in the run.
    pub seed: u64,
    /// Initial temperature.
    pub t0: f64,
    /// Geometric cooling factor applied after every temperature stage.
    pub alpha: f64,
    /// Move attempts performed per temperature stage.
    pub moves_per_temp: usize,
    /// Probability of proposing a windowed "refine" move rather than an
    /// unbounded "explore" move.
    pub prob_refine: f64,
    /// Temperature floor; annealing stops once `t < t_min`.
    pub t_min: f64,
    /// Number of consecutive all-reject temperature stages before stopping
    /// early.
    pub max_stall_temps: usize,
    /// Floor on the refine-move window radius, so cooling never shrinks it
    /// below a still-useful neighbourhood size.
    pub window_min: i64,
}

/// Raised by [`SaParams::validate`] when a parameter falls outside its
/// documented domain.
#[derive(Debug, Error)]
pub enum ParamError {
    /// A parameter's value is outside the range the SA loop assumes.
    #[error("invalid SA parameter '{field}': {detail}")]
    OutOfRange {
        /// The offending field's name.
        field: &'static str,
        /// What was wrong with it.
        detail: String,
    },
}

impl SaParams {
    /// A moderate schedule: slow cooling, balanced refine/explore mix.
    /// Chosen as the default because it consistently converges within the
    /// move budget on the fabric sizes this engine targets.
    pub fn classic() -> Self {
        Self {
            seed: 0,
            t0: 100.0,
            alpha: 0.92,
            moves_per_temp: 200,
            prob_refine: 0.50,
            t_min: 1e-3,
            max_stall_temps: 5,
            window_min: 1,
        }
    }

    /// A faster schedule that cools more slowly in relative terms but
    /// leans harder on windowed refinement; better when most of the
    /// netlist is already well-seeded and only local polish is needed.
    pub fn aggressive() -> Self {
        Self {
            seed: 0,
            t0: 100.0,
            alpha: 0.97,
            moves_per_temp: 200,
            prob_refine: 0.7,
            t_min: 1e-3,
            max_stall_temps: 5,
            window_min: 1,
        }
    }

    /// Checks every parameter against its documented domain.
    ///
    /// Fails with [`ParamError::OutOfRange`] naming the first offending
    /// field: `0 < alpha < 1`, `0 <= prob_refine <= 1`, `t0 >= 0`,
    /// `t_min > 0`, `window_min >= 1`.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ParamError::OutOfRange {
                field: "alpha",
                detail: "must satisfy 0 < alpha < 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.prob_refine) {
            return Err(ParamError::OutOfRange {
                field: "prob_refine",
                detail: "must satisfy 0 <= prob_refine <= 1".into(),
            });
        }
        if self.t0 < 0.0 {
            return Err(ParamError::OutOfRange {
                field: "t0",
                detail: "must be >= 0".into(),
            });
        }
        if self.t_min <= 0.0 {
            return Err(ParamError::OutOfRange {
                field: "t_min",
                detail: "must be > 0".into(),
            });
        }
        if self.window_min < 1 {
            return Err(ParamError::OutOfRange {
                field: "window_min",
                detail: "must be >= 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for SaParams {
    fn default() -> Self {
        Self::classic()
    }
}

/// Clock tree synthesis parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CtsParams {
    /// Maximum number of DFF sinks a single leaf buffer may drive before
    /// the synthesizer must bisect further.
    pub max_fanout: usize,
}

impl Default for CtsParams {
    fn default() -> Self {
        Self { max_fanout: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_is_default() {
        assert_eq!(SaParams::default(), SaParams::classic());
    }

    #[test]
    fn presets_differ() {
        assert_ne!(SaParams::classic(), SaParams::aggressive());
    }

    #[test]
    fn presets_are_valid() {
        assert!(SaParams::classic().validate().is_ok());
        assert!(SaParams::aggressive().validate().is_ok());
    }

    #[test]
    fn alpha_out_of_range_is_rejected() {
        let mut params = SaParams::classic();
        params.alpha = 1.0;
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ParamError::OutOfRange { field: "alpha", .. }));
    }

    #[test]
    fn negative_t0_is_rejected() {
        let mut params = SaParams::classic();
        params.t0 = -1.0;
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ParamError::OutOfRange { field: "t0", .. }));
    }

    #[test]
    fn zero_t_min_is_rejected() {
        let mut params = SaParams::classic();
        params.t_min = 0.0;
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ParamError::OutOfRange { field: "t_min", .. }));
    }

    #[test]
    fn prob_refine_above_one_is_rejected() {
        let mut params = SaParams::classic();
        params.prob_refine = 1.5;
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ParamError::OutOfRange { field: "prob_refine", .. }));
    }
}
