//! Planning-stage schedule and multi-stage settings
//!
//! A stage is a discrete multi-year period within the planning horizon.
//! Stages are 1-indexed, sequentially ordered, and their lengths are fixed
//! for the whole run.

use crate::error::{CepError, CepResult};
use serde::{Deserialize, Serialize};

/// Settings for one stage invocation of the expansion core.
///
/// `current_stage` selects which stage's variables are free decisions;
/// everything before it is pinned to externally supplied realized values.
/// The OPEX multiplier reconciles multi-year stage spans and discounting; it
/// is computed by the outer driver, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiStageSettings {
    /// Total number of planning stages
    pub num_stages: usize,
    /// Stage currently being solved (1-indexed)
    pub current_stage: usize,
    /// Length of each stage in years, ordered
    pub stage_lengths_years: Vec<f64>,
    /// Discount rate used by the outer driver for annualization
    pub discount_rate: f64,
    /// Operational-cost scaling multiplier (externally supplied)
    pub opex_multiplier: f64,
}

impl MultiStageSettings {
    /// Create settings for a schedule of stage lengths.
    pub fn new(stage_lengths_years: Vec<f64>, current_stage: usize) -> Self {
        Self {
            num_stages: stage_lengths_years.len(),
            current_stage,
            stage_lengths_years,
            discount_rate: 0.0,
            opex_multiplier: 1.0,
        }
    }

    /// Set the discount rate
    pub fn with_discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    /// Set the operational-cost scaling multiplier
    pub fn with_opex_multiplier(mut self, opex_multiplier: f64) -> Self {
        self.opex_multiplier = opex_multiplier;
        self
    }

    /// Check structural well-formedness of the schedule.
    pub fn validate(&self) -> CepResult<()> {
        if self.num_stages == 0 {
            return Err(CepError::Settings("planning horizon has no stages".into()));
        }
        if self.stage_lengths_years.len() != self.num_stages {
            return Err(CepError::Settings(format!(
                "{} stage lengths supplied for {} stages",
                self.stage_lengths_years.len(),
                self.num_stages
            )));
        }
        if self.current_stage == 0 || self.current_stage > self.num_stages {
            return Err(CepError::StageOutOfRange {
                stage: self.current_stage,
                num_stages: self.num_stages,
            });
        }
        if let Some(len) = self
            .stage_lengths_years
            .iter()
            .find(|len| !len.is_finite() || **len <= 0.0)
        {
            return Err(CepError::Settings(format!(
                "stage lengths must be positive, got {len}"
            )));
        }
        if self.opex_multiplier <= 0.0 {
            return Err(CepError::Settings(format!(
                "OPEX multiplier must be positive, got {}",
                self.opex_multiplier
            )));
        }
        Ok(())
    }

    /// Years elapsed from horizon start through the end of a 1-indexed stage.
    pub fn elapsed_years(&self, through_stage: usize) -> f64 {
        self.stage_lengths_years[..through_stage].iter().sum()
    }

    /// Compute the Capital Recovery Factor for annualizing investment costs
    ///
    /// CRF = r(1+r)^n / ((1+r)^n - 1)
    ///
    /// where r = discount rate and n = amortization period in years.
    /// Convenience for outer drivers that derive annualized cost rates and
    /// the OPEX multiplier; the stage core consumes the rates as given.
    pub fn capital_recovery_factor(&self, amortization_years: f64) -> f64 {
        let r = self.discount_rate;
        let n = amortization_years;
        if r < 1e-10 {
            // No discounting
            1.0 / n
        } else {
            r * (1.0 + r).powf(n) / ((1.0 + r).powf(n) - 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_settings() {
        let s = MultiStageSettings::new(vec![10.0, 10.0, 5.0], 2);
        assert!(s.validate().is_ok());
        assert_eq!(s.num_stages, 3);
        assert_eq!(s.elapsed_years(2), 20.0);
        assert_eq!(s.elapsed_years(3), 25.0);
    }

    #[test]
    fn rejects_bad_stage_index() {
        let s = MultiStageSettings::new(vec![10.0, 10.0], 3);
        assert!(matches!(
            s.validate(),
            Err(CepError::StageOutOfRange {
                stage: 3,
                num_stages: 2
            })
        ));

        let s = MultiStageSettings::new(vec![10.0, 10.0], 0);
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_bad_lengths() {
        let s = MultiStageSettings::new(vec![10.0, -5.0], 1);
        assert!(s.validate().is_err());

        let mut s = MultiStageSettings::new(vec![10.0, 10.0], 1);
        s.num_stages = 3;
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_bad_opex_multiplier() {
        let s = MultiStageSettings::new(vec![10.0], 1).with_opex_multiplier(0.0);
        assert!(s.validate().is_err());
    }

    #[test]
    fn capital_recovery_factor_matches_closed_form() {
        let s = MultiStageSettings::new(vec![10.0], 1).with_discount_rate(0.10);
        // CRF for 10% over 10 years ~= 0.1627
        let crf = s.capital_recovery_factor(10.0);
        assert!((crf - 0.1627).abs() < 0.01);

        // Zero discount rate degenerates to straight-line recovery
        let s = MultiStageSettings::new(vec![10.0], 1);
        assert!((s.capital_recovery_factor(20.0) - 0.05).abs() < 1e-12);
    }
}
