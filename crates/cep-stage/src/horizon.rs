//! Retirement-horizon recurrence
//!
//! Maps (current stage, resource lifetime, stage-length schedule) to the
//! latest stage whose new builds would already be past their lifetime by the
//! end of the current stage. Capacity built in stages `1..=horizon` must have
//! been retired in aggregate; capacity built later may still operate.

/// Latest stage index `p*` in `[0, current_stage]` such that capacity built
/// in stages `1..=p*` is required to have retired by the end of
/// `current_stage` due to aging.
///
/// Let `elapsed` be the years from horizon start through the end of the
/// current stage and `remaining = elapsed - lifetime_years`. The horizon
/// advances one stage at a time while the next stage's full length still
/// fits inside `remaining`.
///
/// Degenerate cases: a lifetime at least `elapsed` yields 0 (nothing must
/// retire yet); a non-positive lifetime yields `current_stage` (everything
/// built so far must already be gone).
///
/// `stage_lengths_years` must cover stages `1..=current_stage`; the caller
/// validates the schedule before construction.
pub fn retirement_horizon(
    current_stage: usize,
    lifetime_years: f64,
    stage_lengths_years: &[f64],
) -> usize {
    let elapsed: f64 = stage_lengths_years[..current_stage].iter().sum();
    let mut remaining = elapsed - lifetime_years;
    let mut ret_stage = 0;
    while ret_stage < current_stage && remaining - stage_lengths_years[ret_stage] >= 0.0 {
        remaining -= stage_lengths_years[ret_stage];
        ret_stage += 1;
    }
    ret_stage
}
