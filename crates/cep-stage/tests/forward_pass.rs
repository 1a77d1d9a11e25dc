//! Multi-stage propagation and endogenous-retirement tests
//!
//! Simulates the outer driver's forward pass: solve a stage, fold the
//! realized values into the snapshot, advance the stage index, re-solve.

use cep_core::{CapacityCategory, EligibilitySets, MultiStageSettings, Resource, ResourceId};
use cep_stage::{build_stage, PriorStageSnapshot, StageProblem, StageSolution};
use good_lp::solvers::clarabel::clarabel;
use good_lp::{ResolutionError, SolverModel};

const POWER: CapacityCategory = CapacityCategory::Power;
const CHARGE: CapacityCategory = CapacityCategory::Charge;

fn solve(problem: &StageProblem) -> Result<StageSolution, ResolutionError> {
    let model = build_stage(problem).expect("construction succeeds on well-formed input");
    let objective = model.objective().clone();
    let (vars, _, constraints, artifacts) = model.into_parts();
    let mut lp = vars.minimise(objective).using(clarabel);
    for c in constraints {
        lp = lp.with(c);
    }
    let solution = lp.solve()?;
    Ok(StageSolution::extract(&artifacts, &solution))
}

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() < tol,
        "expected {expected}, got {actual}"
    );
}

/// A 10-year-lifetime plant built in stage 1 must be retired by stage 2.
#[test]
fn lifetime_expiry_forces_retirement_in_later_stage() {
    let id = ResourceId::new(0);
    let resources = vec![Resource::new(0, "gas", 10.0, 100.0)
        .with_bounds(POWER, 150.0, 0.0)
        .with_costs(POWER, 100.0, 10.0)];
    let eligibility = EligibilitySets::new().with_new_build([0]).with_retirement([0]);

    // stage 1: the 150 MW floor forces 50 MW of new build
    let problem = StageProblem::new(
        resources.clone(),
        MultiStageSettings::new(vec![10.0, 10.0], 1),
    )
    .with_eligibility(eligibility.clone());
    let stage1 = solve(&problem).expect("stage 1 feasible");
    assert_close(stage1.power.new_build_of(id), 50.0, 1e-3);
    assert_close(stage1.power.retirement_of(id), 0.0, 1e-3);
    assert_close(stage1.power.capacity_of(id), 150.0, 1e-3);

    // forward pass: pin stage 1's realized values, advance to stage 2
    let mut snapshot = PriorStageSnapshot::empty();
    stage1.record_into(&mut snapshot, 1);
    let problem = StageProblem::new(
        resources,
        MultiStageSettings::new(vec![10.0, 10.0], 2),
    )
    .with_eligibility(eligibility)
    .with_snapshot(snapshot);

    let stage2 = solve(&problem).expect("stage 2 feasible");
    // stage 1's build is past its 10-year lifetime: at least 50 MW must
    // retire, and the capacity floor forces like-for-like replacement
    assert!(stage2.power.retirement_of(id) >= 50.0 - 1e-3);
    assert!(stage2.power.new_build_of(id) >= 50.0 - 1e-3);
    assert_close(stage2.power.capacity_of(id), 150.0, 1e-3);
    // the pinned slots carry stage 1's realized values
    assert_close(stage2.power.new_build_track[&id][0], 50.0, 1e-3);
    assert_close(stage2.power.retirement_track[&id][0], 0.0, 1e-4);
}

/// Aged-out capacity with no retirement-eligible escape valve is rejected
/// by the solver, not silently absorbed.
#[test]
fn unretirable_aged_capacity_is_infeasible() {
    let resources = vec![Resource::new(0, "gas", 10.0, 100.0)
        .with_costs(POWER, 100.0, 10.0)];
    // build happened in stage 1, but the resource cannot retire
    let eligibility = EligibilitySets::new().with_new_build([0]);
    let mut snapshot = PriorStageSnapshot::empty();
    snapshot.record_new_build(ResourceId::new(0), POWER, 1, 50.0);
    snapshot.pin_carry_in(ResourceId::new(0), POWER, 150.0);

    let problem = StageProblem::new(
        resources,
        MultiStageSettings::new(vec![10.0, 10.0], 2),
    )
    .with_eligibility(eligibility)
    .with_snapshot(snapshot);

    assert!(build_stage(&problem).is_ok());
    assert!(solve(&problem).is_err());
}

/// Forced-retirement minimums bind against the capacity floor: when the
/// floor leaves less retirable capacity than the mandate, the stage is
/// infeasible; relaxing the floor makes it solvable again.
#[test]
fn forced_retirement_minimums_are_enforced() {
    let make_problem = |floor: f64| {
        let resources = vec![Resource::new(0, "coal", 40.0, 100.0)
            .with_bounds(POWER, floor, 0.0)
            .with_costs(POWER, 0.0, 10.0)
            .with_min_retirement(vec![20.0, 0.0])];
        let eligibility = EligibilitySets::new().with_retirement([0]);
        StageProblem::new(resources, MultiStageSettings::new(vec![10.0, 10.0], 1))
            .with_eligibility(eligibility)
    };

    // floor 85: at most 15 MW can retire, mandate wants 20 -> infeasible
    assert!(solve(&make_problem(85.0)).is_err());

    // floor 75: 25 MW retirable covers the 20 MW mandate
    let solution = solve(&make_problem(75.0)).expect("feasible");
    assert!(solution.power.retirement_of(ResourceId::new(0)) >= 20.0 - 1e-3);
}

/// The forced-retirement mandate is block-scaled for unit-committed
/// resources in the power category, but consumed as-is by the storage
/// categories.
#[test]
fn forced_retirement_block_scaling_applies_to_power_only() {
    // 10 MW blocks, 100 MW existing = 10 retirable units; a mandate of 1.5
    // scales to 15 units in the power category -> infeasible
    let resources = vec![Resource::new(0, "unit", 30.0, 100.0)
        .with_block_size(10.0)
        .with_costs(POWER, 0.0, 10.0)
        .with_min_retirement(vec![1.5])];
    let eligibility = EligibilitySets::new()
        .with_retirement([0])
        .with_unit_commitment([0]);
    let problem = StageProblem::new(resources, MultiStageSettings::new(vec![10.0], 1))
        .with_eligibility(eligibility);
    assert!(solve(&problem).is_err());

    // same mandate on a storage resource: the power side has room (300 MW =
    // 30 units against a scaled mandate of 15), and the charge/energy sides
    // consume the raw 1.5 against 10 retirable units each -> feasible
    let resources = vec![Resource::new(0, "storage_unit", 30.0, 300.0)
        .with_block_size(10.0)
        .with_storage_existing(100.0, 100.0)
        .with_costs(POWER, 0.0, 10.0)
        .with_costs(CHARGE, 0.0, 5.0)
        .with_costs(CapacityCategory::Energy, 0.0, 2.0)
        .with_min_retirement(vec![1.5])];
    let eligibility = EligibilitySets::new()
        .with_retirement([0])
        .with_unit_commitment([0])
        .with_charge_storage([0]);
    let problem = StageProblem::new(resources, MultiStageSettings::new(vec![10.0], 1))
        .with_eligibility(eligibility);

    let solution = solve(&problem).expect("feasible");
    let id = ResourceId::new(0);
    // power retires at least the scaled mandate (15 units)
    assert!(solution.power.retirement_of(id) >= 15.0 - 1e-3);
    // charge retires at least the raw mandate
    assert!(solution.charge.retirement_of(id) >= 1.5 - 1e-3);
}

/// Three stages end to end: capacity built in stage 1 survives stage 2
/// (15-year lifetime, 20 elapsed years, horizon still 0) and must be gone
/// by the end of stage 3 (30 elapsed years, horizon reaches stage 1).
#[test]
fn three_stage_forward_pass_respects_the_horizon() {
    let id = ResourceId::new(0);
    let resources = vec![Resource::new(0, "wind", 15.0, 0.0)
        .with_bounds(POWER, 80.0, 0.0)
        .with_costs(POWER, 60.0, 8.0)];
    let eligibility = EligibilitySets::new().with_new_build([0]).with_retirement([0]);
    let lengths = vec![10.0, 10.0, 10.0];

    let mut snapshot = PriorStageSnapshot::empty();
    let mut retirements = Vec::new();
    for stage in 1..=3 {
        let problem = StageProblem::new(
            resources.clone(),
            MultiStageSettings::new(lengths.clone(), stage),
        )
        .with_eligibility(eligibility.clone())
        .with_snapshot(snapshot.clone());

        let solution = solve(&problem).expect("feasible stage");
        assert!(solution.power.capacity_of(id) >= 80.0 - 1e-3);
        retirements.push(solution.power.retirement_of(id));
        solution.record_into(&mut snapshot, stage);
    }

    // stage 1 builds 80 MW; nothing ages out in stages 1-2, but by stage 3
    // the horizon reaches stage 1 and the 80 MW must have been retired in
    // aggregate
    assert_close(retirements[0], 0.0, 1e-3);
    assert_close(retirements[1], 0.0, 1e-3);
    assert!(retirements[2] >= 80.0 - 1e-2);
}
