//! Solved-stage value extraction
//!
//! After a solver backend accepts the stage model, [`StageSolution`] pulls
//! the realized values back out through the artifact handles: installed
//! capacities, build/retire decisions, both tracking arrays, and the
//! fixed-cost decomposition by category. [`StageSolution::record_into`]
//! folds a solved stage into a [`PriorStageSnapshot`] so the outer driver
//! can seed the next stage's pinned values.

use crate::linkage::CategoryArtifacts;
use crate::snapshot::PriorStageSnapshot;
use crate::stage::StageArtifacts;
use cep_core::{CapacityCategory, ResourceId};
use good_lp::Solution;
use indexmap::IndexMap;
use serde::Serialize;

/// Realized values for one capacity category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySolution {
    pub category: CapacityCategory,
    /// Carry-in capacity per resource
    pub carry_in: IndexMap<ResourceId, f64>,
    /// New-build decision per eligible resource
    pub new_build: IndexMap<ResourceId, f64>,
    /// Retirement decision per eligible resource
    pub retirement: IndexMap<ResourceId, f64>,
    /// Installed total per resource
    pub total_capacity: IndexMap<ResourceId, f64>,
    /// Fixed cost per resource
    pub fixed_cost: IndexMap<ResourceId, f64>,
    /// New-build tracking values, one entry per stage
    pub new_build_track: IndexMap<ResourceId, Vec<f64>>,
    /// Retirement tracking values, one entry per stage
    pub retirement_track: IndexMap<ResourceId, Vec<f64>>,
    /// Category fixed-cost total (unscaled)
    pub total_fixed_cost: f64,
}

impl CategorySolution {
    fn extract(artifacts: &CategoryArtifacts, solution: &impl Solution) -> Self {
        let value_map =
            |vars: &IndexMap<ResourceId, good_lp::Variable>| -> IndexMap<ResourceId, f64> {
                vars.iter().map(|(id, v)| (*id, solution.value(*v))).collect()
            };
        let track_map = |tracks: &IndexMap<ResourceId, Vec<good_lp::Variable>>| -> IndexMap<ResourceId, Vec<f64>> {
            tracks
                .iter()
                .map(|(id, vars)| (*id, vars.iter().map(|v| solution.value(*v)).collect()))
                .collect()
        };
        let expr_map =
            |exprs: &IndexMap<ResourceId, good_lp::Expression>| -> IndexMap<ResourceId, f64> {
                exprs
                    .iter()
                    .map(|(id, e)| (*id, solution.eval(e.clone())))
                    .collect()
            };

        Self {
            category: artifacts.category,
            carry_in: value_map(&artifacts.carry_in),
            new_build: value_map(&artifacts.new_build),
            retirement: value_map(&artifacts.retirement),
            total_capacity: expr_map(&artifacts.total_capacity),
            fixed_cost: expr_map(&artifacts.fixed_cost),
            new_build_track: track_map(&artifacts.new_build_track),
            retirement_track: track_map(&artifacts.retirement_track),
            total_fixed_cost: solution.eval(artifacts.total_fixed_cost.clone()),
        }
    }

    /// Installed total for one resource (zero if outside this universe)
    pub fn capacity_of(&self, id: ResourceId) -> f64 {
        self.total_capacity.get(&id).copied().unwrap_or(0.0)
    }

    /// New build for one resource (zero if ineligible)
    pub fn new_build_of(&self, id: ResourceId) -> f64 {
        self.new_build.get(&id).copied().unwrap_or(0.0)
    }

    /// Retirement for one resource (zero if ineligible)
    pub fn retirement_of(&self, id: ResourceId) -> f64 {
        self.retirement.get(&id).copied().unwrap_or(0.0)
    }
}

/// Complete realized values for one solved stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageSolution {
    /// Objective contribution of this stage's fixed costs (OPEXMULT-scaled)
    pub objective_value: f64,
    pub power: CategorySolution,
    pub charge: CategorySolution,
    pub energy: CategorySolution,
}

impl StageSolution {
    /// Read realized values out of a solver solution.
    pub fn extract(artifacts: &StageArtifacts, solution: &impl Solution) -> Self {
        let power = CategorySolution::extract(&artifacts.power, solution);
        let charge = CategorySolution::extract(&artifacts.charge, solution);
        let energy = CategorySolution::extract(&artifacts.energy, solution);
        let objective_value = solution.eval(artifacts.power.objective_contribution.clone())
            + solution.eval(artifacts.charge.objective_contribution.clone())
            + solution.eval(artifacts.energy.objective_contribution.clone());
        Self {
            objective_value,
            power,
            charge,
            energy,
        }
    }

    pub fn category(&self, category: CapacityCategory) -> &CategorySolution {
        match category {
            CapacityCategory::Power => &self.power,
            CapacityCategory::Charge => &self.charge,
            CapacityCategory::Energy => &self.energy,
        }
    }

    /// Record this stage's realized decisions and solved totals into a
    /// snapshot for the next stage: build/retire amounts under the given
    /// stage index, solved totals as the next carry-in anchors. Interior
    /// point solvers can report values a hair below zero; those are clamped
    /// so the pinned equalities stay consistent with nonnegative variables.
    pub fn record_into(&self, snapshot: &mut PriorStageSnapshot, stage: usize) {
        for solution in [&self.power, &self.charge, &self.energy] {
            let category = solution.category;
            for (id, amount) in &solution.new_build {
                snapshot.record_new_build(*id, category, stage, amount.max(0.0));
            }
            for (id, amount) in &solution.retirement {
                snapshot.record_retirement(*id, category, stage, amount.max(0.0));
            }
            for (id, capacity) in &solution.total_capacity {
                snapshot.pin_carry_in(*id, category, capacity.max(0.0));
            }
        }
    }

    /// Format a human-readable summary of the stage's outcome.
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Stage Solution Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!(
            "Objective (fixed-cost contribution): {:.2}\n",
            self.objective_value
        ));
        for solution in [&self.power, &self.charge, &self.energy] {
            if solution.carry_in.is_empty() {
                continue;
            }
            s.push_str(&format!(
                "[{}] {} resources, fixed cost {:.2}\n",
                solution.category,
                solution.carry_in.len(),
                solution.total_fixed_cost
            ));
            for (id, capacity) in &solution.total_capacity {
                s.push_str(&format!(
                    "  {} total {:.2} (build {:.2}, retire {:.2})\n",
                    id,
                    capacity,
                    solution.new_build_of(*id),
                    solution.retirement_of(*id)
                ));
            }
        }
        s
    }
}
