//! Capacity linkage construction
//!
//! One [`CapacityLinkageBuilder`] instantiation per capacity category builds
//! the cross-stage capacity-linkage block for every resource in that
//! category's universe.
//!
//! ```text
//! Variables (per resource y, all >= 0):
//!   carry[y]          existing-capacity carry-in
//!   build[y]          new-build amount        (new-build-eligible only)
//!   retire[y]         retirement amount       (retirement-eligible only)
//!   build_track[y,p]  new-build tracking,  p = 1..=num_stages
//!   retire_track[y,p] retirement tracking, p = 1..=num_stages
//!
//! Derived:
//!   total[y] = carry[y] + s*build[y] - s*retire[y]
//!              (s = block size if unit-committed, else 1)
//!   fixed_cost[y] = inv[y]*s*build[y] + om[y]*total[y]   (build-eligible)
//!                 = om[y]*total[y]                       (otherwise)
//!
//! Constraints:
//!   carry[y]  == anchor             (input data, or prior-stage override)
//!   s*retire[y] <= carry[y]
//!   total[y]  <= max_cap[y]         (when max_cap[y] > 0)
//!   total[y]  >= min_cap[y]         (when min_cap[y] > 0)
//!   build_track[y,cur]  == build[y]  (0 if ineligible); other stages pinned
//!   retire_track[y,cur] == retire[y] (0 if ineligible); other stages pinned
//!   sum(build_track[y,1..=horizon]) + forced_min(y,1..=cur)
//!       <= sum(retire_track[y,1..=cur])
//! ```
//!
//! The last row is the endogenous lifetime-retirement constraint: cumulative
//! retirements must cover policy minimums plus every build whose retirement
//! horizon has elapsed, in aggregate, without naming which vintage retires.
//! A resource whose bounds conflict with its carry-in yields an infeasible
//! model; that surfaces at solve time, never here.

use crate::context::StageContext;
use crate::horizon::retirement_horizon;
use crate::snapshot::PriorStageSnapshot;
use cep_core::{
    CapacityCategory, CapacityProfile, EligibilitySets, MultiStageSettings, Resource, ResourceId,
};
use good_lp::{constraint, variable, Expression, Variable};
use indexmap::IndexMap;
use tracing::debug;

/// Typed handles to everything one category instantiation declared.
///
/// The outer driver reads the tracking variables after each solve to seed
/// the next stage's snapshot; cost reporting reads the per-resource fixed
/// cost expressions to decompose total system cost by category.
pub struct CategoryArtifacts {
    pub category: CapacityCategory,
    /// Existing-capacity carry-in variable, every resource in the universe
    pub carry_in: IndexMap<ResourceId, Variable>,
    /// New-build variable, new-build-eligible resources only
    pub new_build: IndexMap<ResourceId, Variable>,
    /// Retirement variable, retirement-eligible resources only
    pub retirement: IndexMap<ResourceId, Variable>,
    /// New-build tracking array, one variable per stage per resource
    pub new_build_track: IndexMap<ResourceId, Vec<Variable>>,
    /// Retirement tracking array, one variable per stage per resource
    pub retirement_track: IndexMap<ResourceId, Vec<Variable>>,
    /// Total installed capacity expression per resource
    pub total_capacity: IndexMap<ResourceId, Expression>,
    /// Fixed-cost expression per resource (investment + O&M)
    pub fixed_cost: IndexMap<ResourceId, Expression>,
    /// Sum of fixed costs over the universe, unscaled
    pub total_fixed_cost: Expression,
    /// The term contributed to the shared objective (scaled by 1/OPEXMULT)
    pub objective_contribution: Expression,
}

impl CategoryArtifacts {
    fn new(category: CapacityCategory) -> Self {
        Self {
            category,
            carry_in: IndexMap::new(),
            new_build: IndexMap::new(),
            retirement: IndexMap::new(),
            new_build_track: IndexMap::new(),
            retirement_track: IndexMap::new(),
            total_capacity: IndexMap::new(),
            fixed_cost: IndexMap::new(),
            total_fixed_cost: Expression::from(0.0),
            objective_contribution: Expression::from(0.0),
        }
    }

    /// Resources in this category's universe, in construction order
    pub fn resource_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.carry_in.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.carry_in.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carry_in.is_empty()
    }
}

/// Builds the capacity-linkage block for one category.
pub struct CapacityLinkageBuilder<'a> {
    category: CapacityCategory,
    resources: &'a [Resource],
    eligibility: &'a EligibilitySets,
    settings: &'a MultiStageSettings,
    snapshot: &'a PriorStageSnapshot,
}

impl<'a> CapacityLinkageBuilder<'a> {
    pub fn new(
        category: CapacityCategory,
        resources: &'a [Resource],
        eligibility: &'a EligibilitySets,
        settings: &'a MultiStageSettings,
        snapshot: &'a PriorStageSnapshot,
    ) -> Self {
        Self {
            category,
            resources,
            eligibility,
            settings,
            snapshot,
        }
    }

    /// The category's resource universe: every resource for power/discharge,
    /// the asymmetric-charge set for charge, the storage set for energy.
    fn universe(&self) -> impl Iterator<Item = &'a Resource> + '_ {
        let category = self.category;
        let eligibility = self.eligibility;
        self.resources.iter().filter(move |r| match category {
            CapacityCategory::Power => true,
            CapacityCategory::Charge => eligibility.charge_storage.contains(&r.id),
            CapacityCategory::Energy => eligibility.storage.contains(&r.id),
        })
    }

    /// Declare this category's variables, constraints, and objective
    /// contribution into the context. Inputs are assumed validated by
    /// [`crate::stage::build_stage`].
    pub fn build(&self, ctx: &mut StageContext) -> CategoryArtifacts {
        let category = self.category;
        let cur = self.settings.current_stage;
        let num_stages = self.settings.num_stages;
        let mut artifacts = CategoryArtifacts::new(category);

        for resource in self.universe() {
            let id = resource.id;
            let profile = self.eligibility.profile(id);
            let unit_scale = if self.eligibility.is_unit_committed(id) {
                resource.block_size
            } else {
                1.0
            };

            let carry_in = ctx.add_variable(variable().min(0.0));
            let build = profile
                .can_build()
                .then(|| ctx.add_variable(variable().min(0.0)));
            let retire = profile
                .can_retire()
                .then(|| ctx.add_variable(variable().min(0.0)));
            let build_track: Vec<Variable> = (0..num_stages)
                .map(|_| ctx.add_variable(variable().min(0.0)))
                .collect();
            let retire_track: Vec<Variable> = (0..num_stages)
                .map(|_| ctx.add_variable(variable().min(0.0)))
                .collect();

            let total_capacity = match profile {
                CapacityProfile::FixedOnly => Expression::from(carry_in),
                CapacityProfile::BuildOnly => {
                    Expression::from(carry_in) + unit_scale * build.unwrap()
                }
                CapacityProfile::RetireOnly => {
                    Expression::from(carry_in) - unit_scale * retire.unwrap()
                }
                CapacityProfile::BuildAndRetire => {
                    Expression::from(carry_in) + unit_scale * build.unwrap()
                        - unit_scale * retire.unwrap()
                }
            };

            // Anchor the carry-in: input data at the first stage, the prior
            // stage's solved total once the driver has pinned one.
            let anchor = self
                .snapshot
                .carry_in_override(id, category)
                .unwrap_or_else(|| resource.existing.get(category));
            ctx.add_constraint(constraint!(carry_in == anchor));

            // Cannot retire more than was carried in
            if let Some(retire) = retire {
                ctx.add_constraint(constraint!(unit_scale * retire <= carry_in));
            }

            // Capacity bounds; only finite positive bounds constrain, a
            // non-positive sentinel means unconstrained
            let max_cap = resource.max_capacity.get(category);
            if max_cap > 0.0 && max_cap.is_finite() {
                ctx.add_constraint(constraint!(total_capacity.clone() <= max_cap));
            }
            let min_cap = resource.min_capacity.get(category);
            if min_cap > 0.0 && min_cap.is_finite() {
                ctx.add_constraint(constraint!(total_capacity.clone() >= min_cap));
            }

            // Tracking pins: the current stage mirrors the decision
            // variables, every other stage is fixed to the snapshot (zero
            // when nothing was recorded).
            for stage in 1..=num_stages {
                let bt = build_track[stage - 1];
                let rt = retire_track[stage - 1];
                if stage == cur {
                    match build {
                        Some(build) => ctx.add_constraint(constraint!(bt == build)),
                        None => ctx.add_constraint(constraint!(bt == 0.0)),
                    }
                    match retire {
                        Some(retire) => ctx.add_constraint(constraint!(rt == retire)),
                        None => ctx.add_constraint(constraint!(rt == 0.0)),
                    }
                } else {
                    let pinned_build = self.snapshot.new_build_at(id, category, stage);
                    let pinned_retire = self.snapshot.retirement_at(id, category, stage);
                    ctx.add_constraint(constraint!(bt == pinned_build));
                    ctx.add_constraint(constraint!(rt == pinned_retire));
                }
            }

            // Endogenous lifetime retirement: cumulative retirements through
            // the current stage must cover the forced minimums plus every
            // build whose horizon has elapsed. The forced-minimum term is
            // block-scaled for unit-committed resources in the power
            // category only.
            let horizon =
                retirement_horizon(cur, resource.lifetime_years, &self.settings.stage_lengths_years);
            let mut aged_out = Expression::from(0.0);
            for stage in 1..=horizon {
                aged_out += build_track[stage - 1];
            }
            let mut forced_min = 0.0;
            for stage in 1..=cur {
                let amount = resource.min_retirement_at(stage);
                forced_min += match category {
                    CapacityCategory::Power => unit_scale * amount,
                    CapacityCategory::Charge | CapacityCategory::Energy => amount,
                };
            }
            let mut retired = Expression::from(0.0);
            for stage in 1..=cur {
                retired += retire_track[stage - 1];
            }
            ctx.add_constraint(constraint!(aged_out + forced_min <= retired));

            // Fixed cost: investment applies to eligible new build, O&M to
            // the installed total.
            let om_rate = resource.fixed_om_cost.get(category);
            let fixed_cost = match build {
                Some(build) => {
                    resource.investment_cost.get(category) * unit_scale * build
                        + om_rate * total_capacity.clone()
                }
                None => om_rate * total_capacity.clone(),
            };
            artifacts.total_fixed_cost += fixed_cost.clone();

            artifacts.carry_in.insert(id, carry_in);
            if let Some(build) = build {
                artifacts.new_build.insert(id, build);
            }
            if let Some(retire) = retire {
                artifacts.retirement.insert(id, retire);
            }
            artifacts.new_build_track.insert(id, build_track);
            artifacts.retirement_track.insert(id, retire_track);
            artifacts.total_capacity.insert(id, total_capacity);
            artifacts.fixed_cost.insert(id, fixed_cost);
        }

        artifacts.objective_contribution =
            (1.0 / self.settings.opex_multiplier) * artifacts.total_fixed_cost.clone();
        ctx.add_objective(artifacts.objective_contribution.clone());

        debug!(
            category = %category,
            resources = artifacts.len(),
            variables = ctx.num_variables(),
            constraints = ctx.num_constraints(),
            "built capacity linkage"
        );

        artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MultiStageSettings {
        MultiStageSettings::new(vec![10.0, 10.0, 10.0], 1)
    }

    #[test]
    fn power_universe_is_everything() {
        let resources = vec![
            Resource::new(0, "thermal", 30.0, 100.0),
            Resource::new(1, "battery", 15.0, 20.0),
        ];
        let eligibility = EligibilitySets::new().with_charge_storage([1]);
        let settings = settings();
        let snapshot = PriorStageSnapshot::empty();

        let builder = CapacityLinkageBuilder::new(
            CapacityCategory::Power,
            &resources,
            &eligibility,
            &settings,
            &snapshot,
        );
        assert_eq!(builder.universe().count(), 2);

        let builder = CapacityLinkageBuilder::new(
            CapacityCategory::Charge,
            &resources,
            &eligibility,
            &settings,
            &snapshot,
        );
        let charge: Vec<ResourceId> = builder.universe().map(|r| r.id).collect();
        assert_eq!(charge, vec![ResourceId::new(1)]);
    }

    #[test]
    fn variables_follow_eligibility() {
        let resources = vec![
            Resource::new(0, "fixed", 30.0, 100.0),
            Resource::new(1, "build", 30.0, 0.0),
            Resource::new(2, "retire", 30.0, 50.0),
            Resource::new(3, "both", 30.0, 50.0),
        ];
        let eligibility = EligibilitySets::new()
            .with_new_build([1, 3])
            .with_retirement([2, 3]);
        let settings = settings();
        let snapshot = PriorStageSnapshot::empty();
        let mut ctx = StageContext::new();

        let artifacts = CapacityLinkageBuilder::new(
            CapacityCategory::Power,
            &resources,
            &eligibility,
            &settings,
            &snapshot,
        )
        .build(&mut ctx);

        assert_eq!(artifacts.len(), 4);
        assert_eq!(artifacts.new_build.len(), 2);
        assert_eq!(artifacts.retirement.len(), 2);
        assert!(artifacts.new_build.contains_key(&ResourceId::new(1)));
        assert!(artifacts.retirement.contains_key(&ResourceId::new(2)));
        // every resource carries both full-length tracking arrays
        for id in artifacts.resource_ids() {
            assert_eq!(artifacts.new_build_track[&id].len(), 3);
            assert_eq!(artifacts.retirement_track[&id].len(), 3);
        }
        // carry-in + tracks per resource, plus build/retire where eligible
        assert_eq!(ctx.num_variables(), 4 * (1 + 3 + 3) + 2 + 2);
    }

    #[test]
    fn empty_universe_builds_nothing() {
        let resources = vec![Resource::new(0, "thermal", 30.0, 100.0)];
        let eligibility = EligibilitySets::new(); // no storage at all
        let settings = settings();
        let snapshot = PriorStageSnapshot::empty();
        let mut ctx = StageContext::new();

        let artifacts = CapacityLinkageBuilder::new(
            CapacityCategory::Energy,
            &resources,
            &eligibility,
            &settings,
            &snapshot,
        )
        .build(&mut ctx);

        assert!(artifacts.is_empty());
        assert_eq!(ctx.num_variables(), 0);
        assert_eq!(ctx.num_constraints(), 0);
    }
}
