//! Per-stage model assembly
//!
//! [`StageProblem`] bundles the inputs for one stage invocation;
//! [`build_stage`] validates them and runs the three capacity-linkage
//! builders over one shared [`StageContext`]. The builders write disjoint
//! variable and constraint sets and only meet in the additive objective, so
//! their order is immaterial. Nothing is cached between invocations: every
//! call reconstructs the full model from its inputs, which the outer
//! nested-decomposition driver relies on across repeated forward and
//! backward passes.

use crate::context::StageContext;
use crate::linkage::{CapacityLinkageBuilder, CategoryArtifacts};
use crate::snapshot::PriorStageSnapshot;
use cep_core::{
    CapacityCategory, CepError, CepResult, EligibilitySets, MultiStageSettings, Resource,
};
use good_lp::{Constraint, Expression, ProblemVariables};
use std::collections::HashSet;
use tracing::debug;

/// Inputs for one stage's capacity-linkage model.
#[derive(Debug, Clone)]
pub struct StageProblem {
    /// The full resource universe
    pub resources: Vec<Resource>,
    /// Resource-set memberships
    pub eligibility: EligibilitySets,
    /// Stage schedule and scaling settings
    pub settings: MultiStageSettings,
    /// Realized values from earlier stage solves
    pub snapshot: PriorStageSnapshot,
}

impl StageProblem {
    pub fn new(resources: Vec<Resource>, settings: MultiStageSettings) -> Self {
        Self {
            resources,
            eligibility: EligibilitySets::new(),
            settings,
            snapshot: PriorStageSnapshot::empty(),
        }
    }

    pub fn with_eligibility(mut self, eligibility: EligibilitySets) -> Self {
        self.eligibility = eligibility;
        self
    }

    pub fn with_snapshot(mut self, snapshot: PriorStageSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Structural well-formedness checks. Satisfiability of bounds and
    /// forced-retirement schedules is deliberately not checked here; an
    /// inconsistent input yields a model the solver reports infeasible.
    pub fn validate(&self) -> CepResult<()> {
        self.settings.validate()?;

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.id) {
                return Err(CepError::Validation(format!(
                    "duplicate resource id {} ({})",
                    resource.id.value(),
                    resource.name
                )));
            }
            if !resource.min_retirement.is_empty()
                && resource.min_retirement.len() != self.settings.num_stages
            {
                return Err(CepError::MissingInput(format!(
                    "resource {} has {} forced-retirement entries for {} stages",
                    resource.name,
                    resource.min_retirement.len(),
                    self.settings.num_stages
                )));
            }
        }

        self.eligibility.validate(&self.resources)?;
        self.snapshot.validate(&self.resources, &self.settings)?;
        Ok(())
    }
}

/// Typed handles to the three categories' declared pieces.
pub struct StageArtifacts {
    pub power: CategoryArtifacts,
    pub charge: CategoryArtifacts,
    pub energy: CategoryArtifacts,
}

impl StageArtifacts {
    pub fn category(&self, category: CapacityCategory) -> &CategoryArtifacts {
        match category {
            CapacityCategory::Power => &self.power,
            CapacityCategory::Charge => &self.charge,
            CapacityCategory::Energy => &self.energy,
        }
    }
}

/// One stage's fully constructed model: the LP pieces plus the typed
/// artifact handles the outer driver and cost reporting consume.
pub struct StageModel {
    context: StageContext,
    artifacts: StageArtifacts,
}

impl StageModel {
    pub fn artifacts(&self) -> &StageArtifacts {
        &self.artifacts
    }

    pub fn num_variables(&self) -> usize {
        self.context.num_variables()
    }

    pub fn num_constraints(&self) -> usize {
        self.context.num_constraints()
    }

    pub fn objective(&self) -> &Expression {
        self.context.objective()
    }

    /// Release the LP pieces for a solver backend, keeping the artifact
    /// handles for solution extraction.
    pub fn into_parts(self) -> (ProblemVariables, Expression, Vec<Constraint>, StageArtifacts) {
        let (variables, objective, constraints) = self.context.into_parts();
        (variables, objective, constraints, self.artifacts)
    }
}

/// Validate the inputs and construct the stage model.
///
/// Construction always succeeds on well-formed input and yields a
/// syntactically valid model; whether that model is feasible is the
/// solver's verdict.
pub fn build_stage(problem: &StageProblem) -> CepResult<StageModel> {
    problem.validate()?;

    let mut ctx = StageContext::new();
    let build = |category, ctx: &mut StageContext| {
        CapacityLinkageBuilder::new(
            category,
            &problem.resources,
            &problem.eligibility,
            &problem.settings,
            &problem.snapshot,
        )
        .build(ctx)
    };

    let power = build(CapacityCategory::Power, &mut ctx);
    let charge = build(CapacityCategory::Charge, &mut ctx);
    let energy = build(CapacityCategory::Energy, &mut ctx);

    debug!(
        stage = problem.settings.current_stage,
        variables = ctx.num_variables(),
        constraints = ctx.num_constraints(),
        "stage model constructed"
    );

    Ok(StageModel {
        context: ctx,
        artifacts: StageArtifacts {
            power,
            charge,
            energy,
        },
    })
}
