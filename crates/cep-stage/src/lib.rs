//! # cep-stage: Stage Model Construction for Capacity-Expansion Planning
//!
//! Builds, for one stage of a multi-stage capacity-expansion problem, the
//! decision variables and linear constraints that link installed capacity
//! across planning stages, enforce capacity bounds, and enforce endogenous
//! lifetime retirement in aggregate.
//!
//! ## Formulation
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  ONE STAGE OF CAPACITY-EXPANSION LINKAGE                             │
//! │  ───────────────────────────────────────                             │
//! │                                                                      │
//! │  Given:                                                              │
//! │    • Resource universe with block sizes, lifetimes, bounds, costs    │
//! │    • Eligibility memberships (build / retire / commit / storage)     │
//! │    • Stage schedule and the current stage index                      │
//! │    • Realized values from earlier stage solves (snapshot)            │
//! │                                                                      │
//! │  Declare, three times (power/discharge, charge, energy):             │
//! │    • Carry-in, new-build, retirement decisions (continuous, >= 0)    │
//! │    • Stage-indexed new-build / retirement tracking arrays            │
//! │                                                                      │
//! │  Accumulate:                                                         │
//! │    Fixed cost = investment x new build + O&M x installed total,      │
//! │    contributed to one shared objective scaled by 1/OPEXMULT          │
//! │                                                                      │
//! │  Subject to:                                                         │
//! │    • Carry-in anchored to input data or the prior stage's total      │
//! │    • Retirement bounded by carry-in                                  │
//! │    • Min/max installed-capacity bounds (sentinel: non-positive)      │
//! │    • Tracking arrays pinned (current stage = decisions, rest fixed)  │
//! │    • Cumulative retirements cover forced minimums plus every build   │
//! │      whose retirement horizon has elapsed                            │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate declares a syntactically valid model and hands the LP pieces to
//! whichever `good_lp` backend the feature flags enable; it never solves,
//! never judges feasibility, and never caches anything between stages. The
//! outer nested-decomposition driver owns stage ordering, snapshot
//! propagation, and convergence.
//!
//! ## Example
//!
//! ```rust
//! use cep_core::{CapacityCategory, EligibilitySets, MultiStageSettings, Resource};
//! use cep_stage::{build_stage, StageProblem};
//!
//! let resources = vec![
//!     Resource::new(0, "gas", 25.0, 300.0)
//!         .with_costs(CapacityCategory::Power, 0.0, 20_000.0),
//!     Resource::new(1, "wind", 25.0, 0.0)
//!         .with_bounds(CapacityCategory::Power, 100.0, 0.0)
//!         .with_costs(CapacityCategory::Power, 90_000.0, 35_000.0),
//! ];
//! let eligibility = EligibilitySets::new()
//!     .with_new_build([1])
//!     .with_retirement([0]);
//! let problem = StageProblem::new(resources, MultiStageSettings::new(vec![10.0, 10.0], 1))
//!     .with_eligibility(eligibility);
//!
//! let model = build_stage(&problem)?;
//! let (variables, objective, constraints, artifacts) = model.into_parts();
//! // hand the pieces to a good_lp solver backend, then extract a
//! // cep_stage::StageSolution from the artifacts
//! # Ok::<(), cep_core::CepError>(())
//! ```

pub mod context;
pub mod horizon;
pub mod linkage;
pub mod snapshot;
pub mod solution;
pub mod stage;

pub use context::StageContext;
pub use horizon::retirement_horizon;
pub use linkage::{CapacityLinkageBuilder, CategoryArtifacts};
pub use snapshot::PriorStageSnapshot;
pub use solution::{CategorySolution, StageSolution};
pub use stage::{build_stage, StageArtifacts, StageModel, StageProblem};
