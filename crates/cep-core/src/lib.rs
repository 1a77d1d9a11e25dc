//! # cep-core: Capacity-Expansion Planning Core Data Model
//!
//! Provides the fundamental data structures for multi-stage capacity-expansion
//! planning: investable resources, the planning-stage schedule, eligibility
//! memberships, and the unified error type shared across the CEP crates.
//!
//! ## Design Philosophy
//!
//! The planning domain is described by **plain data**:
//! - **Resources**: assets with block size, lifetime, existing capacity, and
//!   per-category bounds and cost rates ([`Resource`], [`CategoryValues`])
//! - **Stages**: ordered multi-year periods with fixed lengths
//!   ([`MultiStageSettings`])
//! - **Eligibility**: set memberships over the resource universe
//!   ([`EligibilitySets`]), collapsed to a per-resource [`CapacityProfile`]
//!
//! Construction of decision variables and constraints lives in `cep-stage`;
//! this crate only validates structural well-formedness. Feasibility of the
//! resulting model is a property of the data, diagnosed by the solver.
//!
//! ## Quick Start
//!
//! ```rust
//! use cep_core::{CapacityCategory, EligibilitySets, MultiStageSettings, Resource};
//!
//! // Three 10-year stages, currently solving stage 1
//! let settings = MultiStageSettings::new(vec![10.0, 10.0, 10.0], 1)
//!     .with_discount_rate(0.07);
//!
//! let coal = Resource::new(0, "coal", 40.0, 800.0)
//!     .with_block_size(200.0)
//!     .with_costs(CapacityCategory::Power, 0.0, 45_000.0);
//!
//! let wind = Resource::new(1, "wind", 25.0, 150.0)
//!     .with_bounds(CapacityCategory::Power, 0.0, 2_000.0)
//!     .with_costs(CapacityCategory::Power, 95_000.0, 30_000.0);
//!
//! let eligibility = EligibilitySets::new()
//!     .with_new_build([1])
//!     .with_retirement([0])
//!     .with_unit_commitment([0]);
//!
//! settings.validate().unwrap();
//! eligibility.validate(&[coal, wind]).unwrap();
//! ```

pub mod eligibility;
pub mod error;
pub mod resource;
pub mod stage;

pub use eligibility::{CapacityProfile, EligibilitySets};
pub use error::{CepError, CepResult};
pub use resource::{CapacityCategory, CategoryValues, Resource, ResourceId};
pub use stage::MultiStageSettings;
