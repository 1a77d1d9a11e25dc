//! Resource-set memberships and capacity profiles
//!
//! Eligibility is expressed as membership sets over the resource universe:
//! whether a resource can build new capacity, retire existing capacity, is
//! unit-committed (discrete blocks), has an asymmetric charge side, or is
//! storage at all. The build/retire pair collapses into a [`CapacityProfile`]
//! computed once per resource so constraint construction dispatches by a
//! single `match` instead of repeated set lookups.

use crate::error::{CepError, CepResult};
use crate::resource::{Resource, ResourceId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a resource's installed capacity can move within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityProfile {
    /// Neither new build nor retirement allowed; capacity is the carry-in
    FixedOnly,
    /// New build allowed, retirement not
    BuildOnly,
    /// Retirement allowed, new build not
    RetireOnly,
    /// Both new build and retirement allowed
    BuildAndRetire,
}

impl CapacityProfile {
    /// Whether the profile admits a new-build decision variable
    pub fn can_build(&self) -> bool {
        matches!(self, CapacityProfile::BuildOnly | CapacityProfile::BuildAndRetire)
    }

    /// Whether the profile admits a retirement decision variable
    pub fn can_retire(&self) -> bool {
        matches!(self, CapacityProfile::RetireOnly | CapacityProfile::BuildAndRetire)
    }
}

/// The five resource-set memberships consumed per capacity category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EligibilitySets {
    /// Resources allowed to add new capacity
    pub new_build: HashSet<ResourceId>,
    /// Resources allowed to retire existing capacity
    pub retirement: HashSet<ResourceId>,
    /// Resources whose decisions count discrete blocks
    pub unit_commitment: HashSet<ResourceId>,
    /// Storage resources with an asymmetric charge side
    pub charge_storage: HashSet<ResourceId>,
    /// All storage resources
    pub storage: HashSet<ResourceId>,
}

impl EligibilitySets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark resources as new-build-eligible
    pub fn with_new_build(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.new_build.extend(ids.into_iter().map(ResourceId::new));
        self
    }

    /// Mark resources as retirement-eligible
    pub fn with_retirement(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.retirement.extend(ids.into_iter().map(ResourceId::new));
        self
    }

    /// Mark resources as unit-commitment-eligible
    pub fn with_unit_commitment(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.unit_commitment
            .extend(ids.into_iter().map(ResourceId::new));
        self
    }

    /// Mark resources as asymmetric-charge storage (implies storage)
    pub fn with_charge_storage(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        for id in ids {
            self.charge_storage.insert(ResourceId::new(id));
            self.storage.insert(ResourceId::new(id));
        }
        self
    }

    /// Mark resources as storage
    pub fn with_storage(mut self, ids: impl IntoIterator<Item = usize>) -> Self {
        self.storage.extend(ids.into_iter().map(ResourceId::new));
        self
    }

    /// Capacity profile for a resource, from the build/retire memberships.
    pub fn profile(&self, id: ResourceId) -> CapacityProfile {
        match (self.new_build.contains(&id), self.retirement.contains(&id)) {
            (false, false) => CapacityProfile::FixedOnly,
            (true, false) => CapacityProfile::BuildOnly,
            (false, true) => CapacityProfile::RetireOnly,
            (true, true) => CapacityProfile::BuildAndRetire,
        }
    }

    /// Whether build/retire decisions for a resource count discrete blocks
    pub fn is_unit_committed(&self, id: ResourceId) -> bool {
        self.unit_commitment.contains(&id)
    }

    /// Check that every membership refers to a resource in the universe.
    pub fn validate(&self, universe: &[Resource]) -> CepResult<()> {
        let known: HashSet<ResourceId> = universe.iter().map(|r| r.id).collect();
        let sets = [
            (&self.new_build, "new_build eligibility set"),
            (&self.retirement, "retirement eligibility set"),
            (&self.unit_commitment, "unit_commitment eligibility set"),
            (&self.charge_storage, "charge_storage eligibility set"),
            (&self.storage, "storage eligibility set"),
        ];
        for (set, name) in sets {
            if let Some(id) = set.difference(&known).next() {
                return Err(CepError::UnknownResource {
                    id: id.value(),
                    referenced_by: name.to_string(),
                });
            }
        }
        Ok(())
    }
}
