//! Prior-stage realized values
//!
//! The outer multi-stage driver solves stages in sequence; each later stage
//! must see the new-build and retirement amounts realized by earlier stage
//! solves, and the carry-in capacity that the previous stage handed forward.
//! Those values enter this core as an explicit [`PriorStageSnapshot`]
//! accepted at construction time. Every entry absent from the snapshot reads
//! as zero (or falls back to input data, for carry-in), so a caller that
//! never records anything still gets a valid first-stage model.

use cep_core::{CapacityCategory, CepError, CepResult, MultiStageSettings, Resource, ResourceId};
use std::collections::{HashMap, HashSet};

/// Realized values from earlier stage solves, keyed by resource, capacity
/// category, and 1-indexed stage.
#[derive(Debug, Clone, Default)]
pub struct PriorStageSnapshot {
    new_build: HashMap<(ResourceId, CapacityCategory, usize), f64>,
    retirement: HashMap<(ResourceId, CapacityCategory, usize), f64>,
    carry_in: HashMap<(ResourceId, CapacityCategory), f64>,
}

impl PriorStageSnapshot {
    /// Snapshot with no recorded history (a first-stage solve).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.new_build.is_empty() && self.retirement.is_empty() && self.carry_in.is_empty()
    }

    /// Record the new-build amount realized in a past stage.
    pub fn record_new_build(
        &mut self,
        id: ResourceId,
        category: CapacityCategory,
        stage: usize,
        amount: f64,
    ) {
        self.new_build.insert((id, category, stage), amount);
    }

    /// Record the retirement amount realized in a past stage.
    pub fn record_retirement(
        &mut self,
        id: ResourceId,
        category: CapacityCategory,
        stage: usize,
        amount: f64,
    ) {
        self.retirement.insert((id, category, stage), amount);
    }

    /// Override the carry-in anchor for a resource, replacing the existing
    /// capacity from input data with the previous stage's solved total.
    pub fn pin_carry_in(&mut self, id: ResourceId, category: CapacityCategory, capacity: f64) {
        self.carry_in.insert((id, category), capacity);
    }

    /// New-build realized at a past stage (zero if never recorded).
    pub fn new_build_at(&self, id: ResourceId, category: CapacityCategory, stage: usize) -> f64 {
        self.new_build
            .get(&(id, category, stage))
            .copied()
            .unwrap_or(0.0)
    }

    /// Retirement realized at a past stage (zero if never recorded).
    pub fn retirement_at(&self, id: ResourceId, category: CapacityCategory, stage: usize) -> f64 {
        self.retirement
            .get(&(id, category, stage))
            .copied()
            .unwrap_or(0.0)
    }

    /// Carry-in override for a resource, if one was pinned.
    pub fn carry_in_override(&self, id: ResourceId, category: CapacityCategory) -> Option<f64> {
        self.carry_in.get(&(id, category)).copied()
    }

    /// Check that every recorded entry refers to a known resource and to a
    /// stage strictly before the current one.
    pub fn validate(&self, universe: &[Resource], settings: &MultiStageSettings) -> CepResult<()> {
        let known: HashSet<ResourceId> = universe.iter().map(|r| r.id).collect();

        let track_keys = self.new_build.keys().chain(self.retirement.keys());
        for (id, category, stage) in track_keys {
            if !known.contains(id) {
                return Err(CepError::UnknownResource {
                    id: id.value(),
                    referenced_by: format!("prior-stage snapshot ({category}, stage {stage})"),
                });
            }
            if *stage == 0 || *stage >= settings.current_stage {
                return Err(CepError::StageOutOfRange {
                    stage: *stage,
                    num_stages: settings.num_stages,
                });
            }
        }

        for (id, category) in self.carry_in.keys() {
            if !known.contains(id) {
                return Err(CepError::UnknownResource {
                    id: id.value(),
                    referenced_by: format!("prior-stage snapshot carry-in ({category})"),
                });
            }
        }

        Ok(())
    }
}
