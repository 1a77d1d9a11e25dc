//! Resource data structures for capacity-expansion planning
//!
//! A [`Resource`] is one investable asset (a thermal plant, a battery, a
//! demand-response block, ...). Every quantity that differs between the
//! power/discharge, charge, and energy views of a resource is carried as a
//! [`CategoryValues`] triple so the three capacity-linkage instantiations
//! can read their own slice of the data.

use serde::{Deserialize, Serialize};

/// Unique identifier for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub usize);

impl ResourceId {
    pub fn new(id: usize) -> Self {
        ResourceId(id)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One of the three parallel capacity-linkage instantiations.
///
/// Power/discharge applies to every resource; charge only to storage with an
/// asymmetric charge side; energy only to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityCategory {
    /// Power / discharge capacity (MW)
    Power,
    /// Asymmetric charge capacity for storage (MW)
    Charge,
    /// Energy capacity for storage (MWh)
    Energy,
}

impl CapacityCategory {
    /// All categories, in the order the stage builder runs them.
    pub const ALL: [CapacityCategory; 3] = [
        CapacityCategory::Power,
        CapacityCategory::Charge,
        CapacityCategory::Energy,
    ];
}

impl std::fmt::Display for CapacityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityCategory::Power => write!(f, "power"),
            CapacityCategory::Charge => write!(f, "charge"),
            CapacityCategory::Energy => write!(f, "energy"),
        }
    }
}

/// A per-category scalar bundle (existing capacity, bounds, cost rates).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryValues {
    /// Power/discharge value (MW-denominated)
    pub power: f64,
    /// Charge value (MW-denominated)
    pub charge: f64,
    /// Energy value (MWh-denominated)
    pub energy: f64,
}

impl CategoryValues {
    pub const ZERO: CategoryValues = CategoryValues {
        power: 0.0,
        charge: 0.0,
        energy: 0.0,
    };

    /// Same value in all three categories
    pub fn uniform(value: f64) -> Self {
        Self {
            power: value,
            charge: value,
            energy: value,
        }
    }

    /// Read the value for one category
    pub fn get(&self, category: CapacityCategory) -> f64 {
        match category {
            CapacityCategory::Power => self.power,
            CapacityCategory::Charge => self.charge,
            CapacityCategory::Energy => self.energy,
        }
    }

    /// Write the value for one category
    pub fn set(&mut self, category: CapacityCategory, value: f64) {
        match category {
            CapacityCategory::Power => self.power = value,
            CapacityCategory::Charge => self.charge = value,
            CapacityCategory::Energy => self.energy = value,
        }
    }
}

/// An investable asset in the planning problem.
///
/// Capacity bounds use a non-positive sentinel: a `min_capacity` or
/// `max_capacity` entry that is zero or negative means the respective bound
/// is unconstrained for that category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Unique identifier
    pub id: ResourceId,
    /// Human-readable name
    pub name: String,
    /// Discrete block size in MW per unit; 1.0 for continuous resources.
    /// Only consulted for unit-commitment-eligible resources, whose
    /// build/retire decisions count blocks rather than MW.
    pub block_size: f64,
    /// Operating lifetime in years
    pub lifetime_years: f64,
    /// Existing capacity carried into the first stage, per category
    pub existing: CategoryValues,
    /// Minimum installed capacity per category (non-positive = unconstrained)
    pub min_capacity: CategoryValues,
    /// Maximum installed capacity per category (non-positive = unconstrained)
    pub max_capacity: CategoryValues,
    /// Annualized investment cost rate per category ($/MW-yr or $/MWh-yr)
    pub investment_cost: CategoryValues,
    /// Fixed O&M cost rate per category ($/MW-yr or $/MWh-yr)
    pub fixed_om_cost: CategoryValues,
    /// Minimum forced retirement per stage. Empty means no forced
    /// retirement; otherwise one entry per planning stage.
    #[serde(default)]
    pub min_retirement: Vec<f64>,
}

impl Resource {
    /// Create a continuous resource with an existing power capacity and no
    /// bounds, costs, or forced retirement.
    pub fn new(id: usize, name: impl Into<String>, lifetime_years: f64, existing_mw: f64) -> Self {
        Self {
            id: ResourceId::new(id),
            name: name.into(),
            block_size: 1.0,
            lifetime_years,
            existing: CategoryValues {
                power: existing_mw,
                ..CategoryValues::ZERO
            },
            min_capacity: CategoryValues::ZERO,
            max_capacity: CategoryValues::ZERO,
            investment_cost: CategoryValues::ZERO,
            fixed_om_cost: CategoryValues::ZERO,
            min_retirement: Vec::new(),
        }
    }

    /// Set the discrete block size (MW per unit)
    pub fn with_block_size(mut self, block_size: f64) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set existing charge and energy capacity (storage resources)
    pub fn with_storage_existing(mut self, charge_mw: f64, energy_mwh: f64) -> Self {
        self.existing.charge = charge_mw;
        self.existing.energy = energy_mwh;
        self
    }

    /// Set min/max bounds for one category (non-positive = unconstrained)
    pub fn with_bounds(mut self, category: CapacityCategory, min: f64, max: f64) -> Self {
        self.min_capacity.set(category, min);
        self.max_capacity.set(category, max);
        self
    }

    /// Set investment and fixed O&M cost rates for one category
    pub fn with_costs(mut self, category: CapacityCategory, investment: f64, fixed_om: f64) -> Self {
        self.investment_cost.set(category, investment);
        self.fixed_om_cost.set(category, fixed_om);
        self
    }

    /// Set the per-stage minimum forced retirement schedule
    pub fn with_min_retirement(mut self, schedule: Vec<f64>) -> Self {
        self.min_retirement = schedule;
        self
    }

    /// Minimum forced retirement for a 1-indexed stage (zero if no schedule)
    pub fn min_retirement_at(&self, stage: usize) -> f64 {
        self.min_retirement.get(stage - 1).copied().unwrap_or(0.0)
    }
}
