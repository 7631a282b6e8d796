pub mod cost_entries;
pub mod model_costs;
pub mod user_usage;

pub use cost_entries::Entity as CostEntries;
pub use model_costs::Entity as ModelCosts;
pub use user_usage::Entity as UserUsage;

pub use cost_entries::Feature;
pub use user_usage::Plan;

// Type aliases
pub type CostEntry = cost_entries::Model;
pub type ModelCost = model_costs::Model;
pub type UserUsageRecord = user_usage::Model;
