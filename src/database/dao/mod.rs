pub mod costs;
pub mod model_costs;
pub mod usage;

pub use costs::{CostAggregates, CostLedgerDao, CostQuery, UserCostBreakdown};
pub use model_costs::ModelCostsDao;
pub use usage::{UsageCounter, UsageDao};
