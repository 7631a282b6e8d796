pub mod costs;
pub mod cron;
pub mod health;
pub mod model_costs;
pub mod usage;

pub use costs::create_cost_routes;
pub use cron::create_cron_routes;
pub use health::create_health_routes;
pub use model_costs::create_admin_cost_routes;
pub use usage::create_usage_routes;
