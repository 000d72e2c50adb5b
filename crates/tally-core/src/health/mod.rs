//! Backend health: database pool polling and readiness probes.

mod exposition;
mod poller;
mod pool;
mod readiness;

pub use exposition::{extract_pool_usage, parse_exposition, POOL_CAPACITY_METRIC, POOL_USED_METRIC};
pub use poller::{HealthPoller, METRICS_PATH};
pub use pool::{PoolSeverity, PoolStatus};
pub use readiness::{ReadinessProbe, HEALTH_PATH, READY_PATH};
