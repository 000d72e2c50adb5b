#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolSeverity {
    Normal,
    Warning,
    Critical,
}

impl PoolSeverity {
    pub fn classify(used: u64, capacity: u64) -> Self {
        if used >= capacity {
            PoolSeverity::Critical
        } else if used + 1 >= capacity {
            PoolSeverity::Warning
        } else {
            PoolSeverity::Normal
        }
    }
}

/// Database pool utilization from the latest poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub used: u64,
    pub capacity: u64,
    pub severity: PoolSeverity,
}

impl PoolStatus {
    pub fn new(used: u64, capacity: u64) -> Self {
        Self {
            used,
            capacity,
            severity: PoolSeverity::classify(used, capacity),
        }
    }
}
