//! Reading values out of the plain-text metrics exposition.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

pub const POOL_USED_METRIC: &str = "db_pool_checked_out";
pub const POOL_CAPACITY_METRIC: &str = "db_pool_size";

// Unlabelled samples only: `name value [timestamp]`.
static SAMPLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_:][A-Za-z0-9_:]*)\s+(\S+)").unwrap());

/// Collects every unlabelled numeric sample. Comments, labelled series and
/// unparsable values are skipped.
pub fn parse_exposition(text: &str) -> BTreeMap<&str, f64> {
    let mut samples = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(caps) = SAMPLE_LINE.captures(line) else {
            continue;
        };
        let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if let Ok(v) = value.as_str().parse::<f64>() {
            samples.insert(name.as_str(), v);
        }
    }
    samples
}

/// Returns `(used, capacity)` when both pool gauges are present and sane.
pub fn extract_pool_usage(text: &str) -> Option<(u64, u64)> {
    let samples = parse_exposition(text);
    let used = as_count(*samples.get(POOL_USED_METRIC)?)?;
    let capacity = as_count(*samples.get(POOL_CAPACITY_METRIC)?)?;
    Some((used, capacity))
}

fn as_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as u64)
}
