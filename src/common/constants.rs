pub const METRIC_NAME_LABEL: &str = "__name__";

pub const MILLIS_PER_SEC: u64 = 1000;
pub const MILLIS_PER_MIN: u64 = 60 * MILLIS_PER_SEC;
