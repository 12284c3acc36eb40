// Core modules
pub mod metrics;
pub mod types;

pub use metrics::Sample;
pub use types::{CpuCounters, Percentage, RawSnapshot, RawValue, ReadingValue, Readings};
