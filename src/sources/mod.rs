//! Reference [`Source`](crate::traits::Source) implementations.
//!
//! Device-specific readers normally live with the host; these cover the common Linux
//! cases and let the runtime be exercised end to end.
//!
//! * [`ProcStatSource`] - per-CPU jiffy counters from `/proc/stat`
//! * [`SysfsValueSource`] - numeric sysfs attributes such as devfreq `cur_freq` or thermal `temp`
//! * [`FnSource`] - adapter for a closure

mod fn_source;
#[cfg(feature = "linux-sources")]
mod proc_stat;
#[cfg(feature = "linux-sources")]
mod sysfs;

pub use fn_source::FnSource;
#[cfg(feature = "linux-sources")]
pub use proc_stat::{parse_proc_stat, ProcStatSource};
#[cfg(feature = "linux-sources")]
pub use sysfs::{SysfsEntry, SysfsValueSource};
