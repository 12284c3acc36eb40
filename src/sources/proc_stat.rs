use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    core::types::{CpuCounters, RawSnapshot},
    traits::Source,
    Error, Result,
};

/// Kernels before 2.6 only report user, nice, system and idle.
const MIN_FIELDS: usize = 4;

/// Reads per-CPU time counters from a `/proc/stat` formatted file
#[derive(Debug, Clone)]
pub struct ProcStatSource {
    path: PathBuf,
}

impl ProcStatSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcStatSource {
    fn default() -> Self {
        Self::new("/proc/stat")
    }
}

impl Source for ProcStatSource {
    fn name(&self) -> String {
        format!("procstat:{}", self.path.display())
    }

    fn read_snapshot(&self) -> Result<RawSnapshot> {
        let contents = fs::read_to_string(&self.path)?;
        let snapshot = parse_proc_stat(&contents);
        if snapshot.is_empty() {
            return Err(Error::parse(format!("no cpu lines in {}", self.path.display())));
        }
        Ok(snapshot)
    }

    fn probe(&self) -> Result<()> {
        fs::metadata(&self.path)
            .map(|_| ())
            .map_err(|e| Error::source_unavailable(format!("{}: {}", self.path.display(), e)))
    }
}

/// Parses the `cpu` and `cpuN` lines of `/proc/stat` text
///
/// Malformed lines are skipped; fields beyond `steal` (guest time, already counted in
/// `user`) are ignored.
pub fn parse_proc_stat(contents: &str) -> RawSnapshot {
    let mut snapshot = RawSnapshot::new();

    for line in contents.lines() {
        let mut fields = line.split_whitespace();
        let Some(key) = fields.next() else {
            continue;
        };
        if !key.starts_with("cpu") {
            continue;
        }

        let values: std::result::Result<Vec<u64>, _> = fields.take(8).map(str::parse::<u64>).collect();
        let values = match values {
            Ok(values) if values.len() >= MIN_FIELDS => values,
            Ok(values) => {
                debug!(key, fields = values.len(), "too few counters, skipping line");
                continue;
            },
            Err(e) => {
                debug!(key, error = %e, "unparseable counter, skipping line");
                continue;
            },
        };

        let field = |i: usize| values.get(i).copied().unwrap_or(0);
        snapshot = snapshot.with_counters(
            key,
            CpuCounters {
                user: field(0),
                nice: field(1),
                system: field(2),
                idle: field(3),
                iowait: field(4),
                irq: field(5),
                softirq: field(6),
                steal: field(7),
            },
        );
    }

    snapshot
}
