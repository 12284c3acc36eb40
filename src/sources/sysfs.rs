use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{core::types::RawSnapshot, traits::Source, Error, Result};

/// One numeric sysfs attribute and how to scale it
#[derive(Debug, Clone, PartialEq)]
pub struct SysfsEntry {
    pub key: String,
    pub path: PathBuf,
    /// Multiplier applied to the raw integer, e.g. `0.001` for millidegrees
    pub scale: f64,
}

impl SysfsEntry {
    pub fn new(key: impl Into<String>, path: impl AsRef<Path>, scale: f64) -> Self {
        Self { key: key.into(), path: path.as_ref().to_path_buf(), scale }
    }
}

/// Reads a fixed set of numeric sysfs files on every call
///
/// A file that is missing or does not hold a number is skipped for that call; the call
/// only fails when no file could be read at all.
#[derive(Debug, Clone)]
pub struct SysfsValueSource {
    name: String,
    entries: Vec<SysfsEntry>,
}

impl SysfsValueSource {
    pub fn new(name: impl Into<String>, entries: Vec<SysfsEntry>) -> Self {
        Self { name: name.into(), entries }
    }

    /// Thermal zone temperature in degrees Celsius
    pub fn thermal_zone(zone: u32) -> Self {
        Self::new(
            format!("thermal_zone{}", zone),
            vec![SysfsEntry::new("temperature", format!("/sys/class/thermal/thermal_zone{}/temp", zone), 0.001)],
        )
    }

    /// Current, minimum and maximum frequency of a devfreq device in MHz
    pub fn devfreq(device: &str) -> Self {
        let base = Path::new("/sys/class/devfreq").join(device);
        Self::new(
            format!("devfreq:{}", device),
            vec![
                SysfsEntry::new("cur_freq_mhz", base.join("cur_freq"), 1e-6),
                SysfsEntry::new("min_freq_mhz", base.join("min_freq"), 1e-6),
                SysfsEntry::new("max_freq_mhz", base.join("max_freq"), 1e-6),
            ],
        )
    }

    pub fn entries(&self) -> &[SysfsEntry] {
        &self.entries
    }

    fn read_entry(entry: &SysfsEntry) -> Result<f64> {
        let raw = fs::read_to_string(&entry.path)?;
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|e| Error::parse(format!("{}: {:?} ({})", entry.path.display(), raw.trim(), e)))?;
        Ok(value * entry.scale)
    }
}

impl Source for SysfsValueSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_snapshot(&self) -> Result<RawSnapshot> {
        let mut snapshot = RawSnapshot::new();
        let mut last_error = None;

        for entry in &self.entries {
            match Self::read_entry(entry) {
                Ok(value) => snapshot = snapshot.with_value(entry.key.as_str(), value),
                Err(e) => {
                    debug!(source = %self.name, key = %entry.key, error = %e, "skipping sysfs entry");
                    last_error = Some(e);
                },
            }
        }

        match last_error {
            Some(e) if snapshot.is_empty() => Err(e),
            _ => Ok(snapshot),
        }
    }

    fn probe(&self) -> Result<()> {
        if self.entries.iter().any(|entry| entry.path.exists()) {
            Ok(())
        } else {
            Err(Error::source_unavailable(format!("{}: none of {} sysfs files exist", self.name, self.entries.len())))
        }
    }
}
