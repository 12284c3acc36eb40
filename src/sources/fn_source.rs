use crate::{core::types::RawSnapshot, traits::Source, Result};

/// Wraps a closure as a [`Source`]
///
/// ```rust
/// use sensor_poller::{core::types::RawSnapshot, sources::FnSource, traits::Source};
///
/// let source = FnSource::new("uptime", || Ok(RawSnapshot::new().with_value("seconds", 42.0)));
/// assert_eq!(source.read_snapshot().unwrap().len(), 1);
/// ```
pub struct FnSource<F> {
    name: String,
    read: F,
}

impl<F> FnSource<F>
where
    F: Fn() -> Result<RawSnapshot> + Send + Sync,
{
    pub fn new(name: impl Into<String>, read: F) -> Self {
        Self { name: name.into(), read }
    }
}

impl<F> Source for FnSource<F>
where
    F: Fn() -> Result<RawSnapshot> + Send + Sync,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_snapshot(&self) -> Result<RawSnapshot> {
        (self.read)()
    }
}
