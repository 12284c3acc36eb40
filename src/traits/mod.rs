// Traits module
//
// The seams between the polling runtime and its collaborators: sources that read hardware
// and hosts that drive sensors.

pub mod source;

pub use source::{ManagedSensor, Source};

#[cfg(test)]
pub use source::MockSource;
