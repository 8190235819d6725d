use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An instantaneous reading of host load. Used for reporting only, never for control decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSample {
    pub cpu_percent: f64,
    /// Host memory in use.
    pub memory_percent: f64,
    /// Resident memory of the sampling process.
    pub memory_mb: f64,
    pub timestamp: DateTime<Utc>,
}

impl SystemSample {
    pub fn zeroed() -> Self {
        Self {
            cpu_percent: 0.,
            memory_percent: 0.,
            memory_mb: 0.,
            timestamp: Utc::now(),
        }
    }
}

pub trait LoadSampler {
    fn sample(&mut self) -> SystemSample;
}

impl<F: FnMut() -> SystemSample> LoadSampler for F {
    fn sample(&mut self) -> SystemSample {
        (self)()
    }
}

/// Sampler for callers that do not care about host load.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLoadSampler;

impl LoadSampler for NoopLoadSampler {
    fn sample(&mut self) -> SystemSample {
        SystemSample::zeroed()
    }
}
