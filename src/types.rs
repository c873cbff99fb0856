use std::fmt;

use clap::ValueEnum;

/// Cluster job-submission backend the cache run is executed under.
///
/// Only SLURM is supported today. New backends get a variant here and an arm
/// in [`crate::pull::pull_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchedulerMode {
    Slurm,
}

impl SchedulerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerMode::Slurm => "slurm",
        }
    }
}

impl fmt::Display for SchedulerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
