//! Backend commands queued from UI to backend worker.

use client_core::SelectedFile;

use crate::controller::upload::{ClassifyJob, CycleId};

#[derive(Debug)]
pub enum BackendCommand {
    Classify { cycle: CycleId, file: SelectedFile },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Classify { .. } => "classify",
        }
    }
}

impl From<ClassifyJob> for BackendCommand {
    fn from(job: ClassifyJob) -> Self {
        BackendCommand::Classify {
            cycle: job.cycle,
            file: job.file,
        }
    }
}
