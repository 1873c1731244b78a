use crate::error::{Result, RhemError};
use log::info;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs an external model on a run directive file.
pub trait ModelRunner {
    fn run(&self, run_file: &Path) -> Result<()>;
}

/// External binary invoked as `<program> -b <run file>` from a working
/// directory. Any nonzero exit status is a failed run.
#[derive(Debug, Clone)]
pub struct Executable {
    pub program: PathBuf,
    pub working_dir: PathBuf,
}

impl Executable {
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Executable {
            program: program.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl ModelRunner for Executable {
    fn run(&self, run_file: &Path) -> Result<()> {
        info!("running {} -b {}", self.program.display(), run_file.display());
        let status = Command::new(&self.program)
            .arg("-b")
            .arg(run_file)
            .current_dir(&self.working_dir)
            .status()
            .map_err(|e| {
                RhemError::io(format!("Failed to start {}", self.program.display()), e)
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(RhemError::ExternalRun {
                program: self.program.clone(),
                // killed by a signal
                status: status.code().unwrap_or(-1),
            })
        }
    }
}
