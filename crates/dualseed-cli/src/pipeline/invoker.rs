//! Step execution seam
//!
//! The driver never spawns processes itself; it hands each descriptor to a
//! [`StepInvoker`]. [`ProcessInvoker`] is the production implementation.

use super::steps::StepDescriptor;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// How a step finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl StepStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for StepStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Runs one step to completion
pub trait StepInvoker {
    /// Run `step` with `root` as its working directory
    ///
    /// `Err` means the step could not be started at all.
    fn invoke(&mut self, step: &StepDescriptor, root: &Path) -> std::io::Result<StepStatus>;
}

/// Spawns each step as a child process and waits for it
///
/// Children inherit stdin, stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl ProcessInvoker {
    pub fn new() -> Self {
        Self
    }

    // A relative program with a directory part is resolved against the root;
    // bare names go through PATH.
    fn program_path(program: &Path, root: &Path) -> PathBuf {
        if program.is_relative() && program.components().count() > 1 {
            root.join(program)
        } else {
            program.to_path_buf()
        }
    }
}

impl StepInvoker for ProcessInvoker {
    fn invoke(&mut self, step: &StepDescriptor, root: &Path) -> std::io::Result<StepStatus> {
        let program = Self::program_path(&step.command.program, root);
        let status = Command::new(program)
            .args(&step.command.args)
            .current_dir(root)
            .status()?;
        Ok(status.into())
    }
}
