use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How the child process ended. A non-zero code is advisory only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanExit {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl ScanExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs the external tool with a prepared argument vector.
pub trait ToolRunner {
    fn program(&self) -> &str;
    fn run(&self, args: &[String]) -> Result<ScanExit, ExecError>;
}

/// Spawns the real tool, inheriting the terminal so its progress output is
/// shown live, and blocks until it exits.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    program: String,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[String]) -> Result<ScanExit, ExecError> {
        debug!(program = %self.program, ?args, "spawning scan");
        let status = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ExecError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let exit = ScanExit {
            code: status.code(),
        };
        if exit.success() {
            debug!("scan finished");
        } else {
            warn!(code = ?exit.code, program = %self.program, "scan exited unsuccessfully");
        }
        Ok(exit)
    }
}
