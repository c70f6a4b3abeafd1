use std::io;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::command::{CommandLine, RandomUserAgent, UserAgentSource};
use crate::config::Settings;
use crate::executor::{ExecError, ProcessRunner, ScanExit, ToolRunner};
use crate::history::{HistoryEntry, HistoryError, HistoryStore};
use crate::output::{self, ResultSummary};
use crate::scan::{ConfigError, ScanConfiguration};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result of one scan attempt.
#[derive(Clone, Debug)]
pub struct ScanOutcome {
    pub command: CommandLine,
    pub exit: ScanExit,
    pub entry: HistoryEntry,
}

impl ScanOutcome {
    pub fn summary(&self) -> Option<&ResultSummary> {
        self.entry.summary.as_ref()
    }
}

/// Drives build → execute → summarize → record.
pub struct Runner {
    tool: Box<dyn ToolRunner>,
    agents: Box<dyn UserAgentSource>,
    history: HistoryStore,
}

impl Runner {
    pub fn new(settings: &Settings) -> Self {
        Self::with_parts(
            Box::new(ProcessRunner::new(settings.ffuf_path.clone())),
            Box::new(RandomUserAgent),
            HistoryStore::new(settings.history_file.clone()),
        )
    }

    pub fn with_parts(
        tool: Box<dyn ToolRunner>,
        agents: Box<dyn UserAgentSource>,
        history: HistoryStore,
    ) -> Self {
        Self {
            tool,
            agents,
            history,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Builds the command without running it.
    pub fn command(&self, config: &ScanConfiguration) -> CommandLine {
        CommandLine::new(self.tool.program(), config, self.agents.as_ref())
    }

    /// Runs `config` and records the attempt, whatever the tool's exit code.
    ///
    /// `on_start` sees the exact command line before the tool is spawned.
    pub fn run<F>(
        &self,
        scan_type: &str,
        config: ScanConfiguration,
        on_start: F,
    ) -> Result<ScanOutcome, RunnerError>
    where
        F: FnOnce(&str, &CommandLine),
    {
        let command = self.command(&config);
        info!(%scan_type, command = %command, "starting scan");
        on_start(scan_type, &command);

        clear_previous_results(&config);
        let exit = self.tool.run(&command.args)?;
        if !exit.success() {
            warn!(code = ?exit.code, "ffuf exited with a non-zero status, summarizing anyway");
        }

        let summary = collect_summary(&config);
        let entry = HistoryEntry::new(scan_type, config, summary);
        self.history.append(entry.clone())?;

        Ok(ScanOutcome {
            command,
            exit,
            entry,
        })
    }

    /// Re-runs a 1-based history entry, recording it as a new entry.
    ///
    /// The stored configuration is validated again before anything runs.
    pub fn rerun<F>(&self, index: usize, on_start: F) -> Result<ScanOutcome, RunnerError>
    where
        F: FnOnce(&str, &CommandLine),
    {
        let previous = self.history.get(index)?;
        previous.params.validate()?;
        info!(index, timestamp = %previous.timestamp, "re-running scan");
        self.run(&previous.scan_type, previous.params, on_start)
    }
}

/// A report left at the output path by an earlier run must not be taken for
/// this run's results.
fn clear_previous_results(config: &ScanConfiguration) {
    let path = config.output_path();
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed previous results file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove previous results file"),
    }
}

fn collect_summary(config: &ScanConfiguration) -> Option<ResultSummary> {
    let path = config.output_path();
    if !path.is_file() {
        warn!(path = %path.display(), "no results file written");
        return None;
    }
    match output::summarize(path) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!(error = %e, "could not summarize results");
            None
        }
    }
}
