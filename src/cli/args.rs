use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ffuf-agent",
    version,
    about = "interactive front-end for ffuf",
    long_about = "ffuf-agent walks you through building an ffuf scan, downloads wordlists on demand, runs ffuf and keeps a history of past scans for review or re-execution.\n\nExamples:\n  ffuf-agent\n  ffuf-agent --history\n  ffuf-agent --ffuf-path ~/go/bin/ffuf --dry-run\n\nEnvironment: WORDLIST_DIR, FFUF_HISTORY_FILE and FFUF_PATH override the config file."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.ffuf-agent/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "wordlist-dir",
        visible_alias = "wd",
        value_name = "DIR",
        help_heading = "Input",
        help = "Directory holding downloaded wordlists."
    )]
    pub wordlist_dir: Option<String>,

    #[arg(
        long = "history-file",
        visible_alias = "hf",
        value_name = "FILE",
        help_heading = "History",
        help = "JSON file storing the scan history."
    )]
    pub history_file: Option<String>,

    #[arg(
        short = 'H',
        long = "history",
        help_heading = "History",
        help = "Open the scan history menu directly."
    )]
    pub history: bool,

    #[arg(
        long = "ffuf-path",
        value_name = "PATH",
        help_heading = "Scan",
        help = "ffuf executable to run."
    )]
    pub ffuf_path: Option<String>,

    #[arg(
        long = "dry-run",
        help_heading = "Scan",
        help = "Print the ffuf command instead of running it."
    )]
    pub dry_run: bool,
}
