use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine};
use clap::{error::ErrorKind, Parser};
use colored::Colorize;

use crate::catalog::{self, ScanType, PROFILES};
use crate::cli::args::CliArgs;
use crate::cli::prompt::{self, Prompter};
use crate::cli::validation;
use crate::command::CommandLine;
use crate::config::{self, ConfigFile, Overrides, Settings};
use crate::output;
use crate::runner::{Runner, RunnerError, ScanOutcome};
use crate::scan::{default_output_path, ScanConfiguration, ScanOptions, FUZZ_KEYWORD};
use crate::wordlist::WordlistResolver;

fn print_banner() {
    const BANNER: &str = r#"
   __  __                                     _
  / _|/ _|_   _ / _|      __ _  __ _  ___ _ __ | |_
 | |_| |_| | | | |_ _____ / _` |/ _` |/ _ \ '_ \| __|
 |  _|  _| |_| |  _|_____| (_| | (_| |  __/ | | | |_
 |_| |_|  \__,_|_|        \__,_|\__, |\___|_| |_|\__|
                                |___/
            interactive front-end for ffuf
    "#;
    println!("{}", BANNER.bold().green());
}

fn io_error(e: io::Error) -> String {
    format!("console I/O failed: {e}")
}

fn format_kv_line<W: Write>(out: &mut W, label: &str, value: &str) -> io::Result<()> {
    writeln!(out, ":: {:<10}: {}", label, value)
}

/// What the user asked for in the history menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    Back,
    Rerun(usize),
    Delete(usize),
}

impl HistoryAction {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Some(Self::Back);
        }
        if let Some(rest) = input.strip_prefix('d').or_else(|| input.strip_prefix('D')) {
            return rest.trim().parse().ok().map(Self::Delete);
        }
        input.parse().ok().map(Self::Rerun)
    }
}

/// Builds an `Authorization` header value from the auth menu answers.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let token = STANDARD.encode(format!("{username}:{password}"));
    format!("Authorization: Basic {token}")
}

pub fn bearer_auth_header(token: &str) -> String {
    format!("Authorization: Bearer {token}")
}

/// One interactive session: prompts, scans and the history menu.
pub struct Session {
    pub settings: Settings,
    pub runner: Runner,
    pub resolver: WordlistResolver,
    /// Directory the timestamped result files are written to.
    pub output_dir: PathBuf,
    pub dry_run: bool,
}

impl Session {
    pub fn new(settings: Settings, dry_run: bool) -> Self {
        Self {
            runner: Runner::new(&settings),
            resolver: WordlistResolver::new(settings.wordlist_dir.clone()),
            output_dir: PathBuf::from("."),
            settings,
            dry_run,
        }
    }

    pub fn start<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
        history_only: bool,
    ) -> Result<(), String> {
        if history_only {
            return self.history_menu(p);
        }
        let choice = p
            .ask_default("Select: n for new scan, h for history", "n")
            .map_err(io_error)?;
        if choice.to_lowercase().starts_with('h') {
            self.history_menu(p)
        } else {
            self.new_scan(p)
        }
    }

    fn choose_scan_type<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
    ) -> io::Result<ScanType> {
        p.say("Select scan type:".bold())?;
        for (i, st) in ScanType::ALL.iter().enumerate() {
            p.say(format!(" {}) {}", i + 1, st))?;
        }
        loop {
            let choice = p.ask("Choice [1-10]")?;
            match ScanType::from_menu(&choice) {
                Some(st) => return Ok(st),
                None => p.error("Invalid choice.")?,
            }
        }
    }

    fn choose_wordlist<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
        scan_type: ScanType,
    ) -> Result<PathBuf, String> {
        match scan_type.default_wordlist() {
            Some(name) => {
                p.say(format!("Using wordlist {}", name.cyan()))
                    .map_err(io_error)?;
                self.resolver.resolve(name).map_err(|e| e.to_string())
            }
            None => loop {
                let path = p.ask("Path to custom wordlist").map_err(io_error)?;
                let path = config::expand_tilde(&path);
                if path.is_file() {
                    return Ok(path);
                }
                p.error(format!("Wordlist '{}' not found.", path.display()))
                    .map_err(io_error)?;
            },
        }
    }

    fn choose_auth<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
    ) -> io::Result<Option<String>> {
        let choice = p.ask_default("Authentication (none/basic/bearer)", "none")?;
        match choice.to_lowercase().as_str() {
            "basic" => {
                let username = p.ask("Username")?;
                let password = p.secret("Password")?;
                Ok(Some(basic_auth_header(&username, &password)))
            }
            "bearer" => {
                let token = p.secret("Bearer token")?;
                Ok(Some(bearer_auth_header(&token)))
            }
            _ => Ok(None),
        }
    }

    fn choose_target<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
        scan_type: ScanType,
    ) -> io::Result<String> {
        loop {
            if scan_type.fuzzes_host() {
                let domain = p.ask("Base domain (e.g. example.com)")?;
                if !domain.is_empty() {
                    return Ok(domain);
                }
                p.error("Base domain must not be empty.")?;
            } else {
                let url = p.ask(&format!(
                    "Target URL (include http:// or https://, use {FUZZ_KEYWORD} where appropriate)"
                ))?;
                if url.contains(FUZZ_KEYWORD) {
                    return Ok(url);
                }
                p.error(format!("URL must contain '{FUZZ_KEYWORD}' placeholder."))?;
            }
        }
    }

    /// Prompts for every scan option and validates the result.
    pub fn gather_scan<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
    ) -> Result<(ScanType, ScanConfiguration), String> {
        let scan_type = self.choose_scan_type(p).map_err(io_error)?;
        let wordlist = self.choose_wordlist(p, scan_type)?;

        let mut headers: Vec<String> = Vec::new();
        if let Some(auth) = self.choose_auth(p).map_err(io_error)? {
            headers.push(auth);
        }

        p.say("Scan Profile Selection:".bold()).map_err(io_error)?;
        for (i, profile) in PROFILES.iter().enumerate() {
            p.say(format!(" {}) {}", i + 1, profile.name))
                .map_err(io_error)?;
        }
        let choice = p
            .ask_default("Profile", &self.settings.profile)
            .map_err(io_error)?;
        let profile = catalog::profile(&choice);
        let (mut threads, mut delay_ms, mut auto_calibrate) =
            (profile.threads, profile.delay_ms, profile.auto_calibrate);
        p.say(format!(
            "Using profile {}: threads={threads}, delay={delay_ms}, autocalibrate={auto_calibrate}",
            profile.name.cyan()
        ))
        .map_err(io_error)?;
        if p.confirm("Customize profile settings?", false).map_err(io_error)? {
            threads = p.ask_parsed("Threads", threads).map_err(io_error)?;
            delay_ms = p.ask_parsed("Delay ms", delay_ms).map_err(io_error)?;
            auto_calibrate = p
                .confirm("Auto-calibrate filters?", auto_calibrate)
                .map_err(io_error)?;
        }

        let target = self.choose_target(p, scan_type).map_err(io_error)?;
        let status_codes = p
            .ask_default("Status codes (comma-separated)", &self.settings.status_codes)
            .map_err(io_error)?;
        let color = p.confirm("Color output?", true).map_err(io_error)?;

        if p.confirm("Add custom HTTP header?", false).map_err(io_error)? {
            loop {
                let header = p
                    .ask("Header (Key: Value), blank to stop")
                    .map_err(io_error)?;
                if header.is_empty() {
                    break;
                }
                headers.push(header);
            }
        }

        let proxy = if p.confirm("Use proxy?", false).map_err(io_error)? {
            p.ask("Proxy URL (http://host:port)").map_err(io_error)?
        } else {
            String::new()
        };

        let recursion = scan_type.is_recursive();
        let recursion_depth = if recursion {
            p.ask_parsed("Recursion depth", 2u32).map_err(io_error)?
        } else {
            1
        };

        let decoy_list = if p.confirm("Use decoy requests?", false).map_err(io_error)? {
            p.ask("Path to decoy URL list (one per line)")
                .map_err(io_error)?
        } else {
            String::new()
        };

        let config = ScanConfiguration::new(ScanOptions {
            scan_type,
            target,
            wordlist,
            status_codes,
            threads,
            color,
            auto_calibrate,
            recursion,
            recursion_depth,
            headers,
            proxy,
            delay_ms,
            decoy_list,
            output: Some(self.output_dir.join(default_output_path())),
        })
        .map_err(|e| e.to_string())?;
        Ok((scan_type, config))
    }

    fn report<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
        outcome: &ScanOutcome,
    ) -> io::Result<()> {
        if !outcome.exit.success() {
            let code = outcome
                .exit
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            p.error(format!("FFUF exited with code {code}"))?;
        }
        match outcome.summary() {
            Some(summary) => write!(p.output(), "{}", output::render_summary(summary))?,
            None => p.say("No results summary available.".yellow())?,
        }
        p.say(format!(
            "Results saved to {}",
            outcome.entry.params.output_path().display()
        ))
    }

    pub fn new_scan<R: BufRead, W: Write>(&self, p: &mut Prompter<R, W>) -> Result<(), String> {
        let (scan_type, config) = self.gather_scan(p)?;
        if self.dry_run {
            let command = self.runner.command(&config);
            return announce(p, &command).map_err(io_error);
        }
        let mut announced = Ok(());
        let outcome = self
            .runner
            .run(scan_type.label(), config, |_, command| {
                announced = announce(p, command);
            })
            .map_err(|e| e.to_string())?;
        announced.map_err(io_error)?;
        self.report(p, &outcome).map_err(io_error)
    }

    pub fn history_menu<R: BufRead, W: Write>(
        &self,
        p: &mut Prompter<R, W>,
    ) -> Result<(), String> {
        let history = self.runner.history();
        let entries = history.list();
        if entries.is_empty() {
            p.say("No scans in history.".yellow()).map_err(io_error)?;
            return Ok(());
        }
        write!(p.output(), "{}", output::render_history(&entries)).map_err(io_error)?;
        let choice = p
            .ask("Select entry number to re-run, or 'd<nr>' to delete, blank to return")
            .map_err(io_error)?;

        match HistoryAction::parse(&choice) {
            Some(HistoryAction::Back) => Ok(()),
            None => p.error("Invalid selection.").map_err(io_error),
            Some(HistoryAction::Delete(n)) => match history.delete_at(n) {
                Ok(_) => p.say(format!("Deleted entry {n}.").green()).map_err(io_error),
                Err(e) => p.error(e).map_err(io_error),
            },
            Some(HistoryAction::Rerun(n)) => {
                let mut announced = Ok(());
                let result = self.runner.rerun(n, |scan_type, command| {
                    announced = p
                        .say(format!("Re-running scan {n} ({scan_type})").cyan())
                        .and_then(|_| announce(p, command));
                });
                let outcome = match result {
                    Ok(outcome) => outcome,
                    Err(e @ (RunnerError::History(_) | RunnerError::Config(_))) => {
                        return p.error(e).map_err(io_error)
                    }
                    Err(e) => return Err(e.to_string()),
                };
                announced.map_err(io_error)?;
                self.report(p, &outcome).map_err(io_error)?;
                p.say("Re-run complete.".green()).map_err(io_error)
            }
        }
    }
}

fn announce<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    command: &CommandLine,
) -> io::Result<()> {
    p.say(format!("Running: {}", command.to_string().bold()))
}

fn load_settings(args: &CliArgs) -> Result<Settings, String> {
    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };
    let overrides = Overrides {
        wordlist_dir: args.wordlist_dir.clone(),
        history_file: args.history_file.clone(),
        ffuf_path: args.ffuf_path.clone(),
        no_color: args.no_color,
    };
    Ok(Settings::from_env(overrides, cfg))
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };
    validation::validate(&args)?;

    let settings = load_settings(&args)?;
    if settings.no_color {
        colored::control::set_override(false);
    }
    crate::logging::init(args.verbose, !settings.no_color);

    print_banner();
    let mut out = io::stdout();
    format_kv_line(&mut out, "ffuf", &settings.ffuf_path).map_err(io_error)?;
    format_kv_line(&mut out, "Wordlists", &settings.wordlist_dir.display().to_string())
        .map_err(io_error)?;
    format_kv_line(&mut out, "History", &settings.history_file.display().to_string())
        .map_err(io_error)?;
    println!();

    let session = Session::new(settings, args.dry_run);
    let mut p = prompt::stdio();
    session.start(&mut p, args.history)
}
