use std::borrow::Cow;
use std::fmt;

use rand::seq::SliceRandom;

use crate::catalog::USER_AGENTS;
use crate::scan::{header_name, ScanConfiguration};

/// Supplies the User-Agent injected when the user did not set one.
pub trait UserAgentSource {
    fn pick(&self) -> &'static str;
}

/// Picks uniformly from [`USER_AGENTS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomUserAgent;

impl UserAgentSource for RandomUserAgent {
    fn pick(&self) -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }
}

/// Always returns the same entry of [`USER_AGENTS`].
#[derive(Clone, Copy, Debug)]
pub struct FixedUserAgent(pub usize);

impl UserAgentSource for FixedUserAgent {
    fn pick(&self) -> &'static str {
        USER_AGENTS[self.0 % USER_AGENTS.len()]
    }
}

fn has_user_agent(headers: &[String]) -> bool {
    headers
        .iter()
        .filter_map(|h| header_name(h))
        .any(|name| name.eq_ignore_ascii_case("user-agent"))
}

/// Builds the ffuf argument vector (program name excluded) for `config`.
///
/// Flag order is stable:
/// `[-H UA] -w -u -mc -t [-c] [-ac] [-H ..]* [-x] [-delay] [-recursion -recursion-depth [-D]] -of json -o`.
pub fn build_args(config: &ScanConfiguration, agents: &dyn UserAgentSource) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    if !has_user_agent(config.headers()) {
        push_flag(&mut args, "-H", format!("User-Agent: {}", agents.pick()));
    }

    push_flag(&mut args, "-w", config.wordlist_path().to_string_lossy());
    push_flag(&mut args, "-u", config.target_url());
    push_flag(&mut args, "-mc", config.status_code_filter());
    push_flag(&mut args, "-t", config.concurrency().to_string());

    if config.color_output() {
        args.push("-c".to_string());
    }
    if config.auto_calibrate() {
        args.push("-ac".to_string());
    }
    for header in config.headers() {
        push_flag(&mut args, "-H", header.as_str());
    }
    if !config.proxy_url().is_empty() {
        push_flag(&mut args, "-x", config.proxy_url());
    }
    if config.delay_millis() > 0 {
        push_flag(&mut args, "-delay", config.delay_millis().to_string());
    }
    if config.use_recursion() {
        args.push("-recursion".to_string());
        push_flag(&mut args, "-recursion-depth", config.recursion_depth().to_string());
        // decoys ride along with recursion only
        if !config.decoy_list_path().is_empty() {
            push_flag(&mut args, "-D", config.decoy_list_path());
        }
    }

    push_flag(&mut args, "-of", "json");
    push_flag(&mut args, "-o", config.output_path().to_string_lossy());
    args
}

fn push_flag<'a>(args: &mut Vec<String>, name: &str, value: impl Into<Cow<'a, str>>) {
    args.push(name.to_string());
    args.push(value.into().into_owned());
}

/// Program plus arguments, displayed the way a shell user would type it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: &str, config: &ScanConfiguration, agents: &dyn UserAgentSource) -> Self {
        Self {
            program: program.to_string(),
            args: build_args(config, agents),
        }
    }
}

/// Characters a POSIX shell passes through unquoted.
fn shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_./:=@,%+".contains(c)
}

fn write_shell_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    if !word.is_empty() && word.chars().all(shell_safe) {
        f.write_str(word)
    } else {
        write!(f, "'{}'", word.replace('\'', "'\\''"))
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_shell_word(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_shell_word(f, arg)?;
        }
        Ok(())
    }
}
