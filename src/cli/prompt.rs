use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, Write};
use std::str::FromStr;

use colored::Colorize;

/// Line-oriented console prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    hide_secrets: bool,
}

/// Prompts on the process's stdin and stdout. Secrets are read without echo
/// when stdin is a terminal.
pub fn stdio() -> Prompter<io::StdinLock<'static>, io::Stdout> {
    let stdin = io::stdin();
    let hide_secrets = stdin.is_terminal();
    Prompter {
        hide_secrets,
        ..Prompter::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            hide_secrets: false,
        }
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    pub fn error(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", line.to_string().red())
    }

    /// Reads one trimmed line. End of input is an error so callers never
    /// re-prompt forever.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Reads a password or token. Falls back to [`Prompter::ask`] when input
    /// is not a terminal.
    pub fn secret(&mut self, prompt: &str) -> io::Result<String> {
        if !self.hide_secrets {
            return self.ask(prompt);
        }
        self.output.flush()?;
        let answer = rpassword::prompt_password(format!("{prompt}: "))?;
        Ok(answer.trim().to_string())
    }

    pub fn ask_default(&mut self, prompt: &str, default: &str) -> io::Result<String> {
        let answer = if default.is_empty() {
            self.ask(prompt)?
        } else {
            self.ask(&format!("{prompt} [{default}]"))?
        };
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer)
        }
    }

    /// Any answer starting with `y` counts as yes.
    pub fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let answer = self.ask_default(&format!("{prompt} (y/n)"), if default { "y" } else { "n" })?;
        Ok(answer.to_lowercase().starts_with('y'))
    }

    /// Re-prompts until the answer parses.
    pub fn ask_parsed<T>(&mut self, prompt: &str, default: T) -> io::Result<T>
    where
        T: FromStr + Display,
    {
        let default_text = default.to_string();
        loop {
            let answer = self.ask_default(prompt, &default_text)?;
            match answer.parse::<T>() {
                Ok(v) => return Ok(v),
                Err(_) => self.error(format!("'{answer}' is not a valid number."))?,
            }
        }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }
}
