use crate::cli::args::CliArgs;

fn reject_blank(flag: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if v.trim().is_empty() => Err(format!("invalid --{flag}, expected a non-empty path")),
        _ => Ok(()),
    }
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    reject_blank("config", args.config.as_deref())?;
    reject_blank("wordlist-dir", args.wordlist_dir.as_deref())?;
    reject_blank("history-file", args.history_file.as_deref())?;
    reject_blank("ffuf-path", args.ffuf_path.as_deref())?;
    if args.history && args.dry_run {
        return Err("--dry-run only applies to new scans, not --history".to_string());
    }
    Ok(())
}
