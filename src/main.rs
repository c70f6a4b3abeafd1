use colored::Colorize;

fn main() {
    if let Err(e) = ffuf_agent::app::run_cli() {
        eprintln!("{} {e}", "error:".bold().red());
        std::process::exit(1);
    }
}
