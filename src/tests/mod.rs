use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app::Session;
use crate::catalog::USER_AGENTS;
use crate::cli::prompt::Prompter;
use crate::command::FixedUserAgent;
use crate::config::Settings;
use crate::executor::{ExecError, ScanExit, ToolRunner};
use crate::history::HistoryStore;
use crate::runner::{Runner, RunnerError};
use crate::scan::{ScanConfiguration, ScanOptions};
use crate::wordlist::WordlistResolver;

/// Stands in for ffuf: records its arguments and writes `report` to the
/// `-o` path when given.
#[derive(Clone, Default)]
struct StubTool {
    report: Option<String>,
    code: i32,
    calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl ToolRunner for StubTool {
    fn program(&self) -> &str {
        "ffuf"
    }

    fn run(&self, args: &[String]) -> Result<ScanExit, ExecError> {
        self.calls.borrow_mut().push(args.to_vec());
        if let Some(report) = &self.report {
            if let Some(pos) = args.iter().position(|a| a == "-o") {
                std::fs::write(&args[pos + 1], report).unwrap();
            }
        }
        Ok(ScanExit {
            code: Some(self.code),
        })
    }
}

const REPORT: &str = r#"{"results":[{"status":200},{"status":200},{"status":404}]}"#;

fn runner(dir: &Path, tool: StubTool) -> Runner {
    Runner::with_parts(
        Box::new(tool),
        Box::new(FixedUserAgent(0)),
        HistoryStore::new(dir.join("history.json")),
    )
}

fn config(dir: &Path) -> ScanConfiguration {
    let wl = dir.join("words.txt");
    std::fs::write(&wl, "admin\nlogin\n").unwrap();
    ScanConfiguration::new(ScanOptions {
        target: "http://example.com/FUZZ".to_string(),
        wordlist: wl,
        output: Some(dir.join("out.json")),
        ..ScanOptions::default()
    })
    .unwrap()
}

#[test]
fn run_records_summary_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let tool = StubTool {
        report: Some(REPORT.to_string()),
        ..StubTool::default()
    };
    let runner = runner(dir.path(), tool.clone());
    let outcome = runner.run("Directory & File Discovery", config(dir.path()), |_, _| {}).unwrap();

    assert!(outcome.exit.success());
    let summary = outcome.summary().unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.counts["200"], 2);

    let history = runner.history().list();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], outcome.entry);
    assert_eq!(tool.calls.borrow().len(), 1);
    assert_eq!(tool.calls.borrow()[0], outcome.command.args);
}

#[test]
fn non_zero_exit_still_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let tool = StubTool {
        report: Some(REPORT.to_string()),
        code: 1,
        ..StubTool::default()
    };
    let runner = runner(dir.path(), tool);
    let outcome = runner.run("x", config(dir.path()), |_, _| {}).unwrap();
    assert_eq!(outcome.exit.code, Some(1));
    assert_eq!(outcome.summary().map(|s| s.total), Some(3));
}

#[test]
fn missing_or_broken_report_records_absent_summary() {
    let dir = tempfile::tempdir().unwrap();
    let runner_without_report = runner(dir.path(), StubTool::default());
    let outcome = runner_without_report.run("x", config(dir.path()), |_, _| {}).unwrap();
    assert!(outcome.summary().is_none());

    let broken = StubTool {
        report: Some("{oops".to_string()),
        code: 2,
        ..StubTool::default()
    };
    let runner_with_broken = runner(dir.path(), broken);
    let outcome = runner_with_broken.run("y", config(dir.path()), |_, _| {}).unwrap();
    assert!(outcome.summary().is_none());

    let history = runner_with_broken.history().list();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|e| e.summary.is_none()));
}

#[test]
fn rerun_appends_new_entry_and_keeps_original() {
    let dir = tempfile::tempdir().unwrap();
    let tool = StubTool {
        report: Some(REPORT.to_string()),
        ..StubTool::default()
    };
    let runner = runner(dir.path(), tool.clone());
    let first = runner.run("API Endpoint Discovery", config(dir.path()), |_, _| {}).unwrap();

    let again = runner.rerun(1, |_, _| {}).unwrap();
    let history = runner.history().list();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], first.entry);
    assert_eq!(history[1].scan_type, "API Endpoint Discovery");
    assert_eq!(history[1].params, first.entry.params);
    assert_eq!(again.command.args, first.command.args);
    assert_eq!(tool.calls.borrow().len(), 2);
}

#[test]
fn failed_rerun_does_not_reuse_previous_report() {
    let dir = tempfile::tempdir().unwrap();
    let first = runner(
        dir.path(),
        StubTool {
            report: Some(REPORT.to_string()),
            ..StubTool::default()
        },
    );
    first.run("x", config(dir.path()), |_, _| {}).unwrap();
    assert!(dir.path().join("out.json").is_file());

    let failing = runner(
        dir.path(),
        StubTool {
            code: 1,
            ..StubTool::default()
        },
    );
    let outcome = failing.rerun(1, |_, _| {}).unwrap();
    assert_eq!(outcome.exit.code, Some(1));
    assert!(outcome.summary().is_none());
    assert!(!dir.path().join("out.json").exists());

    let history = failing.history().list();
    assert_eq!(history.len(), 2);
    assert!(history[0].summary.is_some());
    assert!(history[1].summary.is_none());
}

#[test]
fn on_start_sees_the_executed_command() {
    let dir = tempfile::tempdir().unwrap();
    let tool = StubTool::default();
    let runner = runner(dir.path(), tool.clone());
    let mut seen = None;
    let outcome = runner
        .run("Directory & File Discovery", config(dir.path()), |scan_type, command| {
            assert!(tool.calls.borrow().is_empty());
            seen = Some((scan_type.to_string(), command.clone()));
        })
        .unwrap();
    let (scan_type, command) = seen.unwrap();
    assert_eq!(scan_type, "Directory & File Discovery");
    assert_eq!(command, outcome.command);
}

#[test]
fn rerun_out_of_range_fails() {
    let dir = tempfile::tempdir().unwrap();
    let runner = runner(dir.path(), StubTool::default());
    assert!(matches!(runner.rerun(1, |_, _| {}), Err(RunnerError::History(_))));
    runner.run("x", config(dir.path()), |_, _| {}).unwrap();
    assert!(matches!(runner.rerun(2, |_, _| {}), Err(RunnerError::History(_))));
    assert!(matches!(runner.rerun(0, |_, _| {}), Err(RunnerError::History(_))));
}

#[test]
fn rerun_revalidates_stored_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let tool = StubTool::default();
    let runner = runner(dir.path(), tool.clone());
    runner.run("x", config(dir.path()), |_, _| {}).unwrap();
    std::fs::remove_file(dir.path().join("words.txt")).unwrap();

    match runner.rerun(1, |_, _| {}) {
        Err(RunnerError::Config(e)) => assert_eq!(e.field(), "wordlist_path"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tool.calls.borrow().len(), 1);
    assert_eq!(runner.history().list().len(), 1);
}

struct Harness {
    dir: tempfile::TempDir,
    tool: StubTool,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let wordlists = dir.path().join("wordlists");
        std::fs::create_dir_all(&wordlists).unwrap();
        for name in ["directory-list-2.3-medium.txt", "subdomains-top1mil-5000.txt"] {
            std::fs::write(wordlists.join(name), "admin\n").unwrap();
        }
        Self {
            dir,
            tool: StubTool {
                report: Some(REPORT.to_string()),
                ..StubTool::default()
            },
        }
    }

    fn wordlist(&self, name: &str) -> PathBuf {
        self.dir.path().join("wordlists").join(name)
    }

    fn session(&self, dry_run: bool) -> Session {
        let settings = Settings {
            wordlist_dir: self.dir.path().join("wordlists"),
            history_file: self.dir.path().join("history.json"),
            ffuf_path: "ffuf".to_string(),
            status_codes: "200,204,301,403".to_string(),
            profile: "3".to_string(),
            no_color: true,
        };
        Session {
            runner: runner(self.dir.path(), self.tool.clone()),
            resolver: WordlistResolver::with_registry(settings.wordlist_dir.clone(), Vec::new()),
            output_dir: self.dir.path().to_path_buf(),
            settings,
            dry_run,
        }
    }

    fn drive(
        &self,
        session: &Session,
        script: &[&str],
        history_only: bool,
    ) -> (Result<(), String>, String) {
        colored::control::set_override(false);
        let mut input = script.join("\n");
        input.push('\n');
        let mut p = Prompter::new(Cursor::new(input.into_bytes()), Vec::new());
        let result = session.start(&mut p, history_only);
        let shown = String::from_utf8(p.output().clone()).unwrap();
        (result, shown)
    }

    fn last_args(&self) -> Vec<String> {
        self.tool.calls.borrow().last().cloned().unwrap()
    }
}

#[test]
fn interactive_directory_scan_with_balanced_profile() {
    let h = Harness::new();
    let session = h.session(false);
    let script = [
        "n",
        "1",
        "",
        "",
        "",
        "http://target.test/FUZZ",
        "200,301",
        "n",
        "",
        "",
        "",
    ];
    let (result, shown) = h.drive(&session, &script, false);
    result.unwrap();

    let args = h.last_args();
    let wl = h.wordlist("directory-list-2.3-medium.txt").to_string_lossy().to_string();
    assert_eq!(args[0], "-H");
    assert_eq!(args[1], format!("User-Agent: {}", USER_AGENTS[0]));
    let out = args.last().unwrap().clone();
    assert!(out.contains("ffuf_results_"));
    assert_eq!(
        &args[2..],
        &[
            "-w",
            wl.as_str(),
            "-u",
            "http://target.test/FUZZ",
            "-mc",
            "200,301",
            "-t",
            "40",
            "-ac",
            "-delay",
            "100",
            "-of",
            "json",
            "-o",
            out.as_str(),
        ]
    );

    assert!(shown.contains("Running: ffuf -H"));
    assert!(shown.contains("FFUF Results Summary"));
    assert!(shown.contains("Results saved to"));

    let history = session.runner.history().list();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].scan_type, "Directory & File Discovery");
    assert_eq!(history[0].summary.as_ref().map(|s| s.total), Some(3));
}

#[test]
fn interactive_subdomain_scan_synthesizes_target_and_drops_decoys() {
    let h = Harness::new();
    let session = h.session(false);
    let script = [
        "n",
        "3",
        "bearer",
        "tok",
        "4",
        "",
        "example.com",
        "",
        "",
        "y",
        "X-Test: 1",
        "",
        "y",
        "http://127.0.0.1:8080",
        "y",
        "decoys.txt",
    ];
    let (result, _) = h.drive(&session, &script, false);
    result.unwrap();

    let args = h.last_args();
    let url = args.iter().position(|a| a == "-u").unwrap();
    assert_eq!(args[url + 1], "http://FUZZ.example.com");
    let threads = args.iter().position(|a| a == "-t").unwrap();
    assert_eq!(args[threads + 1], "100");
    assert!(args.iter().any(|a| a == "-c"));
    assert!(!args.iter().any(|a| a == "-ac" || a == "-delay"));
    assert!(!args.iter().any(|a| a == "-D" || a == "-recursion"));
    let headers: Vec<&str> = args
        .windows(2)
        .filter(|w| w[0] == "-H")
        .map(|w| w[1].as_str())
        .collect();
    assert_eq!(headers.len(), 3);
    assert!(headers[0].starts_with("User-Agent: "));
    assert_eq!(headers[1], "Authorization: Bearer tok");
    assert_eq!(headers[2], "X-Test: 1");
    let proxy = args.iter().position(|a| a == "-x").unwrap();
    assert_eq!(args[proxy + 1], "http://127.0.0.1:8080");
}

#[test]
fn interactive_recursive_scan_with_custom_profile() {
    let h = Harness::new();
    let session = h.session(false);
    let script = [
        "n",
        "10",
        "",
        "",
        "y",
        "5",
        "0",
        "n",
        "http://target.test/FUZZ",
        "",
        "",
        "",
        "",
        "3",
        "y",
        "decoys.txt",
    ];
    let (result, _) = h.drive(&session, &script, false);
    result.unwrap();

    let args = h.last_args();
    let threads = args.iter().position(|a| a == "-t").unwrap();
    assert_eq!(args[threads + 1], "5");
    assert!(!args.iter().any(|a| a == "-ac" || a == "-delay"));
    let rec = args.iter().position(|a| a == "-recursion").unwrap();
    assert_eq!(
        &args[rec..rec + 5],
        &["-recursion", "-recursion-depth", "3", "-D", "decoys.txt"]
    );
}

#[test]
fn interactive_target_without_placeholder_is_reprompted() {
    let h = Harness::new();
    let session = h.session(true);
    let script = [
        "",
        "1",
        "",
        "",
        "",
        "http://target.test/",
        "http://target.test/FUZZ",
        "",
        "",
        "",
        "",
        "",
    ];
    let (result, shown) = h.drive(&session, &script, false);
    result.unwrap();
    assert!(shown.contains("URL must contain 'FUZZ' placeholder."));
}

#[test]
fn dry_run_prints_command_without_running() {
    let h = Harness::new();
    let session = h.session(true);
    let script = ["n", "1", "", "", "", "http://t/FUZZ", "", "", "", "", ""];
    let (result, shown) = h.drive(&session, &script, false);
    result.unwrap();
    assert!(shown.contains("Running: ffuf"));
    assert!(h.tool.calls.borrow().is_empty());
    assert!(session.runner.history().list().is_empty());
}

#[test]
fn invalid_status_codes_abort_the_scan() {
    let h = Harness::new();
    let session = h.session(false);
    let script = ["n", "1", "", "", "", "http://t/FUZZ", "200;301", "", "", "", ""];
    let (result, _) = h.drive(&session, &script, false);
    assert!(result.unwrap_err().contains("status_code_filter"));
    assert!(h.tool.calls.borrow().is_empty());
}

#[test]
fn history_menu_deletes_and_reruns() {
    let h = Harness::new();
    let session = h.session(false);
    session.runner.run("first", config(h.dir.path()), |_, _| {}).unwrap();
    session.runner.run("second", config(h.dir.path()), |_, _| {}).unwrap();

    let (result, shown) = h.drive(&session, &["d1"], true);
    result.unwrap();
    assert!(shown.contains("Scan History"));
    assert!(shown.contains("Deleted entry 1."));
    let labels: Vec<String> = session
        .runner
        .history()
        .list()
        .into_iter()
        .map(|e| e.scan_type)
        .collect();
    assert_eq!(labels, vec!["second"]);

    let (result, shown) = h.drive(&session, &["h", "1"], false);
    result.unwrap();
    assert!(shown.contains("Re-running scan 1 (second)"));
    assert!(shown.contains("Running: ffuf"));
    assert!(shown.contains("Re-run complete."));
    assert_eq!(session.runner.history().list().len(), 2);
    assert_eq!(h.tool.calls.borrow().len(), 3);
}

#[test]
fn history_menu_reports_bad_selections() {
    let h = Harness::new();
    let session = h.session(false);

    let (result, shown) = h.drive(&session, &[""], true);
    result.unwrap();
    assert!(shown.contains("No scans in history."));

    session.runner.run("only", config(h.dir.path()), |_, _| {}).unwrap();
    let (result, shown) = h.drive(&session, &["d5"], true);
    result.unwrap();
    assert!(shown.contains("does not exist"));

    let (result, shown) = h.drive(&session, &["zzz"], true);
    result.unwrap();
    assert!(shown.contains("Invalid selection."));

    let (result, shown) = h.drive(&session, &["7"], true);
    result.unwrap();
    assert!(shown.contains("does not exist"));
    assert!(!shown.contains("Running:"));
    assert_eq!(session.runner.history().list().len(), 1);
    assert_eq!(h.tool.calls.borrow().len(), 1);
}
