use std::collections::HashMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{arg, value_parser, ArgMatches, Command, ValueEnum};
#[cfg(feature = "logging")]
use log::*;
use superconsole::style::Stylize;
use superconsole::{Component, Line, Lines, Span};
use yansi::Color::{Cyan, Green, Red, Yellow};
use yansi::Paint;

use sigscan::{RiskLevel, ScanResults, Scanner};

use crate::commands::{load_signatures, signature_args, size_parser};
use crate::config::Config;
use crate::walk::Message;
use crate::{help, walk};

#[derive(Clone, ValueEnum)]
enum OutputFormats {
    /// Default output format.
    Text,
    /// Newline delimited JSON (i.e: one JSON object per line).
    Ndjson,
}

/// Matching text longer than this number of characters is truncated in the
/// output.
const SNIPPET_LIMIT: usize = 120;

#[rustfmt::skip]
pub fn scan() -> Command {
    signature_args(super::command("scan"))
        .about("Scan a file or directory")
        .long_about(help::SCAN_LONG_HELP)
        .arg(
            arg!(<TARGET_PATH>)
                .help("File or directory to scan, or `-` for stdin")
                .value_parser(value_parser!(PathBuf))
        )
        // Keep options sorted alphabetically by their long name.
        // For instance, --bar goes before --foo.
        .arg(
            arg!(-o --"output-format" <FORMAT>)
                .help("Output format for results")
                .long_help(help::OUTPUT_FORMAT_LONG_HELP)
                .value_parser(value_parser!(OutputFormats))
        )
        .arg(
            arg!(--"preview")
                .help("Print the first lines of each file with matches")
        )
        .arg(
            arg!(-r --"recursive" [MAX_DEPTH])
                .help("Scan directories recursively")
                .long_help(help::SCAN_RECURSIVE_LONG_HELP)
                .default_missing_value("100")
                .require_equals(true)
                .value_parser(value_parser!(usize))
        )
        .arg(
            arg!(-z --"skip-larger" <FILE_SIZE>)
                .help("Skip files larger than the given size (e.g. 64K, 16M)")
                .value_parser(size_parser)
        )
        .arg(
            arg!(-p --"threads" <NUM_THREADS>)
                .help("Use the given number of threads")
                .long_help(help::THREADS_LONG_HELP)
                .value_parser(value_parser!(u8).range(1..))
        )
}

pub fn exec_scan(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    let target_path = args.get_one::<PathBuf>("TARGET_PATH").unwrap();
    let num_threads = args.get_one::<u8>("threads");
    let skip_larger = args.get_one::<u64>("skip-larger");
    let recursive = args.get_one::<usize>("recursive");

    let read_stdin = target_path.as_os_str() == "-";

    if recursive.is_some() && (read_stdin || target_path.is_file()) {
        bail!(
            "can't use '{}' when <TARGET_PATH> is a file",
            Paint::bold("--recursive")
        );
    }

    let (defs, signatures) = load_signatures(args, config)?;

    let descriptions: HashMap<&str, &str> = defs
        .iter()
        .map(|def| (def.name.as_str(), def.description()))
        .collect();

    let printer = Printer { args, config, descriptions: &descriptions };

    let max_line_length = config.scan.max_line_length;

    let new_scanner = || {
        let scanner = Scanner::new(&signatures);
        match max_line_length {
            Some(n) => scanner.max_line_length(n),
            None => scanner,
        }
    };

    if read_stdin {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data).context("can not read stdin")?;
        let results = new_scanner().scan(&String::from_utf8_lossy(&data));
        if let Some(output) = printer.format(Path::new("-"), &results) {
            println!("{}", output);
        }
        return Ok(());
    }

    let mut w = walk::ParWalker::path(target_path);

    if let Some(num_threads) = num_threads {
        w.num_threads(*num_threads);
    }

    for extension in &config.scan.extensions {
        w.filter(format!("**/*.{}", extension).as_str());
    }

    // Extensions are compared ignoring case, `EVIL.PY` is a Python file too.
    w.case_insensitive(true);

    let max_file_size = *skip_larger.unwrap_or(&config.scan.max_file_size);

    w.metadata_filter(move |metadata| metadata.len() <= max_file_size);
    w.max_depth(*recursive.unwrap_or(&0));

    let printer = &printer;

    let state = w.walk(
        ScanState::new(Instant::now()),
        // Initialization
        |_, _| new_scanner(),
        // File handler. Called for every file found while walking the path.
        |state, output, file_path, scanner| {
            let results = scanner
                .scan_file(file_path.as_path())
                .with_context(|| format!("scanning {:?}", &file_path))?;

            state.num_scanned_files.fetch_add(1, Ordering::Relaxed);

            if !results.matches().is_empty() {
                state.num_matching_files.fetch_add(1, Ordering::Relaxed);
                state
                    .num_matches
                    .fetch_add(results.matches().len(), Ordering::Relaxed);
            }

            if let Some(s) = printer.format(&file_path, &results) {
                output.send(Message::Info(s))?;
            }

            Ok(())
        },
        // Error handler
        |err, output| {
            let error = err.to_string();
            let root_cause = err.root_cause().to_string();
            let msg = if error != root_cause {
                format!(
                    "{} {}: {}",
                    "error:".paint(Red).bold(),
                    error,
                    root_cause
                )
            } else {
                format!("{} {}", "error:".paint(Red).bold(), error)
            };

            let _ = output.send(Message::Error(msg));

            Ok(())
        },
    )?;

    #[cfg(feature = "logging")]
    info!(
        "{} file(s) scanned, {} with matches, {} match(es)",
        state.num_scanned_files.load(Ordering::Relaxed),
        state.num_matching_files.load(Ordering::Relaxed),
        state.num_matches.load(Ordering::Relaxed),
    );

    #[cfg(not(feature = "logging"))]
    let _ = state;

    Ok(())
}

/// Formats scan results according to the command-line arguments.
struct Printer<'a> {
    args: &'a ArgMatches,
    config: &'a Config,
    descriptions: &'a HashMap<&'a str, &'a str>,
}

impl Printer<'_> {
    /// Returns the output for a scanned file, or `None` if nothing must be
    /// printed for it.
    fn format(
        &self,
        file_path: &Path,
        results: &ScanResults,
    ) -> Option<String> {
        match self.args.get_one::<OutputFormats>("output-format") {
            Some(OutputFormats::Ndjson) => {
                Some(self.format_json(file_path, results))
            }
            Some(OutputFormats::Text) | None => {
                self.format_text(file_path, results)
            }
        }
    }

    fn preview<'r>(&self, results: &'r ScanResults) -> Option<&'r [String]> {
        if self.args.get_flag("preview") {
            let n = self.config.scan.preview_lines.min(results.num_lines());
            Some(&results.lines()[..n])
        } else {
            None
        }
    }

    fn format_json(&self, file_path: &Path, results: &ScanResults) -> String {
        let matches: Vec<serde_json::Value> = results
            .matches()
            .iter()
            .map(|m| {
                serde_json::json!({
                    "signature": m.signature,
                    "pattern": m.pattern,
                    "description": self.description(&m.signature),
                    "line_no": m.line_no,
                    "start": m.start(),
                    "end": m.end(),
                    "snippet": m.data,
                })
            })
            .collect();

        let mut json = serde_json::json!({
            "path": file_path.to_string_lossy(),
            "total_lines": results.num_lines(),
            "matches_found": matches.len(),
            "risk_level": results.risk_level(),
            "matches": matches,
        });

        if let Some(preview) = self.preview(results) {
            json["preview"] = serde_json::json!(preview);
        }

        format!("{}", json)
    }

    fn format_text(
        &self,
        file_path: &Path,
        results: &ScanResults,
    ) -> Option<String> {
        if results.matches().is_empty() {
            return None;
        }

        let risk_level = results.risk_level();
        let risk = format!("[{}]", risk_level);

        let mut msg = format!(
            "{} {} {} match(es)",
            file_path.display().paint(Cyan).bold(),
            match risk_level {
                RiskLevel::Safe => risk.paint(Green),
                RiskLevel::Low | RiskLevel::Medium => risk.paint(Yellow),
                RiskLevel::High | RiskLevel::Critical => {
                    risk.paint(Red).bold()
                }
            },
            results.matches().len(),
        );

        for m in results.matches() {
            msg.push_str(&format!(
                "\n{}:{}-{}:{}: {}",
                m.line_no,
                m.start(),
                m.end(),
                m.signature,
                truncate(&m.data),
            ));
        }

        if let Some(preview) = self.preview(results) {
            for (i, line) in preview.iter().enumerate() {
                msg.push_str(&format!("\n{:>4} | {}", i + 1, line));
            }
        }

        Some(msg)
    }

    fn description(&self, name: &str) -> &str {
        self.descriptions
            .get(name)
            .copied()
            .unwrap_or(sigscan::signatures::DEFAULT_DESCRIPTION)
    }
}

/// Returns the text with control characters escaped, truncated to
/// [`SNIPPET_LIMIT`] characters.
fn truncate(data: &str) -> String {
    let len = data.chars().count();
    let mut s = String::with_capacity(data.len());

    for c in data.chars().take(SNIPPET_LIMIT) {
        if c.is_control() {
            s.extend(c.escape_default());
        } else {
            s.push(c);
        }
    }

    if len > SNIPPET_LIMIT {
        s.push_str(&format!(" ... {} more chars", len - SNIPPET_LIMIT));
    }

    s
}

#[derive(Debug)]
struct ScanState {
    start_time: Instant,
    num_scanned_files: AtomicUsize,
    num_matching_files: AtomicUsize,
    num_matches: AtomicUsize,
}

impl ScanState {
    fn new(start_time: Instant) -> Self {
        Self {
            start_time,
            num_scanned_files: AtomicUsize::new(0),
            num_matching_files: AtomicUsize::new(0),
            num_matches: AtomicUsize::new(0),
        }
    }
}

impl Component for ScanState {
    fn draw_unchecked(
        &self,
        dimensions: superconsole::Dimensions,
        _mode: superconsole::DrawMode,
    ) -> anyhow::Result<Lines> {
        let mut lines = Lines::new();

        lines.push(Line::from_iter([Span::new_unstyled(
            "─".repeat(dimensions.width),
        )?]));

        let scanned = format!(
            " {} file(s) scanned in {:.1}s. ",
            self.num_scanned_files.load(Ordering::Relaxed),
            self.start_time.elapsed().as_secs_f32()
        );

        let num_matching_files =
            self.num_matching_files.load(Ordering::Relaxed);

        let matched = format!(
            "{} file(s) matched, {} match(es).",
            num_matching_files,
            self.num_matches.load(Ordering::Relaxed)
        );

        lines.push(Line::from_iter([
            Span::new_unstyled(scanned)?,
            Span::new_styled(if num_matching_files > 0 {
                matched.red().bold()
            } else {
                matched.green().bold()
            })?,
        ]));

        Ok(lines)
    }
}
