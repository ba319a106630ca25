mod commands;
mod config;
mod help;
mod walk;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::{io, panic, process};

use anyhow::Context;
use config::{load_config_from_file, Config};
use crossterm::tty::IsTty;
use yansi::Color::Red;
use yansi::Paint;

use crate::commands::cli;

const APP_HELP_TEMPLATE: &str = r#"sigscan {version}, a signature-based scanner for malicious patterns in text.

{author-with-newline}
{before-help}{usage-heading}
  {usage}

{all-args}{after-help}
"#;

const EXIT_ERROR: i32 = 1;
const CONFIG_FILE: &str = ".sigscan.toml";

fn main() -> anyhow::Result<()> {
    // Enable support for ANSI escape codes in Windows. In other platforms
    // this is a no-op.
    if let Err(err) = enable_ansi_support::enable_ansi_support() {
        println!("could not enable ANSI support: {}", err)
    }

    #[cfg(feature = "logging")]
    env_logger::init();

    // If stdout is not a tty (for example, because it was redirected to a
    // file) turn off colors.
    if !io::stdout().is_tty() {
        yansi::disable();
    }

    let args = cli().get_matches_from(wild::args());

    // Kill the process when a panic occurs in any thread, not only in the
    // main one.
    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(EXIT_ERROR);
    }));

    // A config file passed explicitly must be valid, the one in the home
    // directory is ignored if it can't be loaded.
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => load_config_from_file(path).with_context(|| {
            format!("can not load config file `{}`", path.display())
        }),
        None => Ok(match home::home_dir() {
            Some(home_path) if !home_path.as_os_str().is_empty() => {
                load_config_from_file(&home_path.join(CONFIG_FILE))
                    .unwrap_or_default()
            }
            _ => Config::default(),
        }),
    };

    let result = config.and_then(|config| match args.subcommand() {
        Some(("scan", args)) => commands::exec_scan(args, &config),
        Some(("check", args)) => commands::exec_check(args),
        Some(("list", args)) => commands::exec_list(args, &config),
        _ => unreachable!(),
    });

    if let Err(err) = result {
        if let Some(source) = err.source() {
            eprintln!("{} {}: {}", "error:".paint(Red).bold(), err, source);
        } else {
            eprintln!("{} {}", "error:".paint(Red).bold(), err);
        }
        process::exit(EXIT_ERROR);
    }

    Ok(())
}
