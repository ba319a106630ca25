use std::path::PathBuf;

use anyhow::bail;
use clap::{arg, value_parser, ArgAction, ArgMatches, Command};
use yansi::Color::{Green, Red};
use yansi::Paint;

use sigscan::signatures::compile_defs;

use crate::commands::load_signature_file;
use crate::help;
use crate::walk::Walker;

pub fn check() -> Command {
    super::command("check")
        .about("Check if signature files are correct")
        .long_about(help::CHECK_LONG_HELP)
        .arg(
            arg!(<SIGNATURES_PATH>)
                .help("Path to a signature file or directory")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Append),
        )
        .arg(
            arg!(-r --"recursive" [MAX_DEPTH])
                .help("Walk directories recursively up to a given depth")
                .default_missing_value("100")
                .require_equals(true)
                .value_parser(value_parser!(usize)),
        )
}

pub fn exec_check(args: &ArgMatches) -> anyhow::Result<()> {
    let paths = args.get_many::<PathBuf>("SIGNATURES_PATH").unwrap();
    let recursive = args.get_one::<usize>("recursive");

    let mut passed = 0_usize;
    let mut failed = 0_usize;

    for path in paths {
        let mut w = Walker::path(path);

        w.filter("**/*.toml");
        w.max_depth(*recursive.unwrap_or(&0));

        w.walk(
            |file_path| {
                match load_signature_file(file_path)
                    .and_then(|defs| Ok(compile_defs(&defs)?))
                {
                    Ok(signatures) => {
                        passed += 1;
                        println!(
                            "[ {} ] {} ({} signature(s))",
                            "PASS".paint(Green).bold(),
                            file_path.display(),
                            signatures.len(),
                        );
                    }
                    Err(err) => {
                        failed += 1;
                        let cause = match err.source() {
                            Some(source) => format!("{}: {}", err, source),
                            None => err.to_string(),
                        };
                        println!(
                            "[ {} ] {}\n{}",
                            "FAIL".paint(Red).bold(),
                            file_path.display(),
                            cause,
                        );
                    }
                }
                Ok(())
            },
            // Any error occurred during walk aborts the walk.
            Err,
        )?;
    }

    if failed > 0 {
        bail!("{} of {} file(s) failed", failed, passed + failed);
    }

    Ok(())
}
