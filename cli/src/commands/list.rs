use clap::{arg, value_parser, ArgMatches, Command, ValueEnum};
use yansi::Color::Cyan;
use yansi::Paint;

use crate::commands::{load_signatures, signature_args};
use crate::config::Config;
use crate::help;

#[derive(Clone, ValueEnum)]
enum OutputFormats {
    /// Default output format.
    Text,
    /// Newline delimited JSON (i.e: one JSON object per line).
    Ndjson,
}

pub fn list() -> Command {
    signature_args(super::command("list"))
        .about("List the available signatures")
        .long_about(help::LIST_LONG_HELP)
        .arg(
            arg!(-o --"output-format" <FORMAT>)
                .help("Output format")
                .long_help(help::OUTPUT_FORMAT_LONG_HELP)
                .value_parser(value_parser!(OutputFormats)),
        )
}

pub fn exec_list(args: &ArgMatches, config: &Config) -> anyhow::Result<()> {
    // Signatures are compiled even if only the definitions are printed, so
    // that invalid ones are reported.
    let (defs, _) = load_signatures(args, config)?;

    for def in &defs {
        match args.get_one::<OutputFormats>("output-format") {
            Some(OutputFormats::Ndjson) => {
                println!(
                    "{}",
                    serde_json::json!({
                        "name": def.name,
                        "pattern": def.pattern,
                        "description": def.description(),
                    })
                );
            }
            Some(OutputFormats::Text) | None => {
                println!(
                    "{}: {}\n    {}",
                    def.name.paint(Cyan).bold(),
                    def.pattern,
                    def.description()
                );
            }
        }
    }

    Ok(())
}
