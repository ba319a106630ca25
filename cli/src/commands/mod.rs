mod check;
mod list;
mod scan;

pub use check::*;
pub use list::*;
pub use scan::*;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{arg, command, crate_authors, ArgAction, ArgMatches, Command};
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::Deserialize;
use sigscan::signatures::{builtin_defs, compile_defs};
use sigscan::{CompiledSignature, SignatureDef};

use crate::config::Config;
use crate::{commands, help, APP_HELP_TEMPLATE};

pub fn command(name: &'static str) -> Command {
    Command::new(name).help_template(
        r#"{about-with-newline}
{usage-heading}
  {usage}

{all-args}
"#,
    )
}

pub fn cli() -> Command {
    command!()
        .author(crate_authors!("\n")) // requires `cargo` feature
        .arg_required_else_help(true)
        .arg(
            arg!(-C --config <CONFIG_FILE> "Config file")
                .value_parser(existing_path_parser)
                .long_help(help::CONFIG_FILE),
        )
        .help_template(APP_HELP_TEMPLATE)
        .subcommand_required(true)
        .subcommands(vec![
            commands::scan(),
            commands::check(),
            commands::list(),
        ])
}

/// Arguments shared by commands that load signatures.
fn signature_args(command: Command) -> Command {
    command
        .arg(
            arg!(--"no-builtin")
                .help("Don't use the built-in signatures"),
        )
        .arg(
            arg!(-s --"signatures" <SIGNATURES_FILE>)
                .help("Load signatures from a file")
                .long_help(help::SIGNATURES_LONG_HELP)
                .value_parser(existing_path_parser)
                .action(ArgAction::Append),
        )
}

/// Parses a path and makes sure that it exists.
fn existing_path_parser(input: &str) -> Result<PathBuf, anyhow::Error> {
    let path = PathBuf::from(input);
    if path.try_exists()? {
        Ok(path)
    } else {
        Err(anyhow!("file not found"))
    }
}

/// Contents of a signature file.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct SignatureFile {
    #[serde(default)]
    signature: Vec<SignatureDef>,
}

/// Loads the signatures defined in a file. The order of the signatures in
/// the file is preserved.
pub fn load_signature_file(path: &Path) -> anyhow::Result<Vec<SignatureDef>> {
    let file: SignatureFile = Figment::from(Toml::file_exact(path))
        .extract()
        .with_context(|| {
            format!("can not load signatures from `{}`", path.display())
        })?;

    Ok(file.signature)
}

/// Returns the definitions of the signatures that must be used according to
/// the command-line arguments and the config file. The built-in signatures go
/// first, followed by the ones in the files listed in the config file and
/// then the ones in files passed with `--signatures`.
pub fn signature_defs(
    args: &ArgMatches,
    config: &Config,
) -> anyhow::Result<Vec<SignatureDef>> {
    let mut defs = Vec::new();

    if config.signatures.builtin && !args.get_flag("no-builtin") {
        defs.extend(builtin_defs());
    }

    let files = config.signatures.files.iter().chain(
        args.get_many::<PathBuf>("signatures").into_iter().flatten(),
    );

    for path in files {
        defs.extend(load_signature_file(path)?);
    }

    Ok(defs)
}

/// Loads and compiles the signatures. See [`signature_defs`].
pub fn load_signatures(
    args: &ArgMatches,
    config: &Config,
) -> anyhow::Result<(Vec<SignatureDef>, Vec<CompiledSignature>)> {
    let defs = signature_defs(args, config)?;
    let compiled = compile_defs(&defs)?;
    Ok((defs, compiled))
}

/// Parses a size, like the ones accepted by `--skip-larger`.
///
/// Accepts a plain number of bytes or a number followed by one of the
/// suffixes `K`, `M` or `G` (powers of 1024).
fn size_parser(input: &str) -> Result<u64, anyhow::Error> {
    let (digits, multiplier) = match input.char_indices().last() {
        Some((i, 'K' | 'k')) => (&input[..i], 1 << 10),
        Some((i, 'M' | 'm')) => (&input[..i], 1 << 20),
        Some((i, 'G' | 'g')) => (&input[..i], 1 << 30),
        _ => (input, 1),
    };

    let n = digits
        .parse::<u64>()
        .map_err(|_| anyhow!("`{}` is not a valid size", input))?;

    n.checked_mul(multiplier).ok_or(anyhow!("size `{}` is too large", input))
}

#[cfg(test)]
mod tests {
    use super::size_parser;

    #[test]
    fn sizes() {
        assert_eq!(size_parser("100").unwrap(), 100);
        assert_eq!(size_parser("2K").unwrap(), 2048);
        assert_eq!(size_parser("16M").unwrap(), 16 * 1024 * 1024);
        assert_eq!(size_parser("1g").unwrap(), 1024 * 1024 * 1024);
        assert!(size_parser("").is_err());
        assert!(size_parser("M").is_err());
        assert!(size_parser("12X").is_err());
    }
}
