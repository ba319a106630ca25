use std::path::{Path, PathBuf};

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Configuration for the CLI.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Configuration for the `scan` command.
    pub scan: ScanConfig,
    /// Configuration for the signatures loaded by every command.
    pub signatures: SignaturesConfig,
}

/// Configuration for the `scan` command.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Extensions of the files scanned while walking a directory.
    pub extensions: Vec<String>,
    /// Files larger than this size (in bytes) are skipped.
    pub max_file_size: u64,
    /// Lines longer than this number of characters are truncated before
    /// being scanned.
    pub max_line_length: Option<usize>,
    /// Number of lines included in the preview of scanned files.
    pub preview_lines: usize,
}

/// Configuration for signatures.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SignaturesConfig {
    /// Use the built-in signatures.
    pub builtin: bool,
    /// Signature files loaded in addition to the ones passed in the command
    /// line.
    pub files: Vec<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> ScanConfig {
        ScanConfig {
            extensions: [
                "txt", "py", "sh", "js", "java", "cpp", "c", "html", "css",
                "php", "rb",
            ]
            .map(String::from)
            .to_vec(),
            max_file_size: 16 * 1024 * 1024,
            max_line_length: None,
            preview_lines: 20,
        }
    }
}

impl Default for SignaturesConfig {
    fn default() -> SignaturesConfig {
        SignaturesConfig { builtin: true, files: Vec::new() }
    }
}

/// Load a config file from a given path. Path must contain a valid TOML file
/// or this function will propagate the error.
pub fn load_config_from_file(
    config_file: &Path,
) -> Result<Config, Box<figment::Error>> {
    let config: Config =
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file_exact(config_file))
            .extract()?;
    Ok(config)
}
