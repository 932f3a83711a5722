use eyre::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use super::{ProfileOutput, print_profile};
use crate::cli::OutputFormat;
use crate::config::Config;

pub fn run(file: Option<PathBuf>, strict: bool, format: OutputFormat, config: &Config) -> Result<()> {
    let text = match file {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
            buf
        }
    };

    let extraction = config
        .extractor(strict)
        .extract_report(&text)
        .context("Failed to extract personality")?;

    print_profile(&ProfileOutput::new(None, extraction.record, extraction.defaulted), format)
}
