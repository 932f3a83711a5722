use colored::*;
use eyre::Result;

use super::{ProfileOutput, print_profiles};
use crate::cli::OutputFormat;
use crate::config::Config;

pub fn run(format: OutputFormat, config: &Config) -> Result<()> {
    let roster = config.roster();

    if roster.is_empty() && format == OutputFormat::Text {
        println!("{}", "No predefined NPCs configured".yellow());
        return Ok(());
    }

    let profiles: Vec<ProfileOutput> = roster
        .iter()
        .map(|(name, record)| ProfileOutput::new(Some(name.as_str()), *record, Vec::new()))
        .collect();

    print_profiles(&profiles, format)
}
