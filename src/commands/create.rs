use colored::*;
use eyre::{Context, Result};

use super::{ProfileOutput, build_gateway, print_profile};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::session::create_npc;

pub fn run(
    world: Option<String>,
    role: Option<String>,
    strict: bool,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let world = world.unwrap_or_else(|| config.world.description.clone());
    let role = role.unwrap_or_else(|| config.world.role.clone());

    let gateway = build_gateway(config)?;
    let extractor = config.extractor(strict);
    log::info!("Creating '{}' with extraction policy {:?}", role, extractor.policy());

    if format == OutputFormat::Text {
        println!("{} Creating a {}...", "→".blue(), role.cyan());
    }

    let record = create_npc(&gateway, &extractor, &world, &role, config.extraction.profile_attempts)
        .context("Error creating NPC personality")?;

    print_profile(&ProfileOutput::new(Some(&role), record, Vec::new()), format)
}
